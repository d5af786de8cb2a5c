// Debounced input signals handed to actors each frame.

use crate::math::Vec3;

/// Logical actions the game reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveLeft,
    MoveRight,
    MoveForward,
    MoveBack,
    Confirm,
    ScaleUp,
    ScaleReset,
}

/// Held state per action plus a pressed-this-frame edge for confirm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub forward: bool,
    pub back: bool,
    pub confirm: bool,
    pub scale_up: bool,
    pub scale_reset: bool,
    confirm_pressed: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press or release. A press of a released confirm key raises
    /// the pressed edge until [`InputState::end_frame`].
    pub fn set(&mut self, action: Action, down: bool) {
        match action {
            Action::MoveLeft => self.left = down,
            Action::MoveRight => self.right = down,
            Action::MoveForward => self.forward = down,
            Action::MoveBack => self.back = down,
            Action::Confirm => {
                if down && !self.confirm {
                    self.confirm_pressed = true;
                }
                self.confirm = down;
            }
            Action::ScaleUp => self.scale_up = down,
            Action::ScaleReset => self.scale_reset = down,
        }
    }

    pub fn is_down(&self, action: Action) -> bool {
        match action {
            Action::MoveLeft => self.left,
            Action::MoveRight => self.right,
            Action::MoveForward => self.forward,
            Action::MoveBack => self.back,
            Action::Confirm => self.confirm,
            Action::ScaleUp => self.scale_up,
            Action::ScaleReset => self.scale_reset,
        }
    }

    /// Confirm went down since the last frame.
    pub fn confirm_pressed(&self) -> bool {
        self.confirm_pressed
    }

    /// Move direction on the XZ plane: right is +X, forward is -Z.
    pub fn move_axis(&self) -> Vec3 {
        let x = self.right as i32 - self.left as i32;
        let z = self.back as i32 - self.forward as i32;
        Vec3::new(x as f32, 0.0, z as f32)
    }

    /// Clear per-frame edges.
    pub fn end_frame(&mut self) {
        self.confirm_pressed = false;
    }
}
