// Interface to whatever puts actors on screen.

use crate::actor::{Color, Shape};
use crate::math::{Mat4, Quat, Vec3};
use crate::world::ActorId;

/// One shape to draw this frame, in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRequest {
    pub actor: ActorId,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub shape: Shape,
    pub color: Color,
}

impl DrawRequest {
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Fully transparent requests need no draw call.
    pub fn is_visible(&self) -> bool {
        self.color.w > 0.0
    }
}

/// A block of text at a screen-space position in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    pub actor: ActorId,
    pub position: Vec3,
    pub text: String,
    pub font_size: u32,
    pub color: Color,
}

pub trait Renderer {
    fn draw_shape(&mut self, request: DrawRequest);
    fn draw_text(&mut self, request: TextRequest);
}

/// Collects a frame's requests. The GPU backend replays them; tests
/// inspect them.
#[derive(Debug, Default)]
pub struct FrameRecorder {
    pub shapes: Vec<DrawRequest>,
    pub texts: Vec<TextRequest>,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
        self.texts.clear();
    }
}

impl Renderer for FrameRecorder {
    fn draw_shape(&mut self, request: DrawRequest) {
        self.shapes.push(request);
    }

    fn draw_text(&mut self, request: TextRequest) {
        self.texts.push(request);
    }
}
