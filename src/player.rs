// The player-controlled actor that steers marshals around the field.

use log::info;

use crate::actor::{Actor, ActorKind, Shape};
use crate::error::Result;
use crate::input::InputState;
use crate::math::Vec3;
use crate::scene::FrameContext;
use crate::world::{ActorId, World};

pub const DEFAULT_SCALE: Vec3 = Vec3::new(1.0, 0.5, 1.0);
pub const ENLARGED_SCALE: Vec3 = Vec3::new(2.0, 2.0, 2.0);

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    speed: f32,
    velocity: Vec3,
    selected_marshal: Option<ActorId>,
    ordered_this_frame: bool,
}

impl Player {
    pub fn new(speed: f32) -> Self {
        Self {
            speed,
            velocity: Vec3::ZERO,
            selected_marshal: None,
            ordered_this_frame: false,
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn selected_marshal(&self) -> Option<ActorId> {
        self.selected_marshal
    }
}

impl World {
    pub fn spawn_player(&mut self, name: impl Into<String>, position: Vec3, speed: f32) -> ActorId {
        self.spawn(
            Actor::new(name, position)
                .with_shape(Some(Shape::Sphere))
                .with_scale(DEFAULT_SCALE)
                .with_kind(ActorKind::Player(Player::new(speed))),
        )
    }

    pub fn player_mut(&mut self, id: ActorId) -> Option<&mut Player> {
        match &mut self.get_mut(id).ok()?.kind {
            ActorKind::Player(player) => Some(player),
            _ => None,
        }
    }

    /// Clear `marshal` from every player's selection.
    pub(crate) fn deselect_marshal(&mut self, marshal: ActorId) {
        let players: Vec<ActorId> = self.ids().collect();
        for id in players {
            if let Some(player) = self.player_mut(id) {
                if player.selected_marshal == Some(marshal) {
                    player.selected_marshal = None;
                }
            }
        }
    }
}

pub(crate) fn update(
    world: &mut World,
    id: ActorId,
    delta_time: f32,
    input: &InputState,
) -> Result<()> {
    let Some(player) = world.player_mut(id) else {
        return Ok(());
    };
    player.ordered_this_frame = false;
    let speed = player.speed;
    let selected = player.selected_marshal;

    let direction = input.move_axis().normalize_or_zero();
    let velocity = direction * speed;
    let position = world.world_position(id)?;
    world.look_at(id, position + direction)?;
    let delta = world.world_to_parent_vector(id, velocity * delta_time)?;
    world.translate(id, delta)?;

    let mut selected_after = selected;
    let mut ordered = false;
    if let Some(marshal) = selected {
        if input.confirm_pressed() {
            let destination = world.world_position(id)?;
            world.set_destination(marshal, destination)?;
            info!("{} sent to {:?}", world.get(marshal)?.name, destination);
            selected_after = None;
            ordered = true;
        }
    }

    if input.scale_up {
        world.set_scale(id, ENLARGED_SCALE)?;
    }
    if input.scale_reset {
        world.set_scale(id, DEFAULT_SCALE)?;
    }

    if let Some(player) = world.player_mut(id) {
        player.velocity = velocity;
        player.selected_marshal = selected_after;
        player.ordered_this_frame = ordered;
    }
    Ok(())
}

/// Confirm while touching a marshal selects it, unless an order was just
/// given this frame.
pub(crate) fn on_collision(
    world: &mut World,
    id: ActorId,
    other: ActorId,
    ctx: &mut FrameContext<'_>,
) -> Result<()> {
    if !ctx.input().confirm_pressed() || world.get(other)?.as_marshal().is_none() {
        return Ok(());
    }
    let name = world.get(other)?.name.clone();
    if let Some(player) = world.player_mut(id) {
        if !player.ordered_this_frame && player.selected_marshal != Some(other) {
            player.selected_marshal = Some(other);
            info!("selected marshal {}", name);
        }
    }
    Ok(())
}
