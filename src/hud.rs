// On-screen text and the HUD that fills it.

use crate::actor::{Actor, ActorKind};
use crate::error::Result;
use crate::math::Vec3;
use crate::world::{ActorId, World};

/// A block of screen-space text. The owning actor's position is the
/// top-left corner in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct UiText {
    pub text: String,
    pub width: f32,
    pub height: f32,
    pub font_size: u32,
}

impl UiText {
    pub fn new(width: f32, height: f32, font_size: u32) -> Self {
        Self {
            text: String::new(),
            width,
            height,
            font_size,
        }
    }
}

/// Shows the roster of the marshal the player has selected.
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    player: ActorId,
    text: ActorId,
}

impl Hud {
    pub fn text(&self) -> ActorId {
        self.text
    }
}

impl World {
    /// Spawn the HUD for `player` and its text element. Both belong in a
    /// scene's UI collection.
    pub fn spawn_hud(&mut self, player: ActorId) -> (ActorId, ActorId) {
        let text = self.spawn(
            Actor::new("Hud Text", Vec3::new(10.0, 5.0, 0.0))
                .with_shape(None)
                .with_kind(ActorKind::Text(UiText::new(150.0, 300.0, 12))),
        );
        let hud = self.spawn(
            Actor::new("Hud", Vec3::ZERO)
                .with_shape(None)
                .with_kind(ActorKind::Hud(Hud { player, text })),
        );
        (hud, text)
    }
}

fn roster_text(world: &World, marshal: ActorId) -> Result<String> {
    let mut text = world.get(marshal)?.name.clone();
    text.push('\n');
    for member in world.team(marshal)? {
        let name = &world.get(member)?.name;
        let monster = world.monster(member)?;
        text.push_str(&format!(
            "\n{}\nHP {} / {}\nATK {}\nDEF {}\n",
            name,
            monster.health(),
            monster.max_health(),
            monster.attack_power(),
            monster.defense()
        ));
    }
    Ok(text)
}

pub(crate) fn update(world: &mut World, id: ActorId) -> Result<()> {
    let hud = match &world.get(id)?.kind {
        ActorKind::Hud(hud) => hud.clone(),
        _ => return Ok(()),
    };

    // A despawned player or marshal shows as nothing selected.
    let selected = world
        .get(hud.player)
        .ok()
        .and_then(|actor| actor.as_player())
        .and_then(|player| player.selected_marshal())
        .filter(|marshal| world.contains(*marshal));
    let content = match selected {
        Some(marshal) => roster_text(world, marshal)?,
        None => String::new(),
    };

    if let Ok(actor) = world.get_mut(hud.text) {
        if let ActorKind::Text(text) = &mut actor.kind {
            text.text = content;
        }
    }
    Ok(())
}
