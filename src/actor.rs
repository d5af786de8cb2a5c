// Scene-graph nodes.

use crate::collider::Collider;
use crate::combat::Monster;
use crate::hud::{Hud, UiText};
use crate::marshal::Marshal;
use crate::math::{Transform, Vec3, Vec4};
use crate::player::Player;
use crate::world::ActorId;

/// RGBA with components in `0.0..=1.0`.
pub type Color = Vec4;

pub const WHITE: Color = Vec4::ONE;

/// What the renderer draws for an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Cube,
    Sphere,
}

/// Behavior attached to an actor.
#[derive(Debug, Clone)]
pub enum ActorKind {
    /// Plain node: no per-frame behavior.
    Prop,
    Player(Player),
    Marshal(Marshal),
    Monster(Monster),
    Hud(Hud),
    Text(UiText),
}

/// A positioned node in the scene hierarchy.
///
/// The transform is local to the parent; world-space values are derived
/// through [`crate::world::World`].
#[derive(Debug, Clone)]
pub struct Actor {
    pub name: String,
    pub transform: Transform,
    pub color: Color,
    pub shape: Option<Shape>,
    pub kind: ActorKind,
    pub(crate) started: bool,
    pub(crate) parent: Option<ActorId>,
    pub(crate) children: Vec<ActorId>,
    pub(crate) collider: Option<Collider>,
}

impl Actor {
    /// A white cube at `position` with no behavior.
    pub fn new(name: impl Into<String>, position: Vec3) -> Self {
        Self {
            name: name.into(),
            transform: Transform::from_position(position),
            color: WHITE,
            shape: Some(Shape::Cube),
            kind: ActorKind::Prop,
            started: false,
            parent: None,
            children: Vec::new(),
            collider: None,
        }
    }

    pub fn with_kind(mut self, kind: ActorKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_shape(mut self, shape: Option<Shape>) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.transform.scale = scale;
        self
    }

    /// Whether the actor's one-time start hook has run.
    pub fn started(&self) -> bool {
        self.started
    }

    pub fn parent(&self) -> Option<ActorId> {
        self.parent
    }

    pub fn children(&self) -> &[ActorId] {
        &self.children
    }

    pub fn collider(&self) -> Option<&Collider> {
        self.collider.as_ref()
    }

    pub fn collider_mut(&mut self) -> Option<&mut Collider> {
        self.collider.as_mut()
    }

    pub fn local_position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn as_monster(&self) -> Option<&Monster> {
        match &self.kind {
            ActorKind::Monster(monster) => Some(monster),
            _ => None,
        }
    }

    pub fn as_monster_mut(&mut self) -> Option<&mut Monster> {
        match &mut self.kind {
            ActorKind::Monster(monster) => Some(monster),
            _ => None,
        }
    }

    pub fn as_marshal(&self) -> Option<&Marshal> {
        match &self.kind {
            ActorKind::Marshal(marshal) => Some(marshal),
            _ => None,
        }
    }

    pub fn as_marshal_mut(&mut self) -> Option<&mut Marshal> {
        match &mut self.kind {
            ActorKind::Marshal(marshal) => Some(marshal),
            _ => None,
        }
    }

    pub fn as_player(&self) -> Option<&Player> {
        match &self.kind {
            ActorKind::Player(player) => Some(player),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&UiText> {
        match &self.kind {
            ActorKind::Text(text) => Some(text),
            _ => None,
        }
    }
}
