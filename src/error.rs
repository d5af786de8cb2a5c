// Errors surfaced by the game core.

use thiserror::Error;

use crate::world::ActorId;

/// Caller-contract violations reported by the core instead of panicking.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("actor {0} does not exist")]
    UnknownActor(ActorId),

    #[error("actor {0} has no collider")]
    MissingCollider(ActorId),

    #[error("team slot {0} is out of range (0..=2)")]
    InvalidTeamSlot(usize),

    #[error("actor {0} is not a monster")]
    NotAMonster(ActorId),

    #[error("actor {0} is not a marshal")]
    NotAMarshal(ActorId),

    #[error("parenting {child} under {parent} would create a cycle")]
    HierarchyCycle { parent: ActorId, child: ActorId },

    #[error("scene has already ended")]
    SceneEnded,

    #[error("scene {0} is not a battle scene")]
    NotABattleScene(usize),

    #[error("no battle scene has been registered")]
    NoBattleScene,

    #[error("scene {0} does not exist")]
    UnknownScene(usize),
}

pub type Result<T> = std::result::Result<T, GameError>;
