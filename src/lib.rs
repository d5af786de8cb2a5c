// Falsebound: actors on a field, marshals with monster teams, and battles
// when two marshals meet.

pub mod actor;
pub mod battle;
pub mod collider;
pub mod combat;
pub mod config;
pub mod engine;
pub mod error;
pub mod hud;
pub mod input;
pub mod marshal;
pub mod math;
pub mod player;
pub mod render;
pub mod scene;
pub mod setup;
pub mod world;

pub use error::{GameError, Result};
