// Monster battle statistics.

use log::{debug, info};

use crate::actor::{Actor, ActorKind, Shape};
use crate::error::{GameError, Result};
use crate::math::{Vec3, Vec4};
use crate::world::{ActorId, World};

/// Combat statistics of a monster actor.
///
/// Health is kept in `0..=max_health` on every write.
#[derive(Debug, Clone, PartialEq)]
pub struct Monster {
    health: i32,
    max_health: i32,
    attack_power: i32,
    defense: i32,
    actions_remaining: u32,
    max_actions: u32,
    speed: f32,
}

impl Monster {
    /// A monster at full health with a full action budget.
    pub fn new(max_health: i32, attack_power: i32, defense: i32, actions: u32, speed: f32) -> Self {
        let max_health = max_health.max(0);
        Self {
            health: max_health,
            max_health,
            attack_power,
            defense,
            actions_remaining: actions,
            max_actions: actions,
            speed,
        }
    }

    /// The empty team slot: every stat zero.
    pub fn null() -> Self {
        Self::new(0, 0, 0, 0, 0.0)
    }

    pub fn is_null(&self) -> bool {
        *self == Self::null()
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    pub fn attack_power(&self) -> i32 {
        self.attack_power
    }

    pub fn defense(&self) -> i32 {
        self.defense
    }

    pub fn actions_remaining(&self) -> u32 {
        self.actions_remaining
    }

    pub fn max_actions(&self) -> u32 {
        self.max_actions
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn set_health(&mut self, health: i32) {
        self.health = health.clamp(0, self.max_health);
    }

    /// Restore the per-round action budget.
    pub fn reset_actions(&mut self) {
        self.actions_remaining = self.max_actions;
    }

    pub(crate) fn spend_action(&mut self) {
        self.actions_remaining = self.actions_remaining.saturating_sub(1);
    }

    /// Take a hit of `power`, softened by defense. Returns the health lost.
    pub fn take_damage(&mut self, power: i32) -> i32 {
        let damage = power.saturating_sub(self.defense).max(0);
        let before = self.health;
        self.set_health(self.health.saturating_sub(damage));
        before - self.health
    }

    /// Hit `target` with this monster's attack power and spend one action.
    /// Returns the health the target lost.
    pub fn attack(&mut self, target: &mut Monster) -> i32 {
        let dealt = target.take_damage(self.attack_power);
        self.spend_action();
        dealt
    }
}

impl Default for Monster {
    fn default() -> Self {
        Self::null()
    }
}

/// Actor wrapper for the empty team slot.
pub fn null_monster_actor() -> Actor {
    Actor::new("", Vec3::ZERO).with_kind(ActorKind::Monster(Monster::null()))
}

impl World {
    pub fn spawn_monster(
        &mut self,
        name: impl Into<String>,
        position: Vec3,
        monster: Monster,
    ) -> ActorId {
        self.spawn(
            Actor::new(name, position)
                .with_shape(Some(Shape::Cube))
                .with_kind(ActorKind::Monster(monster)),
        )
    }

    pub fn monster(&self, id: ActorId) -> Result<&Monster> {
        self.get(id)?.as_monster().ok_or(GameError::NotAMonster(id))
    }

    pub fn monster_mut(&mut self, id: ActorId) -> Result<&mut Monster> {
        self.get_mut(id)?
            .as_monster_mut()
            .ok_or(GameError::NotAMonster(id))
    }

    /// Whether `id` holds the empty-slot monster (no name, no stats).
    pub fn is_null_monster(&self, id: ActorId) -> Result<bool> {
        let monster = self.monster(id)?;
        Ok(monster.is_null() && self.get(id)?.name.is_empty())
    }

    /// `attacker` hits `target`. Returns the health the target lost.
    pub fn attack(&mut self, attacker: ActorId, target: ActorId) -> Result<i32> {
        self.monster(target)?;
        let power = self.monster(attacker)?.attack_power();
        let dealt = self.monster_mut(target)?.take_damage(power);
        self.monster_mut(attacker)?.spend_action();
        debug!(
            "{} attacks {} for {} damage",
            self.get(attacker)?.name,
            self.get(target)?.name,
            dealt
        );
        Ok(dealt)
    }

    /// Hide a defeated monster. Stats and team membership are untouched.
    pub fn die(&mut self, id: ActorId) -> Result<()> {
        self.monster(id)?;
        let actor = self.get_mut(id)?;
        actor.color = Vec4::ZERO;
        info!("{} has fallen", actor.name);
        Ok(())
    }

    /// Spawn a fresh copy of a monster: same name, stats, color and size,
    /// with health and actions restored. The copy is a root at the origin.
    pub fn copy_monster(&mut self, id: ActorId) -> Result<ActorId> {
        let source = self.get(id)?;
        let mut monster = source
            .as_monster()
            .ok_or(GameError::NotAMonster(id))?
            .clone();
        monster.set_health(monster.max_health());
        monster.reset_actions();
        let copy = Actor::new(source.name.clone(), Vec3::ZERO)
            .with_shape(source.shape)
            .with_color(source.color)
            .with_scale(source.transform.scale)
            .with_kind(ActorKind::Monster(monster));
        Ok(self.spawn(copy))
    }
}
