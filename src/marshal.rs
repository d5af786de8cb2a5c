// Marshals: roaming actors that lead a team of three monsters.

use log::debug;

use crate::actor::{Actor, ActorKind, Shape};
use crate::combat::null_monster_actor;
use crate::error::{GameError, Result};
use crate::math::Vec3;
use crate::scene::{FrameContext, SceneRequest};
use crate::world::{ActorId, World};

pub const TEAM_SIZE: usize = 3;

/// A marshal stops once it is within this distance of its destination on
/// both horizontal axes.
pub const ARRIVAL_THRESHOLD: f32 = 1.0;

pub type Team = [ActorId; TEAM_SIZE];

#[derive(Debug, Clone, PartialEq)]
pub struct Marshal {
    speed: f32,
    velocity: Vec3,
    destination: Vec3,
    team: Team,
}

impl Marshal {
    /// Movement speed, read from the team leader every frame.
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// World-space heading times speed while moving, zero once arrived.
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn destination(&self) -> Vec3 {
        self.destination
    }

    pub fn set_destination(&mut self, destination: Vec3) {
        self.destination = destination;
    }

    pub fn team(&self) -> Team {
        self.team
    }
}

fn check_slot(index: usize) -> Result<()> {
    if index < TEAM_SIZE {
        Ok(())
    } else {
        Err(GameError::InvalidTeamSlot(index))
    }
}

impl World {
    /// Spawn a marshal whose destination is its starting point and whose
    /// team slots all hold empty monsters.
    pub fn spawn_marshal(&mut self, name: impl Into<String>, position: Vec3) -> ActorId {
        let team = [
            self.spawn(null_monster_actor()),
            self.spawn(null_monster_actor()),
            self.spawn(null_monster_actor()),
        ];
        let marshal = Marshal {
            speed: 0.0,
            velocity: Vec3::ZERO,
            destination: position,
            team,
        };
        self.spawn(
            Actor::new(name, position)
                .with_shape(Some(Shape::Cube))
                .with_kind(ActorKind::Marshal(marshal)),
        )
    }

    pub fn marshal(&self, id: ActorId) -> Result<&Marshal> {
        self.get(id)?.as_marshal().ok_or(GameError::NotAMarshal(id))
    }

    pub fn marshal_mut(&mut self, id: ActorId) -> Result<&mut Marshal> {
        self.get_mut(id)?
            .as_marshal_mut()
            .ok_or(GameError::NotAMarshal(id))
    }

    pub fn team(&self, marshal: ActorId) -> Result<Team> {
        Ok(self.marshal(marshal)?.team)
    }

    pub fn team_member(&self, marshal: ActorId, index: usize) -> Result<ActorId> {
        check_slot(index)?;
        Ok(self.marshal(marshal)?.team[index])
    }

    /// Put `monster` in slot `index`, replacing whatever was there.
    pub fn add_team_member(
        &mut self,
        marshal: ActorId,
        monster: ActorId,
        index: usize,
    ) -> Result<()> {
        check_slot(index)?;
        self.monster(monster)?;
        self.marshal_mut(marshal)?.team[index] = monster;
        Ok(())
    }

    /// Empty slot `index`. Reports whether the slot now holds the nameless
    /// empty monster, so emptying an empty slot still succeeds.
    pub fn remove_team_member(&mut self, marshal: ActorId, index: usize) -> Result<bool> {
        check_slot(index)?;
        let current = self.marshal(marshal)?.team[index];
        if !self.is_null_monster(current)? {
            let empty = self.spawn(null_monster_actor());
            self.marshal_mut(marshal)?.team[index] = empty;
            debug!("{} dismissed {}", self.get(marshal)?.name, self.get(current)?.name);
        }
        let slot = self.marshal(marshal)?.team[index];
        Ok(self.get(slot)?.name.is_empty())
    }

    pub fn set_destination(&mut self, marshal: ActorId, destination: Vec3) -> Result<()> {
        self.marshal_mut(marshal)?.set_destination(destination);
        Ok(())
    }

    /// Whether any marshal's team holds `monster`.
    pub fn in_any_team(&self, monster: ActorId) -> bool {
        self.ids().any(|id| {
            self.get(id)
                .ok()
                .and_then(|actor| actor.as_marshal())
                .is_some_and(|marshal| marshal.team.contains(&monster))
        })
    }

    /// Put `replacement` in every team slot that holds `monster`.
    pub(crate) fn replace_team_member(&mut self, monster: ActorId, replacement: ActorId) {
        let marshals: Vec<ActorId> = self.ids().collect();
        for id in marshals {
            if let Ok(marshal) = self.marshal_mut(id) {
                for slot in marshal.team.iter_mut().filter(|slot| **slot == monster) {
                    *slot = replacement;
                }
            }
        }
    }
}

/// Per-frame movement: head for the destination at the leader's speed,
/// never stepping inside the arrival threshold.
pub(crate) fn update(world: &mut World, id: ActorId, delta_time: f32) -> Result<()> {
    let (leader, destination) = {
        let marshal = world.marshal(id)?;
        (marshal.team[0], marshal.destination)
    };
    let speed = world.monster(leader)?.speed();
    let offset = destination - world.world_position(id)?;

    let mut velocity = Vec3::ZERO;
    if offset.x.abs() > ARRIVAL_THRESHOLD || offset.z.abs() > ARRIVAL_THRESHOLD {
        world.look_at(id, destination)?;
        let direction = offset.normalize_or_zero();
        let step = (speed * delta_time).min(offset.length() - ARRIVAL_THRESHOLD).max(0.0);
        let delta = world.world_to_parent_vector(id, direction * step)?;
        world.translate(id, delta)?;
        velocity = direction * speed;
    }

    let marshal = world.marshal_mut(id)?;
    marshal.speed = speed;
    marshal.velocity = velocity;
    Ok(())
}

/// Touching another marshal outside a battle starts one between the teams.
pub(crate) fn on_collision(
    world: &World,
    id: ActorId,
    other: ActorId,
    ctx: &mut FrameContext<'_>,
) -> Result<()> {
    if ctx.in_battle() {
        return Ok(());
    }
    if let Some(other_marshal) = world.get(other)?.as_marshal() {
        ctx.request(SceneRequest::Battle {
            team_one: world.team(id)?,
            team_two: other_marshal.team,
        });
    }
    Ok(())
}
