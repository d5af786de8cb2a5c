// The battle scene: two teams of monsters facing each other.

use std::ops::{Deref, DerefMut};

use log::info;

use crate::error::Result;
use crate::marshal::{Team, TEAM_SIZE};
use crate::math::Vec3;
use crate::scene::Scene;
use crate::world::{ActorId, World};

/// Distance of each rank from the centre line.
pub const RANK_DEPTH: f32 = 5.0;
/// Lateral gap between neighbours in a rank.
pub const RANK_SPACING: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    One,
    Two,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleOutcome {
    TeamOneWins,
    TeamTwoWins,
    /// Both sides fell in the same exchange.
    Draw,
}

/// Starting world position of a team slot: team one on the +Z row, team two
/// mirrored on the -Z row, slots left to right along +X.
pub fn rank_position(side: Side, slot: usize) -> Vec3 {
    let x = (slot as f32 - (TEAM_SIZE as f32 - 1.0) / 2.0) * RANK_SPACING;
    let z = match side {
        Side::One => RANK_DEPTH,
        Side::Two => -RANK_DEPTH,
    };
    Vec3::new(x, 0.0, z)
}

/// A [`Scene`] that also tracks two teams and whose turn it is.
#[derive(Debug, Clone)]
pub struct BattleScene {
    scene: Scene,
    teams: Option<(Team, Team)>,
    turn_order: Vec<ActorId>,
    current: usize,
    round: u32,
}

impl BattleScene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            scene: Scene::new(name),
            teams: None,
            turn_order: Vec::new(),
            current: 0,
            round: 0,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn team_one(&self) -> Option<Team> {
        self.teams.map(|(one, _)| one)
    }

    pub fn team_two(&self) -> Option<Team> {
        self.teams.map(|(_, two)| two)
    }

    /// Place both teams in their ranks and set up the first round.
    ///
    /// Replaces any previous roster. Empty slots are placed too but never
    /// take turns. Turn order is by speed, fastest first; ties keep team one
    /// ahead of team two and slot order within a team.
    pub fn start_battle(
        &mut self,
        world: &mut World,
        team_one: Team,
        team_two: Team,
    ) -> Result<()> {
        for id in team_one.iter().chain(&team_two) {
            world.monster(*id)?;
        }

        for id in self.teams.iter().flat_map(|(one, two)| one.iter().chain(two)) {
            self.scene.remove_actor(*id);
        }

        let mut contenders = Vec::new();
        for (side, team) in [(Side::One, team_one), (Side::Two, team_two)] {
            for (slot, &id) in team.iter().enumerate() {
                self.scene.add_actor(world, id)?;
                world.set_world_position(id, rank_position(side, slot))?;
                world.look_at(id, Vec3::new(rank_position(side, slot).x, 0.0, 0.0))?;
                world.monster_mut(id)?.reset_actions();
                let monster = world.monster(id)?;
                if !world.is_null_monster(id)? && monster.is_alive() {
                    contenders.push((id, monster.speed()));
                }
            }
        }
        contenders.sort_by(|a, b| b.1.total_cmp(&a.1));

        self.teams = Some((team_one, team_two));
        self.turn_order = contenders.into_iter().map(|(id, _)| id).collect();
        self.current = 0;
        self.round = 1;
        info!(
            "battle started in {} with {} combatants",
            self.scene.name(),
            self.turn_order.len()
        );
        Ok(())
    }

    /// Whether `id` is on either side of the current roster.
    pub fn has_combatant(&self, id: ActorId) -> bool {
        self.teams
            .is_some_and(|(one, two)| one.contains(&id) || two.contains(&id))
    }

    /// Put `replacement` in the roster slots holding `id` and drop `id` from
    /// the turn order. The turn stays with whoever held it.
    pub(crate) fn replace_combatant(&mut self, id: ActorId, replacement: ActorId) {
        if let Some((one, two)) = &mut self.teams {
            for slot in one.iter_mut().chain(two.iter_mut()) {
                if *slot == id {
                    *slot = replacement;
                }
            }
        }
        if let Some(index) = self.turn_order.iter().position(|combatant| *combatant == id) {
            self.turn_order.remove(index);
            if index < self.current {
                self.current -= 1;
            } else if self.current >= self.turn_order.len() {
                self.current = 0;
            }
        }
    }

    pub fn turn_order(&self) -> &[ActorId] {
        &self.turn_order
    }

    /// Current round, starting at 1; 0 before any battle.
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn current_combatant(&self) -> Option<ActorId> {
        self.turn_order.get(self.current).copied()
    }

    /// Pass the turn to the next living combatant. Wrapping past the end
    /// of the order starts a new round and refills every action budget.
    /// Returns `None` once nobody is left standing.
    pub fn end_turn(&mut self, world: &mut World) -> Result<Option<ActorId>> {
        for _ in 0..self.turn_order.len() {
            self.current += 1;
            if self.current >= self.turn_order.len() {
                self.current = 0;
                self.round += 1;
                for &id in &self.turn_order {
                    world.monster_mut(id)?.reset_actions();
                }
            }
            let id = self.turn_order[self.current];
            if world.monster(id)?.is_alive() {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }

    /// A side loses once none of its non-empty slots has health left.
    pub fn outcome(&self, world: &World) -> Result<Option<BattleOutcome>> {
        let Some((team_one, team_two)) = self.teams else {
            return Ok(None);
        };
        let one_down = team_defeated(world, &team_one)?;
        let two_down = team_defeated(world, &team_two)?;
        Ok(match (one_down, two_down) {
            (false, false) => None,
            (false, true) => Some(BattleOutcome::TeamOneWins),
            (true, false) => Some(BattleOutcome::TeamTwoWins),
            (true, true) => Some(BattleOutcome::Draw),
        })
    }
}

fn team_defeated(world: &World, team: &Team) -> Result<bool> {
    for &id in team {
        if !world.is_null_monster(id)? && world.monster(id)?.is_alive() {
            return Ok(false);
        }
    }
    Ok(true)
}

impl Deref for BattleScene {
    type Target = Scene;

    fn deref(&self) -> &Scene {
        &self.scene
    }
}

impl DerefMut for BattleScene {
    fn deref_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }
}
