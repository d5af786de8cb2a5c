// Application state driven by the frame pump.

use log::{debug, info};

use crate::actor::Actor;
use crate::battle::BattleScene;
use crate::combat::null_monster_actor;
use crate::error::{GameError, Result};
use crate::input::InputState;
use crate::marshal::Team;
use crate::math::Vec3;
use crate::render::Renderer;
use crate::scene::{FrameContext, Scene, SceneRequest};
use crate::world::{ActorId, World};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneId(usize);

impl SceneId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub enum SceneSlot {
    Field(Scene),
    Battle(BattleScene),
}

impl SceneSlot {
    pub fn scene(&self) -> &Scene {
        match self {
            SceneSlot::Field(scene) => scene,
            SceneSlot::Battle(battle) => battle.scene(),
        }
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        match self {
            SceneSlot::Field(scene) => scene,
            SceneSlot::Battle(battle) => battle.scene_mut(),
        }
    }

    pub fn is_battle(&self) -> bool {
        matches!(self, SceneSlot::Battle(_))
    }

    pub fn as_battle(&self) -> Option<&BattleScene> {
        match self {
            SceneSlot::Battle(battle) => Some(battle),
            SceneSlot::Field(_) => None,
        }
    }
}

/// Everything the frame pump needs: the actors, the scenes, which scene is
/// live and whether the game should keep running.
#[derive(Debug)]
pub struct Engine {
    world: World,
    scenes: Vec<SceneSlot>,
    active: SceneId,
    battle: Option<SceneId>,
    focus: Option<ActorId>,
    running: bool,
}

impl Engine {
    pub fn new(world: World) -> Self {
        Self {
            world,
            scenes: Vec::new(),
            active: SceneId(0),
            battle: None,
            focus: None,
            running: false,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Register a scene. The first battle scene added receives battle
    /// transitions.
    pub fn add_scene(&mut self, scene: SceneSlot) -> SceneId {
        let id = SceneId(self.scenes.len());
        if scene.is_battle() && self.battle.is_none() {
            self.battle = Some(id);
        }
        self.scenes.push(scene);
        id
    }

    pub fn scene(&self, id: SceneId) -> Result<&SceneSlot> {
        self.scenes.get(id.0).ok_or(GameError::UnknownScene(id.0))
    }

    pub fn scene_mut(&mut self, id: SceneId) -> Result<&mut SceneSlot> {
        self.scenes.get_mut(id.0).ok_or(GameError::UnknownScene(id.0))
    }

    /// Add an actor (and its descendants) to a scene.
    pub fn add_actor(&mut self, scene: SceneId, actor: ActorId) -> Result<()> {
        let slot = self.scenes.get_mut(scene.0).ok_or(GameError::UnknownScene(scene.0))?;
        slot.scene_mut().add_actor(&self.world, actor)
    }

    pub fn active_scene(&self) -> SceneId {
        self.active
    }

    pub fn active(&self) -> Result<&SceneSlot> {
        self.scene(self.active)
    }

    pub fn set_active_scene(&mut self, id: SceneId) -> Result<()> {
        self.scene(id)?;
        self.active = id;
        Ok(())
    }

    pub fn battle_scene(&self) -> Option<SceneId> {
        self.battle
    }

    /// The actor the camera follows.
    pub fn focus(&self) -> Option<ActorId> {
        self.focus
    }

    pub fn set_focus(&mut self, focus: Option<ActorId>) {
        self.focus = focus;
    }

    pub fn focus_position(&self) -> Option<Vec3> {
        self.world.world_position(self.focus?).ok()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Ask the frame pump to stop after this frame.
    pub fn request_close(&mut self) {
        if self.running {
            info!("close requested");
        }
        self.running = false;
    }

    pub fn start(&mut self) -> Result<()> {
        self.scene_mut(self.active)?.scene_mut().start();
        self.running = true;
        Ok(())
    }

    /// One frame of game logic: actors, then UI, then any scene change the
    /// actors asked for.
    pub fn update(&mut self, delta_time: f32, input: &InputState) -> Result<()> {
        if !self.running {
            return Ok(());
        }
        let slot = self
            .scenes
            .get_mut(self.active.0)
            .ok_or(GameError::UnknownScene(self.active.0))?;
        let mut ctx = FrameContext::new(input, slot.is_battle());
        let scene = slot.scene_mut();
        scene.update(&mut self.world, delta_time, &mut ctx)?;
        scene.update_ui(&mut self.world, delta_time, &mut ctx)?;

        for request in ctx.into_requests() {
            self.handle_request(request)?;
        }
        Ok(())
    }

    fn handle_request(&mut self, request: SceneRequest) -> Result<()> {
        match request {
            SceneRequest::Battle { team_one, team_two } => {
                if self.active()?.is_battle() {
                    debug!("battle already under way, dropping request");
                    return Ok(());
                }
                self.move_to_battle(team_one, team_two)
            }
        }
    }

    /// Activate the battle scene with the given teams in their ranks.
    pub fn move_to_battle(&mut self, team_one: Team, team_two: Team) -> Result<()> {
        let id = self.battle.ok_or(GameError::NoBattleScene)?;
        let SceneSlot::Battle(battle) = self
            .scenes
            .get_mut(id.0)
            .ok_or(GameError::UnknownScene(id.0))?
        else {
            return Err(GameError::NotABattleScene(id.0));
        };
        battle.start_battle(&mut self.world, team_one, team_two)?;
        battle.start();
        info!("moving to battle scene {}", battle.name());
        self.active = id;
        Ok(())
    }

    pub fn draw(&self, renderer: &mut dyn Renderer) -> Result<()> {
        let scene = self.active()?.scene();
        scene.draw(&self.world, renderer)?;
        scene.draw_ui(&self.world, renderer)
    }

    pub fn end(&mut self) -> Result<()> {
        let slot = self
            .scenes
            .get_mut(self.active.0)
            .ok_or(GameError::UnknownScene(self.active.0))?;
        slot.scene_mut().end(&self.world);
        self.running = false;
        Ok(())
    }

    /// Remove an actor from every scene, then from the world.
    ///
    /// Team slots and battle rosters that held a removed monster get an
    /// empty monster instead. Players lose a removed marshal from their
    /// selection.
    pub fn despawn(&mut self, id: ActorId) -> Result<Actor> {
        for slot in &mut self.scenes {
            let scene = slot.scene_mut();
            while scene.remove_actor(id) {}
            while scene.remove_ui_element(id) {}
        }
        if self.focus == Some(id) {
            self.focus = None;
        }
        let actor = self.world.despawn(id)?;

        if actor.as_monster().is_some() {
            let in_battle = self
                .scenes
                .iter()
                .any(|slot| slot.as_battle().is_some_and(|battle| battle.has_combatant(id)));
            if in_battle || self.world.in_any_team(id) {
                let empty = self.world.spawn(null_monster_actor());
                self.world.replace_team_member(id, empty);
                for slot in &mut self.scenes {
                    if let SceneSlot::Battle(battle) = slot {
                        battle.replace_combatant(id, empty);
                    }
                }
                debug!("{} replaced by an empty slot", actor.name);
            }
        }
        if actor.as_marshal().is_some() {
            self.world.deselect_marshal(id);
        }
        Ok(actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collider::Collider;
    use crate::combat::Monster;
    use crate::config::GameConfig;
    use crate::input::Action;
    use crate::render::FrameRecorder;
    use crate::setup::build_game;

    fn engine_with_two_marshals(gap: f32) -> (Engine, ActorId, ActorId) {
        let mut engine = Engine::new(World::new());
        let field = engine.add_scene(SceneSlot::Field(Scene::new("field")));
        engine.add_scene(SceneSlot::Battle(BattleScene::new("battle")));

        let world = engine.world_mut();
        let red = world.spawn_marshal("Red", Vec3::ZERO);
        let blue = world.spawn_marshal("Blue", Vec3::new(gap, 0.0, 0.0));
        for (marshal, name) in [(red, "Ember"), (blue, "Tide")] {
            let monster = world.spawn_monster(name, Vec3::ZERO, Monster::new(10, 3, 1, 1, 2.0));
            world.add_team_member(marshal, monster, 0).unwrap();
            world.set_collider(marshal, Collider::sphere(2.0)).unwrap();
        }
        engine.add_actor(field, red).unwrap();
        engine.add_actor(field, blue).unwrap();
        (engine, red, blue)
    }

    #[test]
    fn colliding_marshals_switch_to_battle_once() {
        let (mut engine, red, blue) = engine_with_two_marshals(3.0);
        engine.start().unwrap();
        let input = InputState::new();

        engine.update(0.016, &input).unwrap();

        let battle_id = engine.battle_scene().unwrap();
        assert_eq!(engine.active_scene(), battle_id);
        let battle = engine.active().unwrap().as_battle().unwrap();
        assert_eq!(battle.team_one(), Some(engine.world().team(red).unwrap()));
        assert_eq!(battle.team_two(), Some(engine.world().team(blue).unwrap()));
        assert_eq!(battle.actors().len(), 6);
    }

    #[test]
    fn distant_marshals_stay_on_the_field() {
        let (mut engine, _, _) = engine_with_two_marshals(30.0);
        engine.start().unwrap();
        engine.update(0.016, &InputState::new()).unwrap();
        assert_eq!(engine.active_scene().index(), 0);
    }

    #[test]
    fn closed_engine_ignores_updates() {
        let (mut engine, red, _) = engine_with_two_marshals(3.0);
        engine.start().unwrap();
        engine.request_close();
        assert!(!engine.is_running());

        engine.update(0.016, &InputState::new()).unwrap();
        assert_eq!(engine.active_scene().index(), 0);
        assert!(!engine.world().get(red).unwrap().started());
    }

    #[test]
    fn battle_without_battle_scene_is_an_error() {
        let mut engine = Engine::new(World::new());
        engine.add_scene(SceneSlot::Field(Scene::new("field")));
        let team = [engine.world_mut().spawn_monster("a", Vec3::ZERO, Monster::null()); 3];
        assert_eq!(engine.move_to_battle(team, team), Err(GameError::NoBattleScene));
    }

    #[test]
    fn despawn_clears_scene_entries() {
        let (mut engine, red, blue) = engine_with_two_marshals(30.0);
        engine.set_focus(Some(red));
        engine.despawn(red).unwrap();

        assert_eq!(engine.active().unwrap().scene().actors(), &[blue]);
        assert_eq!(engine.focus(), None);
        assert!(!engine.world().contains(red));
    }

    #[test]
    fn despawned_leader_and_selected_marshal_keep_frames_running() {
        let (mut engine, roster) = build_game(&GameConfig::default()).unwrap();
        engine.start().unwrap();

        let leader = engine.world().team_member(roster.ally, 0).unwrap();
        engine.despawn(leader).unwrap();
        engine.update(0.1, &InputState::new()).unwrap();

        let slot = engine.world().team_member(roster.ally, 0).unwrap();
        assert!(engine.world().is_null_monster(slot).unwrap());
        assert_eq!(engine.world().marshal(roster.ally).unwrap().speed(), 0.0);

        engine
            .world_mut()
            .set_world_position(roster.player, Vec3::new(8.0, 0.0, 0.0))
            .unwrap();
        let mut input = InputState::new();
        input.set(Action::Confirm, true);
        engine.update(0.1, &input).unwrap();
        let selected = |engine: &Engine| {
            engine
                .world()
                .get(roster.player)
                .unwrap()
                .as_player()
                .unwrap()
                .selected_marshal()
        };
        assert_eq!(selected(&engine), Some(roster.ally));

        engine.despawn(roster.ally).unwrap();
        input.end_frame();
        engine.update(0.1, &input).unwrap();

        assert_eq!(selected(&engine), None);
        let hud_text = engine.world().get(roster.hud_text).unwrap();
        assert_eq!(hud_text.as_text().unwrap().text, "");
    }

    #[test]
    fn despawned_combatant_leaves_the_battle_roster() {
        let (mut engine, red, blue) = engine_with_two_marshals(3.0);
        engine.start().unwrap();
        engine.update(0.016, &InputState::new()).unwrap();
        let ember = engine.world().team_member(red, 0).unwrap();

        engine.despawn(ember).unwrap();
        engine.update(0.016, &InputState::new()).unwrap();

        let world = engine.world();
        let battle = engine.active().unwrap().as_battle().unwrap();
        let team_one = battle.team_one().unwrap();
        assert!(world.is_null_monster(team_one[0]).unwrap());
        assert_eq!(world.team(red).unwrap(), team_one);
        assert_eq!(battle.turn_order(), &[world.team_member(blue, 0).unwrap()]);
        assert_eq!(
            battle.outcome(world).unwrap(),
            Some(crate::battle::BattleOutcome::TeamTwoWins)
        );
    }

    #[test]
    fn draw_and_end_use_the_active_scene() {
        let (mut engine, _, _) = engine_with_two_marshals(30.0);
        engine.start().unwrap();
        engine.update(0.016, &InputState::new()).unwrap();

        let mut recorder = FrameRecorder::new();
        engine.draw(&mut recorder).unwrap();
        assert_eq!(recorder.shapes.len(), 2);

        engine.end().unwrap();
        assert!(!engine.is_running());
        assert_eq!(
            engine.active().unwrap().scene().phase(),
            crate::scene::ScenePhase::Ended
        );
    }
}
