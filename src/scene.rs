// Scene module for Falsebound

use log::{debug, info, trace};

use crate::actor::ActorKind;
use crate::error::{GameError, Result};
use crate::input::InputState;
use crate::marshal::{self, Team};
use crate::render::{DrawRequest, Renderer, TextRequest};
use crate::world::{ActorId, World};
use crate::{hud, player};

/// Lifecycle of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenePhase {
    Created,
    Started,
    Running,
    Ended,
}

/// Something an actor asks the engine to do after the frame's update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneRequest {
    /// Switch to the battle scene with these two teams.
    Battle { team_one: Team, team_two: Team },
}

/// Per-frame state shared with actor hooks.
#[derive(Debug)]
pub struct FrameContext<'a> {
    input: &'a InputState,
    in_battle: bool,
    requests: Vec<SceneRequest>,
}

impl<'a> FrameContext<'a> {
    pub fn new(input: &'a InputState, in_battle: bool) -> Self {
        Self {
            input,
            in_battle,
            requests: Vec::new(),
        }
    }

    pub fn input(&self) -> &InputState {
        self.input
    }

    /// Whether the scene being updated is a battle.
    pub fn in_battle(&self) -> bool {
        self.in_battle
    }

    pub fn request(&mut self, request: SceneRequest) {
        self.requests.push(request);
    }

    pub fn requests(&self) -> &[SceneRequest] {
        &self.requests
    }

    pub fn into_requests(self) -> Vec<SceneRequest> {
        self.requests
    }
}

#[derive(Clone, Copy)]
enum Behavior {
    Inert,
    Player,
    Marshal,
    Hud,
}

fn behavior(world: &World, id: ActorId) -> Result<Behavior> {
    Ok(match world.get(id)?.kind {
        ActorKind::Player(_) => Behavior::Player,
        ActorKind::Marshal(_) => Behavior::Marshal,
        ActorKind::Hud(_) => Behavior::Hud,
        ActorKind::Prop | ActorKind::Monster(_) | ActorKind::Text(_) => Behavior::Inert,
    })
}

/// Run the one-time start hook if the actor has not had it yet.
fn start_actor(world: &mut World, id: ActorId) -> Result<()> {
    let actor = world.get_mut(id)?;
    if !actor.started {
        actor.started = true;
        debug!("actor {} ({}) started", id, actor.name);
    }
    Ok(())
}

fn update_actor(
    world: &mut World,
    id: ActorId,
    delta_time: f32,
    ctx: &FrameContext<'_>,
) -> Result<()> {
    match behavior(world, id)? {
        Behavior::Player => player::update(world, id, delta_time, ctx.input()),
        Behavior::Marshal => marshal::update(world, id, delta_time),
        Behavior::Hud => hud::update(world, id),
        Behavior::Inert => Ok(()),
    }
}

fn on_collision(
    world: &mut World,
    id: ActorId,
    other: ActorId,
    ctx: &mut FrameContext<'_>,
) -> Result<()> {
    match behavior(world, id)? {
        Behavior::Player => player::on_collision(world, id, other, ctx),
        Behavior::Marshal => marshal::on_collision(world, id, other, ctx),
        Behavior::Hud | Behavior::Inert => Ok(()),
    }
}

fn draw_actor(world: &World, id: ActorId, renderer: &mut dyn Renderer) -> Result<()> {
    let actor = world.get(id)?;
    if let ActorKind::Text(text) = &actor.kind {
        renderer.draw_text(TextRequest {
            actor: id,
            position: actor.transform.position,
            text: text.text.clone(),
            font_size: text.font_size,
            color: actor.color,
        });
        return Ok(());
    }
    if let Some(shape) = actor.shape {
        let transform = world.world_transform(id)?;
        renderer.draw_shape(DrawRequest {
            actor: id,
            position: transform.position,
            rotation: transform.rotation,
            scale: transform.scale,
            shape,
            color: actor.color,
        });
    }
    Ok(())
}

/// An ordered set of actor handles, plus UI elements that never collide.
#[derive(Debug, Clone)]
pub struct Scene {
    name: String,
    phase: ScenePhase,
    actors: Vec<ActorId>,
    ui_elements: Vec<ActorId>,
}

impl Scene {
    /// Creates a new, empty scene.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phase: ScenePhase::Created,
            actors: Vec::new(),
            ui_elements: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phase(&self) -> ScenePhase {
        self.phase
    }

    pub fn actors(&self) -> &[ActorId] {
        &self.actors
    }

    pub fn ui_elements(&self) -> &[ActorId] {
        &self.ui_elements
    }

    pub fn contains(&self, id: ActorId) -> bool {
        self.actors.contains(&id)
    }

    pub fn start(&mut self) {
        if self.phase == ScenePhase::Created {
            self.phase = ScenePhase::Started;
            info!("scene {} started", self.name);
        }
    }

    /// Advance every actor one frame, then test it against every other
    /// actor. Both orderings of a touching pair fire their own hook.
    pub fn update(
        &mut self,
        world: &mut World,
        delta_time: f32,
        ctx: &mut FrameContext<'_>,
    ) -> Result<()> {
        self.enter_running()?;
        for i in 0..self.actors.len() {
            let id = self.actors[i];
            start_actor(world, id)?;
            update_actor(world, id, delta_time, ctx)?;

            if world.get(id)?.collider().is_none() {
                continue;
            }
            for j in 0..self.actors.len() {
                let other = self.actors[j];
                if i == j || world.get(other)?.collider().is_none() {
                    continue;
                }
                if world.check_for_collision(id, other)? {
                    trace!("{} touches {}", id, other);
                    on_collision(world, id, other, ctx)?;
                }
            }
        }
        Ok(())
    }

    /// Like [`Scene::update`] for UI elements, without collision tests.
    pub fn update_ui(
        &mut self,
        world: &mut World,
        delta_time: f32,
        ctx: &mut FrameContext<'_>,
    ) -> Result<()> {
        self.enter_running()?;
        for i in 0..self.ui_elements.len() {
            let id = self.ui_elements[i];
            start_actor(world, id)?;
            update_actor(world, id, delta_time, ctx)?;
        }
        Ok(())
    }

    fn enter_running(&mut self) -> Result<()> {
        match self.phase {
            ScenePhase::Ended => return Err(GameError::SceneEnded),
            ScenePhase::Created => self.start(),
            ScenePhase::Started | ScenePhase::Running => {}
        }
        self.phase = ScenePhase::Running;
        Ok(())
    }

    /// Calls the draw for every actor within the scene.
    pub fn draw(&self, world: &World, renderer: &mut dyn Renderer) -> Result<()> {
        for &id in &self.actors {
            draw_actor(world, id, renderer)?;
        }
        Ok(())
    }

    pub fn draw_ui(&self, world: &World, renderer: &mut dyn Renderer) -> Result<()> {
        for &id in &self.ui_elements {
            draw_actor(world, id, renderer)?;
        }
        Ok(())
    }

    pub fn end(&mut self, world: &World) {
        if self.phase == ScenePhase::Ended {
            return;
        }
        for id in self.actors.iter().chain(&self.ui_elements) {
            if let Ok(actor) = world.get(*id) {
                debug!("actor {} ({}) ended", id, actor.name);
            }
        }
        self.phase = ScenePhase::Ended;
        info!("scene {} ended", self.name);
    }

    /// Append an actor, then each of its descendants, depth first.
    pub fn add_actor(&mut self, world: &World, id: ActorId) -> Result<()> {
        let children = world.children(id)?.to_vec();
        self.actors.push(id);
        for child in children {
            self.add_actor(world, child)?;
        }
        Ok(())
    }

    pub fn add_ui_element(&mut self, id: ActorId) {
        self.ui_elements.push(id);
    }

    /// Remove the first entry for `id`. Reports whether one was found.
    pub fn remove_actor(&mut self, id: ActorId) -> bool {
        match self.actors.iter().position(|actor| *actor == id) {
            Some(index) => {
                self.actors.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn remove_ui_element(&mut self, id: ActorId) -> bool {
        match self.ui_elements.iter().position(|element| *element == id) {
            Some(index) => {
                self.ui_elements.remove(index);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{Actor, Shape};
    use crate::collider::Collider;
    use crate::combat::Monster;
    use crate::math::{Vec3, Vec4};
    use crate::render::FrameRecorder;

    fn run_frame(scene: &mut Scene, world: &mut World, dt: f32) -> Vec<SceneRequest> {
        let input = InputState::new();
        let mut ctx = FrameContext::new(&input, false);
        scene.update(world, dt, &mut ctx).unwrap();
        ctx.into_requests()
    }

    fn marshal_at(world: &mut World, position: Vec3, speed: f32) -> ActorId {
        let marshal = world.spawn_marshal("Marshal", position);
        let leader = world.spawn_monster("Leader", Vec3::ZERO, Monster::new(5, 1, 0, 1, speed));
        world.add_team_member(marshal, leader, 0).unwrap();
        world.set_collider(marshal, Collider::sphere(2.0)).unwrap();
        marshal
    }

    #[test]
    fn lifecycle_runs_created_started_running_ended() {
        let mut world = World::new();
        let mut scene = Scene::new("overworld");
        assert_eq!(scene.phase(), ScenePhase::Created);
        scene.start();
        assert_eq!(scene.phase(), ScenePhase::Started);
        run_frame(&mut scene, &mut world, 0.016);
        assert_eq!(scene.phase(), ScenePhase::Running);
        scene.end(&world);
        assert_eq!(scene.phase(), ScenePhase::Ended);

        let input = InputState::new();
        let mut ctx = FrameContext::new(&input, false);
        assert_eq!(scene.update(&mut world, 0.016, &mut ctx), Err(GameError::SceneEnded));
    }

    #[test]
    fn actors_start_once_on_first_update() {
        let mut world = World::new();
        let mut scene = Scene::new("s");
        let id = world.spawn(Actor::new("a", Vec3::ZERO));
        scene.add_actor(&world, id).unwrap();
        assert!(!world.get(id).unwrap().started());

        run_frame(&mut scene, &mut world, 0.1);
        assert!(world.get(id).unwrap().started());
        run_frame(&mut scene, &mut world, 0.1);
        assert!(world.get(id).unwrap().started());
    }

    #[test]
    fn adding_a_parent_registers_its_children() {
        let mut world = World::new();
        let parent = world.spawn(Actor::new("parent", Vec3::ZERO));
        let child = world.spawn(Actor::new("child", Vec3::ZERO));
        let grandchild = world.spawn(Actor::new("grandchild", Vec3::ZERO));
        world.add_child(parent, child).unwrap();
        world.add_child(child, grandchild).unwrap();

        let mut scene = Scene::new("s");
        scene.add_actor(&world, parent).unwrap();

        assert_eq!(scene.actors(), &[parent, child, grandchild]);
    }

    #[test]
    fn add_then_remove_restores_length() {
        let mut world = World::new();
        let mut scene = Scene::new("s");
        let a = world.spawn(Actor::new("a", Vec3::ZERO));
        let b = world.spawn(Actor::new("b", Vec3::ZERO));
        scene.add_actor(&world, a).unwrap();
        let before = scene.actors().len();

        scene.add_actor(&world, b).unwrap();
        assert!(scene.remove_actor(b));
        assert_eq!(scene.actors().len(), before);
        assert!(!scene.remove_actor(b));
        // Removing from the scene does not touch the child links.
        assert!(world.contains(b));
    }

    #[test]
    fn removal_is_by_identity_not_value() {
        let mut world = World::new();
        let mut scene = Scene::new("s");
        let a = world.spawn(Actor::new("twin", Vec3::ZERO));
        let b = world.spawn(Actor::new("twin", Vec3::ZERO));
        scene.add_actor(&world, a).unwrap();
        scene.add_actor(&world, b).unwrap();

        assert!(scene.remove_actor(b));
        assert_eq!(scene.actors(), &[a]);
    }

    #[test]
    fn touching_marshals_fire_both_orderings() {
        let mut world = World::new();
        let mut scene = Scene::new("field");
        let red = marshal_at(&mut world, Vec3::ZERO, 0.0);
        let blue = marshal_at(&mut world, Vec3::new(3.0, 0.0, 0.0), 0.0);
        scene.add_actor(&world, red).unwrap();
        scene.add_actor(&world, blue).unwrap();

        let requests = run_frame(&mut scene, &mut world, 0.1);

        assert_eq!(
            requests,
            vec![
                SceneRequest::Battle {
                    team_one: world.team(red).unwrap(),
                    team_two: world.team(blue).unwrap(),
                },
                SceneRequest::Battle {
                    team_one: world.team(blue).unwrap(),
                    team_two: world.team(red).unwrap(),
                },
            ]
        );

        // Contact is not remembered: the next frame fires again.
        assert_eq!(run_frame(&mut scene, &mut world, 0.1).len(), 2);
    }

    #[test]
    fn no_battle_requests_inside_a_battle() {
        let mut world = World::new();
        let mut scene = Scene::new("battle");
        let red = marshal_at(&mut world, Vec3::ZERO, 0.0);
        let blue = marshal_at(&mut world, Vec3::new(1.0, 0.0, 0.0), 0.0);
        scene.add_actor(&world, red).unwrap();
        scene.add_actor(&world, blue).unwrap();

        let input = InputState::new();
        let mut ctx = FrameContext::new(&input, true);
        scene.update(&mut world, 0.1, &mut ctx).unwrap();
        assert!(ctx.requests().is_empty());
    }

    #[test]
    fn update_precedes_collision_within_a_frame() {
        let mut world = World::new();
        let mut scene = Scene::new("field");
        let walker = marshal_at(&mut world, Vec3::new(-10.0, 0.0, 0.0), 6.0);
        let sitter = marshal_at(&mut world, Vec3::new(0.0, 0.0, 0.0), 0.0);
        world.set_destination(walker, Vec3::ZERO).unwrap();
        scene.add_actor(&world, walker).unwrap();
        scene.add_actor(&world, sitter).unwrap();

        // 10 apart with radii 2 + 2: out of reach until the walker moves 6.
        let requests = run_frame(&mut scene, &mut world, 1.0);
        assert_eq!(requests.len(), 2);
    }

    #[test]
    fn actors_without_colliders_never_collide() {
        let mut world = World::new();
        let mut scene = Scene::new("field");
        let red = marshal_at(&mut world, Vec3::ZERO, 0.0);
        let ghost = world.spawn_marshal("Ghost", Vec3::ZERO);
        scene.add_actor(&world, red).unwrap();
        scene.add_actor(&world, ghost).unwrap();

        assert!(run_frame(&mut scene, &mut world, 0.1).is_empty());
    }

    #[test]
    fn draw_emits_world_space_requests_in_order() {
        let mut world = World::new();
        let mut scene = Scene::new("s");
        let parent = world.spawn(
            Actor::new("parent", Vec3::new(1.0, 0.0, 0.0))
                .with_color(Vec4::new(0.0, 1.0, 0.0, 1.0)),
        );
        let child = world.spawn(
            Actor::new("child", Vec3::new(0.0, 2.0, 0.0)).with_shape(Some(Shape::Sphere)),
        );
        let hidden = world.spawn(Actor::new("hidden", Vec3::ZERO).with_shape(None));
        world.add_child(parent, child).unwrap();
        scene.add_actor(&world, parent).unwrap();
        scene.add_actor(&world, hidden).unwrap();
        let (hud, text) = world.spawn_hud(parent);
        scene.add_ui_element(hud);
        scene.add_ui_element(text);

        let mut recorder = FrameRecorder::new();
        scene.draw(&world, &mut recorder).unwrap();
        scene.draw_ui(&world, &mut recorder).unwrap();

        assert_eq!(recorder.shapes.len(), 2);
        assert_eq!(recorder.shapes[0].actor, parent);
        assert_eq!(recorder.shapes[0].color, Vec4::new(0.0, 1.0, 0.0, 1.0));
        assert_eq!(recorder.shapes[1].shape, Shape::Sphere);
        assert!(recorder.shapes[1].position.abs_diff_eq(Vec3::new(1.0, 2.0, 0.0), 1.0e-6));
        assert_eq!(recorder.texts.len(), 1);
        assert_eq!(recorder.texts[0].actor, text);
    }

    #[test]
    fn ui_elements_update_but_never_collide() {
        let mut world = World::new();
        let mut scene = Scene::new("s");
        let a = marshal_at(&mut world, Vec3::ZERO, 0.0);
        let b = marshal_at(&mut world, Vec3::ZERO, 0.0);
        scene.add_ui_element(a);
        scene.add_ui_element(b);

        let input = InputState::new();
        let mut ctx = FrameContext::new(&input, false);
        scene.update_ui(&mut world, 0.1, &mut ctx).unwrap();

        assert!(ctx.requests().is_empty());
        assert!(world.get(a).unwrap().started());
    }
}
