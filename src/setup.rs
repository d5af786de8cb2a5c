// The starting field: the player, two marshals and their teams.

use log::info;

use crate::actor::{Actor, Color, Shape};
use crate::battle::BattleScene;
use crate::collider::Collider;
use crate::combat::Monster;
use crate::config::GameConfig;
use crate::engine::{Engine, SceneSlot};
use crate::error::Result;
use crate::marshal::Team;
use crate::math::{Vec3, Vec4};
use crate::scene::Scene;
use crate::world::{ActorId, World};

pub const PLAYER_COLOR: Color = Vec4::new(0.0, 0.78, 0.0, 1.0);
pub const MARSHAL_COLOR: Color = Vec4::new(0.0, 0.0, 1.0, 1.0);
pub const ALLY_COLOR: Color = Vec4::new(0.2, 0.6, 1.0, 1.0);
pub const ENEMY_COLOR: Color = Vec4::new(0.9, 0.2, 0.2, 1.0);

/// Name and stats of a starting team member.
struct Recruit {
    name: &'static str,
    max_health: i32,
    attack_power: i32,
    defense: i32,
    actions: u32,
    speed: f32,
}

const fn recruit(
    name: &'static str,
    max_health: i32,
    attack_power: i32,
    defense: i32,
    actions: u32,
    speed: f32,
) -> Recruit {
    Recruit {
        name,
        max_health,
        attack_power,
        defense,
        actions,
        speed,
    }
}

const ALLY_TEAM: [Recruit; 3] = [
    recruit("Ember", 30, 8, 2, 2, 6.0),
    recruit("Bramble", 40, 5, 4, 1, 4.0),
    recruit("Gale", 24, 7, 1, 3, 8.0),
];

const ENEMY_TEAM: [Recruit; 3] = [
    recruit("Shade", 28, 7, 2, 2, 5.0),
    recruit("Tusk", 45, 6, 5, 1, 3.0),
    recruit("Wisp", 20, 9, 0, 3, 9.0),
];

/// Handles to the actors the host cares about.
#[derive(Debug, Clone, Copy)]
pub struct Roster {
    pub player: ActorId,
    pub hand: ActorId,
    pub ally: ActorId,
    pub enemy: ActorId,
    pub hud_text: ActorId,
}

fn recruit_team(
    world: &mut World,
    marshal: ActorId,
    recruits: &[Recruit; 3],
    color: Color,
) -> Result<Team> {
    for (slot, recruit) in recruits.iter().enumerate() {
        let monster = world.spawn_monster(
            recruit.name,
            Vec3::ZERO,
            Monster::new(
                recruit.max_health,
                recruit.attack_power,
                recruit.defense,
                recruit.actions,
                recruit.speed,
            ),
        );
        world.get_mut(monster)?.color = color;
        world.add_team_member(marshal, monster, slot)?;
    }
    world.team(marshal)
}

fn spawn_field_marshal(
    world: &mut World,
    name: &str,
    position: Vec3,
    radius: f32,
) -> Result<ActorId> {
    let marshal = world.spawn_marshal(name, position);
    world.set_scale(marshal, Vec3::splat(2.0))?;
    world.get_mut(marshal)?.color = MARSHAL_COLOR;
    world.set_collider(marshal, Collider::sphere(radius))?;
    Ok(marshal)
}

/// Build the overworld and battle scenes. The overworld is active.
pub fn build_game(config: &GameConfig) -> Result<(Engine, Roster)> {
    let mut world = World::new();

    let player = world.spawn_player("Player", Vec3::ZERO, config.player_speed);
    world.get_mut(player)?.color = PLAYER_COLOR;
    world.set_collider(player, Collider::sphere(config.player_collider_radius))?;

    let hand = world.spawn(
        Actor::new("Hand", Vec3::new(0.0, 20.0, 0.0))
            .with_shape(Some(Shape::Sphere))
            .with_color(PLAYER_COLOR),
    );
    world.add_child(player, hand)?;

    let ally = spawn_field_marshal(
        &mut world,
        "Marshal",
        Vec3::new(10.0, 0.0, 0.0),
        config.marshal_collider_radius,
    )?;
    recruit_team(&mut world, ally, &ALLY_TEAM, ALLY_COLOR)?;
    let enemy = spawn_field_marshal(
        &mut world,
        "Enemy Marshal",
        Vec3::new(-10.0, 0.0, 20.0),
        config.marshal_collider_radius,
    )?;
    recruit_team(&mut world, enemy, &ENEMY_TEAM, ENEMY_COLOR)?;

    let (hud, hud_text) = world.spawn_hud(player);

    let mut engine = Engine::new(world);
    let overworld = engine.add_scene(SceneSlot::Field(Scene::new("overworld")));
    let battle = engine.add_scene(SceneSlot::Battle(BattleScene::new("battle")));

    engine.add_actor(overworld, player)?;
    engine.add_actor(overworld, ally)?;
    engine.add_actor(overworld, enemy)?;
    let overworld_scene = engine.scene_mut(overworld)?.scene_mut();
    overworld_scene.add_ui_element(hud);
    overworld_scene.add_ui_element(hud_text);

    engine.add_actor(battle, player)?;

    engine.set_active_scene(overworld)?;
    engine.set_focus(Some(player));
    info!("field ready with {} actors", engine.world().len());

    Ok((
        engine,
        Roster {
            player,
            hand,
            ally,
            enemy,
            hud_text,
        },
    ))
}
