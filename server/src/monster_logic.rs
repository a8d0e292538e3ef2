use duskwold_common::{
    object::{MapId, ModelId, MovingFlags, ObjectId, RegionId},
    world_event::WorldEvent,
};
use nalgebra::Vector3;

use crate::{
    battle,
    config::MapConfig,
    map_state::{MapState, WorldWriter, WriterTarget},
    mover::{Mover, MoverKind, Vitals},
    object,
    region::{Region, RespawnerRegion},
    server_context::ServerContext,
    templates::MoverTemplate,
    tick::{self, Tick},
    util,
};

/// Radius of the chase loop: inside it the monster stops following and tries
/// to land hits.
const MELEE_CHASE_RANGE: f32 = 1.0;
/// Arrival gate checked again right before an attack lands. Intentionally
/// wider than the chase radius; shrinking either changes combat feel.
const MELEE_ARRIVAL_RANGE: f32 = 2.0;
const CHASE_SPEED_FACTOR: f32 = 2.0;
const NORMAL_SPEED_FACTOR: f32 = 1.0;
/// How long a corpse stays visible before the despawn, in seconds.
const DESPAWN_DELAY_SECS: u64 = 5;
const WANDER_DELAY_MIN_SECS: u64 = 15;
const WANDER_DELAY_MAX_SECS: u64 = 30;
const MELEE_MOTION: i32 = 29; // TODO: derive the motion from the template's attack kind

/// Build the configured respawner regions and fill them with monsters.
pub fn populate_monsters(
    map_config: &MapConfig,
    state: &mut MapState,
    ctx: &ServerContext,
    rng: &mut fastrand::Rng,
) {
    for (index, respawner) in map_config.respawners.iter().enumerate() {
        let region_id = RegionId(index as u32);
        let region = RespawnerRegion::new(
            Region::new(
                Vector3::from(respawner.middle),
                Vector3::from(respawner.north_east),
                Vector3::from(respawner.south_west),
            ),
            respawner.respawn_time,
        );
        for _ in 0..respawner.count {
            let monster =
                spawn_monster(ModelId(respawner.model_id), state.map_id, region_id, &region, ctx, rng);
            state.movers.insert(monster.id, monster);
        }
        state.regions.insert(region_id, region);
    }
}

/// A fresh monster slot: vitals seeded from the template, dropped at a
/// random point of its region, move timer armed to fire on the first tick.
pub fn spawn_monster(
    model_id: ModelId,
    map_id: MapId,
    region_id: RegionId,
    region: &RespawnerRegion,
    ctx: &ServerContext,
    rng: &mut fastrand::Rng,
) -> Mover {
    let template = ctx.mover_template(model_id);
    let position = region.random_position(rng);
    Mover {
        id: object::next_object_id(),
        model_id,
        map_id,
        region: Some(region_id),
        position,
        destination: position,
        angle: rng.i32(0..=360) as f32,
        moving_flags: MovingFlags::empty(),
        vitals: Vitals {
            hp: template.hp,
            mp: template.mp,
            strength: template.strength,
            stamina: template.stamina,
            intellect: template.intellect,
            dexterity: template.dexterity,
        },
        size: template.size + 100,
        speed_factor: NORMAL_SPEED_FACTOR,
        is_fighting: false,
        is_following: false,
        target: None,
        is_spawned: true,
        is_dead: false,
        move_timer: 0,
        attack_timer: 0,
        despawn_time: 0,
        respawn_time: 0,
        kind: MoverKind::Monster,
    }
}

/// One simulation frame for every monster on the map.
pub fn on_tick(
    tick: Tick,
    state: &mut MapState,
    ctx: &ServerContext,
    rng: &mut fastrand::Rng,
    writer: &mut WorldWriter,
) {
    let monster_ids = state
        .movers
        .values()
        .filter(|mover| mover.is_monster())
        .map(|mover| mover.id)
        .collect::<Vec<_>>();
    for object_id in monster_ids {
        update_monster(tick, object_id, state, ctx, rng, writer);
    }
}

fn update_monster(
    tick: Tick,
    object_id: ObjectId,
    state: &mut MapState,
    ctx: &ServerContext,
    rng: &mut fastrand::Rng,
    writer: &mut WorldWriter,
) {
    let Some(monster) = state.movers.get(&object_id) else { return };
    let model_id = monster.model_id;
    let region_id = monster.region;
    let is_dead = monster.is_dead;
    let hp = monster.vitals.hp;
    let is_fighting = monster.is_fighting;
    let target_id = monster.target;

    let template = ctx.mover_template(model_id);

    // The dead branch and the alive branch are mutually exclusive: a corpse
    // processes no movement and no fighting until it has respawned.
    if is_dead {
        let respawn_delay = region_id
            .and_then(|region_id| state.regions.get(&region_id))
            .map(|region| region.respawn_time())
            .unwrap_or(0);
        if let Some(monster) = state.movers.get_mut(&object_id) {
            check_respawn(tick, monster, respawn_delay, &template);
        }
        return;
    }

    if hp <= 0 {
        if let Some(monster) = state.movers.get_mut(&object_id) {
            die(tick, monster);
        }
        return;
    }

    // Snapshot of the target for this frame. The reference is only an id,
    // the mover behind it may have died or left since the last tick.
    let fight_target = if is_fighting {
        target_id
            .and_then(|target_id| state.movers.get(&target_id))
            .filter(|target| target.is_spawned && !target.is_dead)
            .map(|target| (target.id, target.position))
    } else {
        None
    };

    if is_fighting {
        process_fight(tick, object_id, fight_target, state, ctx, rng, writer);
    } else {
        process_moves(tick, object_id, state, rng, writer);
    }

    if let Some(monster) = state.movers.get_mut(&object_id) {
        integrate_movement(monster, &template, fight_target.map(|(_, position)| position));
    }
}

fn process_moves(
    tick: Tick,
    object_id: ObjectId,
    state: &mut MapState,
    rng: &mut fastrand::Rng,
    writer: &mut WorldWriter,
) {
    let (region_id, move_timer) = match state.movers.get(&object_id) {
        Some(monster) => (monster.region, monster.move_timer),
        None => return,
    };
    if move_timer > tick.seconds {
        return;
    }

    let Some(destination) = random_region_position(region_id, state, rng) else { return };
    let Some(monster) = state.movers.get_mut(&object_id) else { return };

    monster.move_timer = tick.seconds + rng.u64(WANDER_DELAY_MIN_SECS..=WANDER_DELAY_MAX_SECS);
    monster.destination = destination;
    monster.angle = util::angle_between(monster.position, destination);
    monster.moving_flags = MovingFlags::FORWARD;

    writer.tell(
        WriterTarget::All,
        WorldEvent::MoverMoved {
            object_id: monster.id,
            destination: monster.destination,
            angle: monster.angle,
            moving_flags: monster.moving_flags,
        },
    );
}

fn process_fight(
    tick: Tick,
    object_id: ObjectId,
    fight_target: Option<(ObjectId, Vector3<f32>)>,
    state: &mut MapState,
    ctx: &ServerContext,
    rng: &mut fastrand::Rng,
    writer: &mut WorldWriter,
) {
    match fight_target {
        Some((target_id, target_position)) => {
            let (position, speed_factor, attack_timer) = match state.movers.get(&object_id) {
                Some(monster) => (monster.position, monster.speed_factor, monster.attack_timer),
                None => return,
            };

            if speed_factor != CHASE_SPEED_FACTOR {
                if let Some(monster) = state.movers.get_mut(&object_id) {
                    monster.speed_factor = CHASE_SPEED_FACTOR;
                }
                writer.tell(
                    WriterTarget::All,
                    WorldEvent::MoverSpeed { object_id, speed_factor: CHASE_SPEED_FACTOR },
                );
            }

            if util::in_circle(position, target_position, MELEE_CHASE_RANGE) {
                if attack_timer < tick.millis {
                    fight(tick, object_id, target_id, target_position, state, ctx, rng, writer);
                }
            } else {
                writer.tell(
                    WriterTarget::All,
                    WorldEvent::MoverFollowing { object_id, target_id, range: MELEE_CHASE_RANGE },
                );
            }
        }
        None => {
            // The target died or left: drop straight back to wandering
            // instead of waiting out the move timer.
            let region_id = match state.movers.get(&object_id) {
                Some(monster) => monster.region,
                None => return,
            };
            let destination = random_region_position(region_id, state, rng);
            let Some(monster) = state.movers.get_mut(&object_id) else { return };

            monster.speed_factor = NORMAL_SPEED_FACTOR;
            writer.tell(
                WriterTarget::All,
                WorldEvent::MoverSpeed { object_id, speed_factor: NORMAL_SPEED_FACTOR },
            );
            monster.is_fighting = false;
            monster.is_following = false;
            monster.target = None;
            if let Some(destination) = destination {
                monster.destination = destination;
            }
            monster.moving_flags = MovingFlags::FORWARD;

            writer.tell(
                WriterTarget::All,
                WorldEvent::MoverMoved {
                    object_id,
                    destination: monster.destination,
                    angle: monster.angle,
                    moving_flags: monster.moving_flags,
                },
            );
        }
    }
}

fn fight(
    tick: Tick,
    object_id: ObjectId,
    target_id: ObjectId,
    target_position: Vector3<f32>,
    state: &mut MapState,
    ctx: &ServerContext,
    rng: &mut fastrand::Rng,
    writer: &mut WorldWriter,
) {
    let Some(attacker) = state.movers.get(&object_id) else { return };

    if util::in_circle(attacker.position, target_position, MELEE_ARRIVAL_RANGE) {
        let template = ctx.mover_template(attacker.model_id);
        let damages = match state.movers.get(&target_id) {
            Some(defender) => battle::melee_damage(attacker, defender, rng),
            None => return,
        };
        tracing::debug!(attacker = %template.name, target = target_id.0, damages, "Melee attack");

        let Some(monster) = state.movers.get_mut(&object_id) else { return };
        monster.attack_timer = tick.millis + template.re_attack_delay;

        writer.tell(
            WriterTarget::All,
            WorldEvent::MeleeAttack { object_id, motion: MELEE_MOTION, target_id },
        );
    } else {
        let Some(monster) = state.movers.get_mut(&object_id) else { return };
        monster.is_following = true;
        writer.tell(
            WriterTarget::All,
            WorldEvent::MoverFollowing { object_id, target_id, range: MELEE_CHASE_RANGE },
        );
    }
}

/// Alive with empty vitals means the combat-resolution layer killed this
/// mover since its last frame.
fn die(tick: Tick, monster: &mut Mover) {
    monster.is_dead = true;
    monster.is_fighting = false;
    monster.is_following = false;
    monster.target = None;
    monster.moving_flags = MovingFlags::empty();
    monster.despawn_time = tick.seconds + DESPAWN_DELAY_SECS;
}

/// Dead branch: hide the corpse once the despawn deadline passes, arm the
/// respawn deadline from the region, and later revive with template vitals.
fn check_respawn(tick: Tick, monster: &mut Mover, respawn_delay: u64, template: &MoverTemplate) {
    if monster.is_spawned {
        if monster.despawn_time <= tick.seconds {
            monster.respawn_time = tick.seconds + respawn_delay;
            monster.is_spawned = false;
        }
    } else if monster.respawn_time <= tick.seconds {
        monster.is_dead = false;
        monster.is_spawned = true;
        monster.vitals.hp = template.hp;
        monster.vitals.mp = template.mp;
    }
}

/// The shared mover update that runs after the branch dispatch: one movement
/// step toward the current goal.
fn integrate_movement(
    monster: &mut Mover,
    template: &MoverTemplate,
    target_position: Option<Vector3<f32>>,
) {
    let step = template.speed * monster.speed_factor * tick::TICK_INTERVAL.as_secs_f32();
    if let Some(target_position) = target_position {
        if !util::in_circle(monster.position, target_position, MELEE_CHASE_RANGE) {
            step_towards(monster, target_position, step);
        }
    } else if monster.moving_flags.contains(MovingFlags::FORWARD) {
        let destination = monster.destination;
        if step_towards(monster, destination, step) {
            monster.moving_flags = MovingFlags::empty();
        }
    }
}

/// Returns true once the goal is reached.
fn step_towards(monster: &mut Mover, goal: Vector3<f32>, step: f32) -> bool {
    let delta = goal - monster.position;
    let distance = delta.norm();
    if distance <= step {
        monster.position = goal;
        true
    } else {
        monster.position += delta * (step / distance);
        false
    }
}

fn random_region_position(
    region_id: Option<RegionId>,
    state: &MapState,
    rng: &mut fastrand::Rng,
) -> Option<Vector3<f32>> {
    let region = state.regions.get(&region_id?)?;
    Some(region.random_position(rng))
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Arc};

    use super::*;
    use crate::{
        config::RespawnerConfig,
        mover::PlayerState,
    };

    const WOLF: ModelId = ModelId(31);

    fn test_context() -> ServerContext {
        let template = MoverTemplate {
            name: "Fen Wolf".to_string(),
            level: 5,
            hp: 120,
            mp: 20,
            strength: 12,
            stamina: 9,
            intellect: 4,
            dexterity: 11,
            size: 20,
            speed: 2.5,
            natural_armor: 14.0,
            resist_magic: 7.0,
            re_attack_delay: 1500,
        };
        let mut templates = HashMap::new();
        templates.insert(WOLF, Arc::new(template));
        ServerContext::new(templates)
    }

    fn test_state(ctx: &ServerContext, rng: &mut fastrand::Rng) -> (MapState, ObjectId) {
        let map_config = MapConfig {
            id: 1,
            name: "Fenlands".to_string(),
            respawners: vec![RespawnerConfig {
                middle: [0.0, 0.0, 0.0],
                north_east: [10.0, 0.0, 10.0],
                south_west: [-10.0, 0.0, -10.0],
                respawn_time: 30,
                model_id: WOLF.0,
                count: 1,
            }],
        };
        let mut state = MapState::new(MapId(1));
        populate_monsters(&map_config, &mut state, ctx, rng);
        let monster_id = state.movers.values().next().unwrap().id;
        (state, monster_id)
    }

    fn enter_player(state: &mut MapState, position: Vector3<f32>) -> ObjectId {
        let id = object::next_object_id();
        let player = Mover::player(
            id,
            state.map_id,
            position,
            Vitals { hp: 200, mp: 50, ..Vitals::default() },
            PlayerState::default(),
        );
        state.movers.insert(id, player);
        id
    }

    fn moved_events(writer: &WorldWriter) -> usize {
        writer
            .events
            .iter()
            .filter(|(_, event)| matches!(event, WorldEvent::MoverMoved { .. }))
            .count()
    }

    fn speed_events(writer: &WorldWriter) -> Vec<f32> {
        writer
            .events
            .iter()
            .filter_map(|(_, event)| match event {
                WorldEvent::MoverSpeed { speed_factor, .. } => Some(*speed_factor),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn wandering_picks_a_destination_inside_the_region() {
        let ctx = test_context();
        let mut rng = fastrand::Rng::with_seed(3);
        let (mut state, monster_id) = test_state(&ctx, &mut rng);
        let mut writer = WorldWriter::new();

        on_tick(Tick::at(100, 100_000), &mut state, &ctx, &mut rng, &mut writer);

        let monster = &state.movers[&monster_id];
        assert!((-10.0..=10.0).contains(&monster.destination.x));
        assert!((-10.0..=10.0).contains(&monster.destination.z));
        assert!(monster.moving_flags.contains(MovingFlags::FORWARD));
        assert!((115..=130).contains(&monster.move_timer));
        assert_eq!(moved_events(&writer), 1);
    }

    #[test]
    fn wandering_waits_for_the_move_timer() {
        let ctx = test_context();
        let mut rng = fastrand::Rng::with_seed(3);
        let (mut state, monster_id) = test_state(&ctx, &mut rng);
        let mut writer = WorldWriter::new();

        on_tick(Tick::at(100, 100_000), &mut state, &ctx, &mut rng, &mut writer);
        let destination = state.movers[&monster_id].destination;
        writer.take_events();

        on_tick(Tick::at(105, 105_000), &mut state, &ctx, &mut rng, &mut writer);

        assert_eq!(state.movers[&monster_id].destination, destination);
        assert!(writer.events.is_empty());
    }

    #[test]
    fn losing_the_target_returns_to_wandering_immediately() {
        let ctx = test_context();
        let mut rng = fastrand::Rng::with_seed(5);
        let (mut state, monster_id) = test_state(&ctx, &mut rng);
        let mut writer = WorldWriter::new();

        {
            let monster = state.movers.get_mut(&monster_id).unwrap();
            monster.is_fighting = true;
            monster.target = Some(ObjectId(9999));
            monster.speed_factor = CHASE_SPEED_FACTOR;
            monster.move_timer = 1000;
        }

        on_tick(Tick::at(100, 100_000), &mut state, &ctx, &mut rng, &mut writer);

        let monster = &state.movers[&monster_id];
        assert!(!monster.is_fighting);
        assert!(!monster.is_following);
        assert_eq!(monster.target, None);
        assert_eq!(monster.speed_factor, NORMAL_SPEED_FACTOR);
        assert!(monster.moving_flags.contains(MovingFlags::FORWARD));
        assert!((-10.0..=10.0).contains(&monster.destination.x));
        assert_eq!(speed_events(&writer), vec![NORMAL_SPEED_FACTOR]);
        assert_eq!(moved_events(&writer), 1);
    }

    #[test]
    fn chasing_broadcasts_the_speed_change_once() {
        let ctx = test_context();
        let mut rng = fastrand::Rng::with_seed(5);
        let (mut state, monster_id) = test_state(&ctx, &mut rng);
        let player_id = enter_player(&mut state, Vector3::new(50.0, 0.0, 0.0));
        let mut writer = WorldWriter::new();

        {
            let monster = state.movers.get_mut(&monster_id).unwrap();
            monster.position = Vector3::zeros();
            monster.is_fighting = true;
            monster.target = Some(player_id);
        }

        on_tick(Tick::at(100, 100_000), &mut state, &ctx, &mut rng, &mut writer);
        assert_eq!(speed_events(&writer), vec![CHASE_SPEED_FACTOR]);
        let follows = writer
            .events
            .iter()
            .filter(|(_, event)| matches!(event, WorldEvent::MoverFollowing { .. }))
            .count();
        assert_eq!(follows, 1);
        writer.take_events();

        on_tick(Tick::at(100, 100_100), &mut state, &ctx, &mut rng, &mut writer);
        assert!(speed_events(&writer).is_empty());
        let monster = &state.movers[&monster_id];
        // chasing at double speed, one step per frame
        assert!(monster.position.x > 0.0);
    }

    #[test]
    fn attacking_in_range_rearms_the_cooldown_and_broadcasts_the_motion() {
        let ctx = test_context();
        let mut rng = fastrand::Rng::with_seed(5);
        let (mut state, monster_id) = test_state(&ctx, &mut rng);
        let player_id = enter_player(&mut state, Vector3::new(0.5, 0.0, 0.5));
        let mut writer = WorldWriter::new();

        {
            let monster = state.movers.get_mut(&monster_id).unwrap();
            monster.position = Vector3::zeros();
            monster.is_fighting = true;
            monster.target = Some(player_id);
        }

        on_tick(Tick::at(100, 100_000), &mut state, &ctx, &mut rng, &mut writer);

        let monster = &state.movers[&monster_id];
        assert_eq!(monster.attack_timer, 100_000 + 1500);
        let attack = writer
            .events
            .iter()
            .find(|(_, event)| matches!(event, WorldEvent::MeleeAttack { .. }));
        match attack {
            Some((_, WorldEvent::MeleeAttack { motion, target_id, .. })) => {
                assert_eq!(*motion, MELEE_MOTION);
                assert_eq!(*target_id, player_id);
            }
            _ => panic!("expected a melee attack event"),
        }
        // damage is resolved by the combat-resolution layer, not here
        assert_eq!(state.movers[&player_id].vitals.hp, 200);
    }

    #[test]
    fn attack_cooldown_holds_back_the_next_swing() {
        let ctx = test_context();
        let mut rng = fastrand::Rng::with_seed(5);
        let (mut state, monster_id) = test_state(&ctx, &mut rng);
        let player_id = enter_player(&mut state, Vector3::new(0.5, 0.0, 0.5));
        let mut writer = WorldWriter::new();

        {
            let monster = state.movers.get_mut(&monster_id).unwrap();
            monster.position = Vector3::zeros();
            monster.is_fighting = true;
            monster.target = Some(player_id);
        }

        on_tick(Tick::at(100, 100_000), &mut state, &ctx, &mut rng, &mut writer);
        writer.take_events();
        on_tick(Tick::at(100, 100_100), &mut state, &ctx, &mut rng, &mut writer);

        let attacks = writer
            .events
            .iter()
            .filter(|(_, event)| matches!(event, WorldEvent::MeleeAttack { .. }))
            .count();
        assert_eq!(attacks, 0);
    }

    #[test]
    fn outside_melee_range_the_monster_keeps_following() {
        let ctx = test_context();
        let mut rng = fastrand::Rng::with_seed(5);
        let (mut state, monster_id) = test_state(&ctx, &mut rng);
        let player_id = enter_player(&mut state, Vector3::new(1.5, 0.0, 0.0));
        let mut writer = WorldWriter::new();

        {
            let monster = state.movers.get_mut(&monster_id).unwrap();
            monster.position = Vector3::zeros();
            monster.is_fighting = true;
            monster.target = Some(player_id);
        }

        on_tick(Tick::at(100, 100_000), &mut state, &ctx, &mut rng, &mut writer);

        let follow = writer
            .events
            .iter()
            .find(|(_, event)| matches!(event, WorldEvent::MoverFollowing { .. }));
        match follow {
            Some((_, WorldEvent::MoverFollowing { range, target_id, .. })) => {
                assert_eq!(*range, MELEE_CHASE_RANGE);
                assert_eq!(*target_id, player_id);
            }
            _ => panic!("expected a follow event"),
        }
        assert_eq!(state.movers[&monster_id].attack_timer, 0);
    }

    #[test]
    fn death_despawn_and_respawn_follow_the_deadlines() {
        let ctx = test_context();
        let mut rng = fastrand::Rng::with_seed(9);
        let (mut state, monster_id) = test_state(&ctx, &mut rng);
        let mut writer = WorldWriter::new();

        state.movers.get_mut(&monster_id).unwrap().vitals.hp = 0;

        // empty vitals are noticed on the next frame
        on_tick(Tick::at(100, 100_000), &mut state, &ctx, &mut rng, &mut writer);
        let monster = &state.movers[&monster_id];
        assert!(monster.is_dead);
        assert!(monster.is_spawned);
        assert_eq!(monster.despawn_time, 105);

        // the corpse sits through the grace period untouched
        writer.take_events();
        on_tick(Tick::at(104, 104_000), &mut state, &ctx, &mut rng, &mut writer);
        let monster = &state.movers[&monster_id];
        assert!(monster.is_dead && monster.is_spawned);
        assert!(writer.events.is_empty());

        // despawn hides it and arms the region's respawn delay
        on_tick(Tick::at(105, 105_000), &mut state, &ctx, &mut rng, &mut writer);
        let monster = &state.movers[&monster_id];
        assert!(monster.is_dead);
        assert!(!monster.is_spawned);
        assert_eq!(monster.respawn_time, 135);

        // still hidden one frame before the deadline
        on_tick(Tick::at(134, 134_000), &mut state, &ctx, &mut rng, &mut writer);
        assert!(!state.movers[&monster_id].is_spawned);

        // revival restores the template vitals
        on_tick(Tick::at(135, 135_000), &mut state, &ctx, &mut rng, &mut writer);
        let monster = &state.movers[&monster_id];
        assert!(!monster.is_dead);
        assert!(monster.is_spawned);
        assert_eq!(monster.vitals.hp, 120);
        assert_eq!(monster.vitals.mp, 20);
    }

    #[test]
    fn dead_monsters_skip_movement_and_fighting() {
        let ctx = test_context();
        let mut rng = fastrand::Rng::with_seed(9);
        let (mut state, monster_id) = test_state(&ctx, &mut rng);
        let player_id = enter_player(&mut state, Vector3::new(0.5, 0.0, 0.5));
        let mut writer = WorldWriter::new();

        {
            let monster = state.movers.get_mut(&monster_id).unwrap();
            monster.vitals.hp = 0;
            monster.is_fighting = true;
            monster.target = Some(player_id);
        }

        on_tick(Tick::at(100, 100_000), &mut state, &ctx, &mut rng, &mut writer);
        let position = state.movers[&monster_id].position;
        writer.take_events();

        on_tick(Tick::at(101, 101_000), &mut state, &ctx, &mut rng, &mut writer);

        let monster = &state.movers[&monster_id];
        assert!(monster.is_dead);
        assert_eq!(monster.position, position);
        assert_eq!(monster.attack_timer, 0);
        assert!(writer.events.is_empty());
    }
}
