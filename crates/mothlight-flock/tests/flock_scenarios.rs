//! Whole-flock behaviour driven through the controller and an in-memory world.

use glam::Vec3;
use mothlight_common::{FlockError, LampId, MothId, Pose};
use mothlight_flock::prelude::*;
use proptest::prelude::*;

const DT: f32 = 1.0 / 60.0;

fn seek_only_config() -> FlockConfig {
    FlockConfig {
        headlight_on_at_start: true,
        ..FlockConfig::default()
    }
}

fn run(flock: &mut FlockController, world: &SimWorld, ticks: usize) {
    for _ in 0..ticks {
        flock.tick(world, TickInput::new(DT)).expect("tick");
    }
}

// ============================================================================
// Example level
// ============================================================================

#[test]
fn test_three_moths_seek_then_orbit_after_dwell() {
    let lamp = Vec3::new(0.0, 0.0, 10.0);
    let mut world = SimWorld::with_player(Vec3::ZERO);
    world.add_moth(lamp + Vec3::new(0.0, 0.0, 5.0));
    world.add_moth(lamp - Vec3::new(0.0, 0.0, 5.0));
    world.add_moth(lamp + Vec3::new(0.0, 5.0, 0.0));
    world.add_lamp(lamp);

    let config = FlockConfig {
        min_seek_time_before_orbit: 0.6,
        orbit_enter_radius: 1.5,
        seek_speed: 8.0,
        seek_smooth_time: 0.01,
        allow_immediate_orbit_if_very_close: false,
        ..seek_only_config()
    };
    let mut flock = FlockController::new(&world, config.clone(), 11).expect("player present");

    let mut closed_at = [None; 3];
    let mut orbit_at = [None; 3];
    let mut elapsed = 0.0_f32;

    for _ in 0..60 {
        flock.tick(&world, TickInput::new(DT)).expect("tick");
        elapsed += DT;

        for (i, moth) in flock.moths().iter().enumerate() {
            let dist = moth.position().distance(lamp);
            if closed_at[i].is_none() && dist <= config.orbit_enter_radius {
                closed_at[i] = Some(elapsed);
            }
            if orbit_at[i].is_none() {
                if let Some(orbit) = moth.orbit() {
                    orbit_at[i] = Some(elapsed);
                    assert!((config.orbit_min_radius..=config.orbit_max_radius).contains(&orbit.radius));
                }
            }
        }
    }

    for i in 0..3 {
        let closed = closed_at[i].expect("moth closed on the lamp");
        let orbited = orbit_at[i].expect("moth entered orbit");
        assert!(closed < 0.6, "moth {i} closed at {closed}");
        assert!(orbited >= 0.6 - 1e-3, "moth {i} orbited early at {orbited}");
        assert!(orbited <= 0.7, "moth {i} orbited late at {orbited}");
    }
    assert_eq!(flock.follower_count(), 0);
}

// ============================================================================
// Invariants
// ============================================================================

proptest! {
    #[test]
    fn prop_followers_and_states_stay_consistent(
        moths in prop::collection::vec((-8.0f32..8.0, -3.0f32..3.0, -20.0f32..20.0), 1..6),
        lamps in prop::collection::vec((-8.0f32..8.0, 0.0f32..4.0, -20.0f32..20.0), 0..3),
        toggles in prop::collection::vec(any::<bool>(), 40),
        seed in any::<u64>(),
    ) {
        let mut world = SimWorld::with_player(Vec3::ZERO);
        for (x, y, z) in moths {
            world.add_moth(Vec3::new(x, y, z));
        }
        for (x, y, z) in lamps {
            world.add_lamp(Vec3::new(x, y, z));
        }
        let mut flock = FlockController::new(&world, FlockConfig::default(), seed).expect("player present");

        for (i, press) in toggles.into_iter().enumerate() {
            world.set_player_position(Vec3::new(0.0, 0.0, i as f32 * 0.1));
            let input = if press { TickInput::new(DT).with_toggle() } else { TickInput::new(DT) };
            flock.tick(&world, input).expect("tick");

            if flock.headlight_on() {
                prop_assert_eq!(flock.follower_count(), 0);
            }
            for moth in flock.moths().iter() {
                let following = flock.followers().contains(&moth.id());
                prop_assert_eq!(following, *moth.state() == MotionState::FollowingLine);
                prop_assert_eq!(moth.orbit().is_some(), matches!(moth.state(), MotionState::Orbiting(_)));
                if moth.orbit().is_some() {
                    prop_assert!(moth.seek_target().is_some());
                }
            }
        }
    }

    #[test]
    fn prop_no_orbit_before_dwell(
        start in 2.0f32..20.0,
        hz in 30u32..144,
        seed in any::<u64>(),
    ) {
        let dt = 1.0 / hz as f32;
        let config = FlockConfig {
            allow_immediate_orbit_if_very_close: false,
            ..seek_only_config()
        };
        let mut world = SimWorld::with_player(Vec3::new(0.0, 0.0, -100.0));
        world.add_moth(Vec3::new(0.0, 0.0, start));
        world.add_lamp(Vec3::ZERO);
        let mut flock = FlockController::new(&world, config.clone(), seed).expect("player present");

        let mut seeking_for = 0.0_f32;
        for _ in 0..(hz * 4) {
            flock.tick(&world, TickInput::new(dt)).expect("tick");
            let moth = flock.moth(MothId::new(0)).expect("moth");
            if moth.orbit().is_some() {
                prop_assert!(seeking_for >= config.min_seek_time_before_orbit - 1e-3);
                break;
            }
            seeking_for += dt;
        }
    }
}

#[test]
fn test_moth_held_at_enter_radius_does_not_flip_flop() {
    let config = FlockConfig::default().validated();
    let world = SimWorld::with_player(Vec3::ZERO);
    let lamp = Lamp {
        id: LampId::new(1),
        position: Vec3::ZERO,
    };
    let held = Vec3::new(0.0, 0.0, -(config.orbit_enter_radius - 1e-3));
    let mut rng = FlockRng::new(5);
    let mut moth = Moth::new(MothId::new(0), Pose::at(held));

    let ctx = MotionContext {
        config: &config,
        world: &world,
        player: Vec3::ZERO,
        dt: DT,
    };

    let mut flips = 0;
    let mut was_orbiting = false;
    for _ in 0..300 {
        // Something keeps shoving the moth back onto the enter radius
        moth.pose.position = held;
        seek_or_orbit(&mut moth, &[lamp], &ctx, &mut rng);

        let orbiting = moth.orbit().is_some();
        if orbiting != was_orbiting {
            flips += 1;
        }
        was_orbiting = orbiting;
    }
    assert_eq!(flips, 1);
    assert!(was_orbiting);
}

#[test]
fn test_forced_target_interrupts_orbit_next_tick() {
    let lamp = Vec3::new(0.0, 0.0, 10.0);
    let mut world = SimWorld::with_player(Vec3::ZERO);
    world.add_moth(lamp + Vec3::new(0.0, 0.2, 0.0));
    world.add_lamp(lamp);
    let target = world.add_target(Pose::new(Vec3::new(0.0, 0.0, 30.0), Vec3::Z));

    let mut flock = FlockController::new(&world, seek_only_config(), 2).expect("player present");
    run(&mut flock, &world, 5);
    assert!(flock.moth(MothId::new(0)).expect("moth").orbit().is_some());

    let id = MothId::new(0);
    let goal = Pose::new(Vec3::new(0.0, 0.0, 30.0), Vec3::Z).transform_point(forced_offset(id, flock.config()));
    let before = flock.moth(id).expect("moth").position().distance(goal);

    flock.force_light_target(id, target).expect("moth");
    flock.tick(&world, TickInput::new(DT)).expect("tick");

    let moth = flock.moth(id).expect("moth");
    assert_eq!(*moth.state(), MotionState::FollowingForced);
    assert!(moth.orbit().is_none());
    assert!(moth.position().distance(goal) < before);
}

#[test]
fn test_shared_target_fans_moths_out() {
    let mut world = SimWorld::with_player(Vec3::new(0.0, 0.0, -100.0));
    world.add_moth(Vec3::new(0.0, 0.0, 5.0));
    world.add_moth(Vec3::new(0.0, 0.0, 6.0));
    let target = world.add_target(Pose::new(Vec3::new(0.0, 0.0, 20.0), Vec3::Z));

    let config = FlockConfig {
        lock_x_to_player: false,
        ..seek_only_config()
    };
    let mut flock = FlockController::new(&world, config, 4).expect("player present");
    flock.force_light_target(MothId::new(0), target).expect("moth");
    flock.force_light_target(MothId::new(1), target).expect("moth");
    run(&mut flock, &world, 600);

    let a = flock.moth(MothId::new(0)).expect("moth").position();
    let b = flock.moth(MothId::new(1)).expect("moth").position();
    assert!(a.distance(b) > 1e-3);
    assert!(a.z < 20.0 && b.z < 20.0);
}

#[test]
fn test_headlight_on_never_recalls() {
    let mut world = SimWorld::with_player(Vec3::ZERO);
    for z in [0.5, 1.0, -1.0, 2.0] {
        world.add_moth(Vec3::new(0.0, 0.0, z));
    }
    world.add_lamp(Vec3::new(0.0, 1.0, 0.5));

    let mut flock = FlockController::new(&world, seek_only_config(), 9).expect("player present");
    for _ in 0..120 {
        flock.tick(&world, TickInput::new(DT)).expect("tick");
        assert_eq!(flock.follower_count(), 0);
        assert_eq!(flock.mode(), FlockMode::SeekLight);
    }
}

#[test]
fn test_repeated_same_value_fires_nothing() {
    let mut world = SimWorld::with_player(Vec3::ZERO);
    world.add_moth(Vec3::new(0.0, 0.0, 3.0));
    let mut flock = FlockController::new(&world, FlockConfig::default(), 1).expect("player present");

    for _ in 0..50 {
        flock.set_headlight(false);
        flock.tick(&world, TickInput::new(DT)).expect("tick");
    }
    assert!(flock.drain_events().is_empty());
    assert!(!flock.glitch().is_active());

    flock.set_headlight(true);
    flock.tick(&world, TickInput::new(DT)).expect("tick");
    let sounds = flock
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, FlockEvent::TransitionSound { .. }))
        .count();
    assert_eq!(sounds, 1);
}

#[test]
fn test_switching_boxes_off_lifts_wall_block() {
    let mut world = SimWorld::with_player(Vec3::new(0.0, 0.0, -100.0));
    world.add_moth(Vec3::ZERO);
    world.add_lamp(Vec3::new(0.0, 0.0, 10.0));
    let room = world.add_roam_box(Aabb::from_center(Vec3::ZERO, Vec3::splat(4.0)));
    world.add_wall(Aabb::new(Vec3::new(-5.0, -5.0, 3.0), Vec3::new(5.0, 5.0, 3.5)));

    let mut flock = FlockController::new(&world, seek_only_config(), 1).expect("player present");
    let mut listener = RoamBoxListener::new();
    listener.update(&mut flock, &world).expect("listener");

    run(&mut flock, &world, 120);
    assert!(flock.moth(MothId::new(0)).expect("moth").position().z < 3.0);

    world.set_roam_box_active(room, false);
    listener.update(&mut flock, &world).expect("listener");
    run(&mut flock, &world, 240);

    let moth = flock.moth(MothId::new(0)).expect("moth");
    assert!(moth.marked_inside_roam_box());
    assert!(moth.position().z > 3.5);
}

#[test]
fn test_boxed_moth_is_not_recalled() {
    let mut world = SimWorld::with_player(Vec3::ZERO);
    world.add_moth(Vec3::new(0.0, 0.0, 1.0));
    world.add_roam_box(Aabb::from_center(Vec3::new(0.0, 0.0, 1.0), Vec3::splat(2.0)));

    let mut flock = FlockController::new(&world, FlockConfig::default(), 1).expect("player present");
    RoamBoxListener::new().update(&mut flock, &world).expect("listener");
    run(&mut flock, &world, 10);
    assert_eq!(flock.follower_count(), 0);
}

#[test]
fn test_no_player_is_fatal() {
    let mut world = SimWorld::new();
    world.add_moth(Vec3::ZERO);
    let err = FlockController::new(&world, FlockConfig::default(), 1).expect_err("must refuse");
    assert!(matches!(err, FlockError::MissingPlayer));
}

#[test]
fn test_removed_lamp_sends_moths_to_the_next_one() {
    let mut world = SimWorld::with_player(Vec3::new(0.0, 0.0, -100.0));
    world.add_moth(Vec3::ZERO);
    let near = world.add_lamp(Vec3::new(0.0, 0.0, 3.0));
    let far = world.add_lamp(Vec3::new(0.0, 0.0, -10.0));

    let mut flock = FlockController::new(&world, seek_only_config(), 1).expect("player present");
    run(&mut flock, &world, 10);
    assert_eq!(flock.moth(MothId::new(0)).expect("moth").seek_target(), Some(near));

    world.set_lamp_active(near, false);
    run(&mut flock, &world, 1);
    assert_eq!(flock.moth(MothId::new(0)).expect("moth").seek_target(), Some(far));
}
