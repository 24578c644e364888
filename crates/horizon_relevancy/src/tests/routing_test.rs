//! Container routing by class policy.

use super::support::{TestWorld, DOOR, TOWER, WEAPON};
use crate::{ConnectionId, RouteTarget, SpatialMode, Vec3};

#[test]
fn test_always_relevant_objects_reach_every_connection() {
    let mut world = TestWorld::new();
    let (_, first) = world.join(Vec3::zero());
    let (_, second) = world.join(Vec3::new(90000.0, 0.0, 0.0));

    let game_state = world.spawn("GameStateBase", None, Vec3::zero());
    assert_eq!(world.router.route_of(game_state), Some(RouteTarget::Global));

    for connection in [first, second] {
        let relevant = world.router.gather(connection);
        assert_eq!(relevant.always_relevant, vec![game_state]);
    }
}

#[test]
fn test_not_routed_classes_stay_out_of_every_container() {
    let mut world = TestWorld::new();
    let (_, connection) = world.join(Vec3::zero());

    let level_script = world.spawn("LevelScriptActor", None, Vec3::zero());
    let debug_actor = world.spawn("ReplicationGraphDebugActor", None, Vec3::zero());

    for object in [level_script, debug_actor] {
        assert_eq!(world.router.route_of(object), None);
        assert_eq!(world.router.container_count(object), 0);
        assert!(!world.router.gather(connection).contains(object));
    }
}

#[test]
fn test_spatial_gather_uses_viewer_and_cull_distance() {
    let mut world = TestWorld::new();
    let (_, near) = world.join(Vec3::zero());
    let (_, far) = world.join(Vec3::new(50000.0, 0.0, 0.0));

    let pawn = world.spawn("Character", None, Vec3::new(1000.0, 0.0, 0.0));
    assert_eq!(
        world.router.route_of(pawn),
        Some(RouteTarget::Spatial(SpatialMode::Dynamic))
    );

    assert_eq!(world.router.gather(near).spatial, vec![pawn]);
    assert!(world.router.gather(far).spatial.is_empty());

    // An explicit viewer location overrides the controller position.
    world.router.set_viewer_location(far, Vec3::new(2000.0, 0.0, 0.0));
    assert_eq!(world.router.gather(far).spatial, vec![pawn]);
}

#[test]
fn test_moving_dynamic_objects_changes_relevancy() {
    let mut world = TestWorld::new();
    let (_, connection) = world.join(Vec3::zero());
    let pawn = world.spawn("Pawn", None, Vec3::new(1000.0, 0.0, 0.0));
    let tower = world.spawn(TOWER, None, Vec3::new(1000.0, 0.0, 0.0));
    assert_eq!(
        world.router.route_of(tower),
        Some(RouteTarget::Spatial(SpatialMode::Static))
    );

    world.router.set_object_position(pawn, Vec3::new(40000.0, 0.0, 0.0));
    world.router.set_object_position(tower, Vec3::new(40000.0, 0.0, 0.0));

    let relevant = world.router.gather(connection);
    assert!(!relevant.spatial.contains(&pawn));
    assert!(relevant.spatial.contains(&tower), "static objects keep their indexed location");
}

#[test]
fn test_dormancy_objects_track_position_only_while_awake() {
    let mut world = TestWorld::new();
    let (_, connection) = world.join(Vec3::zero());
    let door = world.spawn(DOOR, None, Vec3::new(500.0, 0.0, 0.0));
    assert_eq!(
        world.router.route_of(door),
        Some(RouteTarget::Spatial(SpatialMode::Dormancy))
    );

    world.router.set_dormant(door, true);
    world.router.set_object_position(door, Vec3::new(80000.0, 0.0, 0.0));
    assert!(world.router.gather(connection).spatial.contains(&door));

    world.router.set_dormant(door, false);
    assert!(!world.router.gather(connection).spatial.contains(&door));
    assert!(world.router.object(door).is_some_and(|record| !record.dormant));
}

#[test]
fn test_owner_only_objects_reach_only_their_owner() {
    let mut world = TestWorld::new();
    let (owner_controller, owner) = world.join(Vec3::zero());
    let (_, stranger) = world.join(Vec3::zero());

    let weapon = world.spawn(WEAPON, Some(owner_controller), Vec3::zero());
    assert_eq!(world.router.route_of(weapon), Some(RouteTarget::Owner(owner)));
    assert!(world.router.gather(owner).owner.contains(&weapon));
    assert!(!world.router.gather(stranger).contains(weapon));
}

#[test]
fn test_owner_only_object_without_net_owner_is_left_unrouted() {
    let mut world = TestWorld::new();
    let stray = world.spawn(WEAPON, None, Vec3::zero());
    assert_eq!(world.router.route_of(stray), None);
    assert!(world.router.pending().objects().is_empty());
}

#[test]
fn test_duplicate_add_is_ignored() {
    let mut world = TestWorld::new();
    let class = world.class("PlayerState");
    let descriptor = crate::ObjectDescriptor::new(class);

    assert!(world.router.add_object(descriptor.clone()));
    assert!(!world.router.add_object(descriptor.clone()));
    assert_eq!(world.router.stats().duplicate_adds, 1);
    assert_eq!(world.router.container_count(descriptor.id), 1);
    assert_eq!(world.router.always_relevant().len(), 1);
}

#[test]
fn test_remove_object_clears_its_container() {
    let mut world = TestWorld::new();
    let (controller, connection) = world.join(Vec3::zero());
    let weapon = world.spawn(WEAPON, Some(controller), Vec3::zero());
    let pawn = world.spawn("Pawn", Some(controller), Vec3::zero());
    let info = world.spawn("PlayerState", None, Vec3::zero());

    for object in [weapon, pawn, info] {
        assert!(world.router.remove_object(object));
        assert_eq!(world.router.container_count(object), 0);
        assert!(!world.router.remove_object(object), "second removal is a no-op");
    }
    assert!(!world.router.gather(connection).contains(weapon));
}

#[test]
fn test_objects_occupy_at_most_one_container() {
    let mut world = TestWorld::new();
    let (controller, _) = world.join(Vec3::zero());
    let mut objects = vec![controller];
    for class in ["Pawn", "PlayerState", WEAPON, TOWER, DOOR, "Flag", "LevelScriptActor"] {
        objects.push(world.spawn(class, Some(controller), Vec3::new(10.0, 0.0, 0.0)));
    }
    world.router.prepare_for_replication();
    world.assert_single_container(&objects);
}

#[test]
fn test_degraded_connection_gets_global_and_spatial_only() {
    let mut world = TestWorld::new();
    let connection = ConnectionId::new();
    assert!(world.router.add_connection(connection, None));
    assert!(world.router.connection(connection).unwrap().is_degraded());
    world.router.set_viewer_location(connection, Vec3::zero());

    let info = world.spawn("PlayerState", None, Vec3::zero());
    let pawn = world.spawn("Pawn", None, Vec3::zero());
    world.router.prepare_for_replication();

    let relevant = world.router.gather(connection);
    assert_eq!(relevant.always_relevant, vec![info]);
    assert_eq!(relevant.spatial, vec![pawn]);
    assert!(relevant.owner.is_empty());
    assert!(relevant.team.is_empty());
}

#[test]
fn test_unknown_connection_gathers_nothing() {
    let mut world = TestWorld::new();
    world.spawn("PlayerState", None, Vec3::zero());
    assert!(world.router.gather(ConnectionId::new()).is_empty());
    assert!(!world.router.remove_connection(ConnectionId::new()));
}

#[test]
fn test_gather_all_matches_individual_gathers() {
    let mut world = TestWorld::new();
    let (first_controller, first) = world.join(Vec3::zero());
    let (_, second) = world.join(Vec3::new(60000.0, 0.0, 0.0));
    world.spawn("PlayerState", None, Vec3::zero());
    world.spawn("Pawn", None, Vec3::zero());
    world.spawn(WEAPON, Some(first_controller), Vec3::zero());

    let all = world.router.gather_all();
    assert_eq!(all.len(), 2);
    assert_eq!(all[&first], world.router.gather(first));
    assert_eq!(all[&second], world.router.gather(second));
}

#[test]
fn test_removed_connection_sends_its_objects_back_to_pending() {
    let mut world = TestWorld::new();
    let (controller, connection) = world.join(Vec3::zero());
    let weapon = world.spawn(WEAPON, Some(controller), Vec3::zero());

    assert!(world.router.remove_connection(connection));
    assert_eq!(world.router.route_of(weapon), Some(RouteTarget::Pending));
    assert_eq!(world.router.route_of(controller), Some(RouteTarget::Pending));
    assert_eq!(world.router.container_count(weapon), 0);
    assert_eq!(world.router.connection_count(), 0);

    world.router.prepare_for_replication();
    assert!(world.router.pending().is_object_pending(weapon));
}

#[test]
fn test_reconnecting_controller_gets_its_objects_back() {
    let mut world = TestWorld::new();
    let (controller, connection) = world.join(Vec3::zero());
    let weapon = world.spawn(WEAPON, Some(controller), Vec3::zero());
    assert!(world.router.remove_connection(connection));

    let reconnected = world.connect(controller);
    world.router.prepare_for_replication();

    let relevant = world.router.gather(reconnected);
    assert!(relevant.owner.contains(&weapon));
    assert!(relevant.owner.contains(&controller));
    assert_eq!(world.router.route_of(weapon), Some(RouteTarget::Owner(reconnected)));
    assert!(world.router.pending().is_empty());
    world.assert_single_container(&[weapon, controller]);
}

#[test]
fn test_console_commands() {
    let mut world = TestWorld::new();
    assert_eq!(world.router.frequency_bucket_list_size(), 12);

    let lines = world
        .router
        .execute_console_command("Relevancy.PrintRouting")
        .unwrap();
    assert_eq!(lines[1], "Relevancy Routing Policies");
    assert!(lines.iter().any(|line| line.starts_with("Flag") && line.ends_with("RelevantTeam")));

    world
        .router
        .execute_console_command("Relevancy.FrequencyBuckets 4")
        .unwrap();
    assert_eq!(world.router.frequency_bucket_list_size(), 4);

    world
        .router
        .execute_console_command("Relevancy.FrequencyBuckets")
        .unwrap();
    assert_eq!(world.router.frequency_bucket_list_size(), 1);

    assert!(world.router.execute_console_command("Relevancy.Nope").is_err());
}

#[test]
fn test_destruction_distance_is_squared() {
    let world = TestWorld::new();
    assert_eq!(
        world.router.destruction_info_max_distance_squared(),
        30000.0 * 30000.0
    );
}
