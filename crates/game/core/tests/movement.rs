mod common;

use common::{events_of, fighter, spawn_at, world, world_with};
use tactics_core::{Action, CombatConfig, EventKind, Faction, GameEvent, Position};

fn path(squares: &[(i32, i32)]) -> Vec<Position> {
    squares.iter().map(|&(x, y)| Position::new(x, y)).collect()
}

fn blocked_reason(world: &tactics_core::World) -> Option<String> {
    events_of(world, EventKind::MoveBlocked)
        .first()
        .and_then(|event| match event {
            GameEvent::MoveBlocked { reason, .. } => Some(reason.clone()),
            _ => None,
        })
}

#[test]
fn walking_stops_in_front_of_a_wall() {
    let mut world = world([]);
    let a = spawn_at(&mut world, fighter("A", Faction::Player, 1), 0, 0);
    world.grid.block(Position::new(2, 0));

    assert!(world.submit_action(a, Action::move_along(path(&[(1, 0), (2, 0), (3, 0)]))));

    assert_eq!(*world.entities.position(a).unwrap(), Position::new(1, 0));
    assert_eq!(blocked_reason(&world).as_deref(), Some("square is blocked"));
    let resolved = events_of(&world, EventKind::MoveResolved);
    assert!(matches!(resolved[0], GameEvent::MoveResolved { squares: 1, .. }));
}

#[test]
fn occupied_squares_cannot_be_entered() {
    let mut world = world([]);
    let a = spawn_at(&mut world, fighter("A", Faction::Player, 1), 0, 0);
    spawn_at(&mut world, fighter("B", Faction::Ally, 1), 1, 0);

    world.submit_action(a, Action::move_along(path(&[(1, 0)])));

    assert_eq!(*world.entities.position(a).unwrap(), Position::new(0, 0));
    assert_eq!(blocked_reason(&world).as_deref(), Some("square is occupied"));
    assert!(events_of(&world, EventKind::MoveResolved).is_empty());
}

#[test]
fn difficult_terrain_costs_double() {
    let mut world = world([]);
    let a = spawn_at(&mut world, fighter("A", Faction::Player, 1), 0, 0);
    world.grid.add_difficult(Position::new(2, 0), None);

    world.submit_action(
        a,
        Action::move_along(path(&[(1, 0), (2, 0), (3, 0), (4, 0), (5, 0), (6, 0)])),
    );

    assert_eq!(*world.entities.position(a).unwrap(), Position::new(5, 0));
    assert_eq!(blocked_reason(&world).as_deref(), Some("not enough movement left"));
}

#[test]
fn paths_must_be_contiguous_and_within_speed() {
    let mut world = world([]);
    let a = spawn_at(&mut world, fighter("A", Faction::Player, 1), 0, 0);

    world.submit_action(a, Action::move_along(path(&[(0, 2)])));
    assert_eq!(blocked_reason(&world).as_deref(), Some("path is not contiguous"));

    let too_far: Vec<Position> = (1..=7).map(|x| Position::new(x, 0)).collect();
    assert!(!world.submit_action(a, Action::move_along(too_far)));
    assert_eq!(*world.entities.position(a).unwrap(), Position::new(0, 0));
}

#[test]
fn bounded_grids_keep_walkers_inside() {
    let mut world = world_with(CombatConfig::default().with_grid(3, 3), []);
    let a = spawn_at(&mut world, fighter("A", Faction::Player, 1), 2, 2);

    world.submit_action(a, Action::move_along(path(&[(3, 3)])));

    assert_eq!(*world.entities.position(a).unwrap(), Position::new(2, 2));
    assert_eq!(blocked_reason(&world).as_deref(), Some("out of bounds"));
}

#[test]
fn five_foot_steps_avoid_difficult_terrain() {
    let mut world = world([]);
    let a = spawn_at(&mut world, fighter("A", Faction::Player, 1), 0, 0);
    world.grid.add_difficult(Position::new(1, 0), None);

    assert!(!world.submit_action(a, Action::step(Position::new(1, 0))));
    assert!(!world.submit_action(a, Action::step(Position::new(2, 0))));
    assert!(world.submit_action(a, Action::step(Position::new(0, 1))));
}

#[test]
fn timed_terrain_clears_as_rounds_pass() {
    let mut world = world([20, 10]);
    let a = spawn_at(&mut world, fighter("A", Faction::Player, 1), 0, 0);
    let b = spawn_at(&mut world, fighter("B", Faction::Hostile, 1), 5, 5);
    world.grid.add_difficult(Position::new(2, 2), Some(2));

    world.start_combat(&[a, b]);
    assert!(world.grid.is_difficult(&Position::new(2, 2)));

    world.submit_action(a, Action::end_turn());
    world.submit_action(b, Action::end_turn());
    assert_eq!(world.round(), 2);
    assert!(!world.grid.is_difficult(&Position::new(2, 2)));
}

#[test]
fn moving_spends_the_move_action() {
    let mut world = world([20, 10]);
    let a = spawn_at(&mut world, fighter("A", Faction::Player, 1), 0, 0);
    let b = spawn_at(&mut world, fighter("B", Faction::Hostile, 1), 9, 9);
    world.start_combat(&[a, b]);

    assert!(world.submit_action(a, Action::move_along(path(&[(1, 1)]))));
    let budget = world.entities.budget(a).unwrap();
    assert_eq!(budget.movement, 0);
    assert!(budget.moved);
    // A standard action can still be spent on a second move.
    assert!(world.submit_action(a, Action::move_along(path(&[(2, 2)]))));
    assert!(!world.submit_action(a, Action::move_along(path(&[(3, 3)]))));
}
