mod common;

use common::{attack_reports, events_of, fighter, hp, position_of, spawn, spawn_at, world};
use tactics_core::{
    Action, ActionOrigin, EventKind, Faction, GameEvent, Position, QueuedAction, ReadiedAction,
};

#[test]
fn attacks_of_opportunity_resolve_in_initiative_order_before_the_move() {
    // Initiative 20/10/5, both opportunity attacks roll a natural 1.
    let mut world = world([20, 10, 5, 1, 1]);
    let a = spawn_at(&mut world, fighter("A", Faction::Player, 1), 1, 1);
    let b = spawn_at(&mut world, fighter("B", Faction::Hostile, 1).equip("longsword"), 0, 1);
    let c = spawn_at(&mut world, fighter("C", Faction::Hostile, 1).equip("longsword"), 1, 0);
    world.start_combat(&[a, b, c]);

    let path = vec![Position::new(2, 2), Position::new(3, 3)];
    assert!(world.submit_action(a, Action::move_along(path)));

    let opportunity = events_of(&world, EventKind::ReactionOpportunity);
    assert!(matches!(opportunity[0], GameEvent::ReactionOpportunity { reactors, .. } if reactors == &vec![b, c]));
    let attackers: Vec<_> = attack_reports(&world).iter().map(|report| report.attacker).collect();
    assert_eq!(attackers, vec![b, c]);

    let last_attack = position_of(&world, |event| {
        matches!(event, GameEvent::AttackResolved(report) if report.attacker == c)
    })
    .unwrap();
    let moved = position_of(&world, |event| event.kind() == EventKind::MoveResolved).unwrap();
    assert!(last_attack < moved);
    assert_eq!(*world.entities.position(a).unwrap(), Position::new(3, 3));
    assert_eq!(world.entities.budget(b).unwrap().reactions, 0);
    assert_eq!(world.entities.budget(c).unwrap().reactions, 0);
}

#[test]
fn a_mover_felled_by_an_opportunity_attack_never_moves() {
    // b hits on 15 for 8, more than the 6 hit points a has.
    let mut world = world([20, 10, 5, 15, 8]);
    let a = spawn_at(&mut world, fighter("A", Faction::Player, 1), 1, 1);
    let b = spawn_at(&mut world, fighter("B", Faction::Hostile, 1).equip("longsword"), 0, 1);
    let c = spawn_at(&mut world, fighter("C", Faction::Hostile, 1).equip("longsword"), 1, 0);
    world.start_combat(&[a, b, c]);

    world.submit_action(a, Action::move_along(vec![Position::new(2, 2)]));

    assert!(!world.entities.is_alive(a));
    assert_eq!(*world.entities.position(a).unwrap(), Position::new(1, 1));
    assert_eq!(attack_reports(&world).len(), 1);
    assert!(events_of(&world, EventKind::MoveResolved).is_empty());
    assert!(!world.is_combat_active());
    assert_eq!(world.pending_actions(), 0);
    assert_eq!(world.entities.budget(c).unwrap().reactions, 1);
}

#[test]
fn five_foot_steps_do_not_provoke() {
    let mut world = world([20, 10]);
    let a = spawn_at(&mut world, fighter("A", Faction::Player, 1), 1, 1);
    let b = spawn_at(&mut world, fighter("B", Faction::Hostile, 1).equip("longsword"), 0, 1);
    world.start_combat(&[a, b]);

    assert!(world.submit_action(a, Action::step(Position::new(2, 2))));

    assert!(events_of(&world, EventKind::ReactionOpportunity).is_empty());
    assert_eq!(*world.entities.position(a).unwrap(), Position::new(2, 2));
    assert_eq!(world.entities.budget(b).unwrap().reactions, 1);
    // The step used up this turn's movement allowance for a full move.
    assert!(!world.submit_action(a, Action::move_along(vec![Position::new(3, 3)])));
}

#[test]
fn only_melee_weapons_threaten() {
    let mut world = world([20, 10]);
    let a = spawn_at(&mut world, fighter("A", Faction::Player, 1), 1, 1);
    let b = spawn_at(&mut world, fighter("B", Faction::Hostile, 1).equip("shortbow"), 0, 1);
    world.start_combat(&[a, b]);

    assert!(world.eligible_reactors(a).is_empty());
    world.submit_action(a, Action::move_along(vec![Position::new(2, 2)]));

    assert!(events_of(&world, EventKind::ReactionOpportunity).is_empty());
    assert_eq!(*world.entities.position(a).unwrap(), Position::new(2, 2));
}

#[test]
fn shooting_in_melee_provokes() {
    // b's opportunity attack and then a's shot both roll a natural 1.
    let mut world = world([20, 10, 1, 1]);
    let a = spawn_at(&mut world, fighter("A", Faction::Player, 1).equip("shortbow"), 1, 1);
    let b = spawn_at(&mut world, fighter("B", Faction::Hostile, 1).equip("longsword"), 0, 1);
    world.start_combat(&[a, b]);

    assert!(world.submit_action(a, Action::attack(b)));

    let reports = attack_reports(&world);
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].attacker, b);
    assert_eq!(reports[1].attacker, a);
}

#[test]
fn readied_attack_fires_when_the_watched_foe_arrives() {
    // Initiative 20/10, then the readied swing hits on 15 for 3.
    let mut world = world([20, 10, 15, 3]);
    let a = spawn_at(&mut world, fighter("A", Faction::Player, 1).equip("longsword"), 0, 0);
    let b = spawn_at(&mut world, fighter("B", Faction::Hostile, 1), 3, 0);
    world.start_combat(&[a, b]);

    let readied = Action::ready(EventKind::MoveResolved, Some(b), Action::attack(b));
    assert!(world.submit_action(a, readied));
    assert_eq!(world.readied_actions().count(), 1);
    world.submit_action(a, Action::end_turn());
    assert_eq!(world.current_actor(), Some(b));

    let path = vec![Position::new(2, 0), Position::new(1, 0)];
    assert!(world.submit_action(b, Action::move_along(path)));

    let triggered = events_of(&world, EventKind::ReadiedActionTriggered);
    assert!(matches!(
        triggered[0],
        GameEvent::ReadiedActionTriggered { actor, trigger: EventKind::MoveResolved } if *actor == a
    ));
    assert_eq!(attack_reports(&world)[0].attacker, a);
    assert_eq!(hp(&world, b), 6 - 3);
    assert_eq!(world.readied_actions().count(), 0);
    assert_eq!(world.current_actor(), Some(b));
}

#[test]
fn unused_readied_actions_expire_when_the_actor_acts_again() {
    let mut world = world([20, 10]);
    let a = spawn(&mut world, fighter("A", Faction::Player, 1));
    let b = spawn(&mut world, fighter("B", Faction::Hostile, 1));
    world.start_combat(&[a, b]);

    world.submit_action(a, Action::ready(EventKind::AttackDeclared, Some(b), Action::attack(b)));
    let held: Vec<ReadiedAction> = world.readied_actions().cloned().collect();
    assert_eq!(held[0].actor, a);

    world.submit_action(a, Action::end_turn());
    world.submit_action(b, Action::end_turn());

    assert_eq!(world.current_actor(), Some(a));
    assert_eq!(events_of(&world, EventKind::ReadiedActionExpired).len(), 1);
    assert_eq!(world.readied_actions().count(), 0);
}

#[test]
fn full_round_actions_cannot_be_readied() {
    let mut world = world([20, 10]);
    let a = spawn(&mut world, fighter("A", Faction::Player, 1));
    let b = spawn(&mut world, fighter("B", Faction::Hostile, 1));
    world.start_combat(&[a, b]);

    let readied = Action::ready(EventKind::MoveDeclared, None, Action::full_attack(b));
    assert!(!world.submit_action(a, readied));
    assert_eq!(world.readied_actions().count(), 0);
}

#[test]
fn interrupts_run_immediately_outside_the_turn_order() {
    let mut world = world([20, 10, 1]);
    let a = spawn(&mut world, fighter("A", Faction::Player, 1));
    let b = spawn(&mut world, fighter("B", Faction::Hostile, 1).equip("longsword"));
    world.start_combat(&[a, b]);

    world.add_interrupt(QueuedAction::new(b, Action::attack(a), ActionOrigin::Interrupt));

    assert_eq!(attack_reports(&world)[0].attacker, b);
    assert_eq!(world.current_actor(), Some(a));
    assert_eq!(world.entities.budget(b).unwrap().standard, 1);
}
