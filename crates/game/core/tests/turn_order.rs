mod common;

use common::{events_of, fighter, spawn, spawn_at, world};
use tactics_core::{
    Action, ActionOrigin, CombatPhase, EntityId, EventKind, Faction, GameEvent, QueuedAction,
    TurnError, World,
};

fn order(world: &World) -> Vec<EntityId> {
    world.initiative_order().iter().map(|entry| entry.entity).collect()
}

#[test]
fn initiative_sorts_highest_first() {
    let mut world = world([10, 15, 5]);
    let a = spawn(&mut world, fighter("A", Faction::Player, 1));
    let b = spawn(&mut world, fighter("B", Faction::Hostile, 1));
    let c = spawn(&mut world, fighter("C", Faction::Hostile, 1));

    assert!(world.start_combat(&[a, b, c]));

    let order: Vec<_> = world.initiative_order().iter().map(|entry| entry.entity).collect();
    assert_eq!(order, vec![b, a, c]);
    assert_eq!(world.current_actor(), Some(b));
    assert_eq!(world.round(), 1);
    assert_eq!(world.phase(), CombatPhase::Combat);
}

#[test]
fn initiative_ties_keep_the_given_order() {
    let mut world = world([12, 12, 7]);
    let a = spawn(&mut world, fighter("A", Faction::Player, 1));
    let b = spawn(&mut world, fighter("B", Faction::Hostile, 1));
    let c = spawn(&mut world, fighter("C", Faction::Hostile, 1));

    world.start_combat(&[a, b, c]);

    let order: Vec<_> = world.initiative_order().iter().map(|entry| entry.entity).collect();
    assert_eq!(order, vec![a, b, c]);
}

#[test]
fn ending_turns_cycles_into_a_new_round() {
    let mut world = world([15, 10]);
    let a = spawn(&mut world, fighter("A", Faction::Player, 1));
    let b = spawn(&mut world, fighter("B", Faction::Hostile, 1));
    world.start_combat(&[a, b]);

    assert!(world.submit_action(a, Action::end_turn()));
    assert_eq!(world.current_actor(), Some(b));
    assert_eq!(world.round(), 1);

    assert!(world.submit_action(b, Action::end_turn()));
    assert_eq!(world.current_actor(), Some(a));
    assert_eq!(world.round(), 2);
    assert_eq!(events_of(&world, EventKind::RoundStarted).len(), 2);
    assert_eq!(events_of(&world, EventKind::TurnEnded).len(), 2);
}

#[test]
fn acting_out_of_turn_is_rejected() {
    let mut world = world([15, 10]);
    let a = spawn(&mut world, fighter("A", Faction::Player, 1));
    let b = spawn(&mut world, fighter("B", Faction::Hostile, 1));
    world.start_combat(&[a, b]);

    assert!(!world.submit_action(b, Action::attack(a)));

    let rejected = events_of(&world, EventKind::ActionRejected);
    assert_eq!(rejected.len(), 1);
    assert!(matches!(rejected[0], GameEvent::ActionRejected { actor, .. } if *actor == b));
    assert!(events_of(&world, EventKind::AttackDeclared).is_empty());
    assert_eq!(world.entities.budget(b).unwrap().standard, 1);
}

#[test]
fn a_spent_standard_action_cannot_be_taken_twice() {
    // Initiative, then a missed swing; the second attack never rolls.
    let mut world = world([15, 10, 2]);
    let a = spawn(&mut world, fighter("A", Faction::Player, 1).equip("longsword"));
    let b = spawn(&mut world, fighter("B", Faction::Hostile, 1));
    world.start_combat(&[a, b]);

    assert!(world.submit_action(a, Action::attack(b)));
    assert!(!world.submit_action(a, Action::attack(b)));

    assert_eq!(events_of(&world, EventKind::AttackResolved).len(), 1);
    assert_eq!(world.current_actor(), Some(a));
}

#[test]
fn incapacitated_combatants_lose_their_turn() {
    let mut world = world([15, 10, 5]);
    let a = spawn(&mut world, fighter("A", Faction::Player, 1));
    let b = spawn(&mut world, fighter("B", Faction::Hostile, 1));
    let c = spawn(&mut world, fighter("C", Faction::Hostile, 1));
    world.apply_effect("stun", b, "spell").unwrap();
    assert!(world.entities.has_tag(b, "stunned"));

    world.start_combat(&[a, b, c]);
    world.submit_action(a, Action::end_turn());

    assert_eq!(world.current_actor(), Some(c));
    let skipped = events_of(&world, EventKind::TurnSkipped);
    assert_eq!(skipped.len(), 1);
    assert!(matches!(skipped[0], GameEvent::TurnSkipped { actor, reason } if *actor == b && reason == "stunned"));
    // The lost turn still counts down the stun.
    assert!(!world.entities.has_tag(b, "stunned"));
}

#[test]
fn combat_ends_when_the_last_foe_falls() {
    // Initiative 15/10, a hit on 15, then 6 damage against 6 hit points.
    let mut world = world([15, 10, 15, 6]);
    let a = spawn(&mut world, fighter("A", Faction::Player, 1).equip("longsword"));
    let b = spawn(&mut world, fighter("B", Faction::Hostile, 1));
    world.start_combat(&[a, b]);

    assert!(world.submit_action(a, Action::attack(b)));

    assert!(!world.entities.is_alive(b));
    assert!(!world.is_combat_active());
    assert_eq!(world.current_actor(), None);
    assert!(world.initiative_order().is_empty());
    assert_eq!(world.pending_actions(), 0);
    let ended = events_of(&world, EventKind::CombatEnded);
    assert_eq!(ended.len(), 1);
    assert!(matches!(ended[0], GameEvent::CombatEnded { rounds: 1 }));
    assert_eq!(events_of(&world, EventKind::CharacterDied).len(), 1);
}

#[test]
fn combat_without_hostile_pairs_ends_at_once() {
    let mut world = world([15, 10]);
    let a = spawn(&mut world, fighter("A", Faction::Player, 1));
    let b = spawn(&mut world, fighter("B", Faction::Ally, 1));

    let order = world.try_start_combat(&[a, b]).unwrap();

    assert_eq!(order.len(), 2);
    assert!(!world.is_combat_active());
    assert_eq!(events_of(&world, EventKind::CombatEnded).len(), 1);
}

#[test]
fn starting_twice_is_an_error() {
    let mut world = world([15, 10]);
    let a = spawn(&mut world, fighter("A", Faction::Player, 1));
    let b = spawn(&mut world, fighter("B", Faction::Hostile, 1));
    world.start_combat(&[a, b]);

    assert_eq!(world.try_start_combat(&[a, b]).unwrap_err(), TurnError::AlreadyInCombat);
    assert!(!world.start_combat(&[a, b]));
    assert!(world.is_combat_active());
}

#[test]
fn a_fallen_earlier_combatant_keeps_the_turn_in_place() {
    // Initiative 20/15/10, then Ezren's swing hits on 15 for 6.
    let mut world = world([20, 15, 10, 15, 6]);
    let seelah = spawn_at(&mut world, fighter("Seelah", Faction::Player, 1), 0, 0);
    let kyra = spawn_at(&mut world, fighter("Kyra", Faction::Player, 1), 5, 5);
    let ezren = spawn_at(&mut world, fighter("Ezren", Faction::Hostile, 1).equip("longsword"), 1, 0);
    world.start_combat(&[seelah, kyra, ezren]);
    world.submit_action(seelah, Action::end_turn());
    world.submit_action(kyra, Action::end_turn());

    assert!(world.submit_action(ezren, Action::attack(seelah)));

    assert!(!world.entities.is_alive(seelah));
    assert_eq!(order(&world), vec![kyra, ezren]);
    assert_eq!(world.current_actor(), Some(ezren));

    assert!(world.submit_action(ezren, Action::end_turn()));
    assert_eq!(world.current_actor(), Some(kyra));
    assert_eq!(world.round(), 2);
}

#[test]
fn felling_the_active_combatant_hands_the_turn_on() {
    let mut world = world([20, 15, 10, 15, 6]);
    let a = spawn_at(&mut world, fighter("A", Faction::Player, 1).equip("longsword"), 0, 0);
    let h1 = spawn_at(&mut world, fighter("H1", Faction::Hostile, 1), 1, 0);
    let h2 = spawn_at(&mut world, fighter("H2", Faction::Hostile, 1), 5, 5);
    world.start_combat(&[a, h1, h2]);
    world.submit_action(a, Action::end_turn());
    assert_eq!(world.current_actor(), Some(h1));

    world.add_interrupt(QueuedAction::new(a, Action::attack(h1), ActionOrigin::Interrupt));

    assert!(!world.entities.is_alive(h1));
    assert_eq!(order(&world), vec![a, h2]);
    assert_eq!(world.current_actor(), Some(h2));
    assert_eq!(world.round(), 1);
    // Only A's turn ended; the fallen combatant's turn just stops.
    assert_eq!(events_of(&world, EventKind::TurnEnded).len(), 1);
}

#[test]
fn falling_while_the_turn_ends_does_not_skip_the_next_combatant() {
    // Initiative 20/15/10; A's readied swing hits on 15 for 6.
    let mut world = world([20, 15, 10, 15, 6]);
    let a = spawn_at(&mut world, fighter("A", Faction::Player, 1).equip("longsword"), 0, 0);
    let h1 = spawn_at(&mut world, fighter("H1", Faction::Hostile, 1), 1, 0);
    let h2 = spawn_at(&mut world, fighter("H2", Faction::Hostile, 1), 5, 5);
    world.start_combat(&[a, h1, h2]);
    world.submit_action(a, Action::ready(EventKind::TurnEnded, Some(h1), Action::attack(h1)));
    world.submit_action(a, Action::end_turn());

    assert!(world.submit_action(h1, Action::end_turn()));

    assert!(!world.entities.is_alive(h1));
    assert_eq!(order(&world), vec![a, h2]);
    assert_eq!(world.round(), 1);
    assert_eq!(world.current_actor(), Some(h2));
}

#[test]
fn falling_as_the_turn_starts_moves_on_to_the_next_combatant() {
    let mut world = world([20, 15, 10, 15, 6]);
    let a = spawn_at(&mut world, fighter("A", Faction::Player, 1).equip("longsword"), 0, 0);
    let h1 = spawn_at(&mut world, fighter("H1", Faction::Hostile, 1), 1, 0);
    let h2 = spawn_at(&mut world, fighter("H2", Faction::Hostile, 1), 5, 5);
    world.start_combat(&[a, h1, h2]);
    world.submit_action(a, Action::ready(EventKind::TurnStarted, Some(h1), Action::attack(h1)));

    assert!(world.submit_action(a, Action::end_turn()));

    assert!(!world.entities.is_alive(h1));
    assert_eq!(world.current_actor(), Some(h2));
    assert!(world.submit_action(h2, Action::end_turn()));
    assert_eq!(world.current_actor(), Some(a));
    assert_eq!(world.round(), 2);
}
