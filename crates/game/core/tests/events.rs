mod common;

use common::{attack_reports, events_of, fighter, hp, spawn, world, world_with};
use tactics_core::events::SubscriberId;
use tactics_core::{Action, AttackOutcome, CombatConfig, EntityId, EventKind, Faction, GameEvent};

#[test]
fn reactors_can_cancel_an_attack_before_the_roll() {
    let mut world = world([]);
    let attacker = spawn(&mut world, fighter("Valeros", Faction::Player, 1).equip("longsword"));
    let target = spawn(&mut world, fighter("Cleric", Faction::Hostile, 1));
    world.events.subscribe_fn(
        EventKind::BeforeAttackRoll,
        SubscriberId::External("sanctuary".into()),
        "sanctuary",
        move |_, envelope| {
            if let GameEvent::BeforeAttackRoll(context) = &envelope.event {
                if context.target == target {
                    envelope.cancel();
                }
            }
            Ok(())
        },
    );

    world.submit_action(attacker, Action::attack(target));

    let report = &attack_reports(&world)[0];
    assert_eq!(report.outcome, AttackOutcome::Cancelled);
    assert!(report.roll.is_none());
    assert_eq!(hp(&world, target), 6);
}

#[test]
fn reactors_can_add_to_the_roll() {
    // A natural 2 only hits AC 10 with the +10.
    let mut world = world([2, 1]);
    let attacker = spawn(&mut world, fighter("Valeros", Faction::Player, 1).equip("longsword"));
    let target = spawn(&mut world, fighter("Orc", Faction::Hostile, 1));
    world.events.subscribe_fn(
        EventKind::BeforeAttackRoll,
        SubscriberId::External("guidance".into()),
        "guidance",
        |_, envelope| {
            if let GameEvent::BeforeAttackRoll(context) = &mut envelope.event {
                context.add_component("guidance", 10);
            }
            Ok(())
        },
    );

    world.submit_action(attacker, Action::attack(target));

    let report = &attack_reports(&world)[0];
    assert_eq!(report.roll.unwrap().total, 13);
    assert_eq!(report.outcome, AttackOutcome::Hit);
}

#[test]
fn runaway_publishing_stops_at_the_depth_limit() {
    let config = CombatConfig {
        max_event_depth: 8,
        ..CombatConfig::default()
    };
    let mut world = world_with(config, []);
    world.events.subscribe_fn(
        EventKind::StatsCalculated,
        SubscriberId::External("echo".into()),
        "echo",
        |world, envelope| {
            if let GameEvent::StatsCalculated { entity } = envelope.event {
                world.publish(GameEvent::StatsCalculated { entity });
            }
            Ok(())
        },
    );

    let envelope = world.publish(GameEvent::StatsCalculated { entity: EntityId(0) });

    assert!(!envelope.is_cancelled());
    assert_eq!(events_of(&world, EventKind::StatsCalculated).len(), 8);
    assert_eq!(world.events.depth(), 0);
}

#[test]
fn external_subscribers_leave_with_their_owner() {
    let mut world = world([]);
    let owner = SubscriberId::External("overlay".into());
    world
        .events
        .subscribe_fn(EventKind::TurnStarted, owner.clone(), "overlay.turn", |_, _| Ok(()));
    world
        .events
        .subscribe_fn(EventKind::TurnEnded, owner.clone(), "overlay.turn_end", |_, _| Ok(()));

    assert_eq!(world.events.owner_count(&owner), 2);
    assert_eq!(world.events.unsubscribe(&owner), 2);
    assert_eq!(world.events.owner_count(&owner), 0);
}

#[test]
fn the_journal_can_be_switched_off() {
    let config = CombatConfig {
        record_events: false,
        ..CombatConfig::default()
    };
    let mut world = world_with(config, []);
    spawn(&mut world, fighter("Valeros", Faction::Player, 1));

    assert!(world.events.journal().is_empty());
    world.events.set_recording(true);
    world.publish(GameEvent::RoundStarted { round: 1 });
    assert_eq!(world.events.drain_journal().len(), 1);
    assert!(world.events.journal().is_empty());
}
