//! Attack roll and critical confirmation.
use tracing::{debug, trace};

use super::damage::resolve_damage;
use super::{AttackContext, AttackDeclaration, AttackOutcome, AttackReport, AttackRoll};
use crate::engine::World;
use crate::events::{EventEnvelope, EventKind, GameEvent, HandlerError, HandlerResult};
use crate::stats::{Ability, paths};

/// Result of the first d20, before confirmation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RollClass {
    Miss,
    Hit,
    /// A hit that may become a critical once confirmed.
    Threat,
}

/// Natural 1 always misses and natural 20 always threatens. Otherwise the
/// total must reach the armor class, and a hit whose natural roll is inside
/// the threat range threatens.
pub fn classify_roll(natural: u32, total: i32, armor_class: i32, threat_floor: u32) -> RollClass {
    match natural {
        1 => RollClass::Miss,
        20 => RollClass::Threat,
        _ if total < armor_class => RollClass::Miss,
        _ if natural >= threat_floor => RollClass::Threat,
        _ => RollClass::Hit,
    }
}

pub(super) fn on_attack_declared(world: &mut World, envelope: &mut EventEnvelope) -> HandlerResult {
    if envelope.is_cancelled() {
        return Ok(());
    }
    let GameEvent::AttackDeclared(declaration) = &envelope.event else {
        return Err(HandlerError::UnexpectedPayload(EventKind::AttackDeclared));
    };
    resolve_attack(world, declaration.clone());
    Ok(())
}

/// Runs one attack to completion and publishes `AttackResolved`.
pub fn resolve_attack(world: &mut World, declaration: AttackDeclaration) -> AttackReport {
    let attacker = declaration.attacker;
    let target = declaration.target;
    let mut report = AttackReport {
        attacker,
        target,
        outcome: AttackOutcome::Cancelled,
        roll: None,
        confirmation: None,
        target_ac: world.query_stat(target, paths::AC),
        damage: None,
    };

    if !world.entities.is_alive(attacker) || !world.entities.is_alive(target) {
        debug!(target: "tactics::attack", %attacker, %target, "attack dropped: participant down");
        return finish(world, report);
    }

    let context = attack_context(world, declaration);
    let envelope = world.publish(GameEvent::BeforeAttackRoll(context));
    if envelope.is_cancelled() {
        debug!(target: "tactics::attack", %attacker, %target, "attack cancelled before the roll");
        return finish(world, report);
    }
    let GameEvent::BeforeAttackRoll(context) = envelope.into_event() else {
        return finish(world, report);
    };

    // Reactors may have changed the target's defenses.
    let armor_class = world.query_stat(target, paths::AC);
    report.target_ac = armor_class;
    let bonus = context.total_bonus();

    let natural = world.roll_d20();
    let roll = AttackRoll {
        natural,
        total: natural as i32 + bonus,
    };
    report.roll = Some(roll);
    trace!(
        target: "tactics::attack",
        %attacker,
        %target,
        natural,
        total = roll.total,
        armor_class,
        "attack roll"
    );

    let class = classify_roll(natural, roll.total, armor_class, context.weapon.threat_floor);
    report.outcome = match class {
        RollClass::Miss => AttackOutcome::Miss,
        RollClass::Hit => AttackOutcome::Hit,
        RollClass::Threat => {
            let natural = world.roll_d20();
            let confirmation = AttackRoll {
                natural,
                total: natural as i32 + bonus,
            };
            report.confirmation = Some(confirmation);
            trace!(
                target: "tactics::attack",
                %attacker,
                natural,
                total = confirmation.total,
                "confirmation roll"
            );
            if confirmation.total >= armor_class {
                AttackOutcome::CriticalHit
            } else {
                AttackOutcome::Hit
            }
        }
    };

    if report.outcome.is_hit() {
        report.damage = resolve_damage(world, &context, report.outcome == AttackOutcome::CriticalHit);
    }
    finish(world, report)
}

fn finish(world: &mut World, report: AttackReport) -> AttackReport {
    debug!(
        target: "tactics::attack",
        attacker = %report.attacker,
        target = %report.target,
        outcome = %report.outcome,
        damage = report.damage.unwrap_or(0),
        "attack resolved"
    );
    world.publish(GameEvent::AttackResolved(report.clone()));
    report
}

fn attack_context(world: &World, declaration: AttackDeclaration) -> AttackContext {
    let AttackDeclaration {
        attacker,
        target,
        weapon,
        iterative_penalty,
        opportunity,
    } = declaration;

    let (ability, scoped_path) = if weapon.ranged {
        (Ability::Dex, paths::RANGED_ATTACK)
    } else {
        (Ability::Str, paths::MELEE_ATTACK)
    };
    let ability_modifier = world
        .entities
        .stats(attacker)
        .map(|stats| stats.modifier(ability))
        .unwrap_or(0);
    let ledger_bonus = world
        .entities
        .ledger(attacker)
        .map(|ledger| ledger.total_over(&[paths::ATTACK, scoped_path]))
        .unwrap_or(0);

    let mut context = AttackContext {
        attacker,
        target,
        weapon,
        base_attack: world.query_stat(attacker, paths::BAB),
        ability_modifier,
        ledger_bonus,
        components: Vec::new(),
        opportunity,
    };
    if iterative_penalty != 0 {
        context.add_component("iterative attack", iterative_penalty);
    }
    context
}
