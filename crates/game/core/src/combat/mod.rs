//! Rules resolution.
//!
//! Actions only announce intent. The handlers registered here react to the
//! "declared" events, roll the dice and publish the results:
//!
//! ```text
//! AttackDeclared ─► BeforeAttackRoll ─► d20 (─► confirmation d20)
//!                        │                    │
//!                        │ hit                ▼
//!                        └──────► BeforeDamageRoll ─► DamageResolved ─► HpChanged (─► CharacterDied)
//!                                                                        │
//!                                                     AttackResolved ◄───┘
//! ```
mod attack;
mod damage;
mod items;
mod maneuvers;
mod movement;
mod types;

pub use attack::{RollClass, classify_roll, resolve_attack};
pub use damage::{apply_damage, heal};
pub use maneuvers::Maneuver;
pub use types::{
    AttackContext, AttackDeclaration, AttackOutcome, AttackReport, AttackRoll, DamageContext,
    ItemState, MoveMode, RollComponent, WeaponProfile,
};

use crate::effects::conditions::{PRONE, TOTAL_DEFENSE};
use crate::engine::World;
use crate::events::{
    EventBus, EventEnvelope, EventKind, GameEvent, HandlerError, HandlerResult, SubscriberId,
};
use crate::state::{EntityId, EquipSlot};

/// Subscribes every rules handler. Called once by [`World::new`].
pub(crate) fn register(bus: &mut EventBus) {
    bus.subscribe_fn(
        EventKind::AttackDeclared,
        SubscriberId::Rules,
        "rules.attack",
        attack::on_attack_declared,
    );
    bus.subscribe_fn(
        EventKind::MoveDeclared,
        SubscriberId::Rules,
        "rules.movement",
        movement::on_move_declared,
    );
    bus.subscribe_fn(
        EventKind::ManeuverDeclared,
        SubscriberId::Rules,
        "rules.maneuver",
        maneuvers::on_maneuver_declared,
    );
    bus.subscribe_fn(
        EventKind::ItemUseDeclared,
        SubscriberId::Rules,
        "rules.use_item",
        items::on_item_use_declared,
    );
    bus.subscribe_fn(
        EventKind::EquipDeclared,
        SubscriberId::Rules,
        "rules.equip",
        items::on_equip_declared,
    );
    bus.subscribe_fn(
        EventKind::UnequipDeclared,
        SubscriberId::Rules,
        "rules.unequip",
        items::on_unequip_declared,
    );
    bus.subscribe_fn(
        EventKind::StandUpDeclared,
        SubscriberId::Rules,
        "rules.stand_up",
        on_stand_up_declared,
    );
    bus.subscribe_fn(
        EventKind::DefenseDeclared,
        SubscriberId::Rules,
        "rules.total_defense",
        on_defense_declared,
    );
}

/// The weapon in the main hand, or an unarmed strike.
pub fn wielded_weapon(world: &World, actor: EntityId) -> WeaponProfile {
    world
        .entities
        .equipment(actor)
        .ok()
        .and_then(|equipment| equipment.equipped(EquipSlot::MainHand))
        .and_then(|equipped| world.content().item(&equipped.item_id))
        .and_then(|item| WeaponProfile::from_item(item, world.config()))
        .unwrap_or_else(|| WeaponProfile::unarmed(world.config()))
}

fn on_stand_up_declared(world: &mut World, envelope: &mut EventEnvelope) -> HandlerResult {
    if envelope.is_cancelled() {
        return Ok(());
    }
    let GameEvent::StandUpDeclared { actor } = envelope.event else {
        return Err(HandlerError::UnexpectedPayload(EventKind::StandUpDeclared));
    };
    world.remove_effects_with_tag(actor, PRONE);
    Ok(())
}

fn on_defense_declared(world: &mut World, envelope: &mut EventEnvelope) -> HandlerResult {
    if envelope.is_cancelled() {
        return Ok(());
    }
    let GameEvent::DefenseDeclared { actor } = envelope.event else {
        return Err(HandlerError::UnexpectedPayload(EventKind::DefenseDeclared));
    };
    world.try_apply_effect(TOTAL_DEFENSE, actor, "action", Some(actor))?;
    Ok(())
}
