//! Consumables and equipment.
//!
//! An equipped item files its modifiers under an instance source id
//! (`item:<id>#<n>`), so unequipping removes exactly what that copy added.
use tracing::{debug, warn};

use super::ItemState;
use super::damage::heal;
use crate::action::ActionError;
use crate::engine::World;
use crate::env::{ItemDefinition, ItemKind};
use crate::error::GameError;
use crate::events::{EventEnvelope, EventKind, GameEvent, HandlerError, HandlerResult};
use crate::state::{EntityId, EquipSlot, EquippedItem};
use crate::stats::{Modifier, ModifierKind, SourceId, paths};

fn slot_for(item: &ItemDefinition) -> Option<EquipSlot> {
    match item.kind {
        ItemKind::Weapon(_) => Some(EquipSlot::MainHand),
        ItemKind::Shield(_) => Some(EquipSlot::OffHand),
        ItemKind::Armor(_) => Some(EquipSlot::Body),
        ItemKind::Consumable | ItemKind::Gear => None,
    }
}

/// Every modifier an equipped copy of `item` contributes.
fn item_modifiers(item: &ItemDefinition, instance: &SourceId) -> Vec<Modifier> {
    let mut modifiers: Vec<Modifier> = item
        .bonuses
        .iter()
        .map(|bonus| bonus.to_modifier(&item.name, instance))
        .collect();
    let armor = match &item.kind {
        ItemKind::Armor(armor) => Some((armor, ModifierKind::Armor)),
        ItemKind::Shield(armor) => Some((armor, ModifierKind::Shield)),
        _ => None,
    };
    if let Some((armor, kind)) = armor {
        modifiers.push(
            Modifier::new(armor.armor_bonus, kind, paths::AC, item.name.clone())
                .with_source_id(instance.clone()),
        );
        if let Some(max_dex) = armor.max_dex {
            modifiers.push(
                Modifier::new(max_dex, ModifierKind::Untyped, paths::MAX_DEX, item.name.clone())
                    .with_source_id(instance.clone()),
            );
        }
    }
    modifiers.retain(|modifier| {
        if modifier.value == 0 {
            warn!(
                target: "tactics::items",
                item = %item.id,
                path = %modifier.target,
                "skipping zero-valued item modifier"
            );
        }
        modifier.value != 0
    });
    modifiers
}

impl World {
    /// Moves a carried item into its slot, replacing whatever was there.
    pub fn try_equip_item(&mut self, actor: EntityId, item_id: &str) -> Result<EquipSlot, ActionError> {
        let item = self
            .content()
            .item(item_id)
            .cloned()
            .ok_or_else(|| ActionError::WrongItemKind(item_id.to_owned()))?;
        let slot = slot_for(&item).ok_or_else(|| ActionError::WrongItemKind(item_id.to_owned()))?;
        if !self.entities.equipment(actor)?.is_carrying(item_id) {
            return Err(ActionError::ItemNotCarried(item_id.to_owned()));
        }
        self.entities.ledger(actor)?;

        if self.entities.equipment(actor)?.equipped(slot).is_some() {
            self.try_unequip_slot(actor, slot)?;
        }

        let instance = self.next_item_instance(item_id);
        let modifiers = item_modifiers(&item, &instance);
        let ledger = self.entities.ledger_mut(actor)?;
        for modifier in modifiers {
            // Zero values were filtered above, the only way `add` fails.
            let _ = ledger.add(modifier);
        }
        let equipment = self.entities.equipment_mut(actor)?;
        equipment.take_carried(item_id);
        equipment.slots.insert(
            slot,
            EquippedItem {
                item_id: item_id.to_owned(),
                instance: instance.clone(),
            },
        );
        self.recalculate(actor);

        debug!(target: "tactics::items", %actor, item = item_id, %slot, %instance, "equipped");
        self.publish(GameEvent::ItemStateChanged {
            entity: actor,
            item_id: item_id.to_owned(),
            state: ItemState::Equipped,
        });
        Ok(slot)
    }

    /// Façade over [`World::try_equip_item`] that logs and returns false on failure.
    pub fn equip_item(&mut self, actor: EntityId, item_id: &str) -> bool {
        self.try_equip_item(actor, item_id)
            .map_err(|err| {
                warn!(
                    target: "tactics::items",
                    %actor,
                    item = item_id,
                    code = err.error_code(),
                    error = %err,
                    "item not equipped"
                );
            })
            .is_ok()
    }

    /// Empties `slot`, strips every modifier of that item instance and
    /// returns the item to the carried list.
    pub fn try_unequip_slot(&mut self, actor: EntityId, slot: EquipSlot) -> Result<String, ActionError> {
        let equipped = self
            .entities
            .equipment(actor)?
            .equipped(slot)
            .cloned()
            .ok_or(ActionError::RuleViolation("slot is empty"))?;
        self.entities.ledger(actor)?;

        let equipment = self.entities.equipment_mut(actor)?;
        equipment.slots.remove(&slot);
        equipment.carried.push(equipped.item_id.clone());
        let removed = self
            .entities
            .ledger_mut(actor)?
            .remove_by_source(&equipped.instance);
        self.recalculate(actor);

        debug!(
            target: "tactics::items",
            %actor,
            item = %equipped.item_id,
            %slot,
            removed,
            "unequipped"
        );
        self.publish(GameEvent::ItemStateChanged {
            entity: actor,
            item_id: equipped.item_id.clone(),
            state: ItemState::Unequipped,
        });
        Ok(equipped.item_id)
    }

    /// Uses up one carried consumable: heals and applies its effects.
    pub fn try_use_item(&mut self, actor: EntityId, item_id: &str) -> Result<(), ActionError> {
        let item = self
            .content()
            .item(item_id)
            .cloned()
            .ok_or_else(|| ActionError::WrongItemKind(item_id.to_owned()))?;
        if item.kind != ItemKind::Consumable {
            return Err(ActionError::WrongItemKind(item_id.to_owned()));
        }
        if !self.entities.equipment_mut(actor)?.take_carried(item_id) {
            return Err(ActionError::ItemNotCarried(item_id.to_owned()));
        }

        if let Some(healing) = item.healing {
            let amount = (self.roll_dice(&healing) + healing.bonus).max(1);
            heal(self, actor, amount);
        }
        let label = format!("item:{item_id}");
        for effect_id in &item.effects {
            self.apply_effect(effect_id, actor, &label);
        }
        debug!(target: "tactics::items", %actor, item = item_id, "consumed");
        self.publish(GameEvent::ItemStateChanged {
            entity: actor,
            item_id: item_id.to_owned(),
            state: ItemState::Consumed,
        });
        Ok(())
    }
}

pub(super) fn on_item_use_declared(world: &mut World, envelope: &mut EventEnvelope) -> HandlerResult {
    if envelope.is_cancelled() {
        return Ok(());
    }
    let GameEvent::ItemUseDeclared { actor, item_id } = &envelope.event else {
        return Err(HandlerError::UnexpectedPayload(EventKind::ItemUseDeclared));
    };
    world.try_use_item(*actor, item_id)?;
    Ok(())
}

pub(super) fn on_equip_declared(world: &mut World, envelope: &mut EventEnvelope) -> HandlerResult {
    if envelope.is_cancelled() {
        return Ok(());
    }
    let GameEvent::EquipDeclared { actor, item_id } = &envelope.event else {
        return Err(HandlerError::UnexpectedPayload(EventKind::EquipDeclared));
    };
    world.try_equip_item(*actor, item_id)?;
    Ok(())
}

pub(super) fn on_unequip_declared(world: &mut World, envelope: &mut EventEnvelope) -> HandlerResult {
    if envelope.is_cancelled() {
        return Ok(());
    }
    let GameEvent::UnequipDeclared { actor, slot } = envelope.event else {
        return Err(HandlerError::UnexpectedPayload(EventKind::UnequipDeclared));
    };
    world.try_unequip_slot(actor, slot)?;
    Ok(())
}
