use super::{ActionCost, ActionError, ActionTraits, ActionTransition};
use crate::engine::World;
use crate::env::{ItemDefinition, ItemKind};
use crate::events::GameEvent;
use crate::state::{EntityId, EquipSlot};

fn carried_item<'w>(
    world: &'w World,
    actor: EntityId,
    item_id: &str,
) -> Result<&'w ItemDefinition, ActionError> {
    if !world.entities.equipment(actor)?.is_carrying(item_id) {
        return Err(ActionError::ItemNotCarried(item_id.to_owned()));
    }
    world
        .content()
        .item(item_id)
        .ok_or_else(|| ActionError::WrongItemKind(item_id.to_owned()))
}

/// Drink, read or otherwise consume a carried item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UseItemAction {
    pub item_id: String,
}

impl ActionTransition for UseItemAction {
    fn name(&self) -> &'static str {
        "use_item"
    }

    fn description(&self) -> &'static str {
        "Use up a consumable item and gain its effects."
    }

    fn cost(&self) -> ActionCost {
        ActionCost::Standard
    }

    fn traits(&self) -> ActionTraits {
        ActionTraits::PROVOKES
    }

    fn validate(&self, world: &World, actor: EntityId) -> Result<(), ActionError> {
        let item = carried_item(world, actor, &self.item_id)?;
        if item.kind != ItemKind::Consumable {
            return Err(ActionError::WrongItemKind(self.item_id.clone()));
        }
        Ok(())
    }

    fn execute(&self, world: &mut World, actor: EntityId) -> Result<(), ActionError> {
        world.publish(GameEvent::ItemUseDeclared {
            actor,
            item_id: self.item_id.clone(),
        });
        Ok(())
    }
}

/// Wield a weapon or don armor from what is carried.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EquipAction {
    pub item_id: String,
}

impl ActionTransition for EquipAction {
    fn name(&self) -> &'static str {
        "equip"
    }

    fn description(&self) -> &'static str {
        "Equip a carried weapon, armor or shield."
    }

    fn cost(&self) -> ActionCost {
        ActionCost::Move
    }

    fn validate(&self, world: &World, actor: EntityId) -> Result<(), ActionError> {
        let item = carried_item(world, actor, &self.item_id)?;
        if !item.is_equippable() {
            return Err(ActionError::WrongItemKind(self.item_id.clone()));
        }
        Ok(())
    }

    fn execute(&self, world: &mut World, actor: EntityId) -> Result<(), ActionError> {
        world.publish(GameEvent::EquipDeclared {
            actor,
            item_id: self.item_id.clone(),
        });
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnequipAction {
    pub slot: EquipSlot,
}

impl ActionTransition for UnequipAction {
    fn name(&self) -> &'static str {
        "unequip"
    }

    fn description(&self) -> &'static str {
        "Put away whatever occupies an equipment slot."
    }

    fn cost(&self) -> ActionCost {
        ActionCost::Move
    }

    fn validate(&self, world: &World, actor: EntityId) -> Result<(), ActionError> {
        if world.entities.equipment(actor)?.equipped(self.slot).is_none() {
            return Err(ActionError::RuleViolation("slot is empty"));
        }
        Ok(())
    }

    fn execute(&self, world: &mut World, actor: EntityId) -> Result<(), ActionError> {
        world.publish(GameEvent::UnequipDeclared {
            actor,
            slot: self.slot,
        });
        Ok(())
    }
}
