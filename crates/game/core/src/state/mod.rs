//! Entity store and per-entity component records.
//!
//! Every per-entity record (identity, attributes, modifiers, effects, health,
//! budget, position) lives in one [`EntityStore`] keyed by [`EntityId`]. No
//! other subsystem keeps a private copy; they read and write through the
//! accessors here so despawning an entity removes everything it owned.
mod budget;
mod common;
mod components;
mod error;
mod grid;

use std::collections::BTreeMap;

pub use budget::ActionBudget;
pub use common::{Controller, EntityId, Faction, Position};
pub use components::{
    ClassLevel, EquipSlot, EquippedItem, Equipment, Grants, Health, Identity, Progression,
};
pub use error::StoreError;
pub use grid::{BattleGrid, TimedTerrain};

use crate::effects::ActiveEffect;
use crate::stats::{AbilityScores, ComputedStats, ModifierLedger};

/// Component table keyed by entity, iterated in id order.
pub type ComponentMap<T> = BTreeMap<EntityId, T>;

/// Component categories, used in diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ComponentKind {
    Identity,
    Attributes,
    Progression,
    Stats,
    Health,
    Budget,
    Ledger,
    Effects,
    Grants,
    Equipment,
    Position,
}

macro_rules! component_accessors {
    ($($field:ident, $field_mut:ident: $ty:ty => $kind:ident;)*) => {
        $(
            pub fn $field(&self, id: EntityId) -> Result<&$ty, StoreError> {
                self.$field
                    .get(&id)
                    .ok_or_else(|| self.absent(id, ComponentKind::$kind))
            }

            pub fn $field_mut(&mut self, id: EntityId) -> Result<&mut $ty, StoreError> {
                if !self.$field.contains_key(&id) {
                    return Err(self.absent(id, ComponentKind::$kind));
                }
                self.$field
                    .get_mut(&id)
                    .ok_or(StoreError::missing(id, ComponentKind::$kind))
            }
        )*
    };
}

/// Owns every per-entity component.
#[derive(Debug, Default)]
pub struct EntityStore {
    next_id: u32,
    identity: ComponentMap<Identity>,
    attributes: ComponentMap<AbilityScores>,
    progression: ComponentMap<Progression>,
    stats: ComponentMap<ComputedStats>,
    health: ComponentMap<Health>,
    budget: ComponentMap<ActionBudget>,
    ledger: ComponentMap<ModifierLedger>,
    effects: ComponentMap<Vec<ActiveEffect>>,
    grants: ComponentMap<Grants>,
    equipment: ComponentMap<Equipment>,
    position: ComponentMap<Position>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh id with the components every entity carries:
    /// identity, modifier ledger, effect list, grants, equipment and budget.
    pub fn spawn(&mut self, identity: Identity) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.identity.insert(id, identity);
        self.ledger.insert(id, ModifierLedger::default());
        self.effects.insert(id, Vec::new());
        self.grants.insert(id, Grants::default());
        self.equipment.insert(id, Equipment::default());
        self.budget.insert(id, ActionBudget::default());
        id
    }

    /// Removes the entity and all of its components.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        let existed = self.identity.remove(&id).is_some();
        self.attributes.remove(&id);
        self.progression.remove(&id);
        self.stats.remove(&id);
        self.health.remove(&id);
        self.budget.remove(&id);
        self.ledger.remove(&id);
        self.effects.remove(&id);
        self.grants.remove(&id);
        self.equipment.remove(&id);
        self.position.remove(&id);
        existed
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.identity.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.identity.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.identity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identity.is_empty()
    }

    /// True when the entity exists and has hit points above zero.
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.health.get(&id).is_some_and(Health::is_alive)
    }

    pub fn has_tag(&self, id: EntityId, tag: &str) -> bool {
        self.grants.get(&id).is_some_and(|grants| grants.has_tag(tag))
    }

    /// Living entity standing on `position`, other than `except`.
    pub fn occupant(&self, position: &Position, except: Option<EntityId>) -> Option<EntityId> {
        self.position
            .iter()
            .filter(|(id, _)| Some(**id) != except && self.is_alive(**id))
            .find(|(_, at)| *at == position)
            .map(|(id, _)| *id)
    }

    pub fn set_attributes(&mut self, id: EntityId, scores: AbilityScores) {
        self.attributes.insert(id, scores);
    }

    pub fn set_progression(&mut self, id: EntityId, progression: Progression) {
        self.progression.insert(id, progression);
    }

    pub fn set_stats(&mut self, id: EntityId, stats: ComputedStats) {
        self.stats.insert(id, stats);
    }

    pub fn set_health(&mut self, id: EntityId, health: Health) {
        self.health.insert(id, health);
    }

    pub fn set_position(&mut self, id: EntityId, position: Position) {
        self.position.insert(id, position);
    }

    component_accessors! {
        identity, identity_mut: Identity => Identity;
        attributes, attributes_mut: AbilityScores => Attributes;
        progression, progression_mut: Progression => Progression;
        stats, stats_mut: ComputedStats => Stats;
        health, health_mut: Health => Health;
        budget, budget_mut: ActionBudget => Budget;
        ledger, ledger_mut: ModifierLedger => Ledger;
        effects, effects_mut: Vec<ActiveEffect> => Effects;
        grants, grants_mut: Grants => Grants;
        equipment, equipment_mut: Equipment => Equipment;
        position, position_mut: Position => Position;
    }

    fn absent(&self, id: EntityId, component: ComponentKind) -> StoreError {
        if self.contains(id) {
            StoreError::missing(id, component)
        } else {
            StoreError::UnknownEntity(id)
        }
    }
}
