//! Payloads shared between attack declaration, reactors and resolution.
use crate::config::CombatConfig;
use crate::env::{DiceExpr, ItemDefinition};
use crate::state::EntityId;

/// Everything the resolver needs to know about the weapon used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeaponProfile {
    /// `None` for an unarmed strike.
    pub item_id: Option<String>,
    pub name: String,
    pub damage: DiceExpr,
    pub threat_floor: u32,
    pub crit_multiplier: u32,
    pub ranged: bool,
    /// Reach or range in squares.
    pub range: u32,
}

impl WeaponProfile {
    pub fn unarmed(config: &CombatConfig) -> Self {
        Self {
            item_id: None,
            name: "unarmed strike".into(),
            damage: DiceExpr::UNARMED,
            threat_floor: config.default_threat_floor,
            crit_multiplier: config.default_crit_multiplier,
            ranged: false,
            range: 1,
        }
    }

    /// Profile for a weapon item, or `None` if the item is not a weapon.
    pub fn from_item(item: &ItemDefinition, config: &CombatConfig) -> Option<Self> {
        let weapon = item.weapon()?;
        Some(Self {
            item_id: Some(item.id.clone()),
            name: item.name.clone(),
            damage: weapon.damage,
            threat_floor: weapon.threat_floor.unwrap_or(config.default_threat_floor),
            crit_multiplier: weapon
                .crit_multiplier
                .unwrap_or(config.default_crit_multiplier),
            ranged: weapon.ranged,
            range: weapon.range.max(1),
        })
    }
}

/// A labelled addition to a roll, contributed by the resolver or a reactor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RollComponent {
    pub label: String,
    pub value: i32,
}

/// An attack announced by an action, before any roll.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttackDeclaration {
    pub attacker: EntityId,
    pub target: EntityId,
    pub weapon: WeaponProfile,
    /// Zero for the first attack, -5 per iterative attack after it.
    pub iterative_penalty: i32,
    pub opportunity: bool,
}

/// Attack bonus breakdown, open to reactors during `BeforeAttackRoll`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttackContext {
    pub attacker: EntityId,
    pub target: EntityId,
    pub weapon: WeaponProfile,
    pub base_attack: i32,
    pub ability_modifier: i32,
    pub ledger_bonus: i32,
    pub components: Vec<RollComponent>,
    pub opportunity: bool,
}

impl AttackContext {
    pub fn add_component(&mut self, label: impl Into<String>, value: i32) {
        self.components.push(RollComponent {
            label: label.into(),
            value,
        });
    }

    /// Sum added to the natural d20. Used for both the attack and the
    /// confirmation roll.
    pub fn total_bonus(&self) -> i32 {
        self.base_attack
            + self.ability_modifier
            + self.ledger_bonus
            + self.components.iter().map(|c| c.value).sum::<i32>()
    }

    pub fn is_melee(&self) -> bool {
        !self.weapon.ranged
    }
}

/// Damage breakdown, open to reactors during `BeforeDamageRoll`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DamageContext {
    pub attacker: EntityId,
    pub target: EntityId,
    pub dice: DiceExpr,
    /// Times the dice are rolled; the weapon's multiplier on a critical.
    pub multiplier: u32,
    pub ability_bonus: i32,
    pub ledger_bonus: i32,
    pub components: Vec<RollComponent>,
    pub critical: bool,
    pub melee: bool,
}

impl DamageContext {
    pub fn add_component(&mut self, label: impl Into<String>, value: i32) {
        self.components.push(RollComponent {
            label: label.into(),
            value,
        });
    }

    /// Flat amount added once after the dice, regardless of the multiplier.
    pub fn flat_bonus(&self) -> i32 {
        self.dice.bonus
            + self.ability_bonus
            + self.ledger_bonus
            + self.components.iter().map(|c| c.value).sum::<i32>()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum AttackOutcome {
    Miss,
    Hit,
    CriticalHit,
    /// A reactor cancelled the attack before the roll.
    Cancelled,
}

impl AttackOutcome {
    pub fn is_hit(self) -> bool {
        matches!(self, Self::Hit | Self::CriticalHit)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttackRoll {
    pub natural: u32,
    pub total: i32,
}

/// Outcome of one attack, published as `AttackResolved`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttackReport {
    pub attacker: EntityId,
    pub target: EntityId,
    pub outcome: AttackOutcome,
    pub roll: Option<AttackRoll>,
    pub confirmation: Option<AttackRoll>,
    pub target_ac: i32,
    pub damage: Option<i32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum MoveMode {
    /// Ordinary movement up to speed.
    Walk,
    /// One square, never provokes, never into difficult terrain.
    FiveFootStep,
    /// Pushed by another creature; ignores the mover's speed.
    Forced,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ItemState {
    Equipped,
    Unequipped,
    Consumed,
}
