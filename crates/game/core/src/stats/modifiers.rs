//! Typed modifiers and the per-entity modifier ledger.
//!
//! Modifiers of the same kind do not stack: only the largest bonus (or, when
//! every entry is a penalty, the deepest penalty) counts. Untyped, dodge and
//! circumstance modifiers are the exception and always sum.
//!
//! ```
//! # use tactics_core::stats::{Modifier, ModifierKind, ModifierLedger};
//! let mut ledger = ModifierLedger::default();
//! ledger.add(Modifier::new(4, ModifierKind::Enhancement, "abilities.str", "belt")).unwrap();
//! ledger.add(Modifier::new(2, ModifierKind::Enhancement, "abilities.str", "spell")).unwrap();
//! ledger.add(Modifier::new(2, ModifierKind::Untyped, "abilities.str", "rage")).unwrap();
//! assert_eq!(ledger.total("abilities.str"), 6);
//! ```
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{ErrorSeverity, GameError};

/// Bonus type. Determines whether two modifiers on the same target stack.
#[derive(
    Clone,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ModifierKind {
    Untyped,
    Dodge,
    Circumstance,
    Alchemical,
    Armor,
    Competence,
    Deflection,
    Enhancement,
    Inherent,
    Insight,
    Luck,
    Morale,
    NaturalArmor,
    Profane,
    Racial,
    Resistance,
    Sacred,
    Shield,
    Size,
    /// Any bonus type without a built-in name. Follows the non-stacking rule.
    #[strum(default)]
    Other(String),
}

impl ModifierKind {
    /// True for kinds whose modifiers always sum.
    pub fn always_stacks(&self) -> bool {
        matches!(self, Self::Untyped | Self::Dodge | Self::Circumstance)
    }

    /// Parses a bonus type name, treating an empty string as untyped.
    pub fn parse(name: &str) -> Self {
        if name.trim().is_empty() {
            return Self::Untyped;
        }
        name.trim()
            .parse()
            .unwrap_or_else(|_| Self::Other(name.trim().to_owned()))
    }
}

/// Identifier shared by every modifier, tag and effect one source created.
///
/// Effects use `<effect_id>@<label>` so the same effect from two origins
/// coexists while re-applying from one origin refreshes it.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(String);

impl SourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn composite(effect_id: &str, label: &str) -> Self {
        Self(format!("{effect_id}@{label}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A single typed adjustment to one target path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Modifier {
    pub value: i32,
    pub kind: ModifierKind,
    /// Dotted stat path, e.g. `abilities.str` or `ac`.
    pub target: String,
    /// Human-readable origin, e.g. `belt of giant strength`.
    pub source: String,
    pub source_id: Option<SourceId>,
    /// Informational round count; expiry is driven by the owning effect.
    pub duration: Option<u32>,
}

impl Modifier {
    pub fn new(
        value: i32,
        kind: ModifierKind,
        target: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            value,
            kind,
            target: target.into(),
            source: source.into(),
            source_id: None,
            duration: None,
        }
    }

    pub fn with_source_id(mut self, source_id: SourceId) -> Self {
        self.source_id = Some(source_id);
        self
    }

    pub fn with_duration(mut self, rounds: u32) -> Self {
        self.duration = Some(rounds);
        self
    }
}

/// Errors raised by [`ModifierLedger`] writes.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// A zero modifier carries no information and is rejected.
    #[error("modifier on '{target}' from '{origin}' has value zero")]
    ZeroValue { target: String, origin: String },
}

impl GameError for LedgerError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ZeroValue { .. } => "LEDGER_ZERO_VALUE",
        }
    }
}

/// Sums modifiers under the stacking rules.
pub fn stacked_total<'a>(modifiers: impl IntoIterator<Item = &'a Modifier>) -> i32 {
    let mut stacking = 0;
    // kind -> (largest, smallest)
    let mut typed: BTreeMap<&ModifierKind, (i32, i32)> = BTreeMap::new();
    for modifier in modifiers {
        if modifier.kind.always_stacks() {
            stacking += modifier.value;
            continue;
        }
        typed
            .entry(&modifier.kind)
            .and_modify(|(high, low)| {
                *high = (*high).max(modifier.value);
                *low = (*low).min(modifier.value);
            })
            .or_insert((modifier.value, modifier.value));
    }
    stacking
        + typed
            .values()
            .map(|&(high, low)| if high > 0 { high } else { low })
            .sum::<i32>()
}

/// All modifiers currently applied to one entity, grouped by target path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModifierLedger {
    entries: BTreeMap<String, Vec<Modifier>>,
}

impl ModifierLedger {
    pub fn add(&mut self, modifier: Modifier) -> Result<(), LedgerError> {
        if modifier.value == 0 {
            return Err(LedgerError::ZeroValue {
                target: modifier.target,
                origin: modifier.source,
            });
        }
        self.entries
            .entry(modifier.target.clone())
            .or_default()
            .push(modifier);
        Ok(())
    }

    pub fn modifiers(&self, target: &str) -> &[Modifier] {
        self.entries.get(target).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Stacked total for `target`; zero when nothing applies.
    pub fn total(&self, target: &str) -> i32 {
        stacked_total(self.modifiers(target))
    }

    /// Stacked total across several targets as if they were one.
    ///
    /// A resistance bonus to `saves` and another to `saves.will` do not stack.
    pub fn total_over(&self, targets: &[&str]) -> i32 {
        stacked_total(targets.iter().flat_map(|target| self.modifiers(target)))
    }

    /// Stacked total over the modifiers of `target` that pass `filter`.
    pub fn total_where(&self, target: &str, filter: impl Fn(&Modifier) -> bool) -> i32 {
        stacked_total(self.modifiers(target).iter().filter(|m| filter(m)))
    }

    /// Smallest raw value on `target`, or `i32::MAX` when nothing applies.
    ///
    /// Used for caps such as `max_dex` where only the tightest one counts.
    pub fn lowest(&self, target: &str) -> i32 {
        self.modifiers(target)
            .iter()
            .map(|modifier| modifier.value)
            .min()
            .unwrap_or(i32::MAX)
    }

    /// Deletes every modifier filed under `source_id`, on every target.
    ///
    /// Returns the number removed.
    pub fn remove_by_source(&mut self, source_id: &SourceId) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, modifiers| {
            let before = modifiers.len();
            modifiers.retain(|modifier| modifier.source_id.as_ref() != Some(source_id));
            removed += before - modifiers.len();
            !modifiers.is_empty()
        });
        removed
    }

    pub fn count_from(&self, source_id: &SourceId) -> usize {
        self.entries
            .values()
            .flatten()
            .filter(|modifier| modifier.source_id.as_ref() == Some(source_id))
            .count()
    }

    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
