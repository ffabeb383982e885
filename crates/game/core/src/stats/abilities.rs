//! The six ability scores and their modifiers.

use super::paths;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Ability {
    Str,
    Dex,
    Con,
    Int,
    Wis,
    Cha,
}

impl Ability {
    /// Ledger target path, e.g. `abilities.str`.
    pub const fn path(self) -> &'static str {
        match self {
            Self::Str => paths::STR,
            Self::Dex => paths::DEX,
            Self::Con => paths::CON,
            Self::Int => paths::INT,
            Self::Wis => paths::WIS,
            Self::Cha => paths::CHA,
        }
    }
}

/// Modifier for an ability score: floor((score - 10) / 2).
pub fn ability_modifier(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

/// A full set of ability scores.
///
/// Used both for the stored base scores and for the effective scores in
/// [`super::ComputedStats`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AbilityScores {
    pub str: i32,
    pub dex: i32,
    pub con: i32,
    pub int: i32,
    pub wis: i32,
    pub cha: i32,
}

impl AbilityScores {
    pub const AVERAGE: i32 = 10;

    pub fn new(str: i32, dex: i32, con: i32, int: i32, wis: i32, cha: i32) -> Self {
        Self {
            str,
            dex,
            con,
            int,
            wis,
            cha,
        }
    }

    pub fn get(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Str => self.str,
            Ability::Dex => self.dex,
            Ability::Con => self.con,
            Ability::Int => self.int,
            Ability::Wis => self.wis,
            Ability::Cha => self.cha,
        }
    }

    pub fn set(&mut self, ability: Ability, score: i32) {
        match ability {
            Ability::Str => self.str = score,
            Ability::Dex => self.dex = score,
            Ability::Con => self.con = score,
            Ability::Int => self.int = score,
            Ability::Wis => self.wis = score,
            Ability::Cha => self.cha = score,
        }
    }

    pub fn modifier(&self, ability: Ability) -> i32 {
        ability_modifier(self.get(ability))
    }
}

impl Default for AbilityScores {
    fn default() -> Self {
        let avg = Self::AVERAGE;
        Self::new(avg, avg, avg, avg, avg, avg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifiers_round_toward_negative_infinity() {
        assert_eq!(ability_modifier(10), 0);
        assert_eq!(ability_modifier(11), 0);
        assert_eq!(ability_modifier(18), 4);
        assert_eq!(ability_modifier(9), -1);
        assert_eq!(ability_modifier(7), -2);
        assert_eq!(ability_modifier(1), -5);
    }

    #[test]
    fn ability_paths_round_trip_through_names() {
        assert_eq!(Ability::Dex.path(), "abilities.dex");
        assert_eq!("WIS".parse::<Ability>().ok(), Some(Ability::Wis));
    }
}
