//! Dice rolling for every random outcome in combat.
//!
//! All randomness goes through a [`DiceRoller`]. Given the same seed,
//! [`PcgDice`] produces the same sequence of rolls, and [`ScriptedDice`] plays
//! back an exact list, which makes whole encounters replayable in tests.
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use tracing::warn;

use super::ContentError;

/// Source of die rolls.
pub trait DiceRoller {
    /// Roll a die with `sides` sides (1..=sides).
    fn roll_die(&mut self, sides: u32) -> u32;

    fn roll_d20(&mut self) -> u32 {
        self.roll_die(20)
    }

    /// Sum of the dice in `expr`, without its flat bonus.
    fn roll_dice(&mut self, expr: &DiceExpr) -> i32 {
        (0..expr.count)
            .map(|_| self.roll_die(expr.sides) as i32)
            .sum()
    }
}

/// PCG-XSH-RR generator with 64-bit state and 32-bit output.
#[derive(Clone, Debug)]
pub struct PcgDice {
    state: u64,
}

impl PcgDice {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    pub fn new(seed: u64) -> Self {
        Self {
            state: Self::mix_seed(seed),
        }
    }

    /// Avalanches the seed so nearby seeds give unrelated sequences.
    fn mix_seed(seed: u64) -> u64 {
        let mut hash = seed ^ 0x9e3779b97f4a7c15;
        hash ^= hash >> 33;
        hash = hash.wrapping_mul(0xff51afd7ed558ccd);
        hash ^= hash >> 33;
        hash
    }

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = Self::pcg_step(self.state);
        Self::pcg_output(self.state)
    }
}

impl DiceRoller for PcgDice {
    fn roll_die(&mut self, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        (self.next_u32() % sides) + 1
    }
}

/// Plays back a fixed list of natural rolls in order.
///
/// Each value is clamped into the die being rolled. Once the script runs out
/// every further roll returns 1 and logs a warning.
#[derive(Clone, Debug, Default)]
pub struct ScriptedDice {
    rolls: VecDeque<u32>,
}

impl ScriptedDice {
    pub fn new(rolls: impl IntoIterator<Item = u32>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
        }
    }

    pub fn push(&mut self, roll: u32) {
        self.rolls.push_back(roll);
    }

    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl DiceRoller for ScriptedDice {
    fn roll_die(&mut self, sides: u32) -> u32 {
        match self.rolls.pop_front() {
            Some(roll) => roll.clamp(1, sides.max(1)),
            None => {
                warn!(target: "tactics::dice", sides, "dice script exhausted");
                1
            }
        }
    }
}

/// Dice notation such as `2d6+3`, `d8` or a flat `4`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct DiceExpr {
    pub count: u32,
    pub sides: u32,
    pub bonus: i32,
}

impl DiceExpr {
    /// Damage of an unarmed strike.
    pub const UNARMED: Self = Self::new(1, 3, 0);

    pub const fn new(count: u32, sides: u32, bonus: i32) -> Self {
        Self {
            count,
            sides,
            bonus,
        }
    }

    pub fn max(&self) -> i32 {
        (self.count * self.sides) as i32 + self.bonus
    }
}

impl fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 0 || self.sides == 0 {
            return write!(f, "{}", self.bonus);
        }
        write!(f, "{}d{}", self.count, self.sides)?;
        match self.bonus {
            0 => Ok(()),
            bonus if bonus > 0 => write!(f, "+{bonus}"),
            bonus => write!(f, "{bonus}"),
        }
    }
}

impl FromStr for DiceExpr {
    type Err = ContentError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || ContentError::InvalidDice(raw.to_owned());
        let text: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        let text = text.to_ascii_lowercase();
        if text.is_empty() {
            return Err(invalid());
        }

        let Some((count, rest)) = text.split_once('d') else {
            let bonus = text.parse::<i32>().map_err(|_| invalid())?;
            return Ok(Self::new(0, 0, bonus));
        };

        let count = if count.is_empty() {
            1
        } else {
            count.parse::<u32>().map_err(|_| invalid())?
        };
        let (sides, bonus) = match rest.find(['+', '-']) {
            Some(index) => {
                let (sides, bonus) = rest.split_at(index);
                let bonus = bonus
                    .trim_start_matches('+')
                    .parse::<i32>()
                    .map_err(|_| invalid())?;
                (sides, bonus)
            }
            None => (rest, 0),
        };
        let sides = sides.parse::<u32>().map_err(|_| invalid())?;
        if sides == 0 {
            return Err(invalid());
        }
        Ok(Self::new(count, sides, bonus))
    }
}

impl TryFrom<String> for DiceExpr {
    type Error = ContentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DiceExpr> for String {
    fn from(value: DiceExpr) -> Self {
        value.to_string()
    }
}
