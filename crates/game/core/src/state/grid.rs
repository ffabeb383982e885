//! Battle grid terrain: bounds, impassable squares and timed difficult terrain.
use std::collections::{BTreeMap, BTreeSet};

use super::Position;

/// Difficult terrain that may disappear after a number of rounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimedTerrain {
    /// Rounds left; `None` never expires.
    pub remaining: Option<u32>,
}

/// Squares of the battlefield that affect movement.
///
/// Occupancy is derived from entity positions in the store, not kept here.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BattleGrid {
    width: u32,
    height: u32,
    blocked: BTreeSet<Position>,
    difficult: BTreeMap<Position, TimedTerrain>,
}

impl BattleGrid {
    /// A zero width or height leaves the grid unbounded.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn in_bounds(&self, position: &Position) -> bool {
        if self.width == 0 || self.height == 0 {
            return true;
        }
        position.x >= 0
            && position.y >= 0
            && (position.x as u32) < self.width
            && (position.y as u32) < self.height
    }

    pub fn block(&mut self, position: Position) {
        self.blocked.insert(position);
    }

    pub fn is_blocked(&self, position: &Position) -> bool {
        self.blocked.contains(position)
    }

    /// Marks difficult terrain, optionally lasting only `rounds` rounds.
    pub fn add_difficult(&mut self, position: Position, rounds: Option<u32>) {
        self.difficult
            .insert(position, TimedTerrain { remaining: rounds });
    }

    pub fn is_difficult(&self, position: &Position) -> bool {
        self.difficult.contains_key(position)
    }

    /// Squares of movement spent entering `position`.
    pub fn entry_cost(&self, position: &Position) -> u32 {
        if self.is_difficult(position) { 2 } else { 1 }
    }

    /// Ages timed terrain by one round and drops what expired.
    ///
    /// Returns the squares that reverted to normal terrain.
    pub fn tick_round(&mut self) -> Vec<Position> {
        let mut expired = Vec::new();
        self.difficult.retain(|position, terrain| match &mut terrain.remaining {
            Some(rounds) if *rounds <= 1 => {
                expired.push(*position);
                false
            }
            Some(rounds) => {
                *rounds -= 1;
                true
            }
            None => true,
        });
        expired
    }
}
