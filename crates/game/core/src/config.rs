/// When a prepared (readied) action stops waiting for its trigger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ReadiedExpiry {
    /// Discarded when the preparing actor's next turn begins.
    #[default]
    NextTurnStart,
    /// Kept until it fires or combat ends.
    EndOfCombat,
}

/// Combat rules constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatConfig {
    /// Armor class of an unarmored target with no dexterity modifier.
    pub base_armor_class: i32,
    /// Natural d20 at or above which an attack threatens when no weapon overrides it.
    pub default_threat_floor: u32,
    /// Critical damage multiplier used when no weapon overrides it.
    pub default_crit_multiplier: u32,
    /// Nested publish depth at which an event is dropped with a warning.
    pub max_event_depth: usize,
    /// Upper bound on queued actions drained for a single submission.
    pub max_actions_per_turn: usize,
    /// Keep every delivered event in the bus journal.
    pub record_events: bool,
    /// Battle grid width in squares. Zero leaves the grid unbounded.
    pub grid_width: u32,
    /// Battle grid height in squares. Zero leaves the grid unbounded.
    pub grid_height: u32,
    pub readied_expiry: ReadiedExpiry,
}

impl CombatConfig {
    pub const DEFAULT_BASE_ARMOR_CLASS: i32 = 10;
    pub const DEFAULT_THREAT_FLOOR: u32 = 20;
    pub const DEFAULT_CRIT_MULTIPLIER: u32 = 2;
    pub const DEFAULT_MAX_EVENT_DEPTH: usize = 64;
    pub const DEFAULT_MAX_ACTIONS_PER_TURN: usize = 32;

    pub fn new() -> Self {
        Self {
            base_armor_class: Self::DEFAULT_BASE_ARMOR_CLASS,
            default_threat_floor: Self::DEFAULT_THREAT_FLOOR,
            default_crit_multiplier: Self::DEFAULT_CRIT_MULTIPLIER,
            max_event_depth: Self::DEFAULT_MAX_EVENT_DEPTH,
            max_actions_per_turn: Self::DEFAULT_MAX_ACTIONS_PER_TURN,
            record_events: true,
            grid_width: 0,
            grid_height: 0,
            readied_expiry: ReadiedExpiry::NextTurnStart,
        }
    }

    pub fn with_grid(mut self, width: u32, height: u32) -> Self {
        self.grid_width = width;
        self.grid_height = height;
        self
    }

    pub fn with_readied_expiry(mut self, expiry: ReadiedExpiry) -> Self {
        self.readied_expiry = expiry;
        self
    }

    /// Returns true when movement is constrained to a fixed rectangle.
    pub fn is_bounded(&self) -> bool {
        self.grid_width > 0 && self.grid_height > 0
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}
