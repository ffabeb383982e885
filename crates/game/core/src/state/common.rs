use std::fmt;

/// Unique identifier for any entity tracked by the [`super::EntityStore`].
///
/// Identifiers are allocated monotonically and never reused within a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Discrete battle grid position expressed in squares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Grid distance in squares with diagonal moves counting as one.
    pub fn distance(&self, other: &Position) -> u32 {
        let dx = (self.x - other.x).unsigned_abs();
        let dy = (self.y - other.y).unsigned_abs();
        dx.max(dy)
    }

    /// True for the eight squares surrounding this one.
    pub fn is_adjacent(&self, other: &Position) -> bool {
        self.distance(other) == 1
    }

    /// One square closer to `target`, moving diagonally when both axes differ.
    pub fn step_toward(&self, target: &Position) -> Position {
        Position::new(
            self.x + (target.x - self.x).signum(),
            self.y + (target.y - self.y).signum(),
        )
    }

    /// The square on the far side of `self` as seen from `origin`.
    pub fn away_from(&self, origin: &Position) -> Position {
        Position::new(
            self.x + (self.x - origin.x).signum(),
            self.y + (self.y - origin.y).signum(),
        )
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Allegiance of a combatant.
///
/// Combat continues only while at least two living combatants are hostile
/// to each other.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Faction {
    /// Player-controlled party
    Player,
    /// Fights alongside the player
    Ally,
    /// Never starts or joins a fight
    #[default]
    Neutral,
    /// Opposes the player and allies
    Hostile,
}

impl Faction {
    /// Check if this faction is hostile to another faction.
    pub fn is_hostile_to(&self, other: &Faction) -> bool {
        matches!(
            (self, other),
            (Faction::Player | Faction::Ally, Faction::Hostile)
                | (Faction::Hostile, Faction::Player | Faction::Ally)
        )
    }
}

/// Who chooses actions for an entity on its turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Controller {
    Player,
    #[default]
    Ai,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacency_includes_diagonals() {
        let center = Position::new(2, 2);
        assert!(center.is_adjacent(&Position::new(3, 3)));
        assert!(center.is_adjacent(&Position::new(2, 1)));
        assert!(!center.is_adjacent(&center));
        assert!(!center.is_adjacent(&Position::new(4, 2)));
        assert_eq!(center.distance(&Position::new(5, 4)), 3);
    }

    #[test]
    fn hostility_is_symmetric() {
        assert!(Faction::Player.is_hostile_to(&Faction::Hostile));
        assert!(Faction::Hostile.is_hostile_to(&Faction::Ally));
        assert!(!Faction::Player.is_hostile_to(&Faction::Ally));
        assert!(!Faction::Neutral.is_hostile_to(&Faction::Hostile));
        assert!(!Faction::Hostile.is_hostile_to(&Faction::Hostile));
    }

    #[test]
    fn faction_parses_snake_case() {
        assert_eq!("hostile".parse::<Faction>().ok(), Some(Faction::Hostile));
        assert_eq!(Faction::Ally.to_string(), "ally");
    }
}
