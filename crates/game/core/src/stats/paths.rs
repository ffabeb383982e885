//! Dotted target paths understood by the stat pipeline.
//!
//! Any other string is a valid ledger target too; it simply has no built-in
//! meaning and is read back through `query_stat` as a raw ledger total.

pub const STR: &str = "abilities.str";
pub const DEX: &str = "abilities.dex";
pub const CON: &str = "abilities.con";
pub const INT: &str = "abilities.int";
pub const WIS: &str = "abilities.wis";
pub const CHA: &str = "abilities.cha";

pub const AC: &str = "ac";
/// Lowest value wins; caps the dexterity modifier added to AC.
pub const MAX_DEX: &str = "max_dex";

pub const BAB: &str = "bab";
pub const ATTACK: &str = "attack";
pub const MELEE_ATTACK: &str = "attack.melee";
pub const RANGED_ATTACK: &str = "attack.ranged";
pub const DAMAGE: &str = "damage";

pub const SAVES: &str = "saves";
pub const FORTITUDE: &str = "saves.fort";
pub const REFLEX: &str = "saves.ref";
pub const WILL: &str = "saves.will";

pub const CMB: &str = "cmb";
pub const CMD: &str = "cmd";
pub const INITIATIVE: &str = "initiative";
pub const SPEED: &str = "speed";
pub const HIT_POINTS: &str = "hit_points";
pub const CURRENT_HIT_POINTS: &str = "hit_points.current";
pub const SKILL_POINTS: &str = "skill_points";
pub const REACTIONS: &str = "reactions";

pub const BLUFF: &str = "skills.bluff";
pub const SENSE_MOTIVE: &str = "skills.sense_motive";

/// Path of an ability modifier query, e.g. `abilities.str.mod`.
pub const MODIFIER_SUFFIX: &str = ".mod";
