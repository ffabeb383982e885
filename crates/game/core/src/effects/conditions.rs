//! Conditions the rules apply on their own, available without content.
use crate::env::EffectDefinition;
use crate::stats::paths;

pub const PRONE: &str = "prone";
pub const GRAPPLED: &str = "grappled";
pub const FLAT_FOOTED: &str = crate::stats::FLAT_FOOTED;
pub const TOTAL_DEFENSE: &str = "total_defense";

/// Tags that make an entity lose its turn.
pub const INCAPACITATING: [&str; 4] = ["stunned", "paralyzed", "helpless", "unconscious"];

/// Built-in definition for `id`, if it names one.
///
/// Durations count the owner's turn ends: an effect applied during its
/// owner's own turn loses one round at the end of that same turn.
pub fn builtin(id: &str) -> Option<EffectDefinition> {
    let definition = match id {
        PRONE => EffectDefinition::new(PRONE, "Prone")
            .with_tag(PRONE)
            .with_bonus(paths::MELEE_ATTACK, -4, "untyped"),
        GRAPPLED => EffectDefinition::new(GRAPPLED, "Grappled")
            .lasting(1)
            .with_tag(GRAPPLED)
            .with_bonus(paths::DEX, -4, "untyped")
            .with_bonus(paths::ATTACK, -2, "untyped"),
        FLAT_FOOTED => EffectDefinition::new(FLAT_FOOTED, "Flat-footed")
            .lasting(1)
            .with_tag(FLAT_FOOTED),
        TOTAL_DEFENSE => EffectDefinition::new(TOTAL_DEFENSE, "Total defense")
            .lasting(2)
            .with_tag(TOTAL_DEFENSE)
            .with_bonus(paths::AC, 4, "dodge"),
        _ => return None,
    };
    Some(definition)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_carry_their_tag() {
        for id in [PRONE, GRAPPLED, FLAT_FOOTED, TOTAL_DEFENSE] {
            let definition = builtin(id).unwrap();
            assert_eq!(definition.id, id);
            assert!(definition.tags.iter().any(|tag| tag == id));
        }
        assert!(builtin("bless").is_none());
    }
}
