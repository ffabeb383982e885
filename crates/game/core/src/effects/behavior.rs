//! Effects whose rules go beyond flat modifiers.
//!
//! A behavior reacts to the effect being applied by subscribing handlers on
//! the bus under the owning entity and the effect's source id. Removal unsubscribes that owner, so
//! a behavior never outlives its effect.
use std::collections::HashMap;
use std::rc::Rc;

use tracing::trace;

use super::ActiveEffect;
use crate::combat::apply_damage;
use crate::env::DiceExpr;
use crate::events::{EventBus, EventKind, GameEvent};
use crate::stats::paths;

pub trait EffectBehavior {
    fn on_apply(&self, effect: &ActiveEffect, bus: &mut EventBus);

    fn on_remove(&self, effect: &ActiveEffect, bus: &mut EventBus) {
        bus.unsubscribe(&effect.subscriber());
    }
}

/// Behaviors keyed by effect id.
#[derive(Clone, Default)]
pub struct EffectBehaviorRegistry {
    behaviors: HashMap<String, Rc<dyn EffectBehavior>>,
}

impl EffectBehaviorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `power_attack` and `thorns`.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register("power_attack", Rc::new(PowerAttack));
        registry.register("thorns", Rc::new(Thorns::default()));
        registry
    }

    pub fn register(&mut self, effect_id: impl Into<String>, behavior: Rc<dyn EffectBehavior>) {
        self.behaviors.insert(effect_id.into(), behavior);
    }

    /// Behavior for `effect_id`. Feats applied as `feat:<id>` share the
    /// behavior registered for `<id>`.
    pub fn get(&self, effect_id: &str) -> Option<Rc<dyn EffectBehavior>> {
        self.behaviors
            .get(effect_id)
            .or_else(|| {
                effect_id
                    .strip_prefix("feat:")
                    .and_then(|id| self.behaviors.get(id))
            })
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }
}

impl std::fmt::Debug for EffectBehaviorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<&String> = self.behaviors.keys().collect();
        ids.sort();
        f.debug_struct("EffectBehaviorRegistry")
            .field("behaviors", &ids)
            .finish()
    }
}

/// Trades melee accuracy for damage: -1 attack per four points of base
/// attack bonus (minimum 1), +2 damage per point traded.
#[derive(Clone, Copy, Debug, Default)]
pub struct PowerAttack;

impl PowerAttack {
    pub fn penalty(base_attack_bonus: i32) -> i32 {
        1 + base_attack_bonus.max(0) / 4
    }
}

impl EffectBehavior for PowerAttack {
    fn on_apply(&self, effect: &ActiveEffect, bus: &mut EventBus) {
        let owner = effect.owner;
        let subscriber = effect.subscriber();

        bus.subscribe_fn(
            EventKind::BeforeAttackRoll,
            subscriber.clone(),
            "power_attack.attack",
            move |world, envelope| {
                if let GameEvent::BeforeAttackRoll(context) = &mut envelope.event {
                    if context.attacker == owner && context.is_melee() {
                        let penalty = Self::penalty(world.query_stat(owner, paths::BAB));
                        context.add_component("power attack", -penalty);
                    }
                }
                Ok(())
            },
        );

        bus.subscribe_fn(
            EventKind::BeforeDamageRoll,
            subscriber,
            "power_attack.damage",
            move |world, envelope| {
                if let GameEvent::BeforeDamageRoll(context) = &mut envelope.event {
                    if context.attacker == owner && context.melee {
                        let penalty = Self::penalty(world.query_stat(owner, paths::BAB));
                        context.add_component("power attack", penalty * 2);
                    }
                }
                Ok(())
            },
        );
        trace!(target: "tactics::effects", entity = %owner, "power attack armed");
    }
}

/// Deals damage back to any creature that hits the owner in melee.
#[derive(Clone, Copy, Debug)]
pub struct Thorns {
    pub damage: DiceExpr,
}

impl Default for Thorns {
    fn default() -> Self {
        Self {
            damage: DiceExpr::new(1, 4, 0),
        }
    }
}

impl EffectBehavior for Thorns {
    fn on_apply(&self, effect: &ActiveEffect, bus: &mut EventBus) {
        let owner = effect.owner;
        let damage = self.damage;
        bus.subscribe_fn(
            EventKind::DamageResolved,
            effect.subscriber(),
            "thorns",
            move |world, envelope| {
                let GameEvent::DamageResolved {
                    attacker: Some(attacker),
                    target,
                    amount,
                    melee: true,
                    ..
                } = envelope.event
                else {
                    return Ok(());
                };
                if target != owner || attacker == owner || amount <= 0 {
                    return Ok(());
                }
                if !world.entities.is_alive(attacker) {
                    return Ok(());
                }
                let recoil = (world.roll_dice(&damage) + damage.bonus).max(1);
                apply_damage(world, attacker, recoil, Some(owner));
                Ok(())
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_attack_scales_with_bab() {
        assert_eq!(PowerAttack::penalty(0), 1);
        assert_eq!(PowerAttack::penalty(3), 1);
        assert_eq!(PowerAttack::penalty(4), 2);
        assert_eq!(PowerAttack::penalty(11), 3);
    }

    #[test]
    fn feat_prefixed_ids_share_behaviors() {
        let registry = EffectBehaviorRegistry::with_builtin();
        assert!(registry.get("power_attack").is_some());
        assert!(registry.get("feat:power_attack").is_some());
        assert!(registry.get("feat:dodge").is_none());
        assert_eq!(registry.len(), 2);
    }
}
