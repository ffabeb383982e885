//! Applying, removing and ageing effects on a world.
use tracing::{debug, warn};

use super::{ActiveEffect, EffectDuration, EffectError, conditions};
use crate::engine::World;
use crate::env::EffectDefinition;
use crate::error::GameError;
use crate::events::GameEvent;
use crate::state::EntityId;
use crate::stats::{Modifier, SourceId};

impl World {
    /// Resolves an effect id against content, feats (`feat:<id>`) and the
    /// built-in conditions, in that order.
    pub fn effect_definition(&self, effect_id: &str) -> Result<EffectDefinition, EffectError> {
        if let Some(definition) = self.content().effect(effect_id) {
            return Ok(definition.clone());
        }
        if let Some(feat) = effect_id
            .strip_prefix("feat:")
            .and_then(|id| self.content().feat(id))
        {
            return Ok(feat.as_effect());
        }
        conditions::builtin(effect_id).ok_or_else(|| EffectError::UnknownEffect(effect_id.into()))
    }

    /// Applies `effect_id` to `target` under the origin `label`.
    ///
    /// Returns the instance's source id, or `None` after logging why the
    /// effect could not be applied.
    pub fn apply_effect(&mut self, effect_id: &str, target: EntityId, label: &str) -> Option<SourceId> {
        self.try_apply_effect(effect_id, target, label, None)
            .map_err(|err| {
                warn!(
                    target: "tactics::effects",
                    effect = effect_id,
                    entity = %target,
                    code = err.error_code(),
                    error = %err,
                    "effect not applied"
                );
            })
            .ok()
    }

    pub fn try_apply_effect(
        &mut self,
        effect_id: &str,
        target: EntityId,
        label: &str,
        applied_by: Option<EntityId>,
    ) -> Result<SourceId, EffectError> {
        let definition = self.effect_definition(effect_id)?;
        self.apply_effect_definition(&definition, target, label, applied_by)
    }

    /// Applies an inline definition. Re-applying the same definition with the
    /// same label refreshes it instead of stacking a second copy.
    pub fn apply_effect_definition(
        &mut self,
        definition: &EffectDefinition,
        target: EntityId,
        label: &str,
        applied_by: Option<EntityId>,
    ) -> Result<SourceId, EffectError> {
        self.entities.ledger(target)?;
        self.entities.grants(target)?;
        self.entities.effects(target)?;

        let source_id = SourceId::composite(&definition.id, label);
        if self.has_effect(target, &source_id) {
            debug!(target: "tactics::effects", source = %source_id, entity = %target, "refreshing effect");
            self.detach_effect(target, &source_id, false)?;
        }

        let mut modifiers: Vec<Modifier> = Vec::with_capacity(definition.bonuses.len());
        for bonus in &definition.bonuses {
            if bonus.value == 0 {
                warn!(
                    target: "tactics::effects",
                    effect = %definition.id,
                    path = %bonus.target,
                    "skipping zero-valued bonus"
                );
                continue;
            }
            let mut modifier = bonus.to_modifier(&definition.name, &source_id);
            modifier.duration = definition.duration;
            modifiers.push(modifier);
        }

        let ledger = self.entities.ledger_mut(target)?;
        for modifier in &modifiers {
            ledger.add(modifier.clone())?;
        }
        let grants = self.entities.grants_mut(target)?;
        for tag in &definition.tags {
            grants.grant_tag(tag.clone(), source_id.clone());
        }
        grants.add_feat_slots(source_id.clone(), definition.feat_slots);

        let effect = ActiveEffect {
            source_id: source_id.clone(),
            effect_id: definition.id.clone(),
            name: definition.name.clone(),
            owner: target,
            applied_by,
            duration: EffectDuration::from_rounds(definition.duration),
            modifiers,
            tags: definition.tags.clone(),
            feat_slots: definition.feat_slots,
        };
        self.entities.effects_mut(target)?.push(effect.clone());

        if let Some(behavior) = self.behaviors.get(&definition.id) {
            behavior.on_apply(&effect, &mut self.events);
        }
        self.recalculate(target);

        debug!(
            target: "tactics::effects",
            source = %source_id,
            entity = %target,
            modifiers = effect.modifiers.len(),
            "effect applied"
        );
        self.publish(GameEvent::EffectApplied {
            target,
            source_id: source_id.clone(),
            name: definition.name.clone(),
        });
        Ok(source_id)
    }

    /// Removes the effect instance and everything it created. Returns false
    /// after logging when nothing was removed.
    pub fn remove_effect(&mut self, target: EntityId, source_id: &SourceId) -> bool {
        match self.detach_effect(target, source_id, false) {
            Ok(_) => true,
            Err(err) => {
                warn!(
                    target: "tactics::effects",
                    source = %source_id,
                    entity = %target,
                    code = err.error_code(),
                    error = %err,
                    "effect not removed"
                );
                false
            }
        }
    }

    /// Removes every active effect that grants `tag`.
    pub fn remove_effects_with_tag(&mut self, target: EntityId, tag: &str) -> usize {
        let sources: Vec<SourceId> = self
            .entities
            .effects(target)
            .map(|effects| {
                effects
                    .iter()
                    .filter(|effect| effect.tags.iter().any(|t| t == tag))
                    .map(|effect| effect.source_id.clone())
                    .collect()
            })
            .unwrap_or_default();
        sources
            .iter()
            .filter(|source_id| self.remove_effect(target, source_id))
            .count()
    }

    pub fn has_effect(&self, target: EntityId, source_id: &SourceId) -> bool {
        self.entities
            .effects(target)
            .is_ok_and(|effects| effects.iter().any(|effect| &effect.source_id == source_id))
    }

    pub fn active_effects(&self, target: EntityId) -> &[ActiveEffect] {
        self.entities
            .effects(target)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Ages every timed effect on `target` by one turn and removes the ones
    /// that ran out. Returns the expired source ids.
    pub fn tick_effects(&mut self, target: EntityId) -> Vec<SourceId> {
        let Ok(effects) = self.entities.effects_mut(target) else {
            return Vec::new();
        };
        let expired: Vec<SourceId> = effects
            .iter_mut()
            .filter_map(|effect| effect.duration.tick().then(|| effect.source_id.clone()))
            .collect();
        for source_id in &expired {
            if let Err(err) = self.detach_effect(target, source_id, true) {
                warn!(
                    target: "tactics::effects",
                    source = %source_id,
                    entity = %target,
                    error = %err,
                    "expired effect could not be removed"
                );
            }
        }
        expired
    }

    /// All-or-nothing removal: every lookup is checked before anything is
    /// mutated.
    fn detach_effect(
        &mut self,
        target: EntityId,
        source_id: &SourceId,
        expired: bool,
    ) -> Result<ActiveEffect, EffectError> {
        let index = self
            .entities
            .effects(target)?
            .iter()
            .position(|effect| &effect.source_id == source_id)
            .ok_or_else(|| EffectError::NotActive {
                target,
                source_id: source_id.clone(),
            })?;
        self.entities.ledger(target)?;
        self.entities.grants(target)?;

        let effect = self.entities.effects_mut(target)?.remove(index);
        self.entities.ledger_mut(target)?.remove_by_source(source_id);
        self.entities.grants_mut(target)?.revoke_source(source_id);

        if let Some(behavior) = self.behaviors.get(&effect.effect_id) {
            behavior.on_remove(&effect, &mut self.events);
        }
        self.events.unsubscribe(&effect.subscriber());
        self.recalculate(target);

        debug!(
            target: "tactics::effects",
            source = %source_id,
            entity = %target,
            expired,
            "effect removed"
        );
        self.publish(GameEvent::EffectRemoved {
            target,
            source_id: source_id.clone(),
            expired,
        });
        Ok(effect)
    }
}
