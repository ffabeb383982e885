//! Building characters from race and class records.
use tracing::{info, warn};

use super::World;
use crate::action::ActionError;
use crate::effects::EffectError;
use crate::env::{ClassDefinition, ContentError, EffectDefinition};
use crate::error::{ErrorSeverity, GameError};
use crate::state::{Controller, EntityId, Faction, Identity, Position, Progression, StoreError};
use crate::stats::{AbilityScores, SourceId};

/// Everything needed to put a character on the field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CharacterSpec {
    pub name: String,
    pub faction: Faction,
    pub controller: Controller,
    pub race: Option<String>,
    /// Class ids with the number of levels taken, in the order taken.
    pub classes: Vec<(String, u32)>,
    pub abilities: AbilityScores,
    pub position: Option<Position>,
    /// Feats chosen on top of those the classes grant.
    pub feats: Vec<String>,
    /// Items equipped at spawn.
    pub equipment: Vec<String>,
    /// Items carried but not equipped.
    pub carried: Vec<String>,
}

impl CharacterSpec {
    pub fn new(name: impl Into<String>, faction: Faction) -> Self {
        Self {
            name: name.into(),
            faction,
            ..Default::default()
        }
    }

    pub fn controlled_by(mut self, controller: Controller) -> Self {
        self.controller = controller;
        self
    }

    pub fn race(mut self, race: impl Into<String>) -> Self {
        self.race = Some(race.into());
        self
    }

    pub fn class(mut self, class: impl Into<String>, levels: u32) -> Self {
        self.classes.push((class.into(), levels));
        self
    }

    pub fn abilities(mut self, abilities: AbilityScores) -> Self {
        self.abilities = abilities;
        self
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn feat(mut self, feat: impl Into<String>) -> Self {
        self.feats.push(feat.into());
        self
    }

    pub fn equip(mut self, item: impl Into<String>) -> Self {
        self.equipment.push(item.into());
        self
    }

    pub fn carry(mut self, item: impl Into<String>) -> Self {
        self.carried.push(item.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SpawnError {
    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Effect(#[from] EffectError),

    #[error(transparent)]
    Item(#[from] ActionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("feat '{feat}' requires '{missing}'")]
    Prerequisite { feat: String, missing: String },
}

impl GameError for SpawnError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Content(err) => err.severity(),
            Self::Effect(err) => err.severity(),
            Self::Item(err) => err.severity(),
            Self::Store(err) => err.severity(),
            Self::Prerequisite { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Content(err) => err.error_code(),
            Self::Effect(err) => err.error_code(),
            Self::Item(err) => err.error_code(),
            Self::Store(err) => err.error_code(),
            Self::Prerequisite { .. } => "SPAWN_PREREQUISITE",
        }
    }
}

impl World {
    /// Façade over [`World::try_spawn_character`]. Logs and returns `None`
    /// on failure.
    pub fn spawn_character(&mut self, spec: &CharacterSpec) -> Option<EntityId> {
        self.try_spawn_character(spec)
            .map_err(|err| {
                warn!(
                    target: "tactics::spawn",
                    name = %spec.name,
                    code = err.error_code(),
                    error = %err,
                    "character not spawned"
                );
            })
            .ok()
    }

    /// Spawns a finalized character. Either the whole character is built or
    /// nothing is left in the store.
    pub fn try_spawn_character(&mut self, spec: &CharacterSpec) -> Result<EntityId, SpawnError> {
        let race = match &spec.race {
            Some(id) => Some(
                self.content()
                    .race(id)
                    .cloned()
                    .ok_or_else(|| ContentError::missing("race", id.as_str()))?,
            ),
            None => None,
        };
        let mut classes = Vec::with_capacity(spec.classes.len());
        for (id, levels) in &spec.classes {
            let class = self
                .content()
                .class(id)
                .cloned()
                .ok_or_else(|| ContentError::missing("class", id.as_str()))?;
            classes.push((class, *levels));
        }

        let mut identity = Identity::new(spec.name.clone(), spec.faction).with_controller(spec.controller);
        if let Some(race) = &race {
            identity.race = Some(race.id.clone());
            identity.base_speed = race.speed;
        }
        let id = self.entities.spawn(identity);

        match self.build_character(id, spec, race.as_ref().map(|race| race.as_effect()), &classes) {
            Ok(()) => {
                info!(target: "tactics::spawn", entity = %id, name = %spec.name, "character spawned");
                Ok(id)
            }
            Err(err) => {
                self.discard_partial_character(id);
                Err(err)
            }
        }
    }

    /// Detaches every effect already applied, so behavior handlers go with
    /// the half-built entity, then despawns it.
    fn discard_partial_character(&mut self, id: EntityId) {
        let sources: Vec<SourceId> = self
            .active_effects(id)
            .iter()
            .map(|effect| effect.source_id.clone())
            .collect();
        for source_id in &sources {
            self.remove_effect(id, source_id);
        }
        self.entities.despawn(id);
    }

    fn build_character(
        &mut self,
        id: EntityId,
        spec: &CharacterSpec,
        racial: Option<EffectDefinition>,
        classes: &[(ClassDefinition, u32)],
    ) -> Result<(), SpawnError> {
        self.entities.set_attributes(id, spec.abilities);
        let mut progression = Progression::default();
        let mut feats: Vec<String> = Vec::new();
        for (class, levels) in classes {
            for level in 1..=*levels {
                progression.levels.push(class.level_record());
                feats.extend(class.feats_at(level).map(str::to_owned));
            }
        }
        self.entities.set_progression(id, progression);
        if let Some(position) = spec.position {
            self.entities.set_position(id, position);
        }
        self.recalculate(id);

        if let Some(racial) = racial {
            self.apply_effect_definition(&racial, id, "race", None)?;
        }
        feats.extend(spec.feats.iter().cloned());
        for feat in &feats {
            self.grant_feat(id, feat)?;
        }

        let equipment = self.entities.equipment_mut(id)?;
        equipment.carried.extend(spec.equipment.iter().cloned());
        equipment.carried.extend(spec.carried.iter().cloned());
        for item in &spec.equipment {
            self.try_equip_item(id, item)?;
        }

        self.finalize_character(id);
        Ok(())
    }

    /// Applies feat `feat_id` as a permanent `feat:<id>` effect after checking
    /// its prerequisite tags.
    pub fn grant_feat(&mut self, id: EntityId, feat_id: &str) -> Result<(), SpawnError> {
        let feat = self
            .content()
            .feat(feat_id)
            .cloned()
            .ok_or_else(|| ContentError::missing("feat", feat_id))?;
        if let Some(missing) = feat
            .prerequisites
            .iter()
            .find(|tag| !self.entities.has_tag(id, tag))
        {
            return Err(SpawnError::Prerequisite {
                feat: feat.id.clone(),
                missing: missing.clone(),
            });
        }
        self.apply_effect_definition(&feat.as_effect(), id, "feat", None)?;
        Ok(())
    }

    /// Final recalculation at character creation; the only place current hit
    /// points are raised to the maximum.
    pub fn finalize_character(&mut self, id: EntityId) -> bool {
        let Some(stats) = self.recalculate(id) else {
            return false;
        };
        if let Ok(health) = self.entities.health_mut(id) {
            health.restore();
        }
        if let Ok(budget) = self.entities.budget_mut(id) {
            budget.start_round(stats.reactions_per_round);
        }
        true
    }
}
