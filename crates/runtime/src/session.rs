//! Combat session orchestrator.
//!
//! The session owns a rules world and drives AI turns through a
//! [`TargetSelector`]. The world holds its content behind an `Rc`, so a
//! session stays on the task that built it; run it on a current-thread
//! runtime or inside a `LocalSet`.

use std::rc::Rc;

use tactics_content::{ContentSource, StaticSource, load_or_default};
use tactics_core::{
    Action, CharacterSpec, CombatConfig, Controller, DiceRoller, EntityId, GameEvent,
    InitiativeEntry, PcgDice, World,
};
use tracing::{debug, info, warn};

use crate::ai::{NearestHostile, TargetSelector};
use crate::error::Result;

/// Builder for [`Session`] with flexible configuration.
pub struct SessionBuilder {
    source: Option<Box<dyn ContentSource>>,
    config: Option<CombatConfig>,
    seed: Option<u64>,
    dice: Option<Box<dyn DiceRoller>>,
    selector: Option<Box<dyn TargetSelector>>,
    roster: Vec<CharacterSpec>,
    require_content: bool,
}

impl SessionBuilder {
    fn new() -> Self {
        Self {
            source: None,
            config: None,
            seed: None,
            dice: None,
            selector: None,
            roster: Vec::new(),
            require_content: false,
        }
    }

    /// Content and, unless [`Self::config`] is given, configuration source.
    pub fn content(mut self, source: impl ContentSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Overrides the configuration shipped with the content.
    pub fn config(mut self, config: CombatConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Seeds the default dice. Without a seed one is drawn from entropy.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replaces the seeded dice, e.g. with scripted rolls.
    pub fn dice(mut self, dice: impl DiceRoller + 'static) -> Self {
        self.dice = Some(Box::new(dice));
        self
    }

    pub fn selector(mut self, selector: impl TargetSelector + 'static) -> Self {
        self.selector = Some(Box::new(selector));
        self
    }

    /// Adds a character spawned when the session is built.
    pub fn character(mut self, spec: CharacterSpec) -> Self {
        self.roster.push(spec);
        self
    }

    /// Fail the build when the content source fails instead of continuing
    /// with an empty catalog.
    pub fn require_content(mut self) -> Self {
        self.require_content = true;
        self
    }

    pub async fn build(self) -> Result<Session> {
        let source = self
            .source
            .unwrap_or_else(|| Box::new(StaticSource::default()));

        let catalog = if self.require_content {
            source.load_catalog().await?
        } else {
            load_or_default(source.as_ref()).await
        };
        let config = match self.config {
            Some(config) => config,
            None => source.load_config().await.unwrap_or_else(|err| {
                warn!(
                    target: "tactics::session",
                    source = %source.name(),
                    error = %err,
                    "config load failed, using defaults"
                );
                CombatConfig::default()
            }),
        };

        let seed = self.seed.unwrap_or_else(rand::random);
        let dice = self
            .dice
            .unwrap_or_else(|| Box::new(PcgDice::new(seed)));
        let selector = self
            .selector
            .unwrap_or_else(|| Box::new(NearestHostile));

        let mut world = World::new(config, Rc::new(catalog), dice);
        let mut roster = Vec::with_capacity(self.roster.len());
        for spec in &self.roster {
            roster.push(world.try_spawn_character(spec)?);
        }

        info!(
            target: "tactics::session",
            source = %source.name(),
            seed,
            characters = roster.len(),
            "session ready"
        );
        Ok(Session {
            world,
            selector,
            seed,
            roster,
        })
    }
}

/// One combat encounter: a world, its roster and the AI policy.
pub struct Session {
    world: World,
    selector: Box<dyn TargetSelector>,
    seed: u64,
    roster: Vec<EntityId>,
}

impl Session {
    /// Create a new session builder
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Seed of the default dice; replaying it with the same inputs
    /// reproduces the session.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Every character spawned through the session, in spawn order.
    pub fn roster(&self) -> &[EntityId] {
        &self.roster
    }

    pub fn set_selector(&mut self, selector: impl TargetSelector + 'static) {
        self.selector = Box::new(selector);
    }

    pub fn spawn(&mut self, spec: &CharacterSpec) -> Result<EntityId> {
        let id = self.world.try_spawn_character(spec)?;
        self.roster.push(id);
        Ok(id)
    }

    pub fn submit_action(&mut self, actor: EntityId, action: Action) -> bool {
        self.world.submit_action(actor, action)
    }

    pub fn query_stat(&self, entity: EntityId, path: &str) -> i32 {
        self.world.query_stat(entity, path)
    }

    /// Starts combat with `combatants`, or the whole roster when empty.
    pub fn start_combat(&mut self, combatants: &[EntityId]) -> Result<Vec<InitiativeEntry>> {
        let combatants = if combatants.is_empty() {
            self.roster.as_slice()
        } else {
            combatants
        };
        Ok(self.world.try_start_combat(combatants)?)
    }

    /// Plays AI-controlled turns until a player-controlled combatant is up,
    /// combat ends or `max_turns` turns have been played. Returns the number of
    /// turns played.
    pub fn run_npc_turns(&mut self, max_turns: usize) -> usize {
        let mut turns = 0;
        while turns < max_turns {
            let Some(actor) = self.world.current_actor() else {
                break;
            };
            if self.controller(actor) != Some(Controller::Ai) {
                break;
            }
            self.play_turn(actor);
            turns += 1;
        }
        turns
    }

    /// Every action the selector picks for `actor` until its turn is over.
    fn play_turn(&mut self, actor: EntityId) {
        let round = self.world.round();
        let limit = self.world.config().max_actions_per_turn;
        let mut taken = 0;

        while self.world.current_actor() == Some(actor) && self.world.round() == round {
            let action = if taken < limit {
                self.selector.choose(&self.world, actor)
            } else {
                Action::end_turn()
            };
            let ending = matches!(action, Action::EndTurn(_));
            debug!(
                target: "tactics::session",
                actor = %actor,
                action = action.name(),
                "ai action"
            );

            if self.world.submit_action(actor, action) {
                taken += 1;
                continue;
            }
            if ending || !self.world.submit_action(actor, Action::end_turn()) {
                warn!(
                    target: "tactics::session",
                    actor = %actor,
                    "turn could not be ended, stopping"
                );
                break;
            }
        }
    }

    fn controller(&self, id: EntityId) -> Option<Controller> {
        self.world
            .entities
            .identity(id)
            .ok()
            .map(|identity| identity.controller)
    }

    /// Takes every event recorded since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.world.events.drain_journal()
    }
}
