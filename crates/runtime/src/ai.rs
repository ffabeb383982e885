//! Action selection for AI-controlled combatants.
//!
//! The session calls a [`TargetSelector`] once per action while an AI
//! combatant holds the turn. Selectors only read the world; the session
//! submits whatever they return and ends the turn when it is rejected.
use tactics_core::{Action, EntityId, Position, World};

/// Picks the next action for `actor`.
pub trait TargetSelector {
    fn choose(&self, world: &World, actor: EntityId) -> Action;
}

impl<F> TargetSelector for F
where
    F: Fn(&World, EntityId) -> Action,
{
    fn choose(&self, world: &World, actor: EntityId) -> Action {
        self(world, actor)
    }
}

/// Default policy: get up when prone, attack the nearest hostile in reach,
/// otherwise walk one square toward it, otherwise end the turn.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestHostile;

impl NearestHostile {
    /// Living hostile combatants ordered by distance, then by id.
    pub fn hostiles_by_distance(world: &World, actor: EntityId) -> Vec<(EntityId, Position)> {
        let Ok(origin) = world.entities.position(actor).copied() else {
            return Vec::new();
        };
        let mut foes: Vec<(EntityId, Position)> = world
            .entities
            .ids()
            .filter(|&id| id != actor && world.entities.is_alive(id) && world.is_hostile(actor, id))
            .filter_map(|id| world.entities.position(id).ok().map(|position| (id, *position)))
            .collect();
        foes.sort_by_key(|(id, position)| (origin.distance(position), *id));
        foes
    }
}

impl TargetSelector for NearestHostile {
    fn choose(&self, world: &World, actor: EntityId) -> Action {
        if world.entities.has_tag(actor, "prone") {
            let stand = Action::stand_up();
            if stand.can_execute(world, actor) {
                return stand;
            }
        }

        let foes = Self::hostiles_by_distance(world, actor);
        let Some(&(nearest, target)) = foes.first() else {
            return Action::end_turn();
        };

        if let Some(attack) = foes
            .iter()
            .map(|&(foe, _)| Action::attack(foe))
            .find(|attack| attack.can_execute(world, actor))
        {
            return attack;
        }

        if let Ok(origin) = world.entities.position(actor) {
            let approach = Action::move_along(vec![origin.step_toward(&target)]);
            if approach.can_execute(world, actor) {
                return approach;
            }
        }

        tracing::debug!(
            target: "tactics::ai",
            actor = %actor,
            nearest = %nearest,
            "nothing useful to do, ending turn"
        );
        Action::end_turn()
    }
}
