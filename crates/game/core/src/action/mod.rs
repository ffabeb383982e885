//! Actions an entity can take.
//!
//! An action only checks its preconditions and announces itself by
//! publishing a "declared" event; the rules handlers on the bus do the actual
//! resolution. This keeps every outcome observable and interruptible.
//!
//! Budget spending and attacks of opportunity are handled by the engine's
//! action stack around [`ActionTransition::execute`], not by the actions.
mod combat;
mod error;
mod items;
mod movement;
mod tactical;

pub use combat::{AttackAction, FullAttackAction, ManeuverAction};
pub use error::ActionError;
pub use items::{EquipAction, UnequipAction, UseItemAction};
pub use movement::{FiveFootStepAction, MoveAction, StandUpAction};
pub use tactical::{EndTurnAction, ReadyAction, TotalDefenseAction};

pub use crate::combat::Maneuver;

use bitflags::bitflags;

use crate::engine::World;
use crate::events::EventKind;
use crate::state::{EntityId, EquipSlot, Position};

/// Part of the turn an action consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ActionCost {
    Standard,
    Move,
    /// Both the standard and the move action, before any movement.
    FullRound,
    Swift,
    Free,
    /// Taken outside the actor's turn; limited per round.
    Reaction,
}

bitflags! {
    /// Static properties of an action.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ActionTraits: u8 {
        /// Adjacent hostiles get an attack of opportunity.
        const PROVOKES = 1 << 0;
        const MELEE = 1 << 1;
        const RANGED = 1 << 2;
        const MOVEMENT = 1 << 3;
        const MANEUVER = 1 << 4;
        /// Finishes the actor's turn once executed.
        const ENDS_TURN = 1 << 5;
    }
}

/// Behavior shared by every concrete action.
pub trait ActionTransition {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn cost(&self) -> ActionCost;

    fn traits(&self) -> ActionTraits {
        ActionTraits::empty()
    }

    /// Whether this use of the action provokes. Actions whose provocation
    /// depends on the actor (feats, wielded weapon) override this.
    fn provokes(&self, _world: &World, _actor: EntityId) -> bool {
        self.traits().contains(ActionTraits::PROVOKES)
    }

    /// Checks preconditions without touching the world.
    fn validate(&self, world: &World, actor: EntityId) -> Result<(), ActionError>;

    /// Publishes the action's declared event(s).
    fn execute(&self, world: &mut World, actor: EntityId) -> Result<(), ActionError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Attack(AttackAction),
    FullAttack(FullAttackAction),
    Move(MoveAction),
    FiveFootStep(FiveFootStepAction),
    StandUp(StandUpAction),
    Ready(ReadyAction),
    Maneuver(ManeuverAction),
    UseItem(UseItemAction),
    Equip(EquipAction),
    Unequip(UnequipAction),
    TotalDefense(TotalDefenseAction),
    EndTurn(EndTurnAction),
}

impl Action {
    pub fn attack(target: EntityId) -> Self {
        Self::Attack(AttackAction::new(target))
    }

    pub fn full_attack(target: EntityId) -> Self {
        Self::FullAttack(FullAttackAction { target })
    }

    pub fn move_along(path: Vec<Position>) -> Self {
        Self::Move(MoveAction { path })
    }

    pub fn step(to: Position) -> Self {
        Self::FiveFootStep(FiveFootStepAction { to })
    }

    pub fn maneuver(maneuver: Maneuver, target: EntityId) -> Self {
        Self::Maneuver(ManeuverAction { maneuver, target })
    }

    pub fn ready(trigger: EventKind, watch: Option<EntityId>, action: Action) -> Self {
        Self::Ready(ReadyAction {
            trigger,
            watch,
            action: Box::new(action),
        })
    }

    pub fn use_item(item_id: impl Into<String>) -> Self {
        Self::UseItem(UseItemAction {
            item_id: item_id.into(),
        })
    }

    pub fn equip(item_id: impl Into<String>) -> Self {
        Self::Equip(EquipAction {
            item_id: item_id.into(),
        })
    }

    pub fn unequip(slot: EquipSlot) -> Self {
        Self::Unequip(UnequipAction { slot })
    }

    pub fn stand_up() -> Self {
        Self::StandUp(StandUpAction)
    }

    pub fn total_defense() -> Self {
        Self::TotalDefense(TotalDefenseAction)
    }

    pub fn end_turn() -> Self {
        Self::EndTurn(EndTurnAction)
    }

    pub fn as_transition(&self) -> &dyn ActionTransition {
        match self {
            Self::Attack(action) => action,
            Self::FullAttack(action) => action,
            Self::Move(action) => action,
            Self::FiveFootStep(action) => action,
            Self::StandUp(action) => action,
            Self::Ready(action) => action,
            Self::Maneuver(action) => action,
            Self::UseItem(action) => action,
            Self::Equip(action) => action,
            Self::Unequip(action) => action,
            Self::TotalDefense(action) => action,
            Self::EndTurn(action) => action,
        }
    }

    pub fn name(&self) -> &'static str {
        self.as_transition().name()
    }

    pub fn description(&self) -> &'static str {
        self.as_transition().description()
    }

    pub fn cost(&self) -> ActionCost {
        self.as_transition().cost()
    }

    pub fn traits(&self) -> ActionTraits {
        self.as_transition().traits()
    }

    pub fn provokes(&self, world: &World, actor: EntityId) -> bool {
        self.as_transition().provokes(world, actor)
    }

    pub fn validate(&self, world: &World, actor: EntityId) -> Result<(), ActionError> {
        self.as_transition().validate(world, actor)
    }

    pub fn execute(&self, world: &mut World, actor: EntityId) -> Result<(), ActionError> {
        self.as_transition().execute(world, actor)
    }

    /// Full check for taking this action on the actor's own turn: alive,
    /// preconditions, and in combat the turn order and remaining budget.
    pub fn check(&self, world: &World, actor: EntityId) -> Result<(), ActionError> {
        if !world.entities.is_alive(actor) {
            return Err(ActionError::ActorDead(actor));
        }
        self.validate(world, actor)?;
        if world.is_combat_active() {
            if world.current_actor() != Some(actor) {
                return Err(ActionError::NotYourTurn(actor));
            }
            let cost = self.cost();
            if !world.entities.budget(actor)?.can_afford(cost) {
                return Err(ActionError::InsufficientBudget(cost));
            }
        }
        Ok(())
    }

    pub fn can_execute(&self, world: &World, actor: EntityId) -> bool {
        self.check(world, actor).is_ok()
    }
}

/// Target exists, is someone else, and is still standing.
pub(crate) fn require_living_target(
    world: &World,
    actor: EntityId,
    target: EntityId,
) -> Result<(), ActionError> {
    if !world.entities.contains(target) {
        return Err(ActionError::TargetNotFound(target));
    }
    if target == actor {
        return Err(ActionError::InvalidTarget {
            target,
            reason: "cannot target self",
        });
    }
    if !world.entities.is_alive(target) {
        return Err(ActionError::InvalidTarget {
            target,
            reason: "target is down",
        });
    }
    Ok(())
}

/// Distance check; skipped when either side has no position on the grid.
pub(crate) fn require_reach(
    world: &World,
    actor: EntityId,
    target: EntityId,
    reach: u32,
) -> Result<(), ActionError> {
    let (Ok(from), Ok(to)) = (
        world.entities.position(actor),
        world.entities.position(target),
    ) else {
        return Ok(());
    };
    let distance = from.distance(to);
    if distance > reach {
        return Err(ActionError::OutOfReach {
            target,
            distance,
            reach,
        });
    }
    Ok(())
}
