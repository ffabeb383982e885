use crate::action::ActionCost;

/// Actions an entity may still take this turn, plus its reactions this round.
///
/// Free actions are unlimited and not tracked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionBudget {
    pub standard: u32,
    pub movement: u32,
    pub swift: u32,
    pub reactions: u32,
    /// Set once the entity moved any distance this turn.
    pub moved: bool,
    /// Set once the entity took its five-foot step this turn.
    pub stepped: bool,
    /// True while it is this entity's turn in combat.
    pub active_turn: bool,
}

impl Default for ActionBudget {
    fn default() -> Self {
        Self {
            standard: 1,
            movement: 1,
            swift: 1,
            reactions: 1,
            moved: false,
            stepped: false,
            active_turn: false,
        }
    }
}

impl ActionBudget {
    /// Refreshes the per-turn allowance. Reactions are per round and untouched.
    pub fn start_turn(&mut self) {
        self.standard = 1;
        self.movement = 1;
        self.swift = 1;
        self.moved = false;
        self.stepped = false;
        self.active_turn = true;
    }

    pub fn end_turn(&mut self) {
        self.active_turn = false;
    }

    pub fn start_round(&mut self, reactions: u32) {
        self.reactions = reactions;
    }

    pub fn can_afford(&self, cost: ActionCost) -> bool {
        match cost {
            ActionCost::Standard => self.standard > 0,
            // A standard action can always be downgraded to a move action.
            ActionCost::Move => self.movement > 0 || self.standard > 0,
            ActionCost::FullRound => self.standard > 0 && self.movement > 0 && !self.moved,
            ActionCost::Swift => self.swift > 0,
            ActionCost::Free => true,
            ActionCost::Reaction => self.reactions > 0,
        }
    }

    /// Deducts `cost`. Returns false and leaves the budget unchanged when it
    /// cannot be afforded.
    pub fn spend(&mut self, cost: ActionCost) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        match cost {
            ActionCost::Standard => self.standard -= 1,
            ActionCost::Move if self.movement > 0 => self.movement -= 1,
            ActionCost::Move => self.standard -= 1,
            ActionCost::FullRound => {
                self.standard = 0;
                self.movement = 0;
            }
            ActionCost::Swift => self.swift -= 1,
            ActionCost::Free => {}
            ActionCost::Reaction => self.reactions -= 1,
        }
        true
    }

    /// True when a five-foot step is still allowed this turn.
    pub fn can_step(&self) -> bool {
        !self.moved && !self.stepped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_action_covers_second_move() {
        let mut budget = ActionBudget::default();
        assert!(budget.spend(ActionCost::Move));
        assert!(budget.spend(ActionCost::Move));
        assert_eq!(budget.standard, 0);
        assert!(!budget.can_afford(ActionCost::Move));
        assert!(!budget.spend(ActionCost::Standard));
    }

    #[test]
    fn full_round_needs_untouched_turn() {
        let mut budget = ActionBudget::default();
        budget.start_turn();
        assert!(budget.can_afford(ActionCost::FullRound));
        budget.moved = true;
        assert!(!budget.can_afford(ActionCost::FullRound));

        budget.start_turn();
        assert!(budget.spend(ActionCost::FullRound));
        assert!(!budget.can_afford(ActionCost::Standard));
        assert!(budget.can_afford(ActionCost::Swift));
    }

    #[test]
    fn reactions_survive_turn_reset() {
        let mut budget = ActionBudget::default();
        assert!(budget.spend(ActionCost::Reaction));
        budget.start_turn();
        assert_eq!(budget.reactions, 0);
        budget.start_round(2);
        assert_eq!(budget.reactions, 2);
    }
}
