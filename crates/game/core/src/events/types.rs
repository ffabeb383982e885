//! Event payloads and their routing keys.
use crate::action::{Action, Maneuver};
use crate::combat::{
    AttackContext, AttackDeclaration, AttackReport, DamageContext, ItemState, MoveMode,
};
use crate::engine::InitiativeEntry;
use crate::state::{EntityId, EquipSlot, Position};
use crate::stats::SourceId;

/// Routing key for subscriptions, one per [`GameEvent`] variant.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum EventKind {
    CombatStarted,
    CombatEnded,
    RoundStarted,
    TurnStarted,
    TurnEnded,
    TurnSkipped,
    AttackDeclared,
    BeforeAttackRoll,
    AttackResolved,
    BeforeDamageRoll,
    DamageResolved,
    HpChanged,
    CharacterDied,
    MoveDeclared,
    MoveResolved,
    MoveBlocked,
    ManeuverDeclared,
    ManeuverResolved,
    ItemUseDeclared,
    EquipDeclared,
    UnequipDeclared,
    ItemStateChanged,
    StandUpDeclared,
    DefenseDeclared,
    ReactionOpportunity,
    ReadyDeclared,
    ReadiedActionTriggered,
    ReadiedActionExpired,
    EffectApplied,
    EffectRemoved,
    StatsCalculated,
    ActionRejected,
}

/// Everything that happens in a world is announced as one of these.
#[derive(Clone, Debug)]
pub enum GameEvent {
    CombatStarted {
        order: Vec<InitiativeEntry>,
    },
    CombatEnded {
        rounds: u32,
    },
    RoundStarted {
        round: u32,
    },
    TurnStarted {
        actor: EntityId,
        round: u32,
    },
    TurnEnded {
        actor: EntityId,
        round: u32,
    },
    TurnSkipped {
        actor: EntityId,
        reason: String,
    },
    AttackDeclared(AttackDeclaration),
    BeforeAttackRoll(AttackContext),
    AttackResolved(AttackReport),
    BeforeDamageRoll(DamageContext),
    DamageResolved {
        attacker: Option<EntityId>,
        target: EntityId,
        amount: i32,
        critical: bool,
        melee: bool,
    },
    HpChanged {
        entity: EntityId,
        previous: i32,
        current: i32,
    },
    CharacterDied {
        entity: EntityId,
        killer: Option<EntityId>,
    },
    MoveDeclared {
        actor: EntityId,
        path: Vec<Position>,
        mode: MoveMode,
    },
    MoveResolved {
        actor: EntityId,
        from: Position,
        to: Position,
        squares: u32,
    },
    MoveBlocked {
        actor: EntityId,
        at: Position,
        reason: String,
    },
    ManeuverDeclared {
        attacker: EntityId,
        defender: EntityId,
        maneuver: Maneuver,
    },
    ManeuverResolved {
        attacker: EntityId,
        defender: EntityId,
        maneuver: Maneuver,
        success: bool,
        attacker_total: i32,
        defender_total: i32,
    },
    ItemUseDeclared {
        actor: EntityId,
        item_id: String,
    },
    EquipDeclared {
        actor: EntityId,
        item_id: String,
    },
    UnequipDeclared {
        actor: EntityId,
        slot: EquipSlot,
    },
    ItemStateChanged {
        entity: EntityId,
        item_id: String,
        state: ItemState,
    },
    StandUpDeclared {
        actor: EntityId,
    },
    DefenseDeclared {
        actor: EntityId,
    },
    ReactionOpportunity {
        provoker: EntityId,
        reactors: Vec<EntityId>,
        action: &'static str,
    },
    ReadyDeclared {
        actor: EntityId,
        trigger: EventKind,
        watch: Option<EntityId>,
        action: Box<Action>,
    },
    ReadiedActionTriggered {
        actor: EntityId,
        trigger: EventKind,
    },
    ReadiedActionExpired {
        actor: EntityId,
        trigger: EventKind,
    },
    EffectApplied {
        target: EntityId,
        source_id: SourceId,
        name: String,
    },
    EffectRemoved {
        target: EntityId,
        source_id: SourceId,
        expired: bool,
    },
    StatsCalculated {
        entity: EntityId,
    },
    ActionRejected {
        actor: EntityId,
        action: &'static str,
        reason: String,
    },
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::CombatStarted { .. } => EventKind::CombatStarted,
            Self::CombatEnded { .. } => EventKind::CombatEnded,
            Self::RoundStarted { .. } => EventKind::RoundStarted,
            Self::TurnStarted { .. } => EventKind::TurnStarted,
            Self::TurnEnded { .. } => EventKind::TurnEnded,
            Self::TurnSkipped { .. } => EventKind::TurnSkipped,
            Self::AttackDeclared(_) => EventKind::AttackDeclared,
            Self::BeforeAttackRoll(_) => EventKind::BeforeAttackRoll,
            Self::AttackResolved(_) => EventKind::AttackResolved,
            Self::BeforeDamageRoll(_) => EventKind::BeforeDamageRoll,
            Self::DamageResolved { .. } => EventKind::DamageResolved,
            Self::HpChanged { .. } => EventKind::HpChanged,
            Self::CharacterDied { .. } => EventKind::CharacterDied,
            Self::MoveDeclared { .. } => EventKind::MoveDeclared,
            Self::MoveResolved { .. } => EventKind::MoveResolved,
            Self::MoveBlocked { .. } => EventKind::MoveBlocked,
            Self::ManeuverDeclared { .. } => EventKind::ManeuverDeclared,
            Self::ManeuverResolved { .. } => EventKind::ManeuverResolved,
            Self::ItemUseDeclared { .. } => EventKind::ItemUseDeclared,
            Self::EquipDeclared { .. } => EventKind::EquipDeclared,
            Self::UnequipDeclared { .. } => EventKind::UnequipDeclared,
            Self::ItemStateChanged { .. } => EventKind::ItemStateChanged,
            Self::StandUpDeclared { .. } => EventKind::StandUpDeclared,
            Self::DefenseDeclared { .. } => EventKind::DefenseDeclared,
            Self::ReactionOpportunity { .. } => EventKind::ReactionOpportunity,
            Self::ReadyDeclared { .. } => EventKind::ReadyDeclared,
            Self::ReadiedActionTriggered { .. } => EventKind::ReadiedActionTriggered,
            Self::ReadiedActionExpired { .. } => EventKind::ReadiedActionExpired,
            Self::EffectApplied { .. } => EventKind::EffectApplied,
            Self::EffectRemoved { .. } => EventKind::EffectRemoved,
            Self::StatsCalculated { .. } => EventKind::StatsCalculated,
            Self::ActionRejected { .. } => EventKind::ActionRejected,
        }
    }

    /// The entity whose deed or state the event reports.
    pub fn subject(&self) -> Option<EntityId> {
        match self {
            Self::CombatStarted { .. } | Self::CombatEnded { .. } | Self::RoundStarted { .. } => {
                None
            }
            Self::TurnStarted { actor, .. }
            | Self::TurnEnded { actor, .. }
            | Self::TurnSkipped { actor, .. }
            | Self::MoveDeclared { actor, .. }
            | Self::MoveResolved { actor, .. }
            | Self::MoveBlocked { actor, .. }
            | Self::ItemUseDeclared { actor, .. }
            | Self::EquipDeclared { actor, .. }
            | Self::UnequipDeclared { actor, .. }
            | Self::StandUpDeclared { actor }
            | Self::DefenseDeclared { actor }
            | Self::ReadyDeclared { actor, .. }
            | Self::ReadiedActionTriggered { actor, .. }
            | Self::ReadiedActionExpired { actor, .. }
            | Self::ActionRejected { actor, .. } => Some(*actor),
            Self::AttackDeclared(declaration) => Some(declaration.attacker),
            Self::BeforeAttackRoll(context) => Some(context.attacker),
            Self::AttackResolved(report) => Some(report.attacker),
            Self::BeforeDamageRoll(context) => Some(context.attacker),
            Self::DamageResolved {
                attacker, target, ..
            } => attacker.or(Some(*target)),
            Self::HpChanged { entity, .. }
            | Self::CharacterDied { entity, .. }
            | Self::ItemStateChanged { entity, .. }
            | Self::StatsCalculated { entity } => Some(*entity),
            Self::ManeuverDeclared { attacker, .. } | Self::ManeuverResolved { attacker, .. } => {
                Some(*attacker)
            }
            Self::ReactionOpportunity { provoker, .. } => Some(*provoker),
            Self::EffectApplied { target, .. } | Self::EffectRemoved { target, .. } => {
                Some(*target)
            }
        }
    }

    /// The entity on the receiving end, when there is one.
    pub fn object(&self) -> Option<EntityId> {
        match self {
            Self::AttackDeclared(declaration) => Some(declaration.target),
            Self::BeforeAttackRoll(context) => Some(context.target),
            Self::AttackResolved(report) => Some(report.target),
            Self::BeforeDamageRoll(context) => Some(context.target),
            Self::DamageResolved { target, .. } => Some(*target),
            Self::ManeuverDeclared { defender, .. } | Self::ManeuverResolved { defender, .. } => {
                Some(*defender)
            }
            _ => None,
        }
    }

    pub fn involves(&self, entity: EntityId) -> bool {
        self.subject() == Some(entity) || self.object() == Some(entity)
    }
}

/// An event in flight. Handlers may mutate the payload or cancel it.
#[derive(Clone, Debug)]
pub struct EventEnvelope {
    pub event: GameEvent,
    cancelled: bool,
    depth: usize,
}

impl EventEnvelope {
    pub fn new(event: GameEvent, depth: usize) -> Self {
        Self {
            event,
            cancelled: false,
            depth,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.event.kind()
    }

    /// Asks the publisher to abandon the flow this event belongs to.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Nesting level at which the event was published; 0 at the top.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn into_event(self) -> GameEvent {
        self.event
    }
}
