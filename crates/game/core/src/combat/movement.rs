//! Square-by-square movement over the battle grid.
use tracing::{debug, warn};

use super::MoveMode;
use crate::engine::World;
use crate::events::{EventEnvelope, EventKind, GameEvent, HandlerError, HandlerResult};
use crate::state::{EntityId, Position};

pub(super) fn on_move_declared(world: &mut World, envelope: &mut EventEnvelope) -> HandlerResult {
    if envelope.is_cancelled() {
        return Ok(());
    }
    let GameEvent::MoveDeclared { actor, path, mode } = &envelope.event else {
        return Err(HandlerError::UnexpectedPayload(EventKind::MoveDeclared));
    };
    let (actor, mode) = (*actor, *mode);
    let path = path.clone();
    let allowance = match mode {
        MoveMode::Walk => world.entities.stats(actor)?.speed_squares(),
        MoveMode::FiveFootStep => 1,
        MoveMode::Forced => u32::MAX,
    };
    let moved = walk(world, actor, &path, mode, allowance)?;

    let budget = world.entities.budget_mut(actor)?;
    match mode {
        MoveMode::Walk if moved > 0 => budget.moved = true,
        MoveMode::FiveFootStep if moved > 0 => budget.stepped = true,
        _ => {}
    }
    Ok(())
}

/// Why a square cannot be entered from `from`, if it cannot.
fn refusal(world: &World, actor: EntityId, from: &Position, to: &Position) -> Option<&'static str> {
    if !from.is_adjacent(to) {
        Some("path is not contiguous")
    } else if !world.grid.in_bounds(to) {
        Some("out of bounds")
    } else if world.grid.is_blocked(to) {
        Some("square is blocked")
    } else if world.entities.occupant(to, Some(actor)).is_some() {
        Some("square is occupied")
    } else {
        None
    }
}

/// Moves along `path` until it ends, a square refuses entry or the
/// allowance runs out. Returns the number of squares entered.
fn walk(
    world: &mut World,
    actor: EntityId,
    path: &[Position],
    mode: MoveMode,
    allowance: u32,
) -> Result<u32, HandlerError> {
    let start = *world.entities.position(actor)?;
    let mut current = start;
    let mut spent = 0u32;
    let mut squares = 0u32;
    let mut blocked = None;

    for next in path {
        if let Some(reason) = refusal(world, actor, &current, next) {
            blocked = Some((*next, reason));
            break;
        }
        let cost = match mode {
            MoveMode::Walk => world.grid.entry_cost(next),
            MoveMode::FiveFootStep | MoveMode::Forced => 1,
        };
        if spent.saturating_add(cost) > allowance {
            blocked = Some((*next, "not enough movement left"));
            break;
        }
        spent += cost;
        squares += 1;
        current = *next;
        world.entities.set_position(actor, current);
    }

    if let Some((at, reason)) = blocked {
        debug!(target: "tactics::movement", %actor, %at, reason, "movement blocked");
        world.publish(GameEvent::MoveBlocked {
            actor,
            at,
            reason: reason.to_owned(),
        });
    }
    if squares > 0 {
        debug!(target: "tactics::movement", %actor, from = %start, to = %current, squares, "moved");
        world.publish(GameEvent::MoveResolved {
            actor,
            from: start,
            to: current,
            squares,
        });
    }
    Ok(squares)
}

/// Pushes `target` straight away from `origin` for up to `squares` squares.
pub(super) fn push(world: &mut World, target: EntityId, origin: EntityId, squares: u32) -> u32 {
    let (Ok(from), Ok(anchor)) = (
        world.entities.position(target).copied(),
        world.entities.position(origin).copied(),
    ) else {
        warn!(target: "tactics::movement", %target, "push skipped: no position");
        return 0;
    };
    let mut path = Vec::with_capacity(squares as usize);
    let mut cursor = from;
    for _ in 0..squares {
        cursor = cursor.away_from(&anchor);
        path.push(cursor);
    }
    walk(world, target, &path, MoveMode::Forced, u32::MAX).unwrap_or(0)
}
