//! Event types and the subscription bus.
//!
//! Every state change in a world is announced as a [`GameEvent`]. Actions only
//! publish "declared" events; rules handlers subscribed on the bus do the
//! resolution and publish what happened. Reactors (effect behaviors, readied
//! actions) observe or amend events in flight through the [`EventEnvelope`].
mod bus;
mod types;

pub use bus::{EventBus, EventHandler, FnHandler, HandlerError, HandlerResult, SubscriberId};
pub use types::{EventEnvelope, EventKind, GameEvent};
