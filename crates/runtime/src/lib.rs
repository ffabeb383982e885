//! Session orchestration for the tactical combat rules.
//!
//! A [`Session`] owns one rules [`World`](tactics_core::World): it is built
//! asynchronously from a content source, seeds the dice, spawns the starting
//! roster and then drives combat, asking a [`TargetSelector`] for the actions
//! of AI-controlled combatants.
//!
//! Modules are organized by responsibility:
//! - [`session`] hosts the session and its builder
//! - [`ai`] provides the target-selection seam and the default policy
//! - [`logging`] installs the `tracing` subscriber for binaries and tests
//! - [`error`] collects the failures surfaced to callers
pub mod ai;
pub mod error;
pub mod logging;
pub mod session;

pub use ai::{NearestHostile, TargetSelector};
pub use error::{Result, RuntimeError};
pub use session::{Session, SessionBuilder};
