//! Public runtime API surface.

pub mod errors;
pub mod handle;

pub use errors::{Result, RuntimeError};
pub use handle::{AgentSnapshot, RuntimeHandle, SpawnRequest, TickSummary};
