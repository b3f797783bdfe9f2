//! Tokio-hosted runtime for the NPC behavior kernel.
//!
//! The runtime owns a population of agents, drives the authoritative world
//! tick and publishes what happened. Consumers embed [`Runtime`] and interact
//! with the world through [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`oracle`] provides in-memory collaborators reused by tools and tests
//! - `workers` keeps the simulation task internal to the crate
pub mod api;
pub mod events;
pub mod oracle;
pub mod runtime;

mod workers;

pub use api::{AgentSnapshot, Result, RuntimeError, RuntimeHandle, SpawnRequest, TickSummary};
pub use events::{EventBus, SimEvent, Topic};
pub use oracle::{
    CombatLedger, CombatRecord, FlatTerrain, OracleManager, SeatTable, StraightLinePlanner,
    WorldTable,
};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
