//! Agent state borrowed by the kernel for the duration of a tick.
//!
//! The world owns every [`AgentState`]; controllers and the motion stack take
//! a `&mut` for one update call and never hold on to it. Other agents are only
//! ever observed through [`AgentView`] snapshots returned by the world oracle.
mod agent;
mod common;

pub use agent::{AgentState, AgentView, ReactState, UnitState};
pub use common::{AgentId, Millis, Position};
pub(crate) use common::normalize_orientation;
