//! Deterministic NPC behavior kernel.
//!
//! `ai-core` decides what an agent does each tick: which ability to fire,
//! whom to chase, where to wander. It never moves anything itself. Every
//! effect goes through the collaborator traits in [`env`], and every random
//! draw through the agent's seeded [`env::AiRng`], so a fixed world seed and
//! a fixed sequence of tick deltas replays the same decisions.
//!
//! [`brain::Brain`] is the per-agent entry point; it bundles a controller
//! from [`behavior`], an [`scheduler::EventScheduler`] and a
//! [`motion::MotionStack`].
pub mod ability;
pub mod behavior;
pub mod brain;
pub mod config;
pub mod env;
pub mod error;
pub mod motion;
pub mod scheduler;
pub mod state;
pub mod totem;

#[cfg(test)]
mod test_support;

pub use ability::{
    AbilityDescriptor, AbilityEffect, AbilityId, AbilityKit, EffectKind, JitterPolicy,
    TriggerCondition,
};
pub use behavior::{AgentAi, AiContext, Archetype, CombatPolicy};
pub use brain::Brain;
pub use config::AiConfig;
pub use env::{
    AbilityOracle, AiEnv, AiRng, CastError, CombatOracle, ConditionOracle, EligibilityPredicate,
    MotionPlanner, OccupantView, OracleError, PathResult, Predicate, SeatOracle, SpatialOracle,
    SplineTarget, WorldOracle,
};
pub use error::{AiError, ErrorContext, ErrorSeverity};
pub use motion::{MotionGenerator, MotionKind, MotionStack, MotionTransition, RotateDirection};
pub use scheduler::EventScheduler;
pub use state::{AgentId, AgentState, AgentView, Millis, Position, ReactState, UnitState};
pub use totem::{TOTEM_GROUNDING_ENTRY, TotemLifetime, TotemStatus, is_immune_to};
