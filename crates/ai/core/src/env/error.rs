//! Collaborator access errors.

use crate::error::{AiError, ErrorSeverity};
use crate::state::AgentId;

/// Errors raised when the kernel reaches for a collaborator or a world record
/// that is not there.
///
/// A missing collaborator is fatal for the agent's update (nothing useful can
/// happen this tick); a missing world record only invalidates one reference.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    #[error("CombatOracle not available")]
    CombatNotAvailable,

    #[error("SpatialOracle not available")]
    SpatialNotAvailable,

    #[error("MotionPlanner not available")]
    PlannerNotAvailable,

    #[error("AbilityOracle not available")]
    AbilitiesNotAvailable,

    #[error("WorldOracle not available")]
    WorldNotAvailable,

    #[error("ConditionOracle not available")]
    ConditionsNotAvailable,

    #[error("SeatOracle not available")]
    SeatsNotAvailable,

    /// The world has no record of the referenced agent.
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),
}

impl AiError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        use OracleError::*;
        match self {
            CombatNotAvailable | SpatialNotAvailable | PlannerNotAvailable
            | AbilitiesNotAvailable | WorldNotAvailable | ConditionsNotAvailable
            | SeatsNotAvailable => ErrorSeverity::Fatal,

            AgentNotFound(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        use OracleError::*;
        match self {
            CombatNotAvailable => "ORACLE_COMBAT_NOT_AVAILABLE",
            SpatialNotAvailable => "ORACLE_SPATIAL_NOT_AVAILABLE",
            PlannerNotAvailable => "ORACLE_PLANNER_NOT_AVAILABLE",
            AbilitiesNotAvailable => "ORACLE_ABILITIES_NOT_AVAILABLE",
            WorldNotAvailable => "ORACLE_WORLD_NOT_AVAILABLE",
            ConditionsNotAvailable => "ORACLE_CONDITIONS_NOT_AVAILABLE",
            SeatsNotAvailable => "ORACLE_SEATS_NOT_AVAILABLE",
            AgentNotFound(_) => "ORACLE_AGENT_NOT_FOUND",
        }
    }
}
