use crate::ability::AbilityId;
use crate::error::{AiError, ErrorSeverity};
use crate::state::AgentId;

/// Combat and spell-effect collaborator.
///
/// Owns casting, swing timers, threat and crowd-control bookkeeping. The kernel
/// only issues requests and reads back the few facts it needs to decide.
pub trait CombatOracle: Send + Sync {
    /// Issues a cast of `ability` from `caster` at `target`.
    ///
    /// `triggered` casts ignore cooldowns and cast-time requirements.
    fn cast(
        &self,
        caster: AgentId,
        target: AgentId,
        ability: AbilityId,
        triggered: bool,
    ) -> Result<(), CastError>;

    fn is_casting(&self, agent: AgentId) -> bool;

    fn cancel_cast(&self, agent: AgentId);

    /// Swings at the current victim when the swing timer allows it.
    fn melee_attack_if_ready(&self, agent: AgentId) -> bool;

    /// Fires `ability` at the current victim when the attack timer allows it.
    fn spell_attack_if_ready(&self, agent: AgentId, ability: AbilityId) -> bool;

    /// Whether `target` carries crowd control that damage from `attacker` would break.
    fn has_breakable_cc(&self, _target: AgentId, _attacker: AgentId) -> bool {
        false
    }

    /// Engages `target`. Returns false when the engagement was refused.
    fn attack_start(&self, agent: AgentId, target: AgentId, melee: bool) -> bool;

    fn attack_stop(&self, agent: AgentId);

    /// Leaves combat entirely (attack stop plus threat and combat flags).
    fn combat_stop(&self, agent: AgentId);
}

/// Reasons the combat collaborator rejected a cast at issue time.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CastError {
    #[error("caster is not ready")]
    NotReady,

    #[error("target out of range")]
    OutOfRange,

    #[error("target not in line of sight")]
    NoLineOfSight,

    #[error("target {0} is not a valid target")]
    InvalidTarget(AgentId),

    #[error("cast interrupted")]
    Interrupted,

    #[error("unknown ability {0}")]
    UnknownAbility(AbilityId),
}

impl AiError for CastError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            CastError::UnknownAbility(_) | CastError::InvalidTarget(_) => ErrorSeverity::Validation,
            _ => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            CastError::NotReady => "CAST_NOT_READY",
            CastError::OutOfRange => "CAST_OUT_OF_RANGE",
            CastError::NoLineOfSight => "CAST_NO_LINE_OF_SIGHT",
            CastError::InvalidTarget(_) => "CAST_INVALID_TARGET",
            CastError::Interrupted => "CAST_INTERRUPTED",
            CastError::UnknownAbility(_) => "CAST_UNKNOWN_ABILITY",
        }
    }
}
