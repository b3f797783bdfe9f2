//! Common error infrastructure for ai-core.
//!
//! Nothing in the kernel terminates an agent or the world tick: every failure
//! degrades to "do nothing productive this tick and retry later". The types
//! here classify failures so callers and logs can tell transient conditions
//! apart from missing data or programmer errors.
//!
//! Domain-specific errors (e.g. [`CastError`](crate::env::CastError),
//! [`OracleError`](crate::env::OracleError)) live next to the collaborators
//! that produce them.

use crate::state::AgentId;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: transient; the next tick (or a backoff) may succeed
/// - **Validation**: invalid reference or input; retrying unchanged will not help
/// - **Internal**: unexpected state inconsistency that should be investigated
/// - **Fatal**: a required collaborator is absent; the agent cannot act
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - retry later.
    ///
    /// Examples: no path found, cast rejected because the target moved
    Recoverable,

    /// Validation error - invalid reference.
    ///
    /// Examples: unknown ability id, unknown agent
    Validation,

    /// Internal error - unexpected state inconsistency.
    Internal,

    /// Fatal error - required collaborator missing.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Contextual information attached to errors for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ErrorContext {
    /// Agent whose update produced the error (if applicable).
    pub agent: Option<AgentId>,

    /// Scheduler clock (milliseconds) when the error occurred.
    pub clock: u64,

    /// Optional static message providing additional context.
    pub message: Option<&'static str>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(clock: u64) -> Self {
        Self {
            agent: None,
            clock,
            message: None,
        }
    }

    #[must_use]
    pub const fn with_agent(mut self, agent: AgentId) -> Self {
        self.agent = Some(agent);
        self
    }

    #[must_use]
    pub const fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

/// Common trait for all ai-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
/// - Return a stable, upper-case error code for log aggregation
pub trait AiError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns the context information for this error, if available.
    fn context(&self) -> Option<&ErrorContext> {
        None
    }

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_classification() {
        assert!(ErrorSeverity::Recoverable.is_recoverable());
        assert!(!ErrorSeverity::Validation.is_recoverable());
        assert!(ErrorSeverity::Fatal.is_internal());
        assert!(!ErrorSeverity::Recoverable.is_internal());
        assert_eq!(ErrorSeverity::Internal.as_str(), "internal");
    }

    #[test]
    fn context_builder_attaches_fields() {
        let ctx = ErrorContext::new(1200)
            .with_agent(AgentId(7))
            .with_message("path not found");

        assert_eq!(ctx.agent, Some(AgentId(7)));
        assert_eq!(ctx.clock, 1200);
        assert_eq!(ctx.message, Some("path not found"));
    }
}
