//! Unified error types surfaced by the runtime API.
use thiserror::Error;
use tokio::sync::oneshot;

use ai_core::{AgentId, AiError, ErrorSeverity, OracleError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("simulation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires content to be configured before building")]
    MissingContent,

    #[error("unknown agent template {0}")]
    UnknownTemplate(u32),

    #[error("agent {0} does not exist")]
    UnknownAgent(AgentId),

    #[error("agent {0} is dead")]
    AgentDead(AgentId),

    #[error("update of agent {0} panicked")]
    AgentPanicked(AgentId),

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

impl AiError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            RuntimeError::UnknownTemplate(_)
            | RuntimeError::UnknownAgent(_)
            | RuntimeError::AgentDead(_) => ErrorSeverity::Validation,
            RuntimeError::Oracle(error) => error.severity(),
            RuntimeError::MissingContent => ErrorSeverity::Fatal,
            _ => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RuntimeError::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            RuntimeError::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            RuntimeError::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
            RuntimeError::MissingContent => "RUNTIME_MISSING_CONTENT",
            RuntimeError::UnknownTemplate(_) => "RUNTIME_UNKNOWN_TEMPLATE",
            RuntimeError::UnknownAgent(_) => "RUNTIME_UNKNOWN_AGENT",
            RuntimeError::AgentDead(_) => "RUNTIME_AGENT_DEAD",
            RuntimeError::AgentPanicked(_) => "RUNTIME_AGENT_PANICKED",
            RuntimeError::Oracle(error) => error.error_code(),
        }
    }
}
