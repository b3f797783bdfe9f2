use crate::state::{AgentId, AgentView};

/// Registry of every agent in the world.
///
/// Cross-agent references (target, owner) are plain ids resolved through this
/// trait; holding an id never keeps the other agent alive.
pub trait WorldOracle: Send + Sync {
    fn view(&self, id: AgentId) -> Option<AgentView>;

    /// Whether `observer` can currently see or detect `target`.
    fn can_perceive(&self, observer: AgentId, target: AgentId) -> bool;

    fn is_friendly(&self, a: AgentId, b: AgentId) -> bool;

    /// Removes `agent` from the world at the end of the current tick.
    fn despawn(&self, agent: AgentId);
}
