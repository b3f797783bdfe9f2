use super::skeleton::{CombatPolicy, run_combat_tick};
use super::{AgentAi, AiContext, Archetype};
use crate::env::OracleError;
use crate::state::{AgentState, Millis};

/// Melee-only attacker.
#[derive(Clone, Debug, Default)]
pub struct AggressorAi;

impl AggressorAi {
    pub fn new() -> Self {
        Self
    }

    /// Agents that are neither civilian nor neutral to everyone.
    pub fn permissible(agent: &AgentState) -> bool {
        !agent.civilian && !agent.neutral_to_all
    }
}

impl CombatPolicy for AggressorAi {}

impl AgentAi for AggressorAi {
    fn archetype(&self) -> Archetype {
        Archetype::Aggressor
    }

    fn update(&mut self, ctx: &mut AiContext<'_, '_>, delta: Millis) -> Result<(), OracleError> {
        run_combat_tick(self, ctx, delta)
    }
}
