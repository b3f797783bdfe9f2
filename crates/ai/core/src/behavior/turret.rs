use std::sync::Arc;

use tracing::error;

use super::skeleton::{CombatPolicy, run_combat_tick};
use super::{AgentAi, AiContext, Archetype};
use crate::ability::{AbilityDescriptor, AbilityKit};
use crate::env::OracleError;
use crate::state::{AgentId, AgentState, AgentView, Millis};

/// Stationary attacker.
///
/// Never moves. Attacks with its primary ability only while the target is
/// inside the closed band `[min_range, max_range]`; outside it the attack is
/// skipped.
#[derive(Clone, Debug)]
pub struct TurretAi {
    primary: Option<Arc<AbilityDescriptor>>,
    min_range: f32,
    max_range: f32,
}

impl TurretAi {
    pub fn new(agent: &AgentState, kit: &AbilityKit) -> Self {
        let primary = kit.at(0).cloned();
        if primary.is_none() {
            error!(target: "ai::behavior", agent = %agent.id, template = agent.template_id, "turret without a primary ability, will do nothing");
        }

        let (min_range, max_range) = primary
            .as_ref()
            .map_or((0.0, 0.0), |ability| (ability.min_range, ability.max_range));

        Self {
            primary,
            min_range,
            max_range,
        }
    }

    fn in_band(&self, distance: f32) -> bool {
        self.min_range <= distance && distance <= self.max_range
    }
}

impl CombatPolicy for TurretAi {
    fn on_out_of_sight(
        &mut self,
        ctx: &mut AiContext<'_, '_>,
        _target: &AgentView,
    ) -> Result<(), OracleError> {
        ctx.env.combat()?.cancel_cast(ctx.agent.id);
        Ok(())
    }

    fn on_queue_empty(
        &mut self,
        ctx: &mut AiContext<'_, '_>,
        target: &AgentView,
    ) -> Result<(), OracleError> {
        let Some(primary) = &self.primary else {
            return Ok(());
        };
        if self.can_attack(ctx, target) {
            ctx.env
                .combat()?
                .spell_attack_if_ready(ctx.agent.id, primary.id);
        }
        Ok(())
    }
}

impl AgentAi for TurretAi {
    fn archetype(&self) -> Archetype {
        Archetype::Turret
    }

    fn update(&mut self, ctx: &mut AiContext<'_, '_>, delta: Millis) -> Result<(), OracleError> {
        run_combat_tick(self, ctx, delta)
    }

    fn attack_start(&mut self, ctx: &mut AiContext<'_, '_>, who: AgentId) -> Result<(), OracleError> {
        ctx.engage(who, false)?;
        Ok(())
    }

    fn can_attack(&self, ctx: &AiContext<'_, '_>, target: &AgentView) -> bool {
        self.in_band(ctx.agent.position.distance(&target.position))
    }
}
