//! Mount/vehicle seat controller.
//!
//! Two coarse states, idle and in use, toggled by the occupant-changed
//! signal. A periodic check evicts at most one ineligible player occupant per
//! interval. A condition-bound vehicle left empty despawns itself after the
//! dismiss delay unless someone boards it again first.
use tracing::{debug, info, warn};

use super::{AgentAi, AiContext, Archetype};
use crate::config::AiConfig;
use crate::env::{AiEnv, OccupantView, OracleError, Predicate};
use crate::state::{AgentState, Millis};

#[derive(Debug)]
pub struct VehicleAi {
    conditions: Vec<Predicate>,
    in_use: bool,
    check_interval: Millis,
    check_remaining: Millis,
    dismiss_delay: Millis,
    dismiss_remaining: Option<Millis>,
}

impl VehicleAi {
    pub fn new(agent: &AgentState, env: &AiEnv<'_>, config: &AiConfig) -> Self {
        let conditions = match env.conditions() {
            Ok(oracle) => oracle.conditions_for(agent.template_id),
            Err(error) => {
                debug!(target: "ai::vehicle", agent = %agent.id, %error, "no condition source");
                Vec::new()
            }
        };
        if !conditions.is_empty() {
            debug!(target: "ai::vehicle", agent = %agent.id, count = conditions.len(), "loaded seat conditions");
            if env.seats().is_err() {
                warn!(target: "ai::vehicle", agent = %agent.id, "seat conditions without a seat collaborator, checks disabled");
            }
        }

        Self {
            conditions,
            in_use: false,
            check_interval: config.condition_check_interval_ms,
            check_remaining: config.condition_check_interval_ms,
            dismiss_delay: config.dismiss_delay_ms,
            dismiss_remaining: None,
        }
    }

    pub fn in_use(&self) -> bool {
        self.in_use
    }

    pub fn dismiss_pending(&self) -> bool {
        self.dismiss_remaining.is_some()
    }

    fn passes(&self, occupant: &OccupantView) -> bool {
        self.conditions
            .iter()
            .all(|predicate| predicate.evaluate(occupant))
    }

    fn check_conditions(&mut self, ctx: &mut AiContext<'_, '_>, delta: Millis) {
        self.check_remaining = self.check_remaining.saturating_sub(delta);
        if self.check_remaining > 0 {
            return;
        }
        self.check_remaining = self.check_interval;

        if self.conditions.is_empty() {
            return;
        }
        let Ok(seats) = ctx.env.seats() else {
            return;
        };

        let evicted = seats
            .occupants(ctx.agent.id)
            .into_iter()
            .find(|occupant| occupant.is_player && !self.passes(occupant));

        if let Some(occupant) = evicted {
            info!(
                target: "ai::vehicle",
                vehicle = %ctx.agent.id,
                occupant = %occupant.id,
                seat = occupant.seat,
                "occupant no longer eligible, unseating"
            );
            seats.eject(ctx.agent.id, occupant.id);
        }
    }

    fn advance_dismiss(&mut self, ctx: &mut AiContext<'_, '_>, delta: Millis) -> Result<(), OracleError> {
        let Some(remaining) = self.dismiss_remaining else {
            return Ok(());
        };

        let remaining = remaining.saturating_sub(delta);
        if remaining > 0 {
            self.dismiss_remaining = Some(remaining);
            return Ok(());
        }

        self.dismiss_remaining = None;
        info!(target: "ai::vehicle", vehicle = %ctx.agent.id, "abandoned, despawning");
        ctx.agent.visible = false;
        ctx.env.world()?.despawn(ctx.agent.id);
        Ok(())
    }
}

impl AgentAi for VehicleAi {
    fn archetype(&self) -> Archetype {
        Archetype::Vehicle
    }

    /// Runs whether or not the vehicle is occupied.
    fn update(&mut self, ctx: &mut AiContext<'_, '_>, delta: Millis) -> Result<(), OracleError> {
        self.check_conditions(ctx, delta);
        self.advance_dismiss(ctx, delta)
    }

    fn occupant_changed(
        &mut self,
        ctx: &mut AiContext<'_, '_>,
        in_use: bool,
    ) -> Result<(), OracleError> {
        if self.in_use && !in_use && !self.conditions.is_empty() {
            debug!(target: "ai::vehicle", vehicle = %ctx.agent.id, delay = self.dismiss_delay, "arming dismiss");
            self.dismiss_remaining = Some(self.dismiss_delay);
            if let Ok(seats) = ctx.env.seats() {
                seats.set_boardable(ctx.agent.id, false);
            }
        } else if in_use && self.dismiss_remaining.take().is_some() {
            debug!(target: "ai::vehicle", vehicle = %ctx.agent.id, "boarded again, dismiss cancelled");
        }

        self.in_use = in_use;
        Ok(())
    }

    fn reset(&mut self, ctx: &mut AiContext<'_, '_>) -> Result<(), OracleError> {
        ctx.agent.visible = true;
        Ok(())
    }
}
