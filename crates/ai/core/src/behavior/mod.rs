//! Behavior controllers.
//!
//! Every archetype implements [`AgentAi`]. Combat archetypes share one per-tick
//! skeleton ([`skeleton::run_combat_tick`]) and differ only in the hooks of
//! [`CombatPolicy`]; the vehicle seat controller runs its own timers and never
//! fights.
mod aggressor;
mod archer;
mod archetype;
mod caster;
mod combat;
mod skeleton;
mod turret;
mod vehicle;

pub use aggressor::AggressorAi;
pub use archer::ArcherAi;
pub use archetype::Archetype;
pub use caster::CasterAi;
pub use combat::CombatAi;
pub use skeleton::CombatPolicy;
pub use turret::TurretAi;
pub use vehicle::VehicleAi;

use std::fmt;

use tracing::debug;

use crate::ability::AbilityId;
use crate::config::AiConfig;
use crate::env::{AiEnv, AiRng, OracleError};
use crate::motion::{MotionContext, MotionGenerator, MotionKind, MotionStack};
use crate::scheduler::EventScheduler;
use crate::state::{AgentId, AgentState, AgentView, Millis, UnitState};

/// Per-agent decision logic, invoked once per tick with exclusive access to
/// the agent's scheduler and motion stack.
pub trait AgentAi: Send + fmt::Debug {
    fn archetype(&self) -> Archetype;

    fn initialize(&mut self, _ctx: &mut AiContext<'_, '_>) -> Result<(), OracleError> {
        Ok(())
    }

    /// The per-tick decision function.
    fn update(&mut self, ctx: &mut AiContext<'_, '_>, delta: Millis) -> Result<(), OracleError>;

    /// Combat begins against `who`.
    fn enter_combat(
        &mut self,
        _ctx: &mut AiContext<'_, '_>,
        _who: AgentId,
    ) -> Result<(), OracleError> {
        Ok(())
    }

    /// Engages `who`: melee attack and an unbounded chase.
    fn attack_start(
        &mut self,
        ctx: &mut AiContext<'_, '_>,
        who: AgentId,
    ) -> Result<(), OracleError> {
        if ctx.engage(who, true)? {
            ctx.replace_motion(MotionGenerator::chase(who, None))?;
        }
        Ok(())
    }

    /// Explicit target assignment (charmed and summoned agents).
    fn set_target(
        &mut self,
        ctx: &mut AiContext<'_, '_>,
        target: AgentId,
    ) -> Result<(), OracleError> {
        if ctx.is_valid_new_target(target)? {
            self.attack_start(ctx, target)?;
        }
        Ok(())
    }

    fn just_died(
        &mut self,
        _ctx: &mut AiContext<'_, '_>,
        _killer: Option<AgentId>,
    ) -> Result<(), OracleError> {
        Ok(())
    }

    /// An in-progress cast of `ability` was interrupted.
    fn spell_interrupted(
        &mut self,
        _ctx: &mut AiContext<'_, '_>,
        _ability: AbilityId,
        _recovery: Millis,
    ) {
    }

    /// A motion generator this controller cares about has ended.
    fn movement_inform(&mut self, ctx: &mut AiContext<'_, '_>, kind: MotionKind) {
        debug!(target: "ai::behavior", agent = %ctx.agent.id, %kind, "motion finished");
    }

    /// Seat occupancy toggled (vehicles) or the agent was charmed/released.
    fn occupant_changed(
        &mut self,
        _ctx: &mut AiContext<'_, '_>,
        _in_use: bool,
    ) -> Result<(), OracleError> {
        Ok(())
    }

    fn reset(&mut self, ctx: &mut AiContext<'_, '_>) -> Result<(), OracleError> {
        ctx.scheduler.cancel_all();
        Ok(())
    }

    fn can_attack(&self, _ctx: &AiContext<'_, '_>, _target: &AgentView) -> bool {
        true
    }
}

/// Exclusive view of one agent's kernel state for the duration of a call.
pub struct AiContext<'a, 'env> {
    pub agent: &'a mut AgentState,
    pub env: &'a AiEnv<'env>,
    pub scheduler: &'a mut EventScheduler,
    pub motion: &'a mut MotionStack,
    pub rng: &'a mut AiRng,
    pub config: &'a AiConfig,
}

impl<'a, 'env> AiContext<'a, 'env> {
    fn split(&mut self) -> (&mut MotionStack, MotionContext<'_, 'env>) {
        (
            &mut *self.motion,
            MotionContext {
                agent: &mut *self.agent,
                env: self.env,
                rng: &mut *self.rng,
                config: self.config,
            },
        )
    }

    pub fn push_motion(&mut self, generator: MotionGenerator) -> Result<(), OracleError> {
        let (stack, mut ctx) = self.split();
        stack.push(generator, &mut ctx)
    }

    pub fn replace_motion(&mut self, generator: MotionGenerator) -> Result<(), OracleError> {
        let (stack, mut ctx) = self.split();
        stack.replace_top(generator, &mut ctx)
    }

    pub fn pop_motion(&mut self) -> Option<MotionGenerator> {
        let (stack, mut ctx) = self.split();
        stack.pop(&mut ctx)
    }

    /// Unwinds the motion stack to its bottom generator.
    pub fn park_motion(&mut self) -> Result<(), OracleError> {
        let (stack, mut ctx) = self.split();
        stack.park(&mut ctx)
    }

    pub fn clear_motion(&mut self) {
        let (stack, mut ctx) = self.split();
        stack.clear(&mut ctx);
    }

    pub fn reset_motion(&mut self) -> Result<(), OracleError> {
        let (stack, mut ctx) = self.split();
        stack.reset_top(&mut ctx)
    }

    pub fn update_motion(&mut self, delta: Millis) -> Result<(), OracleError> {
        let (stack, mut ctx) = self.split();
        stack.update(delta, &mut ctx)
    }

    /// Resolves the current target; a vanished or dead target is dropped.
    pub fn current_target(&mut self) -> Result<Option<AgentView>, OracleError> {
        let Some(id) = self.agent.target else {
            return Ok(None);
        };

        match self.env.world()?.view(id) {
            Some(view) if view.alive => Ok(Some(view)),
            _ => {
                debug!(target: "ai::behavior", agent = %self.agent.id, target = %id, "target lost");
                self.agent.target = None;
                Ok(None)
            }
        }
    }

    /// Whether `candidate` may become this agent's target: not itself, not
    /// its owner, not friendly.
    pub fn is_valid_new_target(&self, candidate: AgentId) -> Result<bool, OracleError> {
        if candidate == self.agent.id || Some(candidate) == self.agent.owner {
            return Ok(false);
        }
        Ok(!self.env.world()?.is_friendly(self.agent.id, candidate))
    }

    /// Makes `who` the current target and asks the combat collaborator to
    /// engage. Returns whether the engagement was accepted.
    pub fn engage(&mut self, who: AgentId, melee: bool) -> Result<bool, OracleError> {
        let accepted = self.env.combat()?.attack_start(self.agent.id, who, melee);
        if accepted {
            self.agent.target = Some(who);
            self.agent.add_state(UnitState::IN_COMBAT);
        }
        Ok(accepted)
    }

    /// Leaves combat and stops casting. Safe to call every tick.
    pub fn disengage(&mut self) -> Result<(), OracleError> {
        let combat = self.env.combat()?;
        if self.agent.has_state(UnitState::IN_COMBAT) {
            combat.combat_stop(self.agent.id);
            self.agent.clear_state(UnitState::IN_COMBAT);
        }
        if combat.is_casting(self.agent.id) {
            combat.cancel_cast(self.agent.id);
        }
        self.agent.clear_state(UnitState::CASTING);
        Ok(())
    }
}
