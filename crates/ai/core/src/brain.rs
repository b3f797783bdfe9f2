//! One agent's complete AI: controller, scheduler, motion stack and RNG.
//!
//! The world owns the [`AgentState`]; the brain borrows it for the duration
//! of each call and never stores it.
use std::sync::Arc;

use tracing::debug;

use crate::ability::AbilityId;
use crate::behavior::{AgentAi, AiContext, Archetype};
use crate::config::AiConfig;
use crate::env::{AiEnv, AiRng, OracleError};
use crate::motion::{MotionGenerator, MotionStack, MotionTransition};
use crate::scheduler::EventScheduler;
use crate::state::{AgentId, AgentState, Millis, UnitState};

#[derive(Debug)]
pub struct Brain {
    controller: Box<dyn AgentAi>,
    scheduler: EventScheduler,
    motion: MotionStack,
    rng: AiRng,
    config: Arc<AiConfig>,
}

impl Brain {
    pub fn new(controller: Box<dyn AgentAi>, rng: AiRng, config: Arc<AiConfig>) -> Self {
        Self {
            controller,
            scheduler: EventScheduler::new(),
            motion: MotionStack::new(),
            rng,
            config,
        }
    }

    /// Brain with the default archetype for `agent`, or `None` when the agent
    /// gets no AI at all.
    pub fn for_agent(
        agent: &AgentState,
        env: &AiEnv<'_>,
        config: Arc<AiConfig>,
        world_seed: u64,
    ) -> Option<Self> {
        let archetype = Archetype::select_default(agent)?;
        Some(Self::with_archetype(archetype, agent, env, config, world_seed))
    }

    pub fn with_archetype(
        archetype: Archetype,
        agent: &AgentState,
        env: &AiEnv<'_>,
        config: Arc<AiConfig>,
        world_seed: u64,
    ) -> Self {
        let controller = archetype.build(agent, env, &config);
        Self::new(controller, AiRng::for_agent(world_seed, agent.id), config)
    }

    pub fn archetype(&self) -> Archetype {
        self.controller.archetype()
    }

    pub fn scheduler(&self) -> &EventScheduler {
        &self.scheduler
    }

    pub fn motion(&self) -> &MotionStack {
        &self.motion
    }

    /// Prepares the brain after spawn. Agents with a respawn radius wander
    /// around home when idle.
    pub fn initialize(&mut self, agent: &mut AgentState, env: &AiEnv<'_>) -> Result<(), OracleError> {
        self.with_context(agent, env, |controller, ctx| {
            if ctx.agent.respawn_radius > 0.0 && ctx.agent.alive {
                ctx.clear_motion();
                ctx.push_motion(MotionGenerator::random_wander(0.0))?;
            }
            controller.initialize(ctx)
        })
    }

    /// One tick: controller first, then the active motion generator.
    pub fn update(
        &mut self,
        agent: &mut AgentState,
        env: &AiEnv<'_>,
        delta: Millis,
    ) -> Result<(), OracleError> {
        self.with_context(agent, env, |controller, ctx| {
            controller.update(ctx, delta)?;
            ctx.update_motion(delta)
        })
    }

    pub fn enter_combat(
        &mut self,
        agent: &mut AgentState,
        env: &AiEnv<'_>,
        who: AgentId,
    ) -> Result<(), OracleError> {
        self.with_context(agent, env, |controller, ctx| {
            debug!(target: "ai::brain", agent = %ctx.agent.id, target = %who, "entering combat");
            ctx.agent.target = Some(who);
            ctx.agent.add_state(UnitState::IN_COMBAT);
            controller.enter_combat(ctx, who)?;
            controller.attack_start(ctx, who)
        })
    }

    pub fn set_target(
        &mut self,
        agent: &mut AgentState,
        env: &AiEnv<'_>,
        target: AgentId,
    ) -> Result<(), OracleError> {
        self.with_context(agent, env, |controller, ctx| controller.set_target(ctx, target))
    }

    /// Fires death abilities, then drops every pending timer and motion.
    pub fn just_died(
        &mut self,
        agent: &mut AgentState,
        env: &AiEnv<'_>,
        killer: Option<AgentId>,
    ) -> Result<(), OracleError> {
        self.with_context(agent, env, |controller, ctx| {
            controller.just_died(ctx, killer)?;
            ctx.scheduler.cancel_all();
            ctx.agent.target = None;
            ctx.agent.clear_state(UnitState::IN_COMBAT | UnitState::CASTING);
            ctx.clear_motion();
            ctx.push_motion(MotionGenerator::Idle)
        })
    }

    pub fn spell_interrupted(
        &mut self,
        agent: &mut AgentState,
        env: &AiEnv<'_>,
        ability: AbilityId,
        recovery: Millis,
    ) {
        self.with_context(agent, env, |controller, ctx| {
            controller.spell_interrupted(ctx, ability, recovery);
        });
    }

    pub fn occupant_changed(
        &mut self,
        agent: &mut AgentState,
        env: &AiEnv<'_>,
        in_use: bool,
    ) -> Result<(), OracleError> {
        self.with_context(agent, env, |controller, ctx| controller.occupant_changed(ctx, in_use))
    }

    /// Resets the controller and re-arms the active motion generator.
    pub fn reset(&mut self, agent: &mut AgentState, env: &AiEnv<'_>) -> Result<(), OracleError> {
        self.with_context(agent, env, |controller, ctx| {
            controller.reset(ctx)?;
            ctx.reset_motion()
        })
    }

    /// Pushes an externally requested generator (distract, rotate).
    pub fn push_motion(
        &mut self,
        agent: &mut AgentState,
        env: &AiEnv<'_>,
        generator: MotionGenerator,
    ) -> Result<(), OracleError> {
        self.with_context(agent, env, |_, ctx| ctx.push_motion(generator))
    }

    fn with_context<R>(
        &mut self,
        agent: &mut AgentState,
        env: &AiEnv<'_>,
        call: impl FnOnce(&mut dyn AgentAi, &mut AiContext<'_, '_>) -> R,
    ) -> R {
        let mut ctx = AiContext {
            agent,
            env,
            scheduler: &mut self.scheduler,
            motion: &mut self.motion,
            rng: &mut self.rng,
            config: &self.config,
        };

        let result = call(self.controller.as_mut(), &mut ctx);

        for transition in ctx.motion.drain_transitions() {
            if let MotionTransition::Finalized(kind) = transition {
                self.controller.movement_inform(&mut ctx, kind);
            }
        }
        result
    }
}
