//! Stack-based motion generators.
//!
//! A [`MotionStack`] is a LIFO of [`MotionGenerator`]s; only the top element
//! receives updates. `push` initializes the new top and leaves the previous
//! one suspended beneath it; `pop` finalizes the removed top and resumes the
//! element below without re-initializing it.
//!
//! Lifecycle hooks are recorded as [`MotionTransition`]s so the owner can
//! route notifications (e.g. "rotation finished") back to its controller
//! after the stack call returns.
mod chase;
mod distract;
mod generator;
mod rotate;
mod sampler;
mod wander;

pub use chase::{ChaseMotion, FollowMotion};
pub use distract::DistractMotion;
pub use generator::{MotionGenerator, MotionKind};
pub use rotate::{RotateDirection, RotateMotion};
pub use sampler::WanderSampler;
pub use wander::{WanderMotion, WanderOutcome};

use tracing::{trace, warn};

use crate::config::AiConfig;
use crate::env::{AiEnv, AiRng, OracleError};
use crate::state::{AgentState, Millis};

/// Everything a generator may touch while it runs.
pub struct MotionContext<'a, 'env> {
    pub agent: &'a mut AgentState,
    pub env: &'a AiEnv<'env>,
    pub rng: &'a mut AiRng,
    pub config: &'a AiConfig,
}

/// Lifecycle record emitted by the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionTransition {
    Initialized(MotionKind),
    Finalized(MotionKind),
}

#[derive(Clone, Debug)]
pub struct MotionStack {
    stack: Vec<MotionGenerator>,
    transitions: Vec<MotionTransition>,
}

impl Default for MotionStack {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionStack {
    /// A stack holding a single, not yet initialized, Idle generator.
    pub fn new() -> Self {
        Self {
            stack: vec![MotionGenerator::Idle],
            transitions: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// The generator receiving updates, if any.
    pub fn active(&self) -> Option<&MotionGenerator> {
        self.stack.last()
    }

    pub fn active_kind(&self) -> Option<MotionKind> {
        self.active().map(MotionGenerator::kind)
    }

    /// Kinds from bottom to top.
    pub fn kinds(&self) -> Vec<MotionKind> {
        self.stack.iter().map(MotionGenerator::kind).collect()
    }

    pub fn contains(&self, kind: MotionKind) -> bool {
        self.stack.iter().any(|generator| generator.kind() == kind)
    }

    /// Takes the lifecycle records accumulated since the last drain.
    pub fn drain_transitions(&mut self) -> Vec<MotionTransition> {
        std::mem::take(&mut self.transitions)
    }

    /// Suspends the current top and initializes `generator` on top of it.
    pub fn push(
        &mut self,
        mut generator: MotionGenerator,
        ctx: &mut MotionContext<'_, '_>,
    ) -> Result<(), OracleError> {
        let kind = generator.kind();
        trace!(target: "ai::motion", agent = %ctx.agent.id, %kind, depth = self.stack.len(), "push");

        let result = generator.initialize(ctx);
        self.stack.push(generator);
        self.transitions.push(MotionTransition::Initialized(kind));
        result
    }

    /// Removes and finalizes the top generator.
    ///
    /// Popping an empty stack is a programmer error; release builds recover
    /// by pushing Idle.
    pub fn pop(&mut self, ctx: &mut MotionContext<'_, '_>) -> Option<MotionGenerator> {
        debug_assert!(!self.stack.is_empty(), "pop on empty motion stack");

        let Some(mut generator) = self.stack.pop() else {
            warn!(target: "ai::motion", agent = %ctx.agent.id, "pop on empty motion stack, pushing idle");
            if let Err(error) = self.push(MotionGenerator::Idle, ctx) {
                warn!(target: "ai::motion", agent = %ctx.agent.id, %error, "idle initialize failed");
            }
            return None;
        };

        self.finalize(&mut generator, ctx);
        Some(generator)
    }

    /// Pops every element, finalizing each from top to bottom.
    pub fn clear(&mut self, ctx: &mut MotionContext<'_, '_>) {
        while let Some(mut generator) = self.stack.pop() {
            self.finalize(&mut generator, ctx);
        }
    }

    /// Unwinds to the bottom element; an empty stack gets a fresh Idle.
    pub fn park(&mut self, ctx: &mut MotionContext<'_, '_>) -> Result<(), OracleError> {
        while self.stack.len() > 1 {
            self.pop(ctx);
        }
        if self.stack.is_empty() {
            self.push(MotionGenerator::Idle, ctx)?;
        }
        Ok(())
    }

    /// Replaces the top with `generator`. The bottom element is never replaced.
    pub fn replace_top(
        &mut self,
        generator: MotionGenerator,
        ctx: &mut MotionContext<'_, '_>,
    ) -> Result<(), OracleError> {
        if self.stack.len() > 1 {
            self.pop(ctx);
        }
        self.push(generator, ctx)
    }

    /// Re-arms the top generator in place.
    pub fn reset_top(&mut self, ctx: &mut MotionContext<'_, '_>) -> Result<(), OracleError> {
        match self.stack.last_mut() {
            Some(generator) => generator.reset(ctx),
            None => Ok(()),
        }
    }

    /// Advances the top generator; a finished generator is popped.
    pub fn update(
        &mut self,
        delta: Millis,
        ctx: &mut MotionContext<'_, '_>,
    ) -> Result<(), OracleError> {
        let Some(top) = self.stack.last_mut() else {
            return Ok(());
        };

        if !top.update(delta, ctx)? {
            self.pop(ctx);
        }
        Ok(())
    }

    fn finalize(&mut self, generator: &mut MotionGenerator, ctx: &mut MotionContext<'_, '_>) {
        let kind = generator.kind();
        trace!(target: "ai::motion", agent = %ctx.agent.id, %kind, "finalize");

        if let Err(error) = generator.finalize(ctx) {
            warn!(target: "ai::motion", agent = %ctx.agent.id, %kind, %error, "finalize failed");
        }
        self.transitions.push(MotionTransition::Finalized(kind));
    }
}
