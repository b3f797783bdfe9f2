use strum::Display;

use super::{
    ChaseMotion, DistractMotion, FollowMotion, MotionContext, RotateDirection, RotateMotion,
    WanderMotion,
};
use crate::env::OracleError;
use crate::state::{AgentId, Millis, UnitState};

/// Discriminant of [`MotionGenerator`], used for logging and notifications.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum MotionKind {
    Idle,
    Chase,
    Follow,
    RandomWander,
    Rotate,
    Distract,
}

/// Closed set of motion strategies.
#[derive(Clone, Debug, PartialEq)]
pub enum MotionGenerator {
    Idle,
    Chase(ChaseMotion),
    Follow(FollowMotion),
    RandomWander(WanderMotion),
    Rotate(RotateMotion),
    Distract(DistractMotion),
}

impl MotionGenerator {
    pub fn chase(target: AgentId, max_distance: Option<f32>) -> Self {
        Self::Chase(ChaseMotion::new(target, max_distance))
    }

    pub fn follow(owner: AgentId, distance: f32, angle: f32) -> Self {
        Self::Follow(FollowMotion::new(owner, distance, angle))
    }

    /// Random wander around home; a zero distance uses the respawn radius.
    pub fn random_wander(wander_distance: f32) -> Self {
        Self::RandomWander(WanderMotion::new(wander_distance))
    }

    pub fn rotate(direction: RotateDirection, duration: Millis) -> Self {
        Self::Rotate(RotateMotion::new(direction, duration))
    }

    pub fn distract(duration: Millis) -> Self {
        Self::Distract(DistractMotion::new(duration))
    }

    /// Distract that hands the agent back to aggressive reactions when it ends.
    pub fn assist_distract(duration: Millis) -> Self {
        Self::Distract(DistractMotion::assistance(duration))
    }

    pub fn kind(&self) -> MotionKind {
        match self {
            Self::Idle => MotionKind::Idle,
            Self::Chase(_) => MotionKind::Chase,
            Self::Follow(_) => MotionKind::Follow,
            Self::RandomWander(_) => MotionKind::RandomWander,
            Self::Rotate(_) => MotionKind::Rotate,
            Self::Distract(_) => MotionKind::Distract,
        }
    }

    pub(super) fn initialize(&mut self, ctx: &mut MotionContext<'_, '_>) -> Result<(), OracleError> {
        match self {
            Self::Idle => idle_reset(ctx),
            Self::Chase(chase) => chase.initialize(ctx),
            Self::Follow(follow) => follow.initialize(ctx),
            Self::RandomWander(wander) => wander.initialize(ctx),
            Self::Rotate(rotate) => rotate.initialize(ctx),
            Self::Distract(distract) => distract.initialize(ctx),
        }
    }

    /// Re-arms the generator in place by re-running its initialization.
    pub(super) fn reset(&mut self, ctx: &mut MotionContext<'_, '_>) -> Result<(), OracleError> {
        self.initialize(ctx)
    }

    /// Returns false once the generator has finished.
    pub(super) fn update(
        &mut self,
        delta: Millis,
        ctx: &mut MotionContext<'_, '_>,
    ) -> Result<bool, OracleError> {
        match self {
            Self::Idle => Ok(true),
            Self::Chase(chase) => chase.update(ctx),
            Self::Follow(follow) => follow.update(ctx),
            Self::RandomWander(wander) => wander.update(delta, ctx).map(|_| true),
            Self::Rotate(rotate) => Ok(rotate.update(delta, ctx)),
            Self::Distract(distract) => Ok(distract.update(delta)),
        }
    }

    pub(super) fn finalize(&mut self, ctx: &mut MotionContext<'_, '_>) -> Result<(), OracleError> {
        match self {
            Self::Idle => Ok(()),
            Self::Chase(chase) => chase.finalize(ctx),
            Self::Follow(follow) => follow.finalize(ctx),
            Self::RandomWander(wander) => wander.finalize(ctx),
            Self::Rotate(rotate) => {
                rotate.finalize(ctx);
                Ok(())
            }
            Self::Distract(distract) => {
                distract.finalize(ctx);
                Ok(())
            }
        }
    }
}

fn idle_reset(ctx: &mut MotionContext<'_, '_>) -> Result<(), OracleError> {
    stop_if_moving(ctx)
}

/// Interrupts the spline in progress, if the agent is moving.
pub(super) fn stop_if_moving(ctx: &mut MotionContext<'_, '_>) -> Result<(), OracleError> {
    if ctx.agent.has_state(UnitState::MOVE) {
        ctx.env.planner()?.stop_moving(ctx.agent.id);
        ctx.agent.clear_state(UnitState::MOVE);
    }
    Ok(())
}
