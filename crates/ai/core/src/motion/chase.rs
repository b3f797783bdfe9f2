use tracing::trace;

use super::MotionContext;
use super::generator::stop_if_moving;
use crate::env::{OracleError, SplineTarget};
use crate::state::{AgentId, Position, UnitState};

/// How far a followed agent may drift before the spline is relaunched.
const REPATH_DISTANCE: f32 = 1.0;
/// Slack around a follow slot inside which the follower stands still.
const FOLLOW_TOLERANCE: f32 = 0.5;

/// Closes in on a target until within reach.
///
/// Reach is `max_distance` when bounded (ranged keep-distance), otherwise the
/// configured melee range. Finishes when the target disappears or dies.
#[derive(Clone, Debug, PartialEq)]
pub struct ChaseMotion {
    target: AgentId,
    max_distance: Option<f32>,
    last_target_position: Option<Position>,
}

impl ChaseMotion {
    pub fn new(target: AgentId, max_distance: Option<f32>) -> Self {
        Self {
            target,
            max_distance,
            last_target_position: None,
        }
    }

    pub fn target(&self) -> AgentId {
        self.target
    }

    pub fn max_distance(&self) -> Option<f32> {
        self.max_distance
    }

    pub(super) fn initialize(&mut self, ctx: &mut MotionContext<'_, '_>) -> Result<(), OracleError> {
        ctx.agent.add_state(UnitState::CHASE);
        self.last_target_position = None;
        Ok(())
    }

    pub(super) fn update(&mut self, ctx: &mut MotionContext<'_, '_>) -> Result<bool, OracleError> {
        let Some(target) = ctx.env.world()?.view(self.target).filter(|view| view.alive) else {
            return Ok(false);
        };

        if ctx.agent.has_state(UnitState::IMMOBILIZED) {
            return Ok(true);
        }

        let reach = self.max_distance.unwrap_or(ctx.config.melee_range);
        let distance = ctx.agent.position.distance(&target.position);

        if distance <= reach {
            stop_if_moving(ctx)?;
            ctx.agent.position.orientation = ctx.agent.position.angle_to(&target.position);
            return Ok(true);
        }

        let planner = ctx.env.planner()?;
        let target_moved = self
            .last_target_position
            .is_none_or(|last| last.distance(&target.position) > REPATH_DISTANCE);

        if target_moved || planner.spline_finalized(ctx.agent.id) {
            // stop just inside reach, on the side facing the chaser
            let approach = target.position.angle_to(&ctx.agent.position);
            let destination = target.position.offset(reach * 0.9, approach);

            trace!(target: "ai::motion", agent = %ctx.agent.id, target = %self.target, distance, "chase relaunch");
            planner.launch_spline(ctx.agent.id, SplineTarget::Point(destination), false);
            ctx.agent.add_state(UnitState::MOVE);
            self.last_target_position = Some(target.position);
        }

        Ok(true)
    }

    pub(super) fn finalize(&mut self, ctx: &mut MotionContext<'_, '_>) -> Result<(), OracleError> {
        ctx.agent.clear_state(UnitState::CHASE);
        stop_if_moving(ctx)
    }
}

/// Keeps a fixed slot relative to an owner's facing.
///
/// Never finishes while the owner exists.
#[derive(Clone, Debug, PartialEq)]
pub struct FollowMotion {
    owner: AgentId,
    distance: f32,
    angle: f32,
    last_slot: Option<Position>,
}

impl FollowMotion {
    pub fn new(owner: AgentId, distance: f32, angle: f32) -> Self {
        Self {
            owner,
            distance,
            angle,
            last_slot: None,
        }
    }

    pub fn owner(&self) -> AgentId {
        self.owner
    }

    pub(super) fn initialize(&mut self, ctx: &mut MotionContext<'_, '_>) -> Result<(), OracleError> {
        ctx.agent.add_state(UnitState::FOLLOW);
        self.last_slot = None;
        Ok(())
    }

    pub(super) fn update(&mut self, ctx: &mut MotionContext<'_, '_>) -> Result<bool, OracleError> {
        let Some(owner) = ctx.env.world()?.view(self.owner) else {
            return Ok(false);
        };

        if ctx.agent.has_state(UnitState::IMMOBILIZED) {
            return Ok(true);
        }

        let slot = owner
            .position
            .offset(self.distance, owner.position.orientation + self.angle);

        if ctx.agent.position.distance_2d(&slot) <= FOLLOW_TOLERANCE {
            stop_if_moving(ctx)?;
            return Ok(true);
        }

        let planner = ctx.env.planner()?;
        let slot_moved = self
            .last_slot
            .is_none_or(|last| last.distance(&slot) > REPATH_DISTANCE);

        if slot_moved || planner.spline_finalized(ctx.agent.id) {
            planner.launch_spline(ctx.agent.id, SplineTarget::Point(slot), false);
            ctx.agent.add_state(UnitState::MOVE);
            self.last_slot = Some(slot);
        }

        Ok(true)
    }

    pub(super) fn finalize(&mut self, ctx: &mut MotionContext<'_, '_>) -> Result<(), OracleError> {
        ctx.agent.clear_state(UnitState::FOLLOW);
        stop_if_moving(ctx)
    }
}
