use crate::state::{AgentId, Millis, Position};

/// Outcome of a path request.
#[derive(Clone, Debug, PartialEq)]
pub enum PathResult {
    Found(Vec<Position>),
    NotFound,
}

/// What a spline should follow.
#[derive(Clone, Debug, PartialEq)]
pub enum SplineTarget {
    /// Straight line to a single point.
    Point(Position),
    /// Waypoints returned by [`MotionPlanner::compute_path`].
    Path(Vec<Position>),
}

impl SplineTarget {
    /// Final point of the spline, if any.
    pub fn destination(&self) -> Option<Position> {
        match self {
            SplineTarget::Point(point) => Some(*point),
            SplineTarget::Path(points) => points.last().copied(),
        }
    }
}

/// Pathfinding and spline movement collaborator.
///
/// Path computation is synchronous with bounded cost; a failed request is
/// retried on a later tick by the caller, never in a loop within one tick.
pub trait MotionPlanner: Send + Sync {
    fn compute_path(&self, agent: AgentId, from: &Position, to: &Position) -> PathResult;

    /// Starts moving `agent` along `target`. Returns the travel time.
    fn launch_spline(&self, agent: AgentId, target: SplineTarget, walk: bool) -> Millis;

    /// True when the agent has no spline in progress.
    fn spline_finalized(&self, agent: AgentId) -> bool;

    /// Interrupts any spline in progress.
    fn stop_moving(&self, agent: AgentId);

    fn is_formation_leader(&self, _agent: AgentId) -> bool {
        false
    }

    /// Lets a formation follow its leader's new destination.
    fn leader_move_to(&self, _leader: AgentId, _destination: &Position) {}
}
