//! Straight-line motion planner backing [`MotionPlanner`].
//!
//! The kernel only requests splines; this planner owns them and advances
//! agent positions along them after each tick.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Mutex, RwLock};

use ai_core::{AgentId, AgentState, Millis, MotionPlanner, PathResult, Position, SplineTarget};
use tracing::trace;

#[derive(Clone, Debug)]
struct Spline {
    waypoints: VecDeque<Position>,
    walk: bool,
}

#[derive(Debug)]
pub struct StraightLinePlanner {
    run_speed: f32,
    walk_speed: f32,
    splines: Mutex<HashMap<AgentId, Spline>>,
    known: Mutex<HashMap<AgentId, Position>>,
    unreachable: RwLock<HashSet<AgentId>>,
    leaders: RwLock<HashSet<AgentId>>,
}

impl StraightLinePlanner {
    pub const DEFAULT_RUN_SPEED: f32 = 7.0;
    pub const DEFAULT_WALK_SPEED: f32 = 2.5;

    /// Speeds in world units per second.
    pub fn new(run_speed: f32, walk_speed: f32) -> Self {
        Self {
            run_speed,
            walk_speed,
            splines: Mutex::new(HashMap::new()),
            known: Mutex::new(HashMap::new()),
            unreachable: RwLock::new(HashSet::new()),
            leaders: RwLock::new(HashSet::new()),
        }
    }

    /// Every path request by `agent` fails while set.
    pub fn set_unreachable(&self, agent: AgentId, unreachable: bool) {
        if let Ok(mut set) = self.unreachable.write() {
            if unreachable {
                set.insert(agent);
            } else {
                set.remove(&agent);
            }
        }
    }

    pub fn set_leader(&self, agent: AgentId) {
        if let Ok(mut set) = self.leaders.write() {
            set.insert(agent);
        }
    }

    pub fn is_moving(&self, agent: AgentId) -> bool {
        self.splines
            .lock()
            .map(|splines| splines.contains_key(&agent))
            .unwrap_or(false)
    }

    pub fn forget(&self, agent: AgentId) {
        if let Ok(mut splines) = self.splines.lock() {
            splines.remove(&agent);
        }
        if let Ok(mut known) = self.known.lock() {
            known.remove(&agent);
        }
    }

    /// Moves `agent` along its spline by `delta` worth of travel.
    pub fn advance(&self, agent: &mut AgentState, delta: Millis) {
        let Ok(mut splines) = self.splines.lock() else {
            return;
        };

        if let Some(spline) = splines.get_mut(&agent.id) {
            let speed = if spline.walk { self.walk_speed } else { self.run_speed };
            let mut budget = speed * delta as f32 / 1000.0;

            while budget > 0.0 {
                let Some(&next) = spline.waypoints.front() else {
                    break;
                };
                let distance = agent.position.distance(&next);
                if distance <= budget {
                    budget -= distance;
                    agent.position.x = next.x;
                    agent.position.y = next.y;
                    agent.position.z = next.z;
                    spline.waypoints.pop_front();
                } else {
                    let angle = agent.position.angle_to(&next);
                    let stepped = agent.position.offset(budget, angle);
                    agent.position.x = stepped.x;
                    agent.position.y = stepped.y;
                    agent.position.z += (next.z - agent.position.z) * budget / distance;
                    agent.position.orientation = angle;
                    budget = 0.0;
                }
            }

            if spline.waypoints.is_empty() {
                trace!(target: "runtime::planner", agent = %agent.id, "spline finished");
                splines.remove(&agent.id);
            }
        }
        drop(splines);

        if let Ok(mut known) = self.known.lock() {
            known.insert(agent.id, agent.position);
        }
    }

    fn travel_time(&self, start: Option<Position>, waypoints: &VecDeque<Position>, walk: bool) -> Millis {
        let speed = if walk { self.walk_speed } else { self.run_speed };
        if speed <= 0.0 {
            return 0;
        }

        let mut length = 0.0;
        let mut previous = start.or_else(|| waypoints.front().copied());
        for point in waypoints {
            if let Some(from) = previous {
                length += from.distance(point);
            }
            previous = Some(*point);
        }
        (length / speed * 1000.0) as Millis
    }
}

impl Default for StraightLinePlanner {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RUN_SPEED, Self::DEFAULT_WALK_SPEED)
    }
}

impl MotionPlanner for StraightLinePlanner {
    fn compute_path(&self, agent: AgentId, from: &Position, to: &Position) -> PathResult {
        let blocked = self
            .unreachable
            .read()
            .map(|set| set.contains(&agent))
            .unwrap_or(false);
        if blocked {
            PathResult::NotFound
        } else {
            PathResult::Found(vec![*from, *to])
        }
    }

    fn launch_spline(&self, agent: AgentId, target: SplineTarget, walk: bool) -> Millis {
        let waypoints: VecDeque<Position> = match target {
            SplineTarget::Point(point) => VecDeque::from([point]),
            SplineTarget::Path(points) => points.into(),
        };
        let start = self.known.lock().ok().and_then(|known| known.get(&agent).copied());
        let travel = self.travel_time(start, &waypoints, walk);

        if let Ok(mut splines) = self.splines.lock() {
            splines.insert(agent, Spline { waypoints, walk });
        }
        travel
    }

    fn spline_finalized(&self, agent: AgentId) -> bool {
        !self.is_moving(agent)
    }

    fn stop_moving(&self, agent: AgentId) {
        if let Ok(mut splines) = self.splines.lock() {
            splines.remove(&agent);
        }
    }

    fn is_formation_leader(&self, agent: AgentId) -> bool {
        self.leaders
            .read()
            .map(|set| set.contains(&agent))
            .unwrap_or(false)
    }

    fn leader_move_to(&self, leader: AgentId, destination: &Position) {
        trace!(target: "runtime::planner", %leader, x = destination.x, y = destination.y, "formation follows leader");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_reaches_destination_and_spline_finishes() {
        let planner = StraightLinePlanner::new(10.0, 5.0);
        let mut agent = AgentState::new(AgentId(1), Position::default());
        planner.advance(&mut agent, 0);

        let travel = planner.launch_spline(
            agent.id,
            SplineTarget::Point(Position::new(0, 20.0, 0.0, 0.0)),
            false,
        );
        assert_eq!(travel, 2000);
        assert!(!planner.spline_finalized(agent.id));

        planner.advance(&mut agent, 1000);
        assert!((agent.position.x - 10.0).abs() < 1e-3);

        planner.advance(&mut agent, 1500);
        assert_eq!(agent.position.x, 20.0);
        assert!(planner.spline_finalized(agent.id));
    }

    #[test]
    fn unreachable_agents_get_no_path() {
        let planner = StraightLinePlanner::default();
        let from = Position::default();
        let to = Position::new(0, 5.0, 5.0, 0.0);

        assert!(matches!(planner.compute_path(AgentId(1), &from, &to), PathResult::Found(_)));
        planner.set_unreachable(AgentId(1), true);
        assert_eq!(planner.compute_path(AgentId(1), &from, &to), PathResult::NotFound);
    }
}
