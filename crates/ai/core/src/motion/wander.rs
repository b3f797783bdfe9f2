use tracing::{debug, trace};

use super::generator::stop_if_moving;
use super::{MotionContext, WanderSampler};
use crate::env::{OracleError, PathResult, SplineTarget};
use crate::state::{Millis, UnitState};

/// What a wander step did when its timer expired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WanderOutcome {
    /// Timer still running or the agent is pinned in place.
    Waiting,
    /// No valid surface near the candidate; retried next tick.
    RejectedGeometry,
    /// The planner found no route; retried after a short backoff.
    NoPath,
    /// A spline was launched.
    Moved { travel: Millis },
}

/// Wanders at random around the agent's home point.
#[derive(Clone, Debug, PartialEq)]
pub struct WanderMotion {
    wander_distance: f32,
    next_move_in: Millis,
}

impl WanderMotion {
    pub fn new(wander_distance: f32) -> Self {
        Self {
            wander_distance,
            next_move_in: 0,
        }
    }

    pub fn wander_distance(&self) -> f32 {
        self.wander_distance
    }

    /// Time left before the next destination is drawn.
    pub fn next_move_in(&self) -> Millis {
        self.next_move_in
    }

    pub(super) fn initialize(&mut self, ctx: &mut MotionContext<'_, '_>) -> Result<(), OracleError> {
        if !ctx.agent.alive {
            return Ok(());
        }

        if self.wander_distance == 0.0 {
            self.wander_distance = ctx.agent.respawn_radius;
        }

        ctx.agent.add_state(UnitState::ROAMING);
        let (min, max) = ctx.config.wander_initial_delay_ms;
        self.next_move_in = ctx.rng.urand(min, max);
        Ok(())
    }

    pub(super) fn update(
        &mut self,
        delta: Millis,
        ctx: &mut MotionContext<'_, '_>,
    ) -> Result<WanderOutcome, OracleError> {
        if ctx.agent.has_state(UnitState::IMMOBILIZED) {
            self.next_move_in = 0;
            ctx.agent.clear_state(UnitState::ROAMING_MOVE);
            return Ok(WanderOutcome::Waiting);
        }

        let planner = ctx.env.planner()?;
        if !planner.spline_finalized(ctx.agent.id) {
            return Ok(WanderOutcome::Waiting);
        }
        ctx.agent.clear_state(UnitState::ROAMING_MOVE | UnitState::MOVE);

        self.next_move_in = self.next_move_in.saturating_sub(delta);
        if self.next_move_in > 0 {
            return Ok(WanderOutcome::Waiting);
        }

        self.move_to_random_location(ctx)
    }

    pub(super) fn finalize(&mut self, ctx: &mut MotionContext<'_, '_>) -> Result<(), OracleError> {
        ctx.agent
            .clear_state(UnitState::ROAMING | UnitState::ROAMING_MOVE);
        ctx.agent.walking = false;
        stop_if_moving(ctx)
    }

    fn move_to_random_location(
        &mut self,
        ctx: &mut MotionContext<'_, '_>,
    ) -> Result<WanderOutcome, OracleError> {
        let spatial = ctx.env.spatial()?;
        let planner = ctx.env.planner()?;
        let agent = &mut *ctx.agent;
        let can_fly = agent.can_fly;

        let sampler = WanderSampler::new(spatial, ctx.config);
        let Some(destination) =
            sampler.sample(&agent.home, can_fly, self.wander_distance, ctx.rng)
        else {
            trace!(target: "ai::motion", agent = %agent.id, "wander candidate rejected by geometry");
            return Ok(WanderOutcome::RejectedGeometry);
        };

        let (target, walk) = if spatial.is_submerged(
            destination.map,
            destination.x,
            destination.y,
            destination.z,
        ) {
            (SplineTarget::Point(destination), agent.walking)
        } else {
            match planner.compute_path(agent.id, &agent.position, &destination) {
                PathResult::Found(points) if !points.is_empty() => {
                    let walk = ctx.rng.irand(0, ctx.config.wander_running_chance as i32) > 0;
                    (SplineTarget::Path(points), walk)
                }
                _ => {
                    let (min, max) = ctx.config.wander_backoff_ms;
                    self.next_move_in = ctx.rng.urand(min, max);
                    debug!(
                        target: "ai::motion",
                        agent = %agent.id,
                        retry_in = self.next_move_in,
                        "wander destination unreachable"
                    );
                    return Ok(WanderOutcome::NoPath);
                }
            }
        };

        agent.walking = walk;
        let travel = planner.launch_spline(agent.id, target, walk);
        agent.add_state(UnitState::ROAMING | UnitState::ROAMING_MOVE | UnitState::MOVE);

        self.next_move_in = if can_fly {
            0
        } else {
            let (min, max) = ctx.config.wander_pause_ms;
            travel.saturating_add(ctx.rng.urand(min, max))
        };

        if planner.is_formation_leader(agent.id) {
            planner.leader_move_to(agent.id, &destination);
        }

        Ok(WanderOutcome::Moved { travel })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AiConfig;
    use crate::env::AiRng;
    use crate::state::{AgentId, AgentState, Position};
    use crate::test_support::Harness;

    fn wanderer() -> AgentState {
        AgentState::new(AgentId(1), Position::new(0, 50.0, 50.0, 0.0)).with_respawn_radius(8.0)
    }

    #[test]
    fn initialize_arms_first_delay_and_uses_respawn_radius() {
        let harness = Harness::new();
        let env = harness.env();
        let config = AiConfig::default();
        let mut rng = AiRng::new(1);
        let mut agent = wanderer();
        let mut ctx = MotionContext {
            agent: &mut agent,
            env: &env,
            rng: &mut rng,
            config: &config,
        };

        let mut wander = WanderMotion::new(0.0);
        wander.initialize(&mut ctx).unwrap();

        assert_eq!(wander.wander_distance(), 8.0);
        assert!((1000..=5000).contains(&wander.next_move_in()));
        assert!(ctx.agent.has_state(UnitState::ROAMING));
    }

    #[test]
    fn moves_after_delay_and_rearms_with_travel_time() {
        let harness = Harness::new();
        harness.planner.set_travel_time(2000);
        let env = harness.env();
        let config = AiConfig::default();
        let mut rng = AiRng::new(9);
        let mut agent = wanderer();
        let mut ctx = MotionContext {
            agent: &mut agent,
            env: &env,
            rng: &mut rng,
            config: &config,
        };

        let mut wander = WanderMotion::new(5.0);
        wander.initialize(&mut ctx).unwrap();

        let outcome = wander.update(5000, &mut ctx).unwrap();
        assert_eq!(outcome, WanderOutcome::Moved { travel: 2000 });
        assert!((2500..=12_000).contains(&wander.next_move_in()));
        assert!(ctx.agent.has_state(UnitState::ROAMING_MOVE));
        assert_eq!(harness.planner.splines().len(), 1);
    }

    #[test]
    fn flying_wanderers_rearm_immediately() {
        let harness = Harness::new();
        let env = harness.env();
        let config = AiConfig::default();
        let mut rng = AiRng::new(5);
        let mut agent = wanderer().with_flight(true);
        agent.home.z = 20.0;
        let mut ctx = MotionContext {
            agent: &mut agent,
            env: &env,
            rng: &mut rng,
            config: &config,
        };

        let mut wander = WanderMotion::new(5.0);
        wander.initialize(&mut ctx).unwrap();

        let outcome = wander.update(5000, &mut ctx).unwrap();
        assert!(matches!(outcome, WanderOutcome::Moved { .. }));
        assert_eq!(wander.next_move_in(), 0);
    }

    #[test]
    fn immobilized_agent_expires_timer_without_moving() {
        let harness = Harness::new();
        let env = harness.env();
        let config = AiConfig::default();
        let mut rng = AiRng::new(2);
        let mut agent = wanderer();
        agent.add_state(UnitState::STUNNED | UnitState::ROAMING_MOVE);
        let mut ctx = MotionContext {
            agent: &mut agent,
            env: &env,
            rng: &mut rng,
            config: &config,
        };

        let mut wander = WanderMotion::new(5.0);
        wander.next_move_in = 4000;

        assert_eq!(wander.update(100, &mut ctx).unwrap(), WanderOutcome::Waiting);
        assert_eq!(wander.next_move_in(), 0);
        assert!(!ctx.agent.has_state(UnitState::ROAMING_MOVE));
        assert!(harness.planner.splines().is_empty());
    }

    #[test]
    fn unreachable_destination_is_retried_within_three_ticks() {
        let harness = Harness::new();
        harness.planner.set_reachable(false);
        let env = harness.env();
        let config = AiConfig::default();
        let mut rng = AiRng::new(1234);
        let mut agent = wanderer();
        let mut ctx = MotionContext {
            agent: &mut agent,
            env: &env,
            rng: &mut rng,
            config: &config,
        };

        let mut wander = WanderMotion::new(5.0);
        wander.initialize(&mut ctx).unwrap();

        let mut attempts = Vec::new();
        for tick in 0..40u32 {
            if wander.update(500, &mut ctx).unwrap() == WanderOutcome::NoPath {
                attempts.push(tick);
            }
        }

        assert!(attempts.len() >= 5, "attempts: {attempts:?}");
        for pair in attempts.windows(2) {
            assert!(pair[1] - pair[0] <= 3, "attempts: {attempts:?}");
        }
        assert!(harness.planner.splines().is_empty());
    }

    #[test]
    fn finalize_clears_roaming_and_walk_mode() {
        let harness = Harness::new();
        let env = harness.env();
        let config = AiConfig::default();
        let mut rng = AiRng::new(1);
        let mut agent = wanderer();
        agent.walking = true;
        agent.add_state(UnitState::ROAMING | UnitState::ROAMING_MOVE | UnitState::MOVE);
        let mut ctx = MotionContext {
            agent: &mut agent,
            env: &env,
            rng: &mut rng,
            config: &config,
        };

        WanderMotion::new(5.0).finalize(&mut ctx).unwrap();

        assert!(!ctx.agent.walking);
        assert!(!ctx.agent.has_state(UnitState::ROAMING | UnitState::MOVE));
        assert_eq!(harness.planner.stops(), 1);
    }
}
