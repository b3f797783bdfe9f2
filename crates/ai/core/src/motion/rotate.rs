use core::f32::consts::TAU;

use super::MotionContext;
use super::generator::stop_if_moving;
use crate::env::OracleError;
use crate::state::{Millis, UnitState, normalize_orientation};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RotateDirection {
    Left,
    Right,
}

/// Turns the agent one full revolution over `max_duration`.
#[derive(Clone, Debug, PartialEq)]
pub struct RotateMotion {
    direction: RotateDirection,
    max_duration: Millis,
    remaining: Millis,
}

impl RotateMotion {
    pub fn new(direction: RotateDirection, duration: Millis) -> Self {
        Self {
            direction,
            max_duration: duration.max(1),
            remaining: duration,
        }
    }

    pub fn direction(&self) -> RotateDirection {
        self.direction
    }

    pub(super) fn initialize(&mut self, ctx: &mut MotionContext<'_, '_>) -> Result<(), OracleError> {
        stop_if_moving(ctx)?;

        if let Some(target) = ctx.agent.target
            && let Some(view) = ctx.env.world()?.view(target)
        {
            ctx.agent.position.orientation = ctx.agent.position.angle_to(&view.position);
        }

        ctx.agent.add_state(UnitState::ROTATING);
        ctx.env.combat()?.attack_stop(ctx.agent.id);
        Ok(())
    }

    pub(super) fn update(&mut self, delta: Millis, ctx: &mut MotionContext<'_, '_>) -> bool {
        let step = delta as f32 * TAU / self.max_duration as f32;
        let angle = match self.direction {
            RotateDirection::Left => ctx.agent.position.orientation + step,
            RotateDirection::Right => ctx.agent.position.orientation - step,
        };
        ctx.agent.position.orientation = normalize_orientation(angle);

        if self.remaining > delta {
            self.remaining -= delta;
            true
        } else {
            false
        }
    }

    pub(super) fn finalize(&mut self, ctx: &mut MotionContext<'_, '_>) {
        ctx.agent.clear_state(UnitState::ROTATING);
    }
}
