use super::MotionContext;
use crate::state::{Millis, ReactState, UnitState};

/// Pure countdown holding the agent distracted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DistractMotion {
    remaining: Millis,
    assistance: bool,
}

impl DistractMotion {
    pub fn new(duration: Millis) -> Self {
        Self {
            remaining: duration,
            assistance: false,
        }
    }

    /// Variant used while an agent waits for help; restores aggressive
    /// reactions when it ends.
    pub fn assistance(duration: Millis) -> Self {
        Self {
            remaining: duration,
            assistance: true,
        }
    }

    pub fn remaining(&self) -> Millis {
        self.remaining
    }

    pub(super) fn initialize(
        &mut self,
        ctx: &mut MotionContext<'_, '_>,
    ) -> Result<(), crate::env::OracleError> {
        ctx.agent.add_state(UnitState::DISTRACTED);
        Ok(())
    }

    pub(super) fn update(&mut self, delta: Millis) -> bool {
        if delta > self.remaining {
            return false;
        }
        self.remaining -= delta;
        true
    }

    pub(super) fn finalize(&mut self, ctx: &mut MotionContext<'_, '_>) {
        ctx.agent.clear_state(UnitState::DISTRACTED);
        if self.assistance {
            ctx.agent.react_state = ReactState::Aggressive;
        }
    }
}
