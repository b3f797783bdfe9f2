//! Re-arm delay policies.
//!
//! Two policies coexist:
//!
//! - **Simple jitter** (aggressors, combat casters): `base + uniform[0, base)`,
//!   so the delay always lands in `[base, 2 * base)`.
//! - **Cast-time aware** (ranged caster burst): the ability actually fired
//!   waits `real_cooldown + cast_time`; the kit members merely re-armed in the
//!   same pass wait `real_cooldown` exactly.

use super::AbilityDescriptor;
use crate::env::AiRng;
use crate::state::Millis;

/// Re-arm delay policy selected by the controller archetype.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JitterPolicy {
    Simple,
    CastTimeAware,
}

impl JitterPolicy {
    /// Delay before `ability` may fire again.
    ///
    /// `fired` is false for kit members merely re-armed in the same pass as
    /// the one actually cast. Only the cast-time-aware policy tells them apart.
    pub fn rearm(
        self,
        ability: &AbilityDescriptor,
        fired: bool,
        fallback_cooldown: Millis,
        rng: &mut AiRng,
    ) -> Millis {
        match self {
            JitterPolicy::Simple => simple_jitter(ability.cooldown, fallback_cooldown, rng),
            JitterPolicy::CastTimeAware => cast_time_aware(ability, fired),
        }
    }
}

/// `base + uniform[0, base)`; a zero base falls back to `fallback`.
fn simple_jitter(base: Millis, fallback: Millis, rng: &mut AiRng) -> Millis {
    let base = if base == 0 { fallback } else { base };
    base.saturating_add(rng.below(base))
}

/// `real_cooldown`, plus the ability's own cast time when it was the one fired.
fn cast_time_aware(ability: &AbilityDescriptor, fired: bool) -> Millis {
    if fired {
        ability.real_cooldown.saturating_add(ability.cast_time)
    } else {
        ability.real_cooldown
    }
}
