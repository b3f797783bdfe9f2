//! Explicit, seeded random source for controllers and motion generators.
//!
//! The kernel never touches ambient randomness. Each agent brain owns an
//! [`AiRng`] seeded from the world seed and the agent id, so a fixed seed and
//! a fixed sequence of tick deltas replays the exact same decisions.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::state::AgentId;

/// Deterministic random number generator owned by one agent.
#[derive(Clone, Debug)]
pub struct AiRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl AiRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seeds a generator for `agent` from the world seed.
    pub fn for_agent(world_seed: u64, agent: AgentId) -> Self {
        Self::new(compute_seed(world_seed, agent))
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform value in `[min, max]` (inclusive). Returns `min` when `max <= min`.
    pub fn urand(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        self.inner.gen_range(min..=max)
    }

    /// Uniform signed value in `[min, max]` (inclusive).
    pub fn irand(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        self.inner.gen_range(min..=max)
    }

    /// Uniform value in `[0, bound)`. Returns 0 for an empty range.
    pub fn below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        self.inner.gen_range(0..bound)
    }

    /// Uniform index into a collection of `len` elements.
    pub fn pick_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.inner.gen_range(0..len)
    }

    /// Uniform float in `[0, 1)`.
    pub fn rand_norm(&mut self) -> f32 {
        self.inner.gen_range(0.0f32..1.0)
    }
}

/// Derive a per-agent seed from the world seed.
///
/// Mixes both inputs with SplitMix64-style multipliers followed by an
/// avalanche step so neighbouring agent ids produce unrelated streams.
pub fn compute_seed(world_seed: u64, agent: AgentId) -> u64 {
    let mut hash = world_seed;

    hash ^= (agent.0 as u64).wrapping_mul(0x9e3779b97f4a7c15);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}
