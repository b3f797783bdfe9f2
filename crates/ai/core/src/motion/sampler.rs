//! Random wander destination sampling.
//!
//! A candidate is drawn around the home point and validated against world
//! geometry. Grounded agents must find a surface close to home height; flying
//! agents must stay above the ground and water surface. A rejected candidate
//! yields `None` and the caller simply tries again on a later tick.
use core::f32::consts::TAU;

use crate::config::AiConfig;
use crate::env::{AiRng, SpatialOracle};
use crate::state::Position;

/// Maximum height difference the surface probe can resolve.
const MAX_FALL_DISTANCE: f32 = 10.0;

pub struct WanderSampler<'a> {
    spatial: &'a dyn SpatialOracle,
    config: &'a AiConfig,
}

impl<'a> WanderSampler<'a> {
    pub fn new(spatial: &'a dyn SpatialOracle, config: &'a AiConfig) -> Self {
        Self { spatial, config }
    }

    /// Draws one candidate destination around `home`.
    pub fn sample(
        &self,
        home: &Position,
        can_fly: bool,
        wander_distance: f32,
        rng: &mut AiRng,
    ) -> Option<Position> {
        let multiplier = if can_fly {
            self.config.wander_air_multiplier
        } else {
            self.config.wander_ground_multiplier
        };

        let angle = rng.rand_norm() * TAU;
        let range = rng.rand_norm() * wander_distance * multiplier;
        let dx = range * angle.cos();
        let dy = range * angle.sin();

        let x = self.config.normalize_coord(home.x + dx);
        let y = self.config.normalize_coord(home.y + dy);
        let travel_sq = dx * dx + dy * dy;

        let z = if can_fly {
            self.air_height(home, x, y, travel_sq, rng)?
        } else {
            self.ground_height(home, x, y, travel_sq)?
        };

        Some(Position {
            x,
            y,
            z,
            ..*home
        })
    }

    fn air_height(
        &self,
        home: &Position,
        x: f32,
        y: f32,
        travel_sq: f32,
        rng: &mut AiRng,
    ) -> Option<f32> {
        let z = home.z + rng.rand_norm() * travel_sq.sqrt() / 2.0;
        let level = self.spatial.water_or_ground_height(home.map, x, y, z - 2.0);

        // must stay above the surface
        (level < z).then_some(z)
    }

    fn ground_height(&self, home: &Position, x: f32, y: f32, travel_sq: f32) -> Option<f32> {
        let allowed = if travel_sq >= MAX_FALL_DISTANCE * MAX_FALL_DISTANCE {
            MAX_FALL_DISTANCE
        } else {
            travel_sq.sqrt()
        };
        let within = |z: f32| (z - home.z).abs() <= allowed;

        // terrain first, then models level with home, then models above
        let probes = [
            (home.z + allowed - 2.0, false),
            (home.z - 2.0, true),
            (home.z + allowed - 2.0, true),
        ];

        probes
            .into_iter()
            .map(|(z_hint, models)| self.spatial.ground_height(home.map, x, y, z_hint, models))
            .find(|&z| within(z))
    }
}
