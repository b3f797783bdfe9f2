//! Flat terrain backing [`SpatialOracle`].

use std::collections::HashSet;
use std::sync::RwLock;

use ai_core::{Position, SpatialOracle};

/// A single flat ground plane with an optional water surface.
#[derive(Debug)]
pub struct FlatTerrain {
    ground: f32,
    water: Option<f32>,
    /// Maps where line of sight is always blocked.
    walled: RwLock<HashSet<u32>>,
}

impl FlatTerrain {
    pub fn new(ground: f32) -> Self {
        Self {
            ground,
            water: None,
            walled: RwLock::new(HashSet::new()),
        }
    }

    pub fn with_water(mut self, level: f32) -> Self {
        self.water = Some(level);
        self
    }

    pub fn set_walled(&self, map: u32, walled: bool) {
        if let Ok(mut set) = self.walled.write() {
            if walled {
                set.insert(map);
            } else {
                set.remove(&map);
            }
        }
    }
}

impl Default for FlatTerrain {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl SpatialOracle for FlatTerrain {
    fn line_of_sight(&self, from: &Position, to: &Position) -> bool {
        if from.map != to.map {
            return false;
        }
        self.walled
            .read()
            .map(|set| !set.contains(&from.map))
            .unwrap_or(true)
    }

    fn ground_height(&self, _map: u32, _x: f32, _y: f32, _z_hint: f32, _check_models: bool) -> f32 {
        self.ground
    }

    fn water_or_ground_height(&self, _map: u32, _x: f32, _y: f32, _z_hint: f32) -> f32 {
        self.water.map_or(self.ground, |water| water.max(self.ground))
    }

    fn is_submerged(&self, _map: u32, _x: f32, _y: f32, z: f32) -> bool {
        self.water.is_some_and(|water| z < water)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn water_lies_above_ground() {
        let terrain = FlatTerrain::new(0.0).with_water(4.0);
        assert_eq!(terrain.water_or_ground_height(0, 0.0, 0.0, 0.0), 4.0);
        assert!(terrain.is_submerged(0, 0.0, 0.0, 1.0));
        assert!(!terrain.is_submerged(0, 0.0, 0.0, 5.0));
    }

    #[test]
    fn walled_maps_block_sight() {
        let terrain = FlatTerrain::default();
        let a = Position::new(1, 0.0, 0.0, 0.0);
        let b = Position::new(1, 10.0, 0.0, 0.0);

        assert!(terrain.line_of_sight(&a, &b));
        terrain.set_walled(1, true);
        assert!(!terrain.line_of_sight(&a, &b));
    }
}
