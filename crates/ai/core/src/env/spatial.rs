use crate::state::Position;

/// Height reported when no surface exists near the probe.
pub const INVALID_HEIGHT: f32 = -100_000.0;

/// Static world geometry queries.
pub trait SpatialOracle: Send + Sync {
    fn line_of_sight(&self, from: &Position, to: &Position) -> bool;

    /// Surface height below `z_hint`, or [`INVALID_HEIGHT`].
    ///
    /// `check_models` extends the probe to placed models (buildings, bridges)
    /// on top of the terrain mesh.
    fn ground_height(&self, map: u32, x: f32, y: f32, z_hint: f32, check_models: bool) -> f32;

    /// The higher of the water surface and the ground below `z_hint`.
    fn water_or_ground_height(&self, map: u32, x: f32, y: f32, z_hint: f32) -> f32;

    fn is_submerged(&self, map: u32, x: f32, y: f32, z: f32) -> bool;
}
