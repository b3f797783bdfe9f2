use std::fmt;

/// Elapsed-time unit used by tick deltas, cooldowns, and timers.
pub type Millis = u32;

/// Unique identifier for any agent known to the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentId(pub u32);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// World position with facing.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub map: u32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Facing in radians, kept in `[0, 2π)`.
    pub orientation: f32,
}

impl Position {
    pub fn new(map: u32, x: f32, y: f32, z: f32) -> Self {
        Self {
            map,
            x,
            y,
            z,
            orientation: 0.0,
        }
    }

    pub fn with_orientation(mut self, orientation: f32) -> Self {
        self.orientation = orientation;
        self
    }

    /// Horizontal distance, ignoring height.
    pub fn distance_2d(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn distance(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Angle from this position towards `other`, in `[0, 2π)`.
    pub fn angle_to(&self, other: &Position) -> f32 {
        normalize_orientation((other.y - self.y).atan2(other.x - self.x))
    }

    /// Point at `distance` from this position along `angle` (absolute radians).
    pub fn offset(&self, distance: f32, angle: f32) -> Position {
        Position {
            x: self.x + distance * angle.cos(),
            y: self.y + distance * angle.sin(),
            ..*self
        }
    }
}

/// Wraps an angle into `[0, 2π)`.
pub(crate) fn normalize_orientation(angle: f32) -> f32 {
    let tau = core::f32::consts::TAU;
    let wrapped = angle.rem_euclid(tau);
    if wrapped >= tau { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distances_ignore_orientation() {
        let a = Position::new(0, 0.0, 0.0, 0.0).with_orientation(1.0);
        let b = Position::new(0, 3.0, 4.0, 12.0);

        assert_eq!(a.distance_2d(&b), 5.0);
        assert_eq!(a.distance(&b), 13.0);
    }

    #[test]
    fn orientation_wraps_into_full_turn() {
        let tau = core::f32::consts::TAU;
        assert!((normalize_orientation(-0.5) - (tau - 0.5)).abs() < 1e-5);
        assert!((normalize_orientation(tau + 0.25) - 0.25).abs() < 1e-5);
    }
}
