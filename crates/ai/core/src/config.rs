/// Kernel configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AiConfig {
    /// Interval between vehicle seat eligibility checks.
    pub condition_check_interval_ms: u32,
    /// Delay before an abandoned, condition-bound vehicle despawns itself.
    pub dismiss_delay_ms: u32,
    /// Upper bound of the distance a ranged caster keeps from its target.
    pub caster_attack_distance: f32,
    /// Minimum range assumed by archers whose primary ability has none.
    pub melee_range: f32,
    /// Follow distance used when a caster falls back to its owner.
    pub follow_distance: f32,
    /// Follow angle (radians, relative to the owner's facing).
    pub follow_angle: f32,
    /// Delay applied when the combat collaborator rejects a cast.
    pub interrupt_recovery_ms: u32,
    /// Cooldown assumed for simple jitter when an ability reports none.
    pub default_cooldown_ms: u32,
    /// Delay range before the first wander attempt.
    pub wander_initial_delay_ms: (u32, u32),
    /// Retry range after a wander destination had no path.
    pub wander_backoff_ms: (u32, u32),
    /// Pause range added to the travel time of a successful wander.
    pub wander_pause_ms: (u32, u32),
    /// Wander radius multiplier for grounded agents.
    pub wander_ground_multiplier: f32,
    /// Wander radius multiplier for flying agents.
    pub wander_air_multiplier: f32,
    /// Agents walk unless a roll in `0..=wander_running_chance` yields 0.
    pub wander_running_chance: u32,
    /// Half extent of a map; generated coordinates are clamped inside it.
    pub map_half_size: f32,
}

impl AiConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum number of abilities in an agent kit.
    pub const MAX_KIT_ABILITIES: usize = 8;
    /// Maximum number of seats a vehicle exposes.
    pub const MAX_SEATS: usize = 8;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_CONDITION_CHECK_INTERVAL_MS: u32 = 1000;
    pub const DEFAULT_DISMISS_DELAY_MS: u32 = 5000;
    pub const DEFAULT_CASTER_ATTACK_DISTANCE: f32 = 30.0;
    pub const DEFAULT_MELEE_RANGE: f32 = 5.0;
    pub const DEFAULT_FOLLOW_DISTANCE: f32 = 1.0;
    pub const DEFAULT_INTERRUPT_RECOVERY_MS: u32 = 1500;
    pub const DEFAULT_COOLDOWN_MS: u32 = 10_000;
    pub const DEFAULT_MAP_HALF_SIZE: f32 = 17_066.666;

    pub fn new() -> Self {
        Self {
            condition_check_interval_ms: Self::DEFAULT_CONDITION_CHECK_INTERVAL_MS,
            dismiss_delay_ms: Self::DEFAULT_DISMISS_DELAY_MS,
            caster_attack_distance: Self::DEFAULT_CASTER_ATTACK_DISTANCE,
            melee_range: Self::DEFAULT_MELEE_RANGE,
            follow_distance: Self::DEFAULT_FOLLOW_DISTANCE,
            follow_angle: core::f32::consts::FRAC_PI_2,
            interrupt_recovery_ms: Self::DEFAULT_INTERRUPT_RECOVERY_MS,
            default_cooldown_ms: Self::DEFAULT_COOLDOWN_MS,
            wander_initial_delay_ms: (1000, 5000),
            wander_backoff_ms: (500, 1500),
            wander_pause_ms: (500, 10_000),
            wander_ground_multiplier: 2.0,
            wander_air_multiplier: 4.0,
            wander_running_chance: 5,
            map_half_size: Self::DEFAULT_MAP_HALF_SIZE,
        }
    }

    /// Clamps a generated map coordinate inside the valid map extent.
    pub fn normalize_coord(&self, value: f32) -> f32 {
        let limit = self.map_half_size - 0.5;
        value.clamp(-limit, limit)
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_are_clamped_inside_the_map() {
        let config = AiConfig::default();
        let limit = config.map_half_size - 0.5;

        assert_eq!(config.normalize_coord(1.0e6), limit);
        assert_eq!(config.normalize_coord(-1.0e6), -limit);
        assert_eq!(config.normalize_coord(12.5), 12.5);
    }
}
