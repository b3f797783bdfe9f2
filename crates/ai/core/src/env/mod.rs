//! Collaborators the kernel consumes.
//!
//! Every world-facing concern (combat, geometry, pathfinding, ability
//! metadata, eligibility rules, seats, the agent registry) sits behind a narrow
//! `Send + Sync` trait. The [`AiEnv`] aggregate bundles borrowed trait objects
//! so controllers and motion generators can reach what they need without hard
//! coupling to concrete implementations.
use std::fmt;

mod abilities;
mod combat;
mod conditions;
mod error;
mod planner;
mod rng;
mod spatial;
mod world;

pub use abilities::AbilityOracle;
pub use combat::{CastError, CombatOracle};
pub use conditions::{ConditionOracle, EligibilityPredicate, OccupantView, Predicate, SeatOracle};
pub use error::OracleError;
pub use planner::{MotionPlanner, PathResult, SplineTarget};
pub use rng::{AiRng, compute_seed};
pub use spatial::{INVALID_HEIGHT, SpatialOracle};
pub use world::WorldOracle;

/// Aggregates the collaborators available to one tick.
#[derive(Clone, Copy, Default)]
pub struct AiEnv<'a> {
    combat: Option<&'a dyn CombatOracle>,
    spatial: Option<&'a dyn SpatialOracle>,
    planner: Option<&'a dyn MotionPlanner>,
    abilities: Option<&'a dyn AbilityOracle>,
    world: Option<&'a dyn WorldOracle>,
    conditions: Option<&'a dyn ConditionOracle>,
    seats: Option<&'a dyn SeatOracle>,
}

impl<'a> AiEnv<'a> {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Environment with every collaborator a combat agent needs.
    pub fn with_all(
        combat: &'a dyn CombatOracle,
        spatial: &'a dyn SpatialOracle,
        planner: &'a dyn MotionPlanner,
        abilities: &'a dyn AbilityOracle,
        world: &'a dyn WorldOracle,
    ) -> Self {
        Self {
            combat: Some(combat),
            spatial: Some(spatial),
            planner: Some(planner),
            abilities: Some(abilities),
            world: Some(world),
            conditions: None,
            seats: None,
        }
    }

    pub fn with_combat(mut self, combat: &'a dyn CombatOracle) -> Self {
        self.combat = Some(combat);
        self
    }

    pub fn with_spatial(mut self, spatial: &'a dyn SpatialOracle) -> Self {
        self.spatial = Some(spatial);
        self
    }

    pub fn with_planner(mut self, planner: &'a dyn MotionPlanner) -> Self {
        self.planner = Some(planner);
        self
    }

    pub fn with_abilities(mut self, abilities: &'a dyn AbilityOracle) -> Self {
        self.abilities = Some(abilities);
        self
    }

    pub fn with_world(mut self, world: &'a dyn WorldOracle) -> Self {
        self.world = Some(world);
        self
    }

    pub fn with_conditions(mut self, conditions: &'a dyn ConditionOracle) -> Self {
        self.conditions = Some(conditions);
        self
    }

    pub fn with_seats(mut self, seats: &'a dyn SeatOracle) -> Self {
        self.seats = Some(seats);
        self
    }

    /// Returns the CombatOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::CombatNotAvailable` if no combat oracle was provided.
    pub fn combat(&self) -> Result<&'a dyn CombatOracle, OracleError> {
        self.combat.ok_or(OracleError::CombatNotAvailable)
    }

    /// Returns the SpatialOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::SpatialNotAvailable` if no spatial oracle was provided.
    pub fn spatial(&self) -> Result<&'a dyn SpatialOracle, OracleError> {
        self.spatial.ok_or(OracleError::SpatialNotAvailable)
    }

    /// Returns the MotionPlanner, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::PlannerNotAvailable` if no planner was provided.
    pub fn planner(&self) -> Result<&'a dyn MotionPlanner, OracleError> {
        self.planner.ok_or(OracleError::PlannerNotAvailable)
    }

    /// Returns the AbilityOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::AbilitiesNotAvailable` if no ability store was provided.
    pub fn abilities(&self) -> Result<&'a dyn AbilityOracle, OracleError> {
        self.abilities.ok_or(OracleError::AbilitiesNotAvailable)
    }

    /// Returns the WorldOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::WorldNotAvailable` if no world registry was provided.
    pub fn world(&self) -> Result<&'a dyn WorldOracle, OracleError> {
        self.world.ok_or(OracleError::WorldNotAvailable)
    }

    /// Returns the ConditionOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::ConditionsNotAvailable` if no condition source was provided.
    pub fn conditions(&self) -> Result<&'a dyn ConditionOracle, OracleError> {
        self.conditions.ok_or(OracleError::ConditionsNotAvailable)
    }

    /// Returns the SeatOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::SeatsNotAvailable` if no seat collaborator was provided.
    pub fn seats(&self) -> Result<&'a dyn SeatOracle, OracleError> {
        self.seats.ok_or(OracleError::SeatsNotAvailable)
    }
}

impl fmt::Debug for AiEnv<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiEnv")
            .field("combat", &self.combat.is_some())
            .field("spatial", &self.spatial.is_some())
            .field("planner", &self.planner.is_some())
            .field("abilities", &self.abilities.is_some())
            .field("world", &self.world.is_some())
            .field("conditions", &self.conditions.is_some())
            .field("seats", &self.seats.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_collaborators_surface_as_errors() {
        let env = AiEnv::empty();

        assert_eq!(env.combat().err(), Some(OracleError::CombatNotAvailable));
        assert_eq!(env.seats().err(), Some(OracleError::SeatsNotAvailable));
        assert!(format!("{env:?}").contains("planner: false"));
    }
}
