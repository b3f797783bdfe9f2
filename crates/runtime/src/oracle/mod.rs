//! In-memory collaborators the runtime hands to the kernel.
//!
//! Content tables (abilities, seat conditions) are immutable once loaded.
//! The remaining collaborators carry mutable world state behind interior
//! locks so every agent group can share them during a tick.
mod combat;
mod planner;
mod seats;
mod terrain;
mod world;

use std::sync::Arc;

use ai_content::{AbilityTable, ConditionTable, Content};
use ai_core::{AbilityOracle, AiEnv};

pub use combat::{CombatLedger, CombatRecord};
pub use planner::StraightLinePlanner;
pub use seats::SeatTable;
pub use terrain::FlatTerrain;
pub use world::WorldTable;

/// Owns every collaborator and builds [`AiEnv`] views on demand.
#[derive(Clone, Debug)]
pub struct OracleManager {
    pub(crate) world: Arc<WorldTable>,
    pub(crate) terrain: Arc<FlatTerrain>,
    pub(crate) planner: Arc<StraightLinePlanner>,
    pub(crate) combat: Arc<CombatLedger>,
    pub(crate) seats: Arc<SeatTable>,
    pub(crate) abilities: Arc<AbilityTable>,
    pub(crate) conditions: Arc<ConditionTable>,
}

impl OracleManager {
    pub fn new(abilities: AbilityTable, conditions: ConditionTable) -> Self {
        let abilities = Arc::new(abilities);
        let combat = CombatLedger::new(Arc::clone(&abilities) as Arc<dyn AbilityOracle>);

        Self {
            world: Arc::new(WorldTable::new()),
            terrain: Arc::new(FlatTerrain::default()),
            planner: Arc::new(StraightLinePlanner::default()),
            combat: Arc::new(combat),
            seats: Arc::new(SeatTable::new()),
            abilities,
            conditions: Arc::new(conditions),
        }
    }

    pub fn from_content(content: &Content) -> Self {
        Self::new(content.abilities.clone(), content.conditions.clone())
    }

    pub fn with_terrain(mut self, terrain: FlatTerrain) -> Self {
        self.terrain = Arc::new(terrain);
        self
    }

    pub fn with_planner(mut self, planner: StraightLinePlanner) -> Self {
        self.planner = Arc::new(planner);
        self
    }

    /// Every collaborator, for one tick.
    pub fn env(&self) -> AiEnv<'_> {
        AiEnv::with_all(
            self.combat.as_ref(),
            self.terrain.as_ref(),
            self.planner.as_ref(),
            self.abilities.as_ref(),
            self.world.as_ref(),
        )
        .with_conditions(self.conditions.as_ref())
        .with_seats(self.seats.as_ref())
    }

    pub fn world(&self) -> &WorldTable {
        &self.world
    }

    pub fn terrain(&self) -> &FlatTerrain {
        &self.terrain
    }

    pub fn planner(&self) -> &StraightLinePlanner {
        &self.planner
    }

    pub fn combat(&self) -> &CombatLedger {
        &self.combat
    }

    pub fn seats(&self) -> &SeatTable {
        &self.seats
    }

    pub fn abilities(&self) -> &AbilityTable {
        &self.abilities
    }
}
