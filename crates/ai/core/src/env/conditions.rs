//! Vehicle seat collaborators and occupant eligibility predicates.
use std::fmt;
use std::sync::Arc;

use crate::state::AgentId;

/// What an eligibility predicate may inspect about a seated occupant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OccupantView {
    pub id: AgentId,
    pub seat: u8,
    pub is_player: bool,
    pub alive: bool,
    pub level: u8,
}

/// One externally supplied rule an occupant must satisfy to stay seated.
pub trait EligibilityPredicate: Send + Sync + fmt::Debug {
    fn evaluate(&self, occupant: &OccupantView) -> bool;
}

/// Shared predicate handle, as returned by [`ConditionOracle::conditions_for`].
pub type Predicate = Arc<dyn EligibilityPredicate>;

/// Source of eligibility predicates, keyed by agent template.
pub trait ConditionOracle: Send + Sync {
    fn conditions_for(&self, template_id: u32) -> Vec<Predicate>;
}

/// Seat occupancy of vehicles.
pub trait SeatOracle: Send + Sync {
    /// Current occupants of `vehicle`, in seat order.
    fn occupants(&self, vehicle: AgentId) -> Vec<OccupantView>;

    /// Forcibly unseats `occupant` from `vehicle`.
    fn eject(&self, vehicle: AgentId, occupant: AgentId);

    /// Toggles whether players may board `vehicle`.
    fn set_boardable(&self, _vehicle: AgentId, _boardable: bool) {}
}
