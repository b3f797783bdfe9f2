//! Vehicle seat registry backing [`SeatOracle`].

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use ai_core::{AgentId, AiConfig, OccupantView, SeatOracle};
use tracing::debug;

#[derive(Debug, Default)]
pub struct SeatTable {
    seats: RwLock<HashMap<AgentId, Vec<OccupantView>>>,
    unboardable: RwLock<HashMap<AgentId, bool>>,
    evictions: Mutex<Vec<(AgentId, AgentId)>>,
}

impl SeatTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seats `occupant` in `vehicle`. Returns false when the vehicle is full,
    /// closed for boarding, or the seat is taken.
    pub fn board(&self, vehicle: AgentId, occupant: OccupantView) -> bool {
        if !self.is_boardable(vehicle) {
            return false;
        }
        let Ok(mut seats) = self.seats.write() else {
            return false;
        };

        let seated = seats.entry(vehicle).or_default();
        if seated.len() >= AiConfig::MAX_SEATS
            || seated.iter().any(|view| view.seat == occupant.seat || view.id == occupant.id)
        {
            return false;
        }
        seated.push(occupant);
        seated.sort_by_key(|view| view.seat);
        true
    }

    /// Removes `occupant` voluntarily. Returns whether the vehicle is now empty.
    pub fn leave(&self, vehicle: AgentId, occupant: AgentId) -> bool {
        let Ok(mut seats) = self.seats.write() else {
            return false;
        };
        let seated = seats.entry(vehicle).or_default();
        seated.retain(|view| view.id != occupant);
        seated.is_empty()
    }

    pub fn occupant_count(&self, vehicle: AgentId) -> usize {
        self.seats
            .read()
            .map(|seats| seats.get(&vehicle).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    pub fn is_boardable(&self, vehicle: AgentId) -> bool {
        self.unboardable
            .read()
            .map(|map| !map.get(&vehicle).copied().unwrap_or(false))
            .unwrap_or(true)
    }

    /// Evictions performed during the last tick, as `(vehicle, occupant)`.
    pub fn take_evictions(&self) -> Vec<(AgentId, AgentId)> {
        self.evictions
            .lock()
            .map(|mut pending| std::mem::take(&mut *pending))
            .unwrap_or_default()
    }

    pub fn forget(&self, vehicle: AgentId) {
        if let Ok(mut seats) = self.seats.write() {
            seats.remove(&vehicle);
        }
        if let Ok(mut map) = self.unboardable.write() {
            map.remove(&vehicle);
        }
    }
}

impl SeatOracle for SeatTable {
    fn occupants(&self, vehicle: AgentId) -> Vec<OccupantView> {
        self.seats
            .read()
            .map(|seats| seats.get(&vehicle).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    fn eject(&self, vehicle: AgentId, occupant: AgentId) {
        if let Ok(mut seats) = self.seats.write()
            && let Some(seated) = seats.get_mut(&vehicle)
        {
            seated.retain(|view| view.id != occupant);
        }
        debug!(target: "runtime::seats", %vehicle, %occupant, "ejected");
        if let Ok(mut pending) = self.evictions.lock() {
            pending.push((vehicle, occupant));
        }
    }

    fn set_boardable(&self, vehicle: AgentId, boardable: bool) {
        if let Ok(mut map) = self.unboardable.write() {
            map.insert(vehicle, !boardable);
        }
    }
}
