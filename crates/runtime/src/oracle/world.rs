//! Agent registry backing [`WorldOracle`].

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, RwLock};

use ai_core::{AgentId, AgentView, WorldOracle};

#[derive(Clone, Copy, Debug, Default)]
struct Entry {
    view: Option<AgentView>,
    owner: Option<AgentId>,
    faction: u32,
}

/// Snapshot of every agent, refreshed by the worker before each tick.
///
/// Agents observe each other only through this snapshot, so a tick never
/// reads another agent's in-flight state.
#[derive(Debug, Default)]
pub struct WorldTable {
    entries: RwLock<HashMap<AgentId, Entry>>,
    blind: RwLock<HashSet<AgentId>>,
    despawns: Mutex<Vec<AgentId>>,
}

impl WorldTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or refreshes one agent.
    pub fn upsert(&self, view: AgentView, owner: Option<AgentId>, faction: u32) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(
                view.id,
                Entry {
                    view: Some(view),
                    owner,
                    faction,
                },
            );
        }
    }

    /// Replaces the positions and liveness of known agents.
    pub fn refresh(&self, views: impl IntoIterator<Item = AgentView>) {
        if let Ok(mut entries) = self.entries.write() {
            for view in views {
                entries.entry(view.id).or_default().view = Some(view);
            }
        }
    }

    pub fn remove(&self, id: AgentId) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(&id);
        }
    }

    /// Makes `observer` unable to perceive anything (stealth and blindness).
    pub fn set_blind(&self, observer: AgentId, blind: bool) {
        if let Ok(mut set) = self.blind.write() {
            if blind {
                set.insert(observer);
            } else {
                set.remove(&observer);
            }
        }
    }

    /// Despawn requests issued during the last tick.
    pub fn take_despawns(&self) -> Vec<AgentId> {
        self.despawns
            .lock()
            .map(|mut pending| std::mem::take(&mut *pending))
            .unwrap_or_default()
    }

    fn entry(&self, id: AgentId) -> Option<Entry> {
        self.entries.read().ok()?.get(&id).copied()
    }
}

impl WorldOracle for WorldTable {
    fn view(&self, id: AgentId) -> Option<AgentView> {
        self.entry(id)?.view
    }

    fn can_perceive(&self, observer: AgentId, target: AgentId) -> bool {
        let blind = self
            .blind
            .read()
            .map(|set| set.contains(&observer))
            .unwrap_or(false);
        !blind && self.view(observer).is_some_and(|view| view.alive) && self.view(target).is_some()
    }

    /// Same faction, or one owns the other.
    fn is_friendly(&self, a: AgentId, b: AgentId) -> bool {
        let (Some(left), Some(right)) = (self.entry(a), self.entry(b)) else {
            return false;
        };
        left.faction == right.faction || left.owner == Some(b) || right.owner == Some(a)
    }

    fn despawn(&self, agent: AgentId) {
        if let Ok(mut pending) = self.despawns.lock() {
            pending.push(agent);
        }
    }
}
