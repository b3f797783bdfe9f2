//! Ability metadata store.

use std::collections::HashMap;
use std::sync::Arc;

use ai_core::{AbilityDescriptor, AbilityId, AbilityOracle};
use tracing::warn;

/// Immutable ability table keyed by id.
///
/// Descriptors are wrapped in `Arc` once at load time and shared by every kit
/// that references them.
#[derive(Clone, Debug, Default)]
pub struct AbilityTable {
    by_id: HashMap<AbilityId, Arc<AbilityDescriptor>>,
}

impl AbilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the table; a duplicated id keeps the last descriptor.
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = AbilityDescriptor>) -> Self {
        let mut table = Self::new();
        for descriptor in descriptors {
            table.insert(descriptor);
        }
        table
    }

    pub fn insert(&mut self, descriptor: AbilityDescriptor) {
        let id = descriptor.id;
        if self.by_id.insert(id, Arc::new(descriptor)).is_some() {
            warn!(target: "ai::content", ability = %id, "duplicate ability id, keeping the last definition");
        }
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn get(&self, id: AbilityId) -> Option<&AbilityDescriptor> {
        self.by_id.get(&id).map(Arc::as_ref)
    }
}

impl AbilityOracle for AbilityTable {
    fn lookup(&self, id: AbilityId) -> Option<Arc<AbilityDescriptor>> {
        self.by_id.get(&id).cloned()
    }
}
