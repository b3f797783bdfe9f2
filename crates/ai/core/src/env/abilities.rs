use std::sync::Arc;

use crate::ability::{AbilityDescriptor, AbilityId};

/// Read-only ability metadata store, loaded once at startup.
pub trait AbilityOracle: Send + Sync {
    fn lookup(&self, id: AbilityId) -> Option<Arc<AbilityDescriptor>>;
}
