//! Ability metadata and the cooldown policies built on top of it.
//!
//! Descriptors are loaded once by the content layer and shared read-only
//! (`Arc`) by every agent whose kit references them.
mod cooldown;
mod descriptor;
mod kit;

pub use cooldown::JitterPolicy;
pub use descriptor::{AbilityDescriptor, AbilityEffect, AbilityId, EffectKind, TriggerCondition};
pub use kit::AbilityKit;
