//! Data-driven AI content and in-memory collaborators.
//!
//! This crate houses the static data the kernel reads through its oracle
//! traits and provides loaders for RON/TOML data files:
//! - Ability tables (RON)
//! - Agent templates, including archetype and seat conditions (RON)
//! - Kernel configuration (TOML)
//!
//! Content is consumed by runtime oracles and never appears in agent state.

pub mod conditions;
pub mod tables;
pub mod templates;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use conditions::{ConditionSpec, ConditionTable};
pub use tables::AbilityTable;
pub use templates::AgentTemplate;

#[cfg(feature = "loaders")]
pub use loaders::{AbilityLoader, ConfigLoader, Content, ContentFactory, TemplateLoader};
