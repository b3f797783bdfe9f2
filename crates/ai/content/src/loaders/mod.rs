//! Content loaders for reading AI data from files.
//!
//! This module provides loaders that convert RON/TOML files into the
//! in-memory tables the kernel's oracles are backed by.

pub mod abilities;
pub mod config;
pub mod factory;
pub mod templates;

pub use abilities::AbilityLoader;
pub use config::ConfigLoader;
pub use factory::{Content, ContentFactory};
pub use templates::TemplateLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
