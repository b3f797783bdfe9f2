//! Kernel configuration loader.

use std::path::Path;

use ai_core::AiConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for kernel configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Missing keys keep their [`AiConfig::default`] values.
    pub fn load(path: &Path) -> LoadResult<AiConfig> {
        let content = read_file(path)?;
        let config: AiConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ai.toml");
        std::fs::write(
            &path,
            "dismiss_delay_ms = 8000\nwander_pause_ms = [1000, 2000]\n",
        )
        .unwrap();

        let config = ConfigLoader::load(&path).unwrap();

        assert_eq!(config.dismiss_delay_ms, 8000);
        assert_eq!(config.wander_pause_ms, (1000, 2000));
        assert_eq!(config.melee_range, AiConfig::DEFAULT_MELEE_RANGE);
    }
}
