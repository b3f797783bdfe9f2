//! Ability table loader.

use std::path::Path;

use ai_core::AbilityDescriptor;

use crate::loaders::{LoadResult, read_file};
use crate::tables::AbilityTable;

/// Loader for ability descriptors from RON files.
pub struct AbilityLoader;

impl AbilityLoader {
    /// Load ability descriptors from a RON file.
    ///
    /// RON format: `Vec<AbilityDescriptor>`
    pub fn load(path: &Path) -> LoadResult<Vec<AbilityDescriptor>> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse ability table RON at {}: {}", path.display(), e))
    }

    /// Load straight into an [`AbilityTable`].
    pub fn load_table(path: &Path) -> LoadResult<AbilityTable> {
        Ok(AbilityTable::from_descriptors(Self::load(path)?))
    }

    fn parse(content: &str) -> LoadResult<Vec<AbilityDescriptor>> {
        let descriptors: Vec<AbilityDescriptor> = ron::from_str(content)?;
        Ok(descriptors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_core::{AbilityId, EffectKind, TriggerCondition};
    use tempfile::TempDir;

    #[test]
    fn test_load_abilities() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("abilities.ron");
        std::fs::write(
            &path,
            r#"[
                (
                    id: (12),
                    trigger: OnCombatTick,
                    cooldown: 8000,
                    real_cooldown: 6000,
                    max_range: 30.0,
                    cast_time: 1500,
                ),
                (
                    id: (13),
                    cooldown: 0,
                    effects: [(kind: ApplyAura, positive: false)],
                ),
            ]"#,
        )
        .unwrap();

        let descriptors = AbilityLoader::load(&path).unwrap();

        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].id, AbilityId(12));
        assert_eq!(descriptors[0].trigger, TriggerCondition::OnCombatTick);
        assert_eq!(descriptors[0].cast_time, 1500);
        assert_eq!(descriptors[1].trigger, TriggerCondition::None);
        assert!(descriptors[1].has_effect(EffectKind::ApplyAura));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let error = AbilityLoader::load(&temp_dir.path().join("nope.ron")).unwrap_err();
        assert!(error.to_string().contains("Failed to read file"));
    }
}
