//! Agent template loader.

use std::collections::HashSet;
use std::path::Path;

use crate::loaders::{LoadResult, read_file};
use crate::templates::AgentTemplate;

/// Loader for agent templates from RON files.
pub struct TemplateLoader;

impl TemplateLoader {
    /// Load agent templates from a RON file.
    ///
    /// RON format: `Vec<AgentTemplate>`. Template ids must be unique.
    pub fn load(path: &Path) -> LoadResult<Vec<AgentTemplate>> {
        let content = read_file(path)?;
        let templates: Vec<AgentTemplate> = ron::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse template RON at {}: {}", path.display(), e)
        })?;

        let mut seen = HashSet::new();
        for template in &templates {
            if !seen.insert(template.id) {
                anyhow::bail!("Duplicate template id {} ('{}')", template.id, template.name);
            }
        }

        Ok(templates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConditionSpec;
    use ai_core::{AbilityId, Archetype};
    use tempfile::TempDir;

    #[test]
    fn test_load_templates() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("templates.ron");
        std::fs::write(
            &path,
            r#"[
                (id: 1, name: "grunt", respawn_radius: 5.0),
                (
                    id: 2,
                    name: "siege engine",
                    archetype: Some(vehicle),
                    seat_conditions: [AlivePlayer, MinLevel(70)],
                ),
                (id: 3, name: "bowman", archetype: Some(archer), abilities: [(75)]),
            ]"#,
        )
        .unwrap();

        let templates = TemplateLoader::load(&path).unwrap();

        assert_eq!(templates.len(), 3);
        assert_eq!(templates[0].archetype, None);
        assert_eq!(templates[1].archetype, Some(Archetype::Vehicle));
        assert_eq!(
            templates[1].seat_conditions,
            vec![ConditionSpec::AlivePlayer, ConditionSpec::MinLevel(70)]
        );
        assert_eq!(templates[2].abilities, vec![AbilityId(75)]);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("templates.ron");
        std::fs::write(&path, r#"[(id: 1, name: "a"), (id: 1, name: "b")]"#).unwrap();

        let error = TemplateLoader::load(&path).unwrap_err();
        assert!(error.to_string().contains("Duplicate template id 1"));
    }
}
