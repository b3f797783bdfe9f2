//! Content factory for building oracles from data files.

use std::path::{Path, PathBuf};

use ai_core::AiConfig;
use tracing::info;

use crate::conditions::ConditionTable;
use crate::loaders::{AbilityLoader, ConfigLoader, LoadResult, TemplateLoader};
use crate::tables::AbilityTable;
use crate::templates::AgentTemplate;

/// Everything loaded from one data directory.
#[derive(Clone, Debug)]
pub struct Content {
    pub config: AiConfig,
    pub abilities: AbilityTable,
    pub templates: Vec<AgentTemplate>,
    pub conditions: ConditionTable,
}

impl Content {
    pub fn template(&self, id: u32) -> Option<&AgentTemplate> {
        self.templates.iter().find(|template| template.id == id)
    }

    pub fn template_by_name(&self, name: &str) -> Option<&AgentTemplate> {
        self.templates.iter().find(|template| template.name == name)
    }
}

/// Content factory that loads all AI content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── ai.toml
/// ├── abilities.ron
/// └── templates.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load kernel configuration from `ai.toml`, or defaults when absent.
    pub fn load_config(&self) -> LoadResult<AiConfig> {
        let path = self.data_dir.join("ai.toml");
        if !path.exists() {
            return Ok(AiConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load the ability table from `abilities.ron`.
    pub fn load_abilities(&self) -> LoadResult<AbilityTable> {
        AbilityLoader::load_table(&self.data_dir.join("abilities.ron"))
    }

    /// Load agent templates from `templates.ron`.
    pub fn load_templates(&self) -> LoadResult<Vec<AgentTemplate>> {
        TemplateLoader::load(&self.data_dir.join("templates.ron"))
    }

    /// Load everything and derive the seat condition table from templates.
    pub fn load(&self) -> LoadResult<Content> {
        let config = self.load_config()?;
        let abilities = self.load_abilities()?;
        let templates = self.load_templates()?;

        let mut conditions = ConditionTable::new();
        for template in &templates {
            conditions.set(template.id, &template.seat_conditions);
        }

        info!(
            target: "ai::content",
            dir = %self.data_dir.display(),
            abilities = abilities.len(),
            templates = templates.len(),
            "content loaded"
        );

        Ok(Content {
            config,
            abilities,
            templates,
            conditions,
        })
    }

    /// Shorthand for `ContentFactory::new(dir).load()`.
    pub fn load_dir(dir: impl Into<PathBuf>) -> LoadResult<Content> {
        Self::new(dir).load()
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
