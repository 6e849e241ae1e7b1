// Config module - settings.toml (logging, catalog extensions, labels) and theme.toml

mod theme;

pub use theme::Theme;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use directories::BaseDirs;

use crate::catalog::{BuiltinPromptCatalog, ModelInfo, PromptTemplateItem, StaticModelCatalog};
use crate::error::{Result, SettingsError};
use crate::variables::VariableLabels;

const CONFIG_DIR: &str = "ai-chat-settings";
const MAIN_CONFIG_FILE: &str = "settings.toml";
const THEME_FILE: &str = "theme.toml";
const LOG_FILE: &str = "ai-chat-settings.log";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    pub general: GeneralConfig,
    /// Extra or overriding entries for the model catalog
    pub models: Vec<ModelInfo>,
    /// Extra or overriding quote templates
    pub quote_templates: Vec<PromptTemplateItem>,
    /// Quote prompts, paired with quote templates by title
    pub quote_prompts: Vec<PromptTemplateItem>,
    pub labels: VariableLabels,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    /// Built-in theme used when no theme.toml exists
    pub theme: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: None,
            theme: "default".to_string(),
        }
    }
}

pub struct ConfigManager {
    config_dir: PathBuf,
    settings: SettingsConfig,
    theme: Theme,
}

impl ConfigManager {
    /// Load from the platform config directory
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;
        Ok(Self::load_from(config_dir))
    }

    /// Load from an explicit directory, which must exist
    pub fn with_dir(config_dir: impl Into<PathBuf>) -> Result<Self> {
        let config_dir = config_dir.into();
        if !config_dir.is_dir() {
            return Err(SettingsError::ConfigNotFound { path: config_dir });
        }
        Ok(Self::load_from(config_dir))
    }

    fn load_from(config_dir: PathBuf) -> Self {
        let settings: SettingsConfig =
            Self::load_toml_file(&config_dir.join(MAIN_CONFIG_FILE)).unwrap_or_default();
        let theme = Self::load_theme(&config_dir, &settings.general.theme);

        Self {
            config_dir,
            settings,
            theme,
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn settings(&self) -> &SettingsConfig {
        &self.settings
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn log_file(&self) -> PathBuf {
        self.settings
            .general
            .log_file
            .clone()
            .unwrap_or_else(|| self.config_dir.join(LOG_FILE))
    }

    /// Built-in models plus the `[[models]]` entries
    pub fn model_catalog(&self) -> StaticModelCatalog {
        let mut catalog = StaticModelCatalog::new();
        catalog.extend(self.settings.models.iter().cloned());
        catalog
    }

    /// Built-in templates plus the `[[quote_templates]]` / `[[quote_prompts]]` entries
    pub fn prompt_catalog(&self) -> BuiltinPromptCatalog {
        let mut catalog = BuiltinPromptCatalog::new();
        catalog.extend(
            self.settings.quote_templates.iter().cloned(),
            self.settings.quote_prompts.iter().cloned(),
        );
        catalog
    }

    pub fn labels(&self) -> &VariableLabels {
        &self.settings.labels
    }

    fn get_config_dir() -> Result<PathBuf> {
        BaseDirs::new()
            .map(|dirs| dirs.config_dir().join(CONFIG_DIR))
            .ok_or_else(|| SettingsError::Config("Could not determine config directory".to_string()))
    }

    fn load_theme(config_dir: &Path, name: &str) -> Theme {
        if let Some(theme) = Self::load_toml_file(&config_dir.join(THEME_FILE)) {
            return theme;
        }
        Theme::named(name).unwrap_or_else(|| {
            tracing::warn!("Unknown theme '{}', using default", name);
            Theme::default()
        })
    }

    fn load_toml_file<T: for<'de> Deserialize<'de>>(path: &Path) -> Option<T> {
        if !path.exists() {
            return None;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => Some(config),
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ModelCatalog, PromptTemplateCatalog};
    use tempfile::TempDir;

    #[test]
    fn test_missing_dir_is_reported() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            ConfigManager::with_dir(&missing),
            Err(SettingsError::ConfigNotFound { .. })
        ));
    }

    #[test]
    fn test_empty_dir_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_dir(dir.path()).unwrap();

        assert_eq!(manager.settings().general.log_level, "info");
        assert_eq!(manager.theme().name, "default");
        assert_eq!(manager.log_file(), dir.path().join(LOG_FILE));
        assert_eq!(manager.labels(), &VariableLabels::default());
        assert!(manager.model_catalog().get("gpt-4").is_some());
    }

    #[test]
    fn test_settings_extend_catalogs() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(MAIN_CONFIG_FILE),
            r#"
[general]
log_level = "debug"
theme = "vibrant"

[[models]]
model_id = "local-llm"
max_response_tokens = 6000

[[quote_templates]]
title = "Custom"
value = "{{q}} => {{a}}"

[[quote_prompts]]
title = "Custom"
value = "{{quote}} / {{question}}"

[labels]
source = "Fuente"
"#,
        )
        .unwrap();

        let manager = ConfigManager::with_dir(dir.path()).unwrap();

        assert_eq!(manager.settings().general.log_level, "debug");
        assert_eq!(manager.theme().name, "vibrant");
        assert_eq!(manager.model_catalog().max_response_tokens("local-llm"), Some(6000));
        let prompts = manager.prompt_catalog();
        assert!(prompts.quote_templates().iter().any(|t| t.title == "Custom"));
        assert_eq!(prompts.quote_prompt_for("Custom"), Some("{{quote}} / {{question}}"));
        assert_eq!(manager.labels().source, "Fuente");
        assert_eq!(manager.labels().index, "Quote index");
    }

    #[test]
    fn test_invalid_settings_fall_back() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(MAIN_CONFIG_FILE), "general = [").unwrap();

        let manager = ConfigManager::with_dir(dir.path()).unwrap();
        assert_eq!(manager.settings().general.theme, "default");
    }

    #[test]
    fn test_theme_file_wins_over_named_theme() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(MAIN_CONFIG_FILE), "[general]\ntheme = \"vibrant\"\n").unwrap();
        std::fs::write(dir.path().join(THEME_FILE), "name = \"custom\"\n").unwrap();

        let manager = ConfigManager::with_dir(dir.path()).unwrap();
        assert_eq!(manager.theme().name, "custom");
    }
}
