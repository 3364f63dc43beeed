//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Polysearch configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub database: DatabaseSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Page size used when the request does not carry one
    pub default_limit: u32,
    /// Upper bound for any requested page size
    pub max_limit: u32,
    /// Permission key checked against each object class
    pub view_permission: String,
    /// Locale used for translatable objects when the request has none
    pub default_locale: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub path: PathBuf,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: crate::storage::database::default_database_path(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
            view_permission: "perm:view".to_string(),
            default_locale: "en".to_string(),
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.default_limit == 0 || self.max_limit == 0 {
            return Err(anyhow!("Search limits must be greater than zero"));
        }
        if self.default_limit > self.max_limit {
            return Err(anyhow!(
                "search.default_limit ({}) cannot exceed search.max_limit ({})",
                self.default_limit,
                self.max_limit
            ));
        }
        if self.view_permission.trim().is_empty() {
            return Err(anyhow!("search.view_permission cannot be empty"));
        }
        if self.default_locale.trim().is_empty() {
            return Err(anyhow!("search.default_locale cannot be empty"));
        }
        Ok(())
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("POLYSEARCH_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("polysearch")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or return defaults if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        self.search.validate()
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            "search.default_limit" => Ok(self.search.default_limit.to_string()),
            "search.max_limit" => Ok(self.search.max_limit.to_string()),
            "search.view_permission" => Ok(self.search.view_permission.clone()),
            "search.default_locale" => Ok(self.search.default_locale.clone()),
            "database.path" => Ok(self.database.path.display().to_string()),
            _ => Err(anyhow!(
                "Unknown configuration key: {}. Use `polysearch config list` to see available keys.",
                key
            )),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "search.default_limit" => {
                self.search.default_limit = value
                    .parse()
                    .with_context(|| format!("Invalid default_limit value: {}", value))?;
            }
            "search.max_limit" => {
                self.search.max_limit = value
                    .parse()
                    .with_context(|| format!("Invalid max_limit value: {}", value))?;
            }
            "search.view_permission" => {
                self.search.view_permission = value.to_string();
            }
            "search.default_locale" => {
                self.search.default_locale = value.to_string();
            }
            "database.path" => {
                self.database.path = PathBuf::from(value);
            }
            _ => {
                return Err(anyhow!(
                    "Unknown configuration key: {}. Use `polysearch config list` to see available keys.",
                    key
                ));
            }
        }
        self.validate()
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        let keys = [
            "search.default_limit",
            "search.max_limit",
            "search.view_permission",
            "search.default_locale",
            "database.path",
        ];

        keys.into_iter()
            .map(|key| Ok((key.to_string(), self.get(key)?)))
            .collect()
    }

    /// Reset configuration to defaults by removing the config file
    pub fn reset() -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.search.default_limit, 20);
        assert_eq!(config.search.max_limit, 100);
        assert_eq!(config.search.view_permission, "perm:view");
        assert_eq!(config.search.default_locale, "en");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.set("search.default_limit", "5").unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.search.default_limit, 5);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[search]\nmax_limit = 50\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.search.max_limit, 50);
        assert_eq!(loaded.search.default_limit, 20);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_validation_rejects_bad_limits() {
        let mut config = Config::default();
        assert!(config.set("search.default_limit", "0").is_err());

        let mut config = Config::default();
        assert!(config.set("search.default_limit", "500").is_err());

        let mut config = Config::default();
        assert!(config.set("search.view_permission", "  ").is_err());
    }

    #[test]
    fn test_get_unknown_key() {
        let config = Config::default();
        let err = config.get("search.nope").unwrap_err();
        assert!(err.to_string().contains("Unknown configuration key"));
    }

    #[test]
    fn test_list_covers_every_key() {
        let config = Config::default();
        let entries = config.list().unwrap();
        assert_eq!(entries.len(), 5);
        assert!(entries.iter().any(|(k, v)| k == "search.max_limit" && v == "100"));
    }
}
