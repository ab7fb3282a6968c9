use ai_coach_session::{Timings, PREP_DURATION_SECS, REST_DURATION_SECS};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_prep_seconds")]
    pub prep_seconds: u32,

    #[serde(default = "default_rest_seconds")]
    pub rest_seconds: u32,

    /// Wall-clock length of one timer second
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_true")]
    pub show_key_hints: bool,

    #[serde(default = "default_accent_color")]
    pub accent_color: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Feedback database directory, defaults to ~/.ai-coach/db
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_db: Option<PathBuf>,
}

// Default value functions
fn default_prep_seconds() -> u32 {
    PREP_DURATION_SECS
}

fn default_rest_seconds() -> u32 {
    REST_DURATION_SECS
}

fn default_tick_millis() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

fn default_accent_color() -> String {
    "cyan".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            prep_seconds: default_prep_seconds(),
            rest_seconds: default_rest_seconds(),
            tick_millis: default_tick_millis(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_key_hints: default_true(),
            accent_color: default_accent_color(),
        }
    }
}

impl SessionConfig {
    pub fn timings(&self) -> Timings {
        Timings {
            prep_seconds: self.prep_seconds,
            rest_seconds: self.rest_seconds,
        }
    }

    /// Tick spacing, never zero
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_millis.max(1))
    }
}

impl Config {
    /// Get config directory path (~/.ai-coach/)
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".ai-coach"))
    }

    /// Get config file path (~/.ai-coach/config.toml)
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Explicit path if given, otherwise the default location
    pub fn resolve_path(path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::config_file(),
        }
    }

    /// Load configuration from `path`, falling back to defaults if it is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("Config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.session.prep_seconds, 3);
        assert_eq!(config.session.rest_seconds, 60);
        assert_eq!(config.session.tick_period(), Duration::from_secs(1));
        assert!(config.ui.show_key_hints);
        assert_eq!(config.ui.accent_color, "cyan");
        assert!(config.storage.feedback_db.is_none());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: Config = toml::from_str("[session]\nrest_seconds = 45\n").unwrap();
        assert_eq!(config.session.rest_seconds, 45);
        assert_eq!(config.session.prep_seconds, 3);
        assert_eq!(
            config.session.timings(),
            Timings {
                prep_seconds: 3,
                rest_seconds: 45
            }
        );
    }

    #[test]
    fn test_zero_tick_is_clamped() {
        let config: Config = toml::from_str("[session]\ntick_millis = 0\n").unwrap();
        assert_eq!(config.session.tick_period(), Duration::from_millis(1));
    }

    #[test]
    fn test_save_and_load() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.ui.accent_color = "magenta".to_string();
        config.save_to(&path)?;

        let loaded = Config::load_from(&path)?;
        assert_eq!(loaded.ui.accent_color, "magenta");
        assert_eq!(loaded.session.rest_seconds, 60);

        Ok(())
    }

    #[test]
    fn test_missing_file_uses_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = Config::load_from(&dir.path().join("absent.toml"))?;
        assert_eq!(config.session.prep_seconds, 3);
        Ok(())
    }
}
