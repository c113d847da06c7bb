//! Configuration management for muxpick.
//!
//! A single JSON file holds the picker defaults, the worktree policies and the
//! logging setup. Every field has a default, so a partial file is fine.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::candidate::Mode;

/// Main configuration struct
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Mode used when no subcommand is given
    #[serde(default)]
    pub default_mode: Mode,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub worktree: WorktreeConfig,

    /// Upper bound on every tmux/git call, in seconds. 0 or absent means none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_timeout_secs: Option<u64>,

    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Default location of the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not find config directory")?;

        Ok(config_dir.join("muxpick").join("config.json"))
    }

    /// The external-command timeout, if one is configured
    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

/// Session mode settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Start directory for newly created sessions (tmux's default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_dir: Option<PathBuf>,
}

/// Worktree mode settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorktreeConfig {
    /// Branch that marks the main worktree in a bare layout. Tries main, then master.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_branch: Option<String>,

    /// Delete worktrees with uncommitted changes (with --force) instead of refusing
    #[serde(default)]
    pub allow_dirty_delete: bool,

    /// Also run `git branch -d` after removing a worktree
    #[serde(default)]
    pub delete_branch: bool,

    /// Remove a worktree once its branch has been merged. Off by default.
    #[serde(default)]
    pub remove_after_merge: bool,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing` filter directive, e.g. "info" or "muxpick=debug"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file; defaults to the cache directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.default_mode, Mode::Session);
        assert!(!config.worktree.allow_dirty_delete);
        assert!(!config.worktree.delete_branch);
        assert!(!config.worktree.remove_after_merge);
        assert_eq!(config.log.level, "info");
        assert_eq!(config.command_timeout(), None);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.json"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "default_mode": "worktree", "worktree": { "allow_dirty_delete": true } }"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.default_mode, Mode::Worktree);
        assert!(config.worktree.allow_dirty_delete);
        assert!(!config.worktree.remove_after_merge);
        assert_eq!(config.worktree.main_branch, None);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_malformed_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("config.json"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            default_mode: Mode::Worktree,
            session: SessionConfig {
                default_dir: Some(PathBuf::from("/work")),
            },
            worktree: WorktreeConfig {
                main_branch: Some("trunk".to_string()),
                allow_dirty_delete: false,
                delete_branch: true,
                remove_after_merge: true,
            },
            command_timeout_secs: Some(15),
            log: LogConfig::default(),
        };

        config.save(&path).unwrap();
        assert_eq!(Config::load(Some(&path)).unwrap(), config);
    }

    #[test]
    fn test_zero_timeout_means_none() {
        let config = Config {
            command_timeout_secs: Some(0),
            ..Config::default()
        };
        assert_eq!(config.command_timeout(), None);

        let config = Config {
            command_timeout_secs: Some(3),
            ..Config::default()
        };
        assert_eq!(config.command_timeout(), Some(Duration::from_secs(3)));
    }
}
