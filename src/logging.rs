//! File logging. The picker owns the terminal, so logs never go to stdout.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Environment variable that overrides every other filter setting
pub const LOG_ENV: &str = "MUXPICK_LOG";

/// Pick the filter directive: `MUXPICK_LOG`, then `--verbose`, then the config.
pub fn filter_directive(env: Option<String>, verbose: bool, configured: &str) -> String {
    match env {
        Some(directive) if !directive.trim().is_empty() => directive,
        _ if verbose => "debug".to_string(),
        _ => configured.to_string(),
    }
}

/// Where the log file goes when the config does not say.
pub fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("muxpick")
        .join("muxpick.log")
}

/// Install the global subscriber, appending to the configured log file.
/// Returns the file path.
pub fn init(config: &LogConfig, verbose: bool) -> Result<PathBuf> {
    let path = config.file.clone().unwrap_or_else(default_log_path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    let directive = filter_directive(std::env::var(LOG_ENV).ok(), verbose, &config.level);
    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("Invalid log filter: {}", directive))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!(e))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_var_beats_verbose_and_config() {
        assert_eq!(
            filter_directive(Some("muxpick=trace".to_string()), true, "warn"),
            "muxpick=trace"
        );
    }

    #[test]
    fn verbose_beats_config() {
        assert_eq!(filter_directive(None, true, "warn"), "debug");
        assert_eq!(filter_directive(Some("  ".to_string()), true, "warn"), "debug");
    }

    #[test]
    fn config_level_is_the_fallback() {
        assert_eq!(filter_directive(None, false, "warn"), "warn");
    }

    #[test]
    fn default_log_file_lives_under_muxpick() {
        assert!(default_log_path().ends_with("muxpick/muxpick.log"));
    }
}
