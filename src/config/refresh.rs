//! Auto-refresh configuration for the transcript list

use serde::Deserialize;

/// Auto-refresh settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshConfig {
    /// Refresh the list on a timer in watch mode
    pub enabled: bool,
    /// Milliseconds between refreshes (1000 / 5000 / 10000 / 30000 are typical)
    pub interval_ms: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 5000,
        }
    }
}

/// Refresh settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileRefresh {
    pub enabled: Option<bool>,
    pub interval_ms: Option<u64>,
}

impl RefreshConfig {
    /// Create from file config with defaults; a zero interval means default
    pub fn from_file(file: Option<FileRefresh>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            enabled: file.enabled.unwrap_or(defaults.enabled),
            interval_ms: file
                .interval_ms
                .filter(|ms| *ms > 0)
                .unwrap_or(defaults.interval_ms),
        }
    }
}
