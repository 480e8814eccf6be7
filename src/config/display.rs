//! Display configuration: the zone timestamps are shown in

use crate::interpreter::clock::DisplayZone;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayConfig {
    /// `local`, `utc` or a fixed offset like `+02:00`
    pub timezone: DisplayZone,
}

/// Display settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileDisplay {
    pub timezone: Option<String>,
}

impl DisplayConfig {
    /// Create from file config with defaults
    ///
    /// `timezone_override` (STREAMVIEW_TZ) wins over the file. An
    /// unrecognized zone falls back to local time with a warning.
    pub fn from_file(file: Option<FileDisplay>, timezone_override: Option<String>) -> Self {
        let file = file.unwrap_or_default();

        let timezone = match timezone_override.or(file.timezone) {
            Some(name) => name.parse().unwrap_or_else(|e| {
                // Logging isn't initialized while config loads
                eprintln!("Warning: {}; showing local time", e);
                DisplayZone::default()
            }),
            None => DisplayZone::default(),
        };

        Self { timezone }
    }
}
