//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;
use anyhow::{Context, Result};

/// Quoted TOML string, escaped so any path or URL parses back unchanged
fn quoted(value: impl std::fmt::Display) -> String {
    toml::Value::String(value.to_string()).to_string()
}

impl Config {
    /// Remote URL line, commented out with an example when unset
    fn remote_to_toml(&self) -> String {
        match &self.remote_url {
            Some(url) => format!("remote_url = {}\n", quoted(url)),
            None => "# remote_url = \"http://127.0.0.1:8787\"\n".to_string(),
        }
    }

    /// Serialize config to a commented TOML document
    pub fn to_toml(&self) -> String {
        format!(
            r#"# streamview configuration

# Address for `streamview serve`
bind_addr = "{bind}"

# Directory holding transcript files (*.json, *.jsonl)
log_dir = {log_dir}

# Read transcripts from another streamview server instead of log_dir
{remote}
# Timestamp display: local, utc, or a fixed offset like "+02:00"
[display]
timezone = "{timezone}"

# Auto-refresh for `streamview list --watch`
[refresh]
enabled = {refresh_enabled}
interval_ms = {refresh_interval}  # 1000, 5000, 10000, 30000, ...

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = {log_level}
# JSON file logging (in addition to stderr)
file_enabled = {log_file_enabled}
file_dir = {log_file_dir}
file_rotation = "{log_file_rotation}"  # hourly, daily, never
file_prefix = {log_file_prefix}
"#,
            bind = self.bind_addr,
            log_dir = quoted(self.log_dir.display()),
            remote = self.remote_to_toml(),
            timezone = self.display.timezone,
            refresh_enabled = self.refresh.enabled,
            refresh_interval = self.refresh.interval_ms,
            log_level = quoted(&self.logging.level),
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = quoted(self.logging.file_dir.display()),
            log_file_rotation = self.logging.file_rotation.as_str(),
            log_file_prefix = quoted(&self.logging.file_prefix),
        )
    }

    /// Save current configuration to the config path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().context("Could not determine config path")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        std::fs::write(&path, self.to_toml())
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}
