//! Configuration management: TOML file with sensible defaults.
//!
//! Config file location: `$XDG_CONFIG_HOME/monitorswitch/config.toml`
//! (`~/.config/monitorswitch/config.toml` when unset), or
//! `%APPDATA%\monitorswitch\config.toml` on Windows. The directory can be
//! overridden with `MONITORSWITCH_CONFIG_DIR`.
//! A missing or unreadable file means every setting takes its default.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides the config directory.
pub const CONFIG_DIR_ENV: &str = "MONITORSWITCH_CONFIG_DIR";

/// Directory holding `config.toml`.
pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if cfg!(windows) {
        let app_data =
            std::env::var("APPDATA").unwrap_or_else(|_| r"C:\ProgramData".to_string());
        return PathBuf::from(app_data).join("monitorswitch");
    }

    let base = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".config"))
            .unwrap_or_else(|| PathBuf::from(".config")),
    };
    base.join("monitorswitch")
}

/// Where `config show` reads and `config reset` writes.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Tool configuration with defaults for every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Print diagnostic detail and enable debug logging.
    pub verbose: bool,

    /// Helper tool to prefer when several are installed
    /// (`m1ddc`, `ddcctl`, `ddcutil`, `ddccontrol`). Empty = automatic.
    pub preferred_tool: String,

    /// Run the brightness read/write/verify round trip on macOS displays
    /// before trusting the helper tool.
    pub validate_ddc: bool,

    /// Discover inputs by switching to each known input and back.
    /// The screen goes blank while an unused input is probed.
    pub probe_inputs: bool,

    /// Use the built-in IOKit transport on macOS when no helper is installed.
    pub native_fallback: bool,

    /// Milliseconds to wait after the probe write before reading back.
    pub settle_delay_ms: u64,

    /// Timeout for short-lived checks such as probing a single input.
    pub probe_timeout_ms: u64,

    /// Timeout for VCP reads.
    pub read_timeout_ms: u64,

    /// Timeout for VCP writes.
    pub write_timeout_ms: u64,

    /// Timeout for monitor detection and capability queries.
    pub detect_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbose: false,
            preferred_tool: String::new(),
            validate_ddc: true,
            probe_inputs: false,
            native_fallback: true,
            settle_delay_ms: 500,
            probe_timeout_ms: 1000,
            read_timeout_ms: 3000,
            write_timeout_ms: 5000,
            detect_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Settings from [`config_path`], or the defaults when that fails.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    /// Load config from a specific file, falling back to defaults.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(cfg) => {
                    info!("Config loaded from {}", path.display());
                    cfg
                }
                Err(e) => {
                    warn!(
                        "Config parse error in {}: {}, using defaults",
                        path.display(),
                        e
                    );
                    Self::default()
                }
            },
            Err(_) => {
                info!("No config file at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Reset the file at [`config_path`] to the defaults.
    pub fn write_default() -> Result<(), Box<dyn std::error::Error>> {
        Self::write_config(&Self::default())
    }

    /// Save `cfg` to [`config_path`], creating the directory first.
    pub fn write_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
        Self::write_to(cfg, &config_path())
    }

    /// Write a config to an explicit path, creating parent directories.
    pub fn write_to(cfg: &Config, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                std::fs::create_dir_all(dir)?;
            }
        }

        std::fs::write(path, Self::to_toml_commented(cfg))?;
        info!("Config written to {}", path.display());
        Ok(())
    }

    /// TOML with one comment per setting, grouped the way `config show`
    /// prints them.
    pub fn to_toml_commented(cfg: &Config) -> String {
        format!(
            r##"# monitorswitch configuration
# Location: {location}

# ─── Output ──────────────────────────────────────────────────────────
# Print diagnostic detail and enable debug logging.
verbose = {verbose}

# ─── Tools ───────────────────────────────────────────────────────────
# Preferred helper: "m1ddc", "ddcctl" (macOS), "ddcutil", "ddccontrol" (Linux).
# Leave empty to pick the first installed one.
preferred_tool = "{preferred_tool}"

# Use the built-in IOKit transport on macOS when no helper is installed.
native_fallback = {native_fallback}

# ─── Validation ──────────────────────────────────────────────────────
# Nudge brightness and read it back to confirm the link really works.
# Some connections (VGA, cheap adapters) accept commands and ignore them.
validate_ddc = {validate_ddc}

# Switch to every known input to see which ones the monitor accepts.
# The screen goes blank while this runs.
probe_inputs = {probe_inputs}

# Wait after the probe write before reading the value back (ms).
settle_delay_ms = {settle_delay_ms}

# ─── Timeouts (ms) ───────────────────────────────────────────────────
probe_timeout_ms = {probe_timeout_ms}
read_timeout_ms = {read_timeout_ms}
write_timeout_ms = {write_timeout_ms}
detect_timeout_ms = {detect_timeout_ms}
"##,
            location = config_path().display(),
            verbose = cfg.verbose,
            preferred_tool = escape_toml_string(&cfg.preferred_tool),
            native_fallback = cfg.native_fallback,
            validate_ddc = cfg.validate_ddc,
            probe_inputs = cfg.probe_inputs,
            settle_delay_ms = cfg.settle_delay_ms,
            probe_timeout_ms = cfg.probe_timeout_ms,
            read_timeout_ms = cfg.read_timeout_ms,
            write_timeout_ms = cfg.write_timeout_ms,
            detect_timeout_ms = cfg.detect_timeout_ms,
        )
    }
}

/// Escape `s` for a TOML basic string.
fn escape_toml_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
