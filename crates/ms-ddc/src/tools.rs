//! Which DDC helper binaries are installed.
//!
//! Availability is re-evaluated on every call; a tool installed or removed
//! between two commands is picked up without restarting anything.

use crate::runner::CommandRunner;
use crate::OsType;
use log::{debug, warn};
use serde::Serialize;
use std::fmt;

/// External DDC/CI helpers this crate knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ToolKind {
    #[serde(rename = "m1ddc")]
    M1ddc,
    #[serde(rename = "ddcctl")]
    Ddcctl,
    #[serde(rename = "ddcutil")]
    Ddcutil,
    #[serde(rename = "ddccontrol")]
    Ddccontrol,
    #[serde(rename = "ControlMyMonitor")]
    ControlMyMonitor,
    #[serde(rename = "ddccci")]
    Ddccci,
}

impl ToolKind {
    pub const ALL: [ToolKind; 6] = [
        ToolKind::M1ddc,
        ToolKind::Ddcctl,
        ToolKind::Ddcutil,
        ToolKind::Ddccontrol,
        ToolKind::ControlMyMonitor,
        ToolKind::Ddccci,
    ];

    /// Executable name looked up on `PATH`.
    pub fn binary(self) -> &'static str {
        match self {
            ToolKind::M1ddc => "m1ddc",
            ToolKind::Ddcctl => "ddcctl",
            ToolKind::Ddcutil => "ddcutil",
            ToolKind::Ddccontrol => "ddccontrol",
            ToolKind::ControlMyMonitor => "ControlMyMonitor",
            ToolKind::Ddccci => "ddccci",
        }
    }

    /// Case-insensitive inverse of [`binary`](Self::binary).
    pub fn from_binary(name: &str) -> Option<ToolKind> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.binary().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.binary())
    }
}

/// Helpers for `os`, most preferred first.
pub fn preference(os: OsType) -> &'static [ToolKind] {
    match os {
        OsType::MacOs => &[ToolKind::M1ddc, ToolKind::Ddcctl],
        OsType::Linux => &[ToolKind::Ddcutil, ToolKind::Ddccontrol],
        OsType::Windows => &[ToolKind::ControlMyMonitor, ToolKind::Ddccci],
    }
}

/// Whether `tool` resolves on the search path.
pub fn is_available(runner: &dyn CommandRunner, tool: ToolKind) -> bool {
    match runner.lookup(tool.binary()) {
        Some(path) => {
            debug!("found {} at {}", tool, path.display());
            true
        }
        None => false,
    }
}

/// First helper of `os`'s preference list that resolves, if any.
pub fn detect_available_tool(runner: &dyn CommandRunner, os: OsType) -> Option<ToolKind> {
    preference(os)
        .iter()
        .copied()
        .find(|tool| is_available(runner, *tool))
}

/// Like [`detect_available_tool`], but honours a configured preference when
/// that tool belongs to `os` and is installed.
pub fn select_tool(
    runner: &dyn CommandRunner,
    os: OsType,
    preferred: Option<ToolKind>,
) -> Option<ToolKind> {
    if let Some(tool) = preferred {
        if !preference(os).contains(&tool) {
            warn!("{} is not a {} tool, ignoring preference", tool, os);
        } else if is_available(runner, tool) {
            return Some(tool);
        } else {
            warn!("Preferred tool {} not found on PATH", tool);
        }
    }
    detect_available_tool(runner, os)
}

/// Install hint shown when no helper is available.
pub fn install_hint(os: OsType) -> &'static str {
    match os {
        OsType::MacOs => "Install 'm1ddc' or 'ddcctl' to enable DDC functionality.",
        OsType::Linux => "Install 'ddcutil' (or 'ddccontrol') and load the i2c-dev module.",
        OsType::Windows => "Install ddccci or ControlMyMonitor",
    }
}

/// Whether DDC/CI looks usable on this host, with a one-line explanation.
pub fn check_ddc_support(runner: &dyn CommandRunner, os: OsType) -> (bool, String) {
    match detect_available_tool(runner, os) {
        Some(tool) => (true, format!("DDC/CI support detected via {}", tool)),
        None => match os {
            OsType::Linux => (
                false,
                "ddcutil not found, DDC/CI support may not be available".to_string(),
            ),
            OsType::MacOs => (
                false,
                format!("No DDC/CI tools found. {}", install_hint(os)),
            ),
            OsType::Windows => (
                false,
                "No DDC/CI tools found. Install ddccci or ControlMyMonitor".to_string(),
            ),
        },
    }
}

#[cfg(test)]
#[path = "tests/tools_tests.rs"]
mod tests;
