//! DDC/CI monitor detection and control.
//!
//! Locates a usable DDC transport on the host (a native IOKit binding on
//! macOS, or one of several external helpers: `ddcutil`/`ddccontrol` on
//! Linux, `m1ddc`/`ddcctl` on macOS), detects attached monitors through it,
//! normalizes the heterogeneous helper output into [`Monitor`] values and
//! exposes uniform VCP read/write through [`DdcClient`].
//!
//! Layout, leaves first:
//!   - [`platform`]: OS identity and version metadata for diagnostics
//!   - [`tools`]: which helper binaries are installed, in preference order
//!   - [`runner`] / [`commands`]: bounded helper invocations and their syntax
//!   - [`parse`]: tolerant text/JSON parsers for helper output
//!   - [`native`]: in-process DDC/CI, the macOS IOKit transport
//!   - [`validate`]: brightness round trip that proves a link is controllable
//!   - [`transport`] / [`client`]: OS-tagged backends and the facade over them

pub mod client;
pub mod commands;
pub mod error;
pub mod fallback;
pub mod inputs;
pub mod native;
pub mod parse;
pub mod platform;
pub mod runner;
pub mod settings;
pub mod tools;
pub mod transport;
pub mod validate;
pub mod vcp;

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

pub use client::DdcClient;
pub use error::{DdcError, Result};
pub use settings::DdcSettings;
pub use tools::ToolKind;
pub use validate::{DdcValidationResult, ValidationOutcome};

/// Host operating system family. Derived once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OsType {
    Linux,
    MacOs,
    Windows,
}

impl OsType {
    /// The OS this binary is running on, if it has a transport.
    pub fn current() -> Option<OsType> {
        Self::from_target(std::env::consts::OS)
    }

    /// Map a Rust target OS name (`std::env::consts::OS`) to an `OsType`.
    pub fn from_target(os: &str) -> Option<OsType> {
        match os {
            "linux" => Some(OsType::Linux),
            "macos" => Some(OsType::MacOs),
            "windows" => Some(OsType::Windows),
            _ => None,
        }
    }
}

impl fmt::Display for OsType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            OsType::Linux => "Linux",
            OsType::MacOs => "macOS",
            OsType::Windows => "Windows",
        })
    }
}

/// One physical external display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Monitor {
    /// Transport-scoped identifier, unique within one detection call only.
    pub id: String,
    /// Best-effort human-readable label.
    pub name: String,
    /// Input-source name → VCP 0x60 code. Empty when not enumerated.
    pub inputs: BTreeMap<String, u8>,
    /// Name of the active input, or empty when unknown.
    pub current_input: String,
}

impl Monitor {
    /// A monitor with no input information, named after `name` or, when that
    /// is empty, the generic "External Display <id>".
    pub fn bare(id: impl Into<String>, name: impl Into<String>) -> Self {
        let id = id.into();
        let mut name = name.into();
        if name.trim().is_empty() {
            name = generic_name(&id);
        }
        Monitor {
            id,
            name,
            inputs: BTreeMap::new(),
            current_input: String::new(),
        }
    }
}

/// Last link of the naming chain.
pub fn generic_name(id: &str) -> String {
    format!("External Display {}", id)
}

/// What a monitor reports it can do. Fields stay at their defaults when the
/// backend cannot tell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub supported_inputs: BTreeMap<String, u8>,
    pub supports_brightness: bool,
    pub supports_contrast: bool,
}

/// A [`Monitor`] plus what the validating detection path confirmed about it.
#[derive(Debug, Clone, Serialize)]
pub struct EnhancedMonitor {
    pub monitor: Monitor,
    /// Reads and writes both demonstrably work.
    pub ddc_supported: bool,
    /// Inputs confirmed by probing. Empty unless input probing ran.
    pub supported_inputs: BTreeMap<String, u8>,
    /// The helper used, or `None` for native / no transport.
    pub tool: Option<ToolKind>,
    /// Outcome of the validation round trip, when one ran.
    pub validation: Option<DdcValidationResult>,
}

impl EnhancedMonitor {
    /// Wrap a monitor that did not go through validation.
    pub fn unvalidated(monitor: Monitor, tool: Option<ToolKind>) -> Self {
        EnhancedMonitor {
            ddc_supported: tool.is_some() && !monitor.inputs.is_empty(),
            monitor,
            supported_inputs: BTreeMap::new(),
            tool,
            validation: None,
        }
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod support;

#[cfg(test)]
#[path = "tests/model_tests.rs"]
mod tests;
