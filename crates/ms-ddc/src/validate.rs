//! Brightness round trip that proves a DDC/CI link is really controllable.
//!
//! Some links (VGA adapters, cheap docks) accept DDC/CI writes and answer
//! reads without the monitor ever changing. A working helper binary is not
//! enough evidence; a write has to be observed through a subsequent read.

use crate::commands;
use crate::error::Result;
use crate::parse::parse_vcp_value;
use crate::runner::CommandRunner;
use crate::tools::{install_hint, ToolKind};
use crate::vcp::VCP_BRIGHTNESS;
use crate::OsType;
use log::{debug, warn};
use serde::Serialize;
use std::thread;
use std::time::Duration;

/// Brightness access to one display, whatever the transport.
pub trait BrightnessProbe {
    fn read_brightness(&self) -> Result<u16>;
    fn write_brightness(&self, value: u16) -> Result<()>;
}

/// Brightness through an external helper addressed by display number.
pub struct ToolProbe<'a> {
    pub runner: &'a dyn CommandRunner,
    pub tool: ToolKind,
    pub display: String,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
}

impl BrightnessProbe for ToolProbe<'_> {
    fn read_brightness(&self) -> Result<u16> {
        let out = commands::get_vcp(self.tool, &self.display, VCP_BRIGHTNESS)?
            .run(self.runner, self.read_timeout)?;
        parse_vcp_value(self.tool, &out)
    }

    fn write_brightness(&self, value: u16) -> Result<()> {
        commands::set_vcp(self.tool, &self.display, VCP_BRIGHTNESS, value)?
            .run(self.runner, self.write_timeout)
            .map(|_| ())
    }
}

/// Terminal state of a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValidationOutcome {
    /// No helper to talk to the display with.
    Unsupported,
    /// The brightness read itself failed.
    ReadFailed,
    /// Writes are accepted but do not show up in the read-back.
    WriteIneffective,
    FullySupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DdcValidationResult {
    pub outcome: ValidationOutcome,
    pub tool_available: bool,
    pub can_read_values: bool,
    pub can_write_values: bool,
    pub validation_error: Option<String>,
    pub recommended_action: Option<String>,
}

impl DdcValidationResult {
    fn new(outcome: ValidationOutcome) -> Self {
        DdcValidationResult {
            outcome,
            tool_available: outcome != ValidationOutcome::Unsupported,
            can_read_values: matches!(
                outcome,
                ValidationOutcome::WriteIneffective | ValidationOutcome::FullySupported
            ),
            can_write_values: outcome == ValidationOutcome::FullySupported,
            validation_error: None,
            recommended_action: None,
        }
    }

    fn failed(outcome: ValidationOutcome, error: String, action: &str) -> Self {
        DdcValidationResult {
            validation_error: Some(error),
            recommended_action: Some(action.to_string()),
            ..Self::new(outcome)
        }
    }

    pub fn is_fully_supported(&self) -> bool {
        self.outcome == ValidationOutcome::FullySupported
    }
}

/// Brightness to probe with: ten up, or ten down when that would pass 100,
/// or 50 when neither direction fits.
pub fn probe_value(current: u16) -> u16 {
    let up = current.saturating_add(10);
    if up <= 100 {
        up
    } else if current >= 10 {
        current - 10
    } else {
        50
    }
}

/// Run the read / write / read-back / restore round trip.
///
/// `probe` is `None` when no helper is available on `os`. The original
/// brightness is restored after every write attempt; a failed restore is
/// logged and otherwise ignored.
pub fn validate(
    probe: Option<&dyn BrightnessProbe>,
    os: OsType,
    settle: Duration,
) -> DdcValidationResult {
    let Some(probe) = probe else {
        return DdcValidationResult::failed(
            ValidationOutcome::Unsupported,
            "no DDC tool available".to_string(),
            install_hint(os),
        );
    };

    let original = match probe.read_brightness() {
        Ok(value) => value,
        Err(e) => {
            return DdcValidationResult::failed(
                ValidationOutcome::ReadFailed,
                format!("Cannot read brightness: {}", e),
                "Monitor may not support DDC/CI or connection issue",
            );
        }
    };

    let target = probe_value(original);
    debug!("Validation: brightness {} -> probe {}", original, target);
    let observed = write_and_read_back(probe, target, settle);

    if let Err(e) = probe.write_brightness(original) {
        warn!("Could not restore brightness to {}: {}", original, e);
    }

    match observed {
        Ok(value) if value == target => DdcValidationResult::new(ValidationOutcome::FullySupported),
        outcome => {
            match outcome {
                Ok(value) => debug!("Validation: wrote {}, read back {}", target, value),
                Err(e) => debug!("Validation: probe round trip failed: {}", e),
            }
            DdcValidationResult::failed(
                ValidationOutcome::WriteIneffective,
                "DDC commands execute but have no effect".to_string(),
                "VGA/older connections often don't support DDC control. Try HDMI/DisplayPort",
            )
        }
    }
}

fn write_and_read_back(probe: &dyn BrightnessProbe, target: u16, settle: Duration) -> Result<u16> {
    probe.write_brightness(target)?;
    if !settle.is_zero() {
        thread::sleep(settle);
    }
    probe.read_brightness()
}

#[cfg(test)]
#[path = "tests/validate_tests.rs"]
mod tests;
