//! Argument shapes for each (helper, operation) pair.
//!
//! Building a command never runs it; callers hand the [`Invocation`] to a
//! [`CommandRunner`](crate::runner::CommandRunner) with the deadline that
//! fits the operation.

use crate::error::{DdcError, Result};
use crate::runner::CommandRunner;
use crate::tools::ToolKind;
use crate::vcp::Feature;
use std::fmt;
use std::time::Duration;

/// A fully formed helper command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: &'static str,
    pub args: Vec<String>,
}

impl Invocation {
    fn new(tool: ToolKind, args: &[&str]) -> Self {
        Invocation {
            program: tool.binary(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Run through `runner`, returning stdout.
    pub fn run(&self, runner: &dyn CommandRunner, timeout: Duration) -> Result<String> {
        runner.output(self.program, &self.args, timeout)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// `m1ddc` sub-command for a feature.
fn m1ddc_feature(feature: Feature) -> &'static str {
    match feature {
        Feature::Brightness => "luminance",
        Feature::Contrast => "contrast",
        Feature::InputSource => "input",
        Feature::Volume => "volume",
    }
}

/// `ddcctl` flag for a feature.
fn ddcctl_flag(feature: Feature) -> &'static str {
    match feature {
        Feature::Brightness => "-b",
        Feature::Contrast => "-c",
        Feature::InputSource => "-i",
        Feature::Volume => "-v",
    }
}

/// Map a VCP code onto a named feature for helpers that only know names.
fn named_feature(tool: ToolKind, code: u8) -> Result<Feature> {
    Feature::from_code(code).ok_or(DdcError::UnsupportedFeature {
        tool: tool.binary(),
        code,
    })
}

/// Enumerate attached monitors.
pub fn detect(tool: ToolKind) -> Result<Invocation> {
    match tool {
        ToolKind::Ddcutil => Ok(Invocation::new(tool, &["detect"])),
        ToolKind::Ddccontrol => Ok(Invocation::new(tool, &["-p"])),
        _ => Err(DdcError::NotImplemented("monitor detection for this helper")),
    }
}

/// Dump the capability string of one monitor.
pub fn capabilities(tool: ToolKind, display: &str) -> Result<Invocation> {
    match tool {
        ToolKind::Ddcutil => Ok(Invocation::new(
            tool,
            &["--display", display, "capabilities"],
        )),
        _ => Err(DdcError::NotImplemented("capability query for this helper")),
    }
}

/// Read VCP `code` from `display`.
pub fn get_vcp(tool: ToolKind, display: &str, code: u8) -> Result<Invocation> {
    match tool {
        ToolKind::Ddcutil => {
            let code = format!("{:02x}", code);
            Ok(Invocation::new(tool, &["--display", display, "getvcp", &code]))
        }
        ToolKind::Ddccontrol => {
            let code = format!("0x{:02x}", code);
            Ok(Invocation::new(tool, &["-r", &code, display]))
        }
        ToolKind::M1ddc => {
            let feature = m1ddc_feature(named_feature(tool, code)?);
            Ok(Invocation::new(tool, &["display", display, "get", feature]))
        }
        ToolKind::Ddcctl => {
            let flag = ddcctl_flag(named_feature(tool, code)?);
            Ok(Invocation::new(tool, &["-d", display, flag, "?"]))
        }
        ToolKind::ControlMyMonitor | ToolKind::Ddccci => {
            Err(DdcError::NotImplemented("Windows VCP getting"))
        }
    }
}

/// Write `value` to VCP `code` on `display`.
pub fn set_vcp(tool: ToolKind, display: &str, code: u8, value: u16) -> Result<Invocation> {
    let value = value.to_string();
    match tool {
        ToolKind::Ddcutil => {
            let code = format!("{:02x}", code);
            Ok(Invocation::new(
                tool,
                &["--display", display, "setvcp", &code, &value],
            ))
        }
        ToolKind::Ddccontrol => {
            let code = format!("0x{:02x}", code);
            Ok(Invocation::new(tool, &["-r", &code, "-w", &value, display]))
        }
        ToolKind::M1ddc => {
            let feature = m1ddc_feature(named_feature(tool, code)?);
            Ok(Invocation::new(
                tool,
                &["display", display, "set", feature, &value],
            ))
        }
        ToolKind::Ddcctl => {
            let flag = ddcctl_flag(named_feature(tool, code)?);
            Ok(Invocation::new(tool, &["-d", display, flag, &value]))
        }
        ToolKind::ControlMyMonitor | ToolKind::Ddccci => {
            Err(DdcError::NotImplemented("Windows VCP setting"))
        }
    }
}
