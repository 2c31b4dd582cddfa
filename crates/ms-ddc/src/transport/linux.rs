//! Linux backend: `ddcutil` or `ddccontrol`, with `xrandr` as a
//! capability-less last resort.

use super::Transport;
use crate::commands;
use crate::error::{DdcError, Result};
use crate::fallback::Chain;
use crate::inputs::input_value_to_name;
use crate::parse;
use crate::runner::CommandRunner;
use crate::settings::DdcSettings;
use crate::tools::{install_hint, select_tool, ToolKind};
use crate::vcp::{VCP_BRIGHTNESS, VCP_CONTRAST, VCP_INPUT_SOURCE};
use crate::{Capabilities, EnhancedMonitor, Monitor, OsType};
use log::{debug, warn};
use std::rc::Rc;
use std::time::Duration;

pub struct LinuxTransport {
    runner: Rc<dyn CommandRunner>,
    settings: DdcSettings,
}

impl LinuxTransport {
    pub fn new(runner: Rc<dyn CommandRunner>, settings: DdcSettings) -> Self {
        LinuxTransport { runner, settings }
    }

    fn tool(&self) -> Option<ToolKind> {
        select_tool(&*self.runner, OsType::Linux, self.settings.preferred_tool)
    }

    fn require_tool(&self) -> Result<ToolKind> {
        self.tool().ok_or_else(|| DdcError::ToolNotFound {
            hint: install_hint(OsType::Linux).to_string(),
        })
    }

    fn read(&self, tool: ToolKind, id: &str, code: u8, timeout: Duration) -> Result<u16> {
        let out = commands::get_vcp(tool, id, code)?.run(&*self.runner, timeout)?;
        parse::parse_vcp_value(tool, &out)
    }

    /// Monitors `tool` reports. With `enhance`, each ddcutil monitor is also
    /// asked for its inputs and current input.
    fn detect_with_tool(&self, tool: ToolKind, enhance: bool) -> Result<Vec<Monitor>> {
        let out = commands::detect(tool)?.run(&*self.runner, self.settings.detect_timeout)?;
        let mut monitors = match tool {
            ToolKind::Ddcutil => parse::parse_ddcutil_detect(&out)?,
            _ => parse::parse_ddccontrol_probe(&out),
        };
        if monitors.is_empty() {
            return Err(DdcError::parse(format!("{} monitors", tool), &out));
        }
        if enhance && tool == ToolKind::Ddcutil {
            for monitor in &mut monitors {
                self.enhance(tool, monitor);
            }
        }
        Ok(monitors)
    }

    /// Inputs from the capability dump and the active input by name. Either
    /// step may fail without affecting the other.
    fn enhance(&self, tool: ToolKind, monitor: &mut Monitor) {
        match self.capabilities_with(tool, &monitor.id) {
            Ok(caps) => monitor.inputs = caps.supported_inputs,
            Err(e) => debug!("capabilities of display {}: {}", monitor.id, e),
        }
        match self.read(tool, &monitor.id, VCP_INPUT_SOURCE, self.settings.read_timeout) {
            Ok(0) => {}
            Ok(value) => monitor.current_input = input_value_to_name(value),
            Err(e) => debug!("current input of display {}: {}", monitor.id, e),
        }
    }

    fn detect_with_xrandr(&self) -> Result<Vec<Monitor>> {
        let args = ["--listmonitors".to_string()];
        let out = self
            .runner
            .output("xrandr", &args, self.settings.detect_timeout)?;
        let monitors = parse::parse_xrandr_listmonitors(&out);
        if monitors.is_empty() {
            return Err(DdcError::parse("xrandr monitors", &out));
        }
        Ok(monitors)
    }

    /// Tool detection, then `xrandr`. Zero monitors when both fail.
    fn find_monitors(&self, enhance: bool) -> Vec<Monitor> {
        let tool = self.tool();
        let found = Chain::new("Linux monitors")
            .then("DDC tool", || match tool {
                Some(tool) => self.detect_with_tool(tool, enhance),
                None => Err(DdcError::ToolNotFound {
                    hint: install_hint(OsType::Linux).to_string(),
                }),
            })
            .then("xrandr", || self.detect_with_xrandr())
            .run();

        found.unwrap_or_else(|e| {
            warn!("No monitors detected: {}", e);
            Vec::new()
        })
    }

    fn capabilities_with(&self, tool: ToolKind, id: &str) -> Result<Capabilities> {
        match tool {
            ToolKind::Ddcutil => {
                let out = commands::capabilities(tool, id)?
                    .run(&*self.runner, self.settings.detect_timeout)?;
                Ok(parse::parse_capabilities(&out))
            }
            // ddccontrol has no dump we parse; ask the two continuous controls
            _ => Ok(Capabilities {
                supported_inputs: Default::default(),
                supports_brightness: self
                    .read(tool, id, VCP_BRIGHTNESS, self.settings.probe_timeout)
                    .is_ok(),
                supports_contrast: self
                    .read(tool, id, VCP_CONTRAST, self.settings.probe_timeout)
                    .is_ok(),
            }),
        }
    }
}

impl Transport for LinuxTransport {
    fn os(&self) -> Option<OsType> {
        Some(OsType::Linux)
    }

    fn list_monitors(&self) -> Result<Vec<Monitor>> {
        Ok(self.find_monitors(false))
    }

    fn detect_monitors(&self) -> Result<Vec<Monitor>> {
        Ok(self.find_monitors(true))
    }

    fn detect_enhanced(&self) -> Result<Vec<EnhancedMonitor>> {
        let tool = self.tool();
        Ok(self
            .detect_monitors()?
            .into_iter()
            .map(|m| EnhancedMonitor::unvalidated(m, tool))
            .collect())
    }

    fn get_capabilities(&self, monitor_id: &str) -> Result<Capabilities> {
        self.capabilities_with(self.require_tool()?, monitor_id)
    }

    fn set_vcp(&self, monitor_id: &str, code: u8, value: u16) -> Result<()> {
        let tool = self.require_tool()?;
        commands::set_vcp(tool, monitor_id, code, value)?
            .run(&*self.runner, self.settings.write_timeout)
            .map(|_| ())
    }

    fn get_vcp(&self, monitor_id: &str, code: u8) -> Result<u16> {
        let tool = self.require_tool()?;
        self.read(tool, monitor_id, code, self.settings.read_timeout)
    }
}
