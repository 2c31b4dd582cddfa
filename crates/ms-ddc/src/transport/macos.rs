//! macOS backend: `system_profiler` inventory, `m1ddc`/`ddcctl` for VCP
//! access, the IOKit binding when no helper is installed.
//!
//! Monitor IDs are system display IDs. The helpers number displays from 1 in
//! inventory order, so every helper call first maps the ID to its position
//! in the last inventory taken.

use super::Transport;
use crate::commands;
use crate::error::{DdcError, Result};
use crate::fallback::Chain;
use crate::inputs::{canonical_input_map, mac_input_value_to_name, MAC_CANONICAL_INPUTS};
use crate::native::NativeDdc;
use crate::parse;
use crate::runner::CommandRunner;
use crate::settings::DdcSettings;
use crate::tools::{install_hint, select_tool, ToolKind};
use crate::validate::{validate, ToolProbe, ValidationOutcome};
use crate::vcp::{VCP_BRIGHTNESS, VCP_CONTRAST, VCP_INPUT_SOURCE};
use crate::{Capabilities, EnhancedMonitor, Monitor, OsType};
use log::{debug, info, warn};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

pub struct MacTransport {
    runner: Rc<dyn CommandRunner>,
    settings: DdcSettings,
    native: Option<Box<dyn NativeDdc>>,
    /// Display IDs of the last successful inventory, in helper order.
    inventory: RefCell<Option<Vec<String>>>,
}

impl MacTransport {
    pub fn new(
        runner: Rc<dyn CommandRunner>,
        settings: DdcSettings,
        native: Option<Box<dyn NativeDdc>>,
    ) -> Self {
        MacTransport {
            runner,
            settings,
            native,
            inventory: RefCell::new(None),
        }
    }

    fn tool(&self) -> Option<ToolKind> {
        select_tool(&*self.runner, OsType::MacOs, self.settings.preferred_tool)
    }

    /// External displays: `system_profiler`, else the native display list.
    fn base_displays(&self) -> Result<Vec<Monitor>> {
        let mut chain = Chain::new("macOS displays").then("system_profiler", || {
            let args = ["SPDisplaysDataType".to_string(), "-json".to_string()];
            let out = self
                .runner
                .output("system_profiler", &args, self.settings.detect_timeout)?;
            parse::parse_system_profiler_displays(&out)
        });
        if let Some(native) = &self.native {
            chain = chain.then("IOKit", move || {
                parse::parse_native_monitors_json(&native.list_monitors_json()?)
            });
        }
        let displays = chain.run()?;
        *self.inventory.borrow_mut() = Some(displays.iter().map(|m| m.id.clone()).collect());
        Ok(displays)
    }

    fn cached_position(&self, monitor_id: &str) -> Option<usize> {
        self.inventory
            .borrow()
            .as_ref()?
            .iter()
            .position(|id| id == monitor_id)
    }

    /// 1-based helper display number for a monitor ID. IDs missing from the
    /// inventory are taken as helper numbers already.
    fn display_number(&self, monitor_id: &str) -> Result<String> {
        let position = self.cached_position(monitor_id).or_else(|| {
            self.base_displays()
                .ok()?
                .iter()
                .position(|m| m.id == monitor_id)
        });
        if let Some(pos) = position {
            return Ok((pos + 1).to_string());
        }
        match monitor_id.trim().parse::<u32>() {
            Ok(n) if n > 0 => Ok(n.to_string()),
            _ => Err(DdcError::InvalidMonitorId(monitor_id.to_string())),
        }
    }

    fn native_id(monitor_id: &str) -> Result<u32> {
        monitor_id
            .trim()
            .parse()
            .map_err(|_| DdcError::InvalidMonitorId(monitor_id.to_string()))
    }

    fn no_transport() -> DdcError {
        DdcError::ToolNotFound {
            hint: install_hint(OsType::MacOs).to_string(),
        }
    }

    fn read_with(&self, tool: ToolKind, display: &str, code: u8, timeout: Duration) -> Result<u16> {
        let out = commands::get_vcp(tool, display, code)?.run(&*self.runner, timeout)?;
        parse::parse_vcp_value(tool, &out)
    }

    fn write_with(
        &self,
        tool: ToolKind,
        display: &str,
        code: u8,
        value: u16,
        timeout: Duration,
    ) -> Result<()> {
        commands::set_vcp(tool, display, code, value)?
            .run(&*self.runner, timeout)
            .map(|_| ())
    }

    /// Active input code, `None` when unreadable or reported as 0.
    fn current_input_code(&self, tool: ToolKind, display: &str) -> Option<u16> {
        match self.read_with(tool, display, VCP_INPUT_SOURCE, self.settings.read_timeout) {
            Ok(0) => None,
            Ok(code) => Some(code),
            Err(e) => {
                debug!("current input of display {}: {}", display, e);
                None
            }
        }
    }

    /// Switch through every known input and keep the ones the helper
    /// accepts, then switch back to `restore`.
    fn probe_inputs(&self, tool: ToolKind, display: &str, restore: Option<u16>) -> BTreeMap<String, u8> {
        let mut found = BTreeMap::new();
        for (name, code) in MAC_CANONICAL_INPUTS {
            let timeout = self.settings.probe_timeout;
            match self.write_with(tool, display, VCP_INPUT_SOURCE, u16::from(*code), timeout) {
                Ok(()) => {
                    found.insert(name.to_string(), *code);
                }
                Err(e) => debug!("input {} on display {}: {}", name, display, e),
            }
        }
        if let Some(code) = restore {
            let timeout = self.settings.write_timeout;
            if let Err(e) = self.write_with(tool, display, VCP_INPUT_SOURCE, code, timeout) {
                warn!("Could not switch display {} back to input {}: {}", display, code, e);
            }
        }
        found
    }

    fn enhance(&self, monitor: Monitor, display: &str, tool: Option<ToolKind>) -> EnhancedMonitor {
        let mut enhanced = EnhancedMonitor::unvalidated(monitor, tool);
        let Some(tool) = tool else {
            warn!("Display {} ({}): No DDC tools installed", display, enhanced.monitor.name);
            enhanced.validation = Some(validate(None, OsType::MacOs, Duration::ZERO));
            return enhanced;
        };

        let outcome = if self.settings.validate {
            let probe = ToolProbe {
                runner: &*self.runner,
                tool,
                display: display.to_string(),
                read_timeout: self.settings.read_timeout,
                write_timeout: self.settings.write_timeout,
            };
            let result = validate(Some(&probe), OsType::MacOs, self.settings.settle_delay);
            let outcome = result.outcome;
            enhanced.validation = Some(result);
            outcome
        } else {
            ValidationOutcome::FullySupported
        };

        let name = enhanced.monitor.name.clone();
        let suggestion = enhanced
            .validation
            .as_ref()
            .and_then(|v| v.recommended_action.clone())
            .unwrap_or_default();
        let cause = enhanced
            .validation
            .as_ref()
            .and_then(|v| v.validation_error.clone())
            .unwrap_or_default();

        match outcome {
            ValidationOutcome::FullySupported => {
                info!("Display {} ({}): Full DDC/CI support", display, name);
                let current = self.current_input_code(tool, display);
                if let Some(code) = current {
                    enhanced.monitor.current_input = mac_input_value_to_name(code);
                }
                if self.settings.probe_inputs {
                    let probed = self.probe_inputs(tool, display, current);
                    enhanced.supported_inputs = probed.clone();
                    enhanced.monitor.inputs = probed;
                } else {
                    enhanced.monitor.inputs = canonical_input_map(OsType::MacOs);
                }
                enhanced.ddc_supported = true;
            }
            ValidationOutcome::WriteIneffective => {
                warn!("Display {} ({}): Limited DDC support - {}", display, name, cause);
                warn!("  Suggestion: {}", suggestion);
                if let Some(code) = self.current_input_code(tool, display) {
                    enhanced.monitor.current_input =
                        format!("{} (read-only)", mac_input_value_to_name(code));
                }
                enhanced.monitor.inputs.clear();
                enhanced.ddc_supported = false;
            }
            ValidationOutcome::ReadFailed | ValidationOutcome::Unsupported => {
                warn!("Display {} ({}): {}", display, name, cause);
                warn!("  Suggestion: {}", suggestion);
                enhanced.ddc_supported = false;
            }
        }
        enhanced
    }
}

impl Transport for MacTransport {
    fn os(&self) -> Option<OsType> {
        Some(OsType::MacOs)
    }

    /// The inventory alone: no helper is run against any display.
    fn list_monitors(&self) -> Result<Vec<Monitor>> {
        match self.base_displays() {
            Ok(displays) => Ok(displays),
            Err(e) => {
                warn!("No monitors detected: {}", e);
                Ok(Vec::new())
            }
        }
    }

    fn detect_monitors(&self) -> Result<Vec<Monitor>> {
        Ok(self
            .detect_enhanced()?
            .into_iter()
            .map(|e| e.monitor)
            .collect())
    }

    /// Validation runs display by display, never interleaved: each round
    /// trip changes live brightness.
    fn detect_enhanced(&self) -> Result<Vec<EnhancedMonitor>> {
        let displays = match self.base_displays() {
            Ok(displays) => displays,
            Err(e) => {
                warn!("No monitors detected: {}", e);
                return Ok(Vec::new());
            }
        };

        let tool = self.tool();
        Ok(displays
            .into_iter()
            .enumerate()
            .map(|(i, monitor)| self.enhance(monitor, &(i + 1).to_string(), tool))
            .collect())
    }

    fn get_capabilities(&self, monitor_id: &str) -> Result<Capabilities> {
        let supports = |code: u8| match self.get_vcp(monitor_id, code) {
            Ok(_) => Ok(true),
            Err(e @ DdcError::ToolNotFound { .. }) | Err(e @ DdcError::InvalidMonitorId(_)) => Err(e),
            Err(e) => {
                debug!("VCP 0x{:02X} on {}: {}", code, monitor_id, e);
                Ok(false)
            }
        };
        Ok(Capabilities {
            supports_brightness: supports(VCP_BRIGHTNESS)?,
            supports_contrast: supports(VCP_CONTRAST)?,
            supported_inputs: canonical_input_map(OsType::MacOs),
        })
    }

    fn set_vcp(&self, monitor_id: &str, code: u8, value: u16) -> Result<()> {
        if let Some(tool) = self.tool() {
            let display = self.display_number(monitor_id)?;
            return self.write_with(tool, &display, code, value, self.settings.write_timeout);
        }
        match &self.native {
            Some(native) => native.set_vcp(Self::native_id(monitor_id)?, code, value),
            None => Err(Self::no_transport()),
        }
    }

    fn get_vcp(&self, monitor_id: &str, code: u8) -> Result<u16> {
        if let Some(tool) = self.tool() {
            let display = self.display_number(monitor_id)?;
            return self.read_with(tool, &display, code, self.settings.read_timeout);
        }
        match &self.native {
            Some(native) => native
                .get_vcp(Self::native_id(monitor_id)?, code)
                .map(|(current, _max)| current),
            None => Err(Self::no_transport()),
        }
    }
}
