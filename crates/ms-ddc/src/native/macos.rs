//! DDC/CI over IOKit, through `ddc-macos`.
//!
//! `ddc-macos` finds the I2C service behind each CoreGraphics display and
//! the `ddc` crate frames the VCP requests and checks the replies. Displays
//! are enumerated again on every call, so one unplugged in between reports
//! [`NativeStatus::NoDisplayService`].

use super::{NativeDdc, NativeDisplay, NativeStatus};
use crate::error::Result;
use ddc::Ddc;
use ddc_macos::Monitor;
use log::{debug, warn};

/// The IOKit native transport.
#[derive(Debug, Default, Clone, Copy)]
pub struct IoKitDdc;

/// Attached displays minus built-in panels. Enumeration failure is an empty
/// list.
fn external_monitors() -> Vec<Monitor> {
    match Monitor::enumerate() {
        Ok(monitors) => monitors
            .into_iter()
            .filter(|m| !m.handle().is_builtin())
            .collect(),
        Err(e) => {
            warn!("Could not enumerate displays: {}", e);
            Vec::new()
        }
    }
}

fn find(display_id: u32) -> Result<Monitor> {
    external_monitors()
        .into_iter()
        .find(|m| m.handle().id == display_id)
        .ok_or_else(|| NativeStatus::NoDisplayService.into_error())
}

fn describe(monitor: &Monitor) -> NativeDisplay {
    let display = monitor.handle();
    NativeDisplay {
        id: display.id,
        name: monitor
            .product_name()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| format!("Display {}", display.id)),
        vendor: display.vendor_number(),
        model: display.model_number(),
        serial: display.serial_number(),
    }
}

impl NativeDdc for IoKitDdc {
    fn list_displays(&self) -> Result<Vec<NativeDisplay>> {
        Ok(external_monitors().iter().map(describe).collect())
    }

    fn set_vcp(&self, display_id: u32, code: u8, value: u16) -> Result<()> {
        let mut monitor = find(display_id)?;
        monitor.set_vcp_feature(code, value).map_err(|e| {
            debug!("display {}: set VCP 0x{:02X}: {}", display_id, code, e);
            NativeStatus::AllBusesFailed.with_cause(e)
        })
    }

    fn get_vcp(&self, display_id: u32, code: u8) -> Result<(u16, u16)> {
        let mut monitor = find(display_id)?;
        let value = monitor.get_vcp_feature(code).map_err(|e| {
            debug!("display {}: get VCP 0x{:02X}: {}", display_id, code, e);
            NativeStatus::AllBusesFailed.with_cause(e)
        })?;
        Ok((value.value(), value.maximum()))
    }
}
