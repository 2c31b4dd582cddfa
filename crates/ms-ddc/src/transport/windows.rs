//! Windows backend placeholder.
//!
//! Neither ControlMyMonitor nor ddccci is driven yet; the host probe and
//! tool scan work on Windows, monitor access does not.

use super::Transport;
use crate::error::{DdcError, Result};
use crate::{Capabilities, Monitor, OsType};

pub struct WindowsTransport;

impl Transport for WindowsTransport {
    fn os(&self) -> Option<OsType> {
        Some(OsType::Windows)
    }

    fn list_monitors(&self) -> Result<Vec<Monitor>> {
        Err(DdcError::NotImplemented("Windows DDC"))
    }

    fn detect_monitors(&self) -> Result<Vec<Monitor>> {
        Err(DdcError::NotImplemented("Windows DDC"))
    }

    fn get_capabilities(&self, _monitor_id: &str) -> Result<Capabilities> {
        Err(DdcError::NotImplemented("Windows capabilities"))
    }

    fn set_vcp(&self, _monitor_id: &str, _code: u8, _value: u16) -> Result<()> {
        Err(DdcError::NotImplemented("Windows VCP setting"))
    }

    fn get_vcp(&self, _monitor_id: &str, _code: u8) -> Result<u16> {
        Err(DdcError::NotImplemented("Windows VCP getting"))
    }
}
