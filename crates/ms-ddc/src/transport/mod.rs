//! OS-tagged DDC backends behind one capability set.
//!
//! Exactly one [`Transport`] is chosen per process, from the host OS, and
//! every client operation goes through it.

pub mod linux;
pub mod macos;
pub mod windows;

pub use linux::LinuxTransport;
pub use macos::MacTransport;
pub use windows::WindowsTransport;

use crate::error::{DdcError, Result};
use crate::runner::CommandRunner;
use crate::settings::DdcSettings;
use crate::{Capabilities, EnhancedMonitor, Monitor, OsType};
use std::rc::Rc;

/// Monitor discovery and VCP access on one operating system.
pub trait Transport {
    /// The OS this transport serves, `None` for [`UnsupportedTransport`].
    fn os(&self) -> Option<OsType>;

    /// Attached external monitors as the inventory reports them. Never
    /// validates or queries a display, so nothing on screen changes.
    fn list_monitors(&self) -> Result<Vec<Monitor>>;

    /// Attached external monitors with whatever each one reports about its
    /// inputs. Zero monitors is `Ok(vec![])`.
    fn detect_monitors(&self) -> Result<Vec<Monitor>>;

    /// [`detect_monitors`](Self::detect_monitors) plus whatever the backend
    /// confirmed about each monitor.
    fn detect_enhanced(&self) -> Result<Vec<EnhancedMonitor>> {
        Ok(self
            .detect_monitors()?
            .into_iter()
            .map(|m| EnhancedMonitor::unvalidated(m, None))
            .collect())
    }

    fn get_capabilities(&self, monitor_id: &str) -> Result<Capabilities>;

    fn set_vcp(&self, monitor_id: &str, code: u8, value: u16) -> Result<()>;

    /// Current value of VCP `code`.
    fn get_vcp(&self, monitor_id: &str, code: u8) -> Result<u16>;
}

/// The transport for `os`; an unrecognised host gets one that refuses
/// every operation.
pub fn for_os(
    os: Option<OsType>,
    runner: Rc<dyn CommandRunner>,
    settings: DdcSettings,
) -> Box<dyn Transport> {
    match os {
        Some(OsType::Linux) => Box::new(LinuxTransport::new(runner, settings)),
        Some(OsType::MacOs) => {
            let native = if settings.native_fallback {
                crate::native::platform()
            } else {
                None
            };
            Box::new(MacTransport::new(runner, settings, native))
        }
        Some(OsType::Windows) => Box::new(WindowsTransport),
        None => Box::new(UnsupportedTransport::new(std::env::consts::OS)),
    }
}

/// Stands in on hosts without a backend; every call fails with
/// [`DdcError::UnsupportedOs`].
pub struct UnsupportedTransport {
    os: String,
}

impl UnsupportedTransport {
    pub fn new(os: &str) -> Self {
        UnsupportedTransport { os: os.to_string() }
    }

    fn refuse<T>(&self) -> Result<T> {
        Err(DdcError::UnsupportedOs(self.os.clone()))
    }
}

impl Transport for UnsupportedTransport {
    fn os(&self) -> Option<OsType> {
        None
    }

    fn list_monitors(&self) -> Result<Vec<Monitor>> {
        self.refuse()
    }

    fn detect_monitors(&self) -> Result<Vec<Monitor>> {
        self.refuse()
    }

    fn get_capabilities(&self, _monitor_id: &str) -> Result<Capabilities> {
        self.refuse()
    }

    fn set_vcp(&self, _monitor_id: &str, _code: u8, _value: u16) -> Result<()> {
        self.refuse()
    }

    fn get_vcp(&self, _monitor_id: &str, _code: u8) -> Result<u16> {
        self.refuse()
    }
}

#[cfg(test)]
#[path = "../tests/transport_tests.rs"]
mod tests;
