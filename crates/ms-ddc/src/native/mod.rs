//! In-process DDC/CI, without helper binaries.
//!
//! Only macOS has a binding today ([`macos`]).

#[cfg(target_os = "macos")]
pub mod macos;

use crate::error::{DdcError, Result};
use crate::Monitor;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One non-built-in display as the native layer sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeDisplay {
    pub id: u32,
    pub name: String,
    pub vendor: u32,
    pub model: u32,
    pub serial: u32,
}

impl NativeDisplay {
    pub fn to_monitor(&self) -> Monitor {
        let name = match self.name.trim() {
            "" => format!("Display {}", self.id),
            name => name.to_string(),
        };
        Monitor::bare(self.id.to_string(), name)
    }
}

/// Status codes of a native VCP exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeStatus {
    Ok = 0,
    /// No framebuffer service matched the display.
    NoDisplayService = -1,
    /// The display service rejected the transaction or sent a bad reply.
    AllBusesFailed = -2,
}

impl NativeStatus {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn message(self) -> &'static str {
        match self {
            NativeStatus::Ok => "success",
            NativeStatus::NoDisplayService => "no display service found for display",
            NativeStatus::AllBusesFailed => "DDC/CI transaction failed",
        }
    }

    pub fn into_error(self) -> DdcError {
        DdcError::Native {
            status: self.code(),
            message: self.message().to_string(),
        }
    }

    /// [`into_error`](Self::into_error) with the underlying cause appended.
    pub fn with_cause(self, cause: impl fmt::Display) -> DdcError {
        DdcError::Native {
            status: self.code(),
            message: format!("{}: {}", self.message(), cause),
        }
    }
}

/// Raw display enumeration and VCP access.
pub trait NativeDdc {
    /// Non-built-in displays. A failed enumeration yields an empty list.
    fn list_displays(&self) -> Result<Vec<NativeDisplay>>;

    /// [`list_displays`](Self::list_displays) as a JSON array.
    fn list_monitors_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.list_displays()?)?)
    }

    fn set_vcp(&self, display_id: u32, code: u8, value: u16) -> Result<()>;

    /// Returns `(current, max)`.
    fn get_vcp(&self, display_id: u32, code: u8) -> Result<(u16, u16)>;
}

/// The native binding for the running OS, if there is one.
pub fn platform() -> Option<Box<dyn NativeDdc>> {
    #[cfg(target_os = "macos")]
    {
        Some(Box::new(macos::IoKitDdc))
    }

    #[cfg(not(target_os = "macos"))]
    {
        None
    }
}
