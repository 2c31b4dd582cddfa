//! Host identity for diagnostics.
//!
//! Nothing here affects DDC behaviour. [`os_info`] never fails: a failing
//! probe is folded into the returned text.

pub mod linux;
pub mod macos;
pub mod windows;

pub use linux::LinuxInfo;
pub use macos::MacOsInfo;
pub use windows::WindowsInfo;

use crate::error::Result;
use crate::runner::CommandRunner;
use crate::OsType;
use log::warn;
use std::path::Path;
use std::time::Duration;

/// Kernel identity as reported by `uname(2)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KernelInfo {
    pub name: String,
    pub release: String,
    pub version: String,
    pub machine: String,
}

#[cfg(unix)]
pub fn uname() -> Result<KernelInfo> {
    fn field(raw: &[libc::c_char]) -> String {
        let bytes: Vec<u8> = raw
            .iter()
            .take_while(|&&c| c != 0)
            .map(|&c| c as u8)
            .collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    let mut uts: libc::utsname = unsafe { std::mem::zeroed() };
    if unsafe { libc::uname(&mut uts) } != 0 {
        return Err(std::io::Error::last_os_error().into());
    }
    Ok(KernelInfo {
        name: field(&uts.sysname),
        release: field(&uts.release),
        version: field(&uts.version),
        machine: field(&uts.machine),
    })
}

#[cfg(not(unix))]
pub fn uname() -> Result<KernelInfo> {
    Err(crate::DdcError::UnsupportedOs(std::env::consts::OS.to_string()))
}

/// `"<OS> (<product> <version>)"`, or `"<OS> (Error: <cause>)"`.
pub fn os_info(runner: &dyn CommandRunner, os: OsType, timeout: Duration) -> String {
    let summary = match os {
        OsType::Linux => linux::detect_linux_info(Path::new("/")).map(|i| i.summary()),
        OsType::MacOs => {
            macos::detect_macos_info(runner, Path::new(macos::SYSTEM_VERSION_PLIST), timeout)
                .map(|i| i.summary())
        }
        OsType::Windows => windows::detect_windows_info(runner, timeout).map(|i| i.summary()),
    };
    format_os_info(os, summary)
}

fn format_os_info(os: OsType, summary: Result<String>) -> String {
    match summary {
        Ok(summary) => format!("{} ({})", os, summary),
        Err(e) => {
            warn!("Could not identify {} release: {}", os, e);
            format!("{} (Error: {})", os, e)
        }
    }
}

/// `"<name> <version>"` without dangling whitespace.
fn join_name_version(name: &str, version: &str) -> String {
    format!("{} {}", name.trim(), version.trim()).trim().to_string()
}

#[cfg(test)]
#[path = "../tests/platform_tests.rs"]
mod tests;
