//! Windows product and build identity.
//!
//! Sources in order: the registry, `systeminfo`, WMI, `ver`. The registry
//! and WMI steps only exist on Windows builds; elsewhere they fail and the
//! chain moves on.

use super::join_name_version;
use crate::error::{DdcError, Result};
use crate::fallback::Chain;
use crate::runner::CommandRunner;
use chrono::DateTime;
use lazy_static::lazy_static;
use regex::Regex;
use std::time::Duration;

lazy_static! {
    static ref SYSTEMINFO_VERSION_RE: Option<Regex> = Regex::new(r"(\d+\.\d+\.\d+).*Build (\d+)").ok();
    static ref VER_RE: Option<Regex> = Regex::new(r"Microsoft Windows \[Version ([^\]]+)\]").ok();
}

#[cfg(windows)]
const CURRENT_VERSION_KEY: &str = r"SOFTWARE\Microsoft\Windows NT\CurrentVersion";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowsInfo {
    /// "Windows 10 Pro"
    pub product_name: String,
    /// "10.0.22631" or the registry's "6.3"
    pub version: String,
    pub build: String,
    /// "23H2"
    pub display_version: String,
    pub edition: String,
    pub architecture: String,
    pub install_date: String,
    pub registered_owner: String,
    pub system_root: String,
}

impl WindowsInfo {
    pub fn summary(&self) -> String {
        join_name_version(&self.product_name, &self.version)
    }
}

pub fn detect_windows_info(runner: &dyn CommandRunner, timeout: Duration) -> Result<WindowsInfo> {
    Chain::new("Windows version")
        .then("registry", registry_info)
        .then("systeminfo", || {
            parse_systeminfo(&runner.output("systeminfo", &[], timeout)?)
        })
        .then("WMI", wmi_info)
        .then("ver", || {
            let args = ["/c".to_string(), "ver".to_string()];
            parse_ver(&runner.output("cmd", &args, timeout)?)
        })
        .run()
}

/// `PROCESSOR_ARCHITECTURE`, then `PROCESSOR_ARCHITEW6432`, then the build
/// target.
pub fn windows_architecture() -> String {
    ["PROCESSOR_ARCHITECTURE", "PROCESSOR_ARCHITEW6432"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|v| !v.trim().is_empty())
        .unwrap_or_else(|| {
            match std::env::consts::ARCH {
                "x86_64" => "AMD64",
                "x86" => "x86",
                "aarch64" => "ARM64",
                "arm" => "ARM",
                other => other,
            }
            .to_string()
        })
}

/// Registry `InstallDate` (Unix seconds) as a UTC timestamp.
pub fn format_install_date(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| secs.to_string())
}

#[cfg(windows)]
fn registry_info() -> Result<WindowsInfo> {
    use winreg::enums::{HKEY_LOCAL_MACHINE, KEY_QUERY_VALUE};
    use winreg::RegKey;

    let key = RegKey::predef(HKEY_LOCAL_MACHINE)
        .open_subkey_with_flags(CURRENT_VERSION_KEY, KEY_QUERY_VALUE)?;
    let text = |name: &str| key.get_value::<String, _>(name).unwrap_or_default();

    let info = WindowsInfo {
        product_name: text("ProductName"),
        version: text("CurrentVersion"),
        build: text("CurrentBuild"),
        display_version: text("DisplayVersion"),
        edition: text("EditionID"),
        architecture: windows_architecture(),
        install_date: key
            .get_value::<u32, _>("InstallDate")
            .map(|secs| format_install_date(secs as i64))
            .unwrap_or_default(),
        registered_owner: text("RegisteredOwner"),
        system_root: text("SystemRoot"),
    };
    if info.product_name.is_empty() && info.version.is_empty() && info.build.is_empty() {
        return Err(DdcError::parse("registry", ""));
    }
    Ok(info)
}

#[cfg(not(windows))]
fn registry_info() -> Result<WindowsInfo> {
    Err(DdcError::UnsupportedOs(std::env::consts::OS.to_string()))
}

#[cfg(windows)]
fn wmi_info() -> Result<WindowsInfo> {
    use serde::Deserialize;
    use std::io;
    use wmi::{COMLibrary, WMIConnection};

    #[derive(Deserialize, Debug)]
    #[serde(rename = "Win32_OperatingSystem")]
    #[serde(rename_all = "PascalCase")]
    struct OperatingSystem {
        caption: Option<String>,
        version: Option<String>,
        build_number: Option<String>,
        #[serde(rename = "OSArchitecture")]
        os_architecture: Option<String>,
    }

    let wmi_err = |e: wmi::WMIError| DdcError::Io(io::Error::new(io::ErrorKind::Other, e.to_string()));
    let com = COMLibrary::new().map_err(wmi_err)?;
    let conn = WMIConnection::new(com).map_err(wmi_err)?;
    let rows: Vec<OperatingSystem> = conn
        .raw_query("SELECT Caption, Version, BuildNumber, OSArchitecture FROM Win32_OperatingSystem")
        .map_err(wmi_err)?;

    let os = rows
        .into_iter()
        .next()
        .ok_or_else(|| DdcError::parse("Win32_OperatingSystem", ""))?;
    let info = WindowsInfo {
        product_name: os.caption.unwrap_or_default(),
        version: os.version.unwrap_or_default(),
        build: os.build_number.unwrap_or_default(),
        architecture: os.os_architecture.unwrap_or_default(),
        ..WindowsInfo::default()
    };
    if info.product_name.is_empty() && info.version.is_empty() {
        return Err(DdcError::parse("Win32_OperatingSystem", ""));
    }
    Ok(info)
}

#[cfg(not(windows))]
fn wmi_info() -> Result<WindowsInfo> {
    Err(DdcError::UnsupportedOs(std::env::consts::OS.to_string()))
}

/// `Key: value` lines of `systeminfo`.
pub fn parse_systeminfo(output: &str) -> Result<WindowsInfo> {
    let version_re = SYSTEMINFO_VERSION_RE
        .as_ref()
        .ok_or_else(|| DdcError::parse("systeminfo pattern", ""))?;

    let mut info = WindowsInfo::default();
    for line in output.lines().map(str::trim) {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();
        match key.trim() {
            "OS Name" => info.product_name = value,
            "OS Version" => {
                if let Some(caps) = version_re.captures(&value) {
                    info.version = caps[1].to_string();
                    info.build = caps[2].to_string();
                }
            }
            "System Type" => info.architecture = value,
            "Original Install Date" => info.install_date = value,
            "Registered Owner" => info.registered_owner = value,
            "Windows Directory" => info.system_root = value,
            _ => {}
        }
    }
    if info.product_name.is_empty() && info.version.is_empty() {
        return Err(DdcError::parse("systeminfo", output));
    }
    Ok(info)
}

/// `Microsoft Windows [Version 10.0.22631.4317]`.
pub fn parse_ver(output: &str) -> Result<WindowsInfo> {
    let caps = VER_RE
        .as_ref()
        .and_then(|re| re.captures(output))
        .ok_or_else(|| DdcError::parse("ver", output))?;
    let version = caps[1].trim().to_string();
    Ok(WindowsInfo {
        product_name: "Microsoft Windows".to_string(),
        build: version.split('.').nth(2).unwrap_or_default().to_string(),
        version,
        architecture: windows_architecture(),
        ..WindowsInfo::default()
    })
}
