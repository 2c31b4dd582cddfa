//! macOS product, kernel and hardware model identity.

use super::{join_name_version, uname, KernelInfo};
use crate::error::{DdcError, Result};
use crate::fallback::Chain;
use crate::runner::CommandRunner;
use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const SYSTEM_VERSION_PLIST: &str = "/System/Library/CoreServices/SystemVersion.plist";

lazy_static! {
    static ref PLIST_KEY_RE: Option<Regex> = Regex::new(r"<key>([^<]*)</key>").ok();
    static ref PLIST_STRING_RE: Option<Regex> = Regex::new(r"<string>([^<]*)</string>").ok();
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacOsInfo {
    /// "macOS"
    pub product_name: String,
    /// "15.6"
    pub product_version: String,
    pub build_version: String,
    pub kernel: KernelInfo,
    /// "MacBook Pro"
    pub model_name: String,
    /// "MacBookPro18,3"
    pub model_id: String,
}

impl MacOsInfo {
    pub fn summary(&self) -> String {
        join_name_version(&self.product_name, &self.product_version)
    }
}

/// Product version from `sw_vers`, else the SystemVersion plist at
/// `plist`; then the hardware model, best effort.
pub fn detect_macos_info(
    runner: &dyn CommandRunner,
    plist: &Path,
    timeout: Duration,
) -> Result<MacOsInfo> {
    let mut info = Chain::new("macOS version")
        .then("sw_vers", || parse_sw_vers(&runner.output("sw_vers", &[], timeout)?))
        .then("SystemVersion.plist", || {
            parse_system_version_plist(&fs::read_to_string(plist)?)
        })
        .run()?;

    match uname() {
        Ok(kernel) => info.kernel = kernel,
        Err(e) => warn!("Could not get kernel info: {}", e),
    }

    let (model_name, model_id) = hardware_model(runner, timeout);
    info.model_name = model_name;
    info.model_id = model_id;
    Ok(info)
}

/// `system_profiler SPHardwareDataType`, falling back to `sysctl hw.model`.
fn hardware_model(runner: &dyn CommandRunner, timeout: Duration) -> (String, String) {
    let args = ["SPHardwareDataType".to_string()];
    match runner.output("system_profiler", &args, timeout) {
        Ok(out) => {
            let model = parse_hardware_overview(&out);
            if !model.0.is_empty() || !model.1.is_empty() {
                return model;
            }
        }
        Err(e) => debug!("system_profiler: {}", e),
    }

    let args = ["-n".to_string(), "hw.model".to_string()];
    match runner.output("sysctl", &args, timeout) {
        Ok(out) => (out.trim().to_string(), String::new()),
        Err(e) => {
            debug!("sysctl: {}", e);
            (String::new(), String::new())
        }
    }
}

fn colon_value<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let (key, value) = line.split_once(':')?;
    (key.trim() == label).then(|| value.trim())
}

/// `ProductName:`, `ProductVersion:` and `BuildVersion:` lines.
pub fn parse_sw_vers(output: &str) -> Result<MacOsInfo> {
    let mut info = MacOsInfo::default();
    for line in output.lines() {
        if let Some(v) = colon_value(line, "ProductName") {
            info.product_name = v.to_string();
        } else if let Some(v) = colon_value(line, "ProductVersion") {
            info.product_version = v.to_string();
        } else if let Some(v) = colon_value(line, "BuildVersion") {
            info.build_version = v.to_string();
        }
    }
    if info.product_name.is_empty() && info.product_version.is_empty() {
        return Err(DdcError::parse("sw_vers", output));
    }
    Ok(info)
}

/// The flat `<key>`/`<string>` dictionary of SystemVersion.plist. Unequal key
/// and string counts mean the file cannot be trusted.
pub fn parse_system_version_plist(xml: &str) -> Result<MacOsInfo> {
    let (Some(key_re), Some(string_re)) = (PLIST_KEY_RE.as_ref(), PLIST_STRING_RE.as_ref()) else {
        return Err(DdcError::parse("plist pattern", ""));
    };

    let keys: Vec<&str> = key_re
        .captures_iter(xml)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    let values: Vec<&str> = string_re
        .captures_iter(xml)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    if keys.len() != values.len() {
        return Err(DdcError::Protocol(format!(
            "malformed plist: {} keys but {} values",
            keys.len(),
            values.len()
        )));
    }

    let mut info = MacOsInfo::default();
    for (key, value) in keys.iter().zip(values) {
        match *key {
            "ProductName" => info.product_name = value.to_string(),
            "ProductVersion" => info.product_version = value.to_string(),
            "ProductBuildVersion" => info.build_version = value.to_string(),
            _ => {}
        }
    }
    if info.product_name.is_empty() && info.product_version.is_empty() {
        return Err(DdcError::parse("SystemVersion.plist", xml));
    }
    Ok(info)
}

/// `(Model Name, Model Identifier)` from the hardware overview.
pub fn parse_hardware_overview(output: &str) -> (String, String) {
    let mut name = String::new();
    let mut id = String::new();
    for line in output.lines() {
        if let Some(v) = colon_value(line, "Model Name") {
            name = v.to_string();
        } else if let Some(v) = colon_value(line, "Model Identifier") {
            id = v.to_string();
        }
    }
    (name, id)
}
