//! Tolerant parsers for helper output.
//!
//! Helper output drifts between versions, so value parsers try an ordered
//! list of patterns and take the first hit. Nothing here guesses: when every
//! pattern misses the caller gets [`DdcError::Parse`] with the raw output.

use crate::error::{DdcError, Result};
use crate::inputs::input_code_to_name;
use crate::native::NativeDisplay;
use crate::tools::ToolKind;
use crate::{generic_name, Capabilities, Monitor};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;

/// `(pattern, radix of group 1)`, tried in order.
type PatternSet = &'static [(&'static str, u32)];

const DDCUTIL_VALUE_PATTERNS: PatternSet = &[
    (r"current value\s*=\s*(\d+)", 10),
    (r"sl=0x([0-9a-fA-F]{1,4})", 16),
];

const DDCCTL_VALUE_PATTERNS: PatternSet = &[
    (r"current:\s*(\d+)", 10),
    (r"control\s+#\d+\s+=\s+(\d+)", 10),
    (r"brightness\s*=\s*(\d+)", 10),
    (r"contrast\s*=\s*(\d+)", 10),
    (r"volume\s*=\s*(\d+)", 10),
    (r"input\s*=\s*(\d+)", 10),
    (r"(\d+)", 10),
];

const M1DDC_VALUE_PATTERNS: PatternSet = &[
    (r"luminance:\s*(\d+)", 10),
    (r"contrast:\s*(\d+)", 10),
    (r"volume:\s*(\d+)", 10),
    (r"input:\s*(\d+)", 10),
    (r"^\s*(\d+)\s*$", 10),
];

const DDCCONTROL_VALUE_PATTERN: &str = r"Control\s+0x[0-9a-fA-F]+:\s*[+-]/(\d+)/(\d+)";

const DDCUTIL_DISPLAY_PATTERN: &str = r"^Display (\d+)";

lazy_static! {
    static ref DDCUTIL_VALUE_RE: Vec<(Regex, u32)> = compile(DDCUTIL_VALUE_PATTERNS);
    static ref DDCCTL_VALUE_RE: Vec<(Regex, u32)> = compile(DDCCTL_VALUE_PATTERNS);
    static ref M1DDC_VALUE_RE: Vec<(Regex, u32)> = compile(M1DDC_VALUE_PATTERNS);
    static ref DDCCONTROL_VALUE_RE: Option<Regex> = Regex::new(DDCCONTROL_VALUE_PATTERN).ok();
    static ref DDCUTIL_DISPLAY_RE: Option<Regex> = Regex::new(DDCUTIL_DISPLAY_PATTERN).ok();
}

fn compile(patterns: PatternSet) -> Vec<(Regex, u32)> {
    patterns
        .iter()
        .filter_map(|(pattern, radix)| Regex::new(pattern).ok().map(|re| (re, *radix)))
        .collect()
}

/// Known display vendor IDs, as the lowercase hex `system_profiler` prints.
const KNOWN_VENDORS: &[(&str, &str)] = &[
    ("610", "Apple"),
    ("5e3", "ASUS"),
    ("10ac", "Dell"),
    ("1e6d", "LG"),
    ("4c2d", "Samsung"),
];

/// First pattern whose group 1 parses as a number in its radix.
fn first_capture(output: &str, patterns: &[(Regex, u32)]) -> Option<u16> {
    patterns.iter().find_map(|(re, radix)| {
        let caps = re.captures(output)?;
        u16::from_str_radix(caps.get(1)?.as_str(), *radix).ok()
    })
}

fn value_or_parse_error(value: Option<u16>, output: &str) -> Result<u16> {
    value.ok_or_else(|| DdcError::parse("value", output))
}

// ── Value parsers ────────────────────────────────────────────────

/// `VCP code 0x10 (Brightness): current value = 50, max value = 100`, or the
/// `sl=0x11` form ddcutil prints for non-continuous features.
pub fn parse_ddcutil_value(output: &str) -> Result<u16> {
    let output = output.trim();
    value_or_parse_error(first_capture(output, &DDCUTIL_VALUE_RE), output)
}

/// `current: 75, max: 100`, `control #16 = 75`, `brightness = 75`, or a
/// bare number.
pub fn parse_ddcctl_value(output: &str) -> Result<u16> {
    let output = output.trim();
    value_or_parse_error(first_capture(output, &DDCCTL_VALUE_RE), output)
}

/// `Current luminance: 75` or a bare `75`.
pub fn parse_m1ddc_value(output: &str) -> Result<u16> {
    let output = output.trim();
    value_or_parse_error(first_capture(output, &M1DDC_VALUE_RE), output)
}

/// `Control 0x10: +/50/100 C [Brightness]` → `(current, max)`.
pub fn parse_ddccontrol_value(output: &str) -> Result<(u16, u16)> {
    let output = output.trim();
    DDCCONTROL_VALUE_RE
        .as_ref()
        .and_then(|re| re.captures(output))
        .and_then(|caps| {
            let cur = caps.get(1)?.as_str().parse().ok()?;
            let max = caps.get(2)?.as_str().parse().ok()?;
            Some((cur, max))
        })
        .ok_or_else(|| DdcError::parse("value", output))
}

/// Current value of a VCP read through `tool`.
pub fn parse_vcp_value(tool: ToolKind, output: &str) -> Result<u16> {
    match tool {
        ToolKind::Ddcutil => parse_ddcutil_value(output),
        ToolKind::Ddcctl => parse_ddcctl_value(output),
        ToolKind::M1ddc => parse_m1ddc_value(output),
        ToolKind::Ddccontrol => parse_ddccontrol_value(output).map(|(cur, _)| cur),
        ToolKind::ControlMyMonitor | ToolKind::Ddccci => {
            Err(DdcError::NotImplemented("Windows VCP getting"))
        }
    }
}

// ── Detection parsers ────────────────────────────────────────────

fn field<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let (_, rest) = line.split_once(label)?;
    let rest = rest.trim();
    (!rest.is_empty()).then_some(rest)
}

/// Split `ddcutil detect` into one [`Monitor`] per `Display N` block, in
/// transcript order. `Invalid display` blocks are dropped.
pub fn parse_ddcutil_detect(output: &str) -> Result<Vec<Monitor>> {
    let header = DDCUTIL_DISPLAY_RE
        .as_ref()
        .ok_or_else(|| DdcError::parse("pattern", DDCUTIL_DISPLAY_PATTERN))?;

    let mut monitors = Vec::new();
    let mut current: Option<(String, Option<String>, Option<String>)> = None;

    let mut flush = |current: &mut Option<(String, Option<String>, Option<String>)>| {
        if let Some((id, mfg, model)) = current.take() {
            let name = match (mfg, model) {
                (Some(mfg), Some(model)) => format!("{} {}", mfg, model),
                (Some(only), None) | (None, Some(only)) => only,
                (None, None) => String::new(),
            };
            monitors.push(Monitor::bare(id, name));
        }
    };

    for line in output.lines().map(str::trim) {
        if let Some(caps) = header.captures(line) {
            flush(&mut current);
            current = caps.get(1).map(|id| (id.as_str().to_string(), None, None));
            continue;
        }
        if line.starts_with("Invalid display") {
            flush(&mut current);
            continue;
        }
        let Some((_, mfg, model)) = current.as_mut() else {
            continue;
        };
        if let Some(value) = field(line, "Mfg id:") {
            *mfg = Some(value.to_string());
        } else if let Some(value) = field(line, "Model:") {
            *model = Some(value.to_string());
        }
    }
    flush(&mut current);

    Ok(monitors)
}

fn hex_byte(token: &str) -> Option<u8> {
    let token = token.trim_start_matches("0x").trim_start_matches("0X");
    if token.is_empty() || token.len() > 2 {
        return None;
    }
    u8::from_str_radix(token, 16).ok()
}

/// Input sources listed under `Feature: 60` of a capabilities dump.
///
/// Accepts the inline `Values: 0F 11 12` form and the multi-line form where
/// `Values:` is followed by one `0f: DisplayPort-1` line per value.
pub fn parse_input_sources(capabilities: &str) -> BTreeMap<String, u8> {
    let mut inputs = BTreeMap::new();
    let mut in_feature = false;
    let mut in_values = false;

    for line in capabilities.lines().map(str::trim) {
        if line.starts_with("Feature:") {
            if in_feature {
                break;
            }
            in_feature = line.starts_with("Feature: 60");
            continue;
        }
        if !in_feature {
            continue;
        }

        if let Some(rest) = line.strip_prefix("Values:") {
            let rest = rest.trim();
            if rest.is_empty() {
                in_values = true;
                continue;
            }
            for code in rest.split_whitespace().filter_map(hex_byte) {
                inputs.insert(input_code_to_name(code), code);
            }
            break;
        }

        if in_values {
            match line.split_once(':').and_then(|(code, _)| hex_byte(code)) {
                Some(code) => {
                    inputs.insert(input_code_to_name(code), code);
                }
                None => break,
            }
        }
    }
    inputs
}

/// What a `ddcutil capabilities` dump says about inputs, brightness and
/// contrast.
pub fn parse_capabilities(capabilities: &str) -> Capabilities {
    let has = |code: &str| {
        capabilities
            .lines()
            .map(str::trim)
            .any(|l| l.strip_prefix("Feature:").map(str::trim).is_some_and(|f| f.starts_with(code)))
    };
    Capabilities {
        supported_inputs: parse_input_sources(capabilities),
        supports_brightness: has("10"),
        supports_contrast: has("12"),
    }
}

/// `ddccontrol -p`: one monitor per `- Device: dev:/dev/i2c-N` block; the
/// device string is the monitor ID.
pub fn parse_ddccontrol_probe(output: &str) -> Vec<Monitor> {
    let mut monitors: Vec<Monitor> = Vec::new();
    for line in output.lines().map(str::trim) {
        if let Some(device) = line.strip_prefix("- Device:") {
            monitors.push(Monitor::bare(device.trim(), ""));
            continue;
        }
        if let (Some(name), Some(last)) = (field(line, "Monitor Name:"), monitors.last_mut()) {
            last.name = name.to_string();
        }
    }
    monitors
}

/// `xrandr --listmonitors`: connector names only, numbered from 1. Carries no
/// input information.
pub fn parse_xrandr_listmonitors(output: &str) -> Vec<Monitor> {
    output
        .lines()
        .filter(|line| line.contains(':') && !line.starts_with("Monitors:"))
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            (fields.len() >= 3).then(|| fields[fields.len() - 1])
        })
        .enumerate()
        .map(|(i, name)| Monitor::bare((i + 1).to_string(), name))
        .collect()
}

// ── system_profiler ──────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct SystemProfiler {
    #[serde(rename = "SPDisplaysDataType", default)]
    gpus: Vec<Gpu>,
}

#[derive(Debug, Default, Deserialize)]
struct Gpu {
    #[serde(rename = "spdisplays_ndrvs", default)]
    displays: Vec<ProfilerDisplay>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProfilerDisplay {
    #[serde(rename = "_name")]
    name: String,
    #[serde(rename = "_spdisplays_display-vendor-id")]
    vendor_id: String,
    #[serde(rename = "_spdisplays_displayID")]
    display_id: String,
    #[serde(rename = "spdisplays_connection_type")]
    connection_type: String,
    #[serde(rename = "spdisplays_display_type")]
    display_type: String,
}

impl ProfilerDisplay {
    fn is_builtin(&self) -> bool {
        self.connection_type == "spdisplays_internal" || self.display_type.contains("built-in")
    }
}

/// Manufacturer for a hex vendor ID, if it is one of the known few.
pub fn vendor_name(vendor_id: &str) -> Option<&'static str> {
    let id = vendor_id.trim().trim_start_matches("0x").to_ascii_lowercase();
    KNOWN_VENDORS
        .iter()
        .find(|(known, _)| *known == id)
        .map(|(_, name)| *name)
}

/// Reported name, else "<Vendor> Display", else the generic name.
fn display_name(display: &ProfilerDisplay, id: &str) -> String {
    let name = display.name.trim();
    if !name.is_empty() && name != "(null)" {
        return name.to_string();
    }
    match vendor_name(&display.vendor_id) {
        Some(vendor) => format!("{} Display", vendor),
        None => generic_name(id),
    }
}

/// External displays from `system_profiler SPDisplaysDataType -json`.
/// Built-in panels are dropped. IDs are the system display IDs.
pub fn parse_system_profiler_displays(json: &str) -> Result<Vec<Monitor>> {
    let profile: SystemProfiler = serde_json::from_str(json)?;
    let monitors = profile
        .gpus
        .iter()
        .flat_map(|gpu| gpu.displays.iter())
        .filter(|d| !d.is_builtin())
        .enumerate()
        .map(|(i, d)| {
            let id = match d.display_id.trim() {
                "" => (i + 1).to_string(),
                id => id.to_string(),
            };
            Monitor::bare(id.clone(), display_name(d, &id))
        })
        .collect();
    Ok(monitors)
}

/// The native transport's JSON display list.
pub fn parse_native_monitors_json(json: &str) -> Result<Vec<Monitor>> {
    let displays: Vec<NativeDisplay> = serde_json::from_str(json)?;
    Ok(displays.iter().map(NativeDisplay::to_monitor).collect())
}

#[cfg(test)]
#[path = "tests/parse_tests.rs"]
mod tests;
