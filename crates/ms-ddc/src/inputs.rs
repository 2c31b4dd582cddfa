//! Input-source (VCP 0x60) code tables and name resolution.

use crate::OsType;
use std::collections::BTreeMap;

/// Standard MCCS input-source values, one name per code.
pub const STANDARD_INPUTS: &[(&str, u8)] = &[
    ("VGA", 0x01),
    ("DVI-1", 0x03),
    ("DVI-2", 0x04),
    ("DisplayPort", 0x0F),
    ("HDMI-1", 0x11),
    ("HDMI-2", 0x12),
    ("HDMI-3", 0x13),
];

/// Short aliases accepted on top of [`STANDARD_INPUTS`].
const STANDARD_ALIASES: &[(&str, u8)] = &[("DP", 0x0F), ("HDMI", 0x11), ("DVI", 0x03)];

/// Values understood by the macOS helpers. Codes 16 and 27 are
/// vendor-specific; several aliases share a code.
pub const MAC_INPUT_SOURCES: &[(&str, u8)] = &[
    ("DisplayPort", 15),
    ("DP", 15),
    ("DP-1", 15),
    ("DP-2", 16),
    ("HDMI", 17),
    ("HDMI-1", 17),
    ("HDMI-2", 18),
    ("USB-C", 27),
    ("Thunderbolt", 27),
];

/// One display name per code from [`MAC_INPUT_SOURCES`].
pub const MAC_CANONICAL_INPUTS: &[(&str, u8)] = &[
    ("DisplayPort", 15),
    ("DP-2", 16),
    ("HDMI-1", 17),
    ("HDMI-2", 18),
    ("USB-C", 27),
];

/// Name for a standard input code; unknown codes render as `Input-0xNN`.
pub fn input_code_to_name(code: u8) -> String {
    STANDARD_INPUTS
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(name, _)| name.to_string())
        .unwrap_or_else(|| format!("Input-0x{:02X}", code))
}

/// Name for an input code as reported by `m1ddc`/`ddcctl`.
pub fn mac_input_code_to_name(code: u8) -> String {
    MAC_CANONICAL_INPUTS
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(name, _)| name.to_string())
        .unwrap_or_else(|| input_code_to_name(code))
}

/// Name for a raw VCP 0x60 reading. Readings wider than a byte are never a
/// valid input and render as `Input-0xNNN`.
pub fn input_value_to_name(value: u16) -> String {
    match u8::try_from(value) {
        Ok(code) => input_code_to_name(code),
        Err(_) => format!("Input-0x{:X}", value),
    }
}

/// [`input_value_to_name`] with the macOS helpers' numbering.
pub fn mac_input_value_to_name(value: u16) -> String {
    match u8::try_from(value) {
        Ok(code) => mac_input_code_to_name(code),
        Err(_) => format!("Input-0x{:X}", value),
    }
}

/// The input names `list` shows for an OS.
pub fn canonical_inputs(os: OsType) -> &'static [(&'static str, u8)] {
    match os {
        OsType::MacOs => MAC_CANONICAL_INPUTS,
        OsType::Linux | OsType::Windows => STANDARD_INPUTS,
    }
}

/// Table form of [`canonical_inputs`].
pub fn canonical_input_map(os: OsType) -> BTreeMap<String, u8> {
    canonical_inputs(os)
        .iter()
        .map(|(name, code)| (name.to_string(), *code))
        .collect()
}

/// Resolve a user-supplied input to its VCP code.
///
/// Tries, case-insensitively: the monitor's own inputs, the OS table and its
/// aliases, then a literal decimal or `0x`-prefixed hex code.
pub fn resolve_input(input: &str, known: &BTreeMap<String, u8>, os: OsType) -> Option<u8> {
    let wanted = input.trim();
    if let Some((_, code)) = known.iter().find(|(name, _)| name.eq_ignore_ascii_case(wanted)) {
        return Some(*code);
    }

    let tables: [&[(&str, u8)]; 2] = match os {
        OsType::MacOs => [MAC_INPUT_SOURCES, &[]],
        OsType::Linux | OsType::Windows => [STANDARD_INPUTS, STANDARD_ALIASES],
    };
    for table in tables {
        if let Some((_, code)) = table.iter().find(|(name, _)| name.eq_ignore_ascii_case(wanted)) {
            return Some(*code);
        }
    }

    parse_code(wanted)
}

/// Parse `17`, `0x11` or `0X11` into a byte.
pub fn parse_code(s: &str) -> Option<u8> {
    let s = s.trim();
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}

#[cfg(test)]
#[path = "tests/inputs_tests.rs"]
mod tests;
