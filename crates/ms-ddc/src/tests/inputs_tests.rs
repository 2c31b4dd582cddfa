use super::*;

// ── Code → name ──────────────────────────────────────────────────

#[test]
fn standard_codes_have_names() {
    assert_eq!(input_code_to_name(0x0F), "DisplayPort");
    assert_eq!(input_code_to_name(0x11), "HDMI-1");
    assert_eq!(input_code_to_name(0x12), "HDMI-2");
    assert_eq!(input_code_to_name(0x13), "HDMI-3");
    assert_eq!(input_code_to_name(0x03), "DVI-1");
    assert_eq!(input_code_to_name(0x04), "DVI-2");
    assert_eq!(input_code_to_name(0x01), "VGA");
}

#[test]
fn unknown_codes_render_as_hex() {
    assert_eq!(input_code_to_name(0x1B), "Input-0x1B");
    assert_eq!(input_code_to_name(0x00), "Input-0x00");
}

#[test]
fn mac_codes_use_vendor_names() {
    assert_eq!(mac_input_code_to_name(27), "USB-C");
    assert_eq!(mac_input_code_to_name(16), "DP-2");
    assert_eq!(mac_input_code_to_name(17), "HDMI-1");
    // Falls through to the standard table.
    assert_eq!(mac_input_code_to_name(1), "VGA");
}

#[test]
fn tables_have_unique_names() {
    for table in [STANDARD_INPUTS, MAC_INPUT_SOURCES, MAC_CANONICAL_INPUTS] {
        let mut names: Vec<_> = table.iter().map(|(n, _)| *n).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), table.len());
    }
}

#[test]
fn canonical_mac_inputs_cover_every_mac_code() {
    for (_, code) in MAC_INPUT_SOURCES {
        assert!(MAC_CANONICAL_INPUTS.iter().any(|(_, c)| c == code));
    }
}

#[test]
fn canonical_map_per_os() {
    let linux = canonical_input_map(OsType::Linux);
    assert_eq!(linux.get("HDMI-1"), Some(&0x11));
    assert!(!linux.contains_key("USB-C"));

    let mac = canonical_input_map(OsType::MacOs);
    assert_eq!(mac.get("USB-C"), Some(&27));
    assert_eq!(mac.len(), MAC_CANONICAL_INPUTS.len());
}

#[test]
fn readings_wider_than_a_byte_are_not_truncated() {
    assert_eq!(input_value_to_name(0x0F), "DisplayPort");
    assert_eq!(input_value_to_name(271), "Input-0x10F");
    assert_eq!(mac_input_value_to_name(27), "USB-C");
    assert_eq!(mac_input_value_to_name(0x111), "Input-0x111");
}

// ── resolve_input ────────────────────────────────────────────────

#[test]
fn resolve_prefers_monitor_inputs() {
    let mut known = BTreeMap::new();
    known.insert("HDMI-1".to_string(), 0x05);
    assert_eq!(resolve_input("hdmi-1", &known, OsType::Linux), Some(0x05));
}

#[test]
fn resolve_uses_os_table_and_aliases() {
    let empty = BTreeMap::new();
    assert_eq!(resolve_input("DisplayPort", &empty, OsType::Linux), Some(0x0F));
    assert_eq!(resolve_input("dp", &empty, OsType::Linux), Some(0x0F));
    assert_eq!(resolve_input("usb-c", &empty, OsType::MacOs), Some(27));
    assert_eq!(resolve_input("Thunderbolt", &empty, OsType::MacOs), Some(27));
}

#[test]
fn resolve_accepts_literal_codes() {
    let empty = BTreeMap::new();
    assert_eq!(resolve_input("17", &empty, OsType::Linux), Some(17));
    assert_eq!(resolve_input("0x11", &empty, OsType::Linux), Some(0x11));
    assert_eq!(resolve_input(" 0X0f ", &empty, OsType::MacOs), Some(0x0F));
}

#[test]
fn resolve_rejects_garbage() {
    let empty = BTreeMap::new();
    assert_eq!(resolve_input("Composite", &empty, OsType::Linux), None);
    assert_eq!(resolve_input("300", &empty, OsType::Linux), None);
    assert_eq!(resolve_input("USB-C", &empty, OsType::Linux), None);
}

#[test]
fn parse_code_forms() {
    assert_eq!(parse_code("0"), Some(0));
    assert_eq!(parse_code("255"), Some(255));
    assert_eq!(parse_code("0xff"), Some(255));
    assert_eq!(parse_code("0x"), None);
    assert_eq!(parse_code("-1"), None);
}
