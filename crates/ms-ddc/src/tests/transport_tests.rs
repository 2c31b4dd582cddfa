use super::*;
use crate::native::{NativeDdc, NativeDisplay};
use crate::support::FakeRunner;
use crate::validate::ValidationOutcome;
use crate::ToolKind;
use std::cell::RefCell;
use std::time::Duration;

const DDCUTIL_DETECT: &str = "\
Display 1
   I2C bus:  /dev/i2c-4
   EDID synopsis:
      Mfg id:               DEL
      Model:                DELL U2719D
   VCP version:         2.1

Display 2
   I2C bus:  /dev/i2c-5
   EDID synopsis:
      Mfg id:               GSM
      Model:                LG HDR 4K
";

const DDCUTIL_CAPS: &str = "\
VCP Features:
   Feature: 10 (Brightness)
   Feature: 60 (Input Source)
      Values: 0F 11 12
";

const PROFILER_ONE_EXTERNAL: &str = r#"{
  "SPDisplaysDataType": [{
    "_name": "Apple M1",
    "spdisplays_ndrvs": [
      {
        "_name": "Color LCD",
        "_spdisplays_displayID": "1",
        "_spdisplays_display-vendor-id": "610",
        "spdisplays_connection_type": "spdisplays_internal",
        "spdisplays_display_type": "spdisplays_built-in_retinaLCD"
      },
      {
        "_name": "LG HDR 4K",
        "_spdisplays_displayID": "2",
        "_spdisplays_display-vendor-id": "1e6d"
      }
    ]
  }]
}"#;

const PROFILER_TWO_EXTERNAL: &str = r#"{
  "SPDisplaysDataType": [{
    "spdisplays_ndrvs": [
      { "_name": "DELL U2719D", "_spdisplays_displayID": "7" },
      { "_name": "LG HDR 4K", "_spdisplays_displayID": "9" }
    ]
  }]
}"#;

const PROFILER_CMD: &str = "system_profiler SPDisplaysDataType -json";

fn settings() -> DdcSettings {
    DdcSettings {
        settle_delay: Duration::ZERO,
        ..DdcSettings::default()
    }
}

fn linux(runner: &FakeRunner) -> LinuxTransport {
    LinuxTransport::new(Rc::new(runner.clone()), settings())
}

fn mac(runner: &FakeRunner, settings: DdcSettings, native: Option<Box<dyn NativeDdc>>) -> MacTransport {
    MacTransport::new(Rc::new(runner.clone()), settings, native)
}

/// Native binding double that records writes and answers reads with 42.
#[derive(Clone, Default)]
struct FakeNative {
    writes: Rc<RefCell<Vec<(u32, u8, u16)>>>,
}

impl NativeDdc for FakeNative {
    fn list_displays(&self) -> Result<Vec<NativeDisplay>> {
        Ok(vec![NativeDisplay {
            id: 5,
            name: String::new(),
            vendor: 0x1e6d,
            model: 1,
            serial: 0,
        }])
    }

    fn set_vcp(&self, display_id: u32, code: u8, value: u16) -> Result<()> {
        self.writes.borrow_mut().push((display_id, code, value));
        Ok(())
    }

    fn get_vcp(&self, _display_id: u32, _code: u8) -> Result<(u16, u16)> {
        Ok((42, 100))
    }
}

// ── Selection ────────────────────────────────────────────────────

#[test]
fn transport_matches_requested_os() {
    let runner: Rc<dyn CommandRunner> = Rc::new(FakeRunner::new());
    for os in [OsType::Linux, OsType::MacOs, OsType::Windows] {
        assert_eq!(for_os(Some(os), runner.clone(), settings()).os(), Some(os));
    }
    assert_eq!(for_os(None, runner, settings()).os(), None);
}

#[test]
fn unsupported_os_refuses_everything() {
    let t = UnsupportedTransport::new("plan9");
    assert!(matches!(t.detect_monitors(), Err(DdcError::UnsupportedOs(ref os)) if os == "plan9"));
    assert!(matches!(t.get_capabilities("1"), Err(DdcError::UnsupportedOs(_))));
    assert!(matches!(t.set_vcp("1", 0x10, 5), Err(DdcError::UnsupportedOs(_))));
    assert!(matches!(t.get_vcp("1", 0x10), Err(DdcError::UnsupportedOs(_))));
    assert!(matches!(t.detect_enhanced(), Err(DdcError::UnsupportedOs(_))));
    assert!(matches!(t.list_monitors(), Err(DdcError::UnsupportedOs(_))));
}

#[test]
fn windows_reports_not_implemented() {
    let t = WindowsTransport;
    assert_eq!(
        t.set_vcp("1", 0x60, 17).unwrap_err().to_string(),
        "Windows VCP setting not implemented yet"
    );
    assert_eq!(
        t.detect_monitors().unwrap_err().to_string(),
        "Windows DDC not implemented yet"
    );
    assert!(t.get_vcp("1", 0x10).is_err());
    assert!(t.get_capabilities("1").is_err());
    assert!(matches!(t.list_monitors(), Err(DdcError::NotImplemented(_))));
}

// ── Linux ────────────────────────────────────────────────────────

#[test]
fn linux_without_tools_falls_back_to_xrandr() {
    let runner = FakeRunner::new().respond(
        "xrandr --listmonitors",
        "Monitors: 1\n 0: +HDMI-1 1920x1080+0+0  HDMI-1",
    );
    let monitors = linux(&runner).detect_monitors().unwrap();
    assert_eq!(monitors.len(), 1);
    assert_eq!(monitors[0].name, "HDMI-1");
    assert!(monitors[0].inputs.is_empty());
    assert!(monitors[0].current_input.is_empty());
}

#[test]
fn linux_with_nothing_finds_zero_monitors() {
    let runner = FakeRunner::new();
    let monitors = linux(&runner).detect_monitors().unwrap();
    assert!(monitors.is_empty());
}

#[test]
fn linux_ddcutil_detection_is_enhanced() {
    let runner = FakeRunner::new()
        .with_tool("ddcutil")
        .respond("ddcutil detect", DDCUTIL_DETECT)
        .respond("ddcutil --display 1 capabilities", DDCUTIL_CAPS)
        .respond(
            "ddcutil --display 1 getvcp 60",
            "VCP code 0x60 (Input Source                  ): DisplayPort-1 (sl=0x0f)",
        );
    let monitors = linux(&runner).detect_monitors().unwrap();
    assert_eq!(monitors.len(), 2);

    assert_eq!(monitors[0].id, "1");
    assert_eq!(monitors[0].name, "DEL DELL U2719D");
    assert_eq!(monitors[0].inputs.len(), 3);
    assert_eq!(monitors[0].inputs["HDMI-2"], 0x12);
    assert_eq!(monitors[0].current_input, "DisplayPort");

    // display 2 answers neither query and stays bare
    assert_eq!(monitors[1].id, "2");
    assert_eq!(monitors[1].name, "GSM LG HDR 4K");
    assert!(monitors[1].inputs.is_empty());
    assert!(monitors[1].current_input.is_empty());
    assert_eq!(runner.count("xrandr --listmonitors"), 0);
}

#[test]
fn linux_listing_skips_per_monitor_queries() {
    let runner = FakeRunner::new()
        .with_tool("ddcutil")
        .respond("ddcutil detect", DDCUTIL_DETECT);
    let monitors = linux(&runner).list_monitors().unwrap();
    assert_eq!(monitors.len(), 2);
    assert_eq!(monitors[0].name, "DEL DELL U2719D");
    assert!(monitors[0].current_input.is_empty());
    assert_eq!(runner.calls(), vec!["ddcutil detect".to_string()]);
}

#[test]
fn linux_oversized_input_reading_is_not_truncated() {
    let runner = FakeRunner::new()
        .with_tool("ddcutil")
        .respond("ddcutil detect", DDCUTIL_DETECT)
        .respond(
            "ddcutil --display 1 getvcp 60",
            "VCP code 0x60 (Input Source): current value = 271, max value = 300",
        );
    let monitors = linux(&runner).detect_monitors().unwrap();
    assert_eq!(monitors[0].current_input, "Input-0x10F");
}

#[test]
fn linux_empty_ddcutil_detect_falls_back_to_xrandr() {
    let runner = FakeRunner::new()
        .with_tool("ddcutil")
        .respond("ddcutil detect", "No displays found.")
        .respond("xrandr --listmonitors", "Monitors: 1\n 0: +*DP-2 2560/597x1440/336+0+0  DP-2");
    let monitors = linux(&runner).detect_monitors().unwrap();
    assert_eq!(monitors.len(), 1);
    assert_eq!(monitors[0].name, "DP-2");
}

#[test]
fn linux_enhanced_detection_names_the_tool() {
    let runner = FakeRunner::new()
        .with_tool("ddcutil")
        .respond("ddcutil detect", DDCUTIL_DETECT)
        .respond("ddcutil --display 1 capabilities", DDCUTIL_CAPS);
    let enhanced = linux(&runner).detect_enhanced().unwrap();
    assert_eq!(enhanced.len(), 2);
    assert_eq!(enhanced[0].tool, Some(ToolKind::Ddcutil));
    assert!(enhanced[0].ddc_supported);
    assert!(!enhanced[1].ddc_supported);
}

#[test]
fn linux_ddccontrol_backend() {
    let runner = FakeRunner::new()
        .with_tool("ddccontrol")
        .respond(
            "ddccontrol -p",
            "Detected monitors :\n - Device: dev:/dev/i2c-3\n   DDC/CI supported: Yes\n   Monitor Name: LG ULTRAGEAR\n",
        )
        .respond(
            "ddccontrol -r 0x10 dev:/dev/i2c-3",
            "Reading 0x10...\nControl 0x10: +/50/100 C [Brightness]",
        )
        .respond("ddccontrol -r 0x12 -w 70 dev:/dev/i2c-3", "");
    let t = linux(&runner);

    let monitors = t.detect_monitors().unwrap();
    assert_eq!(monitors.len(), 1);
    assert_eq!(monitors[0].id, "dev:/dev/i2c-3");
    assert_eq!(monitors[0].name, "LG ULTRAGEAR");

    assert_eq!(t.get_vcp("dev:/dev/i2c-3", 0x10).unwrap(), 50);
    t.set_vcp("dev:/dev/i2c-3", 0x12, 70).unwrap();

    let caps = t.get_capabilities("dev:/dev/i2c-3").unwrap();
    assert!(caps.supports_brightness);
    assert!(!caps.supports_contrast);
}

#[test]
fn linux_ddcutil_vcp_and_capabilities() {
    let runner = FakeRunner::new()
        .with_tool("ddcutil")
        .respond(
            "ddcutil --display 2 getvcp 10",
            "VCP code 0x10 (Brightness): current value =    65, max value =   100",
        )
        .respond("ddcutil --display 2 setvcp 60 17", "")
        .respond("ddcutil --display 2 capabilities", DDCUTIL_CAPS);
    let t = linux(&runner);

    assert_eq!(t.get_vcp("2", 0x10).unwrap(), 65);
    t.set_vcp("2", 0x60, 17).unwrap();
    assert_eq!(runner.count("ddcutil --display 2 setvcp 60 17"), 1);

    let caps = t.get_capabilities("2").unwrap();
    assert!(caps.supports_brightness);
    assert!(!caps.supports_contrast);
    assert_eq!(caps.supported_inputs["DisplayPort"], 0x0F);
}

#[test]
fn linux_vcp_without_tool_needs_install() {
    let t = linux(&FakeRunner::new());
    assert!(matches!(t.get_vcp("1", 0x10), Err(DdcError::ToolNotFound { .. })));
    assert!(matches!(t.set_vcp("1", 0x10, 1), Err(DdcError::ToolNotFound { .. })));
    assert!(matches!(t.get_capabilities("1"), Err(DdcError::ToolNotFound { .. })));
}

// ── macOS ────────────────────────────────────────────────────────

#[test]
fn mac_internal_panel_is_filtered() {
    let runner = FakeRunner::new().respond(PROFILER_CMD, PROFILER_ONE_EXTERNAL);
    let t = mac(&runner, settings(), None);
    let enhanced = t.detect_enhanced().unwrap();
    assert_eq!(enhanced.len(), 1);
    assert_eq!(enhanced[0].monitor.id, "2");
    assert_eq!(enhanced[0].monitor.name, "LG HDR 4K");
    assert!(!enhanced[0].ddc_supported);
    assert_eq!(
        enhanced[0].validation.as_ref().map(|v| v.outcome),
        Some(ValidationOutcome::Unsupported)
    );
}

#[test]
fn mac_ineffective_writes_mark_input_read_only() {
    let runner = FakeRunner::new()
        .with_tool("m1ddc")
        .respond(PROFILER_CMD, PROFILER_ONE_EXTERNAL)
        .respond("m1ddc display 1 get luminance", "50")
        .respond("m1ddc display 1 set luminance 60", "")
        .respond("m1ddc display 1 set luminance 50", "")
        .respond("m1ddc display 1 get input", "17");
    let monitors = mac(&runner, settings(), None).detect_monitors().unwrap();
    assert_eq!(monitors.len(), 1);
    assert_eq!(monitors[0].current_input, "HDMI-1 (read-only)");
    assert!(monitors[0].inputs.is_empty());
    // restored after the probe
    assert_eq!(runner.count("m1ddc display 1 set luminance 50"), 1);
}

#[test]
fn mac_full_support_uses_known_inputs() {
    let runner = FakeRunner::new()
        .with_tool("m1ddc")
        .respond(PROFILER_CMD, PROFILER_ONE_EXTERNAL)
        .respond("m1ddc display 1 get luminance", "50")
        .respond("m1ddc display 1 get luminance", "60")
        .respond("m1ddc display 1 set luminance 60", "")
        .respond("m1ddc display 1 set luminance 50", "")
        .respond("m1ddc display 1 get input", "15");
    let enhanced = mac(&runner, settings(), None).detect_enhanced().unwrap();
    let e = &enhanced[0];
    assert!(e.ddc_supported);
    assert_eq!(e.tool, Some(ToolKind::M1ddc));
    assert_eq!(e.monitor.current_input, "DisplayPort");
    assert_eq!(e.monitor.inputs.len(), 5);
    assert_eq!(e.monitor.inputs["USB-C"], 27);
    assert!(e.supported_inputs.is_empty());
    assert!(e.validation.as_ref().unwrap().is_fully_supported());
}

#[test]
fn mac_input_probing_switches_back() {
    let runner = FakeRunner::new()
        .with_tool("ddcctl")
        .respond(PROFILER_CMD, PROFILER_ONE_EXTERNAL)
        .respond("ddcctl -d 1 -b ?", "current: 50, max: 100")
        .respond("ddcctl -d 1 -b ?", "current: 60, max: 100")
        .respond("ddcctl -d 1 -b 60", "")
        .respond("ddcctl -d 1 -b 50", "")
        .respond("ddcctl -d 1 -i ?", "current: 17, max: 27")
        .respond("ddcctl -d 1 -i 15", "")
        .respond("ddcctl -d 1 -i 17", "")
        .respond("ddcctl -d 1 -i 27", "");
    let settings = DdcSettings {
        probe_inputs: true,
        ..settings()
    };
    let enhanced = mac(&runner, settings, None).detect_enhanced().unwrap();
    let e = &enhanced[0];
    assert_eq!(e.monitor.current_input, "HDMI-1");
    assert_eq!(e.monitor.inputs.len(), 3);
    assert_eq!(e.monitor.inputs["DisplayPort"], 15);
    assert_eq!(e.monitor.inputs["HDMI-1"], 17);
    assert_eq!(e.monitor.inputs["USB-C"], 27);
    assert_eq!(e.supported_inputs, e.monitor.inputs);
    // once while probing, once to switch back
    assert_eq!(runner.count("ddcctl -d 1 -i 17"), 2);
    assert_eq!(runner.calls().last().map(String::as_str), Some("ddcctl -d 1 -i 17"));
}

#[test]
fn mac_without_validation_trusts_the_tool() {
    let runner = FakeRunner::new()
        .with_tool("m1ddc")
        .respond(PROFILER_CMD, PROFILER_ONE_EXTERNAL)
        .respond("m1ddc display 1 get input", "18");
    let settings = DdcSettings {
        validate: false,
        ..settings()
    };
    let enhanced = mac(&runner, settings, None).detect_enhanced().unwrap();
    assert!(enhanced[0].ddc_supported);
    assert!(enhanced[0].validation.is_none());
    assert_eq!(enhanced[0].monitor.current_input, "HDMI-2");
    assert_eq!(runner.count("m1ddc display 1 get luminance"), 0);
}

#[test]
fn mac_ids_map_to_helper_positions() {
    let runner = FakeRunner::new()
        .with_tool("m1ddc")
        .respond(PROFILER_CMD, PROFILER_TWO_EXTERNAL)
        .respond("m1ddc display 2 set luminance 70", "")
        .respond("m1ddc display 1 get contrast", "Current contrast: 40");
    let t = mac(&runner, settings(), None);
    t.set_vcp("9", 0x10, 70).unwrap();
    assert_eq!(t.get_vcp("7", 0x12).unwrap(), 40);
    assert_eq!(runner.count("m1ddc display 2 set luminance 70"), 1);
}

#[test]
fn mac_inventory_is_taken_once() {
    let runner = FakeRunner::new()
        .with_tool("m1ddc")
        .respond(PROFILER_CMD, PROFILER_TWO_EXTERNAL)
        .respond("m1ddc display 2 set luminance 70", "")
        .respond("m1ddc display 1 get contrast", "40")
        .respond("m1ddc display 2 get contrast", "45");
    let t = mac(&runner, settings(), None);
    assert_eq!(t.list_monitors().unwrap().len(), 2);
    t.set_vcp("9", 0x10, 70).unwrap();
    assert_eq!(t.get_vcp("7", 0x12).unwrap(), 40);
    assert_eq!(t.get_vcp("9", 0x12).unwrap(), 45);
    assert_eq!(runner.count(PROFILER_CMD), 1);
}

#[test]
fn mac_listing_runs_no_helper() {
    let runner = FakeRunner::new()
        .with_tool("m1ddc")
        .respond(PROFILER_CMD, PROFILER_ONE_EXTERNAL);
    let monitors = mac(&runner, settings(), None).list_monitors().unwrap();
    assert_eq!(monitors.len(), 1);
    assert_eq!(monitors[0].id, "2");
    assert_eq!(runner.calls(), vec![PROFILER_CMD.to_string()]);
}

#[test]
fn mac_oversized_input_reading_is_not_truncated() {
    let runner = FakeRunner::new()
        .with_tool("m1ddc")
        .respond(PROFILER_CMD, PROFILER_ONE_EXTERNAL)
        .respond("m1ddc display 1 get input", "273");
    let settings = DdcSettings {
        validate: false,
        ..settings()
    };
    let enhanced = mac(&runner, settings, None).detect_enhanced().unwrap();
    assert_eq!(enhanced[0].monitor.current_input, "Input-0x111");
}

#[test]
fn mac_unmapped_code_is_reported() {
    let runner = FakeRunner::new()
        .with_tool("ddcctl")
        .respond(PROFILER_CMD, PROFILER_TWO_EXTERNAL);
    let t = mac(&runner, settings(), None);
    assert!(matches!(
        t.set_vcp("7", 0xD6, 1),
        Err(DdcError::UnsupportedFeature { code: 0xD6, .. })
    ));
}

#[test]
fn mac_unknown_id_is_rejected() {
    let runner = FakeRunner::new()
        .with_tool("m1ddc")
        .respond(PROFILER_CMD, PROFILER_TWO_EXTERNAL);
    let t = mac(&runner, settings(), None);
    assert!(matches!(t.get_vcp("abc", 0x10), Err(DdcError::InvalidMonitorId(_))));
}

#[test]
fn mac_native_fallback_without_helpers() {
    let native = FakeNative::default();
    let runner = FakeRunner::new();
    let t = mac(&runner, settings(), Some(Box::new(native.clone())));

    let monitors = t.detect_monitors().unwrap();
    assert_eq!(monitors.len(), 1);
    assert_eq!(monitors[0].id, "5");
    assert_eq!(monitors[0].name, "Display 5");

    t.set_vcp("5", 0x60, 15).unwrap();
    assert_eq!(*native.writes.borrow(), vec![(5, 0x60, 15)]);
    assert_eq!(t.get_vcp("5", 0x10).unwrap(), 42);
    assert!(matches!(t.get_vcp("x", 0x10), Err(DdcError::InvalidMonitorId(_))));

    let caps = t.get_capabilities("5").unwrap();
    assert!(caps.supports_brightness && caps.supports_contrast);
}

#[test]
fn mac_without_any_transport() {
    let runner = FakeRunner::new().respond(PROFILER_CMD, PROFILER_ONE_EXTERNAL);
    let t = mac(&runner, settings(), None);
    assert!(matches!(t.set_vcp("2", 0x10, 1), Err(DdcError::ToolNotFound { .. })));
    assert!(matches!(t.get_capabilities("2"), Err(DdcError::ToolNotFound { .. })));
}

#[test]
fn mac_profiler_failure_without_native_is_zero_monitors() {
    let runner = FakeRunner::new();
    let monitors = mac(&runner, settings(), None).detect_monitors().unwrap();
    assert!(monitors.is_empty());
}
