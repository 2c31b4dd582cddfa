use crate::tools::ToolKind;
use ms_core::config::Config;
use std::time::Duration;

/// Runtime knobs threaded explicitly into transports and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdcSettings {
    pub verbose: bool,
    pub preferred_tool: Option<ToolKind>,
    pub validate: bool,
    pub probe_inputs: bool,
    pub native_fallback: bool,
    /// Wait between the probe write and the verifying read.
    pub settle_delay: Duration,
    pub probe_timeout: Duration,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub detect_timeout: Duration,
}

impl Default for DdcSettings {
    fn default() -> Self {
        DdcSettings::from(&Config::default())
    }
}

impl From<&Config> for DdcSettings {
    fn from(cfg: &Config) -> Self {
        let preferred_tool = match cfg.preferred_tool.trim() {
            "" => None,
            name => {
                let tool = ToolKind::from_binary(name);
                if tool.is_none() {
                    log::warn!("Unknown preferred_tool '{}', picking automatically", name);
                }
                tool
            }
        };

        DdcSettings {
            verbose: cfg.verbose,
            preferred_tool,
            validate: cfg.validate_ddc,
            probe_inputs: cfg.probe_inputs,
            native_fallback: cfg.native_fallback,
            settle_delay: Duration::from_millis(cfg.settle_delay_ms),
            probe_timeout: Duration::from_millis(cfg.probe_timeout_ms),
            read_timeout: Duration::from_millis(cfg.read_timeout_ms),
            write_timeout: Duration::from_millis(cfg.write_timeout_ms),
            detect_timeout: Duration::from_millis(cfg.detect_timeout_ms),
        }
    }
}
