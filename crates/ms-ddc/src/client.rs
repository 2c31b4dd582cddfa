//! The facade the CLI talks to.
//!
//! One [`Transport`] is picked from the host OS at construction; every call
//! dispatches straight to it. Retries and validation live below this layer.

use crate::error::{DdcError, Result};
use crate::platform;
use crate::runner::{CommandRunner, SystemRunner};
use crate::settings::DdcSettings;
use crate::tools;
use crate::transport::{self, Transport};
use crate::{Capabilities, EnhancedMonitor, Monitor, OsType};
use std::rc::Rc;

pub struct DdcClient {
    transport: Box<dyn Transport>,
    runner: Rc<dyn CommandRunner>,
    settings: DdcSettings,
}

impl DdcClient {
    /// Client for the running OS, spawning real helper processes.
    pub fn new(settings: DdcSettings) -> Self {
        Self::with_runner(OsType::current(), Rc::new(SystemRunner), settings)
    }

    /// Client for `os` with a caller-supplied process runner.
    pub fn with_runner(
        os: Option<OsType>,
        runner: Rc<dyn CommandRunner>,
        settings: DdcSettings,
    ) -> Self {
        let transport = transport::for_os(os, runner.clone(), settings.clone());
        DdcClient {
            transport,
            runner,
            settings,
        }
    }

    pub fn os(&self) -> Option<OsType> {
        self.transport.os()
    }

    fn require_os(&self) -> Result<OsType> {
        self.os()
            .ok_or_else(|| DdcError::UnsupportedOs(std::env::consts::OS.to_string()))
    }

    pub fn settings(&self) -> &DdcSettings {
        &self.settings
    }

    /// `"<OS> (<product> <version>)"`. Never fails.
    pub fn os_info(&self) -> String {
        match self.os() {
            Some(os) => platform::os_info(&*self.runner, os, self.settings.detect_timeout),
            None => format!("{} (unsupported)", std::env::consts::OS),
        }
    }

    /// Whether a DDC helper is installed, and a line saying so.
    pub fn check_ddc_support(&self) -> Result<(bool, String)> {
        Ok(tools::check_ddc_support(&*self.runner, self.require_os()?))
    }

    /// The helper VCP calls will go through, if any.
    pub fn selected_tool(&self) -> Option<tools::ToolKind> {
        let os = self.os()?;
        tools::select_tool(&*self.runner, os, self.settings.preferred_tool)
    }

    /// Monitors from the inventory only; no display is queried or written.
    pub fn list_monitors(&self) -> Result<Vec<Monitor>> {
        self.transport.list_monitors()
    }

    pub fn detect_monitors(&self) -> Result<Vec<Monitor>> {
        self.transport.detect_monitors()
    }

    pub fn detect_enhanced(&self) -> Result<Vec<EnhancedMonitor>> {
        self.transport.detect_enhanced()
    }

    pub fn get_capabilities(&self, monitor_id: &str) -> Result<Capabilities> {
        self.transport.get_capabilities(monitor_id)
    }

    pub fn set_vcp(&self, monitor_id: &str, code: u8, value: u16) -> Result<()> {
        self.transport.set_vcp(monitor_id, code, value)
    }

    pub fn get_vcp(&self, monitor_id: &str, code: u8) -> Result<u16> {
        self.transport.get_vcp(monitor_id, code)
    }
}
