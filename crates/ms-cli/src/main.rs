//! monitorswitch: switch monitor inputs and adjust settings over DDC/CI.
//!
//! Thin presentation layer over `ms-ddc`. Detection failures are reported as
//! text; only argument errors and failed operations exit non-zero.

use clap::{Parser, Subcommand};
use ms_core::config::{self, Config};
use ms_ddc::inputs::{canonical_inputs, input_value_to_name, mac_input_value_to_name, resolve_input};
use ms_ddc::vcp::{Feature, VCP_INPUT_SOURCE};
use ms_ddc::{DdcClient, DdcSettings, Monitor, OsType};
use std::error::Error;

#[derive(Parser)]
#[command(
    name = "monitorswitch",
    version,
    about = "Switch monitor inputs over DDC/CI",
    long_about = "Detects external monitors and switches their input source, brightness,\n\
        contrast and volume over DDC/CI.\n\n\
        Uses ddcutil/ddccontrol on Linux and m1ddc/ddcctl on macOS, falling back\n\
        to a built-in IOKit transport on macOS when no helper is installed."
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Helper tool to use (m1ddc, ddcctl, ddcutil, ddccontrol)
    #[arg(long, global = true)]
    tool: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect monitors and DDC/CI support
    Detect,

    /// Show the current input of a monitor
    Status {
        /// Monitor ID (default: first detected)
        #[arg(short, long)]
        monitor: Option<String>,
    },

    /// Switch a monitor to another input
    Switch {
        /// Input name (e.g. HDMI-1, DisplayPort, USB-C) or VCP code
        input: String,

        /// Monitor ID (default: first detected)
        #[arg(short, long)]
        monitor: Option<String>,
    },

    /// List known input names
    List,

    /// Read a feature (brightness, contrast, input, volume)
    Get {
        feature: Feature,

        /// Monitor ID (default: first detected)
        #[arg(short, long)]
        monitor: Option<String>,
    },

    /// Write a feature (brightness, contrast, input, volume)
    Set {
        feature: Feature,

        value: u16,

        /// Monitor ID (default: first detected)
        #[arg(short, long)]
        monitor: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Print config file path
    Path,
    /// Reset config to defaults
    Reset,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let mut cfg = Config::load();
    cfg.verbose |= cli.verbose;
    if let Some(tool) = &cli.tool {
        cfg.preferred_tool = tool.clone();
    }

    env_logger::Builder::new()
        .filter_level(if cfg.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .format_timestamp(None)
        .init();

    let settings = DdcSettings::from(&cfg);

    match cli.command {
        Commands::Detect => cmd_detect(&settings)?,
        Commands::Status { monitor } => cmd_status(&settings, monitor)?,
        Commands::Switch { input, monitor } => cmd_switch(&settings, &input, monitor)?,
        Commands::List => cmd_list(),
        Commands::Get { feature, monitor } => cmd_get(&settings, feature, monitor)?,
        Commands::Set {
            feature,
            value,
            monitor,
        } => cmd_set(&settings, feature, value, monitor)?,
        Commands::Config { action } => cmd_config(action, &cfg)?,
    }

    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Input name as the OS's helpers number them.
fn input_name(os: Option<OsType>, value: u16) -> String {
    match os {
        Some(OsType::MacOs) => mac_input_value_to_name(value),
        _ => input_value_to_name(value),
    }
}

/// The requested monitor, or the first one listed. Listing never validates,
/// so picking a default leaves the panel untouched.
fn target_monitor(client: &DdcClient, requested: Option<String>) -> Result<Monitor, Box<dyn Error>> {
    if let Some(id) = requested {
        return Ok(Monitor::bare(id, ""));
    }
    client
        .list_monitors()?
        .into_iter()
        .next()
        .ok_or_else(|| "no monitors detected".into())
}

// ============================================================================
// Command implementations
// ============================================================================

fn cmd_detect(settings: &DdcSettings) -> Result<(), Box<dyn Error>> {
    let client = DdcClient::new(settings.clone());

    println!("Operating System: {}", client.os_info());
    match client.check_ddc_support() {
        Ok((true, msg)) => println!("[OK] {}", msg),
        Ok((false, msg)) => println!("[WARN] {}", msg),
        Err(e) => println!("[WARN] {}", e),
    }

    let monitors = match client.detect_enhanced() {
        Ok(monitors) => monitors,
        Err(e) => {
            println!("[WARN] Monitor detection failed: {}", e);
            return Ok(());
        }
    };

    if monitors.is_empty() {
        println!("\nNo monitors detected.");
        if settings.verbose {
            println!("\nTroubleshooting:");
            println!("  - Check that the monitor has DDC/CI enabled in its on-screen menu");
            println!("  - Prefer HDMI or DisplayPort; VGA adapters rarely pass DDC/CI");
            println!("  - On Linux, load the i2c-dev module and check /dev/i2c-* permissions");
        }
        return Ok(());
    }

    println!("\nFound {} monitor(s):\n", monitors.len());
    for (i, m) in monitors.iter().enumerate() {
        println!("  {}. {}", i + 1, m.monitor.name);
        println!("     ID:      {}", m.monitor.id);
        let current = match m.monitor.current_input.as_str() {
            "" => "unknown",
            name => name,
        };
        println!("     Input:   {}", current);
        println!("     DDC/CI:  {}", if m.ddc_supported { "yes" } else { "no" });
        if settings.verbose {
            if let Some(tool) = m.tool {
                println!("     Tool:    {}", tool);
            }
            if !m.monitor.inputs.is_empty() {
                let names: Vec<&str> = m.monitor.inputs.keys().map(String::as_str).collect();
                println!("     Inputs:  {}", names.join(", "));
            }
            if let Some(v) = &m.validation {
                if let Some(err) = &v.validation_error {
                    println!("     Check:   {}", err);
                }
                if let Some(action) = &v.recommended_action {
                    println!("     Hint:    {}", action);
                }
            }
        }
    }
    Ok(())
}

fn cmd_status(settings: &DdcSettings, monitor: Option<String>) -> Result<(), Box<dyn Error>> {
    let client = DdcClient::new(settings.clone());
    let target = target_monitor(&client, monitor)?;

    let current = match client.get_vcp(&target.id, VCP_INPUT_SOURCE) {
        Ok(value) => input_name(client.os(), value),
        Err(e) => {
            log::warn!("Could not read input of {}: {}", target.id, e);
            match target.current_input.as_str() {
                "" => "unknown".to_string(),
                name => name.to_string(),
            }
        }
    };
    println!("{} (ID {}): {}", target.name, target.id, current);
    Ok(())
}

fn cmd_switch(
    settings: &DdcSettings,
    input: &str,
    monitor: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let client = DdcClient::new(settings.clone());
    let os = client
        .os()
        .ok_or_else(|| format!("unsupported OS: {}", std::env::consts::OS))?;
    let target = target_monitor(&client, monitor)?;

    let code = resolve_input(input, &target.inputs, os)
        .ok_or_else(|| format!("unknown input '{}' (see `monitorswitch list`)", input))?;
    client.set_vcp(&target.id, VCP_INPUT_SOURCE, u16::from(code))?;
    println!(
        "[OK] {} switched to {} (0x{:02X})",
        target.name,
        input_name(Some(os), u16::from(code)),
        code
    );
    Ok(())
}

fn cmd_list() {
    let os = OsType::current();
    match os {
        Some(os) => println!("Known inputs ({}):\n", os),
        None => println!("Known inputs:\n"),
    }
    for (name, code) in canonical_inputs(os.unwrap_or(OsType::Linux)) {
        println!("  {:<12} {:>3} (0x{:02X})", name, code, code);
    }
}

fn cmd_get(
    settings: &DdcSettings,
    feature: Feature,
    monitor: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let client = DdcClient::new(settings.clone());
    let target = target_monitor(&client, monitor)?;
    let value = client.get_vcp(&target.id, feature.code())?;
    match feature {
        Feature::InputSource => println!(
            "{}: {} ({})",
            feature,
            input_name(client.os(), value),
            value
        ),
        _ => println!("{}: {}", feature, value),
    }
    Ok(())
}

fn cmd_set(
    settings: &DdcSettings,
    feature: Feature,
    value: u16,
    monitor: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let client = DdcClient::new(settings.clone());
    let target = target_monitor(&client, monitor)?;
    client.set_vcp(&target.id, feature.code(), value)?;
    println!("[OK] {} {} set to {}", target.name, feature, value);
    Ok(())
}

fn cmd_config(action: Option<ConfigAction>, cfg: &Config) -> Result<(), Box<dyn Error>> {
    match action {
        None | Some(ConfigAction::Show) => {
            println!("Config file: {}\n", config::config_path().display());
            println!("── Output ──");
            println!("  verbose           = {}", cfg.verbose);
            println!("\n── Tools ──");
            println!("  preferred_tool    = \"{}\"", cfg.preferred_tool);
            println!("  native_fallback   = {}", cfg.native_fallback);
            println!("\n── Validation ──");
            println!("  validate_ddc      = {}", cfg.validate_ddc);
            println!("  probe_inputs      = {}", cfg.probe_inputs);
            println!("  settle_delay_ms   = {}", cfg.settle_delay_ms);
            println!("\n── Timeouts ──");
            println!("  probe_timeout_ms  = {}", cfg.probe_timeout_ms);
            println!("  read_timeout_ms   = {}", cfg.read_timeout_ms);
            println!("  write_timeout_ms  = {}", cfg.write_timeout_ms);
            println!("  detect_timeout_ms = {}", cfg.detect_timeout_ms);
        }
        Some(ConfigAction::Path) => {
            println!("{}", config::config_path().display());
        }
        Some(ConfigAction::Reset) => {
            Config::write_default()?;
            println!(
                "[OK] Config reset to defaults at {}",
                config::config_path().display()
            );
        }
    }
    Ok(())
}
