use std::time::Duration;
use std::{error, fmt, io};

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DdcError>;

/// An error that can occur while detecting or controlling monitors.
#[derive(Debug)]
pub enum DdcError {
    /// No usable DDC helper (or native transport) on this host.
    ToolNotFound {
        /// Remediation hint shown to the user.
        hint: String,
    },
    /// The running operating system has no transport.
    UnsupportedOs(String),
    /// The selected tool has no sub-command for this VCP code.
    UnsupportedFeature { tool: &'static str, code: u8 },
    /// A monitor identifier the transport cannot interpret.
    InvalidMonitorId(String),
    /// The helper binary could not be started.
    Spawn { program: String, source: io::Error },
    /// The helper binary exited unsuccessfully.
    CommandFailed {
        program: String,
        status: Option<i32>,
        stderr: String,
    },
    /// The helper binary did not finish before its deadline.
    Timeout { program: String, timeout: Duration },
    /// Output did not match any known pattern. Carries the trimmed raw output.
    Parse { what: String, raw: String },
    /// A DDC/CI reply or structured file failed an integrity check.
    Protocol(String),
    /// The native transport returned a non-zero status code.
    Native { status: i32, message: String },
    /// The backend exists but the operation is not available on it.
    NotImplemented(&'static str),
    /// Every candidate of a fallback chain failed.
    Exhausted(Vec<String>),
    Io(io::Error),
    Json(serde_json::Error),
}

impl DdcError {
    pub(crate) fn parse(what: impl Into<String>, raw: &str) -> Self {
        DdcError::Parse {
            what: what.into(),
            raw: raw.trim().to_string(),
        }
    }
}

impl fmt::Display for DdcError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DdcError::ToolNotFound { ref hint } => write!(f, "no DDC tools available ({})", hint),
            DdcError::UnsupportedOs(ref os) => write!(f, "unsupported OS: {}", os),
            DdcError::UnsupportedFeature { tool, code } => {
                write!(f, "unsupported VCP code for {}: 0x{:02X}", tool, code)
            }
            DdcError::InvalidMonitorId(ref id) => write!(f, "invalid monitor ID: {}", id),
            DdcError::Spawn {
                ref program,
                ref source,
            } => write!(f, "failed to run {}: {}", program, source),
            DdcError::CommandFailed {
                ref program,
                status,
                ref stderr,
            } => {
                match status {
                    Some(code) => write!(f, "{} exited with status {}", program, code)?,
                    None => write!(f, "{} was terminated by a signal", program)?,
                }
                if !stderr.is_empty() {
                    write!(f, ": {}", stderr)?;
                }
                Ok(())
            }
            DdcError::Timeout {
                ref program,
                timeout,
            } => write!(f, "{} timed out after {} ms", program, timeout.as_millis()),
            DdcError::Parse { ref what, ref raw } => {
                write!(f, "could not parse {} from output: '{}'", what, raw)
            }
            DdcError::Protocol(ref msg) => write!(f, "DDC/CI protocol error: {}", msg),
            DdcError::Native { status, ref message } => {
                write!(f, "native DDC call failed ({}): {}", status, message)
            }
            DdcError::NotImplemented(what) => write!(f, "{} not implemented yet", what),
            DdcError::Exhausted(ref attempts) => {
                write!(f, "all sources failed: {}", attempts.join("; "))
            }
            DdcError::Io(ref e) => write!(f, "I/O error: {}", e),
            DdcError::Json(ref e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl error::Error for DdcError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            DdcError::Spawn { ref source, .. } => Some(source),
            DdcError::Io(ref e) => Some(e),
            DdcError::Json(ref e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for DdcError {
    fn from(e: io::Error) -> Self {
        DdcError::Io(e)
    }
}

impl From<serde_json::Error> for DdcError {
    fn from(e: serde_json::Error) -> Self {
        DdcError::Json(e)
    }
}
