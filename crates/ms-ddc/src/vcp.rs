//! VCP feature codes (MCCS standard) used by this tool.

use std::fmt;
use std::str::FromStr;

/// `get brightness` / `set brightness`; also the register the validation
/// round trip writes.
pub const VCP_BRIGHTNESS: u8 = 0x10;

pub const VCP_CONTRAST: u8 = 0x12;

/// Read by `status`, written by `switch`. See [`crate::inputs`] for the
/// value tables.
pub const VCP_INPUT_SOURCE: u8 = 0x60;

/// Speaker volume, for monitors with built-in audio.
pub const VCP_VOLUME: u8 = 0x62;

/// The features every transport must be able to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Brightness,
    Contrast,
    InputSource,
    Volume,
}

impl Feature {
    pub const ALL: [Feature; 4] = [
        Feature::Brightness,
        Feature::Contrast,
        Feature::InputSource,
        Feature::Volume,
    ];

    pub fn code(self) -> u8 {
        match self {
            Feature::Brightness => VCP_BRIGHTNESS,
            Feature::Contrast => VCP_CONTRAST,
            Feature::InputSource => VCP_INPUT_SOURCE,
            Feature::Volume => VCP_VOLUME,
        }
    }

    pub fn from_code(code: u8) -> Option<Feature> {
        Feature::ALL.into_iter().find(|f| f.code() == code)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Feature::Brightness => "brightness",
            Feature::Contrast => "contrast",
            Feature::InputSource => "input",
            Feature::Volume => "volume",
        })
    }
}

impl FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "brightness" | "luminance" => Ok(Feature::Brightness),
            "contrast" => Ok(Feature::Contrast),
            "input" | "input-source" | "source" => Ok(Feature::InputSource),
            "volume" => Ok(Feature::Volume),
            other => Err(format!(
                "unknown feature '{}' (expected brightness, contrast, input or volume)",
                other
            )),
        }
    }
}
