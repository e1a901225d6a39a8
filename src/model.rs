//! Controller models and their report decoders.
//!
//! Each [`ControllerModel`] carries a fixed axis/button [`Mapping`] and a decode
//! function translating one raw report into [`InputState`] values. Adding a model
//! means adding a variant, its mappings, and an arm in [`ControllerModel::decode`].
//!
//! ## Esperanza / Microntek layout
//! | byte | bits | meaning |
//! |------|------|---------|
//! | 1–4  | all  | `ax1_x`, `ax1_y`, `ax2_x`, `ax2_y`, centred on 128 |
//! | 5    | 0–3  | d-pad nibble (`ax3_x`, `ax3_y`) |
//! | 5    | 4–7  | face buttons `b_1`..`b_4` |
//! | 6    | 0–3  | `l_1`, `r_1`, `l_2`, `r_2` |
//! | 6    | 4–7  | `select`, `start`, `l_b`, `r_b` |

use crate::error::{ConfigError, SessionError};
use crate::mapping::Mapping;
use crate::metadata::DeviceDescriptor;
use crate::state::InputState;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Shortest report the gamepad layout can decode.
const GAMEPAD_REPORT_LEN: usize = 7;

const GAMEPAD_AXES: [(&str, usize); 6] = [
    ("ax1_x", 0),
    ("ax1_y", 1),
    ("ax2_x", 2),
    ("ax2_y", 3),
    ("ax3_x", 4),
    ("ax3_y", 5),
];

const GAMEPAD_BUTTONS: [(&str, usize); 13] = [
    ("l_1", 0),
    ("l_2", 1),
    ("r_1", 2),
    ("r_2", 3),
    ("b_1", 4),
    ("b_2", 5),
    ("b_3", 6),
    ("b_4", 7),
    ("l_b", 8),
    ("r_b", 9),
    ("select", 10),
    ("start", 11),
    ("analog", 12),
];

/// Supported controller families.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerModel {
    /// Raw reports only: no mappings, nothing decoded.
    #[default]
    Generic,
    /// Esperanza EG102 USB PC gamepad.
    Esperanza,
    /// Microntek USB gamepad. Only connects to devices reporting the Microntek manufacturer string.
    Microntek,
}

impl ControllerModel {
    pub fn name(&self) -> &'static str {
        match self {
            ControllerModel::Generic => "generic",
            ControllerModel::Esperanza => "esperanza",
            ControllerModel::Microntek => "microntek",
        }
    }

    /// Axis table installed on sessions of this model, if it decodes axes.
    pub fn axis_mapping(&self) -> Option<Mapping> {
        match self {
            ControllerModel::Generic => None,
            ControllerModel::Esperanza | ControllerModel::Microntek => {
                Some(Mapping::new(GAMEPAD_AXES))
            }
        }
    }

    /// Button table installed on sessions of this model, if it decodes buttons.
    pub fn button_mapping(&self) -> Option<Mapping> {
        match self {
            ControllerModel::Generic => None,
            ControllerModel::Esperanza | ControllerModel::Microntek => {
                Some(Mapping::new(GAMEPAD_BUTTONS))
            }
        }
    }

    /// Checks whether this model may drive `desc`.
    pub fn accepts(&self, desc: &DeviceDescriptor) -> Result<(), SessionError> {
        match self {
            ControllerModel::Microntek
                if !desc.manufacturer().eq_ignore_ascii_case("microntek") =>
            {
                Err(SessionError::UnsupportedDevice(format!(
                    "{desc} is not a Microntek gamepad"
                )))
            }
            _ => Ok(()),
        }
    }

    /// Decodes `report` into `state`.
    ///
    /// Fails without touching `state` when the report is shorter than the layout.
    pub fn decode(&self, report: &[u8], state: &mut InputState) -> Result<(), SessionError> {
        match self {
            ControllerModel::Generic => Ok(()),
            ControllerModel::Esperanza | ControllerModel::Microntek => {
                decode_gamepad(report, state)
            }
        }
    }
}

impl fmt::Display for ControllerModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ControllerModel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generic" => Ok(ControllerModel::Generic),
            "esperanza" => Ok(ControllerModel::Esperanza),
            "microntek" => Ok(ControllerModel::Microntek),
            _ => Err(ConfigError::UnknownModel(s.to_string())),
        }
    }
}

#[inline]
fn stick(byte: u8) -> f32 {
    (f32::from(byte) - 128.0) / 128.0
}

#[inline]
fn bit(byte: u8, mask: u8) -> bool {
    byte & mask == mask
}

/// Writes one decoded axis. Names the current mapping leaves out are skipped,
/// so a caller-installed partial mapping still gets the controls it names.
fn write_axis(state: &mut InputState, name: &str, value: f32) -> Result<(), SessionError> {
    match state.set_axis(name.into(), value) {
        Err(SessionError::NotFound { .. }) => Ok(()),
        other => other,
    }
}

fn write_button(state: &mut InputState, name: &str, pressed: bool) -> Result<(), SessionError> {
    match state.set_button(name.into(), pressed) {
        Err(SessionError::NotFound { .. }) => Ok(()),
        other => other,
    }
}

fn decode_gamepad(report: &[u8], state: &mut InputState) -> Result<(), SessionError> {
    if report.len() < GAMEPAD_REPORT_LEN {
        return Err(SessionError::ShortReport {
            expected: GAMEPAD_REPORT_LEN,
            actual: report.len(),
        });
    }

    write_axis(state, "ax1_x", stick(report[1]))?;
    write_axis(state, "ax1_y", stick(report[2]))?;
    write_axis(state, "ax2_x", stick(report[3]))?;
    write_axis(state, "ax2_y", stick(report[4]))?;

    // D-pad. Each arm only writes one axis, the other keeps its last value.
    // The device's "down" bit (0b0100) on its own lands in the final arm and
    // reads as up; existing users depend on that.
    let hat = report[5];
    if bit(hat, 0b0000_1111) {
        write_axis(state, "ax3_x", 0.0)?;
        write_axis(state, "ax3_y", 0.0)?;
    } else if bit(hat, 0b0000_0110) {
        write_axis(state, "ax3_x", -1.0)?;
    } else if bit(hat, 0b0000_0010) {
        write_axis(state, "ax3_x", 1.0)?;
    } else {
        write_axis(state, "ax3_y", -1.0)?;
    }

    write_button(state, "b_1", bit(report[5], 0b0001_0000))?;
    write_button(state, "b_2", bit(report[5], 0b0010_0000))?;
    write_button(state, "b_3", bit(report[5], 0b0100_0000))?;
    write_button(state, "b_4", bit(report[5], 0b1000_0000))?;

    write_button(state, "l_1", bit(report[6], 0b0000_0001))?;
    write_button(state, "r_1", bit(report[6], 0b0000_0010))?;
    write_button(state, "l_2", bit(report[6], 0b0000_0100))?;
    write_button(state, "r_2", bit(report[6], 0b0000_1000))?;

    write_button(state, "select", bit(report[6], 0b0001_0000))?;
    write_button(state, "start", bit(report[6], 0b0010_0000))?;
    write_button(state, "l_b", bit(report[6], 0b0100_0000))?;
    write_button(state, "r_b", bit(report[6], 0b1000_0000))?;

    Ok(())
}
