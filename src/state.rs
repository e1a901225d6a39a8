//! Decoded axis/button values.
//!
//! [`InputState`] pairs each [`Mapping`] with the value array it indexes into.
//! Lookups accept a [`ControlKey`]: names are resolved through the mapping and,
//! failing that, parsed as a numeric index, so `"ax1_y"`, `"1"` and `1usize`
//! all address the same slot under the default gamepad layout.

use crate::error::{ControlKind, SessionError};
use crate::mapping::Mapping;
use std::fmt;

/// Addresses an axis or button by name or by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKey<'a> {
    Name(&'a str),
    Index(usize),
}

impl<'a> From<&'a str> for ControlKey<'a> {
    fn from(name: &'a str) -> Self {
        ControlKey::Name(name)
    }
}

impl<'a> From<&'a String> for ControlKey<'a> {
    fn from(name: &'a String) -> Self {
        ControlKey::Name(name.as_str())
    }
}

impl From<usize> for ControlKey<'_> {
    fn from(idx: usize) -> Self {
        ControlKey::Index(idx)
    }
}

impl fmt::Display for ControlKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlKey::Name(name) => f.write_str(name),
            ControlKey::Index(idx) => write!(f, "{idx}"),
        }
    }
}

/// Current values of every mapped axis and button.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    axis_mapping: Mapping,
    axes: Vec<f32>,
    button_mapping: Mapping,
    buttons: Vec<bool>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the axis mapping and zeroes the axis array to its size.
    pub fn set_axis_mapping(&mut self, mapping: Mapping) -> Result<(), SessionError> {
        if mapping.is_empty() {
            return Err(SessionError::MappingUnavailable(ControlKind::Axis));
        }
        self.axes = vec![0.0; mapping.len()];
        self.axis_mapping = mapping;
        Ok(())
    }

    /// Replaces the button mapping and clears the button array to its size.
    pub fn set_button_mapping(&mut self, mapping: Mapping) -> Result<(), SessionError> {
        if mapping.is_empty() {
            return Err(SessionError::MappingUnavailable(ControlKind::Button));
        }
        self.buttons = vec![false; mapping.len()];
        self.button_mapping = mapping;
        Ok(())
    }

    pub fn axis_mapping(&self) -> &Mapping {
        &self.axis_mapping
    }

    pub fn button_mapping(&self) -> &Mapping {
        &self.button_mapping
    }

    pub fn axis(&self, key: ControlKey<'_>) -> Result<f32, SessionError> {
        let idx = resolve(&self.axis_mapping, self.axes.len(), ControlKind::Axis, key)?;
        Ok(self.axes[idx])
    }

    pub fn set_axis(&mut self, key: ControlKey<'_>, value: f32) -> Result<(), SessionError> {
        let idx = resolve(&self.axis_mapping, self.axes.len(), ControlKind::Axis, key)?;
        self.axes[idx] = value;
        Ok(())
    }

    pub fn button(&self, key: ControlKey<'_>) -> Result<bool, SessionError> {
        let idx = resolve(
            &self.button_mapping,
            self.buttons.len(),
            ControlKind::Button,
            key,
        )?;
        Ok(self.buttons[idx])
    }

    pub fn set_button(&mut self, key: ControlKey<'_>, pressed: bool) -> Result<(), SessionError> {
        let idx = resolve(
            &self.button_mapping,
            self.buttons.len(),
            ControlKind::Button,
            key,
        )?;
        self.buttons[idx] = pressed;
        Ok(())
    }

    /// Axis values in index order.
    pub fn axes(&self) -> &[f32] {
        &self.axes
    }

    /// Button values in index order.
    pub fn buttons(&self) -> &[bool] {
        &self.buttons
    }

    /// Zeroes every value, keeping the mappings.
    pub fn reset_values(&mut self) {
        self.axes.iter_mut().for_each(|v| *v = 0.0);
        self.buttons.iter_mut().for_each(|v| *v = false);
    }
}

fn resolve(
    mapping: &Mapping,
    len: usize,
    kind: ControlKind,
    key: ControlKey<'_>,
) -> Result<usize, SessionError> {
    if mapping.is_empty() {
        return Err(SessionError::MappingUnavailable(kind));
    }

    let idx = match key {
        ControlKey::Index(idx) => Some(idx),
        ControlKey::Name(name) => mapping
            .index_of(name)
            .or_else(|| name.trim().parse::<usize>().ok()),
    };

    match idx {
        Some(idx) if idx < len => Ok(idx),
        _ => Err(SessionError::not_found(kind, key)),
    }
}
