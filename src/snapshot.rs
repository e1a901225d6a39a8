//! Point-in-time view of a session.
//!
//! [`Snapshot`] is an **owned**, read-only copy of one session's connection
//! flag, last raw report and named axis/button values, produced by
//! [`Session::snapshot`](crate::session::Session::snapshot). It is cheap to clone
//! for fan-out and serializes to JSON for logging or IPC.
//!
//! # Semantics
//! - Keys are the control names from the session's mappings; a model without
//!   mappings yields empty maps.
//! - A snapshot does **not** poll. Call `update_state()` (or run background
//!   polling) and take a new snapshot to refresh.
//!
//! # Example
//! ```no_run
//! use hidpad::Snapshot;
//!
//! fn print_sticks(snap: &Snapshot) {
//!     let x = snap.get_axis("ax1_x");
//!     let y = snap.get_axis("ax1_y");
//!     println!("X={x:.2} Y={y:.2} start={}", snap.get_button("start"));
//! }
//! ```

use crate::metadata::DeviceDescriptor;
use crate::state::InputState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Owned snapshot of one session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub connected: bool,
    pub descriptor: Option<DeviceDescriptor>,
    pub raw: Vec<u8>,
    pub axes: BTreeMap<String, f32>,
    pub buttons: BTreeMap<String, bool>,
}

impl Snapshot {
    pub(crate) fn capture(
        connected: bool,
        descriptor: Option<DeviceDescriptor>,
        raw: Vec<u8>,
        state: &InputState,
    ) -> Self {
        let axes = state
            .axis_mapping()
            .iter()
            .filter_map(|(name, idx)| Some((name.to_string(), *state.axes().get(idx)?)))
            .collect();
        let buttons = state
            .button_mapping()
            .iter()
            .filter_map(|(name, idx)| Some((name.to_string(), *state.buttons().get(idx)?)))
            .collect();

        Self {
            connected,
            descriptor,
            raw,
            axes,
            buttons,
        }
    }

    /// Value of a named axis (0.0 if missing).
    #[inline]
    pub fn get_axis(&self, name: &str) -> f32 {
        self.axes.get(name).copied().unwrap_or(0.0)
    }

    /// State of a named button (false if missing).
    #[inline]
    pub fn get_button(&self, name: &str) -> bool {
        self.buttons.get(name).copied().unwrap_or(false)
    }

    /// Compact JSON encoding.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::Mapping;

    #[test]
    fn captures_named_values() {
        let mut state = InputState::new();
        state
            .set_axis_mapping(Mapping::new([("x", 0), ("y", 1)]))
            .unwrap();
        state
            .set_button_mapping(Mapping::new([("fire", 0)]))
            .unwrap();
        state.set_axis("y".into(), 0.5).unwrap();
        state.set_button("fire".into(), true).unwrap();

        let snap = Snapshot::capture(true, None, vec![1, 2], &state);
        assert_eq!(snap.get_axis("y"), 0.5);
        assert_eq!(snap.get_axis("missing"), 0.0);
        assert!(snap.get_button("fire"));
        assert_eq!(snap.axes.len(), 2);
    }

    #[test]
    fn serializes_to_json() {
        let snap = Snapshot {
            connected: true,
            raw: vec![0, 128],
            ..Default::default()
        };
        let json = snap.to_json().unwrap();
        assert_eq!(
            json,
            r#"{"connected":true,"descriptor":null,"raw":[0,128],"axes":{},"buttons":{}}"#
        );
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }
}
