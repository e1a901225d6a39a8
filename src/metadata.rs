//! Device identity.
//!
//! [`DeviceDescriptor`] is the lightweight, cloneable description of an attached
//! device that enumeration hands out and [`Session::connect`] consumes. Backends
//! populate what they know; strings the platform does not report remain `None`.
//!
//! ## Persistence notes
//! - `vendor_id`/`product_id` are what a session reopens the device with, so they
//!   are the only fields `reconnect` relies on.
//! - The strings come straight from firmware and often carry trailing whitespace;
//!   trim before comparing.
//!
//! # Example
//! ```no_run
//! use hidpad::backends::{hid::HidApiTransport, probe_gamepads, ProductFilter};
//!
//! let pads = probe_gamepads(&HidApiTransport, &ProductFilter::default()).expect("enumerate");
//! for pad in &pads {
//!     println!("{pad}");
//! }
//! ```
//!
//! [`Session::connect`]: crate::session::Session::connect

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one physical HID device.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    /// USB Vendor ID (VID).
    pub vendor_id: u16,

    /// USB Product ID (PID).
    pub product_id: u16,

    /// Manufacturer name reported by the firmware, if any.
    pub manufacturer_string: Option<String>,

    /// Human-readable product name reported by the firmware, if any.
    pub product_string: Option<String>,
}

impl DeviceDescriptor {
    pub fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
            ..Default::default()
        }
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer_string = Some(manufacturer.into());
        self
    }

    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product_string = Some(product.into());
        self
    }

    /// Trimmed manufacturer string, or `""` when unknown.
    pub fn manufacturer(&self) -> &str {
        self.manufacturer_string.as_deref().unwrap_or("").trim()
    }

    /// Trimmed product string, or `""` when unknown.
    pub fn product(&self) -> &str {
        self.product_string.as_deref().unwrap_or("").trim()
    }
}

impl fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04x}:{:04x} manufacturer={:?} product={:?}",
            self.vendor_id,
            self.product_id,
            self.manufacturer(),
            self.product()
        )
    }
}
