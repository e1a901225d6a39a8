//! HID backends for `hidpad`.
//!
//! Implementations of [`HidTransport`](crate::device::HidTransport) plus the
//! gamepad enumeration helper.
//!
//! # Feature flags
//! - **`hid`**: enables [`hid::HidApiTransport`], backed by `hidapi` (default).
//!
//! [`virtual_input::VirtualTransport`] is always available; it keeps devices in
//! memory and is what the test suite runs against.

use crate::device::HidTransport;
use crate::error::TransportError;
use crate::metadata::DeviceDescriptor;
use serde::{Deserialize, Serialize};

#[cfg(feature = "hid")]
#[cfg_attr(docsrs, doc(cfg(feature = "hid")))]
pub mod hid;
pub mod virtual_input;

/// Which enumerated devices count as gamepads, judged on the product string.
///
/// Product strings are firmware- and locale-dependent, so this is a policy the
/// host application is expected to tune.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductFilter {
    /// Accept every device.
    Any,
    /// Product string contains the text (case-sensitive).
    Substring(String),
    /// Product string contains the text, ignoring ASCII case.
    SubstringIgnoreCase(String),
}

impl Default for ProductFilter {
    fn default() -> Self {
        ProductFilter::Substring("Joystick".into())
    }
}

impl ProductFilter {
    pub fn matches(&self, desc: &DeviceDescriptor) -> bool {
        let product = desc.product_string.as_deref().unwrap_or("");
        match self {
            ProductFilter::Any => true,
            ProductFilter::Substring(needle) => product.contains(needle.as_str()),
            ProductFilter::SubstringIgnoreCase(needle) => product
                .to_ascii_lowercase()
                .contains(&needle.to_ascii_lowercase()),
        }
    }
}

/// Enumerates attached devices and keeps the ones `filter` accepts.
///
/// Devices exposing several HID interfaces show up once per interface with
/// identical descriptors; duplicates are dropped, keeping enumeration order.
pub fn probe_gamepads(
    transport: &dyn HidTransport,
    filter: &ProductFilter,
) -> Result<Vec<DeviceDescriptor>, TransportError> {
    let mut found: Vec<DeviceDescriptor> = Vec::new();
    for desc in transport.enumerate()? {
        if filter.matches(&desc) && !found.contains(&desc) {
            found.push(desc);
        }
    }
    log::debug!("Discovered {} gamepad(s)", found.len());
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::virtual_input::VirtualTransport;
    use super::*;

    fn bus() -> VirtualTransport {
        let bus = VirtualTransport::new();
        bus.attach(DeviceDescriptor::new(1, 1).with_product("USB Joystick"));
        bus.attach(DeviceDescriptor::new(1, 1).with_product("USB Joystick"));
        bus.attach(DeviceDescriptor::new(2, 2).with_product("Keyboard"));
        bus.attach(DeviceDescriptor::new(3, 3).with_product("Twin USB joystick"));
        bus.attach(DeviceDescriptor::new(4, 4));
        bus
    }

    #[test]
    fn default_filter_is_case_sensitive_and_dedups() {
        let pads = probe_gamepads(&bus(), &ProductFilter::default()).unwrap();
        assert_eq!(pads, vec![DeviceDescriptor::new(1, 1).with_product("USB Joystick")]);
    }

    #[test]
    fn ignore_case_filter() {
        let filter = ProductFilter::SubstringIgnoreCase("JOYSTICK".into());
        let pads = probe_gamepads(&bus(), &filter).unwrap();
        let ids: Vec<u16> = pads.iter().map(|d| d.vendor_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn any_filter_keeps_unnamed_devices() {
        let pads = probe_gamepads(&bus(), &ProductFilter::Any).unwrap();
        assert_eq!(pads.len(), 4);
    }
}
