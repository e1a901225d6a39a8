//! Transport seam.
//!
//! A session never talks to the OS directly. It enumerates and opens devices
//! through [`HidTransport`] and reads reports through the [`HidHandle`] it gets
//! back. See [`crate::backends`] for the implementations shipped with the crate.

use crate::error::TransportError;
use crate::metadata::DeviceDescriptor;

/// Access to the platform HID layer.
pub trait HidTransport: Send + Sync {
    /// List every attached HID device.
    fn enumerate(&self) -> Result<Vec<DeviceDescriptor>, TransportError>;

    /// Open the first device matching `vendor_id`/`product_id`.
    fn open(&self, vendor_id: u16, product_id: u16) -> Result<Box<dyn HidHandle>, TransportError>;
}

/// An open device.
pub trait HidHandle: Send {
    /// Switch between blocking and non-blocking reads.
    fn set_nonblocking(&mut self, nonblocking: bool) -> Result<(), TransportError>;

    /// Read one report into `buf`.
    ///
    /// In non-blocking mode this returns `Ok(0)` immediately when no report is pending.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Release the OS handle.
    fn close(self: Box<Self>) {}
}
