//! In-memory transport.
//!
//! [`VirtualTransport`] simulates a bus of HID devices: attach descriptors, feed
//! reports, unplug devices mid-session, and make opens or the non-blocking switch
//! fail. Clones share the same bus, so a test can keep one clone to drive the
//! devices while a session owns another.

use crate::device::{HidHandle, HidTransport};
use crate::error::TransportError;
use crate::metadata::DeviceDescriptor;
use crate::session::lock;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug)]
struct VirtualDevice {
    desc: DeviceDescriptor,
    plugged: bool,
    fail_configure: bool,
    reports: VecDeque<Vec<u8>>,
}

#[derive(Debug, Default)]
struct Bus {
    devices: Vec<VirtualDevice>,
}

impl Bus {
    fn find_mut(&mut self, vendor_id: u16, product_id: u16) -> Option<&mut VirtualDevice> {
        self.devices
            .iter_mut()
            .find(|d| d.desc.vendor_id == vendor_id && d.desc.product_id == product_id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct VirtualTransport {
    bus: Arc<Mutex<Bus>>,
}

impl VirtualTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a device to the bus. Attaching the same descriptor twice lists it
    /// twice, like a device exposing two interfaces.
    pub fn attach(&self, desc: DeviceDescriptor) {
        lock(&self.bus).devices.push(VirtualDevice {
            desc,
            plugged: true,
            fail_configure: false,
            reports: VecDeque::new(),
        });
    }

    /// Queues one input report on the device.
    pub fn feed(&self, vendor_id: u16, product_id: u16, report: &[u8]) {
        if let Some(dev) = lock(&self.bus).find_mut(vendor_id, product_id) {
            dev.reports.push_back(report.to_vec());
        }
    }

    /// Makes reads on open handles fail and new opens fail until [`replug`](Self::replug).
    pub fn unplug(&self, vendor_id: u16, product_id: u16) {
        if let Some(dev) = lock(&self.bus).find_mut(vendor_id, product_id) {
            dev.plugged = false;
            dev.reports.clear();
        }
    }

    pub fn replug(&self, vendor_id: u16, product_id: u16) {
        if let Some(dev) = lock(&self.bus).find_mut(vendor_id, product_id) {
            dev.plugged = true;
        }
    }

    /// Makes `set_nonblocking` fail on handles opened from now on.
    pub fn fail_configure(&self, vendor_id: u16, product_id: u16, fail: bool) {
        if let Some(dev) = lock(&self.bus).find_mut(vendor_id, product_id) {
            dev.fail_configure = fail;
        }
    }

    /// Number of reports fed but not yet read.
    pub fn pending(&self, vendor_id: u16, product_id: u16) -> usize {
        lock(&self.bus)
            .find_mut(vendor_id, product_id)
            .map_or(0, |d| d.reports.len())
    }
}

impl HidTransport for VirtualTransport {
    fn enumerate(&self) -> Result<Vec<DeviceDescriptor>, TransportError> {
        Ok(lock(&self.bus)
            .devices
            .iter()
            .filter(|d| d.plugged)
            .map(|d| d.desc.clone())
            .collect())
    }

    fn open(&self, vendor_id: u16, product_id: u16) -> Result<Box<dyn HidHandle>, TransportError> {
        let mut bus = lock(&self.bus);
        match bus.find_mut(vendor_id, product_id) {
            Some(dev) if dev.plugged => Ok(Box::new(VirtualHandle {
                bus: Arc::clone(&self.bus),
                vendor_id,
                product_id,
                fail_configure: dev.fail_configure,
            })),
            _ => Err(TransportError::Open {
                vendor_id,
                product_id,
                reason: "no such device".into(),
            }),
        }
    }
}

struct VirtualHandle {
    bus: Arc<Mutex<Bus>>,
    vendor_id: u16,
    product_id: u16,
    fail_configure: bool,
}

impl HidHandle for VirtualHandle {
    fn set_nonblocking(&mut self, _nonblocking: bool) -> Result<(), TransportError> {
        if self.fail_configure {
            return Err(TransportError::Configure("rejected by device".into()));
        }
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let mut bus = lock(&self.bus);
        let Some(dev) = bus.find_mut(self.vendor_id, self.product_id) else {
            return Err(TransportError::Read("device removed".into()));
        };
        if !dev.plugged {
            return Err(TransportError::Read("device disconnected".into()));
        }
        // Reads never block, whatever mode was requested.
        let Some(report) = dev.reports.pop_front() else {
            return Ok(0);
        };
        let n = report.len().min(buf.len());
        buf[..n].copy_from_slice(&report[..n]);
        Ok(n)
    }
}
