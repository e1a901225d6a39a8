//! `hidapi`-backed transport.
//!
//! [`HidApiTransport`] opens a fresh `hidapi` context per call, so it holds no
//! state and can be shared freely between sessions.

use crate::device::{HidHandle, HidTransport};
use crate::error::TransportError;
use crate::metadata::DeviceDescriptor;
use hidapi::{DeviceInfo, HidApi, HidDevice};

#[derive(Debug, Clone, Copy, Default)]
pub struct HidApiTransport;

impl HidTransport for HidApiTransport {
    fn enumerate(&self) -> Result<Vec<DeviceDescriptor>, TransportError> {
        let api = HidApi::new().map_err(|e| TransportError::Enumerate(e.to_string()))?;
        Ok(api.device_list().map(descriptor).collect())
    }

    fn open(&self, vendor_id: u16, product_id: u16) -> Result<Box<dyn HidHandle>, TransportError> {
        let open_err = |reason: String| TransportError::Open {
            vendor_id,
            product_id,
            reason,
        };
        let api = HidApi::new().map_err(|e| open_err(e.to_string()))?;
        let device = api
            .open(vendor_id, product_id)
            .map_err(|e| open_err(e.to_string()))?;
        Ok(Box::new(HidApiHandle { raw: device }))
    }
}

fn descriptor(info: &DeviceInfo) -> DeviceDescriptor {
    DeviceDescriptor {
        vendor_id: info.vendor_id(),
        product_id: info.product_id(),
        manufacturer_string: info.manufacturer_string().map(str::to_string),
        product_string: info.product_string().map(str::to_string),
    }
}

struct HidApiHandle {
    raw: HidDevice,
}

impl HidHandle for HidApiHandle {
    fn set_nonblocking(&mut self, nonblocking: bool) -> Result<(), TransportError> {
        self.raw
            .set_blocking_mode(!nonblocking)
            .map_err(|e| TransportError::Configure(e.to_string()))
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        self.raw
            .read(buf)
            .map_err(|e| TransportError::Read(e.to_string()))
    }
}
