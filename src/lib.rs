//! hidpad: polling sessions over HID joysticks and gamepads.
//!
//! Enumerate devices, open one in a [`Session`], read raw HID reports and decode
//! them into named axis/button values with a per-model decoder, either by calling
//! [`Session::update_state`] yourself or on a background thread.
//!
//! ```no_run
//! use std::sync::Arc;
//! use hidpad::backends::{hid::HidApiTransport, probe_gamepads, ProductFilter};
//! use hidpad::{ControllerModel, Session};
//!
//! let transport = Arc::new(HidApiTransport);
//! let pads = probe_gamepads(transport.as_ref(), &ProductFilter::default()).expect("enumerate");
//! let session = Session::new(transport, ControllerModel::Esperanza);
//! session.connect(&pads[0]).expect("connect");
//! if session.update_state().expect("read") {
//!     println!("left stick x = {}", session.get_axis_state("ax1_x").unwrap());
//! }
//! ```

pub mod backends;
pub mod config;
pub mod device;
pub mod error;
pub mod mapping;
pub mod metadata;
pub mod model;
mod poller;
pub mod session;
pub mod snapshot;
pub mod state;

pub use config::SessionConfig;
pub use device::{HidHandle, HidTransport};
pub use error::{ConfigError, ControlKind, SessionError, TransportError};
pub use mapping::Mapping;
pub use metadata::DeviceDescriptor;
pub use model::ControllerModel;
pub use session::Session;
pub use snapshot::Snapshot;
pub use state::{ControlKey, InputState};
