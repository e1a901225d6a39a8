//! Device session: connection lifecycle, polling, and state queries.
//!
//! A [`Session`] drives one gamepad through the [`HidTransport`] seam:
//!
//! ```text
//! Disconnected ──connect/reconnect──▶ Connected
//!      ▲                                  │
//!      └──── disconnect / failed read ────┘
//! ```
//!
//! Background polling ([`Session::start_asynchronous`]) is orthogonal to that
//! state machine: a lost connection does not stop the polling thread, it keeps
//! retrying until the caller reconnects or stops it.
//!
//! Two locks split the shared core. The *link* lock guards the handle, the
//! connected flag and the last raw report; a report is read and stored under it.
//! The *state* lock guards the mappings and decoded values; decoding happens
//! after the link lock has been released.

use crate::config::SessionConfig;
use crate::device::{HidHandle, HidTransport};
use crate::error::SessionError;
use crate::mapping::Mapping;
use crate::metadata::DeviceDescriptor;
use crate::model::ControllerModel;
use crate::poller::Poller;
use crate::snapshot::Snapshot;
use crate::state::{ControlKey, InputState};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Largest report read in one go.
pub const MAX_REPORT_LEN: usize = 128;

/// Default background polling period.
pub const POLL_PERIOD: Duration = Duration::from_millis(100);

/// Every write under these locks is a single assignment, so a panic while
/// holding one cannot leave the data half-updated.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct Link {
    handle: Option<Box<dyn HidHandle>>,
    connected: bool,
    descriptor: Option<DeviceDescriptor>,
    raw: Vec<u8>,
}

impl Link {
    fn drop_handle(&mut self) {
        self.connected = false;
        if let Some(handle) = self.handle.take() {
            handle.close();
        }
    }
}

/// State shared between a [`Session`] and its polling thread.
pub(crate) struct Core {
    transport: Arc<dyn HidTransport>,
    model: ControllerModel,
    max_report_len: usize,
    link: Mutex<Link>,
    state: Mutex<InputState>,
}

impl Core {
    fn open(&self, desc: DeviceDescriptor) -> Result<(), SessionError> {
        let mut link = lock(&self.link);
        link.drop_handle();

        let mut handle = self
            .transport
            .open(desc.vendor_id, desc.product_id)
            .map_err(|err| {
                log::warn!("Unable to connect with {desc}: {err}");
                err
            })?;

        if let Err(err) = handle.set_nonblocking(true) {
            log::warn!("Unable to switch {desc} to non-blocking reads: {err}");
            handle.close();
            return Err(err.into());
        }

        log::info!("Connection with {desc} has been established");
        link.handle = Some(handle);
        link.connected = true;
        link.descriptor = Some(desc);
        Ok(())
    }

    fn read_locked(&self, link: &mut Link) -> Result<Vec<u8>, SessionError> {
        if !link.connected {
            return Err(SessionError::Disconnected);
        }
        let Some(handle) = link.handle.as_mut() else {
            link.connected = false;
            return Err(SessionError::Disconnected);
        };

        let mut buf = vec![0u8; self.max_report_len];
        match handle.read(&mut buf) {
            Ok(n) => {
                buf.truncate(n);
                Ok(buf)
            }
            Err(err) => {
                log::warn!("Device connection lost: {err}");
                link.drop_handle();
                Err(err.into())
            }
        }
    }

    /// Reads one report and decodes it. `Ok(false)` means nothing was pending.
    pub(crate) fn update_state(&self) -> Result<bool, SessionError> {
        let report = {
            let mut link = lock(&self.link);
            let data = self.read_locked(&mut link)?;
            if data.is_empty() {
                return Ok(false);
            }
            log::trace!("report ({} bytes): {:02x?}", data.len(), data);
            link.raw.clone_from(&data);
            data
        };

        let mut state = lock(&self.state);
        self.model.decode(&report, &mut state)?;
        Ok(true)
    }
}

/// Polling session for one HID gamepad.
///
/// All methods take `&self`; share a session across threads with an `Arc`.
/// Dropping the session stops polling and closes the device.
pub struct Session {
    core: Arc<Core>,
    poll_period: Duration,
    poller: Mutex<Option<Poller>>,
}

impl Session {
    /// Creates a disconnected session with the model's mappings installed.
    pub fn new(transport: Arc<dyn HidTransport>, model: ControllerModel) -> Self {
        Self::build(transport, model, MAX_REPORT_LEN, POLL_PERIOD)
    }

    /// Zero `poll_period_ms` or `max_report_len` fall back to the defaults.
    pub fn with_config(transport: Arc<dyn HidTransport>, config: &SessionConfig) -> Self {
        Self::build(
            transport,
            config.model,
            config.report_len(),
            config.poll_period(),
        )
    }

    fn build(
        transport: Arc<dyn HidTransport>,
        model: ControllerModel,
        max_report_len: usize,
        poll_period: Duration,
    ) -> Self {
        // Model tables are never empty, so installing them cannot fail.
        let mut state = InputState::new();
        if let Some(mapping) = model.axis_mapping() {
            let installed = state.set_axis_mapping(mapping);
            debug_assert!(installed.is_ok(), "{model} axis table rejected");
        }
        if let Some(mapping) = model.button_mapping() {
            let installed = state.set_button_mapping(mapping);
            debug_assert!(installed.is_ok(), "{model} button table rejected");
        }

        Self {
            core: Arc::new(Core {
                transport,
                model,
                max_report_len,
                link: Mutex::new(Link::default()),
                state: Mutex::new(state),
            }),
            poll_period,
            poller: Mutex::new(None),
        }
    }

    pub fn model(&self) -> ControllerModel {
        self.core.model
    }

    pub fn is_connected(&self) -> bool {
        lock(&self.core.link).connected
    }

    /// Descriptor of the last device successfully connected.
    pub fn descriptor(&self) -> Option<DeviceDescriptor> {
        lock(&self.core.link).descriptor.clone()
    }

    pub fn vendor_id(&self) -> Option<u16> {
        lock(&self.core.link).descriptor.as_ref().map(|d| d.vendor_id)
    }

    pub fn product_id(&self) -> Option<u16> {
        lock(&self.core.link).descriptor.as_ref().map(|d| d.product_id)
    }

    /// Last non-empty report stored by [`update_state`](Self::update_state).
    pub fn raw_inputs(&self) -> Vec<u8> {
        lock(&self.core.link).raw.clone()
    }

    /// Opens `desc` in non-blocking mode.
    ///
    /// On failure the session is left disconnected.
    pub fn connect(&self, desc: &DeviceDescriptor) -> Result<(), SessionError> {
        if let Err(err) = self.core.model.accepts(desc) {
            log::debug!("{} session rejected {desc}", self.core.model);
            lock(&self.core.link).drop_handle();
            return Err(err);
        }
        self.core.open(desc.clone())
    }

    /// Reopens the device from the last successful [`connect`](Self::connect).
    pub fn reconnect(&self) -> Result<(), SessionError> {
        let desc = lock(&self.core.link)
            .descriptor
            .clone()
            .ok_or(SessionError::InvalidOperation(
                "no device was previously connected",
            ))?;
        self.core.open(desc)
    }

    /// Stops polling, closes the device and resets decoded values.
    ///
    /// Mappings and the stored descriptor survive so [`reconnect`](Self::reconnect)
    /// still works.
    pub fn disconnect(&self) -> Result<(), SessionError> {
        self.stop_asynchronous();

        {
            let mut link = lock(&self.core.link);
            if !link.connected {
                return Err(SessionError::Disconnected);
            }
            link.drop_handle();
            link.raw.clear();
        }
        lock(&self.core.state).reset_values();

        log::info!("Device disconnected");
        Ok(())
    }

    /// Reads whatever report is pending without storing or decoding it.
    ///
    /// A read error marks the session disconnected.
    pub fn read_raw_bits(&self) -> Result<Vec<u8>, SessionError> {
        let mut link = lock(&self.core.link);
        self.core.read_locked(&mut link)
    }

    /// Reads and decodes one report.
    ///
    /// Returns `Ok(true)` if a report was decoded, `Ok(false)` if none was pending.
    pub fn update_state(&self) -> Result<bool, SessionError> {
        self.core.update_state()
    }

    pub fn get_axis_state<'a>(&self, key: impl Into<ControlKey<'a>>) -> Result<f32, SessionError> {
        lock(&self.core.state).axis(key.into())
    }

    pub fn set_axis_state<'a>(
        &self,
        key: impl Into<ControlKey<'a>>,
        value: f32,
    ) -> Result<(), SessionError> {
        lock(&self.core.state).set_axis(key.into(), value)
    }

    pub fn get_button_state<'a>(
        &self,
        key: impl Into<ControlKey<'a>>,
    ) -> Result<bool, SessionError> {
        lock(&self.core.state).button(key.into())
    }

    pub fn set_button_state<'a>(
        &self,
        key: impl Into<ControlKey<'a>>,
        pressed: bool,
    ) -> Result<(), SessionError> {
        lock(&self.core.state).set_button(key.into(), pressed)
    }

    /// Installs a non-empty axis mapping, zeroing every axis.
    pub fn set_axis_mapping(&self, mapping: Mapping) -> Result<(), SessionError> {
        lock(&self.core.state).set_axis_mapping(mapping)
    }

    /// Installs a non-empty button mapping, releasing every button.
    pub fn set_button_mapping(&self, mapping: Mapping) -> Result<(), SessionError> {
        lock(&self.core.state).set_button_mapping(mapping)
    }

    pub fn axis_names(&self) -> Vec<String> {
        lock(&self.core.state).axis_mapping().names()
    }

    pub fn button_names(&self) -> Vec<String> {
        lock(&self.core.state).button_mapping().names()
    }

    /// Starts calling [`update_state`](Self::update_state) on a background thread
    /// once per polling period.
    ///
    /// Fails with [`SessionError::InvalidOperation`] if polling is already running.
    pub fn start_asynchronous(&self) -> Result<(), SessionError> {
        let mut poller = lock(&self.poller);
        if poller.is_some() {
            return Err(SessionError::InvalidOperation("polling is already running"));
        }
        *poller = Some(Poller::spawn(Arc::clone(&self.core), self.poll_period)?);
        Ok(())
    }

    /// Asks the polling thread to stop and waits for it.
    ///
    /// The thread notices the request on its next wake-up, so this can take up
    /// to one polling period. Does nothing if polling is not running.
    pub fn stop_asynchronous(&self) {
        let poller = lock(&self.poller).take();
        if let Some(poller) = poller {
            poller.stop();
        }
    }

    pub fn is_polling(&self) -> bool {
        lock(&self.poller).is_some()
    }

    /// Owned view of the connection, raw report and named values.
    pub fn snapshot(&self) -> Snapshot {
        let (connected, descriptor, raw) = {
            let link = lock(&self.core.link);
            (link.connected, link.descriptor.clone(), link.raw.clone())
        };
        let state = lock(&self.core.state);
        Snapshot::capture(connected, descriptor, raw, &state)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop_asynchronous();
        let _ = self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::virtual_input::VirtualTransport;

    const VID: u16 = 0x0079;
    const PID: u16 = 0x0006;

    fn pad() -> DeviceDescriptor {
        DeviceDescriptor::new(VID, PID)
            .with_manufacturer("Esperanza")
            .with_product("USB Joystick")
    }

    fn connected(model: ControllerModel) -> (VirtualTransport, Session) {
        let bus = VirtualTransport::new();
        bus.attach(pad());
        let session = Session::new(Arc::new(bus.clone()), model);
        session.connect(&pad()).expect("connect");
        (bus, session)
    }

    #[test]
    fn starts_disconnected_with_model_mappings() {
        let session = Session::new(Arc::new(VirtualTransport::new()), ControllerModel::Esperanza);
        assert!(!session.is_connected());
        assert_eq!(session.vendor_id(), None);
        assert_eq!(session.axis_names().len(), 6);
        assert_eq!(session.button_names()[12], "analog");
        assert_eq!(session.get_axis_state("ax1_x").unwrap(), 0.0);
    }

    #[test]
    fn connect_stores_descriptor() {
        let (_bus, session) = connected(ControllerModel::Esperanza);
        assert!(session.is_connected());
        assert_eq!(session.vendor_id(), Some(VID));
        assert_eq!(session.product_id(), Some(PID));
        assert_eq!(session.descriptor(), Some(pad()));
    }

    #[test]
    fn connect_to_missing_device_fails() {
        let session = Session::new(Arc::new(VirtualTransport::new()), ControllerModel::Generic);
        let err = session.connect(&pad()).unwrap_err();
        assert!(matches!(err, SessionError::Transport(_)));
        assert!(!session.is_connected());
        assert_eq!(session.descriptor(), None);
    }

    #[test]
    fn update_state_decodes_and_stores_report() {
        let (bus, session) = connected(ControllerModel::Esperanza);
        assert!(!session.update_state().unwrap());

        let report = [0x01, 128, 0, 255, 128, 0b0001_1111, 0b0000_0001];
        bus.feed(VID, PID, &report);
        assert!(session.update_state().unwrap());
        assert_eq!(session.raw_inputs(), report.to_vec());
        assert_eq!(session.get_axis_state("ax1_y").unwrap(), -1.0);
        assert!(session.get_button_state("l_1").unwrap());

        // An empty read keeps the previous report.
        assert!(!session.update_state().unwrap());
        assert_eq!(session.raw_inputs(), report.to_vec());
    }

    #[test]
    fn read_raw_bits_does_not_store() {
        let (bus, session) = connected(ControllerModel::Generic);
        bus.feed(VID, PID, &[9, 8, 7]);
        assert_eq!(session.read_raw_bits().unwrap(), vec![9, 8, 7]);
        assert!(session.raw_inputs().is_empty());
    }

    #[test]
    fn read_failure_marks_disconnected() {
        let (bus, session) = connected(ControllerModel::Esperanza);
        bus.unplug(VID, PID);

        assert!(matches!(
            session.update_state(),
            Err(SessionError::Transport(_))
        ));
        assert!(!session.is_connected());
        assert!(matches!(
            session.update_state(),
            Err(SessionError::Disconnected)
        ));
    }

    #[test]
    fn disconnect_resets_values_but_keeps_mappings() {
        let (bus, session) = connected(ControllerModel::Esperanza);
        bus.feed(VID, PID, &[0, 255, 255, 255, 255, 0xFF, 0xFF]);
        session.update_state().unwrap();
        assert!(session.get_button_state("start").unwrap());

        session.disconnect().unwrap();
        assert!(!session.is_connected());
        assert!(session.raw_inputs().is_empty());
        assert!(!session.get_button_state("start").unwrap());
        assert_eq!(session.get_axis_state("ax1_x").unwrap(), 0.0);
        assert_eq!(session.axis_names().len(), 6);
        assert_eq!(session.vendor_id(), Some(VID));
    }

    #[test]
    fn disconnect_without_connection_fails() {
        let session = Session::new(Arc::new(VirtualTransport::new()), ControllerModel::Generic);
        assert!(matches!(
            session.disconnect(),
            Err(SessionError::Disconnected)
        ));
    }

    #[test]
    fn reconnect_requires_a_previous_connection() {
        let session = Session::new(Arc::new(VirtualTransport::new()), ControllerModel::Generic);
        assert!(matches!(
            session.reconnect(),
            Err(SessionError::InvalidOperation(_))
        ));
    }

    #[test]
    fn nonblocking_failure_aborts_connect() {
        let bus = VirtualTransport::new();
        bus.attach(pad());
        bus.fail_configure(VID, PID, true);
        let session = Session::new(Arc::new(bus.clone()), ControllerModel::Generic);
        assert!(session.connect(&pad()).is_err());
        assert!(!session.is_connected());
    }

    #[test]
    fn reports_are_truncated_to_max_len() {
        let bus = VirtualTransport::new();
        bus.attach(pad());
        let config = SessionConfig {
            max_report_len: 4,
            ..Default::default()
        };
        let session = Session::with_config(Arc::new(bus.clone()), &config);
        session.connect(&pad()).unwrap();
        bus.feed(VID, PID, &[1, 2, 3, 4, 5, 6]);
        assert_eq!(session.read_raw_bits().unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn zero_config_values_fall_back_to_defaults() {
        let bus = VirtualTransport::new();
        bus.attach(pad());
        let config = SessionConfig {
            max_report_len: 0,
            poll_period_ms: 0,
            ..Default::default()
        };
        let session = Session::with_config(Arc::new(bus.clone()), &config);
        assert_eq!(session.poll_period, POLL_PERIOD);
        session.connect(&pad()).unwrap();
        bus.feed(VID, PID, &[1, 2, 3, 4, 5, 6]);
        assert_eq!(session.read_raw_bits().unwrap(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn every_gamepad_model_installs_both_tables() {
        for model in [ControllerModel::Esperanza, ControllerModel::Microntek] {
            let session = Session::new(Arc::new(VirtualTransport::new()), model);
            assert_eq!(session.axis_names().len(), 6);
            assert_eq!(session.button_names().len(), 13);
        }
        let generic = Session::new(Arc::new(VirtualTransport::new()), ControllerModel::Generic);
        assert!(generic.axis_names().is_empty());
        assert!(generic.button_names().is_empty());
    }

    #[test]
    fn partial_mapping_keeps_decoding() {
        let (bus, session) = connected(ControllerModel::Esperanza);
        session
            .set_axis_mapping(Mapping::new([("ax1_x", 0)]))
            .unwrap();

        bus.feed(VID, PID, &[0, 255, 0, 0, 0, 0x0F, 0b0010_0000]);
        assert!(session.update_state().unwrap());
        assert!(session.get_axis_state("ax1_x").unwrap() > 0.9);
        assert!(session.get_button_state("start").unwrap());
    }

    #[test]
    fn stop_without_start_is_a_no_op() {
        let session = Session::new(Arc::new(VirtualTransport::new()), ControllerModel::Generic);
        session.stop_asynchronous();
        assert!(!session.is_polling());
    }
}
