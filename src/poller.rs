//! Background polling thread.

use crate::error::SessionError;
use crate::session::Core;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const THREAD_NAME: &str = "hidpad-poll";

/// Handle to a running polling thread. Stopping is cooperative: the thread
/// checks the flag once per period, between updates.
pub(crate) struct Poller {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Poller {
    pub(crate) fn spawn(core: Arc<Core>, period: Duration) -> io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let thread = thread::Builder::new()
            .name(THREAD_NAME.into())
            .spawn(move || run_poll(core, flag, period))?;

        Ok(Self {
            stop,
            thread: Some(thread),
        })
    }

    /// Signals the thread and waits for it to exit.
    pub(crate) fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::warn!("Polling thread panicked");
            }
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_poll(core: Arc<Core>, stop: Arc<AtomicBool>, period: Duration) {
    log::debug!("Polling started (every {period:?})");

    while !stop.load(Ordering::Acquire) {
        match core.update_state() {
            Ok(_) | Err(SessionError::Disconnected) => {}
            Err(err) => log::debug!("Poll failed: {err}"),
        }
        thread::sleep(period);
    }

    log::debug!("Polling stopped");
}
