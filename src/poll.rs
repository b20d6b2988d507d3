//! Poll
//!
//! Fixed-interval refresh as a scoped resource. Views that poll (order
//! boards, notification feeds, auto-pass) own a [`Poller`]; dropping it
//! tears the timer down on every exit path, so no interval outlives the
//! view that started it.

use std::{
    sync::mpsc::{self, RecvTimeoutError, Sender},
    thread::{self, JoinHandle},
    time::Duration,
};

/// A background timer invoking a callback at a fixed interval.
///
/// The callback runs on a dedicated thread. [`Poller::stop`] (or dropping
/// the poller) wakes the thread immediately and joins it; a tick already in
/// progress finishes first.
#[derive(Debug)]
pub struct Poller {
    cancel: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    /// Start ticking every `interval`.
    ///
    /// The first tick fires one interval after the call, not immediately.
    pub fn spawn(interval: Duration, mut tick: impl FnMut() + Send + 'static) -> Self {
        let (cancel, cancelled) = mpsc::channel();

        let handle = thread::spawn(move || {
            loop {
                match cancelled.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => tick(),
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        Self {
            cancel,
            handle: Some(handle),
        }
    }

    /// Stop the timer and wait for the polling thread to finish.
    ///
    /// Idempotent; later calls are no-ops.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            // The send only fails when the thread already exited.
            drop(self.cancel.send(()));
            drop(handle.join());
        }
    }

    /// Whether the timer is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}
