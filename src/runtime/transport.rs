use std::{
    io,
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_channel::{bounded, select, tick, Sender};
use parking_lot::Mutex;
use tracing::{debug, error};

use crate::runtime::Shared;

/// The periodic control tick, on its own thread.
pub(crate) struct Transport {
    cancel: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Transport {
    pub(crate) fn spawn(shared: Arc<Mutex<Shared>>, interval: Duration) -> io::Result<Self> {
        let (cancel, cancelled) = bounded::<()>(1);
        let interval = interval.max(Duration::from_millis(1));

        let handle = thread::Builder::new()
            .name("saavy-transport".into())
            .spawn(move || {
                let ticker = tick(interval);
                loop {
                    select! {
                        recv(ticker) -> _ => shared.lock().tick(),
                        // A message or a dropped sender both mean stop.
                        recv(cancelled) -> _ => break,
                    }
                }
                debug!("transport thread exiting");
            })?;

        Ok(Self {
            cancel: Some(cancel),
            handle: Some(handle),
        })
    }

    /// Cancel the tick and wait for the thread; no tick runs after this returns.
    pub(crate) fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.cancel.take();
        if let Some(handle) = self.handle.take() {
            join_logged(handle);
        }
    }
}

/// Join `handle`, reporting a panic instead of swallowing it. Returns whether
/// the thread exited cleanly.
fn join_logged(handle: JoinHandle<()>) -> bool {
    let name = handle.thread().name().unwrap_or("unnamed").to_owned();
    match handle.join() {
        Ok(()) => true,
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_default();
            error!(thread = %name, %reason, "transport thread panicked");
            false
        }
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panicked_thread_is_reported() {
        let handle = thread::Builder::new()
            .name("saavy-transport-test".into())
            .spawn(|| panic!("tick failed"))
            .unwrap();
        assert!(!join_logged(handle));
    }

    #[test]
    fn clean_exit_joins() {
        let handle = thread::spawn(|| {});
        assert!(join_logged(handle));
    }
}
