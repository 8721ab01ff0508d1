//! Background refresh of the JWK Set.
//!
//! One tokio task sleeps for the update interval, fetches, and swaps the
//! result into the [`KeyStore`]. A failed fetch leaves the current keys in
//! place. Cancellation is observed on every wait; an in-flight fetch runs to
//! completion but no new one starts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::futures::StopFuture;
use crate::jwks::KeyFetcher;
use crate::keystore::KeyStore;

/// Lifecycle of a [`RotationScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationState {
    /// Refreshing on every interval.
    Running,
    /// Cancelled. Terminal.
    Stopped,
}

/// Drives periodic JWK Set refreshes into a [`KeyStore`].
#[derive(Debug)]
pub struct RotationScheduler {
    cancel: CancellationToken,
    stopped: AtomicBool,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl RotationScheduler {
    /// Start refreshing `store` every `interval`.
    ///
    /// The first fetch happens one full interval after this call. Must be
    /// called from within a tokio runtime.
    pub fn spawn(fetcher: KeyFetcher, store: Arc<KeyStore>, interval: Duration) -> Self {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run(fetcher, store, interval, cancel.clone()));

        Self {
            cancel,
            stopped: AtomicBool::new(false),
            task: Mutex::new(Some(task)),
        }
    }

    /// Current state.
    pub fn state(&self) -> RotationState {
        if self.stopped.load(Ordering::Acquire) {
            RotationState::Stopped
        } else {
            RotationState::Running
        }
    }

    /// Stop refreshing.
    ///
    /// The returned future resolves once the task has exited. Every call
    /// after the first resolves immediately to
    /// [`Stopped::AlreadyStopped`](crate::Stopped::AlreadyStopped).
    pub fn cancel(&self) -> StopFuture {
        if self.stopped.swap(true, Ordering::AcqRel) {
            debug!("JWK rotation already stopped");
            return StopFuture::already_stopped();
        }

        self.cancel.cancel();
        let task = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match task {
            Some(handle) => StopFuture::joining(handle),
            None => StopFuture::completed(),
        }
    }
}

impl Drop for RotationScheduler {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run(
    fetcher: KeyFetcher,
    store: Arc<KeyStore>,
    interval: Duration,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(interval) => {}
        }
        if cancel.is_cancelled() {
            break;
        }

        match fetcher.fetch().await {
            Ok(keys) => {
                debug!(key_count = keys.len(), "installing refreshed JWK Set");
                store.replace(keys);
            }
            Err(e) => {
                // Keep serving with the keys we have
                error!(jwk_set_url = %fetcher.url(), error = %e, "failed to refresh JWK Set");
            }
        }
    }

    debug!(jwk_set_url = %fetcher.url(), "JWK rotation stopped");
}
