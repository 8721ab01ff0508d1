//! Concrete Future types for the middleware lifecycle.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};
use tokio::task::JoinHandle;
use tracing::error;

/// How a stop request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stopped {
    /// This call stopped the background task and it has exited.
    Completed,
    /// An earlier call already stopped it.
    AlreadyStopped,
}

impl Stopped {
    /// Whether an earlier call had already stopped the task.
    pub fn is_already_stopped(self) -> bool {
        self == Stopped::AlreadyStopped
    }
}

enum State {
    Ready(Stopped),
    Joining(JoinHandle<()>),
    Done,
}

/// Future returned by stop operations.
///
/// Resolves once the background task has exited, or immediately when the
/// task was already stopped.
pub struct StopFuture {
    state: State,
}

impl StopFuture {
    pub(crate) fn joining(handle: JoinHandle<()>) -> Self {
        Self {
            state: State::Joining(handle),
        }
    }

    pub(crate) fn completed() -> Self {
        Self {
            state: State::Ready(Stopped::Completed),
        }
    }

    pub(crate) fn already_stopped() -> Self {
        Self {
            state: State::Ready(Stopped::AlreadyStopped),
        }
    }
}

impl Future for StopFuture {
    type Output = Stopped;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &mut this.state {
            State::Ready(stopped) => {
                let stopped = *stopped;
                this.state = State::Done;
                Poll::Ready(stopped)
            }
            State::Joining(handle) => match Pin::new(handle).poll(cx) {
                Poll::Ready(result) => {
                    if let Err(e) = result {
                        error!(error = %e, "JWK rotation task ended abnormally");
                    }
                    this.state = State::Done;
                    Poll::Ready(Stopped::Completed)
                }
                Poll::Pending => Poll::Pending,
            },
            // Polled again after completion
            State::Done => Poll::Ready(Stopped::AlreadyStopped),
        }
    }
}
