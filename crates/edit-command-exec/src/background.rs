//! Background computation of commands.
//!
//! Analysis runs on a worker thread against a [`edit_command::Snapshot`] and produces a
//! [`Command`]. The owner thread polls or waits for the result through a [`ComputationHandle`].
//! Cancellation is cooperative: the computation checks its [`CancellationToken`], and once the
//! handle is cancelled it never yields a command, even one that was already produced.

use crate::owner::OwnerToken;
use edit_command::Command;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::JoinHandle;
use thiserror::Error;

/// Marker error returned by a computation that noticed its cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("computation cancelled")]
pub struct Cancelled;

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// A fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once cancellation was requested; use with `?` inside computations.
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

/// State of a computation as seen from the owner thread.
#[derive(Debug, Clone, PartialEq)]
pub enum ComputationState {
    /// Still running.
    Pending,
    /// Finished with a command. The handle is spent afterwards.
    Ready(Command),
    /// Cancelled, failed, or already taken.
    Cancelled,
}

/// Owner-side handle of a running computation.
#[derive(Debug)]
pub struct ComputationHandle {
    name: String,
    token: CancellationToken,
    receiver: Receiver<Result<Command, Cancelled>>,
    thread: Option<JoinHandle<()>>,
    spent: bool,
}

/// Run `f` on a new worker thread named `name`.
///
/// Fails only if the thread cannot be spawned.
pub fn spawn_computation<F>(name: impl Into<String>, f: F) -> std::io::Result<ComputationHandle>
where
    F: FnOnce(&CancellationToken) -> Result<Command, Cancelled> + Send + 'static,
{
    let name = name.into();
    let token = CancellationToken::new();
    let (sender, receiver) = mpsc::channel();

    let worker_token = token.clone();
    let thread_name = name.clone();
    let thread = std::thread::Builder::new()
        .name(name.clone())
        .spawn(move || {
            let _span = tracing::debug_span!("computation", name = %thread_name).entered();
            let result = f(&worker_token);
            if result.is_err() {
                tracing::debug!("computation observed cancellation");
            }
            // The owner may have dropped the handle already.
            let _ = sender.send(result);
        })?;

    Ok(ComputationHandle {
        name,
        token,
        receiver,
        thread: Some(thread),
        spent: false,
    })
}

impl ComputationHandle {
    /// Name given at spawn time.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// A clone of the computation's cancellation token.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Cancel the computation. Its result, if any, is discarded.
    pub fn cancel(&self) {
        tracing::debug!(name = %self.name, "cancelling computation");
        self.token.cancel();
    }

    /// Returns `true` if the computation was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Poll for the result without blocking.
    pub fn try_take(&mut self, _owner: &OwnerToken) -> ComputationState {
        if self.spent || self.token.is_cancelled() {
            return ComputationState::Cancelled;
        }
        match self.receiver.try_recv() {
            Ok(result) => self.finish(result),
            Err(TryRecvError::Empty) => ComputationState::Pending,
            Err(TryRecvError::Disconnected) => {
                tracing::warn!(name = %self.name, "computation ended without a result");
                self.spent = true;
                ComputationState::Cancelled
            }
        }
    }

    /// Block until the computation finishes. `None` if it was cancelled or failed.
    pub fn wait(mut self, _owner: &OwnerToken) -> Option<Command> {
        if self.spent || self.token.is_cancelled() {
            return None;
        }
        let result = self.receiver.recv().ok()?;
        match self.finish(result) {
            ComputationState::Ready(command) => Some(command),
            ComputationState::Pending | ComputationState::Cancelled => None,
        }
    }

    fn finish(&mut self, result: Result<Command, Cancelled>) -> ComputationState {
        self.spent = true;
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::warn!(name = %self.name, "computation thread panicked");
            }
        }
        match result {
            Ok(command) if !self.token.is_cancelled() => ComputationState::Ready(command),
            _ => ComputationState::Cancelled,
        }
    }
}
