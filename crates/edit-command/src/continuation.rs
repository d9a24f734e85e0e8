//! Continuations: the "next step" of a multi-step interaction.
//!
//! A continuation is a pure function from a resolved user selection to the next [`Command`].
//! It may be called more than once (for example once for a preview and once for the real
//! execution), so it must not have side effects.

use crate::Command;
use std::fmt;
use std::sync::Arc;

/// A shareable, side-effect-free function from a selection of type `T` to the next command.
pub struct Continuation<T> {
    inner: Arc<dyn Fn(T) -> Command + Send + Sync>,
}

impl<T: 'static> Continuation<T> {
    /// Wrap a function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(T) -> Command + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// A continuation that ignores the selection and always yields `command`.
    pub fn constant(command: Command) -> Self {
        Self::new(move |_| command.clone())
    }

    /// Compute the next command for `selection`.
    pub fn resolve(&self, selection: T) -> Command {
        (self.inner)(selection)
    }

    /// A continuation that runs `next` after whatever this one produces.
    pub fn then(&self, next: Command) -> Self {
        let inner = Arc::clone(&self.inner);
        Self::new(move |selection| inner(selection).and_then(next.clone()))
    }
}

impl<T> Clone for Continuation<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> PartialEq for Continuation<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> fmt::Debug for Continuation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Continuation(..)")
    }
}
