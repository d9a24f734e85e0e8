//! The owner-thread capability.

use std::marker::PhantomData;

/// Proof that the caller runs on the thread that owns the live workspace.
///
/// Every executor entry point takes `&OwnerToken`. The token is neither `Send` nor `Sync`, so a
/// background worker cannot obtain one from the owner thread and must hand its command back
/// instead of applying it.
///
/// ```compile_fail
/// use edit_command_exec::OwnerToken;
///
/// fn assert_send<T: Send>(_: T) {}
/// assert_send(OwnerToken::new());
/// ```
#[derive(Debug)]
pub struct OwnerToken {
    _not_send: PhantomData<*const ()>,
}

impl OwnerToken {
    /// Create a token for the current thread.
    pub fn new() -> Self {
        tracing::trace!(thread = ?std::thread::current().id(), "owner token created");
        Self {
            _not_send: PhantomData,
        }
    }
}

impl Default for OwnerToken {
    fn default() -> Self {
        Self::new()
    }
}
