//! Host contract.
//!
//! A host runs the engine and stops at hooked code addresses. The harness
//! never owns the host's thread of control: it registers addresses, then
//! hands the host a callback that runs synchronously at each hooked address
//! with a read-only view of memory.

use crate::error::CaptureResult;
use oracle_decode::Memory;

/// Callback run at a hooked address
pub type HookFn<'a> = dyn FnMut(u16, &dyn Memory) -> CaptureResult<()> + 'a;

/// Errors raised by a host
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// The host has no execution-hook facility
    #[error("instrumentation unavailable: {reason}")]
    Unavailable {
        /// Why hooks cannot be registered
        reason: String,
    },

    /// Address hooked twice
    #[error("address 0x{address:04X} is already hooked")]
    AlreadyHooked {
        /// Code address
        address: u16,
    },

    /// Recording could not be loaded
    #[error("bad recording: {reason}")]
    BadRecording {
        /// What is wrong with it
        reason: String,
    },
}

/// Execution host with a hook facility
pub trait Host {
    /// Fail unless hooks can be registered
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Unavailable`] if the host cannot be instrumented
    fn check_available(&self) -> Result<(), HostError>;

    /// Stop at `address` on every execution reaching it
    ///
    /// # Errors
    ///
    /// Returns error if the host cannot hook the address
    fn hook(&mut self, address: u16) -> Result<(), HostError>;

    /// Run to the end of the session, calling `on_hook` at hooked addresses.
    ///
    /// The first error from `on_hook` stops the run and is returned.
    ///
    /// # Errors
    ///
    /// Returns the first callback error
    fn run(&mut self, on_hook: &mut HookFn<'_>) -> CaptureResult<()>;
}
