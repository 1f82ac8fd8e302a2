//! Capture errors.

use crate::config::ConfigError;
use crate::host::HostError;
use oracle_decode::{DecodeError, TriggerKind};

/// Capture result type
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Errors that end a capture session
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// Host refused to cooperate
    #[error("host: {0}")]
    Host(#[from] HostError),

    /// A firing could not be decoded
    #[error("firing #{sequence} ({trigger} at 0x{address:04X}): {source}")]
    Decode {
        /// Trigger that fired
        trigger: TriggerKind,
        /// Code address that fired
        address: u16,
        /// 0-based firing number within the session
        sequence: u64,
        /// Decoder failure
        source: DecodeError,
    },

    /// Two triggers bound to one address
    #[error("address 0x{address:04X} already bound to {existing}, cannot bind {new}")]
    AddressTaken {
        /// Code address
        address: u16,
        /// Trigger already bound there
        existing: TriggerKind,
        /// Trigger being bound
        new: TriggerKind,
    },

    /// One trigger bound twice
    #[error("{kind} already bound at 0x{address:04X}")]
    AlreadyBound {
        /// Trigger kind
        kind: TriggerKind,
        /// Address it is bound to
        address: u16,
    },

    /// Session already failed or finished
    #[error("session is {state}")]
    Closed {
        /// State the session is in
        state: &'static str,
    },

    /// Configuration could not be loaded
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    /// Trace sink failure
    #[error("sink: {0}")]
    Sink(#[from] std::io::Error),
}
