//! SHOGI.ORACLE Snapshot Capture Harness
//!
//! Binds trigger kinds to code addresses, and on each firing decodes one
//! snapshot and streams it to a trace sink as a canonical line. The host is
//! reached only through the [`Host`] trait; [`RecordedHost`] replays a
//! recorded run so the harness can be driven without an emulator.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod address;
pub mod binding;
pub mod config;
pub mod error;
pub mod host;
pub mod recorded;
pub mod session;
pub mod sink;

pub use address::Address;
pub use binding::BindingTable;
pub use config::{CaptureConfig, ConfigError, TriggerBinding};
pub use error::{CaptureError, CaptureResult};
pub use host::{HookFn, Host, HostError};
pub use recorded::{RecordedHost, Recording, Step};
pub use session::{CaptureSession, SessionSummary};
pub use sink::{CollectSink, TraceSink, WriterSink};
