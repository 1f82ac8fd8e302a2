//! SHOGI.ORACLE Core Types
//!
//! Pure types with no I/O: the structural value model used for trace
//! records, its canonical rendering and parsing, and layout revisions.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod parse;
pub mod value;
pub mod version;

// Re-exports
pub use parse::ParseError;
pub use value::{EqualityOverrides, Record, Scalar, ToValue, Value, equal, equal_with, render};
pub use version::{Version, VersionError};
