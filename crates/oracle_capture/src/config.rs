//! Capture configuration.

use crate::address::Address;
use crate::binding::BindingTable;
use crate::error::CaptureResult;
use oracle_decode::{LAYOUT_V1, Layout, TriggerKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors loading a configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// I/O failure
        source: std::io::Error,
    },

    /// File is not valid JSON for a config
    #[error("cannot parse {path}: {source}")]
    Json {
        /// File path
        path: PathBuf,
        /// Parser failure
        source: serde_json::Error,
    },

    /// Config parsed but is unusable
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// Why it is unusable
        reason: String,
    },
}

/// One trigger binding as written in a config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerBinding {
    /// Trigger kind in snake case (`root_evaluated`, `move_chosen`, ...)
    pub kind: TriggerKind,
    /// Code address
    pub address: Address,
}

/// Capture settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Trace file to write
    pub output: PathBuf,
    /// Trigger bindings, in binding order
    pub triggers: Vec<TriggerBinding>,
    /// Flush after every line
    pub flush_each_line: bool,
    /// Write the `# layout` header
    pub header: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("trace.log"),
            triggers: default_triggers(&LAYOUT_V1),
            flush_each_line: true,
            header: true,
        }
    }
}

fn default_triggers(layout: &Layout) -> Vec<TriggerBinding> {
    TriggerKind::ALL
        .into_iter()
        .flat_map(|kind| {
            kind.addresses(layout).iter().map(move |&address| TriggerBinding {
                kind,
                address: Address(address),
            })
        })
        .collect()
}

impl CaptureConfig {
    /// Default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a JSON file; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), triggers = config.triggers.len(), "config loaded");
        Ok(config)
    }

    /// Check the config is usable
    ///
    /// # Errors
    ///
    /// Returns error if no trigger is bound or the output path is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.triggers.is_empty() {
            return Err(ConfigError::Invalid {
                field: "triggers",
                reason: "no triggers bound".to_string(),
            });
        }
        if self.output.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "output",
                reason: "empty path".to_string(),
            });
        }
        Ok(())
    }

    /// Set output path
    #[must_use]
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Set trigger bindings
    #[must_use]
    pub fn with_triggers(mut self, triggers: Vec<TriggerBinding>) -> Self {
        self.triggers = triggers;
        self
    }

    /// Use the trigger addresses a layout pins
    #[must_use]
    pub fn with_layout_triggers(mut self, layout: &Layout) -> Self {
        self.triggers = default_triggers(layout);
        self
    }

    /// Set per-line flushing
    #[must_use]
    pub fn with_flush_each_line(mut self, flush: bool) -> Self {
        self.flush_each_line = flush;
        self
    }

    /// Set header writing
    #[must_use]
    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    /// Binding table for these triggers
    ///
    /// # Errors
    ///
    /// Returns error if two bindings conflict
    pub fn bindings(&self) -> CaptureResult<BindingTable> {
        let mut table = BindingTable::new();
        for binding in &self.triggers {
            table.bind(binding.kind, binding.address.0)?;
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CaptureError;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = CaptureConfig::default();
        assert_eq!(config.output, PathBuf::from("trace.log"));
        assert!(config.flush_each_line);
        assert!(config.header);
        assert_eq!(config.bindings().unwrap(), BindingTable::from_layout(&LAYOUT_V1));
    }

    #[test]
    fn test_builders() {
        let config = CaptureConfig::new()
            .with_output("out/session.log")
            .with_header(false)
            .with_flush_each_line(false)
            .with_triggers(vec![TriggerBinding {
                kind: TriggerKind::MoveChosen,
                address: Address(0xDFD3),
            }]);
        assert_eq!(config.output, PathBuf::from("out/session.log"));
        assert!(!config.header);
        assert_eq!(config.bindings().unwrap().len(), 1);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"output": "x.log", "triggers": [
                {{"kind": "best_updated", "address": "0xF6F9"}}
            ]}}"#
        )
        .unwrap();
        let config = CaptureConfig::load(file.path()).unwrap();
        assert_eq!(config.output, PathBuf::from("x.log"));
        assert!(config.header);
        assert_eq!(
            config.bindings().unwrap().lookup(0xF6F9),
            Some(TriggerKind::BestUpdated)
        );
    }

    #[test]
    fn test_load_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"triggers": []}}"#).unwrap();
        assert!(matches!(
            CaptureConfig::load(file.path()),
            Err(ConfigError::Invalid { field: "triggers", .. })
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"triggers": [{{"kind": "ponder", "address": "0x1"}}]}}"#).unwrap();
        assert!(matches!(
            CaptureConfig::load(file.path()),
            Err(ConfigError::Json { .. })
        ));
    }

    #[test]
    fn test_conflicting_bindings() {
        let config = CaptureConfig::new().with_triggers(vec![
            TriggerBinding {
                kind: TriggerKind::MoveChosen,
                address: Address(0x8000),
            },
            TriggerBinding {
                kind: TriggerKind::BestUpdated,
                address: Address(0x8000),
            },
        ]);
        assert!(matches!(
            config.bindings(),
            Err(CaptureError::AddressTaken { .. })
        ));
    }
}
