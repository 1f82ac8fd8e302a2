//! Recorded host.
//!
//! Replays a JSON recording of an engine run: an initial memory image and a
//! list of steps. Each step applies its memory writes, then reports that
//! execution reached its `pc`. Only hooked addresses reach the callback.

use crate::address::Address;
use crate::error::CaptureResult;
use crate::host::{Host, HostError, HookFn};
use indexmap::IndexMap;
use oracle_decode::MemoryImage;
use oracle_decode::memory::ADDRESS_SPACE;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// One recorded execution step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Address execution reached
    pub pc: Address,
    /// Bytes written before reaching `pc`, as hex strings by start address
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub writes: IndexMap<Address, String>,
}

/// A recorded engine run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recording {
    /// Memory before the first step
    #[serde(default)]
    pub initial: MemoryImage,
    /// Steps in execution order
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Recording {
    /// Recording starting from an image, with no steps
    #[must_use]
    pub fn new(initial: MemoryImage) -> Self {
        Self {
            initial,
            steps: Vec::new(),
        }
    }

    /// Append a step
    #[must_use]
    pub fn step(mut self, pc: u16, writes: &[(u16, &[u8])]) -> Self {
        self.steps.push(Step {
            pc: Address(pc),
            writes: writes
                .iter()
                .map(|&(addr, bytes)| (Address(addr), hex::encode(bytes)))
                .collect(),
        });
        self
    }

    /// Load a recording from a JSON file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, HostError> {
        let path = path.as_ref();
        let bad = |reason: String| HostError::BadRecording {
            reason: format!("{}: {}", path.display(), reason),
        };
        let text = std::fs::read_to_string(path).map_err(|e| bad(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| bad(e.to_string()))
    }
}

#[derive(Debug, Clone)]
struct DecodedStep {
    pc: u16,
    writes: Vec<(u16, Vec<u8>)>,
}

/// Host that replays a [`Recording`]
#[derive(Debug, Clone)]
pub struct RecordedHost {
    memory: MemoryImage,
    steps: Vec<DecodedStep>,
    hooks: BTreeSet<u16>,
    hooks_available: bool,
}

impl RecordedHost {
    /// Host over a recording
    ///
    /// # Errors
    ///
    /// Returns error if a write is not hex or runs past the address space
    pub fn new(recording: Recording) -> Result<Self, HostError> {
        let steps = recording
            .steps
            .into_iter()
            .enumerate()
            .map(|(index, step)| decode_step(index, step))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            memory: recording.initial,
            steps,
            hooks: BTreeSet::new(),
            hooks_available: true,
        })
    }

    /// Host whose hook facility is missing
    ///
    /// # Errors
    ///
    /// Same as [`Self::new`]
    pub fn without_hooks(recording: Recording) -> Result<Self, HostError> {
        let mut host = Self::new(recording)?;
        host.hooks_available = false;
        Ok(host)
    }

    /// Addresses hooked so far
    pub fn hooks(&self) -> impl Iterator<Item = u16> + '_ {
        self.hooks.iter().copied()
    }

    /// Memory as it stands
    #[must_use]
    pub fn memory(&self) -> &MemoryImage {
        &self.memory
    }
}

fn decode_step(index: usize, step: Step) -> Result<DecodedStep, HostError> {
    let mut writes = Vec::with_capacity(step.writes.len());
    for (addr, data) in step.writes {
        let bytes = hex::decode(&data).map_err(|e| HostError::BadRecording {
            reason: format!("step {} write at {}: {}", index, addr, e),
        })?;
        if usize::from(addr.0) + bytes.len() > ADDRESS_SPACE {
            return Err(HostError::BadRecording {
                reason: format!("step {} write at {} runs past 0xFFFF", index, addr),
            });
        }
        writes.push((addr.0, bytes));
    }
    Ok(DecodedStep {
        pc: step.pc.0,
        writes,
    })
}

impl Host for RecordedHost {
    fn check_available(&self) -> Result<(), HostError> {
        if self.hooks_available {
            Ok(())
        } else {
            Err(HostError::Unavailable {
                reason: "recorded host built without hooks".to_string(),
            })
        }
    }

    fn hook(&mut self, address: u16) -> Result<(), HostError> {
        self.check_available()?;
        if !self.hooks.insert(address) {
            return Err(HostError::AlreadyHooked { address });
        }
        Ok(())
    }

    fn run(&mut self, on_hook: &mut HookFn<'_>) -> CaptureResult<()> {
        let mut fired = 0usize;
        for step in &self.steps {
            for (addr, bytes) in &step.writes {
                self.memory.write_slice(*addr, bytes);
            }
            if self.hooks.contains(&step.pc) {
                fired += 1;
                on_hook(step.pc, &self.memory)?;
            }
        }
        tracing::debug!(steps = self.steps.len(), fired, "recording replayed");
        Ok(())
    }
}
