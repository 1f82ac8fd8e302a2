//! Trace reader for captured sessions.

use crate::error::{TraceError, TraceResult};
use crate::line::{COMMENT_PREFIX, TraceLine, parse_header};
use oracle_core::Version;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Reads a session trace into lines
#[derive(Debug, Clone, Default)]
pub struct TraceReader {
    /// Lines not yet consumed
    buffer: VecDeque<TraceLine>,
    /// Revision from the layout header
    layout: Option<Version>,
    /// Lines in the trace
    total: usize,
}

impl TraceReader {
    /// Reader over already-parsed lines
    #[must_use]
    pub fn from_lines(layout: Option<Version>, lines: Vec<TraceLine>) -> Self {
        let total = lines.len();
        Self {
            buffer: lines.into(),
            layout,
            total,
        }
    }

    /// Parse a trace from any buffered source
    ///
    /// # Errors
    ///
    /// Returns error on I/O failure or the first malformed line
    pub fn from_reader(reader: impl BufRead) -> TraceResult<Self> {
        let mut layout = None;
        let mut lines = Vec::new();
        for (index, text) in reader.lines().enumerate() {
            let text = text?;
            let number = index + 1;
            let trimmed = text.trim_end();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.starts_with(COMMENT_PREFIX) {
                if let Some(version) = parse_header(trimmed).map_err(|e| e.at_line(number))? {
                    layout.get_or_insert(version);
                }
                continue;
            }
            lines.push(TraceLine::parse(trimmed).map_err(|e| e.at_line(number))?);
        }
        tracing::debug!(lines = lines.len(), layout = ?layout, "trace read");
        Ok(Self::from_lines(layout, lines))
    }

    /// Parse a trace held in memory
    ///
    /// # Errors
    ///
    /// Returns error on the first malformed line
    pub fn from_text(text: &str) -> TraceResult<Self> {
        Self::from_reader(text.as_bytes())
    }

    /// Open and parse a trace file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or a line is malformed
    pub fn open(path: impl AsRef<Path>) -> TraceResult<Self> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    /// Revision named in the header, if any
    #[must_use]
    pub fn layout(&self) -> Option<Version> {
        self.layout
    }

    /// Fail unless the header names a revision compatible with `expected`
    ///
    /// # Errors
    ///
    /// Returns error if the header is present and incompatible
    pub fn check_layout(&self, expected: Version) -> TraceResult<()> {
        match self.layout {
            Some(actual) if !expected.is_compatible(&actual) => {
                Err(TraceError::LayoutMismatch { expected, actual })
            }
            _ => Ok(()),
        }
    }

    /// Remaining lines in order, without consuming them
    pub fn lines(&self) -> impl Iterator<Item = &TraceLine> {
        self.buffer.iter()
    }

    /// Next line, if any
    pub fn next_line(&mut self) -> Option<TraceLine> {
        self.buffer.pop_front()
    }

    /// Whether lines remain
    #[must_use]
    pub fn has_more(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Lines not yet consumed
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buffer.len()
    }

    /// Lines in the trace
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Remaining lines as a vector
    #[must_use]
    pub fn into_lines(self) -> Vec<TraceLine> {
        self.buffer.into()
    }
}

impl Iterator for TraceReader {
    type Item = TraceLine;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line()
    }
}
