//! Trace sinks.
//!
//! A sink receives each line as soon as it is captured. Writers stream to
//! their destination and keep nothing; [`CollectSink`] keeps lines in memory
//! so a session can be checked without touching disk.

use oracle_core::Version;
use oracle_trace::{TraceLine, layout_header};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Destination for trace lines
pub trait TraceSink {
    /// Write the layout header
    ///
    /// # Errors
    ///
    /// Returns error if the destination fails
    fn header(&mut self, revision: Version) -> io::Result<()>;

    /// Write one line
    ///
    /// # Errors
    ///
    /// Returns error if the destination fails
    fn line(&mut self, line: &TraceLine) -> io::Result<()>;

    /// Push buffered output to the destination
    ///
    /// # Errors
    ///
    /// Returns error if the destination fails
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Streams lines to any writer
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
    flush_each_line: bool,
    written: usize,
}

impl<W: Write> WriterSink<W> {
    /// Sink over a writer, flushing after every line
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            flush_each_line: true,
            written: 0,
        }
    }

    /// Set whether to flush after every line
    #[must_use]
    pub fn with_flush_each_line(mut self, flush: bool) -> Self {
        self.flush_each_line = flush;
        self
    }

    /// Lines written so far, header excluded
    #[must_use]
    pub fn written(&self) -> usize {
        self.written
    }

    /// The underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl WriterSink<BufWriter<File>> {
    /// Create (or truncate) a trace file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be created
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> TraceSink for WriterSink<W> {
    fn header(&mut self, revision: Version) -> io::Result<()> {
        writeln!(self.writer, "{}", layout_header(revision))?;
        if self.flush_each_line {
            self.writer.flush()?;
        }
        Ok(())
    }

    fn line(&mut self, line: &TraceLine) -> io::Result<()> {
        writeln!(self.writer, "{}", line)?;
        self.written += 1;
        if self.flush_each_line {
            self.writer.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Keeps lines in memory
#[derive(Debug, Clone, Default)]
pub struct CollectSink {
    /// Revision from the header, if one was written
    pub revision: Option<Version>,
    /// Lines in firing order
    pub lines: Vec<TraceLine>,
}

impl CollectSink {
    /// Empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TraceSink for CollectSink {
    fn header(&mut self, revision: Version) -> io::Result<()> {
        self.revision = Some(revision);
        Ok(())
    }

    fn line(&mut self, line: &TraceLine) -> io::Result<()> {
        self.lines.push(line.clone());
        Ok(())
    }
}

impl<S: TraceSink + ?Sized> TraceSink for &mut S {
    fn header(&mut self, revision: Version) -> io::Result<()> {
        (**self).header(revision)
    }

    fn line(&mut self, line: &TraceLine) -> io::Result<()> {
        (**self).line(line)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}
