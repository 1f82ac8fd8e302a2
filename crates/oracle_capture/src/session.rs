//! Capture sessions.
//!
//! A session owns the binding table and a sink. Each firing is decoded,
//! turned into one trace line and handed to the sink before the next firing
//! is accepted, so lines leave in exactly the order the host fired them and
//! nothing decoded outlives its firing. The first decode error closes the
//! session.

use crate::binding::BindingTable;
use crate::error::{CaptureError, CaptureResult};
use crate::host::Host;
use crate::sink::TraceSink;
use indexmap::IndexMap;
use oracle_decode::{Layout, Memory, TriggerKind, capture};
use oracle_trace::{TraceLine, render_raw};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Idle,
    Running,
    Failed,
}

impl SessionState {
    const fn name(self) -> &'static str {
        match self {
            Self::Idle => "not started",
            Self::Running => "running",
            Self::Failed => "failed",
        }
    }
}

/// Totals for a finished session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Lines emitted
    pub lines: u64,
    /// Lines per trigger, in first-firing order
    pub by_trigger: IndexMap<TriggerKind, u64>,
}

impl SessionSummary {
    /// Human-readable summary
    #[must_use]
    pub fn report(&self) -> String {
        let parts: Vec<String> = self
            .by_trigger
            .iter()
            .map(|(kind, n)| format!("{}={}", kind, n))
            .collect();
        format!("Captured {} lines ({})", self.lines, parts.join(", "))
    }
}

/// One capture run of the engine
#[derive(Debug)]
pub struct CaptureSession<S: TraceSink> {
    bindings: BindingTable,
    layout: Layout,
    sink: S,
    header: bool,
    state: SessionState,
    summary: SessionSummary,
}

impl<S: TraceSink> CaptureSession<S> {
    /// Session with no bindings, writing a header on start
    #[must_use]
    pub fn new(layout: Layout, sink: S) -> Self {
        Self {
            bindings: BindingTable::new(),
            layout,
            sink,
            header: true,
            state: SessionState::Idle,
            summary: SessionSummary::default(),
        }
    }

    /// Replace the binding table
    #[must_use]
    pub fn with_bindings(mut self, bindings: BindingTable) -> Self {
        self.bindings = bindings;
        self
    }

    /// Set whether to write the layout header
    #[must_use]
    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    /// Bind a trigger to a code address before the session starts
    ///
    /// # Errors
    ///
    /// Returns error if the session has started or the binding conflicts
    pub fn bind(&mut self, kind: TriggerKind, address: u16) -> CaptureResult<()> {
        self.expect_state(SessionState::Idle)?;
        self.bindings.bind(kind, address)
    }

    /// Current bindings
    #[must_use]
    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    /// The sink lines go to
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Start without a host; firings come through [`Self::dispatch`]
    ///
    /// # Errors
    ///
    /// Returns error if the session already started or the header fails
    pub fn start(&mut self) -> CaptureResult<()> {
        self.expect_state(SessionState::Idle)?;
        if self.header {
            self.sink.header(self.layout.revision)?;
        }
        self.state = SessionState::Running;
        tracing::info!(
            revision = %self.layout.revision,
            bindings = self.bindings.len(),
            "capture session started"
        );
        Ok(())
    }

    /// Hook every bound address on a host, then start.
    ///
    /// Availability is checked before any hook is registered, so a host
    /// without instrumentation leaves nothing wired.
    ///
    /// # Errors
    ///
    /// Returns error if the host is unavailable or refuses a hook
    pub fn attach(&mut self, host: &mut dyn Host) -> CaptureResult<()> {
        self.expect_state(SessionState::Idle)?;
        host.check_available()?;
        for (address, kind) in self.bindings.iter() {
            host.hook(address)?;
            tracing::debug!(%kind, address = format_args!("0x{:04X}", address), "hooked");
        }
        self.start()
    }

    /// Attach to a host and run it to the end of the session
    ///
    /// # Errors
    ///
    /// Returns the first host, decode or sink error
    pub fn run(&mut self, host: &mut dyn Host) -> CaptureResult<()> {
        self.attach(host)?;
        host.run(&mut |address, mem| self.dispatch(address, mem).map(drop))
    }

    /// Handle execution reaching `address`.
    ///
    /// Unbound addresses are ignored and return `None`.
    ///
    /// # Errors
    ///
    /// Returns error if the session is not running, decoding fails, or the
    /// sink fails
    pub fn dispatch(
        &mut self,
        address: u16,
        mem: &dyn Memory,
    ) -> CaptureResult<Option<TriggerKind>> {
        match self.bindings.lookup(address) {
            Some(kind) => self.fire_at(kind, address, mem).map(|()| Some(kind)),
            None => {
                tracing::trace!(address = format_args!("0x{:04X}", address), "unbound address");
                Ok(None)
            }
        }
    }

    /// Handle a firing of `kind` at its bound address, or its layout
    /// address if unbound
    ///
    /// # Errors
    ///
    /// Same as [`Self::dispatch`]
    pub fn fire(&mut self, kind: TriggerKind, mem: &dyn Memory) -> CaptureResult<()> {
        let address = self
            .bindings
            .address_of(kind)
            .unwrap_or_else(|| kind.address(&self.layout));
        self.fire_at(kind, address, mem)
    }

    fn fire_at(&mut self, kind: TriggerKind, address: u16, mem: &dyn Memory) -> CaptureResult<()> {
        self.expect_state(SessionState::Running)?;
        let sequence = self.summary.lines;

        let snapshot = match capture(kind, mem, &self.layout) {
            Ok(snapshot) => snapshot,
            Err(source) => {
                self.state = SessionState::Failed;
                tracing::error!(
                    %kind,
                    address = format_args!("0x{:04X}", address),
                    sequence,
                    error = %source,
                    "decode failed, session aborted"
                );
                return Err(CaptureError::Decode {
                    trigger: kind,
                    address,
                    sequence,
                    source,
                });
            }
        };

        let line = TraceLine::from_snapshot(&snapshot);
        if let Err(err) = self.sink.line(&line) {
            self.state = SessionState::Failed;
            tracing::error!(%kind, sequence, error = %err, "sink failed, session aborted");
            return Err(err.into());
        }

        let notation = snapshot
            .subject_move()
            .and_then(|(side, mv)| render_raw(&mv, side).ok());
        tracing::debug!(
            sequence,
            %kind,
            address = format_args!("0x{:04X}", address),
            notation = notation.as_deref().unwrap_or("-"),
            "captured"
        );

        self.summary.lines += 1;
        *self.summary.by_trigger.entry(kind).or_insert(0) += 1;
        Ok(())
    }

    /// Flush the sink and close the session
    ///
    /// # Errors
    ///
    /// Returns error if the final flush fails
    pub fn finish(mut self) -> CaptureResult<(S, SessionSummary)> {
        self.sink.flush()?;
        tracing::info!(
            lines = self.summary.lines,
            state = self.state.name(),
            "capture session finished"
        );
        Ok((self.sink, self.summary))
    }

    fn expect_state(&self, wanted: SessionState) -> CaptureResult<()> {
        if self.state == wanted {
            Ok(())
        } else {
            Err(CaptureError::Closed {
                state: self.state.name(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::CollectSink;
    use oracle_decode::{LAYOUT_V1, MemoryImage};

    fn running() -> CaptureSession<CollectSink> {
        let mut session = CaptureSession::new(LAYOUT_V1, CollectSink::new())
            .with_bindings(BindingTable::from_layout(&LAYOUT_V1));
        session.start().unwrap();
        session
    }

    fn engine_drop() -> MemoryImage {
        // Engine pawn drop on 50: src = 209 - 8.
        MemoryImage::new()
            .with(0x5BB, 50)
            .with(0x5BC, 201)
            .with(0x284, 50)
            .with(0x285, 201)
    }

    #[test]
    fn test_dispatch_bound_and_unbound() {
        let mut session = running();
        let mem = engine_drop();
        assert_eq!(
            session.dispatch(0xDFD3, &mem).unwrap(),
            Some(TriggerKind::MoveChosen)
        );
        assert_eq!(session.dispatch(0x1234, &mem).unwrap(), None);
        assert_eq!(session.sink().lines.len(), 1);
        assert_eq!(
            session.sink().lines[0].to_string(),
            "my_move: {move={dst=50, promotion=false, src=201}}"
        );
    }

    #[test]
    fn test_fire_before_start() {
        let mut session = CaptureSession::new(LAYOUT_V1, CollectSink::new());
        let err = session.fire(TriggerKind::MoveChosen, &engine_drop()).unwrap_err();
        assert_eq!(err.to_string(), "session is not started");
    }

    #[test]
    fn test_bind_after_start() {
        let mut session = running();
        assert!(matches!(
            session.bind(TriggerKind::MoveChosen, 0x4000),
            Err(CaptureError::Closed { state: "running" })
        ));
    }

    #[test]
    fn test_decode_error_aborts() {
        let mut session = running();
        // 215 is past the engine drop range.
        let bad = MemoryImage::new().with(0x5BB, 50).with(0x5BC, 215);
        let err = session.fire(TriggerKind::MoveChosen, &bad).unwrap_err();
        assert!(matches!(
            err,
            CaptureError::Decode {
                trigger: TriggerKind::MoveChosen,
                address: 0xDFD3,
                sequence: 0,
                ..
            }
        ));
        assert!(session.sink().lines.is_empty());

        let again = session.fire(TriggerKind::MoveChosen, &engine_drop());
        assert!(matches!(again, Err(CaptureError::Closed { state: "failed" })));
    }

    #[test]
    fn test_summary() {
        let mut session = running();
        let mem = engine_drop();
        session.fire(TriggerKind::BestUpdated, &mem).unwrap();
        session.fire(TriggerKind::BestUpdated, &mem).unwrap();
        session.fire(TriggerKind::MoveChosen, &mem).unwrap();
        let (sink, summary) = session.finish().unwrap();
        assert_eq!(sink.revision, Some(LAYOUT_V1.revision));
        assert_eq!(summary.lines, 3);
        assert_eq!(summary.report(), "Captured 3 lines (best=2, my_move=1)");
    }

    #[test]
    fn test_without_header() {
        let mut session = CaptureSession::new(LAYOUT_V1, CollectSink::new()).with_header(false);
        session.start().unwrap();
        let (sink, summary) = session.finish().unwrap();
        assert_eq!(sink.revision, None);
        assert_eq!(summary.report(), "Captured 0 lines ()");
    }
}
