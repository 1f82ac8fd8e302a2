//! Canonical trace lines.
//!
//! One line per trigger firing: `<tag>: <rendered record>`. Lines starting
//! with `#` are comments; the first of them carries the layout revision.

use crate::error::{TraceError, TraceResult};
use oracle_core::{EqualityOverrides, Value, Version, equal_with, render};
use oracle_decode::{RawMove, Side, Snapshot, TriggerKind, field_kind};
use std::fmt;

/// Prefix of comment lines
pub const COMMENT_PREFIX: char = '#';

const HEADER_KEYWORD: &str = "layout";

/// Separator between tag and body
pub const TAG_SEPARATOR: &str = ": ";

/// Header line naming the layout revision
#[must_use]
pub fn layout_header(revision: Version) -> String {
    format!("{} {} {}", COMMENT_PREFIX, HEADER_KEYWORD, revision)
}

/// Revision named by a header comment, if the comment is a layout header
///
/// # Errors
///
/// Returns error if the comment is a layout header with a bad revision
pub fn parse_header(text: &str) -> TraceResult<Option<Version>> {
    let Some(rest) = text.strip_prefix(COMMENT_PREFIX) else {
        return Ok(None);
    };
    let mut words = rest.split_whitespace();
    if words.next() != Some(HEADER_KEYWORD) {
        return Ok(None);
    }
    words
        .next()
        .and_then(|v| Version::parse(v).ok())
        .map(Some)
        .ok_or_else(|| TraceError::BadHeader {
            line: 0,
            text: text.to_string(),
        })
}

/// One captured event
#[derive(Debug, Clone)]
pub struct TraceLine {
    /// Trigger that fired
    pub trigger: TriggerKind,
    /// Captured record
    pub body: Value,
}

impl TraceLine {
    /// Line for a snapshot
    #[must_use]
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        use oracle_core::ToValue;
        Self {
            trigger: snapshot.trigger(),
            body: snapshot.to_value(),
        }
    }

    /// Parse one non-comment line.
    ///
    /// The body comes back as a record whose kind is the tag, and nested
    /// records get back the kinds capture gave them, so equality overrides
    /// apply to parsed lines the same as to captured ones.
    ///
    /// # Errors
    ///
    /// Returns error if the tag or body is malformed; line numbers are 0
    /// until the caller sets them with [`TraceError::at_line`]
    pub fn parse(text: &str) -> TraceResult<Self> {
        let (tag, body) = text
            .split_once(TAG_SEPARATOR)
            .ok_or(TraceError::MissingSeparator { line: 0 })?;
        let trigger = TriggerKind::from_tag(tag.trim())
            .map_err(|source| TraceError::UnknownTag { line: 0, source })?;
        let body = match Value::parse(body) {
            Ok(body @ Value::Map(_)) => body.with_kinds(trigger.tag(), &field_kind),
            Ok(_) => return Err(TraceError::NotARecord { line: 0 }),
            Err(source) => return Err(TraceError::Body { line: 0, source }),
        };
        Ok(Self { trigger, body })
    }

    /// Same trigger and structurally equal bodies
    #[must_use]
    pub fn matches(&self, other: &Self, overrides: &EqualityOverrides) -> bool {
        self.trigger == other.trigger && equal_with(&self.body, &other.body, overrides)
    }

    /// The move this line is about, with the side whose encoding applies
    #[must_use]
    pub fn subject_move(&self) -> Option<(Side, RawMove)> {
        match self.trigger {
            TriggerKind::RootEvaluated => self
                .body
                .get("your_move")
                .and_then(raw_move)
                .filter(|mv| mv.dst != 0)
                .map(|mv| (Side::Human, mv)),
            _ => self.body.get("move").and_then(raw_move).map(|mv| (Side::Engine, mv)),
        }
    }
}

/// Read a `{dst, promotion, src}` record back into a raw move
#[must_use]
pub fn raw_move(value: &Value) -> Option<RawMove> {
    let byte = |key: &str| value.get(key)?.as_int().and_then(|v| u8::try_from(v).ok());
    Some(RawMove::new(
        byte("src")?,
        byte("dst")?,
        value.get("promotion")?.as_bool()?,
    ))
}

impl fmt::Display for TraceLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.trigger.tag(), TAG_SEPARATOR, render(&self.body))
    }
}

impl PartialEq for TraceLine {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other, &EqualityOverrides::default())
    }
}
