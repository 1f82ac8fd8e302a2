//! Session matching.
//!
//! A session matches when both traces carry the same layout revision and
//! every line has a counterpart of the same trigger, in the same position,
//! with a structurally equal body.

use crate::line::TraceLine;
use crate::reader::TraceReader;
use oracle_core::{EqualityOverrides, Value, Version, equal_with, render};
use oracle_decode::TriggerKind;
use std::fmt;

/// Why two sessions stopped matching
#[derive(Debug, Clone, PartialEq)]
pub enum Divergence {
    /// Headers name different revisions
    Layout {
        /// Expected revision
        expected: Option<Version>,
        /// Actual revision
        actual: Option<Version>,
    },
    /// Different trigger at the same position
    Trigger {
        /// Line index, 0-based
        index: usize,
        /// Expected trigger
        expected: TriggerKind,
        /// Actual trigger
        actual: TriggerKind,
    },
    /// Same trigger, different bodies
    Body {
        /// Line index, 0-based
        index: usize,
        /// Trigger of both lines
        trigger: TriggerKind,
        /// Dotted paths of the fields that differ
        paths: Vec<String>,
        /// Expected body, rendered
        expected: String,
        /// Actual body, rendered
        actual: String,
    },
    /// Actual session ended early
    Missing {
        /// Line index, 0-based
        index: usize,
        /// Trigger that was expected
        expected: TriggerKind,
    },
    /// Actual session has extra lines
    Extra {
        /// Line index, 0-based
        index: usize,
        /// Trigger of the first extra line
        actual: TriggerKind,
    },
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: &Option<Version>| v.map_or_else(|| "none".to_string(), |v| v.to_string());
        match self {
            Self::Layout { expected, actual } => write!(
                f,
                "layout revision differs: expected {}, got {}",
                show(expected),
                show(actual)
            ),
            Self::Trigger {
                index,
                expected,
                actual,
            } => write!(f, "line {}: expected '{}', got '{}'", index + 1, expected, actual),
            Self::Body {
                index,
                trigger,
                paths,
                ..
            } => write!(f, "line {} ({}): fields differ: {}", index + 1, trigger, paths.join(", ")),
            Self::Missing { index, expected } => {
                write!(f, "line {}: expected '{}', session ended", index + 1, expected)
            }
            Self::Extra { index, actual } => {
                write!(f, "line {}: unexpected extra '{}'", index + 1, actual)
            }
        }
    }
}

/// Outcome of matching two sessions
#[derive(Debug, Clone, PartialEq)]
pub struct MatchReport {
    /// Lines that matched before any divergence
    pub compared: usize,
    /// First divergence, if any
    pub divergence: Option<Divergence>,
}

impl MatchReport {
    /// Whether the sessions matched
    #[must_use]
    pub fn is_matched(&self) -> bool {
        self.divergence.is_none()
    }

    /// Human-readable report
    #[must_use]
    pub fn report(&self) -> String {
        match &self.divergence {
            None => format!("Sessions match ({} lines)", self.compared),
            Some(divergence @ Divergence::Body {
                expected, actual, ..
            }) => format!(
                "Sessions diverge after {} matching lines\n  {}\n  expected: {}\n  actual:   {}\n",
                self.compared, divergence, expected, actual
            ),
            Some(divergence) => format!(
                "Sessions diverge after {} matching lines\n  {}\n",
                self.compared, divergence
            ),
        }
    }
}

/// Compare two sessions line by line
#[must_use]
pub fn match_sessions(
    expected: &TraceReader,
    actual: &TraceReader,
    overrides: &EqualityOverrides,
) -> MatchReport {
    if expected.layout() != actual.layout() {
        return MatchReport {
            compared: 0,
            divergence: Some(Divergence::Layout {
                expected: expected.layout(),
                actual: actual.layout(),
            }),
        };
    }
    match_lines(
        &expected.lines().collect::<Vec<_>>(),
        &actual.lines().collect::<Vec<_>>(),
        overrides,
    )
}

/// Compare two line sequences, ignoring headers
#[must_use]
pub fn match_lines(
    expected: &[&TraceLine],
    actual: &[&TraceLine],
    overrides: &EqualityOverrides,
) -> MatchReport {
    let mut compared = 0;
    for (index, (want, got)) in expected.iter().zip(actual).enumerate() {
        if want.trigger != got.trigger {
            return diverged(compared, Divergence::Trigger {
                index,
                expected: want.trigger,
                actual: got.trigger,
            });
        }
        if !want.matches(got, overrides) {
            return diverged(compared, Divergence::Body {
                index,
                trigger: want.trigger,
                paths: differing_paths(&want.body, &got.body, overrides),
                expected: render(&want.body),
                actual: render(&got.body),
            });
        }
        compared += 1;
    }

    let divergence = match expected.len().cmp(&actual.len()) {
        std::cmp::Ordering::Greater => Some(Divergence::Missing {
            index: compared,
            expected: expected[compared].trigger,
        }),
        std::cmp::Ordering::Less => Some(Divergence::Extra {
            index: compared,
            actual: actual[compared].trigger,
        }),
        std::cmp::Ordering::Equal => None,
    };
    MatchReport {
        compared,
        divergence,
    }
}

fn diverged(compared: usize, divergence: Divergence) -> MatchReport {
    tracing::warn!(%divergence, "sessions diverge");
    MatchReport {
        compared,
        divergence: Some(divergence),
    }
}

/// Dotted paths of the leaves where two values differ.
///
/// Composites are walked key by key; a key present on one side only is
/// reported at its own path. Anything else that differs is reported where
/// it sits.
#[must_use]
pub fn differing_paths(a: &Value, b: &Value, overrides: &EqualityOverrides) -> Vec<String> {
    let mut out = Vec::new();
    collect_paths(a, b, overrides, String::new(), &mut out);
    out
}

fn collect_paths(
    a: &Value,
    b: &Value,
    overrides: &EqualityOverrides,
    path: String,
    out: &mut Vec<String>,
) {
    if equal_with(a, b, overrides) {
        return;
    }
    let join = |key: &str| {
        if path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", path, key)
        }
    };
    match (a, b) {
        (Value::List(xs), Value::List(ys)) if xs.len() == ys.len() => {
            for (i, (x, y)) in xs.iter().zip(ys).enumerate() {
                collect_paths(x, y, overrides, format!("{}[{}]", path, i), out);
            }
        }
        _ if a.is_composite() && b.is_composite() => {
            let mut keys: Vec<&str> = a.entries().into_iter().map(|(k, _)| k).collect();
            keys.extend(b.entries().into_iter().map(|(k, _)| k));
            keys.sort_unstable();
            keys.dedup();
            let before = out.len();
            for key in keys {
                match (a.get(key), b.get(key)) {
                    (Some(x), Some(y)) => collect_paths(x, y, overrides, join(key), out),
                    _ => out.push(join(key)),
                }
            }
            // An override can reject a pair whose fields all match.
            if out.len() == before {
                out.push(if path.is_empty() { "<root>".to_string() } else { path });
            }
        }
        _ => out.push(if path.is_empty() { "<root>".to_string() } else { path }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oracle_core::{Record, ToValue};

    fn reader(text: &str) -> TraceReader {
        TraceReader::from_text(text).unwrap()
    }

    const BASE: &str = "# layout 1.0.0
cand_drop: {eval={nega=0, posi=2}, move={dst=50, promotion=false, src=201}, \
position_eval={adv_sq=99}}
best: {eval={posi=2}, move={dst=50, promotion=false, src=201}}
my_move: {move={dst=50, promotion=false, src=201}}
";

    #[test]
    fn test_identical_sessions_match() {
        let report = match_sessions(&reader(BASE), &reader(BASE), &EqualityOverrides::new());
        assert!(report.is_matched());
        assert_eq!(report.compared, 3);
        assert_eq!(report.report(), "Sessions match (3 lines)");
    }

    #[test]
    fn test_key_order_does_not_matter() {
        let reordered = BASE.replace("{nega=0, posi=2}", "{posi=2, nega=0}");
        let report = match_sessions(&reader(BASE), &reader(&reordered), &EqualityOverrides::new());
        assert!(report.is_matched());
    }

    #[test]
    fn test_body_divergence_reports_paths() {
        let changed = BASE.replace("position_eval={adv_sq=99}", "position_eval={adv_sq=50}");
        let report = match_sessions(&reader(BASE), &reader(&changed), &EqualityOverrides::new());
        assert_eq!(report.compared, 0);
        match report.divergence {
            Some(Divergence::Body { index, paths, .. }) => {
                assert_eq!(index, 0);
                assert_eq!(paths, vec!["position_eval.adv_sq".to_string()]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_trigger_divergence() {
        let swapped =
            "# layout 1.0.0\nbest: {eval={posi=2}, move={dst=50, promotion=false, src=201}}\n";
        let report = match_sessions(&reader(BASE), &reader(swapped), &EqualityOverrides::new());
        assert!(matches!(
            report.divergence,
            Some(Divergence::Trigger {
                index: 0,
                expected: TriggerKind::DropCandidate,
                actual: TriggerKind::BestUpdated,
            })
        ));
    }

    #[test]
    fn test_short_session_is_missing_lines() {
        let short: String = BASE.lines().take(3).map(|l| format!("{}\n", l)).collect();
        let report = match_sessions(&reader(BASE), &reader(&short), &EqualityOverrides::new());
        assert_eq!(report.compared, 2);
        assert!(matches!(
            report.divergence,
            Some(Divergence::Missing {
                index: 2,
                expected: TriggerKind::MoveChosen
            })
        ));

        let report = match_sessions(&reader(&short), &reader(BASE), &EqualityOverrides::new());
        assert!(matches!(report.divergence, Some(Divergence::Extra { index: 2, .. })));
    }

    #[test]
    fn test_layout_mismatch() {
        let other = BASE.replace("1.0.0", "1.1.0");
        let report = match_sessions(&reader(BASE), &reader(&other), &EqualityOverrides::new());
        assert!(!report.is_matched());
        assert!(report.report().contains("layout revision differs"));
    }

    #[test]
    fn test_override_keyed_on_tag() {
        fn same_move(a: &Record, b: &Record) -> bool {
            a.get("move") == b.get("move")
        }
        let changed = BASE.replace("eval={posi=2}, move", "eval={posi=7}, move");
        let strict = match_sessions(&reader(BASE), &reader(&changed), &EqualityOverrides::new());
        assert!(!strict.is_matched());

        let overrides = EqualityOverrides::new().with("best", same_move);
        let lenient = match_sessions(&reader(BASE), &reader(&changed), &overrides);
        assert!(lenient.is_matched());
    }

    #[test]
    fn test_paths_when_override_rejects() {
        fn never(_: &Record, _: &Record) -> bool {
            false
        }
        let a = Record::new("best").field("move", 1u8).to_value();
        let overrides = EqualityOverrides::new().with("best", never);
        assert_eq!(differing_paths(&a, &a, &overrides), vec!["<root>".to_string()]);
    }

    #[test]
    fn test_paths_into_lists() {
        let a = Record::new("p").field("hand", vec![0u8, 1, 2]).to_value();
        let b = Record::new("p").field("hand", vec![0u8, 3, 2]).field("ply", 1u8).to_value();
        assert_eq!(
            differing_paths(&a, &b, &EqualityOverrides::new()),
            vec!["hand[1]".to_string(), "ply".to_string()]
        );
    }
}
