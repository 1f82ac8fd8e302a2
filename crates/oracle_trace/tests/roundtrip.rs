//! Captured snapshots written as trace text and read back.

use oracle_core::{EqualityOverrides, Record};
use oracle_decode::{LAYOUT_V1, MemoryImage, TriggerKind, capture};
use oracle_trace::{TraceLine, TraceReader, layout_header, match_sessions, render_raw};

fn engine_turn() -> MemoryImage {
    MemoryImage::new()
        // last human move: ７七 to ７六
        .with(0x5A1, 69)
        .with(0x5A2, 80)
        .with(0x5BE, 99)
        .with(0x280, 4)
        // candidate: engine pawn drop on ４四
        .with(0x276, 50)
        .with(0x277, 201)
        .with(0x27C, 1)
        // best move
        .with(0x284, 50)
        .with(0x285, 201)
        .with(0x287, 99)
        // chosen move
        .with(0x5BB, 50)
        .with(0x5BC, 201)
}

fn session_text(mem: &MemoryImage, order: &[TriggerKind]) -> String {
    let mut text = layout_header(LAYOUT_V1.revision);
    text.push('\n');
    for &trigger in order {
        let snapshot = capture(trigger, mem, &LAYOUT_V1).unwrap();
        text.push_str(&TraceLine::from_snapshot(&snapshot).to_string());
        text.push('\n');
    }
    text
}

const ORDER: [TriggerKind; 4] = [
    TriggerKind::RootEvaluated,
    TriggerKind::DropCandidate,
    TriggerKind::BestUpdated,
    TriggerKind::MoveChosen,
];

#[test]
fn test_written_trace_reads_back_equal() {
    let mem = engine_turn();
    let text = session_text(&mem, &ORDER);
    let reader = TraceReader::from_text(&text).unwrap();
    assert_eq!(reader.layout(), Some(LAYOUT_V1.revision));

    let expected: Vec<TraceLine> = ORDER
        .iter()
        .map(|&t| TraceLine::from_snapshot(&capture(t, &mem, &LAYOUT_V1).unwrap()))
        .collect();
    let read: Vec<TraceLine> = reader.collect();
    assert_eq!(read, expected);
    for (a, b) in read.iter().zip(&expected) {
        assert_eq!(a.to_string(), b.to_string());
    }
}

#[test]
fn test_notation_from_read_lines() {
    let text = session_text(&engine_turn(), &ORDER);
    let notations: Vec<String> = TraceReader::from_text(&text)
        .unwrap()
        .filter_map(|line| line.subject_move())
        .map(|(side, mv)| render_raw(&mv, side).unwrap())
        .collect();
    assert_eq!(notations, vec!["７七７六", "４四歩打", "４四歩打", "４四歩打"]);
}

#[test]
fn test_changed_eval_is_reported() {
    let mem = engine_turn();
    let left = TraceReader::from_text(&session_text(&mem, &ORDER)).unwrap();
    let right = TraceReader::from_text(&session_text(&mem.clone().with(0x2A4, 3), &ORDER)).unwrap();
    let report = match_sessions(&left, &right, &EqualityOverrides::new());
    assert!(!report.is_matched());
    assert_eq!(report.compared, 1);
    assert!(report.report().contains("eval.posi"));
}

fn same_destination(a: &Record, b: &Record) -> bool {
    a.get("dst") == b.get("dst")
}

#[test]
fn test_nested_override_survives_reading_back() {
    // Same destination, different source: a board move and a drop.
    let board = MemoryImage::new().with(0x5BB, 50).with(0x5BC, 12);
    let drop = board.clone().with(0x5BC, 201);
    let order = [TriggerKind::MoveChosen];
    let overrides = EqualityOverrides::new().with("RawMove", same_destination);

    let in_memory = |mem: &MemoryImage| {
        let snapshot = capture(TriggerKind::MoveChosen, mem, &LAYOUT_V1).unwrap();
        let line = TraceLine::from_snapshot(&snapshot);
        TraceReader::from_lines(Some(LAYOUT_V1.revision), vec![line])
    };
    let parsed = |mem: &MemoryImage| TraceReader::from_text(&session_text(mem, &order)).unwrap();

    let strict = match_sessions(&in_memory(&board), &in_memory(&drop), &EqualityOverrides::new());
    assert!(!strict.is_matched());

    for (left, right) in [
        (in_memory(&board), in_memory(&drop)),
        (parsed(&board), parsed(&drop)),
        (in_memory(&board), parsed(&drop)),
        (parsed(&board), in_memory(&drop)),
    ] {
        let report = match_sessions(&left, &right, &overrides);
        assert!(report.is_matched(), "{}", report.report());
    }
}

#[test]
fn test_bundle_override_on_parsed_trace() {
    fn ignore_eval(_: &Record, _: &Record) -> bool {
        true
    }
    let mem = engine_turn();
    let left = TraceReader::from_text(&session_text(&mem, &ORDER)).unwrap();
    let right = TraceReader::from_text(&session_text(&mem.clone().with(0x2A6, 9), &ORDER)).unwrap();

    let strict = match_sessions(&left, &right, &EqualityOverrides::new());
    assert_eq!(strict.compared, 2);
    let overrides = EqualityOverrides::new().with("BestEval", ignore_eval);
    let lenient = match_sessions(&left, &right, &overrides);
    assert!(lenient.is_matched(), "{}", lenient.report());
}
