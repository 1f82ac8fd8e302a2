//! Localized move notation.
//!
//! Files are full-width digits counted from the right, ranks are kanji
//! numerals. A board move prints source then destination, with 成 when it
//! promotes; a drop prints the destination, the piece and 打.
//!
//! Drops decode differently per side, so there is no side-neutral renderer
//! for raw moves: callers pick [`render_human`] or [`render_engine`].

use oracle_decode::{DecodeResult, Move, Piece, RawMove, Side, Square};

const FILE_LABELS: [&str; 9] = ["１", "２", "３", "４", "５", "６", "７", "８", "９"];
const RANK_LABELS: [&str; 9] = ["一", "二", "三", "四", "五", "六", "七", "八", "九"];

/// Promotion suffix
pub const PROMOTION_MARK: &str = "成";

/// Drop suffix
pub const DROP_MARK: &str = "打";

/// File label; the table is indexed by `10 - x`
#[must_use]
pub fn file_label(sq: Square) -> &'static str {
    FILE_LABELS[usize::from(10 - sq.x()) - 1]
}

/// Rank label, indexed by `y`
#[must_use]
pub fn rank_label(sq: Square) -> &'static str {
    RANK_LABELS[usize::from(sq.y()) - 1]
}

/// File then rank, e.g. `９一`
#[must_use]
pub fn square_label(sq: Square) -> String {
    format!("{}{}", file_label(sq), rank_label(sq))
}

/// Single-character piece label
#[must_use]
pub const fn piece_label(piece: Piece) -> &'static str {
    match piece {
        Piece::King => "玉",
        Piece::Rook => "飛",
        Piece::Bishop => "角",
        Piece::Gold => "金",
        Piece::Silver => "銀",
        Piece::Knight => "桂",
        Piece::Lance => "香",
        Piece::Pawn => "歩",
        Piece::Dragon => "龍",
        Piece::Horse => "馬",
        Piece::ProSilver => "全",
        Piece::ProKnight => "圭",
        Piece::ProLance => "杏",
        Piece::ProPawn => "と",
    }
}

/// Notation for a decoded move
#[must_use]
pub fn render_move(mv: &Move) -> String {
    match *mv {
        Move::Board {
            src,
            dst,
            promotion,
        } => format!(
            "{}{}{}",
            square_label(src),
            square_label(dst),
            if promotion { PROMOTION_MARK } else { "" }
        ),
        Move::Drop { dst, piece } => {
            format!("{}{}{}", square_label(dst), piece_label(piece), DROP_MARK)
        }
    }
}

/// Notation for a raw move made by `side`
///
/// # Errors
///
/// Returns error if the bytes do not decode for that side
pub fn render_raw(raw: &RawMove, side: Side) -> DecodeResult<String> {
    raw.decode(side).map(|mv| render_move(&mv))
}

/// Notation for a raw move made by the human
///
/// # Errors
///
/// Returns error if the bytes are not a valid human move
pub fn render_human(raw: &RawMove) -> DecodeResult<String> {
    render_raw(raw, Side::Human)
}

/// Notation for a raw move made by the engine
///
/// # Errors
///
/// Returns error if the bytes are not a valid engine move
pub fn render_engine(raw: &RawMove) -> DecodeResult<String> {
    render_raw(raw, Side::Engine)
}
