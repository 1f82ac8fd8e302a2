//! Board squares.
//!
//! Squares are indices into an 11-wide grid with a one-cell border:
//! `sq = 11 * y + x`. Only `x, y` in `1..=9` are playable, so valid codes run
//! from 12 (`x = 1, y = 1`) to 108 (`x = 9, y = 9`).

use crate::error::{DecodeError, DecodeResult};
use oracle_core::{ToValue, Value};

/// Grid width including the border
pub const GRID_WIDTH: u8 = 11;

/// Cells in one board array
pub const GRID_CELLS: usize = 121;

/// Raw code meaning "no square" inside evaluation bundles
pub const SQ_NONE: u8 = 99;

/// Encode `(x, y)` as a square index
#[must_use]
pub const fn xy2sq(x: u8, y: u8) -> u8 {
    GRID_WIDTH * y + x
}

/// Decode a square index into `(x, y)`
#[must_use]
pub const fn sq2xy(sq: u8) -> (u8, u8) {
    (sq % GRID_WIDTH, sq / GRID_WIDTH)
}

/// A playable square
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    /// Validate a raw square code
    ///
    /// # Errors
    ///
    /// Returns error if the code is on the border or outside the grid
    pub fn new(code: u8) -> DecodeResult<Self> {
        let (x, y) = sq2xy(code);
        if (1..=9).contains(&x) && (1..=9).contains(&y) {
            Ok(Self(code))
        } else {
            Err(DecodeError::InvalidSquare { code })
        }
    }

    /// Square at `(x, y)`
    ///
    /// # Errors
    ///
    /// Returns error if either coordinate is outside `1..=9`
    pub fn from_xy(x: u8, y: u8) -> DecodeResult<Self> {
        if (1..=9).contains(&x) && (1..=9).contains(&y) {
            Ok(Self(xy2sq(x, y)))
        } else {
            Err(DecodeError::InvalidSquare {
                code: x.saturating_add(y.saturating_mul(GRID_WIDTH)),
            })
        }
    }

    /// Raw code
    #[must_use]
    pub const fn code(self) -> u8 {
        self.0
    }

    /// Column, 1 (leftmost in memory) to 9
    #[must_use]
    pub const fn x(self) -> u8 {
        sq2xy(self.0).0
    }

    /// Row, 1 to 9
    #[must_use]
    pub const fn y(self) -> u8 {
        sq2xy(self.0).1
    }
}

impl ToValue for Square {
    fn to_value(&self) -> Value {
        Value::int(self.0)
    }
}
