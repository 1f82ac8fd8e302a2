//! Evaluation bundles.
//!
//! Each search phase leaves a different set of heuristic counters in memory.
//! They are copied as bytes; square fields keep their raw code, with
//! [`SQ_NONE`](crate::square::SQ_NONE) meaning "no such square".

use crate::layout::{BestEvalBlock, CandEvalBlock, PositionEvalBlock, RootEvalBlock};
use crate::memory::Memory;
use oracle_core::{Record, ToValue, Value};

/// Conversion from one memory cell
trait FromCell {
    fn from_cell(cell: u8) -> Self;
}

impl FromCell for u8 {
    fn from_cell(cell: u8) -> Self {
        cell
    }
}

impl FromCell for bool {
    fn from_cell(cell: u8) -> Self {
        cell != 0
    }
}

/// Declares a bundle struct, its reader over an address block, and its
/// record form. Fields must be listed in lexicographic order.
macro_rules! eval_bundle {
    (
        $(#[$meta:meta])*
        $name:ident from $block:ident {
            $($field:ident: $ty:ty),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        #[allow(missing_docs)]
        pub struct $name {
            $(pub $field: $ty,)*
        }

        impl $name {
            /// Read the bundle
            pub fn read(mem: &dyn Memory, block: &$block) -> Self {
                Self {
                    $($field: <$ty as FromCell>::from_cell(mem.read(block.$field)),)*
                }
            }
        }

        impl ToValue for $name {
            fn to_value(&self) -> Value {
                Record::new(stringify!($name))
                    $(.field(stringify!($field), self.$field))*
                    .to_value()
            }
        }
    };
}

eval_bundle! {
    /// Root position, evaluated once per engine turn
    RootEval from RootEvalBlock {
        adv_price: u8,
        disadv_price: u8,
        power_my: u8,
        power_your: u8,
        rbp_my: u8,
    }
}

eval_bundle! {
    /// Position after a candidate move is applied
    PositionEval from PositionEvalBlock {
        adv_price: u8,
        adv_sq: u8,
        disadv_price: u8,
        disadv_sq: u8,
        hanging_your: bool,
        king_safety_far_my: u8,
        king_threat_far_my: u8,
        king_threat_far_your: u8,
        king_threat_near_my: u8,
        n_choke_my: u8,
        n_loose_my: u8,
        n_promoted_my: u8,
        n_promoted_your: u8,
    }
}

eval_bundle! {
    /// Candidate move scoring
    CandEval from CandEvalBlock {
        adv_price: u8,
        capture_price: u8,
        disadv_price: u8,
        dst_to_your_king: u8,
        is_sacrifice: bool,
        nega: u8,
        posi: u8,
        to_my_king: u8,
    }
}

eval_bundle! {
    /// Best move so far
    BestEval from BestEvalBlock {
        adv_price: u8,
        adv_sq: u8,
        capture_price: u8,
        disadv_price: u8,
        disadv_sq: u8,
        dst_to_your_king: u8,
        king_safety_far_my: u8,
        king_threat_far_my: u8,
        king_threat_far_your: u8,
        n_loose_my: u8,
        n_promoted_my: u8,
        nega: u8,
        posi: u8,
        to_my_king: u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LAYOUT_V1;
    use crate::memory::MemoryImage;
    use crate::square::SQ_NONE;
    use oracle_core::render;

    #[test]
    fn test_root_eval() {
        let mem = MemoryImage::new()
            .with(0x280, 5)
            .with(0x282, 2)
            .with(0x5E4, 30)
            .with(0x5E7, 28)
            .with(0x5EA, 1);
        let eval = RootEval::read(&mem, &LAYOUT_V1.root_eval);
        assert_eq!(
            eval,
            RootEval {
                adv_price: 5,
                disadv_price: 2,
                power_my: 30,
                power_your: 28,
                rbp_my: 1,
            }
        );
        assert_eq!(
            render(&eval.to_value()),
            "{adv_price=5, disadv_price=2, power_my=30, power_your=28, rbp_my=1}"
        );
    }

    #[test]
    fn test_position_eval_keeps_raw_squares() {
        let mem = MemoryImage::new()
            .with(0x273, 50)
            .with(0x275, SQ_NONE)
            .with(0x5DF, 0x80);
        let eval = PositionEval::read(&mem, &LAYOUT_V1.position_eval);
        assert_eq!(eval.adv_sq, 50);
        assert_eq!(eval.disadv_sq, SQ_NONE);
        assert!(eval.hanging_your);
    }

    #[test]
    fn test_cand_eval_shares_price_cells_with_position_eval() {
        let mem = MemoryImage::new().with(0x272, 9).with(0x274, 4).with(0x27C, 1);
        let cand = CandEval::read(&mem, &LAYOUT_V1.cand_eval);
        let pos = PositionEval::read(&mem, &LAYOUT_V1.position_eval);
        assert_eq!(cand.adv_price, pos.adv_price);
        assert_eq!(cand.disadv_price, pos.disadv_price);
        assert!(cand.is_sacrifice);
    }

    #[test]
    fn test_best_eval_field_count() {
        let v = BestEval::default().to_value();
        match v {
            Value::Record(r) => {
                assert_eq!(r.kind(), "BestEval");
                assert_eq!(r.len(), 14);
            }
            other => panic!("expected record, got {:?}", other),
        }
    }
}
