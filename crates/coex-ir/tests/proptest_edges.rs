//! Property-based tests for the edge-weight table.
//!
//! Weights are stored once per unordered pair and never below or at zero.

use coex_ir::{Coordination, DeviceId, EdgeKey, EdgeWeightTable};
use proptest::prelude::*;

/// Generate weighted pairs over up to 8 devices, including zero and negative weights.
fn arb_weights() -> impl Strategy<Value = Vec<(u8, u8, f64)>> {
    prop::collection::vec((0_u8..8, 0_u8..8, -0.5_f64..=1.0), 0..30)
}

fn id(n: u8) -> DeviceId {
    DeviceId::from(format!("d{n}"))
}

proptest! {
    #[test]
    fn lookup_is_order_independent(weights in arb_weights()) {
        let mut table = EdgeWeightTable::new("freespace", Coordination::Point);
        for (a, b, w) in &weights {
            if a != b {
                table.insert(EdgeKey::new(id(*a), id(*b)).unwrap(), *w).unwrap();
            }
        }

        for a in 0..8 {
            for b in 0..8 {
                prop_assert_eq!(table.get(&id(a), &id(b)), table.get(&id(b), &id(a)));
            }
        }
    }

    #[test]
    fn only_positive_weights_are_stored(weights in arb_weights()) {
        let mut table = EdgeWeightTable::new("freespace", Coordination::Area);
        for (a, b, w) in &weights {
            if a != b {
                table.insert(EdgeKey::new(id(*b), id(*a)).unwrap(), *w).unwrap();
            }
        }

        for (key, w) in table.iter() {
            prop_assert!(w > 0.0 && w <= 1.0);
            prop_assert!(key.first() < key.second());
        }
    }
}
