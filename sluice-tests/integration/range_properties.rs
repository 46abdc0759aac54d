//! Property tests for the range parser contract.

use proptest::prelude::*;
use sluice_core::delivery::{RangeOutcome, parse_range};

/// `(total, start, end)` with `0 <= start <= end < total`.
fn valid_triplets() -> impl Strategy<Value = (u64, u64, u64)> {
    (1u64..100_000).prop_flat_map(|total| {
        (0..total).prop_flat_map(move |start| {
            (start..total).prop_map(move |end| (total, start, end))
        })
    })
}

proptest! {
    #[test]
    fn parsed_window_has_exact_byte_count((total, start, end) in valid_triplets()) {
        let header = format!("bytes={start}-{end}");

        match parse_range(Some(&header), total) {
            RangeOutcome::Partial(range) => {
                prop_assert_eq!(range.start(), start);
                prop_assert_eq!(range.end(), end);
                prop_assert_eq!(range.len(), end - start + 1);
            }
            other => prop_assert!(false, "expected partial range, got {:?}", other),
        }
    }

    #[test]
    fn end_at_or_beyond_total_is_unsatisfiable(
        total in 1u64..10_000,
        start in 0u64..10_000,
        overshoot in 0u64..10_000,
    ) {
        let end = total + overshoot;
        let header = format!("bytes={start}-{end}");

        prop_assert_eq!(
            parse_range(Some(&header), total),
            RangeOutcome::Unsatisfiable { total_size: total }
        );
    }

    #[test]
    fn inverted_bounds_are_unsatisfiable(
        total in 1u64..10_000,
        start in 1u64..10_000,
        delta in 1u64..1_000,
    ) {
        let end = start.saturating_sub(delta);
        prop_assume!(end < start);
        let header = format!("bytes={start}-{end}");

        prop_assert_eq!(
            parse_range(Some(&header), total),
            RangeOutcome::Unsatisfiable { total_size: total }
        );
    }

    #[test]
    fn absent_header_always_serves_full_content(total in 0u64..1_000_000) {
        prop_assert_eq!(parse_range(None, total), RangeOutcome::Full);
    }
}
