//! Property-based tests for the regression decision rule and workspace naming

use std::collections::HashSet;

use menguar::compiler::{OPT_FLAGS, SIZE_OPT_FLAG};
use menguar::verifier::{regression_in, LevelSizes, SIZE_DELTA_THRESHOLD};
use menguar::workspace;
use proptest::prelude::*;
use tempfile::TempDir;

fn level_sizes(measured: &[Option<u64>; 6]) -> LevelSizes {
    let mut sizes = LevelSizes::default();
    for (flag, size) in OPT_FLAGS.iter().zip(measured.iter()) {
        sizes.set(flag, *size);
    }
    sizes
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn prop_decision_matches_quantifier_definition(
        measured in prop::array::uniform6(prop::option::of(0u64..5000)),
    ) {
        let sizes = level_sizes(&measured);

        // Regression ⇔ some measured non-reference level undercuts the
        // measured reference by more than the threshold
        let reference = OPT_FLAGS
            .iter()
            .position(|f| *f == SIZE_OPT_FLAG)
            .and_then(|idx| measured[idx]);
        let expected = match reference {
            None => false,
            Some(r) => OPT_FLAGS.iter().zip(measured.iter()).any(|(flag, size)| {
                *flag != SIZE_OPT_FLAG
                    && size.is_some_and(|s| r.saturating_sub(s) > SIZE_DELTA_THRESHOLD)
            }),
        };

        prop_assert_eq!(regression_in(&sizes), expected);
    }

    #[test]
    fn prop_decision_is_deterministic(
        measured in prop::array::uniform6(prop::option::of(0u64..5000)),
    ) {
        let sizes = level_sizes(&measured);
        prop_assert_eq!(regression_in(&sizes), regression_in(&sizes));
    }

    #[test]
    fn prop_equal_sizes_never_flag(size in 0u64..100_000) {
        let sizes = level_sizes(&[Some(size); 6]);
        prop_assert!(!regression_in(&sizes));
    }

    #[test]
    fn prop_reference_smaller_than_all_never_flags(
        reference in 0u64..1000,
        deltas in prop::array::uniform6(0u64..5000),
    ) {
        // Every other level at or above the reference size can never flag
        let mut measured = [None; 6];
        for (idx, flag) in OPT_FLAGS.iter().enumerate() {
            measured[idx] = if *flag == SIZE_OPT_FLAG {
                Some(reference)
            } else {
                Some(reference + deltas[idx])
            };
        }
        prop_assert!(!regression_in(&level_sizes(&measured)));
    }
}

#[test]
fn test_ten_thousand_allocations_yield_distinct_names() {
    let base = TempDir::new().unwrap();
    let mut seen = HashSet::new();
    for _ in 0..10_000 {
        let ws = workspace::allocate(base.path()).unwrap();
        assert_eq!(ws.name.len(), workspace::NAME_LEN);
        assert!(ws.name.chars().all(|c| c.is_ascii_uppercase()));
        assert!(seen.insert(ws.name.clone()), "duplicate name {}", ws.name);
    }
    assert_eq!(seen.len(), 10_000);
}
