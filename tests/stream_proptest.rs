//! Property-based tests for pipeline evaluation
//!
//! These tests check the algebraic guarantees of the engine:
//! - filter partitions a sequence
//! - map keeps length and position in sequential mode
//! - distinct is idempotent
//! - sorted is stable
//! - skip/limit clamp at the sequence bounds
//! - parallel reduction of a commutative sum matches sequential reduction

use chainflow::Stream;
use proptest::prelude::*;

fn values() -> impl Strategy<Value = Vec<i32>> {
    prop::collection::vec(-50i32..50, 0..40)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn filter_partitions(data in values(), threshold in -50i32..50) {
        let kept = Stream::new(data.clone()).filter(move |x| *x < threshold);
        let dropped = Stream::new(data.clone()).filter(move |x| *x >= threshold);
        let (kept, dropped) = (kept.count().unwrap(), dropped.count().unwrap());
        prop_assert_eq!(kept + dropped, data.len());
    }

    #[test]
    fn map_keeps_positions(data in values()) {
        let mapped = Stream::new(data.clone()).map(|x| x * 3 - 1).to_vec().unwrap();
        let expected: Vec<i32> = data.iter().map(|x| x * 3 - 1).collect();
        prop_assert_eq!(mapped, expected);
    }

    #[test]
    fn distinct_is_idempotent(data in values()) {
        let dedup = |data: Vec<i32>| {
            Stream::new(data).distinct(|a, b| a == b).unwrap().to_vec().unwrap()
        };
        let once = dedup(data);
        let twice = dedup(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn sorted_is_stable(data in values()) {
        // Sort (bucket, position) pairs by bucket only
        let tagged: Vec<(i32, usize)> =
            data.iter().enumerate().map(|(pos, x)| (x.div_euclid(10), pos)).collect();
        let sorted = Stream::new(tagged.clone()).sorted(|a, b| a.0 < b.0).unwrap();
        let sorted = sorted.to_vec().unwrap();

        prop_assert_eq!(sorted.len(), tagged.len());
        for pair in sorted.windows(2) {
            prop_assert!(pair[0].0 <= pair[1].0);
            if pair[0].0 == pair[1].0 {
                prop_assert!(pair[0].1 < pair[1].1);
            }
        }
    }

    #[test]
    fn skip_and_limit_clamp(data in values(), n in 0usize..60) {
        let skipped = Stream::new(data.clone()).skip(n).unwrap().to_vec().unwrap();
        let limited = Stream::new(data.clone()).limit(n).unwrap().to_vec().unwrap();

        prop_assert_eq!(&skipped, &data.iter().copied().skip(n).collect::<Vec<_>>());
        prop_assert_eq!(&limited, &data.iter().copied().take(n).collect::<Vec<_>>());
        if n >= data.len() {
            prop_assert!(skipped.is_empty());
        }
        if n == 0 {
            prop_assert!(limited.is_empty());
        }
    }

    #[test]
    fn parallel_sum_matches_sequential(data in values()) {
        let sequential = Stream::new(data.clone()).reduce(|a, b| a + b).unwrap();
        let parallel = Stream::parallel(data).reduce(|a, b| a + b).unwrap();
        prop_assert_eq!(parallel, sequential);
    }

    #[test]
    fn parallel_count_matches_sequential(data in values(), threshold in -50i32..50) {
        let sequential = Stream::new(data.clone()).filter(move |x| *x > threshold).count().unwrap();
        let parallel = Stream::parallel(data).filter(move |x| *x > threshold).count().unwrap();
        prop_assert_eq!(parallel, sequential);
    }
}
