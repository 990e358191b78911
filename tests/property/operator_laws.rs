// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Operator Laws
//!
//! Every property runs on a paused current-thread runtime, so per-element
//! delays advance virtual time only and the tests stay fast.

use cim_reactive::prelude::*;
use proptest::prelude::*;
use std::future::Future;
use std::time::Duration;

// ============================================================================
// Helpers
// ============================================================================

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .expect("runtime")
        .block_on(future)
}

fn collect<T: Send + 'static>(flux: &Flux<T>) -> Vec<T> {
    block_on(flux.collect()).expect("sequence completes")
}

/// Keep the values of one source, in the order they appear in `merged`
fn from_source(merged: &[(usize, i32)], source: usize) -> Vec<i32> {
    merged
        .iter()
        .filter(|(s, _)| *s == source)
        .map(|(_, v)| *v)
        .collect()
}

// ============================================================================
// Property Test Strategies
// ============================================================================

fn values() -> impl Strategy<Value = Vec<i32>> {
    prop::collection::vec(-1000i32..1000, 0..30)
}

fn delays() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(0u64..50, 1..5)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// map keeps count and order
    #[test]
    fn prop_map_preserves_order(input in values()) {
        let flux = Flux::from_iterable(input.clone()).map(|x| x * 2);
        let expected: Vec<i32> = input.iter().map(|x| x * 2).collect();

        prop_assert_eq!(collect(&flux), expected);
    }

    /// map(f).map(g) == map(g ∘ f)
    #[test]
    fn prop_map_composition(input in values()) {
        let source = Flux::from_iterable(input);
        let chained = source.clone().map(|x| x + 1).map(|x| x * 3);
        let composed = source.map(|x| (x + 1) * 3);

        prop_assert_eq!(collect(&chained), collect(&composed));
    }

    /// filter yields exactly the matching subsequence
    #[test]
    fn prop_filter_is_subsequence(input in values()) {
        let flux = Flux::from_iterable(input.clone()).filter(|x| x % 3 == 0);
        let expected: Vec<i32> = input.into_iter().filter(|x| x % 3 == 0).collect();

        prop_assert_eq!(collect(&flux), expected);
    }

    /// concat emits the first source entirely, then the second
    #[test]
    fn prop_concat_appends(a in values(), b in values()) {
        let joined = concat([Flux::from_iterable(a.clone()), Flux::from_iterable(b.clone())]);
        let expected: Vec<i32> = a.into_iter().chain(b).collect();

        prop_assert_eq!(collect(&joined), expected);
    }

    /// concat_map inlines every sub-sequence in source order
    #[test]
    fn prop_concat_map_order(input in prop::collection::vec(0usize..5, 0..10)) {
        let flux = Flux::from_iterable(input.clone()).concat_map(|n| {
            Flux::from_iterable(vec![n; n]).delay_elements(Duration::from_millis(5))
        });
        let expected: Vec<usize> = input.iter().flat_map(|&n| vec![n; n]).collect();

        prop_assert_eq!(collect(&flux), expected);
    }

    /// flat_map emits the same multiset as concat_map
    #[test]
    fn prop_flat_map_same_values(
        input in prop::collection::vec(0usize..5, 0..10),
        delay in delays(),
    ) {
        let step = delay[0];
        let flat = Flux::from_iterable(input.clone()).flat_map(move |n| {
            Flux::from_iterable(vec![n; n]).delay_elements(Duration::from_millis(step * n as u64))
        });
        let mut expected: Vec<usize> = input.iter().flat_map(|&n| vec![n; n]).collect();
        let mut actual = collect(&flat);

        expected.sort_unstable();
        actual.sort_unstable();
        prop_assert_eq!(actual, expected);
    }

    /// merge loses nothing and keeps each source's own order
    #[test]
    fn prop_merge_keeps_per_source_order(
        sources in prop::collection::vec(values(), 1..4),
        delay in delays(),
    ) {
        let fluxes: Vec<Flux<(usize, i32)>> = sources
            .iter()
            .enumerate()
            .map(|(index, values)| {
                let tagged: Vec<(usize, i32)> = values.iter().map(|v| (index, *v)).collect();
                let step = delay[index % delay.len()];
                Flux::from_iterable(tagged).delay_elements(Duration::from_millis(step))
            })
            .collect();

        let merged = collect(&merge(fluxes));

        let total: usize = sources.iter().map(Vec::len).sum();
        prop_assert_eq!(merged.len(), total);
        for (index, values) in sources.iter().enumerate() {
            prop_assert_eq!(&from_source(&merged, index), values);
        }
    }

    /// take(n) is the n-value prefix
    #[test]
    fn prop_take_is_prefix(input in values(), n in 0usize..40) {
        let flux = Flux::from_iterable(input.clone()).take(n);
        let expected: Vec<i32> = input.into_iter().take(n).collect();

        prop_assert_eq!(collect(&flux), expected);
    }

    /// default_if_empty only changes an empty sequence
    #[test]
    fn prop_default_if_empty(input in values()) {
        let flux = Flux::from_iterable(input.clone()).default_if_empty(i32::MIN);
        let expected = if input.is_empty() { vec![i32::MIN] } else { input };

        prop_assert_eq!(collect(&flux), expected);
    }

    /// Every subscription is an independent run with the same output
    #[test]
    fn prop_resubscription_is_identical(input in values()) {
        let flux = Flux::from_iterable(input)
            .filter(|x| x % 2 == 0)
            .concat_map(|x| Flux::from_iterable(vec![x, -x]));

        let first = collect(&flux);
        let second = collect(&flux);

        prop_assert_eq!(first, second);
    }
}
