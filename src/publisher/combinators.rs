// Copyright (c) 2025 - Cowboy AI, Inc.
//! Sequence Combinators
//!
//! Functions that compose several independent sequences into one.
//!
//! - `concat` - subscribe to each source only after the previous one completed
//! - `merge` - subscribe to every source at once and interleave by arrival
//!
//! Both stop at the first failure of any source.
//!
//! # Examples
//!
//! ```rust,ignore
//! use cim_reactive::publisher::combinators::*;
//!
//! let first = Flux::from_iterable(["A", "B", "C"]);
//! let second = Flux::from_iterable(["E", "F", "G"]);
//!
//! // Always A, B, C, E, F, G
//! let joined = concat([first.clone(), second.clone()]);
//!
//! // Same six values; A before B before C and E before F before G
//! let mixed = merge([first, second]);
//! ```

use futures::stream::{self, StreamExt};
use std::sync::Arc;

use super::flux::Flux;

/// Concatenate sources in order
///
/// Output is the full output of the first source followed by the full
/// output of the second, and so on. A later source is not subscribed to
/// until every earlier one has completed.
pub fn concat<T, I>(sources: I) -> Flux<T>
where
    T: Send + 'static,
    I: IntoIterator<Item = Flux<T>>,
{
    let sources: Arc<[Flux<T>]> = sources.into_iter().collect();
    Flux::from_stream_fn(move || {
        stream::iter(sources.to_vec())
            .map(|source| source.into_stream())
            .flatten()
    })
}

/// Merge sources concurrently
///
/// Every source is subscribed to at once. Values of one source keep their
/// relative order; values of different sources arrive in real-time order.
/// Completes once all sources have completed.
pub fn merge<T, I>(sources: I) -> Flux<T>
where
    T: Send + 'static,
    I: IntoIterator<Item = Flux<T>>,
{
    let sources: Arc<[Flux<T>]> = sources.into_iter().collect();
    Flux::from_stream_fn(move || stream::select_all(sources.iter().map(Flux::into_stream)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ReactiveError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_concat() {
        let first = Flux::from_iterable(["A", "B", "C"]);
        let second = Flux::from_iterable(["E", "F", "G"]);

        let joined = concat([first, second]);

        assert_eq!(
            joined.collect().await.unwrap(),
            vec!["A", "B", "C", "E", "F", "G"]
        );
    }

    #[tokio::test]
    async fn test_concat_of_nothing_completes() {
        let joined = concat(Vec::<Flux<i32>>::new());
        assert!(joined.collect().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concat_failure_skips_later_sources() {
        let touched = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&touched);
        let later = Flux::from_stream_fn(move || {
            flag.store(true, Ordering::SeqCst);
            stream::iter(vec![Ok(3)])
        });

        let joined = concat([
            Flux::just(1),
            Flux::error(ReactiveError::source("first failed")),
            later,
        ]);

        assert_eq!(
            joined.collect().await,
            Err(ReactiveError::source("first failed"))
        );
        assert!(!touched.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_merge_interleaves_by_arrival() {
        let slow = Flux::from_iterable(["s1", "s2"]).delay_elements(Duration::from_millis(100));
        let fast = Flux::from_iterable(["f1", "f2"]).delay_elements(Duration::from_millis(30));

        let merged = merge([slow, fast]).collect().await.unwrap();

        assert_eq!(merged, vec!["f1", "f2", "s1", "s2"]);
    }

    #[tokio::test]
    async fn test_merge_failure_terminates() {
        let merged = merge([
            Flux::from_iterable(vec![1, 2]),
            Flux::error(ReactiveError::source("broken")),
        ]);

        assert_eq!(merged.collect().await, Err(ReactiveError::source("broken")));
    }

    #[tokio::test]
    async fn test_merge_of_nothing_completes() {
        let merged = merge(Vec::<Flux<i32>>::new());
        assert!(merged.collect().await.unwrap().is_empty());
    }
}
