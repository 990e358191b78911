// Copyright (c) 2025 - Cowboy AI, Inc.
//! Lazy Reactive Sequences
//!
//! This module provides the two sequence types of the crate and the trait
//! they share. Both are *assemblies*: immutable descriptions of how to
//! produce values. Nothing runs until a consumer subscribes, and every
//! subscription is an independent run with its own state.
//!
//! # Core Concepts
//!
//! ## Flux<T>
//!
//! Zero or more values followed by exactly one terminal signal.
//!
//! ```text
//! Time: ────────────────────────────→
//! Value:      ●       ●   ●       ●  |
//! ```
//!
//! ## Mono<T>
//!
//! At most one value followed by exactly one terminal signal.
//!
//! ```text
//! Time: ────────────────────────────→
//! Value:          ●|
//! ```
//!
//! # Signals
//!
//! Inside a run every item is a [`ReactiveResult<T>`]: `Ok(value)` is an
//! `onNext`, `Err(error)` is `onError`, and the end of the stream is
//! `onComplete`. Every assembled stream is fused on the first error, so no
//! value ever follows a failure.
//!
//! # Operators Return New Sequences
//!
//! ```rust,ignore
//! use cim_reactive::prelude::*;
//!
//! let names = Flux::from_iterable(["aaa", "bbb"].map(String::from));
//!
//! // The result is dropped, `names` is unchanged
//! let _ = names.clone().map(|name| name.to_uppercase());
//!
//! assert_eq!(names.collect().await?, vec!["aaa", "bbb"]);
//! ```

pub mod combinators;
pub mod delay;
pub mod flux;
pub mod mono;

pub use combinators::{concat, merge};
pub use delay::{DelayProvider, FixedDelay, FnDelay, RandomDelay};
pub use flux::Flux;
pub use mono::Mono;

use futures::future::BoxFuture;
use futures::stream::{self, BoxStream, StreamExt};

use crate::errors::ReactiveResult;
use crate::subscriber::{Subscriber, Subscription};

/// One run of a [`Flux`]: values and failures in emission order
pub type SignalStream<T> = BoxStream<'static, ReactiveResult<T>>;

/// One run of a [`Mono`]: `Ok(None)` completes empty
pub type SignalFuture<T> = BoxFuture<'static, ReactiveResult<Option<T>>>;

/// Capability shared by [`Flux`] and [`Mono`]
///
/// Lets operators such as `concat_with`, `switch_if_empty` or `concat_map`
/// accept either kind of sequence.
pub trait Publisher<T: Send + 'static>: Clone + Send + Sync + 'static {
    /// The type of sequence produced by map
    type Mapped<U: Send + 'static>: Publisher<U>;

    /// Apply a function to every emitted value
    ///
    /// Must satisfy the Functor laws:
    /// 1. `seq.map(id) == seq`
    /// 2. `seq.map(f).map(g) == seq.map(|x| g(f(x)))`
    fn map<U, F>(self, f: F) -> Self::Mapped<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static;

    /// View this sequence as a [`Flux`]
    fn into_flux(self) -> Flux<T>;

    /// Start a new run delivering signals to `subscriber`
    fn subscribe<S>(&self, subscriber: S) -> Subscription
    where
        S: Subscriber<T> + 'static,
    {
        self.clone().into_flux().subscribe(subscriber)
    }
}

/// Stop a stream right after the first failure it yields
///
/// The upstream is never polled again once a failure went through, and is
/// dropped as soon as the fused stream ends.
pub(crate) fn fuse_on_error<T: Send + 'static>(signals: SignalStream<T>) -> SignalStream<T> {
    stream::unfold(Some(signals), |upstream| async move {
        let mut signals = match upstream {
            Some(signals) => signals,
            None => return None,
        };
        match signals.next().await {
            Some(Err(error)) => Some((Err(error), None)),
            Some(Ok(value)) => Some((Ok(value), Some(signals))),
            None => None,
        }
    })
    .fuse()
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ReactiveError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_fuse_on_error_drops_values_after_failure() {
        let raw = stream::iter(vec![
            Ok(1),
            Err(ReactiveError::source("boom")),
            Ok(2),
            Err(ReactiveError::source("again")),
        ])
        .boxed();

        let items: Vec<_> = fuse_on_error(raw).collect().await;

        assert_eq!(items, vec![Ok(1), Err(ReactiveError::source("boom"))]);
    }

    #[tokio::test]
    async fn test_fuse_on_error_never_pulls_after_failure() {
        let pulls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&pulls);
        let raw = stream::iter(vec![Err(ReactiveError::source("boom")), Ok(1), Ok(2)])
            .inspect(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .boxed();

        let mut fused = fuse_on_error(raw);

        assert_eq!(fused.next().await, Some(Err(ReactiveError::source("boom"))));
        assert_eq!(fused.next().await, None);
        assert_eq!(fused.next().await, None);
        assert_eq!(pulls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_merge_ends_at_failure_despite_pending_sibling() {
        let merged = merge([
            Flux::<i32>::error(ReactiveError::source("boom")),
            Flux::from_stream_fn(stream::pending),
        ]);
        let mut run = merged.into_stream();

        assert_eq!(run.next().await, Some(Err(ReactiveError::source("boom"))));

        let after = tokio::time::timeout(std::time::Duration::from_millis(500), run.next()).await;
        assert_eq!(after, Ok(None));
    }

    // Generic code over either sequence kind
    fn lengths<P: Publisher<String>>(publisher: P) -> Flux<usize> {
        publisher.map(|s| s.len()).into_flux()
    }

    #[tokio::test]
    async fn test_publisher_trait_over_flux_and_mono() {
        let flux = Flux::from_iterable(["ab", "cde"].map(String::from));
        let mono = Mono::just("wxyz".to_string());

        assert_eq!(lengths(flux).collect().await.unwrap(), vec![2, 3]);
        assert_eq!(lengths(mono).collect().await.unwrap(), vec![4]);
    }
}
