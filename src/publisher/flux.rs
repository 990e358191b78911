// Copyright (c) 2025 - Cowboy AI, Inc.
//! Flux - Sequences of Zero or More Values
//!
//! A `Flux<T>` is a plan for producing values. It holds a single assembly
//! function; each subscription calls it and receives a fresh
//! [`SignalStream`], so runs never share state.
//!
//! # Mathematical Model
//!
//! ```text
//! Flux<T> ≅ () → Stream<Result<T, ReactiveError>>
//! ```
//!
//! # Examples
//!
//! ## Ordered vs. concurrent flat expansion
//!
//! ```rust,ignore
//! let names = Flux::from_iterable(["alex", "ben"].map(String::from));
//!
//! // Always a, l, e, x, b, e, n
//! let ordered = names.clone().concat_map(split);
//!
//! // Same 7 letters, interleaving decided by arrival time
//! let interleaved = names.flat_map(|n| split(n).delay_elements(Duration::from_millis(10)));
//! ```

use futures::future;
use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use super::combinators;
use super::delay::{DelayProvider, FixedDelay};
use super::mono::Mono;
use super::{fuse_on_error, Publisher, SignalStream};
use crate::errors::{ReactiveError, ReactiveResult};
use crate::subscriber::{FnSubscriber, Subscriber, Subscription};

type Assembly<T> = Arc<dyn Fn() -> SignalStream<T> + Send + Sync>;

/// Lazy sequence of zero or more values
pub struct Flux<T> {
    assembly: Assembly<T>,
}

impl<T> Clone for Flux<T> {
    fn clone(&self) -> Self {
        Self {
            assembly: Arc::clone(&self.assembly),
        }
    }
}

impl<T> Debug for Flux<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Flux<{}>", std::any::type_name::<T>())
    }
}

impl<T: Send + 'static> Flux<T> {
    /// Create a flux from a producer factory
    ///
    /// The factory is called once per subscription. The stream it returns
    /// is fused on its first error.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let counter = Flux::from_stream_fn(|| futures::stream::iter((1..=3).map(Ok)));
    /// assert_eq!(counter.collect().await?, vec![1, 2, 3]);
    /// ```
    pub fn from_stream_fn<F, S>(factory: F) -> Self
    where
        F: Fn() -> S + Send + Sync + 'static,
        S: Stream<Item = ReactiveResult<T>> + Send + 'static,
    {
        Self {
            assembly: Arc::new(move || fuse_on_error(factory().boxed())),
        }
    }

    /// A flux that completes without emitting
    pub fn empty() -> Self {
        Self::from_stream_fn(stream::empty)
    }

    /// A flux that fails immediately, once per subscription
    pub fn error(error: ReactiveError) -> Self {
        Self::from_stream_fn(move || stream::once(future::ready(Err(error.clone()))))
    }

    /// Start a fresh run and return it as a stream
    pub fn into_stream(&self) -> SignalStream<T> {
        (self.assembly)()
    }

    /// Run once and gather every value, or the failure that ended the run
    pub async fn collect(&self) -> ReactiveResult<Vec<T>> {
        self.into_stream().try_collect().await
    }

    /// Start a run that delivers signals to `subscriber`
    ///
    /// Must be called from within a tokio runtime.
    pub fn subscribe<S>(&self, subscriber: S) -> Subscription
    where
        S: Subscriber<T> + 'static,
    {
        Subscription::spawn(self.clone(), subscriber)
    }

    /// Start a run that hands every value to `on_next`
    pub fn subscribe_fn<F>(&self, on_next: F) -> Subscription
    where
        F: FnMut(T) + Send + 'static,
    {
        self.subscribe(FnSubscriber::new(on_next))
    }

    /// Transform every value, preserving order
    pub fn map<U, F>(self, f: F) -> Flux<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Flux::from_stream_fn(move || {
            let f = Arc::clone(&f);
            self.into_stream().map(move |item| item.map(|value| f(value)))
        })
    }

    /// Transform every value with a fallible function
    ///
    /// The first failing value terminates the run with
    /// [`ReactiveError::Operator`] (or whatever the error converts into).
    pub fn try_map<U, E, F>(self, f: F) -> Flux<U>
    where
        U: Send + 'static,
        E: Into<ReactiveError>,
        F: Fn(T) -> Result<U, E> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Flux::from_stream_fn(move || {
            let f = Arc::clone(&f);
            self.into_stream()
                .map(move |item| item.and_then(|value| f(value).map_err(Into::into)))
        })
    }

    /// Keep only values matching `predicate`, preserving order
    pub fn filter<P>(self, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let predicate = Arc::new(predicate);
        Flux::from_stream_fn(move || {
            let predicate = Arc::clone(&predicate);
            self.into_stream().filter(move |item| {
                future::ready(match item {
                    Ok(value) => predicate(value),
                    Err(_) => true,
                })
            })
        })
    }

    /// Keep only values matching a fallible predicate
    pub fn try_filter<E, P>(self, predicate: P) -> Self
    where
        E: Into<ReactiveError>,
        P: Fn(&T) -> Result<bool, E> + Send + Sync + 'static,
    {
        let predicate = Arc::new(predicate);
        Flux::from_stream_fn(move || {
            let predicate = Arc::clone(&predicate);
            self.into_stream().filter_map(move |item| {
                future::ready(match item {
                    Ok(value) => match predicate(&value) {
                        Ok(true) => Some(Ok(value)),
                        Ok(false) => None,
                        Err(error) => Some(Err(error.into())),
                    },
                    Err(error) => Some(Err(error)),
                })
            })
        })
    }

    /// Expand each value into a sub-sequence, draining one sub-sequence
    /// completely before subscribing to the next
    ///
    /// Output order is source order with every sub-sequence inlined.
    pub fn concat_map<U, P, F>(self, f: F) -> Flux<U>
    where
        U: Send + 'static,
        P: Publisher<U>,
        F: Fn(T) -> P + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Flux::from_stream_fn(move || {
            let f = Arc::clone(&f);
            self.into_stream()
                .map(move |item| expand(item, f.as_ref()))
                .flatten()
        })
    }

    /// Expand each value into a sub-sequence, subscribing to all of them
    /// eagerly
    ///
    /// Values of one sub-sequence keep their order; values of different
    /// sub-sequences interleave by arrival time.
    pub fn flat_map<U, P, F>(self, f: F) -> Flux<U>
    where
        U: Send + 'static,
        P: Publisher<U>,
        F: Fn(T) -> P + Send + Sync + 'static,
    {
        self.expand_unordered(None, f)
    }

    /// Like [`flat_map`](Self::flat_map), with at most `concurrency`
    /// sub-sequences in flight
    pub fn flat_map_with_concurrency<U, P, F>(self, concurrency: usize, f: F) -> Flux<U>
    where
        U: Send + 'static,
        P: Publisher<U>,
        F: Fn(T) -> P + Send + Sync + 'static,
    {
        self.expand_unordered(Some(concurrency.max(1)), f)
    }

    fn expand_unordered<U, P, F>(self, limit: Option<usize>, f: F) -> Flux<U>
    where
        U: Send + 'static,
        P: Publisher<U>,
        F: Fn(T) -> P + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Flux::from_stream_fn(move || {
            let f = Arc::clone(&f);
            self.into_stream()
                .map(move |item| expand(item, f.as_ref()))
                .flatten_unordered(limit)
        })
    }

    /// Apply a reusable operator pipeline
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let shout = |names: Flux<String>| names.map(|n| n.to_uppercase()).filter(|n| n.len() > 3);
    ///
    /// let a = first.transform(&shout);
    /// let b = second.transform(&shout);
    /// ```
    pub fn transform<U, F>(self, operator: F) -> Flux<U>
    where
        F: FnOnce(Flux<T>) -> Flux<U>,
    {
        operator(self)
    }

    /// Run `fallback` instead when this flux completes without a value
    ///
    /// The fallback is only subscribed to when needed. A failure is passed
    /// through and never triggers the fallback.
    pub fn switch_if_empty<P>(self, fallback: P) -> Self
    where
        P: Publisher<T>,
    {
        let fallback = fallback.into_flux();
        Flux::from_stream_fn(move || {
            let fallback = fallback.clone();
            switch_on_empty(self.into_stream(), move || fallback.into_stream())
        })
    }

    /// Emit every value of this flux, then every value of `other`
    pub fn concat_with<P>(self, other: P) -> Self
    where
        P: Publisher<T>,
    {
        combinators::concat([self, other.into_flux()])
    }

    /// Subscribe to this flux and `other` at once and interleave their values
    pub fn merge_with<P>(self, other: P) -> Self
    where
        P: Publisher<T>,
    {
        combinators::merge([self, other.into_flux()])
    }

    /// Delay every value by the same `delay`
    pub fn delay_elements(self, delay: Duration) -> Self {
        self.delay_elements_with(FixedDelay::new(delay))
    }

    /// Delay every value by a duration drawn from `provider`
    ///
    /// Failures are forwarded without delay.
    pub fn delay_elements_with<D>(self, provider: D) -> Self
    where
        D: DelayProvider + 'static,
    {
        let provider = Arc::new(provider);
        Flux::from_stream_fn(move || {
            let provider = Arc::clone(&provider);
            self.into_stream().then(move |item| {
                let delay = item.is_ok().then(|| provider.next_delay());
                async move {
                    if let Some(delay) = delay {
                        tokio::time::sleep(delay).await;
                    }
                    item
                }
            })
        })
    }

    /// Emit at most `count` values, then complete and drop the upstream run
    pub fn take(self, count: usize) -> Self {
        Flux::from_stream_fn(move || self.into_stream().take(count))
    }

    /// Gather all values into a single `Vec`
    pub fn collect_list(self) -> Mono<Vec<T>> {
        Mono::from_future_fn(move || {
            let flux = self.clone();
            async move { flux.collect().await.map(Some) }
        })
    }
}

impl<T: Clone + Send + Sync + 'static> Flux<T> {
    /// Emit the given values in order, then complete
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let letters = Flux::from_iterable(["A", "B", "C"]);
    /// ```
    pub fn from_iterable<I>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let values: Arc<[T]> = values.into_iter().collect();
        Self::from_stream_fn(move || stream::iter(values.to_vec().into_iter().map(Ok)))
    }

    /// Emit one value, then complete
    pub fn just(value: T) -> Self {
        Self::from_iterable([value])
    }

    /// Emit `value` when this flux completes without a value
    pub fn default_if_empty(self, value: T) -> Self {
        Flux::from_stream_fn(move || {
            let value = value.clone();
            switch_on_empty(self.into_stream(), move || {
                stream::once(future::ready(Ok(value))).boxed()
            })
        })
    }
}

impl<T: Debug + Send + 'static> Flux<T> {
    /// Log every signal of every run at INFO under `category`
    pub fn log(self, category: impl Into<String>) -> Self {
        let category: Arc<str> = Arc::from(category.into());
        Flux::from_stream_fn(move || {
            info!(category = %category, "onSubscribe()");

            let failed = Arc::new(AtomicBool::new(false));
            let on_signal = Arc::clone(&category);
            let on_complete = Arc::clone(&category);
            let saw_failure = Arc::clone(&failed);
            let signals = self.into_stream().inspect(move |item| match item {
                Ok(value) => info!(category = %on_signal, "onNext({:?})", value),
                Err(err) => {
                    saw_failure.store(true, Ordering::SeqCst);
                    error!(category = %on_signal, "onError({})", err)
                }
            });
            let completion = stream::once(async move {
                if !failed.load(Ordering::SeqCst) {
                    info!(category = %on_complete, "onComplete()");
                }
                None::<ReactiveResult<T>>
            })
            .filter_map(future::ready);

            signals.chain(completion)
        })
    }
}

impl<T: Send + 'static> FromIterator<T> for Flux<T>
where
    T: Clone + Sync,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Flux::from_iterable(iter)
    }
}

impl<T: Send + 'static> Publisher<T> for Flux<T> {
    type Mapped<U: Send + 'static> = Flux<U>;

    fn map<U, F>(self, f: F) -> Self::Mapped<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Flux::map(self, f)
    }

    fn into_flux(self) -> Flux<T> {
        self
    }
}

/// Turn one upstream signal into the sub-sequence that replaces it
fn expand<T, U, P, F>(item: ReactiveResult<T>, f: &F) -> SignalStream<U>
where
    U: Send + 'static,
    P: Publisher<U>,
    F: Fn(T) -> P,
{
    match item {
        Ok(value) => f(value).into_flux().into_stream(),
        Err(err) => stream::once(future::ready(Err(err))).boxed(),
    }
}

enum EmptyState<T, F> {
    Upstream {
        signals: SignalStream<T>,
        seen: bool,
        fallback: F,
    },
    Fallback(SignalStream<T>),
    Done,
}

/// Forward `upstream`; if it completes without a value, continue with the
/// stream produced by `fallback`
pub(crate) fn switch_on_empty<T, F>(upstream: SignalStream<T>, fallback: F) -> SignalStream<T>
where
    T: Send + 'static,
    F: FnOnce() -> SignalStream<T> + Send + 'static,
{
    let initial = EmptyState::Upstream {
        signals: upstream,
        seen: false,
        fallback,
    };

    stream::unfold(initial, |state| async move {
        match state {
            EmptyState::Upstream {
                mut signals,
                seen,
                fallback,
            } => match signals.next().await {
                Some(Ok(value)) => Some((
                    Ok(value),
                    EmptyState::Upstream {
                        signals,
                        seen: true,
                        fallback,
                    },
                )),
                Some(Err(err)) => Some((Err(err), EmptyState::Done)),
                None if seen => None,
                None => {
                    let mut replacement = fallback();
                    replacement
                        .next()
                        .await
                        .map(|first| (first, EmptyState::Fallback(replacement)))
                }
            },
            EmptyState::Fallback(mut signals) => signals
                .next()
                .await
                .map(|item| (item, EmptyState::Fallback(signals))),
            EmptyState::Done => None,
        }
    })
    .boxed()
}
