// Copyright (c) 2025 - Cowboy AI, Inc.
//! Mono - Sequences of Zero or One Value
//!
//! A `Mono<T>` is the single-value specialization of [`Flux`]. Each
//! subscription runs the assembly once and resolves to `Ok(Some(value))`,
//! `Ok(None)` (empty completion) or `Err(error)`.
//!
//! # Mathematical Model
//!
//! ```text
//! Mono<T> ≅ () → Future<Result<Option<T>, ReactiveError>>
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! let name = Mono::just("khalid".to_string()).map(|n| n.to_uppercase());
//! assert_eq!(name.block().await?, Some("KHALID".to_string()));
//!
//! // One value in, many values out
//! let letters: Flux<String> = name.flat_map_many(split_names);
//! ```

use futures::future::{self, Future, FutureExt};
use futures::stream::{self, StreamExt};
use std::fmt::{self, Debug};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use super::combinators;
use super::flux::Flux;
use super::{Publisher, SignalFuture};
use crate::errors::{ReactiveError, ReactiveResult};
use crate::subscriber::{Subscriber, Subscription};

type Assembly<T> = Arc<dyn Fn() -> SignalFuture<T> + Send + Sync>;

/// Lazy sequence of at most one value
pub struct Mono<T> {
    assembly: Assembly<T>,
}

impl<T> Clone for Mono<T> {
    fn clone(&self) -> Self {
        Self {
            assembly: Arc::clone(&self.assembly),
        }
    }
}

impl<T> Debug for Mono<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mono<{}>", std::any::type_name::<T>())
    }
}

impl<T: Send + 'static> Mono<T> {
    /// Create a mono from a producer factory, called once per subscription
    pub fn from_future_fn<F, Fut>(factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ReactiveResult<Option<T>>> + Send + 'static,
    {
        Self {
            assembly: Arc::new(move || factory().boxed()),
        }
    }

    /// A mono that completes without a value
    pub fn empty() -> Self {
        Self::from_future_fn(|| future::ready(Ok(None)))
    }

    /// A mono that fails, once per subscription
    pub fn error(error: ReactiveError) -> Self {
        Self::from_future_fn(move || future::ready(Err(error.clone())))
    }

    fn run(&self) -> SignalFuture<T> {
        (self.assembly)()
    }

    /// Run once and wait for the outcome
    pub async fn block(&self) -> ReactiveResult<Option<T>> {
        self.run().await
    }

    /// Start a run that delivers signals to `subscriber`
    ///
    /// Must be called from within a tokio runtime.
    pub fn subscribe<S>(&self, subscriber: S) -> Subscription
    where
        S: Subscriber<T> + 'static,
    {
        self.clone().into_flux().subscribe(subscriber)
    }

    /// View this mono as a flux of zero or one value
    pub fn into_flux(self) -> Flux<T> {
        Flux::from_stream_fn(move || {
            stream::once(self.run()).filter_map(|outcome| future::ready(outcome.transpose()))
        })
    }

    /// Transform the value
    pub fn map<U, F>(self, f: F) -> Mono<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Mono::from_future_fn(move || {
            let f = Arc::clone(&f);
            self.run().map(move |outcome| outcome.map(|value| value.map(|v| f(v))))
        })
    }

    /// Transform the value with a fallible function
    pub fn try_map<U, E, F>(self, f: F) -> Mono<U>
    where
        U: Send + 'static,
        E: Into<ReactiveError>,
        F: Fn(T) -> Result<U, E> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Mono::from_future_fn(move || {
            let f = Arc::clone(&f);
            self.run()
                .map(move |outcome| -> ReactiveResult<Option<U>> {
                    match outcome? {
                        Some(value) => f(value).map(Some).map_err(Into::into),
                        None => Ok(None),
                    }
                })
        })
    }

    /// Complete empty unless the value matches `predicate`
    pub fn filter<P>(self, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let predicate = Arc::new(predicate);
        Mono::from_future_fn(move || {
            let predicate = Arc::clone(&predicate);
            self.run()
                .map(move |outcome| outcome.map(|value| value.filter(|v| predicate(v))))
        })
    }

    /// Chain an asynchronous step that itself produces a mono
    pub fn flat_map<U, F>(self, f: F) -> Mono<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Mono<U> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Mono::from_future_fn(move || {
            let f = Arc::clone(&f);
            let upstream = self.run();
            async move {
                match upstream.await? {
                    Some(value) => f(value).run().await,
                    None => Ok(None),
                }
            }
        })
    }

    /// Expand the value into a flux
    pub fn flat_map_many<U, P, F>(self, f: F) -> Flux<U>
    where
        U: Send + 'static,
        P: Publisher<U>,
        F: Fn(T) -> P + Send + Sync + 'static,
    {
        self.into_flux().concat_map(f)
    }

    /// Run `fallback` when this mono completes empty
    pub fn switch_if_empty(self, fallback: Mono<T>) -> Self {
        Mono::from_future_fn(move || {
            let upstream = self.run();
            let fallback = fallback.clone();
            async move {
                match upstream.await? {
                    Some(value) => Ok(Some(value)),
                    None => fallback.run().await,
                }
            }
        })
    }

    /// Delay the value by `delay`; empty completion and failure are immediate
    pub fn delay_element(self, delay: Duration) -> Self {
        Mono::from_future_fn(move || {
            let upstream = self.run();
            async move {
                let outcome = upstream.await;
                if matches!(outcome, Ok(Some(_))) {
                    tokio::time::sleep(delay).await;
                }
                outcome
            }
        })
    }

    /// Emit this value, then every value of `other`
    pub fn concat_with<P>(self, other: P) -> Flux<T>
    where
        P: Publisher<T>,
    {
        combinators::concat([self.into_flux(), other.into_flux()])
    }

    /// Subscribe to this mono and `other` at once
    pub fn merge_with<P>(self, other: P) -> Flux<T>
    where
        P: Publisher<T>,
    {
        combinators::merge([self.into_flux(), other.into_flux()])
    }
}

impl<T: Clone + Send + Sync + 'static> Mono<T> {
    /// Emit one value, then complete
    pub fn just(value: T) -> Self {
        Self::from_future_fn(move || future::ready(Ok(Some(value.clone()))))
    }

    /// Emit `value` when this mono completes empty
    pub fn default_if_empty(self, value: T) -> Self {
        Mono::from_future_fn(move || {
            let value = value.clone();
            self.run()
                .map(move |outcome| outcome.map(|found| found.or(Some(value))))
        })
    }
}

impl<T: Debug + Send + 'static> Mono<T> {
    /// Log the signals of every run at INFO under `category`
    pub fn log(self, category: impl Into<String>) -> Self {
        let category: Arc<str> = Arc::from(category.into());
        Mono::from_future_fn(move || {
            info!(category = %category, "onSubscribe()");
            let category = Arc::clone(&category);
            self.run().inspect(move |outcome| match outcome {
                Ok(Some(value)) => {
                    info!(category = %category, "onNext({:?})", value);
                    info!(category = %category, "onComplete()");
                }
                Ok(None) => info!(category = %category, "onComplete()"),
                Err(err) => error!(category = %category, "onError({})", err),
            })
        })
    }
}

impl<T: Send + 'static> Publisher<T> for Mono<T> {
    type Mapped<U: Send + 'static> = Mono<U>;

    fn map<U, F>(self, f: F) -> Self::Mapped<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Mono::map(self, f)
    }

    fn into_flux(self) -> Flux<T> {
        Mono::into_flux(self)
    }
}
