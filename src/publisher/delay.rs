// Copyright (c) 2025 - Cowboy AI, Inc.
//! Per-element delay providers
//!
//! Delays exist to make timing-dependent behavior (merge, flat_map)
//! observable. They play no part in correctness: only counts and per-source
//! order are guaranteed whatever the delays are.

use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ReactiveConfig;

/// Source of the delay applied before each emitted value
pub trait DelayProvider: Send + Sync {
    /// Duration to wait before forwarding the next value
    fn next_delay(&self) -> Duration;
}

impl<D: DelayProvider + ?Sized> DelayProvider for Arc<D> {
    fn next_delay(&self) -> Duration {
        (**self).next_delay()
    }
}

/// The same delay for every value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay(Duration);

impl FixedDelay {
    /// Wait `delay` before every value
    pub fn new(delay: Duration) -> Self {
        Self(delay)
    }
}

impl DelayProvider for FixedDelay {
    fn next_delay(&self) -> Duration {
        self.0
    }
}

/// A uniformly random delay in `[min, max]`, drawn per value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomDelay {
    min: Duration,
    max: Duration,
}

impl RandomDelay {
    /// Random delay between `min` and `max` (inclusive, in either order)
    pub fn between(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Random delay between zero and `max`
    pub fn up_to(max: Duration) -> Self {
        Self::between(Duration::ZERO, max)
    }

    /// Random delay bounded by [`ReactiveConfig::max_random_delay`]
    pub fn from_config(config: &ReactiveConfig) -> Self {
        Self::up_to(config.max_random_delay())
    }

    /// Shortest possible delay
    pub fn min(&self) -> Duration {
        self.min
    }

    /// Longest possible delay
    pub fn max(&self) -> Duration {
        self.max
    }
}

impl DelayProvider for RandomDelay {
    fn next_delay(&self) -> Duration {
        rand::rng().random_range(self.min..=self.max)
    }
}

/// Delay computed by a closure
///
/// # Examples
///
/// ```rust,ignore
/// let growing = AtomicU64::new(0);
/// let provider = FnDelay::new(move || {
///     Duration::from_millis(growing.fetch_add(10, Ordering::SeqCst))
/// });
/// ```
pub struct FnDelay<F>(F);

impl<F> FnDelay<F>
where
    F: Fn() -> Duration + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> DelayProvider for FnDelay<F>
where
    F: Fn() -> Duration + Send + Sync,
{
    fn next_delay(&self) -> Duration {
        (self.0)()
    }
}
