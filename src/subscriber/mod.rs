// Copyright (c) 2025 - Cowboy AI, Inc.
//! Subscribers for reactive sequences
//!
//! A subscriber receives the signals of one run:
//! - zero or more `on_next` calls, in emission order
//! - then exactly one of `on_complete` or `on_error`
//!
//! Subscribing returns a [`Subscription`] handle used to cancel the run or
//! wait for its terminal state.

pub mod subscription;

pub use subscription::Subscription;

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::error;

use crate::errors::ReactiveError;

/// Consumer side of a run
#[async_trait::async_trait]
pub trait Subscriber<T: Send + 'static>: Send {
    /// Handle an emitted value
    async fn on_next(&mut self, value: T);

    /// Handle normal completion
    async fn on_complete(&mut self) {}

    /// Handle the failure that ended the run
    async fn on_error(&mut self, error: ReactiveError) {
        error!(error = %error, "Unhandled sequence failure");
    }
}

/// Closure-based subscriber
pub struct FnSubscriber<T> {
    on_next: Box<dyn FnMut(T) + Send>,
    on_complete: Option<Box<dyn FnOnce() + Send>>,
    on_error: Option<Box<dyn FnOnce(ReactiveError) + Send>>,
}

impl<T> FnSubscriber<T> {
    pub fn new<F>(on_next: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        Self {
            on_next: Box::new(on_next),
            on_complete: None,
            on_error: None,
        }
    }

    /// Set the completion callback
    pub fn with_complete<F>(mut self, on_complete: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_complete = Some(Box::new(on_complete));
        self
    }

    /// Set the failure callback
    pub fn with_error<F>(mut self, on_error: F) -> Self
    where
        F: FnOnce(ReactiveError) + Send + 'static,
    {
        self.on_error = Some(Box::new(on_error));
        self
    }
}

#[async_trait::async_trait]
impl<T: Send + 'static> Subscriber<T> for FnSubscriber<T> {
    async fn on_next(&mut self, value: T) {
        (self.on_next)(value)
    }

    async fn on_complete(&mut self) {
        if let Some(on_complete) = self.on_complete.take() {
            on_complete();
        }
    }

    async fn on_error(&mut self, error: ReactiveError) {
        match self.on_error.take() {
            Some(on_error) => on_error(error),
            None => error!(error = %error, "Unhandled sequence failure"),
        }
    }
}

/// Everything a [`CollectingSubscriber`] observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collected<T> {
    /// Values in delivery order
    pub values: Vec<T>,
    /// Number of `on_complete` calls
    pub completions: usize,
    /// Failures delivered through `on_error`
    pub errors: Vec<ReactiveError>,
}

impl<T> Default for Collected<T> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            completions: 0,
            errors: Vec::new(),
        }
    }
}

impl<T> Collected<T> {
    /// Number of terminal signals received
    pub fn terminal_count(&self) -> usize {
        self.completions + self.errors.len()
    }
}

/// Subscriber that records every signal
///
/// Clones share the same record, so keep one clone to inspect what the
/// subscribed clone received.
pub struct CollectingSubscriber<T> {
    collected: Arc<Mutex<Collected<T>>>,
}

impl<T> Clone for CollectingSubscriber<T> {
    fn clone(&self) -> Self {
        Self {
            collected: Arc::clone(&self.collected),
        }
    }
}

impl<T> Default for CollectingSubscriber<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CollectingSubscriber<T> {
    pub fn new() -> Self {
        Self {
            collected: Arc::new(Mutex::new(Collected::default())),
        }
    }
}

impl<T: Clone> CollectingSubscriber<T> {
    /// Copy of everything recorded so far
    pub async fn snapshot(&self) -> Collected<T> {
        self.collected.lock().await.clone()
    }

    /// Values recorded so far
    pub async fn values(&self) -> Vec<T> {
        self.collected.lock().await.values.clone()
    }
}

#[async_trait::async_trait]
impl<T: Send + 'static> Subscriber<T> for CollectingSubscriber<T> {
    async fn on_next(&mut self, value: T) {
        self.collected.lock().await.values.push(value);
    }

    async fn on_complete(&mut self) {
        self.collected.lock().await.completions += 1;
    }

    async fn on_error(&mut self, error: ReactiveError) {
        self.collected.lock().await.errors.push(error);
    }
}
