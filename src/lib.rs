// Copyright (c) 2025 - Cowboy AI, Inc.
//! Lazy reactive sequences for the Composable Information Machine
//!
//! This crate provides pull-based `Flux` and `Mono` sequences, the operator
//! library that composes them, subscribers with cancellation, and test
//! tooling for asserting what a sequence emits.

pub mod config;
pub mod errors;
pub mod publisher;
pub mod service;
pub mod state_machine;
pub mod subscriber;
pub mod verify;

// Re-export commonly used types
pub use config::ReactiveConfig;
pub use errors::{ReactiveError, ReactiveResult};
pub use publisher::{concat, merge, Flux, Mono, Publisher};
pub use subscriber::{CollectingSubscriber, FnSubscriber, Subscriber, Subscription};

/// Everything needed to build and consume sequences
pub mod prelude {
    pub use crate::config::ReactiveConfig;
    pub use crate::errors::{ReactiveError, ReactiveResult};
    pub use crate::publisher::{
        concat, merge, DelayProvider, FixedDelay, Flux, Mono, Publisher, RandomDelay,
    };
    pub use crate::state_machine::SubscriptionState;
    pub use crate::subscriber::{CollectingSubscriber, FnSubscriber, Subscriber, Subscription};
    pub use crate::verify::StepVerifier;
}
