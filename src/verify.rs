// Copyright (c) 2025 - Cowboy AI, Inc.
//! Step Verifier
//!
//! Scripted assertions over one run of a publisher. A verifier subscribes
//! when one of the `verify_*` methods is awaited, checks every expected
//! value in order, and finally checks the terminal signal.
//!
//! # Example
//!
//! ```rust,ignore
//! use cim_reactive::verify::StepVerifier;
//!
//! StepVerifier::create(service.names_flux())
//!     .expect_next("Alex".to_string())
//!     .expect_next_count(2)
//!     .verify_complete()
//!     .await?;
//! ```

use futures::StreamExt;
use std::fmt::Debug;
use std::time::Duration;
use thiserror::Error;

use crate::config::ReactiveConfig;
use crate::errors::ReactiveError;
use crate::publisher::{Flux, Publisher, SignalStream};

/// Why a verification failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// A value differed from the expected one
    #[error("Value #{index}: expected {expected}, got {actual}")]
    UnexpectedValue {
        index: usize,
        expected: String,
        actual: String,
    },

    /// A value did not satisfy the expectation's predicate
    #[error("Value #{index} ({actual}) does not match: {description}")]
    PredicateFailed {
        index: usize,
        description: String,
        actual: String,
    },

    /// The run completed while more values were expected
    #[error("Completed after {index} values, more were expected")]
    UnexpectedCompletion { index: usize },

    /// The run failed while values or completion were expected
    #[error("Failed after {index} values: {error}")]
    UnexpectedError { index: usize, error: ReactiveError },

    /// A value arrived where a terminal signal was expected
    #[error("Expected a terminal signal after {index} values, got {actual}")]
    UnconsumedValue { index: usize, actual: String },

    /// The run completed where a failure was expected
    #[error("Expected a failure after {index} values, but the sequence completed")]
    ExpectedError { index: usize },

    /// The run did not terminate in time
    #[error("No terminal signal within {0:?}")]
    Timeout(Duration),
}

enum Step<T> {
    Next(T),
    Count(usize),
    Matches {
        description: String,
        predicate: Box<dyn Fn(&T) -> bool + Send + Sync>,
    },
}

enum Terminal {
    Complete,
    Error(ReactiveError),
}

/// Scripted expectations for one run of a publisher
pub struct StepVerifier<T> {
    flux: Flux<T>,
    steps: Vec<Step<T>>,
    timeout: Duration,
}

impl<T> StepVerifier<T>
where
    T: PartialEq + Debug + Send + 'static,
{
    /// Start a script with the default timeout
    pub fn create<P: Publisher<T>>(publisher: P) -> Self {
        Self::with_config(publisher, &ReactiveConfig::default())
    }

    /// Start a script using the configured verify timeout
    pub fn with_config<P: Publisher<T>>(publisher: P, config: &ReactiveConfig) -> Self {
        Self {
            flux: publisher.into_flux(),
            steps: Vec::new(),
            timeout: config.verify_timeout(),
        }
    }

    /// Override the timeout for this script
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Expect the next value to equal `value`
    pub fn expect_next(mut self, value: T) -> Self {
        self.steps.push(Step::Next(value));
        self
    }

    /// Expect the next values to equal `values`, in order
    pub fn expect_next_values<I>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        self.steps.extend(values.into_iter().map(Step::Next));
        self
    }

    /// Expect `count` more values, whatever they are
    pub fn expect_next_count(mut self, count: usize) -> Self {
        self.steps.push(Step::Count(count));
        self
    }

    /// Expect the next value to satisfy `predicate`
    pub fn expect_next_matches<F>(mut self, description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.steps.push(Step::Matches {
            description: description.into(),
            predicate: Box::new(predicate),
        });
        self
    }

    /// Run the script and expect completion; returns the number of values seen
    pub async fn verify_complete(self) -> Result<usize, VerifyError> {
        match self.run().await? {
            (index, Terminal::Complete) => Ok(index),
            (index, Terminal::Error(error)) => Err(VerifyError::UnexpectedError { index, error }),
        }
    }

    /// Run the script and expect a failure; returns that failure
    pub async fn verify_error(self) -> Result<ReactiveError, VerifyError> {
        match self.run().await? {
            (_, Terminal::Error(error)) => Ok(error),
            (index, Terminal::Complete) => Err(VerifyError::ExpectedError { index }),
        }
    }

    async fn run(self) -> Result<(usize, Terminal), VerifyError> {
        let timeout = self.timeout;
        let signals = self.flux.into_stream();

        tokio::time::timeout(timeout, check_steps(signals, self.steps))
            .await
            .map_err(|_| VerifyError::Timeout(timeout))?
    }
}

async fn check_steps<T>(
    mut signals: SignalStream<T>,
    steps: Vec<Step<T>>,
) -> Result<(usize, Terminal), VerifyError>
where
    T: PartialEq + Debug + Send + 'static,
{
    let mut index = 0;

    for step in steps {
        match step {
            Step::Next(expected) => {
                let actual = next_value(&mut signals, index).await?;
                if actual != expected {
                    return Err(VerifyError::UnexpectedValue {
                        index,
                        expected: format!("{expected:?}"),
                        actual: format!("{actual:?}"),
                    });
                }
                index += 1;
            }
            Step::Count(count) => {
                for _ in 0..count {
                    next_value(&mut signals, index).await?;
                    index += 1;
                }
            }
            Step::Matches {
                description,
                predicate,
            } => {
                let actual = next_value(&mut signals, index).await?;
                if !predicate(&actual) {
                    return Err(VerifyError::PredicateFailed {
                        index,
                        description,
                        actual: format!("{actual:?}"),
                    });
                }
                index += 1;
            }
        }
    }

    match signals.next().await {
        None => Ok((index, Terminal::Complete)),
        Some(Err(error)) => Ok((index, Terminal::Error(error))),
        Some(Ok(actual)) => Err(VerifyError::UnconsumedValue {
            index,
            actual: format!("{actual:?}"),
        }),
    }
}

async fn next_value<T>(signals: &mut SignalStream<T>, index: usize) -> Result<T, VerifyError> {
    match signals.next().await {
        Some(Ok(value)) => Ok(value),
        Some(Err(error)) => Err(VerifyError::UnexpectedError { index, error }),
        None => Err(VerifyError::UnexpectedCompletion { index }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publisher::Mono;

    #[tokio::test]
    async fn test_verify_complete_counts_values() {
        let seen = StepVerifier::create(Flux::from_iterable(vec![1, 2, 3]))
            .expect_next(1)
            .expect_next_count(2)
            .verify_complete()
            .await
            .unwrap();

        assert_eq!(seen, 3);
    }

    #[tokio::test]
    async fn test_unexpected_value() {
        let result = StepVerifier::create(Flux::from_iterable(vec![1, 2]))
            .expect_next_values([1, 3])
            .verify_complete()
            .await;

        assert_eq!(
            result,
            Err(VerifyError::UnexpectedValue {
                index: 1,
                expected: "3".to_string(),
                actual: "2".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_leftover_value_is_reported() {
        let result = StepVerifier::create(Flux::from_iterable(vec![1, 2]))
            .expect_next(1)
            .verify_complete()
            .await;

        assert!(matches!(result, Err(VerifyError::UnconsumedValue { index: 1, .. })));
    }

    #[tokio::test]
    async fn test_early_completion_is_reported() {
        let result = StepVerifier::create(Mono::just(1))
            .expect_next_count(2)
            .verify_complete()
            .await;

        assert_eq!(result, Err(VerifyError::UnexpectedCompletion { index: 1 }));
    }

    #[tokio::test]
    async fn test_verify_error() {
        let error = StepVerifier::create(
            Flux::just("a").concat_with(Flux::error(ReactiveError::source("boom"))),
        )
        .expect_next("a")
        .verify_error()
        .await
        .unwrap();

        assert_eq!(error, ReactiveError::source("boom"));
    }

    #[tokio::test]
    async fn test_expect_next_matches() {
        let result = StepVerifier::create(Flux::just(4))
            .expect_next_matches("odd number", |x| x % 2 == 1)
            .verify_complete()
            .await;

        assert!(matches!(result, Err(VerifyError::PredicateFailed { index: 0, .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let never = Flux::<i32>::from_stream_fn(futures::stream::pending);
        let result = StepVerifier::create(never)
            .with_timeout(Duration::from_millis(50))
            .verify_complete()
            .await;

        assert_eq!(result, Err(VerifyError::Timeout(Duration::from_millis(50))));
    }
}
