// Copyright (c) 2025 - Cowboy AI, Inc.
//! Subscription handle and the driver that runs one subscription
//!
//! The driver owns everything scoped to the run: the signal stream (and
//! through it every timer and inner subscription), the subscriber and the
//! lifecycle state machine. All of it is dropped when the run reaches a
//! terminal state.

use chrono::Utc;
use futures::{FutureExt, StreamExt};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use super::Subscriber;
use crate::errors::{ReactiveError, ReactiveResult};
use crate::publisher::Flux;
use crate::state_machine::{SignalInput, StateMachineWithHistory, SubscriptionState};

#[derive(Default)]
struct CancelSignal {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelSignal {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Handle to one running subscription
///
/// Dropping the handle detaches from the run without cancelling it.
pub struct Subscription {
    id: Uuid,
    cancel: Arc<CancelSignal>,
    handle: JoinHandle<SubscriptionState>,
}

impl Subscription {
    /// Spawn the driver for a new run of `flux`
    pub(crate) fn spawn<T, S>(flux: Flux<T>, subscriber: S) -> Self
    where
        T: Send + 'static,
        S: Subscriber<T> + 'static,
    {
        let id = Uuid::now_v7();
        let cancel = Arc::new(CancelSignal::default());
        let handle = tokio::spawn(drive(id, flux, subscriber, Arc::clone(&cancel)));

        Self { id, cancel, handle }
    }

    /// Unique id of this run, also used in log fields
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Ask the run to stop
    ///
    /// Once the driver observes the request no further value is delivered,
    /// no terminal signal is sent, and the run's stream is dropped.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Whether the run reached a terminal state
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the run to end and return its terminal state
    pub async fn join(self) -> ReactiveResult<SubscriptionState> {
        Ok(self.handle.await?)
    }
}

async fn drive<T, S>(
    id: Uuid,
    flux: Flux<T>,
    mut subscriber: S,
    cancel: Arc<CancelSignal>,
) -> SubscriptionState
where
    T: Send + 'static,
    S: Subscriber<T>,
{
    let mut lifecycle = StateMachineWithHistory::new(SubscriptionState::Created);
    advance(&mut lifecycle, id, SignalInput::Subscribe);
    info!(subscription_id = %id, publisher = ?flux, "Subscription started");

    let mut signals = flux.into_stream();

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.wait() => None,
            polled = AssertUnwindSafe(signals.next()).catch_unwind() => {
                Some(polled.unwrap_or_else(|panic| Some(Err(panic_to_error(panic)))))
            }
        };

        match next {
            None => {
                advance(&mut lifecycle, id, SignalInput::Cancel);
                debug!(subscription_id = %id, "Subscription cancelled");
                break;
            }
            Some(Some(Ok(value))) => {
                if cancel.is_cancelled() {
                    continue;
                }
                if advance(&mut lifecycle, id, SignalInput::Next) {
                    trace!(subscription_id = %id, "onNext");
                    subscriber.on_next(value).await;
                }
            }
            Some(Some(Err(error))) => {
                if advance(&mut lifecycle, id, SignalInput::Fail) {
                    debug!(subscription_id = %id, error = %error, "onError");
                    subscriber.on_error(error).await;
                }
                break;
            }
            Some(None) => {
                if advance(&mut lifecycle, id, SignalInput::Complete) {
                    debug!(subscription_id = %id, "onComplete");
                    subscriber.on_complete().await;
                }
                break;
            }
        }
    }

    drop(signals);

    let state = *lifecycle.current_state();
    debug!(
        subscription_id = %id,
        state = %state,
        transitions = lifecycle.get_history().len(),
        "Subscription ended"
    );
    state
}

/// Turn a panic raised while producing a signal into the run's failure
fn panic_to_error(panic: Box<dyn Any + Send>) -> ReactiveError {
    let message = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    ReactiveError::operator(format!("panicked: {message}"))
}

/// Feed `input` to the lifecycle; false means the signal must be dropped
fn advance(
    lifecycle: &mut StateMachineWithHistory<SubscriptionState>,
    id: Uuid,
    input: SignalInput,
) -> bool {
    match lifecycle.transition_with_history(input, Utc::now()) {
        Ok(()) => true,
        Err(e) => {
            warn!(subscription_id = %id, input = %input, error = %e, "Dropping signal");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscriber::CollectingSubscriber;
    use std::time::Duration;

    #[tokio::test]
    async fn test_subscription_completes() {
        let observer = CollectingSubscriber::new();
        let subscription = Flux::from_iterable(vec![1, 2, 3]).subscribe(observer.clone());

        let state = subscription.join().await.unwrap();

        assert_eq!(state, SubscriptionState::Completed);
        let collected = observer.snapshot().await;
        assert_eq!(collected.values, vec![1, 2, 3]);
        assert_eq!(collected.completions, 1);
        assert!(collected.errors.is_empty());
    }

    #[tokio::test]
    async fn test_subscription_fails_once() {
        let observer = CollectingSubscriber::new();
        let flux =
            Flux::from_iterable(vec![1]).concat_with(Flux::error(ReactiveError::source("x")));

        let state = flux.subscribe(observer.clone()).join().await.unwrap();

        assert_eq!(state, SubscriptionState::Failed);
        let collected = observer.snapshot().await;
        assert_eq!(collected.values, vec![1]);
        assert_eq!(collected.terminal_count(), 1);
        assert_eq!(collected.completions, 0);
    }

    #[tokio::test]
    async fn test_panicking_operator_fails_the_run() {
        let observer = CollectingSubscriber::new();
        let flux = Flux::from_iterable(vec![1, 2, 3]).map(|x| {
            if x == 2 {
                panic!("bad value {x}");
            }
            x
        });

        let state = flux.subscribe(observer.clone()).join().await.unwrap();

        assert_eq!(state, SubscriptionState::Failed);
        let collected = observer.snapshot().await;
        assert_eq!(collected.values, vec![1]);
        assert_eq!(collected.completions, 0);
        assert_eq!(
            collected.errors,
            vec![ReactiveError::operator("panicked: bad value 2")]
        );
    }

    #[tokio::test]
    async fn test_empty_subscription_completes_from_subscribed() {
        let observer = CollectingSubscriber::<i32>::new();
        let state = Flux::empty().subscribe(observer.clone()).join().await.unwrap();

        assert_eq!(state, SubscriptionState::Completed);
        assert_eq!(observer.snapshot().await.completions, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_delivery() {
        let observer = CollectingSubscriber::new();
        let flux = Flux::from_iterable(vec![1, 2, 3, 4]).delay_elements(Duration::from_millis(100));

        let subscription = flux.subscribe(observer.clone());
        tokio::time::sleep(Duration::from_millis(150)).await;
        subscription.cancel();
        assert!(subscription.is_cancelled());

        let state = subscription.join().await.unwrap();

        assert_eq!(state, SubscriptionState::Cancelled);
        let collected = observer.snapshot().await;
        assert_eq!(collected.values, vec![1]);
        assert_eq!(collected.terminal_count(), 0);
    }

    #[tokio::test]
    async fn test_subscription_ids_are_unique() {
        let flux = Flux::just(1);
        let a = flux.subscribe(CollectingSubscriber::new());
        let b = flux.subscribe(CollectingSubscriber::new());

        assert_ne!(a.id(), b.id());
        a.join().await.unwrap();
        b.join().await.unwrap();
    }
}
