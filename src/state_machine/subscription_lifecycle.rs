// Copyright (c) 2025 - Cowboy AI, Inc.
//! Subscription Lifecycle State Machine
//!
//! Every run of a sequence walks this machine:
//!
//! ```text
//! Created ──Subscribe──▶ Subscribed ──Next──▶ Emitting ◀─┐
//!                            │                   │  └Next─┘
//!                            ├──Complete/Fail────┤
//!                            └──Cancel───────────┘
//!                                    ▼
//!                     Completed | Failed | Cancelled   (terminal)
//! ```
//!
//! Terminal states accept no input, which is what guarantees a subscriber
//! sees at most one terminal signal and no value after it.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{StateMachine, TransitionError, TransitionResult};

/// Per-subscription state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubscriptionState {
    /// Assembled but not started
    Created,
    /// Production started, nothing emitted yet
    Subscribed,
    /// At least one value delivered
    Emitting,
    /// Completed normally (terminal)
    Completed,
    /// Terminated by a failure (terminal)
    Failed,
    /// Stopped at the consumer's request (terminal)
    Cancelled,
}

impl SubscriptionState {
    /// Whether no further signal may be delivered
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubscriptionState::Completed | SubscriptionState::Failed | SubscriptionState::Cancelled
        )
    }
}

impl fmt::Display for SubscriptionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Signals fed into the lifecycle (FSM input)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalInput {
    /// Subscriber attached, production starts
    Subscribe,
    /// A value is about to be delivered
    Next,
    /// Upstream completed
    Complete,
    /// Upstream failed
    Fail,
    /// Consumer cancelled
    Cancel,
}

impl fmt::Display for SignalInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl StateMachine for SubscriptionState {
    type Input = SignalInput;
    type Output = ();

    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)> {
        use SignalInput::*;
        use SubscriptionState::*;

        match (self, input) {
            (Created, Subscribe) => Ok((Subscribed, ())),

            (Subscribed | Emitting, Next) => Ok((Emitting, ())),
            (Subscribed | Emitting, Complete) => Ok((Completed, ())),
            (Subscribed | Emitting, Fail) => Ok((Failed, ())),
            (Subscribed | Emitting, Cancel) => Ok((Cancelled, ())),

            (state, _) if state.is_terminal() => Err(TransitionError::Terminal(state.to_string())),

            (state, input) => Err(TransitionError::InvalidTransition {
                from: state.to_string(),
                input: input.to_string(),
            }),
        }
    }
}
