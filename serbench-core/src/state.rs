// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Pipeline state machine with typed state transitions.
//!
//! Implements the per-codec lifecycle:
//! Init → PendingSerialize → RunningSerialize → DoneSerialize →
//! PendingDeserialize → RunningDeserialize → Done, with Failed reachable
//! from every non-terminal state. Invalid transitions result in StateTransitionError.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::StateTransitionError;
use crate::types::{FormatId, Phase};

/// Codec pipeline lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineState {
    /// Adapter constructed, not yet scheduled.
    Init,
    PendingSerialize,
    RunningSerialize,
    DoneSerialize,
    PendingDeserialize,
    RunningDeserialize,
    /// Both phases completed.
    Done,
    /// A job failed; no further jobs will ever run for this format.
    Failed,
}

impl PipelineState {
    /// Get the state name for error messages.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Init => "Init",
            Self::PendingSerialize => "PendingSerialize",
            Self::RunningSerialize => "RunningSerialize",
            Self::DoneSerialize => "DoneSerialize",
            Self::PendingDeserialize => "PendingDeserialize",
            Self::RunningDeserialize => "RunningDeserialize",
            Self::Done => "Done",
            Self::Failed => "Failed",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// The phase a job in this state belongs to, if a job is queued or running.
    pub const fn active_phase(&self) -> Option<Phase> {
        match self {
            Self::PendingSerialize | Self::RunningSerialize => Some(Phase::Serialize),
            Self::PendingDeserialize | Self::RunningDeserialize => Some(Phase::Deserialize),
            _ => None,
        }
    }

    /// Check if transition to the target state is valid.
    pub fn can_transition_to(&self, target: PipelineState) -> bool {
        if target == Self::Failed {
            return !self.is_terminal();
        }
        matches!(
            (self, target),
            (Self::Init, Self::PendingSerialize)
                | (Self::PendingSerialize, Self::RunningSerialize)
                | (Self::RunningSerialize, Self::DoneSerialize)
                | (Self::DoneSerialize, Self::PendingDeserialize)
                | (Self::PendingDeserialize, Self::RunningDeserialize)
                | (Self::RunningDeserialize, Self::Done)
        )
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// State machine for one codec pipeline.
/// Enforces valid state transitions and tracks timing.
#[derive(Debug)]
pub struct PipelineStateMachine {
    format: FormatId,
    current_state: PipelineState,
    last_transition: Instant,
    transition_count: u64,
}

impl PipelineStateMachine {
    pub fn new(format: FormatId) -> Self {
        Self {
            format,
            current_state: PipelineState::Init,
            last_transition: Instant::now(),
            transition_count: 0,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.current_state
    }

    pub fn format(&self) -> &FormatId {
        &self.format
    }

    /// Get time since last transition.
    pub fn time_in_current_state(&self) -> std::time::Duration {
        self.last_transition.elapsed()
    }

    pub fn transition_count(&self) -> u64 {
        self.transition_count
    }

    /// Attempt to transition to a new state.
    /// Returns Ok(()) if successful, or StateTransitionError if invalid.
    pub fn transition_to(&mut self, target: PipelineState) -> Result<(), StateTransitionError> {
        if self.current_state.is_terminal() {
            return Err(StateTransitionError::TerminalState {
                format: self.format.clone(),
                state: self.current_state.name(),
            });
        }

        if !self.current_state.can_transition_to(target) {
            return Err(StateTransitionError::InvalidTransition {
                format: self.format.clone(),
                from: self.current_state.name(),
                to: target.name(),
            });
        }

        tracing::debug!(
            format = %self.format,
            from = self.current_state.name(),
            to = target.name(),
            "State transition"
        );

        self.current_state = target;
        self.last_transition = Instant::now();
        self.transition_count += 1;

        Ok(())
    }
}

/// Point-in-time view of a pipeline, for progress output.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineSnapshot {
    pub format: String,
    pub current_state: String,
    pub time_in_state_ms: u64,
    pub transition_count: u64,
}

impl From<&PipelineStateMachine> for PipelineSnapshot {
    fn from(sm: &PipelineStateMachine) -> Self {
        Self {
            format: sm.format.to_string(),
            current_state: sm.current_state.name().to_string(),
            time_in_state_ms: sm.time_in_current_state().as_millis() as u64,
            transition_count: sm.transition_count,
        }
    }
}
