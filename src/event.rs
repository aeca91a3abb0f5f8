//! Workflow events.
//!
//! This module provides [`WorkflowEvent`] for observing workflow activity.
//! Events are broadcast through a channel that can be subscribed to for
//! monitoring, auditing, or building UIs.

use crate::MarkingState;

/// An event emitted by a [`Workflow`](crate::Workflow).
///
/// Events use `String` for names to keep the event type simple and easy to
/// forward to logs or other processes.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum WorkflowEvent {
    /// An unmarked subject was placed in the initial places.
    StateInitialized {
        /// The workflow name.
        workflow: String,
        /// The seeded marking.
        marking: MarkingState,
    },

    /// A transition fired and the new marking was persisted.
    TransitionApplied {
        /// The workflow name.
        workflow: String,
        /// The transition name.
        transition: String,
        /// The marking after the transition fired.
        marking: MarkingState,
    },

    /// `apply` was refused because no transition with the name was enabled.
    TransitionBlocked {
        /// The workflow name.
        workflow: String,
        /// The transition name.
        transition: String,
    },

    /// Auto-advance stopped.
    ProcessCompleted {
        /// The workflow name.
        workflow: String,
        /// Names of the transitions applied, in order.
        applied: Vec<String>,
    },
}

impl WorkflowEvent {
    /// Returns the workflow name for this event.
    pub fn workflow(&self) -> &str {
        match self {
            Self::StateInitialized { workflow, .. }
            | Self::TransitionApplied { workflow, .. }
            | Self::TransitionBlocked { workflow, .. }
            | Self::ProcessCompleted { workflow, .. } => workflow,
        }
    }

    /// Returns the transition name for this event, if applicable.
    pub fn transition(&self) -> Option<&str> {
        match self {
            Self::TransitionApplied { transition, .. }
            | Self::TransitionBlocked { transition, .. } => Some(transition),
            Self::StateInitialized { .. } | Self::ProcessCompleted { .. } => None,
        }
    }

    /// Returns the marking carried by this event, if any.
    pub fn marking(&self) -> Option<&MarkingState> {
        match self {
            Self::StateInitialized { marking, .. } | Self::TransitionApplied { marking, .. } => {
                Some(marking)
            }
            Self::TransitionBlocked { .. } | Self::ProcessCompleted { .. } => None,
        }
    }

    /// Returns true if this event reports a refused transition.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::TransitionBlocked { .. })
    }
}
