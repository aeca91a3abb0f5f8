//! Error types for petriflow.
//!
//! This module defines the error types used throughout the crate,
//! following the non-exhaustive enum pattern to allow future error variants
//! without breaking compatibility.

use thiserror::Error;

/// The main error type for petriflow operations.
///
/// Variants fall into three groups:
///
/// - configuration problems raised while building a [`Definition`] or a
///   [`Guard`] ([`Setup`](Self::Setup), [`Serialization`](Self::Serialization))
/// - runtime problems with a subject's marking ([`Logic`](Self::Logic),
///   [`InvalidArgument`](Self::InvalidArgument))
/// - decision outcomes of [`Workflow::apply`]
///   ([`TransitionNotExist`](Self::TransitionNotExist),
///   [`TransitionNotEnabled`](Self::TransitionNotEnabled))
///
/// [`Definition`]: crate::Definition
/// [`Guard`]: crate::Guard
/// [`Workflow::apply`]: crate::Workflow::apply
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WorkflowError {
    /// The workflow configuration is invalid.
    #[error("Workflow setup error: {0}")]
    Setup(String),

    /// The subject's state is inconsistent with the workflow.
    #[error("Workflow logic error: {0}")]
    Logic(String),

    /// A low-level marking operation received a disallowed argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No transition with the given name exists in the definition.
    #[error("Transition with name \"{0}\" not exist.")]
    TransitionNotExist(String),

    /// Transitions with the given name exist, but none is enabled.
    #[error("Transition with name \"{0}\" can't be applied.")]
    TransitionNotEnabled(String),

    /// Serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error while reading a definition document.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkflowError {
    /// Returns true for errors raised while building configuration.
    pub fn is_setup(&self) -> bool {
        matches!(self, Self::Setup(_) | Self::Serialization(_) | Self::Io(_))
    }

    /// Returns true for the two transition errors raised by `apply`.
    pub fn is_transition_error(&self) -> bool {
        matches!(
            self,
            Self::TransitionNotExist(_) | Self::TransitionNotEnabled(_)
        )
    }
}

/// A specialized `Result` type for petriflow operations.
pub type Result<T> = std::result::Result<T, WorkflowError>;
