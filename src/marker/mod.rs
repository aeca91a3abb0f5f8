//! Marking storage for workflow subjects.
//!
//! This module provides the [`SubjectMarker`] trait for loading and storing
//! a subject's [`MarkingState`], along with the reference implementation:
//!
//! - [`PropertyMarker`]: keeps the marking under one property of a JSON
//!   object subject
//!
//! # Example
//!
//! ```
//! use petriflow::{MarkingState, PropertyMarker, SubjectMarker};
//! use serde_json::json;
//!
//! let marker = PropertyMarker::new();
//! let mut subject = json!({"title": "Quarterly report"});
//!
//! marker.write_state(&mut subject, &MarkingState::from_places([("draft", 1)]))?;
//! assert_eq!(subject["marker"], json!({"draft": 1}));
//!
//! let state = marker.read_state(&subject)?;
//! assert_eq!(state.tokens("draft"), 1);
//! # Ok::<(), petriflow::WorkflowError>(())
//! ```

mod property;

pub use property::{PropertyMarker, DEFAULT_MARKER_PROPERTY};

use crate::{MarkingState, Result};

/// A trait for loading and storing the marking of a subject.
///
/// The marker owns the mapping between a subject's storage representation
/// and the token map; the [`Workflow`](crate::Workflow) only ever sees
/// [`MarkingState`] values. Any type offering these two operations can back
/// a workflow, so the engine stays independent of concrete subject shapes.
///
/// # Object Safety
///
/// This trait is object-safe for a fixed subject type, allowing
/// `Box<dyn SubjectMarker<S>>` when the storage strategy is chosen at
/// runtime.
///
/// # Examples
///
/// ```
/// use petriflow::{MarkingState, SubjectMarker};
///
/// struct Ticket {
///     marking: MarkingState,
/// }
///
/// struct FieldMarker;
///
/// impl SubjectMarker<Ticket> for FieldMarker {
///     fn read_state(&self, subject: &Ticket) -> petriflow::Result<MarkingState> {
///         Ok(subject.marking.clone())
///     }
///
///     fn write_state(&self, subject: &mut Ticket, state: &MarkingState) -> petriflow::Result<()> {
///         subject.marking = state.clone();
///         Ok(())
///     }
/// }
/// ```
pub trait SubjectMarker<S: ?Sized>: Send + Sync {
    /// Reads the current marking of `subject`.
    ///
    /// Returns an empty marking if the subject has never been marked.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored representation cannot be interpreted.
    fn read_state(&self, subject: &S) -> Result<MarkingState>;

    /// Replaces the stored marking of `subject` with `state`.
    ///
    /// # Errors
    ///
    /// Returns an error if the subject cannot hold a marking.
    fn write_state(&self, subject: &mut S, state: &MarkingState) -> Result<()>;
}

impl<S: ?Sized, M: SubjectMarker<S> + ?Sized> SubjectMarker<S> for Box<M> {
    fn read_state(&self, subject: &S) -> Result<MarkingState> {
        (**self).read_state(subject)
    }

    fn write_state(&self, subject: &mut S, state: &MarkingState) -> Result<()> {
        (**self).write_state(subject, state)
    }
}
