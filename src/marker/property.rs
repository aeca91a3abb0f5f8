//! Property-backed marker for JSON subjects.
//!
//! This module provides [`PropertyMarker`], which keeps a subject's marking
//! under a single property of a JSON object.

use serde_json::{Map, Value};

use super::SubjectMarker;
use crate::{MarkingState, Result, WorkflowError};

/// Name of the property used by [`PropertyMarker::new`].
pub const DEFAULT_MARKER_PROPERTY: &str = "marker";

/// Stores the marking under one property of a JSON object subject.
///
/// Reading accepts three shapes for the property:
///
/// - absent, `null` or `""`: an empty marking
/// - a string: that single place with one token
/// - an object: place names mapped to positive integer token counts
///
/// Writing always replaces the property with the object form, so writing
/// back the state read from an unmarked subject stores an empty object
/// (`{}` becomes `{"marker": {}}`). Both forms read as an empty marking.
///
/// # Example
///
/// ```
/// use petriflow::{PropertyMarker, SubjectMarker};
/// use serde_json::json;
///
/// let marker = PropertyMarker::with_property("status");
/// let subject = json!({"status": "approved"});
///
/// let state = marker.read_state(&subject)?;
/// assert_eq!(state.tokens("approved"), 1);
/// # Ok::<(), petriflow::WorkflowError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyMarker {
    property: String,
}

impl PropertyMarker {
    /// Creates a marker using the `"marker"` property.
    pub fn new() -> Self {
        Self::with_property(DEFAULT_MARKER_PROPERTY)
    }

    /// Creates a marker using a custom property name.
    pub fn with_property(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
        }
    }

    /// Returns the property this marker reads and writes.
    pub fn property(&self) -> &str {
        &self.property
    }

    fn decode(&self, value: Option<&Value>) -> Result<MarkingState> {
        match value {
            None | Some(Value::Null) => Ok(MarkingState::new()),
            Some(Value::String(place)) if place.is_empty() => Ok(MarkingState::new()),
            Some(Value::String(place)) => Ok(MarkingState::from_places([(place.as_str(), 1)])),
            Some(Value::Object(entries)) => {
                let mut state = MarkingState::new();
                for (place, tokens) in entries {
                    let tokens = tokens
                        .as_u64()
                        .filter(|tokens| *tokens >= 1)
                        .and_then(|tokens| u32::try_from(tokens).ok())
                        .ok_or_else(|| {
                            WorkflowError::Logic(format!(
                                "Place \"{}\" in property \"{}\" must hold a positive token count, got {}.",
                                place, self.property, tokens
                            ))
                        })?;
                    state.mark_place(place.as_str(), tokens);
                }
                Ok(state)
            }
            Some(other) => Err(WorkflowError::Logic(format!(
                "Property \"{}\" should hold a place name or a map of places to token counts, got {}.",
                self.property, other
            ))),
        }
    }

    fn encode(state: &MarkingState) -> Value {
        let entries: Map<String, Value> = state
            .places()
            .map(|(place, tokens)| (place.to_string(), Value::from(tokens)))
            .collect();
        Value::Object(entries)
    }
}

impl Default for PropertyMarker {
    fn default() -> Self {
        Self::new()
    }
}

impl SubjectMarker<Map<String, Value>> for PropertyMarker {
    fn read_state(&self, subject: &Map<String, Value>) -> Result<MarkingState> {
        self.decode(subject.get(&self.property))
    }

    fn write_state(&self, subject: &mut Map<String, Value>, state: &MarkingState) -> Result<()> {
        subject.insert(self.property.clone(), Self::encode(state));
        Ok(())
    }
}

impl SubjectMarker<Value> for PropertyMarker {
    fn read_state(&self, subject: &Value) -> Result<MarkingState> {
        match subject.as_object() {
            Some(object) => SubjectMarker::<Map<String, Value>>::read_state(self, object),
            None => Err(not_an_object(subject)),
        }
    }

    fn write_state(&self, subject: &mut Value, state: &MarkingState) -> Result<()> {
        match subject.as_object_mut() {
            Some(object) => SubjectMarker::<Map<String, Value>>::write_state(self, object, state),
            None => Err(not_an_object(subject)),
        }
    }
}

fn not_an_object(subject: &Value) -> WorkflowError {
    WorkflowError::Logic(format!("Subject {} is not an object.", subject))
}
