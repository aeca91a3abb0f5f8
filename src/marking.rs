//! Token bookkeeping for a subject.
//!
//! A [`MarkingState`] maps each marked place to its positive token count.
//! Places whose count drops to zero are removed, so presence in the map is
//! the same thing as being marked.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{Result, WorkflowError};

/// The token multiset of a subject: place name to positive token count.
///
/// # Example
///
/// ```
/// use petriflow::MarkingState;
///
/// let mut state = MarkingState::new();
/// state.mark_place("draft", 1);
/// state.mark_place("draft", 1);
/// assert_eq!(state.tokens("draft"), 2);
///
/// state.unmark_place("draft", 2)?;
/// assert!(!state.is_marked("draft"));
/// # Ok::<(), petriflow::WorkflowError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "HashMap<String, u32>",
    into = "HashMap<String, u32>"
)]
pub struct MarkingState {
    places: HashMap<String, u32>,
}

impl MarkingState {
    /// Creates an empty marking.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a marking from `(place, tokens)` pairs.
    ///
    /// Pairs naming the same place are summed; zero counts are ignored.
    pub fn from_places<I, P>(places: I) -> Self
    where
        I: IntoIterator<Item = (P, u32)>,
        P: Into<String>,
    {
        let mut state = Self::new();
        for (place, tokens) in places {
            state.mark_place(place, tokens);
        }
        state
    }

    /// Adds `tokens` tokens to `place`, initializing it if absent.
    ///
    /// Marking zero tokens leaves the state untouched.
    pub fn mark_place(&mut self, place: impl Into<String>, tokens: u32) {
        if tokens == 0 {
            return;
        }
        let count = self.places.entry(place.into()).or_insert(0);
        *count = count.saturating_add(tokens);
    }

    /// Removes `tokens` tokens from `place`.
    ///
    /// A place whose count reaches zero is removed from the marking.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::InvalidArgument`] if `tokens` is zero, if
    /// the place is not marked, or if the place holds fewer than `tokens`
    /// tokens. The state is left unchanged on error.
    pub fn unmark_place(&mut self, place: &str, tokens: u32) -> Result<()> {
        if tokens < 1 {
            return Err(WorkflowError::InvalidArgument(format!(
                "The number of tokens must be greater than 0, \"{}\" given.",
                tokens
            )));
        }

        let current = match self.places.get(place) {
            Some(current) => *current,
            None => {
                return Err(WorkflowError::InvalidArgument(format!(
                    "The place \"{}\" is not marked.",
                    place
                )))
            }
        };

        let next = match current.checked_sub(tokens) {
            Some(next) => next,
            None => {
                return Err(WorkflowError::InvalidArgument(format!(
                    "The place \"{}\" could not contain a negative token number: \"{}\" (initial) - \"{}\" (tokens) = \"{}\".",
                    place,
                    current,
                    tokens,
                    i64::from(current) - i64::from(tokens)
                )))
            }
        };

        if next == 0 {
            self.places.remove(place);
        } else {
            self.places.insert(place.to_string(), next);
        }
        Ok(())
    }

    /// Returns the token count of `place`, zero when unmarked.
    pub fn tokens(&self, place: &str) -> u32 {
        self.places.get(place).copied().unwrap_or(0)
    }

    /// Returns true if `place` holds at least one token.
    pub fn is_marked(&self, place: &str) -> bool {
        self.places.contains_key(place)
    }

    /// Iterates over marked places and their token counts.
    pub fn places(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.places
            .iter()
            .map(|(place, tokens)| (place.as_str(), *tokens))
    }

    /// Returns the number of marked places.
    pub fn len(&self) -> usize {
        self.places.len()
    }

    /// Returns true if no place is marked.
    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Returns the underlying place map.
    pub fn as_map(&self) -> &HashMap<String, u32> {
        &self.places
    }
}

impl TryFrom<HashMap<String, u32>> for MarkingState {
    type Error = WorkflowError;

    fn try_from(places: HashMap<String, u32>) -> Result<Self> {
        if let Some((place, _)) = places.iter().find(|(_, tokens)| **tokens == 0) {
            return Err(WorkflowError::InvalidArgument(format!(
                "The place \"{}\" cannot hold zero tokens.",
                place
            )));
        }
        Ok(Self { places })
    }
}

impl From<MarkingState> for HashMap<String, u32> {
    fn from(state: MarkingState) -> Self {
        state.places
    }
}

impl<P: Into<String>> FromIterator<(P, u32)> for MarkingState {
    fn from_iter<I: IntoIterator<Item = (P, u32)>>(iter: I) -> Self {
        Self::from_places(iter)
    }
}
