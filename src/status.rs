//! Marking status reporting.
//!
//! This module provides [`WorkflowStatus`] for inspecting where a subject
//! currently is in a workflow.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::MarkingState;

/// Token count of one marked place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceStatusEntry {
    /// The place name.
    pub place: String,
    /// Tokens currently held.
    pub tokens: u32,
}

/// A snapshot of a subject's position in a workflow.
///
/// Produced by [`Workflow::status`](crate::Workflow::status).
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowStatus {
    /// The workflow name.
    pub workflow: String,
    /// Marked places, sorted by name.
    pub places: Vec<PlaceStatusEntry>,
    /// Names of enabled transitions in declaration order, without repeats.
    pub enabled: Vec<String>,
    /// When the snapshot was taken.
    pub observed_at: DateTime<Utc>,
}

impl WorkflowStatus {
    /// Creates a snapshot from a marking and the enabled transition names.
    pub fn new<'a>(
        workflow: impl Into<String>,
        marking: &MarkingState,
        enabled: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let mut places: Vec<PlaceStatusEntry> = marking
            .places()
            .map(|(place, tokens)| PlaceStatusEntry {
                place: place.to_string(),
                tokens,
            })
            .collect();
        places.sort_by(|a, b| a.place.cmp(&b.place));

        let mut names: Vec<String> = Vec::new();
        for name in enabled {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }

        Self {
            workflow: workflow.into(),
            places,
            enabled: names,
            observed_at: Utc::now(),
        }
    }

    /// Returns true if no transition can fire.
    pub fn is_terminal(&self) -> bool {
        self.enabled.is_empty()
    }

    /// Returns the tokens held by `place`.
    pub fn tokens(&self, place: &str) -> u32 {
        self.places
            .iter()
            .find(|entry| entry.place == place)
            .map(|entry| entry.tokens)
            .unwrap_or(0)
    }

    /// Returns the total number of tokens across all places.
    pub fn total_tokens(&self) -> u64 {
        self.places.iter().map(|entry| u64::from(entry.tokens)).sum()
    }

    /// Returns true if more than one place is marked.
    pub fn is_parallel(&self) -> bool {
        self.places.len() > 1
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Workflow \"{}\" at {}:",
            self.workflow,
            self.observed_at.format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(f)?;

        for entry in &self.places {
            writeln!(f, "  ● {:<20} {}", entry.place, entry.tokens)?;
        }

        writeln!(f)?;
        if self.is_terminal() {
            writeln!(f, "Enabled: none (terminal)")?;
        } else {
            writeln!(f, "Enabled: {}", self.enabled.join(", "))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_places_sorted() {
        let marking = MarkingState::from_places([("c", 1), ("a", 2), ("b", 1)]);
        let status = WorkflowStatus::new("w", &marking, ["t1"]);

        let places: Vec<&str> = status.places.iter().map(|e| e.place.as_str()).collect();
        assert_eq!(places, vec!["a", "b", "c"]);
        assert_eq!(status.tokens("a"), 2);
        assert_eq!(status.tokens("z"), 0);
        assert_eq!(status.total_tokens(), 4);
        assert!(status.is_parallel());
    }

    #[test]
    fn test_enabled_names_deduplicated() {
        let marking = MarkingState::from_places([("b", 1), ("c", 1)]);
        let status = WorkflowStatus::new("w", &marking, ["b_to_c", "to_a", "to_a"]);
        assert_eq!(status.enabled, vec!["b_to_c", "to_a"]);
        assert!(!status.is_terminal());
    }

    #[test]
    fn test_terminal() {
        let marking = MarkingState::from_places([("done", 1)]);
        let status = WorkflowStatus::new("w", &marking, Vec::<&str>::new());
        assert!(status.is_terminal());
        assert!(!status.is_parallel());
    }

    #[test]
    fn test_display() {
        let marking = MarkingState::from_places([("review", 1)]);
        let status = WorkflowStatus::new("articles", &marking, ["publish", "reject"]);
        let output = status.to_string();

        assert!(output.contains("Workflow \"articles\""));
        assert!(output.contains("review"));
        assert!(output.contains("Enabled: publish, reject"));

        let done = WorkflowStatus::new("articles", &MarkingState::new(), Vec::<&str>::new());
        assert!(done.to_string().contains("Enabled: none (terminal)"));
    }
}
