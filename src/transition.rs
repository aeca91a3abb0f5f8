//! Transitions between places.

use crate::{Guard, Result};

/// A named edge consuming one token from each input place and producing one
/// token in each output place.
///
/// Names need not be unique within a [`Definition`](crate::Definition):
/// transitions sharing a name are independent alternatives under one label.
///
/// # Example
///
/// ```
/// use petriflow::Transition;
///
/// let join = Transition::new("merge", ["review", "tests"], ["ready"])
///     .with_query_guard("approvals >= 2")?;
///
/// assert_eq!(join.name(), "merge");
/// assert!(join.consumes("review"));
/// assert_eq!(join.guards().len(), 1);
/// # Ok::<(), petriflow::WorkflowError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Transition {
    name: String,
    froms: Vec<String>,
    tos: Vec<String>,
    guards: Vec<Guard>,
}

impl Transition {
    /// Creates an unguarded transition.
    pub fn new<F, T>(name: impl Into<String>, froms: F, tos: T) -> Self
    where
        F: IntoIterator,
        F::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        Self {
            name: name.into(),
            froms: unique_places(froms),
            tos: unique_places(tos),
            guards: Vec::new(),
        }
    }

    /// Attaches a guard. All guards must pass for the transition to fire.
    pub fn with_guard(mut self, guard: Guard) -> Self {
        self.guards.push(guard);
        self
    }

    /// Attaches a guard parsed from a query such as `amount > 100`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Setup`](crate::WorkflowError::Setup) if the
    /// query cannot be parsed.
    pub fn with_query_guard(self, query: &str) -> Result<Self> {
        Ok(self.with_guard(Guard::from_query(query)?))
    }

    /// Returns the transition name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the input places, without duplicates, in the order given.
    pub fn froms(&self) -> &[String] {
        &self.froms
    }

    /// Returns the output places, without duplicates, in the order given.
    pub fn tos(&self) -> &[String] {
        &self.tos
    }

    /// Returns true if `place` is an input place.
    pub fn consumes(&self, place: &str) -> bool {
        self.froms.iter().any(|p| p == place)
    }

    /// Returns true if `place` is an output place.
    pub fn produces(&self, place: &str) -> bool {
        self.tos.iter().any(|p| p == place)
    }

    /// Returns the attached guards.
    pub fn guards(&self) -> &[Guard] {
        &self.guards
    }
}

fn unique_places<P>(places: P) -> Vec<String>
where
    P: IntoIterator,
    P::Item: Into<String>,
{
    let mut unique: Vec<String> = Vec::new();
    for place in places {
        let place = place.into();
        if !unique.contains(&place) {
            unique.push(place);
        }
    }
    unique
}
