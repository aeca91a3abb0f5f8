//! The static structure of a workflow net.
//!
//! This module provides [`Definition`] and [`DefinitionBuilder`] for
//! declaring the places, transitions and initial marking of a workflow.

use std::collections::HashSet;

use crate::{Result, Transition, WorkflowError};

/// The static net: places, ordered transitions and initial places.
///
/// Places referenced by transitions are added to the place set
/// automatically. Unless initial places are given explicitly, the first
/// place ever added (declared places first, then transition inputs and
/// outputs in order) becomes the sole initial place.
///
/// Transition order is preserved; it decides the order in which
/// same-named transitions fire in [`Workflow::apply`](crate::Workflow::apply).
///
/// # Construction
///
/// ```
/// use petriflow::{Definition, Transition};
///
/// let definition = Definition::builder()
///     .places(["draft", "review", "published"])
///     .transition(Transition::new("submit", ["draft"], ["review"]))
///     .transition(Transition::new("publish", ["review"], ["published"]))
///     .build()?;
///
/// assert!(definition.initial_places().contains("draft"));
/// assert_eq!(definition.transitions().len(), 2);
/// # Ok::<(), petriflow::WorkflowError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Definition {
    places: HashSet<String>,
    transitions: Vec<Transition>,
    initial_places: HashSet<String>,
}

impl Definition {
    /// Creates a new definition builder.
    pub fn builder() -> DefinitionBuilder {
        DefinitionBuilder::new()
    }

    /// Creates a definition whose initial place is inferred.
    pub fn new<P>(places: P, transitions: impl IntoIterator<Item = Transition>) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
    {
        let mut definition = Self::default();
        for place in places {
            definition.add_place(place.into());
        }
        for transition in transitions {
            definition.add_transition(transition);
        }
        definition
    }

    /// Creates a definition with explicit initial places.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Setup`] if an initial place is not part of
    /// the definition's places.
    pub fn with_initial_places<P, I>(
        places: P,
        transitions: impl IntoIterator<Item = Transition>,
        initial_places: I,
    ) -> Result<Self>
    where
        P: IntoIterator,
        P::Item: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut definition = Self::new(places, transitions);
        definition.set_initial_places(initial_places.into_iter().map(Into::into).collect())?;
        Ok(definition)
    }

    /// Returns all places of the net.
    pub fn places(&self) -> &HashSet<String> {
        &self.places
    }

    /// Returns the transitions in declaration order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Returns the places marked when a subject enters the workflow.
    pub fn initial_places(&self) -> &HashSet<String> {
        &self.initial_places
    }

    /// Returns true if `place` belongs to the net.
    pub fn has_place(&self, place: &str) -> bool {
        self.places.contains(place)
    }

    /// Returns true if at least one transition is named `name`.
    pub fn has_transition(&self, name: &str) -> bool {
        self.transitions.iter().any(|t| t.name() == name)
    }

    /// Iterates over the transitions named `name`, in declaration order.
    pub fn transitions_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Transition> + 'a {
        self.transitions.iter().filter(move |t| t.name() == name)
    }

    fn set_initial_places(&mut self, initial_places: HashSet<String>) -> Result<()> {
        if let Some(missing) = initial_places.iter().find(|p| !self.places.contains(*p)) {
            return Err(WorkflowError::Setup(format!(
                "Place \"{}\" cannot be the initial place as it does not exist in all places.",
                missing
            )));
        }
        self.initial_places = initial_places;
        Ok(())
    }

    fn add_place(&mut self, place: String) {
        if self.places.contains(&place) {
            return;
        }
        if self.places.is_empty() {
            self.initial_places = HashSet::from([place.clone()]);
        }
        self.places.insert(place);
    }

    fn add_transition(&mut self, transition: Transition) {
        for from in transition.froms() {
            self.add_place(from.clone());
        }
        for to in transition.tos() {
            self.add_place(to.clone());
        }
        self.transitions.push(transition);
    }
}

/// Builder for constructing [`Definition`] instances.
///
/// Places are always added before transitions, whatever the call order.
///
/// # Example
///
/// ```
/// use petriflow::{Definition, Transition};
///
/// let definition = Definition::builder()
///     .transition(Transition::new("split", ["start"], ["left", "right"]))
///     .initial_place("start")
///     .build()?;
///
/// assert_eq!(definition.places().len(), 3);
/// # Ok::<(), petriflow::WorkflowError>(())
/// ```
#[derive(Debug, Default)]
pub struct DefinitionBuilder {
    places: Vec<String>,
    transitions: Vec<Transition>,
    initial_places: Option<Vec<String>>,
}

impl DefinitionBuilder {
    /// Creates a new, empty definition builder.
    fn new() -> Self {
        Self::default()
    }

    /// Declares a place.
    pub fn place(mut self, place: impl Into<String>) -> Self {
        self.places.push(place.into());
        self
    }

    /// Declares several places.
    pub fn places<P>(mut self, places: P) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
    {
        self.places.extend(places.into_iter().map(Into::into));
        self
    }

    /// Appends a transition.
    pub fn transition(mut self, transition: Transition) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Adds an explicit initial place, replacing the inferred default.
    pub fn initial_place(mut self, place: impl Into<String>) -> Self {
        self.initial_places
            .get_or_insert_with(Vec::new)
            .push(place.into());
        self
    }

    /// Builds the definition, validating explicit initial places.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Setup`] if an initial place does not exist.
    pub fn build(self) -> Result<Definition> {
        match self.initial_places {
            Some(initial) => Definition::with_initial_places(self.places, self.transitions, initial),
            None => Ok(Definition::new(self.places, self.transitions)),
        }
    }
}
