//! Workflow orchestration.
//!
//! This module provides [`Workflow`], which binds a [`Definition`] to a
//! [`SubjectMarker`] and drives subjects through the net.

use std::fmt;
use tokio::sync::broadcast;
use tracing::{debug, info, info_span, warn};

use crate::status::WorkflowStatus;
use crate::{
    Definition, MarkingState, PropertyMarker, Result, Subject, SubjectMarker, Transition,
    WorkflowError, WorkflowEvent,
};

/// Default channel capacity for workflow events.
const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;

/// Why a transition is not enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TransitionBlocker {
    /// An input place holds no token.
    Marking { place: String },
    /// A guard rejected the subject.
    Guard { index: usize },
}

impl fmt::Display for TransitionBlocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Marking { place } => write!(f, "blocked by marking: place \"{}\" is empty", place),
            Self::Guard { index } => write!(f, "blocked by guard #{}", index),
        }
    }
}

/// A named workflow net bound to a marking strategy.
///
/// A `Workflow` holds no per-subject state: every operation reads the
/// subject's marking through the [`SubjectMarker`], decides, mutates the
/// marking and writes it back. One instance can serve any number of
/// subjects; callers must serialize concurrent `apply` calls on the same
/// subject.
///
/// # Example
///
/// ```
/// use petriflow::{Definition, Transition, Workflow};
/// use serde_json::json;
///
/// let definition = Definition::new(
///     ["a", "b", "c"],
///     vec![
///         Transition::new("a_to_b", ["a"], ["b"]),
///         Transition::new("b_to_c", ["b"], ["c"]),
///     ],
/// );
/// let workflow = Workflow::new("example", definition);
///
/// let mut subject = json!({});
/// assert!(workflow.can(&mut subject, "a_to_b")?);
///
/// workflow.apply(&mut subject, "a_to_b")?;
/// assert_eq!(subject["marker"], json!({"b": 1}));
/// # Ok::<(), petriflow::WorkflowError>(())
/// ```
///
/// # Thread Safety
///
/// `Workflow` is `Send + Sync` whenever its marker is.
pub struct Workflow<M = PropertyMarker> {
    name: String,
    definition: Definition,
    marker: M,
    event_tx: broadcast::Sender<WorkflowEvent>,
}

impl Workflow<PropertyMarker> {
    /// Creates a workflow storing markings under the `"marker"` property.
    pub fn new(name: impl Into<String>, definition: Definition) -> Self {
        Self::with_marker(name, definition, PropertyMarker::new())
    }
}

impl<M> Workflow<M> {
    /// Creates a workflow with a custom marking strategy.
    pub fn with_marker(name: impl Into<String>, definition: Definition, marker: M) -> Self {
        let (event_tx, _) = broadcast::channel(DEFAULT_EVENT_CHANNEL_CAPACITY);
        Self {
            name: name.into(),
            definition,
            marker,
            event_tx,
        }
    }

    /// Returns the workflow name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the net definition.
    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    /// Returns the marking strategy.
    pub fn marker(&self) -> &M {
        &self.marker
    }

    /// Subscribes to workflow events.
    ///
    /// Events are not persisted; if the receiver falls behind, older events
    /// are dropped.
    ///
    /// # Example
    ///
    /// ```
    /// # use petriflow::{Definition, Transition, Workflow, WorkflowEvent};
    /// # use serde_json::json;
    /// let workflow = Workflow::new(
    ///     "w",
    ///     Definition::new(["a", "b"], vec![Transition::new("go", ["a"], ["b"])]),
    /// );
    /// let mut events = workflow.subscribe();
    ///
    /// workflow.apply(&mut json!({}), "go")?;
    ///
    /// assert!(matches!(events.try_recv(), Ok(WorkflowEvent::StateInitialized { .. })));
    /// assert!(matches!(events.try_recv(), Ok(WorkflowEvent::TransitionApplied { .. })));
    /// # Ok::<(), petriflow::WorkflowError>(())
    /// ```
    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.event_tx.subscribe()
    }

    /// Emits an event to all subscribers.
    ///
    /// Ignores send errors (no subscribers).
    fn emit(&self, event: WorkflowEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Returns the subject's current marking, entering the workflow if needed.
    ///
    /// An unmarked subject is placed in the definition's initial places and
    /// the seeded marking is persisted immediately.
    ///
    /// # Errors
    ///
    /// - [`WorkflowError::Logic`] if the subject is unmarked and the
    ///   definition has no initial place
    /// - [`WorkflowError::Logic`] if a marked place is not part of the net
    /// - any error raised by the marker
    pub fn get_state<S>(&self, subject: &mut S) -> Result<MarkingState>
    where
        S: ?Sized,
        M: SubjectMarker<S>,
    {
        let mut state = self.marker.read_state(subject)?;

        if state.is_empty() {
            let initial_places = self.definition.initial_places();
            if initial_places.is_empty() {
                return Err(WorkflowError::Logic(format!(
                    "Current subject state is empty and there is no initial place for workflow \"{}\".",
                    self.name
                )));
            }

            for place in initial_places {
                state.mark_place(place.as_str(), 1);
            }
            self.marker.write_state(subject, &state)?;

            info!(workflow = %self.name, places = ?initial_places, "subject entered workflow");
            self.emit(WorkflowEvent::StateInitialized {
                workflow: self.name.clone(),
                marking: state.clone(),
            });
        }

        if let Some((place, _)) = state
            .places()
            .find(|(place, _)| !self.definition.has_place(place))
        {
            return Err(WorkflowError::Logic(format!(
                "Place \"{}\" is not valid for workflow \"{}\".",
                place, self.name
            )));
        }

        Ok(state)
    }

    /// Returns true if at least one transition named `transition_name` is
    /// enabled for the subject.
    ///
    /// Unknown names yield `false`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the subject's state cannot be derived
    /// (see [`get_state`](Self::get_state)).
    pub fn can<S>(&self, subject: &mut S, transition_name: &str) -> Result<bool>
    where
        S: Subject,
        M: SubjectMarker<S>,
    {
        let state = self.get_state(subject)?;

        Ok(self
            .definition
            .transitions_named(transition_name)
            .any(|transition| self.check_transition(&state, transition, &*subject).is_ok()))
    }

    /// Returns every enabled transition in declaration order.
    ///
    /// Same-named transitions are evaluated independently and each appears
    /// if enabled.
    ///
    /// # Errors
    ///
    /// Returns an error only if the subject's state cannot be derived.
    pub fn enabled_transitions<S>(&self, subject: &mut S) -> Result<Vec<&Transition>>
    where
        S: Subject,
        M: SubjectMarker<S>,
    {
        let state = self.get_state(subject)?;

        Ok(self
            .definition
            .transitions()
            .iter()
            .filter(|transition| self.check_transition(&state, transition, &*subject).is_ok())
            .collect())
    }

    /// Fires every enabled transition named `transition_name`.
    ///
    /// Matching transitions are visited in declaration order. Each one is
    /// checked against the marking left by the previous firings of this
    /// call; when enabled it marks its output places, unmarks its input
    /// places and the marking is persisted before the next match is
    /// visited. Firing is not atomic across matches: if a later match fails,
    /// earlier ones stay persisted.
    ///
    /// Returns the marking after all firings.
    ///
    /// # Errors
    ///
    /// - [`WorkflowError::TransitionNotExist`] if no transition has the name
    /// - [`WorkflowError::TransitionNotEnabled`] if none of them is enabled
    /// - any error from [`get_state`](Self::get_state), the marking
    ///   arithmetic or the marker
    pub fn apply<S>(&self, subject: &mut S, transition_name: &str) -> Result<MarkingState>
    where
        S: Subject,
        M: SubjectMarker<S>,
    {
        let span = info_span!("apply", workflow = %self.name, transition = %transition_name);
        let _enter = span.enter();

        let mut state = self.get_state(subject)?;
        let mut exists = false;
        let mut fired = 0usize;

        for transition in self.definition.transitions_named(transition_name) {
            exists = true;

            if let Err(blocker) = self.check_transition(&state, transition, &*subject) {
                debug!(%blocker, "transition not enabled");
                continue;
            }

            if let Err(e) = self.fire(&mut state, transition, subject) {
                if fired > 0 {
                    warn!(fired, error = %e, "transition partially applied");
                }
                return Err(e);
            }
            fired += 1;
        }

        if !exists {
            return Err(WorkflowError::TransitionNotExist(transition_name.to_string()));
        }

        if fired == 0 {
            self.emit(WorkflowEvent::TransitionBlocked {
                workflow: self.name.clone(),
                transition: transition_name.to_string(),
            });
            return Err(WorkflowError::TransitionNotEnabled(
                transition_name.to_string(),
            ));
        }

        Ok(state)
    }

    /// Auto-advances the subject through unambiguous stretches of the net.
    ///
    /// While exactly one transition is enabled it is applied (by name) and
    /// recorded. Stops as soon as zero or several transitions are enabled
    /// and returns the applied transitions in order. Nets with an
    /// unconditional cycle never stop.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by [`apply`](Self::apply) or
    /// [`enabled_transitions`](Self::enabled_transitions).
    pub fn process<S>(&self, subject: &mut S) -> Result<Vec<&Transition>>
    where
        S: Subject,
        M: SubjectMarker<S>,
    {
        let span = info_span!("process", workflow = %self.name);
        let _enter = span.enter();

        let mut applied = Vec::new();
        loop {
            let enabled = self.enabled_transitions(subject)?;
            let transition = match enabled.as_slice() {
                [only] => *only,
                _ => {
                    debug!(enabled = enabled.len(), "stopping auto-advance");
                    break;
                }
            };

            self.apply(subject, transition.name())?;
            applied.push(transition);
        }

        self.emit(WorkflowEvent::ProcessCompleted {
            workflow: self.name.clone(),
            applied: applied.iter().map(|t| t.name().to_string()).collect(),
        });

        Ok(applied)
    }

    /// Returns a snapshot of the subject's marking and enabled transitions.
    ///
    /// # Errors
    ///
    /// Returns an error if the subject's state cannot be derived.
    pub fn status<S>(&self, subject: &mut S) -> Result<WorkflowStatus>
    where
        S: Subject,
        M: SubjectMarker<S>,
    {
        let state = self.get_state(subject)?;
        let enabled = self
            .definition
            .transitions()
            .iter()
            .filter(|transition| self.check_transition(&state, transition, &*subject).is_ok())
            .map(|transition| transition.name());

        Ok(WorkflowStatus::new(self.name.as_str(), &state, enabled))
    }

    /// Checks that every input place is marked and every guard passes.
    fn check_transition(
        &self,
        state: &MarkingState,
        transition: &Transition,
        subject: &dyn Subject,
    ) -> std::result::Result<(), TransitionBlocker> {
        if let Some(place) = transition.froms().iter().find(|p| !state.is_marked(p)) {
            return Err(TransitionBlocker::Marking {
                place: place.clone(),
            });
        }

        if let Some(index) = transition
            .guards()
            .iter()
            .position(|guard| !guard.check(subject))
        {
            return Err(TransitionBlocker::Guard { index });
        }

        Ok(())
    }

    /// Moves tokens for one transition and persists the result.
    fn fire<S>(&self, state: &mut MarkingState, transition: &Transition, subject: &mut S) -> Result<()>
    where
        S: ?Sized,
        M: SubjectMarker<S>,
    {
        for to in transition.tos() {
            state.mark_place(to.as_str(), 1);
        }
        for from in transition.froms() {
            state.unmark_place(from, 1)?;
        }
        self.marker.write_state(subject, state)?;

        info!(transition = %transition.name(), "transition applied");
        self.emit(WorkflowEvent::TransitionApplied {
            workflow: self.name.clone(),
            transition: transition.name().to_string(),
            marking: state.clone(),
        });
        Ok(())
    }
}

impl<M> fmt::Debug for Workflow<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workflow")
            .field("name", &self.name)
            .field("places", &self.definition.places().len())
            .field("transitions", &self.definition.transitions().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Guard;
    use serde_json::{json, Value};

    //   a --a_to_b--> b --b_to_c--> c
    fn three_step_definition() -> Definition {
        Definition::new(
            ["a", "b", "c"],
            vec![
                Transition::new("a_to_b", ["a"], ["b"]),
                Transition::new("b_to_c", ["b"], ["c"]),
            ],
        )
    }

    //   a --t1--> {b, c} --t2--> d --t3--> e --t5--> g
    //                             \--t4--> f --t6--/
    fn complex_definition() -> Definition {
        Definition::new(
            ["a", "b", "c", "d", "e", "f", "g"],
            vec![
                Transition::new("t1", ["a"], ["b", "c"]),
                Transition::new("t2", ["b", "c"], ["d"]),
                Transition::new("t3", ["d"], ["e"]),
                Transition::new("t4", ["d"], ["f"]),
                Transition::new("t5", ["e"], ["g"]),
                Transition::new("t6", ["f"], ["g"]),
            ],
        )
    }

    fn same_name_definition() -> Definition {
        Definition::new(
            ["a", "b", "c"],
            vec![
                Transition::new("a_to_bc", ["a"], ["b", "c"]),
                Transition::new("b_to_c", ["b"], ["c"]),
                Transition::new("to_a", ["b"], ["a"]),
                Transition::new("to_a", ["c"], ["a"]),
            ],
        )
    }

    fn names(transitions: &[&Transition]) -> Vec<String> {
        transitions.iter().map(|t| t.name().to_string()).collect()
    }

    #[test]
    fn test_can_unknown_transition() {
        let workflow = Workflow::new("example_workflow", three_step_definition());
        let mut subject = json!({"marker": "a"});

        assert!(!workflow.can(&mut subject, "unknown_transition").unwrap());
    }

    #[test]
    fn test_can_simple_workflow() {
        let workflow = Workflow::new("example_workflow", three_step_definition());
        let mut subject = json!({"marker": "a"});

        assert!(workflow.can(&mut subject, "a_to_b").unwrap());
        assert!(!workflow.can(&mut subject, "b_to_c").unwrap());
    }

    #[test]
    fn test_can_complex_workflow() {
        let workflow = Workflow::new("example_workflow", complex_definition());
        let mut subject = json!({});

        assert!(workflow.can(&mut subject, "t1").unwrap());
        assert!(!workflow.can(&mut subject, "t2").unwrap());

        subject["marker"] = json!({"b": 1});
        assert!(!workflow.can(&mut subject, "t1").unwrap());
        // Every input place needs a token.
        assert!(!workflow.can(&mut subject, "t2").unwrap());

        subject["marker"] = json!({"b": 1, "c": 1});
        assert!(!workflow.can(&mut subject, "t1").unwrap());
        assert!(workflow.can(&mut subject, "t2").unwrap());

        subject["marker"] = json!({"f": 1});
        assert!(!workflow.can(&mut subject, "t5").unwrap());
        assert!(workflow.can(&mut subject, "t6").unwrap());
    }

    #[test]
    fn test_can_same_name_transitions() {
        let workflow = Workflow::new("example_workflow", same_name_definition());
        let mut subject = json!({});

        assert!(workflow.can(&mut subject, "a_to_bc").unwrap());
        assert!(!workflow.can(&mut subject, "b_to_c").unwrap());
        assert!(!workflow.can(&mut subject, "to_a").unwrap());

        subject["marker"] = json!({"b": 1});
        assert!(!workflow.can(&mut subject, "a_to_bc").unwrap());
        assert!(workflow.can(&mut subject, "b_to_c").unwrap());
        assert!(workflow.can(&mut subject, "to_a").unwrap());
    }

    #[test]
    fn test_apply_split() {
        let workflow = Workflow::new("example_workflow", complex_definition());
        let mut subject = json!({});

        let state = workflow.apply(&mut subject, "t1").unwrap();

        assert_eq!(subject, json!({"marker": {"b": 1, "c": 1}}));
        assert_eq!(state, MarkingState::from_places([("b", 1), ("c", 1)]));
    }

    #[test]
    fn test_apply_unknown_and_disabled() {
        let workflow = Workflow::new("example_workflow", complex_definition());
        let mut subject = json!({});

        assert!(matches!(
            workflow.apply(&mut subject, "t_not_exists"),
            Err(WorkflowError::TransitionNotExist(_))
        ));
        assert!(matches!(
            workflow.apply(&mut subject, "t2"),
            Err(WorkflowError::TransitionNotEnabled(_))
        ));
    }

    #[test]
    fn test_apply_leaves_other_tokens() {
        let workflow = Workflow::new("example_workflow", complex_definition());
        let mut subject = json!({"marker": {"c": 1, "e": 1}});

        workflow.apply(&mut subject, "t5").unwrap();
        assert_eq!(subject, json!({"marker": {"c": 1, "g": 1}}));

        // 'b' is empty, so the join cannot fire.
        assert!(matches!(
            workflow.apply(&mut subject, "t2"),
            Err(WorkflowError::TransitionNotEnabled(_))
        ));
    }

    #[test]
    fn test_apply_start_to_end() {
        let workflow = Workflow::new("example_workflow", complex_definition());
        let mut subject = json!({});

        workflow.apply(&mut subject, "t1").unwrap();
        assert_eq!(subject["marker"], json!({"b": 1, "c": 1}));

        workflow.apply(&mut subject, "t2").unwrap();
        assert_eq!(subject["marker"], json!({"d": 1}));

        workflow.apply(&mut subject, "t3").unwrap();
        assert_eq!(subject["marker"], json!({"e": 1}));

        workflow.apply(&mut subject, "t5").unwrap();
        assert_eq!(subject["marker"], json!({"g": 1}));
    }

    #[test]
    fn test_apply_same_name_transitions_fire_together() {
        let workflow = Workflow::new("example_workflow", same_name_definition());
        let mut subject = json!({});

        workflow.apply(&mut subject, "a_to_bc").unwrap();
        assert_eq!(subject["marker"], json!({"b": 1, "c": 1}));

        workflow.apply(&mut subject, "to_a").unwrap();
        assert_eq!(subject["marker"], json!({"a": 2}));

        workflow.apply(&mut subject, "a_to_bc").unwrap();
        workflow.apply(&mut subject, "b_to_c").unwrap();
        assert_eq!(subject["marker"], json!({"a": 1, "c": 2}));

        workflow.apply(&mut subject, "to_a").unwrap();
        assert_eq!(subject["marker"], json!({"a": 2, "c": 1}));
    }

    #[test]
    fn test_apply_later_match_sees_earlier_firing() {
        // The second `go` is enabled only by the token the first one produces.
        let definition = Definition::new(
            ["a", "b", "c"],
            vec![
                Transition::new("go", ["a"], ["b"]),
                Transition::new("go", ["b"], ["c"]),
            ],
        );
        let workflow = Workflow::new("chain", definition);
        let mut subject = json!({});

        workflow.apply(&mut subject, "go").unwrap();
        assert_eq!(subject["marker"], json!({"c": 1}));
    }

    #[test]
    fn test_enabled_transitions_initial() {
        let workflow = Workflow::new("example_workflow", complex_definition());
        let mut subject = json!({});

        let enabled = workflow.enabled_transitions(&mut subject).unwrap();
        assert_eq!(names(&enabled), vec!["t1"]);
        assert_eq!(enabled[0].tos(), ["b", "c"]);
    }

    #[test]
    fn test_enabled_transitions_branch() {
        let workflow = Workflow::new("example_workflow", complex_definition());
        let mut subject = json!({"marker": {"d": 1}});

        let enabled = workflow.enabled_transitions(&mut subject).unwrap();
        assert_eq!(names(&enabled), vec!["t3", "t4"]);
    }

    #[test]
    fn test_enabled_transitions_single() {
        let workflow = Workflow::new("example_workflow", complex_definition());
        let mut subject = json!({"marker": {"c": 1, "e": 1}});

        let enabled = workflow.enabled_transitions(&mut subject).unwrap();
        assert_eq!(names(&enabled), vec!["t5"]);
    }

    #[test]
    fn test_enabled_transitions_duplicates_listed_separately() {
        let workflow = Workflow::new("example_workflow", same_name_definition());
        let mut subject = json!({"marker": {"b": 1, "c": 1}});

        let enabled = workflow.enabled_transitions(&mut subject).unwrap();
        assert_eq!(names(&enabled), vec!["b_to_c", "to_a", "to_a"]);
    }

    #[test]
    fn test_get_state_without_initial_place() {
        let workflow = Workflow::new("example_workflow", Definition::default());
        let mut subject = json!({});

        let err = workflow.get_state(&mut subject).unwrap_err();
        assert!(matches!(err, WorkflowError::Logic(_)));
        assert_eq!(
            err.to_string(),
            "Workflow logic error: Current subject state is empty and there is no initial place for workflow \"example_workflow\"."
        );
    }

    #[test]
    fn test_get_state_seeds_and_persists_initial_place() {
        let workflow = Workflow::new("example_workflow", three_step_definition());
        let mut subject = json!({});

        let state = workflow.get_state(&mut subject).unwrap();

        assert_eq!(state, MarkingState::from_places([("a", 1)]));
        assert_eq!(subject["marker"], json!({"a": 1}));
    }

    #[test]
    fn test_get_state_multiple_initial_places() {
        let definition =
            Definition::with_initial_places(["a", "b", "c"], Vec::new(), ["a", "b"]).unwrap();
        let workflow = Workflow::new("parallel", definition);
        let mut subject = json!({});

        let state = workflow.get_state(&mut subject).unwrap();
        assert_eq!(state, MarkingState::from_places([("a", 1), ("b", 1)]));
    }

    #[test]
    fn test_get_state_existing_place() {
        let workflow = Workflow::new("example_workflow", three_step_definition());
        let mut subject = json!({"marker": "b"});

        let state = workflow.get_state(&mut subject).unwrap();
        assert_eq!(state, MarkingState::from_places([("b", 1)]));
        // Reading does not rewrite a valid marking.
        assert_eq!(subject["marker"], json!("b"));
    }

    #[test]
    fn test_get_state_foreign_place() {
        let workflow = Workflow::new("example_workflow", three_step_definition());
        let mut subject = json!({"marker": {"a": 1, "zzz": 1}});

        let err = workflow.get_state(&mut subject).unwrap_err();
        assert!(matches!(err, WorkflowError::Logic(_)));
        assert!(err
            .to_string()
            .contains("Place \"zzz\" is not valid for workflow \"example_workflow\"."));
    }

    #[test]
    fn test_get_state_is_idempotent() {
        let workflow = Workflow::new("example_workflow", complex_definition());
        let mut subject = json!({});

        let first = workflow.get_state(&mut subject).unwrap();
        let second = workflow.get_state(&mut subject).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_get_state_non_object_subject() {
        let workflow = Workflow::new("example_workflow", three_step_definition());
        let mut subject = Value::Null;

        assert!(matches!(
            workflow.get_state(&mut subject),
            Err(WorkflowError::Logic(_))
        ));
    }

    #[test]
    fn test_process_linear() {
        let workflow = Workflow::new("example_workflow", three_step_definition());
        let mut subject = json!({});

        let applied = workflow.process(&mut subject).unwrap();

        assert_eq!(names(&applied), vec!["a_to_b", "b_to_c"]);
        assert_eq!(subject["marker"], json!({"c": 1}));
    }

    #[test]
    fn test_process_stops_at_branch() {
        let workflow = Workflow::new("example_workflow", complex_definition());
        let mut subject = json!({});

        let applied = workflow.process(&mut subject).unwrap();

        assert_eq!(names(&applied), vec!["t1", "t2"]);
        assert_eq!(subject["marker"], json!({"d": 1}));

        let resumed = workflow.process(&mut subject).unwrap();
        assert!(resumed.is_empty());
    }

    #[test]
    fn test_process_after_branch_choice() {
        let workflow = Workflow::new("example_workflow", complex_definition());
        let mut subject = json!({"marker": {"d": 1}});

        workflow.apply(&mut subject, "t4").unwrap();
        let applied = workflow.process(&mut subject).unwrap();

        assert_eq!(names(&applied), vec!["t6"]);
        assert_eq!(subject["marker"], json!({"g": 1}));
    }

    #[test]
    fn test_guard_blocks_transition() {
        let definition = Definition::new(
            ["a", "b"],
            vec![Transition::new("a_to_b", ["a"], ["b"])
                .with_query_guard("propertyB === 4")
                .unwrap()],
        );
        let workflow = Workflow::new("guarded", definition);

        let mut absent = json!({});
        assert!(!workflow.can(&mut absent, "a_to_b").unwrap());

        let mut three = json!({"propertyB": 3});
        assert!(!workflow.can(&mut three, "a_to_b").unwrap());
        assert!(matches!(
            workflow.apply(&mut three, "a_to_b"),
            Err(WorkflowError::TransitionNotEnabled(_))
        ));

        let mut four = json!({"propertyB": 4});
        assert!(workflow.can(&mut four, "a_to_b").unwrap());
        workflow.apply(&mut four, "a_to_b").unwrap();
        assert_eq!(four["marker"], json!({"b": 1}));
    }

    #[test]
    fn test_all_guards_must_pass() {
        let definition = Definition::new(
            ["a", "b"],
            vec![Transition::new("a_to_b", ["a"], ["b"])
                .with_guard(Guard::from_query("x > 1").unwrap())
                .with_guard(Guard::from_query("y > 1").unwrap())],
        );
        let workflow = Workflow::new("guarded", definition);

        assert!(!workflow.can(&mut json!({"x": 2, "y": 0}), "a_to_b").unwrap());
        assert!(!workflow.can(&mut json!({"x": 0, "y": 2}), "a_to_b").unwrap());
        assert!(workflow.can(&mut json!({"x": 2, "y": 2}), "a_to_b").unwrap());
    }

    #[test]
    fn test_check_transition_blockers() {
        let workflow = Workflow::new("example_workflow", complex_definition());
        let state = MarkingState::from_places([("b", 1)]);
        let t2 = &workflow.definition().transitions()[1];

        assert_eq!(
            workflow.check_transition(&state, t2, &json!({})),
            Err(TransitionBlocker::Marking {
                place: "c".to_string()
            })
        );

        let guarded = Transition::new("g", ["b"], ["c"]).with_guard(Guard::new(|_| false));
        assert_eq!(
            workflow.check_transition(&state, &guarded, &json!({})),
            Err(TransitionBlocker::Guard { index: 0 })
        );
    }

    #[test]
    fn test_events() {
        let workflow = Workflow::new("example_workflow", three_step_definition());
        let mut events = workflow.subscribe();
        let mut subject = json!({});

        workflow.process(&mut subject).unwrap();
        let _ = workflow.apply(&mut subject, "a_to_b");

        let mut received = Vec::new();
        while let Ok(event) = events.try_recv() {
            received.push(event);
        }

        assert!(matches!(received[0], WorkflowEvent::StateInitialized { .. }));
        assert_eq!(received[1].transition(), Some("a_to_b"));
        assert_eq!(received[2].transition(), Some("b_to_c"));
        assert!(matches!(
            &received[3],
            WorkflowEvent::ProcessCompleted { applied, .. } if applied.len() == 2
        ));
        assert!(received[4].is_error());
        assert_eq!(received.len(), 5);
    }

    #[test]
    fn test_status() {
        let workflow = Workflow::new("example_workflow", same_name_definition());
        let mut subject = json!({"marker": {"b": 1, "c": 1}});

        let status = workflow.status(&mut subject).unwrap();
        assert_eq!(status.workflow, "example_workflow");
        assert_eq!(status.tokens("b"), 1);
        assert_eq!(status.enabled, vec!["b_to_c", "to_a"]);
        assert!(!status.is_terminal());
    }

    #[test]
    fn test_workflow_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Workflow>();
    }

    #[test]
    fn test_debug() {
        let workflow = Workflow::new("example_workflow", three_step_definition());
        let debug = format!("{:?}", workflow);
        assert!(debug.contains("example_workflow"));
        assert!(debug.contains("transitions: 2"));
    }
}
