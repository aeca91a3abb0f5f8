//! # Petriflow
//!
//! Workflow nets for business-object lifecycles.
//!
//! A workflow is a Petri net: a set of **places**, and **transitions** that
//! consume one token from each input place and produce one token in each
//! output place. The current position of a business object (the
//! *subject*) is a **marking**, a multiset of places, stored on the subject
//! itself by a pluggable [`SubjectMarker`].
//!
//! Petriflow lets you:
//!
//! - ask whether a transition can fire ([`Workflow::can`])
//! - list the transitions that can fire ([`Workflow::enabled_transitions`])
//! - fire a transition and persist the new marking ([`Workflow::apply`])
//! - auto-advance while the next step is unambiguous ([`Workflow::process`])
//!
//! Transitions may carry [`Guard`]s, either closures or simple queries such
//! as `amount > 100` evaluated against the subject's properties.
//!
//! ## Quick Example
//!
//! ```rust
//! use petriflow::{Definition, Transition, Workflow};
//! use serde_json::json;
//!
//! let definition = Definition::builder()
//!     .places(["draft", "review", "published", "rejected"])
//!     .transition(Transition::new("submit", ["draft"], ["review"]))
//!     .transition(
//!         Transition::new("publish", ["review"], ["published"])
//!             .with_query_guard("approvals >= 2")?,
//!     )
//!     .transition(Transition::new("reject", ["review"], ["rejected"]))
//!     .build()?;
//!
//! let workflow = Workflow::new("articles", definition);
//! let mut article = json!({ "title": "Hello", "approvals": 2 });
//!
//! // Only one way forward from "draft": take it automatically.
//! let applied = workflow.process(&mut article)?;
//! assert_eq!(applied.len(), 1);
//! assert_eq!(article["marker"], json!({ "review": 1 }));
//!
//! // "publish" and "reject" are both open now; the caller decides.
//! workflow.apply(&mut article, "publish")?;
//! assert_eq!(article["marker"], json!({ "published": 1 }));
//! # Ok::<(), petriflow::WorkflowError>(())
//! ```
//!
//! ## Parallel routing
//!
//! A transition with several output places splits the flow (AND-split); one
//! with several input places waits until all of them are marked (AND-join).
//! Several transitions may share a name: applying the name fires each of
//! them that is enabled, in declaration order.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod definition;
pub mod error;
pub mod event;
pub mod guard;
pub mod marker;
pub mod marking;
pub mod status;
pub mod subject;
pub mod transition;
pub mod workflow;

pub use config::{DefinitionConfig, TransitionConfig};
pub use definition::{Definition, DefinitionBuilder};
pub use error::{Result, WorkflowError};
pub use event::WorkflowEvent;
pub use guard::{Comparison, Guard, GuardQuery, Literal};
pub use marker::{PropertyMarker, SubjectMarker, DEFAULT_MARKER_PROPERTY};
pub use marking::MarkingState;
pub use status::{PlaceStatusEntry, WorkflowStatus};
pub use subject::Subject;
pub use transition::Transition;
pub use workflow::Workflow;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_returns_valid_semver() {
        let version = version();
        assert!(!version.is_empty());
        assert!(version.contains('.'));
    }
}
