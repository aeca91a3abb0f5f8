//! Workflow definitions loaded from JSON.
//!
//! ```json
//! {
//!   "places": ["draft", "review", "published"],
//!   "transitions": [
//!     { "name": "submit", "from": "draft", "to": "review" },
//!     { "name": "publish", "from": "review", "to": "published",
//!       "guards": ["approvals >= 2"] }
//!   ],
//!   "initial_places": "draft"
//! }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

use crate::{Definition, Result, Transition};

/// Declarative form of a [`Definition`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefinitionConfig {
    /// Declared places. Places referenced only by transitions are added
    /// automatically.
    #[serde(default)]
    pub places: Vec<String>,
    /// Transitions in declaration order.
    #[serde(default)]
    pub transitions: Vec<TransitionConfig>,
    /// Explicit initial places; inferred when absent.
    #[serde(
        default,
        deserialize_with = "optional_one_or_many",
        skip_serializing_if = "Option::is_none"
    )]
    pub initial_places: Option<Vec<String>>,
}

/// Declarative form of a [`Transition`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionConfig {
    /// Transition name; may repeat across transitions.
    pub name: String,
    /// Input places.
    #[serde(deserialize_with = "one_or_many")]
    pub from: Vec<String>,
    /// Output places.
    #[serde(deserialize_with = "one_or_many")]
    pub to: Vec<String>,
    /// Guard queries such as `amount > 100`.
    #[serde(default)]
    pub guards: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for Vec<String> {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(place) => vec![place],
            OneOrMany::Many(places) => places,
        }
    }
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    OneOrMany::deserialize(deserializer).map(Into::into)
}

fn optional_one_or_many<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<OneOrMany>::deserialize(deserializer).map(|value| value.map(Into::into))
}

impl DefinitionConfig {
    /// Parses a configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Serialization`](crate::WorkflowError::Serialization)
    /// if the JSON is malformed or does not match the schema.
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Io`](crate::WorkflowError::Io) if the file
    /// cannot be read, or a serialization error if it cannot be parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Builds the [`Definition`], parsing every guard query.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Setup`](crate::WorkflowError::Setup) for an
    /// unparseable guard or an initial place outside the net.
    pub fn into_definition(self) -> Result<Definition> {
        let transitions = self
            .transitions
            .into_iter()
            .map(TransitionConfig::into_transition)
            .collect::<Result<Vec<_>>>()?;

        match self.initial_places {
            Some(initial) => Definition::with_initial_places(self.places, transitions, initial),
            None => Ok(Definition::new(self.places, transitions)),
        }
    }
}

impl TransitionConfig {
    /// Builds the [`Transition`], parsing its guard queries.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Setup`](crate::WorkflowError::Setup) if a
    /// guard query is malformed.
    pub fn into_transition(self) -> Result<Transition> {
        self.guards.iter().try_fold(
            Transition::new(self.name, self.from, self.to),
            |transition, query| transition.with_query_guard(query),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WorkflowError;
    use serde_json::json;

    const ARTICLE: &str = r#"{
        "places": ["draft", "review", "published"],
        "transitions": [
            { "name": "submit", "from": "draft", "to": "review" },
            { "name": "publish", "from": ["review"], "to": ["published"],
              "guards": ["approvals >= 2"] }
        ]
    }"#;

    #[test]
    fn test_parse_config() {
        let config = DefinitionConfig::from_json_str(ARTICLE).unwrap();

        assert_eq!(config.places, vec!["draft", "review", "published"]);
        assert_eq!(config.transitions.len(), 2);
        assert_eq!(config.transitions[0].from, vec!["draft"]);
        assert_eq!(config.transitions[1].guards, vec!["approvals >= 2"]);
        assert!(config.initial_places.is_none());
    }

    #[test]
    fn test_into_definition() {
        let definition = DefinitionConfig::from_json_str(ARTICLE)
            .unwrap()
            .into_definition()
            .unwrap();

        assert!(definition.initial_places().contains("draft"));
        let publish = &definition.transitions()[1];
        assert_eq!(publish.guards().len(), 1);
        assert!(publish.guards()[0].check(&json!({"approvals": 2})));
        assert!(!publish.guards()[0].check(&json!({"approvals": 1})));
    }

    #[test]
    fn test_initial_places_single_or_list() {
        let single = DefinitionConfig::from_json_str(
            r#"{ "places": ["a", "b"], "initial_places": "b" }"#,
        )
        .unwrap();
        assert_eq!(single.initial_places, Some(vec!["b".to_string()]));

        let list = DefinitionConfig::from_json_str(
            r#"{ "places": ["a", "b"], "initial_places": ["a", "b"] }"#,
        )
        .unwrap();
        let definition = list.into_definition().unwrap();
        assert_eq!(definition.initial_places().len(), 2);
    }

    #[test]
    fn test_unknown_initial_place_fails() {
        let config = DefinitionConfig::from_json_str(
            r#"{ "places": ["a"], "initial_places": "x" }"#,
        )
        .unwrap();
        assert!(matches!(
            config.into_definition(),
            Err(WorkflowError::Setup(_))
        ));
    }

    #[test]
    fn test_bad_guard_fails() {
        let config = DefinitionConfig::from_json_str(
            r#"{ "transitions": [ { "name": "t", "from": "a", "to": "b", "guards": ["nonsense"] } ] }"#,
        )
        .unwrap();
        assert!(matches!(
            config.into_definition(),
            Err(WorkflowError::Setup(_))
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            DefinitionConfig::from_json_str("{ not json"),
            Err(WorkflowError::Serialization(_))
        ));
        assert!(matches!(
            DefinitionConfig::from_json_str(r#"{ "transitions": [ { "name": "t" } ] }"#),
            Err(WorkflowError::Serialization(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            DefinitionConfig::from_path("/nonexistent/petriflow.json"),
            Err(WorkflowError::Io(_))
        ));
    }

    #[test]
    fn test_serialize_round_trip() {
        let config = DefinitionConfig::from_json_str(ARTICLE).unwrap();
        let text = serde_json::to_string(&config).unwrap();
        assert_eq!(DefinitionConfig::from_json_str(&text).unwrap(), config);
    }
}
