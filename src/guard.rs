//! Guard predicates for transitions.
//!
//! A [`Guard`] is a boolean precondition over a [`Subject`]. Guards are
//! either arbitrary closures or built from a small comparison query such as
//! `age >= 18` or `name === "John"`, parsed once into a [`GuardQuery`].

use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::{Result, Subject, WorkflowError};

type Predicate = dyn Fn(&dyn Subject) -> bool + Send + Sync;

/// A comparison operator of the guard query syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    /// `===`
    Eq,
    /// `!==`
    Ne,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    Ge,
    /// `<=`
    Le,
}

impl Comparison {
    /// Returns the operator as written in a query.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "===",
            Self::Ne => "!==",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
        }
    }
}

impl FromStr for Comparison {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "===" => Ok(Self::Eq),
            "!==" => Ok(Self::Ne),
            ">" => Ok(Self::Gt),
            "<" => Ok(Self::Lt),
            ">=" => Ok(Self::Ge),
            "<=" => Ok(Self::Le),
            other => Err(WorkflowError::Setup(format!(
                "Unsupported operator: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scalar literal on the right-hand side of a guard query.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// `null`
    Null,
    /// `true` or `false`
    Bool(bool),
    /// Any JSON number.
    Number(f64),
    /// A double-quoted JSON string.
    String(String),
}

impl Literal {
    fn parse(segment: &str) -> Option<Self> {
        match serde_json::from_str::<Value>(segment).ok()? {
            Value::Null => Some(Self::Null),
            Value::Bool(b) => Some(Self::Bool(b)),
            Value::Number(n) => n.as_f64().map(Self::Number),
            Value::String(s) => Some(Self::String(s)),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    fn strictly_equals(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Null, Value::Null) => true,
            (Self::Bool(expected), Value::Bool(actual)) => expected == actual,
            (Self::Number(expected), Value::Number(actual)) => {
                actual.as_f64().is_some_and(|actual| actual == *expected)
            }
            (Self::String(expected), Value::String(actual)) => expected == actual,
            _ => false,
        }
    }

    fn to_number(&self) -> f64 {
        match self {
            Self::Null => 0.0,
            Self::Bool(b) => f64::from(u8::from(*b)),
            Self::Number(n) => *n,
            Self::String(s) => string_to_number(s),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Number(n) => write!(f, "{}", n),
            Self::String(s) => write!(f, "{}", Value::String(s.clone())),
        }
    }
}

/// A parsed `<property> <operator> <literal>` guard query.
///
/// # Example
///
/// ```
/// use petriflow::{Comparison, GuardQuery, Literal};
/// use serde_json::json;
///
/// let query: GuardQuery = "age >= 18".parse()?;
/// assert_eq!(query.property(), "age");
/// assert_eq!(query.comparison(), Comparison::Ge);
/// assert_eq!(query.literal(), &Literal::Number(18.0));
///
/// assert!(query.evaluate(&json!({"age": 21})));
/// assert!(!query.evaluate(&json!({"age": 17})));
/// # Ok::<(), petriflow::WorkflowError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GuardQuery {
    property: String,
    comparison: Comparison,
    literal: Literal,
}

impl GuardQuery {
    /// Parses a guard query.
    ///
    /// The query is split on the first two spaces, so string literals may
    /// contain spaces (`name === "John Doe"`).
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Setup`] for an unsupported operator or a
    /// literal that is not a JSON scalar.
    pub fn parse(query: &str) -> Result<Self> {
        let mut segments = query.splitn(3, ' ');
        let property = segments.next().unwrap_or_default();
        let operator = segments.next().unwrap_or_default();
        let comparison = operator.parse::<Comparison>()?;

        let literal = segments
            .next()
            .filter(|_| !property.is_empty())
            .and_then(Literal::parse)
            .ok_or_else(|| WorkflowError::Setup(format!("Invalid query format: {}", query)))?;

        Ok(Self {
            property: property.to_string(),
            comparison,
            literal,
        })
    }

    /// Returns the subject property the query reads.
    pub fn property(&self) -> &str {
        &self.property
    }

    /// Returns the comparison operator.
    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    /// Returns the literal compared against.
    pub fn literal(&self) -> &Literal {
        &self.literal
    }

    /// Evaluates the query against `subject`.
    ///
    /// `===` and `!==` are strict: type and value must both match, and an
    /// absent property equals nothing. The relational operators compare two
    /// strings lexicographically and otherwise compare both sides as
    /// numbers; an operand with no numeric meaning makes them false.
    pub fn evaluate(&self, subject: &dyn Subject) -> bool {
        let value = subject.get(&self.property);

        match self.comparison {
            Comparison::Eq => value.is_some_and(|v| self.literal.strictly_equals(&v)),
            Comparison::Ne => !value.is_some_and(|v| self.literal.strictly_equals(&v)),
            Comparison::Gt => self.order(value.as_ref()) == Some(Ordering::Greater),
            Comparison::Lt => self.order(value.as_ref()) == Some(Ordering::Less),
            Comparison::Ge => matches!(
                self.order(value.as_ref()),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Comparison::Le => matches!(
                self.order(value.as_ref()),
                Some(Ordering::Less | Ordering::Equal)
            ),
        }
    }

    /// Orders the subject value relative to the literal.
    fn order(&self, value: Option<&Value>) -> Option<Ordering> {
        if let (Some(Value::String(actual)), Literal::String(expected)) = (value, &self.literal) {
            return Some(actual.as_str().cmp(expected.as_str()));
        }
        value_to_number(value).partial_cmp(&self.literal.to_number())
    }
}

impl FromStr for GuardQuery {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for GuardQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.property, self.comparison, self.literal)
    }
}

fn value_to_number(value: Option<&Value>) -> f64 {
    match value {
        None => f64::NAN,
        Some(Value::Null) => 0.0,
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => string_to_number(s),
        Some(Value::Array(_) | Value::Object(_)) => f64::NAN,
    }
}

/// Converts a string the way JavaScript's `Number()` does.
///
/// Blank is zero. Accepts decimal and exponent notation, `Infinity` with an
/// optional sign, and unsigned `0x`/`0o`/`0b` literals; anything else is NaN.
fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let unsigned = trimmed.strip_prefix(&['+', '-'][..]).unwrap_or(trimmed);
    if unsigned == "Infinity" {
        return if trimmed.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }
    if let Some(number) = radix_to_number(trimmed) {
        return number;
    }
    // Rust also parses "inf", "infinity" and "nan", which JavaScript does not.
    if unsigned
        .bytes()
        .any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E')
    {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

fn radix_to_number(s: &str) -> Option<f64> {
    let radix = match s.get(..2)? {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    Some(
        u64::from_str_radix(&s[2..], radix)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN),
    )
}

/// A boolean precondition that must hold for a transition to be enabled.
///
/// Guards carry no identity beyond their predicate. Cloning a guard is
/// cheap; the predicate is shared.
///
/// # Example
///
/// ```
/// use petriflow::{Guard, Subject};
/// use serde_json::json;
///
/// let adult = Guard::from_query("age >= 18")?;
/// let named = Guard::new(|subject: &dyn Subject| subject.get("name").is_some());
///
/// let subject = json!({"name": "Ada", "age": 36});
/// assert!(adult.check(&subject));
/// assert!(named.check(&subject));
/// # Ok::<(), petriflow::WorkflowError>(())
/// ```
#[derive(Clone)]
pub struct Guard {
    predicate: Arc<Predicate>,
    query: Option<GuardQuery>,
}

impl Guard {
    /// Wraps an arbitrary subject predicate.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&dyn Subject) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            query: None,
        }
    }

    /// Builds a guard from a `<property> <operator> <literal>` query.
    ///
    /// Supported operators are `===`, `!==`, `>`, `<`, `>=` and `<=`; the
    /// literal is a JSON scalar. See [`GuardQuery::evaluate`] for the
    /// comparison rules.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Setup`] if the query cannot be parsed.
    pub fn from_query(query: &str) -> Result<Self> {
        let parsed = GuardQuery::parse(query)?;
        let evaluated = parsed.clone();
        Ok(Self {
            predicate: Arc::new(move |subject: &dyn Subject| evaluated.evaluate(subject)),
            query: Some(parsed),
        })
    }

    /// Returns true if `subject` satisfies the guard.
    pub fn check(&self, subject: &dyn Subject) -> bool {
        (self.predicate)(subject)
    }

    /// Returns the parsed query for guards built with [`from_query`](Self::from_query).
    pub fn query(&self) -> Option<&GuardQuery> {
        self.query.as_ref()
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.query {
            Some(query) => f.debug_tuple("Guard").field(&query.to_string()).finish(),
            None => f.write_str("Guard(<predicate>)"),
        }
    }
}
