//! Subject capability trait.
//!
//! This module defines the [`Subject`] trait through which guards read
//! attributes of the object whose lifecycle a workflow tracks.

use serde_json::{Map, Value};

/// An object whose attributes can be inspected by guards.
///
/// The workflow never looks inside a subject directly: guards read
/// attributes through [`get`](Subject::get), and the marking is stored and
/// loaded by a [`SubjectMarker`](crate::SubjectMarker).
///
/// Implementations return `None` for attributes the subject does not have.
/// `Some(Value::Null)` is a present attribute holding null, which query
/// guards treat differently from an absent one.
///
/// # Object Safety
///
/// This trait is object-safe; guards receive subjects as `&dyn Subject`.
///
/// # Examples
///
/// ```
/// use petriflow::Subject;
/// use serde_json::{json, Value};
///
/// #[derive(Debug)]
/// struct Invoice {
///     amount: u64,
///     paid: bool,
/// }
///
/// impl Subject for Invoice {
///     fn get(&self, property: &str) -> Option<Value> {
///         match property {
///             "amount" => Some(json!(self.amount)),
///             "paid" => Some(json!(self.paid)),
///             _ => None,
///         }
///     }
/// }
///
/// let invoice = Invoice { amount: 120, paid: false };
/// assert_eq!(invoice.get("amount"), Some(json!(120)));
/// assert_eq!(invoice.get("currency"), None);
/// ```
pub trait Subject {
    /// Returns the value of `property`, or `None` if absent.
    fn get(&self, property: &str) -> Option<Value>;
}

impl Subject for Value {
    fn get(&self, property: &str) -> Option<Value> {
        self.as_object().and_then(|object| object.get(property)).cloned()
    }
}

impl Subject for Map<String, Value> {
    fn get(&self, property: &str) -> Option<Value> {
        Map::get(self, property).cloned()
    }
}

impl<T: Subject + ?Sized> Subject for Box<T> {
    fn get(&self, property: &str) -> Option<Value> {
        (**self).get(property)
    }
}
