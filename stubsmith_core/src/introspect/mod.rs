//! Runtime introspection seam.
//!
//! The stub pipeline never talks to an interpreter directly. Everything it
//! needs from the probed runtime goes through [`RuntimeObject`]: list member
//! names, fetch a member, read documentation, and a handful of type probes the
//! classifier uses. Two backends implement it:
//!
//! - [`dump::ObjectGraph`] - an in-memory graph loaded from a JSON introspection dump
//! - `python::PyObjectHandle` - a live CPython object (feature `python`)

pub mod dump;
#[cfg(feature = "python")]
pub mod python;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a runtime object, stable for the duration of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A concrete scalar value (text, boolean, number).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    /// Name of the runtime type this scalar corresponds to.
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Bool(_) => "bool",
            Scalar::Int(_) => "int",
            Scalar::Float(_) => "float",
            Scalar::Str(_) => "str",
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(true) => write!(f, "True"),
            Scalar::Bool(false) => write!(f, "False"),
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::Float(v) => write!(f, "{:?}", v),
            Scalar::Str(v) => write!(f, "{}", v),
        }
    }
}

/// Read-only view of one object in the probed runtime.
///
/// Handles are cheap to clone and fetching a member yields another handle of
/// the same backend. None of these methods may mutate the runtime.
pub trait RuntimeObject: Clone {
    /// Identity used by the walker's visited-module guard.
    fn identity(&self) -> ObjectId;

    /// Name of the object's runtime type (`module`, `property`, `builtin_function_or_method`, ...).
    fn type_name(&self) -> String;

    /// Names of the direct base types of the object's runtime type.
    fn base_type_names(&self) -> Vec<String>;

    /// Whether the object itself is a type/class.
    fn is_class(&self) -> bool;

    /// The object's own `__name__`, if it has one.
    fn qualified_name(&self) -> Option<String>;

    /// Raw documentation text.
    fn doc(&self) -> Option<String>;

    /// Textual representation (`str(obj)`).
    fn repr(&self) -> String;

    /// Member names in listing order.
    fn member_names(&self) -> Vec<String>;

    /// Fetch a member by name; `None` when the lookup fails.
    fn member(&self, name: &str) -> Option<Self>;

    /// Inspectable parameter list of a scripted callable, e.g. `(x, y=1) -> int`.
    fn signature(&self) -> Option<String>;

    /// The value when the object is exactly a `str`, `bool`, `int` or `float`.
    fn scalar(&self) -> Option<Scalar>;

    /// Integer conversion, used for enumerator values.
    fn as_integer(&self) -> Option<i64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_display_follows_runtime_spelling() {
        assert_eq!(Scalar::Bool(true).to_string(), "True");
        assert_eq!(Scalar::Int(-4).to_string(), "-4");
        assert_eq!(Scalar::Float(1.0).to_string(), "1.0");
        assert_eq!(Scalar::Str("llvm".into()).to_string(), "llvm");
    }

    #[test]
    fn test_scalar_untagged_deserialization_order() {
        let values: Vec<Scalar> = serde_json::from_str(r#"[true, 3, 2.5, "x"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Scalar::Bool(true),
                Scalar::Int(3),
                Scalar::Float(2.5),
                Scalar::Str("x".into())
            ]
        );
    }
}
