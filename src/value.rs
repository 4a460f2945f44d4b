//! Property values stored on graph nodes.
//!
//! Values are serialized untagged so graph snapshots read like plain JSON.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A value a node property can hold.
///
/// # Examples
///
/// ```
/// use crm_ident::PropertyValue;
///
/// let v = PropertyValue::from("X123");
/// assert_eq!(v.as_str(), Some("X123"));
/// assert_eq!(PropertyValue::Int(7).render().as_deref(), Some("7"));
/// assert!(PropertyValue::Null.render().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Explicit null; treated as an absent property.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed 64-bit integer.
    Int(i64),
    /// Double-precision float.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Ordered list of values.
    List(Vec<PropertyValue>),
}

impl PropertyValue {
    /// Returns true for `Null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow the string payload, if this is a `String`.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// String form used as an identifier-map key or value.
    ///
    /// Strings are returned verbatim and other scalars through `Display`.
    /// `Null` has no rendering and counts as an absent property.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::String(v) => Some(v.clone()),
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_scalars() {
        assert_eq!(PropertyValue::from("LOC").render().as_deref(), Some("LOC"));
        assert_eq!(PropertyValue::Int(42).render().as_deref(), Some("42"));
        assert_eq!(PropertyValue::Bool(true).render().as_deref(), Some("true"));
        assert_eq!(PropertyValue::Null.render(), None);
    }

    #[test]
    fn test_render_list() {
        let v = PropertyValue::List(vec![PropertyValue::Int(1), PropertyValue::from("a")]);
        assert_eq!(v.render().as_deref(), Some("[1, a]"));
    }

    #[test]
    fn test_untagged_json() {
        let v: PropertyValue = serde_json::from_str("\"X123\"").unwrap();
        assert_eq!(v, PropertyValue::from("X123"));
        let v: PropertyValue = serde_json::from_str("12").unwrap();
        assert_eq!(v, PropertyValue::Int(12));
        let v: PropertyValue = serde_json::from_str("null").unwrap();
        assert!(v.is_null());
    }

    #[test]
    fn test_string_and_int_are_distinct() {
        assert_ne!(PropertyValue::from("12"), PropertyValue::Int(12));
    }
}
