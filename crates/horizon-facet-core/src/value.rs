//! Attribute values for filtering and sorting.
//!
//! [`Value`] is the tagged container in which item state flows through the
//! engine: attribute resolution produces values, comparison operators test
//! them, and sort orders rank them. [`Attributed`] is the seam through which
//! items expose their named attributes.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// A typed attribute value.
///
/// Values are produced by resolving an attribute path against an item and
/// consumed by comparison operators and sort orders. `Null` is a first-class
/// member: it compares equal to itself and sorts before any non-null value.
///
/// # Example
///
/// ```
/// use horizon_facet_core::Value;
///
/// let city = Value::from("Springfield");
/// assert_eq!(city.as_str(), Some("Springfield"));
/// assert!(Value::Null.is_null());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// Absence of a value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// String value.
    Str(String),
    /// Ordered list of values (e.g. the operand of an `In` comparison).
    List(Vec<Value>),
    /// Named fields, resolvable as nested attributes.
    Record(BTreeMap<String, Value>),
}

impl Value {
    /// Returns `true` if this is `Value::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Attempts to get the value as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to get the value as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get the value as a float, widening integers.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Attempts to get the value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to get the value as a list slice.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(values) => Some(values),
            _ => None,
        }
    }

    /// Looks up a field on a `Record` value.
    ///
    /// Returns `None` for non-record values and unknown fields.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Record(fields) => fields.get(name),
            _ => None,
        }
    }

    /// A short name for the value's kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Record(_) => "record",
        }
    }

    /// Compares two values for ordering, if they share one.
    ///
    /// Integers and floats order against each other; strings and booleans
    /// order within their own kind. Everything else, including any `Null`
    /// operand, has no ordering and yields `None`.
    pub fn partial_cmp_value(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Builds a record value from an iterator of named fields.
    pub fn record<K, V, I>(fields: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Record(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, ""),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            }
            Value::Record(fields) => {
                write!(f, "{{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Int(n as i64)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::List(values)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

/// Exposes an item's named attributes to the engine.
///
/// This is the only thing the engine needs to know about items: given an
/// attribute name, hand back its value. Returning `None` means the item has
/// no such attribute (a resolution error for mandatory segments); returning
/// `Some(Value::Null)` means the attribute exists but is currently null.
///
/// # Example
///
/// ```
/// use horizon_facet_core::{Attributed, Value};
///
/// struct Person {
///     name: String,
///     age: i64,
/// }
///
/// impl Attributed for Person {
///     fn attribute(&self, name: &str) -> Option<Value> {
///         match name {
///             "name" => Some(Value::from(self.name.as_str())),
///             "age" => Some(Value::from(self.age)),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Attributed {
    /// Returns the named attribute's value, or `None` if the item has no
    /// attribute with that name.
    fn attribute(&self, name: &str) -> Option<Value>;

    /// The item itself as a value, used when an empty path ("this") is
    /// resolved.
    ///
    /// The default returns `Value::Null`; override it if empty paths are
    /// meaningful for the item type.
    fn this(&self) -> Value {
        Value::Null
    }
}

impl Attributed for Value {
    fn attribute(&self, name: &str) -> Option<Value> {
        self.field(name).cloned()
    }

    fn this(&self) -> Value {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_equality() {
        assert_eq!(Value::Null, Value::Null);
        assert_ne!(Value::Null, Value::Int(0));
    }

    #[test]
    fn test_numeric_cross_ordering() {
        assert_eq!(
            Value::Int(2).partial_cmp_value(&Value::Float(2.5)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Value::Float(3.0).partial_cmp_value(&Value::Int(3)),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_null_has_no_ordering() {
        assert_eq!(Value::Null.partial_cmp_value(&Value::Int(1)), None);
        assert_eq!(Value::Str("a".into()).partial_cmp_value(&Value::Int(1)), None);
    }

    #[test]
    fn test_record_field_lookup() {
        let address = Value::record([("city", "Springfield")]);
        assert_eq!(address.field("city"), Some(&Value::from("Springfield")));
        assert_eq!(address.field("zip"), None);
    }

    #[test]
    fn test_attributed_for_value() {
        let item = Value::record([("age", 30i64)]);
        assert_eq!(item.attribute("age"), Some(Value::Int(30)));
        assert_eq!(item.attribute("name"), None);
        assert_eq!(item.this(), item);
    }

    #[test]
    fn test_display_stringification() {
        assert_eq!(Value::from("x").to_string(), "x");
        assert_eq!(Value::Int(7).to_string(), "7");
        assert_eq!(Value::Null.to_string(), "");
    }
}
