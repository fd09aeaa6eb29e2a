//! Runtime values exchanged with bound implementations.
//!
//! Dispatch stubs are dynamically typed: every argument, default value and return value
//! is a [`Value`]. Arguments travel in an [`Arguments`] list, which the stub hands to the
//! bound callable by mutable reference so that by-reference parameters can be written back
//! to the caller.
//!
//! # Examples
//!
//! ```rust
//! use anonymizer::{Arguments, Value};
//!
//! let mut args = Arguments::from(vec![Value::from(2), Value::from("two")]);
//! assert_eq!(args.arg(0).as_int(), Some(2));
//! assert!(args.arg(5).is_null());
//!
//! args.set(1, Value::from("changed"));
//! assert_eq!(args[1], Value::from("changed"));
//! ```

use std::{
    fmt,
    ops::{Index, IndexMut},
    sync::Arc,
};

use crate::generator::{Callable, Instance};

/// Shared value returned for out-of-range argument lookups
static NULL: Value = Value::Null;

/// A dynamically typed runtime value
#[derive(Clone, Default)]
pub enum Value {
    /// Absence of a value; also what an unbound operation returns
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Signed 64bit integer
    Int(i64),
    /// 64bit floating-point
    Float(f64),
    /// Text
    Str(String),
    /// Ordered list of values
    Array(Vec<Value>),
    /// A generated instance
    Object(Instance),
    /// A callable value
    Callable(Callable),
}

impl Value {
    /// Returns `true` for [`Value::Null`]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the boolean, if this is a [`Value::Bool`]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the integer, if this is a [`Value::Int`]
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the float, if this is a [`Value::Float`]
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the text, if this is a [`Value::Str`]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the elements, if this is a [`Value::Array`]
    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(values) => Some(values),
            _ => None,
        }
    }

    /// Returns the instance, if this is a [`Value::Object`]
    #[must_use]
    pub fn as_object(&self) -> Option<&Instance> {
        match self {
            Value::Object(instance) => Some(instance),
            _ => None,
        }
    }

    /// Returns the callable, if this is a [`Value::Callable`]
    #[must_use]
    pub fn as_callable(&self) -> Option<&Callable> {
        match self {
            Value::Callable(callable) => Some(callable),
            _ => None,
        }
    }

    /// Short name of the runtime kind, used in diagnostics
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Callable(_) => "callable",
        }
    }

    /// Returns `true` if the value can be written as a literal in a signature declaration
    #[must_use]
    pub fn is_literal(&self) -> bool {
        match self {
            Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(_) => true,
            Value::Array(values) => values.iter().all(Value::is_literal),
            Value::Object(_) | Value::Callable(_) => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Callable(a), Value::Callable(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Object(instance) => write!(f, "Object({})", instance.type_name()),
            Value::Callable(_) => f.write_str("Callable"),
            _ => write!(f, "{self}"),
        }
    }
}

/// Renders the literal form used by signature declarations
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Int(value) => write!(f, "{value}"),
            // {:?} keeps the fractional part for whole numbers (1.0 vs 1)
            Value::Float(value) => write!(f, "{value:?}"),
            Value::Str(value) => {
                f.write_str("'")?;
                for c in value.chars() {
                    match c {
                        '\'' => f.write_str("\\'")?,
                        '\\' => f.write_str("\\\\")?,
                        _ => write!(f, "{c}")?,
                    }
                }
                f.write_str("'")
            }
            Value::Array(values) => {
                f.write_str("[")?;
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
            Value::Object(instance) => write!(f, "object({})", instance.type_name()),
            Value::Callable(_) => f.write_str("callable"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::Array(values)
    }
}

impl From<Instance> for Value {
    fn from(instance: Instance) -> Self {
        Value::Object(instance)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// The argument list a dispatch stub receives and forwards to its bound callable.
///
/// Callables get `&mut Arguments`; writes to a by-reference parameter are visible to the
/// caller of [`Instance::invoke`] after the call returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: Vec<Value>,
}

impl Arguments {
    /// Create an empty argument list
    #[must_use]
    pub fn new() -> Self {
        Arguments { values: Vec::new() }
    }

    /// Number of arguments
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no argument was passed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The argument at `index`, if it was passed
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// The argument at `index`, or `Null` when it was not passed
    #[must_use]
    pub fn arg(&self, index: usize) -> &Value {
        self.values.get(index).unwrap_or(&NULL)
    }

    /// Overwrite the argument at `index`, padding with `Null` if needed
    pub fn set(&mut self, index: usize, value: Value) {
        if index >= self.values.len() {
            self.values.resize(index + 1, Value::Null);
        }
        self.values[index] = value;
    }

    /// Append an argument
    pub fn push(&mut self, value: impl Into<Value>) {
        self.values.push(value.into());
    }

    /// Iterate over the arguments
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    /// Consume the list and return the raw values
    #[must_use]
    pub fn into_inner(self) -> Vec<Value> {
        self.values
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.values.truncate(len);
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(values: Vec<Value>) -> Self {
        Arguments { values }
    }
}

impl FromIterator<Value> for Arguments {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Arguments {
            values: iter.into_iter().collect(),
        }
    }
}

impl Index<usize> for Arguments {
    type Output = Value;

    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index]
    }
}

impl IndexMut<usize> for Arguments {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.values[index]
    }
}

impl<'a> IntoIterator for &'a Arguments {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_rendering() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from(-7).to_string(), "-7");
        assert_eq!(Value::from(1.0).to_string(), "1.0");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::from("it's").to_string(), "'it\\'s'");
        assert_eq!(
            Value::from(vec![Value::from(1), Value::from("a"), Value::Array(vec![])]).to_string(),
            "[1, 'a', []]"
        );
    }

    #[test]
    fn test_equality_is_kind_sensitive() {
        assert_eq!(Value::from(1), Value::Int(1));
        assert_ne!(Value::from(1), Value::from(1.0));
        assert_ne!(Value::from("1"), Value::from(1));
        assert_ne!(Value::Null, Value::from(false));
    }

    #[test]
    fn test_callable_equality_is_identity() {
        let callable: Callable = Arc::new(|_args: &mut Arguments| Value::Null);
        let same = Value::Callable(callable.clone());
        let other: Callable = Arc::new(|_args: &mut Arguments| Value::Null);

        assert_eq!(Value::Callable(callable), same);
        assert_ne!(same, Value::Callable(other));
    }

    #[test]
    fn test_literal_check() {
        assert!(Value::from(vec![Value::from(1), Value::Null]).is_literal());

        let callable: Callable = Arc::new(|_args: &mut Arguments| Value::Null);
        assert!(!Value::Callable(callable.clone()).is_literal());
        assert!(!Value::from(vec![Value::Callable(callable)]).is_literal());
    }

    #[test]
    fn test_arguments_access() {
        let mut args: Arguments = vec![Value::from(1)].into();
        assert_eq!(args.len(), 1);
        assert_eq!(args.arg(0), &Value::from(1));
        assert!(args.arg(3).is_null());
        assert!(args.get(3).is_none());

        args.set(2, Value::from("x"));
        assert_eq!(args.len(), 3);
        assert!(args[1].is_null());
        assert_eq!(args[2].as_str(), Some("x"));

        args[0] = Value::from(false);
        assert_eq!(args.arg(0).as_bool(), Some(false));

        args.push(4);
        assert_eq!(args.into_inner().len(), 4);
    }

    #[test]
    fn test_option_conversion() {
        assert!(Value::from(None::<i64>).is_null());
        assert_eq!(Value::from(Some("x")), Value::from("x"));
    }
}
