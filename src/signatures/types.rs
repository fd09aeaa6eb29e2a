use std::fmt;

use crate::{value::Value, Result};

/// Nominal type constraint of a parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeConstraint {
    /// Only [`Value::Array`] is accepted
    Array,
    /// Only [`Value::Callable`] is accepted
    Callable,
    /// Only instances that satisfy the named contract (or generated type) are accepted
    Class(String),
}

impl TypeConstraint {
    /// Check if a runtime value satisfies this constraint
    ///
    /// `null` is never accepted here; a parameter whose default value is `null` admits it,
    /// which is decided by [`SignatureParameter::accepts`].
    ///
    /// # Arguments
    /// * `value` - The value to check
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (TypeConstraint::Array, Value::Array(_))
            | (TypeConstraint::Callable, Value::Callable(_)) => true,
            (TypeConstraint::Class(name), Value::Object(instance)) => instance.is_instance_of(name),
            _ => false,
        }
    }
}

impl fmt::Display for TypeConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeConstraint::Array => f.write_str("array"),
            TypeConstraint::Callable => f.write_str("callable"),
            TypeConstraint::Class(name) => f.write_str(name),
        }
    }
}

/// A single parameter of an operation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SignatureParameter {
    /// Name of the parameter (diagnostics only, not part of compatibility)
    pub name: String,
    /// Optional nominal type constraint
    pub constraint: Option<TypeConstraint>,
    /// Parameter is passed by reference
    pub by_ref: bool,
    /// Default value used when the argument is omitted
    pub default: Option<Value>,
}

impl SignatureParameter {
    /// Create an unconstrained by-value parameter without default
    ///
    /// ## Arguments
    /// * 'name' - The name of the parameter
    #[must_use]
    pub fn new(name: &str) -> Self {
        SignatureParameter {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Constrain the parameter to arrays
    #[must_use]
    pub fn array(mut self) -> Self {
        self.constraint = Some(TypeConstraint::Array);
        self
    }

    /// Constrain the parameter to callables
    #[must_use]
    pub fn callable(mut self) -> Self {
        self.constraint = Some(TypeConstraint::Callable);
        self
    }

    /// Constrain the parameter to instances of `class`
    ///
    /// ## Arguments
    /// * 'class' - Name of the contract the argument has to satisfy
    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        self.constraint = Some(TypeConstraint::Class(class.to_string()));
        self
    }

    /// Pass the parameter by reference
    #[must_use]
    pub fn by_ref(mut self) -> Self {
        self.by_ref = true;
        self
    }

    /// Give the parameter a default value
    ///
    /// ## Arguments
    /// * 'value' - The default value, a literal that the declaration grammar can express
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidContract`] for objects, callables and arrays holding
    /// either of them.
    pub fn default_value(mut self, value: impl Into<Value>) -> Result<Self> {
        let value = value.into();
        if !value.is_literal() {
            return Err(contract_error!(
                "default of parameter {} must be a literal, not {}",
                self.name,
                value.kind()
            ));
        }
        self.default = Some(value);
        Ok(self)
    }

    /// Returns `true` if the default value, if any, can be written as a literal
    #[must_use]
    pub fn has_literal_default(&self) -> bool {
        self.default.as_ref().map_or(true, Value::is_literal)
    }

    /// Returns `true` if the parameter has a default value
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }

    /// Structural equality, ignoring the parameter name
    #[must_use]
    pub fn matches(&self, other: &SignatureParameter) -> bool {
        self.constraint == other.constraint
            && self.by_ref == other.by_ref
            && self.default == other.default
    }

    /// Check if `value` may be passed for this parameter
    ///
    /// Unconstrained parameters accept anything. A `null` argument is accepted by a
    /// constrained parameter only when its default value is `null`.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        match &self.constraint {
            None => true,
            Some(_) if value.is_null() => matches!(self.default, Some(Value::Null)),
            Some(constraint) => constraint.accepts(value),
        }
    }
}

impl fmt::Display for SignatureParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(constraint) = &self.constraint {
            write!(f, "{constraint} ")?;
        }
        if self.by_ref {
            f.write_str("&")?;
        }
        f.write_str(&self.name)?;
        if let Some(default) = &self.default {
            write!(f, " = {default}")?;
        }
        Ok(())
    }
}

/// The ordered parameter list of an operation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SignatureMethod {
    /// The parameters of this operation
    pub params: Vec<SignatureParameter>,
}

impl SignatureMethod {
    /// Create a signature from a list of parameters
    ///
    /// ## Arguments
    /// * 'params' - The parameters, in declaration order
    #[must_use]
    pub fn new(params: Vec<SignatureParameter>) -> Self {
        SignatureMethod { params }
    }

    /// Append a parameter
    #[must_use]
    pub fn param(mut self, param: SignatureParameter) -> Self {
        self.params.push(param);
        self
    }

    /// Number of declared parameters
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns `true` if no parameter is declared
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Check whether two parameter lists are compatible.
    ///
    /// Two lists are compatible when they have the same arity and every parameter pair
    /// agrees on type constraint, by-reference flag and default value.
    #[must_use]
    pub fn is_compatible(&self, other: &SignatureMethod) -> bool {
        self.params.len() == other.params.len()
            && self
                .params
                .iter()
                .zip(other.params.iter())
                .all(|(left, right)| left.matches(right))
    }
}

impl fmt::Display for SignatureMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, param) in self.params.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        Ok(())
    }
}

impl From<Vec<SignatureParameter>> for SignatureMethod {
    fn from(params: Vec<SignatureParameter>) -> Self {
        SignatureMethod { params }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{generator::Callable, value::Arguments, Error};
    use std::sync::Arc;

    #[test]
    fn test_render_parameters() {
        let signature = SignatureMethod::new(vec![
            SignatureParameter::new("items").array().by_ref(),
            SignatureParameter::new("visitor").class("Visitor"),
            SignatureParameter::new("depth").default_value(3).unwrap(),
            SignatureParameter::new("label").default_value(Value::Null).unwrap(),
        ]);

        assert_eq!(
            signature.to_string(),
            "array &items, Visitor visitor, depth = 3, label = null"
        );
        assert_eq!(SignatureMethod::default().to_string(), "");
    }

    #[test]
    fn test_compatibility_ignores_names() {
        let left = SignatureMethod::new(vec![SignatureParameter::new("a").array()]);
        let right = SignatureMethod::new(vec![SignatureParameter::new("b").array()]);
        assert!(left.is_compatible(&right));
    }

    #[test]
    fn test_compatibility_detects_differences() {
        let base = SignatureMethod::new(vec![SignatureParameter::new("a")]);

        let by_ref = SignatureMethod::new(vec![SignatureParameter::new("a").by_ref()]);
        let constrained = SignatureMethod::new(vec![SignatureParameter::new("a").callable()]);
        let defaulted =
            SignatureMethod::new(vec![SignatureParameter::new("a").default_value(1).unwrap()]);
        let longer = base.clone().param(SignatureParameter::new("b"));

        assert!(!base.is_compatible(&by_ref));
        assert!(!base.is_compatible(&constrained));
        assert!(!base.is_compatible(&defaulted));
        assert!(!base.is_compatible(&longer));
        assert!(!base.is_compatible(&SignatureMethod::default()));
        assert!(base.is_compatible(&base.clone()));
    }

    fn callable_default() -> Callable {
        Arc::new(|_args: &mut Arguments| Value::Null)
    }

    #[test]
    fn test_default_must_be_literal() {
        let listed = SignatureParameter::new("flags")
            .default_value(vec![Value::from(1), Value::Null])
            .unwrap();
        assert!(listed.has_literal_default());

        for value in [
            Value::Callable(callable_default()),
            Value::from(vec![Value::Callable(callable_default())]),
        ] {
            assert!(matches!(
                SignatureParameter::new("visitor").default_value(value),
                Err(Error::InvalidContract { .. })
            ));
        }

        let mut forced = SignatureParameter::new("visitor");
        forced.default = Some(Value::from(vec![Value::Callable(callable_default())]));
        assert!(!forced.has_literal_default());
        assert!(SignatureParameter::new("plain").has_literal_default());
    }

    #[test]
    fn test_parameter_accepts() {
        let untyped = SignatureParameter::new("x");
        assert!(untyped.accepts(&Value::Null));
        assert!(untyped.accepts(&Value::from(3)));

        let array = SignatureParameter::new("x").array();
        assert!(array.accepts(&Value::Array(vec![])));
        assert!(!array.accepts(&Value::from("no")));
        assert!(!array.accepts(&Value::Null));

        let nullable = SignatureParameter::new("x")
            .array()
            .default_value(Value::Null)
            .unwrap();
        assert!(nullable.accepts(&Value::Null));
    }
}
