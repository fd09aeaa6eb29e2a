//! Caller supplied implementations.
//!
//! An [`Implementation`] pairs a callable with the parameter list it accepts. The
//! generator compares that list against the contract's declaration for the same
//! operation name; an implementation created without a declaration has an empty list.
//! [`Implementations`] is the name keyed set handed to [`crate::generate`].

use std::{
    collections::{btree_map, BTreeMap},
    fmt,
    sync::Arc,
};

use crate::{
    signatures::{parse_method_signature, SignatureMethod},
    value::{Arguments, Value},
    Result,
};

/// A shareable callable that receives the invocation arguments
///
/// Arguments are passed by mutable reference; writes to by-reference parameters are
/// visible to the caller after the call returns.
pub type Callable = Arc<dyn Fn(&mut Arguments) -> Value + Send + Sync>;

/// A callable together with its declared parameter list
#[derive(Clone)]
pub struct Implementation {
    signature: SignatureMethod,
    callable: Callable,
}

impl Implementation {
    /// Wrap a closure that takes no declared parameters
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&mut Arguments) -> Value + Send + Sync + 'static,
    {
        Self::from_parts(SignatureMethod::default(), Arc::new(body))
    }

    /// Wrap a closure and declare its parameter list
    ///
    /// ## Arguments
    /// * 'declaration' - The parameter list, e.g. `"array items, &count = 0"`
    /// * 'body' - The closure to call
    ///
    /// # Errors
    /// Returns [`crate::Error::SignatureParse`] if the declaration is malformed.
    pub fn with_signature<F>(declaration: &str, body: F) -> Result<Self>
    where
        F: Fn(&mut Arguments) -> Value + Send + Sync + 'static,
    {
        Ok(Self::from_parts(
            parse_method_signature(declaration)?,
            Arc::new(body),
        ))
    }

    /// Build an implementation from a prebuilt signature and callable
    #[must_use]
    pub fn from_parts(signature: SignatureMethod, callable: Callable) -> Self {
        Implementation {
            signature,
            callable,
        }
    }

    /// An implementation without parameters that always returns `value`
    pub fn returning(value: impl Into<Value>) -> Self {
        let value = value.into();
        Self::new(move |_| value.clone())
    }

    /// The declared parameter list
    #[must_use]
    pub fn signature(&self) -> &SignatureMethod {
        &self.signature
    }

    /// The wrapped callable
    #[must_use]
    pub fn callable(&self) -> &Callable {
        &self.callable
    }

    /// Call the implementation
    pub fn call(&self, args: &mut Arguments) -> Value {
        (self.callable)(args)
    }
}

impl fmt::Debug for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Implementation({})", self.signature)
    }
}

/// Operation name to implementation mapping
///
/// Iteration is ordered by operation name.
#[derive(Debug, Clone, Default)]
pub struct Implementations {
    entries: BTreeMap<String, Implementation>,
}

impl Implementations {
    /// Create an empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an implementation, builder style
    #[must_use]
    pub fn with(mut self, name: &str, implementation: Implementation) -> Self {
        self.insert(name, implementation);
        self
    }

    /// Add an implementation, returning the one it replaced
    pub fn insert(&mut self, name: &str, implementation: Implementation) -> Option<Implementation> {
        self.entries.insert(name.to_string(), implementation)
    }

    /// Look up the implementation for an operation
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Implementation> {
        self.entries.get(name)
    }

    /// Returns `true` if an implementation for `name` was supplied
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of supplied implementations
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was supplied
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, implementation)` pairs
    pub fn iter(&self) -> btree_map::Iter<'_, String, Implementation> {
        self.entries.iter()
    }
}

impl<S: Into<String>> FromIterator<(S, Implementation)> for Implementations {
    fn from_iter<I: IntoIterator<Item = (S, Implementation)>>(iter: I) -> Self {
        Implementations {
            entries: iter
                .into_iter()
                .map(|(name, implementation)| (name.into(), implementation))
                .collect(),
        }
    }
}

impl IntoIterator for Implementations {
    type Item = (String, Implementation);
    type IntoIter = btree_map::IntoIter<String, Implementation>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Implementations {
    type Item = (&'a String, &'a Implementation);
    type IntoIter = btree_map::Iter<'a, String, Implementation>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
