//! Instances of generated types.
//!
//! An [`Instance`] is a cheap handle to one object of a [`GeneratedType`]. It owns the
//! dispatch map from operation names to bound [`Implementation`]s; invoking an operation
//! goes through the type's [`crate::generator::DispatchStub`], which prepares the
//! arguments and forwards to whatever is bound.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, RwLock},
};

use tracing::trace;

use crate::{
    generator::{GeneratedTypeRc, Implementation, UnboundBehavior},
    value::{Arguments, Value},
    Error::{ArgumentType, LockError, MissingArgument, UnboundOperation, UnknownOperation},
    Result,
};

struct InstanceInner {
    generated: GeneratedTypeRc,
    methods: RwLock<HashMap<String, Implementation>>,
}

/// An object of a generated type
///
/// Cloning an `Instance` clones the handle; both handles share the same dispatch map.
#[derive(Clone)]
pub struct Instance {
    inner: Arc<InstanceInner>,
}

impl Instance {
    pub(crate) fn new(generated: GeneratedTypeRc) -> Self {
        Instance {
            inner: Arc::new(InstanceInner {
                generated,
                methods: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// The type this instance belongs to
    #[must_use]
    pub fn generated_type(&self) -> &GeneratedTypeRc {
        &self.inner.generated
    }

    /// The unique name of the generated type
    #[must_use]
    pub fn type_name(&self) -> &str {
        self.inner.generated.name()
    }

    /// Returns `true` if this instance satisfies `name`
    ///
    /// That is the generated type's own name, the contract's name, or the name of any
    /// ancestor of the contract.
    #[must_use]
    pub fn is_instance_of(&self, name: &str) -> bool {
        self.inner.generated.satisfies(name)
    }

    /// Returns `true` if the generated type declares operation `name`
    #[must_use]
    pub fn has_method(&self, name: &str) -> bool {
        self.inner.generated.has_operation(name)
    }

    /// Returns `true` if an implementation is bound to `name`
    ///
    /// # Errors
    /// Returns [`crate::Error::LockError`] if the dispatch table is poisoned.
    pub fn is_bound(&self, name: &str) -> Result<bool> {
        let methods = self.inner.methods.read().map_err(|_| LockError)?;
        Ok(methods.contains_key(name))
    }

    /// Names of all operations of the generated type, in stub order
    pub fn operations(&self) -> impl Iterator<Item = &str> {
        self.inner
            .generated
            .stubs()
            .iter()
            .map(|stub| stub.name.as_str())
    }

    /// Bind (or re-bind) an implementation to an operation
    ///
    /// # Errors
    /// Returns [`crate::Error::UnknownOperation`] if the type has no such operation.
    pub fn set_method(&self, name: &str, implementation: Implementation) -> Result<()> {
        if !self.has_method(name) {
            return Err(self.unknown(name));
        }

        let mut methods = self.inner.methods.write().map_err(|_| LockError)?;
        methods.insert(name.to_string(), implementation);
        Ok(())
    }

    /// Invoke an operation
    ///
    /// Omitted trailing arguments take their declared defaults for the duration of the
    /// call. Writes the implementation makes to passed arguments stay visible in `args`.
    ///
    /// # Errors
    /// Returns [`crate::Error::UnknownOperation`] for an undeclared operation,
    /// [`crate::Error::MissingArgument`] or [`crate::Error::ArgumentType`] if the
    /// arguments do not fit the declaration, and [`crate::Error::UnboundOperation`] if
    /// nothing is bound and the type was generated with [`UnboundBehavior::Error`].
    pub fn invoke(&self, name: &str, args: &mut Arguments) -> Result<Value> {
        let generated = &self.inner.generated;
        let stub = generated.stub(name).ok_or_else(|| self.unknown(name))?;
        let config = generated.config();

        let passed = args.len();
        for param in stub.signature.params.iter().skip(passed) {
            match &param.default {
                Some(default) => args.push(default.clone()),
                None => {
                    args.truncate(passed);
                    return Err(MissingArgument {
                        operation: name.to_string(),
                        parameter: param.name.clone(),
                    });
                }
            }
        }

        if config.check_argument_types {
            for (param, value) in stub.signature.params.iter().zip(args.iter()) {
                if !param.accepts(value) {
                    args.truncate(passed);
                    return Err(ArgumentType {
                        operation: name.to_string(),
                        parameter: param.name.clone(),
                        expected: param
                            .constraint
                            .as_ref()
                            .map_or_else(String::new, ToString::to_string),
                    });
                }
            }
        }

        // Clone out of the lock so the callable may re-enter this instance
        let bound = match self.inner.methods.read() {
            Ok(methods) => methods.get(name).cloned(),
            Err(_) => {
                args.truncate(passed);
                return Err(LockError);
            }
        };

        let result = match bound {
            Some(implementation) => Ok(implementation.call(args)),
            None => match config.unbound {
                UnboundBehavior::Silent => {
                    trace!(type_name = %generated.name(), operation = name, "unbound operation");
                    Ok(Value::Null)
                }
                UnboundBehavior::Error => Err(UnboundOperation(name.to_string())),
            },
        };

        args.truncate(passed);
        result
    }

    /// Invoke an operation with arguments that are not needed afterwards
    ///
    /// # Errors
    /// See [`Instance::invoke`].
    pub fn call(&self, name: &str, args: Vec<Value>) -> Result<Value> {
        self.invoke(name, &mut Arguments::from(args))
    }

    /// Returns `true` if both handles refer to the same object
    #[must_use]
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn unknown(&self, name: &str) -> crate::Error {
        UnknownOperation {
            type_name: self.type_name().to_string(),
            operation: name.to_string(),
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type_name", &self.type_name())
            .field("token", &self.inner.generated.token())
            .finish_non_exhaustive()
    }
}
