use thiserror::Error;

macro_rules! contract_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::InvalidContract {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::InvalidContract {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Generation failures are programmer errors: they are discovered synchronously while a
/// contract is being turned into an instance, they always carry the offending operation
/// name, and retrying with the same inputs fails identically.
///
/// # Error Categories
///
/// ## Generation Errors
/// - [`Error::MissingImplementation`] - A required (abstract) operation was not supplied
/// - [`Error::IncompatibleDefinition`] - A supplied implementation disagrees with the contract
/// - [`Error::ContractNotFound`] - The requested contract is not registered
///
/// ## Contract Declaration Errors
/// - [`Error::InvalidContract`] - A contract declaration violates a structural rule
/// - [`Error::DuplicateOperation`] - The same operation was declared twice on one contract
/// - [`Error::SignatureParse`] - A textual parameter list could not be parsed
/// - [`Error::TypeInsert`] - A type name is already taken in the registry
///
/// ## Invocation Errors
/// - [`Error::UnknownOperation`] - The generated type does not declare the operation
/// - [`Error::UnboundOperation`] - Nothing is bound and the config asks for an error
/// - [`Error::MissingArgument`] - A parameter without default was not passed
/// - [`Error::ArgumentType`] - An argument does not satisfy the parameter constraint
///
/// # Examples
///
/// ```rust
/// use anonymizer::{generate, Error, Implementations, TypeRegistry, ContractBuilder};
///
/// let registry = TypeRegistry::global();
/// ContractBuilder::interface("Doc.Countable")
///     .operation("count", "")?
///     .build(registry)?;
///
/// match generate(Some("Doc.Countable"), Implementations::new()) {
///     Err(Error::MissingImplementation(name)) => assert_eq!(name, "count"),
///     Err(e) => panic!("unexpected error: {e}"),
///     Ok(_) => panic!("generation should have failed"),
/// }
/// # Ok::<(), anonymizer::Error>(())
/// ```
#[derive(Error, Debug)]
pub enum Error {
    // Generation Errors
    /// A required operation of the contract has no supplied implementation.
    ///
    /// Every abstract operation, including the ones inherited from parent contracts,
    /// must be present in the implementation set. The associated value is the name
    /// of the first missing operation in declaration order.
    #[error("Missing implementation for {0}()")]
    MissingImplementation(String),

    /// A supplied implementation's parameter list does not match the contract.
    ///
    /// Compatibility is structural equality of the parameter sequence: arity, type
    /// constraints, by-reference flags and default values. Parameter names are ignored.
    #[error("Incompatible definition for method {0}")]
    IncompatibleDefinition(String),

    /// The contract name could not be resolved.
    ///
    /// Contracts have to be registered through [`crate::ContractBuilder`] before they
    /// can be used as a generation target or as a parent of another contract.
    #[error("Failed to find contract - {0}")]
    ContractNotFound(String),

    // Contract Declaration Errors
    /// The contract declaration is structurally invalid.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of the violated rule
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Invalid contract - {file}:{line}: {message}")]
    InvalidContract {
        /// The message to be printed for the InvalidContract error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An operation was declared more than once on the same contract.
    #[error("Operation {operation} is declared more than once on {contract}")]
    DuplicateOperation {
        /// The contract being declared
        contract: String,
        /// The duplicated operation name
        operation: String,
    },

    /// A textual parameter list could not be parsed.
    ///
    /// # Fields
    ///
    /// * `message` - What the parser expected
    /// * `position` - Byte offset into the declaration
    #[error("Invalid signature at {position}: {message}")]
    SignatureParse {
        /// Description of the problem
        message: String,
        /// Byte offset of the problem within the declaration
        position: usize,
    },

    /// Recursion limit reached.
    ///
    /// Nested array literals in default values are bounded to keep the parser from
    /// overflowing the stack. The associated value shows the limit that was reached.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// Failed to insert a new type into the `TypeRegistry`.
    ///
    /// Raised when a contract or a generated type uses a name that is already taken.
    #[error("Failed to insert new type into TypeRegistry - {0}")]
    TypeInsert(String),

    // Invocation Errors
    /// The generated type does not declare the requested operation.
    #[error("Call to undefined method {type_name}::{operation}()")]
    UnknownOperation {
        /// Name of the generated type
        type_name: String,
        /// Name of the requested operation
        operation: String,
    },

    /// The operation is declared but nothing is bound to it.
    ///
    /// Only returned when [`crate::UnboundBehavior::Error`] is configured; by default an
    /// unbound operation silently returns [`crate::Value::Null`].
    #[error("No implementation bound for {0}()")]
    UnboundOperation(String),

    /// A parameter without default value was not passed.
    #[error("Too few arguments to {operation}(): missing ${parameter}")]
    MissingArgument {
        /// The invoked operation
        operation: String,
        /// The parameter that was not passed
        parameter: String,
    },

    /// An argument does not satisfy the type constraint of its parameter.
    #[error("Argument ${parameter} passed to {operation}() must be of the type {expected}")]
    ArgumentType {
        /// The invoked operation
        operation: String,
        /// The offending parameter
        parameter: String,
        /// The rendered constraint
        expected: String,
    },

    /// Failed to lock target.
    #[error("Failed to lock target")]
    LockError,
}
