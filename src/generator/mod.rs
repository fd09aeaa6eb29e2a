//! Anonymous instance generation.
//!
//! The generator turns a contract plus a set of caller supplied implementations into a
//! ready to use [`Instance`] of a freshly synthesized type. Each call:
//!
//! 1. resolves the contract and picks the stereotype (`implements` for interfaces,
//!    `extends` for classes);
//! 2. requires an implementation for every abstract operation, inherited ones included;
//! 3. synthesizes one dispatch stub per contract operation, plus one per supplied
//!    implementation the contract does not declare;
//! 4. loads the type under a unique name and instantiates it;
//! 5. checks every supplied implementation against the contract's signature for the
//!    same name;
//! 6. binds the implementations into the instance's dispatch map.
//!
//! # Key Components
//!
//! - [`Anonymizer`] - The factory, parameterized over resolver/loader and config
//! - [`generate`] - Convenience entry point working on [`TypeRegistry::global`]
//! - [`GeneratorConfig`] - Checks and unbound behavior
//! - [`Implementation`] / [`Implementations`] - What callers supply
//! - [`GeneratedType`] / [`DispatchStub`] - What the generator synthesizes
//! - [`Instance`] - What callers get back
//! - [`GenerationState`] - Pipeline progress, reported through `tracing`
//!
//! # Examples
//!
//! ```rust
//! use anonymizer::{Anonymizer, ContractBuilder, Implementation, Implementations, TypeRegistry};
//!
//! let registry = TypeRegistry::new();
//! ContractBuilder::abstract_class("Point")
//!     .operation("getX", "")?
//!     .operation("getY", "")?
//!     .build(&registry)?;
//!
//! let point = Anonymizer::new(&registry).generate(
//!     Some("Point"),
//!     Implementations::new()
//!         .with("getX", Implementation::returning(5))
//!         .with("getY", Implementation::returning(10)),
//! )?;
//!
//! assert!(point.is_instance_of("Point"));
//! assert_eq!(point.call("getX", vec![])?.as_int(), Some(5));
//! assert_eq!(point.call("getY", vec![])?.as_int(), Some(10));
//! # Ok::<(), anonymizer::Error>(())
//! ```

mod config;
mod implementation;
mod instance;
mod stub;

pub use config::{GeneratorConfig, UnboundBehavior};
pub use implementation::{Callable, Implementation, Implementations};
pub use instance::Instance;
pub use stub::{DispatchStub, GeneratedType, GeneratedTypeRc, Stereotype, StereotypeKind};

use std::{
    fmt::Write,
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

use md5::{Digest, Md5};
use strum::{AsRefStr, Display, EnumIter};
use tracing::{debug, trace, warn};

use crate::{
    contract::OperationDescriptor,
    registry::{ContractResolver, TypeLoader, TypeRegistry},
    Error::{IncompatibleDefinition, MissingImplementation},
    Result,
};

/// Serial of generated types, shared by all generators in the process
static SERIAL: AtomicU64 = AtomicU64::new(1);

/// Progress of a single generation call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, AsRefStr)]
pub enum GenerationState {
    /// Inputs received
    Draft,
    /// Contract resolved, stereotype chosen
    Resolved,
    /// Every required operation has an implementation
    Validated,
    /// Type definition built
    Synthesized,
    /// Type loaded and instantiated
    Instantiated,
    /// Implementations bound, instance returned
    Bound,
    /// Generation stopped with an error
    Failed,
}

/// Tracks the state of one generation call
struct Generation<'a> {
    contract: &'a str,
    state: GenerationState,
}

impl<'a> Generation<'a> {
    fn new(contract: Option<&'a str>) -> Self {
        Generation {
            contract: contract.unwrap_or_default(),
            state: GenerationState::Draft,
        }
    }

    fn advance(&mut self, next: GenerationState) {
        trace!(contract = self.contract, from = %self.state, to = %next, "generation state");
        self.state = next;
    }

    fn fail(&mut self, error: crate::Error) -> crate::Error {
        warn!(contract = self.contract, state = %self.state, error = %error, "generation failed");
        self.state = GenerationState::Failed;
        error
    }
}

/// Factory for anonymous instances
///
/// Holds the resolver/loader to work against (usually a [`TypeRegistry`]) and the
/// [`GeneratorConfig`] generated types are created with.
pub struct Anonymizer<'r, R = TypeRegistry> {
    registry: &'r R,
    config: GeneratorConfig,
}

impl<'r, R> Anonymizer<'r, R>
where
    R: ContractResolver + TypeLoader,
{
    /// Create a generator with the default configuration
    pub fn new(registry: &'r R) -> Self {
        Anonymizer {
            registry,
            config: GeneratorConfig::default(),
        }
    }

    /// Replace the configuration
    #[must_use]
    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    /// The active configuration
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate an instance
    ///
    /// ## Arguments
    /// * 'contract' - Name of the interface or class to fulfil; `None` for a type without
    ///   a contract, which then only has the supplied operations
    /// * 'implementations' - Operation name to implementation mapping
    ///
    /// # Errors
    /// Returns [`crate::Error::ContractNotFound`] for an unknown contract,
    /// [`crate::Error::MissingImplementation`] naming the first abstract operation (in
    /// declaration order) without an implementation, and
    /// [`crate::Error::IncompatibleDefinition`] naming the first implementation whose
    /// parameter list disagrees with the contract.
    pub fn generate(
        &self,
        contract: Option<&str>,
        implementations: Implementations,
    ) -> Result<Instance> {
        let mut generation = Generation::new(contract);

        let (stereotype, operations, ancestors) = match contract {
            Some(name) => {
                let resolved = self
                    .registry
                    .resolve(name)
                    .map_err(|error| generation.fail(error))?;
                let operations = resolved
                    .operations(self.registry)
                    .map_err(|error| generation.fail(error))?;
                let ancestors = resolved
                    .ancestors(self.registry)
                    .map_err(|error| generation.fail(error))?;
                (Stereotype::for_contract(resolved), operations, ancestors)
            }
            None => (Stereotype::Unconstrained, Vec::new(), Vec::new()),
        };
        generation.advance(GenerationState::Resolved);

        if let Some(missing) = operations
            .iter()
            .filter(|operation| operation.is_abstract())
            .find(|operation| !implementations.contains(&operation.name))
        {
            return Err(generation.fail(MissingImplementation(missing.name.clone())));
        }
        generation.advance(GenerationState::Validated);

        let stubs = synthesize_stubs(&operations, &implementations);
        let generated = GeneratedType::new(
            &unique_name(self.config.name_prefix, contract.unwrap_or_default()),
            stereotype,
            stubs,
        )
        .with_ancestors(ancestors)
        .with_config(self.config);
        generation.advance(GenerationState::Synthesized);

        let generated = self
            .registry
            .load(generated)
            .map_err(|error| generation.fail(error))?;
        let instance = self.registry.instantiate(&generated);
        generation.advance(GenerationState::Instantiated);

        if self.config.check_signatures {
            for (name, implementation) in &implementations {
                let declared = operations.iter().find(|operation| &operation.name == name);
                if let Some(declared) = declared {
                    if !implementation.signature().is_compatible(&declared.signature) {
                        return Err(generation.fail(IncompatibleDefinition(name.clone())));
                    }
                }
            }
        }

        for (name, implementation) in implementations {
            instance
                .set_method(&name, implementation)
                .map_err(|error| generation.fail(error))?;
        }
        generation.advance(GenerationState::Bound);

        debug!(
            contract = generation.contract,
            type_name = %generated.name(),
            token = %generated.token(),
            stubs = generated.stubs().len(),
            "generated instance"
        );
        Ok(instance)
    }
}

/// Generate an instance against the process-wide [`TypeRegistry`] with the default
/// configuration
///
/// ## Arguments
/// * 'contract' - Name of the interface or class to fulfil, `None` for no contract
/// * 'implementations' - Operation name to implementation mapping
///
/// # Errors
/// See [`Anonymizer::generate`].
pub fn generate(contract: Option<&str>, implementations: Implementations) -> Result<Instance> {
    Anonymizer::new(TypeRegistry::global()).generate(contract, implementations)
}

/// One stub per contract operation, then one per extra implementation
fn synthesize_stubs(
    operations: &[OperationDescriptor],
    implementations: &Implementations,
) -> Vec<DispatchStub> {
    let mut stubs: Vec<DispatchStub> = operations
        .iter()
        .filter(|operation| operation.is_abstract())
        .chain(operations.iter().filter(|operation| !operation.is_abstract()))
        .map(DispatchStub::for_operation)
        .collect();

    for (name, implementation) in implementations {
        if !operations.iter().any(|operation| &operation.name == name) {
            stubs.push(DispatchStub::extra(name, implementation.signature().clone()));
        }
    }

    for stub in &stubs {
        trace!(operation = %stub.name, flags = ?stub.flags, "synthesized dispatch stub");
    }
    stubs
}

/// `<prefix>_<serial><digest>`, unique for the life of the process
fn unique_name(prefix: &str, contract: &str) -> String {
    let serial = SERIAL.fetch_add(1, Ordering::Relaxed);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());

    let mut hasher = Md5::new();
    hasher.update(prefix.as_bytes());
    hasher.update(contract.as_bytes());
    hasher.update(serial.to_le_bytes());
    hasher.update(nanos.to_le_bytes());
    let digest = hasher.finalize();

    let mut name = format!("{prefix}_{serial:08x}");
    for byte in digest.iter().take(4) {
        let _ = write!(name, "{byte:02x}");
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        contract::ContractBuilder,
        test::register_fixtures,
        value::Value,
        Error,
    };

    #[test]
    fn test_unique_name_format() {
        let first = unique_name("Anonymous", "Point");
        let second = unique_name("Anonymous", "Point");

        assert_ne!(first, second);
        assert!(first.starts_with("Anonymous_"));
        assert_eq!(first.len(), "Anonymous_".len() + 16);
        assert!(first["Anonymous_".len()..]
            .chars()
            .all(|c| c.is_ascii_hexdigit()));
        assert!(unique_name("Proxy", "").starts_with("Proxy_"));
    }

    #[test]
    fn test_stub_order() {
        let registry = TypeRegistry::new();
        register_fixtures(&registry).unwrap();

        let instance = Anonymizer::new(&registry)
            .generate(
                Some("Anonymizer\\AbstractClassWithOneAbstractAndOneConcreteMethod"),
                Implementations::new()
                    .with("b", Implementation::returning(2))
                    .with("extra", Implementation::returning(3)),
            )
            .unwrap();

        let generated = instance.generated_type();
        let stubs = generated.stubs();
        assert_eq!(stubs.len(), 3);
        assert_eq!(stubs[0].name, "b");
        assert!(stubs[0].is_required());
        assert_eq!(stubs[1].name, "a");
        assert!(stubs[1].is_override());
        assert_eq!(stubs[2].name, "extra");
        assert!(stubs[2].is_extra());

        assert!(!instance.is_bound("a").unwrap());
        assert_eq!(instance.call("a", vec![]).unwrap(), Value::Null);
        assert_eq!(instance.call("extra", vec![]).unwrap(), Value::from(3));
    }

    #[test]
    fn test_failure_registers_nothing_before_load() {
        let registry = TypeRegistry::new();
        register_fixtures(&registry).unwrap();

        let result = Anonymizer::new(&registry).generate(
            Some("Anonymizer\\AbstractClassWithOneAbstractMethod"),
            Implementations::new(),
        );
        assert!(matches!(result, Err(Error::MissingImplementation(name)) if name == "a"));
        assert_eq!(registry.generated_count(), 0);
    }

    #[test]
    fn test_own_missing_operation_reported_before_inherited() {
        let registry = TypeRegistry::new();
        ContractBuilder::abstract_class("Parent")
            .operation("first", "")
            .unwrap()
            .build(&registry)
            .unwrap();
        ContractBuilder::abstract_class("Child")
            .extends("Parent")
            .operation("second", "")
            .unwrap()
            .build(&registry)
            .unwrap();

        let generator = Anonymizer::new(&registry);
        let result = generator.generate(Some("Child"), Implementations::new());
        assert!(matches!(result, Err(Error::MissingImplementation(name)) if name == "second"));

        let partial = generator.generate(
            Some("Child"),
            Implementations::new().with("second", Implementation::returning(2)),
        );
        assert!(matches!(partial, Err(Error::MissingImplementation(name)) if name == "first"));
        assert_eq!(registry.generated_count(), 0);
    }

    #[test]
    fn test_config_is_stored_on_type() {
        let registry = TypeRegistry::new();
        ContractBuilder::interface("Strict")
            .operation("run", "")
            .unwrap()
            .build(&registry)
            .unwrap();

        let instance = Anonymizer::new(&registry)
            .with_config(GeneratorConfig::strict().with_name_prefix("Proxy"))
            .generate(
                Some("Strict"),
                Implementations::new().with("run", Implementation::returning(1)),
            )
            .unwrap();

        assert!(instance.type_name().starts_with("Proxy_"));
        assert_eq!(
            instance.generated_type().config().unbound,
            UnboundBehavior::Error
        );
    }

    #[test]
    fn test_minimal_skips_signature_check() {
        let registry = TypeRegistry::new();
        ContractBuilder::interface("Loose")
            .operation("take", "a")
            .unwrap()
            .build(&registry)
            .unwrap();

        let implementations =
            || Implementations::new().with("take", Implementation::returning(1));

        let checked = Anonymizer::new(&registry).generate(Some("Loose"), implementations());
        assert!(matches!(checked, Err(Error::IncompatibleDefinition(name)) if name == "take"));

        let unchecked = Anonymizer::new(&registry)
            .with_config(GeneratorConfig::minimal())
            .generate(Some("Loose"), implementations());
        assert!(unchecked.is_ok());
    }

    #[test]
    fn test_state_names() {
        use strum::IntoEnumIterator;

        let states: Vec<String> = GenerationState::iter().map(|s| s.to_string()).collect();
        assert_eq!(
            states,
            vec!["Draft", "Resolved", "Validated", "Synthesized", "Instantiated", "Bound", "Failed"]
        );
    }
}
