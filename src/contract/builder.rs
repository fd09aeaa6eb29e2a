//! Fluent declaration API for contracts.
//!
//! This module provides [`ContractBuilder`] for declaring interfaces, abstract classes and
//! concrete classes together with their operations and parents. The builder validates the
//! declaration against the structural rules of its flavor and registers the resulting
//! [`ContractDescriptor`] in a [`TypeRegistry`].

use std::{collections::HashSet, sync::Arc};

use tracing::debug;

use crate::{
    contract::{
        ContractDescriptor, ContractFlavor, ContractRc, OperationDescriptor, OperationFlags, Token,
    },
    registry::{ContractResolver, TypeRegistry},
    signatures::{parse_method_signature, SignatureMethod},
    Error, Result,
};

/// Operation as declared on the builder, before it is attributed to the contract
struct OperationDefinition {
    name: String,
    signature: SignatureMethod,
    is_abstract: bool,
}

/// High-level builder for contract declarations.
///
/// # Validation
///
/// [`ContractBuilder::build`] enforces:
/// - the contract name and all operation names are non-empty
/// - interfaces declare only abstract operations and only extend interfaces
/// - classes extend at most one class and implement only interfaces
/// - concrete classes neither declare nor inherit abstract operations
/// - every operation name is declared at most once
/// - every parameter default is a literal
/// - every parent is already registered
///
/// # Examples
///
/// ```rust
/// use anonymizer::{ContractBuilder, TypeRegistry};
///
/// let registry = TypeRegistry::new();
/// let contract = ContractBuilder::abstract_class("Point")
///     .operation("getX", "")?
///     .operation("getY", "")?
///     .concrete_operation("describe", "prefix = 'point'")?
///     .build(&registry)?;
///
/// assert_eq!(contract.declared_operations().len(), 3);
/// assert!(!contract.is_interface());
/// # Ok::<(), anonymizer::Error>(())
/// ```
pub struct ContractBuilder {
    name: String,
    flavor: ContractFlavor,
    extends: Vec<String>,
    implements: Vec<String>,
    operations: Vec<OperationDefinition>,
}

impl ContractBuilder {
    fn new(name: &str, flavor: ContractFlavor) -> Self {
        ContractBuilder {
            name: name.to_string(),
            flavor,
            extends: Vec::new(),
            implements: Vec::new(),
            operations: Vec::new(),
        }
    }

    /// Start declaring an interface
    ///
    /// ## Arguments
    /// * 'name' - Fully qualified name of the interface
    #[must_use]
    pub fn interface(name: &str) -> Self {
        Self::new(name, ContractFlavor::Interface)
    }

    /// Start declaring an abstract class
    ///
    /// ## Arguments
    /// * 'name' - Fully qualified name of the class
    #[must_use]
    pub fn abstract_class(name: &str) -> Self {
        Self::new(name, ContractFlavor::Abstract)
    }

    /// Start declaring a concrete class
    ///
    /// ## Arguments
    /// * 'name' - Fully qualified name of the class
    #[must_use]
    pub fn class(name: &str) -> Self {
        Self::new(name, ContractFlavor::Concrete)
    }

    /// Declare an abstract operation from a textual parameter list
    ///
    /// ## Arguments
    /// * 'name' - Operation name
    /// * 'declaration' - Parameter list, e.g. `"array items, &count = 0"`
    ///
    /// # Errors
    /// Returns [`Error::SignatureParse`] if the declaration is malformed.
    pub fn operation(self, name: &str, declaration: &str) -> Result<Self> {
        Ok(self.operation_with_signature(name, parse_method_signature(declaration)?))
    }

    /// Declare a concrete operation from a textual parameter list
    ///
    /// ## Arguments
    /// * 'name' - Operation name
    /// * 'declaration' - Parameter list
    ///
    /// # Errors
    /// Returns [`Error::SignatureParse`] if the declaration is malformed.
    pub fn concrete_operation(self, name: &str, declaration: &str) -> Result<Self> {
        Ok(self.concrete_operation_with_signature(name, parse_method_signature(declaration)?))
    }

    /// Declare an abstract operation with an already built signature
    #[must_use]
    pub fn operation_with_signature(mut self, name: &str, signature: SignatureMethod) -> Self {
        self.operations.push(OperationDefinition {
            name: name.to_string(),
            signature,
            is_abstract: true,
        });
        self
    }

    /// Declare a concrete operation with an already built signature
    #[must_use]
    pub fn concrete_operation_with_signature(
        mut self,
        name: &str,
        signature: SignatureMethod,
    ) -> Self {
        self.operations.push(OperationDefinition {
            name: name.to_string(),
            signature,
            is_abstract: false,
        });
        self
    }

    /// Extend a parent: the base class for classes, a parent interface for interfaces
    #[must_use]
    pub fn extends(mut self, parent: &str) -> Self {
        self.extends.push(parent.to_string());
        self
    }

    /// Implement an interface (classes only)
    #[must_use]
    pub fn implements(mut self, interface: &str) -> Self {
        self.implements.push(interface.to_string());
        self
    }

    /// Validate the declaration and register it
    ///
    /// ## Arguments
    /// * 'registry' - The registry that resolves parents and receives the contract
    ///
    /// # Errors
    /// Returns [`Error::InvalidContract`] or [`Error::DuplicateOperation`] for structural
    /// violations, [`Error::ContractNotFound`] for unknown parents and
    /// [`Error::TypeInsert`] if the name is already taken.
    pub fn build(self, registry: &TypeRegistry) -> Result<ContractRc> {
        if self.name.trim().is_empty() {
            return Err(contract_error!("contract name must not be empty"));
        }

        let (base, interfaces) = self.resolve_parents(registry)?;

        let mut seen = HashSet::new();
        for operation in &self.operations {
            if operation.name.trim().is_empty() {
                return Err(contract_error!(
                    "operation names on {} must not be empty",
                    self.name
                ));
            }
            if !seen.insert(operation.name.as_str()) {
                return Err(Error::DuplicateOperation {
                    contract: self.name.clone(),
                    operation: operation.name.clone(),
                });
            }
            if let Some(param) = operation
                .signature
                .params
                .iter()
                .find(|param| !param.has_literal_default())
            {
                return Err(contract_error!(
                    "default of parameter {} on {}::{} must be a literal",
                    param.name,
                    self.name,
                    operation.name
                ));
            }
            match (self.flavor, operation.is_abstract) {
                (ContractFlavor::Interface, false) => {
                    return Err(contract_error!(
                        "interface {} cannot declare concrete operation {}",
                        self.name,
                        operation.name
                    ))
                }
                (ContractFlavor::Concrete, true) => {
                    return Err(contract_error!(
                        "class {} cannot declare abstract operation {}",
                        self.name,
                        operation.name
                    ))
                }
                _ => {}
            }
        }

        let operations: Vec<OperationDescriptor> = self
            .operations
            .into_iter()
            .map(|operation| OperationDescriptor {
                name: operation.name,
                signature: operation.signature,
                flags: if operation.is_abstract {
                    OperationFlags::ABSTRACT
                } else {
                    OperationFlags::empty()
                },
                declared_by: self.name.clone(),
            })
            .collect();

        let token = registry.next_token(Token::CONTRACT)?;
        let descriptor = ContractDescriptor::new(
            token,
            self.name,
            self.flavor,
            base,
            interfaces,
            operations,
        );

        if descriptor.flavor == ContractFlavor::Concrete {
            if let Some(missing) = descriptor.required_operations(registry)?.first() {
                return Err(contract_error!(
                    "class {} must implement abstract operation {}",
                    descriptor.name,
                    missing.name
                ));
            }
        }

        let contract = Arc::new(descriptor);
        registry.insert_contract(&contract)?;

        debug!(
            contract = %contract.name,
            flavor = %contract.flavor,
            token = %contract.token,
            operations = contract.declared_operations().len(),
            "registered contract"
        );
        Ok(contract)
    }

    /// Check the parent lists against the flavor and the registered contracts
    fn resolve_parents(&self, registry: &TypeRegistry) -> Result<(Option<String>, Vec<String>)> {
        if self.flavor.is_interface() {
            if !self.implements.is_empty() {
                return Err(contract_error!(
                    "interface {} cannot implement other interfaces, use extends",
                    self.name
                ));
            }
            for parent in &self.extends {
                self.expect_parent(registry, parent, true)?;
            }
            return Ok((None, self.extends.clone()));
        }

        if self.extends.len() > 1 {
            return Err(contract_error!(
                "class {} can only extend a single base class",
                self.name
            ));
        }
        for parent in &self.extends {
            self.expect_parent(registry, parent, false)?;
        }
        for interface in &self.implements {
            self.expect_parent(registry, interface, true)?;
        }

        Ok((self.extends.first().cloned(), self.implements.clone()))
    }

    fn expect_parent(&self, registry: &TypeRegistry, parent: &str, interface: bool) -> Result<()> {
        if parent == self.name {
            return Err(contract_error!("{} cannot inherit from itself", self.name));
        }

        let resolved = registry.resolve(parent)?;
        if resolved.is_interface() != interface {
            return Err(contract_error!(
                "{} cannot inherit from {}: expected {}",
                self.name,
                resolved,
                if interface { "an interface" } else { "a class" }
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_interface() {
        let registry = TypeRegistry::new();
        let contract = ContractBuilder::interface("Countable")
            .operation("count", "")
            .unwrap()
            .build(&registry)
            .unwrap();

        assert!(contract.is_interface());
        assert!(contract.token.is_contract());
        assert_eq!(contract.declared_operations()[0].declared_by, "Countable");
        assert!(contract.declared_operations()[0].is_abstract());
        assert!(registry.resolve("Countable").is_ok());
    }

    #[test]
    fn test_interface_rejects_concrete_operation() {
        let registry = TypeRegistry::new();
        let result = ContractBuilder::interface("Broken")
            .concrete_operation("body", "")
            .unwrap()
            .build(&registry);

        assert!(matches!(result, Err(Error::InvalidContract { .. })));
        assert!(registry.resolve("Broken").is_err());
    }

    #[test]
    fn test_concrete_class_rejects_abstract_operation() {
        let registry = TypeRegistry::new();
        let result = ContractBuilder::class("Broken")
            .operation("missing", "")
            .unwrap()
            .build(&registry);
        assert!(matches!(result, Err(Error::InvalidContract { .. })));
    }

    #[test]
    fn test_concrete_class_must_implement_inherited() {
        let registry = TypeRegistry::new();
        ContractBuilder::interface("Runnable")
            .operation("run", "")
            .unwrap()
            .build(&registry)
            .unwrap();

        let result = ContractBuilder::class("Lazy")
            .implements("Runnable")
            .build(&registry);
        assert!(matches!(result, Err(Error::InvalidContract { .. })));

        let worker = ContractBuilder::class("Worker")
            .implements("Runnable")
            .concrete_operation("run", "")
            .unwrap()
            .build(&registry);
        assert!(worker.is_ok());
    }

    #[test]
    fn test_duplicate_operation() {
        let registry = TypeRegistry::new();
        let result = ContractBuilder::interface("Twice")
            .operation("a", "")
            .unwrap()
            .operation("a", "x")
            .unwrap()
            .build(&registry);

        match result {
            Err(Error::DuplicateOperation { contract, operation }) => {
                assert_eq!(contract, "Twice");
                assert_eq!(operation, "a");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_parent() {
        let registry = TypeRegistry::new();
        let result = ContractBuilder::abstract_class("Orphan")
            .extends("Nowhere")
            .build(&registry);
        assert!(matches!(result, Err(Error::ContractNotFound(name)) if name == "Nowhere"));
    }

    #[test]
    fn test_parent_flavor_rules() {
        let registry = TypeRegistry::new();
        ContractBuilder::interface("Iface").build(&registry).unwrap();
        ContractBuilder::abstract_class("Base").build(&registry).unwrap();
        ContractBuilder::abstract_class("Other").build(&registry).unwrap();

        let class_extends_interface = ContractBuilder::abstract_class("A")
            .extends("Iface")
            .build(&registry);
        let class_implements_class = ContractBuilder::abstract_class("B")
            .implements("Base")
            .build(&registry);
        let interface_extends_class = ContractBuilder::interface("C")
            .extends("Base")
            .build(&registry);
        let interface_implements = ContractBuilder::interface("D")
            .implements("Iface")
            .build(&registry);
        let two_bases = ContractBuilder::abstract_class("E")
            .extends("Base")
            .extends("Other")
            .build(&registry);

        for result in [
            class_extends_interface,
            class_implements_class,
            interface_extends_class,
            interface_implements,
            two_bases,
        ] {
            assert!(matches!(result, Err(Error::InvalidContract { .. })));
        }
    }

    #[test]
    fn test_name_taken() {
        let registry = TypeRegistry::new();
        ContractBuilder::interface("Taken").build(&registry).unwrap();
        let result = ContractBuilder::abstract_class("Taken").build(&registry);
        assert!(matches!(result, Err(Error::TypeInsert(_))));
    }

    #[test]
    fn test_empty_names() {
        let registry = TypeRegistry::new();
        assert!(matches!(
            ContractBuilder::interface(" ").build(&registry),
            Err(Error::InvalidContract { .. })
        ));
        assert!(matches!(
            ContractBuilder::interface("Named")
                .operation("", "")
                .unwrap()
                .build(&registry),
            Err(Error::InvalidContract { .. })
        ));
    }

    #[test]
    fn test_signature_parse_error_surfaces() {
        let result = ContractBuilder::interface("Bad").operation("op", "items = ");
        assert!(matches!(result, Err(Error::SignatureParse { .. })));
    }

    #[test]
    fn test_non_literal_default_rejected() {
        use crate::{
            signatures::SignatureParameter,
            value::{Arguments, Value},
        };

        let registry = TypeRegistry::new();
        let mut visitor = SignatureParameter::new("visitor").callable();
        visitor.default = Some(Value::Callable(Arc::new(|_args: &mut Arguments| Value::Null)));

        let result = ContractBuilder::interface("Walker")
            .operation_with_signature("walk", SignatureMethod::new(vec![visitor]))
            .build(&registry);
        assert!(matches!(result, Err(Error::InvalidContract { .. })));
        assert!(!registry.contains("Walker"));
    }
}
