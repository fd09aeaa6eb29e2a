//! Synthesized type definitions.
//!
//! A [`GeneratedType`] is what the generator hands to the [`crate::TypeLoader`]: a
//! fresh name, the stereotype relation to the contract, and one [`DispatchStub`] per
//! operation. The per-instance dispatch map is not part of the type; it lives in
//! [`crate::Instance`].

use std::{
    collections::{HashMap, HashSet},
    fmt,
    sync::Arc,
};

use strum::{AsRefStr, Display, EnumIter};

use crate::{
    contract::{ContractRc, OperationDescriptor, OperationFlags, Token},
    generator::GeneratorConfig,
    signatures::SignatureMethod,
};

/// Reference to a `GeneratedType`
pub type GeneratedTypeRc = Arc<GeneratedType>;

/// Relation keyword of a generated type to its contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum StereotypeKind {
    /// No contract
    None,
    /// The contract is an interface
    Implements,
    /// The contract is a class
    Extends,
}

/// Relation of a generated type to its contract
#[derive(Debug, Clone)]
pub enum Stereotype {
    /// Generated without a contract
    Unconstrained,
    /// Implements an interface
    Implements(ContractRc),
    /// Extends an abstract or concrete class
    Extends(ContractRc),
}

impl Stereotype {
    /// Pick the stereotype a contract requires
    #[must_use]
    pub fn for_contract(contract: ContractRc) -> Self {
        if contract.is_interface() {
            Stereotype::Implements(contract)
        } else {
            Stereotype::Extends(contract)
        }
    }

    /// The relation keyword
    #[must_use]
    pub fn kind(&self) -> StereotypeKind {
        match self {
            Stereotype::Unconstrained => StereotypeKind::None,
            Stereotype::Implements(_) => StereotypeKind::Implements,
            Stereotype::Extends(_) => StereotypeKind::Extends,
        }
    }

    /// The contract, if any
    #[must_use]
    pub fn contract(&self) -> Option<&ContractRc> {
        match self {
            Stereotype::Unconstrained => None,
            Stereotype::Implements(contract) | Stereotype::Extends(contract) => Some(contract),
        }
    }
}

impl fmt::Display for Stereotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.contract() {
            Some(contract) => write!(f, "{} {}", self.kind(), contract.name),
            None => Ok(()),
        }
    }
}

/// A synthesized operation that forwards to the instance's dispatch map
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchStub {
    /// Operation name
    pub name: String,
    /// Parameter list, copied from the contract or from the implementation
    pub signature: SignatureMethod,
    /// `ABSTRACT` for required operations, `OVERRIDE` for concrete ones, `EXTRA` for
    /// operations the contract does not declare
    pub flags: OperationFlags,
}

impl DispatchStub {
    /// Stub for a contract operation
    #[must_use]
    pub fn for_operation(operation: &OperationDescriptor) -> Self {
        let flags = if operation.is_abstract() {
            OperationFlags::ABSTRACT
        } else {
            OperationFlags::OVERRIDE
        };

        DispatchStub {
            name: operation.name.clone(),
            signature: operation.signature.clone(),
            flags,
        }
    }

    /// Stub for an operation only the implementation set provides
    #[must_use]
    pub fn extra(name: &str, signature: SignatureMethod) -> Self {
        DispatchStub {
            name: name.to_string(),
            signature,
            flags: OperationFlags::EXTRA,
        }
    }

    /// Returns `true` if the stub fulfils a required operation
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.flags.contains(OperationFlags::ABSTRACT)
    }

    /// Returns `true` if the stub overrides a concrete operation
    #[must_use]
    pub fn is_override(&self) -> bool {
        self.flags.contains(OperationFlags::OVERRIDE)
    }

    /// Returns `true` if the contract does not declare the operation
    #[must_use]
    pub fn is_extra(&self) -> bool {
        self.flags.contains(OperationFlags::EXTRA)
    }
}

impl fmt::Display for DispatchStub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.signature)
    }
}

/// A synthesized type definition
#[derive(Debug)]
pub struct GeneratedType {
    token: Token,
    name: String,
    stereotype: Stereotype,
    stubs: Vec<DispatchStub>,
    index: HashMap<String, usize>,
    satisfies: HashSet<String>,
    config: GeneratorConfig,
}

impl GeneratedType {
    /// Create a type definition with a null token and the default configuration
    ///
    /// ## Arguments
    /// * 'name' - Unique type name
    /// * 'stereotype' - Relation to the contract
    /// * 'stubs' - One stub per operation, names must be unique
    #[must_use]
    pub fn new(name: &str, stereotype: Stereotype, stubs: Vec<DispatchStub>) -> Self {
        let index = stubs
            .iter()
            .enumerate()
            .map(|(position, stub)| (stub.name.clone(), position))
            .collect();

        let mut satisfies = HashSet::new();
        satisfies.insert(name.to_string());
        if let Some(contract) = stereotype.contract() {
            satisfies.insert(contract.name.clone());
        }

        GeneratedType {
            token: Token(0),
            name: name.to_string(),
            stereotype,
            stubs,
            index,
            satisfies,
            config: GeneratorConfig::default(),
        }
    }

    /// Set the registry token
    #[must_use]
    pub fn with_token(mut self, token: Token) -> Self {
        self.token = token;
        self
    }

    /// Add ancestor names the type is an instance of
    #[must_use]
    pub fn with_ancestors(mut self, ancestors: impl IntoIterator<Item = String>) -> Self {
        self.satisfies.extend(ancestors);
        self
    }

    /// Set the configuration instances of this type run with
    #[must_use]
    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Registry token
    #[must_use]
    pub fn token(&self) -> Token {
        self.token
    }

    /// Unique type name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Relation to the contract
    #[must_use]
    pub fn stereotype(&self) -> &Stereotype {
        &self.stereotype
    }

    /// The contract, if any
    #[must_use]
    pub fn contract(&self) -> Option<&ContractRc> {
        self.stereotype.contract()
    }

    /// All dispatch stubs, in synthesis order
    #[must_use]
    pub fn stubs(&self) -> &[DispatchStub] {
        &self.stubs
    }

    /// Look up the stub of an operation
    #[must_use]
    pub fn stub(&self, name: &str) -> Option<&DispatchStub> {
        self.index.get(name).map(|&position| &self.stubs[position])
    }

    /// Returns `true` if the type has an operation `name`
    #[must_use]
    pub fn has_operation(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Returns `true` if instances of this type satisfy `name`: the type itself, its
    /// contract or an ancestor of the contract
    #[must_use]
    pub fn satisfies(&self, name: &str) -> bool {
        self.satisfies.contains(name)
    }

    /// Configuration in effect when the type was generated
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }
}

impl fmt::Display for GeneratedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class {}", self.name)?;
        if self.contract().is_some() {
            write!(f, " {}", self.stereotype)?;
        }
        f.write_str(" { ")?;
        for stub in &self.stubs {
            write!(f, "{stub}; ")?;
        }
        f.write_str("}")
    }
}
