//! Central registry for contracts and generated types.
//!
//! This module provides the [`TypeRegistry`], a thread-safe registry holding every
//! registered contract and every type the generator has synthesized. Contract and
//! generated type names share one namespace, so a generated name can never shadow a
//! contract and vice versa.
//!
//! # Key Components
//!
//! - [`TypeRegistry`] - Token indexed storage with a name index on top
//! - [`ContractResolver`] - Name to contract lookup, used by the generator and by
//!   inheritance walks
//! - [`TypeLoader`] - Makes a synthesized [`GeneratedType`] available and instantiates it
//!
//! # Thread Safety
//!
//! - Lock-free primary storage using `SkipMap`
//! - Concurrent name index using `DashMap`; inserting checks and claims a name atomically
//! - Atomic token allocation, one 56-bit row counter per token kind. A counter stops at
//!   [`Token::MAX_ROW`] and never wraps, so a token is never handed out twice
//!
//! Types are never removed. Every generation adds one type for the life of the registry.
//!
//! # Examples
//!
//! ```rust
//! use anonymizer::{ContractBuilder, ContractResolver, TypeRegistry};
//!
//! let registry = TypeRegistry::new();
//! ContractBuilder::interface("Countable").operation("count", "")?.build(&registry)?;
//!
//! let countable = registry.resolve("Countable")?;
//! assert!(countable.is_interface());
//! assert!(registry.get_contract_by_token(&countable.token).is_some());
//! assert!(registry.resolve("Unknown").is_err());
//! # Ok::<(), anonymizer::Error>(())
//! ```

use std::sync::{
    atomic::{AtomicU64, Ordering},
    OnceLock,
};

use crossbeam_skiplist::SkipMap;
use dashmap::{mapref::entry::Entry, DashMap};
use tracing::trace;

use crate::{
    contract::{ContractRc, Token},
    generator::{GeneratedType, GeneratedTypeRc, Instance},
    Error::{ContractNotFound, TypeInsert},
    Result,
};

/// Resolves contract names to their descriptors
pub trait ContractResolver {
    /// Look up a contract by its fully qualified name
    ///
    /// # Errors
    /// Returns [`crate::Error::ContractNotFound`] if no contract with that name exists.
    fn resolve(&self, name: &str) -> Result<ContractRc>;
}

/// Makes synthesized types available for instantiation
pub trait TypeLoader {
    /// Register a synthesized type and return the shared handle to it
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeInsert`] if the type's name is already taken.
    fn load(&self, generated: GeneratedType) -> Result<GeneratedTypeRc>;

    /// Create a fresh instance of a loaded type with nothing bound yet
    fn instantiate(&self, generated: &GeneratedTypeRc) -> Instance {
        Instance::new(generated.clone())
    }
}

/// Registry of contracts and generated types
///
/// Use [`TypeRegistry::global`] for the process-wide registry that the free function
/// [`crate::generate`] works with, or [`TypeRegistry::new`] for an isolated one.
pub struct TypeRegistry {
    /// Declared contracts
    contracts: SkipMap<Token, ContractRc>,
    /// Generated types
    generated: SkipMap<Token, GeneratedTypeRc>,
    /// Name index over both kinds
    names: DashMap<String, Token>,
    next_contract_row: AtomicU64,
    next_generated_row: AtomicU64,
}

impl TypeRegistry {
    /// Create a new, empty registry
    #[must_use]
    pub fn new() -> Self {
        TypeRegistry {
            contracts: SkipMap::new(),
            generated: SkipMap::new(),
            names: DashMap::new(),
            next_contract_row: AtomicU64::new(1),
            next_generated_row: AtomicU64::new(1),
        }
    }

    /// The process-wide registry
    pub fn global() -> &'static TypeRegistry {
        static GLOBAL: OnceLock<TypeRegistry> = OnceLock::new();
        GLOBAL.get_or_init(TypeRegistry::new)
    }

    /// Allocate the next token of the given kind
    ///
    /// ## Arguments
    /// * 'kind' - [`Token::CONTRACT`] or [`Token::GENERATED`]
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeInsert`] once all [`Token::MAX_ROW`] rows of that kind
    /// are taken. The counter is left at its limit.
    pub fn next_token(&self, kind: u8) -> Result<Token> {
        let row = self
            .row_counter(kind)
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |row| {
                (row <= Token::MAX_ROW).then_some(row + 1)
            })
            .map_err(|_| TypeInsert(format!("no tokens left for kind 0x{kind:02x}")))?;

        Ok(Token::from_parts(kind, row))
    }

    fn row_counter(&self, kind: u8) -> &AtomicU64 {
        if kind == Token::GENERATED {
            &self.next_generated_row
        } else {
            &self.next_contract_row
        }
    }

    /// Move the row counter of `kind` so the next token gets `row`
    #[cfg(test)]
    pub(crate) fn set_next_row(&self, kind: u8, row: u64) {
        self.row_counter(kind).store(row, Ordering::Relaxed);
    }

    /// Claim `name` for `token` in the shared name index
    fn claim_name(&self, name: &str, token: Token) -> Result<()> {
        match self.names.entry(name.to_string()) {
            Entry::Occupied(existing) => Err(TypeInsert(format!(
                "{name} is already registered as {}",
                existing.get()
            ))),
            Entry::Vacant(slot) => {
                slot.insert(token);
                Ok(())
            }
        }
    }

    /// Insert a contract
    ///
    /// ## Arguments
    /// * 'contract' - The contract to register
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeInsert`] if the name is already taken.
    pub fn insert_contract(&self, contract: &ContractRc) -> Result<()> {
        self.claim_name(&contract.name, contract.token)?;
        self.contracts.insert(contract.token, contract.clone());
        Ok(())
    }

    /// Look up a contract by token
    pub fn get_contract_by_token(&self, token: &Token) -> Option<ContractRc> {
        self.contracts.get(token).map(|entry| entry.value().clone())
    }

    /// Look up a contract by name
    pub fn get_contract(&self, name: &str) -> Option<ContractRc> {
        let token = *self.names.get(name)?.value();
        self.get_contract_by_token(&token)
    }

    /// Look up a generated type by token
    pub fn get_generated_by_token(&self, token: &Token) -> Option<GeneratedTypeRc> {
        self.generated.get(token).map(|entry| entry.value().clone())
    }

    /// Look up a generated type by name
    pub fn get_generated(&self, name: &str) -> Option<GeneratedTypeRc> {
        let token = *self.names.get(name)?.value();
        self.get_generated_by_token(&token)
    }

    /// Returns `true` if a contract or generated type with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// All registered contracts, in token order
    pub fn contracts(&self) -> Vec<ContractRc> {
        self.contracts
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// All generated types, in token order
    pub fn generated_types(&self) -> Vec<GeneratedTypeRc> {
        self.generated
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Number of registered contracts
    pub fn contract_count(&self) -> usize {
        self.contracts.len()
    }

    /// Number of generated types
    pub fn generated_count(&self) -> usize {
        self.generated.len()
    }

    /// Total number of registered types
    pub fn len(&self) -> usize {
        self.contract_count() + self.generated_count()
    }

    /// Returns `true` if nothing was registered yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ContractResolver for TypeRegistry {
    fn resolve(&self, name: &str) -> Result<ContractRc> {
        self.get_contract(name)
            .ok_or_else(|| ContractNotFound(name.to_string()))
    }
}

impl TypeLoader for TypeRegistry {
    fn load(&self, generated: GeneratedType) -> Result<GeneratedTypeRc> {
        let generated = generated.with_token(self.next_token(Token::GENERATED)?);
        self.claim_name(generated.name(), generated.token())?;

        let generated = GeneratedTypeRc::new(generated);
        self.generated.insert(generated.token(), generated.clone());

        trace!(
            name = %generated.name(),
            token = %generated.token(),
            stubs = generated.stubs().len(),
            "loaded generated type"
        );
        Ok(generated)
    }
}
