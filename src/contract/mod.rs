//! Contract descriptors: the interfaces and abstract types instances are generated for.
//!
//! A [`ContractDescriptor`] is the declaration-time metadata the generator introspects:
//! whether the contract is an interface, which operations it declares, and each
//! operation's [`SignatureMethod`]. Descriptors are created with a [`ContractBuilder`] and
//! registered in a [`crate::TypeRegistry`]; once registered they are immutable.
//!
//! # Key Components
//!
//! - [`ContractDescriptor`]: A registered interface, abstract class or concrete class
//! - [`ContractFlavor`]: The kind of contract, which decides the generated stereotype
//! - [`OperationDescriptor`]: One declared operation with its signature and flags
//! - [`OperationFlags`]: Abstract / inherited / override markers
//! - [`ContractBuilder`]: Fluent declaration API
//! - [`Token`]: Registry identity of contracts and generated types
//!
//! # Inheritance
//!
//! Contracts may name parents. Classes extend at most one base class and may implement
//! any number of interfaces; interfaces may extend other interfaces. Operation
//! enumeration walks this graph the way reflection lists inherited methods:
//!
//! - The contract's own declarations come first, in declaration order.
//! - Inherited operations follow, parent by parent (base class, then interfaces in
//!   declaration order). A name the contract redeclares is not listed again.
//! - Between inherited entries of the same name, a concrete one replaces an abstract
//!   one in place, so an interface never hides a body from the class chain.
//!
//! # Examples
//!
//! ```rust
//! use anonymizer::{ContractBuilder, TypeRegistry};
//!
//! let registry = TypeRegistry::new();
//! ContractBuilder::interface("Traversable").build(&registry)?;
//! let aggregate = ContractBuilder::interface("IteratorAggregate")
//!     .extends("Traversable")
//!     .operation("getIterator", "")?
//!     .build(&registry)?;
//!
//! let required = aggregate.required_operations(&registry)?;
//! assert_eq!(required.len(), 1);
//! assert_eq!(required[0].name, "getIterator");
//! # Ok::<(), anonymizer::Error>(())
//! ```

mod builder;
mod token;

use std::{fmt, sync::Arc};

use bitflags::bitflags;
use strum::{AsRefStr, Display, EnumIter};

pub use builder::ContractBuilder;
pub use token::Token;

use crate::{registry::ContractResolver, signatures::SignatureMethod, Error::RecursionLimit, Result};

/// Maximum depth of a contract's parent chain
const MAX_INHERITANCE_DEPTH: usize = 64;

/// Reference to a `ContractDescriptor`
pub type ContractRc = Arc<ContractDescriptor>;

/// The kind of a contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ContractFlavor {
    /// Interface: only abstract operations, generated types `implement` it
    Interface,
    /// Abstract class: abstract and concrete operations, generated types `extend` it
    Abstract,
    /// Concrete class: only concrete operations, generated types `extend` it
    Concrete,
}

impl ContractFlavor {
    /// Returns `true` for [`ContractFlavor::Interface`]
    #[must_use]
    pub fn is_interface(&self) -> bool {
        matches!(self, ContractFlavor::Interface)
    }

    /// Returns `true` for both class flavors
    #[must_use]
    pub fn is_class(&self) -> bool {
        !self.is_interface()
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Operation markers, shared by contract operations and dispatch stubs
    pub struct OperationFlags: u32 {
        /// Operation has no body and must be implemented
        const ABSTRACT = 0x0001;
        /// Operation was declared by a parent contract
        const INHERITED = 0x0002;
        /// Dispatch stub overrides a concrete contract operation
        const OVERRIDE = 0x0004;
        /// Dispatch stub exists only because an implementation was supplied
        const EXTRA = 0x0008;
    }
}

/// A single operation declared on a contract
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDescriptor {
    /// Name of the operation, unique within its contract
    pub name: String,
    /// The declared parameter list
    pub signature: SignatureMethod,
    /// Abstract / inherited markers
    pub flags: OperationFlags,
    /// Name of the contract that declared the operation
    pub declared_by: String,
}

impl OperationDescriptor {
    /// Returns `true` if the operation has to be implemented
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.flags.contains(OperationFlags::ABSTRACT)
    }

    /// Returns `true` if the operation was declared by a parent contract
    #[must_use]
    pub fn is_inherited(&self) -> bool {
        self.flags.contains(OperationFlags::INHERITED)
    }
}

impl fmt::Display for OperationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_abstract() {
            f.write_str("abstract ")?;
        }
        write!(f, "{}::{}({})", self.declared_by, self.name, self.signature)
    }
}

/// A registered interface, abstract class or concrete class
#[derive(Debug)]
pub struct ContractDescriptor {
    /// Registry token
    pub token: Token,
    /// Fully qualified name
    pub name: String,
    /// Interface, abstract or concrete
    pub flavor: ContractFlavor,
    /// Base class (classes only)
    pub base: Option<String>,
    /// Implemented interfaces (classes) or extended interfaces (interfaces)
    pub interfaces: Vec<String>,
    /// Operations declared directly on this contract
    operations: Vec<OperationDescriptor>,
}

impl ContractDescriptor {
    pub(crate) fn new(
        token: Token,
        name: String,
        flavor: ContractFlavor,
        base: Option<String>,
        interfaces: Vec<String>,
        operations: Vec<OperationDescriptor>,
    ) -> Self {
        ContractDescriptor {
            token,
            name,
            flavor,
            base,
            interfaces,
            operations,
        }
    }

    /// Returns `true` if this contract is an interface
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.flavor.is_interface()
    }

    /// Operations declared directly on this contract, in declaration order
    #[must_use]
    pub fn declared_operations(&self) -> &[OperationDescriptor] {
        &self.operations
    }

    /// Names of the direct parents: base class first, then interfaces
    pub fn parents(&self) -> impl Iterator<Item = &str> {
        self.base
            .iter()
            .chain(self.interfaces.iter())
            .map(String::as_str)
    }

    /// All operations of this contract, including inherited ones
    ///
    /// # Arguments
    /// * `resolver` - Used to look up parent contracts
    ///
    /// # Errors
    /// Returns an error if a parent cannot be resolved or the parent chain is too deep.
    pub fn operations(&self, resolver: &dyn ContractResolver) -> Result<Vec<OperationDescriptor>> {
        self.collect_operations(resolver, 0)
    }

    /// Operations that must be implemented (all abstract ones, including inherited)
    ///
    /// # Errors
    /// Returns an error if a parent cannot be resolved.
    pub fn required_operations(
        &self,
        resolver: &dyn ContractResolver,
    ) -> Result<Vec<OperationDescriptor>> {
        Ok(self
            .operations(resolver)?
            .into_iter()
            .filter(OperationDescriptor::is_abstract)
            .collect())
    }

    /// Operations with a body that a generated type may override
    ///
    /// # Errors
    /// Returns an error if a parent cannot be resolved.
    pub fn concrete_operations(
        &self,
        resolver: &dyn ContractResolver,
    ) -> Result<Vec<OperationDescriptor>> {
        Ok(self
            .operations(resolver)?
            .into_iter()
            .filter(|operation| !operation.is_abstract())
            .collect())
    }

    /// This contract's name followed by the names of all its ancestors
    ///
    /// # Errors
    /// Returns an error if a parent cannot be resolved.
    pub fn ancestors(&self, resolver: &dyn ContractResolver) -> Result<Vec<String>> {
        let mut names = Vec::new();
        self.collect_ancestors(resolver, &mut names, 0)?;
        Ok(names)
    }

    fn collect_ancestors(
        &self,
        resolver: &dyn ContractResolver,
        names: &mut Vec<String>,
        depth: usize,
    ) -> Result<()> {
        if depth >= MAX_INHERITANCE_DEPTH {
            return Err(RecursionLimit(MAX_INHERITANCE_DEPTH));
        }
        if names.contains(&self.name) {
            return Ok(());
        }

        names.push(self.name.clone());
        for parent in self.parents() {
            resolver
                .resolve(parent)?
                .collect_ancestors(resolver, names, depth + 1)?;
        }
        Ok(())
    }

    fn collect_operations(
        &self,
        resolver: &dyn ContractResolver,
        depth: usize,
    ) -> Result<Vec<OperationDescriptor>> {
        if depth >= MAX_INHERITANCE_DEPTH {
            return Err(RecursionLimit(MAX_INHERITANCE_DEPTH));
        }

        let mut merged = self.operations.clone();
        for parent in self.parents() {
            let parent = resolver.resolve(parent)?;
            for mut operation in parent.collect_operations(resolver, depth + 1)? {
                operation.flags |= OperationFlags::INHERITED;
                merge_inherited(&mut merged, operation);
            }
        }

        Ok(merged)
    }
}

/// Merge an inherited operation; own declarations are kept and a concrete inherited
/// entry wins over an abstract one
fn merge_inherited(merged: &mut Vec<OperationDescriptor>, operation: OperationDescriptor) {
    match merged.iter_mut().find(|existing| existing.name == operation.name) {
        Some(existing) => {
            if existing.is_inherited() && existing.is_abstract() && !operation.is_abstract() {
                *existing = operation;
            }
        }
        None => merged.push(operation),
    }
}

impl fmt::Display for ContractDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self.flavor {
            ContractFlavor::Interface => "interface",
            ContractFlavor::Abstract => "abstract class",
            ContractFlavor::Concrete => "class",
        };
        write!(f, "{keyword} {}", self.name)
    }
}
