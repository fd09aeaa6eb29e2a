//! # anonymizer Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the anonymizer library.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all anonymizer operations
pub use crate::Error;

/// The result type used throughout anonymizer
pub use crate::Result;

/// Configuration for instance generation
pub use crate::{GeneratorConfig, UnboundBehavior};

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Instance generation
pub use crate::{generate, Anonymizer, GenerationState};

/// Supplied implementations
pub use crate::{Callable, Implementation, Implementations};

/// Generated types and their instances
pub use crate::generator::{DispatchStub, GeneratedType, GeneratedTypeRc, Instance, Stereotype};

// ================================================================================================
// Contracts and Registry
// ================================================================================================

/// Contract declaration and metadata
pub use crate::contract::{
    ContractBuilder, ContractDescriptor, ContractFlavor, ContractRc, OperationDescriptor,
    OperationFlags, Token,
};

/// Type registry and its seams
pub use crate::registry::{ContractResolver, TypeLoader, TypeRegistry};

// ================================================================================================
// Signatures and Values
// ================================================================================================

/// Parameter lists and constraints
pub use crate::signatures::{
    parse_method_signature, SignatureMethod, SignatureParameter, TypeConstraint,
};

/// Runtime values
pub use crate::value::{Arguments, Value};
