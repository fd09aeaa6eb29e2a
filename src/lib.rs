// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # anonymizer
//!
//! Anonymous implementations of interfaces and abstract classes, created at runtime.
//!
//! Given the name of a registered contract and a mapping from operation names to
//! closures, [`generate`] synthesizes a brand-new type that fulfils the contract,
//! instantiates it and binds the closures as its operations. The result is an
//! [`Instance`] that satisfies the contract nominally (`is_instance_of`) and
//! dispatches every operation to the supplied closure.
//!
//! ## Features
//!
//! - **Contract registry** - Interfaces, abstract classes and concrete classes with
//!   inheritance, declared through [`ContractBuilder`]
//! - **Typed signatures** - Parameter constraints, by-reference parameters and default
//!   values, parsed from a compact text form
//! - **Checked generation** - Missing and incompatible implementations are rejected
//!   before an instance escapes
//! - **Thread-safe** - The registry is lock-free for readers, instances are `Send + Sync`
//!
//! ## Quick Start
//!
//! ```rust
//! use anonymizer::prelude::*;
//!
//! let registry = TypeRegistry::new();
//! ContractBuilder::abstract_class("Counter")
//!     .operation("next", "&state")?
//!     .build(&registry)?;
//!
//! let counter = Anonymizer::new(&registry).generate(
//!     Some("Counter"),
//!     Implementations::new().with(
//!         "next",
//!         Implementation::with_signature("&state", |args| {
//!             let next = args.arg(0).as_int().unwrap_or(0) + 1;
//!             args.set(0, Value::from(next));
//!             Value::from(next)
//!         })?,
//!     ),
//! )?;
//!
//! let mut args = Arguments::from(vec![Value::from(41)]);
//! assert_eq!(counter.invoke("next", &mut args)?, Value::from(42));
//! assert_eq!(args[0], Value::from(42));
//! # Ok::<(), anonymizer::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`signatures`] - Parameter lists, type constraints and their text form
//! - [`value`] - Runtime values and argument lists
//! - [`contract`] - Contract descriptors and the declaration builder
//! - [`registry`] - The type registry, contract resolution and type loading
//! - [`generator`] - The generation pipeline, generated types and instances
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Logging
//!
//! The crate emits `tracing` events: contract registration and successful generation
//! at `debug`, pipeline transitions and stub synthesis at `trace`, failed generations
//! at `warn`. No subscriber is installed.

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use anonymizer::prelude::*;
///
/// let registry = TypeRegistry::new();
/// ContractBuilder::interface("Named").operation("name", "")?.build(&registry)?;
/// let named = Anonymizer::new(&registry).generate(
///     Some("Named"),
///     Implementations::new().with("name", Implementation::returning("anonymous")),
/// )?;
/// assert_eq!(named.call("name", vec![])?.as_str(), Some("anonymous"));
/// # Ok::<(), anonymizer::Error>(())
/// ```
pub mod prelude;

pub mod contract;
pub mod generator;
pub mod registry;
pub mod signatures;
pub mod value;

/// `anonymizer` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always
/// [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `anonymizer` Error type
///
/// Covers contract declaration, generation and invocation failures.
pub use error::Error;

pub use contract::{ContractBuilder, ContractDescriptor, ContractFlavor, ContractRc, Token};
pub use generator::{
    generate, Anonymizer, Callable, GenerationState, GeneratorConfig, Implementation,
    Implementations, Instance, UnboundBehavior,
};
pub use registry::{ContractResolver, TypeLoader, TypeRegistry};
pub use value::{Arguments, Value};
