//! Operation signatures and their textual declaration format.
//!
//! Every operation a contract declares, and every implementation a caller supplies,
//! carries a [`SignatureMethod`]: the ordered list of its parameters. Each
//! [`SignatureParameter`] records an optional nominal [`TypeConstraint`], whether it is
//! passed by reference, and an optional default value.
//!
//! # Compatibility
//!
//! Two signatures are compatible when their parameter sequences are structurally
//! identical: same arity, and pairwise the same constraint, by-reference flag and
//! default value. Parameter names do not take part in the comparison. This is the
//! check the generator uses to reject an implementation that disagrees with the
//! contract it is supposed to fulfil.
//!
//! # Declaration Format
//!
//! Signatures can be written as text and parsed with [`parse_method_signature`]; the
//! `Display` implementation of [`SignatureMethod`] renders the same format back.
//!
//! ```rust
//! use anonymizer::signatures::{parse_method_signature, TypeConstraint};
//!
//! let signature = parse_method_signature("Countable items, &total = 0")?;
//! assert_eq!(
//!     signature.params[0].constraint,
//!     Some(TypeConstraint::Class("Countable".to_string()))
//! );
//! assert!(signature.params[1].by_ref);
//! assert_eq!(signature.to_string(), "Countable items, &total = 0");
//! # Ok::<(), anonymizer::Error>(())
//! ```

mod parser;
mod types;

pub use parser::*;
pub use types::*;

use crate::Result;

/// Parse a `SignatureMethod` from a textual declaration
///
/// ## Arguments
/// * 'declaration' - The parameter list, without surrounding parentheses
///
/// # Errors
/// Returns an error if the declaration is malformed
pub fn parse_method_signature(declaration: &str) -> Result<SignatureMethod> {
    let mut parser = SignatureParser::new(declaration);
    parser.parse_method_signature()
}

impl SignatureMethod {
    /// Parse a parameter list declaration, see [`parse_method_signature`]
    ///
    /// # Errors
    /// Returns an error if the declaration is malformed
    pub fn parse(declaration: &str) -> Result<Self> {
        parse_method_signature(declaration)
    }
}

impl std::str::FromStr for SignatureMethod {
    type Err = crate::Error;

    fn from_str(declaration: &str) -> Result<Self> {
        parse_method_signature(declaration)
    }
}
