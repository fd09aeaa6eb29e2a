//! Generator configuration
//!
//! This module provides the switches that control how strictly the generator checks
//! implementations and how generated instances behave at call time.

use strum::{AsRefStr, Display, EnumIter};

/// What a dispatch stub does when no implementation is bound to it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum UnboundBehavior {
    /// Return [`crate::Value::Null`]
    #[default]
    Silent,
    /// Return [`crate::Error::UnboundOperation`]
    Error,
}

/// Configuration for instance generation
///
/// The configuration in effect when a type is generated is stored with that type, so
/// instances keep the behavior they were created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Reject implementations whose parameter list disagrees with the contract
    /// (recommended: always true)
    pub check_signatures: bool,

    /// Check arguments against parameter constraints on every invocation
    pub check_argument_types: bool,

    /// Behavior of operations without a bound implementation
    pub unbound: UnboundBehavior,

    /// Prefix of generated type names (default: `Anonymous`)
    pub name_prefix: &'static str,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            check_signatures: true,
            check_argument_types: true,
            unbound: UnboundBehavior::Silent,
            name_prefix: "Anonymous",
        }
    }
}

impl GeneratorConfig {
    /// Every check enabled, unbound operations are errors
    #[must_use]
    pub fn strict() -> Self {
        Self {
            unbound: UnboundBehavior::Error,
            ..Self::default()
        }
    }

    /// Signatures are checked at generation time, arguments are not checked per call
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            check_argument_types: false,
            ..Self::default()
        }
    }

    /// No checks beyond the required operations being present
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            check_signatures: false,
            check_argument_types: false,
            ..Self::default()
        }
    }

    /// Use a different prefix for generated type names
    #[must_use]
    pub fn with_name_prefix(mut self, prefix: &'static str) -> Self {
        self.name_prefix = prefix;
        self
    }

    /// Use a different unbound behavior
    #[must_use]
    pub fn with_unbound(mut self, unbound: UnboundBehavior) -> Self {
        self.unbound = unbound;
        self
    }
}
