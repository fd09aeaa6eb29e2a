use std::fmt;
use std::hash::{Hash, Hasher};

/// A registry token identifying a contract or a generated type.
///
/// Tokens consist of a 64-bit value where:
/// - The high byte (bits 56-63) indicates the kind of type ([`Token::CONTRACT`] or [`Token::GENERATED`])
/// - The low 56 bits (bits 0-55) indicate the row within that kind
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Token(pub u64);

impl Token {
    /// Kind byte of declared contracts
    pub const CONTRACT: u8 = 0x01;
    /// Kind byte of generated types
    pub const GENERATED: u8 = 0x02;
    /// Largest row that fits into a token
    pub const MAX_ROW: u64 = 0x00FF_FFFF_FFFF_FFFF;

    /// Creates a new token from a raw 64-bit value
    #[must_use]
    pub fn new(value: u64) -> Self {
        Token(value)
    }

    /// Creates a token from its kind byte and row
    #[must_use]
    pub fn from_parts(kind: u8, row: u64) -> Self {
        Token((u64::from(kind) << 56) | (row & Self::MAX_ROW))
    }

    /// Returns the raw token value
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Extracts the kind byte from the token (high byte)
    #[must_use]
    pub fn kind(&self) -> u8 {
        (self.0 >> 56) as u8
    }

    /// Extracts the row from the token (low 56 bits)
    #[must_use]
    pub fn row(&self) -> u64 {
        self.0 & Self::MAX_ROW
    }

    /// Returns true if this token identifies a declared contract
    #[must_use]
    pub fn is_contract(&self) -> bool {
        self.kind() == Self::CONTRACT
    }

    /// Returns true if this token identifies a generated type
    #[must_use]
    pub fn is_generated(&self) -> bool {
        self.kind() == Self::GENERATED
    }

    /// Returns true if this is a null token (value 0)
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for Token {
    fn from(value: u64) -> Self {
        Token(value)
    }
}

impl From<Token> for u64 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:016x}, kind: 0x{:02x}, row: {})",
            self.0,
            self.kind(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016x}", self.0)
    }
}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}
