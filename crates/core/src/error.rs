use thiserror::Error;

/// Errors produced when parsing a wallet address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// The address was empty or whitespace.
    #[error("address is empty")]
    Empty,

    /// The address exceeds the maximum stored length.
    #[error("address is {len} characters, maximum is {max}")]
    TooLong {
        /// Actual length.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },

    /// The address contains a character outside ASCII alphanumerics.
    #[error("address contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// Errors produced when parsing a storage key from a retrieval path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// The path was empty.
    #[error("storage key is empty")]
    Empty,

    /// The path contained an empty, `.` or `..` segment, or began with `/`.
    #[error("invalid storage key: {0}")]
    InvalidSegment(String),
}
