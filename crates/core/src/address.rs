use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AddressError;

/// Maximum stored length of an address (`0x` plus 40 hex digits).
pub const MAX_ADDRESS_LEN: usize = 42;

/// A normalized wallet address.
///
/// Addresses are case-insensitive identifiers: parsing lower-cases the input,
/// so `0xABC` and `0xabc` name the same portrait. Only ASCII alphanumerics are
/// accepted, which keeps the derived storage key a single path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parse and normalize a raw address.
    pub fn parse(raw: &str) -> Result<Self, AddressError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AddressError::Empty);
        }
        let len = trimmed.chars().count();
        if len > MAX_ADDRESS_LEN {
            return Err(AddressError::TooLong {
                len,
                max: MAX_ADDRESS_LEN,
            });
        }
        if let Some(bad) = trimmed.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(AddressError::InvalidCharacter(bad));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// The normalized (lower-case) form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}
