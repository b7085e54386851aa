//! # Value Objects
//!
//! Fixed-width identifiers and byte strings shared by every layer. All of
//! them print as `0x`-prefixed lowercase hex.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use primitive_types::U256;

/// Declares a fixed-width byte newtype with hex formatting.
///
/// `Display` elides the middle (`0x1234abcd…ef01`); `Debug` prints it all.
macro_rules! fixed_bytes {
    ($(#[$meta:meta])* $name:ident, $len:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// All zero bytes.
            pub const ZERO: Self = Self([0u8; $len]);

            /// Wraps raw bytes.
            #[must_use]
            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Raw bytes.
            #[must_use]
            pub const fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// True when every byte is zero.
            #[must_use]
            pub fn is_zero(&self) -> bool {
                *self == Self::ZERO
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let head = hex::encode(&self.0[..4]);
                let tail = hex::encode(&self.0[$len - 2..]);
                write!(f, "0x{head}\u{2026}{tail}")
            }
        }
    };
}

// =============================================================================
// ADDRESS (20 bytes)
// =============================================================================

fixed_bytes!(
    /// Account or contract address.
    Address,
    20
);

impl Address {
    /// Address whose last byte is `n` and every other byte zero.
    #[must_use]
    pub const fn from_low_u8(n: u8) -> Self {
        let mut bytes = [0u8; 20];
        bytes[19] = n;
        Self(bytes)
    }

    /// `None` unless `slice` is exactly 20 bytes.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        <[u8; 20]>::try_from(slice).ok().map(Self)
    }

    /// Left-pads the address into a 32-byte ABI word.
    #[must_use]
    pub fn to_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(&self.0);
        word
    }
}

/// Error parsing a hex address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid address `{0}`: expected 20 hex-encoded bytes")]
pub struct ParseAddressError(pub String);

impl FromStr for Address {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        hex::decode(digits)
            .ok()
            .and_then(|decoded| Self::from_slice(&decoded))
            .ok_or_else(|| ParseAddressError(s.to_string()))
    }
}

// =============================================================================
// HASH (32 bytes)
// =============================================================================

fixed_bytes!(
    /// Keccak-256 digest.
    Hash,
    32
);

// =============================================================================
// SELECTOR (4 bytes)
// =============================================================================

/// Leading four bytes of call data naming the target function.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selector(pub [u8; 4]);

impl Selector {
    /// Length of a selector in bytes.
    pub const LEN: usize = 4;

    /// Reads the selector off the front of `call_data`.
    ///
    /// Returns `None` when fewer than four bytes are present.
    #[must_use]
    pub fn from_call_data(call_data: &[u8]) -> Option<Self> {
        let head = call_data.get(..Self::LEN)?;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(head);
        Some(Self(bytes))
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

// =============================================================================
// BYTES (variable length)
// =============================================================================

/// Variable-length byte vector for call data, return data and signatures.
#[derive(Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
    /// Zero-length bytes.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Copies `slice`.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Self {
        Self(slice.to_vec())
    }

    /// Unwraps the vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    /// Borrowed view.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for zero-length bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.len() <= 8 {
            write!(f, "0x{}", hex::encode(&self.0))
        } else {
            write!(f, "0x{}..({} bytes)", hex::encode(&self.0[..4]), self.0.len())
        }
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(vec: Vec<u8>) -> Self {
        Self(vec)
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

// =============================================================================
// TESTS
// =============================================================================
