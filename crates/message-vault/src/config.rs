//! Vault deployment configuration from environment variables.

use crate::domain::value_objects::{Address, ParseAddressError};
use std::env;
use thiserror::Error;

/// Canonical ERC-4337 v0.7 entry point address.
pub const CANONICAL_ENTRY_POINT: Address = Address::new([
    0x00, 0x00, 0x00, 0x00, 0x71, 0x72, 0x7d, 0xe2, 0x2e, 0x5e, 0x9d, 0x8b, 0xaf, 0x0e, 0xda, 0xc6,
    0xf3, 0x7d, 0xa0, 0x32,
]);

/// Sepolia chain id.
pub const DEFAULT_CHAIN_ID: u64 = 11_155_111;

/// Configuration for deploying one vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultConfig {
    /// Address the vault is deployed at.
    pub vault_address: Address,
    /// Initial owner. Must be non-zero.
    pub owner: Address,
    /// Entry point to configure right after deployment, if any.
    pub entry_point: Option<Address>,
    /// Chain id bound into operation hashes.
    pub chain_id: u64,
    /// Capacity of the committed-event broadcast channel.
    pub event_channel_capacity: usize,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            vault_address: Address::from_low_u8(0x10),
            owner: Address::ZERO,
            entry_point: Some(CANONICAL_ENTRY_POINT),
            chain_id: DEFAULT_CHAIN_ID,
            event_channel_capacity: 1024,
        }
    }
}

impl VaultConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `VAULT_ADDRESS`: Vault address (default: 0x…10)
    /// - `VAULT_OWNER`: Initial owner (default: unset, fails validation)
    /// - `VAULT_ENTRY_POINT`: Entry point, or `none` (default: canonical v0.7)
    /// - `VAULT_CHAIN_ID`: Chain id (default: 11155111)
    /// - `VAULT_EVENT_CAPACITY`: Event channel capacity (default: 1024)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Self::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let vault_address = match lookup("VAULT_ADDRESS") {
            Some(raw) => parse_address("VAULT_ADDRESS", &raw)?,
            None => defaults.vault_address,
        };
        let owner = match lookup("VAULT_OWNER") {
            Some(raw) => parse_address("VAULT_OWNER", &raw)?,
            None => defaults.owner,
        };
        let entry_point = match lookup("VAULT_ENTRY_POINT") {
            Some(raw) if raw.eq_ignore_ascii_case("none") => None,
            Some(raw) => Some(parse_address("VAULT_ENTRY_POINT", &raw)?),
            None => defaults.entry_point,
        };
        let chain_id = match lookup("VAULT_CHAIN_ID") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                key: "VAULT_CHAIN_ID",
                value: raw,
            })?,
            None => defaults.chain_id,
        };
        let event_channel_capacity = match lookup("VAULT_EVENT_CAPACITY") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                key: "VAULT_EVENT_CAPACITY",
                value: raw,
            })?,
            None => defaults.event_channel_capacity,
        };

        Ok(Self {
            vault_address,
            owner,
            entry_point,
            chain_id,
            event_channel_capacity,
        })
    }

    /// Rejects configurations the vault would refuse at deployment.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.vault_address.is_zero() {
            return Err(ConfigError::ZeroVaultAddress);
        }
        if self.owner.is_zero() {
            return Err(ConfigError::ZeroOwner);
        }
        if self.entry_point.is_some_and(|ep| ep.is_zero()) {
            return Err(ConfigError::ZeroEntryPoint);
        }
        if self.event_channel_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }
}

fn parse_address(key: &'static str, raw: &str) -> Result<Address, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|source| ConfigError::InvalidAddress { key, source })
}

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Variable holds something that is not an address.
    #[error("{key}: {source}")]
    InvalidAddress {
        key: &'static str,
        source: ParseAddressError,
    },

    /// Variable holds something that is not a number.
    #[error("{key}: `{value}` is not a valid number")]
    InvalidNumber { key: &'static str, value: String },

    /// Vault address is zero.
    #[error("vault address cannot be zero")]
    ZeroVaultAddress,

    /// Owner is zero or missing.
    #[error("owner must be set to a non-zero address (VAULT_OWNER)")]
    ZeroOwner,

    /// Entry point is the zero address.
    #[error("entry point cannot be the zero address; use `none` to leave it unset")]
    ZeroEntryPoint,

    /// Event channel capacity is zero.
    #[error("event channel capacity must be positive")]
    ZeroCapacity,
}
