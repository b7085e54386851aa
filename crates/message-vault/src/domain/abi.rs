//! # Call Data Codec
//!
//! Solidity ABI encoding for the two functions an operation may target, so
//! a dispatcher can turn `UserOperation::call_data` into a [`VaultCall`].
//!
//! Only the layouts the vault needs are supported: a single `string`, the
//! `(address, uint256, bytes)` triple, and a single `uint256`.

use crate::domain::entities::VaultCall;
use crate::domain::policy::{EXECUTE_SELECTOR, SEND_MESSAGE_SELECTOR};
use crate::domain::services::u256_word;
use crate::domain::value_objects::{Address, Bytes, Selector, U256};
use crate::errors::AbiError;

const WORD: usize = 32;

// =============================================================================
// ENCODING
// =============================================================================

/// Call data for `sendMessageToWallet(content)`.
#[must_use]
pub fn encode_send_message(content: &str) -> Bytes {
    let mut out = Vec::with_capacity(Selector::LEN + 3 * WORD + content.len());
    out.extend_from_slice(&SEND_MESSAGE_SELECTOR.0);
    out.extend_from_slice(&u256_word(U256::from(WORD)));
    push_dynamic(&mut out, content.as_bytes());
    Bytes(out)
}

/// Call data for `execute(target, value, data)`.
#[must_use]
pub fn encode_execute(target: Address, value: U256, data: &[u8]) -> Bytes {
    let mut out = Vec::with_capacity(Selector::LEN + 5 * WORD + data.len());
    out.extend_from_slice(&EXECUTE_SELECTOR.0);
    out.extend_from_slice(&target.to_word());
    out.extend_from_slice(&u256_word(value));
    out.extend_from_slice(&u256_word(U256::from(3 * WORD)));
    push_dynamic(&mut out, data);
    Bytes(out)
}

/// Call data for any `f(uint256)`.
#[must_use]
pub fn encode_uint_call(selector: Selector, value: U256) -> Bytes {
    let mut out = Vec::with_capacity(Selector::LEN + WORD);
    out.extend_from_slice(&selector.0);
    out.extend_from_slice(&u256_word(value));
    Bytes(out)
}

/// Return data for a single `uint256`.
#[must_use]
pub fn encode_uint(value: U256) -> Bytes {
    Bytes(u256_word(value).to_vec())
}

fn push_dynamic(out: &mut Vec<u8>, data: &[u8]) {
    out.extend_from_slice(&u256_word(U256::from(data.len())));
    out.extend_from_slice(data);
    let padding = data.len().div_ceil(WORD) * WORD - data.len();
    out.resize(out.len() + padding, 0);
}

// =============================================================================
// DECODING
// =============================================================================

/// Decodes call data into the vault call it names.
pub fn decode_call(call_data: &[u8]) -> Result<VaultCall, AbiError> {
    let selector = Selector::from_call_data(call_data).ok_or(AbiError::MissingSelector)?;
    let args = &call_data[Selector::LEN..];

    if selector == SEND_MESSAGE_SELECTOR {
        let content = String::from_utf8(read_dynamic(args, 0)?.to_vec())
            .map_err(|_| AbiError::InvalidUtf8)?;
        Ok(VaultCall::SendMessage { content })
    } else if selector == EXECUTE_SELECTOR {
        Ok(VaultCall::Execute {
            target: read_address(args, 0)?,
            value: read_uint(args, WORD)?,
            data: Bytes::from_slice(read_dynamic(args, 2 * WORD)?),
        })
    } else {
        Err(AbiError::UnknownSelector(selector))
    }
}

/// Decodes the single `uint256` argument of `f(uint256)` call data.
pub fn decode_uint_arg(call_data: &[u8]) -> Result<U256, AbiError> {
    let args = call_data.get(Selector::LEN..).ok_or(AbiError::MissingSelector)?;
    read_uint(args, 0)
}

fn word_at(args: &[u8], offset: usize) -> Result<&[u8], AbiError> {
    let end = offset.checked_add(WORD).ok_or(AbiError::OffsetOverflow)?;
    args.get(offset..end).ok_or(AbiError::Truncated {
        needed: end,
        available: args.len(),
    })
}

fn read_uint(args: &[u8], offset: usize) -> Result<U256, AbiError> {
    Ok(U256::from_big_endian(word_at(args, offset)?))
}

fn read_usize(args: &[u8], offset: usize) -> Result<usize, AbiError> {
    let value = read_uint(args, offset)?;
    if value.bits() > 64 {
        return Err(AbiError::OffsetOverflow);
    }
    usize::try_from(value.as_u64()).map_err(|_| AbiError::OffsetOverflow)
}

fn read_address(args: &[u8], offset: usize) -> Result<Address, AbiError> {
    let word = word_at(args, offset)?;
    if word[..12].iter().any(|b| *b != 0) {
        return Err(AbiError::DirtyAddress);
    }
    Address::from_slice(&word[12..]).ok_or(AbiError::DirtyAddress)
}

/// Follows the head word at `head` to a length-prefixed byte string.
fn read_dynamic(args: &[u8], head: usize) -> Result<&[u8], AbiError> {
    let offset = read_usize(args, head)?;
    let len = read_usize(args, offset)?;
    let start = offset.checked_add(WORD).ok_or(AbiError::OffsetOverflow)?;
    let end = start.checked_add(len).ok_or(AbiError::OffsetOverflow)?;
    args.get(start..end).ok_or(AbiError::Truncated {
        needed: end,
        available: args.len(),
    })
}

// =============================================================================
// TESTS
// =============================================================================
