//! Signing helpers for tests.

use crate::domain::ecdsa::address_from_pubkey;
use crate::domain::eip191::to_eth_signed_message_hash;
use crate::domain::entities::{Address, EcdsaSignature, Hash, SIGNATURE_LENGTH};
use k256::ecdsa::{RecoveryId, SigningKey, VerifyingKey};

/// Generate a new random ECDSA keypair.
pub fn generate_keypair() -> (SigningKey, VerifyingKey) {
    let signing_key = SigningKey::random(&mut rand::thread_rng());
    let verifying_key = *signing_key.verifying_key();
    (signing_key, verifying_key)
}

/// Build a signing key from a fixed secret, for reproducible fixtures.
pub fn signing_key_from_seed(seed: u8) -> SigningKey {
    let mut secret = [0u8; 32];
    secret[0] = 0x01;
    secret[31] = seed.max(1);
    SigningKey::from_slice(&secret).expect("seeded secret is a valid scalar")
}

/// Address controlled by `key`.
pub fn address_of(key: &SigningKey) -> Address {
    address_from_pubkey(key.verifying_key())
}

/// Sign a prehashed message as a low-S signature with `v` in {27, 28}.
pub fn sign(message_hash: &Hash, private_key: &SigningKey) -> EcdsaSignature {
    let (signature, recovery_id) = private_key
        .sign_prehash_recoverable(message_hash)
        .expect("signing failed");

    // Negating S mirrors R's y coordinate
    let (signature, recovery_id) = match signature.normalize_s() {
        Some(low) => (low, RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced())),
        None => (signature, recovery_id),
    };

    let bytes = signature.to_bytes();
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&bytes[..32]);
    s.copy_from_slice(&bytes[32..]);

    EcdsaSignature {
        r,
        s,
        v: 27 + recovery_id.to_byte(),
    }
}

/// EIP-191 personal-sign over a 32-byte digest, serialized as 65 bytes.
pub fn personal_sign(digest: &Hash, private_key: &SigningKey) -> [u8; SIGNATURE_LENGTH] {
    sign(&to_eth_signed_message_hash(digest), private_key).to_bytes()
}
