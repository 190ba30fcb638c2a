//! Authenticated encryption for confidential bridge state
//!
//! Signing (see `state`) makes client-carried state tamper-evident;
//! this module is the companion primitive for state that must also be
//! unreadable by the client. AES-256-GCM with a random per-message
//! nonce prepended to the ciphertext; the key is derived from the
//! configured secret by SHA-256, so any >=32-byte secret works for
//! both signing and sealing.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::AppError;

const AES_GCM_NONCE_BYTES: usize = 12;

fn derive_key(secret: &str) -> [u8; 32] {
    Sha256::digest(secret.as_bytes()).into()
}

/// Encrypt a payload under the configured secret
///
/// Output layout: `nonce || ciphertext+tag`.
pub fn seal(secret: &str, plaintext: &[u8]) -> Result<Vec<u8>, AppError> {
    let key = derive_key(secret);
    let cipher = Aes256Gcm::new_from_slice(&key)
        .map_err(|_| AppError::Encryption("invalid derived key length".to_string()))?;

    let mut nonce = [0_u8; AES_GCM_NONCE_BYTES];
    rand::thread_rng().fill_bytes(&mut nonce);
    let nonce_value = Nonce::from_slice(&nonce);
    let ciphertext = cipher
        .encrypt(nonce_value, plaintext)
        .map_err(|_| AppError::Encryption("sealing failed".to_string()))?;

    let mut out = Vec::with_capacity(AES_GCM_NONCE_BYTES + ciphertext.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypt and authenticate a payload produced by [`seal`]
pub fn open(secret: &str, payload: &[u8]) -> Result<Vec<u8>, AppError> {
    if payload.len() <= AES_GCM_NONCE_BYTES {
        return Err(AppError::Encryption(
            "sealed payload is too short".to_string(),
        ));
    }

    let key = derive_key(secret);
    let cipher = Aes256Gcm::new_from_slice(&key)
        .map_err(|_| AppError::Encryption("invalid derived key length".to_string()))?;

    let (nonce, ciphertext) = payload.split_at(AES_GCM_NONCE_BYTES);
    let nonce_value = Nonce::from_slice(nonce);
    cipher
        .decrypt(nonce_value, ciphertext)
        .map_err(|_| AppError::Encryption("opening failed".to_string()))
}
