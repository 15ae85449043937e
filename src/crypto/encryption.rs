//! AES-256-GCM authenticated encryption.
//!
//! `seal` generates a fresh random 12-byte nonce per call and returns the
//! nonce, ciphertext, and 16-byte auth tag as separate fields, because the
//! container format stores them separately (nonce and tag in the header,
//! ciphertext as the body).  `open` is all-or-nothing: any tag mismatch
//! yields `IntegrityFailure` and no plaintext.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use serde::{Deserialize, Serialize};

use crate::errors::{OtpVaultError, Result};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// The output of `seal`: nonce, ciphertext, and tag as separate parts.
///
/// Byte fields serialize as base64 strings in JSON (slot wrapped keys are
/// embedded in the container header this way).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealedData {
    #[serde(with = "crate::vault::format::base64_bytes")]
    pub nonce: Vec<u8>,
    #[serde(with = "crate::vault::format::base64_bytes")]
    pub ciphertext: Vec<u8>,
    #[serde(with = "crate::vault::format::base64_bytes")]
    pub tag: Vec<u8>,
}

/// Encrypt `plaintext` with a 32-byte `key`.
pub fn seal(key: &[u8], plaintext: &[u8]) -> Result<SealedData> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| OtpVaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    // Fresh random nonce per call.
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    // RustCrypto appends the tag to the ciphertext; split it back out.
    let mut combined = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| OtpVaultError::EncryptionFailed(format!("encryption error: {e}")))?;
    let tag = combined.split_off(combined.len() - TAG_LEN);

    Ok(SealedData {
        nonce: nonce.to_vec(),
        ciphertext: combined,
        tag,
    })
}

/// Decrypt data that was produced by `seal`.
///
/// Verifies the auth tag over the exact stored bytes; any mismatch
/// (tampered data or wrong key) fails with `IntegrityFailure`.
pub fn open(key: &[u8], sealed: &SealedData) -> Result<Vec<u8>> {
    if sealed.nonce.len() != NONCE_LEN || sealed.tag.len() != TAG_LEN {
        return Err(OtpVaultError::IntegrityFailure);
    }

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| OtpVaultError::IntegrityFailure)?;
    let nonce = Nonce::from_slice(&sealed.nonce);

    // Re-join ciphertext and tag for the AEAD API.
    let mut combined = Vec::with_capacity(sealed.ciphertext.len() + TAG_LEN);
    combined.extend_from_slice(&sealed.ciphertext);
    combined.extend_from_slice(&sealed.tag);

    cipher
        .decrypt(nonce, combined.as_slice())
        .map_err(|_| OtpVaultError::IntegrityFailure)
}
