//! The master key and HKDF-SHA256 subkey derivation.
//!
//! A single 256-bit master key protects every entry in the vault.  Each
//! slot wraps this same key independently, so one credential can be
//! revoked without touching the others or re-encrypting the entries.
//!
//! The key that actually encrypts the entry blob is derived from the
//! master key with HKDF (RFC 5869) under a fixed context string, keeping
//! the wrapping and bulk-encryption domains separate.

use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::errors::{OtpVaultError, Result};

/// Length of the master key and derived sub-keys (256 bits).
pub const KEY_LEN: usize = 32;

/// Internal helper: run HKDF-SHA256 expand with the given `info`.
///
/// The extract step is skipped and the master key used directly as the
/// pseudo-random key, because it is already full-entropy (random bytes
/// from the OS RNG).
fn hkdf_derive(ikm: &[u8], info: &[u8]) -> Result<[u8; KEY_LEN]> {
    let hk = Hkdf::<Sha256>::new(None, ikm);

    let mut okm = [0u8; KEY_LEN];
    hk.expand(info, &mut okm)
        .map_err(|e| OtpVaultError::KeyDerivationFailed(format!("HKDF expand failed: {e}")))?;

    Ok(okm)
}

/// A 32-byte master key that automatically zeroes its memory when dropped.
///
/// Exists only in process memory while the vault is unlocked; it is never
/// serialized and never written to disk in plaintext.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct MasterKey {
    bytes: [u8; KEY_LEN],
}

impl MasterKey {
    /// Create a `MasterKey` from raw bytes (e.g. a slot unwrap result).
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Generate a fresh random master key from the OS RNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Access the raw key bytes (e.g. to wrap them into a slot).
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Derive the key that encrypts the entry collection.
    pub fn derive_entries_key(&self) -> Result<[u8; KEY_LEN]> {
        hkdf_derive(&self.bytes, b"otpvault-entries:v1")
    }
}

impl PartialEq for MasterKey {
    /// Constant-time comparison so key equality never leaks timing.
    fn eq(&self, other: &Self) -> bool {
        self.bytes.ct_eq(&other.bytes).into()
    }
}

impl Eq for MasterKey {}

impl std::fmt::Debug for MasterKey {
    /// Never print key material, even in debug output.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterKey(..)")
    }
}
