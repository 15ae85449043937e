//! Cryptographic primitives for OtpVault.
//!
//! This module provides:
//! - AES-256-GCM sealing with split-out nonce and tag (`encryption`)
//! - Argon2id password-based wrapping-key derivation (`kdf`)
//! - The master key and HKDF subkey derivation (`keys`)
//! - Key slots wrapping the master key per credential (`slot`)

pub mod encryption;
pub mod kdf;
pub mod keys;
pub mod slot;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{seal, open, MasterKey, Slot, ...};
pub use encryption::{open, seal, SealedData};
pub use kdf::{derive_wrap_key, derive_wrap_key_with_params, generate_salt, Argon2Params};
pub use keys::MasterKey;
pub use slot::{Credential, KeyRelease, Slot, StoredArgon2Params};
