//! OS keyring integration — the key-release provider for key-handle slots.
//!
//! Wrapping keys for key-handle slots live in the operating system's
//! secure credential store:
//! - macOS: Keychain
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring / KDE Wallet)
//!
//! The slot stores only an opaque handle string; the 32 key bytes never
//! touch the vault file.  Deleting the keyring entry revokes the slot's
//! credential without touching the vault.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::RngCore;

use crate::crypto::keys::KEY_LEN;
use crate::crypto::slot::KeyRelease;
use crate::errors::{OtpVaultError, Result};

/// Service name used in the OS keyring.
const SERVICE_NAME: &str = "otpvault";

/// Key-release provider backed by the OS keyring.
pub struct OsKeyring;

impl OsKeyring {
    /// Generate a fresh random wrapping key and store it under `handle`.
    ///
    /// Fails if the handle already holds a key, so an existing slot's
    /// key can never be silently overwritten.
    pub fn create_key(&self, handle: &str) -> Result<()> {
        let entry = entry_for(handle)?;

        match entry.get_password() {
            Ok(_) => {
                return Err(OtpVaultError::KeyringError(format!(
                    "a key for '{handle}' already exists in the keyring"
                )))
            }
            Err(keyring::Error::NoEntry) => {}
            Err(e) => {
                return Err(OtpVaultError::KeyringError(format!(
                    "failed to read from keyring: {e}"
                )))
            }
        }

        let mut key = [0u8; KEY_LEN];
        rand::rngs::OsRng.fill_bytes(&mut key);

        entry.set_password(&BASE64.encode(key)).map_err(|e| {
            OtpVaultError::KeyringError(format!("failed to store key in keyring: {e}"))
        })?;

        Ok(())
    }

    /// Delete the stored key for `handle`.  Missing entries are fine.
    pub fn delete_key(&self, handle: &str) -> Result<()> {
        let entry = entry_for(handle)?;

        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()), // Already gone, that's fine.
            Err(e) => Err(OtpVaultError::KeyringError(format!(
                "failed to delete from keyring: {e}"
            ))),
        }
    }
}

impl KeyRelease for OsKeyring {
    /// Fetch and decode the wrapping key stored under `handle`.
    fn release(&self, handle: &str) -> Result<[u8; KEY_LEN]> {
        let entry = entry_for(handle)?;

        let encoded = entry.get_password().map_err(|e| match e {
            keyring::Error::NoEntry => {
                OtpVaultError::KeyringError(format!("no key for '{handle}' in the keyring"))
            }
            other => OtpVaultError::KeyringError(format!("failed to read from keyring: {other}")),
        })?;

        let decoded = BASE64
            .decode(&encoded)
            .map_err(|e| OtpVaultError::KeyringError(format!("stored key is not base64: {e}")))?;

        decoded.try_into().map_err(|_| {
            OtpVaultError::KeyringError(format!("stored key for '{handle}' has the wrong length"))
        })
    }
}

fn entry_for(handle: &str) -> Result<keyring::Entry> {
    keyring::Entry::new(SERVICE_NAME, &format!("slot:{handle}"))
        .map_err(|e| OtpVaultError::KeyringError(format!("failed to create keyring entry: {e}")))
}
