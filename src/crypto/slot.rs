//! Key slots — independently credentialed wrappings of the master key.
//!
//! Every slot encrypts the same 32-byte master key under a wrapping key
//! derived from its own credential:
//!
//! - **Password slots** derive the wrapping key with Argon2id from a
//!   password plus a per-slot salt; the salt and KDF parameters are
//!   stored in the slot.
//! - **Key-handle slots** delegate to an external secure-key-release
//!   capability (OS keyring, hardware token) that turns an opaque handle
//!   string into 32 raw key bytes.
//!
//! Unwrapping reports every failure — bad password, denied key release,
//! corrupt slot data — uniformly as `WrongCredential`, so callers cannot
//! distinguish the cases.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::encryption::{self, SealedData};
use super::kdf::{self, Argon2Params};
use super::keys::{MasterKey, KEY_LEN};
use crate::errors::{OtpVaultError, Result};

/// An external capability that releases raw key bytes for a handle.
///
/// The OS-keyring implementation lives behind the `keyring-store` feature;
/// tests use an in-memory one.  A failed release (denied, cancelled, or
/// unknown handle) is reported as an error and folds into `WrongCredential`
/// during unwrap.
pub trait KeyRelease {
    fn release(&self, handle: &str) -> Result<[u8; KEY_LEN]>;
}

/// The credential presented to unwrap a slot.
pub enum Credential<'a> {
    Password(&'a [u8]),
    KeyRelease(&'a dyn KeyRelease),
}

/// Argon2 parameters stored inside a password slot so the exact same
/// KDF settings are used when unwrapping.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StoredArgon2Params {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl From<Argon2Params> for StoredArgon2Params {
    fn from(p: Argon2Params) -> Self {
        Self {
            memory_kib: p.memory_kib,
            iterations: p.iterations,
            parallelism: p.parallelism,
        }
    }
}

impl From<StoredArgon2Params> for Argon2Params {
    fn from(p: StoredArgon2Params) -> Self {
        Self {
            memory_kib: p.memory_kib,
            iterations: p.iterations,
            parallelism: p.parallelism,
        }
    }
}

/// A password-derived wrapping of the master key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordSlot {
    pub id: u64,
    #[serde(with = "crate::vault::format::base64_bytes")]
    pub salt: Vec<u8>,
    pub argon2: StoredArgon2Params,
    pub wrapped_key: SealedData,
}

/// A wrapping of the master key under an externally released key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyHandleSlot {
    pub id: u64,
    pub handle: String,
    pub wrapped_key: SealedData,
}

/// One independently unlockable wrapping of the master key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Slot {
    Password(PasswordSlot),
    KeyHandle(KeyHandleSlot),
}

/// Generate a random slot id.
fn generate_id() -> u64 {
    rand::rngs::OsRng.next_u64()
}

impl Slot {
    /// Wrap `master` under a password with a fresh salt and nonce.
    pub fn wrap_password(
        master: &MasterKey,
        password: &[u8],
        params: &Argon2Params,
    ) -> Result<Self> {
        let salt = kdf::generate_salt();
        let wrap_key = kdf::derive_wrap_key_with_params(password, &salt, params)?;
        let wrapped_key = encryption::seal(&wrap_key, master.as_bytes())?;

        Ok(Slot::Password(PasswordSlot {
            id: generate_id(),
            salt: salt.to_vec(),
            argon2: (*params).into(),
            wrapped_key,
        }))
    }

    /// Wrap `master` under a key released for `handle` with a fresh nonce.
    pub fn wrap_key_handle(
        master: &MasterKey,
        handle: &str,
        provider: &dyn KeyRelease,
    ) -> Result<Self> {
        let wrap_key = provider.release(handle)?;
        let wrapped_key = encryption::seal(&wrap_key, master.as_bytes())?;

        Ok(Slot::KeyHandle(KeyHandleSlot {
            id: generate_id(),
            handle: handle.to_string(),
            wrapped_key,
        }))
    }

    /// The slot's unique id within the container.
    pub fn id(&self) -> u64 {
        match self {
            Slot::Password(s) => s.id,
            Slot::KeyHandle(s) => s.id,
        }
    }

    /// A short human-readable name for the slot kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Slot::Password(_) => "password",
            Slot::KeyHandle(_) => "key-handle",
        }
    }

    /// Unwrap the master key with the given credential.
    ///
    /// Any failure — wrong password, mismatched credential type, denied
    /// key release, or tampered slot data — is reported uniformly as
    /// `WrongCredential`.
    pub fn unwrap(&self, credential: &Credential<'_>) -> Result<MasterKey> {
        let wrap_key = self.derive_wrap_key(credential)?;
        let raw = encryption::open(&wrap_key, self.wrapped_key())
            .map_err(|_| OtpVaultError::WrongCredential)?;

        let bytes: [u8; KEY_LEN] = raw
            .try_into()
            .map_err(|_| OtpVaultError::WrongCredential)?;
        Ok(MasterKey::new(bytes))
    }

    /// Unwrap with `old`, then re-wrap under `new` keeping the same id.
    ///
    /// The new slot gets a fresh salt (password slots) and a fresh nonce.
    /// The credential type must match the slot type.
    pub fn replace_credential(
        &self,
        old: &Credential<'_>,
        new: &Credential<'_>,
    ) -> Result<Slot> {
        let master = self.unwrap(old)?;

        let mut replacement = match (self, new) {
            (Slot::Password(s), Credential::Password(pw)) => {
                Slot::wrap_password(&master, pw, &s.argon2.into())?
            }
            (Slot::KeyHandle(s), Credential::KeyRelease(provider)) => {
                Slot::wrap_key_handle(&master, &s.handle, *provider)?
            }
            _ => return Err(OtpVaultError::WrongCredential),
        };

        replacement.set_id(self.id());
        Ok(replacement)
    }

    fn wrapped_key(&self) -> &SealedData {
        match self {
            Slot::Password(s) => &s.wrapped_key,
            Slot::KeyHandle(s) => &s.wrapped_key,
        }
    }

    fn set_id(&mut self, id: u64) {
        match self {
            Slot::Password(s) => s.id = id,
            Slot::KeyHandle(s) => s.id = id,
        }
    }

    /// Derive the wrapping key for this slot from the credential.
    fn derive_wrap_key(&self, credential: &Credential<'_>) -> Result<[u8; KEY_LEN]> {
        match (self, credential) {
            (Slot::Password(s), Credential::Password(pw)) => {
                kdf::derive_wrap_key_with_params(pw, &s.salt, &s.argon2.into())
                    .map_err(|_| OtpVaultError::WrongCredential)
            }
            (Slot::KeyHandle(s), Credential::KeyRelease(provider)) => provider
                .release(&s.handle)
                .map_err(|_| OtpVaultError::WrongCredential),
            _ => Err(OtpVaultError::WrongCredential),
        }
    }
}
