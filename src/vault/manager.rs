//! High-level vault lifecycle and persistence.
//!
//! `VaultManager` owns the in-memory entry collection and the master key
//! while the vault is unlocked, and composes the slot and container
//! codecs for everything else.  A vault moves through
//! `not found → loaded (locked) → unlocked → locked`; locking discards
//! the key and entries from memory, never from disk.
//!
//! A single manager instance is the sole owner of its vault file; callers
//! running it from multiple threads must serialize mutate/save calls.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::entry::{Entry, OtpKind};
use super::format::{self, VaultContainer};
use super::otp;
use crate::crypto::kdf::Argon2Params;
use crate::crypto::keys::MasterKey;
use crate::crypto::slot::{Credential, KeyRelease, Slot};
use crate::errors::{OtpVaultError, Result};

/// The master key and decrypted entries, present only while unlocked.
struct UnlockedVault {
    master_key: MasterKey,
    entries: Vec<Entry>,
}

/// The main vault handle.
pub struct VaultManager {
    /// Path to the `.vault` file on disk.
    path: PathBuf,

    /// The last loaded or saved container (ciphertext plus header).
    container: Option<VaultContainer>,

    /// The slot list, mirrored from the container and mutated in place.
    slots: Vec<Slot>,

    /// Key and entries while unlocked; dropped (and zeroed) on lock.
    unlocked: Option<UnlockedVault>,

    /// Whether the entry collection has mutations not yet saved.
    /// Forces a re-encryption of the body on the next save.
    entries_dirty: bool,

    /// Whether the slot list has mutations not yet saved.  Slot changes
    /// alone re-frame the header but never touch the body ciphertext.
    slots_dirty: bool,

    /// Vault creation time, carried through every re-encode.
    created_at: DateTime<Utc>,
}

impl VaultManager {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create a handle for the vault at `path` without touching disk.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            container: None,
            slots: Vec::new(),
            unlocked: None,
            entries_dirty: false,
            slots_dirty: false,
            created_at: Utc::now(),
        }
    }

    /// Create a brand-new vault with a fresh random master key.
    ///
    /// The vault starts unlocked, empty, and slotless; add at least one
    /// slot before saving or the container can never be unlocked again.
    pub fn create(path: &Path) -> Result<Self> {
        if path.exists() {
            return Err(OtpVaultError::VaultAlreadyExists(path.to_path_buf()));
        }

        let mut manager = Self::new(path);
        manager.unlocked = Some(UnlockedVault {
            master_key: MasterKey::generate(),
            entries: Vec::new(),
        });
        manager.entries_dirty = true;
        Ok(manager)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Whether the vault file exists on disk.
    pub fn file_exists(&self) -> bool {
        self.path.exists()
    }

    /// Read and structurally decode the container from disk.
    ///
    /// Requires no credential; slots and ciphertext stay opaque until
    /// `unlock`.  A second call on an already-loaded vault is a no-op.
    pub fn load(&mut self) -> Result<()> {
        if self.container.is_some() {
            return Ok(());
        }
        if !self.path.exists() {
            return Err(OtpVaultError::VaultNotFound(self.path.clone()));
        }

        let bytes = fs::read(&self.path)?;
        let container = VaultContainer::parse(&bytes)?;

        self.slots = container.slots().to_vec();
        self.created_at = container.header.created_at;
        self.container = Some(container);
        Ok(())
    }

    /// Whether a container has been loaded (or created).
    pub fn is_loaded(&self) -> bool {
        self.container.is_some() || self.unlocked.is_some()
    }

    /// Whether the entry collection is inaccessible.
    pub fn is_locked(&self) -> bool {
        self.unlocked.is_none()
    }

    /// Whether in-memory state differs from the last save.
    pub fn is_dirty(&self) -> bool {
        self.entries_dirty || self.slots_dirty
    }

    /// Unlock the vault through one slot.
    ///
    /// Unwraps the master key with the credential, then decrypts the
    /// entry collection.  Calling this on an already-unlocked vault is a
    /// no-op success.
    pub fn unlock(&mut self, slot_id: u64, credential: &Credential<'_>) -> Result<()> {
        if self.unlocked.is_some() {
            return Ok(());
        }

        let container = self.container.as_ref().ok_or(OtpVaultError::NotLoaded)?;
        let slot = self
            .slots
            .iter()
            .find(|s| s.id() == slot_id)
            .ok_or(OtpVaultError::SlotNotFound(slot_id))?;

        let master_key = slot.unwrap(credential)?;
        let entries = container.open_entries(&master_key)?;

        self.unlocked = Some(UnlockedVault {
            master_key,
            entries,
        });
        Ok(())
    }

    /// Discard the master key and entries from memory.
    ///
    /// Key material is zeroed as it drops.  Unsaved mutations are lost;
    /// the on-disk ciphertext is untouched.  Always succeeds.
    pub fn lock(&mut self) {
        self.unlocked = None;
        // Unsaved slot changes are discarded along with the entries;
        // the loaded container is authoritative again.
        self.slots = self
            .container
            .as_ref()
            .map(|c| c.slots().to_vec())
            .unwrap_or_default();
        self.entries_dirty = false;
        self.slots_dirty = false;
    }

    // ------------------------------------------------------------------
    // Entry operations
    // ------------------------------------------------------------------

    /// The ordered entry collection.
    pub fn keys(&self) -> Result<&[Entry]> {
        Ok(&self.require_unlocked()?.entries)
    }

    /// Append an entry, preserving insertion order.
    pub fn add_key(&mut self, entry: Entry) -> Result<()> {
        let unlocked = self.require_unlocked_mut()?;
        if unlocked.entries.iter().any(|e| e.id == entry.id) {
            return Err(OtpVaultError::DuplicateId(entry.id));
        }

        unlocked.entries.push(entry);
        self.entries_dirty = true;
        Ok(())
    }

    /// Remove the entry with the given id.
    pub fn remove_key(&mut self, id: u64) -> Result<()> {
        let unlocked = self.require_unlocked_mut()?;
        let index = unlocked
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(OtpVaultError::EntryNotFound(id))?;

        unlocked.entries.remove(index);
        self.entries_dirty = true;
        Ok(())
    }

    /// Swap the positions of two entries (display order is meaningful).
    pub fn swap_keys(&mut self, a: u64, b: u64) -> Result<()> {
        let unlocked = self.require_unlocked_mut()?;
        let pos_a = unlocked
            .entries
            .iter()
            .position(|e| e.id == a)
            .ok_or(OtpVaultError::EntryNotFound(a))?;
        let pos_b = unlocked
            .entries
            .iter()
            .position(|e| e.id == b)
            .ok_or(OtpVaultError::EntryNotFound(b))?;

        unlocked.entries.swap(pos_a, pos_b);
        self.entries_dirty = true;
        Ok(())
    }

    /// Generate the current code for an entry.
    ///
    /// HOTP entries advance their counter (the counter must never be
    /// reused), which dirties the vault; call `save` afterwards.
    pub fn next_code(&mut self, id: u64, unix_secs: u64) -> Result<String> {
        let unlocked = self.require_unlocked_mut()?;
        let entry = unlocked
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(OtpVaultError::EntryNotFound(id))?;

        let code = otp::code_for_entry(entry, unix_secs)?;
        if let OtpKind::Hotp { ref mut counter } = entry.kind {
            *counter += 1;
            self.entries_dirty = true;
        }
        Ok(code)
    }

    // ------------------------------------------------------------------
    // Slot operations
    // ------------------------------------------------------------------

    /// The slot list, in order.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Wrap the master key under a new password slot.
    pub fn add_password_slot(&mut self, password: &[u8], params: &Argon2Params) -> Result<u64> {
        let master = &self.require_unlocked()?.master_key;
        let slot = Slot::wrap_password(master, password, params)?;
        let id = slot.id();

        self.slots.push(slot);
        self.slots_dirty = true;
        Ok(id)
    }

    /// Wrap the master key under a new key-handle slot.
    pub fn add_key_handle_slot(&mut self, handle: &str, provider: &dyn KeyRelease) -> Result<u64> {
        let master = &self.require_unlocked()?.master_key;
        let slot = Slot::wrap_key_handle(master, handle, provider)?;
        let id = slot.id();

        self.slots.push(slot);
        self.slots_dirty = true;
        Ok(id)
    }

    /// Remove a slot.  Other slots and the entry ciphertext are untouched.
    pub fn remove_slot(&mut self, id: u64) -> Result<()> {
        self.require_unlocked()?;
        let index = self
            .slots
            .iter()
            .position(|s| s.id() == id)
            .ok_or(OtpVaultError::SlotNotFound(id))?;
        if self.slots.len() == 1 {
            return Err(OtpVaultError::CannotRemoveLastSlot);
        }

        self.slots.remove(index);
        self.slots_dirty = true;
        Ok(())
    }

    /// Re-wrap one slot under a new credential.
    ///
    /// Requires a successful unwrap with the old credential first; the
    /// slot keeps its id and the other slots are untouched.
    pub fn replace_slot_credential(
        &mut self,
        id: u64,
        old: &Credential<'_>,
        new: &Credential<'_>,
    ) -> Result<()> {
        self.require_unlocked()?;
        let index = self
            .slots
            .iter()
            .position(|s| s.id() == id)
            .ok_or(OtpVaultError::SlotNotFound(id))?;

        self.slots[index] = self.slots[index].replace_credential(old, new)?;
        self.slots_dirty = true;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Re-encode the vault and write it to disk atomically.
    ///
    /// The previous file is retained as `<name>.bak` before the atomic
    /// replace, so a corrupt save can always be recovered by hand.
    /// While locked there is nothing in memory to persist and this is a
    /// no-op returning the vault path.
    pub fn save(&mut self) -> Result<PathBuf> {
        let unlocked = match self.unlocked {
            Some(ref u) => u,
            None => {
                if !self.is_loaded() {
                    return Err(OtpVaultError::NotLoaded);
                }
                return Ok(self.path.clone());
            }
        };

        // Slot-only changes keep the existing body ciphertext untouched;
        // entry changes (or a first save) re-encrypt with a fresh nonce.
        let container = match self.container {
            Some(ref c) if !self.entries_dirty => c.with_slots(&self.slots)?,
            _ => VaultContainer::seal_entries(
                &unlocked.master_key,
                &self.slots,
                &unlocked.entries,
                self.created_at,
            )?,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        // Keep the previous container around before replacing it.
        if self.path.exists() {
            fs::copy(&self.path, self.backup_path())?;
        }

        format::write_atomic(&self.path, container.as_bytes())?;

        self.container = Some(container);
        self.entries_dirty = false;
        self.slots_dirty = false;
        Ok(self.path.clone())
    }

    /// Export the vault to a timestamped sibling file.
    ///
    /// With `keep_encrypted`, the container bytes from the last load or
    /// save are copied verbatim — no credential needed.  Otherwise the
    /// entries are re-encoded as a plaintext container, which requires
    /// the vault to be unlocked.
    pub fn export(&self, keep_encrypted: bool) -> Result<PathBuf> {
        let stamp = Utc::now().format("%Y%m%d-%H%M%S");
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "vault".to_string());
        let parent = self.path.parent().unwrap_or(Path::new(".")).to_path_buf();

        let (name, bytes) = if keep_encrypted {
            let container = self.container.as_ref().ok_or(OtpVaultError::NotLoaded)?;
            (
                format!("{stem}-export-{stamp}.vault"),
                container.as_bytes().to_vec(),
            )
        } else {
            let unlocked = self.require_unlocked()?;
            let container = VaultContainer::plain(&unlocked.entries, self.created_at)?;
            (
                format!("{stem}-export-plain-{stamp}.vault"),
                container.as_bytes().to_vec(),
            )
        };

        let dest = parent.join(name);
        format::write_atomic(&dest, &bytes)?;
        Ok(dest)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Returns the path to the vault file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path the previous container is backed up to on save.
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "vault".to_string());
        name.push_str(".bak");
        self.path.with_file_name(name)
    }

    /// Returns the vault creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    // ------------------------------------------------------------------
    // Internal helpers
    // ------------------------------------------------------------------

    fn require_unlocked(&self) -> Result<&UnlockedVault> {
        self.unlocked.as_ref().ok_or(OtpVaultError::NotUnlocked)
    }

    fn require_unlocked_mut(&mut self) -> Result<&mut UnlockedVault> {
        self.unlocked.as_mut().ok_or(OtpVaultError::NotUnlocked)
    }
}
