//! Binary vault container format.
//!
//! A `.vault` file has this layout:
//!
//! ```text
//! [OVLT: 4 bytes][version: 1 byte][header_len: 4 bytes LE][header JSON][body]
//! ```
//!
//! - **Magic** (`OVLT`): identifies the file as an OtpVault container.
//! - **Version**: format version (currently `1`), validated before
//!   anything else is parsed and long before any cryptography runs.
//! - **Header length**: little-endian u32 telling us where the header
//!   JSON ends and the body begins.
//! - **Header JSON**: serialized `VaultHeader` — the slot list plus the
//!   nonce and auth tag for the body ciphertext.
//! - **Body**: the entry collection, AES-256-GCM encrypted under a key
//!   derived from the master key.  A container whose header carries no
//!   slots and no params is a structurally valid *plaintext* container
//!   (used by unencrypted export/import); its body is plain entries JSON.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entry::Entry;
use crate::crypto::encryption::{self, SealedData};
use crate::crypto::keys::MasterKey;
use crate::crypto::slot::Slot;
use crate::errors::{OtpVaultError, Result};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic bytes at the start of every vault file.
const MAGIC: &[u8; 4] = b"OVLT";

/// Current binary format version.
pub const CURRENT_VERSION: u8 = 1;

/// Fixed-size prefix: 4 (magic) + 1 (version) + 4 (header_len).
const PREFIX_LEN: usize = 9;

// ---------------------------------------------------------------------------
// VaultHeader
// ---------------------------------------------------------------------------

/// Nonce and authentication tag for the body ciphertext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntriesParams {
    #[serde(with = "base64_bytes")]
    pub nonce: Vec<u8>,
    #[serde(with = "base64_bytes")]
    pub tag: Vec<u8>,
}

/// Metadata stored at the beginning of a vault file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultHeader {
    /// Format version (mirrors the envelope byte).
    pub version: u8,

    /// The slot list, in order.  `None` marks a plaintext container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slots: Option<Vec<Slot>>,

    /// Nonce and tag for the body.  `None` marks a plaintext container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<EntriesParams>,

    /// When this vault was first created.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// VaultContainer
// ---------------------------------------------------------------------------

/// A decoded vault container: header, body, and the exact framed bytes.
///
/// The raw bytes are kept so encrypted export can copy the container
/// verbatim, without re-serializing or re-encrypting anything.
#[derive(Debug, Clone)]
pub struct VaultContainer {
    pub header: VaultHeader,
    body: Vec<u8>,
    raw: Vec<u8>,
}

impl VaultContainer {
    /// Build a container from a header and body, framing the raw bytes.
    pub fn from_parts(header: VaultHeader, body: Vec<u8>) -> Result<Self> {
        let raw = frame(&header, &body)?;
        Ok(Self { header, body, raw })
    }

    /// Serialize `entries` and encrypt them under `master_key`.
    ///
    /// A fresh nonce is generated per call; the slot list passes into the
    /// header as-is.
    pub fn seal_entries(
        master_key: &MasterKey,
        slots: &[Slot],
        entries: &[Entry],
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        let plaintext = serde_json::to_vec(entries)
            .map_err(|e| OtpVaultError::SerializationError(format!("entries: {e}")))?;

        let entries_key = master_key.derive_entries_key()?;
        let sealed = encryption::seal(&entries_key, &plaintext)?;

        let header = VaultHeader {
            version: CURRENT_VERSION,
            slots: Some(slots.to_vec()),
            params: Some(EntriesParams {
                nonce: sealed.nonce,
                tag: sealed.tag,
            }),
            created_at,
        };

        Self::from_parts(header, sealed.ciphertext)
    }

    /// Build a structurally valid *unencrypted* container.
    ///
    /// Used by plaintext export; the body is plain entries JSON and the
    /// header carries neither slots nor params.
    pub fn plain(entries: &[Entry], created_at: DateTime<Utc>) -> Result<Self> {
        let body = serde_json::to_vec(entries)
            .map_err(|e| OtpVaultError::SerializationError(format!("entries: {e}")))?;

        let header = VaultHeader {
            version: CURRENT_VERSION,
            slots: None,
            params: None,
            created_at,
        };

        Self::from_parts(header, body)
    }

    /// Parse a container from raw bytes.
    ///
    /// Purely structural: no key material is needed and no cryptography
    /// runs.  Unknown versions are rejected rather than guessed at.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < PREFIX_LEN {
            return Err(OtpVaultError::CorruptFile(
                "file too small to be a valid vault".into(),
            ));
        }

        if &data[0..4] != MAGIC {
            return Err(OtpVaultError::CorruptFile("missing OVLT magic bytes".into()));
        }

        let version = data[4];
        if version != CURRENT_VERSION {
            return Err(OtpVaultError::UnsupportedVersion(version));
        }

        let header_len_u32 = u32::from_le_bytes(
            data[5..9]
                .try_into()
                .map_err(|_| OtpVaultError::CorruptFile("bad header length".into()))?,
        );
        let header_len = usize::try_from(header_len_u32).map_err(|_| {
            OtpVaultError::CorruptFile(format!(
                "header length {header_len_u32} exceeds platform address space"
            ))
        })?;

        let header_end = PREFIX_LEN
            .checked_add(header_len)
            .filter(|&end| end <= data.len())
            .ok_or_else(|| {
                OtpVaultError::CorruptFile("header length exceeds file size".into())
            })?;

        let header: VaultHeader = serde_json::from_slice(&data[PREFIX_LEN..header_end])
            .map_err(|e| OtpVaultError::CorruptFile(format!("header JSON: {e}")))?;

        if header.version != version {
            return Err(OtpVaultError::CorruptFile(format!(
                "header version {} does not match envelope version {version}",
                header.version
            )));
        }

        // Slots and params come and go together; anything else is torn.
        if header.slots.is_some() != header.params.is_some() {
            return Err(OtpVaultError::CorruptFile(
                "container is neither fully encrypted nor fully plaintext".into(),
            ));
        }

        Ok(Self {
            header,
            body: data[header_end..].to_vec(),
            raw: data.to_vec(),
        })
    }

    /// Rebuild this container with a different slot list.
    ///
    /// The body ciphertext, nonce, and tag are carried over untouched —
    /// adding or removing a slot never re-encrypts the entry data.
    pub fn with_slots(&self, slots: &[Slot]) -> Result<Self> {
        let mut header = self.header.clone();
        header.slots = Some(slots.to_vec());
        Self::from_parts(header, self.body.clone())
    }

    /// Whether the body is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.header.params.is_some()
    }

    /// The slot list (empty for plaintext containers).
    pub fn slots(&self) -> &[Slot] {
        self.header.slots.as_deref().unwrap_or(&[])
    }

    /// The exact framed bytes of this container.
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// The body bytes: ciphertext, or plain entries JSON.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Authenticated-decrypt the body and deserialize the entries.
    ///
    /// All-or-nothing: a tag mismatch (tampered bytes or a key that does
    /// not match) yields `IntegrityFailure` and no entries.
    pub fn open_entries(&self, master_key: &MasterKey) -> Result<Vec<Entry>> {
        let params = self.header.params.as_ref().ok_or_else(|| {
            OtpVaultError::CorruptFile("container is not encrypted".into())
        })?;

        let entries_key = master_key.derive_entries_key()?;
        let plaintext = encryption::open(
            &entries_key,
            &SealedData {
                nonce: params.nonce.clone(),
                ciphertext: self.body.clone(),
                tag: params.tag.clone(),
            },
        )?;

        serde_json::from_slice(&plaintext)
            .map_err(|e| OtpVaultError::CorruptFile(format!("entries JSON: {e}")))
    }

    /// Deserialize the entries of a plaintext container.
    pub fn plain_entries(&self) -> Result<Vec<Entry>> {
        if self.is_encrypted() {
            return Err(OtpVaultError::CorruptFile(
                "container is encrypted — unlock it instead".into(),
            ));
        }

        serde_json::from_slice(&self.body)
            .map_err(|e| OtpVaultError::CorruptFile(format!("entries JSON: {e}")))
    }
}

/// Frame a header and body into the binary envelope.
fn frame(header: &VaultHeader, body: &[u8]) -> Result<Vec<u8>> {
    let header_bytes = serde_json::to_vec(header)
        .map_err(|e| OtpVaultError::SerializationError(format!("header: {e}")))?;

    let header_len = u32::try_from(header_bytes.len()).map_err(|_| {
        OtpVaultError::SerializationError(format!(
            "header length {} exceeds u32::MAX",
            header_bytes.len()
        ))
    })?;

    let mut buf = Vec::with_capacity(PREFIX_LEN + header_bytes.len() + body.len());
    buf.extend_from_slice(MAGIC); // 4 bytes
    buf.push(CURRENT_VERSION); // 1 byte
    buf.extend_from_slice(&header_len.to_le_bytes()); // 4 bytes LE
    buf.extend_from_slice(&header_bytes); // header JSON
    buf.extend_from_slice(body); // ciphertext or plain JSON
    Ok(buf)
}

/// Write `bytes` to `path` **atomically**.
///
/// Writes to a temp file in the same directory, then renames it over the
/// target.  The rename ensures readers never see a half-written file; on
/// a write failure the previous file is untouched.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    if let Err(e) = fs::write(&tmp_path, bytes) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    fs::rename(&tmp_path, path)?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

/// Serialize `Vec<u8>` fields as base64 strings in JSON.
///
/// Used via `#[serde(with = "base64_bytes")]` across the crate.
pub mod base64_bytes {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use serde::Deserialize;

    pub fn serialize<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&BASE64.encode(data))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        BASE64.decode(&s).map_err(serde::de::Error::custom)
    }
}
