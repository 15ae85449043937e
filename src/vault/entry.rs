//! Entry types stored inside a vault.
//!
//! Each entry holds one OTP credential: the raw secret bytes, the
//! TOTP/HOTP parameters, and display metadata.  The `secret` field uses
//! custom serde helpers so it serializes as a base64 string in JSON
//! rather than a raw byte array.  Entries zero their secret on drop.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

// Re-use the base64 serde helpers from format.rs (no duplication).
use super::format::base64_bytes;

/// The HMAC hash algorithm an entry's codes are computed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Zeroize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HashAlgorithm {
    Sha1,
    Sha256,
    Sha512,
}

/// The OTP flavor plus its moving factor.
///
/// Serializes flattened into the entry as `"type": "totp", "period": 30`
/// or `"type": "hotp", "counter": 5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Zeroize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OtpKind {
    Totp { period: u32 },
    Hotp { counter: u64 },
}

/// A single OTP credential stored in the vault.
///
/// Ids are unique within a vault; the position of an entry in the
/// collection is meaningful and preserved across save/load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Entry {
    /// Unique id within the vault.
    pub id: u64,

    /// TOTP period or HOTP counter, with the type tag.
    #[serde(flatten)]
    pub kind: OtpKind,

    /// The raw OTP secret bytes (decoded from base32 at entry time).
    /// Serialized as a base64 string in JSON.
    #[serde(with = "base64_bytes")]
    pub secret: Vec<u8>,

    /// Account name (e.g. "alice@example.com").
    pub name: String,

    /// Issuing service (e.g. "GitHub").
    pub issuer: String,

    /// Number of code digits (6–8).
    pub digits: u32,

    /// Hash algorithm for code generation.
    pub algorithm: HashAlgorithm,

    /// Optional grouping label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// Optional icon name for display layers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Entry {
    /// Create a TOTP entry with a fresh random id.
    pub fn totp(name: &str, issuer: &str, secret: Vec<u8>) -> Self {
        Self {
            id: generate_id(),
            kind: OtpKind::Totp { period: 30 },
            secret,
            name: name.to_string(),
            issuer: issuer.to_string(),
            digits: 6,
            algorithm: HashAlgorithm::Sha1,
            group: None,
            icon: None,
        }
    }

    /// Create an HOTP entry with a fresh random id.
    pub fn hotp(name: &str, issuer: &str, secret: Vec<u8>) -> Self {
        Self {
            id: generate_id(),
            kind: OtpKind::Hotp { counter: 0 },
            secret,
            name: name.to_string(),
            issuer: issuer.to_string(),
            digits: 6,
            algorithm: HashAlgorithm::Sha1,
            group: None,
            icon: None,
        }
    }
}

/// Generate a random entry id.
///
/// Collisions are caught by the duplicate-id check when the entry is
/// added to a vault.
pub fn generate_id() -> u64 {
    rand::rngs::OsRng.next_u64()
}
