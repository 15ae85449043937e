//! Importer for JSON-array backup files.
//!
//! Accepts the backup format used by several Android authenticators: a
//! JSON array of objects with a base32 `secret` plus optional `label`,
//! `issuer`, `digits`, `period`/`counter`, `type`, and `algorithm`
//! fields.  Missing fields fall back to the common defaults (TOTP,
//! 6 digits, 30 seconds, SHA-1).

use serde::Deserialize;

use super::{decode_base32_secret, parse_algorithm, Importer};
use crate::errors::{OtpVaultError, Result};
use crate::vault::entry::{self, OtpKind};
use crate::vault::{Entry, HashAlgorithm};

/// One record as it appears in the backup file.
#[derive(Deserialize)]
struct RawRecord {
    secret: String,
    #[serde(default)]
    label: String,
    #[serde(default)]
    issuer: String,
    #[serde(default = "default_digits")]
    digits: u32,
    #[serde(default)]
    period: Option<u32>,
    #[serde(default)]
    counter: Option<u64>,
    #[serde(rename = "type", default = "default_type")]
    otp_type: String,
    #[serde(default = "default_algorithm")]
    algorithm: String,
}

fn default_digits() -> u32 {
    6
}

fn default_type() -> String {
    "TOTP".to_string()
}

fn default_algorithm() -> String {
    "SHA1".to_string()
}

pub struct JsonBackupImporter;

impl Importer for JsonBackupImporter {
    fn name(&self) -> &'static str {
        "json-backup"
    }

    fn convert(&self, data: &[u8]) -> Result<Vec<Entry>> {
        let records: Vec<RawRecord> =
            serde_json::from_slice(data).map_err(|_| OtpVaultError::ImportParseFailure)?;

        records.into_iter().map(convert_record).collect()
    }
}

fn convert_record(record: RawRecord) -> Result<Entry> {
    let kind = match record.otp_type.to_ascii_uppercase().as_str() {
        "TOTP" => OtpKind::Totp {
            period: record.period.unwrap_or(30),
        },
        "HOTP" => OtpKind::Hotp {
            counter: record.counter.unwrap_or(0),
        },
        _ => return Err(OtpVaultError::ImportParseFailure),
    };

    let algorithm: HashAlgorithm = parse_algorithm(&record.algorithm)?;
    let secret = decode_base32_secret(&record.secret)?;

    Ok(Entry {
        id: entry::generate_id(),
        kind,
        secret,
        name: record.label,
        issuer: record.issuer,
        digits: record.digits,
        algorithm,
        group: None,
        icon: None,
    })
}
