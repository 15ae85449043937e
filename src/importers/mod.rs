//! Import pipeline — recover entries from foreign export formats.
//!
//! Formats with no reliable magic marker are recognized by trial-parse:
//! each registered importer attempts to convert the raw bytes, in a fixed
//! priority order, and the first one that succeeds wins.  Every attempt
//! receives the stream from the start, so one importer's partial
//! consumption can never corrupt the next attempt.  Individual parse
//! errors are discarded; if no importer accepts the input the registry
//! reports a single `ImportParseFailure`.

pub mod json_backup;
pub mod uri_list;
pub mod vault_plain;

use data_encoding::BASE32_NOPAD;

use crate::errors::{OtpVaultError, Result};
use crate::vault::{Entry, HashAlgorithm};

/// A format handler that attempts to parse a byte stream into entries.
///
/// Implementations are independently testable with a raw fixture.
pub trait Importer {
    /// Short format name for logging and CLI output.
    fn name(&self) -> &'static str;

    /// Attempt to convert `data` into entries.  `data` always starts at
    /// the beginning of the stream.
    fn convert(&self, data: &[u8]) -> Result<Vec<Entry>>;
}

/// The registered importers, in priority order.
///
/// Own plaintext containers carry magic bytes and go first; the JSON
/// backup format is stricter than the URI list, so it is tried earlier.
pub fn registry() -> Vec<Box<dyn Importer>> {
    vec![
        Box::new(vault_plain::VaultPlainImporter),
        Box::new(json_backup::JsonBackupImporter),
        Box::new(uri_list::UriListImporter),
    ]
}

/// Run `data` through the registry and return the first success.
pub fn import(data: &[u8]) -> Result<Vec<Entry>> {
    for importer in registry() {
        if let Ok(entries) = importer.convert(data) {
            return Ok(entries);
        }
    }
    Err(OtpVaultError::ImportParseFailure)
}

/// Decode a base32 OTP secret, tolerating padding, spaces, and case.
pub fn decode_base32_secret(secret: &str) -> Result<Vec<u8>> {
    let normalized: String = secret
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && *c != '=')
        .map(|c| c.to_ascii_uppercase())
        .collect();

    BASE32_NOPAD
        .decode(normalized.as_bytes())
        .map_err(|_| OtpVaultError::ImportParseFailure)
}

/// Parse a hash algorithm name as found in backup files and URIs.
pub fn parse_algorithm(name: &str) -> Result<HashAlgorithm> {
    match name.to_ascii_uppercase().as_str() {
        "SHA1" => Ok(HashAlgorithm::Sha1),
        "SHA256" => Ok(HashAlgorithm::Sha256),
        "SHA512" => Ok(HashAlgorithm::Sha512),
        _ => Err(OtpVaultError::ImportParseFailure),
    }
}
