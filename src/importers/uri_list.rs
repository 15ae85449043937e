//! Importer for `otpauth://` URI lists.
//!
//! One URI per line, the export format of several authenticator apps:
//!
//! ```text
//! otpauth://totp/GitHub:alice?secret=JBSWY3DPEHPK3PXP&issuer=GitHub&digits=6
//! otpauth://hotp/Example:bob?secret=JBSWY3DPEHPK3PXP&counter=4
//! ```
//!
//! Blank lines and `#` comments are skipped; any other non-URI line
//! fails the whole attempt so this importer does not swallow arbitrary
//! text files.

use regex::Regex;

use super::{decode_base32_secret, parse_algorithm, Importer};
use crate::errors::{OtpVaultError, Result};
use crate::vault::entry::{self, OtpKind};
use crate::vault::{Entry, HashAlgorithm};

pub struct UriListImporter;

impl Importer for UriListImporter {
    fn name(&self) -> &'static str {
        "otpauth-uri-list"
    }

    fn convert(&self, data: &[u8]) -> Result<Vec<Entry>> {
        let text = std::str::from_utf8(data).map_err(|_| OtpVaultError::ImportParseFailure)?;

        let mut entries = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            entries.push(parse_uri(line)?);
        }

        if entries.is_empty() {
            return Err(OtpVaultError::ImportParseFailure);
        }
        Ok(entries)
    }
}

/// Parse one `otpauth://` URI into an entry.
pub fn parse_uri(uri: &str) -> Result<Entry> {
    // regex::Regex::new only fails on an invalid pattern, which this
    // fixed literal is not.
    let re = Regex::new(r"^otpauth://(totp|hotp)/([^?]*)(?:\?(.*))?$")
        .map_err(|e| OtpVaultError::CommandFailed(format!("regex: {e}")))?;

    let caps = re
        .captures(uri)
        .ok_or(OtpVaultError::ImportParseFailure)?;

    let label = percent_decode(caps.get(2).map_or("", |m| m.as_str()));
    let query = caps.get(3).map_or("", |m| m.as_str());

    // "Issuer:Account" labels carry the issuer; a bare label is the name.
    let (label_issuer, name) = match label.split_once(':') {
        Some((issuer, account)) => (Some(issuer.trim().to_string()), account.trim().to_string()),
        None => (None, label.trim().to_string()),
    };

    let mut secret = None;
    let mut issuer = None;
    let mut digits = 6u32;
    let mut period = 30u32;
    let mut counter = 0u64;
    let mut algorithm = HashAlgorithm::Sha1;

    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let value = percent_decode(value);
        match key {
            "secret" => secret = Some(decode_base32_secret(&value)?),
            "issuer" => issuer = Some(value),
            "digits" => {
                digits = value.parse().map_err(|_| OtpVaultError::ImportParseFailure)?;
            }
            "period" => {
                period = value.parse().map_err(|_| OtpVaultError::ImportParseFailure)?;
            }
            "counter" => {
                counter = value.parse().map_err(|_| OtpVaultError::ImportParseFailure)?;
            }
            "algorithm" => algorithm = parse_algorithm(&value)?,
            // Unknown parameters are ignored, tolerantly.
            _ => {}
        }
    }

    let secret = secret.ok_or(OtpVaultError::ImportParseFailure)?;

    let kind = match caps.get(1).map_or("", |m| m.as_str()) {
        "totp" => OtpKind::Totp { period },
        "hotp" => OtpKind::Hotp { counter },
        _ => return Err(OtpVaultError::ImportParseFailure),
    };

    Ok(Entry {
        id: entry::generate_id(),
        kind,
        secret,
        name,
        // The explicit issuer parameter wins over the label prefix.
        issuer: issuer.or(label_issuer).unwrap_or_default(),
        digits,
        algorithm,
        group: None,
        icon: None,
    })
}

/// Decode `%XX` escapes; malformed escapes pass through literally.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let (Some(hi), Some(lo)) = (
                bytes.get(i + 1).and_then(|b| (*b as char).to_digit(16)),
                bytes.get(i + 2).and_then(|b| (*b as char).to_digit(16)),
            ) {
                out.push((hi * 16 + lo) as u8);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_totp_uri() {
        let entry = parse_uri(
            "otpauth://totp/GitHub:alice%40example.com?secret=JBSWY3DPEHPK3PXP&issuer=GitHub&digits=6&period=30",
        )
        .unwrap();

        assert_eq!(entry.name, "alice@example.com");
        assert_eq!(entry.issuer, "GitHub");
        assert_eq!(entry.kind, OtpKind::Totp { period: 30 });
        assert_eq!(entry.digits, 6);
    }

    #[test]
    fn parses_hotp_uri_with_counter() {
        let entry = parse_uri("otpauth://hotp/bob?secret=JBSWY3DPEHPK3PXP&counter=42").unwrap();
        assert_eq!(entry.name, "bob");
        assert_eq!(entry.kind, OtpKind::Hotp { counter: 42 });
    }

    #[test]
    fn explicit_issuer_wins_over_label_prefix() {
        let entry =
            parse_uri("otpauth://totp/Old:alice?secret=JBSWY3DPEHPK3PXP&issuer=New").unwrap();
        assert_eq!(entry.issuer, "New");
    }

    #[test]
    fn label_prefix_issuer_used_when_no_parameter() {
        let entry = parse_uri("otpauth://totp/GitHub:alice?secret=JBSWY3DPEHPK3PXP").unwrap();
        assert_eq!(entry.issuer, "GitHub");
    }

    #[test]
    fn missing_secret_fails() {
        assert!(parse_uri("otpauth://totp/alice?digits=6").is_err());
    }

    #[test]
    fn list_skips_blanks_and_comments() {
        let data = b"# exported codes\n\notpauth://totp/a?secret=JBSWY3DPEHPK3PXP\n";
        let entries = UriListImporter.convert(data).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn non_uri_line_fails_whole_attempt() {
        let data = b"otpauth://totp/a?secret=JBSWY3DPEHPK3PXP\njust some text\n";
        assert!(UriListImporter.convert(data).is_err());
    }

    #[test]
    fn empty_input_fails() {
        assert!(UriListImporter.convert(b"").is_err());
        assert!(UriListImporter.convert(b"# only a comment\n").is_err());
    }

    #[test]
    fn percent_decoding() {
        assert_eq!(percent_decode("a%20b"), "a b");
        assert_eq!(percent_decode("alice%40example.com"), "alice@example.com");
        assert_eq!(percent_decode("100%"), "100%");
    }
}
