//! HOTP (RFC 4226) and TOTP (RFC 6238) code generation.
//!
//! Codes are computed over an entry's raw secret bytes with HMAC-SHA1,
//! -SHA256, or -SHA512 and dynamic truncation.  TOTP is HOTP with the
//! counter replaced by `unix_time / period`.

use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Sha256, Sha512};

use super::entry::{Entry, HashAlgorithm, OtpKind};
use crate::errors::{OtpVaultError, Result};

/// Inclusive range of supported code lengths.
const MIN_DIGITS: u32 = 6;
const MAX_DIGITS: u32 = 8;

/// Generate an RFC 4226 HOTP code.
pub fn generate_hotp(
    secret: &[u8],
    counter: u64,
    digits: u32,
    algorithm: HashAlgorithm,
) -> Result<String> {
    if !(MIN_DIGITS..=MAX_DIGITS).contains(&digits) {
        return Err(OtpVaultError::InvalidOtpParams(format!(
            "digits must be between {MIN_DIGITS} and {MAX_DIGITS} (got {digits})"
        )));
    }

    let message = counter.to_be_bytes();
    let digest = match algorithm {
        HashAlgorithm::Sha1 => hmac_digest::<Hmac<Sha1>>(secret, &message)?,
        HashAlgorithm::Sha256 => hmac_digest::<Hmac<Sha256>>(secret, &message)?,
        HashAlgorithm::Sha512 => hmac_digest::<Hmac<Sha512>>(secret, &message)?,
    };

    // Dynamic truncation: the low nibble of the last byte selects a
    // 4-byte window, of which the top bit is masked off.
    let offset = (digest[digest.len() - 1] & 0x0F) as usize;
    let binary = (u32::from(digest[offset]) & 0x7F) << 24
        | u32::from(digest[offset + 1]) << 16
        | u32::from(digest[offset + 2]) << 8
        | u32::from(digest[offset + 3]);

    let code = binary % 10u32.pow(digits);
    Ok(format!("{code:0width$}", width = digits as usize))
}

/// Generate an RFC 6238 TOTP code for the given unix time.
pub fn generate_totp(
    secret: &[u8],
    period: u32,
    digits: u32,
    algorithm: HashAlgorithm,
    unix_secs: u64,
) -> Result<String> {
    if period == 0 {
        return Err(OtpVaultError::InvalidOtpParams(
            "period must be greater than zero".into(),
        ));
    }

    generate_hotp(secret, unix_secs / u64::from(period), digits, algorithm)
}

/// Seconds until the TOTP code for `unix_secs` rolls over.
pub fn totp_remaining(period: u32, unix_secs: u64) -> u64 {
    let period = u64::from(period.max(1));
    period - (unix_secs % period)
}

/// Generate the current code for an entry.
///
/// For HOTP entries this uses the stored counter as-is; advancing the
/// counter afterwards (and saving) is the caller's responsibility.
pub fn code_for_entry(entry: &Entry, unix_secs: u64) -> Result<String> {
    match entry.kind {
        OtpKind::Totp { period } => {
            generate_totp(&entry.secret, period, entry.digits, entry.algorithm, unix_secs)
        }
        OtpKind::Hotp { counter } => {
            generate_hotp(&entry.secret, counter, entry.digits, entry.algorithm)
        }
    }
}

/// Compute HMAC over `message` with the given MAC instance.
fn hmac_digest<M: Mac + hmac::digest::KeyInit>(key: &[u8], message: &[u8]) -> Result<Vec<u8>> {
    let mut mac = <M as Mac>::new_from_slice(key)
        .map_err(|e| OtpVaultError::EncryptionFailed(format!("HMAC init failed: {e}")))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// RFC 4226 appendix D secret.
    const RFC4226_SECRET: &[u8] = b"12345678901234567890";

    #[test]
    fn rfc4226_sha1_vectors() {
        let expected = [
            "755224", "287082", "359152", "969429", "338314", "254676", "287922", "162583",
            "399871", "520489",
        ];
        for (counter, want) in expected.iter().enumerate() {
            let code =
                generate_hotp(RFC4226_SECRET, counter as u64, 6, HashAlgorithm::Sha1).unwrap();
            assert_eq!(&code, want, "counter {counter}");
        }
    }

    #[test]
    fn rfc6238_vectors_at_t59() {
        // RFC 6238 appendix B, 8-digit codes at unix time 59.
        let code = generate_totp(RFC4226_SECRET, 30, 8, HashAlgorithm::Sha1, 59).unwrap();
        assert_eq!(code, "94287082");

        let sha256_secret = b"12345678901234567890123456789012";
        let code = generate_totp(sha256_secret, 30, 8, HashAlgorithm::Sha256, 59).unwrap();
        assert_eq!(code, "46119246");

        let sha512_secret = b"1234567890123456789012345678901234567890123456789012345678901234";
        let code = generate_totp(sha512_secret, 30, 8, HashAlgorithm::Sha512, 59).unwrap();
        assert_eq!(code, "90693936");
    }

    #[test]
    fn rfc6238_vector_at_t1111111109() {
        let code =
            generate_totp(RFC4226_SECRET, 30, 8, HashAlgorithm::Sha1, 1_111_111_109).unwrap();
        assert_eq!(code, "07081804");
    }

    #[test]
    fn rejects_out_of_range_digits() {
        assert!(generate_hotp(RFC4226_SECRET, 0, 5, HashAlgorithm::Sha1).is_err());
        assert!(generate_hotp(RFC4226_SECRET, 0, 9, HashAlgorithm::Sha1).is_err());
    }

    #[test]
    fn rejects_zero_period() {
        let result = generate_totp(RFC4226_SECRET, 0, 6, HashAlgorithm::Sha1, 59);
        assert!(matches!(result, Err(OtpVaultError::InvalidOtpParams(_))));
    }

    #[test]
    fn remaining_counts_down_to_rollover() {
        assert_eq!(totp_remaining(30, 0), 30);
        assert_eq!(totp_remaining(30, 29), 1);
        assert_eq!(totp_remaining(30, 30), 30);
    }

    #[test]
    fn code_for_hotp_entry_uses_stored_counter() {
        let mut entry = crate::vault::Entry::hotp("a", "b", RFC4226_SECRET.to_vec());
        entry.kind = crate::vault::OtpKind::Hotp { counter: 4 };

        let code = code_for_entry(&entry, 0).unwrap();
        assert_eq!(code, "338314");
    }
}
