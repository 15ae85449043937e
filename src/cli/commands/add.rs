//! `otpvault add` — add a TOTP or HOTP entry.

use crate::cli::{log_audit, open_vault, output, Cli};
use crate::errors::{OtpVaultError, Result};
use crate::importers::{decode_base32_secret, parse_algorithm};
use crate::vault::{Entry, OtpKind};

/// Execute the `add` command.
#[allow(clippy::too_many_arguments)]
pub fn execute(
    cli: &Cli,
    name: &str,
    issuer: &str,
    secret: Option<&str>,
    hotp: bool,
    digits: u32,
    algorithm: &str,
    period: u32,
) -> Result<()> {
    if name.is_empty() {
        return Err(OtpVaultError::CommandFailed(
            "entry name cannot be empty".into(),
        ));
    }

    let algorithm = parse_algorithm(algorithm)
        .map_err(|_| OtpVaultError::CommandFailed(format!("unknown algorithm '{algorithm}'")))?;

    // Prompt for the secret if it was not passed on the command line
    // (keeps it out of shell history).
    let secret_text = match secret {
        Some(s) => s.to_string(),
        None => dialoguer::Password::new()
            .with_prompt("Base32 secret")
            .interact()
            .map_err(|e| OtpVaultError::CommandFailed(format!("secret prompt: {e}")))?,
    };
    let secret_bytes = decode_base32_secret(&secret_text)
        .map_err(|_| OtpVaultError::CommandFailed("secret is not valid base32".into()))?;

    let mut manager = open_vault(cli)?;

    let mut entry = if hotp {
        Entry::hotp(name, issuer, secret_bytes)
    } else {
        Entry::totp(name, issuer, secret_bytes)
    };
    entry.digits = digits;
    entry.algorithm = algorithm;
    if !hotp {
        entry.kind = OtpKind::Totp { period };
    }

    manager.add_key(entry)?;
    manager.save()?;

    log_audit(manager.path(), "add", Some(name), Some(issuer));

    output::success(&format!("Added '{issuer}:{name}' to the vault"));
    Ok(())
}
