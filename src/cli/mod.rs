//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::{Path, PathBuf};

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::crypto::slot::{Credential, Slot};
use crate::errors::{OtpVaultError, Result};
use crate::vault::VaultManager;

/// Minimum password length to prevent trivially weak passwords.
const MIN_PASSWORD_LEN: usize = 8;

/// OtpVault CLI: encrypted TOTP/HOTP credential vault.
#[derive(Parser)]
#[command(
    name = "otpvault",
    about = "Encrypted vault for TOTP/HOTP credentials",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the vault file (default: from .otpvault.toml or .otpvault/main.vault)
    #[arg(long, global = true)]
    pub vault: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Initialize a new vault with a password slot
    Init,

    /// Add an OTP entry
    Add {
        /// Account name (e.g. alice@example.com)
        name: String,
        /// Issuing service (e.g. GitHub)
        issuer: String,
        /// Base32 secret (omit for interactive prompt)
        #[arg(long)]
        secret: Option<String>,
        /// Create an HOTP entry instead of TOTP
        #[arg(long)]
        hotp: bool,
        /// Number of code digits
        #[arg(long, default_value = "6")]
        digits: u32,
        /// Hash algorithm: SHA1, SHA256, or SHA512
        #[arg(long, default_value = "SHA1")]
        algorithm: String,
        /// TOTP period in seconds
        #[arg(long, default_value = "30")]
        period: u32,
    },

    /// List all entries
    List,

    /// Show the current code for an entry
    Code {
        /// Entry name or list position
        entry: String,
    },

    /// Delete an entry
    Delete {
        /// Entry name or list position
        entry: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Swap the positions of two entries
    Swap {
        /// First entry name or list position
        a: String,
        /// Second entry name or list position
        b: String,
    },

    /// Import entries from a backup file (format auto-detected)
    Import {
        /// Path to the file to import
        file: String,
    },

    /// Export the vault to a sibling file
    Export {
        /// Export decrypted entries instead of the encrypted container
        #[arg(long)]
        plain: bool,
    },

    /// Manage key slots
    Slot {
        #[command(subcommand)]
        action: SlotAction,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        shell: String,
    },

    /// View the audit log of vault operations
    #[cfg(feature = "audit-log")]
    Audit {
        /// Number of entries to show (default: 50)
        #[arg(long, default_value = "50")]
        last: usize,
    },
}

/// Slot subcommands.
#[derive(clap::Subcommand)]
pub enum SlotAction {
    /// List all slots
    List,

    /// Add another password slot
    AddPassword,

    /// Add a slot unlocked through the OS keyring
    #[cfg(feature = "keyring-store")]
    AddKeyring {
        /// Handle name for the keyring entry
        handle: String,
    },

    /// Remove a slot by id
    Remove {
        /// Slot id (see `slot list`)
        id: String,
    },

    /// Change the password of a password slot
    ChangePassword {
        /// Slot id (see `slot list`)
        id: String,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Get the vault password, trying in order:
/// 1. `OTPVAULT_PASSWORD` env var (scripting/CI)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var("OTPVAULT_PASSWORD") {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter vault password")
        .interact()
        .map_err(|e| OtpVaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new password with confirmation (used during `init`).
///
/// Also respects `OTPVAULT_PASSWORD` for scripted usage.
/// Enforces a minimum password length.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var("OTPVAULT_PASSWORD") {
        if !pw.is_empty() {
            if pw.len() < MIN_PASSWORD_LEN {
                return Err(OtpVaultError::CommandFailed(format!(
                    "password must be at least {MIN_PASSWORD_LEN} characters"
                )));
            }
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose vault password")
            .with_confirmation(
                "Confirm vault password",
                "Passwords do not match, try again",
            )
            .interact()
            .map_err(|e| OtpVaultError::CommandFailed(format!("password prompt: {e}")))?;

        if password.len() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

/// Build the full path to the vault file from the CLI arguments.
///
/// `--vault` wins; otherwise `.otpvault.toml` (or its defaults) decides.
pub fn vault_path(cli: &Cli) -> Result<PathBuf> {
    if let Some(ref path) = cli.vault {
        return Ok(PathBuf::from(path));
    }

    let cwd = std::env::current_dir()?;
    let settings = Settings::load(&cwd)?;
    Ok(settings.vault_path(&cwd))
}

/// Load and unlock the vault at the CLI's path.
///
/// Key-handle slots are tried first (silent keyring unlock, when the
/// feature is enabled); if none succeeds the user is asked for the
/// password, which is tried against every password slot.
pub fn open_vault(cli: &Cli) -> Result<VaultManager> {
    let path = vault_path(cli)?;
    let mut manager = VaultManager::new(&path);
    manager.load()?;

    #[cfg(feature = "keyring-store")]
    {
        let provider = crate::keyring::OsKeyring;
        let handle_slots: Vec<u64> = manager
            .slots()
            .iter()
            .filter(|s| matches!(s, Slot::KeyHandle(_)))
            .map(|s| s.id())
            .collect();
        for id in handle_slots {
            if manager
                .unlock(id, &Credential::KeyRelease(&provider))
                .is_ok()
            {
                return Ok(manager);
            }
        }
    }

    let password_slots: Vec<u64> = manager
        .slots()
        .iter()
        .filter(|s| matches!(s, Slot::Password(_)))
        .map(|s| s.id())
        .collect();
    if password_slots.is_empty() {
        return Err(OtpVaultError::CommandFailed(
            "this vault has no password slot to unlock with".into(),
        ));
    }

    let password = prompt_password()?;
    for id in password_slots {
        if manager
            .unlock(id, &Credential::Password(password.as_bytes()))
            .is_ok()
        {
            return Ok(manager);
        }
    }

    Err(OtpVaultError::WrongCredential)
}

/// Resolve an entry selector (list position or name) to an entry id.
pub fn find_entry_id(manager: &VaultManager, selector: &str) -> Result<u64> {
    let entries = manager.keys()?;

    // A small number selects by 1-based list position.
    if let Ok(position) = selector.parse::<usize>() {
        return entries
            .get(position.wrapping_sub(1))
            .map(|e| e.id)
            .ok_or_else(|| {
                OtpVaultError::CommandFailed(format!("no entry at position {position}"))
            });
    }

    let matches: Vec<&crate::vault::Entry> = entries
        .iter()
        .filter(|e| e.name == selector || format!("{}:{}", e.issuer, e.name) == selector)
        .collect();

    match matches.len() {
        0 => Err(OtpVaultError::CommandFailed(format!(
            "no entry named '{selector}'"
        ))),
        1 => Ok(matches[0].id),
        _ => Err(OtpVaultError::CommandFailed(format!(
            "'{selector}' is ambiguous — use `issuer:name` or a list position"
        ))),
    }
}

/// Parse a slot id as printed by `slot list` (hex).
pub fn parse_slot_id(id: &str) -> Result<u64> {
    u64::from_str_radix(id.trim_start_matches("0x"), 16)
        .map_err(|_| OtpVaultError::CommandFailed(format!("'{id}' is not a valid slot id")))
}

/// Record an audit event next to the vault file (no-op without the feature).
#[cfg(feature = "audit-log")]
pub(crate) fn log_audit(vault: &Path, op: &str, entry: Option<&str>, details: Option<&str>) {
    crate::audit::log_audit(vault, op, entry, details);
}

#[cfg(not(feature = "audit-log"))]
pub(crate) fn log_audit(_vault: &Path, _op: &str, _entry: Option<&str>, _details: Option<&str>) {}
