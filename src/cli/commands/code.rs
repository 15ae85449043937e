//! `otpvault code` — print the current code for an entry.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::cli::{find_entry_id, open_vault, output, Cli};
use crate::errors::{OtpVaultError, Result};
use crate::vault::{otp, OtpKind};

/// Execute the `code` command.
pub fn execute(cli: &Cli, selector: &str) -> Result<()> {
    let mut manager = open_vault(cli)?;
    let id = find_entry_id(&manager, selector)?;

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| OtpVaultError::CommandFailed(format!("system clock: {e}")))?
        .as_secs();

    let kind = manager
        .keys()?
        .iter()
        .find(|e| e.id == id)
        .map(|e| e.kind)
        .ok_or(OtpVaultError::EntryNotFound(id))?;

    let code = manager.next_code(id, now)?;
    println!("{code}");

    match kind {
        OtpKind::Totp { period } => {
            output::tip(&format!(
                "valid for {} more seconds",
                otp::totp_remaining(period, now)
            ));
        }
        OtpKind::Hotp { .. } => {
            // The counter advanced; persist it so the code is never reused.
            manager.save()?;
        }
    }

    Ok(())
}
