//! `otpvault delete` — remove an entry from the vault.

use crate::cli::{find_entry_id, log_audit, open_vault, output, Cli};
use crate::errors::{OtpVaultError, Result};

/// Execute the `delete` command.
pub fn execute(cli: &Cli, selector: &str, force: bool) -> Result<()> {
    let mut manager = open_vault(cli)?;
    let id = find_entry_id(&manager, selector)?;

    let label = manager
        .keys()?
        .iter()
        .find(|e| e.id == id)
        .map(|e| format!("{}:{}", e.issuer, e.name))
        .ok_or(OtpVaultError::EntryNotFound(id))?;

    if !force {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!("Delete '{label}'? The secret cannot be recovered"))
            .default(false)
            .interact()
            .map_err(|e| OtpVaultError::CommandFailed(format!("confirm prompt: {e}")))?;
        if !confirmed {
            return Err(OtpVaultError::UserCancelled);
        }
    }

    manager.remove_key(id)?;
    manager.save()?;

    log_audit(manager.path(), "delete", Some(&label), None);

    output::success(&format!("Deleted '{label}'"));
    Ok(())
}
