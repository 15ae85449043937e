//! `otpvault init` — create a new vault with a password slot.

use crate::cli::{log_audit, output, prompt_new_password, vault_path, Cli};
use crate::config::Settings;
use crate::errors::Result;
use crate::vault::VaultManager;

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let path = vault_path(cli)?;

    let cwd = std::env::current_dir()?;
    let settings = Settings::load(&cwd)?;

    let mut manager = VaultManager::create(&path)?;

    // The vault starts slotless; install the password slot before the
    // first save so the container is always unlockable.
    let password = prompt_new_password()?;
    manager.add_password_slot(password.as_bytes(), &settings.argon2_params())?;

    let saved = manager.save()?;

    log_audit(&path, "init", None, Some("vault created"));

    output::success(&format!("Created new vault at {}", saved.display()));
    output::tip("Run `otpvault add <name> <issuer>` to add your first entry.");
    Ok(())
}
