//! `otpvault slot` — manage key slots.
//!
//! Slots can be listed without a credential (they sit in the container
//! header); every mutation unlocks the vault first.

use crate::cli::{
    log_audit, open_vault, output, parse_slot_id, prompt_new_password, vault_path, Cli,
};
use crate::config::Settings;
use crate::crypto::slot::Credential;
use crate::errors::{OtpVaultError, Result};
use crate::vault::VaultManager;

/// Execute `slot list`.
pub fn execute_list(cli: &Cli) -> Result<()> {
    let path = vault_path(cli)?;
    let mut manager = VaultManager::new(&path);
    manager.load()?;

    output::print_slots_table(manager.slots());
    Ok(())
}

/// Execute `slot add-password`.
pub fn execute_add_password(cli: &Cli) -> Result<()> {
    let mut manager = open_vault(cli)?;

    let cwd = std::env::current_dir()?;
    let settings = Settings::load(&cwd)?;

    output::info("Choose a password for the new slot.");
    let password = prompt_new_password()?;
    let id = manager.add_password_slot(password.as_bytes(), &settings.argon2_params())?;
    manager.save()?;

    log_audit(manager.path(), "slot-add", None, Some("password"));

    output::success(&format!("Added password slot {id:016x}"));
    Ok(())
}

/// Execute `slot add-keyring`.
#[cfg(feature = "keyring-store")]
pub fn execute_add_keyring(cli: &Cli, handle: &str) -> Result<()> {
    use crate::keyring::OsKeyring;

    let mut manager = open_vault(cli)?;

    let provider = OsKeyring;
    provider.create_key(handle)?;

    let id = manager.add_key_handle_slot(handle, &provider)?;
    manager.save()?;

    log_audit(manager.path(), "slot-add", None, Some("keyring"));

    output::success(&format!("Added keyring slot {id:016x} (handle '{handle}')"));
    output::tip("This vault now unlocks silently while the keyring is available.");
    Ok(())
}

/// Execute `slot remove`.
pub fn execute_remove(cli: &Cli, id: &str) -> Result<()> {
    let slot_id = parse_slot_id(id)?;
    let mut manager = open_vault(cli)?;

    manager.remove_slot(slot_id)?;
    manager.save()?;

    log_audit(manager.path(), "slot-remove", None, Some(id));

    output::success(&format!("Removed slot {slot_id:016x}"));
    Ok(())
}

/// Execute `slot change-password`.
pub fn execute_change_password(cli: &Cli, id: &str) -> Result<()> {
    let slot_id = parse_slot_id(id)?;
    let mut manager = open_vault(cli)?;

    let old = dialoguer::Password::new()
        .with_prompt("Current slot password")
        .interact()
        .map_err(|e| OtpVaultError::CommandFailed(format!("password prompt: {e}")))?;

    output::info("Choose the new password.");
    let new = prompt_new_password()?;

    manager.replace_slot_credential(
        slot_id,
        &Credential::Password(old.as_bytes()),
        &Credential::Password(new.as_bytes()),
    )?;
    manager.save()?;

    log_audit(manager.path(), "slot-change-password", None, Some(id));

    output::success(&format!("Changed password for slot {slot_id:016x}"));
    Ok(())
}
