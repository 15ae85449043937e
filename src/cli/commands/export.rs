//! `otpvault export` — export the vault to a sibling file.
//!
//! The default export copies the encrypted container verbatim and needs
//! no credential.  `--plain` decrypts first and writes an unencrypted
//! (but structurally identical) container, which `import` can read back.

use crate::cli::{log_audit, open_vault, output, vault_path, Cli};
use crate::errors::Result;
use crate::vault::VaultManager;

/// Execute the `export` command.
pub fn execute(cli: &Cli, plain: bool) -> Result<()> {
    let dest = if plain {
        let manager = open_vault(cli)?;
        let dest = manager.export(false)?;
        log_audit(manager.path(), "export", None, Some("plaintext"));
        dest
    } else {
        // Encrypted export works on the locked container; no credential.
        let path = vault_path(cli)?;
        let mut manager = VaultManager::new(&path);
        manager.load()?;
        let dest = manager.export(true)?;
        log_audit(&path, "export", None, Some("encrypted"));
        dest
    };

    if plain {
        output::warning("The exported file contains decrypted secrets — handle with care.");
    }
    output::success(&format!("Exported vault to {}", dest.display()));
    Ok(())
}
