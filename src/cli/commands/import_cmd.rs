//! `otpvault import` — import entries from a backup file.
//!
//! The file format is auto-detected by the importer registry: OtpVault's
//! own plaintext container, a JSON-array backup, or an `otpauth://` URI
//! list.  Imported entries are appended through the same path as
//! manually added ones, so duplicate-id rules apply.

use std::fs;
use std::path::Path;

use crate::cli::{log_audit, open_vault, output, Cli};
use crate::errors::{OtpVaultError, Result};
use crate::importers;

/// Execute the `import` command.
pub fn execute(cli: &Cli, file_path: &str) -> Result<()> {
    let source = Path::new(file_path);
    if !source.exists() {
        return Err(OtpVaultError::CommandFailed(format!(
            "import file not found: {}",
            source.display()
        )));
    }

    let data = fs::read(source)?;
    let entries = importers::import(&data)?;

    if entries.is_empty() {
        output::warning("No entries found in the import file.");
        return Ok(());
    }

    let mut manager = open_vault(cli)?;

    let mut count = 0;
    for entry in entries {
        let label = format!("{}:{}", entry.issuer, entry.name);
        manager.add_key(entry)?;
        output::info(&format!("  + {label}"));
        count += 1;
    }

    manager.save()?;

    log_audit(
        manager.path(),
        "import",
        None,
        Some(&format!("{count} entries from {}", source.display())),
    );

    output::success(&format!(
        "Imported {} entries from {}",
        count,
        source.display()
    ));

    Ok(())
}
