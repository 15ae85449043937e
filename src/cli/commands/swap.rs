//! `otpvault swap` — reorder two entries.

use crate::cli::{find_entry_id, open_vault, output, Cli};
use crate::errors::Result;

/// Execute the `swap` command.
pub fn execute(cli: &Cli, a: &str, b: &str) -> Result<()> {
    let mut manager = open_vault(cli)?;

    let id_a = find_entry_id(&manager, a)?;
    let id_b = find_entry_id(&manager, b)?;

    manager.swap_keys(id_a, id_b)?;
    manager.save()?;

    output::success(&format!("Swapped '{a}' and '{b}'"));
    Ok(())
}
