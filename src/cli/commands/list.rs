//! `otpvault list` — show all entries in vault order.

use crate::cli::{open_vault, output, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let manager = open_vault(cli)?;
    output::print_entries_table(manager.keys()?);
    Ok(())
}
