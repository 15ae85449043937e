//! `otpvault audit` — view the operation history.

use comfy_table::{ContentArrangement, Table};

use crate::audit::AuditLog;
use crate::cli::{output, vault_path, Cli};
use crate::errors::Result;

/// Execute the `audit` command.
pub fn execute(cli: &Cli, last: usize) -> Result<()> {
    let path = vault_path(cli)?;
    let vault_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."));

    let Some(audit) = AuditLog::open(vault_dir) else {
        output::warning("Audit log is unavailable for this vault.");
        return Ok(());
    };

    let entries = audit.query(last, None)?;
    if entries.is_empty() {
        output::info("No audit entries recorded yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Operation", "Entry", "Details"]);

    for e in &entries {
        table.add_row(vec![
            e.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            e.operation.clone(),
            e.entry_name.clone().unwrap_or_default(),
            e.details.clone().unwrap_or_default(),
        ]);
    }

    println!("{table}");
    Ok(())
}
