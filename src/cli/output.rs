//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::crypto::slot::Slot;
use crate::vault::{Entry, OtpKind};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print the entry collection as a table, in vault order.
pub fn print_entries_table(entries: &[Entry]) {
    if entries.is_empty() {
        info("No entries in this vault yet.");
        tip("Run `otpvault add <name> <issuer>` to add your first entry.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Name", "Issuer", "Type", "Digits"]);

    for (position, e) in entries.iter().enumerate() {
        let kind = match e.kind {
            OtpKind::Totp { period } => format!("TOTP/{period}s"),
            OtpKind::Hotp { counter } => format!("HOTP@{counter}"),
        };
        table.add_row(vec![
            (position + 1).to_string(),
            e.name.clone(),
            e.issuer.clone(),
            kind,
            e.digits.to_string(),
        ]);
    }

    println!("{table}");
}

/// Print the slot list as a table.
pub fn print_slots_table(slots: &[Slot]) {
    if slots.is_empty() {
        warning("This vault has no slots — it cannot be unlocked once locked.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Kind"]);

    for slot in slots {
        table.add_row(vec![format!("{:016x}", slot.id()), slot.kind().to_string()]);
    }

    println!("{table}");
}
