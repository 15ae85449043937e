use clap::Parser;
use otpvault::cli::{Cli, Commands, SlotAction};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => otpvault::cli::commands::init::execute(&cli),
        Commands::Add {
            ref name,
            ref issuer,
            ref secret,
            hotp,
            digits,
            ref algorithm,
            period,
        } => otpvault::cli::commands::add::execute(
            &cli,
            name,
            issuer,
            secret.as_deref(),
            hotp,
            digits,
            algorithm,
            period,
        ),
        Commands::List => otpvault::cli::commands::list::execute(&cli),
        Commands::Code { ref entry } => otpvault::cli::commands::code::execute(&cli, entry),
        Commands::Delete { ref entry, force } => {
            otpvault::cli::commands::delete::execute(&cli, entry, force)
        }
        Commands::Swap { ref a, ref b } => otpvault::cli::commands::swap::execute(&cli, a, b),
        Commands::Import { ref file } => otpvault::cli::commands::import_cmd::execute(&cli, file),
        Commands::Export { plain } => otpvault::cli::commands::export::execute(&cli, plain),
        Commands::Slot { ref action } => match action {
            SlotAction::List => otpvault::cli::commands::slot::execute_list(&cli),
            SlotAction::AddPassword => otpvault::cli::commands::slot::execute_add_password(&cli),
            #[cfg(feature = "keyring-store")]
            SlotAction::AddKeyring { ref handle } => {
                otpvault::cli::commands::slot::execute_add_keyring(&cli, handle)
            }
            SlotAction::Remove { ref id } => {
                otpvault::cli::commands::slot::execute_remove(&cli, id)
            }
            SlotAction::ChangePassword { ref id } => {
                otpvault::cli::commands::slot::execute_change_password(&cli, id)
            }
        },
        Commands::Completions { ref shell } => otpvault::cli::commands::completions::execute(shell),
        #[cfg(feature = "audit-log")]
        Commands::Audit { last } => otpvault::cli::commands::audit_cmd::execute(&cli, last),
    };

    if let Err(e) = result {
        otpvault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
