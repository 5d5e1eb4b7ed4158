use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use xrate::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// List exchange rates, favorites first
    Rates {
        /// Only show currencies whose code or name contains this text
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Toggle a currency as favorite
    Favorite {
        /// Currency code, e.g. EUR
        code: String,
    },
    /// Convert an amount of USD into another currency
    Convert {
        /// Target currency code, e.g. KRW
        code: String,
        /// Amount in USD
        amount: String,
    },
    /// Reopen the last viewed screen
    Resume,
}

impl From<Commands> for xrate::AppCommand {
    fn from(cmd: Commands) -> xrate::AppCommand {
        match cmd {
            Commands::Rates { filter } => xrate::AppCommand::Rates { filter },
            Commands::Favorite { code } => xrate::AppCommand::Favorite { code },
            Commands::Convert { code, amount } => xrate::AppCommand::Convert { code, amount },
            Commands::Resume => xrate::AppCommand::Resume,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => xrate::cli::setup::setup(),
        Some(cmd) => xrate::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
