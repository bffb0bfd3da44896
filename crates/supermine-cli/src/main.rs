use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "supermine-cli", version, about = "SuperMine CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mining session control
    Mine {
        #[command(subcommand)]
        action: commands::mine::MineAction,
    },
    /// Session time and hashrate boosts
    Boost {
        #[command(subcommand)]
        action: commands::boost::BoostAction,
    },
    /// Bonus reward programs
    Reward {
        #[command(subcommand)]
        action: commands::reward::RewardAction,
    },
    /// Balances and point conversion
    Ledger {
        #[command(subcommand)]
        action: commands::ledger::LedgerAction,
    },
    /// Backend account import/export
    Account {
        #[command(subcommand)]
        action: commands::account::AccountAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        shell: Shell,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SUPERMINE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Mine { action } => commands::mine::run(action),
        Commands::Boost { action } => commands::boost::run(action),
        Commands::Reward { action } => commands::reward::run(action),
        Commands::Ledger { action } => commands::ledger::run(action),
        Commands::Account { action } => commands::account::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "supermine-cli", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
