//! checkvault CLI
//!
//! Runs the scheduled backup job, or one of its steps by hand.

use checkvault_core::logging_facility::{self, Profile};
use clap::{Parser, Subcommand};

mod commands;
mod settings;

#[derive(Debug, Parser)]
#[command(name = "checkvault")]
#[command(about = "checkvault - scheduled store backups with retention", long_about = None)]
struct Cli {
    /// Logging profile: dev or prod (JSON)
    #[arg(long, global = true, default_value = "dev")]
    log: Profile,

    #[command(flatten)]
    settings: settings::SettingsArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the scheduler until interrupted
    Run(commands::run::RunArgs),
    /// Take one backup now
    Backup(commands::backup::BackupArgs),
    /// Apply retention without taking a backup
    Prune,
    /// List backups in the backup directory
    List(commands::list::ListArgs),
    /// Show upcoming scheduled runs
    Next(commands::next::NextArgs),
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    logging_facility::init(cli.log);

    let result = match cli.settings.load() {
        Ok(config) => match cli.command {
            Commands::Run(args) => commands::run::execute(args, &config).await,
            Commands::Backup(args) => commands::backup::execute(args, &config).await,
            Commands::Prune => commands::prune::execute(&config),
            Commands::List(args) => commands::list::execute(args, &config),
            Commands::Next(args) => commands::next::execute(args, &config),
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
