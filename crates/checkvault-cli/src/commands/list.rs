//! List command
//!
//! Usage: checkvault list [--json]

use checkvault_core::CheckvaultConfig;
use checkvault_store::fs::list_backups;
use clap::Args;

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Print the listing as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: ListArgs, config: &CheckvaultConfig) -> anyhow::Result<()> {
    let backups = list_backups(&config.backup.dir, &config.backup.extension)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&backups)?);
        return Ok(());
    }

    if backups.is_empty() {
        println!("No backups in {}", config.backup.dir.display());
        return Ok(());
    }

    for backup in &backups {
        let size = backup
            .size_bytes
            .map(|b| format!("{:.2} KiB", b as f64 / 1024.0))
            .unwrap_or_else(|| "?".to_string());
        let marker = if backup.has_descriptor { "" } else { "  (no descriptor)" };
        println!("{}  {:>12}{}", backup.name, size, marker);
    }
    println!(
        "{} of at most {} backups",
        backups.len(),
        config.backup.keep_count
    );
    Ok(())
}
