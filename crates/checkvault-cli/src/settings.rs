//! Configuration flags shared by every command

use anyhow::Context;
use checkvault_core::CheckvaultConfig;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct SettingsArgs {
    /// Configuration file (default: ./checkvault.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override store.url
    #[arg(long, global = true)]
    pub store_url: Option<String>,

    /// Override backup.dir
    #[arg(long, global = true)]
    pub backup_dir: Option<PathBuf>,

    /// Override backup.keep_count
    #[arg(long, global = true)]
    pub keep_count: Option<usize>,
}

impl SettingsArgs {
    /// Defaults, then file, then `CHECKVAULT__*` environment, then flags
    pub fn load(&self) -> anyhow::Result<CheckvaultConfig> {
        let mut config = CheckvaultConfig::load(self.config.as_deref())
            .context("cannot load configuration")?;

        if let Some(url) = &self.store_url {
            config.store.url = url.clone();
        }
        if let Some(dir) = &self.backup_dir {
            config.backup.dir = dir.clone();
        }
        if let Some(keep) = self.keep_count {
            config.backup.keep_count = keep;
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}
