//! `driveraker init --sync-root <dir> [--index-path <file>] [--fill-factor <n>]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use driveraker_core::{config, Config};

use super::home_dir;

/// Write ~/.driveraker/config.yaml.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Local directory the remote store is mirrored into.
    #[arg(long)]
    pub sync_root: PathBuf,

    /// Where to keep the index snapshot (default ~/.driveraker/index.json).
    #[arg(long)]
    pub index_path: Option<PathBuf>,

    /// Entries per bucket before the index doubles its bucket count.
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub fill_factor: Option<u16>,

    /// Remote folder name, recorded for reference.
    #[arg(long)]
    pub remote_directory: Option<String>,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let home = home_dir()?;

        let mut wanted = Config::new(self.sync_root);
        wanted.index_path = self.index_path;
        wanted.remote_directory = self.remote_directory;
        if let Some(fill_factor) = self.fill_factor {
            wanted.index.fill_factor = usize::from(fill_factor);
        }

        let existed = config::config_path_at(&home).exists();
        let config = config::init_at(&home, wanted).context("failed to write config")?;

        if existed {
            println!("✓ Config already present; left unchanged");
        } else {
            println!("✓ Initialized driveraker");
        }
        println!("  Sync root: {}", config.sync_root.display());
        println!("  Index:     {}", config.index_path_at(&home).display());
        println!("  Saved to:  {}", config::config_path_at(&home).display());
        Ok(())
    }
}
