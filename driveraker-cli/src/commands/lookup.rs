//! `driveraker lookup <key>`: print the stored value for one key.

use anyhow::{Context, Result};
use clap::Args;

use driveraker_core::{config, HashIndex};

use super::home_dir;

/// Arguments for `driveraker lookup`.
#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Sync-root-relative key, e.g. `posts/hello_exports/hello.docx`.
    pub key: String,
}

impl LookupArgs {
    pub fn run(self) -> Result<()> {
        let home = home_dir()?;
        let config = config::load_at(&home).context("failed to load config")?;
        let path = config.index_path_at(&home);
        let index = HashIndex::load_from_file(&path, 1, config.index.fill_factor)
            .with_context(|| format!("failed to load index at {}", path.display()))?;

        let value = index.require(&self.key)?;
        println!("{value}");
        Ok(())
    }
}
