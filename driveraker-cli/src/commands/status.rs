//! `driveraker status`: shape and contents of the persisted index.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use driveraker_core::{config, HashIndex, IndexStats};

use super::home_dir;

/// Arguments for `driveraker status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,

    /// Also list every stored key.
    #[arg(long)]
    pub keys: bool,
}

#[derive(Serialize)]
struct StatusJson {
    sync_root: PathBuf,
    index_path: PathBuf,
    exists: bool,
    stats: IndexStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    keys: Option<Vec<String>>,
}

#[derive(Tabled)]
struct StatsRow {
    #[tabled(rename = "entries")]
    size: usize,
    #[tabled(rename = "buckets")]
    bucket_count: usize,
    #[tabled(rename = "capacity")]
    capacity: usize,
    #[tabled(rename = "fill factor")]
    fill_factor: usize,
    #[tabled(rename = "empty buckets")]
    empty_buckets: usize,
    #[tabled(rename = "longest chain")]
    longest_chain: usize,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let home = home_dir()?;
        let config = config::load_at(&home).context("failed to load config")?;
        let index_path = config.index_path_at(&home);
        let exists = index_path.exists();
        let index = HashIndex::load_from_file(&index_path, 1, config.index.fill_factor)
            .with_context(|| format!("failed to load index at {}", index_path.display()))?;

        let keys = self.keys.then(|| sorted_keys(&index));

        if self.json {
            let payload = StatusJson {
                sync_root: config.sync_root,
                index_path,
                exists,
                stats: index.stats(),
                keys,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload)
                    .context("failed to serialize status JSON")?
            );
            return Ok(());
        }

        println!(
            "driveraker v{} | sync root {}",
            env!("CARGO_PKG_VERSION"),
            config.sync_root.display()
        );
        if !exists {
            println!(
                "{} no index at {} yet; run `driveraker resolve`",
                "■".bright_black().bold(),
                index_path.display()
            );
            return Ok(());
        }
        println!("{} {}", "■".green().bold(), index_path.display());

        let stats = index.stats();
        let mut table = Table::new(vec![StatsRow {
            size: stats.size,
            bucket_count: stats.bucket_count,
            capacity: stats.capacity,
            fill_factor: stats.fill_factor,
            empty_buckets: stats.empty_buckets,
            longest_chain: stats.longest_chain,
        }]);
        table.with(Style::rounded());
        println!("{table}");

        if let Some(keys) = keys {
            for key in keys {
                println!("  ·  {key}");
            }
        }
        Ok(())
    }
}

fn sorted_keys(index: &HashIndex) -> Vec<String> {
    let mut keys: Vec<String> = index.iter().map(|e| e.key.clone()).collect();
    keys.sort();
    keys
}
