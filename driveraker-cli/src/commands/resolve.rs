//! `driveraker resolve`: compute this run's work-set and update the index.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgGroup, Args};
use colored::Colorize;

use driveraker_core::config;
use driveraker_sync::{
    pipeline::{self, RunSummary},
    report, SyncRun,
};

use super::home_dir;

/// Arguments for `driveraker resolve`.
#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("input")
        .args(["listing", "report", "sync_output"])
        .required(true)
        .multiple(true)
))]
pub struct ResolveArgs {
    /// File with one absolute document path per line (`-` for stdin).
    #[arg(long, conflicts_with = "sync_output")]
    pub listing: Option<PathBuf>,

    /// File holding the modified-document status report.
    #[arg(long, conflicts_with = "sync_output")]
    pub report: Option<PathBuf>,

    /// Raw output of the sync client; supplies both the listing and the report.
    #[arg(long)]
    pub sync_output: Option<PathBuf>,

    /// Override the configured sync root.
    #[arg(long)]
    pub sync_root: Option<PathBuf>,

    /// Resolve without saving the index.
    #[arg(long)]
    pub dry_run: bool,

    /// Print relative keys instead of absolute paths.
    #[arg(long, conflicts_with = "json")]
    pub keys: bool,

    /// Emit the full run summary as JSON.
    #[arg(long)]
    pub json: bool,
}

impl ResolveArgs {
    pub fn run(self) -> Result<()> {
        let home = home_dir()?;
        let mut config = config::load_at(&home).context("failed to load config")?;
        if let Some(root) = &self.sync_root {
            config.sync_root = root.clone();
            config.validate().context("invalid --sync-root")?;
        }

        let sync_run = self.read_inputs()?;
        tracing::debug!(
            listed = sync_run.full_listing.len(),
            report_bytes = sync_run.modified_report.len(),
            "read run inputs"
        );
        let summary = pipeline::run(&home, &config, &sync_run, self.dry_run)
            .context("resolve failed; index left as it was on disk")?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).context("failed to serialize summary")?
            );
            return Ok(());
        }

        for item in &summary.change_set.work_set {
            if self.keys {
                println!("{}", item.key);
            } else {
                println!("{}", item.path.display());
            }
        }
        print_summary(&summary, self.dry_run);
        Ok(())
    }

    fn read_inputs(&self) -> Result<SyncRun> {
        if let Some(path) = &self.sync_output {
            let output = read_text(path)?;
            return Ok(SyncRun::from_sync_output(&output));
        }

        let full_listing = match &self.listing {
            Some(path) => report::parse_listing(&read_text(path)?),
            None => Vec::new(),
        };
        let modified_report = match &self.report {
            Some(path) => read_text(path)?,
            None => String::new(),
        };
        Ok(SyncRun::new(full_listing, modified_report))
    }
}

fn read_text(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    Ok(pipeline::read_input(path)?)
}

/// Human summary on stderr; stdout carries only the work-set.
fn print_summary(summary: &RunSummary, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    let set = &summary.change_set;
    let line = format!(
        "{prefix}✓ {} to process ({} new, {} modified) | index {} → {} entries",
        set.work_set.len(),
        set.new_documents.len(),
        set.modified_documents.len(),
        summary.entries_before,
        summary.entries_after,
    );
    if set.is_empty() {
        eprintln!("{}", line.bright_black());
    } else {
        eprintln!("{}", line.green());
    }
    if summary.resized() {
        eprintln!(
            "  index grew {} → {} buckets",
            summary.buckets_before, summary.buckets_after
        );
    }
}
