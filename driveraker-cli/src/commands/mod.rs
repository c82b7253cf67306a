pub mod init;
pub mod lookup;
pub mod resolve;
pub mod status;

use std::path::PathBuf;

use anyhow::{Context, Result};

use driveraker_core::config;

pub(crate) fn home_dir() -> Result<PathBuf> {
    config::home().context("could not determine home directory")
}
