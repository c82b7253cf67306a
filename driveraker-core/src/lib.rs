//! driveraker core library: the persistent sync index, its snapshot format,
//! configuration, and errors.
//!
//! - [`index`]: [`HashIndex`], a bucketed hash table with doubling resize
//! - [`snapshot`]: JSON save / load for the index
//! - [`config`]: `~/.driveraker/config.yaml`
//! - [`types`]: keys, entries, export naming convention
//! - [`error`]: [`IndexError`], [`ConfigError`]

pub mod config;
pub mod error;
pub mod index;
pub mod snapshot;
pub mod types;

pub use config::{Config, IndexSettings};
pub use error::{ConfigError, IndexError};
pub use index::{checksum, HashIndex, IndexStats, DEFAULT_FILL_FACTOR, MAX_FILL_FACTOR};
pub use types::{DocumentKey, ExportConvention, IndexEntry};
