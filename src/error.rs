//! Fatal startup errors
//!
//! Only configuration loading and opening the sink can fail. Everything that
//! happens while emitting a line degrades instead of erroring.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that prevent a [`Logger`](crate::Logger) from being constructed
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration value could not be read
    #[error("invalid configuration for {key}: {reason}")]
    Config { key: String, reason: String },

    /// The log file could not be created or opened for appending
    #[error("failed to open log file {}: {source}", path.display())]
    OpenSink {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
