//! Error types. The simulation itself cannot fail; only loading
//! configuration and driving the terminal can.

use std::path::PathBuf;

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for `GameConfig`
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values parse but make no sense together
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level error returned by the binary.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
