use std::{
    fmt,
    path::{Path, PathBuf},
};

use thiserror::Error;

/// Errors raised while loading the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("failed to read config file '{path}': {details}")]
    Read {
        /// Path of the file that failed to read
        path: PathBuf,
        /// I/O error details
        details: String,
    },

    /// Configuration file is not valid TOML or does not match the schema
    #[error("failed to parse config file '{path}': {details}")]
    Parse {
        /// Path of the file that failed to parse
        path: PathBuf,
        /// Parse error details
        details: String,
    },
}

impl ConfigError {
    /// Creates a read error with file path context.
    pub fn read(error: impl fmt::Display, path: &Path) -> Self {
        ConfigError::Read {
            path: path.to_path_buf(),
            details: error.to_string(),
        }
    }

    /// Creates a parse error with file path context.
    pub fn parse(error: impl fmt::Display, path: &Path) -> Self {
        ConfigError::Parse {
            path: path.to_path_buf(),
            details: error.to_string(),
        }
    }
}
