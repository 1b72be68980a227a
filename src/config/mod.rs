//! Configuration schema definitions and loading.
//!
//! Defines the complete configuration structure for webmpris, covering the
//! HTTP listener and the session bus connection policy. All configurations
//! are serializable to/from TOML format.

mod bus;
mod error;
mod loading;
mod paths;
mod server;

pub use bus::BusConfig;
pub use error::ConfigError;
pub use paths::ConfigPaths;
pub use server::ServerConfig;

use serde::{Deserialize, Serialize};

/// Main configuration structure for webmpris.
///
/// Represents the complete configuration schema that can be loaded
/// from TOML files. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Session bus connection settings.
    #[serde(default)]
    pub bus: BusConfig,
}
