use serde::{Deserialize, Serialize};

/// Session bus connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Open a dedicated bus connection per request instead of sharing one.
    ///
    /// Sharing is cheaper and is the default; a private connection isolates
    /// misbehaving players at the cost of a handshake per request.
    pub private: bool,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self { private: false }
    }
}
