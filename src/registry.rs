//! Live player enumeration and id validation.

use std::sync::Arc;

use crate::mpris::{Gateway, MprisError, PlayerId};

/// Validates player ids against live bus state.
///
/// Every call queries the bus afresh; nothing is cached, so answers always
/// reflect the current session, at the cost of one enumeration per check.
#[derive(Clone)]
pub struct PlayerRegistry {
    gateway: Arc<dyn Gateway>,
}

impl PlayerRegistry {
    /// Create a registry over the given gateway.
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    /// Currently reachable players.
    ///
    /// # Errors
    /// Returns an error if the bus enumeration fails.
    pub async fn list_players(&self) -> Result<Vec<PlayerId>, MprisError> {
        self.gateway.list_players().await
    }

    /// Whether `id` names a currently reachable player.
    ///
    /// An absent id yields `false`, not an error.
    ///
    /// # Errors
    /// Returns an error only if the enumeration itself fails.
    pub async fn exists(&self, id: &PlayerId) -> Result<bool, MprisError> {
        Ok(self.list_players().await?.contains(id))
    }
}
