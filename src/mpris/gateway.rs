use async_trait::async_trait;
use serde_json::Value as Json;

use super::{MprisError, ObjectKind, PlayerId};

/// Live view of the players on the bus and a factory for per-request object
/// handles.
///
/// The dispatch layer is written against this trait; tests substitute an
/// in-memory implementation, production uses [`super::DbusGateway`].
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Enumerate the currently reachable players.
    ///
    /// # Errors
    /// Returns an error if the bus enumeration itself fails.
    async fn list_players(&self) -> Result<Vec<PlayerId>, MprisError>;

    /// Produce a handle for one facet of one player.
    ///
    /// Handles are built fresh per request and never shared.
    ///
    /// # Errors
    /// Returns an error if the handle cannot be constructed, for example
    /// from a malformed player id.
    async fn object(
        &self,
        player: &PlayerId,
        kind: ObjectKind,
    ) -> Result<Box<dyn PlayerObject>, MprisError>;
}

/// One facet (interface) of one player, valid for a single request.
///
/// Values cross this boundary as JSON; the binding owns the mapping to and
/// from bus types.
#[async_trait]
pub trait PlayerObject: Send + Sync {
    /// Read one property.
    ///
    /// # Errors
    /// [`MprisError::Unsupported`] when the instance does not expose the
    /// property; other variants for call or transport failures.
    async fn read(&self, name: &str) -> Result<Json, MprisError>;

    /// Write one property.
    ///
    /// # Errors
    /// [`MprisError::Unsupported`] when the instance does not expose the
    /// property; other variants for encoding, call or transport failures.
    async fn write(&self, name: &str, value: &Json) -> Result<(), MprisError>;

    /// Invoke one method with positional arguments.
    ///
    /// Void methods yield JSON null; multi-value returns yield a JSON array.
    ///
    /// # Errors
    /// Any failure reported by the remote side or the transport.
    async fn call(&self, method: &str, args: &[Json]) -> Result<Json, MprisError>;

    /// Names of the properties the live instance currently exposes.
    ///
    /// # Errors
    /// Returns an error if the instance cannot be queried at all.
    async fn property_names(&self) -> Result<Vec<String>, MprisError>;
}
