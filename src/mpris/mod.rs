//! MPRIS2 session-bus binding.
//!
//! Exposes the bus through two traits: [`Gateway`] enumerates players and
//! hands out per-request [`PlayerObject`] handles; the handles read and
//! write properties and invoke methods with JSON values on both sides.
//! [`DbusGateway`] is the zbus-backed production implementation.

mod dbus;
mod error;
mod gateway;
mod types;
mod value;

pub use dbus::DbusGateway;
pub use error::MprisError;
pub use gateway::{Gateway, PlayerObject};
pub use types::{ObjectKind, PlayerId};
