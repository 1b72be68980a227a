/// Errors that can occur while talking to a player over the bus.
#[derive(thiserror::Error, Debug)]
pub enum MprisError {
    /// The live instance does not expose the requested property or method.
    ///
    /// Property reads treat this as "omit the member"; every other variant
    /// is a real failure.
    #[error("member '{member}' not supported by this instance: {details}")]
    Unsupported {
        /// Property or method name the remote side rejected
        member: String,
        /// Remote error detail
        details: String,
    },

    /// A JSON value that cannot be represented on the bus.
    #[error("cannot encode value for '{member}': {details}")]
    InvalidArgument {
        /// Property or method the value was destined for
        member: String,
        /// What was wrong with it
        details: String,
    },

    /// D-Bus communication error.
    #[error("D-Bus operation failed: {0}")]
    Dbus(#[from] zbus::Error),

    /// Failed to establish the session bus connection.
    #[error("failed to connect to session bus: {0}")]
    ConnectionFailed(String),
}

impl MprisError {
    /// Whether the failure means the member simply does not exist on the
    /// remote instance, as opposed to a call or transport failure.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}

impl From<zbus::zvariant::Error> for MprisError {
    fn from(err: zbus::zvariant::Error) -> Self {
        Self::Dbus(err.into())
    }
}

impl From<zbus::fdo::Error> for MprisError {
    fn from(err: zbus::fdo::Error) -> Self {
        Self::Dbus(err.into())
    }
}
