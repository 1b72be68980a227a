//! Session-bus implementation of the gateway traits.

use async_trait::async_trait;
use serde_json::Value as Json;
use tracing::{debug, instrument, warn};
use zbus::{
    Connection, Proxy,
    fdo::{self, DBusProxy, PropertiesProxy},
    names::InterfaceName,
    zvariant::{Signature, Structure, StructureBuilder, signature::Child},
};

use super::{
    MprisError, ObjectKind, PlayerId,
    gateway::{Gateway, PlayerObject},
    value::{from_json, guess_from_json, to_json},
};

/// Well-known-name prefix every MPRIS2 player claims on the session bus.
const BUS_NAME_PREFIX: &str = "org.mpris.MediaPlayer2.";

/// The one object path MPRIS2 players export.
const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";

static TRACK_ID_LIST: Signature = Signature::Array(Child::Static {
    child: &Signature::ObjectPath,
});

/// Argument signatures of the MPRIS2 methods that take arguments. Methods
/// outside this table fall back to guessed argument types, and the remote
/// side reports any resulting mismatch.
static METHOD_ARG_SIGNATURES: &[(&str, &[&Signature])] = &[
    ("Seek", &[&Signature::I64]),
    ("SetPosition", &[&Signature::ObjectPath, &Signature::I64]),
    ("OpenUri", &[&Signature::Str]),
    ("GetTracksMetadata", &[&TRACK_ID_LIST]),
    (
        "AddTrack",
        &[&Signature::Str, &Signature::ObjectPath, &Signature::Bool],
    ),
    ("RemoveTrack", &[&Signature::ObjectPath]),
    ("GoTo", &[&Signature::ObjectPath]),
    ("ActivatePlaylist", &[&Signature::ObjectPath]),
    (
        "GetPlaylists",
        &[
            &Signature::U32,
            &Signature::U32,
            &Signature::Str,
            &Signature::Bool,
        ],
    ),
];

fn arg_signatures(method: &str) -> Option<&'static [&'static Signature]> {
    METHOD_ARG_SIGNATURES
        .iter()
        .find(|(name, _)| *name == method)
        .map(|(_, sigs)| *sigs)
}

/// Session-bus [`Gateway`].
///
/// Holds one shared connection; in private mode every object handle gets a
/// dedicated connection instead, so no bus state is shared between requests.
#[derive(Debug, Clone)]
pub struct DbusGateway {
    connection: Connection,
    private: bool,
}

impl DbusGateway {
    /// Connect to the session bus.
    ///
    /// # Errors
    /// Returns [`MprisError::ConnectionFailed`] if the session bus is not
    /// reachable.
    pub async fn connect(private: bool) -> Result<Self, MprisError> {
        let connection = Connection::session()
            .await
            .map_err(|e| MprisError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            connection,
            private,
        })
    }

    async fn handle_connection(&self) -> Result<Connection, MprisError> {
        if self.private {
            Connection::session()
                .await
                .map_err(|e| MprisError::ConnectionFailed(e.to_string()))
        } else {
            Ok(self.connection.clone())
        }
    }
}

#[async_trait]
impl Gateway for DbusGateway {
    #[instrument(skip(self))]
    async fn list_players(&self) -> Result<Vec<PlayerId>, MprisError> {
        let dbus_proxy = DBusProxy::new(&self.connection).await?;
        let names = dbus_proxy.list_names().await?;

        let mut players = Vec::new();
        for name in names {
            if !name.starts_with(BUS_NAME_PREFIX) {
                continue;
            }
            // Players are addressed by the owning connection, so resolve
            // each well-known name to its unique name.
            match dbus_proxy.get_name_owner(name.inner().clone()).await {
                Ok(owner) => players.push(PlayerId::from_bus_name(owner.as_str())),
                Err(err) => {
                    warn!(name = %name, error = %err, "name vanished during enumeration");
                }
            }
        }

        players.sort_by(|a, b| a.bus_name().cmp(b.bus_name()));
        players.dedup();
        debug!(count = players.len(), "enumerated players");
        Ok(players)
    }

    #[instrument(skip(self))]
    async fn object(
        &self,
        player: &PlayerId,
        kind: ObjectKind,
    ) -> Result<Box<dyn PlayerObject>, MprisError> {
        let connection = self.handle_connection().await?;
        let interface = InterfaceName::try_from(kind.interface())
            .map_err(|e| MprisError::Dbus(e.into()))?;

        let proxy = Proxy::new(
            &connection,
            player.bus_name().to_owned(),
            OBJECT_PATH,
            kind.interface(),
        )
        .await?;

        let properties = PropertiesProxy::builder(&connection)
            .destination(player.bus_name().to_owned())?
            .path(OBJECT_PATH)?
            .build()
            .await?;

        Ok(Box::new(DbusObject {
            interface,
            proxy,
            properties,
        }))
    }
}

/// One interface of one player, bound for the duration of a request.
struct DbusObject {
    interface: InterfaceName<'static>,
    proxy: Proxy<'static>,
    properties: PropertiesProxy<'static>,
}

#[async_trait]
impl PlayerObject for DbusObject {
    async fn read(&self, name: &str) -> Result<Json, MprisError> {
        let value = self
            .properties
            .get(self.interface.clone(), name)
            .await
            .map_err(|e| classify_member_error(name, e))?;

        Ok(to_json(&value))
    }

    async fn write(&self, name: &str, value: &Json) -> Result<(), MprisError> {
        // The current value supplies the target signature; MPRIS2 property
        // types are fixed per name.
        let current = self
            .properties
            .get(self.interface.clone(), name)
            .await
            .map_err(|e| classify_member_error(name, e))?;

        let coerced =
            from_json(value, current.value_signature()).map_err(|details| {
                MprisError::InvalidArgument {
                    member: name.to_owned(),
                    details,
                }
            })?;

        self.properties
            .set(self.interface.clone(), name, coerced)
            .await
            .map_err(|e| classify_member_error(name, e))
    }

    async fn call(&self, method: &str, args: &[Json]) -> Result<Json, MprisError> {
        debug!(interface = %self.interface, method, "calling player method");
        let reply = if args.is_empty() {
            self.proxy.call_method(method, &()).await?
        } else {
            let body = call_body(method, args)?;
            self.proxy.call_method(method, &body).await?
        };

        let body = reply.body();
        if matches!(body.signature(), Signature::Unit) {
            return Ok(Json::Null);
        }

        let structure: Structure<'_> = body.deserialize()?;
        let result = match structure.fields() {
            [single] => to_json(single),
            many => Json::Array(many.iter().map(to_json).collect()),
        };
        Ok(result)
    }

    async fn property_names(&self) -> Result<Vec<String>, MprisError> {
        let all = self.properties.get_all(self.interface.clone()).await?;
        Ok(all.into_keys().collect())
    }
}

/// Marshal positional JSON arguments into a call body, using the known
/// MPRIS2 signatures where available.
fn call_body(method: &str, args: &[Json]) -> Result<Structure<'static>, MprisError> {
    let signatures = arg_signatures(method);
    let mut builder = StructureBuilder::new();

    for (position, arg) in args.iter().enumerate() {
        let value = match signatures.and_then(|sigs| sigs.get(position)) {
            Some(sig) => from_json(arg, sig),
            None => guess_from_json(arg),
        }
        .map_err(|details| MprisError::InvalidArgument {
            member: method.to_owned(),
            details: format!("argument {position}: {details}"),
        })?;

        builder = builder.append_field(value);
    }

    Ok(builder.build()?)
}

/// Errors that mean the member does not exist on this instance, as opposed
/// to the call itself failing. `InvalidArgs` is the conventional rejection
/// for an unknown property name in `Properties.Get`.
fn classify_member_error(member: &str, err: fdo::Error) -> MprisError {
    match err {
        fdo::Error::UnknownProperty(details)
        | fdo::Error::InvalidArgs(details)
        | fdo::Error::UnknownInterface(details)
        | fdo::Error::UnknownObject(details)
        | fdo::Error::UnknownMethod(details)
        | fdo::Error::NotSupported(details) => MprisError::Unsupported {
            member: member.to_owned(),
            details,
        },
        other => MprisError::Dbus(other.into()),
    }
}
