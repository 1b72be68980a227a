//! The request dispatcher.
//!
//! Maps the three REST operations onto gateway calls: read all properties,
//! invoke a method, write a property batch. Each dispatch is a single
//! linear pass with no retries and no state carried between requests; the
//! only state consulted is the live bus, through a fresh object handle per
//! request.

use std::{collections::HashSet, sync::Arc};

use serde_json::{Map, Value as Json};
use tracing::{debug, warn};

use crate::{
    descriptor::descriptor,
    mpris::{Gateway, MprisError, ObjectKind, PlayerId},
    registry::PlayerRegistry,
};

/// Result of a read-all-properties dispatch.
#[derive(Debug)]
pub enum ReadOutcome {
    /// The id failed registry validation; nothing was read.
    UnknownPlayer,
    /// The property bag. Unsupported properties are omitted, so it can be
    /// empty.
    Properties(Map<String, Json>),
}

/// Result of a method-invocation dispatch.
#[derive(Debug)]
pub enum InvokeOutcome {
    /// Method name outside the kind's table; the gateway was not called.
    UnknownMethod,
    /// The call succeeded with this return value (null for void methods).
    Success(Json),
    /// The call was attempted and failed; reported in-band, never as a
    /// transport failure.
    Failed(String),
}

/// Result of a write-properties dispatch.
#[derive(Debug)]
pub enum WriteOutcome {
    /// The id failed registry validation; nothing was written.
    UnknownPlayer,
    /// Per-property failure records; empty when every write applied.
    Report(Vec<ErrorRecord>),
}

/// One failed entry of a property batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    /// Property the failure applies to.
    pub name: String,
    /// Human-readable reason.
    pub reason: String,
}

/// Orchestrates registry validation, capability lookup and gateway calls.
///
/// Stateless per request; cheap to share behind an `Arc`.
pub struct Dispatcher {
    gateway: Arc<dyn Gateway>,
    registry: PlayerRegistry,
}

impl Dispatcher {
    /// Create a dispatcher over the given gateway.
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        let registry = PlayerRegistry::new(gateway.clone());
        Self { gateway, registry }
    }

    /// The registry this dispatcher validates ids against.
    pub fn registry(&self) -> &PlayerRegistry {
        &self.registry
    }

    /// Read every readable property of one player facet.
    ///
    /// Properties the live instance does not support are silently omitted
    /// from the bag; any other gateway failure aborts the whole read.
    ///
    /// # Errors
    /// Fatal gateway failures: enumeration, handle construction, or a
    /// non-"unsupported" failure while reading.
    pub async fn read_properties(
        &self,
        id: &PlayerId,
        kind: ObjectKind,
    ) -> Result<ReadOutcome, MprisError> {
        if !self.registry.exists(id).await? {
            return Ok(ReadOutcome::UnknownPlayer);
        }

        let object = self.gateway.object(id, kind).await?;

        let mut bag = Map::new();
        for name in descriptor(kind).properties {
            match object.read(name).await {
                Ok(value) => {
                    bag.insert((*name).to_owned(), value);
                }
                Err(err) if err.is_unsupported() => {
                    debug!(player = %id, kind = %kind, property = name, "unsupported, omitted");
                }
                Err(err) => return Err(err),
            }
        }

        Ok(ReadOutcome::Properties(bag))
    }

    /// Invoke one method on one player facet.
    ///
    /// The player id is not validated against the registry here; an unknown
    /// destination surfaces as an in-band call failure instead of a 404.
    /// Arguments pass through uninterpreted, in order.
    pub async fn invoke_method(
        &self,
        id: &PlayerId,
        kind: ObjectKind,
        method: &str,
        args: &[Json],
    ) -> InvokeOutcome {
        if !descriptor(kind).has_method(method) {
            return InvokeOutcome::UnknownMethod;
        }

        let object = match self.gateway.object(id, kind).await {
            Ok(object) => object,
            Err(err) => return InvokeOutcome::Failed(err.to_string()),
        };

        match object.call(method, args).await {
            Ok(result) => InvokeOutcome::Success(result),
            Err(err) => {
                warn!(player = %id, kind = %kind, method, error = %err, "invocation failed");
                InvokeOutcome::Failed(err.to_string())
            }
        }
    }

    /// Write a batch of properties on one player facet.
    ///
    /// Entries are attempted independently against the set of properties
    /// the live instance exposes; failures become per-property records and
    /// never abort sibling entries.
    ///
    /// # Errors
    /// Fatal gateway failures before the batch starts: enumeration or
    /// handle construction.
    pub async fn write_properties(
        &self,
        id: &PlayerId,
        kind: ObjectKind,
        entries: &Map<String, Json>,
    ) -> Result<WriteOutcome, MprisError> {
        if !self.registry.exists(id).await? {
            return Ok(WriteOutcome::UnknownPlayer);
        }

        let object = self.gateway.object(id, kind).await?;

        let exposed: HashSet<String> = match object.property_names().await {
            Ok(names) => names.into_iter().collect(),
            Err(err) => {
                warn!(player = %id, kind = %kind, error = %err, "property enumeration failed");
                HashSet::new()
            }
        };

        let mut errors = Vec::new();
        for (name, value) in entries {
            if !exposed.contains(name) {
                errors.push(ErrorRecord {
                    name: name.clone(),
                    reason: "Unknown property".to_owned(),
                });
                continue;
            }

            if let Err(err) = object.write(name, value).await {
                errors.push(ErrorRecord {
                    name: name.clone(),
                    reason: format!("error setting property: {err}"),
                });
            }
        }

        Ok(WriteOutcome::Report(errors))
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Mutex};

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::mpris::PlayerObject;

    /// In-memory gateway double. One shared fake object backs every handle,
    /// so tests can observe calls and writes after dispatch.
    #[derive(Default)]
    struct FakeGateway {
        players: Vec<String>,
        object: Arc<FakeObject>,
        refuse_handles: bool,
    }

    #[derive(Default)]
    struct FakeObject {
        values: Mutex<HashMap<String, Json>>,
        broken_reads: Vec<String>,
        broken_writes: Vec<String>,
        call_result: Option<Json>,
        call_error: Option<String>,
        calls: Mutex<Vec<(String, Vec<Json>)>>,
        refuse_names: bool,
    }

    #[async_trait]
    impl Gateway for FakeGateway {
        async fn list_players(&self) -> Result<Vec<PlayerId>, MprisError> {
            Ok(self
                .players
                .iter()
                .map(|p| PlayerId::from_bus_name(p))
                .collect())
        }

        async fn object(
            &self,
            _player: &PlayerId,
            _kind: ObjectKind,
        ) -> Result<Box<dyn PlayerObject>, MprisError> {
            if self.refuse_handles {
                return Err(MprisError::ConnectionFailed("bus gone".to_owned()));
            }
            Ok(Box::new(FakeHandle(self.object.clone())))
        }
    }

    struct FakeHandle(Arc<FakeObject>);

    #[async_trait]
    impl PlayerObject for FakeHandle {
        async fn read(&self, name: &str) -> Result<Json, MprisError> {
            if self.0.broken_reads.iter().any(|n| n == name) {
                return Err(MprisError::ConnectionFailed("read failed".to_owned()));
            }
            self.0
                .values
                .lock()
                .unwrap()
                .get(name)
                .cloned()
                .ok_or_else(|| MprisError::Unsupported {
                    member: name.to_owned(),
                    details: "not on this instance".to_owned(),
                })
        }

        async fn write(&self, name: &str, value: &Json) -> Result<(), MprisError> {
            if self.0.broken_writes.iter().any(|n| n == name) {
                return Err(MprisError::Dbus(zbus::Error::Failure(
                    "player rejected the value".to_owned(),
                )));
            }
            self.0
                .values
                .lock()
                .unwrap()
                .insert(name.to_owned(), value.clone());
            Ok(())
        }

        async fn call(&self, method: &str, args: &[Json]) -> Result<Json, MprisError> {
            self.0
                .calls
                .lock()
                .unwrap()
                .push((method.to_owned(), args.to_vec()));
            if let Some(message) = &self.0.call_error {
                return Err(MprisError::ConnectionFailed(message.clone()));
            }
            Ok(self.0.call_result.clone().unwrap_or(Json::Null))
        }

        async fn property_names(&self) -> Result<Vec<String>, MprisError> {
            if self.0.refuse_names {
                return Err(MprisError::ConnectionFailed("no instance".to_owned()));
            }
            Ok(self.0.values.lock().unwrap().keys().cloned().collect())
        }
    }

    fn dispatcher_with(gateway: FakeGateway) -> (Arc<FakeGateway>, Dispatcher) {
        let gateway = Arc::new(gateway);
        (gateway.clone(), Dispatcher::new(gateway))
    }

    fn vlc() -> PlayerId {
        PlayerId::from_bus_name(":1.42")
    }

    #[tokio::test]
    async fn read_rejects_unknown_player() {
        let (_, dispatcher) = dispatcher_with(FakeGateway::default());

        let outcome = dispatcher
            .read_properties(&vlc(), ObjectKind::Player)
            .await
            .unwrap();

        assert!(matches!(outcome, ReadOutcome::UnknownPlayer));
    }

    #[tokio::test]
    async fn read_collects_supported_properties_and_omits_the_rest() {
        let object = FakeObject::default();
        object.values.lock().unwrap().extend([
            ("PlaybackStatus".to_owned(), json!("Playing")),
            ("Volume".to_owned(), json!(0.5)),
        ]);
        let (_, dispatcher) = dispatcher_with(FakeGateway {
            players: vec![":1.42".to_owned()],
            object: Arc::new(object),
            refuse_handles: false,
        });

        let outcome = dispatcher
            .read_properties(&vlc(), ObjectKind::Player)
            .await
            .unwrap();

        let ReadOutcome::Properties(bag) = outcome else {
            panic!("expected a property bag");
        };
        assert_eq!(bag.get("PlaybackStatus"), Some(&json!("Playing")));
        assert_eq!(bag.get("Volume"), Some(&json!(0.5)));
        assert!(!bag.contains_key("Shuffle"));
    }

    #[tokio::test]
    async fn read_aborts_on_transport_failure() {
        let object = FakeObject {
            broken_reads: vec!["Volume".to_owned()],
            ..FakeObject::default()
        };
        object
            .values
            .lock()
            .unwrap()
            .insert("PlaybackStatus".to_owned(), json!("Paused"));
        let (_, dispatcher) = dispatcher_with(FakeGateway {
            players: vec![":1.42".to_owned()],
            object: Arc::new(object),
            refuse_handles: false,
        });

        let result = dispatcher.read_properties(&vlc(), ObjectKind::Player).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn invoke_rejects_methods_outside_the_table_without_calling() {
        let (gateway, dispatcher) = dispatcher_with(FakeGateway {
            players: vec![":1.42".to_owned()],
            ..FakeGateway::default()
        });

        let outcome = dispatcher
            .invoke_method(&vlc(), ObjectKind::Player, "Quit", &[])
            .await;

        assert!(matches!(outcome, InvokeOutcome::UnknownMethod));
        assert!(gateway.object.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invoke_skips_registry_validation() {
        // No players registered at all; the call still reaches the gateway.
        let (gateway, dispatcher) = dispatcher_with(FakeGateway::default());

        let outcome = dispatcher
            .invoke_method(&vlc(), ObjectKind::Player, "Play", &[])
            .await;

        assert!(matches!(outcome, InvokeOutcome::Success(Json::Null)));
        assert_eq!(
            *gateway.object.calls.lock().unwrap(),
            vec![("Play".to_owned(), Vec::<Json>::new())]
        );
    }

    #[tokio::test]
    async fn invoke_passes_arguments_through_in_order() {
        let (gateway, dispatcher) = dispatcher_with(FakeGateway::default());

        let args = [json!("value1"), json!(2), json!(true)];
        let outcome = dispatcher
            .invoke_method(&vlc(), ObjectKind::Player, "OpenUri", &args)
            .await;

        assert!(matches!(outcome, InvokeOutcome::Success(_)));
        assert_eq!(
            *gateway.object.calls.lock().unwrap(),
            vec![(
                "OpenUri".to_owned(),
                vec![json!("value1"), json!(2), json!(true)]
            )]
        );
    }

    #[tokio::test]
    async fn invoke_reports_gateway_failure_in_band() {
        let (_, dispatcher) = dispatcher_with(FakeGateway {
            object: Arc::new(FakeObject {
                call_error: Some("player refused".to_owned()),
                ..FakeObject::default()
            }),
            ..FakeGateway::default()
        });

        let outcome = dispatcher
            .invoke_method(&vlc(), ObjectKind::Player, "Next", &[])
            .await;

        let InvokeOutcome::Failed(message) = outcome else {
            panic!("expected in-band failure");
        };
        assert!(message.contains("player refused"));
    }

    #[tokio::test]
    async fn write_rejects_unknown_player() {
        let (_, dispatcher) = dispatcher_with(FakeGateway::default());

        let outcome = dispatcher
            .write_properties(&vlc(), ObjectKind::Player, &Map::new())
            .await
            .unwrap();

        assert!(matches!(outcome, WriteOutcome::UnknownPlayer));
    }

    #[tokio::test]
    async fn write_applies_valid_entries_and_records_the_rest() {
        let object = FakeObject::default();
        object
            .values
            .lock()
            .unwrap()
            .insert("Volume".to_owned(), json!(1.0));
        let (gateway, dispatcher) = dispatcher_with(FakeGateway {
            players: vec![":1.42".to_owned()],
            object: Arc::new(object),
            refuse_handles: false,
        });

        let mut entries = Map::new();
        entries.insert("Volume".to_owned(), json!(0.5));
        entries.insert("Bogus".to_owned(), json!(1));

        let outcome = dispatcher
            .write_properties(&vlc(), ObjectKind::Player, &entries)
            .await
            .unwrap();

        let WriteOutcome::Report(errors) = outcome else {
            panic!("expected a report");
        };
        assert_eq!(
            errors,
            vec![ErrorRecord {
                name: "Bogus".to_owned(),
                reason: "Unknown property".to_owned(),
            }]
        );
        assert_eq!(
            gateway.object.values.lock().unwrap().get("Volume"),
            Some(&json!(0.5))
        );
    }

    #[tokio::test]
    async fn write_records_set_failures_without_aborting() {
        let object = FakeObject {
            broken_writes: vec!["Rate".to_owned()],
            ..FakeObject::default()
        };
        object.values.lock().unwrap().extend([
            ("Rate".to_owned(), json!(1.0)),
            ("Volume".to_owned(), json!(1.0)),
        ]);
        let (gateway, dispatcher) = dispatcher_with(FakeGateway {
            players: vec![":1.42".to_owned()],
            object: Arc::new(object),
            refuse_handles: false,
        });

        let mut entries = Map::new();
        entries.insert("Rate".to_owned(), json!(1.5));
        entries.insert("Volume".to_owned(), json!(0.25));

        let outcome = dispatcher
            .write_properties(&vlc(), ObjectKind::Player, &entries)
            .await
            .unwrap();

        let WriteOutcome::Report(errors) = outcome else {
            panic!("expected a report");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].name, "Rate");
        assert!(errors[0].reason.starts_with("error setting property:"));
        assert_eq!(
            gateway.object.values.lock().unwrap().get("Volume"),
            Some(&json!(0.25))
        );
    }

    #[tokio::test]
    async fn write_treats_unlistable_instance_as_exposing_nothing() {
        let (_, dispatcher) = dispatcher_with(FakeGateway {
            players: vec![":1.42".to_owned()],
            object: Arc::new(FakeObject {
                refuse_names: true,
                ..FakeObject::default()
            }),
            refuse_handles: false,
        });

        let mut entries = Map::new();
        entries.insert("Volume".to_owned(), json!(0.5));

        let outcome = dispatcher
            .write_properties(&vlc(), ObjectKind::Player, &entries)
            .await
            .unwrap();

        let WriteOutcome::Report(errors) = outcome else {
            panic!("expected a report");
        };
        assert_eq!(errors[0].reason, "Unknown property");
    }

    #[tokio::test]
    async fn write_is_idempotent_over_the_error_set() {
        let (_, dispatcher) = dispatcher_with(FakeGateway {
            players: vec![":1.42".to_owned()],
            ..FakeGateway::default()
        });

        let mut entries = Map::new();
        entries.insert("Bogus".to_owned(), json!(1));

        let first = dispatcher
            .write_properties(&vlc(), ObjectKind::Player, &entries)
            .await
            .unwrap();
        let second = dispatcher
            .write_properties(&vlc(), ObjectKind::Player, &entries)
            .await
            .unwrap();

        let (WriteOutcome::Report(a), WriteOutcome::Report(b)) = (first, second) else {
            panic!("expected reports");
        };
        assert_eq!(a, b);
    }
}
