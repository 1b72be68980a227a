//! REST surface: the routing table and HTTP handlers.
//!
//! Thin glue between HTTP and the dispatcher. Handlers translate outcomes
//! into the wire shapes; they never talk to the bus themselves. Bodies are
//! read leniently: a missing or empty body means "no arguments" on POST and
//! "no entries" on PUT.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue, json};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::{
    descriptor::descriptor,
    dispatch::{Dispatcher, ErrorRecord, InvokeOutcome, ReadOutcome, WriteOutcome},
    mpris::{MprisError, ObjectKind, PlayerId},
};

/// Shared state for every handler.
#[derive(Clone)]
pub struct AppState {
    dispatcher: Arc<Dispatcher>,
}

impl AppState {
    /// Bundle the dispatcher for the router.
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

/// Build the REST router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/players", get(list_players))
        .route(
            "/players/{id}/{kind}",
            get(read_properties).put(write_properties),
        )
        .route("/players/{id}/{kind}/{method}", post(invoke_method))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn list_players(State(state): State<AppState>) -> Response {
    match state.dispatcher.registry().list_players().await {
        Ok(players) => {
            let ids: Vec<String> = players.iter().map(|p| p.bus_name().to_owned()).collect();
            (StatusCode::OK, Json(ids)).into_response()
        }
        Err(err) => {
            error!(error = %err, "player enumeration failed");
            internal_error(&err)
        }
    }
}

async fn read_properties(
    State(state): State<AppState>,
    Path((id, kind)): Path<(String, String)>,
) -> Response {
    let Some(kind) = ObjectKind::from_path_segment(&kind) else {
        return unknown_kind();
    };
    let player = PlayerId::from_bus_name(&id);

    match state.dispatcher.read_properties(&player, kind).await {
        Ok(ReadOutcome::UnknownPlayer) => unknown_player(),
        Ok(ReadOutcome::Properties(bag)) => {
            (StatusCode::OK, Json(JsonValue::Object(bag))).into_response()
        }
        Err(err) => {
            error!(player = %player, %kind, error = %err, "property read failed");
            internal_error(&err)
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct InvokeBody {
    #[serde(default)]
    args: Vec<JsonValue>,
}

async fn invoke_method(
    State(state): State<AppState>,
    Path((id, kind, method)): Path<(String, String, String)>,
    body: Bytes,
) -> Response {
    let Some(kind) = ObjectKind::from_path_segment(&kind) else {
        return unknown_kind();
    };

    // The method name is checked against the capability table before the
    // body is parsed; a malformed body never masks an unknown method.
    if !descriptor(kind).has_method(&method) {
        return unknown_method();
    }

    let body: InvokeBody = if body.is_empty() {
        InvokeBody::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(parsed) => parsed,
            Err(_) => return malformed_body(),
        }
    };

    let player = PlayerId::from_bus_name(&id);
    match state
        .dispatcher
        .invoke_method(&player, kind, &method, &body.args)
        .await
    {
        InvokeOutcome::UnknownMethod => unknown_method(),
        InvokeOutcome::Success(result) => (
            StatusCode::OK,
            Json(json!({ "status": "success", "result": result })),
        )
            .into_response(),
        InvokeOutcome::Failed(message) => (
            StatusCode::OK,
            Json(json!({ "status": "fail", "result": JsonValue::Null, "error": message })),
        )
            .into_response(),
    }
}

async fn write_properties(
    State(state): State<AppState>,
    Path((id, kind)): Path<(String, String)>,
    body: Bytes,
) -> Response {
    let Some(kind) = ObjectKind::from_path_segment(&kind) else {
        return unknown_kind();
    };

    let entries: Map<String, JsonValue> = if body.is_empty() {
        Map::new()
    } else {
        match serde_json::from_slice::<JsonValue>(&body) {
            Ok(JsonValue::Object(map)) => map,
            _ => return malformed_body(),
        }
    };

    let player = PlayerId::from_bus_name(&id);
    match state
        .dispatcher
        .write_properties(&player, kind, &entries)
        .await
    {
        Ok(WriteOutcome::UnknownPlayer) => unknown_player(),
        Ok(WriteOutcome::Report(errors)) => {
            let errmsg: Vec<JsonValue> = errors.iter().map(record_json).collect();
            (StatusCode::OK, Json(json!({ "errmsg": errmsg }))).into_response()
        }
        Err(err) => {
            error!(player = %player, %kind, error = %err, "property write failed");
            internal_error(&err)
        }
    }
}

/// A record goes on the wire as a single-entry object, `{name: reason}`.
fn record_json(record: &ErrorRecord) -> JsonValue {
    let mut entry = Map::new();
    entry.insert(
        record.name.clone(),
        JsonValue::String(record.reason.clone()),
    );
    JsonValue::Object(entry)
}

fn unknown_player() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "errmsg": "unknown player id" })),
    )
        .into_response()
}

fn unknown_kind() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "errmsg": "unknown object kind" })),
    )
        .into_response()
}

fn unknown_method() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "status": "fail", "errmsg": "unknown method" })),
    )
        .into_response()
}

fn malformed_body() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "errmsg": "malformed request body" })),
    )
        .into_response()
}

fn internal_error(err: &MprisError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "errmsg": err.to_string() })),
    )
        .into_response()
}
