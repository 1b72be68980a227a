//! webmpris - REST bridge to MPRIS2 media players.
//!
//! webmpris exposes media players on the D-Bus session bus through an
//! HTTP/JSON API. The main features include:
//!
//! - Player discovery over the session bus
//! - Property reads and writes on the four MPRIS2 interfaces
//! - Method invocation with JSON arguments and results
//! - A REST server wiring it all together
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use webmpris::{api, dispatch::Dispatcher, mpris::DbusGateway};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = DbusGateway::connect(false).await?;
//! let dispatcher = Arc::new(Dispatcher::new(Arc::new(gateway)));
//! let app = api::router(api::AppState::new(dispatcher));
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8015").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// REST routing table and HTTP handlers.
pub mod api;

/// Configuration schema definitions and loading.
pub mod config;

/// Property and method tables for each MPRIS2 interface.
pub mod descriptor;

/// Request dispatch against live player objects.
pub mod dispatch;

/// MPRIS2 gateway: D-Bus plumbing and value mapping.
pub mod mpris;

/// Known-player bookkeeping.
pub mod registry;

/// Tracing initialization for console and file logging.
pub mod tracing_config;
