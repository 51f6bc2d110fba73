//! `api` crate: HTTP REST API layer.
//!
//! Exposes:
//!   GET    /buildings/{buildingId}/rooms
//!   POST   /buildings/{buildingId}/rooms
//!   GET    /buildings/{buildingId}/rooms/{roomId}
//!   PUT    /buildings/{buildingId}/rooms/{roomId}
//!   DELETE /buildings/{buildingId}/rooms/{roomId}
//!   GET    /health
//!
//! `{buildingId}` is the building code and `{roomId}` the room number.

pub mod error;
pub mod handlers;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use rooms::{RoomError, RoomService};

pub use error::{ApiError, RoomOp};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub rooms: RoomService,
    /// Keep store failure details out of 500 bodies (they are still logged).
    pub redact_errors: bool,
}

impl AppState {
    pub fn new(rooms: RoomService) -> Self {
        Self {
            rooms,
            redact_errors: false,
        }
    }

    pub fn with_redacted_errors(mut self, redact: bool) -> Self {
        self.redact_errors = redact;
        self
    }

    /// Map a failed room operation to its HTTP response.
    pub fn fail(&self, op: RoomOp, err: RoomError) -> ApiError {
        ApiError::from_room(op, err, self.redact_errors)
    }
}

/// Errors that can occur when starting or running the HTTP server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("bind failed on {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("serve error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Build the complete router.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/buildings/:building_code/rooms",
            get(handlers::rooms::list).post(handlers::rooms::create),
        )
        .route(
            "/buildings/:building_code/rooms/:room_number",
            get(handlers::rooms::get_one)
                .put(handlers::rooms::update)
                .delete(handlers::rooms::delete),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind to `bind` and serve until Ctrl-C.
pub async fn serve(bind: &str, state: AppState) -> Result<(), ServerError> {
    let listener = TcpListener::bind(bind)
        .await
        .map_err(|source| ServerError::Bind {
            addr: bind.to_owned(),
            source,
        })?;

    info!("API server listening on {bind}");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
