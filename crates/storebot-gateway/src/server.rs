// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::get;
use storebot_agent::TurnDispatcher;
use storebot_config::model::GatewayConfig;
use storebot_core::{StorageAdapter, StorebotError};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn StorageAdapter>,
    pub dispatcher: TurnDispatcher,
    /// Name reported by the root endpoint.
    pub app_name: String,
    pub environment: String,
    pub cors_origins: Vec<String>,
}

impl AppState {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        dispatcher: TurnDispatcher,
        app_name: impl Into<String>,
        gateway: &GatewayConfig,
    ) -> Self {
        Self {
            storage,
            dispatcher,
            app_name: app_name.into(),
            environment: gateway.environment.clone(),
            cors_origins: gateway.cors_origins.clone(),
        }
    }
}

/// CORS policy for the configured origins. `"*"` allows any origin.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Routes:
/// - GET / and GET /health
/// - POST /chats, GET /chats, GET /chats/{chat_id}
/// - POST /messages, GET /messages
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.cors_origins);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route(
            "/chats",
            get(handlers::list_chats).post(handlers::create_chat),
        )
        .route("/chats/{chat_id}", get(handlers::get_chat))
        .route(
            "/messages",
            get(handlers::list_messages).post(handlers::create_message),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serves until `shutdown` is cancelled, then stops accepting connections.
pub async fn start_server(
    config: &GatewayConfig,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), StorebotError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| StorebotError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| StorebotError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
