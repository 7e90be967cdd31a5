use crate::api::params;
use crate::config::{Config, GraphConfig, HttpServerConfig};
use crate::error::{LobbyGraphError, Result};
use crate::graph::expand_graph;
use crate::store::ApiStore;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// HTTP server for the graph API
pub struct GraphApiServer {
    state: AppState,
    http: HttpServerConfig,
}

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    store: Arc<dyn ApiStore>,
    graph: GraphConfig,
}

impl GraphApiServer {
    /// Build a server over an already constructed store
    pub fn new(store: Arc<dyn ApiStore>, config: &Config) -> Self {
        Self {
            state: AppState {
                store,
                graph: config.graph.clone(),
            },
            http: config.http_server.clone(),
        }
    }

    /// Run until ctrl-c
    pub async fn run(&self) -> Result<()> {
        let app = self.router();
        let addr = format!("{}:{}", self.http.host, self.http.port);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| {
                LobbyGraphError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to bind to {}: {}", addr, e),
                ))
            })?;
        log::info!("Serving graph API on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| LobbyGraphError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("HTTP server error: {}", e)
            )))?;

        log::info!("Graph API stopped");
        Ok(())
    }

    /// Create the axum router
    pub fn router(&self) -> Router {
        // No configured origins: allow any (local development).
        let cors = if self.http.allowed_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<HeaderValue> = self
                .http
                .allowed_origins
                .iter()
                .filter_map(|o| match o.parse() {
                    Ok(origin) => Some(origin),
                    Err(_) => {
                        log::warn!("Ignoring invalid CORS origin: {:?}", o);
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .route("/api/graph", get(handle_graph))
            .route("/api/graph/", get(handle_graph))
            .route("/api/entities", get(handle_list_entities))
            .route("/api/entities/:entity_id", get(handle_get_entity))
            .route("/healthz", get(handle_health))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(cors)
            )
            .with_state(self.state.clone())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
}

/// Map an error onto a status code and `{"error", "code"}` body
fn error_response(err: LobbyGraphError) -> Response {
    let status = match &err {
        LobbyGraphError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        LobbyGraphError::SeedNotFound(_) | LobbyGraphError::EntityNotFound(_) => StatusCode::NOT_FOUND,
        LobbyGraphError::StoreUnavailable(_)
        | LobbyGraphError::Database(_)
        | LobbyGraphError::Io(_) => StatusCode::SERVICE_UNAVAILABLE,
        LobbyGraphError::Config(_) | LobbyGraphError::Parse(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let message = match &err {
        LobbyGraphError::SeedNotFound(_) => "Seed entity not found".to_string(),
        LobbyGraphError::EntityNotFound(_) => "Entity not found".to_string(),
        LobbyGraphError::InvalidArgument(msg) => msg.clone(),
        other => other.to_string(),
    };

    if status.is_server_error() {
        log::error!("Request failed: {}", err);
    } else {
        log::debug!("Request rejected: {}", err);
    }

    (
        status,
        Json(serde_json::json!({
            "error": message,
            "code": err.code(),
        })),
    )
        .into_response()
}

/// GET /api/graph?seed_id=&depth=&limit=&types=
async fn handle_graph(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let request = match params::graph_request(&query, &state.graph) {
        Ok(r) => r,
        Err(e) => return error_response(e),
    };
    match expand_graph(state.store.as_ref(), &request).await {
        Ok(graph) => (StatusCode::OK, Json(graph)).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/entities?q=&type=&limit=
async fn handle_list_entities(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let filter = match params::entity_filter(&query) {
        Ok(f) => f,
        Err(e) => return error_response(e),
    };
    match state.store.list_entities(&filter).await {
        Ok(entities) => (StatusCode::OK, Json(entities)).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/entities/{id}
async fn handle_get_entity(
    State(state): State<AppState>,
    Path(entity_id): Path<String>,
) -> Response {
    match state.store.get_entity(&entity_id).await {
        Ok(Some(entity)) => (StatusCode::OK, Json(entity)).into_response(),
        Ok(None) => error_response(LobbyGraphError::EntityNotFound(entity_id)),
        Err(e) => error_response(e),
    }
}

/// Health check
async fn handle_health() -> Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "service": "lobbygraph",
            "version": env!("CARGO_PKG_VERSION")
        }))
    ).into_response()
}
