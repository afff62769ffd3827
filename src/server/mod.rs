//! HTTP query API
//!
//! Binds the query engine to `GET /search` and `GET /autocomplete`. An
//! unparseable query comes back as an empty JSON array, never as a raw
//! parser error; only storage failures surface as 500s. CORS is permissive
//! because the browser client is served from elsewhere.

use crate::config::SearchConfig;
use crate::error::{CapsearchError, Result};
use crate::query::{QueryEngine, SearchResult};
use crate::storage::Store;
use axum::{
    Router,
    extract::{Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::Deserialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    engine: Arc<QueryEngine<Arc<Store>>>,
}

/// Build the query API router over a shared store
pub fn router(store: Arc<Store>, config: SearchConfig) -> Router {
    let engine = Arc::new(QueryEngine::with_config(store, config));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    Router::new()
        .route("/search", get(search_handler))
        .route("/autocomplete", get(autocomplete_handler))
        .with_state(AppState { engine })
        .layer(ServiceBuilder::new().layer(cors))
}

/// Configure and start the HTTP server
pub async fn serve(store: Arc<Store>, config: SearchConfig, port: u16) -> Result<()> {
    let app = router(store, config);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .map_err(CapsearchError::Io)?;
    log::info!("Caption search API listening on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await.map_err(CapsearchError::Io)?;
    Ok(())
}

#[derive(Deserialize)]
struct QueryParams {
    #[serde(default)]
    q: String,
}

async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Response {
    match state.engine.search(&params.q) {
        Ok(results) => (StatusCode::OK, Json(results)).into_response(),
        Err(CapsearchError::InvalidQuery(query)) => {
            log::debug!("Rejected search query: {:?}", query);
            (StatusCode::OK, Json(Vec::<SearchResult>::new())).into_response()
        }
        Err(e) => {
            log::error!("Search failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }
}

async fn autocomplete_handler(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Response {
    match state.engine.autocomplete(&params.q) {
        Ok(texts) => (StatusCode::OK, Json(texts)).into_response(),
        Err(CapsearchError::InvalidQuery(query)) => {
            log::debug!("Rejected autocomplete query: {:?}", query);
            (StatusCode::OK, Json(Vec::<String>::new())).into_response()
        }
        Err(e) => {
            log::error!("Autocomplete failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }
}
