// src/server.rs

use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::{convert::Infallible, net::SocketAddr, sync::Arc};
use tracing::{error, info};
use warp::{
    http::StatusCode,
    reject::Rejection,
    reply::{self, Reply, Response},
    Filter,
};

use crate::config::AppConfig;
use crate::fetch::is_not_found;
use crate::lookup::{lookup, LookupResult};

/// Shared, read-only state for all requests.
pub struct AppState {
    pub config: AppConfig,
    pub client: Client,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LookupParams {
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LookupResponse {
    pub source: String,
    pub updated: String,
    pub headers: Vec<String>,
    pub rows: usize,
    #[serde(flatten)]
    pub result: LookupResult,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}

async fn health_check() -> Result<impl Reply, Rejection> {
    Ok(reply::json(&serde_json::json!({
        "status": "healthy",
        "service": "template-lookup"
    })))
}

/// Re-read the source, resolve the query, reply with JSON.
#[tracing::instrument(level = "info", skip(params, state), fields(query = params.id.as_deref().unwrap_or("")))]
async fn handle_lookup(params: LookupParams, state: Arc<AppState>) -> Result<Response, Rejection> {
    let query = params.id.unwrap_or_default();
    let source = &state.config.source;

    let snapshot = match source.load(&state.client).await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            error!(source = %source, "loading data failed: {:?}", err);
            let message = if is_not_found(&err) {
                format!("CSV not found at '{}'.", source)
            } else {
                "Failed to load data".to_string()
            };
            let body = ErrorResponse {
                error: message,
                details: Some(format!("{:#}", err)),
            };
            return Ok(
                reply::with_status(reply::json(&body), StatusCode::INTERNAL_SERVER_ERROR)
                    .into_response(),
            );
        }
    };

    let result = lookup(&snapshot.dataset, &query, &state.config.lookup);
    info!(
        status = ?result.status,
        row = ?result.record_index,
        schema_incomplete = result.schema_incomplete,
        "lookup done"
    );

    let body = LookupResponse {
        updated: snapshot.updated_label(),
        source: snapshot.name,
        rows: snapshot.dataset.rows.len(),
        headers: snapshot.dataset.headers,
        result,
    };
    Ok(reply::json(&body).into_response())
}

fn with_state(
    state: Arc<AppState>,
) -> impl Filter<Extract = (Arc<AppState>,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// `GET /?id=<query>` and `GET /health`.
pub fn routes(
    state: Arc<AppState>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(health_check);

    let lookup = warp::path::end()
        .and(warp::get())
        .and(warp::query::<LookupParams>())
        .and(with_state(state))
        .and_then(handle_lookup);

    health.or(lookup)
}

pub async fn serve(config: AppConfig) -> Result<()> {
    let addr = SocketAddr::new(config.bind, config.port);
    info!("Serving on http://{} (data: {})", addr, config.source);
    info!("Health check: http://{}/health", addr);

    let state = Arc::new(AppState::new(config));
    warp::serve(routes(state)).run(addr).await;
    Ok(())
}
