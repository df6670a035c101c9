// file: src/server/mod.rs
// description: HTTP server wiring: shared state, router, CORS, error mapping
// reference: https://docs.rs/axum

pub mod routes;

use crate::cache::RecommendationCache;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::llm::OpenAiClient;
use crate::storage::SearchStore;
use axum::Json;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

pub struct AppState {
    pub config: Config,
    pub llm: OpenAiClient,
    pub cache: RecommendationCache,
    pub store: SearchStore,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();
        let llm = OpenAiClient::new(&config.openai, api_key)?;
        let cache = RecommendationCache::new(&config.cache);
        let store = SearchStore::open(&config.storage)?;

        Ok(Self {
            config,
            llm,
            cache,
            store,
        })
    }
}

// Error responses use the same {"detail": ...} envelope the original
// frontend expects.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "detail": self.client_message() }))).into_response()
    }
}

pub fn build_router(state: Arc<AppState>) -> axum::Router {
    let cors = cors_layer(&state.config.server.allowed_origins);

    axum::Router::new()
        .route("/", get(routes::health))
        .route("/api/recommend", post(routes::recommend))
        .route("/api/tags", post(routes::tags))
        .route("/api/stats", get(routes::stats))
        .layer(cors)
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Skipping unparseable CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

pub async fn serve(config: Config) -> Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config)?);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Book recommendation API listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("server error: {e}")))?;

    Ok(())
}
