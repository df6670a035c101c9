// file: src/server/routes.rs
// description: endpoint handlers and the SSE recommendation stream
// reference: SSE protocol consumed by the incremental frontend parser

use crate::error::Result;
use crate::llm::prompt;
use crate::models::{RecommendRequest, StreamEvent, TagsRequest, TagsResponse};
use crate::server::AppState;
use crate::utils::{HealthCheck, HealthReport, OperationTimer, Validator};
use axum::Json;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::StreamExt;
use futures::channel::mpsc::{UnboundedSender, unbounded};
use futures::stream::Stream;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    let start = Instant::now();
    let cache_check = HealthCheck::healthy("cache", start.elapsed());

    let start = Instant::now();
    let store_check = match state.store.stats() {
        Ok(_) => HealthCheck::healthy("storage", start.elapsed()),
        Err(err) => HealthCheck::unhealthy("storage", err.to_string(), start.elapsed()),
    };

    Json(HealthReport::new(
        vec![cache_check, store_check],
        env!("CARGO_PKG_VERSION").to_string(),
    ))
}

/// Get relevant tags/genres for a book or author. Upstream failures degrade
/// to an empty tag list instead of an error response.
pub async fn tags(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TagsRequest>,
) -> Result<Json<TagsResponse>> {
    let request = request.validated(&state.config.limits)?;
    info!(
        "Fetching tags for: {}",
        Validator::log_preview(&request.book_name, 50)
    );

    match fetch_tags(&state, &request.book_name).await {
        Ok(tags) => {
            info!("Generated {} tags for: {}", tags.len(), request.book_name);
            Ok(Json(TagsResponse { tags }))
        }
        Err(err) => {
            error!("OpenAI API error while fetching tags: {}", err);
            Ok(Json(TagsResponse { tags: vec![] }))
        }
    }
}

/// Cache and store statistics.
pub async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<serde_json::Value>> {
    let store_stats = state.store.stats()?;
    let popular = state.store.popular_searches(10)?;

    Ok(Json(json!({
        "cache": state.cache.stats(),
        "store": store_stats,
        "popular_searches": popular,
    })))
}

/// Stream book recommendations as Server-Sent Events.
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RecommendRequest>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let request = request.validated(&state.config.limits)?;
    let request_id = Uuid::new_v4();
    info!(
        %request_id,
        "Recommendation request for: {}, tags: {}",
        Validator::log_preview(&request.book_name, 50),
        request.tags.len()
    );

    let (tx, rx) = unbounded::<StreamEvent>();
    tokio::spawn(stream_recommendations(state, request, request_id, tx));

    let events = rx.map(|event| {
        let data = serde_json::to_string(&event)
            .unwrap_or_else(|_| r#"{"error":"Failed to encode stream event"}"#.to_string());
        Ok::<_, Infallible>(Event::default().data(data))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// Producer task behind `/api/recommend`: tags first, then the upstream
/// token stream, then a done marker; every failure mode becomes an inline
/// error event.
async fn stream_recommendations(
    state: Arc<AppState>,
    request: RecommendRequest,
    request_id: Uuid,
    tx: UnboundedSender<StreamEvent>,
) {
    if let Err(err) = state.store.log_search(&request.book_name, &request.tags) {
        warn!(%request_id, "Failed to log search: {}", err);
    }

    if let Some(cached) = state.cache.get(&request.book_name, &request.tags) {
        info!(%request_id, "Serving cached recommendations for: {}", request.book_name);
        let _ = tx.unbounded_send(StreamEvent::Chunk {
            chunk: cached.clone(),
            text: cached.clone(),
        });
        let _ = tx.unbounded_send(StreamEvent::done(cached));
        return;
    }

    // Infer tags only when the request did not carry any.
    let mut tags = request.tags.clone();
    if tags.is_empty() {
        match fetch_tags(&state, &request.book_name).await {
            Ok(inferred) if !inferred.is_empty() => {
                info!(%request_id, "Generated {} tags for: {}", inferred.len(), request.book_name);
                tags = inferred;
                let _ = tx.unbounded_send(StreamEvent::Tags { tags: tags.clone() });
            }
            Ok(_) => {}
            Err(err) => {
                warn!(%request_id, "Failed to fetch tags: {}", err);
            }
        }
    }

    let sanitized_book_name = prompt::sanitize_for_prompt(&request.book_name);
    let user_prompt = prompt::build_recommendation_prompt(&sanitized_book_name, &tags);

    let timer = OperationTimer::new("recommendation_stream");
    let mut stream = match state
        .llm
        .chat_stream(
            prompt::RECOMMEND_SYSTEM_PROMPT,
            &user_prompt,
            state.config.openai.max_tokens,
            Some(state.config.openai.temperature),
        )
        .await
    {
        Ok(stream) => stream,
        Err(err) => {
            error!(%request_id, "Failed to open recommendation stream: {}", err);
            let _ = tx.unbounded_send(StreamEvent::Error {
                error: err.client_message(),
            });
            return;
        }
    };

    let mut accumulated = String::new();
    let mut chunk_count = 0usize;

    while let Some(delta) = stream.next().await {
        match delta {
            Ok(content) => {
                chunk_count += 1;
                accumulated.push_str(&content);
                let event = StreamEvent::Chunk {
                    chunk: content,
                    text: accumulated.clone(),
                };
                if tx.unbounded_send(event).is_err() {
                    debug!(%request_id, "Client disconnected, abandoning stream");
                    return;
                }
            }
            Err(err) => {
                error!(%request_id, "Error during stream iteration: {}", err);
                let _ = tx.unbounded_send(StreamEvent::Error {
                    error: err.client_message(),
                });
                return;
            }
        }
    }

    timer.finish_with_count(chunk_count);

    if accumulated.is_empty() {
        let error = format!(
            "No content received from API. Model '{}' may not exist or may not support \
             streaming. Please check the model name and try again.",
            state.config.openai.model
        );
        error!(%request_id, "{}", error);
        let _ = tx.unbounded_send(StreamEvent::Error { error });
        return;
    }

    let _ = tx.unbounded_send(StreamEvent::done(accumulated.clone()));

    state
        .cache
        .set(&request.book_name, &request.tags, &accumulated);
    if let Err(err) = state
        .store
        .save_recommendations(&request.book_name, &tags, &accumulated)
    {
        warn!(%request_id, "Failed to save recommendations: {}", err);
    }

    info!(%request_id, "Successfully streamed recommendations for: {}", request.book_name);
}

async fn fetch_tags(state: &AppState, book_name: &str) -> Result<Vec<String>> {
    let tags_prompt = prompt::build_tags_prompt(book_name);
    let text = state
        .llm
        .chat(
            prompt::TAGS_SYSTEM_PROMPT,
            &tags_prompt,
            state.config.openai.tags_max_tokens,
            None,
        )
        .await?;

    Ok(prompt::parse_tag_response(
        &text,
        state.config.limits.max_inferred_tags,
    ))
}
