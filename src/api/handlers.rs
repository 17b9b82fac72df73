use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use std::time::Instant;

use crate::inline::InlineAnswer;
use crate::texts;

use super::AppState;
use super::models::{HealthResponse, InlineRequest, StartParams, TextResponse};

pub async fn inline_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<InlineRequest>,
) -> Result<Json<InlineAnswer>, (StatusCode, String)> {
    let start = Instant::now();

    let answer = state.inline.answer(&request.query).await.map_err(|e| {
        (
            StatusCode::BAD_GATEWAY,
            format!("Search provider error: {}", e),
        )
    })?;

    log::info!(
        "inline query {:?} answered in {}ms (not found: {})",
        request.query,
        start.elapsed().as_millis(),
        answer.is_not_found()
    );
    Ok(Json(answer))
}

pub async fn start_handler(Query(params): Query<StartParams>) -> Json<TextResponse> {
    Json(TextResponse {
        text: texts::start_message(&params.first_name, params.user_id),
    })
}

pub async fn help_handler(State(state): State<Arc<AppState>>) -> Json<TextResponse> {
    Json(TextResponse {
        text: texts::help_message(&state.bot_username),
    })
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        search_client_open: !state.inline.client().is_closed(),
    })
}
