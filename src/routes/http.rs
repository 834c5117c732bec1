//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{extract::{Path, Query, State}, http::StatusCode, response::{IntoResponse, Response}, Json};
use tracing::{info, instrument, warn};

use crate::error::GenerationError;
use crate::protocol::*;
use crate::state::AppState;
use crate::logic::*;

fn error_response(status: StatusCode, error: &str, message: impl Into<String>) -> Response {
  (status, Json(ErrorOut { error: error.into(), message: message.into() })).into_response()
}

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, templates: state.factory.templates().len() })
}

#[instrument(level = "info", skip(state), fields(teks = ?q.teks, seed = ?q.seed))]
pub async fn http_get_practice_next(
  State(state): State<Arc<AppState>>,
  Query(q): Query<PracticeQuery>,
) -> impl IntoResponse {
  let item = next_item(&state, q.teks.as_deref(), q.seed).await;
  info!(target: "item", id = %item.id, "HTTP practice item served");
  Json(item)
}

#[instrument(level = "info", skip_all, fields(%template_id, seed = ?q.seed))]
pub async fn http_get_item(
  State(state): State<Arc<AppState>>,
  Path(template_id): Path<String>,
  Query(q): Query<SeedQuery>,
) -> Response {
  match item_by_template(&state, &template_id, q.seed).await {
    Ok(item) => Json(item).into_response(),
    Err(e @ GenerationError::TemplateNotFound(_)) => error_response(StatusCode::NOT_FOUND, "template_not_found", e.to_string()),
    Err(e) => {
      warn!(target: "item", %template_id, error = %e, "HTTP item generation failed");
      error_response(StatusCode::UNPROCESSABLE_ENTITY, "generation_failed", e.to_string())
    }
  }
}

#[instrument(level = "info", skip(state, body), fields(%body.item_id))]
pub async fn http_post_attempt(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AttemptIn>,
) -> Response {
  match submit_attempt(&state, &body.item_id, &body.response).await {
    Some(out) => {
      info!(target: "grading", id = %body.item_id, correct = out.correct, "HTTP attempt graded");
      Json(out).into_response()
    }
    None => error_response(StatusCode::NOT_FOUND, "item_not_found", format!("Unknown item_id: {}", body.item_id)),
  }
}

#[instrument(level = "info", skip(state), fields(%q.item_id, index = ?q.index))]
pub async fn http_get_hint(
  State(state): State<Arc<AppState>>,
  Query(q): Query<HintQuery>,
) -> Response {
  match get_hint(&state, &q.item_id, q.index).await {
    Some(hint) => Json(hint).into_response(),
    None => error_response(StatusCode::NOT_FOUND, "item_not_found", format!("No hint: unknown item {}", q.item_id)),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_progress(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(progress(&state).await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_curriculum_next(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(recommend_next(&state).await)
}

#[instrument(level = "info", skip(state), fields(limit = ?q.limit))]
pub async fn http_get_due_reviews(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ReviewQuery>,
) -> impl IntoResponse {
  Json(ReviewsOut { due: due_reviews(&state, q.limit).await })
}
