//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented; logs include parameters and basic result info.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::{info, instrument, warn};

use crate::domain::{ExamSession, Question};
use crate::logic::{compose_from_state, random_pick, start_exam, submit_exam};
use crate::protocol::*;
use crate::state::{AppState, SessionError};

const DEFAULT_SESSION_MINUTES: u32 = 90;

type ApiError = (StatusCode, Json<ErrorOut>);

fn bad_request(message: String) -> ApiError {
  (StatusCode::BAD_REQUEST, Json(ErrorOut { message }))
}

fn session_error(e: SessionError) -> ApiError {
  let status = match e {
    SessionError::UnknownSession(_) | SessionError::UnknownQuestion(_) => StatusCode::NOT_FOUND,
    SessionError::AlreadySubmitted(_) => StatusCode::CONFLICT,
  };
  (status, Json(ErrorOut { message: e.to_string() }))
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state, q))]
pub async fn http_compose_exam(
  State(state): State<Arc<AppState>>,
  Query(q): Query<MixOverrides>,
) -> Result<Json<Vec<Question>>, ApiError> {
  let cfg = q.resolve(&state.mix_defaults);
  match compose_from_state(&state, &cfg).await {
    Ok(set) => {
      info!(target: "exam", count = set.len(), "HTTP exam set served");
      Ok(Json(set))
    }
    Err(e) => {
      warn!(target: "exam", error = %e, "HTTP exam composition rejected");
      Err(bad_request(e.to_string()))
    }
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_random_questions(
  State(state): State<Arc<AppState>>,
  Query(q): Query<RandomQuery>,
) -> impl IntoResponse {
  let count = q.count.unwrap_or(57);
  let set = random_pick(&state, count).await;
  info!(target: "exam", requested = count, served = set.len(), "HTTP random pick served");
  Json(set)
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_start_exam(
  State(state): State<Arc<AppState>>,
  Json(body): Json<StartIn>,
) -> Result<Json<StartOut>, ApiError> {
  let cfg = body.mix.resolve(&state.mix_defaults);
  let minutes = body.minutes.unwrap_or(DEFAULT_SESSION_MINUTES);
  match start_exam(&state, &cfg, minutes).await {
    Ok(session) => {
      info!(target: "exam", id = %session.id, count = session.questions.len(), "HTTP session started");
      Ok(Json(StartOut {
        session_id: session.id,
        questions: session.questions,
        minutes: session.minutes,
        started_at: session.started_at,
      }))
    }
    Err(e) => {
      warn!(target: "exam", error = %e, "HTTP session start rejected");
      Err(bad_request(e.to_string()))
    }
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_session(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<ExamSession>, ApiError> {
  match state.get_session(&id).await {
    Some(session) => Ok(Json(session)),
    None => Err(session_error(SessionError::UnknownSession(id))),
  }
}

#[instrument(level = "info", skip(state, body), fields(%id, %body.question_id))]
pub async fn http_save_answer(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<AnswerIn>,
) -> Result<Json<AnswerOut>, ApiError> {
  let answered_count = state
    .save_answer(
      &id,
      &body.question_id,
      body.answer,
      body.flagged,
      body.time_spent_delta_sec.unwrap_or(0),
    )
    .await
    .map_err(session_error)?;
  Ok(Json(AnswerOut { saved: true, answered_count }))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_submit_exam(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<SubmitOut>, ApiError> {
  let out = submit_exam(&state, &id).await.map_err(session_error)?;
  info!(target: "exam", %id, correct = out.correct, total = out.total, "HTTP session submitted");
  Ok(Json(out))
}
