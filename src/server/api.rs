// Transcript endpoints
//
// Read-only JSON views over the configured transcript source. Handlers never
// hold locks; every request lists or fetches from the source afresh.

use super::{ApiError, AppState};
use crate::interpreter::{clock::DisplayZone, Interpreter};
use crate::transcripts::{filter_summaries, validate_filename, Transcript, TranscriptSummary};
use crate::view::{project, PresentationMode, Projection};
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

/// Query parameters for /api/logs
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Case-insensitive filter over filename, issue and timestamp
    pub q: Option<String>,
}

/// Query parameters for /api/logs/:filename/view
#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    /// `formatted` (default) or `raw`
    pub mode: Option<String>,
    /// Display zone for timestamps, overriding the configured one
    pub tz: Option<String>,
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /api/logs - Transcript summaries, newest first
pub async fn list_logs(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<TranscriptSummary>>, ApiError> {
    let summaries = state.source.list().await?;

    let summaries = match params.q.as_deref() {
        Some(query) => filter_summaries(&summaries, query),
        None => summaries,
    };

    Ok(Json(summaries))
}

/// GET /api/logs/:filename - Full transcript
pub async fn get_log(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<Transcript>, ApiError> {
    Ok(Json(state.source.fetch(&filename).await?))
}

/// GET /api/logs/:filename/view - Formatted or raw projection
///
/// Query params:
///   - mode: formatted | raw (default: formatted)
///   - tz: utc | local | +HH:MM (default: configured zone)
pub async fn view_log(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    Query(params): Query<ViewQuery>,
) -> Result<Json<Projection>, ApiError> {
    let mode = match params.mode.as_deref() {
        Some(mode) => mode.parse::<PresentationMode>().map_err(ApiError::BadRequest)?,
        None => PresentationMode::default(),
    };
    let interpreter = match params.tz.as_deref() {
        Some(tz) => Interpreter::new(tz.parse::<DisplayZone>().map_err(ApiError::BadRequest)?),
        None => state.interpreter,
    };

    let transcript = state.source.fetch(&filename).await?;
    Ok(Json(project(&transcript, mode, &interpreter)))
}

/// GET /api/logs/:filename/download - Pretty-printed content as an attachment
pub async fn download_log(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    // Validated up front: the name ends up in a response header
    validate_filename(&filename).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let transcript = state.source.fetch(&filename).await?;
    let body = transcript.export_json()?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    ))
}
