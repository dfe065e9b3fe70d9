//! Handlers for the `/sessions` resource.
//!
//! A session mirrors the interactive flow: fill slots one by one, pick the
//! garment mode, start a batch, poll until it finishes, download results.
//! Generation runs in a detached task so a dropped connection does not
//! abandon the batch.

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use tryon_core::asset::{Slot, UploadedAsset};
use tryon_core::error::CoreError;
use tryon_core::orchestrator::run_batch;
use tryon_core::selection::SelectionAction;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{SessionView, UpdateGarments};
use crate::response::DataResponse;
use crate::state::AppState;
use crate::upload::read_file_field;

type SessionResponse = Json<DataResponse<SessionView>>;

fn parse_slot(raw: &str) -> AppResult<Slot> {
    Ok(raw.parse::<Slot>()?)
}

async fn snapshot(state: &AppState, id: Uuid) -> AppResult<SessionResponse> {
    let view = state.sessions.read(id, |s| SessionView::new(id, s)).await?;
    Ok(Json(DataResponse { data: view }))
}

/// POST /api/v1/sessions
pub async fn create_session(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, SessionResponse)> {
    let id = state.sessions.create().await;
    tracing::info!(session_id = %id, "Session created");
    Ok((StatusCode::CREATED, snapshot(&state, id).await?))
}

/// GET /api/v1/sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<SessionResponse> {
    snapshot(&state, id).await
}

/// DELETE /api/v1/sessions/{id}
///
/// Drops the session together with its spooled uploads.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.sessions.remove(id).await?;
    tracing::info!(session_id = %id, "Session deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/sessions/{id}/slots/{slot}
///
/// Multipart form with a single `file` field. Replaces whatever the slot
/// held before; the replaced upload is deleted from the spool directory.
pub async fn put_slot(
    State(state): State<AppState>,
    Path((id, slot)): Path<(Uuid, String)>,
    mut multipart: Multipart,
) -> AppResult<SessionResponse> {
    let slot = parse_slot(&slot)?;
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() == Some("file") {
            upload = Some(read_file_field(field, state.config.max_upload_bytes).await?);
        }
    }

    let file =
        upload.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;

    let mut asset = UploadedAsset::spooled(&state.config.upload_dir, file.media_type, &file.bytes)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to spool upload: {e}")))?;
    if let Some(file_name) = file.file_name {
        asset = asset.with_file_name(file_name);
    }
    let asset = Arc::new(asset);

    let view = state
        .sessions
        .update(id, |s| {
            s.apply(SelectionAction::Set(slot, asset))?;
            Ok(SessionView::new(id, s))
        })
        .await?;

    tracing::debug!(session_id = %id, %slot, "Slot filled");
    Ok(Json(DataResponse { data: view }))
}

/// DELETE /api/v1/sessions/{id}/slots/{slot}
pub async fn clear_slot(
    State(state): State<AppState>,
    Path((id, slot)): Path<(Uuid, String)>,
) -> AppResult<SessionResponse> {
    let slot = parse_slot(&slot)?;
    let view = state
        .sessions
        .update(id, |s| {
            s.apply(SelectionAction::Clear(slot))?;
            Ok(SessionView::new(id, s))
        })
        .await?;
    Ok(Json(DataResponse { data: view }))
}

/// GET /api/v1/sessions/{id}/slots/{slot}/preview
///
/// Streams the stored upload back with its original media type.
pub async fn preview_slot(
    State(state): State<AppState>,
    Path((id, slot)): Path<(Uuid, String)>,
) -> AppResult<impl IntoResponse> {
    let slot = parse_slot(&slot)?;
    let asset = state
        .sessions
        .read(id, |s| s.selection.asset(slot).cloned())
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Slot",
            id: slot.to_string(),
        })?;

    let bytes = asset
        .read_bytes()
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to read upload: {e}")))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, asset.media_type().to_string())],
        bytes,
    ))
}

/// PUT /api/v1/sessions/{id}/garments
pub async fn update_garments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateGarments>,
) -> AppResult<SessionResponse> {
    let view = state
        .sessions
        .update(id, |s| {
            if let Some(mode) = body.mode {
                s.apply(SelectionAction::SetGarmentMode(mode))?;
            }
            if let Some(kind) = body.kind {
                s.apply(SelectionAction::SetSingleGarmentKind(kind))?;
            }
            Ok(SessionView::new(id, s))
        })
        .await?;
    Ok(Json(DataResponse { data: view }))
}

/// POST /api/v1/sessions/{id}/generate
///
/// Starts a batch and returns immediately with `202 Accepted`. Poll
/// `GET /sessions/{id}` until the phase leaves `submitting`. Only one
/// batch per session may be in flight; a successful batch must be reset
/// before the next one.
pub async fn start_generation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<(StatusCode, SessionResponse)> {
    let (ticket, inputs, view) = state
        .sessions
        .update(id, |s| {
            s.submission.ensure_editable()?;
            let inputs = s.selection.try_on_inputs().ok_or_else(|| {
                CoreError::Validation(
                    s.selection
                        .blocked_reason()
                        .unwrap_or("Selection is incomplete")
                        .to_string(),
                )
            })?;
            let ticket = s.submission.begin()?;
            s.results.clear();
            s.error = None;
            Ok((ticket, inputs, SessionView::new(id, s)))
        })
        .await?;

    tracing::info!(session_id = %id, "Try-on batch started");

    let generator = Arc::clone(&state.generator);
    let sessions = Arc::clone(&state.sessions);
    tokio::spawn(async move {
        let outcome = run_batch(generator.as_ref(), &inputs).await;
        if let Err(e) = &outcome {
            tracing::error!(session_id = %id, error = %e, "Try-on batch failed");
        }
        sessions.record_outcome(id, ticket, &outcome).await;
    });

    Ok((StatusCode::ACCEPTED, Json(DataResponse { data: view })))
}

/// POST /api/v1/sessions/{id}/reset
///
/// Clears all slots and results and returns to idle. A batch still in
/// flight keeps running but its outcome is discarded.
pub async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<SessionResponse> {
    let view = state
        .sessions
        .update(id, |s| {
            s.reset();
            Ok(SessionView::new(id, s))
        })
        .await?;
    tracing::info!(session_id = %id, "Session reset");
    Ok(Json(DataResponse { data: view }))
}

/// GET /api/v1/sessions/{id}/results/{index}/download
///
/// Serves the decoded image as an attachment named
/// `4seasons_<scene>_high-resolution.<ext>`.
pub async fn download_result(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> AppResult<impl IntoResponse> {
    let image = state
        .sessions
        .read(id, |s| s.results.get(index).cloned())
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Result",
            id: index.to_string(),
        })?;

    let bytes = image.image.decode()?;
    let disposition = format!("attachment; filename=\"{}\"", image.download_filename());

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, image.image.mime_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
