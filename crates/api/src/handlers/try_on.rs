//! One-shot try-on: upload everything in one multipart request and wait for
//! the four images.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::Json;
use serde::de::DeserializeOwned;
use tryon_core::asset::{Slot, UploadedAsset};
use tryon_core::error::CoreError;
use tryon_core::orchestrator::run_batch;
use tryon_core::selection::{SelectionAction, SelectionState};

use crate::error::{AppError, AppResult};
use crate::models::{ResultView, TryOnResponse};
use crate::response::DataResponse;
use crate::state::AppState;
use crate::upload::{read_file_field, read_text_field};

/// Parse a snake_case enum value sent as a plain form field.
pub(crate) fn parse_choice<T: DeserializeOwned>(field: &str, value: String) -> AppResult<T> {
    serde_json::from_value(serde_json::Value::String(value.clone())).map_err(|_| {
        AppError::BadRequest(format!("Invalid value '{value}' for field '{field}'"))
    })
}

/// POST /api/v1/try-on
///
/// Multipart fields: `model` (required), `top`, `bottom`, `accessory`
/// (image files) plus optional `garment_mode` (`single`|`double`, default
/// `single`) and `garment_kind` (`top`|`bottom`, default `top`). Garments the
/// chosen mode does not use are ignored.
pub async fn create_try_on(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<DataResponse<TryOnResponse>>> {
    let mut selection = SelectionState::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "garment_mode" => {
                let mode = parse_choice(&name, read_text_field(field).await?)?;
                selection = selection.apply(SelectionAction::SetGarmentMode(mode));
            }
            "garment_kind" => {
                let kind = parse_choice(&name, read_text_field(field).await?)?;
                selection = selection.apply(SelectionAction::SetSingleGarmentKind(kind));
            }
            other => {
                let Ok(slot) = other.parse::<Slot>() else {
                    continue; // ignore unknown fields
                };
                let file = read_file_field(field, state.config.max_upload_bytes).await?;
                let mut asset = UploadedAsset::in_memory(file.media_type, file.bytes);
                if let Some(file_name) = file.file_name {
                    asset = asset.with_file_name(file_name);
                }
                selection = selection.apply(SelectionAction::Set(slot, Arc::new(asset)));
            }
        }
    }

    let inputs = selection.try_on_inputs().ok_or_else(|| {
        CoreError::Validation(
            selection
                .blocked_reason()
                .unwrap_or("Selection is incomplete")
                .to_string(),
        )
    })?;

    let images = run_batch(state.generator.as_ref(), &inputs).await?;

    Ok(Json(DataResponse {
        data: TryOnResponse {
            images: images
                .iter()
                .map(|image| ResultView::from_image(image, None))
                .collect(),
        },
    }))
}
