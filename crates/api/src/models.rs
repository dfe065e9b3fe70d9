//! Request and response bodies of the HTTP API.

use serde::{Deserialize, Serialize};
use tryon_core::asset::Slot;
use tryon_core::orchestrator::GeneratedImage;
use tryon_core::scene::Scene;
use tryon_core::selection::{GarmentKind, GarmentMode};
use tryon_core::submission::SubmissionPhase;
use uuid::Uuid;

use crate::sessions::{Session, Timestamp};

/// Body of `PUT /sessions/{id}/garments`.
#[derive(Debug, Deserialize)]
pub struct UpdateGarments {
    pub mode: Option<GarmentMode>,
    pub kind: Option<GarmentKind>,
}

/// One generated image as returned to the client.
#[derive(Debug, Serialize)]
pub struct ResultView {
    pub index: usize,
    pub scene: Scene,
    pub title: &'static str,
    pub download_name: String,
    pub data_uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

impl ResultView {
    pub fn from_image(image: &GeneratedImage, session_id: Option<Uuid>) -> Self {
        let index = image.scene.index();
        Self {
            index,
            scene: image.scene,
            title: image.scene.title(),
            download_name: image.download_filename(),
            data_uri: image.image.to_string(),
            download_url: session_id
                .map(|id| format!("/api/v1/sessions/{id}/results/{index}/download")),
        }
    }
}

/// Response of a generation request.
#[derive(Debug, Serialize)]
pub struct TryOnResponse {
    pub images: Vec<ResultView>,
}

/// An occupied slot.
#[derive(Debug, Serialize)]
pub struct SlotView {
    pub slot: Slot,
    pub media_type: String,
    pub file_name: Option<String>,
    pub size_bytes: u64,
    pub preview_url: String,
}

/// Snapshot of a session.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub phase: SubmissionPhase,
    pub garment_mode: GarmentMode,
    pub single_garment_kind: GarmentKind,
    pub can_generate: bool,
    pub blocked_reason: Option<&'static str>,
    pub slots: Vec<SlotView>,
    pub error: Option<String>,
    pub results: Vec<ResultView>,
    pub created_at: Timestamp,
    pub last_active_at: Timestamp,
}

impl SessionView {
    pub fn new(id: Uuid, session: &Session) -> Self {
        let selection = &session.selection;
        let slots = Slot::ALL
            .into_iter()
            .filter_map(|slot| {
                selection.asset(slot).map(|asset| SlotView {
                    slot,
                    media_type: asset.media_type().to_string(),
                    file_name: asset.file_name().map(str::to_string),
                    size_bytes: asset.size_bytes(),
                    preview_url: format!("/api/v1/sessions/{id}/slots/{slot}/preview"),
                })
            })
            .collect();

        Self {
            id,
            phase: session.submission.phase(),
            garment_mode: selection.garment_mode(),
            single_garment_kind: selection.single_garment_kind(),
            can_generate: selection.can_generate(),
            blocked_reason: selection.blocked_reason(),
            slots,
            error: session.error.clone(),
            results: session
                .results
                .iter()
                .map(|image| ResultView::from_image(image, Some(id)))
                .collect(),
            created_at: session.created_at,
            last_active_at: session.last_active_at,
        }
    }
}
