//! Batch orchestration: one submission, four concurrent scene requests.
//!
//! All four requests are issued before any is awaited and the batch waits
//! for every one of them. Results are collected from a fixed-order list of
//! futures, so the output is index-aligned to [`Scene::ALL`] no matter
//! which request finishes first. Any failure fails the whole batch.

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;

use crate::asset::UploadedAsset;
use crate::data_uri::DataUri;
use crate::dispatch::ImageGenerator;
use crate::encoder::{encode_inputs, Attachment};
use crate::error::TryOnError;
use crate::prompt::build_instructions;
use crate::scene::Scene;
use crate::selection::TryOnInputs;

/// One generated result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub scene: Scene,
    pub image: DataUri,
}

impl GeneratedImage {
    /// Export file name for this result.
    pub fn download_filename(&self) -> String {
        self.scene.download_filename(self.image.mime_type())
    }
}

/// Generate the four scene images for a person and the selected items.
///
/// Convenience entry point taking the assets directly.
pub async fn generate_virtual_try_on(
    generator: &dyn ImageGenerator,
    model: Arc<UploadedAsset>,
    top: Option<Arc<UploadedAsset>>,
    bottom: Option<Arc<UploadedAsset>>,
    accessory: Option<Arc<UploadedAsset>>,
) -> Result<Vec<GeneratedImage>, TryOnError> {
    let inputs = TryOnInputs {
        model,
        top,
        bottom,
        accessory,
    };
    run_batch(generator, &inputs).await
}

/// Encode the inputs once and fan the four scene requests out.
pub async fn run_batch(
    generator: &dyn ImageGenerator,
    inputs: &TryOnInputs,
) -> Result<Vec<GeneratedImage>, TryOnError> {
    let started = Instant::now();
    let attachments = encode_inputs(inputs).await.inspect_err(|e| {
        tracing::error!(error = %e, "Failed to encode try-on attachments");
    })?;
    let instructions = build_instructions(inputs.items());

    tracing::info!(
        attachments = attachments.len(),
        scenes = instructions.len(),
        "Dispatching try-on batch"
    );

    let pending = Scene::ALL
        .into_iter()
        .zip(instructions.iter())
        .map(|(scene, instruction)| generate_scene(generator, &attachments, scene, instruction));

    let images = join_all(pending)
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Try-on batch completed"
    );
    Ok(images)
}

async fn generate_scene(
    generator: &dyn ImageGenerator,
    attachments: &[Attachment],
    scene: Scene,
    instruction: &str,
) -> Result<GeneratedImage, TryOnError> {
    match generator.generate(attachments, instruction).await {
        Ok(image) => {
            tracing::debug!(%scene, mime_type = image.mime_type(), "Scene generated");
            Ok(GeneratedImage { scene, image })
        }
        Err(e) => {
            tracing::error!(%scene, error = %e, "Scene generation failed");
            Err(e)
        }
    }
}
