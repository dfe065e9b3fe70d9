//! [`ImageGenerator`] backed by the Gemini image model.

use async_trait::async_trait;
use tryon_core::data_uri::DataUri;
use tryon_core::dispatch::ImageGenerator;
use tryon_core::encoder::Attachment;
use tryon_core::error::TryOnError;

use crate::api::{GeminiApi, GeminiApiError};
use crate::config::GeminiConfig;
use crate::messages::{GenerateContentRequest, Part};

/// Sends one `generateContent` call per scene; never retries.
pub struct GeminiGenerator {
    api: GeminiApi,
}

impl GeminiGenerator {
    pub fn new(config: GeminiConfig) -> Result<Self, GeminiApiError> {
        Ok(Self {
            api: GeminiApi::new(config)?,
        })
    }
}

/// Attachment parts in order, followed by the instruction text.
pub fn build_request(attachments: &[Attachment], instruction: &str) -> GenerateContentRequest {
    let parts = attachments
        .iter()
        .map(|a| Part::inline(a.mime_type.clone(), a.data.clone()))
        .chain(std::iter::once(Part::text(instruction)))
        .collect();
    GenerateContentRequest::image_and_text(parts)
}

#[async_trait]
impl ImageGenerator for GeminiGenerator {
    async fn generate(
        &self,
        attachments: &[Attachment],
        instruction: &str,
    ) -> Result<DataUri, TryOnError> {
        let request = build_request(attachments, instruction);

        let response = self.api.generate_content(&request).await.map_err(|e| {
            tracing::error!(model = self.api.model(), error = %e, "Gemini generateContent call failed");
            TryOnError::GenerationCall(e.to_string())
        })?;

        match response.first_inline_image() {
            Some(image) => Ok(DataUri::new(image.mime_type.clone(), image.data.clone())),
            None => {
                tracing::warn!(
                    model = self.api.model(),
                    candidates = response.candidates.len(),
                    text = %response.text().unwrap_or_default(),
                    "Gemini response contained no image"
                );
                Err(TryOnError::NoImageInResponse)
            }
        }
    }
}
