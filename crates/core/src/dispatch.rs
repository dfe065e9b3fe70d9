//! The seam between the orchestrator and the external image model.

use async_trait::async_trait;

use crate::data_uri::DataUri;
use crate::encoder::Attachment;
use crate::error::TryOnError;

/// Issues a single generation request.
///
/// Implementations send the attachments (in the given order) followed by
/// the instruction text, request image and text output, and return the
/// first inline image of the response. They must not retry.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate one image.
    ///
    /// Errors are [`TryOnError::GenerationCall`] when the call fails and
    /// [`TryOnError::NoImageInResponse`] when the response has no image.
    async fn generate(
        &self,
        attachments: &[Attachment],
        instruction: &str,
    ) -> Result<DataUri, TryOnError>;
}
