/// User-facing message for any failure inside a generation batch.
pub const GENERATION_FAILED_MESSAGE: &str =
    "Could not generate one of the images. Please try again.";

/// User-facing message for failures that are not the generation service's fault.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred.";

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failures of the try-on pipeline.
///
/// Every variant collapses into one of two generic messages when shown to
/// the end user (see [`TryOnError::user_message`]); the detail carried here
/// is for logs only.
#[derive(Debug, thiserror::Error)]
pub enum TryOnError {
    /// Missing or malformed service credential. Fatal at startup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A local asset could not be read while building attachments.
    #[error("Could not encode {slot} image: {source}")]
    Encoding {
        slot: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The call to the generation service itself failed.
    #[error("Generation call failed: {0}")]
    GenerationCall(String),

    /// The service answered but no part carried inline image data.
    #[error("Generation response contained no image")]
    NoImageInResponse,
}

impl TryOnError {
    /// The message shown to the end user for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            TryOnError::GenerationCall(_) | TryOnError::NoImageInResponse => {
                GENERATION_FAILED_MESSAGE
            }
            TryOnError::Configuration(_) | TryOnError::Encoding { .. } => UNEXPECTED_ERROR_MESSAGE,
        }
    }

    /// Whether the failure originated in the external generation service.
    pub fn is_generation_failure(&self) -> bool {
        matches!(
            self,
            TryOnError::GenerationCall(_) | TryOnError::NoImageInResponse
        )
    }
}
