//! Attachment encoding: asset bytes to base64 payloads tagged with a media type.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::asset::{Slot, UploadedAsset};
use crate::error::TryOnError;
use crate::selection::TryOnInputs;

/// A transport-ready image payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub mime_type: String,
    /// Base64 (standard alphabet, padded) encoding of the image bytes.
    pub data: String,
}

/// Read an asset to completion and encode it.
pub async fn encode_attachment(slot: Slot, asset: &UploadedAsset) -> Result<Attachment, TryOnError> {
    let bytes = asset
        .read_bytes()
        .await
        .map_err(|source| TryOnError::Encoding {
            slot: slot.as_str(),
            source,
        })?;

    Ok(Attachment {
        mime_type: asset.media_type().to_string(),
        data: BASE64.encode(bytes),
    })
}

/// Encode all present inputs in request order: model, top, bottom, accessory.
pub async fn encode_inputs(inputs: &TryOnInputs) -> Result<Vec<Attachment>, TryOnError> {
    let slots = [
        (Slot::Model, Some(&inputs.model)),
        (Slot::Top, inputs.top.as_ref()),
        (Slot::Bottom, inputs.bottom.as_ref()),
        (Slot::Accessory, inputs.accessory.as_ref()),
    ];

    let mut attachments = Vec::with_capacity(slots.len());
    for (slot, asset) in slots {
        if let Some(asset) = asset {
            attachments.push(encode_attachment(slot, asset).await?);
        }
    }
    Ok(attachments)
}
