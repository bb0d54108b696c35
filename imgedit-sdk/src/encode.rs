// ABOUTME: Inline encoding of local image files for transport in request bodies
// ABOUTME: Base64 (standard alphabet) encode and the matching decode for result images

use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::path::Path;

use crate::error::HarnessError;

/// Encode a local file's bytes as base64 for inline delivery.
///
/// Deterministic for identical bytes. Fails with `NotFound` if the path
/// does not reference an existing file.
pub fn encode_file<P: AsRef<Path>>(path: P) -> Result<String, HarnessError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(HarnessError::NotFound(path.display().to_string()));
    }
    let bytes = std::fs::read(path)?;
    Ok(STANDARD.encode(bytes))
}

/// Decode base64 image data returned by the endpoint.
pub fn decode_image(data: &str) -> Result<Vec<u8>, HarnessError> {
    STANDARD
        .decode(data.trim())
        .map_err(|e| HarnessError::Decode(e.to_string()))
}
