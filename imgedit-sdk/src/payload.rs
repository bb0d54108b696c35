// ABOUTME: Request payload types for the image-edit handler's input contract
// ABOUTME: Models the three image-delivery variants as a sum type with flat wire serialization

use serde::Serialize;

use crate::upload::StorageReference;

/// Common editing parameters, passed through to the handler unvalidated.
#[derive(Debug, Clone, Serialize)]
pub struct EditParams {
    pub prompt: String,
    pub seed: i64,
    pub width: u32,
    pub height: u32,
}

/// The image reference for a request. Exactly one delivery mechanism exists
/// by construction; the variant's field name is the wire field name.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ImageSource {
    Url { image_url: String },
    Inline { image_base64: String },
    Storage { image_path: String },
}

impl ImageSource {
    pub fn url(url: impl Into<String>) -> Self {
        ImageSource::Url { image_url: url.into() }
    }

    pub fn inline(encoded: impl Into<String>) -> Self {
        ImageSource::Inline {
            image_base64: encoded.into(),
        }
    }

    pub fn storage(reference: StorageReference) -> Self {
        ImageSource::Storage {
            image_path: reference.remote_path,
        }
    }

    /// The wire field name this variant serializes under.
    pub fn field_name(&self) -> &'static str {
        match self {
            ImageSource::Url { .. } => "image_url",
            ImageSource::Inline { .. } => "image_base64",
            ImageSource::Storage { .. } => "image_path",
        }
    }
}

/// A complete edit request: the common parameters plus exactly one image
/// reference, serialized flat to match the handler's input contract.
#[derive(Debug, Clone, Serialize)]
pub struct EditRequest {
    #[serde(flatten)]
    pub params: EditParams,
    #[serde(flatten)]
    pub image: ImageSource,
}

impl EditRequest {
    pub fn new(params: EditParams, image: ImageSource) -> Self {
        Self { params, image }
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("EditRequest serialization is infallible")
    }
}
