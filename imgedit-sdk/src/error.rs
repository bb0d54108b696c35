// ABOUTME: Custom error types for the image-edit harness SDK with user-friendly messages
// ABOUTME: Covers configuration, local-file, transport, storage, and decoding failure modes

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("Missing configuration: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Authentication failed. Check your RUNPOD_API_KEY")]
    Auth,

    #[error("Request failed: {message}")]
    Transport {
        message: String,
        body_preview: Option<String>,
    },

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Timeout: the endpoint did not respond within the client deadline")]
    Timeout,

    #[error("Invalid API response format")]
    InvalidResponse,

    #[error("Failed to decode result image: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarnessError {
    pub fn help_text(&self) -> Option<&'static str> {
        match self {
            HarnessError::Config(_) => Some(
                "Set RUNPOD_API_KEY and RUNPOD_ENDPOINT_ID (and the S3_* variables for storage mode), or put them in imgedit.toml",
            ),
            HarnessError::Auth => Some("Get your API key from the endpoint provider's settings page"),
            HarnessError::Transport { .. } => Some("Check your internet connection and the endpoint id, then try again"),
            HarnessError::Timeout => Some("Raise --timeout, or switch to an asynchronous run/status flow for long jobs"),
            HarnessError::Upload(_) => Some("Verify the S3 endpoint, bucket, and credentials are valid for the network volume"),
            _ => None,
        }
    }

    /// The captured response body, if any, truncated at capture time.
    pub fn body_preview(&self) -> Option<&str> {
        match self {
            HarnessError::Transport { body_preview, .. } => body_preview.as_deref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for HarnessError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            HarnessError::Timeout
        } else {
            HarnessError::Transport {
                message: err.to_string(),
                body_preview: None,
            }
        }
    }
}
