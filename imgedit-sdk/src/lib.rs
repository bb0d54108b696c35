// ABOUTME: SDK for invoking a synchronous image-edit inference endpoint
// ABOUTME: Normalizes three image-delivery modes into one request contract and classifies results

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::json;
use std::time::Duration;

pub mod builder;
pub mod classify;
pub mod constants;
pub mod encode;
pub mod error;
pub mod payload;
pub mod response;
pub mod upload;

pub use builder::EndpointClientConfig;
pub use classify::{Outcome, classify};
pub use encode::{decode_image, encode_file};
pub use error::HarnessError;
pub use payload::{EditParams, EditRequest, ImageSource};
pub use response::{InvocationResult, JobStatus};
pub use upload::{ObjectStore, StorageConfig, StorageReference, StorageUploader, upload_image};

use constants::{hold, preview, previews, urls};

/// Compute the server-side result-hold duration for a client timeout.
/// Clamped so the server is never asked to hold results for less than 60
/// seconds or more than 5 minutes.
pub fn hold_duration_ms(timeout_secs: u64) -> u64 {
    timeout_secs
        .saturating_mul(1000)
        .clamp(hold::MIN_WAIT_MS, hold::MAX_WAIT_MS)
}

/// Client for one serverless image-edit endpoint. Each `run_sync` call
/// triggers exactly one remote compute job; there are no retries.
pub struct EndpointClient {
    client: reqwest::Client,
    api_key: SecretString,
    endpoint_id: String,
    base_url: String,
    timeout: Duration,
}

impl EndpointClient {
    pub(crate) fn from_config(config: EndpointClientConfig) -> Result<Self, HarnessError> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("imgedit-cli/", env!("CARGO_PKG_VERSION"))),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key,
            endpoint_id: config.endpoint_id,
            base_url: config
                .base_url
                .unwrap_or_else(|| urls::API_BASE.to_string()),
            timeout: config.timeout,
        })
    }

    /// The client-side deadline this client was configured with.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Invoke the endpoint synchronously with `{"input": input}` and wait
    /// for the result up to the configured timeout. The server is asked to
    /// hold the result for the clamped equivalent of that timeout.
    pub async fn run_sync<T: Serialize + ?Sized>(
        &self,
        input: &T,
    ) -> Result<InvocationResult, HarnessError> {
        let wait_ms = hold_duration_ms(self.timeout.as_secs());
        let url = format!("{}/v2/{}/runsync", self.base_url, self.endpoint_id);
        log::debug!("POST {url} (wait={wait_ms}ms)");

        let response = self
            .client
            .post(&url)
            .query(&[("wait", wait_ms)])
            .bearer_auth(self.api_key.expose_secret())
            .json(&json!({ "input": input }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HarnessError::Transport {
                message: format!("HTTP {status}"),
                body_preview: (!body.is_empty())
                    .then(|| preview(&body, previews::ERROR_BODY)),
            });
        }

        let raw: serde_json::Value = response
            .json()
            .await
            .map_err(|_| HarnessError::InvalidResponse)?;
        log::debug!("response status field: {:?}", raw.get("status"));

        Ok(InvocationResult::from_raw(raw))
    }
}
