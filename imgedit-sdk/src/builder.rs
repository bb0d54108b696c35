// ABOUTME: Builder pattern implementation for EndpointClient configuration
// ABOUTME: Provides type-safe configuration with credential validation at build time

use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use typed_builder::TypedBuilder;

use crate::EndpointClient;
use crate::constants::timeouts;
use crate::error::HarnessError;

#[derive(Debug, TypedBuilder)]
#[builder(build_method(into = Result<EndpointClient, HarnessError>))]
pub struct EndpointClientConfig {
    pub api_key: SecretString,

    pub endpoint_id: String,

    /// Override for the API base URL, used by tests against a local server.
    #[builder(default = None)]
    pub base_url: Option<String>,

    /// Client-side deadline for the synchronous call; also drives the
    /// server-side hold duration.
    #[builder(default = timeouts::DEFAULT_CLIENT_TIMEOUT)]
    pub timeout: Duration,
}

impl From<EndpointClientConfig> for Result<EndpointClient, HarnessError> {
    fn from(config: EndpointClientConfig) -> Self {
        EndpointClient::from_config(config)
    }
}

impl EndpointClient {
    pub fn builder() -> EndpointClientConfigBuilder<((), (), (), ())> {
        EndpointClientConfig::builder()
    }
}

impl EndpointClientConfig {
    pub(crate) fn validate(&self) -> Result<(), HarnessError> {
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(HarnessError::Auth);
        }
        if self.endpoint_id.trim().is_empty() {
            return Err(HarnessError::Config("endpoint id".to_string()));
        }
        Ok(())
    }
}
