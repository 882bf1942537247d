use super::HttpRestConnection;
use crate::types::{DEFAULT_REST_ENDPOINT, DEFAULT_TIMEOUT, PubSubError, Result};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Default)]
pub struct RestClientOptions {
    /// API key of the form `appId.keyId:secret`
    pub api_key: String,
    /// REST endpoint; defaults to [`DEFAULT_REST_ENDPOINT`]
    pub endpoint: Option<String>,
    /// Request timeout in milliseconds; defaults to [`DEFAULT_TIMEOUT`]
    pub timeout: Option<u64>,
    /// Client id attached to every published message
    pub client_id: Option<String>,
}

/// Builder for [`HttpRestConnection`] that validates the options
pub struct RestClientBuilder {
    endpoint: Url,
    key_name: String,
    key_secret: String,
    timeout: Duration,
    client_id: Option<String>,
}

impl RestClientBuilder {
    /// Create a new builder
    pub fn new(options: RestClientOptions) -> Result<Self> {
        // Validate API key is provided
        if options.api_key.is_empty() {
            return Err(PubSubError::Auth("API key is required".to_string()));
        }

        let Some((key_name, key_secret)) = options.api_key.split_once(':') else {
            return Err(PubSubError::Auth(
                "API key must have the form appId.keyId:secret".to_string(),
            ));
        };
        if key_name.is_empty() || key_secret.is_empty() {
            return Err(PubSubError::Auth(
                "API key must have the form appId.keyId:secret".to_string(),
            ));
        }

        let endpoint = Url::parse(options.endpoint.as_deref().unwrap_or(DEFAULT_REST_ENDPOINT))?;
        if endpoint.cannot_be_a_base() {
            return Err(PubSubError::Connection(format!(
                "REST endpoint '{}' cannot carry a path",
                endpoint
            )));
        }

        Ok(Self {
            endpoint,
            key_name: key_name.to_string(),
            key_secret: key_secret.to_string(),
            timeout: Duration::from_millis(options.timeout.unwrap_or(DEFAULT_TIMEOUT)),
            client_id: options.client_id,
        })
    }

    /// Build the connection and its HTTP client
    pub fn build(self) -> Result<HttpRestConnection> {
        let http = reqwest::Client::builder().timeout(self.timeout).build()?;

        Ok(HttpRestConnection::from_parts(
            http,
            self.endpoint,
            self.key_name,
            self.key_secret,
            self.client_id,
        ))
    }
}
