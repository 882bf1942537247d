use super::{RestClientBuilder, RestClientOptions};
use crate::provider::{RestChannelHandle, RestConnection};
use crate::types::{CHANNELS_PATH, MESSAGES_PATH, PubSubError, Result, encodings};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use url::Url;

struct RestInner {
    http: reqwest::Client,
    endpoint: Url,
    key_name: String,
    key_secret: String,
    client_id: Option<String>,
}

/// Publish-only connection to the hosted service's REST API.
///
/// # Example
///
/// ```no_run
/// use pubsub_builder::provider::http::{HttpRestConnection, RestClientOptions};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let connection = HttpRestConnection::new(RestClientOptions {
///     api_key: "app.key:secret".to_string(),
///     ..Default::default()
/// })?;
/// # Ok(())
/// # }
/// ```
pub struct HttpRestConnection {
    inner: Arc<RestInner>,
    channels: Mutex<HashMap<String, Arc<HttpRestChannel>>>,
}

impl HttpRestConnection {
    pub fn new(options: RestClientOptions) -> Result<Self> {
        RestClientBuilder::new(options)?.build()
    }

    pub(super) fn from_parts(
        http: reqwest::Client,
        endpoint: Url,
        key_name: String,
        key_secret: String,
        client_id: Option<String>,
    ) -> Self {
        Self {
            inner: Arc::new(RestInner {
                http,
                endpoint,
                key_name,
                key_secret,
                client_id,
            }),
            channels: Mutex::new(HashMap::new()),
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }
}

impl RestConnection for HttpRestConnection {
    fn channel(&self, name: &str) -> Arc<dyn RestChannelHandle> {
        let mut channels = self
            .channels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let channel = channels.entry(name.to_string()).or_insert_with(|| {
            Arc::new(HttpRestChannel {
                name: name.to_string(),
                inner: Arc::clone(&self.inner),
            })
        });
        Arc::clone(channel) as Arc<dyn RestChannelHandle>
    }
}

/// Channel handle publishing over HTTP POST
pub struct HttpRestChannel {
    name: String,
    inner: Arc<RestInner>,
}

#[async_trait]
impl RestChannelHandle for HttpRestChannel {
    fn name(&self) -> &str {
        &self.name
    }

    /// Sends one message via HTTP POST
    async fn publish(&self, name: &str, data: Value) -> Result<()> {
        let url = messages_url(&self.inner.endpoint, &self.name)?;
        let body = message_body(name, data, self.inner.client_id.as_deref());

        let response = self
            .inner
            .http
            .post(url)
            .basic_auth(&self.inner.key_name, Some(&self.inner.key_secret))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PubSubError::Connection(format!(
                "REST publish failed for channel '{}' event '{}' with status: {}",
                self.name,
                name,
                response.status()
            )));
        }

        tracing::debug!("Published {} on channel {} via REST", name, self.name);
        Ok(())
    }
}

/// `{endpoint}/channels/{channel}/messages` with the channel name escaped
fn messages_url(endpoint: &Url, channel: &str) -> Result<Url> {
    let mut url = endpoint.clone();
    url.path_segments_mut()
        .map_err(|_| {
            PubSubError::Connection(format!("REST endpoint '{}' cannot carry a path", endpoint))
        })?
        .pop_if_empty()
        .extend([CHANNELS_PATH, channel, MESSAGES_PATH]);
    Ok(url)
}

/// Objects and arrays travel as JSON text tagged with the `json` encoding.
fn message_body(name: &str, data: Value, client_id: Option<&str>) -> Value {
    let (data, encoding) = match data {
        Value::Object(_) | Value::Array(_) => {
            (Value::String(data.to_string()), Some(encodings::JSON))
        }
        other => (other, None),
    };

    let mut body = json!({ "name": name, "data": data });
    if let Some(encoding) = encoding {
        body["encoding"] = json!(encoding);
    }
    if let Some(client_id) = client_id {
        body["clientId"] = json!(client_id);
    }
    body
}
