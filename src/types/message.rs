use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::constants::encodings;
use super::error::{PubSubError, Result};

/// Provider-assigned metadata carried alongside every message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessageMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<String>,
    /// Milliseconds since the Unix epoch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras: Option<Value>,
}

/// Raw message envelope as delivered by the provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderMessage {
    pub name: String,
    #[serde(default)]
    pub data: Value,
    #[serde(flatten)]
    pub meta: MessageMeta,
}

impl ProviderMessage {
    pub fn new(name: impl Into<String>, data: Value) -> Self {
        Self {
            name: name.into(),
            data,
            meta: MessageMeta::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.meta.id = Some(id.into());
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.meta.client_id = Some(client_id.into());
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.meta.encoding = Some(encoding.into());
        self
    }

    /// Returns the payload with its transport encoding removed.
    ///
    /// `json` string payloads are parsed, `utf-8` is a no-op. Chained
    /// encodings are unwound right to left.
    pub fn decoded_data(&self) -> Result<Value> {
        let Some(encoding) = self.meta.encoding.as_deref() else {
            return Ok(self.data.clone());
        };

        let mut data = self.data.clone();
        for step in encoding.rsplit('/').filter(|s| !s.is_empty()) {
            data = match step {
                encodings::JSON => match data {
                    Value::String(text) => serde_json::from_str(&text)?,
                    other => other,
                },
                encodings::UTF8 => data,
                other => return Err(PubSubError::Encoding(other.to_string())),
            };
        }
        Ok(data)
    }
}

/// A validated message handed to application callbacks.
///
/// For a channel-level binding `T` is the channel's message type; for an
/// event-level binding it is the event's payload type.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChannelMessage<T> {
    #[serde(flatten)]
    pub meta: MessageMeta,
    pub name: String,
    pub data: T,
}

/// Message delivered to a single-event binding.
pub type EventMessage<T> = ChannelMessage<T>;

impl<T> ChannelMessage<T> {
    /// Builds the typed message from the raw envelope and its parsed payload.
    pub fn from_raw(raw: ProviderMessage, data: T) -> Self {
        let mut meta = raw.meta;
        meta.encoding = None;
        Self {
            meta,
            name: raw.name,
            data,
        }
    }
}
