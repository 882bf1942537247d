use thiserror::Error;

/// Errors that can occur when declaring a schema or using its callers.
#[derive(Error, Debug)]
pub enum PubSubError {
    /// Payload did not deserialize into the event's declared type
    #[error("Validation error for event '{event}': {source}")]
    Validation {
        event: String,
        #[source]
        source: serde_json::Error,
    },

    /// Payload deserialized but a refinement check rejected it
    #[error("Event '{event}' rejected: {reason}")]
    Rejected { event: String, reason: String },

    /// Payload carried an encoding this crate cannot decode
    #[error("Unsupported message encoding: {0}")]
    Encoding(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Schema declaration error (empty name, separator in name, ...)
    #[error("Schema error: {0}")]
    Schema(String),

    /// Channel declared twice in one schema
    #[error("Channel '{0}' is already declared")]
    DuplicateChannel(String),

    /// Event declared twice on one channel
    #[error("Event '{0}' is already declared on this channel")]
    DuplicateEvent(String),

    /// Lookup of a channel the schema does not declare
    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    /// Lookup of an event the channel does not declare
    #[error("Unknown event '{event}' on channel '{channel}'")]
    UnknownEvent { channel: String, event: String },

    /// Typed lookup with types that differ from the declaration
    #[error("Type mismatch for '{0}': declared with different types")]
    TypeMismatch(String),

    /// General connection error with descriptive message
    #[error("Connection error: {0}")]
    Connection(String),

    /// Authentication or authorization error
    #[error("Authentication error: {0}")]
    Auth(String),

    /// HTTP request error (REST publishing)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing error (malformed endpoint URL)
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Attempted operation while the provider connection is unavailable
    #[error("Not connected")]
    NotConnected,
}

/// Convenience type alias for `Result<T, PubSubError>`.
pub type Result<T> = std::result::Result<T, PubSubError>;
