/// Separator between the logical channel name and its addressing segments
pub const CHANNEL_SEPARATOR: &str = ":";

/// Message encoding names (magic strings layer)
pub mod encodings {
    pub const JSON: &str = "json";
    pub const UTF8: &str = "utf-8";
}

/// Default REST endpoint of the hosted pub/sub service
pub const DEFAULT_REST_ENDPOINT: &str = "https://rest.ably.io";

/// Default REST request timeout (milliseconds)
pub const DEFAULT_TIMEOUT: u64 = 10000;

/// Path template segment for channel message publishing
pub const CHANNELS_PATH: &str = "channels";
pub const MESSAGES_PATH: &str = "messages";
