pub mod constants;
pub mod error;
pub mod message;

pub use constants::*;
pub use error::{PubSubError, Result};
pub use message::{ChannelMessage, EventMessage, MessageMeta, ProviderMessage};
