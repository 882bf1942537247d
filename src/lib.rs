//! # pubsub-builder
//!
//! Typed channel and event schemas for hosted pub/sub services.
//!
//! Declare every logical channel and its events once in a [`Schema`], then
//! build a subscription-capable caller from a live connection with
//! [`realtime`] and a publish-only caller from a REST connection with
//! [`rest`]. Both compute the same colon-joined physical channel names and
//! validate payloads into your types with serde.
//!
//! ## Example
//!
//! ```
//! use pubsub_builder::provider::memory::InMemoryHub;
//! use pubsub_builder::{ChannelDescriptor, ChannelParams, EventDescriptor, Schema, realtime, rest};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! struct Typing {
//!     user: String,
//! }
//!
//! #[derive(Debug)]
//! enum ChatEvent {
//!     Typing(Typing),
//! }
//!
//! #[tokio::main]
//! async fn main() -> pubsub_builder::Result<()> {
//!     let mut schema = Schema::new();
//!     let chat = schema.channel(
//!         "chat",
//!         ChannelDescriptor::new(|channel_id: &String| vec![channel_id.clone()])
//!             .event("typing", EventDescriptor::<Typing>::new(), ChatEvent::Typing)?,
//!     )?;
//!
//!     let hub = InMemoryHub::new();
//!     let live = realtime(hub.realtime(), &schema);
//!     let server = rest(hub.rest(), &schema);
//!     let c1 = "c1".to_string();
//!
//!     let _binding = live
//!         .channel(&chat)?
//!         .use_channel(&c1, ChannelParams::default(), |msg| println!("{:?}", msg.data))
//!         .await?;
//!
//!     server
//!         .channel(&chat)?
//!         .event::<Typing>("typing")?
//!         .publish(&c1, &Typing { user: "u1".into() })
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod caller;
pub mod lifecycle;
pub mod provider;
pub mod schema;
pub mod types;

pub use caller::{
    RealtimeCaller, RealtimeChannel, RealtimeEvent, RestCaller, RestChannel, RestEvent, realtime,
    rest,
};
pub use lifecycle::{ChannelBinding, ChannelParams, ChannelSet, Subscription, use_channels};
pub use provider::{EventFilter, Listener, RealtimeConnection, RestConnection};
pub use schema::{ChannelDescriptor, ChannelKey, EventDescriptor, Schema, physical_channel_name};
pub use types::{ChannelMessage, EventMessage, ProviderMessage, PubSubError, Result};
