//! Provider contract consumed by the callers.
//!
//! A provider is the hosted pub/sub service (or a stand-in for it). The
//! realtime side can subscribe; the REST side can only publish. Both resolve
//! physical channel names to handles, and handle caching is the provider's
//! responsibility.

mod filter;
pub mod http;
pub mod memory;

use crate::types::{ProviderMessage, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

pub use filter::EventFilter;

/// Raw message listener registered with a provider channel.
///
/// An `Err` is the listener reporting that it could not handle the message;
/// what happens next is the provider's policy.
pub type Listener = Arc<dyn Fn(ProviderMessage) -> Result<()> + Send + Sync + 'static>;

/// Token identifying one registered listener, used to unsubscribe it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Channel handle of a live connection.
#[async_trait]
pub trait RealtimeChannelHandle: Send + Sync {
    /// Physical channel name
    fn name(&self) -> &str;

    /// Attach `listener`; with a filter only matching messages reach it.
    async fn subscribe(&self, filter: Option<EventFilter>, listener: Listener)
    -> Result<ListenerId>;

    /// Detach a listener. Unknown ids are ignored.
    fn unsubscribe(&self, id: ListenerId);

    async fn publish(&self, name: &str, data: Value) -> Result<()>;
}

/// A live, subscription-capable provider connection.
pub trait RealtimeConnection: Send + Sync {
    /// Creates or returns the handle for a physical channel name.
    fn channel(&self, name: &str) -> Arc<dyn RealtimeChannelHandle>;
}

/// Channel handle of a one-shot (REST) connection.
#[async_trait]
pub trait RestChannelHandle: Send + Sync {
    fn name(&self) -> &str;

    async fn publish(&self, name: &str, data: Value) -> Result<()>;
}

/// A publish-only provider connection.
pub trait RestConnection: Send + Sync {
    fn channel(&self, name: &str) -> Arc<dyn RestChannelHandle>;
}
