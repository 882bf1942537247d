use crate::provider::{EventFilter, Listener, ListenerId, RealtimeChannelHandle};
use crate::types::Result;
use futures::future::try_join_all;
use std::sync::Arc;

/// A listener attached to a provider channel, detached on drop.
pub struct Subscription {
    handle: Arc<dyn RealtimeChannelHandle>,
    id: Option<ListenerId>,
}

impl Subscription {
    /// Attaches `listener` to `handle`.
    pub async fn acquire(
        handle: Arc<dyn RealtimeChannelHandle>,
        filter: Option<EventFilter>,
        listener: Listener,
    ) -> Result<Self> {
        let id = handle.subscribe(filter, listener).await?;
        tracing::info!("Subscribed {} to channel {}", id, handle.name());

        Ok(Self {
            handle,
            id: Some(id),
        })
    }

    pub fn channel_name(&self) -> &str {
        self.handle.name()
    }

    pub fn channel(&self) -> Arc<dyn RealtimeChannelHandle> {
        Arc::clone(&self.handle)
    }

    /// Detaches the listener now instead of at drop.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(id) = self.id.take() {
            self.handle.unsubscribe(id);
            tracing::info!("Unsubscribed {} from channel {}", id, self.handle.name());
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

/// One listener attached to several channels, released together.
pub struct ChannelSet {
    subscriptions: Vec<Subscription>,
}

impl ChannelSet {
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.subscriptions
            .iter()
            .map(Subscription::channel_name)
            .collect()
    }

    pub fn unsubscribe(self) {
        drop(self);
    }
}

/// Subscribes `listener` to every channel in `channels`.
///
/// If any subscription fails the ones already made are released and the
/// error is returned.
pub async fn use_channels(
    channels: &[Arc<dyn RealtimeChannelHandle>],
    listener: Listener,
) -> Result<ChannelSet> {
    let subscriptions = try_join_all(channels.iter().map(|handle| {
        Subscription::acquire(Arc::clone(handle), None, Arc::clone(&listener))
    }))
    .await?;

    Ok(ChannelSet { subscriptions })
}
