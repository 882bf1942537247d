use super::state::{ChannelParams, SubscriptionState};
use super::subscription::Subscription;
use crate::provider::{EventFilter, Listener, RealtimeChannelHandle, RealtimeConnection};
use crate::types::Result;
use std::sync::Arc;

/// Computes a physical channel name from call-site arguments
pub(crate) type Naming<A> = Arc<dyn Fn(&A) -> String + Send + Sync>;

/// A mounted channel listener whose subscription follows its parameters.
///
/// While enabled the binding holds exactly one provider subscription on the
/// channel its current arguments address; while disabled it holds none.
/// Changing the arguments to a different channel moves the subscription.
/// Dropping the binding (or calling [`unmount`](Self::unmount)) releases it.
///
/// A message already in flight when the binding is disabled may still reach
/// the callback once.
pub struct ChannelBinding<A> {
    naming: Naming<A>,
    connection: Arc<dyn RealtimeConnection>,
    filter: Option<EventFilter>,
    listener: Listener,
    channel_name: String,
    enabled: bool,
    active: Option<Subscription>,
}

impl<A> ChannelBinding<A> {
    pub(crate) async fn mount(
        naming: Naming<A>,
        connection: Arc<dyn RealtimeConnection>,
        filter: Option<EventFilter>,
        listener: Listener,
        args: &A,
        params: ChannelParams,
    ) -> Result<Self> {
        let channel_name = naming(args);
        let mut binding = Self {
            naming,
            connection,
            filter,
            listener,
            channel_name,
            enabled: params.enabled,
            active: None,
        };

        binding.sync().await?;
        Ok(binding)
    }

    pub fn state(&self) -> SubscriptionState {
        if self.active.is_some() {
            SubscriptionState::Subscribed
        } else {
            SubscriptionState::Unsubscribed
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.state() == SubscriptionState::Subscribed
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Physical name of the channel the current arguments address
    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }

    /// Provider handle of the addressed channel
    pub fn channel(&self) -> Arc<dyn RealtimeChannelHandle> {
        self.connection.channel(&self.channel_name)
    }

    pub fn connection(&self) -> Arc<dyn RealtimeConnection> {
        Arc::clone(&self.connection)
    }

    /// Subscribes when switching on, unsubscribes when switching off.
    pub async fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        self.enabled = enabled;
        self.sync().await
    }

    /// Re-points the binding; a different channel name moves the
    /// subscription, the same name keeps it untouched.
    pub async fn set_args(&mut self, args: &A) -> Result<()> {
        let channel_name = (self.naming)(args);
        if channel_name != self.channel_name {
            tracing::debug!(
                "Binding moves from channel {} to {}",
                self.channel_name,
                channel_name
            );
            // Release before re-acquiring so two subscriptions never overlap.
            self.active = None;
            self.channel_name = channel_name;
        }
        self.sync().await
    }

    pub async fn update(&mut self, args: &A, params: ChannelParams) -> Result<()> {
        self.enabled = params.enabled;
        self.set_args(args).await
    }

    /// Releases the subscription, if any, and ends the binding.
    pub fn unmount(self) {
        drop(self);
    }

    async fn sync(&mut self) -> Result<()> {
        match (self.enabled, self.active.is_some()) {
            (true, false) => {
                let handle = self.connection.channel(&self.channel_name);
                let subscription =
                    Subscription::acquire(handle, self.filter.clone(), Arc::clone(&self.listener))
                        .await?;
                self.active = Some(subscription);
            }
            (false, true) => {
                self.active = None;
            }
            _ => {}
        }
        Ok(())
    }
}
