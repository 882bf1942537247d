use super::dispatch::{Dispatcher, event_listener};
use crate::lifecycle::{ChannelBinding, ChannelParams, Naming, Subscription};
use crate::provider::{EventFilter, Listener, RealtimeChannelHandle, RealtimeConnection};
use crate::schema::{ChannelDescriptor, ChannelKey, EventDescriptor, Schema};
use crate::types::{ChannelMessage, EventMessage, ProviderMessage, PubSubError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Builds the realtime caller for every channel of `schema`.
///
/// # Example
///
/// ```
/// use pubsub_builder::caller::realtime;
/// use pubsub_builder::provider::memory::InMemoryHub;
/// use pubsub_builder::schema::{ChannelDescriptor, EventDescriptor, Schema};
/// use serde_json::Value;
///
/// # fn main() -> pubsub_builder::Result<()> {
/// let mut schema = Schema::new();
/// let chat = schema.channel(
///     "chat",
///     ChannelDescriptor::new(|channel_id: &String| vec![channel_id.clone()])
///         .event("typing", EventDescriptor::<Value>::new(), |v| v)?,
/// )?;
///
/// let hub = InMemoryHub::new();
/// let caller = realtime(hub.realtime(), &schema);
/// assert_eq!(caller.channel(&chat)?.channel_name(&"c1".to_string()), "chat:c1");
/// # Ok(())
/// # }
/// ```
pub fn realtime(connection: Arc<dyn RealtimeConnection>, schema: &Schema) -> RealtimeCaller {
    let channels = schema
        .entries()
        .map(|(name, entry)| (name.to_string(), entry.build_realtime(name, &connection)))
        .collect();

    tracing::debug!("Built realtime caller for {} channels", schema.len());
    RealtimeCaller {
        connection,
        channels,
    }
}

/// Realtime callers for every channel of one schema.
pub struct RealtimeCaller {
    connection: Arc<dyn RealtimeConnection>,
    channels: BTreeMap<String, Box<dyn Any + Send + Sync>>,
}

impl RealtimeCaller {
    pub fn channel<A: 'static, E: 'static>(
        &self,
        key: &ChannelKey<A, E>,
    ) -> Result<&RealtimeChannel<A, E>> {
        self.channel_by_name(key.name())
    }

    pub fn channel_by_name<A: 'static, E: 'static>(
        &self,
        name: &str,
    ) -> Result<&RealtimeChannel<A, E>> {
        self.channels
            .get(name)
            .ok_or_else(|| PubSubError::UnknownChannel(name.to_string()))?
            .downcast_ref::<RealtimeChannel<A, E>>()
            .ok_or_else(|| PubSubError::TypeMismatch(name.to_string()))
    }

    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }

    pub fn connection(&self) -> Arc<dyn RealtimeConnection> {
        Arc::clone(&self.connection)
    }
}

/// Live caller of one declared channel.
pub struct RealtimeChannel<A, E> {
    name: String,
    descriptor: Arc<ChannelDescriptor<A, E>>,
    dispatcher: Arc<Dispatcher<E>>,
    connection: Arc<dyn RealtimeConnection>,
}

impl<A: 'static, E: 'static> RealtimeChannel<A, E> {
    pub(crate) fn new(
        name: String,
        descriptor: Arc<ChannelDescriptor<A, E>>,
        connection: Arc<dyn RealtimeConnection>,
    ) -> Self {
        let dispatcher = Arc::new(Dispatcher::new(name.clone(), descriptor.events().clone()));
        Self {
            name,
            descriptor,
            dispatcher,
            connection,
        }
    }

    /// Logical channel name as declared in the schema
    pub fn logical_name(&self) -> &str {
        &self.name
    }

    pub fn channel_name(&self, args: &A) -> String {
        self.descriptor.physical_name(&self.name, args)
    }

    /// Provider handle for the addressed channel
    pub fn get(&self, args: &A) -> Arc<dyn RealtimeChannelHandle> {
        self.connection.channel(&self.channel_name(args))
    }

    /// Wraps a typed callback into a raw listener that validates and routes
    /// each message through this channel's events.
    pub fn callback<F>(&self, callback: F) -> Listener
    where
        F: Fn(ChannelMessage<E>) + Send + Sync + 'static,
    {
        self.dispatcher.listener(callback)
    }

    /// Routes one raw message to `callback` (see [`Dispatcher::dispatch`]).
    pub fn dispatch<F>(&self, raw: ProviderMessage, callback: &F) -> Result<()>
    where
        F: Fn(ChannelMessage<E>) + ?Sized,
    {
        self.dispatcher.dispatch(raw, callback)
    }

    /// Subscribes until the returned guard is dropped.
    pub async fn subscribe<F>(&self, args: &A, callback: F) -> Result<Subscription>
    where
        F: Fn(ChannelMessage<E>) + Send + Sync + 'static,
    {
        Subscription::acquire(self.get(args), None, self.callback(callback)).await
    }

    /// Mounts a binding whose subscription follows `params.enabled` and the
    /// arguments it is later given.
    pub async fn use_channel<F>(
        &self,
        args: &A,
        params: ChannelParams,
        callback: F,
    ) -> Result<ChannelBinding<A>>
    where
        F: Fn(ChannelMessage<E>) + Send + Sync + 'static,
    {
        ChannelBinding::mount(
            self.naming(),
            Arc::clone(&self.connection),
            None,
            self.callback(callback),
            args,
            params,
        )
        .await
    }

    /// Declared event names in sorted order
    pub fn events(&self) -> Vec<&str> {
        self.descriptor.events().names().collect()
    }

    /// Caller for one declared event.
    ///
    /// # Errors
    ///
    /// - [`PubSubError::UnknownEvent`] if `name` is not declared
    /// - [`PubSubError::TypeMismatch`] if it was declared with another payload type
    pub fn event<T: 'static>(&self, name: &str) -> Result<RealtimeEvent<A, T>> {
        let descriptor = lookup_descriptor::<A, E, T>(&self.name, &self.descriptor, name)?;
        Ok(RealtimeEvent {
            event: name.to_string(),
            descriptor,
            naming: self.naming(),
            connection: Arc::clone(&self.connection),
        })
    }

    fn naming(&self) -> Naming<A> {
        let descriptor = Arc::clone(&self.descriptor);
        let name = self.name.clone();
        Arc::new(move |args: &A| descriptor.physical_name(&name, args))
    }
}

impl<A, E> Clone for RealtimeChannel<A, E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            descriptor: Arc::clone(&self.descriptor),
            dispatcher: Arc::clone(&self.dispatcher),
            connection: Arc::clone(&self.connection),
        }
    }
}

pub(crate) fn lookup_descriptor<A: 'static, E: 'static, T: 'static>(
    channel: &str,
    descriptor: &ChannelDescriptor<A, E>,
    event: &str,
) -> Result<EventDescriptor<T>> {
    if !descriptor.events().contains(event) {
        return Err(PubSubError::UnknownEvent {
            channel: channel.to_string(),
            event: event.to_string(),
        });
    }

    descriptor
        .descriptor::<T>(event)
        .cloned()
        .ok_or_else(|| PubSubError::TypeMismatch(format!("{}.{}", channel, event)))
}

/// Live caller of one event on one channel.
pub struct RealtimeEvent<A, T> {
    event: String,
    descriptor: EventDescriptor<T>,
    naming: Naming<A>,
    connection: Arc<dyn RealtimeConnection>,
}

impl<A: 'static, T: DeserializeOwned + 'static> RealtimeEvent<A, T> {
    pub fn name(&self) -> &str {
        &self.event
    }

    pub fn channel_name(&self, args: &A) -> String {
        (self.naming)(args)
    }

    pub fn parse(&self, raw: &ProviderMessage) -> Result<T> {
        self.descriptor.parse(raw)
    }

    /// Publishes `data` under this event's name on the addressed channel.
    ///
    /// Provider failures (e.g. an unavailable connection) are returned as is.
    pub async fn publish(&self, args: &A, data: &T) -> Result<()>
    where
        T: Serialize,
    {
        let payload = serde_json::to_value(data)?;
        let handle = self.connection.channel(&self.channel_name(args));
        handle.publish(&self.event, payload).await
    }

    /// Wraps a typed callback into a raw listener for this event only.
    pub fn callback<F>(&self, callback: F) -> Listener
    where
        F: Fn(EventMessage<T>) + Send + Sync + 'static,
    {
        event_listener(self.event.clone(), self.descriptor.clone(), callback)
    }

    /// Subscribes to this event until the returned guard is dropped.
    pub async fn subscribe<F>(&self, args: &A, callback: F) -> Result<Subscription>
    where
        F: Fn(EventMessage<T>) + Send + Sync + 'static,
    {
        let handle = self.connection.channel(&self.channel_name(args));
        Subscription::acquire(handle, Some(self.filter()), self.callback(callback)).await
    }

    /// Same lifecycle as [`RealtimeChannel::use_channel`], filtered to this
    /// event.
    pub async fn use_channel<F>(
        &self,
        args: &A,
        params: ChannelParams,
        callback: F,
    ) -> Result<ChannelBinding<A>>
    where
        F: Fn(EventMessage<T>) + Send + Sync + 'static,
    {
        ChannelBinding::mount(
            Arc::clone(&self.naming),
            Arc::clone(&self.connection),
            Some(self.filter()),
            self.callback(callback),
            args,
            params,
        )
        .await
    }

    fn filter(&self) -> EventFilter {
        EventFilter::name(self.event.clone())
    }
}

impl<A, T> Clone for RealtimeEvent<A, T> {
    fn clone(&self) -> Self {
        Self {
            event: self.event.clone(),
            descriptor: self.descriptor.clone(),
            naming: Arc::clone(&self.naming),
            connection: Arc::clone(&self.connection),
        }
    }
}
