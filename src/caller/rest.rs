use super::realtime::lookup_descriptor;
use crate::lifecycle::Naming;
use crate::provider::{RestChannelHandle, RestConnection};
use crate::schema::{ChannelDescriptor, ChannelKey, EventDescriptor, Schema};
use crate::types::{ProviderMessage, PubSubError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Builds the publish-only caller for every channel of `schema`.
///
/// Channel names match the ones [`realtime`](super::realtime()) computes for the
/// same schema and arguments.
pub fn rest(connection: Arc<dyn RestConnection>, schema: &Schema) -> RestCaller {
    let channels = schema
        .entries()
        .map(|(name, entry)| (name.to_string(), entry.build_rest(name, &connection)))
        .collect();

    tracing::debug!("Built REST caller for {} channels", schema.len());
    RestCaller {
        connection,
        channels,
    }
}

pub struct RestCaller {
    connection: Arc<dyn RestConnection>,
    channels: BTreeMap<String, Box<dyn Any + Send + Sync>>,
}

impl RestCaller {
    pub fn channel<A: 'static, E: 'static>(
        &self,
        key: &ChannelKey<A, E>,
    ) -> Result<&RestChannel<A, E>> {
        self.channel_by_name(key.name())
    }

    pub fn channel_by_name<A: 'static, E: 'static>(
        &self,
        name: &str,
    ) -> Result<&RestChannel<A, E>> {
        self.channels
            .get(name)
            .ok_or_else(|| PubSubError::UnknownChannel(name.to_string()))?
            .downcast_ref::<RestChannel<A, E>>()
            .ok_or_else(|| PubSubError::TypeMismatch(name.to_string()))
    }

    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }

    pub fn connection(&self) -> Arc<dyn RestConnection> {
        Arc::clone(&self.connection)
    }
}

/// Publish-only caller of one declared channel.
pub struct RestChannel<A, E> {
    name: String,
    descriptor: Arc<ChannelDescriptor<A, E>>,
    connection: Arc<dyn RestConnection>,
}

impl<A: 'static, E: 'static> RestChannel<A, E> {
    pub(crate) fn new(
        name: String,
        descriptor: Arc<ChannelDescriptor<A, E>>,
        connection: Arc<dyn RestConnection>,
    ) -> Self {
        Self {
            name,
            descriptor,
            connection,
        }
    }

    pub fn logical_name(&self) -> &str {
        &self.name
    }

    pub fn channel_name(&self, args: &A) -> String {
        self.descriptor.physical_name(&self.name, args)
    }

    pub fn get(&self, args: &A) -> Arc<dyn RestChannelHandle> {
        self.connection.channel(&self.channel_name(args))
    }

    pub fn events(&self) -> Vec<&str> {
        self.descriptor.events().names().collect()
    }

    /// Caller for one declared event; fails like
    /// [`RealtimeChannel::event`](super::RealtimeChannel::event).
    pub fn event<T: 'static>(&self, name: &str) -> Result<RestEvent<A, T>> {
        let descriptor = lookup_descriptor::<A, E, T>(&self.name, &self.descriptor, name)?;
        let logical = self.name.clone();
        let addressing = Arc::clone(&self.descriptor);
        Ok(RestEvent {
            event: name.to_string(),
            descriptor,
            naming: Arc::new(move |args: &A| addressing.physical_name(&logical, args)),
            connection: Arc::clone(&self.connection),
        })
    }
}

impl<A, E> Clone for RestChannel<A, E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            descriptor: Arc::clone(&self.descriptor),
            connection: Arc::clone(&self.connection),
        }
    }
}

/// Publish-only caller of one event.
pub struct RestEvent<A, T> {
    event: String,
    descriptor: EventDescriptor<T>,
    naming: Naming<A>,
    connection: Arc<dyn RestConnection>,
}

impl<A: 'static, T: DeserializeOwned + 'static> RestEvent<A, T> {
    pub fn name(&self) -> &str {
        &self.event
    }

    pub fn channel_name(&self, args: &A) -> String {
        (self.naming)(args)
    }

    pub fn parse(&self, raw: &ProviderMessage) -> Result<T> {
        self.descriptor.parse(raw)
    }

    pub async fn publish(&self, args: &A, data: &T) -> Result<()>
    where
        T: Serialize,
    {
        let payload = serde_json::to_value(data)?;
        let handle = self.connection.channel(&self.channel_name(args));
        handle.publish(&self.event, payload).await
    }
}

impl<A, T> Clone for RestEvent<A, T> {
    fn clone(&self) -> Self {
        Self {
            event: self.event.clone(),
            descriptor: self.descriptor.clone(),
            naming: Arc::clone(&self.naming),
            connection: Arc::clone(&self.connection),
        }
    }
}
