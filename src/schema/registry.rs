use super::channel::ChannelDescriptor;
use super::naming::validate_logical_name;
use crate::caller::{RealtimeChannel, RestChannel};
use crate::provider::{RealtimeConnection, RestConnection};
use crate::types::{PubSubError, Result};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Type-erased view of a `ChannelDescriptor<A, E>` that can still build both
/// caller flavours for itself.
pub(crate) trait ErasedChannel: Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn event_names(&self) -> Vec<String>;

    fn build_realtime(
        &self,
        name: &str,
        connection: &Arc<dyn RealtimeConnection>,
    ) -> Box<dyn Any + Send + Sync>;

    fn build_rest(&self, name: &str, connection: &Arc<dyn RestConnection>)
    -> Box<dyn Any + Send + Sync>;
}

impl<A: 'static, E: 'static> ErasedChannel for Arc<ChannelDescriptor<A, E>> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn event_names(&self) -> Vec<String> {
        self.events().names().map(str::to_string).collect()
    }

    fn build_realtime(
        &self,
        name: &str,
        connection: &Arc<dyn RealtimeConnection>,
    ) -> Box<dyn Any + Send + Sync> {
        Box::new(RealtimeChannel::new(
            name.to_string(),
            Arc::clone(self),
            Arc::clone(connection),
        ))
    }

    fn build_rest(
        &self,
        name: &str,
        connection: &Arc<dyn RestConnection>,
    ) -> Box<dyn Any + Send + Sync> {
        Box::new(RestChannel::new(
            name.to_string(),
            Arc::clone(self),
            Arc::clone(connection),
        ))
    }
}

/// Typed handle to a channel declared in a [`Schema`].
///
/// Carries the channel's argument and message types so callers can hand back
/// correctly typed channel objects.
pub struct ChannelKey<A, E> {
    name: String,
    _types: PhantomData<fn(&A) -> E>,
}

impl<A, E> ChannelKey<A, E> {
    fn new(name: String) -> Self {
        Self {
            name,
            _types: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<A, E> Clone for ChannelKey<A, E> {
    fn clone(&self) -> Self {
        Self::new(self.name.clone())
    }
}

impl<A, E> fmt::Debug for ChannelKey<A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ChannelKey").field(&self.name).finish()
    }
}

/// The declarative description of every channel and event.
///
/// Declare it once, then build callers from it with
/// [`realtime`](crate::caller::realtime) and [`rest`](crate::caller::rest).
///
/// # Example
///
/// ```
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
/// assert_eq!(chat.name(), "chat");
/// assert_eq!(schema.event_names("chat")?, vec!["typing".to_string()]);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct Schema {
    channels: BTreeMap<String, Box<dyn ErasedChannel>>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a channel under its logical name.
    ///
    /// # Errors
    ///
    /// - [`PubSubError::Schema`] if the name is empty or contains `:`
    /// - [`PubSubError::DuplicateChannel`] if the name is already declared
    pub fn channel<A: 'static, E: 'static>(
        &mut self,
        name: &str,
        descriptor: ChannelDescriptor<A, E>,
    ) -> Result<ChannelKey<A, E>> {
        validate_logical_name(name)?;
        if self.channels.contains_key(name) {
            return Err(PubSubError::DuplicateChannel(name.to_string()));
        }

        self.channels
            .insert(name.to_string(), Box::new(Arc::new(descriptor)));
        tracing::debug!("Declared channel {}", name);

        Ok(ChannelKey::new(name.to_string()))
    }

    /// Recovers a typed key for an already declared channel.
    pub fn key<A: 'static, E: 'static>(&self, name: &str) -> Result<ChannelKey<A, E>> {
        self.descriptor_by_name::<A, E>(name)?;
        Ok(ChannelKey::new(name.to_string()))
    }

    pub fn descriptor<A: 'static, E: 'static>(
        &self,
        key: &ChannelKey<A, E>,
    ) -> Result<Arc<ChannelDescriptor<A, E>>> {
        self.descriptor_by_name(&key.name)
    }

    fn descriptor_by_name<A: 'static, E: 'static>(
        &self,
        name: &str,
    ) -> Result<Arc<ChannelDescriptor<A, E>>> {
        let entry = self
            .channels
            .get(name)
            .ok_or_else(|| PubSubError::UnknownChannel(name.to_string()))?;

        entry
            .as_any()
            .downcast_ref::<Arc<ChannelDescriptor<A, E>>>()
            .cloned()
            .ok_or_else(|| PubSubError::TypeMismatch(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    /// Declared channel names in sorted order
    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }

    pub fn event_names(&self, channel: &str) -> Result<Vec<String>> {
        self.channels
            .get(channel)
            .map(|entry| entry.event_names())
            .ok_or_else(|| PubSubError::UnknownChannel(channel.to_string()))
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (&str, &dyn ErasedChannel)> {
        self.channels
            .iter()
            .map(|(name, entry)| (name.as_str(), entry.as_ref()))
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.channels
                    .iter()
                    .map(|(name, entry)| (name, entry.event_names())),
            )
            .finish()
    }
}
