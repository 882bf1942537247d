use crate::provider::Listener;
use crate::schema::{EventDescriptor, EventTable};
use crate::types::{ChannelMessage, EventMessage, ProviderMessage, Result};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Routes raw channel messages to a typed callback.
pub struct Dispatcher<E> {
    channel: String,
    events: EventTable<E>,
}

impl<E: 'static> Dispatcher<E> {
    pub fn new(channel: impl Into<String>, events: EventTable<E>) -> Self {
        Self {
            channel: channel.into(),
            events,
        }
    }

    /// Delivers one raw message.
    ///
    /// Undeclared event names are logged and dropped (`Ok`, callback not
    /// run). Payloads failing validation return the validation error without
    /// running the callback.
    pub fn dispatch<F>(&self, raw: ProviderMessage, callback: &F) -> Result<()>
    where
        F: Fn(ChannelMessage<E>) + ?Sized,
    {
        let Some(parsed) = self.events.parse(&raw) else {
            tracing::error!(
                "Unknown event '{}' on channel {}, dropping message",
                raw.name,
                self.channel
            );
            return Ok(());
        };

        let data = parsed?;
        callback(ChannelMessage::from_raw(raw, data));
        Ok(())
    }

    /// Wraps a typed callback into a provider listener running this
    /// dispatcher.
    pub fn listener<F>(self: &Arc<Self>, callback: F) -> Listener
    where
        F: Fn(ChannelMessage<E>) + Send + Sync + 'static,
    {
        let dispatcher = Arc::clone(self);
        Arc::new(move |raw| dispatcher.dispatch(raw, &callback))
    }
}

/// Wraps a typed callback into a provider listener for one event.
///
/// Messages carrying another name are skipped; providers normally filter
/// them out before they get here.
pub(crate) fn event_listener<T, F>(
    event: String,
    descriptor: EventDescriptor<T>,
    callback: F,
) -> Listener
where
    T: DeserializeOwned + 'static,
    F: Fn(EventMessage<T>) + Send + Sync + 'static,
{
    Arc::new(move |raw: ProviderMessage| {
        if raw.name != event {
            tracing::debug!("Skipping '{}' on listener for '{}'", raw.name, event);
            return Ok(());
        }

        let data = descriptor.parse(&raw)?;
        callback(EventMessage::from_raw(raw, data));
        Ok(())
    })
}
