use super::event::EventDescriptor;
use super::naming::physical_channel_name;
use crate::types::{ProviderMessage, PubSubError, Result};
use serde::de::DeserializeOwned;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

type Addressing<A> = Arc<dyn Fn(&A) -> Vec<String> + Send + Sync>;
type EventParser<E> = Arc<dyn Fn(&ProviderMessage) -> Result<E> + Send + Sync>;

struct EventEntry<E> {
    parse: EventParser<E>,
    /// The typed `EventDescriptor<T>`, kept for per-event callers
    descriptor: Arc<dyn Any + Send + Sync>,
}

impl<E> Clone for EventEntry<E> {
    fn clone(&self) -> Self {
        Self {
            parse: Arc::clone(&self.parse),
            descriptor: Arc::clone(&self.descriptor),
        }
    }
}

/// Declared events of one channel, keyed by event name.
///
/// Cloning shares the underlying table.
pub struct EventTable<E> {
    entries: Arc<BTreeMap<String, EventEntry<E>>>,
}

impl<E> EventTable<E> {
    fn new() -> Self {
        Self {
            entries: Arc::new(BTreeMap::new()),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Declared event names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses `raw` with the descriptor registered under its name.
    ///
    /// `None` means the name is not declared on this channel.
    pub fn parse(&self, raw: &ProviderMessage) -> Option<Result<E>> {
        self.entries.get(&raw.name).map(|entry| (entry.parse)(raw))
    }

    /// Typed descriptor of a declared event; `None` when the name is not
    /// declared or was declared with a different payload type.
    pub fn descriptor<T: 'static>(&self, name: &str) -> Option<&EventDescriptor<T>> {
        self.entries
            .get(name)
            .and_then(|entry| entry.descriptor.downcast_ref::<EventDescriptor<T>>())
    }

    fn insert(&mut self, name: String, entry: EventEntry<E>) -> Result<()> {
        if self.entries.contains_key(&name) {
            return Err(PubSubError::DuplicateEvent(name));
        }
        Arc::make_mut(&mut self.entries).insert(name, entry);
        Ok(())
    }
}

impl<E> Clone for EventTable<E> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

/// One logical channel: how to address it and which events it carries.
///
/// `A` is the call-site argument type the addressing function takes; `E` is
/// the message type channel-wide callbacks receive, usually an enum with one
/// variant per event.
///
/// # Example
///
/// ```
/// use pubsub_builder::schema::{ChannelDescriptor, EventDescriptor};
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize)]
/// struct Deleted {
///     id: i64,
/// }
///
/// #[derive(Debug)]
/// enum GroupEvent {
///     Deleted(Deleted),
/// }
///
/// let group = ChannelDescriptor::new(|group_id: &i64| vec![group_id.to_string()])
///     .event("group_deleted", EventDescriptor::<Deleted>::new(), GroupEvent::Deleted)
///     .unwrap();
///
/// assert_eq!(group.segments(&7), vec!["7".to_string()]);
/// assert_eq!(group.physical_name("group", &7), "group:7");
/// ```
pub struct ChannelDescriptor<A, E> {
    addressing: Addressing<A>,
    events: EventTable<E>,
}

impl<A: 'static, E: 'static> ChannelDescriptor<A, E> {
    pub fn new<F>(addressing: F) -> Self
    where
        F: Fn(&A) -> Vec<String> + Send + Sync + 'static,
    {
        Self {
            addressing: Arc::new(addressing),
            events: EventTable::new(),
        }
    }

    /// Declares an event. `wrap` lifts the event's payload into the channel's
    /// message type.
    ///
    /// # Errors
    ///
    /// Returns [`PubSubError::DuplicateEvent`] if `name` is already declared.
    pub fn event<T, W>(
        mut self,
        name: &str,
        descriptor: EventDescriptor<T>,
        wrap: W,
    ) -> Result<Self>
    where
        T: DeserializeOwned + 'static,
        W: Fn(T) -> E + Send + Sync + 'static,
    {
        let parser = descriptor.clone();
        let entry = EventEntry {
            parse: Arc::new(move |raw: &ProviderMessage| parser.parse(raw).map(&wrap)),
            descriptor: Arc::new(descriptor),
        };

        self.events.insert(name.to_string(), entry)?;
        Ok(self)
    }

    /// Addressing segments for these call-site arguments
    pub fn segments(&self, args: &A) -> Vec<String> {
        (self.addressing)(args)
    }

    /// Physical channel name when declared under `logical`
    pub fn physical_name(&self, logical: &str, args: &A) -> String {
        physical_channel_name(logical, &self.segments(args))
    }

    pub fn events(&self) -> &EventTable<E> {
        &self.events
    }

    pub fn descriptor<T: 'static>(&self, name: &str) -> Option<&EventDescriptor<T>> {
        self.events.descriptor(name)
    }
}

impl<A, E> fmt::Debug for ChannelDescriptor<A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelDescriptor")
            .field("events", &self.events.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct MessageDeleted {
        id: i64,
        channel_id: String,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Typing {
        user: String,
    }

    #[derive(Debug, PartialEq)]
    enum ChatEvent {
        Typing(Typing),
        MessageDeleted(MessageDeleted),
    }

    fn chat() -> ChannelDescriptor<String, ChatEvent> {
        ChannelDescriptor::new(|channel_id: &String| vec![channel_id.clone()])
            .event("typing", EventDescriptor::<Typing>::new(), ChatEvent::Typing)
            .unwrap()
            .event(
                "message_deleted",
                EventDescriptor::<MessageDeleted>::new(),
                ChatEvent::MessageDeleted,
            )
            .unwrap()
    }

    #[test]
    fn test_segments_follow_addressing() {
        let chat = chat();
        assert_eq!(chat.segments(&"c1".to_string()), vec!["c1".to_string()]);
        assert_eq!(chat.physical_name("chat", &"c1".to_string()), "chat:c1");
    }

    #[test]
    fn test_event_names_are_listed() {
        let chat = chat();
        let names: Vec<&str> = chat.events().names().collect();
        assert_eq!(names, vec!["message_deleted", "typing"]);
        assert_eq!(chat.events().len(), 2);
    }

    #[test]
    fn test_duplicate_event_is_rejected() {
        let err = chat()
            .event("typing", EventDescriptor::<Typing>::new(), ChatEvent::Typing)
            .unwrap_err();
        assert!(matches!(err, PubSubError::DuplicateEvent(name) if name == "typing"));
    }

    #[test]
    fn test_parse_wraps_into_channel_message_type() {
        let chat = chat();
        let raw = ProviderMessage::new("message_deleted", json!({"id": 3, "channel_id": "c1"}));

        let parsed = chat.events().parse(&raw).unwrap().unwrap();
        assert_eq!(
            parsed,
            ChatEvent::MessageDeleted(MessageDeleted {
                id: 3,
                channel_id: "c1".into()
            })
        );
    }

    #[test]
    fn test_parse_unknown_event_is_none() {
        let chat = chat();
        let raw = ProviderMessage::new("unknown_event", json!({}));
        assert!(chat.events().parse(&raw).is_none());
    }

    #[test]
    fn test_typed_descriptor_lookup() {
        let chat = chat();
        assert!(chat.descriptor::<Typing>("typing").is_some());
        assert!(chat.descriptor::<MessageDeleted>("typing").is_none());
        assert!(chat.descriptor::<Typing>("nope").is_none());
    }
}
