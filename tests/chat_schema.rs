use pubsub_builder::provider::memory::InMemoryHub;
use pubsub_builder::provider::{RealtimeChannelHandle, RestChannelHandle};
use pubsub_builder::{
    ChannelDescriptor, ChannelKey, ChannelMessage, ChannelParams, EventDescriptor, EventMessage,
    ProviderMessage, PubSubError, Schema, realtime, rest,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct UserRef {
    id: String,
    name: String,
    image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Typing {
    user: UserRef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct MessageSent {
    id: i64,
    channel_id: String,
    content: String,
    author_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nonce: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct MessageUpdated {
    id: i64,
    channel_id: String,
    content: String,
    #[serde(default)]
    embeds: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct MessageDeleted {
    id: i64,
    channel_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Group {
    id: i64,
    name: String,
    owner_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct GroupId {
    id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct DirectChannel {
    id: String,
    user: UserRef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct CloseDm {
    channel_id: String,
}

#[derive(Debug, Clone, PartialEq)]
enum PrivateEvent {
    GroupCreated(Group),
    GroupRemoved(GroupId),
    OpenDm(DirectChannel),
    CloseDm(CloseDm),
}

#[derive(Debug, Clone, PartialEq)]
enum GroupEvent {
    Updated(Group),
    Deleted(GroupId),
}

#[derive(Debug, Clone, PartialEq)]
enum ChatEvent {
    Typing(Typing),
    MessageSent(MessageSent),
    MessageUpdated(MessageUpdated),
    MessageDeleted(MessageDeleted),
}

struct ChatSchema {
    schema: Schema,
    private: ChannelKey<String, PrivateEvent>,
    group: ChannelKey<i64, GroupEvent>,
    chat: ChannelKey<String, ChatEvent>,
}

fn chat_schema() -> pubsub_builder::Result<ChatSchema> {
    let mut schema = Schema::new();

    let private = schema.channel(
        "private",
        ChannelDescriptor::new(|client_id: &String| vec![client_id.clone()])
            .event(
                "group_created",
                EventDescriptor::<Group>::new(),
                PrivateEvent::GroupCreated,
            )?
            .event(
                "group_removed",
                EventDescriptor::<GroupId>::new(),
                PrivateEvent::GroupRemoved,
            )?
            .event(
                "open_dm",
                EventDescriptor::<DirectChannel>::new(),
                PrivateEvent::OpenDm,
            )?
            .event("close_dm", EventDescriptor::<CloseDm>::new(), PrivateEvent::CloseDm)?,
    )?;

    let group = schema.channel(
        "group",
        ChannelDescriptor::new(|group_id: &i64| vec![group_id.to_string()])
            .event("group_updated", EventDescriptor::<Group>::new(), GroupEvent::Updated)?
            .event("group_deleted", EventDescriptor::<GroupId>::new(), GroupEvent::Deleted)?,
    )?;

    let chat = schema.channel(
        "chat",
        ChannelDescriptor::new(|channel_id: &String| vec![channel_id.clone()])
            .event("typing", EventDescriptor::<Typing>::new(), ChatEvent::Typing)?
            .event(
                "message_sent",
                EventDescriptor::<MessageSent>::new()
                    .refine(|msg| {
                        if msg.content.trim().is_empty() {
                            Err("message content is empty".to_string())
                        } else {
                            Ok(())
                        }
                    }),
                ChatEvent::MessageSent,
            )?
            .event(
                "message_updated",
                EventDescriptor::<MessageUpdated>::new(),
                ChatEvent::MessageUpdated,
            )?
            .event(
                "message_deleted",
                EventDescriptor::<MessageDeleted>::new(),
                ChatEvent::MessageDeleted,
            )?,
    )?;

    Ok(ChatSchema {
        schema,
        private,
        group,
        chat,
    })
}

fn bob() -> UserRef {
    UserRef {
        id: "u1".into(),
        name: "Bob".into(),
        image: None,
    }
}

fn recorder<T: Send + 'static>() -> (impl Fn(T) + Send + Sync + 'static, Arc<Mutex<Vec<T>>>) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    (move |item: T| sink.lock().unwrap().push(item), received)
}

#[test]
fn test_schema_declares_chat_app_channels() {
    let chat = chat_schema().unwrap();
    let schema = &chat.schema;

    assert_eq!(
        schema.channel_names().collect::<Vec<_>>(),
        vec!["chat", "group", "private"]
    );
    assert_eq!(
        schema.event_names("private").unwrap(),
        vec!["close_dm", "group_created", "group_removed", "open_dm"]
    );
    assert_eq!(
        schema.event_names("group").unwrap(),
        vec!["group_deleted", "group_updated"]
    );
    assert_eq!(
        schema.event_names("chat").unwrap(),
        vec!["message_deleted", "message_sent", "message_updated", "typing"]
    );
}

#[test]
fn test_channel_names_match_across_modes() {
    let chat = chat_schema().unwrap();
    let hub = InMemoryHub::new();
    let live = realtime(hub.realtime(), &chat.schema);
    let server = rest(hub.rest(), &chat.schema);
    let c1 = "c1".to_string();

    assert_eq!(live.channel(&chat.chat).unwrap().channel_name(&c1), "chat:c1");
    assert_eq!(server.channel(&chat.chat).unwrap().channel_name(&c1), "chat:c1");
    assert_eq!(live.channel(&chat.group).unwrap().channel_name(&42), "group:42");
    assert_eq!(server.channel(&chat.group).unwrap().channel_name(&42), "group:42");
    assert_eq!(
        live.channel(&chat.private).unwrap().channel_name(&"u1".to_string()),
        server.channel(&chat.private).unwrap().channel_name(&"u1".to_string())
    );
}

#[tokio::test]
async fn test_typing_publish_sends_exact_payload() {
    let chat = chat_schema().unwrap();
    let hub = InMemoryHub::new();
    let live = realtime(hub.realtime(), &chat.schema);
    let c1 = "c1".to_string();

    live.channel(&chat.chat)
        .unwrap()
        .event::<Typing>("typing")
        .unwrap()
        .publish(&c1, &Typing { user: bob() })
        .await
        .unwrap();

    let history = hub.channel("chat:c1").history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].name, "typing");
    assert_eq!(
        history[0].data,
        json!({"user": {"id": "u1", "name": "Bob", "image": null}})
    );
}

#[tokio::test]
async fn test_unknown_event_fires_no_callback() {
    let chat = chat_schema().unwrap();
    let hub = InMemoryHub::new();
    let live = realtime(hub.realtime(), &chat.schema);
    let (callback, received) = recorder::<ChannelMessage<ChatEvent>>();

    let _binding = live
        .channel(&chat.chat)
        .unwrap()
        .use_channel(&"c1".to_string(), ChannelParams::default(), callback)
        .await
        .unwrap();

    let channel = hub.channel("chat:c1");
    channel.inject(ProviderMessage::new("unknown_event", json!({"x": 1})));

    assert!(received.lock().unwrap().is_empty());
    assert!(channel.listener_errors().is_empty());
}

#[tokio::test]
async fn test_declared_event_reaches_channel_callback() {
    let chat = chat_schema().unwrap();
    let hub = InMemoryHub::new();
    let live = realtime(hub.realtime(), &chat.schema);
    let (callback, received) = recorder::<ChannelMessage<ChatEvent>>();
    let c1 = "c1".to_string();

    let _binding = live
        .channel(&chat.chat)
        .unwrap()
        .use_channel(&c1, ChannelParams::default(), callback)
        .await
        .unwrap();

    let deleted = MessageDeleted {
        id: 9,
        channel_id: "c1".into(),
    };
    hub.channel("chat:c1").inject(
        ProviderMessage::new("message_deleted", json!({"id": 9, "channel_id": "c1"}))
            .with_id("msg-1")
            .with_client_id("u1"),
    );

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].name, "message_deleted");
    assert_eq!(received[0].data, ChatEvent::MessageDeleted(deleted));
    assert_eq!(received[0].meta.id.as_deref(), Some("msg-1"));
    assert_eq!(received[0].meta.client_id.as_deref(), Some("u1"));
}

#[tokio::test]
async fn test_get_twice_addresses_same_channel() {
    let chat = chat_schema().unwrap();
    let hub = InMemoryHub::new();
    let live = realtime(hub.realtime(), &chat.schema);
    let server = rest(hub.rest(), &chat.schema);

    let group = live.channel(&chat.group).unwrap();
    assert!(Arc::ptr_eq(&group.get(&1), &group.get(&1)));
    assert_eq!(group.get(&1).name(), server.channel(&chat.group).unwrap().get(&1).name());
    assert_eq!(hub.channel_names(), vec!["group:1".to_string()]);
}

#[tokio::test]
async fn test_enabled_toggle_keeps_single_subscription() {
    let chat = chat_schema().unwrap();
    let hub = InMemoryHub::new();
    let live = realtime(hub.realtime(), &chat.schema);
    let (callback, received) = recorder::<EventMessage<Typing>>();
    let c1 = "c1".to_string();
    let typing = live.channel(&chat.chat).unwrap().event::<Typing>("typing").unwrap();

    let mut binding = typing
        .use_channel(&c1, ChannelParams::enabled(), callback)
        .await
        .unwrap();
    binding.set_enabled(false).await.unwrap();
    binding.set_enabled(true).await.unwrap();
    assert_eq!(hub.channel("chat:c1").listener_count(), 1);

    typing.publish(&c1, &Typing { user: bob() }).await.unwrap();
    assert_eq!(received.lock().unwrap().len(), 1);

    binding.set_enabled(false).await.unwrap();
    typing.publish(&c1, &Typing { user: bob() }).await.unwrap();
    assert_eq!(received.lock().unwrap().len(), 1);
    assert_eq!(hub.channel("chat:c1").listener_count(), 0);
}

#[tokio::test]
async fn test_switching_chat_channel_moves_binding() {
    let chat = chat_schema().unwrap();
    let hub = InMemoryHub::new();
    let live = realtime(hub.realtime(), &chat.schema);
    let (callback, received) = recorder::<ChannelMessage<ChatEvent>>();

    let mut binding = live
        .channel(&chat.chat)
        .unwrap()
        .use_channel(&"c1".to_string(), ChannelParams::default(), callback)
        .await
        .unwrap();
    binding.set_args(&"c2".to_string()).await.unwrap();
    assert_eq!(binding.channel_name(), "chat:c2");

    let typing = live.channel(&chat.chat).unwrap().event::<Typing>("typing").unwrap();
    typing.publish(&"c1".to_string(), &Typing { user: bob() }).await.unwrap();
    typing.publish(&"c2".to_string(), &Typing { user: bob() }).await.unwrap();

    assert_eq!(received.lock().unwrap().len(), 1);
    binding.unmount();
    assert_eq!(hub.channel("chat:c2").listener_count(), 0);
}

#[tokio::test]
async fn test_server_publish_reaches_private_binding() {
    let chat = chat_schema().unwrap();
    let hub = InMemoryHub::new();
    let live = realtime(hub.realtime(), &chat.schema);
    let server = rest(hub.rest(), &chat.schema);
    let client_id = "u1".to_string();
    let (callback, received) = recorder::<ChannelMessage<PrivateEvent>>();

    let _binding = live
        .channel(&chat.private)
        .unwrap()
        .use_channel(&client_id, ChannelParams::default(), callback)
        .await
        .unwrap();

    let group = Group {
        id: 3,
        name: "rustaceans".into(),
        owner_id: "u2".into(),
    };
    let private = server.channel(&chat.private).unwrap();
    private
        .event::<Group>("group_created")
        .unwrap()
        .publish(&client_id, &group)
        .await
        .unwrap();
    private
        .event::<CloseDm>("close_dm")
        .unwrap()
        .publish(&client_id, &CloseDm { channel_id: "d1".into() })
        .await
        .unwrap();

    let data: Vec<PrivateEvent> = received.lock().unwrap().iter().map(|m| m.data.clone()).collect();
    assert_eq!(
        data,
        vec![
            PrivateEvent::GroupCreated(group),
            PrivateEvent::CloseDm(CloseDm { channel_id: "d1".into() }),
        ]
    );
}

#[tokio::test]
async fn test_invalid_payloads_are_reported_not_delivered() {
    let chat = chat_schema().unwrap();
    let hub = InMemoryHub::new();
    let live = realtime(hub.realtime(), &chat.schema);
    let (callback, received) = recorder::<ChannelMessage<ChatEvent>>();

    let _binding = live
        .channel(&chat.chat)
        .unwrap()
        .use_channel(&"c1".to_string(), ChannelParams::default(), callback)
        .await
        .unwrap();

    let channel = hub.channel("chat:c1");
    channel.inject(ProviderMessage::new("typing", json!({"user": "Bob"})));
    channel.inject(ProviderMessage::new(
        "message_sent",
        json!({"id": 1, "channel_id": "c1", "content": "   ", "author_id": "u1"}),
    ));

    assert!(received.lock().unwrap().is_empty());
    assert_eq!(channel.listener_errors().len(), 2);
}

#[tokio::test]
async fn test_rest_parse_and_unavailable_publish() {
    let chat = chat_schema().unwrap();
    let hub = InMemoryHub::new();
    let server = rest(hub.rest(), &chat.schema);
    let sent = server
        .channel(&chat.chat)
        .unwrap()
        .event::<MessageSent>("message_sent")
        .unwrap();

    let raw = ProviderMessage::new(
        "message_sent",
        json!({"id": 1, "channel_id": "c1", "content": "hi", "author_id": "u1", "nonce": 5})
            .to_string()
            .into(),
    )
    .with_encoding("json");
    let parsed = sent.parse(&raw).unwrap();
    assert_eq!(parsed.nonce, Some(5));

    hub.set_available(false);
    let err = sent.publish(&"c1".to_string(), &parsed).await.unwrap_err();
    assert!(matches!(err, PubSubError::NotConnected));
    assert!(hub.channel("chat:c1").history().is_empty());
}
