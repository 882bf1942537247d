use pubsub_builder::provider::memory::InMemoryHub;
use pubsub_builder::{
    ChannelDescriptor, ChannelParams, EventDescriptor, ProviderMessage, Schema, realtime, rest,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct User {
    id: String,
    name: String,
    image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Typing {
    user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MessageSent {
    id: i64,
    channel_id: String,
    content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MessageDeleted {
    id: i64,
    channel_id: String,
}

#[derive(Debug)]
enum ChatEvent {
    Typing(Typing),
    MessageSent(MessageSent),
    MessageDeleted(MessageDeleted),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("🦀 Chat channel demo\n");

    let mut schema = Schema::new();
    let chat = schema.channel(
        "chat",
        ChannelDescriptor::new(|channel_id: &String| vec![channel_id.clone()])
            .event("typing", EventDescriptor::<Typing>::new(), ChatEvent::Typing)?
            .event(
                "message_sent",
                EventDescriptor::<MessageSent>::new(),
                ChatEvent::MessageSent,
            )?
            .event(
                "message_deleted",
                EventDescriptor::<MessageDeleted>::new(),
                ChatEvent::MessageDeleted,
            )?,
    )?;

    // One hub stands in for the hosted service; both modes share it
    let hub = InMemoryHub::new();
    let client = realtime(hub.realtime(), &schema);
    let server = rest(hub.rest(), &schema);
    let channel_id = "c1".to_string();

    println!("✅ Step 1: Binding to {}", client.channel(&chat)?.channel_name(&channel_id));
    let mut binding = client
        .channel(&chat)?
        .use_channel(&channel_id, ChannelParams::default(), |msg| {
            println!("📨 {} -> {:?}", msg.name, msg.data);
        })
        .await?;

    println!("✅ Step 2: Client publishes typing");
    client
        .channel(&chat)?
        .event::<Typing>("typing")?
        .publish(
            &channel_id,
            &Typing {
                user: User {
                    id: "u1".into(),
                    name: "Bob".into(),
                    image: None,
                },
            },
        )
        .await?;

    println!("✅ Step 3: Server publishes a message over REST");
    server
        .channel(&chat)?
        .event::<MessageSent>("message_sent")?
        .publish(
            &channel_id,
            &MessageSent {
                id: 1,
                channel_id: channel_id.clone(),
                content: "hello".into(),
            },
        )
        .await?;

    println!("✅ Step 4: An undeclared event is dropped");
    hub.channel("chat:c1")
        .inject(ProviderMessage::new("unknown_event", json!({})));

    println!("✅ Step 5: Disabling the binding");
    binding.set_enabled(false).await?;
    server
        .channel(&chat)?
        .event::<MessageDeleted>("message_deleted")?
        .publish(
            &channel_id,
            &MessageDeleted {
                id: 1,
                channel_id: channel_id.clone(),
            },
        )
        .await?;

    binding.unmount();
    println!("\n✅ Done, {} messages published", hub.channel("chat:c1").history().len());

    Ok(())
}
