use pubsub_builder::provider::http::{HttpRestConnection, RestClientOptions};
use pubsub_builder::{ChannelDescriptor, EventDescriptor, Schema, rest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GroupDeleted {
    id: i64,
}

#[derive(Debug)]
enum GroupEvent {
    Deleted(GroupDeleted),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing to see logs
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("🦀 Publishing over REST\n");

    // Get credentials from environment
    let api_key = std::env::var("ABLY_API_KEY")?;
    let endpoint = std::env::var("ABLY_REST_ENDPOINT").ok();

    let connection = HttpRestConnection::new(RestClientOptions {
        api_key,
        endpoint,
        client_id: Some("server".to_string()),
        ..Default::default()
    })?;
    println!("📡 Endpoint: {}\n", connection.endpoint());

    let mut schema = Schema::new();
    let group = schema.channel(
        "group",
        ChannelDescriptor::new(|group_id: &i64| vec![group_id.to_string()])
            .event(
                "group_deleted",
                EventDescriptor::<GroupDeleted>::new(),
                GroupEvent::Deleted,
            )?,
    )?;

    let server = rest(Arc::new(connection), &schema);
    let deleted = server.channel(&group)?.event::<GroupDeleted>("group_deleted")?;

    println!("✅ Publishing group_deleted on {}", deleted.channel_name(&42));
    deleted.publish(&42, &GroupDeleted { id: 42 }).await?;
    println!("✅ Published!");

    Ok(())
}
