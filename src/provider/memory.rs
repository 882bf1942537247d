//! In-process provider.
//!
//! [`InMemoryHub`] keeps one channel namespace shared by a realtime view and a
//! REST view, so a publish made through [`InMemoryRest`] reaches listeners
//! registered through [`InMemoryRealtime`], the same way both connection modes
//! of the hosted service address the same channels.

use super::{
    EventFilter, Listener, ListenerId, RealtimeChannelHandle, RealtimeConnection,
    RestChannelHandle, RestConnection,
};
use crate::types::{ProviderMessage, PubSubError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

/// State shared between the hub and every channel it created
#[derive(Debug)]
struct Shared {
    available: AtomicBool,
    next_listener: AtomicU64,
}

struct Registration {
    id: ListenerId,
    filter: Option<EventFilter>,
    listener: Listener,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn now_millis() -> Option<i64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|elapsed| i64::try_from(elapsed.as_millis()).ok())
}

/// One named channel living inside an [`InMemoryHub`].
pub struct MemoryChannel {
    name: String,
    shared: Arc<Shared>,
    listeners: Mutex<Vec<Registration>>,
    history: Mutex<Vec<ProviderMessage>>,
    listener_errors: Mutex<Vec<String>>,
}

impl MemoryChannel {
    fn new(name: String, shared: Arc<Shared>) -> Self {
        Self {
            name,
            shared,
            listeners: Mutex::new(Vec::new()),
            history: Mutex::new(Vec::new()),
            listener_errors: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of currently attached listeners
    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }

    /// Every message delivered on this channel, oldest first
    pub fn history(&self) -> Vec<ProviderMessage> {
        lock(&self.history).clone()
    }

    /// Errors returned by listeners, formatted, oldest first
    pub fn listener_errors(&self) -> Vec<String> {
        lock(&self.listener_errors).clone()
    }

    /// Delivers a raw message as if the service had sent it.
    ///
    /// Unlike publishing this works while the hub is unavailable, which makes
    /// it the way to replay arbitrary (including undeclared) events.
    pub fn inject(&self, message: ProviderMessage) {
        self.deliver(message);
    }

    fn add_listener(&self, filter: Option<EventFilter>, listener: Listener) -> Result<ListenerId> {
        if !self.shared.available.load(Ordering::SeqCst) {
            return Err(PubSubError::NotConnected);
        }

        let id = ListenerId(self.shared.next_listener.fetch_add(1, Ordering::SeqCst));
        lock(&self.listeners).push(Registration {
            id,
            filter,
            listener,
        });

        tracing::debug!("Attached {} to channel {}", id, self.name);
        Ok(id)
    }

    fn remove_listener(&self, id: ListenerId) {
        let mut listeners = lock(&self.listeners);
        let before = listeners.len();
        listeners.retain(|registration| registration.id != id);

        if listeners.len() < before {
            tracing::debug!("Detached {} from channel {}", id, self.name);
        }
    }

    fn publish_message(&self, name: &str, data: Value) -> Result<()> {
        if !self.shared.available.load(Ordering::SeqCst) {
            return Err(PubSubError::NotConnected);
        }

        let mut message =
            ProviderMessage::new(name, data).with_id(uuid::Uuid::new_v4().to_string());
        message.meta.timestamp = now_millis();

        tracing::debug!("Published {} on channel {}", name, self.name);
        self.deliver(message);
        Ok(())
    }

    fn deliver(&self, message: ProviderMessage) {
        lock(&self.history).push(message.clone());

        // Listeners run without the registry lock so they may (un)subscribe.
        let targets: Vec<Listener> = lock(&self.listeners)
            .iter()
            .filter(|registration| {
                registration
                    .filter
                    .as_ref()
                    .is_none_or(|filter| filter.matches(&message))
            })
            .map(|registration| Arc::clone(&registration.listener))
            .collect();

        for listener in targets {
            if let Err(e) = listener(message.clone()) {
                tracing::warn!(
                    "Listener on channel {} failed to handle '{}': {}",
                    self.name,
                    message.name,
                    e
                );
                lock(&self.listener_errors).push(e.to_string());
            }
        }
    }
}

#[async_trait]
impl RealtimeChannelHandle for MemoryChannel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn subscribe(
        &self,
        filter: Option<EventFilter>,
        listener: Listener,
    ) -> Result<ListenerId> {
        self.add_listener(filter, listener)
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.remove_listener(id);
    }

    async fn publish(&self, name: &str, data: Value) -> Result<()> {
        self.publish_message(name, data)
    }
}

#[async_trait]
impl RestChannelHandle for MemoryChannel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn publish(&self, name: &str, data: Value) -> Result<()> {
        self.publish_message(name, data)
    }
}

/// Shared channel namespace backing both in-memory connection modes.
#[derive(Clone)]
pub struct InMemoryHub {
    shared: Arc<Shared>,
    channels: Arc<Mutex<HashMap<String, Arc<MemoryChannel>>>>,
}

impl InMemoryHub {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                available: AtomicBool::new(true),
                next_listener: AtomicU64::new(1),
            }),
            channels: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Creates or returns the channel with this physical name.
    pub fn channel(&self, name: &str) -> Arc<MemoryChannel> {
        let mut channels = lock(&self.channels);
        if let Some(existing) = channels.get(name) {
            return Arc::clone(existing);
        }

        let channel = Arc::new(MemoryChannel::new(name.to_string(), Arc::clone(&self.shared)));
        channels.insert(name.to_string(), Arc::clone(&channel));
        channel
    }

    /// Names of every channel resolved so far, sorted
    pub fn channel_names(&self) -> Vec<String> {
        let mut names: Vec<String> = lock(&self.channels).keys().cloned().collect();
        names.sort();
        names
    }

    /// Simulates losing (`false`) or regaining (`true`) the connection.
    pub fn set_available(&self, available: bool) {
        self.shared.available.store(available, Ordering::SeqCst);
        tracing::info!("In-memory hub available: {}", available);
    }

    pub fn is_available(&self) -> bool {
        self.shared.available.load(Ordering::SeqCst)
    }

    /// Live connection view over this hub
    pub fn realtime(&self) -> Arc<InMemoryRealtime> {
        Arc::new(InMemoryRealtime { hub: self.clone() })
    }

    /// Publish-only view over this hub
    pub fn rest(&self) -> Arc<InMemoryRest> {
        Arc::new(InMemoryRest { hub: self.clone() })
    }
}

impl Default for InMemoryHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Realtime connection backed by an [`InMemoryHub`].
pub struct InMemoryRealtime {
    hub: InMemoryHub,
}

impl InMemoryRealtime {
    pub fn hub(&self) -> &InMemoryHub {
        &self.hub
    }
}

impl RealtimeConnection for InMemoryRealtime {
    fn channel(&self, name: &str) -> Arc<dyn RealtimeChannelHandle> {
        self.hub.channel(name)
    }
}

/// REST connection backed by an [`InMemoryHub`].
pub struct InMemoryRest {
    hub: InMemoryHub,
}

impl InMemoryRest {
    pub fn hub(&self) -> &InMemoryHub {
        &self.hub
    }
}

impl RestConnection for InMemoryRest {
    fn channel(&self, name: &str) -> Arc<dyn RestChannelHandle> {
        self.hub.channel(name)
    }
}
