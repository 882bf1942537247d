use crate::types::{ProviderMessage, PubSubError, Result};
use serde::de::DeserializeOwned;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

type Refinement<T> = Arc<dyn Fn(&T) -> std::result::Result<(), String> + Send + Sync>;

/// Validator for one event's payload.
///
/// Deserialization into `T` is the structural check; [`refine`](Self::refine)
/// adds value-level checks on top. `EventDescriptor<serde_json::Value>` accepts
/// any payload.
///
/// # Example
///
/// ```
/// use pubsub_builder::schema::EventDescriptor;
/// use pubsub_builder::ProviderMessage;
/// use serde::Deserialize;
/// use serde_json::json;
///
/// #[derive(Deserialize)]
/// struct Typing {
///     user: String,
/// }
///
/// let typing = EventDescriptor::<Typing>::new()
///     .refine(|t| if t.user.is_empty() { Err("empty user".into()) } else { Ok(()) });
///
/// let parsed = typing.parse(&ProviderMessage::new("typing", json!({"user": "u1"}))).unwrap();
/// assert_eq!(parsed.user, "u1");
/// assert!(typing.parse(&ProviderMessage::new("typing", json!({"user": ""}))).is_err());
/// ```
pub struct EventDescriptor<T> {
    refinements: Vec<Refinement<T>>,
    _payload: PhantomData<fn() -> T>,
}

impl<T> EventDescriptor<T> {
    pub fn new() -> Self {
        Self {
            refinements: Vec::new(),
            _payload: PhantomData,
        }
    }

    /// Adds a check run after deserialization succeeds.
    pub fn refine<F>(mut self, check: F) -> Self
    where
        F: Fn(&T) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        self.refinements.push(Arc::new(check));
        self
    }
}

impl<T: DeserializeOwned> EventDescriptor<T> {
    /// Validates a raw message's payload into the declared type.
    pub fn parse(&self, raw: &ProviderMessage) -> Result<T> {
        let data = raw.decoded_data()?;
        let value: T = serde_json::from_value(data).map_err(|source| PubSubError::Validation {
            event: raw.name.clone(),
            source,
        })?;

        for check in &self.refinements {
            check(&value).map_err(|reason| PubSubError::Rejected {
                event: raw.name.clone(),
                reason,
            })?;
        }

        Ok(value)
    }
}

impl<T> Default for EventDescriptor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for EventDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            refinements: self.refinements.clone(),
            _payload: PhantomData,
        }
    }
}

impl<T> fmt::Debug for EventDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDescriptor")
            .field("payload", &std::any::type_name::<T>())
            .field("refinements", &self.refinements.len())
            .finish()
    }
}
