use crate::types::ProviderMessage;

/// Subscription filter applied by the provider before a listener runs.
///
/// An empty filter matches every message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub names: Option<Vec<String>>,
    pub client_id: Option<String>,
}

impl EventFilter {
    /// Matches a single event name.
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            names: Some(vec![name.into()]),
            client_id: None,
        }
    }

    /// Matches any of the given event names.
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: Some(names.into_iter().map(Into::into).collect()),
            client_id: None,
        }
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn matches(&self, message: &ProviderMessage) -> bool {
        if let Some(names) = &self.names
            && !names.iter().any(|name| *name == message.name)
        {
            return false;
        }

        if let Some(client_id) = &self.client_id
            && message.meta.client_id.as_deref() != Some(client_id.as_str())
        {
            return false;
        }

        true
    }
}

impl From<&str> for EventFilter {
    fn from(name: &str) -> Self {
        Self::name(name)
    }
}

impl From<Vec<String>> for EventFilter {
    fn from(names: Vec<String>) -> Self {
        Self::names(names)
    }
}
