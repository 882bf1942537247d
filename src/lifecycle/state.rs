/// Subscription status as seen by callers.
///
/// There is no connecting state; establishing the connection is the
/// provider's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubscriptionState {
    #[default]
    Unsubscribed,
    Subscribed,
}

/// Parameters of a lifecycle-managed binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelParams {
    /// Hold a subscription only while `true`. Default: `true`.
    pub enabled: bool,
}

impl ChannelParams {
    pub fn enabled() -> Self {
        Self { enabled: true }
    }

    pub fn disabled() -> Self {
        Self { enabled: false }
    }
}

impl Default for ChannelParams {
    fn default() -> Self {
        Self::enabled()
    }
}
