// Lifecycle module - scoped subscriptions and enable/disable bindings
mod binding;
mod state;
mod subscription;

pub use binding::ChannelBinding;
pub use state::{ChannelParams, SubscriptionState};
pub use subscription::{ChannelSet, Subscription, use_channels};

pub(crate) use binding::Naming;
