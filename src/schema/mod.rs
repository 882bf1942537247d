// Schema module - declarative channel and event descriptions
mod channel;
mod event;
mod naming;
mod registry;

pub use channel::{ChannelDescriptor, EventTable};
pub use event::EventDescriptor;
pub use naming::physical_channel_name;
pub use registry::{ChannelKey, Schema};
