// Caller module - live channel objects built from a schema
mod dispatch;
mod realtime;
mod rest;

pub use dispatch::Dispatcher;
pub use realtime::{RealtimeCaller, RealtimeChannel, RealtimeEvent, realtime};
pub use rest::{RestCaller, RestChannel, RestEvent, rest};
