// REST provider - publishes through the hosted service's HTTP API
mod builder;
mod client;

pub use builder::{RestClientBuilder, RestClientOptions};
pub use client::{HttpRestChannel, HttpRestConnection};
