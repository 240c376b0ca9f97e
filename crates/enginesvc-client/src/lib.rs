//! Discovery-backed, load-balanced and retrying client for enginesvc.
//!
//! The pieces compose bottom-up: an [`Instancer`] keeps the live address set,
//! an [`Endpointer`] turns it into one [`HttpEndpoint`] per address,
//! [`RoundRobin`] picks among them and [`Retry`] bounds the attempts.
//! [`EngineClient`] wires one such stack per operation.

pub mod balancer;
pub mod client;
pub mod discovery;
pub mod endpoint;
pub mod endpointer;
pub mod http;
pub mod instancer;
pub mod retry;

#[cfg(test)]
mod testing;

pub use balancer::RoundRobin;
pub use client::EngineClient;
pub use discovery::{Discovery, DiscoveryError, InstanceQuery, RegistryDiscovery};
pub use endpoint::{Endpoint, Factory};
pub use endpointer::Endpointer;
pub use http::HttpEndpoint;
pub use instancer::Instancer;
pub use retry::Retry;
