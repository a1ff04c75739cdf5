//! dqe-wire — the transport facade.
//!
//! Named request/response structs per RPC, the wire-shape registry, and
//! the HTTP clients the coordinator and CLI use to reach nodes and the
//! coordinator respectively. Nothing in here implements distributed-engine
//! semantics; that is `dqe-core`'s job.

pub mod client;
pub mod error;
pub mod registry;
pub mod requests;

pub use client::{CoordinatorClient, HttpNodeClient};
pub use error::WireError;
pub use registry::{default_registry, WireRegistry, WireShape};
