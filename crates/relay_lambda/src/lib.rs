//! AWS-oriented adapters and handlers for the queue-to-broker relay.
//!
//! This crate owns runtime integration details (the Lambda batch handler and
//! the adapter seams for the secrets store and the broker) behind which the
//! binary wires the real SDK clients.

pub mod adapters;
pub mod handlers;
