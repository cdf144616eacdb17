//! Threadloom daemon library.
//!
//! Exposed as a library so the integration tests can drive the router
//! and pipeline with a scripted completion client.

pub mod config;
pub mod metrics;
pub mod pipeline;
pub mod routes;
pub mod server;
pub mod sink;
