//! WellBot daemon library - exposes modules for testing.

pub mod config;
pub mod error;
pub mod middleware;
pub mod relay;
pub mod routes;
pub mod server;
pub mod store;
