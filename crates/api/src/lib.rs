//! HTTP API: server, routing, and request/response mapping over one
//! inventory session.

pub mod app;
pub mod config;
pub mod middleware;
