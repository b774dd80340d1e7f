//! Library crate for buzzboard-back, exposing modules for binaries and integration tests.

pub mod config;
/// File-backed collaborators: score ledger and question bank.
pub mod dao;
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// HTTP, WebSocket and SSE route trees.
pub mod routes;
/// Business logic behind the routes.
pub mod services;
/// Authoritative session state and the broadcast hub.
pub mod state;
