/// Public board and question bank views.
pub mod board_service;
/// Session and score broadcast payloads.
pub mod broadcast_events;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Score ledger updates and standings.
pub mod ledger_service;
/// Intent dispatch against the authoritative session.
pub mod session_service;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// WebSocket connection and message handling service.
pub mod websocket_service;
