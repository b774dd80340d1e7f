use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Buzzboard Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::public_stream,
        crate::routes::websocket::ws_handler,
        crate::routes::board::board,
        crate::routes::board::questions,
        crate::routes::board::teams,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::ws::ClientIntent,
            crate::dto::ws::ServerMessage,
            crate::dto::ws::ClientRole,
            crate::dto::ws::QuestionPayload,
            crate::dto::snapshot::SessionSnapshot,
            crate::dto::snapshot::SnapshotReason,
            crate::dto::board::BoardResponse,
            crate::dto::board::QuestionBankResponse,
            crate::dto::board::TeamSummary,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "session", description = "WebSocket protocol for moderators, displays and buzzers"),
        (name = "board", description = "Question board and team standings"),
    )
)]
pub struct ApiDoc;
