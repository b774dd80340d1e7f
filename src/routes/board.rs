use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::get,
};

use crate::{
    dto::board::{BoardResponse, QuestionBankResponse, TeamSummary},
    error::AppError,
    services::{board_service, ledger_service},
    state::SharedState,
};

const PASSPHRASE_HEADER: &str = "x-passphrase";

/// Board, question bank and standings endpoints.
pub fn router(state: SharedState) -> Router<SharedState> {
    let gated = Router::new()
        .route("/questions", get(questions))
        .route_layer(middleware::from_fn_with_state(state, require_passphrase));

    Router::new()
        .route("/board", get(board))
        .route("/teams", get(teams))
        .merge(gated)
}

/// Public board layout with played marks.
#[utoipa::path(
    get,
    path = "/board",
    tag = "board",
    responses((status = 200, description = "Categories and point values", body = BoardResponse))
)]
pub async fn board(State(state): State<SharedState>) -> Json<BoardResponse> {
    Json(board_service::board(&state).await)
}

/// Full question bank including answers.
#[utoipa::path(
    get,
    path = "/questions",
    tag = "board",
    params(("X-Passphrase" = String, Header, description = "Moderator passphrase")),
    responses(
        (status = 200, description = "Question bank", body = QuestionBankResponse),
        (status = 401, description = "Missing or invalid passphrase")
    )
)]
pub async fn questions(State(state): State<SharedState>) -> Json<QuestionBankResponse> {
    Json(board_service::question_bank(&state))
}

/// Current standings read from the score ledger.
#[utoipa::path(
    get,
    path = "/teams",
    tag = "board",
    responses(
        (status = 200, description = "Team standings", body = [TeamSummary]),
        (status = 503, description = "Score ledger unreadable")
    )
)]
pub async fn teams(State(state): State<SharedState>) -> Result<Json<Vec<TeamSummary>>, AppError> {
    Ok(Json(ledger_service::standings(&state).await?))
}

async fn require_passphrase(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get(PASSPHRASE_HEADER)
        .and_then(|value| value.to_str().ok());

    if state.config().passphrase_matches(provided) {
        Ok(next.run(req).await)
    } else {
        Err(AppError::Unauthorized(
            "missing or invalid `X-Passphrase` header".into(),
        ))
    }
}
