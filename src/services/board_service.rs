use crate::{
    dto::board::{BoardResponse, QuestionBankResponse},
    state::SharedState,
};

/// Public board with the played marks of the running session.
pub async fn board(state: &SharedState) -> BoardResponse {
    let bank = state.questions();
    state
        .with_session(|session| BoardResponse::build(bank, session.round()))
        .await
}

/// Full question bank, answers included.
pub fn question_bank(state: &SharedState) -> QuestionBankResponse {
    QuestionBankResponse::from(state.questions())
}
