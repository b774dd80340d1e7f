use serde::Serialize;
use utoipa::ToSchema;

use crate::state::round::RoundPhase;

/// Round phase exposed to clients.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum VisiblePhase {
    /// No question on screen.
    Idle,
    /// A question is shown with its answer hidden.
    QuestionShown,
    /// The answer of the current question is shown.
    AnswerRevealed,
}

impl From<&RoundPhase> for VisiblePhase {
    fn from(value: &RoundPhase) -> Self {
        match value {
            RoundPhase::Idle => VisiblePhase::Idle,
            RoundPhase::QuestionShown(_) => VisiblePhase::QuestionShown,
            RoundPhase::AnswerRevealed(_) => VisiblePhase::AnswerRevealed,
        }
    }
}
