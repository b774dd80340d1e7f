use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dao::{
        ledger::TeamStanding,
        question_bank::{Category, QuestionBank},
    },
    dto::ws::QuestionPayload,
    state::round::RoundStateMachine,
};

/// Public board: categories and point values, without prompts or answers.
#[derive(Debug, Serialize, ToSchema)]
pub struct BoardResponse {
    /// Columns in bank order.
    pub categories: Vec<BoardCategory>,
}

/// A board column as shown to players.
#[derive(Debug, Serialize, ToSchema)]
pub struct BoardCategory {
    /// Column title.
    pub name: String,
    /// Cells from top to bottom.
    pub questions: Vec<BoardQuestion>,
}

/// A board cell; `played` turns true once its answer was revealed.
#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
pub struct BoardQuestion {
    /// Point value shown on the cell.
    pub points: u32,
    /// Whether the answer was revealed since the last full reset.
    pub played: bool,
}

impl BoardResponse {
    /// Lay out `bank` with the played marks currently held by `round`.
    pub fn build(bank: &QuestionBank, round: &RoundStateMachine) -> Self {
        let categories = bank
            .categories()
            .iter()
            .map(|category| BoardCategory {
                name: category.name.clone(),
                questions: category
                    .questions
                    .iter()
                    .map(|question| BoardQuestion {
                        points: question.points,
                        played: round.is_played(&question.key()),
                    })
                    .collect(),
            })
            .collect();
        Self { categories }
    }
}

/// Full question bank, answers included, for the moderator screen.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionBankResponse {
    /// Columns in bank order.
    pub categories: Vec<BankCategory>,
}

/// A bank column with its complete questions.
#[derive(Debug, Serialize, ToSchema)]
pub struct BankCategory {
    /// Column title.
    pub name: String,
    /// Complete questions, answers included.
    pub questions: Vec<QuestionPayload>,
}

impl From<&Category> for BankCategory {
    fn from(value: &Category) -> Self {
        Self {
            name: value.name.clone(),
            questions: value.questions.iter().map(QuestionPayload::from).collect(),
        }
    }
}

impl From<&QuestionBank> for QuestionBankResponse {
    fn from(value: &QuestionBank) -> Self {
        Self {
            categories: value.categories().iter().map(BankCategory::from).collect(),
        }
    }
}

/// Team standing read from the score ledger.
#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
pub struct TeamSummary {
    /// Team name as stored in the roster.
    pub name: String,
    /// Current score.
    pub points: i64,
}

impl From<TeamStanding> for TeamSummary {
    fn from(value: TeamStanding) -> Self {
        Self {
            name: value.name,
            points: value.points,
        }
    }
}
