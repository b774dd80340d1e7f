use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A trivia question as loaded from the question bank or sent by the moderator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Board column the question belongs to.
    pub category_name: String,
    /// Value awarded for a correct answer; always positive.
    pub points: u32,
    /// Text read out to the players.
    pub prompt: String,
    /// Expected answer, hidden from viewers until revealed.
    pub answer: String,
}

impl Question {
    /// Identity used to mark the question as played.
    pub fn key(&self) -> PlayedKey {
        PlayedKey {
            prompt: self.prompt.clone(),
            points: self.points,
        }
    }
}

/// `(prompt, points)` pair identifying a question across the whole bank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct PlayedKey {
    /// Prompt text of the played question.
    pub prompt: String,
    /// Point value of the played question.
    pub points: u32,
}
