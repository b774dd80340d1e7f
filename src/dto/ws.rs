use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::{
        snapshot::{SessionSnapshot, SnapshotReason},
        validation::validate_participant_name,
    },
    state::{question::Question, wheel::WheelKind},
};

/// Role a WebSocket client announces when connecting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ClientRole {
    /// Host controlling the game.
    Moderator,
    /// Read-only board or scoreboard screen.
    Display,
    /// Participant device.
    #[default]
    Buzzer,
}

/// Question as sent by the moderator when putting it on screen.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPayload {
    /// Board column; `category` is accepted as well.
    #[serde(alias = "category")]
    #[validate(length(min = 1, max = 64))]
    pub category_name: String,
    /// Point value, at least 1.
    #[validate(range(min = 1))]
    pub points: u32,
    /// Prompt text; `question` is accepted as well.
    #[serde(alias = "question")]
    #[validate(length(min = 1, max = 500))]
    pub prompt: String,
    /// Expected answer.
    #[validate(length(min = 1, max = 500))]
    pub answer: String,
}

impl From<QuestionPayload> for Question {
    fn from(value: QuestionPayload) -> Self {
        Self {
            category_name: value.category_name,
            points: value.points,
            prompt: value.prompt,
            answer: value.answer,
        }
    }
}

impl From<&Question> for QuestionPayload {
    fn from(value: &Question) -> Self {
        Self {
            category_name: value.category_name.clone(),
            points: value.points,
            prompt: value.prompt.clone(),
            answer: value.answer.clone(),
        }
    }
}

/// Messages accepted from WebSocket clients.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientIntent {
    /// Reserve a participant name.
    ClaimName {
        /// Name to reserve, trimmed before validation.
        name: String,
    },
    /// Give a claimed name back.
    LeaveName {
        /// Name held by the sender.
        name: String,
    },
    /// Signal in for the current question.
    Buzz {
        /// Name held by the sender.
        name: String,
    },
    /// Put a question on screen.
    SelectQuestion {
        /// Question to show; must be in the bank when one is loaded.
        question: QuestionPayload,
    },
    /// Show the answer of the current question.
    RevealAnswer,
    /// Clear the screen, keeping played marks.
    ResetRound,
    /// Wipe round, played marks and participants.
    FullReset,
    /// Award (or remove) points through the score ledger.
    AddPoints {
        /// Team in the score ledger.
        name: String,
        /// Points to add; negative values subtract.
        delta: i64,
    },
    /// Ask for the current snapshot.
    RequestSnapshot,
    /// Make the prompt text visible on displays.
    ShowPrompt,
    /// Drop the current buzz leader.
    AdvanceBuzz,
    /// Empty the buzz queue and reopen buzzing.
    ResetBuzzer,
    /// Show a wheel, or hide it when `kind` is null.
    SetWheel {
        /// Wheel to show.
        #[serde(default)]
        kind: Option<WheelKind>,
    },
    /// Spin the wheel currently shown.
    SpinWheel,
}

/// Frame that could not be turned into a [`ClientIntent`].
#[derive(Debug, Error)]
pub enum IntentParseError {
    /// Not JSON, or not a known intent shape.
    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),
    /// Well-formed intent with out-of-range fields.
    #[error("invalid frame: {0}")]
    Validation(#[from] ValidationErrors),
}

impl ClientIntent {
    /// Parse a text frame, trim participant names and validate the payload.
    pub fn from_json_str(payload: &str) -> Result<Self, IntentParseError> {
        let mut intent: Self = serde_json::from_str(payload)?;
        intent.normalize();
        intent.validate()?;
        Ok(intent)
    }

    /// Wire name of the intent, used in rejections and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ClaimName { .. } => "claimName",
            Self::LeaveName { .. } => "leaveName",
            Self::Buzz { .. } => "buzz",
            Self::SelectQuestion { .. } => "selectQuestion",
            Self::RevealAnswer => "revealAnswer",
            Self::ResetRound => "resetRound",
            Self::FullReset => "fullReset",
            Self::AddPoints { .. } => "addPoints",
            Self::RequestSnapshot => "requestSnapshot",
            Self::ShowPrompt => "showPrompt",
            Self::AdvanceBuzz => "advanceBuzz",
            Self::ResetBuzzer => "resetBuzzer",
            Self::SetWheel { .. } => "setWheel",
            Self::SpinWheel => "spinWheel",
        }
    }

    /// Whether only moderator connections may send this intent.
    pub fn requires_moderator(&self) -> bool {
        !matches!(
            self,
            Self::ClaimName { .. }
                | Self::LeaveName { .. }
                | Self::Buzz { .. }
                | Self::RequestSnapshot
        )
    }

    fn participant_name(&self) -> Option<&str> {
        match self {
            Self::ClaimName { name }
            | Self::LeaveName { name }
            | Self::Buzz { name }
            | Self::AddPoints { name, .. } => Some(name),
            _ => None,
        }
    }

    fn normalize(&mut self) {
        match self {
            Self::ClaimName { name }
            | Self::LeaveName { name }
            | Self::Buzz { name }
            | Self::AddPoints { name, .. } => {
                let trimmed = name.trim();
                if trimmed.len() != name.len() {
                    *name = trimmed.to_owned();
                }
            }
            Self::SelectQuestion { question } => {
                question.category_name = question.category_name.trim().to_owned();
            }
            _ => {}
        }
    }
}

impl Validate for ClientIntent {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(name) = self.participant_name() {
            if let Err(e) = validate_participant_name(name) {
                errors.add("name", e);
            }
        }

        if let Self::SelectQuestion { question } = self {
            if let Err(question_errors) = question.validate() {
                errors.merge_self("question", Err(question_errors));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Messages pushed to WebSocket clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// First frame on every connection; carries no session state.
    Welcome {
        /// Identifier assigned to this connection.
        #[serde(rename = "connectionId")]
        connection_id: Uuid,
        /// Role granted to the connection.
        role: ClientRole,
    },
    /// Complete session view.
    Snapshot {
        /// What triggered the snapshot.
        reason: SnapshotReason,
        /// Session state after the change.
        state: SessionSnapshot,
    },
    /// The score ledger confirmed an update.
    ScoresChanged {
        /// Team whose score changed.
        name: String,
        /// Score after the update.
        points: i64,
    },
    /// Reply to a name claim.
    NameClaim {
        /// Name that was requested.
        name: String,
        /// Whether the sender now holds it.
        accepted: bool,
    },
    /// Reply to a name release.
    NameReleased {
        /// Name that was given back.
        name: String,
        /// Whether it was held before.
        released: bool,
    },
    /// The sender's intent was dropped.
    Rejected {
        /// Wire name of the dropped intent, `unknown` when unparsable.
        intent: String,
        /// Human readable cause.
        reason: String,
    },
}
