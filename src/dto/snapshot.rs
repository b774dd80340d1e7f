use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::{phase::VisiblePhase, rfc3339_now},
    state::{
        question::{PlayedKey, Question},
        session::{Session, SessionChange},
        wheel::{WheelKind, WheelState},
    },
};

/// Complete view of the session pushed after every mutation and on refresh.
///
/// A client's display is a pure function of the last snapshot it received;
/// `version` lets it ignore a stale refresh reply that arrives after a newer broadcast.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Monotonic mutation counter.
    pub version: u64,
    /// Current round phase.
    pub phase: VisiblePhase,
    /// Question on screen, if any.
    pub question: Option<QuestionView>,
    /// Whether displays may show the prompt text.
    pub prompt_visible: bool,
    /// Whether buzzer clients should accept presses.
    pub buzzers_enabled: bool,
    /// Buzz order for the current question, earliest first.
    pub buzz_order: Vec<String>,
    /// Questions revealed since the last full reset, in reveal order.
    pub played: Vec<PlayedKey>,
    /// Luck wheel shown on displays.
    pub wheel: Option<WheelView>,
    /// RFC 3339 timestamp of the capture.
    pub generated_at: String,
}

impl SessionSnapshot {
    /// Capture the broadcast view of `session`.
    pub fn capture(session: &Session) -> Self {
        let round = session.round();
        let question = round
            .current_question()
            .map(|question| QuestionView::new(question, round.is_revealed()));

        Self {
            version: session.version(),
            phase: round.phase().into(),
            question,
            prompt_visible: session.prompt_visible(),
            buzzers_enabled: session.buzzers_open(),
            buzz_order: session.queue().snapshot(),
            played: round.played().iter().cloned().collect(),
            wheel: session.wheel().map(WheelView::from),
            generated_at: rfc3339_now(),
        }
    }
}

/// Question as shown to viewers; the answer is only present once revealed.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    /// Board column of the question.
    pub category_name: String,
    /// Point value.
    pub points: u32,
    /// Prompt text.
    pub prompt: String,
    /// Answer, present in the answer-revealed phase.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

impl QuestionView {
    fn new(question: &Question, revealed: bool) -> Self {
        Self {
            category_name: question.category_name.clone(),
            points: question.points,
            prompt: question.prompt.clone(),
            answer: revealed.then(|| question.answer.clone()),
        }
    }
}

/// Wheel shown on displays.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct WheelView {
    /// Which wheel is shown.
    pub kind: WheelKind,
    /// Effect landed on by the last spin.
    pub result: Option<String>,
}

impl From<&WheelState> for WheelView {
    fn from(value: &WheelState) -> Self {
        Self {
            kind: value.kind,
            result: value.result.clone(),
        }
    }
}

/// Why a snapshot was sent.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SnapshotReason {
    /// A question was put on screen.
    QuestionSelected,
    /// The answer was revealed.
    AnswerRevealed,
    /// The round was cleared.
    RoundReset,
    /// Everything was wiped.
    FullReset,
    /// A participant buzzed in.
    Buzz {
        /// Participant that buzzed.
        name: String,
        /// Whether displays should play the buzzer sound.
        alert: bool,
    },
    /// The buzz leader was dropped.
    BuzzAdvanced {
        /// Participant that was dropped.
        name: String,
    },
    /// The buzz queue was emptied.
    BuzzerReset,
    /// The prompt became visible.
    PromptShown,
    /// A wheel was shown or hidden.
    WheelChanged,
    /// The wheel landed on an effect.
    WheelSpun {
        /// Effect picked.
        effect: String,
    },
    /// Reply to an explicit state request.
    Refresh,
}

impl From<SessionChange> for SnapshotReason {
    fn from(value: SessionChange) -> Self {
        match value {
            SessionChange::QuestionSelected => SnapshotReason::QuestionSelected,
            SessionChange::AnswerRevealed => SnapshotReason::AnswerRevealed,
            SessionChange::RoundReset => SnapshotReason::RoundReset,
            SessionChange::FullReset => SnapshotReason::FullReset,
            SessionChange::Buzzed { name, alert } => SnapshotReason::Buzz { name, alert },
            SessionChange::BuzzAdvanced { name } => SnapshotReason::BuzzAdvanced { name },
            SessionChange::BuzzerReset => SnapshotReason::BuzzerReset,
            SessionChange::PromptShown => SnapshotReason::PromptShown,
            SessionChange::WheelChanged => SnapshotReason::WheelChanged,
            SessionChange::WheelSpun { effect } => SnapshotReason::WheelSpun { effect },
        }
    }
}
