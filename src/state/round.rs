use indexmap::IndexSet;
use thiserror::Error;

use crate::state::question::{PlayedKey, Question};

/// Phases a round can be in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundPhase {
    /// No question on screen.
    Idle,
    /// A question is displayed with its answer hidden; buzzing is open.
    QuestionShown(Question),
    /// The answer of the displayed question is visible; the buzz queue is frozen.
    AnswerRevealed(Question),
}

/// Events that drive the round from one phase to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundEvent {
    /// Put a question on screen, replacing whatever was shown.
    SelectQuestion(Question),
    /// Show the answer of the current question.
    Reveal,
    /// Clear the screen while keeping the played marks.
    ResetRound,
}

/// Error returned when an event cannot be applied from the current phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the machine was in when the event was received.
    pub from: RoundPhase,
    /// The rejected event.
    pub event: RoundEvent,
}

/// Round state: current question, reveal flag and the set of played questions.
///
/// `played` only grows, except through [`RoundStateMachine::full_reset`].
#[derive(Debug, Clone)]
pub struct RoundStateMachine {
    phase: RoundPhase,
    played: IndexSet<PlayedKey>,
}

impl Default for RoundStateMachine {
    fn default() -> Self {
        Self {
            phase: RoundPhase::Idle,
            played: IndexSet::new(),
        }
    }
}

impl RoundStateMachine {
    /// Create a machine in the idle phase with nothing played.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> &RoundPhase {
        &self.phase
    }

    /// Question currently on screen, revealed or not.
    pub fn current_question(&self) -> Option<&Question> {
        match &self.phase {
            RoundPhase::Idle => None,
            RoundPhase::QuestionShown(question) | RoundPhase::AnswerRevealed(question) => {
                Some(question)
            }
        }
    }

    /// Whether the answer of the current question is visible.
    pub fn is_revealed(&self) -> bool {
        matches!(self.phase, RoundPhase::AnswerRevealed(_))
    }

    /// Played keys in the order they were revealed.
    pub fn played(&self) -> &IndexSet<PlayedKey> {
        &self.played
    }

    /// Whether the question identified by `key` has been revealed since the last full reset.
    pub fn is_played(&self, key: &PlayedKey) -> bool {
        self.played.contains(key)
    }

    /// Apply `event`, returning the phase the machine landed in.
    pub fn apply(&mut self, event: RoundEvent) -> Result<&RoundPhase, InvalidTransition> {
        let next = self.compute_transition(event)?;
        if let RoundPhase::AnswerRevealed(question) = &next {
            self.played.insert(question.key());
        }
        self.phase = next;
        Ok(&self.phase)
    }

    /// Return to idle and forget every played question.
    pub fn full_reset(&mut self) {
        self.phase = RoundPhase::Idle;
        self.played.clear();
    }

    fn compute_transition(&self, event: RoundEvent) -> Result<RoundPhase, InvalidTransition> {
        let next = match (&self.phase, event) {
            (_, RoundEvent::SelectQuestion(question)) => RoundPhase::QuestionShown(question),
            (
                RoundPhase::QuestionShown(question) | RoundPhase::AnswerRevealed(question),
                RoundEvent::Reveal,
            ) => RoundPhase::AnswerRevealed(question.clone()),
            (_, RoundEvent::ResetRound) => RoundPhase::Idle,
            (from, event) => {
                return Err(InvalidTransition {
                    from: from.clone(),
                    event,
                });
            }
        };

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(prompt: &str, points: u32) -> Question {
        Question {
            category_name: "Math".into(),
            points,
            prompt: prompt.into(),
            answer: "4".into(),
        }
    }

    #[test]
    fn initial_state_is_idle() {
        let sm = RoundStateMachine::new();
        assert_eq!(sm.phase(), &RoundPhase::Idle);
        assert!(sm.current_question().is_none());
        assert!(sm.played().is_empty());
    }

    #[test]
    fn full_happy_path_through_round() {
        let mut sm = RoundStateMachine::new();
        let q = question("2+2", 100);

        assert_eq!(
            sm.apply(RoundEvent::SelectQuestion(q.clone())).unwrap(),
            &RoundPhase::QuestionShown(q.clone())
        );
        assert!(!sm.is_revealed());
        assert_eq!(
            sm.apply(RoundEvent::Reveal).unwrap(),
            &RoundPhase::AnswerRevealed(q.clone())
        );
        assert!(sm.is_played(&q.key()));
        assert_eq!(sm.apply(RoundEvent::ResetRound).unwrap(), &RoundPhase::Idle);
        assert!(sm.is_played(&q.key()));
    }

    #[test]
    fn selection_does_not_mark_played() {
        let mut sm = RoundStateMachine::new();
        sm.apply(RoundEvent::SelectQuestion(question("2+2", 100)))
            .unwrap();
        assert!(sm.played().is_empty());
    }

    #[test]
    fn reveal_without_question_is_rejected() {
        let mut sm = RoundStateMachine::new();
        let err = sm.apply(RoundEvent::Reveal).unwrap_err();
        assert_eq!(err.from, RoundPhase::Idle);
        assert_eq!(err.event, RoundEvent::Reveal);
        assert_eq!(sm.phase(), &RoundPhase::Idle);
        assert!(sm.played().is_empty());
    }

    #[test]
    fn select_replaces_revealed_question() {
        let mut sm = RoundStateMachine::new();
        let first = question("2+2", 100);
        let second = question("3+3", 200);
        sm.apply(RoundEvent::SelectQuestion(first.clone())).unwrap();
        sm.apply(RoundEvent::Reveal).unwrap();

        assert_eq!(
            sm.apply(RoundEvent::SelectQuestion(second.clone())).unwrap(),
            &RoundPhase::QuestionShown(second)
        );
        assert!(sm.is_played(&first.key()));
    }

    #[test]
    fn revisiting_a_played_question_keeps_single_mark() {
        let mut sm = RoundStateMachine::new();
        let q = question("2+2", 100);
        for _ in 0..2 {
            sm.apply(RoundEvent::SelectQuestion(q.clone())).unwrap();
            sm.apply(RoundEvent::Reveal).unwrap();
        }
        sm.apply(RoundEvent::Reveal).unwrap();
        assert_eq!(sm.played().len(), 1);
    }

    #[test]
    fn full_reset_forgets_played_keys() {
        let mut sm = RoundStateMachine::new();
        let q = question("2+2", 100);
        sm.apply(RoundEvent::SelectQuestion(q.clone())).unwrap();
        sm.apply(RoundEvent::Reveal).unwrap();

        sm.full_reset();
        assert_eq!(sm.phase(), &RoundPhase::Idle);
        assert!(!sm.is_played(&q.key()));
    }
}
