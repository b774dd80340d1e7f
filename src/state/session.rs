use rand::seq::IndexedRandom;
use thiserror::Error;

use crate::state::{
    ConnectionId,
    buzz_queue::{BuzzQueue, BuzzRejected},
    question::Question,
    registry::ParticipantRegistry,
    round::{InvalidTransition, RoundEvent, RoundPhase, RoundStateMachine},
    wheel::{WheelEffects, WheelKind, WheelState},
};

/// Mutations the session applies on behalf of clients.
///
/// Name claims, score updates and refresh requests do not touch the broadcast
/// state and are handled outside of [`Session::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// A participant signals in.
    Buzz {
        /// Claimed name of the participant.
        name: String,
    },
    /// Put a question on screen.
    SelectQuestion(Question),
    /// Show the answer of the current question.
    Reveal,
    /// Clear the current question, keeping played marks.
    ResetRound,
    /// Wipe round, played marks and participants.
    FullReset,
    /// Drop the current buzz leader.
    AdvanceBuzz,
    /// Empty the buzz queue and reopen buzzing.
    ResetBuzzer,
    /// Make the prompt text visible on displays.
    ShowPrompt,
    /// Show a wheel, or hide it with `None`.
    SetWheel(Option<WheelKind>),
    /// Spin the wheel currently shown.
    SpinWheel,
}

/// What an applied command changed, used to label the resulting broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    /// A new question is on screen.
    QuestionSelected,
    /// The answer is visible and the question marked as played.
    AnswerRevealed,
    /// The screen was cleared.
    RoundReset,
    /// Everything was wiped.
    FullReset,
    /// A participant joined the buzz queue.
    Buzzed {
        /// Participant that buzzed.
        name: String,
        /// Whether displays should play the buzzer alert.
        alert: bool,
    },
    /// The leader was removed from the queue.
    BuzzAdvanced {
        /// Participant that was dropped.
        name: String,
    },
    /// The buzz queue was emptied.
    BuzzerReset,
    /// The prompt text became visible.
    PromptShown,
    /// The wheel was shown or hidden.
    WheelChanged,
    /// The wheel landed on an effect.
    WheelSpun {
        /// Effect picked by the spin.
        effect: String,
    },
}

/// Intent dropped without touching the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectedIntent {
    /// Queue refused the buzz.
    #[error(transparent)]
    Buzz(#[from] BuzzRejected),
    /// The answer was revealed; buzzing reopens with the next question or a buzzer reset.
    #[error("buzzers are closed for the current question")]
    BuzzersClosed,
    /// Round phase does not allow the event.
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
    /// Command needs a question on screen.
    #[error("no question is on screen")]
    NoActiveQuestion,
    /// Nobody to advance past.
    #[error("the buzz queue is empty")]
    EmptyQueue,
    /// Spin requested while no wheel is shown.
    #[error("no wheel is shown")]
    NoWheel,
    /// Wheel has nothing to land on.
    #[error("no effects configured for the {0:?} wheel")]
    NoWheelEffects(WheelKind),
    /// Question is not part of the loaded bank.
    #[error("question `{prompt}` worth {points} is not in the question bank")]
    UnknownQuestion {
        /// Prompt sent by the client.
        prompt: String,
        /// Point value sent by the client.
        points: u32,
    },
    /// Name claim lost against an existing participant.
    #[error("name `{0}` is already taken")]
    NameTaken(String),
    /// Name is held by another live connection.
    #[error("name `{0}` belongs to another participant")]
    NotOwner(String),
    /// Sender lacks the moderator role.
    #[error("`{0}` requires the moderator role")]
    Forbidden(&'static str),
    /// Frame could not be parsed or failed validation.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

/// Authoritative game session: participants, buzz order, round and display flags.
#[derive(Debug, Clone)]
pub struct Session {
    registry: ParticipantRegistry,
    queue: BuzzQueue,
    round: RoundStateMachine,
    buzzers_open: bool,
    prompt_visible: bool,
    wheel: Option<WheelState>,
    wheel_effects: WheelEffects,
    version: u64,
}

impl Session {
    /// Create an empty session whose wheels land on `wheel_effects`.
    pub fn new(wheel_effects: WheelEffects) -> Self {
        Self {
            registry: ParticipantRegistry::new(),
            queue: BuzzQueue::new(),
            round: RoundStateMachine::new(),
            buzzers_open: true,
            prompt_visible: false,
            wheel: None,
            wheel_effects,
            version: 0,
        }
    }

    /// Counter bumped by every applied command.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Live participants.
    pub fn registry(&self) -> &ParticipantRegistry {
        &self.registry
    }

    /// Signal-in order for the current question.
    pub fn queue(&self) -> &BuzzQueue {
        &self.queue
    }

    /// Round phase and played marks.
    pub fn round(&self) -> &RoundStateMachine {
        &self.round
    }

    /// Whether buzzes are currently accepted.
    pub fn buzzers_open(&self) -> bool {
        self.buzzers_open
    }

    /// Whether displays may show the prompt text.
    pub fn prompt_visible(&self) -> bool {
        self.prompt_visible
    }

    /// Wheel shown on displays, if any.
    pub fn wheel(&self) -> Option<&WheelState> {
        self.wheel.as_ref()
    }

    /// Reserve `name` for the connection `owner`.
    pub fn claim(&mut self, name: &str, owner: ConnectionId) -> Result<(), RejectedIntent> {
        if self.registry.claim(name, owner) {
            Ok(())
        } else {
            Err(RejectedIntent::NameTaken(name.to_owned()))
        }
    }

    /// Check that `sender` may act under `name`.
    ///
    /// Unclaimed names pass; later steps decide what to do with them. A name held by a
    /// connection for which `is_live` returns false is handed over to `sender`, so a
    /// participant who reconnects keeps their retained name.
    pub fn authorize_holder(
        &mut self,
        name: &str,
        sender: ConnectionId,
        is_live: impl Fn(&ConnectionId) -> bool,
    ) -> Result<(), RejectedIntent> {
        match self.registry.owner(name) {
            None => Ok(()),
            Some(holder) if holder == sender => Ok(()),
            Some(holder) if is_live(&holder) => Err(RejectedIntent::NotOwner(name.to_owned())),
            Some(_) => {
                self.registry.transfer(name, sender);
                Ok(())
            }
        }
    }

    /// Release `name`; returns whether it was claimed.
    pub fn release(&mut self, name: &str) -> bool {
        self.registry.release(name)
    }

    /// Release every name still held by `owner`.
    pub fn release_owned_by(&mut self, owner: ConnectionId) -> Vec<String> {
        self.registry.release_owned_by(owner)
    }

    /// Apply `command` atomically. On error nothing changed.
    pub fn apply(&mut self, command: SessionCommand) -> Result<SessionChange, RejectedIntent> {
        let change = match command {
            SessionCommand::Buzz { name } => {
                if !self.buzzers_open {
                    return Err(RejectedIntent::BuzzersClosed);
                }
                self.queue.append(&self.registry, &name)?;
                let alert = matches!(self.round.phase(), RoundPhase::QuestionShown(_));
                SessionChange::Buzzed { name, alert }
            }
            SessionCommand::SelectQuestion(question) => {
                self.round.apply(RoundEvent::SelectQuestion(question))?;
                self.queue.clear();
                self.buzzers_open = true;
                self.prompt_visible = false;
                SessionChange::QuestionSelected
            }
            SessionCommand::Reveal => {
                self.round.apply(RoundEvent::Reveal)?;
                self.buzzers_open = false;
                SessionChange::AnswerRevealed
            }
            SessionCommand::ResetRound => {
                self.round.apply(RoundEvent::ResetRound)?;
                self.queue.clear();
                self.buzzers_open = true;
                self.prompt_visible = false;
                SessionChange::RoundReset
            }
            SessionCommand::FullReset => {
                self.round.full_reset();
                self.registry.clear();
                self.queue.clear();
                self.buzzers_open = true;
                self.prompt_visible = false;
                self.wheel = None;
                SessionChange::FullReset
            }
            SessionCommand::AdvanceBuzz => {
                let name = self.queue.pop_front().ok_or(RejectedIntent::EmptyQueue)?;
                SessionChange::BuzzAdvanced { name }
            }
            SessionCommand::ResetBuzzer => {
                self.queue.clear();
                self.buzzers_open = true;
                SessionChange::BuzzerReset
            }
            SessionCommand::ShowPrompt => {
                if self.round.current_question().is_none() {
                    return Err(RejectedIntent::NoActiveQuestion);
                }
                self.prompt_visible = true;
                SessionChange::PromptShown
            }
            SessionCommand::SetWheel(kind) => {
                self.wheel = kind.map(|kind| WheelState { kind, result: None });
                SessionChange::WheelChanged
            }
            SessionCommand::SpinWheel => {
                let wheel = self.wheel.as_mut().ok_or(RejectedIntent::NoWheel)?;
                let effect = self
                    .wheel_effects
                    .for_kind(wheel.kind)
                    .choose(&mut rand::rng())
                    .cloned()
                    .ok_or(RejectedIntent::NoWheelEffects(wheel.kind))?;
                wheel.result = Some(effect.clone());
                SessionChange::WheelSpun { effect }
            }
        };

        self.version += 1;
        Ok(change)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn question(prompt: &str, points: u32) -> Question {
        Question {
            category_name: "Math".into(),
            points,
            prompt: prompt.into(),
            answer: "4".into(),
        }
    }

    fn buzz(name: &str) -> SessionCommand {
        SessionCommand::Buzz { name: name.into() }
    }

    fn session() -> Session {
        Session::new(WheelEffects {
            good: vec!["Double points".into()],
            bad: vec![],
        })
    }

    #[test]
    fn full_game_scenario() {
        let mut session = session();
        let owner = Uuid::new_v4();
        assert!(session.claim("Red", owner).is_ok());
        assert!(session.claim("Blue", owner).is_ok());

        let q = question("2+2", 100);
        session
            .apply(SessionCommand::SelectQuestion(q.clone()))
            .unwrap();
        assert_eq!(session.round().current_question(), Some(&q));
        assert!(!session.round().is_revealed());
        assert!(session.queue().is_empty());

        session.apply(buzz("Red")).unwrap();
        session.apply(buzz("Blue")).unwrap();
        assert_eq!(
            session.apply(buzz("Red")),
            Err(RejectedIntent::Buzz(BuzzRejected::AlreadyQueued(
                "Red".into()
            )))
        );
        assert_eq!(session.queue().snapshot(), vec!["Red", "Blue"]);

        assert_eq!(
            session.apply(SessionCommand::Reveal),
            Ok(SessionChange::AnswerRevealed)
        );
        assert!(session.round().is_played(&q.key()));
        assert_eq!(session.round().played().len(), 1);

        session.apply(SessionCommand::ResetRound).unwrap();
        assert!(session.round().current_question().is_none());
        assert!(session.queue().is_empty());
        assert!(session.round().is_played(&q.key()));

        session.apply(SessionCommand::FullReset).unwrap();
        assert!(session.round().played().is_empty());
        assert!(!session.registry().contains("Red"));
        assert!(!session.registry().contains("Blue"));
    }

    #[test]
    fn rejected_commands_leave_state_untouched() {
        let mut session = session();
        let before = session.version();

        assert!(matches!(
            session.apply(SessionCommand::Reveal),
            Err(RejectedIntent::Transition(_))
        ));
        assert!(matches!(
            session.apply(buzz("Nobody")),
            Err(RejectedIntent::Buzz(BuzzRejected::UnknownParticipant(_)))
        ));
        assert_eq!(
            session.apply(SessionCommand::AdvanceBuzz),
            Err(RejectedIntent::EmptyQueue)
        );
        assert_eq!(
            session.apply(SessionCommand::ShowPrompt),
            Err(RejectedIntent::NoActiveQuestion)
        );
        assert_eq!(session.version(), before);
        assert!(!session.round().is_revealed());
    }

    #[test]
    fn buzz_alert_follows_question_presence() {
        let mut session = session();
        session.claim("Red", Uuid::new_v4()).unwrap();
        session.claim("Blue", Uuid::new_v4()).unwrap();

        assert_eq!(
            session.apply(buzz("Red")),
            Ok(SessionChange::Buzzed {
                name: "Red".into(),
                alert: false
            })
        );
        session
            .apply(SessionCommand::SelectQuestion(question("2+2", 100)))
            .unwrap();
        assert_eq!(
            session.apply(buzz("Blue")),
            Ok(SessionChange::Buzzed {
                name: "Blue".into(),
                alert: true
            })
        );
    }

    #[test]
    fn reveal_closes_buzzers_until_next_question() {
        let mut session = session();
        session.claim("Red", Uuid::new_v4()).unwrap();
        session
            .apply(SessionCommand::SelectQuestion(question("2+2", 100)))
            .unwrap();
        session.apply(SessionCommand::Reveal).unwrap();

        assert!(!session.buzzers_open());
        assert_eq!(session.apply(buzz("Red")), Err(RejectedIntent::BuzzersClosed));

        session.apply(SessionCommand::ResetBuzzer).unwrap();
        assert!(session.buzzers_open());
        assert!(session.apply(buzz("Red")).is_ok());

        session.apply(SessionCommand::Reveal).unwrap();
        session
            .apply(SessionCommand::SelectQuestion(question("3+3", 200)))
            .unwrap();
        assert!(session.buzzers_open());
        assert!(session.queue().is_empty());
    }

    #[test]
    fn advance_pops_leader() {
        let mut session = session();
        session.claim("Red", Uuid::new_v4()).unwrap();
        session.claim("Blue", Uuid::new_v4()).unwrap();
        session.apply(buzz("Red")).unwrap();
        session.apply(buzz("Blue")).unwrap();

        assert_eq!(
            session.apply(SessionCommand::AdvanceBuzz),
            Ok(SessionChange::BuzzAdvanced { name: "Red".into() })
        );
        assert_eq!(session.queue().snapshot(), vec!["Blue"]);
    }

    #[test]
    fn prompt_visibility_resets_with_question() {
        let mut session = session();
        session
            .apply(SessionCommand::SelectQuestion(question("2+2", 100)))
            .unwrap();
        session.apply(SessionCommand::ShowPrompt).unwrap();
        assert!(session.prompt_visible());

        session
            .apply(SessionCommand::SelectQuestion(question("3+3", 200)))
            .unwrap();
        assert!(!session.prompt_visible());
    }

    #[test]
    fn wheel_spins_only_when_shown_and_stocked() {
        let mut session = session();
        assert_eq!(
            session.apply(SessionCommand::SpinWheel),
            Err(RejectedIntent::NoWheel)
        );

        session
            .apply(SessionCommand::SetWheel(Some(WheelKind::Good)))
            .unwrap();
        assert_eq!(
            session.apply(SessionCommand::SpinWheel),
            Ok(SessionChange::WheelSpun {
                effect: "Double points".into()
            })
        );
        assert_eq!(
            session.wheel().and_then(|wheel| wheel.result.as_deref()),
            Some("Double points")
        );

        session
            .apply(SessionCommand::SetWheel(Some(WheelKind::Bad)))
            .unwrap();
        assert_eq!(
            session.apply(SessionCommand::SpinWheel),
            Err(RejectedIntent::NoWheelEffects(WheelKind::Bad))
        );

        session.apply(SessionCommand::SetWheel(None)).unwrap();
        assert!(session.wheel().is_none());
    }

    #[test]
    fn full_reset_frees_names_for_new_claims() {
        let mut session = session();
        session.claim("Red", Uuid::new_v4()).unwrap();
        session
            .apply(SessionCommand::SetWheel(Some(WheelKind::Good)))
            .unwrap();
        session.apply(SessionCommand::FullReset).unwrap();

        assert!(session.wheel().is_none());
        assert!(session.claim("Red", Uuid::new_v4()).is_ok());
    }

    #[test]
    fn duplicate_claim_is_rejected() {
        let mut session = session();
        session.claim("Red", Uuid::new_v4()).unwrap();
        assert_eq!(
            session.claim("Red", Uuid::new_v4()),
            Err(RejectedIntent::NameTaken("Red".into()))
        );
    }

    #[test]
    fn holder_check_refuses_live_foreign_owner() {
        let mut session = session();
        let red = Uuid::new_v4();
        let mallory = Uuid::new_v4();
        session.claim("Red", red).unwrap();

        assert_eq!(
            session.authorize_holder("Red", mallory, |_| true),
            Err(RejectedIntent::NotOwner("Red".into()))
        );
        assert!(session.authorize_holder("Red", red, |_| true).is_ok());
        assert!(session.authorize_holder("Ghost", mallory, |_| true).is_ok());
        assert_eq!(session.registry().owner("Red"), Some(red));
    }

    #[test]
    fn holder_check_adopts_names_of_dropped_connections() {
        let mut session = session();
        let before = Uuid::new_v4();
        let after = Uuid::new_v4();
        session.claim("Red", before).unwrap();

        assert!(session.authorize_holder("Red", after, |_| false).is_ok());
        assert_eq!(session.registry().owner("Red"), Some(after));
    }
}
