use std::mem;
use std::sync::Arc;

use vocab_core::WordBank;
use vocab_core::model::{AssessmentMode, Level, Question, WordItem};

use super::engine::AssessmentEngine;
use super::quiz_flow::AnswerFeedback;
use super::state::SessionState;
use super::vocabulary_test::build_vocabulary_topic;
use crate::error::FlowError;
use crate::reconciler::{ProgressReconciler, SessionOutcome};

/// Position in a level's card deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrowseCursor {
    pub level: Level,
    pub index: usize,
    /// Set once `next` is pressed on the last card.
    pub finished: bool,
}

impl BrowseCursor {
    #[must_use]
    pub fn start(level: Level) -> Self {
        Self {
            level,
            index: 0,
            finished: false,
        }
    }
}

#[derive(Debug)]
pub enum VocabularyPhase {
    Browsing(BrowseCursor),
    Testing { level: Level, session: SessionState },
    TestResult { level: Level, session: SessionState },
}

impl VocabularyPhase {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            VocabularyPhase::Browsing(_) => "browsing",
            VocabularyPhase::Testing { .. } => "testing",
            VocabularyPhase::TestResult { .. } => "showing test result",
        }
    }

    #[must_use]
    pub fn level(&self) -> Level {
        match self {
            VocabularyPhase::Browsing(cursor) => cursor.level,
            VocabularyPhase::Testing { level, .. }
            | VocabularyPhase::TestResult { level, .. } => *level,
        }
    }
}

/// Explicit state machine for the vocabulary screen: flash cards per level,
/// and a translation test over the level's words.
pub struct VocabularyFlow {
    words: Arc<WordBank>,
    engine: AssessmentEngine,
    reconciler: ProgressReconciler,
    mode: AssessmentMode,
    phase: VocabularyPhase,
}

impl VocabularyFlow {
    #[must_use]
    pub fn new(
        words: Arc<WordBank>,
        engine: AssessmentEngine,
        reconciler: ProgressReconciler,
        mode: AssessmentMode,
    ) -> Self {
        Self {
            words,
            engine,
            reconciler,
            mode,
            phase: VocabularyPhase::Browsing(BrowseCursor::start(Level::Beginner)),
        }
    }

    #[must_use]
    pub fn phase(&self) -> &VocabularyPhase {
        &self.phase
    }

    #[must_use]
    pub fn session(&self) -> Option<&SessionState> {
        match &self.phase {
            VocabularyPhase::Browsing(_) => None,
            VocabularyPhase::Testing { session, .. }
            | VocabularyPhase::TestResult { session, .. } => Some(session),
        }
    }

    /// The card under the cursor; `None` once the deck is finished or the
    /// level is empty.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::InvalidTransition` outside `Browsing`.
    pub fn current_word(&self) -> Result<Option<&WordItem>, FlowError> {
        let cursor = self.cursor("show a word")?;
        if cursor.finished {
            return Ok(None);
        }
        Ok(self.words.words(cursor.level).get(cursor.index))
    }

    /// # Errors
    ///
    /// Returns `FlowError::InvalidTransition` outside `Browsing`.
    pub fn next(&mut self) -> Result<BrowseCursor, FlowError> {
        let len = self.words.words(self.phase.level()).len();
        let cursor = self.cursor_mut("go to the next word")?;
        if cursor.index + 1 < len {
            cursor.index += 1;
        } else {
            cursor.finished = true;
        }
        Ok(*cursor)
    }

    /// # Errors
    ///
    /// Returns `FlowError::InvalidTransition` outside `Browsing`.
    pub fn prev(&mut self) -> Result<BrowseCursor, FlowError> {
        let cursor = self.cursor_mut("go to the previous word")?;
        cursor.index = cursor.index.saturating_sub(1);
        cursor.finished = false;
        Ok(*cursor)
    }

    /// Switch decks; the cursor restarts at the first card.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::InvalidTransition` outside `Browsing`.
    pub fn set_level(&mut self, level: Level) -> Result<BrowseCursor, FlowError> {
        let cursor = self.cursor_mut("switch level")?;
        *cursor = BrowseCursor::start(level);
        Ok(*cursor)
    }

    /// Start a translation test over the current level.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::InvalidTransition` outside `Browsing`, or
    /// `AssessmentError::NotEnoughWords` if the level cannot form a test.
    pub fn start_test(&mut self) -> Result<&SessionState, FlowError> {
        let level = self.cursor("start a test")?.level;
        let mut rng = rand::rng();
        let topic = build_vocabulary_topic(level, self.words.words(level), &mut rng)?;
        let session = AssessmentEngine::start_topic(Arc::new(topic), self.mode, &mut rng);
        self.phase = VocabularyPhase::Testing { level, session };
        self.session().ok_or_else(|| self.invalid("start a test"))
    }

    /// # Errors
    ///
    /// Returns `FlowError::InvalidTransition` outside `Testing`.
    pub fn current_question(&self) -> Result<&Question, FlowError> {
        match &self.phase {
            VocabularyPhase::Testing { session, .. } => {
                Ok(self.engine.current_question(session)?)
            }
            _ => Err(self.invalid("show a question")),
        }
    }

    /// Judge `selected`; the last answer moves to `TestResult` and reconciles.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::InvalidTransition` outside `Testing`, or
    /// `FlowError::Reconcile` if the award could not be persisted. The flow
    /// is in `TestResult` either way once the last question is answered.
    pub async fn answer(&mut self, selected: &str) -> Result<AnswerFeedback, FlowError> {
        let VocabularyPhase::Testing { session, .. } = &mut self.phase else {
            return Err(self.invalid("answer"));
        };
        let answer = self.engine.submit_answer(session, selected)?;
        if !answer.finished {
            return Ok(AnswerFeedback {
                answer,
                outcome: None,
            });
        }

        let placeholder = VocabularyPhase::Browsing(BrowseCursor::start(self.phase.level()));
        self.phase = match mem::replace(&mut self.phase, placeholder) {
            VocabularyPhase::Testing { level, session } => {
                VocabularyPhase::TestResult { level, session }
            }
            other => other,
        };
        let outcome = self.reconcile_result().await?;
        Ok(AnswerFeedback {
            answer,
            outcome: Some(outcome),
        })
    }

    /// Re-attempt an award whose write failed.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::InvalidTransition` unless a test result is shown
    /// without a recorded outcome.
    pub async fn retry_award(&mut self) -> Result<SessionOutcome, FlowError> {
        match &self.phase {
            VocabularyPhase::TestResult { session, .. } if session.outcome().is_none() => {}
            _ => return Err(self.invalid("retry the award")),
        }
        self.reconcile_result().await
    }

    /// Leave any test and return to the first card of the same level.
    pub fn back_to_browsing(&mut self) {
        self.phase = VocabularyPhase::Browsing(BrowseCursor::start(self.phase.level()));
    }

    async fn reconcile_result(&mut self) -> Result<SessionOutcome, FlowError> {
        let VocabularyPhase::TestResult { session, .. } = &mut self.phase else {
            return Err(self.invalid("reconcile"));
        };
        Ok(self.reconciler.reconcile(session).await?)
    }

    fn cursor(&self, action: &'static str) -> Result<&BrowseCursor, FlowError> {
        match &self.phase {
            VocabularyPhase::Browsing(cursor) => Ok(cursor),
            _ => Err(self.invalid(action)),
        }
    }

    fn cursor_mut(&mut self, action: &'static str) -> Result<&mut BrowseCursor, FlowError> {
        let state = self.phase.name();
        match &mut self.phase {
            VocabularyPhase::Browsing(cursor) => Ok(cursor),
            _ => Err(FlowError::InvalidTransition { state, action }),
        }
    }

    fn invalid(&self, action: &'static str) -> FlowError {
        FlowError::InvalidTransition {
            state: self.phase.name(),
            action,
        }
    }
}
