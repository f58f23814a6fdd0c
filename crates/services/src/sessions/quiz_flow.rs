use std::mem;

use vocab_core::model::{AssessmentMode, Question};

use super::engine::{AnswerOutcome, AssessmentEngine};
use super::state::SessionState;
use crate::error::FlowError;
use crate::reconciler::{ProgressReconciler, SessionOutcome};

/// Result of answering one question through a flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub answer: AnswerOutcome,
    /// Set on the answer that finished the session.
    pub outcome: Option<SessionOutcome>,
}

/// Topic select, then a running quiz, then its result.
#[derive(Debug, Default)]
pub enum QuizPhase {
    #[default]
    Selecting,
    InProgress(SessionState),
    Finished(SessionState),
}

impl QuizPhase {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            QuizPhase::Selecting => "selecting",
            QuizPhase::InProgress(_) => "in progress",
            QuizPhase::Finished(_) => "finished",
        }
    }
}

/// Explicit state machine for the grammar quiz screen.
///
/// A rejected action leaves the phase unchanged.
pub struct QuizFlow {
    engine: AssessmentEngine,
    reconciler: ProgressReconciler,
    mode: AssessmentMode,
    phase: QuizPhase,
}

impl QuizFlow {
    #[must_use]
    pub fn new(engine: AssessmentEngine, reconciler: ProgressReconciler, mode: AssessmentMode) -> Self {
        Self {
            engine,
            reconciler,
            mode,
            phase: QuizPhase::Selecting,
        }
    }

    #[must_use]
    pub fn phase(&self) -> &QuizPhase {
        &self.phase
    }

    #[must_use]
    pub fn mode(&self) -> AssessmentMode {
        self.mode
    }

    /// The running or finished session, if any.
    #[must_use]
    pub fn session(&self) -> Option<&SessionState> {
        match &self.phase {
            QuizPhase::Selecting => None,
            QuizPhase::InProgress(state) | QuizPhase::Finished(state) => Some(state),
        }
    }

    /// # Errors
    ///
    /// Returns `FlowError::InvalidTransition` outside `Selecting`, or
    /// `AssessmentError::UnknownTopic` for an id not in the catalog.
    pub fn select_topic(&mut self, topic_id: &str) -> Result<&SessionState, FlowError> {
        if !matches!(self.phase, QuizPhase::Selecting) {
            return Err(self.invalid("select a topic"));
        }
        let state = self
            .engine
            .start_with_rng(topic_id, self.mode, &mut rand::rng())?;
        self.phase = QuizPhase::InProgress(state);
        self.session().ok_or_else(|| self.invalid("select a topic"))
    }

    /// # Errors
    ///
    /// Returns `FlowError::InvalidTransition` unless a quiz is in progress.
    pub fn current_question(&self) -> Result<&Question, FlowError> {
        match &self.phase {
            QuizPhase::InProgress(state) => Ok(self.engine.current_question(state)?),
            _ => Err(self.invalid("show a question")),
        }
    }

    /// Judge `selected`; the answer that completes the quiz moves the flow to
    /// `Finished` and reconciles the session.
    ///
    /// If reconciling fails the flow is still `Finished` and the error is
    /// returned; `retry_award` tries again.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::InvalidTransition` unless a quiz is in progress, or
    /// `FlowError::Reconcile` if the award could not be persisted.
    pub async fn answer(&mut self, selected: &str) -> Result<AnswerFeedback, FlowError> {
        let QuizPhase::InProgress(state) = &mut self.phase else {
            return Err(self.invalid("answer"));
        };
        let answer = self.engine.submit_answer(state, selected)?;
        if !answer.finished {
            return Ok(AnswerFeedback {
                answer,
                outcome: None,
            });
        }

        self.phase = match mem::take(&mut self.phase) {
            QuizPhase::InProgress(state) => QuizPhase::Finished(state),
            other => other,
        };
        let outcome = self.reconcile_finished().await?;
        Ok(AnswerFeedback {
            answer,
            outcome: Some(outcome),
        })
    }

    /// Re-attempt an award whose write failed.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::InvalidTransition` unless the flow is `Finished`
    /// without a recorded outcome, or `FlowError::Reconcile` if the write fails again.
    pub async fn retry_award(&mut self) -> Result<SessionOutcome, FlowError> {
        match &self.phase {
            QuizPhase::Finished(state) if state.outcome().is_none() => {}
            _ => return Err(self.invalid("retry the award")),
        }
        self.reconcile_finished().await
    }

    /// Start the same topic again with a fresh order.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::InvalidTransition` from `Selecting`.
    pub fn restart(&mut self) -> Result<&SessionState, FlowError> {
        let Some(current) = self.session() else {
            return Err(self.invalid("restart"));
        };
        let topic_id = current.topic_id().to_owned();
        let state = self
            .engine
            .start_with_rng(&topic_id, self.mode, &mut rand::rng())?;
        self.phase = QuizPhase::InProgress(state);
        self.session().ok_or_else(|| self.invalid("restart"))
    }

    /// Drop any session and return to topic select. Nothing is persisted.
    pub fn back_to_topics(&mut self) {
        if let Some(state) = self.session() {
            tracing::debug!(
                topic_id = state.topic_id(),
                position = state.position(),
                "leaving quiz"
            );
        }
        self.phase = QuizPhase::Selecting;
    }

    async fn reconcile_finished(&mut self) -> Result<SessionOutcome, FlowError> {
        let QuizPhase::Finished(state) = &mut self.phase else {
            return Err(self.invalid("reconcile"));
        };
        Ok(self.reconciler.reconcile(state).await?)
    }

    fn invalid(&self, action: &'static str) -> FlowError {
        FlowError::InvalidTransition {
            state: self.phase.name(),
            action,
        }
    }
}
