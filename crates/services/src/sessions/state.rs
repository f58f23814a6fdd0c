use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use vocab_core::model::{AssessmentId, AssessmentMode, AssessmentTopic, Question, Score};

use super::progress::SessionProgress;
use crate::error::AssessmentError;
use crate::reconciler::SessionOutcome;

/// A question answered incorrectly, in the order it was encountered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mistake {
    pub prompt: String,
    pub correct_answer: String,
}

/// In-memory state of one assessment run.
///
/// Owned by exactly one caller and never persisted. Before completion
/// `correct_count + mistakes.len() == position` holds.
pub struct SessionState {
    topic: Arc<AssessmentTopic>,
    mode: AssessmentMode,
    order: Vec<usize>,
    position: usize,
    correct_count: u32,
    mistakes: Vec<Mistake>,
    outcome: Option<SessionOutcome>,
}

impl SessionState {
    pub(crate) fn new(topic: Arc<AssessmentTopic>, mode: AssessmentMode, order: Vec<usize>) -> Self {
        Self {
            topic,
            mode,
            order,
            position: 0,
            correct_count: 0,
            mistakes: Vec::new(),
            outcome: None,
        }
    }

    #[must_use]
    pub fn topic_id(&self) -> &str {
        self.topic.id()
    }

    #[must_use]
    pub fn topic(&self) -> &AssessmentTopic {
        &self.topic
    }

    #[must_use]
    pub fn mode(&self) -> AssessmentMode {
        self.mode
    }

    /// Identifier this session is credited under.
    #[must_use]
    pub fn assessment_id(&self) -> AssessmentId {
        AssessmentId::for_topic(self.mode, self.topic.id())
    }

    /// Question indices in the order they are asked.
    #[must_use]
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn mistakes(&self) -> &[Mistake] {
        &self.mistakes
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.position >= self.order.len()
    }

    /// Result recorded when the finished session was reconciled, if it was.
    #[must_use]
    pub fn outcome(&self) -> Option<&SessionOutcome> {
        self.outcome.as_ref()
    }

    /// Correct answers over the session's question count.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::Score` for a session without questions.
    pub fn score(&self) -> Result<Score, AssessmentError> {
        let total = u32::try_from(self.total()).unwrap_or(u32::MAX);
        Ok(Score::new(self.correct_count, total)?)
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.total(),
            answered: self.position,
            remaining: self.total().saturating_sub(self.position),
            correct: self.correct_count,
            is_complete: self.is_finished(),
        }
    }

    pub(crate) fn current(&self) -> Option<&Question> {
        let index = *self.order.get(self.position)?;
        self.topic.question(index)
    }

    pub(crate) fn record_correct(&mut self) {
        self.correct_count += 1;
        self.position += 1;
    }

    pub(crate) fn record_mistake(&mut self, mistake: Mistake) {
        self.mistakes.push(mistake);
        self.position += 1;
    }

    pub(crate) fn set_outcome(&mut self, outcome: SessionOutcome) {
        self.outcome = Some(outcome);
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("topic_id", &self.topic.id())
            .field("mode", &self.mode)
            .field("order", &self.order)
            .field("position", &self.position)
            .field("correct_count", &self.correct_count)
            .field("mistakes_len", &self.mistakes.len())
            .field("reconciled", &self.outcome.is_some())
            .finish()
    }
}
