use rand::Rng;
use rand::seq::SliceRandom;
use std::sync::Arc;

use vocab_core::TopicCatalog;
use vocab_core::model::{AssessmentMode, AssessmentTopic, Question, Score};

use super::state::{Mistake, SessionState};
use crate::error::AssessmentError;

//
// ─── ANSWER OUTCOME ────────────────────────────────────────────────────────────
//

/// Result of submitting one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub correct_answer: String,
    pub finished: bool,
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

/// Runs assessments from the topic catalog.
///
/// The engine itself is stateless; everything about a run lives in the
/// `SessionState` it hands out. Nothing here touches persistence.
#[derive(Clone)]
pub struct AssessmentEngine {
    topics: Arc<TopicCatalog>,
}

impl AssessmentEngine {
    #[must_use]
    pub fn new(topics: Arc<TopicCatalog>) -> Self {
        Self { topics }
    }

    #[must_use]
    pub fn topics(&self) -> &TopicCatalog {
        &self.topics
    }

    /// Start a standard-mode session with a freshly shuffled question order.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::UnknownTopic` if `topic_id` is not in the catalog.
    pub fn start(&self, topic_id: &str) -> Result<SessionState, AssessmentError> {
        self.start_with_rng(topic_id, AssessmentMode::Standard, &mut rand::rng())
    }

    /// Start a session in `mode`, shuffling with `rng`.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::UnknownTopic` if `topic_id` is not in the catalog.
    pub fn start_with_rng<R: Rng + ?Sized>(
        &self,
        topic_id: &str,
        mode: AssessmentMode,
        rng: &mut R,
    ) -> Result<SessionState, AssessmentError> {
        let topic = self
            .topics
            .get(topic_id)
            .ok_or_else(|| AssessmentError::UnknownTopic {
                topic_id: topic_id.to_owned(),
            })?;
        Ok(Self::start_topic(topic, mode, rng))
    }

    /// Start a session over a topic that is not part of the catalog,
    /// such as a generated vocabulary test.
    #[must_use]
    pub fn start_topic<R: Rng + ?Sized>(
        topic: Arc<AssessmentTopic>,
        mode: AssessmentMode,
        rng: &mut R,
    ) -> SessionState {
        let mut order: Vec<usize> = (0..topic.len()).collect();
        order.shuffle(rng);
        tracing::info!(
            topic_id = topic.id(),
            ?mode,
            questions = order.len(),
            "assessment session started"
        );
        SessionState::new(topic, mode, order)
    }

    /// The question the session is waiting on.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::SessionFinished` once every question was answered.
    pub fn current_question<'s>(
        &self,
        state: &'s SessionState,
    ) -> Result<&'s Question, AssessmentError> {
        state.current().ok_or(AssessmentError::SessionFinished)
    }

    /// Judge `selected` against the current question and advance.
    ///
    /// There is exactly one attempt per question: the position advances
    /// whether or not the answer was correct.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::SessionFinished` if no question is left.
    pub fn submit_answer(
        &self,
        state: &mut SessionState,
        selected: &str,
    ) -> Result<AnswerOutcome, AssessmentError> {
        let question = self.current_question(state)?;
        let is_correct = question.is_correct(selected);
        let correct_answer = question.correct_option().to_owned();

        if is_correct {
            state.record_correct();
        } else {
            let mistake = Mistake {
                prompt: question.prompt().to_owned(),
                correct_answer: correct_answer.clone(),
            };
            state.record_mistake(mistake);
        }

        let finished = state.is_finished();
        tracing::debug!(
            topic_id = state.topic_id(),
            position = state.position(),
            is_correct,
            finished,
            "answer submitted"
        );
        if finished {
            tracing::info!(
                topic_id = state.topic_id(),
                correct = state.correct_count(),
                total = state.total(),
                "assessment session finished"
            );
        }

        Ok(AnswerOutcome {
            is_correct,
            correct_answer,
            finished,
        })
    }

    /// Score correct answers against the session's question count.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::Score` for a session without questions.
    pub fn score(&self, state: &SessionState) -> Result<Score, AssessmentError> {
        state.score()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
