mod engine;
mod progress;
mod quiz_flow;
mod state;
mod vocabulary_flow;
mod vocabulary_test;

#[cfg(test)]
pub(crate) mod testing;

// Public API of the session subsystem.
pub use engine::{AnswerOutcome, AssessmentEngine};
pub use progress::SessionProgress;
pub use quiz_flow::{AnswerFeedback, QuizFlow, QuizPhase};
pub use state::{Mistake, SessionState};
pub use vocabulary_flow::{BrowseCursor, VocabularyFlow, VocabularyPhase};
pub use vocabulary_test::{DISTRACTORS_PER_QUESTION, build_vocabulary_topic, vocabulary_topic_id};
