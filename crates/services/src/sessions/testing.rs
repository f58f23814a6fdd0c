//! Fixtures shared by the unit tests of this crate.

use std::sync::Arc;

use vocab_core::TopicCatalog;
use vocab_core::model::{AssessmentTopic, QuestionDraft, TopicDraft};

use super::engine::AssessmentEngine;
use super::state::SessionState;

/// A topic of `n` two-option questions whose right answer is `right<i>`.
pub(crate) fn topic(id: &str, n: usize) -> AssessmentTopic {
    TopicDraft {
        id: id.to_owned(),
        title: id.to_owned(),
        description: String::new(),
        questions: (0..n)
            .map(|i| QuestionDraft {
                prompt: format!("Q{i}"),
                options: vec![format!("right{i}"), format!("wrong{i}")],
                correct_option: format!("right{i}"),
            })
            .collect(),
    }
    .validate()
    .unwrap()
}

pub(crate) fn engine_with(topics: &[(&str, usize)]) -> AssessmentEngine {
    let catalog = TopicCatalog::new(topics.iter().map(|(id, n)| topic(id, *n))).unwrap();
    AssessmentEngine::new(Arc::new(catalog))
}

/// Answer every remaining question, the first `correct` of them right.
pub(crate) fn play(engine: &AssessmentEngine, state: &mut SessionState, correct: usize) {
    let mut answered = 0;
    while !state.is_finished() {
        let question = engine.current_question(state).unwrap();
        let choice = if answered < correct {
            question.correct_option().to_owned()
        } else {
            "nope".to_owned()
        };
        engine.submit_answer(state, &choice).unwrap();
        answered += 1;
    }
}
