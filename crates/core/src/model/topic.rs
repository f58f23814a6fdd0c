use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TopicError {
    #[error("topic id cannot be empty")]
    EmptyId,

    #[error("topic {topic_id} has no questions")]
    NoQuestions { topic_id: String },

    #[error("question {index} must offer at least two options")]
    TooFewOptions { index: usize },

    #[error("question {index} repeats option {option:?}")]
    DuplicateOption { index: usize, option: String },

    #[error("question {index}: correct option {option:?} is not among the options")]
    CorrectOptionMissing { index: usize, option: String },
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A multiple-choice question with exactly one correct option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    prompt: String,
    options: Vec<String>,
    correct_option: String,
}

impl Question {
    /// Build a question, checking that the options are distinct and contain the answer.
    ///
    /// `index` is only used to label errors.
    ///
    /// # Errors
    ///
    /// Returns `TopicError::TooFewOptions` for fewer than two options,
    /// `TopicError::DuplicateOption` when an option repeats, and
    /// `TopicError::CorrectOptionMissing` when the answer is not offered.
    pub fn new(
        index: usize,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_option: impl Into<String>,
    ) -> Result<Self, TopicError> {
        let correct_option = correct_option.into();
        if options.len() < 2 {
            return Err(TopicError::TooFewOptions { index });
        }
        let mut seen = HashSet::with_capacity(options.len());
        for option in &options {
            if !seen.insert(option.as_str()) {
                return Err(TopicError::DuplicateOption {
                    index,
                    option: option.clone(),
                });
            }
        }
        if !seen.contains(correct_option.as_str()) {
            return Err(TopicError::CorrectOptionMissing {
                index,
                option: correct_option,
            });
        }

        Ok(Self {
            prompt: prompt.into(),
            options,
            correct_option,
        })
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_option(&self) -> &str {
        &self.correct_option
    }

    /// Exact string comparison against the correct option.
    #[must_use]
    pub fn is_correct(&self, selected: &str) -> bool {
        self.correct_option == selected
    }
}

//
// ─── TOPIC ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated topic shape, as authored in a catalog file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopicDraft {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub questions: Vec<QuestionDraft>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionDraft {
    pub prompt: String,
    pub options: Vec<String>,
    #[serde(alias = "answer")]
    pub correct_option: String,
}

impl TopicDraft {
    /// Validate the draft into an immutable topic.
    ///
    /// # Errors
    ///
    /// Returns `TopicError` if the id is blank, there are no questions, or any
    /// question is malformed.
    pub fn validate(self) -> Result<AssessmentTopic, TopicError> {
        let id = self.id.trim().to_owned();
        if id.is_empty() {
            return Err(TopicError::EmptyId);
        }
        if self.questions.is_empty() {
            return Err(TopicError::NoQuestions { topic_id: id });
        }
        let questions = self
            .questions
            .into_iter()
            .enumerate()
            .map(|(index, q)| Question::new(index, q.prompt, q.options, q.correct_option))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AssessmentTopic {
            id,
            title: self.title,
            description: self.description,
            questions,
        })
    }
}

/// A named, ordered set of questions. Always holds at least one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TopicDraft")]
pub struct AssessmentTopic {
    id: String,
    title: String,
    description: String,
    questions: Vec<Question>,
}

impl TryFrom<TopicDraft> for AssessmentTopic {
    type Error = TopicError;

    fn try_from(draft: TopicDraft) -> Result<Self, Self::Error> {
        draft.validate()
    }
}

impl AssessmentTopic {
    /// Build a topic from already-validated questions.
    ///
    /// # Errors
    ///
    /// Returns `TopicError::EmptyId` or `TopicError::NoQuestions`.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        questions: Vec<Question>,
    ) -> Result<Self, TopicError> {
        let id = id.into().trim().to_owned();
        if id.is_empty() {
            return Err(TopicError::EmptyId);
        }
        if questions.is_empty() {
            return Err(TopicError::NoQuestions { topic_id: id });
        }
        Ok(Self {
            id,
            title: title.into(),
            description: description.into(),
            questions,
        })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false for a constructed topic; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
