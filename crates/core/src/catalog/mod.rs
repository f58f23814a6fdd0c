//! Static, read-only content: the word bank and the assessment topics.
//!
//! Both catalogs are loaded once per process and shared behind `Arc`s.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::model::{AssessmentTopic, Level, WordId, WordItem};

const BUILTIN_TOPICS: &str = include_str!("../../data/topics.json");
const BUILTIN_WORDS: &str = include_str!("../../data/words.json");

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("invalid catalog json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate word id {0}")]
    DuplicateWord(WordId),

    #[error("duplicate topic id {0}")]
    DuplicateTopic(String),
}

//
// ─── WORD BANK ─────────────────────────────────────────────────────────────────
//

/// Vocabulary grouped by proficiency level, in authoring order.
#[derive(Debug, Clone, Default)]
pub struct WordBank {
    levels: BTreeMap<Level, Vec<WordItem>>,
    index: HashMap<WordId, (Level, usize)>,
}

impl WordBank {
    /// Build a bank from per-level word lists.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateWord` if an id appears twice anywhere in the bank.
    pub fn new(levels: impl IntoIterator<Item = (Level, Vec<WordItem>)>) -> Result<Self, CatalogError> {
        let levels: BTreeMap<Level, Vec<WordItem>> = levels.into_iter().collect();
        let mut index = HashMap::new();
        for (level, words) in &levels {
            for (pos, word) in words.iter().enumerate() {
                if index.insert(word.id(), (*level, pos)).is_some() {
                    return Err(CatalogError::DuplicateWord(word.id()));
                }
            }
        }
        Ok(Self { levels, index })
    }

    /// Parse a bank from `{"beginner": [...], "intermediate": [...], ...}`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` for malformed JSON or duplicate ids.
    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let levels: BTreeMap<Level, Vec<WordItem>> = serde_json::from_str(raw)?;
        Self::new(levels)
    }

    /// The bank shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the bundled data is invalid.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json_str(BUILTIN_WORDS)
    }

    /// Words for a level; empty if the level has no entries.
    #[must_use]
    pub fn words(&self, level: Level) -> &[WordItem] {
        self.levels.get(&level).map(Vec::as_slice).unwrap_or_default()
    }

    #[must_use]
    pub fn get(&self, id: WordId) -> Option<&WordItem> {
        let (level, pos) = self.index.get(&id)?;
        self.levels.get(level).and_then(|words| words.get(*pos))
    }

    #[must_use]
    pub fn level_of(&self, id: WordId) -> Option<Level> {
        self.index.get(&id).map(|(level, _)| *level)
    }

    pub fn levels(&self) -> impl Iterator<Item = Level> + '_ {
        self.levels.keys().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

//
// ─── TOPICS ────────────────────────────────────────────────────────────────────
//

#[derive(Deserialize)]
struct TopicFile {
    topics: Vec<AssessmentTopic>,
}

/// Ordered list of assessment topics, looked up by id.
#[derive(Debug, Clone, Default)]
pub struct TopicCatalog {
    topics: Vec<Arc<AssessmentTopic>>,
}

impl TopicCatalog {
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateTopic` if two topics share an id.
    pub fn new(topics: impl IntoIterator<Item = AssessmentTopic>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for topic in topics {
            if !seen.insert(topic.id().to_owned()) {
                return Err(CatalogError::DuplicateTopic(topic.id().to_owned()));
            }
            out.push(Arc::new(topic));
        }
        Ok(Self { topics: out })
    }

    /// Parse `{"topics": [...]}`; every topic is validated while decoding.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` for malformed JSON, invalid topics, or duplicate ids.
    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let file: TopicFile = serde_json::from_str(raw)?;
        Self::new(file.topics)
    }

    /// The grammar topics shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the bundled data is invalid.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json_str(BUILTIN_TOPICS)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<AssessmentTopic>> {
        self.topics.iter().find(|t| t.id() == id).cloned()
    }

    pub fn topics(&self) -> impl Iterator<Item = &AssessmentTopic> + '_ {
        self.topics.iter().map(Arc::as_ref)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}
