use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::WordId;

/// Proficiency level a word bank section belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Beginner, Level::Intermediate, Level::Advanced];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Beginner => "beginner",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown level: {0}")]
pub struct UnknownLevel(pub String);

impl FromStr for Level {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Level::Beginner),
            "intermediate" => Ok(Level::Intermediate),
            "advanced" => Ok(Level::Advanced),
            other => Err(UnknownLevel(other.to_owned())),
        }
    }
}

/// A single vocabulary entry.
///
/// Immutable once loaded; the legacy storage keys (`wordEng`, `wordUA`,
/// `transcription`) are accepted when reading saved favorites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordItem {
    id: WordId,
    #[serde(alias = "wordEng")]
    headword: String,
    #[serde(alias = "wordUA")]
    translation: String,
    #[serde(alias = "transcription", default)]
    phonetic: String,
    #[serde(default)]
    example: String,
}

impl WordItem {
    #[must_use]
    pub fn new(
        id: WordId,
        headword: impl Into<String>,
        translation: impl Into<String>,
        phonetic: impl Into<String>,
        example: impl Into<String>,
    ) -> Self {
        Self {
            id,
            headword: headword.into(),
            translation: translation.into(),
            phonetic: phonetic.into(),
            example: example.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> WordId {
        self.id
    }

    #[must_use]
    pub fn headword(&self) -> &str {
        &self.headword
    }

    #[must_use]
    pub fn translation(&self) -> &str {
        &self.translation
    }

    #[must_use]
    pub fn phonetic(&self) -> &str {
        &self.phonetic
    }

    #[must_use]
    pub fn example(&self) -> &str {
        &self.example
    }
}
