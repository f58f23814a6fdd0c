use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a word within the word bank
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordId(u64);

impl WordId {
    /// Creates a new `WordId`
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying u64 value
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for WordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WordId({})", self.0)
    }
}

impl fmt::Display for WordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(WordId::new)
    }
}

//
// ─── ASSESSMENT IDENTIFIERS ────────────────────────────────────────────────────
//

/// Which variant of a topic is being run.
///
/// Modes are credited independently: the same topic completed in `Mastery`
/// mode produces a different `AssessmentId` than in `Standard` mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentMode {
    #[default]
    Standard,
    Mastery,
}

impl AssessmentMode {
    const MASTERY_PREFIX: &'static str = "mastery:";

    fn prefix(self) -> &'static str {
        match self {
            Self::Standard => "",
            Self::Mastery => Self::MASTERY_PREFIX,
        }
    }
}

/// Identifier under which a completed assessment is credited in the ledger.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssessmentId(String);

impl AssessmentId {
    /// Wraps an already-namespaced identifier as read back from storage.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Builds the identifier for a topic run in the given mode.
    #[must_use]
    pub fn for_topic(mode: AssessmentMode, topic_id: &str) -> Self {
        Self(format!("{}{topic_id}", mode.prefix()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when this identifier was produced for mastery mode.
    #[must_use]
    pub fn is_mastery(&self) -> bool {
        self.0.starts_with(AssessmentMode::MASTERY_PREFIX)
    }
}

impl fmt::Debug for AssessmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssessmentId({})", self.0)
    }
}

impl fmt::Display for AssessmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
