use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoreError {
    #[error("cannot score a session with no questions")]
    EmptySession,

    #[error("correct answers ({correct}) exceed total ({total})")]
    CorrectExceedsTotal { correct: u32, total: u32 },
}

/// Result of a finished (or in-progress) assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Score {
    correct: u32,
    total: u32,
    percentage: u32,
}

impl Score {
    /// Compute a score, rounding the percentage half-up to the nearest integer.
    ///
    /// # Errors
    ///
    /// Returns `ScoreError::EmptySession` when `total` is zero and
    /// `ScoreError::CorrectExceedsTotal` when `correct > total`.
    pub fn new(correct: u32, total: u32) -> Result<Self, ScoreError> {
        if total == 0 {
            return Err(ScoreError::EmptySession);
        }
        if correct > total {
            return Err(ScoreError::CorrectExceedsTotal { correct, total });
        }

        // round(100 * c / t) in integer arithmetic
        let (c, t) = (u64::from(correct), u64::from(total));
        let rounded = (200 * c + t) / (2 * t);
        let percentage = u32::try_from(rounded).unwrap_or(100);

        Ok(Self {
            correct,
            total,
            percentage,
        })
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Accuracy in the range `0..=100`.
    #[must_use]
    pub fn percentage(&self) -> u32 {
        self.percentage
    }

    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.correct == self.total
    }
}
