use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::model::score::Score;

pub const DEFAULT_PASS_THRESHOLD_PERCENT: u32 = 90;
pub const DEFAULT_BASE_AWARD: u32 = 100;
pub const DEFAULT_PER_CORRECT_BONUS: u32 = 10;

/// Whether a qualifying run of an already-credited assessment earns points again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatAwardPolicy {
    /// Points are credited the first time an assessment id is completed only.
    #[default]
    FirstCompletionOnly,
    /// Every qualifying run is credited.
    EveryCompletion,
}

impl FromStr for RepeatAwardPolicy {
    type Err = RewardPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "once" | "first" | "first_completion_only" => Ok(Self::FirstCompletionOnly),
            "every" | "always" | "every_completion" => Ok(Self::EveryCompletion),
            other => Err(RewardPolicyError::UnknownRepeatPolicy(other.to_owned())),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RewardPolicyError {
    #[error("pass threshold must be between 1 and 100, got {0}")]
    InvalidThreshold(u32),

    #[error("unknown repeat award policy: {0}")]
    UnknownRepeatPolicy(String),
}

/// Rules for turning a finished session's score into XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardPolicy {
    pass_threshold_percent: u32,
    base_award: u32,
    per_correct_bonus: u32,
    repeat_awards: RepeatAwardPolicy,
}

/// Optional overrides; missing fields fall back to the defaults.
#[derive(Debug, Clone, Default)]
pub struct RewardPolicyDraft {
    pub pass_threshold_percent: Option<u32>,
    pub base_award: Option<u32>,
    pub per_correct_bonus: Option<u32>,
    pub repeat_awards: Option<RepeatAwardPolicy>,
}

impl RewardPolicyDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the draft into a usable policy.
    ///
    /// # Errors
    ///
    /// Returns `RewardPolicyError::InvalidThreshold` if the threshold is outside `1..=100`.
    pub fn validate(self) -> Result<RewardPolicy, RewardPolicyError> {
        let pass_threshold_percent = self
            .pass_threshold_percent
            .unwrap_or(DEFAULT_PASS_THRESHOLD_PERCENT);
        if !(1..=100).contains(&pass_threshold_percent) {
            return Err(RewardPolicyError::InvalidThreshold(pass_threshold_percent));
        }

        Ok(RewardPolicy {
            pass_threshold_percent,
            base_award: self.base_award.unwrap_or(DEFAULT_BASE_AWARD),
            per_correct_bonus: self.per_correct_bonus.unwrap_or(DEFAULT_PER_CORRECT_BONUS),
            repeat_awards: self.repeat_awards.unwrap_or_default(),
        })
    }
}

impl RewardPolicy {
    #[must_use]
    pub fn pass_threshold_percent(&self) -> u32 {
        self.pass_threshold_percent
    }

    #[must_use]
    pub fn base_award(&self) -> u32 {
        self.base_award
    }

    #[must_use]
    pub fn per_correct_bonus(&self) -> u32 {
        self.per_correct_bonus
    }

    #[must_use]
    pub fn repeat_awards(&self) -> RepeatAwardPolicy {
        self.repeat_awards
    }

    #[must_use]
    pub fn with_repeat_awards(mut self, repeat_awards: RepeatAwardPolicy) -> Self {
        self.repeat_awards = repeat_awards;
        self
    }

    #[must_use]
    pub fn qualifies(&self, score: &Score) -> bool {
        score.percentage() >= self.pass_threshold_percent
    }

    /// Points earned by `score`, or `None` below the pass threshold.
    #[must_use]
    pub fn award_for(&self, score: &Score) -> Option<u32> {
        if !self.qualifies(score) {
            return None;
        }
        let bonus = score.correct().saturating_mul(self.per_correct_bonus);
        Some(self.base_award.saturating_add(bonus))
    }
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self {
            pass_threshold_percent: DEFAULT_PASS_THRESHOLD_PERCENT,
            base_award: DEFAULT_BASE_AWARD,
            per_correct_bonus: DEFAULT_PER_CORRECT_BONUS,
            repeat_awards: RepeatAwardPolicy::default(),
        }
    }
}
