use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::model::ids::AssessmentId;
use crate::model::reward::RepeatAwardPolicy;

/// Learned words needed to fill the beginner level progress bar.
pub const DEFAULT_LEVEL_WORD_TARGET: u32 = 50;

/// What a single `apply_award` changed in the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardOutcome {
    pub assessment_id: AssessmentId,
    pub points_awarded: u32,
    pub first_completion: bool,
}

/// The single persisted progress ledger for an installation.
///
/// Serialized with camelCase keys. Missing fields default to zero so that
/// partially written or older records still load; `completedQuizzes` is read
/// as an alias of `completedAssessments`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProgress {
    total_points: u32,
    #[serde(alias = "completedQuizzes")]
    completed_assessments: BTreeSet<AssessmentId>,
    learned_words_count: u32,
    streak: u32,
    last_active_date: Option<NaiveDate>,
}

impl UserProgress {
    /// Rehydrate a record from persisted values.
    #[must_use]
    pub fn from_persisted(
        total_points: u32,
        completed_assessments: impl IntoIterator<Item = AssessmentId>,
        learned_words_count: u32,
        streak: u32,
        last_active_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            total_points,
            completed_assessments: completed_assessments.into_iter().collect(),
            learned_words_count,
            streak,
            last_active_date,
        }
    }

    #[must_use]
    pub fn total_points(&self) -> u32 {
        self.total_points
    }

    #[must_use]
    pub fn completed_assessments(&self) -> &BTreeSet<AssessmentId> {
        &self.completed_assessments
    }

    #[must_use]
    pub fn learned_words_count(&self) -> u32 {
        self.learned_words_count
    }

    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    #[must_use]
    pub fn last_active_date(&self) -> Option<NaiveDate> {
        self.last_active_date
    }

    #[must_use]
    pub fn has_completed(&self, id: &AssessmentId) -> bool {
        self.completed_assessments.contains(id)
    }

    /// Number of distinct assessments credited so far.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed_assessments.len()
    }

    /// Learned words as a share of `target`, rounded half up and capped at 100.
    #[must_use]
    pub fn level_progress_percent(&self, target: u32) -> u32 {
        if target == 0 {
            return 100;
        }
        let (n, t) = (u64::from(self.learned_words_count), u64::from(target));
        let ratio = (200 * n + t) / (2 * t);
        u32::try_from(ratio.min(100)).unwrap_or(100)
    }

    /// Credit a finished assessment.
    ///
    /// The id is added to the completed set if absent. Points are added on the
    /// first completion, and on repeats only under `RepeatAwardPolicy::EveryCompletion`.
    /// The call also counts as activity for `today`.
    pub fn apply_award(
        &mut self,
        id: &AssessmentId,
        points: u32,
        policy: RepeatAwardPolicy,
        today: NaiveDate,
    ) -> AwardOutcome {
        let first_completion = self.completed_assessments.insert(id.clone());
        let points_awarded = match (first_completion, policy) {
            (true, _) | (false, RepeatAwardPolicy::EveryCompletion) => points,
            (false, RepeatAwardPolicy::FirstCompletionOnly) => 0,
        };
        self.total_points = self.total_points.saturating_add(points_awarded);
        self.record_activity(today);

        AwardOutcome {
            assessment_id: id.clone(),
            points_awarded,
            first_completion,
        }
    }

    /// Overwrite the learned-word count. Not an increment.
    pub fn set_learned_words_count(&mut self, count: u32) {
        self.learned_words_count = count;
    }

    /// Update the daily streak for activity on `today`.
    pub fn record_activity(&mut self, today: NaiveDate) {
        self.streak = match self.last_active_date {
            Some(last) if last == today => self.streak.max(1),
            Some(last) if last.succ_opt() == Some(today) => self.streak.saturating_add(1),
            // first activity, a gap, or a clock that moved backwards
            _ => 1,
        };
        self.last_active_date = Some(today);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn default_is_all_zero() {
        let progress = UserProgress::default();
        assert_eq!(progress.total_points(), 0);
        assert!(progress.completed_assessments().is_empty());
        assert_eq!(progress.learned_words_count(), 0);
        assert_eq!(progress.streak(), 0);
        assert_eq!(progress.last_active_date(), None);
    }

    #[test]
    fn first_completion_only_does_not_re_award() {
        let mut progress = UserProgress::default();
        let id = AssessmentId::new("toBe");

        let first = progress.apply_award(&id, 190, RepeatAwardPolicy::FirstCompletionOnly, day(1));
        assert!(first.first_completion);
        assert_eq!(first.points_awarded, 190);

        let second =
            progress.apply_award(&id, 200, RepeatAwardPolicy::FirstCompletionOnly, day(1));
        assert!(!second.first_completion);
        assert_eq!(second.points_awarded, 0);

        assert_eq!(progress.total_points(), 190);
        assert_eq!(progress.completed_count(), 1);
    }

    #[test]
    fn every_completion_keeps_adding() {
        let mut progress = UserProgress::default();
        let id = AssessmentId::new("articles");

        progress.apply_award(&id, 100, RepeatAwardPolicy::EveryCompletion, day(1));
        let again = progress.apply_award(&id, 100, RepeatAwardPolicy::EveryCompletion, day(1));

        assert_eq!(again.points_awarded, 100);
        assert_eq!(progress.total_points(), 200);
        assert_eq!(progress.completed_count(), 1);
    }

    #[test]
    fn streak_follows_consecutive_days() {
        let mut progress = UserProgress::default();
        progress.record_activity(day(1));
        assert_eq!(progress.streak(), 1);
        progress.record_activity(day(1));
        assert_eq!(progress.streak(), 1);
        progress.record_activity(day(2));
        progress.record_activity(day(3));
        assert_eq!(progress.streak(), 3);
        progress.record_activity(day(6));
        assert_eq!(progress.streak(), 1);
        assert_eq!(progress.last_active_date(), Some(day(6)));
    }

    #[test]
    fn level_progress_is_capped() {
        let mut progress = UserProgress::default();
        progress.set_learned_words_count(10);
        assert_eq!(progress.level_progress_percent(DEFAULT_LEVEL_WORD_TARGET), 20);
        progress.set_learned_words_count(80);
        assert_eq!(progress.level_progress_percent(DEFAULT_LEVEL_WORD_TARGET), 100);
    }

    #[test]
    fn level_progress_rounds_to_nearest() {
        let mut progress = UserProgress::default();
        progress.set_learned_words_count(2);
        assert_eq!(progress.level_progress_percent(3), 67);
        progress.set_learned_words_count(1);
        assert_eq!(progress.level_progress_percent(3), 33);
        assert_eq!(progress.level_progress_percent(8), 13);
        progress.set_learned_words_count(49);
        assert_eq!(progress.level_progress_percent(DEFAULT_LEVEL_WORD_TARGET), 98);
    }

    #[test]
    fn json_shape_and_legacy_keys() {
        let progress = UserProgress::from_persisted(
            190,
            [AssessmentId::new("toBe")],
            3,
            2,
            Some(day(4)),
        );
        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(json["totalPoints"], 190);
        assert_eq!(json["completedAssessments"][0], "toBe");
        assert_eq!(json["lastActiveDate"], "2024-03-04");

        let legacy = r#"{"totalPoints":50,"completedQuizzes":["pronouns","pronouns"],"learnedWordsCount":4,"streak":0,"lastActiveDate":null}"#;
        let loaded: UserProgress = serde_json::from_str(legacy).unwrap();
        assert_eq!(loaded.total_points(), 50);
        assert_eq!(loaded.completed_count(), 1);
        assert_eq!(loaded.last_active_date(), None);

        let partial: UserProgress = serde_json::from_str(r#"{"totalPoints":7}"#).unwrap();
        assert_eq!(partial.total_points(), 7);
        assert_eq!(partial.learned_words_count(), 0);
    }
}
