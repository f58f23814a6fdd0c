use vocab_core::model::{AssessmentId, AwardOutcome, FavoriteSet, RewardPolicy, Score, UserProgress};

use crate::error::{AssessmentError, ProgressError, ReconcileError};
use crate::progress_store::ProgressStore;
use crate::sessions::SessionState;

/// What reconciling a finished session produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub assessment_id: AssessmentId,
    pub score: Score,
    /// `None` when the score was below the pass threshold.
    pub award: Option<AwardOutcome>,
    /// Ledger after the award; absent when nothing was written.
    pub progress: Option<UserProgress>,
}

impl SessionOutcome {
    #[must_use]
    pub fn qualified(&self) -> bool {
        self.award.is_some()
    }

    #[must_use]
    pub fn points_awarded(&self) -> u32 {
        self.award.as_ref().map_or(0, |a| a.points_awarded)
    }
}

/// Turns finished sessions into XP on the progress ledger.
#[derive(Clone)]
pub struct ProgressReconciler {
    store: ProgressStore,
    policy: RewardPolicy,
}

impl ProgressReconciler {
    #[must_use]
    pub fn new(store: ProgressStore, policy: RewardPolicy) -> Self {
        Self { store, policy }
    }

    #[must_use]
    pub fn policy(&self) -> &RewardPolicy {
        &self.policy
    }

    #[must_use]
    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    /// Points `score` would earn, or `None` below the threshold. Pure.
    #[must_use]
    pub fn evaluate(&self, score: &Score) -> Option<u32> {
        self.policy.award_for(score)
    }

    /// Evaluate a finished session and merge its award, once.
    ///
    /// The outcome is cached on the session; calling this again returns it
    /// without touching the store. If the write fails nothing is cached, so
    /// the call can be retried.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::SessionInProgress` if questions remain, or
    /// `ProgressError::StorageUnavailable` if the award could not be persisted.
    pub async fn reconcile(&self, state: &mut SessionState) -> Result<SessionOutcome, ReconcileError> {
        if let Some(outcome) = state.outcome() {
            return Ok(outcome.clone());
        }
        if !state.is_finished() {
            return Err(AssessmentError::SessionInProgress.into());
        }

        let score = state.score()?;
        let assessment_id = state.assessment_id();
        let outcome = match self.evaluate(&score) {
            Some(points) => {
                let receipt = self.store.merge_award(&assessment_id, points).await?;
                SessionOutcome {
                    assessment_id,
                    score,
                    award: Some(receipt.outcome),
                    progress: Some(receipt.progress),
                }
            }
            None => {
                tracing::info!(
                    assessment_id = %assessment_id,
                    percentage = score.percentage(),
                    threshold = self.policy.pass_threshold_percent(),
                    "session below pass threshold, no award"
                );
                SessionOutcome {
                    assessment_id,
                    score,
                    award: None,
                    progress: None,
                }
            }
        };

        state.set_outcome(outcome.clone());
        Ok(outcome)
    }

    /// Set the learned-word count to the size of `favorites`.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::StorageUnavailable` if the ledger cannot be updated.
    pub async fn sync_learned_words(&self, favorites: &FavoriteSet) -> Result<UserProgress, ProgressError> {
        let count = u32::try_from(favorites.len()).unwrap_or(u32::MAX);
        self.store.set_learned_words_count(count).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use storage::InMemoryStore;
    use vocab_core::model::{
        AssessmentMode, RepeatAwardPolicy, RewardPolicyDraft, WordId, WordItem,
    };
    use vocab_core::time::fixed_clock;

    use crate::sessions::testing::{engine_with, play};

    fn reconciler(mem: &InMemoryStore) -> ProgressReconciler {
        let store = ProgressStore::new(fixed_clock(), Arc::new(mem.clone()));
        ProgressReconciler::new(store, RewardPolicy::default())
    }

    #[tokio::test]
    async fn nine_of_ten_awards_190() {
        let mem = InMemoryStore::new();
        let reconciler = reconciler(&mem);
        let engine = engine_with(&[("toBe", 10)]);
        let mut state = engine.start("toBe").unwrap();
        play(&engine, &mut state, 9);

        let outcome = reconciler.reconcile(&mut state).await.unwrap();

        assert_eq!(outcome.score.percentage(), 90);
        assert!(outcome.qualified());
        assert_eq!(outcome.points_awarded(), 190);
        let progress = reconciler.store().read().await;
        assert_eq!(progress.total_points(), 190);
        assert!(progress.has_completed(&AssessmentId::new("toBe")));
    }

    #[tokio::test]
    async fn eight_of_ten_leaves_the_store_untouched() {
        let mem = InMemoryStore::new();
        let reconciler = reconciler(&mem);
        let engine = engine_with(&[("toBe", 10)]);
        let mut state = engine.start("toBe").unwrap();
        play(&engine, &mut state, 8);

        let outcome = reconciler.reconcile(&mut state).await.unwrap();

        assert!(!outcome.qualified());
        assert_eq!(outcome.score.percentage(), 80);
        assert_eq!(state.mistakes().len(), 2);
        assert_eq!(reconciler.store().read().await, UserProgress::default());
    }

    #[test]
    fn threshold_boundary() {
        let reconciler = reconciler(&InMemoryStore::new());
        assert_eq!(reconciler.evaluate(&Score::new(90, 100).unwrap()), Some(1000));
        assert_eq!(reconciler.evaluate(&Score::new(89, 100).unwrap()), None);
    }

    #[tokio::test]
    async fn reconciles_exactly_once() {
        let mem = InMemoryStore::new();
        let store = ProgressStore::new(fixed_clock(), Arc::new(mem.clone()))
            .with_repeat_awards(RepeatAwardPolicy::EveryCompletion);
        let reconciler = ProgressReconciler::new(store, RewardPolicy::default());
        let engine = engine_with(&[("pronouns", 4)]);
        let mut state = engine.start("pronouns").unwrap();
        play(&engine, &mut state, 4);

        let first = reconciler.reconcile(&mut state).await.unwrap();
        let second = reconciler.reconcile(&mut state).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(reconciler.store().read().await.total_points(), 140);
    }

    #[tokio::test]
    async fn unfinished_session_is_rejected() {
        let reconciler = reconciler(&InMemoryStore::new());
        let engine = engine_with(&[("articles", 3)]);
        let mut state = engine.start("articles").unwrap();

        let err = reconciler.reconcile(&mut state).await.unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::Assessment(AssessmentError::SessionInProgress)
        ));
        assert!(state.outcome().is_none());
    }

    #[tokio::test]
    async fn failed_write_can_be_retried() {
        let mem = InMemoryStore::new();
        let reconciler = reconciler(&mem);
        let engine = engine_with(&[("toBe", 5)]);
        let mut state = engine.start("toBe").unwrap();
        play(&engine, &mut state, 5);

        mem.set_fail_writes(true);
        let err = reconciler.reconcile(&mut state).await.unwrap_err();
        assert!(matches!(err, ReconcileError::Progress(_)));
        assert!(state.outcome().is_none());

        mem.set_fail_writes(false);
        let outcome = reconciler.reconcile(&mut state).await.unwrap();
        assert_eq!(outcome.points_awarded(), 150);
        assert_eq!(reconciler.store().read().await.total_points(), 150);
    }

    #[tokio::test]
    async fn modes_are_credited_independently() {
        let mem = InMemoryStore::new();
        let reconciler = reconciler(&mem);
        let engine = engine_with(&[("toBe", 2)]);
        let mut rng = rand::rng();

        for mode in [AssessmentMode::Standard, AssessmentMode::Mastery] {
            let mut state = engine.start_with_rng("toBe", mode, &mut rng).unwrap();
            play(&engine, &mut state, 2);
            let outcome = reconciler.reconcile(&mut state).await.unwrap();
            assert_eq!(outcome.points_awarded(), 120);
        }

        let progress = reconciler.store().read().await;
        assert_eq!(progress.total_points(), 240);
        assert_eq!(progress.completed_count(), 2);
    }

    #[tokio::test]
    async fn custom_policy_applies() {
        let mem = InMemoryStore::new();
        let policy = RewardPolicyDraft {
            pass_threshold_percent: Some(50),
            base_award: Some(5),
            per_correct_bonus: Some(1),
            ..RewardPolicyDraft::default()
        }
        .validate()
        .unwrap();
        let store = ProgressStore::new(fixed_clock(), Arc::new(mem.clone()));
        let reconciler = ProgressReconciler::new(store, policy);
        let engine = engine_with(&[("t", 4)]);
        let mut state = engine.start("t").unwrap();
        play(&engine, &mut state, 2);

        let outcome = reconciler.reconcile(&mut state).await.unwrap();
        assert_eq!(outcome.points_awarded(), 7);
    }

    #[tokio::test]
    async fn learned_words_follow_favorites_size() {
        let reconciler = reconciler(&InMemoryStore::new());
        let favorites = FavoriteSet::from_words(
            (1..=3).map(|i| WordItem::new(WordId::new(i), format!("w{i}"), format!("t{i}"), "", "")),
        );

        let progress = reconciler.sync_learned_words(&favorites).await.unwrap();
        assert_eq!(progress.learned_words_count(), 3);
        let progress = reconciler.sync_learned_words(&FavoriteSet::new()).await.unwrap();
        assert_eq!(progress.learned_words_count(), 0);
    }
}
