use std::sync::Arc;
use tokio::sync::Mutex;

use storage::ProgressRepository;
use vocab_core::Clock;
use vocab_core::model::{AssessmentId, AwardOutcome, RepeatAwardPolicy, UserProgress};

use crate::error::ProgressError;

/// Result of a successful `merge_award`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardReceipt {
    pub outcome: AwardOutcome,
    pub progress: UserProgress,
}

/// Single owner of the persisted progress ledger.
///
/// Clones share one write lock, so every read-modify-write runs to
/// completion before the next one reads. Stores built over the same
/// `Storage` share it through `with_write_lock`.
#[derive(Clone)]
pub struct ProgressStore {
    clock: Clock,
    repo: Arc<dyn ProgressRepository>,
    repeat_awards: RepeatAwardPolicy,
    write_lock: Arc<Mutex<()>>,
}

impl ProgressStore {
    #[must_use]
    pub fn new(clock: Clock, repo: Arc<dyn ProgressRepository>) -> Self {
        Self {
            clock,
            repo,
            repeat_awards: RepeatAwardPolicy::default(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Share `lock` with every other writer of the progress key.
    #[must_use]
    pub fn with_write_lock(mut self, lock: Arc<Mutex<()>>) -> Self {
        self.write_lock = lock;
        self
    }

    #[must_use]
    pub fn with_repeat_awards(mut self, repeat_awards: RepeatAwardPolicy) -> Self {
        self.repeat_awards = repeat_awards;
        self
    }

    #[must_use]
    pub fn repeat_awards(&self) -> RepeatAwardPolicy {
        self.repeat_awards
    }

    /// Load the ledger for display.
    ///
    /// Never fails: a missing, unreadable, or malformed record yields the
    /// zero-valued default.
    pub async fn read(&self) -> UserProgress {
        match self.repo.load_progress().await {
            Ok(progress) => progress.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(error = %err, "progress unreadable, using defaults");
                UserProgress::default()
            }
        }
    }

    /// Credit `points` for `assessment_id` and persist the whole record.
    ///
    /// Under `RepeatAwardPolicy::FirstCompletionOnly` a repeat completion is
    /// recorded with zero points.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::StorageUnavailable` if the record cannot be read
    /// or written; the award has not been applied and may be retried.
    pub async fn merge_award(
        &self,
        assessment_id: &AssessmentId,
        points: u32,
    ) -> Result<AwardReceipt, ProgressError> {
        let _guard = self.write_lock.lock().await;
        let mut progress = self.load_for_update().await?;
        let outcome = progress.apply_award(
            assessment_id,
            points,
            self.repeat_awards,
            self.clock.today(),
        );
        self.repo
            .save_progress(&progress)
            .await
            .map_err(ProgressError::StorageUnavailable)?;

        tracing::info!(
            assessment_id = %assessment_id,
            points_awarded = outcome.points_awarded,
            first_completion = outcome.first_completion,
            total_points = progress.total_points(),
            "award merged"
        );
        Ok(AwardReceipt { outcome, progress })
    }

    /// Overwrite the learned-word count.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::StorageUnavailable` if the record cannot be read or written.
    pub async fn set_learned_words_count(&self, count: u32) -> Result<UserProgress, ProgressError> {
        let _guard = self.write_lock.lock().await;
        let mut progress = self.load_for_update().await?;
        progress.set_learned_words_count(count);
        self.repo
            .save_progress(&progress)
            .await
            .map_err(ProgressError::StorageUnavailable)?;
        tracing::debug!(count, "learned words count updated");
        Ok(progress)
    }

    /// Replace the ledger with the zero record. Destructive.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::StorageUnavailable` if the record cannot be written.
    pub async fn reset(&self) -> Result<UserProgress, ProgressError> {
        let _guard = self.write_lock.lock().await;
        let progress = UserProgress::default();
        self.repo
            .save_progress(&progress)
            .await
            .map_err(ProgressError::StorageUnavailable)?;
        tracing::info!("progress reset");
        Ok(progress)
    }

    // A malformed record is replaced by defaults; an I/O failure aborts so a
    // transient error cannot overwrite real progress with zeros.
    async fn load_for_update(&self) -> Result<UserProgress, ProgressError> {
        match self.repo.load_progress().await {
            Ok(progress) => Ok(progress.unwrap_or_default()),
            Err(err) if err.is_malformed() => {
                tracing::warn!(error = %err, "discarding malformed progress record");
                Ok(UserProgress::default())
            }
            Err(err) => Err(ProgressError::StorageUnavailable(err)),
        }
    }
}
