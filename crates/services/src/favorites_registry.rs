use std::sync::Arc;
use tokio::sync::Mutex;

use storage::FavoritesRepository;
use vocab_core::WordBank;
use vocab_core::model::{FavoriteSet, WordId, WordItem};

use crate::error::FavoritesError;
use crate::reconciler::ProgressReconciler;

/// Durable set of saved words, independent of any session.
#[derive(Clone)]
pub struct FavoritesRegistry {
    words: Arc<WordBank>,
    repo: Arc<dyn FavoritesRepository>,
    write_lock: Arc<Mutex<()>>,
    learned_words: Option<ProgressReconciler>,
}

impl FavoritesRegistry {
    #[must_use]
    pub fn new(words: Arc<WordBank>, repo: Arc<dyn FavoritesRepository>) -> Self {
        Self {
            words,
            repo,
            write_lock: Arc::new(Mutex::new(())),
            learned_words: None,
        }
    }

    /// Share `lock` with every other writer of the favorites key.
    #[must_use]
    pub fn with_write_lock(mut self, lock: Arc<Mutex<()>>) -> Self {
        self.write_lock = lock;
        self
    }

    /// Keep the learned-word count equal to the saved set's size.
    ///
    /// The count is written before the favorites lock is released, so
    /// concurrent edits leave it matching the last set persisted.
    #[must_use]
    pub fn with_learned_words(mut self, reconciler: ProgressReconciler) -> Self {
        self.learned_words = Some(reconciler);
        self
    }

    /// Current saved set. Missing, unreadable or malformed data reads as empty.
    pub async fn load(&self) -> FavoriteSet {
        match self.repo.load_favorites().await {
            Ok(set) => set.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(error = %err, "favorites unreadable, using empty set");
                FavoriteSet::default()
            }
        }
    }

    /// Saved words in the order they were added, for the dictionary screen.
    pub async fn saved_words(&self) -> Vec<WordItem> {
        self.load().await.to_vec()
    }

    /// Add `word_id` if absent, otherwise remove it, and persist the new set.
    ///
    /// # Errors
    ///
    /// Returns `FavoritesError::UnknownWord` when adding an id the word bank
    /// does not know, `FavoritesError::StorageUnavailable` if the set cannot
    /// be read or written, or `FavoritesError::Progress` if the set was saved
    /// but the learned-word count was not.
    pub async fn toggle(&self, word_id: WordId) -> Result<FavoriteSet, FavoritesError> {
        let _guard = self.write_lock.lock().await;
        let mut set = self.load_for_update().await?;

        let added = if set.remove(word_id).is_some() {
            false
        } else {
            let word = self
                .words
                .get(word_id)
                .ok_or(FavoritesError::UnknownWord { word_id })?;
            set.toggle(word)
        };

        self.persist(&set).await?;
        tracing::debug!(%word_id, added, saved = set.len(), "favorite toggled");
        self.sync_learned_words(&set).await?;
        Ok(set)
    }

    /// Remove `word_id` from the saved set. A no-op when it is absent.
    ///
    /// # Errors
    ///
    /// Same as `toggle`, except an absent id is never an error.
    pub async fn remove(&self, word_id: WordId) -> Result<FavoriteSet, FavoritesError> {
        let _guard = self.write_lock.lock().await;
        let mut set = self.load_for_update().await?;
        if set.remove(word_id).is_some() {
            self.persist(&set).await?;
            tracing::debug!(%word_id, saved = set.len(), "favorite removed");
        }
        self.sync_learned_words(&set).await?;
        Ok(set)
    }

    /// Pure membership test.
    #[must_use]
    pub fn is_favorite(word_id: WordId, set: &FavoriteSet) -> bool {
        set.contains(word_id)
    }

    async fn load_for_update(&self) -> Result<FavoriteSet, FavoritesError> {
        match self.repo.load_favorites().await {
            Ok(set) => Ok(set.unwrap_or_default()),
            Err(err) if err.is_malformed() => {
                tracing::warn!(error = %err, "discarding malformed favorites record");
                Ok(FavoriteSet::default())
            }
            Err(err) => Err(FavoritesError::StorageUnavailable(err)),
        }
    }

    async fn persist(&self, set: &FavoriteSet) -> Result<(), FavoritesError> {
        self.repo
            .save_favorites(set)
            .await
            .map_err(FavoritesError::StorageUnavailable)
    }

    // Callers hold `write_lock`.
    async fn sync_learned_words(&self, set: &FavoriteSet) -> Result<(), FavoritesError> {
        if let Some(reconciler) = &self.learned_words {
            reconciler.sync_learned_words(set).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress_store::ProgressStore;
    use storage::{FAVORITES_KEY, InMemoryStore, KeyValueStore};
    use vocab_core::model::RewardPolicy;
    use vocab_core::time::fixed_clock;

    fn registry(mem: &InMemoryStore) -> FavoritesRegistry {
        let bank = WordBank::builtin().unwrap();
        FavoritesRegistry::new(Arc::new(bank), Arc::new(mem.clone()))
    }

    #[tokio::test]
    async fn toggle_twice_restores_original_set() {
        let mem = InMemoryStore::new();
        let registry = registry(&mem);
        registry.toggle(WordId::new(1)).await.unwrap();
        let original = registry.load().await;

        let added = registry.toggle(WordId::new(3)).await.unwrap();
        assert!(FavoritesRegistry::is_favorite(WordId::new(3), &added));
        let restored = registry.toggle(WordId::new(3)).await.unwrap();

        assert_eq!(restored, original);
        assert_eq!(registry.load().await, original);
    }

    #[tokio::test]
    async fn saved_words_survive_a_new_registry() {
        let mem = InMemoryStore::new();
        registry(&mem).toggle(WordId::new(2)).await.unwrap();
        registry(&mem).toggle(WordId::new(101)).await.unwrap();

        let words = registry(&mem).saved_words().await;
        let ids: Vec<WordId> = words.iter().map(WordItem::id).collect();
        assert_eq!(ids, vec![WordId::new(2), WordId::new(101)]);
        assert!(!words[0].headword().is_empty());
    }

    #[tokio::test]
    async fn saved_words_keep_the_order_they_were_added() {
        let mem = InMemoryStore::new();
        let registry = registry(&mem);
        registry.toggle(WordId::new(5)).await.unwrap();
        registry.toggle(WordId::new(2)).await.unwrap();

        let ids: Vec<WordId> = registry.saved_words().await.iter().map(WordItem::id).collect();
        assert_eq!(ids, vec![WordId::new(5), WordId::new(2)]);
        let raw = mem.get(FAVORITES_KEY).await.unwrap().unwrap();
        assert!(raw.starts_with(r#"[{"id":5,"#));
    }

    #[tokio::test]
    async fn linked_registry_keeps_learned_words_in_step() {
        let mem = InMemoryStore::new();
        let progress = ProgressStore::new(fixed_clock(), Arc::new(mem.clone()));
        let reconciler = ProgressReconciler::new(progress.clone(), RewardPolicy::default());
        let registry = registry(&mem).with_learned_words(reconciler);

        registry.toggle(WordId::new(1)).await.unwrap();
        registry.toggle(WordId::new(2)).await.unwrap();
        assert_eq!(progress.read().await.learned_words_count(), 2);

        registry.remove(WordId::new(1)).await.unwrap();
        assert_eq!(progress.read().await.learned_words_count(), 1);

        // an unknown id changes nothing
        assert!(registry.toggle(WordId::new(5000)).await.is_err());
        assert_eq!(progress.read().await.learned_words_count(), 1);
    }

    #[tokio::test]
    async fn unknown_word_cannot_be_added_but_stale_entries_can_be_removed() {
        let mem = InMemoryStore::new();
        mem.set(
            FAVORITES_KEY,
            r#"[{"id":999,"wordEng":"gone","wordUA":"зник"}]"#,
        )
        .await
        .unwrap();
        let registry = registry(&mem);

        let err = registry.toggle(WordId::new(5000)).await.unwrap_err();
        assert!(matches!(err, FavoritesError::UnknownWord { .. }));

        let set = registry.toggle(WordId::new(999)).await.unwrap();
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn remove_is_a_no_op_when_absent() {
        let mem = InMemoryStore::new();
        let registry = registry(&mem);
        registry.toggle(WordId::new(4)).await.unwrap();

        let set = registry.remove(WordId::new(7)).await.unwrap();
        assert_eq!(set.len(), 1);
        let set = registry.remove(WordId::new(4)).await.unwrap();
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn storage_failures() {
        let mem = InMemoryStore::new();
        let registry = registry(&mem);
        registry.toggle(WordId::new(1)).await.unwrap();

        mem.set_fail_writes(true);
        let err = registry.toggle(WordId::new(2)).await.unwrap_err();
        assert!(matches!(err, FavoritesError::StorageUnavailable(_)));
        mem.set_fail_writes(false);

        mem.set_fail_reads(true);
        assert!(registry.load().await.is_empty());
        assert!(registry.toggle(WordId::new(2)).await.is_err());
        mem.set_fail_reads(false);

        assert_eq!(registry.load().await.len(), 1);
    }

    #[tokio::test]
    async fn malformed_record_reads_as_empty() {
        let mem = InMemoryStore::new();
        mem.set(FAVORITES_KEY, "{\"oops\":").await.unwrap();
        let registry = registry(&mem);

        assert!(registry.load().await.is_empty());
        let set = registry.toggle(WordId::new(1)).await.unwrap();
        assert_eq!(set.len(), 1);
    }
}
