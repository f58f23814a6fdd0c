use std::env;
use std::str::FromStr;
use std::sync::Arc;

use storage::{FAVORITES_KEY, PROGRESS_KEY, Storage};
use vocab_core::model::{
    AssessmentMode, FavoriteSet, RepeatAwardPolicy, RewardPolicy, RewardPolicyDraft, WordId,
};
use vocab_core::{Clock, TopicCatalog, WordBank};

use crate::error::{AppServicesError, ConfigError};
use crate::favorites_registry::FavoritesRegistry;
use crate::progress_store::ProgressStore;
use crate::reconciler::ProgressReconciler;
use crate::sessions::{AssessmentEngine, QuizFlow, VocabularyFlow};

pub const DB_URL_VAR: &str = "VOCAB_DB_URL";
pub const PASS_THRESHOLD_VAR: &str = "VOCAB_PASS_THRESHOLD";
pub const BASE_AWARD_VAR: &str = "VOCAB_BASE_AWARD";
pub const PER_CORRECT_BONUS_VAR: &str = "VOCAB_PER_CORRECT_BONUS";
pub const REPEAT_AWARDS_VAR: &str = "VOCAB_REPEAT_AWARDS";

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Default)]
pub struct ServicesConfig {
    /// `SQLite` URL; in-memory storage when absent.
    pub db_url: Option<String>,
    pub reward: RewardPolicy,
    pub clock: Clock,
}

impl ServicesConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to its value.
    ///
    /// Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed, or the
    /// resulting reward policy is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let reward = RewardPolicyDraft {
            pass_threshold_percent: parse_var(PASS_THRESHOLD_VAR, get(PASS_THRESHOLD_VAR))?,
            base_award: parse_var(BASE_AWARD_VAR, get(BASE_AWARD_VAR))?,
            per_correct_bonus: parse_var(PER_CORRECT_BONUS_VAR, get(PER_CORRECT_BONUS_VAR))?,
            repeat_awards: get(REPEAT_AWARDS_VAR)
                .map(|raw| RepeatAwardPolicy::from_str(&raw))
                .transpose()?,
        }
        .validate()?;

        Ok(Self {
            db_url: get(DB_URL_VAR),
            reward,
            clock: Clock::default(),
        })
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

fn parse_var(var: &'static str, raw: Option<String>) -> Result<Option<u32>, ConfigError> {
    raw.map(|raw| {
        raw.trim()
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidVar { var, raw })
    })
    .transpose()
}

//
// ─── SERVICES ──────────────────────────────────────────────────────────────────
//

/// Assembles the app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    words: Arc<WordBank>,
    engine: AssessmentEngine,
    progress: ProgressStore,
    favorites: FavoritesRegistry,
    reconciler: ProgressReconciler,
}

impl AppServices {
    /// Build services from `config`, opening `SQLite` when a URL is configured.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails or the
    /// bundled catalogs are invalid.
    pub async fn new(config: ServicesConfig) -> Result<Self, AppServicesError> {
        let storage = match config.db_url.as_deref() {
            Some(url) => Storage::sqlite(url).await?,
            None => Storage::in_memory(),
        };
        let services = Self::with_storage(storage, &config)?;
        tracing::info!(
            sqlite = config.db_url.is_some(),
            topics = services.engine.topics().len(),
            words = services.words.len(),
            "app services ready"
        );
        Ok(services)
    }

    /// Build services over an existing storage backend and the bundled catalogs.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Catalog` if the bundled catalogs are invalid.
    pub fn with_storage(storage: Storage, config: &ServicesConfig) -> Result<Self, AppServicesError> {
        let words = Arc::new(WordBank::builtin()?);
        let topics = Arc::new(TopicCatalog::builtin()?);
        Ok(Self::with_catalogs(storage, config, words, topics))
    }

    #[must_use]
    pub fn with_catalogs(
        storage: Storage,
        config: &ServicesConfig,
        words: Arc<WordBank>,
        topics: Arc<TopicCatalog>,
    ) -> Self {
        let progress = ProgressStore::new(config.clock, Arc::clone(&storage.progress))
            .with_write_lock(storage.locks.for_key(PROGRESS_KEY))
            .with_repeat_awards(config.reward.repeat_awards());
        let reconciler = ProgressReconciler::new(progress.clone(), config.reward);
        let favorites = FavoritesRegistry::new(Arc::clone(&words), Arc::clone(&storage.favorites))
            .with_write_lock(storage.locks.for_key(FAVORITES_KEY))
            .with_learned_words(reconciler.clone());

        Self {
            words,
            engine: AssessmentEngine::new(topics),
            progress,
            favorites,
            reconciler,
        }
    }

    #[must_use]
    pub fn words(&self) -> Arc<WordBank> {
        Arc::clone(&self.words)
    }

    #[must_use]
    pub fn engine(&self) -> &AssessmentEngine {
        &self.engine
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    #[must_use]
    pub fn favorites(&self) -> &FavoritesRegistry {
        &self.favorites
    }

    #[must_use]
    pub fn reconciler(&self) -> &ProgressReconciler {
        &self.reconciler
    }

    #[must_use]
    pub fn quiz_flow(&self, mode: AssessmentMode) -> QuizFlow {
        QuizFlow::new(self.engine.clone(), self.reconciler.clone(), mode)
    }

    #[must_use]
    pub fn vocabulary_flow(&self, mode: AssessmentMode) -> VocabularyFlow {
        VocabularyFlow::new(
            self.words(),
            self.engine.clone(),
            self.reconciler.clone(),
            mode,
        )
    }

    /// Toggle a saved word and bring the learned-word count in line with it.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Favorites` if the toggle fails, including
    /// `FavoritesError::Progress` when the favorites changed but the count
    /// could not be written.
    pub async fn toggle_favorite(&self, word_id: WordId) -> Result<FavoriteSet, AppServicesError> {
        Ok(self.favorites.toggle(word_id).await?)
    }

    /// Remove a saved word and bring the learned-word count in line with it.
    ///
    /// # Errors
    ///
    /// Same as `toggle_favorite`.
    pub async fn remove_favorite(&self, word_id: WordId) -> Result<FavoriteSet, AppServicesError> {
        Ok(self.favorites.remove(word_id).await?)
    }
}
