//! Shared error types for the services crate.

use thiserror::Error;

use storage::StorageError;
use storage::sqlite::SqliteInitError;
use vocab_core::catalog::CatalogError;
use vocab_core::model::{Level, RewardPolicyError, ScoreError, TopicError, WordId};

/// Errors emitted by `AssessmentEngine`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AssessmentError {
    #[error("unknown topic: {topic_id}")]
    UnknownTopic { topic_id: String },
    #[error("session already finished")]
    SessionFinished,
    #[error("session is still in progress")]
    SessionInProgress,
    #[error("level {level} needs at least two distinct translations, found {available}")]
    NotEnoughWords { level: Level, available: usize },
    #[error(transparent)]
    Topic(#[from] TopicError),
    #[error(transparent)]
    Score(#[from] ScoreError),
}

/// Errors emitted by `ProgressStore`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("progress storage unavailable: {0}")]
    StorageUnavailable(#[source] StorageError),
}

/// Errors emitted by `FavoritesRegistry`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FavoritesError {
    #[error("word {word_id} is not in the word bank")]
    UnknownWord { word_id: WordId },
    #[error("favorites storage unavailable: {0}")]
    StorageUnavailable(#[source] StorageError),
    /// The favorites were saved but the learned-word count was not.
    #[error(transparent)]
    Progress(#[from] ProgressError),
}

/// Errors emitted by `ProgressReconciler`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReconcileError {
    #[error(transparent)]
    Assessment(#[from] AssessmentError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
}

/// Errors emitted by the quiz and vocabulary state machines.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FlowError {
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },
    #[error(transparent)]
    Assessment(#[from] AssessmentError),
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

/// Errors emitted while reading configuration from the environment.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid value for {var}: {raw:?}")]
    InvalidVar { var: &'static str, raw: String },
    #[error(transparent)]
    RewardPolicy(#[from] RewardPolicyError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Favorites(#[from] FavoritesError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
}
