#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod favorites_registry;
pub mod progress_store;
pub mod reconciler;
pub mod sessions;

pub use vocab_core::Clock;

pub use app_services::{AppServices, ServicesConfig};
pub use error::{
    AppServicesError, AssessmentError, ConfigError, FavoritesError, FlowError, ProgressError,
    ReconcileError,
};
pub use favorites_registry::FavoritesRegistry;
pub use progress_store::{AwardReceipt, ProgressStore};
pub use reconciler::{ProgressReconciler, SessionOutcome};

pub use sessions::{
    AnswerFeedback, AnswerOutcome, AssessmentEngine, BrowseCursor, Mistake, QuizFlow, QuizPhase,
    SessionProgress, SessionState, VocabularyFlow, VocabularyPhase,
};
