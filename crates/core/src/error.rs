use thiserror::Error;

use crate::catalog::CatalogError;
use crate::model::{RewardPolicyError, ScoreError, TopicError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Topic(#[from] TopicError),
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error(transparent)]
    RewardPolicy(#[from] RewardPolicyError),
}
