mod favorites;
mod ids;
mod progress;
mod reward;
mod score;
mod topic;
mod word;

pub use ids::{AssessmentId, AssessmentMode, WordId};

pub use favorites::FavoriteSet;
pub use progress::{AwardOutcome, DEFAULT_LEVEL_WORD_TARGET, UserProgress};
pub use reward::{RepeatAwardPolicy, RewardPolicy, RewardPolicyDraft, RewardPolicyError};
pub use score::{Score, ScoreError};
pub use topic::{AssessmentTopic, Question, QuestionDraft, TopicDraft, TopicError};
pub use word::{Level, UnknownLevel, WordItem};
