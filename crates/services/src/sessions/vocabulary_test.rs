use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::BTreeSet;

use vocab_core::model::{AssessmentTopic, Level, Question, WordItem};

use crate::error::AssessmentError;

/// Wrong options offered next to the correct translation.
pub const DISTRACTORS_PER_QUESTION: usize = 3;

/// Topic id a vocabulary test for `level` is credited under.
#[must_use]
pub fn vocabulary_topic_id(level: Level) -> String {
    format!("vocab-{level}")
}

/// Build a translation test over every word of a level.
///
/// Each question shows a headword; the options are its translation plus up to
/// `DISTRACTORS_PER_QUESTION` other translations from the same level, shuffled.
///
/// # Errors
///
/// Returns `AssessmentError::NotEnoughWords` when the level has fewer than two
/// distinct translations.
pub fn build_vocabulary_topic<R: Rng + ?Sized>(
    level: Level,
    words: &[WordItem],
    rng: &mut R,
) -> Result<AssessmentTopic, AssessmentError> {
    let translations: BTreeSet<&str> = words.iter().map(WordItem::translation).collect();
    if translations.len() < 2 {
        return Err(AssessmentError::NotEnoughWords {
            level,
            available: translations.len(),
        });
    }

    let mut questions = Vec::with_capacity(words.len());
    for (index, word) in words.iter().enumerate() {
        let mut distractors: Vec<&str> = translations
            .iter()
            .copied()
            .filter(|t| *t != word.translation())
            .collect();
        distractors.shuffle(rng);
        distractors.truncate(DISTRACTORS_PER_QUESTION);

        let mut options: Vec<String> = distractors.into_iter().map(str::to_owned).collect();
        options.push(word.translation().to_owned());
        options.shuffle(rng);

        questions.push(Question::new(
            index,
            word.headword(),
            options,
            word.translation(),
        )?);
    }

    let title = format!("{} vocabulary", capitalize(level.as_str()));
    Ok(AssessmentTopic::new(
        vocabulary_topic_id(level),
        title,
        format!("{} words", words.len()),
        questions,
    )?)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use vocab_core::WordBank;
    use vocab_core::model::WordId;

    #[test]
    fn builds_one_question_per_word() {
        let bank = WordBank::builtin().unwrap();
        let words = bank.words(Level::Beginner);
        let mut rng = StdRng::seed_from_u64(3);

        let topic = build_vocabulary_topic(Level::Beginner, words, &mut rng).unwrap();

        assert_eq!(topic.id(), "vocab-beginner");
        assert_eq!(topic.title(), "Beginner vocabulary");
        assert_eq!(topic.len(), words.len());
        for (question, word) in topic.questions().iter().zip(words) {
            assert_eq!(question.prompt(), word.headword());
            assert_eq!(question.correct_option(), word.translation());
            assert_eq!(question.options().len(), DISTRACTORS_PER_QUESTION + 1);
        }
    }

    #[test]
    fn small_levels_use_fewer_distractors() {
        let words = vec![
            WordItem::new(WordId::new(1), "cat", "кіт", "", ""),
            WordItem::new(WordId::new(2), "dog", "собака", "", ""),
        ];
        let mut rng = StdRng::seed_from_u64(9);
        let topic = build_vocabulary_topic(Level::Advanced, &words, &mut rng).unwrap();
        assert!(topic.questions().iter().all(|q| q.options().len() == 2));
    }

    #[test]
    fn rejects_levels_without_alternatives() {
        let words = vec![WordItem::new(WordId::new(1), "cat", "кіт", "", "")];
        let mut rng = StdRng::seed_from_u64(1);
        let err = build_vocabulary_topic(Level::Beginner, &words, &mut rng).unwrap_err();
        assert_eq!(
            err,
            AssessmentError::NotEnoughWords {
                level: Level::Beginner,
                available: 1
            }
        );
    }
}
