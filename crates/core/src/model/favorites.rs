use crate::model::ids::WordId;
use crate::model::word::WordItem;

/// Words the user saved for review, in the order they were saved.
///
/// Persisted as an array of full `WordItem`s so the dictionary can render
/// entries without the word bank. Equality ignores order.
#[derive(Debug, Clone, Default)]
pub struct FavoriteSet {
    words: Vec<WordItem>,
}

impl FavoriteSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from persisted words; the first occurrence of an id wins.
    #[must_use]
    pub fn from_words(words: impl IntoIterator<Item = WordItem>) -> Self {
        let mut set = Self::new();
        for word in words {
            if !set.contains(word.id()) {
                set.words.push(word);
            }
        }
        set
    }

    #[must_use]
    pub fn contains(&self, id: WordId) -> bool {
        self.position(id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = WordId> + '_ {
        self.words.iter().map(WordItem::id)
    }

    pub fn words(&self) -> impl Iterator<Item = &WordItem> + '_ {
        self.words.iter()
    }

    /// Owned copy of the saved words, oldest first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<WordItem> {
        self.words.clone()
    }

    /// Append the word if absent, otherwise remove it. Returns true if it was added.
    pub fn toggle(&mut self, word: &WordItem) -> bool {
        if self.remove(word.id()).is_some() {
            false
        } else {
            self.words.push(word.clone());
            true
        }
    }

    /// Remove by id, keeping the order of the rest. Returns the removed word, if any.
    pub fn remove(&mut self, id: WordId) -> Option<WordItem> {
        self.position(id).map(|i| self.words.remove(i))
    }

    fn position(&self, id: WordId) -> Option<usize> {
        self.words.iter().position(|w| w.id() == id)
    }
}

impl PartialEq for FavoriteSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .words
                .iter()
                .all(|w| other.position(w.id()).is_some_and(|i| other.words[i] == *w))
    }
}

impl Eq for FavoriteSet {}
