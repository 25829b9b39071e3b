/// One extracted word with its part-of-speech tag, translated meaning and an
/// optional example sentence (empty string when absent).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabEntry {
    pub word: String,
    pub pos: String,
    pub meaning: String,
    pub example: String,
}

impl VocabEntry {
    /// Fields are stored trimmed so the flat file can write them verbatim and
    /// still round-trip.
    pub fn new(
        word: impl Into<String>,
        pos: impl Into<String>,
        meaning: impl Into<String>,
        example: impl Into<String>,
    ) -> Self {
        Self {
            word: word.into().trim().to_string(),
            pos: pos.into().trim().to_string(),
            meaning: meaning.into().trim().to_string(),
            example: example.into().trim().to_string(),
        }
    }
}

/// One extracted source sentence paired with its translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentencePair {
    pub original: String,
    pub translation: String,
}

impl SentencePair {
    /// Fields are stored trimmed, matching [`VocabEntry::new`].
    pub fn new(original: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            original: original.into().trim().to_string(),
            translation: translation.into().trim().to_string(),
        }
    }
}

/// The central record flowing through the pipeline. `word_count` is computed
/// once from the source text and never updated afterwards; vocabulary and
/// sentence order is insertion order and carries display priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub difficulty: String,
    pub word_count: usize,
    pub original: String,
    pub translation: String,
    pub vocabulary: Vec<VocabEntry>,
    pub sentences: Vec<SentencePair>,
}

pub const DEFAULT_DIFFICULTY: &str = "intermediate";

impl Article {
    pub fn new(title: impl Into<String>, original: impl Into<String>) -> Self {
        let original = original.into();
        let word_count = original.split_whitespace().count();
        Self {
            title: title.into(),
            difficulty: DEFAULT_DIFFICULTY.to_string(),
            word_count,
            original,
            translation: String::new(),
            vocabulary: Vec::new(),
            sentences: Vec::new(),
        }
    }

    pub fn with_difficulty(mut self, difficulty: impl Into<String>) -> Self {
        let difficulty = difficulty.into();
        if !difficulty.trim().is_empty() {
            self.difficulty = difficulty;
        }
        self
    }

    /// File stem used for every output artifact of this article.
    pub fn file_stem(&self) -> String {
        let stem: String = self
            .title
            .trim()
            .chars()
            .map(|ch| if ch.is_whitespace() { '_' } else { ch })
            .filter(|ch| *ch != '/' && *ch != '\\')
            .collect();
        if stem.is_empty() {
            "article".to_string()
        } else {
            stem
        }
    }
}
