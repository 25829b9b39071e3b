use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[a-zA-Z]+\b").expect("word regex"));

/// English function words plus a band of very common content words that are
/// not worth putting on a study card.
static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        // function words
        "the", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do",
        "does", "did", "will", "would", "could", "should", "may", "might", "must", "shall", "can",
        "need", "dare", "ought", "used", "to", "of", "in", "for", "on", "with", "at", "by", "from",
        "as", "into", "through", "during", "before", "after", "above", "below", "between", "and",
        "but", "or", "nor", "so", "yet", "both", "either", "neither", "not", "only", "own", "same",
        "than", "too", "very", "just", "also", "now", "here", "there", "when", "where", "why",
        "how", "all", "each", "every", "few", "more", "most", "other", "some", "such", "no", "any",
        "this", "that", "these", "those", "it", "its", "he", "she", "they", "them", "his", "her",
        "their", "what", "which", "who", "whom", "whose", "if", "then", "because", "until",
        "while", "although", "though", "since", "unless", "about", "against", "among", "behind",
        "beside", "beyond", "concerning", "considering", "despite", "except", "following", "like",
        "near", "regarding", "throughout", "toward", "under", "underneath", "unlike", "upon",
        "versus", "via", "within", "without",
        // common content words
        "people", "person", "world", "thing", "things", "time", "times", "year", "years", "day",
        "days", "place", "number", "system", "systems", "group", "part", "parts", "small",
        "smaller", "smallest", "large", "larger", "largest", "good", "better", "best", "great",
        "little", "long", "longer", "short", "first", "second", "last", "many", "much", "another",
        "different", "important", "called", "known", "example", "around", "often",
        "usually", "sometimes", "always", "never", "really", "still", "however", "therefore",
    ]
    .into_iter()
    .collect()
});

/// Strategy used to rank vocabulary candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scoring {
    /// Raw occurrence count.
    #[default]
    Frequency,
    /// `frequency x ln(word_length)`, favoring longer repeated words.
    FrequencyLogLen,
}

impl Scoring {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "frequency" => Some(Scoring::Frequency),
            "frequency-log-length" | "frequency_log_length" => Some(Scoring::FrequencyLogLen),
            _ => None,
        }
    }

    fn score(&self, frequency: usize, word_len: usize) -> f64 {
        match self {
            Scoring::Frequency => frequency as f64,
            Scoring::FrequencyLogLen => frequency as f64 * (word_len as f64).ln(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VocabOptions {
    pub min_len: usize,
    pub max_count: usize,
    pub scoring: Scoring,
}

impl Default for VocabOptions {
    fn default() -> Self {
        Self {
            min_len: 6,
            max_count: 20,
            scoring: Scoring::Frequency,
        }
    }
}

/// Select salient words from `text`, ranked by the configured scoring with
/// ties broken by first appearance. The result is deduplicated and holds at
/// most `max_count` words; fewer qualifying words are returned as-is.
pub fn extract_vocabulary(text: &str, options: &VocabOptions) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut first_seen: Vec<String> = Vec::new();

    for token in WORD_RE.find_iter(&lower) {
        let word = token.as_str();
        if word.chars().count() < options.min_len {
            continue;
        }
        if STOP_WORDS.contains(word) {
            continue;
        }
        let count = counts.entry(word.to_string()).or_insert(0);
        if *count == 0 {
            first_seen.push(word.to_string());
        }
        *count += 1;
    }

    // first_seen holds each word once, so ranking it keeps the output
    // deduplicated and the tie order deterministic.
    let mut ranked: Vec<(usize, &String)> = first_seen.iter().enumerate().collect();
    ranked.sort_by(|(ia, wa), (ib, wb)| {
        let sa = options.scoring.score(counts[*wa], wa.chars().count());
        let sb = options.scoring.score(counts[*wb], wb.chars().count());
        sb.partial_cmp(&sa)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(ia.cmp(ib))
    });

    ranked
        .into_iter()
        .take(options.max_count)
        .map(|(_, word)| word.clone())
        .collect()
}

#[derive(Debug, Clone)]
pub struct SentenceOptions {
    pub min_chars: usize,
    pub max_chars: usize,
    pub max_count: usize,
}

impl Default for SentenceOptions {
    fn default() -> Self {
        Self {
            min_chars: 80,
            max_chars: 250,
            max_count: 10,
        }
    }
}

/// Split `text` into sentences with the terminal punctuation kept attached.
/// `!` and `?` are normalized to `.` first.
pub fn split_sentences(text: &str) -> Vec<String> {
    let normalized: String = text
        .chars()
        .map(|ch| match ch {
            '!' | '?' => '.',
            '\n' => ' ',
            other => other,
        })
        .collect();

    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = normalized.chars().peekable();
    while let Some(ch) = chars.next() {
        current.push(ch);
        if ch == '.' {
            let at_boundary = chars.peek().is_none_or(|next| next.is_whitespace());
            if at_boundary {
                let trimmed = current.trim();
                if !trimmed.is_empty() && trimmed != "." {
                    sentences.push(trimmed.to_string());
                }
                current.clear();
            }
        }
    }
    let trimmed = current.trim();
    if !trimmed.is_empty() && trimmed != "." {
        sentences.push(trimmed.to_string());
    }
    sentences
}

/// Pick up to `max_count` sentences inside the length band. When `keywords`
/// is non-empty every picked sentence must contain a not-yet-used keyword,
/// which it consumes, so each sentence showcases a distinct word. If that
/// matches nothing the extractor falls back to length-only filtering.
pub fn extract_sentences(text: &str, options: &SentenceOptions, keywords: &[String]) -> Vec<String> {
    let sentences = split_sentences(text);
    let in_band = |sentence: &String| {
        let len = sentence.chars().count();
        len >= options.min_chars && len <= options.max_chars
    };

    if !keywords.is_empty() {
        let mut picked = Vec::new();
        let mut used: HashSet<&str> = HashSet::new();
        for sentence in sentences.iter().filter(|s| in_band(s)) {
            let lower = sentence.to_lowercase();
            let hit = keywords
                .iter()
                .find(|word| !used.contains(word.as_str()) && lower.contains(word.as_str()));
            if let Some(word) = hit {
                used.insert(word.as_str());
                picked.push(sentence.clone());
                if picked.len() >= options.max_count {
                    break;
                }
            }
        }
        if !picked.is_empty() {
            return picked;
        }
    }

    sentences
        .into_iter()
        .filter(|s| in_band(s))
        .take(options.max_count)
        .collect()
}

/// Suffix-based part-of-speech guess for an English word.
pub fn guess_pos(word: &str) -> &'static str {
    let lower = word.to_lowercase();
    if lower.ends_with("tion") || lower.ends_with("sion") {
        "n."
    } else if lower.ends_with("ly") {
        "adv."
    } else if lower.ends_with("ing") {
        "n./v."
    } else if lower.ends_with("ed") {
        "v."
    } else if lower.ends_with("er") || lower.ends_with("or") {
        "n."
    } else {
        "adj."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOLAR: &str = "Solar System\n\nThe solar system consists of the Sun, eight planets, and countless smaller objects bound by gravity.";

    #[test]
    fn vocabulary_matches_worked_example() {
        let options = VocabOptions {
            min_len: 6,
            max_count: 5,
            scoring: Scoring::Frequency,
        };
        let words = extract_vocabulary(SOLAR, &options);
        assert_eq!(
            words,
            vec!["consists", "planets", "countless", "objects", "gravity"]
        );
    }

    #[test]
    fn vocabulary_is_deduplicated_and_capped() {
        let text = "gravity gravity gravity planets planets orbits";
        let options = VocabOptions {
            min_len: 4,
            max_count: 2,
            scoring: Scoring::Frequency,
        };
        let words = extract_vocabulary(text, &options);
        assert_eq!(words, vec!["gravity", "planets"]);
    }

    #[test]
    fn log_length_scoring_prefers_longer_words() {
        let text = "zebra zebra magnificent magnificent";
        let options = VocabOptions {
            min_len: 4,
            max_count: 2,
            scoring: Scoring::FrequencyLogLen,
        };
        let words = extract_vocabulary(text, &options);
        assert_eq!(words, vec!["magnificent", "zebra"]);
    }

    #[test]
    fn empty_input_yields_empty_vocabulary() {
        assert!(extract_vocabulary("", &VocabOptions::default()).is_empty());
    }

    #[test]
    fn extraction_is_deterministic() {
        let options = VocabOptions::default();
        let first = extract_vocabulary(SOLAR, &options);
        let second = extract_vocabulary(SOLAR, &options);
        assert_eq!(first, second);
    }

    #[test]
    fn sentences_keep_terminator_attached() {
        let sentences = split_sentences("It works well. Does it? Yes!");
        assert_eq!(sentences, vec!["It works well.", "Does it.", "Yes."]);
    }

    #[test]
    fn sentences_respect_length_band() {
        let long = "a".repeat(90);
        let text = format!("Too short. {}. {}.", long, "b".repeat(300));
        let options = SentenceOptions {
            min_chars: 80,
            max_chars: 250,
            max_count: 10,
        };
        let picked = extract_sentences(&text, &options, &[]);
        assert_eq!(picked.len(), 1);
        let len = picked[0].chars().count();
        assert!(len >= options.min_chars && len <= options.max_chars);
    }

    #[test]
    fn keywords_are_consumed_once() {
        let filler = "with many additional words to satisfy the configured minimum length band";
        let text = format!(
            "The gravity of the planet keeps everything {f}. \
             Another gravity remark that is long enough {f}. \
             The orbit stays stable for centuries {f}.",
            f = filler
        );
        let options = SentenceOptions {
            min_chars: 40,
            max_chars: 250,
            max_count: 10,
        };
        let keywords = vec!["gravity".to_string(), "orbit".to_string()];
        let picked = extract_sentences(&text, &options, &keywords);
        assert_eq!(picked.len(), 2);
        assert!(picked[0].contains("gravity"));
        assert!(picked[1].contains("orbit"));
    }

    #[test]
    fn falls_back_to_length_only_when_no_keyword_matches() {
        let text = format!("{}.", "a sentence that is comfortably inside the band ".repeat(2));
        let options = SentenceOptions {
            min_chars: 40,
            max_chars: 250,
            max_count: 10,
        };
        let keywords = vec!["zzzzzz".to_string()];
        let picked = extract_sentences(&text, &options, &keywords);
        assert_eq!(picked.len(), 1);
    }

    #[test]
    fn pos_suffix_rules() {
        assert_eq!(guess_pos("attention"), "n.");
        assert_eq!(guess_pos("quickly"), "adv.");
        assert_eq!(guess_pos("running"), "n./v.");
        assert_eq!(guess_pos("bounded"), "v.");
        assert_eq!(guess_pos("painter"), "n.");
        assert_eq!(guess_pos("bright"), "adj.");
    }
}
