//! Width-aware line wrapping for mixed English/Chinese text.
//!
//! Paragraphs (separated by hard newlines) are classified per script: a
//! paragraph containing any CJK Unified Ideograph breaks purely by character
//! count, everything else breaks at word boundaries. Wrapping is a pure
//! function of its input.

/// Script classification for a paragraph of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    Latin,
    Cjk,
}

pub fn is_cjk_char(ch: char) -> bool {
    matches!(ch as u32, 0x4E00..=0x9FFF)
}

pub fn classify(text: &str) -> Script {
    if text.chars().any(is_cjk_char) {
        Script::Cjk
    } else {
        Script::Latin
    }
}

/// Width of a text run in the unit a wrapping budget is expressed in.
pub trait Measure {
    fn width(&self, text: &str) -> f32;
}

/// One unit per character.
pub struct CharCount;

impl Measure for CharCount {
    fn width(&self, text: &str) -> f32 {
        text.chars().count() as f32
    }
}

/// Terminal-style display columns: CJK characters count as two, everything
/// else as one. The fallback when glyph metrics are unavailable.
pub struct DisplayColumns;

impl Measure for DisplayColumns {
    fn width(&self, text: &str) -> f32 {
        text.chars()
            .map(|ch| if is_cjk_char(ch) { 2.0 } else { 1.0 })
            .sum()
    }
}

/// Wrap a logical paragraph of text into display lines within `budget`.
/// Embedded newlines are hard breaks; each resulting paragraph is wrapped
/// per its own script. Empty input produces no lines.
pub fn wrap(text: &str, budget: f32, measure: &dyn Measure) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        match classify(paragraph) {
            Script::Cjk => wrap_cjk_measured(paragraph, budget, measure, &mut lines),
            Script::Latin => wrap_latin(paragraph, budget, measure, &mut lines),
        }
    }
    lines
}

/// Character-count wrapping for text outputs: Latin paragraphs use the
/// `latin_budget`, CJK paragraphs are cut into chunks of exactly
/// `cjk_chars` characters (except possibly the last).
pub fn wrap_chars(text: &str, latin_budget: usize, cjk_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        match classify(paragraph) {
            Script::Cjk => lines.extend(wrap_cjk_exact(paragraph, cjk_chars)),
            Script::Latin => wrap_latin(paragraph, latin_budget as f32, &CharCount, &mut lines),
        }
    }
    lines
}

/// Cut a CJK paragraph into chunks of exactly `max_chars` characters.
/// Concatenating the chunks reproduces the input.
pub fn wrap_cjk_exact(paragraph: &str, max_chars: usize) -> Vec<String> {
    if paragraph.is_empty() {
        return Vec::new();
    }
    let max_chars = max_chars.max(1);
    let chars: Vec<char> = paragraph.chars().collect();
    chars
        .chunks(max_chars)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

fn wrap_latin(paragraph: &str, budget: f32, measure: &dyn Measure, out: &mut Vec<String>) {
    let mut current = String::new();
    for word in paragraph.split_whitespace() {
        if current.is_empty() {
            // An over-budget word is never split mid-word; it overflows alone.
            current.push_str(word);
            continue;
        }
        let candidate = format!("{} {}", current, word);
        if measure.width(&candidate) <= budget {
            current = candidate;
        } else {
            out.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
}

fn wrap_cjk_measured(paragraph: &str, budget: f32, measure: &dyn Measure, out: &mut Vec<String>) {
    let mut current = String::new();
    for ch in paragraph.chars() {
        let mut candidate = current.clone();
        candidate.push(ch);
        if !current.is_empty() && measure.width(&candidate) > budget {
            out.push(std::mem::take(&mut current));
            current.push(ch);
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_ideograph_presence() {
        assert_eq!(classify("hello world"), Script::Latin);
        assert_eq!(classify("太阳系 solar"), Script::Cjk);
        assert_eq!(classify(""), Script::Latin);
    }

    #[test]
    fn latin_lines_stay_within_budget() {
        let text = "the quick brown fox jumps over the lazy dog again and again";
        let lines = wrap(text, 16.0, &CharCount);
        assert!(!lines.is_empty());
        for line in &lines {
            assert!(line.chars().count() <= 16, "overflow: {line:?}");
        }
    }

    #[test]
    fn overlong_word_is_emitted_alone() {
        let lines = wrap("tiny incomprehensibilities end", 10.0, &CharCount);
        assert_eq!(lines, vec!["tiny", "incomprehensibilities", "end"]);
    }

    #[test]
    fn cjk_chunks_are_exact_and_lossless() {
        let paragraph = "太阳系由太阳八大行星以及无数小天体组成";
        let lines = wrap_cjk_exact(paragraph, 5);
        for line in &lines[..lines.len() - 1] {
            assert_eq!(line.chars().count(), 5);
        }
        assert_eq!(lines.concat(), paragraph);
    }

    #[test]
    fn empty_input_produces_no_lines() {
        assert!(wrap("", 20.0, &CharCount).is_empty());
        assert!(wrap_cjk_exact("", 10).is_empty());
    }

    #[test]
    fn hard_newlines_are_paragraph_breaks() {
        let lines = wrap("first paragraph\nsecond one", 40.0, &CharCount);
        assert_eq!(lines, vec!["first paragraph", "second one"]);
    }

    #[test]
    fn display_columns_weighs_cjk_double() {
        assert_eq!(DisplayColumns.width("ab"), 2.0);
        assert_eq!(DisplayColumns.width("你好"), 4.0);
    }

    #[test]
    fn wrapping_is_restartable() {
        let text = "mixed 段落 with 中文 characters inside a single paragraph";
        let first = wrap(text, 12.0, &DisplayColumns);
        let second = wrap(text, 12.0, &DisplayColumns);
        assert_eq!(first, second);
    }

    #[test]
    fn mixed_cjk_paragraph_respects_measured_budget() {
        let text = "太阳系有八大行星而且还有很多卫星";
        let lines = wrap(text, 8.0, &DisplayColumns);
        for line in &lines {
            assert!(DisplayColumns.width(line) <= 8.0);
        }
        assert_eq!(lines.concat(), text);
    }
}
