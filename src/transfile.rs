//! The flat-file interchange format bridging the translate and render steps.
//!
//! ```text
//! TITLE: <string>
//! DIFFICULTY: <string>
//! WORD_COUNT: <integer>
//! DATE: <YYYY-MM-DD>
//! ---
//! ORIGINAL:
//! <free text, newline-preserved>
//! ---
//! TRANSLATION:          (EN-CH: accepted as an alias on parse)
//! <free text, newline-preserved>
//! ---
//! VOCABULARY:
//! <word>|<pos>|<meaning>|<example-or-empty>
//! ---
//! SENTENCES:
//! <original>|<translation>
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use time::Date;
use tracing::debug;

use crate::article::{Article, DEFAULT_DIFFICULTY, SentencePair, VocabEntry};

/// Current accumulation target while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Original,
    Translation,
    Vocabulary,
    Sentences,
}

/// Serialize an article. Output is deterministic for a given article and
/// `date`; the `DATE:` line is omitted when `date` is `None` and is excluded
/// from the round-trip invariant either way.
pub fn serialize(article: &Article, date: Option<Date>) -> String {
    let mut out = String::new();
    out.push_str(&format!("TITLE: {}\n", article.title));
    out.push_str(&format!("DIFFICULTY: {}\n", article.difficulty));
    out.push_str(&format!("WORD_COUNT: {}\n", article.word_count));
    if let Some(date) = date {
        out.push_str(&format!(
            "DATE: {:04}-{:02}-{:02}\n",
            date.year(),
            date.month() as u8,
            date.day()
        ));
    }
    out.push_str("---\n");

    out.push_str("ORIGINAL:\n");
    out.push_str(&article.original);
    out.push_str("\n---\n");

    out.push_str("TRANSLATION:\n");
    out.push_str(&article.translation);
    out.push_str("\n---\n");

    out.push_str("VOCABULARY:\n");
    for entry in &article.vocabulary {
        // Trailing fields may be empty but every pipe is emitted.
        out.push_str(&format!(
            "{}|{}|{}|{}\n",
            entry.word, entry.pos, entry.meaning, entry.example
        ));
    }
    out.push_str("---\n");

    out.push_str("SENTENCES:\n");
    for pair in &article.sentences {
        out.push_str(&format!("{}|{}\n", pair.original, pair.translation));
    }
    out
}

/// Parse the flat-file format. Malformed vocabulary/sentence records are
/// dropped, not errors; a trailing blank line before a `---` is tolerated.
pub fn parse(content: &str) -> Article {
    let mut article = Article {
        title: String::new(),
        difficulty: DEFAULT_DIFFICULTY.to_string(),
        word_count: 0,
        original: String::new(),
        translation: String::new(),
        vocabulary: Vec::new(),
        sentences: Vec::new(),
    };

    let mut section = Section::None;
    let mut original_lines: Vec<String> = Vec::new();
    let mut translation_lines: Vec<String> = Vec::new();

    for raw in content.lines() {
        let line = raw.trim_end();

        if line == "---" {
            section = Section::None;
            continue;
        }
        if let Some(next) = section_for_header(line) {
            section = next;
            continue;
        }

        match section {
            Section::None => {
                if let Some(value) = line.strip_prefix("TITLE:") {
                    article.title = value.trim().to_string();
                } else if let Some(value) = line.strip_prefix("DIFFICULTY:") {
                    article.difficulty = value.trim().to_string();
                } else if let Some(value) = line.strip_prefix("WORD_COUNT:") {
                    article.word_count = value.trim().parse().unwrap_or(0);
                } else if line.strip_prefix("DATE:").is_some() {
                    // Volatile; dropped on parse.
                }
            }
            Section::Original => original_lines.push(line.to_string()),
            Section::Translation => translation_lines.push(line.to_string()),
            Section::Vocabulary => {
                if let Some(entry) = parse_vocab_record(line) {
                    article.vocabulary.push(entry);
                } else if !line.trim().is_empty() {
                    debug!("dropping malformed vocabulary record: {line:?}");
                }
            }
            Section::Sentences => {
                if let Some(pair) = parse_sentence_record(line) {
                    article.sentences.push(pair);
                } else if !line.trim().is_empty() {
                    debug!("dropping malformed sentence record: {line:?}");
                }
            }
        }
    }

    article.original = join_body(original_lines);
    article.translation = join_body(translation_lines);
    article
}

pub fn read(path: &Path) -> Result<Article> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read article file: {}", path.display()))?;
    Ok(parse(&content))
}

pub fn write(path: &Path, article: &Article, date: Option<Date>) -> Result<()> {
    fs::write(path, serialize(article, date))
        .with_context(|| format!("failed to write article file: {}", path.display()))
}

fn section_for_header(line: &str) -> Option<Section> {
    match line {
        "ORIGINAL:" => Some(Section::Original),
        "TRANSLATION:" | "EN-CH:" => Some(Section::Translation),
        "VOCABULARY:" => Some(Section::Vocabulary),
        "SENTENCES:" => Some(Section::Sentences),
        _ => None,
    }
}

fn join_body(mut lines: Vec<String>) -> String {
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

fn parse_vocab_record(line: &str) -> Option<VocabEntry> {
    if line.trim().is_empty() {
        return None;
    }
    let parts: Vec<&str> = line.splitn(4, '|').collect();
    if parts.len() < 3 {
        return None;
    }
    Some(VocabEntry::new(
        parts[0],
        parts[1],
        parts[2],
        parts.get(3).copied().unwrap_or(""),
    ))
}

fn parse_sentence_record(line: &str) -> Option<SentencePair> {
    if line.trim().is_empty() {
        return None;
    }
    let (original, translation) = line.split_once('|')?;
    Some(SentencePair::new(original, translation))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_article() -> Article {
        Article {
            title: "Solar System".to_string(),
            difficulty: "intermediate".to_string(),
            word_count: 17,
            original: "The solar system consists of the Sun.\nPlanets orbit it.".to_string(),
            translation: "太阳系由太阳组成。\n行星绕其运行。".to_string(),
            vocabulary: vec![
                VocabEntry {
                    word: "gravity".to_string(),
                    pos: "n.".to_string(),
                    meaning: "重力".to_string(),
                    example: "Objects are bound by gravity.".to_string(),
                },
                VocabEntry {
                    word: "planets".to_string(),
                    pos: "n.".to_string(),
                    meaning: "行星".to_string(),
                    example: String::new(),
                },
            ],
            sentences: vec![SentencePair {
                original: "The solar system consists of the Sun.".to_string(),
                translation: "太阳系由太阳组成。".to_string(),
            }],
        }
    }

    #[test]
    fn round_trip_preserves_article() {
        let article = sample_article();
        let parsed = parse(&serialize(&article, None));
        assert_eq!(parsed, article);
    }

    #[test]
    fn padded_record_fields_round_trip_via_constructors() {
        let mut article = sample_article();
        article.vocabulary = vec![VocabEntry::new(" orbit ", " n. ", " 轨道 ", "  ")];
        article.sentences = vec![SentencePair::new(" Planets orbit the Sun. ", " 行星绕日。 ")];
        let parsed = parse(&serialize(&article, None));
        assert_eq!(parsed, article);
    }

    #[test]
    fn date_is_emitted_but_excluded_from_round_trip() {
        let article = sample_article();
        let date = Date::from_calendar_date(2026, time::Month::August, 27).unwrap();
        let text = serialize(&article, Some(date));
        assert!(text.contains("DATE: 2026-08-27"));
        assert_eq!(parse(&text), article);
    }

    #[test]
    fn empty_trailing_fields_keep_their_pipes() {
        let article = sample_article();
        let text = serialize(&article, None);
        assert!(text.contains("planets|n.|行星|\n"));
    }

    #[test]
    fn malformed_records_are_dropped() {
        let text = "VOCABULARY:\nok|n.|好|\nbroken line\nword|n.\n---\nSENTENCES:\nno pipe here\na|b\n";
        let article = parse(text);
        assert_eq!(article.vocabulary.len(), 1);
        assert_eq!(article.vocabulary[0].word, "ok");
        assert_eq!(article.sentences.len(), 1);
        assert_eq!(article.sentences[0].original, "a");
    }

    #[test]
    fn en_ch_header_is_translation_alias() {
        let text = "TITLE: T\n---\nEN-CH:\n双语内容\n---\n";
        let article = parse(text);
        assert_eq!(article.translation, "双语内容");
    }

    #[test]
    fn trailing_blank_line_before_delimiter_is_tolerated() {
        let text = "ORIGINAL:\nbody line\n\n---\nTRANSLATION:\n译文\n---\n";
        let article = parse(text);
        assert_eq!(article.original, "body line");
        assert_eq!(article.translation, "译文");
    }

    #[test]
    fn meaning_may_contain_pipes_in_example_tail() {
        let entry = parse_vocab_record("word|n.|meaning|an example | with pipe").unwrap();
        assert_eq!(entry.example, "an example | with pipe");
    }

    #[test]
    fn header_lines_ignore_trailing_whitespace() {
        let text = "VOCABULARY:   \nword|n.|意思|\n---\n";
        let article = parse(text);
        assert_eq!(article.vocabulary.len(), 1);
    }
}
