//! Parser for the bracket-marked document the one-shot prompt produces.
//!
//! The backend answers with four sections, each introduced by a marker line
//! (`【英文原文】`, `【中英双语】`, `【英文单词列表】`, `【精彩句子】`). The
//! vocabulary section carries numbered `word|meaning` lines; the sentence
//! section alternates an English line with its Chinese translation.

use std::sync::LazyLock;

use regex::Regex;

use crate::article::{Article, SentencePair, VocabEntry};
use crate::extract::guess_pos;
use crate::wrap::{Script, classify};

static NUMBERING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\s*[\.、)]\s*").expect("numbering regex"));

#[derive(Debug, Default)]
struct Sections {
    original: Vec<String>,
    bilingual: Vec<String>,
    vocabulary: Vec<String>,
    sentences: Vec<String>,
}

/// Build an [`Article`] from a one-shot response. Unrecognized lines outside
/// any marker are ignored; a response without markers yields an article with
/// only title and difficulty filled in.
pub fn parse_one_shot(response: &str, title: &str, difficulty: &str) -> Article {
    let sections = split_sections(response);

    let original = join_trimmed(&sections.original);
    let mut article = Article::new(title, original).with_difficulty(difficulty);
    article.translation = join_trimmed(&sections.bilingual);
    article.vocabulary = sections
        .vocabulary
        .iter()
        .filter_map(|line| parse_vocab_line(line))
        .collect();
    article.sentences = pair_sentences(&sections.sentences);
    article
}

fn split_sections(response: &str) -> Sections {
    let mut sections = Sections::default();
    let mut current: Option<&mut Vec<String>> = None;

    for line in response.lines() {
        match line.trim() {
            "【英文原文】" => current = Some(&mut sections.original),
            "【中英双语】" => current = Some(&mut sections.bilingual),
            "【英文单词列表】" => current = Some(&mut sections.vocabulary),
            "【精彩句子】" => current = Some(&mut sections.sentences),
            _ => {
                if let Some(target) = &mut current {
                    target.push(line.to_string());
                }
            }
        }
    }
    sections
}

fn join_trimmed(lines: &[String]) -> String {
    lines.join("\n").trim().to_string()
}

fn strip_numbering(line: &str) -> String {
    NUMBERING_RE.replace(line.trim(), "").to_string()
}

/// `1. word|meaning` or `word|pos|meaning`. Two-field lines get a guessed
/// part-of-speech tag.
fn parse_vocab_line(line: &str) -> Option<VocabEntry> {
    let stripped = strip_numbering(line);
    if stripped.is_empty() {
        return None;
    }
    let parts: Vec<&str> = stripped.splitn(3, '|').map(str::trim).collect();
    match parts.as_slice() {
        [word, meaning] if !word.is_empty() && !meaning.is_empty() => {
            Some(VocabEntry::new(*word, guess_pos(word), *meaning, ""))
        }
        [word, pos, meaning] if !word.is_empty() && !meaning.is_empty() => {
            Some(VocabEntry::new(*word, *pos, *meaning, ""))
        }
        _ => None,
    }
}

/// Pair each English line with the Chinese line that follows it. English
/// lines without a translation are dropped; stray Chinese lines before any
/// English line are ignored.
fn pair_sentences(lines: &[String]) -> Vec<SentencePair> {
    let mut pairs = Vec::new();
    let mut pending: Option<String> = None;

    for line in lines {
        let text = strip_numbering(line);
        if text.is_empty() {
            continue;
        }
        match classify(&text) {
            Script::Latin => pending = Some(text),
            Script::Cjk => {
                if let Some(original) = pending.take() {
                    pairs.push(SentencePair::new(original, text));
                }
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = "\
【英文原文】
The solar system consists of the Sun.
Planets orbit it.

【中英双语】
The solar system consists of the Sun.
太阳系由太阳组成。

【英文单词列表】
1. gravity|重力
2. consists|v.|组成
3. |missing word

【精彩句子】
1. Gravity binds the planets together.
   重力将行星聚拢在一起。
2. An unfinished sentence without translation.
";

    #[test]
    fn sections_are_recovered() {
        let article = parse_one_shot(RESPONSE, "Solar System", "intermediate");
        assert_eq!(article.title, "Solar System");
        assert!(article.original.starts_with("The solar system"));
        assert!(article.original.ends_with("Planets orbit it."));
        assert!(article.translation.contains("太阳系由太阳组成。"));
    }

    #[test]
    fn vocab_lines_get_pos_when_missing() {
        let article = parse_one_shot(RESPONSE, "T", "easy");
        assert_eq!(article.vocabulary.len(), 2);
        assert_eq!(article.vocabulary[0].word, "gravity");
        assert_eq!(article.vocabulary[0].pos, "adj.");
        assert_eq!(article.vocabulary[1].pos, "v.");
        assert_eq!(article.vocabulary[1].meaning, "组成");
    }

    #[test]
    fn sentences_pair_english_with_following_chinese() {
        let article = parse_one_shot(RESPONSE, "T", "easy");
        assert_eq!(article.sentences.len(), 1);
        assert_eq!(
            article.sentences[0].original,
            "Gravity binds the planets together."
        );
        assert_eq!(article.sentences[0].translation, "重力将行星聚拢在一起。");
    }

    #[test]
    fn markerless_response_yields_empty_article() {
        let article = parse_one_shot("no markers here", "T", "easy");
        assert!(article.original.is_empty());
        assert!(article.vocabulary.is_empty());
        assert!(article.sentences.is_empty());
    }
}
