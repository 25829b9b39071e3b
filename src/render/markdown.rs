//! Markdown study document, one file per article.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::article::Article;
use crate::wrap::wrap_chars;

/// Example sentences are broken for the table cell at this budget and joined
/// with `<br>` so they never produce a raw newline inside the row.
const EXAMPLE_WRAP: usize = 30;

pub fn write_markdown(path: &Path, article: &Article, generated_at: &str) -> Result<()> {
    fs::write(path, generate_markdown(article, generated_at))
        .with_context(|| format!("failed to write markdown: {}", path.display()))
}

/// `generated_at` is passed in rather than read from the clock so output is
/// reproducible.
pub fn generate_markdown(article: &Article, generated_at: &str) -> String {
    let mut md = format!(
        "# {title}\n\n> 生成时间: {generated_at}\n> 难度: {difficulty}\n> 字数: {word_count}\n\n---\n\n## 原文\n\n{original}\n\n---\n\n## 译文\n\n{translation}\n\n---\n\n## 词汇表\n\n| 单词 | 词性 | 释义 | 例句 |\n|------|------|------|------|\n",
        title = article.title,
        difficulty = article.difficulty,
        word_count = article.word_count,
        original = article.original,
        translation = article.translation,
    );

    for entry in &article.vocabulary {
        let example = wrap_chars(&entry.example, EXAMPLE_WRAP, EXAMPLE_WRAP).join("<br>");
        md.push_str(&format!(
            "| **{}** | {} | {} | {} |\n",
            entry.word, entry.pos, entry.meaning, example
        ));
    }

    md.push_str("\n---\n\n## 精彩句子\n\n");
    for (index, pair) in article.sentences.iter().enumerate() {
        md.push_str(&format!(
            "**{}.** {}\n\n> {}\n\n",
            index + 1,
            pair.original,
            pair.translation
        ));
    }

    md.push_str("\n---\n*Generated by WordCard*");
    md
}
