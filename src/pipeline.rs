//! The two pipeline steps: `translate` produces the flat bilingual file,
//! `render` turns it into md/png/pdf. They are separate so the expensive
//! backend work runs once and rendering can be repeated freely.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use time::OffsetDateTime;
use time::macros::format_description;
use tracing::{info, warn};

use crate::article::{Article, SentencePair, VocabEntry};
use crate::extract::{extract_sentences, extract_vocabulary, guess_pos, split_sentences};
use crate::fonts::resolve_card_font;
use crate::oneshot::parse_one_shot;
use crate::prompts;
use crate::providers::{Backend, translate_batch};
use crate::render::{OutputFormat, render_all};
use crate::settings::Settings;
use crate::transfile;

/// `snowball_earth.txt` becomes the title `Snowball Earth`.
pub fn title_from_stem(stem: &str) -> String {
    stem.split(['_', '-', ' '])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn input_stem(input: &Path) -> Result<String> {
    input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("cannot derive a name from input: {}", input.display()))
}

fn article_dir(out_dir: &Path, stem: &str) -> PathBuf {
    out_dir.join(stem)
}

fn bilingual_path(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{stem}.txt"))
}

/// Split the source into blank-line separated paragraphs, preserving order.
fn paragraphs(text: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                result.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        result.push(current.join("\n"));
    }
    result
}

/// First source sentence containing `word`, used as the example column.
fn find_example(sentences: &[String], word: &str) -> String {
    let needle = word.to_lowercase();
    sentences
        .iter()
        .find(|sentence| sentence.to_lowercase().contains(&needle))
        .cloned()
        .unwrap_or_default()
}

fn now_timestamp() -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    OffsetDateTime::now_utc()
        .format(&format)
        .unwrap_or_default()
}

/// Translate `input` into the bilingual flat file. The step is idempotent: an
/// existing output is kept untouched and the caller is told to delete it to
/// retranslate.
pub async fn translate_step<B: Backend>(
    backend: &B,
    input: &Path,
    out_dir: &Path,
    difficulty: &str,
    settings: &Settings,
) -> Result<PathBuf> {
    let stem = input_stem(input)?;
    let dir = article_dir(out_dir, &stem);
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create output directory: {}", dir.display()))?;

    let path = bilingual_path(&dir, &stem);
    if path.exists() {
        info!(
            "bilingual file already exists: {} (delete it to retranslate)",
            path.display()
        );
        return Ok(path);
    }

    let text = fs::read_to_string(input)
        .with_context(|| format!("failed to read article: {}", input.display()))?;
    let mut article = Article::new(title_from_stem(&stem), text.trim_end().to_string())
        .with_difficulty(difficulty);
    info!("translating '{}' ({} words)", article.title, article.word_count);

    let source_paragraphs = paragraphs(&article.original);
    let translated = translate_batch(backend, &source_paragraphs, prompts::translate_prompt).await;
    article.translation = translated.join("\n\n");

    let words = extract_vocabulary(&article.original, &settings.vocab);
    info!("extracted {} vocabulary words", words.len());
    let meanings = translate_batch(backend, &words, prompts::word_prompt).await;
    let source_sentences = split_sentences(&article.original);
    article.vocabulary = words
        .iter()
        .zip(meanings)
        .map(|(word, meaning)| {
            VocabEntry::new(
                word.as_str(),
                guess_pos(word),
                meaning,
                find_example(&source_sentences, word),
            )
        })
        .collect();

    let picked = extract_sentences(&article.original, &settings.sentences, &words);
    info!("extracted {} sentences", picked.len());
    let sentence_translations = translate_batch(backend, &picked, prompts::translate_prompt).await;
    article.sentences = picked
        .into_iter()
        .zip(sentence_translations)
        .map(|(original, translation)| SentencePair::new(original, translation))
        .collect();

    transfile::write(&path, &article, Some(OffsetDateTime::now_utc().date()))?;
    info!("wrote {}", path.display());
    Ok(path)
}

/// One backend call producing the whole bilingual document, then parsed into
/// the same flat file the two-step path writes.
pub async fn one_shot_step<B: Backend>(
    backend: &B,
    input: &Path,
    out_dir: &Path,
    difficulty: &str,
    settings: &Settings,
) -> Result<PathBuf> {
    let stem = input_stem(input)?;
    let dir = article_dir(out_dir, &stem);
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create output directory: {}", dir.display()))?;

    let path = bilingual_path(&dir, &stem);
    if path.exists() {
        info!(
            "bilingual file already exists: {} (delete it to retranslate)",
            path.display()
        );
        return Ok(path);
    }

    let text = fs::read_to_string(input)
        .with_context(|| format!("failed to read article: {}", input.display()))?;
    let prompt = prompts::one_shot_prompt(
        &text,
        settings.vocab.max_count,
        settings.sentences.max_count,
    )?;
    info!("requesting one-shot document from backend");
    let response = backend.clone().generate(prompt).await?;
    let article = parse_one_shot(&response, &title_from_stem(&stem), difficulty);
    if article.original.is_empty() {
        return Err(anyhow!("one-shot response carried no recognizable sections"));
    }

    transfile::write(&path, &article, Some(OffsetDateTime::now_utc().date()))?;
    info!("wrote {}", path.display());
    Ok(path)
}

/// Render the article's outputs from its bilingual file.
pub fn render_step(
    input: &Path,
    out_dir: &Path,
    formats: &[OutputFormat],
    settings: &Settings,
) -> Result<Vec<PathBuf>> {
    let stem = input_stem(input)?;
    let dir = article_dir(out_dir, &stem);
    let path = find_bilingual_file(&dir, &stem).ok_or_else(|| {
        anyhow!(
            "no bilingual file found in {}; run the translate step first",
            dir.display()
        )
    })?;
    info!("rendering from {}", path.display());

    let article = transfile::read(&path)?;
    // A bad font configuration must not block the formats that need no font.
    let font = match resolve_card_font(
        settings.font_path.as_deref().map(Path::new),
        settings.font_family.as_deref(),
    ) {
        Ok(font) => font,
        Err(err) => {
            warn!("card font unavailable, using estimated glyph widths: {err:#}");
            None
        }
    };
    render_all(
        &article,
        &dir,
        formats,
        settings,
        font.as_ref(),
        &now_timestamp(),
    )
}

fn find_bilingual_file(dir: &Path, stem: &str) -> Option<PathBuf> {
    let preferred = bilingual_path(dir, stem);
    if preferred.exists() {
        return Some(preferred);
    }
    let entries = fs::read_dir(dir).ok()?;
    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_come_from_file_stems() {
        assert_eq!(title_from_stem("snowball_earth"), "Snowball Earth");
        assert_eq!(title_from_stem("solar-system"), "Solar System");
        assert_eq!(title_from_stem("already titled"), "Already Titled");
    }

    #[test]
    fn paragraphs_split_on_blank_lines() {
        let text = "first line\nsecond line\n\nnext paragraph\n\n\nlast";
        let parts = paragraphs(text);
        assert_eq!(
            parts,
            vec!["first line\nsecond line", "next paragraph", "last"]
        );
    }

    #[test]
    fn example_lookup_is_case_insensitive() {
        let sentences = vec![
            "Nothing relevant here.".to_string(),
            "Gravity holds the planets.".to_string(),
        ];
        assert_eq!(
            find_example(&sentences, "gravity"),
            "Gravity holds the planets."
        );
        assert_eq!(find_example(&sentences, "orbit"), "");
    }

    #[test]
    fn render_without_bilingual_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = render_step(
            Path::new("missing_article.txt"),
            dir.path(),
            &[OutputFormat::Markdown],
            &Settings::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("translate step"));
    }

    #[test]
    fn unreadable_font_still_renders_fontless_formats() {
        let dir = tempfile::tempdir().unwrap();
        let article_dir = dir.path().join("story");
        fs::create_dir_all(&article_dir).unwrap();
        fs::write(
            article_dir.join("story.txt"),
            "TITLE: Story\n---\nORIGINAL:\nSome text.\n---\nTRANSLATION:\n一些文字。\n---\n",
        )
        .unwrap();

        let mut settings = Settings::default();
        settings.font_path = Some("/nonexistent/font.ttf".to_string());
        let produced = render_step(
            Path::new("story.txt"),
            dir.path(),
            &[OutputFormat::Markdown],
            &settings,
        )
        .unwrap();
        assert_eq!(produced.len(), 1);
        assert!(produced[0].extension().is_some_and(|ext| ext == "md"));
        assert!(produced[0].exists());
    }

    #[test]
    fn render_uses_any_txt_as_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let article_dir = dir.path().join("story");
        fs::create_dir_all(&article_dir).unwrap();
        fs::write(article_dir.join("other_name.txt"), "TITLE: Story\n---\n").unwrap();
        let found = find_bilingual_file(&article_dir, "story").unwrap();
        assert!(found.ends_with("other_name.txt"));
    }
}
