//! Prompt templates sent to the backend. Embedded at compile time and
//! rendered with Tera so count placeholders stay in one place.

use anyhow::{Context as _, Result};
use tera::{Context, Tera};

const TRANSLATE_TEMPLATE: &str = include_str!("prompts/translate.tera");
const WORD_TEMPLATE: &str = include_str!("prompts/word.tera");
const ONE_SHOT_TEMPLATE: &str = include_str!("prompts/one_shot.tera");

/// Prompt asking for a plain Chinese translation of `text`.
pub fn translate_prompt(text: &str) -> Result<String> {
    let mut context = Context::new();
    context.insert("text", text);
    Tera::one_off(TRANSLATE_TEMPLATE, &context, false)
        .with_context(|| "failed to render translate prompt")
}

/// Prompt asking for a short gloss of a single word.
pub fn word_prompt(word: &str) -> Result<String> {
    let mut context = Context::new();
    context.insert("word", word);
    Tera::one_off(WORD_TEMPLATE, &context, false)
        .with_context(|| "failed to render word prompt")
}

/// Prompt producing the whole bracket-marked study document in one call.
pub fn one_shot_prompt(text: &str, vocab_count: usize, sentence_count: usize) -> Result<String> {
    let mut context = Context::new();
    context.insert("text", text);
    context.insert("vocab_count", &vocab_count);
    context.insert("sentence_count", &sentence_count);
    Tera::one_off(ONE_SHOT_TEMPLATE, &context, false)
        .with_context(|| "failed to render one-shot prompt")
}
