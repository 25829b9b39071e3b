use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use crate::extract::{Scoring, SentenceOptions, VocabOptions};

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");

/// Card geometry. Heights are minimums; the canvas grows with content.
#[derive(Debug, Clone)]
pub struct CardStyle {
    pub width: u32,
    pub min_height: u32,
    pub margin: f32,
    pub title_font_size: f32,
    pub header_font_size: f32,
    pub text_font_size: f32,
    pub small_font_size: f32,
    pub line_gap: f32,
}

#[derive(Debug, Clone)]
pub struct Palette {
    pub bg: String,
    pub card_bg: String,
    pub title: String,
    pub text: String,
    pub translation: String,
    pub accent: String,
    pub highlight: String,
    pub border: String,
}

/// Character budgets for the text outputs.
#[derive(Debug, Clone)]
pub struct WrapWidths {
    pub english: usize,
    pub chinese: usize,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub card: CardStyle,
    pub colors: Palette,
    pub wrap: WrapWidths,
    pub vocab: VocabOptions,
    pub sentences: SentenceOptions,
    pub font_path: Option<String>,
    pub font_family: Option<String>,
    pub backend_base_url: String,
    pub backend_model: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            card: CardStyle {
                width: 375,
                min_height: 667,
                margin: 20.0,
                title_font_size: 28.0,
                header_font_size: 16.0,
                text_font_size: 14.0,
                small_font_size: 12.0,
                line_gap: 8.0,
            },
            colors: Palette {
                bg: "#F5F5DC".to_string(),
                card_bg: "#FFFFFF".to_string(),
                title: "#2C3E50".to_string(),
                text: "#34495E".to_string(),
                translation: "#7F8C8D".to_string(),
                accent: "#27AE60".to_string(),
                highlight: "#E74C3C".to_string(),
                border: "#E0E0E0".to_string(),
            },
            wrap: WrapWidths {
                english: 65,
                chinese: 40,
            },
            vocab: VocabOptions::default(),
            sentences: SentenceOptions::default(),
            font_path: None,
            font_family: None,
            backend_base_url: "http://127.0.0.1:11434/v1".to_string(),
            backend_model: "qwen2.5-7b-instruct".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    card: Option<CardSettings>,
    colors: Option<ColorSettings>,
    wrap: Option<WrapSettings>,
    extract: Option<ExtractSettings>,
    fonts: Option<FontSettings>,
    backend: Option<BackendSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct CardSettings {
    width: Option<u32>,
    min_height: Option<u32>,
    margin: Option<f32>,
    title_font_size: Option<f32>,
    header_font_size: Option<f32>,
    text_font_size: Option<f32>,
    small_font_size: Option<f32>,
    line_gap: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct ColorSettings {
    bg: Option<String>,
    card_bg: Option<String>,
    title: Option<String>,
    text: Option<String>,
    translation: Option<String>,
    accent: Option<String>,
    highlight: Option<String>,
    border: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WrapSettings {
    english: Option<usize>,
    chinese: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct ExtractSettings {
    vocab_min_len: Option<usize>,
    vocab_max_count: Option<usize>,
    vocab_scoring: Option<String>,
    sentence_min_chars: Option<usize>,
    sentence_max_chars: Option<usize>,
    sentence_max_count: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct FontSettings {
    path: Option<String>,
    family: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct BackendSettings {
    base_url: Option<String>,
    model: Option<String>,
}

/// Load settings with later files overriding earlier ones: the embedded
/// defaults, then `settings.toml` / `settings.local.toml` in the working
/// directory, then the same pair under `~/.wordcard/`, then `extra_path`.
pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();
    ensure_home_settings_file()?;

    let mut ordered_paths = vec![
        PathBuf::from("settings.toml"),
        PathBuf::from("settings.local.toml"),
    ];
    if let Some(home) = home_dir() {
        ordered_paths.push(home.join("settings.toml"));
        ordered_paths.push(home.join("settings.local.toml"));
    }
    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            let parsed: SettingsFile = toml::from_str(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
            settings.merge(parsed)?;
        }
    }

    Ok(settings)
}

impl Settings {
    fn merge(&mut self, incoming: SettingsFile) -> Result<()> {
        if let Some(card) = incoming.card {
            merge_field(&mut self.card.width, card.width);
            merge_field(&mut self.card.min_height, card.min_height);
            merge_field(&mut self.card.margin, card.margin);
            merge_field(&mut self.card.title_font_size, card.title_font_size);
            merge_field(&mut self.card.header_font_size, card.header_font_size);
            merge_field(&mut self.card.text_font_size, card.text_font_size);
            merge_field(&mut self.card.small_font_size, card.small_font_size);
            merge_field(&mut self.card.line_gap, card.line_gap);
        }
        if let Some(colors) = incoming.colors {
            merge_color(&mut self.colors.bg, colors.bg);
            merge_color(&mut self.colors.card_bg, colors.card_bg);
            merge_color(&mut self.colors.title, colors.title);
            merge_color(&mut self.colors.text, colors.text);
            merge_color(&mut self.colors.translation, colors.translation);
            merge_color(&mut self.colors.accent, colors.accent);
            merge_color(&mut self.colors.highlight, colors.highlight);
            merge_color(&mut self.colors.border, colors.border);
        }
        if let Some(wrap) = incoming.wrap {
            if let Some(value) = wrap.english.filter(|value| *value > 0) {
                self.wrap.english = value;
            }
            if let Some(value) = wrap.chinese.filter(|value| *value > 0) {
                self.wrap.chinese = value;
            }
        }
        if let Some(extract) = incoming.extract {
            merge_field(&mut self.vocab.min_len, extract.vocab_min_len);
            merge_field(&mut self.vocab.max_count, extract.vocab_max_count);
            if let Some(raw) = extract.vocab_scoring {
                self.vocab.scoring = Scoring::parse(&raw)
                    .ok_or_else(|| anyhow!("unknown vocab_scoring value '{raw}'"))?;
            }
            merge_field(&mut self.sentences.min_chars, extract.sentence_min_chars);
            merge_field(&mut self.sentences.max_chars, extract.sentence_max_chars);
            merge_field(&mut self.sentences.max_count, extract.sentence_max_count);
        }
        if let Some(fonts) = incoming.fonts {
            if let Some(path) = fonts.path.filter(|value| !value.trim().is_empty()) {
                self.font_path = Some(path);
            }
            if let Some(family) = fonts.family.filter(|value| !value.trim().is_empty()) {
                self.font_family = Some(family);
            }
        }
        if let Some(backend) = incoming.backend {
            if let Some(url) = backend.base_url.filter(|value| !value.trim().is_empty()) {
                self.backend_base_url = url;
            }
            if let Some(model) = backend.model.filter(|value| !value.trim().is_empty()) {
                self.backend_model = model;
            }
        }
        Ok(())
    }
}

fn merge_field<T>(target: &mut T, incoming: Option<T>) {
    if let Some(value) = incoming {
        *target = value;
    }
}

fn merge_color(target: &mut String, incoming: Option<String>) {
    if let Some(value) = incoming
        && !value.trim().is_empty()
    {
        *target = value;
    }
}

fn ensure_home_settings_file() -> Result<()> {
    let Some(home) = home_dir() else {
        return Ok(());
    };
    fs::create_dir_all(&home)
        .with_context(|| format!("failed to create settings directory: {}", home.display()))?;
    let path = home.join("settings.toml");
    if !path.exists() {
        fs::write(&path, DEFAULT_SETTINGS_TOML)
            .with_context(|| format!("failed to write settings: {}", path.display()))?;
    }
    Ok(())
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().and_then(|home| {
        let home = home.trim();
        if home.is_empty() {
            None
        } else {
            Some(Path::new(home).join(".wordcard"))
        }
    })
}
