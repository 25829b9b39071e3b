use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::{info, warn};

use crate::article::Article;
use crate::fonts::FontMetrics;
use crate::settings::Settings;

pub mod card;
pub mod markdown;
pub mod pdf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Markdown,
    Png,
    Pdf,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Png => "png",
            OutputFormat::Pdf => "pdf",
        }
    }
}

/// Parse a comma-separated format list such as `md,png,pdf`. Duplicates are
/// collapsed, order is kept.
pub fn parse_formats(value: &str) -> Result<Vec<OutputFormat>> {
    let mut formats = Vec::new();
    for part in value.split(',') {
        let part = part.trim().to_lowercase();
        if part.is_empty() {
            continue;
        }
        let format = match part.as_str() {
            "md" | "markdown" => OutputFormat::Markdown,
            "png" => OutputFormat::Png,
            "pdf" => OutputFormat::Pdf,
            other => return Err(anyhow!("unknown output format '{other}'")),
        };
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    if formats.is_empty() {
        return Err(anyhow!("no output formats requested"));
    }
    Ok(formats)
}

/// Render every requested format into `out_dir`. A failing format is logged
/// and skipped so one missing font does not block the markdown output.
/// Returns the paths that were actually produced.
pub fn render_all(
    article: &Article,
    out_dir: &Path,
    formats: &[OutputFormat],
    settings: &Settings,
    font: Option<&FontMetrics>,
    generated_at: &str,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output directory: {}", out_dir.display()))?;

    let stem = article.file_stem();
    let mut produced = Vec::new();
    for format in formats {
        let outcome = match format {
            OutputFormat::Markdown => {
                let path = out_dir.join(format!("{stem}.md"));
                markdown::write_markdown(&path, article, generated_at).map(|()| vec![path])
            }
            OutputFormat::Png => card::render_cards(article, out_dir, settings, font),
            OutputFormat::Pdf => {
                let path = out_dir.join(format!("{stem}.pdf"));
                pdf::write_pdf(&path, article, settings, generated_at).map(|()| vec![path])
            }
        };
        match outcome {
            Ok(paths) => {
                for path in &paths {
                    info!("wrote {}", path.display());
                }
                produced.extend(paths);
            }
            Err(err) => warn!("skipped {} output: {err:#}", format.as_str()),
        }
    }
    Ok(produced)
}
