//! Phone-sized PNG study cards: a cover, a two-column vocabulary card and a
//! sentence card. Cards are assembled as SVG and rasterized; the canvas keeps
//! the configured width but grows vertically with content.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use resvg::render;
use tiny_skia::Pixmap;
use usvg::{Options, Tree, fontdb};

use crate::article::Article;
use crate::fonts::{FontMetrics, PxMeasure};
use crate::layout::{LayoutConfig, layout_vocabulary};
use crate::settings::Settings;
use crate::wrap::wrap;

const BRAND: &str = "WordCard";
const CONTENT_TOP: f32 = 90.0;

pub fn render_cards(
    article: &Article,
    out_dir: &Path,
    settings: &Settings,
    font: Option<&FontMetrics>,
) -> Result<Vec<PathBuf>> {
    let cards_dir = out_dir.join("cards");
    fs::create_dir_all(&cards_dir)
        .with_context(|| format!("failed to create cards directory: {}", cards_dir.display()))?;

    let family = settings
        .font_family
        .clone()
        .or_else(|| font.and_then(|metrics| metrics.family().map(str::to_string)));
    let font_data = font.map(|metrics| metrics.data().to_vec());

    let cards = [
        ("01_cover.png", cover_svg(article, settings, font, family.as_deref())),
        ("02_vocab.png", vocab_svg(article, settings, font, family.as_deref())),
        ("03_sentences.png", sentences_svg(article, settings, font, family.as_deref())),
    ];

    let mut produced = Vec::new();
    for (name, svg) in cards {
        let path = cards_dir.join(name);
        let bytes = rasterize(&svg, font_data.as_deref())?;
        fs::write(&path, bytes)
            .with_context(|| format!("failed to write card: {}", path.display()))?;
        produced.push(path);
    }
    Ok(produced)
}

struct Canvas {
    svg: String,
    width: f32,
}

impl Canvas {
    fn new(width: u32, height: f32, bg: &str) -> Self {
        let height = height.ceil();
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
        );
        svg.push_str(&format!(
            r#"<rect x="0" y="0" width="{width}" height="{height}" fill="{bg}"/>"#
        ));
        Self {
            svg,
            width: width as f32,
        }
    }

    fn panel(&mut self, x: f32, y: f32, width: f32, height: f32, fill: &str, stroke: &str) {
        self.svg.push_str(&format!(
            r#"<rect x="{x}" y="{y}" width="{width}" height="{height}" rx="4" fill="{fill}" stroke="{stroke}" stroke-width="1"/>"#
        ));
    }

    fn text(&mut self, x: f32, baseline: f32, size: f32, color: &str, family: Option<&str>, text: &str) {
        self.text_anchored(x, baseline, size, color, family, text, None);
    }

    fn centered(&mut self, baseline: f32, size: f32, color: &str, family: Option<&str>, text: &str) {
        self.text_anchored(self.width / 2.0, baseline, size, color, family, text, Some("middle"));
    }

    fn text_anchored(
        &mut self,
        x: f32,
        baseline: f32,
        size: f32,
        color: &str,
        family: Option<&str>,
        text: &str,
        anchor: Option<&str>,
    ) {
        let family_attr = family
            .map(|value| format!(r#" font-family="{}""#, escape_xml(value)))
            .unwrap_or_default();
        let anchor_attr = anchor
            .map(|value| format!(r#" text-anchor="{value}""#))
            .unwrap_or_default();
        self.svg.push_str(&format!(
            r#"<text x="{x}" y="{baseline}" font-size="{size}" fill="{color}"{family_attr}{anchor_attr}>{}</text>"#,
            escape_xml(text)
        ));
    }

    fn finish(mut self) -> String {
        self.svg.push_str("</svg>");
        self.svg
    }
}

/// Brand mark top-left, card title centered, stem label bottom-right. Shared
/// chrome for all three cards.
fn chrome(canvas: &mut Canvas, title: &str, label: &str, height: f32, settings: &Settings, family: Option<&str>) {
    let card = &settings.card;
    let colors = &settings.colors;
    canvas.text(card.margin, card.margin + card.header_font_size, card.header_font_size, &colors.accent, family, BRAND);
    canvas.centered(50.0 + card.title_font_size, card.title_font_size, &colors.title, family, title);
    canvas.text_anchored(
        canvas.width - card.margin,
        height - card.margin,
        card.small_font_size,
        &colors.translation,
        family,
        label,
        Some("end"),
    );
}

fn cover_svg(article: &Article, settings: &Settings, font: Option<&FontMetrics>, family: Option<&str>) -> String {
    let card = &settings.card;
    let measure = PxMeasure {
        font_size: card.title_font_size,
        metrics: font.cloned(),
    };
    let title_lines = wrap(&article.title, card.width as f32 - 2.0 * card.margin, &measure);

    let height = card.min_height as f32;
    let mut canvas = Canvas::new(card.width, height, &settings.colors.bg);
    canvas.text(card.margin, card.margin + card.header_font_size, card.header_font_size, &settings.colors.accent, family, BRAND);

    let mut baseline = 50.0 + card.title_font_size;
    for line in &title_lines {
        canvas.centered(baseline, card.title_font_size, &settings.colors.title, family, line);
        baseline += card.title_font_size + card.line_gap;
    }

    let meta = [
        format!("难度: {}", article.difficulty),
        format!("单词数: {}", article.word_count),
        format!("词汇: {}个", article.vocabulary.len()),
        format!("句子: {}句", article.sentences.len()),
    ];
    let mut y = (height * 0.45).max(baseline + card.line_gap);
    for line in meta {
        canvas.centered(y, card.text_font_size, &settings.colors.text, family, &line);
        y += card.text_font_size + card.line_gap;
    }

    canvas.text_anchored(
        canvas.width - card.margin,
        height - card.margin,
        card.small_font_size,
        &settings.colors.translation,
        family,
        "01_cover",
        Some("end"),
    );
    canvas.finish()
}

fn vocab_svg(article: &Article, settings: &Settings, font: Option<&FontMetrics>, family: Option<&str>) -> String {
    let card = &settings.card;
    let column_width = (card.width as f32 - 3.0 * card.margin) / 2.0;
    let config = LayoutConfig {
        column_width,
        line_height: card.small_font_size * 1.4,
        heading_height: card.text_font_size + 6.0,
        row_gap: card.line_gap,
    };
    let measure = PxMeasure {
        font_size: card.small_font_size,
        metrics: font.cloned(),
    };
    let layout = layout_vocabulary(&article.vocabulary, &config, &measure);

    let height = (CONTENT_TOP + layout.content_height + 2.0 * card.margin)
        .max(card.min_height as f32);
    let mut canvas = Canvas::new(card.width, height, &settings.colors.bg);
    chrome(&mut canvas, "词汇表", "02_vocab", height, settings, family);

    for row in &layout.rows {
        let x = card.margin + row.column as f32 * (column_width + card.margin);
        canvas.panel(
            x - 4.0,
            CONTENT_TOP + row.y_offset,
            column_width + 8.0,
            row.height - config.row_gap,
            &settings.colors.card_bg,
            &settings.colors.border,
        );
        let mut baseline = CONTENT_TOP + row.y_offset + card.text_font_size;
        canvas.text(x, baseline, card.text_font_size, &settings.colors.highlight, family, &row.heading);
        baseline += config.heading_height - card.text_font_size;
        for line in &row.meaning_lines {
            baseline += config.line_height;
            canvas.text(x, baseline, card.small_font_size, &settings.colors.translation, family, line);
        }
    }
    canvas.finish()
}

fn sentences_svg(article: &Article, settings: &Settings, font: Option<&FontMetrics>, family: Option<&str>) -> String {
    let card = &settings.card;
    let content_width = card.width as f32 - 2.0 * card.margin;
    let measure = PxMeasure {
        font_size: card.text_font_size,
        metrics: font.cloned(),
    };

    // Wrap everything first so the canvas height is known before drawing.
    let mut blocks: Vec<(Vec<String>, Vec<String>)> = Vec::new();
    let mut content_height = 0.0f32;
    for (index, pair) in article.sentences.iter().enumerate() {
        let original = wrap(&format!("{}. {}", index + 1, pair.original), content_width, &measure);
        let translation = wrap(&pair.translation, content_width, &measure);
        content_height += (original.len() + translation.len()) as f32
            * (card.text_font_size + card.line_gap)
            + card.line_gap * 2.0;
        blocks.push((original, translation));
    }

    let height = (CONTENT_TOP + content_height + 2.0 * card.margin).max(card.min_height as f32);
    let mut canvas = Canvas::new(card.width, height, &settings.colors.bg);
    chrome(&mut canvas, "精彩句子", "03_sentences", height, settings, family);

    let mut baseline = CONTENT_TOP + card.text_font_size;
    for (original, translation) in &blocks {
        for line in original {
            canvas.text(card.margin, baseline, card.text_font_size, &settings.colors.text, family, line);
            baseline += card.text_font_size + card.line_gap;
        }
        for line in translation {
            canvas.text(card.margin, baseline, card.text_font_size, &settings.colors.translation, family, line);
            baseline += card.text_font_size + card.line_gap;
        }
        baseline += card.line_gap * 2.0;
    }
    canvas.finish()
}

fn rasterize(svg: &str, font_data: Option<&[u8]>) -> Result<Vec<u8>> {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    if let Some(data) = font_data {
        db.load_font_data(data.to_vec());
    }
    let options = Options {
        fontdb: Arc::new(db),
        ..Options::default()
    };
    let tree = Tree::from_str(svg, &options).with_context(|| "failed to parse card SVG")?;
    let size = tree.size().to_int_size();
    let mut pixmap =
        Pixmap::new(size.width(), size.height()).ok_or_else(|| anyhow!("empty card size"))?;
    let mut pixmap_mut = pixmap.as_mut();
    render(&tree, tiny_skia::Transform::identity(), &mut pixmap_mut);
    let image = image::RgbaImage::from_raw(size.width(), size.height(), pixmap.data().to_vec())
        .ok_or_else(|| anyhow!("failed to build image buffer from card SVG"))?;
    let mut bytes = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut bytes);
    image::DynamicImage::ImageRgba8(image)
        .write_to(&mut cursor, image::ImageFormat::Png)
        .with_context(|| "failed to encode card PNG")?;
    Ok(bytes)
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::{SentencePair, VocabEntry};

    fn sample(vocab_count: usize) -> Article {
        let mut article = Article::new("Rocks & Minerals", "Some text about rocks.");
        for index in 0..vocab_count {
            article.vocabulary.push(VocabEntry {
                word: format!("word{index}"),
                pos: "n.".to_string(),
                meaning: "一个需要换行的比较长的中文释义内容".to_string(),
                example: String::new(),
            });
        }
        article.sentences.push(SentencePair {
            original: "Rocks are made of minerals.".to_string(),
            translation: "岩石由矿物组成。".to_string(),
        });
        article
    }

    fn svg_height(svg: &str) -> f32 {
        let start = svg.find("height=\"").unwrap() + 8;
        let end = svg[start..].find('"').unwrap();
        svg[start..start + end].parse().unwrap()
    }

    #[test]
    fn titles_are_xml_escaped() {
        let settings = Settings::default();
        let svg = cover_svg(&sample(0), &settings, None, None);
        assert!(svg.contains("Rocks &amp; Minerals"));
        assert!(!svg.contains("Rocks & Minerals<"));
    }

    #[test]
    fn cover_keeps_minimum_height() {
        let settings = Settings::default();
        let svg = cover_svg(&sample(0), &settings, None, None);
        assert_eq!(svg_height(&svg), settings.card.min_height as f32);
    }

    #[test]
    fn vocab_canvas_grows_with_content() {
        let settings = Settings::default();
        let small = vocab_svg(&sample(2), &settings, None, None);
        let large = vocab_svg(&sample(60), &settings, None, None);
        assert_eq!(svg_height(&small), settings.card.min_height as f32);
        assert!(svg_height(&large) > settings.card.min_height as f32);
    }

    #[test]
    fn vocab_rows_sit_on_configured_panels() {
        let settings = Settings::default();
        let svg = vocab_svg(&sample(2), &settings, None, None);
        assert!(svg.contains(&format!(r#"fill="{}""#, settings.colors.card_bg)));
        assert!(svg.contains(&format!(r#"stroke="{}""#, settings.colors.border)));
    }

    #[test]
    fn sentence_card_shows_numbered_originals() {
        let settings = Settings::default();
        let svg = sentences_svg(&sample(0), &settings, None, None);
        assert!(svg.contains("1. Rocks are made of minerals."));
        assert!(svg.contains("岩石由矿物组成。"));
    }
}
