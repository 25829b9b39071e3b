//! Paginated PDF rendition of an article. Pages keep the phone-card
//! proportions so the PDF mirrors the PNG set.

use std::fs::File;
use std::io::{BufWriter, Cursor};
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use printpdf::{
    Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference, Rgb,
};

use crate::article::Article;
use crate::settings::Settings;
use crate::wrap::wrap_chars;

const PT_TO_MM: f32 = 25.4 / 72.0;
const LINE_SPACING: f32 = 1.5;

pub fn write_pdf(
    path: &Path,
    article: &Article,
    settings: &Settings,
    generated_at: &str,
) -> Result<()> {
    // A CJK-capable font is mandatory; the built-in PDF fonts cannot encode
    // the translation text.
    let font_path = settings
        .font_path
        .as_deref()
        .ok_or_else(|| anyhow!("pdf output requires fonts.path in settings"))?;
    let font_data = std::fs::read(font_path)
        .with_context(|| format!("failed to read pdf font: {font_path}"))?;

    let card = &settings.card;
    let width_mm = px_to_mm(card.width as f32);
    let height_mm = px_to_mm(card.min_height as f32);
    let margin_mm = px_to_mm(card.margin);

    let (doc, page, layer) = PdfDocument::new(&article.title, Mm(width_mm), Mm(height_mm), "Page 1");
    let font = doc
        .add_external_font(&mut Cursor::new(&font_data))
        .map_err(|err| anyhow!("failed to embed pdf font: {err}"))?;

    let mut writer = PageWriter {
        doc: &doc,
        layer: doc.get_page(page).get_layer(layer),
        font: &font,
        width_mm,
        height_mm,
        margin_mm,
        y: height_mm - margin_mm,
        pages: 1,
    };

    // Cover.
    writer.gap(px_to_mm(60.0));
    writer.colored(&settings.colors.title);
    writer.line(&article.title, card.title_font_size);
    writer.gap(px_to_mm(20.0));
    writer.colored(&settings.colors.translation);
    for meta in [
        format!("难度: {}", article.difficulty),
        format!("单词数: {}", article.word_count),
        format!("词汇: {}个", article.vocabulary.len()),
        format!("句子: {}句", article.sentences.len()),
        generated_at.to_string(),
    ] {
        writer.line(&meta, card.small_font_size);
    }

    // Original and translation, one section per page.
    for (heading, body) in [("原文", &article.original), ("译文", &article.translation)] {
        writer.new_page();
        writer.heading(heading, settings);
        writer.colored(&settings.colors.text);
        for line in wrap_chars(body, settings.wrap.english, settings.wrap.chinese) {
            writer.line(&line, card.text_font_size);
        }
    }

    writer.new_page();
    writer.heading(&format!("词汇表 ({}词)", article.vocabulary.len()), settings);
    for entry in &article.vocabulary {
        writer.colored(&settings.colors.highlight);
        writer.line(&format!("{} {}", entry.word, entry.pos), card.text_font_size);
        writer.colored(&settings.colors.translation);
        for line in wrap_chars(&entry.meaning, settings.wrap.english, settings.wrap.chinese) {
            writer.line(&line, card.small_font_size);
        }
        writer.gap(px_to_mm(card.line_gap));
    }

    writer.new_page();
    writer.heading("精彩句子", settings);
    for (index, pair) in article.sentences.iter().enumerate() {
        writer.colored(&settings.colors.text);
        let numbered = format!("{}. {}", index + 1, pair.original);
        for line in wrap_chars(&numbered, settings.wrap.english, settings.wrap.chinese) {
            writer.line(&line, card.text_font_size);
        }
        writer.colored(&settings.colors.translation);
        for line in wrap_chars(&pair.translation, settings.wrap.english, settings.wrap.chinese) {
            writer.line(&line, card.small_font_size);
        }
        writer.gap(px_to_mm(card.line_gap));
    }

    let file =
        File::create(path).with_context(|| format!("failed to create pdf: {}", path.display()))?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|err| anyhow!("failed to write pdf: {err}"))?;
    Ok(())
}

struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    font: &'a IndirectFontRef,
    width_mm: f32,
    height_mm: f32,
    margin_mm: f32,
    y: f32,
    pages: usize,
}

impl PageWriter<'_> {
    fn new_page(&mut self) {
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(self.width_mm),
            Mm(self.height_mm),
            format!("Page {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = self.height_mm - self.margin_mm;
    }

    /// Write one line and advance the cursor, breaking to a fresh page when
    /// the cursor would leave the bottom margin.
    fn line(&mut self, text: &str, size_pt: f32) {
        let advance = size_pt * PT_TO_MM * LINE_SPACING;
        if self.y - advance < self.margin_mm {
            self.new_page();
        }
        self.y -= advance;
        self.layer
            .use_text(text, size_pt, Mm(self.margin_mm), Mm(self.y), self.font);
    }

    fn heading(&mut self, text: &str, settings: &Settings) {
        self.colored(&settings.colors.accent);
        self.line(text, settings.card.header_font_size);
        self.gap(px_to_mm(settings.card.line_gap));
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }

    fn colored(&mut self, hex: &str) {
        let (r, g, b) = hex_rgb(hex);
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));
    }
}

fn px_to_mm(px: f32) -> f32 {
    px / 72.0 * 25.4
}

fn hex_rgb(hex: &str) -> (f32, f32, f32) {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 {
        return (0.0, 0.0, 0.0);
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).unwrap_or(0) as f32 / 255.0
    };
    (channel(0..2), channel(2..4), channel(4..6))
}
