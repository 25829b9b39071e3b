use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use ttf_parser::{Face, name_id};
use usvg::fontdb;

use crate::wrap::{Measure, is_cjk_char};

/// Parsed font data plus the advances needed for pixel-accurate wrapping.
#[derive(Clone)]
pub struct FontMetrics {
    data: Arc<Vec<u8>>,
    units_per_em: u16,
    space_advance: u16,
    family: Option<String>,
    face_index: u32,
}

impl FontMetrics {
    pub fn family(&self) -> Option<&str> {
        self.family.as_deref()
    }

    pub fn data(&self) -> &[u8] {
        self.data.as_ref()
    }
}

pub fn load_font_metrics(path: &Path) -> Result<FontMetrics> {
    let data =
        std::fs::read(path).with_context(|| format!("failed to read font: {}", path.display()))?;
    font_metrics_from_data(&data)
        .map_err(|err| anyhow!("failed to parse font: {} ({})", path.display(), err))
}

/// Resolve the card font: an explicit TTF path wins, otherwise the family is
/// looked up among the system fonts.
pub fn resolve_card_font(
    font_path: Option<&Path>,
    font_family: Option<&str>,
) -> Result<Option<FontMetrics>> {
    if let Some(path) = font_path {
        return Ok(Some(load_font_metrics(path)?));
    }
    let Some(family) = font_family else {
        return Ok(None);
    };

    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    let families = vec![fontdb::Family::Name(family)];
    let query = fontdb::Query {
        families: &families,
        ..Default::default()
    };
    let id = db
        .query(&query)
        .ok_or_else(|| anyhow!("font not found: {}", family))?;
    let data = db
        .with_face_data(id, |data, _index| data.to_vec())
        .ok_or_else(|| anyhow!("failed to load font data: {}", family))?;
    Ok(Some(font_metrics_from_data(&data)?))
}

/// Rendered width of `text` at `font_size`, from glyph advances when metrics
/// are available, otherwise from per-character estimates.
pub fn measure_text_width_px(text: &str, font_size: f32, font: Option<&FontMetrics>) -> f32 {
    if let Some(font) = font
        && let Ok(face) = Face::parse(&font.data, font.face_index)
    {
        let mut advance = 0u32;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let glyph_advance = face
                .glyph_index(ch)
                .and_then(|glyph| face.glyph_hor_advance(glyph))
                .unwrap_or(font.space_advance);
            advance = advance.saturating_add(glyph_advance as u32);
        }
        let units = font.units_per_em.max(1) as f32;
        return advance as f32 * (font_size / units);
    }
    text.chars().map(estimate_char_units).sum::<f32>() * font_size
}

/// Pixel-budget measure for the wrapper, backed by glyph metrics when a font
/// is configured.
pub struct PxMeasure {
    pub font_size: f32,
    pub metrics: Option<FontMetrics>,
}

impl Measure for PxMeasure {
    fn width(&self, text: &str) -> f32 {
        measure_text_width_px(text, self.font_size, self.metrics.as_ref())
    }
}

fn estimate_char_units(ch: char) -> f32 {
    if ch.is_whitespace() {
        0.25
    } else if ch.is_ascii() {
        0.55
    } else if is_cjk_char(ch) {
        1.0
    } else {
        0.9
    }
}

fn font_metrics_from_data(data: &[u8]) -> Result<FontMetrics> {
    let count = ttf_parser::fonts_in_collection(data).unwrap_or(1);
    for index in 0..count {
        if let Ok(face) = Face::parse(data, index) {
            let units_per_em = face.units_per_em().max(1);
            let space_advance = face
                .glyph_index(' ')
                .and_then(|id| face.glyph_hor_advance(id))
                .unwrap_or(units_per_em / 2);
            return Ok(FontMetrics {
                data: Arc::new(data.to_vec()),
                units_per_em,
                space_advance,
                family: extract_family_name(&face),
                face_index: index,
            });
        }
    }
    Err(anyhow!("failed to parse font data"))
}

fn extract_family_name(face: &Face<'_>) -> Option<String> {
    let mut fallback = None;
    for name in face.names() {
        if name.name_id == name_id::TYPOGRAPHIC_FAMILY {
            if let Some(value) = name.to_string() {
                return Some(value);
            }
        } else if name.name_id == name_id::FAMILY && fallback.is_none() {
            fallback = name.to_string();
        }
    }
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimated_width_scales_with_font_size() {
        let narrow = measure_text_width_px("abc", 10.0, None);
        let wide = measure_text_width_px("abc", 20.0, None);
        assert!(wide > narrow);
    }

    #[test]
    fn cjk_estimates_wider_than_ascii() {
        let ascii = measure_text_width_px("ab", 14.0, None);
        let cjk = measure_text_width_px("你好", 14.0, None);
        assert!(cjk > ascii);
    }
}
