//! Two-column vocabulary layout shared by the card and PDF renderers.
//!
//! A single pass wraps each entry's meaning and assigns column/offset, so the
//! height computation and the draw pass consume the same line records and can
//! never disagree.

use crate::article::VocabEntry;
use crate::wrap::{Measure, wrap};

#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Width budget for one column, in the unit of the measure.
    pub column_width: f32,
    /// Height of one wrapped meaning line.
    pub line_height: f32,
    /// Height of the `word (pos)` heading line.
    pub heading_height: f32,
    /// Vertical gap between rows in the same column.
    pub row_gap: f32,
}

/// One laid-out vocabulary entry: its column (0 = left, 1 = right), the
/// vertical offset relative to the column top, and the pre-wrapped meaning
/// lines a renderer places verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct VocabRow {
    pub index: usize,
    pub column: usize,
    pub y_offset: f32,
    pub height: f32,
    pub heading: String,
    pub meaning_lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VocabLayout {
    pub rows: Vec<VocabRow>,
    /// Height of the taller column, for sizing the canvas before drawing.
    pub content_height: f32,
}

/// Split entries into two near-equal columns (left gets the extra one) and
/// stack rows per column, multi-line meanings consuming proportionally more
/// vertical space.
pub fn layout_vocabulary(
    entries: &[VocabEntry],
    config: &LayoutConfig,
    measure: &dyn Measure,
) -> VocabLayout {
    let split = entries.len().div_ceil(2);
    let mut rows = Vec::with_capacity(entries.len());
    let mut column_heights = [0.0f32; 2];

    for (index, entry) in entries.iter().enumerate() {
        let column = if index < split { 0 } else { 1 };
        let heading = if entry.pos.is_empty() {
            entry.word.clone()
        } else {
            format!("{} ({})", entry.word, entry.pos)
        };
        let meaning_lines = wrap(&entry.meaning, config.column_width, measure);
        let height =
            config.heading_height + meaning_lines.len() as f32 * config.line_height + config.row_gap;
        rows.push(VocabRow {
            index,
            column,
            y_offset: column_heights[column],
            height,
            heading,
            meaning_lines,
        });
        column_heights[column] += height;
    }

    VocabLayout {
        rows,
        content_height: column_heights[0].max(column_heights[1]),
    }
}
