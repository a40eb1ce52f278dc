//! Text storage for the in-memory host.
//!
//! The real host addresses text in UTF-16 code units, carries character
//! formatting per unit, and paragraph formatting per paragraph. This
//! store reproduces that model: a flat unit buffer, a parallel font
//! buffer, and one format record per paragraph slot.

use crate::automation::constants::{alignment, auto_size, bullet_type, text_orientation, tri};

pub(crate) const PARAGRAPH_BREAK: u16 = 0x000D;
pub(crate) const SOFT_BREAK: u16 = 0x000B;

/// Character-level formatting carried by every code unit.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FontState {
    pub size: f64,
    pub name: String,
    pub rgb: i64,
    pub bold: i64,
    pub italic: i64,
    pub shadow: i64,
    pub superscript: i64,
    pub subscript: i64,
    pub underline: i64,
}

impl Default for FontState {
    fn default() -> Self {
        Self {
            size: 18.0,
            name: "Calibri".to_string(),
            rgb: 0,
            bold: tri::FALSE,
            italic: tri::FALSE,
            shadow: tri::FALSE,
            superscript: tri::FALSE,
            subscript: tri::FALSE,
            underline: tri::FALSE,
        }
    }
}

/// Bullet formatting, one record per paragraph.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BulletState {
    pub visible: i64,
    pub kind: i64,
    pub character: i64,
    pub relative_size: f64,
    pub use_text_font: i64,
    pub use_text_color: i64,
    pub font_name: String,
    pub font_rgb: i64,
}

impl Default for BulletState {
    fn default() -> Self {
        Self {
            visible: tri::FALSE,
            kind: bullet_type::NONE,
            character: 0x2022,
            relative_size: 1.0,
            use_text_font: tri::TRUE,
            use_text_color: tri::TRUE,
            font_name: "Arial".to_string(),
            font_rgb: 0,
        }
    }
}

/// Paragraph-level formatting.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParaState {
    pub alignment: i64,
    pub hanging_punctuation: i64,
    pub space_before: f64,
    pub space_after: f64,
    pub space_within: f64,
    pub line_rule_before: i64,
    pub line_rule_after: i64,
    pub line_rule_within: i64,
    pub indent_level: i64,
    pub first_line_indent: f64,
    pub left_indent: f64,
    pub right_indent: f64,
    pub bullet: BulletState,
}

impl Default for ParaState {
    fn default() -> Self {
        Self {
            alignment: alignment::LEFT,
            hanging_punctuation: tri::FALSE,
            space_before: 0.0,
            space_after: 0.0,
            space_within: 1.0,
            line_rule_before: tri::TRUE,
            line_rule_after: tri::TRUE,
            line_rule_within: tri::TRUE,
            indent_level: 1,
            first_line_indent: 0.0,
            left_indent: 0.0,
            right_indent: 0.0,
            bullet: BulletState::default(),
        }
    }
}

/// One text frame's content and frame-level settings.
#[derive(Debug, Clone)]
pub(crate) struct TextStore {
    pub units: Vec<u16>,
    pub fonts: Vec<FontState>,
    pub paras: Vec<ParaState>,
    pub default_font: FontState,
    pub auto_size: i64,
    pub word_wrap: i64,
    pub orientation: i64,
    pub vertical_anchor: i64,
    pub margin_left: f64,
    pub margin_right: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
}

impl Default for TextStore {
    fn default() -> Self {
        Self {
            units: Vec::new(),
            fonts: Vec::new(),
            paras: vec![ParaState::default()],
            default_font: FontState::default(),
            auto_size: auto_size::NONE,
            word_wrap: tri::TRUE,
            orientation: text_orientation::HORIZONTAL,
            vertical_anchor: 1,
            margin_left: 7.2,
            margin_right: 7.2,
            margin_top: 3.6,
            margin_bottom: 3.6,
        }
    }
}

impl TextStore {
    pub fn text(&self) -> String {
        String::from_utf16_lossy(&self.units)
    }

    pub fn len(&self) -> i64 {
        self.units.len() as i64
    }

    /// Number of paragraph slots: break count + 1; an empty frame reports
    /// zero paragraphs the way the host does.
    pub fn paragraph_count(&self) -> usize {
        if self.units.is_empty() {
            0
        } else {
            self.break_count() + 1
        }
    }

    fn break_count(&self) -> usize {
        self.units.iter().filter(|&&u| u == PARAGRAPH_BREAK).count()
    }

    /// Paragraph index (0-based) containing the unit at `pos` (0-based).
    pub fn paragraph_at(&self, pos: usize) -> usize {
        self.units[..pos.min(self.units.len())]
            .iter()
            .filter(|&&u| u == PARAGRAPH_BREAK)
            .count()
    }

    /// Unit span `[start, end)` of paragraph `index` (0-based), excluding
    /// the trailing paragraph break.
    pub fn paragraph_span(&self, index: usize) -> Option<(usize, usize)> {
        if index >= self.break_count() + 1 {
            return None;
        }
        let mut start = 0usize;
        let mut seen = 0usize;
        for (i, &u) in self.units.iter().enumerate() {
            if u == PARAGRAPH_BREAK {
                if seen == index {
                    return Some((start, i));
                }
                seen += 1;
                start = i + 1;
            }
        }
        Some((start, self.units.len()))
    }

    /// Maximal uniform-font spans inside `[start, end)` that cross neither
    /// a paragraph break nor the span edges. The break units themselves
    /// belong to no run.
    pub fn runs_in(&self, start: usize, end: usize) -> Vec<(usize, usize)> {
        let end = end.min(self.units.len());
        let mut runs = Vec::new();
        let mut i = start.min(end);
        while i < end {
            if self.units[i] == PARAGRAPH_BREAK {
                i += 1;
                continue;
            }
            let mut j = i + 1;
            while j < end && self.units[j] != PARAGRAPH_BREAK && self.fonts[j] == self.fonts[i] {
                j += 1;
            }
            runs.push((i, j));
            i = j;
        }
        runs
    }

    /// Split `[start, end)` at soft and paragraph breaks (line view).
    pub fn lines_in(&self, start: usize, end: usize) -> Vec<(usize, usize)> {
        self.split_in(start, end, |u| u == PARAGRAPH_BREAK || u == SOFT_BREAK)
    }

    /// Whitespace-delimited words inside `[start, end)`.
    pub fn words_in(&self, start: usize, end: usize) -> Vec<(usize, usize)> {
        self.split_in(start, end, |u| {
            u == PARAGRAPH_BREAK
                || u == SOFT_BREAK
                || char::from_u32(u as u32).is_some_and(|c| c.is_whitespace())
        })
    }

    /// Sentence spans inside `[start, end)`: cut after `.`, `!`, `?` and
    /// at paragraph breaks.
    pub fn sentences_in(&self, start: usize, end: usize) -> Vec<(usize, usize)> {
        let end = end.min(self.units.len());
        let mut spans = Vec::new();
        let mut i = start.min(end);
        let mut begin = i;
        while i < end {
            let u = self.units[i];
            if u == PARAGRAPH_BREAK {
                if begin < i {
                    spans.push((begin, i));
                }
                begin = i + 1;
            } else if matches!(u, 0x2E | 0x21 | 0x3F) {
                spans.push((begin, i + 1));
                begin = i + 1;
            }
            i += 1;
        }
        if begin < end {
            spans.push((begin, end));
        }
        spans
    }

    fn split_in(&self, start: usize, end: usize, is_sep: impl Fn(u16) -> bool) -> Vec<(usize, usize)> {
        let end = end.min(self.units.len());
        let mut spans = Vec::new();
        let mut i = start.min(end);
        while i < end {
            if is_sep(self.units[i]) {
                i += 1;
                continue;
            }
            let mut j = i + 1;
            while j < end && !is_sep(self.units[j]) {
                j += 1;
            }
            spans.push((i, j));
            i = j;
        }
        spans
    }

    /// Replace `[start, start + removed)` with `text`, maintaining the
    /// font and paragraph buffers. Inserted units inherit the font of the
    /// unit to the left of the splice (host behavior); inserted paragraph
    /// slots clone the paragraph containing the splice point.
    pub fn replace(&mut self, start: usize, removed: usize, text: &str) {
        let start = start.min(self.units.len());
        let removed = removed.min(self.units.len() - start);
        let new_units: Vec<u16> = text.encode_utf16().collect();

        let breaks_removed = self.units[start..start + removed]
            .iter()
            .filter(|&&u| u == PARAGRAPH_BREAK)
            .count();
        let breaks_added = new_units.iter().filter(|&&u| u == PARAGRAPH_BREAK).count();
        let para = self.paragraph_at(start);

        // Paragraph slots. Removing k breaks merges k following slots
        // into `para`; adding k breaks clones `para` k times after it.
        for _ in 0..breaks_removed {
            if para + 1 < self.paras.len() {
                self.paras.remove(para + 1);
            }
        }
        let template = self.paras.get(para).cloned().unwrap_or_default();
        for _ in 0..breaks_added {
            self.paras.insert(para + 1, template.clone());
        }

        // Unit and font buffers.
        let inherit = if start > 0 {
            self.fonts[start - 1].clone()
        } else if start < self.fonts.len() {
            self.fonts[start].clone()
        } else {
            self.default_font.clone()
        };
        let new_fonts = vec![inherit; new_units.len()];
        self.units.splice(start..start + removed, new_units);
        self.fonts.splice(start..start + removed, new_fonts);

        debug_assert_eq!(self.fonts.len(), self.units.len());
        debug_assert_eq!(self.paras.len(), self.break_count() + 1);
    }

    /// Replace the whole content, resetting character formats.
    pub fn set_text(&mut self, text: &str) {
        self.units = text.encode_utf16().collect();
        self.fonts = vec![self.default_font.clone(); self.units.len()];
        self.paras = vec![ParaState::default(); self.break_count() + 1];
    }

    /// Fake layout metric used when auto-size is on: the frame grows to
    /// the text. Deterministic so size probes are testable.
    pub fn natural_size(&self) -> (f64, f64) {
        let mut widest = 0usize;
        let mut lines = 1usize;
        let mut current = 0usize;
        for &u in &self.units {
            if u == PARAGRAPH_BREAK || u == SOFT_BREAK {
                widest = widest.max(current);
                current = 0;
                lines += 1;
            } else {
                current += 1;
            }
        }
        widest = widest.max(current);
        let size = self.default_font.size;
        (
            (widest.max(1) as f64) * size * 0.6 + self.margin_left + self.margin_right,
            (lines as f64) * size * 1.2 + self.margin_top + self.margin_bottom,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_spans() {
        let mut store = TextStore::default();
        store.set_text("Hello\rWorld");
        assert_eq!(store.paragraph_count(), 2);
        assert_eq!(store.paragraph_span(0), Some((0, 5)));
        assert_eq!(store.paragraph_span(1), Some((6, 11)));
        assert_eq!(store.paragraph_span(2), None);
    }

    #[test]
    fn test_runs_split_on_font_change() {
        let mut store = TextStore::default();
        store.set_text("abcdef");
        for i in 3..6 {
            store.fonts[i].bold = tri::TRUE;
        }
        assert_eq!(store.runs_in(0, 6), vec![(0, 3), (3, 6)]);
    }

    #[test]
    fn test_replace_preserves_paragraph_slots() {
        let mut store = TextStore::default();
        store.set_text("One\rTwo");
        store.paras[1].alignment = alignment::CENTER;
        // Insert a new paragraph break inside paragraph 0.
        store.replace(3, 0, "\rZero");
        assert_eq!(store.text(), "One\rZero\rTwo");
        assert_eq!(store.paras.len(), 3);
        // The trailing paragraph kept its format.
        assert_eq!(store.paras[2].alignment, alignment::CENTER);
    }

    #[test]
    fn test_replace_merges_on_break_removal() {
        let mut store = TextStore::default();
        store.set_text("A\rB\rC");
        store.replace(1, 2, "");
        assert_eq!(store.text(), "AB\rC");
        assert_eq!(store.paras.len(), 2);
    }
}
