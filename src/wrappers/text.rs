//! TextFrame and TextRange wrappers, and the paragraph-break rules.
//!
//! The host mixes CR, LF, and CRLF depending on which interface wrote
//! the text. Everything this library writes is normalized first: a
//! paragraph break is exactly one `\r`, a soft line break inside a
//! paragraph is `\x0B`, and empty paragraphs are preserved.

use crate::api::{ApiModel, TextFrameApi, TextRangeApi};
use crate::automation::constants::auto_size;
use crate::automation::{Handle, Variant, upstream};
use crate::common::Result;
use crate::host::Host;
use crate::resolve::resolve_ambient_text_range;
use crate::wrappers::{Font, ParagraphFormat, Shape};

/// The paragraph break character.
pub const PARAGRAPH_BREAK: char = '\r';

/// The soft line-break character.
pub const SOFT_BREAK: char = '\x0B';

/// Normalize foreign break conventions: the two-character pairs `\r\n`
/// and `\n\r` collapse to one paragraph break, every remaining lone `\n`
/// becomes a soft line break.
///
/// # Examples
///
/// ```rust
/// use longan::wrappers::text::normalize_breaks;
///
/// assert_eq!(normalize_breaks("Hello\n\rWorld"), "Hello\rWorld");
/// assert_eq!(normalize_breaks("Hello\n\n\nWorld"), "Hello\u{b}\u{b}\u{b}World");
/// assert_eq!(normalize_breaks("a\n\n\r\nb"), "a\u{b}\u{b}\rb");
/// ```
pub fn normalize_breaks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push(PARAGRAPH_BREAK);
            }
            '\n' => {
                if chars.peek() == Some(&'\r') {
                    chars.next();
                    out.push(PARAGRAPH_BREAK);
                } else {
                    out.push(SOFT_BREAK);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// View over a `TextFrame` sub-object.
#[derive(Debug, Clone)]
pub struct TextFrame {
    api: Handle,
}

impl TextFrame {
    pub(crate) fn new(api: Handle) -> Self {
        Self { api }
    }

    /// The raw handle.
    pub fn api(&self) -> &Handle {
        &self.api
    }

    /// The whole text range of the frame.
    pub fn text_range(&self) -> Result<TextRange> {
        Ok(TextRange { api: self.api.get_object("TextRange")? })
    }

    /// Whether the frame holds any text.
    pub fn has_text(&self) -> Result<bool> {
        Ok(self.api.get_i64("HasText")? != 0)
    }

    /// The owning shape.
    pub fn shape(&self) -> Result<Shape> {
        Ok(Shape::from_api(upstream(&self.api, "Shape")?))
    }

    /// Auto-size mode (see `constants::auto_size`).
    pub fn auto_size(&self) -> Result<i64> {
        self.api.get_i64("AutoSize")
    }

    pub fn set_auto_size(&self, mode: i64) -> Result<()> {
        self.api.set("AutoSize", Variant::Int(mode))
    }

    /// Switch shrink-to-text on.
    pub fn fit_to_text(&self) -> Result<()> {
        self.set_auto_size(auto_size::SHAPE_TO_FIT_TEXT)
    }

    pub fn word_wrap(&self) -> Result<bool> {
        Ok(self.api.get_i64("WordWrap")? != 0)
    }

    pub fn set_word_wrap(&self, wrap: bool) -> Result<()> {
        self.api
            .set("WordWrap", Variant::Int(crate::automation::constants::tri::from_bool(wrap)))
    }

    /// Capture the frame (settings plus text tree) as a model.
    pub fn to_model(&self) -> Result<TextFrameApi> {
        TextFrameApi::from_api(&self.api)
    }

    /// Apply a frame model.
    pub fn apply_model(&self, model: &TextFrameApi) -> Result<()> {
        model.apply_api(&self.api)
    }
}

/// View over a `TextRange` sub-object.
///
/// Positions and lengths follow the host: UTF-16 code units, starts
/// 1-based. The public sub-range accessors return fresh wrappers; a
/// range does not track later edits to the frame.
#[derive(Debug, Clone)]
pub struct TextRange {
    api: Handle,
}

impl TextRange {
    pub(crate) fn from_api(api: Handle) -> Self {
        Self { api }
    }

    /// The ambient text range: the text selection, else the single
    /// selected shape's whole range.
    pub fn active() -> Result<Self> {
        Ok(Self { api: resolve_ambient_text_range(None)? })
    }

    /// Same as [`TextRange::active`] against an explicit host.
    pub fn active_on(host: &Host) -> Result<Self> {
        Ok(Self { api: resolve_ambient_text_range(Some(host))? })
    }

    /// The raw handle.
    pub fn api(&self) -> &Handle {
        &self.api
    }

    /// The raw text of the range (paragraph breaks as `\r`).
    pub fn text(&self) -> Result<String> {
        self.api.get_string("Text")
    }

    /// Replace the range text; input is normalized first.
    pub fn set_text(&self, text: &str) -> Result<()> {
        self.api.set("Text", Variant::Str(normalize_breaks(text)))
    }

    /// Start position in the frame (1-based UTF-16 code units).
    pub fn start(&self) -> Result<i64> {
        self.api.get_i64("Start")
    }

    /// Length in UTF-16 code units.
    pub fn length(&self) -> Result<i64> {
        self.api.get_i64("Length")
    }

    /// The owning text frame.
    pub fn frame(&self) -> Result<TextFrame> {
        Ok(TextFrame::new(self.api.get_object("Parent")?))
    }

    /// The font view over the whole range.
    pub fn font(&self) -> Result<Font> {
        Ok(Font::new(self.api.get_object("Font")?))
    }

    /// The paragraph format of the paragraph containing the range start,
    /// paired with its v2 interface where reachable.
    pub fn paragraph_format(&self) -> Result<ParagraphFormat> {
        let primary = self.api.get_object("ParagraphFormat")?;
        Ok(ParagraphFormat::with_secondary(primary, self.secondary_format()))
    }

    fn secondary_format(&self) -> Option<Handle> {
        let index = self.paragraph_index().ok()? as i64 + 1;
        let shape = upstream(&self.api, "Shape").ok()?;
        let range2 = shape.get_object("TextFrame2.TextRange").ok()?;
        let para2 = range2.call("Paragraphs", &[Variant::Int(index)]).ok()?.into_object().ok()?;
        para2.get_object("ParagraphFormat").ok()
    }

    /// Indent level of the paragraph at the range start (1-based, host
    /// convention).
    pub fn indent_level(&self) -> Result<i64> {
        self.api.get_i64("IndentLevel")
    }

    pub fn set_indent_level(&self, level: i64) -> Result<()> {
        self.api.set("IndentLevel", Variant::Int(level))
    }

    fn derived(&self, method: &str) -> Result<Vec<TextRange>> {
        let collection = self.api.call(method, &[])?.into_object()?;
        let count = collection.get_i64("Count")?;
        (1..=count)
            .map(|i| {
                Ok(TextRange {
                    api: self.api.call(method, &[Variant::Int(i)])?.into_object()?,
                })
            })
            .collect()
    }

    /// The paragraphs overlapping this range.
    pub fn paragraphs(&self) -> Result<Vec<TextRange>> {
        self.derived("Paragraphs")
    }

    /// The runs of this range, flattened across paragraphs.
    pub fn runs(&self) -> Result<Vec<TextRange>> {
        self.derived("Runs")
    }

    /// The laid-out lines of this range.
    pub fn lines(&self) -> Result<Vec<TextRange>> {
        self.derived("Lines")
    }

    /// The sentences of this range.
    pub fn sentences(&self) -> Result<Vec<TextRange>> {
        self.derived("Sentences")
    }

    /// The words of this range.
    pub fn words(&self) -> Result<Vec<TextRange>> {
        self.derived("Words")
    }

    /// The characters of this range, one range per UTF-16 code unit.
    pub fn characters(&self) -> Result<Vec<TextRange>> {
        let count = self.length()?;
        (1..=count)
            .map(|i| {
                Ok(TextRange {
                    api: self
                        .api
                        .call("Characters", &[Variant::Int(i), Variant::Int(1)])?
                        .into_object()?,
                })
            })
            .collect()
    }

    /// A sub-range by character position (1-based, UTF-16 code units).
    pub fn character_span(&self, start: i64, length: i64) -> Result<TextRange> {
        Ok(TextRange {
            api: self
                .api
                .call("Characters", &[Variant::Int(start), Variant::Int(length)])?
                .into_object()?,
        })
    }

    /// Insert text adjacent to this range; returns the inserted range.
    pub fn insert(&self, text: &str, before: bool) -> Result<TextRange> {
        let method = if before { "InsertBefore" } else { "InsertAfter" };
        Ok(TextRange {
            api: self
                .api
                .call(method, &[Variant::Str(normalize_breaks(text))])?
                .into_object()?,
        })
    }

    /// Insert after the range end.
    pub fn insert_after(&self, text: &str) -> Result<TextRange> {
        self.insert(text, false)
    }

    /// Insert before the range start.
    pub fn insert_before(&self, text: &str) -> Result<TextRange> {
        self.insert(text, true)
    }

    /// Delete the range's text.
    pub fn delete(&self) -> Result<()> {
        self.api.call("Delete", &[])?;
        Ok(())
    }

    /// Select the range in the host window.
    pub fn select(&self) -> Result<()> {
        self.api.call("Select", &[])?;
        Ok(())
    }

    /// Every non-overlapping occurrence of `target`, scanning forward.
    pub fn find(&self, target: &str) -> Result<Vec<TextRange>> {
        let mut hits = Vec::new();
        let own_start = self.start()?;
        let mut after = 0i64;
        loop {
            let found = self
                .api
                .call("Find", &[Variant::Str(target.to_string()), Variant::Int(after)])?;
            if found.is_empty() {
                break;
            }
            let hit = TextRange { api: found.into_object()? };
            // Advance past this hit; positions are frame-absolute.
            after = hit.start()? - own_start + hit.length()?;
            hits.push(hit);
        }
        Ok(hits)
    }

    /// Index (0-based) of the paragraph containing the range start,
    /// counted over the whole frame.
    pub fn paragraph_index(&self) -> Result<usize> {
        let frame_text = self.frame()?.text_range()?.text()?;
        let start = self.start()? as usize - 1;
        Ok(frame_text
            .encode_utf16()
            .take(start)
            .filter(|&u| u == PARAGRAPH_BREAK as u16)
            .count())
    }

    /// Capture the paragraph/run tree as a model.
    pub fn to_model(&self) -> Result<TextRangeApi> {
        TextRangeApi::from_api(&self.api)
    }

    /// Apply a model, rebuilding the frame's text.
    pub fn apply_model(&self, model: &TextRangeApi) -> Result<()> {
        model.apply_api(&self.api)
    }

    /// The frame's text as UTF-16 units plus this range's 0-based
    /// `[start, end)` span within it.
    fn frame_span(&self) -> Result<(Vec<u16>, usize, usize)> {
        let frame_text = self.frame()?.text_range()?.text()?;
        let units: Vec<u16> = frame_text.encode_utf16().collect();
        let start = (self.start()? - 1).max(0) as usize;
        let end = (start + self.length()?.max(0) as usize).min(units.len());
        Ok((units, start.min(end), end))
    }

    /// Number of consecutive paragraph breaks straddling the end of the
    /// range: breaks at the range tail plus breaks in the frame directly
    /// after it.
    pub fn n_tail_newlines(&self) -> Result<usize> {
        let (units, start, end) = self.frame_span()?;
        let break_unit = PARAGRAPH_BREAK as u16;
        let forward = units[end..].iter().take_while(|&&u| u == break_unit).count();
        let backward = units[start..end]
            .iter()
            .rev()
            .take_while(|&&u| u == break_unit)
            .count();
        Ok(forward + backward)
    }

    /// Number of consecutive paragraph breaks straddling the start of
    /// the range.
    pub fn n_head_newlines(&self) -> Result<usize> {
        let (units, start, end) = self.frame_span()?;
        let break_unit = PARAGRAPH_BREAK as u16;
        let backward = units[..start].iter().rev().take_while(|&&u| u == break_unit).count();
        let forward = units[start..end].iter().take_while(|&&u| u == break_unit).count();
        Ok(backward + forward)
    }

    /// Minimally insert or delete trailing breaks so that exactly `n`
    /// straddle the range end.
    pub fn set_tail_newlines(&self, n: usize) -> Result<()> {
        let current = self.n_tail_newlines()?;
        if current < n {
            self.insert_after(&"\r".repeat(n - current))?;
            return Ok(());
        }
        if current > n {
            let (units, _, end) = self.frame_span()?;
            let break_unit = PARAGRAPH_BREAK as u16;
            let forward = units[end..].iter().take_while(|&&u| u == break_unit).count();
            // The run covers [run_start, run_start + current); trim its
            // tail first.
            let run_start = end + forward - current;
            let remove = current - n;
            let whole = self.frame()?.text_range()?;
            whole
                .character_span((run_start + current - remove) as i64 + 1, remove as i64)?
                .delete()?;
        }
        Ok(())
    }

    /// Minimally insert or delete leading breaks so that exactly `n`
    /// straddle the range start.
    pub fn set_head_newlines(&self, n: usize) -> Result<()> {
        let current = self.n_head_newlines()?;
        if current < n {
            self.insert_before(&"\r".repeat(n - current))?;
            return Ok(());
        }
        if current > n {
            let (units, start, _) = self.frame_span()?;
            let break_unit = PARAGRAPH_BREAK as u16;
            let backward = units[..start].iter().rev().take_while(|&&u| u == break_unit).count();
            let run_start = start - backward;
            let remove = current - n;
            let whole = self.frame()?.text_range()?;
            whole.character_span(run_start as i64 + 1, remove as i64)?.delete()?;
        }
        Ok(())
    }
}

impl PartialEq for TextRange {
    fn eq(&self, other: &Self) -> bool {
        match (self.start(), self.length(), other.start(), other.length()) {
            (Ok(s1), Ok(l1), Ok(s2), Ok(l2)) => {
                s1 == s2 && l1 == l2 && self.api.interface() == other.api.interface()
            }
            _ => self.api.ptr_eq(&other.api),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockHost;

    fn text_range() -> TextRange {
        let mock = MockHost::new();
        let pres = mock.add_presentation().unwrap();
        let slide = MockHost::add_slide(&pres).unwrap();
        let shape = MockHost::add_rectangle(&slide, 0.0, 0.0, 400.0, 200.0).unwrap();
        TextRange::from_api(shape.get_object("TextFrame.TextRange").unwrap())
    }

    #[test]
    fn test_normalize_pairs_become_paragraph_breaks() {
        assert_eq!(normalize_breaks("Hello\n\rWorld"), "Hello\rWorld");
        assert_eq!(normalize_breaks("Hello\r\nWorld"), "Hello\rWorld");
        assert_eq!(normalize_breaks("Hello\rWorld"), "Hello\rWorld");
    }

    #[test]
    fn test_normalize_lone_newlines_become_soft_breaks() {
        assert_eq!(normalize_breaks("Hello\n\n\nWorld"), "Hello\u{b}\u{b}\u{b}World");
    }

    #[test]
    fn test_normalize_mixed_sequence() {
        assert_eq!(normalize_breaks("a\n\n\r\nb"), "a\u{b}\u{b}\rb");
    }

    #[test]
    fn test_set_text_yields_expected_paragraphs() {
        let range = text_range();
        range.set_text("Hello\n\rWorld").unwrap();
        assert_eq!(range.text().unwrap(), "Hello\rWorld");
        assert_eq!(range.frame().unwrap().text_range().unwrap().paragraphs().unwrap().len(), 2);

        range.set_text("Hello\n\n\nWorld").unwrap();
        let whole = range.frame().unwrap().text_range().unwrap();
        assert_eq!(whole.paragraphs().unwrap().len(), 1);

        range.set_text("Hello\r\r\rWorld").unwrap();
        let whole = range.frame().unwrap().text_range().unwrap();
        let paragraphs = whole.paragraphs().unwrap();
        assert_eq!(paragraphs.len(), 4);
        assert_eq!(paragraphs[1].text().unwrap(), "");
        assert_eq!(paragraphs[2].text().unwrap(), "");
    }

    #[test]
    fn test_insert_modes() {
        let range = text_range();
        range.set_text("middle").unwrap();
        range.frame().unwrap().text_range().unwrap().insert_after("!tail").unwrap();
        let whole = range.frame().unwrap().text_range().unwrap();
        assert!(whole.text().unwrap().ends_with("!tail"));
        whole.insert_before("head!").unwrap();
        let whole = range.frame().unwrap().text_range().unwrap();
        assert!(whole.text().unwrap().starts_with("head!"));
    }

    #[test]
    fn test_insert_with_divergent_font_adds_run() {
        let range = text_range();
        range.set_text("plain").unwrap();
        let whole = range.frame().unwrap().text_range().unwrap();
        assert_eq!(whole.runs().unwrap().len(), 1);
        let inserted = whole.insert_after("bold").unwrap();
        inserted
            .api()
            .set("Font.Bold", crate::automation::constants::tri::TRUE)
            .unwrap();
        let whole = range.frame().unwrap().text_range().unwrap();
        assert_eq!(whole.runs().unwrap().len(), 2);
    }

    #[test]
    fn test_find_advances_past_hits() {
        let range = text_range();
        range.set_text("abc abc abc").unwrap();
        let hits = range.find("abc").unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].start().unwrap(), 1);
        assert_eq!(hits[2].start().unwrap(), 9);
        assert!(range.find("zzz").unwrap().is_empty());
    }

    #[test]
    fn test_paragraph_index() {
        let range = text_range();
        range.set_text("one\rtwo\rthree").unwrap();
        let paragraphs = range.frame().unwrap().text_range().unwrap().paragraphs().unwrap();
        assert_eq!(paragraphs[0].paragraph_index().unwrap(), 0);
        assert_eq!(paragraphs[2].paragraph_index().unwrap(), 2);
    }

    #[test]
    fn test_tail_newlines() {
        let range = text_range();
        range.set_text("body").unwrap();
        let whole = range.frame().unwrap().text_range().unwrap();
        assert_eq!(whole.n_tail_newlines().unwrap(), 0);

        whole.set_tail_newlines(2).unwrap();
        let whole = range.frame().unwrap().text_range().unwrap();
        assert_eq!(whole.text().unwrap(), "body\r\r");
        assert_eq!(whole.n_tail_newlines().unwrap(), 2);

        whole.set_tail_newlines(1).unwrap();
        let whole = range.frame().unwrap().text_range().unwrap();
        assert_eq!(whole.text().unwrap(), "body\r");
        assert_eq!(whole.n_tail_newlines().unwrap(), 1);
    }

    #[test]
    fn test_head_newlines_on_subrange() {
        let range = text_range();
        range.set_text("\r\rbody").unwrap();
        let whole = range.frame().unwrap().text_range().unwrap();
        // A sub-range around "body": the two breaks before it straddle
        // its start.
        let body = whole.character_span(3, 4).unwrap();
        assert_eq!(body.text().unwrap(), "body");
        assert_eq!(body.n_head_newlines().unwrap(), 2);
        body.set_head_newlines(0).unwrap();
        let whole = range.frame().unwrap().text_range().unwrap();
        assert_eq!(whole.text().unwrap(), "body");
    }

    #[test]
    fn test_characters_are_utf16_units() {
        let range = text_range();
        // U+1D11E (musical symbol) is two UTF-16 code units.
        range.set_text("a\u{1D11E}").unwrap();
        assert_eq!(range.frame().unwrap().text_range().unwrap().length().unwrap(), 3);
    }
}
