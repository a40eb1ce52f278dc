//! Text-frame and text-range models: ordered paragraphs of ordered runs.

use crate::api::{
    ApiModel, FontApi, ParagraphFormatApi, bag_f64, bag_i64, push_f64, push_i64,
};
use crate::automation::path::{Bag, read_bag, remove_invalidity, write_bag};
use crate::automation::{Handle, Variant};
use crate::common::Result;
use serde::{Deserialize, Serialize};

/// One uniformly formatted span of paragraph text.
///
/// Run text never contains a paragraph break; soft line breaks (`\x0B`)
/// are ordinary characters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunApi {
    pub text: String,
    #[serde(default, skip_serializing_if = "is_default_font")]
    pub font: FontApi,
}

fn is_default_font(font: &FontApi) -> bool {
    *font == FontApi::default()
}

/// One paragraph: its runs plus paragraph-level formatting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphApi {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub runs: Vec<RunApi>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent_level: Option<i64>,
    #[serde(default, skip_serializing_if = "is_default_format")]
    pub format: ParagraphFormatApi,
}

fn is_default_format(format: &ParagraphFormatApi) -> bool {
    *format == ParagraphFormatApi::default()
}

impl ParagraphApi {
    /// The paragraph's text: its runs concatenated.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    fn from_api_at(para_range: &Handle, secondary_format: Option<&Handle>) -> Result<Self> {
        let runs_collection = para_range.call("Runs", &[])?.into_object()?;
        let count = runs_collection.get_i64("Count")?;
        let mut runs = Vec::with_capacity(count as usize);
        for j in 1..=count {
            let run = para_range.call("Runs", &[Variant::Int(j)])?.into_object()?;
            runs.push(RunApi {
                text: run.get_string("Text")?,
                font: FontApi::from_api(&run.get_object("Font")?)?,
            });
        }
        Ok(Self {
            runs,
            indent_level: para_range.get_i64("IndentLevel").ok(),
            format: ParagraphFormatApi::from_api_pair(
                &para_range.get_object("ParagraphFormat")?,
                secondary_format,
            )?,
        })
    }
}

/// Mirror of a `TextRange`: the full paragraph/run tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextRangeApi {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paragraphs: Vec<ParagraphApi>,
}

impl TextRangeApi {
    /// The whole text with `\r` paragraph breaks, as the host stores it.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(ParagraphApi::text)
            .collect::<Vec<_>>()
            .join("\r")
    }

    /// Build a single-font model from plain text (paragraphs split on
    /// `\r`).
    pub fn from_text(text: &str) -> Self {
        Self {
            paragraphs: text
                .split('\r')
                .map(|p| ParagraphApi {
                    runs: if p.is_empty() {
                        Vec::new()
                    } else {
                        vec![RunApi { text: p.to_string(), font: FontApi::default() }]
                    },
                    ..Default::default()
                })
                .collect(),
        }
    }
}

impl ApiModel for TextRangeApi {
    fn from_api(range: &Handle) -> Result<Self> {
        let frame = range.get_object("Parent")?;
        let collection = range.call("Paragraphs", &[])?.into_object()?;
        let count = collection.get_i64("Count")?;
        let mut paragraphs = Vec::with_capacity(count as usize);
        for i in 1..=count {
            let para_range = range.call("Paragraphs", &[Variant::Int(i)])?.into_object()?;
            let secondary = v2_paragraph_format(&frame, i);
            paragraphs.push(ParagraphApi::from_api_at(&para_range, secondary.as_ref())?);
        }
        Ok(Self { paragraphs })
    }

    /// Rebuild the host text from the model.
    ///
    /// The text is reset and every paragraph re-inserted (`"\r" + text`,
    /// the first one bare, a bare `"\r"` for an empty paragraph); the
    /// paragraph format is then bound through the host-reported paragraph
    /// start and each run's font over its UTF-16 code-unit span.
    fn apply_api(&self, range: &Handle) -> Result<()> {
        let frame = range.get_object("Parent")?;
        frame.get_object("TextRange")?.set("Text", "")?;

        for (i, para) in self.paragraphs.iter().enumerate() {
            let text = para.text();
            let whole = frame.get_object("TextRange")?;
            if i == 0 {
                if !text.is_empty() {
                    whole.call("InsertAfter", &[Variant::Str(text)])?;
                }
            } else {
                whole.call("InsertAfter", &[Variant::Str(format!("\r{text}"))])?;
            }
        }

        let whole = frame.get_object("TextRange")?;
        if whole.get_i64("Length")? == 0 {
            return Ok(());
        }
        for (i, para) in self.paragraphs.iter().enumerate() {
            let index = i as i64 + 1;
            let para_range = whole.call("Paragraphs", &[Variant::Int(index)])?.into_object()?;
            if let Some(level) = para.indent_level {
                para_range.set("IndentLevel", Variant::Int(level))?;
            }
            let primary = para_range.get_object("ParagraphFormat")?;
            let secondary = v2_paragraph_format(&frame, index);
            para.format.apply_api_pair(&primary, secondary.as_ref())?;

            // Host character addressing counts UTF-16 code units.
            let mut cursor = para_range.get_i64("Start")?;
            for run in &para.runs {
                let len16 = run.text.encode_utf16().count() as i64;
                if len16 > 0 {
                    let span = whole
                        .call("Characters", &[Variant::Int(cursor), Variant::Int(len16)])?
                        .into_object()?;
                    run.font.apply_api(&span.get_object("Font")?)?;
                }
                cursor += len16;
            }
        }
        Ok(())
    }
}

/// The v2 paragraph format for paragraph `index`, reached through the
/// owning shape's `TextFrame2`. `None` when any hop is missing.
fn v2_paragraph_format(frame: &Handle, index: i64) -> Option<Handle> {
    let shape = frame.get_object("Parent").ok()?;
    let range2 = shape.get_object("TextFrame2.TextRange").ok()?;
    let para2 = range2.call("Paragraphs", &[Variant::Int(index)]).ok()?.into_object().ok()?;
    para2.get_object("ParagraphFormat").ok()
}

/// Mirror of a `TextFrame`: frame-level settings plus the text tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextFrameApi {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_anchor: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_left: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_right: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_top: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_bottom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_wrap: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_size: Option<i64>,
    #[serde(default, skip_serializing_if = "is_default_range")]
    pub text_range: TextRangeApi,
}

fn is_default_range(range: &TextRangeApi) -> bool {
    range.paragraphs.is_empty()
}

impl TextFrameApi {
    /// Auto-size goes last so the re-fit sees the final margins and wrap
    /// mode.
    const KEYS: [&'static str; 8] = [
        "Orientation",
        "VerticalAnchor",
        "MarginLeft",
        "MarginRight",
        "MarginTop",
        "MarginBottom",
        "WordWrap",
        "AutoSize",
    ];
}

impl ApiModel for TextFrameApi {
    fn from_api(frame: &Handle) -> Result<Self> {
        let bag = remove_invalidity(frame, read_bag(frame, &Self::KEYS)?)?;
        Ok(Self {
            orientation: bag_i64(&bag, "Orientation"),
            vertical_anchor: bag_i64(&bag, "VerticalAnchor"),
            margin_left: bag_f64(&bag, "MarginLeft"),
            margin_right: bag_f64(&bag, "MarginRight"),
            margin_top: bag_f64(&bag, "MarginTop"),
            margin_bottom: bag_f64(&bag, "MarginBottom"),
            word_wrap: bag_i64(&bag, "WordWrap"),
            auto_size: bag_i64(&bag, "AutoSize"),
            text_range: TextRangeApi::from_api(&frame.get_object("TextRange")?)?,
        })
    }

    fn apply_api(&self, frame: &Handle) -> Result<()> {
        let mut bag = Bag::new();
        push_i64(&mut bag, "Orientation", self.orientation);
        push_i64(&mut bag, "VerticalAnchor", self.vertical_anchor);
        push_f64(&mut bag, "MarginLeft", self.margin_left);
        push_f64(&mut bag, "MarginRight", self.margin_right);
        push_f64(&mut bag, "MarginTop", self.margin_top);
        push_f64(&mut bag, "MarginBottom", self.margin_bottom);
        push_i64(&mut bag, "WordWrap", self.word_wrap);
        push_i64(&mut bag, "AutoSize", self.auto_size);
        write_bag(frame, &bag)?;
        self.text_range.apply_api(&frame.get_object("TextRange")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::constants::tri;
    use crate::mock::MockHost;

    fn frame() -> Handle {
        let host = MockHost::new();
        let pres = host.add_presentation().unwrap();
        let slide = MockHost::add_slide(&pres).unwrap();
        let shape = MockHost::add_rectangle(&slide, 0.0, 0.0, 300.0, 100.0).unwrap();
        shape.get_object("TextFrame").unwrap()
    }

    #[test]
    fn test_capture_paragraphs_and_runs() {
        let frame = frame();
        let range = frame.get_object("TextRange").unwrap();
        range.set("Text", "Hello\rWorld").unwrap();
        // Make "World" bold so it captures as its own run.
        range
            .call("Characters", &[Variant::Int(7), Variant::Int(5)])
            .unwrap()
            .into_object()
            .unwrap()
            .set("Font.Bold", tri::TRUE)
            .unwrap();

        let model = TextRangeApi::from_api(&range).unwrap();
        assert_eq!(model.paragraphs.len(), 2);
        assert_eq!(model.paragraphs[0].text(), "Hello");
        assert_eq!(model.paragraphs[1].text(), "World");
        assert_eq!(model.paragraphs[1].runs.len(), 1);
        assert_eq!(model.paragraphs[1].runs[0].font.bold, Some(tri::TRUE));
        assert_eq!(model.text(), "Hello\rWorld");
    }

    #[test]
    fn test_apply_rebuilds_text_and_fonts() {
        let source = frame();
        let range = source.get_object("TextRange").unwrap();
        range.set("Text", "ab\rcd").unwrap();
        range
            .call("Characters", &[Variant::Int(1), Variant::Int(2)])
            .unwrap()
            .into_object()
            .unwrap()
            .set("Font.Italic", tri::TRUE)
            .unwrap();
        let model = TextRangeApi::from_api(&range).unwrap();

        let target = frame();
        let target_range = target.get_object("TextRange").unwrap();
        target_range.set("Text", "overwritten").unwrap();
        model.apply_api(&target_range).unwrap();

        assert_eq!(target.get_string("TextRange.Text").unwrap(), "ab\rcd");
        let captured = TextRangeApi::from_api(&target.get_object("TextRange").unwrap()).unwrap();
        assert_eq!(captured, model);
    }

    #[test]
    fn test_empty_middle_paragraphs_survive() {
        let model = TextRangeApi::from_text("a\r\r\rb");
        assert_eq!(model.paragraphs.len(), 4);

        let target = frame();
        let range = target.get_object("TextRange").unwrap();
        model.apply_api(&range).unwrap();
        assert_eq!(target.get_string("TextRange.Text").unwrap(), "a\r\r\rb");
        let captured = TextRangeApi::from_api(&target.get_object("TextRange").unwrap()).unwrap();
        assert_eq!(captured.paragraphs.len(), 4);
        assert!(captured.paragraphs[1].runs.is_empty());
    }

    #[test]
    fn test_frame_round_trip() {
        let source = frame();
        source.set("MarginLeft", 14.4).unwrap();
        source.set("WordWrap", tri::FALSE).unwrap();
        source.get_object("TextRange").unwrap().set("Text", "body").unwrap();
        let model = TextFrameApi::from_api(&source).unwrap();

        let target = frame();
        model.apply_api(&target).unwrap();
        assert_eq!(TextFrameApi::from_api(&target).unwrap(), model);
    }
}
