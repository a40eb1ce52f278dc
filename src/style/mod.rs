//! Appearance-only style capture: how something looks, never where it
//! is or what it says.
//!
//! Styles are sampled per kind (shape, text range, table), carry no host
//! identity, and re-apply onto any compatible wrapper. They serialize
//! with a class tag through [`crate::registry::RegistryModel`], so a
//! named style fetched later reconstructs the exact model kind.

use crate::api::{ApiModel, FillFormatApi, FontApi, LineFormatApi, ParagraphFormatApi};
use crate::automation::constants::{bullet_type, shape_type};
use crate::common::Result;
use crate::registry::RegistryModel;
use crate::wrappers::{Shape, Table, TextRange};
use serde::{Deserialize, Serialize};

/// Sampling key of one paragraph: bullet kind, indent level, and the
/// paragraph's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParaKey {
    pub bullet_type: i64,
    pub indent_level: i64,
    pub line_number: i64,
}

impl ParaKey {
    /// Lexicographic distance to another key: bullet-kind mismatch
    /// first, then indent distance, then line distance.
    fn distance(&self, other: &ParaKey) -> (i64, i64, i64) {
        (
            i64::from(self.bullet_type != other.bullet_type),
            (self.indent_level - other.indent_level).abs(),
            (self.line_number - other.line_number).abs(),
        )
    }
}

/// One sampled paragraph style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParaStyleEntry {
    pub key: ParaKey,
    pub font: FontApi,
    pub format: ParagraphFormatApi,
}

/// Paragraph-wise appearance of a text range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub entries: Vec<ParaStyleEntry>,
}

impl RegistryModel for TextStyle {
    const CLASS: &'static str = "longan.style.TextStyle";
}

impl TextStyle {
    /// Sample each paragraph of a text range.
    pub fn from_text_range(range: &TextRange) -> Result<Self> {
        let mut entries = Vec::new();
        for (i, para) in range.paragraphs()?.iter().enumerate() {
            let format = para.paragraph_format()?.to_model()?;
            let key = ParaKey {
                bullet_type: format
                    .bullet
                    .as_ref()
                    .and_then(|b| b.kind)
                    .unwrap_or(bullet_type::NONE),
                indent_level: para.indent_level().unwrap_or(1),
                line_number: i as i64,
            };
            entries.push(ParaStyleEntry { key, font: para.font()?.to_model()?, format });
        }
        Ok(Self { entries })
    }

    /// Apply to a target range: each target paragraph takes the stored
    /// entry with the nearest key.
    pub fn apply(&self, range: &TextRange) -> Result<()> {
        if self.entries.is_empty() {
            return Ok(());
        }
        for (i, para) in range.paragraphs()?.iter().enumerate() {
            let format = para.paragraph_format()?.to_model()?;
            let key = ParaKey {
                bullet_type: format
                    .bullet
                    .as_ref()
                    .and_then(|b| b.kind)
                    .unwrap_or(bullet_type::NONE),
                indent_level: para.indent_level().unwrap_or(1),
                line_number: i as i64,
            };
            let entry = self
                .entries
                .iter()
                .min_by_key(|e| e.key.distance(&key))
                .unwrap_or(&self.entries[0]);
            entry.font.apply_api(para.font()?.api())?;
            para.paragraph_format()?.apply_model(&entry.format)?;
        }
        Ok(())
    }
}

/// Appearance of one table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellStyle {
    pub fill: FillFormatApi,
    pub font: FontApi,
    pub format: ParagraphFormatApi,
}

/// Cell-wise appearance of a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableStyle {
    pub cells: Vec<Vec<CellStyle>>,
}

impl RegistryModel for TableStyle {
    const CLASS: &'static str = "longan.style.TableStyle";
}

impl TableStyle {
    /// Sample every cell.
    pub fn from_table(table: &Table) -> Result<Self> {
        let n_rows = table.n_rows()?;
        let n_cols = table.n_cols()?;
        let mut cells = Vec::with_capacity(n_rows);
        for r in 0..n_rows {
            let mut row = Vec::with_capacity(n_cols);
            for c in 0..n_cols {
                let cell = table.cell(r, c)?;
                let range = cell.text_frame()?.text_range()?;
                row.push(CellStyle {
                    fill: FillFormatApi::from_api(&cell.api().get_object("Shape.Fill")?)?,
                    font: range.font()?.to_model()?,
                    format: range.paragraph_format()?.to_model()?,
                });
            }
            cells.push(row);
        }
        Ok(Self { cells })
    }

    /// Apply to a target table. Positions beyond the sampled grid
    /// inherit from the nearest sampled cell.
    pub fn apply(&self, table: &Table) -> Result<()> {
        if self.cells.is_empty() {
            return Ok(());
        }
        for r in 0..table.n_rows()? {
            for c in 0..table.n_cols()? {
                let source_row = &self.cells[r.min(self.cells.len() - 1)];
                if source_row.is_empty() {
                    continue;
                }
                let style = &source_row[c.min(source_row.len() - 1)];
                let cell = table.cell(r, c)?;
                style.fill.apply_api(&cell.api().get_object("Shape.Fill")?)?;
                let range = cell.text_frame()?.text_range()?;
                style.font.apply_api(range.font()?.api())?;
                range.paragraph_format()?.apply_model(&style.format)?;
            }
        }
        Ok(())
    }
}

/// Appearance of one shape, dispatched by shape kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeStyle {
    AutoShape {
        autoshape_type: i64,
        fill: FillFormatApi,
        line: LineFormatApi,
        text: TextStyle,
    },
    TextBox {
        text: TextStyle,
    },
    Line {
        line: LineFormatApi,
    },
    Fallback {
        shape_type: i64,
    },
}

impl RegistryModel for ShapeStyle {
    const CLASS: &'static str = "longan.style.ShapeStyle";
}

impl ShapeStyle {
    /// Sample a shape's appearance.
    pub fn from_shape(shape: &Shape) -> Result<Self> {
        let kind = shape.shape_type()?;
        match kind {
            k if k == shape_type::AUTO_SHAPE || k == shape_type::PLACEHOLDER => {
                Ok(ShapeStyle::AutoShape {
                    autoshape_type: shape.api().get_i64("AutoShapeType").unwrap_or(-2),
                    fill: shape.fill()?.to_model()?,
                    line: shape.line()?.to_model()?,
                    text: TextStyle::from_text_range(&shape.text_range()?)?,
                })
            }
            k if k == shape_type::TEXT_BOX => Ok(ShapeStyle::TextBox {
                text: TextStyle::from_text_range(&shape.text_range()?)?,
            }),
            k if k == shape_type::LINE => Ok(ShapeStyle::Line { line: shape.line()?.to_model()? }),
            other => {
                tracing::warn!(shape_type = other, "no style model for this shape type");
                Ok(ShapeStyle::Fallback { shape_type: other })
            }
        }
    }

    /// Apply the style to a target shape, best effort across kinds: the
    /// parts the target supports are applied, the rest is skipped.
    pub fn apply(&self, shape: &Shape) -> Result<()> {
        match self {
            ShapeStyle::AutoShape { autoshape_type, fill, line, text } => {
                if shape.shape_type()? == shape_type::AUTO_SHAPE && *autoshape_type >= 1 {
                    shape.api().set("AutoShapeType", *autoshape_type)?;
                }
                fill.apply_api(shape.fill()?.api())?;
                line.apply_api(shape.line()?.api())?;
                if shape.has_text_frame()? {
                    text.apply(&shape.text_range()?)?;
                }
                Ok(())
            }
            ShapeStyle::TextBox { text } => {
                if shape.has_text_frame()? {
                    text.apply(&shape.text_range()?)?;
                }
                Ok(())
            }
            ShapeStyle::Line { line } => line.apply_api(shape.line()?.api()),
            ShapeStyle::Fallback { shape_type } => {
                tracing::warn!(shape_type, "fallback style carries nothing to apply");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::constants::{alignment, tri};
    use crate::common::{Color, Rect};
    use crate::mock::MockHost;
    use crate::registry::{Category, Registry};
    use crate::wrappers::Slide;

    fn slide() -> Slide {
        let mock = MockHost::new();
        let pres = mock.add_presentation().unwrap();
        Slide::from_api(MockHost::add_slide(&pres).unwrap())
    }

    fn styled_shape(slide: &Slide) -> Shape {
        let shape = slide.shapes().add_rectangle(Some(Rect::new(0.0, 0.0, 120.0, 60.0))).unwrap();
        shape.set_fill(Color::new(200, 10, 10)).unwrap();
        shape.set_line((4, Color::new(0, 0, 0))).unwrap();
        shape.set_text("Title\rBody line").unwrap();
        let range = shape.text_range().unwrap();
        let paragraphs = range.paragraphs().unwrap();
        paragraphs[0].api().set("Font.Bold", tri::TRUE).unwrap();
        paragraphs[0]
            .paragraph_format()
            .unwrap()
            .api()
            .set("Alignment", alignment::CENTER)
            .unwrap();
        shape
    }

    #[test]
    fn test_style_round_trip_same_shape() {
        let slide = slide();
        let shape = styled_shape(&slide);
        let style = ShapeStyle::from_shape(&shape).unwrap();
        style.apply(&shape).unwrap();
        assert_eq!(ShapeStyle::from_shape(&shape).unwrap(), style);
    }

    #[test]
    fn test_style_transfer_between_shapes() {
        let slide = slide();
        let source = styled_shape(&slide);
        let target = slide.shapes().add_rectangle(Some(Rect::new(0.0, 100.0, 80.0, 40.0))).unwrap();
        target.set_text("Other\rText here").unwrap();

        let style = ShapeStyle::from_shape(&source).unwrap();
        style.apply(&target).unwrap();
        let captured = ShapeStyle::from_shape(&target).unwrap();
        assert_eq!(captured, style);
        // Identity is untouched by styles.
        assert_eq!(target.text().unwrap(), "Other\rText here");
    }

    #[test]
    fn test_text_style_nearest_key_application() {
        let slide = slide();
        let source = slide.shapes().add_rectangle(None).unwrap();
        source.set_text("one\rtwo").unwrap();
        let range = source.text_range().unwrap();
        range.paragraphs().unwrap()[1]
            .api()
            .set("Font.Italic", tri::TRUE)
            .unwrap();
        let style = TextStyle::from_text_range(&range).unwrap();

        // A target with more paragraphs than sampled: the extra ones
        // take the nearest line number.
        let target = slide.shapes().add_rectangle(None).unwrap();
        target.set_text("a\rb\rc").unwrap();
        style.apply(&target.text_range().unwrap()).unwrap();
        let paragraphs = target.text_range().unwrap().paragraphs().unwrap();
        assert_eq!(paragraphs[0].font().unwrap().to_model().unwrap().italic, Some(tri::FALSE));
        assert_eq!(paragraphs[1].font().unwrap().to_model().unwrap().italic, Some(tri::TRUE));
        assert_eq!(paragraphs[2].font().unwrap().to_model().unwrap().italic, Some(tri::TRUE));
    }

    #[test]
    fn test_table_style_nearest_cell_inheritance() {
        let slide = slide();
        let source = Table::make(&slide.shapes(), (2, 2)).unwrap();
        source
            .cell(0, 0)
            .unwrap()
            .api()
            .get_object("Shape.Fill")
            .unwrap()
            .set("ForeColor.RGB", 0x00FF00)
            .unwrap();
        let style = TableStyle::from_table(&source).unwrap();

        let target = Table::make(&slide.shapes(), (3, 3)).unwrap();
        style.apply(&target).unwrap();
        // Out-of-range rows/columns inherit from the nearest sampled
        // cell; (0,0) keeps its own sample.
        let fill_00 = target.cell(0, 0).unwrap().api().get_object("Shape.Fill").unwrap();
        assert_eq!(fill_00.get_i64("ForeColor.RGB").unwrap(), 0x00FF00);
        let fill_22 = target.cell(2, 2).unwrap().api().get_object("Shape.Fill").unwrap();
        assert_eq!(fill_22.get_i64("ForeColor.RGB").unwrap(), 0xFFFFFF);
    }

    #[test]
    fn test_registered_style_round_trips_through_registry() {
        let slide = slide();
        let shape = styled_shape(&slide);
        let style = ShapeStyle::from_shape(&shape).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let registry = Registry::open(dir.path()).unwrap();
        let category = Category::try_from("styles/shape").unwrap();
        registry.put_model(&category, "fancy", &style).unwrap();
        let back: ShapeStyle = registry.fetch_model(&category, "fancy").unwrap().unwrap();
        assert_eq!(back, style);
    }
}
