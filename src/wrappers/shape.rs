//! Shape wrapper.

use crate::apply::{FillArg, LineArg, apply_fill, apply_line};
use crate::automation::constants::{auto_size, shape_format, shape_type, tri, zorder_cmd};
use crate::automation::path::ScopedSave;
use crate::automation::{Handle, Variant, upstream};
use crate::common::{Error, Rect, Result};
use crate::host::Host;
use crate::registry::scratch::TempPath;
use crate::resolve::{ShapeSource, resolve_shape};
use crate::wrappers::{FillFormat, LineFormat, ShapeRange, Slide, Table, TextFrame, TextRange, collection_count, collection_item};

/// Dimension change below which a shape counts as already tight.
const TIGHT_TOLERANCE: f64 = 0.5;

/// One live shape.
///
/// # Examples
///
/// ```rust,no_run
/// use longan::Shape;
///
/// // The selected shape.
/// let shape = Shape::active()?;
/// shape.set_text("Hello\rWorld")?;
/// shape.set_line((3, longan::Color::new(255, 0, 0)))?;
/// # Ok::<(), longan::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Shape {
    api: Handle,
}

impl Shape {
    /// Resolve from any accepted input; `None` host means the process
    /// ambient host.
    pub fn resolve(source: impl Into<ShapeSource>, host: Option<&Host>) -> Result<Self> {
        Ok(Self { api: resolve_shape(source.into(), host)? })
    }

    /// The ambient shape: the (first) selected one.
    pub fn active() -> Result<Self> {
        Self::resolve(ShapeSource::Ambient, None)
    }

    /// Same as [`Shape::active`] against an explicit host.
    pub fn active_on(host: &Host) -> Result<Self> {
        Self::resolve(ShapeSource::Ambient, Some(host))
    }

    pub(crate) fn from_api(api: Handle) -> Self {
        Self { api }
    }

    /// The raw handle.
    pub fn api(&self) -> &Handle {
        &self.api
    }

    /// The host-assigned shape id.
    pub fn id(&self) -> Result<i64> {
        self.api.get_i64("Id")
    }

    /// The shape name.
    pub fn name(&self) -> Result<String> {
        self.api.get_string("Name")
    }

    /// Rename the shape.
    pub fn set_name(&self, name: &str) -> Result<()> {
        self.api.set("Name", Variant::Str(name.to_string()))
    }

    /// The host shape-type tag.
    pub fn shape_type(&self) -> Result<i64> {
        self.api.get_i64("Type")
    }

    /// Whether this shape is a group.
    pub fn is_group(&self) -> Result<bool> {
        Ok(self.shape_type()? == shape_type::GROUP)
    }

    /// Placement rectangle in slide points.
    pub fn rect(&self) -> Result<Rect> {
        Ok(Rect::new(
            self.api.get_f64("Left")?,
            self.api.get_f64("Top")?,
            self.api.get_f64("Width")?,
            self.api.get_f64("Height")?,
        ))
    }

    /// Move/resize to the given rectangle.
    pub fn set_rect(&self, rect: Rect) -> Result<()> {
        self.api.set("Left", Variant::Float(rect.left))?;
        self.api.set("Top", Variant::Float(rect.top))?;
        self.api.set("Width", Variant::Float(rect.width))?;
        self.api.set("Height", Variant::Float(rect.height))
    }

    /// `(width, height)` in points.
    pub fn size(&self) -> Result<(f64, f64)> {
        Ok((self.api.get_f64("Width")?, self.api.get_f64("Height")?))
    }

    /// Rotation in degrees.
    pub fn rotation(&self) -> Result<f64> {
        self.api.get_f64("Rotation")
    }

    pub fn set_rotation(&self, degrees: f64) -> Result<()> {
        self.api.set("Rotation", Variant::Float(degrees))
    }

    /// The fill view.
    pub fn fill(&self) -> Result<FillFormat> {
        Ok(FillFormat::new(self.api.get_object("Fill")?))
    }

    /// The line view.
    pub fn line(&self) -> Result<LineFormat> {
        Ok(LineFormat::new(self.api.get_object("Line")?))
    }

    /// Set the fill from any accepted coercion (model, wrapper, color,
    /// bool, `FillArg::Off`).
    pub fn set_fill(&self, arg: impl Into<FillArg>) -> Result<()> {
        apply_fill(&self.api.get_object("Fill")?, arg.into())
    }

    /// Set the line from any accepted coercion (model, wrapper, weight,
    /// color, `(weight, color)`, `LineArg::Off`).
    pub fn set_line(&self, arg: impl Into<LineArg>) -> Result<()> {
        apply_line(&self.api.get_object("Line")?, arg.into())
    }

    /// Whether the shape carries a text frame.
    pub fn has_text_frame(&self) -> Result<bool> {
        Ok(self.api.get_i64("HasTextFrame")? != 0)
    }

    /// The text frame view.
    pub fn text_frame(&self) -> Result<TextFrame> {
        Ok(TextFrame::new(self.api.get_object("TextFrame")?))
    }

    /// The whole text range of the shape's text frame.
    pub fn text_range(&self) -> Result<TextRange> {
        self.text_frame()?.text_range()
    }

    /// The shape text (paragraph breaks as `\r`).
    pub fn text(&self) -> Result<String> {
        self.text_range()?.text()
    }

    /// Replace the shape text (input normalized per the paragraph-break
    /// rules).
    pub fn set_text(&self, text: &str) -> Result<()> {
        self.text_range()?.set_text(text)
    }

    /// The table carried by this shape.
    pub fn table(&self) -> Result<Table> {
        if self.api.get_i64("HasTable")? == 0 {
            return Err(Error::resolution("Table", &self.api));
        }
        Ok(Table::new(self.api.get_object("Table")?))
    }

    /// Group children, for group shapes.
    pub fn children(&self) -> Result<ShapeRange> {
        let items = self.api.get_object("GroupItems")?;
        let shapes = (1..=collection_count(&items)?)
            .map(|i| Ok(Shape::from_api(collection_item(&items, i)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(ShapeRange::from_shapes(shapes))
    }

    /// Dissolve a group into its children.
    pub fn ungroup(&self) -> Result<ShapeRange> {
        let range = self.api.call("Ungroup", &[])?.into_object()?;
        let shapes = (1..=collection_count(&range)?)
            .map(|i| Ok(Shape::from_api(collection_item(&range, i)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(ShapeRange::from_shapes(shapes))
    }

    pub(crate) fn collect_leaves(&self, out: &mut Vec<Shape>) -> Result<()> {
        if self.is_group()? {
            for child in self.children()?.to_vec() {
                child.collect_leaves(out)?;
            }
        } else {
            out.push(self.clone());
        }
        Ok(())
    }

    /// Shrink the text frame to its text: word wrap off, auto-size to
    /// fit. The frame settings are restored on return; the size and
    /// position changes are the point and stay.
    pub fn tighten(&self) -> Result<()> {
        let _saved = ScopedSave::new(&self.api, &["TextFrame.AutoSize", "TextFrame.WordWrap"])?;
        self.api.set("TextFrame.WordWrap", Variant::Int(tri::FALSE))?;
        self.api
            .set("TextFrame.AutoSize", Variant::Int(auto_size::SHAPE_TO_FIT_TEXT))?;
        Ok(())
    }

    /// Whether tightening would move any dimension by more than a small
    /// tolerance. The probe restores geometry and frame settings.
    pub fn is_tight(&self) -> Result<bool> {
        let before = self.rect()?;
        let after;
        {
            let _saved = ScopedSave::new(
                &self.api,
                &["Left", "Top", "Width", "Height", "TextFrame.AutoSize", "TextFrame.WordWrap"],
            )?;
            self.api.set("TextFrame.WordWrap", Variant::Int(tri::FALSE))?;
            self.api
                .set("TextFrame.AutoSize", Variant::Int(auto_size::SHAPE_TO_FIT_TEXT))?;
            after = self.rect()?;
        }
        Ok(before.approx_eq(&after, TIGHT_TOLERANCE))
    }

    /// Export the shape as PNG bytes.
    pub fn to_image(&self) -> Result<Vec<u8>> {
        let temp = TempPath::with_suffix(".png")?;
        self.api.call(
            "Export",
            &[
                Variant::Str(temp.path().display().to_string()),
                Variant::Int(shape_format::PNG),
            ],
        )?;
        Ok(std::fs::read(temp.path())?)
    }

    /// Select the shape, replacing (default) or extending the current
    /// selection.
    pub fn select(&self, replace: bool) -> Result<()> {
        self.api.call("Select", &[Variant::Bool(replace)])?;
        Ok(())
    }

    /// Position in the sibling z-order (1 = backmost).
    pub fn zorder(&self) -> Result<i64> {
        self.api.get_i64("ZOrderPosition")
    }

    /// Issue a z-order command (see `constants::zorder_cmd`).
    pub fn set_zorder(&self, cmd: i64) -> Result<()> {
        self.api.call("ZOrder", &[Variant::Int(cmd)])?;
        Ok(())
    }

    /// Bring the shape in front of its siblings.
    pub fn bring_to_front(&self) -> Result<()> {
        self.set_zorder(zorder_cmd::BRING_TO_FRONT)
    }

    /// The slide this shape sits on.
    pub fn slide(&self) -> Result<Slide> {
        Ok(Slide::from_api(upstream(&self.api, "Slide")?))
    }

    /// Delete the shape.
    pub fn delete(&self) -> Result<()> {
        self.api.call("Delete", &[])?;
        Ok(())
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        match (self.id(), other.id()) {
            (Ok(a), Ok(b)) => a == b,
            _ => self.api.ptr_eq(&other.api),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockHost;

    fn slide() -> Handle {
        let mock = MockHost::new();
        let pres = mock.add_presentation().unwrap();
        MockHost::add_slide(&pres).unwrap()
    }

    fn rectangle(slide: &Handle) -> Shape {
        Shape::from_api(MockHost::add_rectangle(slide, 10.0, 20.0, 200.0, 100.0).unwrap())
    }

    #[test]
    fn test_rect_round_trip() {
        let slide = slide();
        let shape = rectangle(&slide);
        assert_eq!(shape.rect().unwrap(), Rect::new(10.0, 20.0, 200.0, 100.0));
        shape.set_rect(Rect::new(1.0, 2.0, 3.0, 4.0)).unwrap();
        assert_eq!(shape.rect().unwrap(), Rect::new(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn test_text_round_trip() {
        let slide = slide();
        let shape = rectangle(&slide);
        shape.set_text("Hello\rWorld").unwrap();
        assert_eq!(shape.text().unwrap(), "Hello\rWorld");
        assert_eq!(shape.text_range().unwrap().paragraphs().unwrap().len(), 2);
    }

    #[test]
    fn test_tighten_restores_settings_and_resizes() {
        let slide = slide();
        let shape = rectangle(&slide);
        shape.set_text("hi").unwrap();
        let wrap_before = shape.api().get_i64("TextFrame.WordWrap").unwrap();
        let before = shape.rect().unwrap();
        shape.tighten().unwrap();
        // Settings restored, size moved.
        assert_eq!(shape.api().get_i64("TextFrame.WordWrap").unwrap(), wrap_before);
        assert_eq!(
            shape.api().get_i64("TextFrame.AutoSize").unwrap(),
            auto_size::NONE
        );
        assert_ne!(shape.rect().unwrap(), before);
    }

    #[test]
    fn test_is_tight_probe_is_side_effect_free() {
        let slide = slide();
        let shape = rectangle(&slide);
        shape.set_text("hi").unwrap();
        let before = shape.rect().unwrap();
        assert!(!shape.is_tight().unwrap());
        assert_eq!(shape.rect().unwrap(), before);
        shape.tighten().unwrap();
        assert!(shape.is_tight().unwrap());
    }

    #[test]
    fn test_zorder_commands() {
        let slide = slide();
        let a = rectangle(&slide);
        let b = rectangle(&slide);
        assert_eq!(a.zorder().unwrap(), 1);
        assert_eq!(b.zorder().unwrap(), 2);
        a.bring_to_front().unwrap();
        assert_eq!(a.zorder().unwrap(), 2);
        assert_eq!(b.zorder().unwrap(), 1);
    }

    #[test]
    fn test_equality_by_host_id() {
        let slide = slide();
        let shape = rectangle(&slide);
        let other_view = Shape::from_api(
            slide
                .get_object("Shapes")
                .unwrap()
                .call("Item", &[Variant::Int(1)])
                .unwrap()
                .into_object()
                .unwrap(),
        );
        assert_eq!(shape, other_view);
    }
}
