//! Polymorphic applicators: one `apply(handle, value)` per formatting
//! concern, accepting wrappers, handles, models, convenience scalars,
//! and an explicit off state.

use crate::api::{ApiModel, FillFormatApi, LineFormatApi, SolidFillApi};
use crate::automation::constants::{dash_style, line_style, tri};
use crate::automation::{Handle, Variant};
use crate::common::{Color, Result};
use crate::wrappers::{FillFormat, LineFormat};

/// Capture a model from `source` and apply it to `target`; the generic
/// building block behind the wrapper/handle arms below.
pub fn apply_captured<M: ApiModel>(target: &Handle, source: &Handle) -> Result<()> {
    M::from_api(source)?.apply_api(target)
}

/// Anything a line can be set from.
pub enum LineArg {
    /// Copy another line's captured format
    Wrapper(LineFormat),
    /// Copy from a raw `LineFormat` handle
    Handle(Handle),
    /// Apply a model directly
    Model(LineFormatApi),
    /// Weight in points; forces a single solid line
    Weight(i64),
    /// Line color
    Rgb(Color),
    /// Weight and color together
    WeightAndColor(i64, Color),
    /// Hide the line
    Off,
}

/// Small integers read as weights, larger ones as packed colors.
impl From<i32> for LineArg {
    fn from(value: i32) -> Self {
        if (1..=50).contains(&value) {
            LineArg::Weight(value as i64)
        } else {
            LineArg::Rgb(Color::from_int(value as i64))
        }
    }
}

impl From<(i32, Color)> for LineArg {
    fn from((weight, color): (i32, Color)) -> Self {
        LineArg::WeightAndColor(weight as i64, color)
    }
}

impl From<Color> for LineArg {
    fn from(color: Color) -> Self {
        LineArg::Rgb(color)
    }
}

impl From<(u8, u8, u8)> for LineArg {
    fn from(rgb: (u8, u8, u8)) -> Self {
        LineArg::Rgb(rgb.into())
    }
}

impl From<LineFormatApi> for LineArg {
    fn from(model: LineFormatApi) -> Self {
        LineArg::Model(model)
    }
}

impl From<&LineFormat> for LineArg {
    fn from(wrapper: &LineFormat) -> Self {
        LineArg::Wrapper(wrapper.clone())
    }
}

/// `None` hides the line.
impl<T: Into<LineArg>> From<Option<T>> for LineArg {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => inner.into(),
            None => LineArg::Off,
        }
    }
}

/// Apply a line argument to a `LineFormat` handle.
pub fn apply_line(line: &Handle, arg: LineArg) -> Result<()> {
    match arg {
        LineArg::Wrapper(wrapper) => apply_captured::<LineFormatApi>(line, wrapper.api()),
        LineArg::Handle(source) => apply_captured::<LineFormatApi>(line, &source),
        LineArg::Model(model) => model.apply_api(line),
        LineArg::Weight(weight) => {
            line.set("Visible", Variant::Int(tri::TRUE))?;
            line.set("Style", Variant::Int(line_style::SINGLE))?;
            line.set("DashStyle", Variant::Int(dash_style::SOLID))?;
            line.set("Weight", Variant::Float(weight as f64))
        }
        LineArg::Rgb(color) => {
            line.set("Visible", Variant::Int(tri::TRUE))?;
            line.set("ForeColor.RGB", Variant::Int(color.as_int()))
        }
        LineArg::WeightAndColor(weight, color) => {
            apply_line(line, LineArg::Weight(weight))?;
            apply_line(line, LineArg::Rgb(color))
        }
        LineArg::Off => line.set("Visible", Variant::Int(tri::FALSE)),
    }
}

/// Anything a fill can be set from.
pub enum FillArg {
    /// Copy another fill's captured format
    Wrapper(FillFormat),
    /// Copy from a raw `FillFormat` handle
    Handle(Handle),
    /// Apply a model directly
    Model(FillFormatApi),
    /// Toggle visibility
    Visible(bool),
    /// Solid fill of this color; transparency is `1 - alpha`
    Color(Color),
    /// Hide the fill
    Off,
}

impl From<bool> for FillArg {
    fn from(visible: bool) -> Self {
        FillArg::Visible(visible)
    }
}

impl From<Color> for FillArg {
    fn from(color: Color) -> Self {
        FillArg::Color(color)
    }
}

impl From<(u8, u8, u8)> for FillArg {
    fn from(rgb: (u8, u8, u8)) -> Self {
        FillArg::Color(rgb.into())
    }
}

impl From<(u8, u8, u8, f64)> for FillArg {
    fn from(rgba: (u8, u8, u8, f64)) -> Self {
        FillArg::Color(rgba.into())
    }
}

impl From<i32> for FillArg {
    fn from(packed: i32) -> Self {
        FillArg::Color(Color::from_int(packed as i64))
    }
}

impl From<FillFormatApi> for FillArg {
    fn from(model: FillFormatApi) -> Self {
        FillArg::Model(model)
    }
}

impl From<&FillFormat> for FillArg {
    fn from(wrapper: &FillFormat) -> Self {
        FillArg::Wrapper(wrapper.clone())
    }
}

/// `None` hides the fill.
impl<T: Into<FillArg>> From<Option<T>> for FillArg {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => inner.into(),
            None => FillArg::Off,
        }
    }
}

/// Apply a fill argument to a `FillFormat` handle.
pub fn apply_fill(fill: &Handle, arg: FillArg) -> Result<()> {
    match arg {
        FillArg::Wrapper(wrapper) => apply_captured::<FillFormatApi>(fill, wrapper.api()),
        FillArg::Handle(source) => apply_captured::<FillFormatApi>(fill, &source),
        FillArg::Model(model) => model.apply_api(fill),
        FillArg::Visible(visible) => fill.set("Visible", Variant::Int(tri::from_bool(visible))),
        FillArg::Color(color) => FillFormatApi::Solid(SolidFillApi {
            fore_color: Some(color.as_int()),
            back_color: None,
            transparency: Some(1.0 - color.alpha),
            visible: Some(tri::TRUE),
        })
        .apply_api(fill),
        FillArg::Off => fill.set("Visible", Variant::Int(tri::FALSE)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::constants::fill_type;
    use crate::mock::MockHost;
    use crate::wrappers::Shape;

    fn shape() -> Shape {
        let mock = MockHost::new();
        let pres = mock.add_presentation().unwrap();
        let slide = MockHost::add_slide(&pres).unwrap();
        Shape::from_api(MockHost::add_rectangle(&slide, 0.0, 0.0, 50.0, 50.0).unwrap())
    }

    #[test]
    fn test_line_small_int_sets_weight_and_solid_style() {
        let shape = shape();
        shape.set_line(5).unwrap();
        let line = shape.api().get_object("Line").unwrap();
        assert_eq!(line.get_f64("Weight").unwrap(), 5.0);
        assert_eq!(line.get_i64("Style").unwrap(), line_style::SINGLE);
        assert_eq!(line.get_i64("DashStyle").unwrap(), dash_style::SOLID);
    }

    #[test]
    fn test_line_large_int_sets_color() {
        let shape = shape();
        shape.set_line(0xFF8800).unwrap();
        let line = shape.api().get_object("Line").unwrap();
        assert_eq!(line.get_i64("ForeColor.RGB").unwrap(), 0xFF8800);
    }

    #[test]
    fn test_line_tuple_sets_both() {
        let shape = shape();
        shape.set_line((3, Color::from_hex("#FF0000").unwrap())).unwrap();
        let line = shape.api().get_object("Line").unwrap();
        assert_eq!(line.get_f64("Weight").unwrap(), 3.0);
        assert_eq!(line.get_i64("ForeColor.RGB").unwrap(), 0x0000FF);
    }

    #[test]
    fn test_line_none_hides() {
        let shape = shape();
        shape.set_line(None::<i32>).unwrap();
        let line = shape.api().get_object("Line").unwrap();
        assert_eq!(line.get_i64("Visible").unwrap(), tri::FALSE);
    }

    #[test]
    fn test_fill_bool_toggles_visibility() {
        let shape = shape();
        shape.set_fill(false).unwrap();
        assert_eq!(shape.api().get_i64("Fill.Visible").unwrap(), tri::FALSE);
        shape.set_fill(true).unwrap();
        assert_eq!(shape.api().get_i64("Fill.Visible").unwrap(), tri::TRUE);
    }

    #[test]
    fn test_fill_color_sets_solid_and_transparency() {
        let shape = shape();
        shape.set_fill((0u8, 128u8, 255u8, 0.25)).unwrap();
        let fill = shape.api().get_object("Fill").unwrap();
        assert_eq!(fill.get_i64("Type").unwrap(), fill_type::SOLID);
        assert_eq!(fill.get_i64("ForeColor.RGB").unwrap(), 0x00FF8000);
        assert!((fill.get_f64("Transparency").unwrap() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_fill_copies_between_shapes() {
        let a = shape();
        let b = shape();
        a.set_fill(Color::new(10, 20, 30)).unwrap();
        b.set_fill(&a.fill().unwrap()).unwrap();
        assert_eq!(a.fill().unwrap().to_model().unwrap(), b.fill().unwrap().to_model().unwrap());
    }
}
