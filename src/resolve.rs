//! Input resolution: from heterogeneous user inputs to authoritative
//! automation handles.
//!
//! Every domain concept accepts the same family of inputs: an existing
//! wrapper, a raw handle of the right interface, a convenience value
//! (a path for presentations, a sequence for ranges), or the ambient
//! marker meaning "whatever the host currently has selected or active".
//! Resolution follows a fixed precedence: wrapper, then matching handle,
//! then convenience construction, then the ambient chain (selection of
//! the right kind, active document, first available, create).

use crate::automation::constants::{selection_type, slide_layout};
use crate::automation::{Handle, Variant, is_interface, upstream};
use crate::common::{Error, Result};
use crate::host::Host;
use crate::wrappers::{Presentation, Shape, Slide};
use std::path::{Path, PathBuf};

/// Resolve the effective host: the explicit one, or the process ambient.
pub(crate) fn host_or_ambient(host: Option<&Host>) -> Result<Host> {
    match host {
        Some(h) => Ok(h.clone()),
        None => Host::ambient(),
    }
}

fn expect_interface(handle: Handle, name: &'static str) -> Result<Handle> {
    if is_interface(&handle, name) {
        Ok(handle)
    } else {
        Err(Error::resolution(name, &handle))
    }
}

/// Input accepted wherever a presentation is expected.
pub enum PresentationSource {
    /// An existing wrapper
    Wrapper(Presentation),
    /// A raw Presentation handle
    Handle(Handle),
    /// A document path, opened through the host
    Path(PathBuf),
    /// The active presentation (first available; created when none)
    Ambient,
}

impl From<Presentation> for PresentationSource {
    fn from(p: Presentation) -> Self {
        PresentationSource::Wrapper(p)
    }
}

impl From<&Presentation> for PresentationSource {
    fn from(p: &Presentation) -> Self {
        PresentationSource::Wrapper(p.clone())
    }
}

impl From<Handle> for PresentationSource {
    fn from(h: Handle) -> Self {
        PresentationSource::Handle(h)
    }
}

impl From<&Path> for PresentationSource {
    fn from(p: &Path) -> Self {
        PresentationSource::Path(p.to_path_buf())
    }
}

impl From<PathBuf> for PresentationSource {
    fn from(p: PathBuf) -> Self {
        PresentationSource::Path(p)
    }
}

impl From<&str> for PresentationSource {
    fn from(p: &str) -> Self {
        PresentationSource::Path(PathBuf::from(p))
    }
}

pub(crate) fn resolve_presentation(
    source: PresentationSource,
    host: Option<&Host>,
) -> Result<Handle> {
    match source {
        PresentationSource::Wrapper(p) => Ok(p.api().clone()),
        PresentationSource::Handle(h) => expect_interface(h, "Presentation"),
        PresentationSource::Path(path) => {
            let host = host_or_ambient(host)?;
            host.presentations()?
                .call("Open", &[Variant::Str(path.display().to_string())])?
                .into_object()
        }
        PresentationSource::Ambient => {
            let host = host_or_ambient(host)?;
            if let Some(active) = host.active_presentation() {
                return Ok(active);
            }
            let presentations = host.presentations()?;
            if presentations.get_i64("Count")? > 0 {
                return presentations.call("Item", &[Variant::Int(1)])?.into_object();
            }
            presentations.call("Add", &[])?.into_object()
        }
    }
}

/// Input accepted wherever a slide is expected.
pub enum SlideSource {
    Wrapper(Slide),
    Handle(Handle),
    /// A slide position (0-based) within a presentation
    Index(PresentationSource, usize),
    Ambient,
}

impl From<Slide> for SlideSource {
    fn from(s: Slide) -> Self {
        SlideSource::Wrapper(s)
    }
}

impl From<&Slide> for SlideSource {
    fn from(s: &Slide) -> Self {
        SlideSource::Wrapper(s.clone())
    }
}

impl From<Handle> for SlideSource {
    fn from(h: Handle) -> Self {
        SlideSource::Handle(h)
    }
}

pub(crate) fn resolve_slide(source: SlideSource, host: Option<&Host>) -> Result<Handle> {
    match source {
        SlideSource::Wrapper(s) => Ok(s.api().clone()),
        SlideSource::Handle(h) => expect_interface(h, "Slide"),
        SlideSource::Index(pres, index) => {
            let pres = resolve_presentation(pres, host)?;
            pres.get_object("Slides")?
                .call("Item", &[Variant::Int(index as i64 + 1)])?
                .into_object()
        }
        SlideSource::Ambient => {
            let host = host_or_ambient(host)?;
            if host.selection_type() == selection_type::SLIDES
                && let Some(range) = host.selected_slide_range()
                && let Ok(slide) = range.call("Item", &[Variant::Int(1)])
            {
                return slide.into_object();
            }
            if let Some(slide) = host.view_slide() {
                return Ok(slide);
            }
            let pres = resolve_presentation(PresentationSource::Ambient, Some(&host))?;
            let slides = pres.get_object("Slides")?;
            if slides.get_i64("Count")? > 0 {
                return slides.call("Item", &[Variant::Int(1)])?.into_object();
            }
            slides
                .call("Add", &[Variant::Empty, Variant::Int(slide_layout::BLANK)])?
                .into_object()
        }
    }
}

/// Input accepted wherever a single shape is expected.
pub enum ShapeSource {
    Wrapper(Shape),
    Handle(Handle),
    Ambient,
}

impl From<Shape> for ShapeSource {
    fn from(s: Shape) -> Self {
        ShapeSource::Wrapper(s)
    }
}

impl From<&Shape> for ShapeSource {
    fn from(s: &Shape) -> Self {
        ShapeSource::Wrapper(s.clone())
    }
}

impl From<Handle> for ShapeSource {
    fn from(h: Handle) -> Self {
        ShapeSource::Handle(h)
    }
}

pub(crate) fn resolve_shape(source: ShapeSource, host: Option<&Host>) -> Result<Handle> {
    match source {
        ShapeSource::Wrapper(s) => Ok(s.api().clone()),
        ShapeSource::Handle(h) => expect_interface(h, "Shape"),
        ShapeSource::Ambient => {
            let host = host_or_ambient(host)?;
            match host.selection_type() {
                t if t == selection_type::SHAPES => {
                    let range = host
                        .selected_shape_range()
                        .ok_or_else(|| Error::resolution("Shape", &"empty selection"))?;
                    range.call("Item", &[Variant::Int(1)])?.into_object()
                }
                t if t == selection_type::TEXT => {
                    let text = host
                        .selected_text_range()
                        .ok_or_else(|| Error::resolution("Shape", &"empty selection"))?;
                    upstream(&text, "Shape")
                }
                _ => Err(Error::resolution("Shape", &"nothing is selected")),
            }
        }
    }
}

/// Input accepted wherever a set of shapes is expected.
pub enum ShapeSetSource {
    Wrappers(Vec<Shape>),
    Handles(Vec<Handle>),
    Ambient,
}

impl From<Vec<Shape>> for ShapeSetSource {
    fn from(shapes: Vec<Shape>) -> Self {
        ShapeSetSource::Wrappers(shapes)
    }
}

impl From<&[Shape]> for ShapeSetSource {
    fn from(shapes: &[Shape]) -> Self {
        ShapeSetSource::Wrappers(shapes.to_vec())
    }
}

impl From<Vec<Handle>> for ShapeSetSource {
    fn from(handles: Vec<Handle>) -> Self {
        ShapeSetSource::Handles(handles)
    }
}

pub(crate) fn resolve_shape_set(source: ShapeSetSource, host: Option<&Host>) -> Result<Vec<Handle>> {
    match source {
        ShapeSetSource::Wrappers(shapes) => {
            Ok(shapes.into_iter().map(|s| s.api().clone()).collect())
        }
        ShapeSetSource::Handles(handles) => handles
            .into_iter()
            .map(|h| expect_interface(h, "Shape"))
            .collect(),
        ShapeSetSource::Ambient => {
            let host = host_or_ambient(host)?;
            let range = match host.selection_type() {
                t if t == selection_type::SHAPES || t == selection_type::TEXT => host
                    .selected_shape_range()
                    .ok_or_else(|| Error::resolution("ShapeRange", &"empty selection"))?,
                _ => return Err(Error::resolution("ShapeRange", &"nothing is selected")),
            };
            let count = range.get_i64("Count")?;
            (1..=count)
                .map(|i| range.call("Item", &[Variant::Int(i)])?.into_object())
                .collect()
        }
    }
}

/// Ambient text range: the text selection, or the single selected
/// shape's whole range.
pub(crate) fn resolve_ambient_text_range(host: Option<&Host>) -> Result<Handle> {
    let host = host_or_ambient(host)?;
    if let Some(text) = host.selected_text_range() {
        return Ok(text);
    }
    if host.selection_type() == selection_type::SHAPES
        && let Some(range) = host.selected_shape_range()
        && range.get_i64("Count")? == 1
    {
        let shape = range.call("Item", &[Variant::Int(1)])?.into_object()?;
        return shape.get_object("TextFrame.TextRange");
    }
    Err(Error::resolution("TextRange", &"no text is selected"))
}

/// Ambient table: the selected shape's table, else the first table on
/// the ambient slide.
pub(crate) fn resolve_ambient_table(host: Option<&Host>) -> Result<Handle> {
    let host = host_or_ambient(host)?;
    if host.selection_type() == selection_type::SHAPES
        && let Some(range) = host.selected_shape_range()
        && let Ok(shape) = range.call("Item", &[Variant::Int(1)])
        && let Ok(shape) = shape.into_object()
        && shape.get_i64("HasTable").map(|v| v != 0).unwrap_or(false)
    {
        return shape.get_object("Table");
    }
    let slide = resolve_slide(SlideSource::Ambient, Some(&host))?;
    let shapes = slide.get_object("Shapes")?;
    let count = shapes.get_i64("Count")?;
    for i in 1..=count {
        let shape = shapes.call("Item", &[Variant::Int(i)])?.into_object()?;
        if shape.get_i64("HasTable").map(|v| v != 0).unwrap_or(false) {
            return shape.get_object("Table");
        }
    }
    Err(Error::resolution("Table", &"no table on the ambient slide"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockHost;

    fn fixture() -> (MockHost, Host) {
        let mock = MockHost::new();
        let host = Host::new(mock.application());
        (mock, host)
    }

    #[test]
    fn test_ambient_presentation_creates_when_empty() {
        let (_, host) = fixture();
        let pres = resolve_presentation(PresentationSource::Ambient, Some(&host)).unwrap();
        assert!(is_interface(&pres, "Presentation"));
        // A second ambient resolution reuses the active presentation.
        let again = resolve_presentation(PresentationSource::Ambient, Some(&host)).unwrap();
        assert_eq!(pres.get_string("Name").unwrap(), again.get_string("Name").unwrap());
    }

    #[test]
    fn test_ambient_slide_prefers_selection() {
        let (mock, host) = fixture();
        let pres = mock.add_presentation().unwrap();
        let first = MockHost::add_slide(&pres).unwrap();
        let second = MockHost::add_slide(&pres).unwrap();
        first.call("Select", &[]).unwrap();
        let resolved = resolve_slide(SlideSource::Ambient, Some(&host)).unwrap();
        assert_eq!(
            resolved.get_i64("SlideID").unwrap(),
            first.get_i64("SlideID").unwrap()
        );
        // Selecting the other slide moves the ambient result with it.
        second.call("Select", &[]).unwrap();
        let resolved = resolve_slide(SlideSource::Ambient, Some(&host)).unwrap();
        assert_eq!(
            resolved.get_i64("SlideID").unwrap(),
            second.get_i64("SlideID").unwrap()
        );
    }

    #[test]
    fn test_ambient_shape_from_single_selection() {
        let (mock, host) = fixture();
        let pres = mock.add_presentation().unwrap();
        let slide = MockHost::add_slide(&pres).unwrap();
        let shape = MockHost::add_rectangle(&slide, 1.0, 2.0, 3.0, 4.0).unwrap();
        MockHost::select_shapes(&[&shape]).unwrap();
        let resolved = resolve_shape(ShapeSource::Ambient, Some(&host)).unwrap();
        assert_eq!(resolved.get_i64("Id").unwrap(), shape.get_i64("Id").unwrap());
    }

    #[test]
    fn test_ambient_shape_without_selection_fails() {
        let (mock, host) = fixture();
        let pres = mock.add_presentation().unwrap();
        MockHost::add_slide(&pres).unwrap();
        assert!(matches!(
            resolve_shape(ShapeSource::Ambient, Some(&host)),
            Err(Error::Resolution { concept: "Shape", .. })
        ));
    }

    #[test]
    fn test_handle_of_wrong_interface_is_rejected() {
        let (mock, host) = fixture();
        let pres = mock.add_presentation().unwrap();
        let slide = MockHost::add_slide(&pres).unwrap();
        assert!(resolve_shape(ShapeSource::Handle(slide.clone()), Some(&host)).is_err());
        assert!(resolve_slide(SlideSource::Handle(slide), Some(&host)).is_ok());
    }
}
