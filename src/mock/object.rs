//! Late-bound dispatch for the in-memory host.
//!
//! One [`MockObject`] plays the role of one COM object: a typed target
//! into the shared world plus the property/method surface the library
//! exercises. Unknown names fail with `MissingAttribute`; writes the real
//! host refuses (mixed enumeration values, zero gradient variants,
//! non-positive weights) fail with `InvalidValue`.

use super::{
    ConnectorState, Design, GradientStop, Pres, Selection, ShapeNode, SlideData, TableState,
    TextStore, World, WorldState, find_shape,
};
use crate::automation::constants::{
    auto_shape_type, auto_size, fill_type, gradient_color_type, placeholder_type, selection_type,
    shape_type, slide_layout, tri,
};
use crate::automation::{AutomationObject, Handle, Variant};
use crate::common::{Error, Result};
use std::sync::Arc;

const PNG_STUB: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Which text store a text object addresses.
#[derive(Clone, Debug)]
pub(crate) enum TextTarget {
    Shape(i64),
    Notes(i64),
    Cell { table: i64, row: usize, col: usize },
}

/// Collection granularity of a derived text range.
#[derive(Clone, Copy, PartialEq, Debug)]
pub(crate) enum Gran {
    Chars,
    Paragraphs,
    Runs,
    Lines,
    Sentences,
    Words,
}

#[derive(Clone)]
pub(crate) enum Target {
    Application,
    Window,
    View,
    Selection,
    Presentations,
    Presentation(i64),
    PageSetup(i64),
    Designs(i64),
    Design { pres: i64, index: usize },
    CustomLayouts { pres: i64, design: usize },
    CustomLayout { pres: i64, design: usize, layout: usize },
    Slides(i64),
    SlideRange(Vec<i64>),
    Slide(i64),
    NotesPage(i64),
    NotesShapes(i64),
    NotesShape(i64),
    PlaceholderFormat(i64),
    Shapes(i64),
    ShapeRange(Vec<i64>),
    GroupItems(i64),
    Shape(i64),
    Fill(i64),
    GradientStops(i64),
    GradientStop { shape: i64, index: usize },
    Line(i64),
    ConnectorFormat(i64),
    FillFore(i64),
    FillBack(i64),
    LineFore(i64),
    LineBack(i64),
    TextFrame { target: TextTarget, v2: bool },
    TextRange { target: TextTarget, start: i64, length: i64, gran: Gran, v2: bool },
    Font { target: TextTarget, start: i64, length: i64 },
    FontColor { target: TextTarget, start: i64, length: i64 },
    ParagraphFormat { target: TextTarget, para: usize, v2: bool },
    Bullet { target: TextTarget, para: usize },
    BulletFont { target: TextTarget, para: usize },
    BulletFontColor { target: TextTarget, para: usize },
    Table(i64),
    Rows(i64),
    Row { table: i64, index: usize },
    Columns(i64),
    Column { table: i64, index: usize },
    Cell { table: i64, row: usize, col: usize },
    CellShape { table: i64, row: usize, col: usize },
    CellFill { table: i64, row: usize, col: usize },
    CellFillFore { table: i64, row: usize, col: usize },
    CellFillBack { table: i64, row: usize, col: usize },
}

pub(crate) struct MockObject {
    world: Arc<World>,
    target: Target,
}

impl MockObject {
    pub(crate) fn new(world: Arc<World>, target: Target) -> Self {
        Self { world, target }
    }

    fn object(&self, target: Target) -> Variant {
        Variant::Object(Handle::new(Arc::new(MockObject::new(self.world.clone(), target))))
    }

    fn missing(&self, name: &str) -> Error {
        Error::MissingAttribute {
            interface: self.interface_name(),
            path: name.to_string(),
        }
    }
}

fn reject(path: &str, reason: impl Into<String>) -> Error {
    Error::invalid_value(path.to_string(), reason)
}

fn arg<'a>(args: &'a [Variant], index: usize, method: &str) -> Result<&'a Variant> {
    args.get(index)
        .ok_or_else(|| reject(method, format!("missing argument {index}")))
}

fn arg_i64(args: &[Variant], index: usize, method: &str) -> Result<i64> {
    arg(args, index, method)?.as_i64()
}

fn arg_f64(args: &[Variant], index: usize, method: &str) -> Result<f64> {
    arg(args, index, method)?.as_f64()
}

fn arg_str<'a>(args: &'a [Variant], index: usize, method: &str) -> Result<&'a str> {
    arg(args, index, method)?.as_str()
}

fn text_store<'a>(state: &'a WorldState, target: &TextTarget) -> Result<&'a TextStore> {
    match target {
        TextTarget::Shape(id) => state
            .shape(*id)?
            .text
            .as_ref()
            .ok_or_else(|| Error::StaleHandle(format!("text of shape {id}"))),
        TextTarget::Notes(slide) => Ok(&state.slide(*slide)?.notes),
        TextTarget::Cell { table, row, col } => {
            let node = state.shape(*table)?;
            let t = node
                .table
                .as_ref()
                .ok_or_else(|| Error::StaleHandle(format!("table {table}")))?;
            let (r, c) = t.anchor_of(*row, *col);
            Ok(&t.cells[r][c].text)
        }
    }
}

fn text_store_mut<'a>(state: &'a mut WorldState, target: &TextTarget) -> Result<&'a mut TextStore> {
    match target {
        TextTarget::Shape(id) => state
            .shape_mut(*id)?
            .text
            .as_mut()
            .ok_or_else(|| Error::StaleHandle(format!("text of shape {id}"))),
        TextTarget::Notes(slide) => Ok(&mut state.slide_mut(*slide)?.notes),
        TextTarget::Cell { table, row, col } => {
            let node = state.shape_mut(*table)?;
            let t = node
                .table
                .as_mut()
                .ok_or_else(|| Error::StaleHandle(format!("table {table}")))?;
            let (r, c) = t.anchor_of(*row, *col);
            Ok(&mut t.cells[r][c].text)
        }
    }
}

/// Re-fit a shape to its text when auto-size is on.
fn sync_autosize(state: &mut WorldState, target: &TextTarget) {
    if let TextTarget::Shape(id) = target
        && let Ok(node) = state.shape_mut(*id)
        && let Some(store) = &node.text
        && store.auto_size == auto_size::SHAPE_TO_FIT_TEXT
    {
        let (w, h) = store.natural_size();
        node.width = w;
        node.height = h;
    }
}

/// Build the placeholder shapes a layout contributes to a slide.
fn layout_placeholders(state: &mut WorldState, layout_name: &str) -> Vec<ShapeNode> {
    if layout_name.eq_ignore_ascii_case("blank") {
        return Vec::new();
    }
    let mut shapes = Vec::new();
    let title_id = state.alloc_id();
    let mut title = ShapeNode::new(title_id, format!("Title {title_id}"), shape_type::PLACEHOLDER);
    title.placeholder = Some(placeholder_type::TITLE);
    title.text = Some(TextStore::default());
    title.left = 60.0;
    title.top = 40.0;
    title.width = 840.0;
    title.height = 80.0;
    shapes.push(title);
    let body_id = state.alloc_id();
    let mut body = ShapeNode::new(body_id, format!("Content Placeholder {body_id}"), shape_type::PLACEHOLDER);
    body.placeholder = Some(placeholder_type::BODY);
    body.text = Some(TextStore::default());
    body.left = 60.0;
    body.top = 140.0;
    body.width = 840.0;
    body.height = 340.0;
    shapes.push(body);
    shapes
}

fn layout_index(designs: &[Design], design: usize, layout_value: i64) -> usize {
    let wanted = match layout_value {
        slide_layout::TITLE => "Title Slide",
        slide_layout::TEXT => "Title and Content",
        _ => "Blank",
    };
    designs
        .get(design)
        .and_then(|d| d.layouts.iter().position(|l| l == wanted))
        .unwrap_or(0)
}

/// Range span limited to the current buffer, as 0-based `(start, end)`.
fn clamp_span(store: &TextStore, start: i64, length: i64) -> (usize, usize) {
    let len = store.units.len();
    let s = (start.max(0) as usize).min(len);
    let e = ((start + length).max(0) as usize).min(len);
    (s, e.max(s))
}

impl AutomationObject for MockObject {
    fn interface_name(&self) -> String {
        match &self.target {
            Target::Application => "Application",
            Target::Window => "DocumentWindow",
            Target::View => "View",
            Target::Selection => "Selection",
            Target::Presentations => "Presentations",
            Target::Presentation(_) => "Presentation",
            Target::PageSetup(_) => "PageSetup",
            Target::Designs(_) => "Designs",
            Target::Design { .. } => "Design",
            Target::CustomLayouts { .. } => "CustomLayouts",
            Target::CustomLayout { .. } => "CustomLayout",
            Target::Slides(_) => "Slides",
            Target::SlideRange(_) => "SlideRange",
            Target::Slide(_) => "Slide",
            Target::NotesPage(_) => "SlideRange",
            Target::NotesShapes(_) => "Shapes",
            Target::NotesShape(_) => "Shape",
            Target::PlaceholderFormat(_) => "PlaceholderFormat",
            Target::Shapes(_) => "Shapes",
            Target::ShapeRange(_) => "ShapeRange",
            Target::GroupItems(_) => "GroupShapes",
            Target::Shape(_) => "Shape",
            Target::Fill(_) => "FillFormat",
            Target::GradientStops(_) => "GradientStops",
            Target::GradientStop { .. } => "GradientStop",
            Target::Line(_) => "LineFormat",
            Target::ConnectorFormat(_) => "ConnectorFormat",
            Target::FillFore(_) | Target::FillBack(_) | Target::LineFore(_) | Target::LineBack(_) => {
                "ColorFormat"
            }
            Target::TextFrame { v2: false, .. } => "TextFrame",
            Target::TextFrame { v2: true, .. } => "TextFrame2",
            Target::TextRange { v2: false, .. } => "TextRange",
            Target::TextRange { v2: true, .. } => "TextRange2",
            Target::Font { .. } => "Font",
            Target::FontColor { .. } | Target::BulletFontColor { .. } => "ColorFormat",
            Target::ParagraphFormat { v2: false, .. } => "ParagraphFormat",
            Target::ParagraphFormat { v2: true, .. } => "ParagraphFormat2",
            Target::Bullet { .. } => "BulletFormat",
            Target::BulletFont { .. } => "Font",
            Target::Table(_) => "Table",
            Target::Rows(_) => "Rows",
            Target::Row { .. } => "Row",
            Target::Columns(_) => "Columns",
            Target::Column { .. } => "Column",
            Target::Cell { .. } => "Cell",
            Target::CellShape { .. } => "Shape",
            Target::CellFill { .. } => "FillFormat",
            Target::CellFillFore { .. } | Target::CellFillBack { .. } => "ColorFormat",
        }
        .to_string()
    }

    fn get_property(&self, name: &str) -> Result<Variant> {
        let state = self.world.state.read();
        match &self.target {
            Target::Application => match name {
                "Name" => Ok(Variant::Str("Microsoft PowerPoint".into())),
                "Presentations" => Ok(self.object(Target::Presentations)),
                "ActivePresentation" => {
                    let id = state
                        .active_pres
                        .ok_or_else(|| reject("ActivePresentation", "no presentation is open"))?;
                    Ok(self.object(Target::Presentation(id)))
                }
                "ActiveWindow" => {
                    if state.active_pres.is_none() {
                        return Err(reject("ActiveWindow", "no window is open"));
                    }
                    Ok(self.object(Target::Window))
                }
                _ => Err(self.missing(name)),
            },
            Target::Window => match name {
                "Selection" => Ok(self.object(Target::Selection)),
                "ViewType" => Ok(Variant::Int(state.view_type)),
                "View" => Ok(self.object(Target::View)),
                _ => Err(self.missing(name)),
            },
            Target::View => match name {
                "Slide" => {
                    let id = state
                        .active_slide
                        .or_else(|| {
                            state
                                .active_pres
                                .and_then(|p| state.pres(p).ok())
                                .and_then(|p| p.slides.first().map(|s| s.id))
                        })
                        .ok_or_else(|| reject("View.Slide", "no slide in view"))?;
                    Ok(self.object(Target::Slide(id)))
                }
                _ => Err(self.missing(name)),
            },
            Target::Selection => match name {
                "Type" => Ok(Variant::Int(match state.selection {
                    Selection::None => selection_type::NONE,
                    Selection::Slides(_) => selection_type::SLIDES,
                    Selection::Shapes(_) => selection_type::SHAPES,
                    Selection::Text { .. } => selection_type::TEXT,
                })),
                "ShapeRange" => match &state.selection {
                    Selection::Shapes(ids) => Ok(self.object(Target::ShapeRange(ids.clone()))),
                    Selection::Text { shape, .. } => Ok(self.object(Target::ShapeRange(vec![*shape]))),
                    _ => Err(reject("Selection.ShapeRange", "selection holds no shapes")),
                },
                "SlideRange" => match &state.selection {
                    Selection::Slides(ids) => Ok(self.object(Target::SlideRange(ids.clone()))),
                    Selection::Shapes(ids) if !ids.is_empty() => {
                        let slide = state.slide_of_shape(ids[0])?;
                        Ok(self.object(Target::SlideRange(vec![slide.id])))
                    }
                    _ => Err(reject("Selection.SlideRange", "selection holds no slides")),
                },
                "TextRange" => match &state.selection {
                    Selection::Text { shape, start, length } => Ok(self.object(Target::TextRange {
                        target: TextTarget::Shape(*shape),
                        start: *start,
                        length: *length,
                        gran: Gran::Chars,
                        v2: false,
                    })),
                    _ => Err(reject("Selection.TextRange", "selection holds no text")),
                },
                _ => Err(self.missing(name)),
            },
            Target::Presentations => match name {
                "Count" => Ok(Variant::Int(state.presentations.len() as i64)),
                _ => Err(self.missing(name)),
            },
            Target::Presentation(id) => {
                let pres = state.pres(*id)?;
                match name {
                    "Name" => Ok(Variant::Str(pres.name.clone())),
                    "FullName" => Ok(Variant::Str(match &pres.path {
                        Some(p) => p.display().to_string(),
                        None => pres.name.clone(),
                    })),
                    "Path" => Ok(Variant::Str(
                        pres.path
                            .as_ref()
                            .and_then(|p| p.parent())
                            .map(|p| p.display().to_string())
                            .unwrap_or_default(),
                    )),
                    "Saved" => Ok(Variant::Int(tri::from_bool(pres.saved))),
                    "Slides" => Ok(self.object(Target::Slides(*id))),
                    "PageSetup" => Ok(self.object(Target::PageSetup(*id))),
                    "Designs" => Ok(self.object(Target::Designs(*id))),
                    "Parent" => Ok(self.object(Target::Application)),
                    _ => Err(self.missing(name)),
                }
            }
            Target::PageSetup(id) => {
                let pres = state.pres(*id)?;
                match name {
                    "SlideWidth" => Ok(Variant::Float(pres.slide_width)),
                    "SlideHeight" => Ok(Variant::Float(pres.slide_height)),
                    "Parent" => Ok(self.object(Target::Presentation(*id))),
                    _ => Err(self.missing(name)),
                }
            }
            Target::Designs(id) => match name {
                "Count" => Ok(Variant::Int(state.pres(*id)?.designs.len() as i64)),
                "Parent" => Ok(self.object(Target::Presentation(*id))),
                _ => Err(self.missing(name)),
            },
            Target::Design { pres, index } => {
                let design = state
                    .pres(*pres)?
                    .designs
                    .get(*index)
                    .ok_or_else(|| Error::StaleHandle(format!("design {index}")))?;
                match name {
                    "Name" => Ok(Variant::Str(design.name.clone())),
                    "CustomLayouts" => {
                        Ok(self.object(Target::CustomLayouts { pres: *pres, design: *index }))
                    }
                    "Parent" => Ok(self.object(Target::Presentation(*pres))),
                    _ => Err(self.missing(name)),
                }
            }
            Target::CustomLayouts { pres, design } => match name {
                "Count" => {
                    let d = state
                        .pres(*pres)?
                        .designs
                        .get(*design)
                        .ok_or_else(|| Error::StaleHandle(format!("design {design}")))?;
                    Ok(Variant::Int(d.layouts.len() as i64))
                }
                "Parent" => Ok(self.object(Target::Design { pres: *pres, index: *design })),
                _ => Err(self.missing(name)),
            },
            Target::CustomLayout { pres, design, layout } => {
                let d = state
                    .pres(*pres)?
                    .designs
                    .get(*design)
                    .ok_or_else(|| Error::StaleHandle(format!("design {design}")))?;
                let layout_name = d
                    .layouts
                    .get(*layout)
                    .ok_or_else(|| Error::StaleHandle(format!("layout {layout}")))?;
                match name {
                    "Name" => Ok(Variant::Str(layout_name.clone())),
                    "Design" | "Parent" => {
                        Ok(self.object(Target::Design { pres: *pres, index: *design }))
                    }
                    _ => Err(self.missing(name)),
                }
            }
            Target::Slides(id) => match name {
                "Count" => Ok(Variant::Int(state.pres(*id)?.slides.len() as i64)),
                "Parent" => Ok(self.object(Target::Presentation(*id))),
                _ => Err(self.missing(name)),
            },
            Target::SlideRange(ids) => match name {
                "Count" => Ok(Variant::Int(ids.len() as i64)),
                _ => Err(self.missing(name)),
            },
            Target::Slide(id) => {
                let slide = state.slide(*id)?;
                match name {
                    "SlideID" => Ok(Variant::Int(slide.id)),
                    "SlideIndex" => {
                        let pres = state.pres_of_slide(*id)?;
                        let index = pres.slides.iter().position(|s| s.id == *id).unwrap_or(0);
                        Ok(Variant::Int(index as i64 + 1))
                    }
                    "Name" => Ok(Variant::Str(slide.name.clone())),
                    "Shapes" => Ok(self.object(Target::Shapes(*id))),
                    "NotesPage" => Ok(self.object(Target::NotesPage(*id))),
                    "CustomLayout" => {
                        let pres = state.pres_of_slide(*id)?;
                        Ok(self.object(Target::CustomLayout {
                            pres: pres.id,
                            design: slide.design,
                            layout: slide.layout,
                        }))
                    }
                    "Design" => {
                        let pres = state.pres_of_slide(*id)?;
                        Ok(self.object(Target::Design { pres: pres.id, index: slide.design }))
                    }
                    "Parent" => {
                        let pres = state.pres_of_slide(*id)?;
                        Ok(self.object(Target::Presentation(pres.id)))
                    }
                    _ => Err(self.missing(name)),
                }
            }
            Target::NotesPage(id) => match name {
                "Shapes" => Ok(self.object(Target::NotesShapes(*id))),
                "Parent" => Ok(self.object(Target::Slide(*id))),
                _ => Err(self.missing(name)),
            },
            Target::NotesShapes(id) => match name {
                "Count" => Ok(Variant::Int(1)),
                "Parent" => Ok(self.object(Target::NotesPage(*id))),
                _ => Err(self.missing(name)),
            },
            Target::NotesShape(id) => {
                let slide = state.slide(*id)?;
                match name {
                    "Id" => Ok(Variant::Int(slide.notes_shape_id)),
                    "Name" => Ok(Variant::Str("Notes Placeholder".into())),
                    "Type" => Ok(Variant::Int(shape_type::PLACEHOLDER)),
                    "HasTextFrame" => Ok(Variant::Int(tri::TRUE)),
                    "PlaceholderFormat" => Ok(self.object(Target::PlaceholderFormat(slide.notes_shape_id))),
                    "TextFrame" => Ok(self.object(Target::TextFrame {
                        target: TextTarget::Notes(*id),
                        v2: false,
                    })),
                    "Parent" => Ok(self.object(Target::NotesPage(*id))),
                    _ => Err(self.missing(name)),
                }
            }
            Target::PlaceholderFormat(shape_id) => match name {
                "Type" => {
                    // Either a regular placeholder shape or the notes body.
                    if let Ok(node) = state.shape(*shape_id) {
                        node.placeholder
                            .map(Variant::Int)
                            .ok_or_else(|| reject("PlaceholderFormat.Type", "shape is not a placeholder"))
                    } else {
                        Ok(Variant::Int(placeholder_type::BODY))
                    }
                }
                _ => Err(self.missing(name)),
            },
            Target::Shapes(id) => match name {
                "Count" => Ok(Variant::Int(state.slide(*id)?.shapes.len() as i64)),
                "Parent" => Ok(self.object(Target::Slide(*id))),
                _ => Err(self.missing(name)),
            },
            Target::ShapeRange(ids) => match name {
                "Count" => Ok(Variant::Int(ids.len() as i64)),
                _ => Err(self.missing(name)),
            },
            Target::GroupItems(id) => match name {
                "Count" => Ok(Variant::Int(state.shape(*id)?.children.len() as i64)),
                "Parent" => Ok(self.object(Target::Shape(*id))),
                _ => Err(self.missing(name)),
            },
            Target::Shape(id) => {
                let node = state.shape(*id)?;
                match name {
                    "Id" => Ok(Variant::Int(node.id)),
                    "Name" => Ok(Variant::Str(node.name.clone())),
                    "Type" => Ok(Variant::Int(node.shape_type)),
                    "AutoShapeType" => Ok(Variant::Int(node.autoshape_type)),
                    "Left" => Ok(Variant::Float(node.left)),
                    "Top" => Ok(Variant::Float(node.top)),
                    "Width" => Ok(Variant::Float(node.width)),
                    "Height" => Ok(Variant::Float(node.height)),
                    "Rotation" => Ok(Variant::Float(node.rotation)),
                    "Fill" => Ok(self.object(Target::Fill(*id))),
                    "Line" => Ok(self.object(Target::Line(*id))),
                    "HasTextFrame" => Ok(Variant::Int(tri::from_bool(node.text.is_some()))),
                    "HasTable" => Ok(Variant::Int(tri::from_bool(node.table.is_some()))),
                    "TextFrame" if node.text.is_some() => Ok(self.object(Target::TextFrame {
                        target: TextTarget::Shape(*id),
                        v2: false,
                    })),
                    "TextFrame2" if node.text.is_some() => Ok(self.object(Target::TextFrame {
                        target: TextTarget::Shape(*id),
                        v2: true,
                    })),
                    "Table" if node.table.is_some() => Ok(self.object(Target::Table(*id))),
                    "GroupItems" if node.is_group() => Ok(self.object(Target::GroupItems(*id))),
                    "Connector" => Ok(Variant::Int(tri::from_bool(node.connector.is_some()))),
                    "ConnectorFormat" if node.connector.is_some() => {
                        Ok(self.object(Target::ConnectorFormat(*id)))
                    }
                    "PlaceholderFormat" if node.placeholder.is_some() => {
                        Ok(self.object(Target::PlaceholderFormat(*id)))
                    }
                    "ZOrderPosition" => {
                        let slide = state.slide_of_shape(*id)?;
                        let position = zorder_position(&slide.shapes, *id)
                            .ok_or_else(|| Error::StaleHandle(format!("shape {id}")))?;
                        Ok(Variant::Int(position))
                    }
                    "Parent" => {
                        let slide = state.slide_of_shape(*id)?;
                        Ok(self.object(Target::Slide(slide.id)))
                    }
                    _ => Err(self.missing(name)),
                }
            }
            Target::Fill(id) => {
                let fill = &state.shape(*id)?.fill;
                match name {
                    "Visible" => Ok(Variant::Int(fill.visible)),
                    "Type" => Ok(Variant::Int(fill.kind)),
                    "ForeColor" => Ok(self.object(Target::FillFore(*id))),
                    "BackColor" => Ok(self.object(Target::FillBack(*id))),
                    "Transparency" => Ok(Variant::Float(fill.transparency)),
                    "Pattern" => Ok(Variant::Int(fill.pattern)),
                    "GradientColorType" => Ok(Variant::Int(fill.gradient_color_type)),
                    "GradientStyle" => Ok(Variant::Int(fill.gradient_style)),
                    "GradientVariant" => Ok(Variant::Int(fill.gradient_variant)),
                    "GradientDegree" => Ok(Variant::Float(fill.gradient_degree)),
                    "GradientStops" if fill.kind == fill_type::GRADIENT => {
                        Ok(self.object(Target::GradientStops(*id)))
                    }
                    "Parent" => Ok(self.object(Target::Shape(*id))),
                    _ => Err(self.missing(name)),
                }
            }
            Target::GradientStops(id) => match name {
                "Count" => Ok(Variant::Int(state.shape(*id)?.fill.stops.len() as i64)),
                "Parent" => Ok(self.object(Target::Fill(*id))),
                _ => Err(self.missing(name)),
            },
            Target::GradientStop { shape, index } => {
                let fill = &state.shape(*shape)?.fill;
                let stop = fill
                    .stops
                    .get(*index)
                    .ok_or_else(|| Error::StaleHandle(format!("gradient stop {index}")))?;
                match name {
                    "Position" => Ok(Variant::Float(stop.position)),
                    "Transparency" => Ok(Variant::Float(stop.transparency)),
                    "Color" => Ok(self.object(Target::GradientStop { shape: *shape, index: *index })),
                    // Color sub-object and the stop share a target; RGB
                    // lands here either way.
                    "RGB" => Ok(Variant::Int(stop.rgb)),
                    "Parent" => Ok(self.object(Target::GradientStops(*shape))),
                    _ => Err(self.missing(name)),
                }
            }
            Target::Line(id) => {
                let line = &state.shape(*id)?.line;
                match name {
                    "Visible" => Ok(Variant::Int(line.visible)),
                    "Weight" => Ok(Variant::Float(line.weight)),
                    "Style" => Ok(Variant::Int(line.style)),
                    "DashStyle" => Ok(Variant::Int(line.dash)),
                    "ForeColor" => Ok(self.object(Target::LineFore(*id))),
                    "BackColor" => Ok(self.object(Target::LineBack(*id))),
                    "Transparency" => Ok(Variant::Float(line.transparency)),
                    "Pattern" => Ok(Variant::Int(line.pattern)),
                    "InsetPen" => Ok(Variant::Int(line.inset_pen)),
                    "BeginArrowheadStyle" => Ok(Variant::Int(line.begin_style)),
                    "BeginArrowheadLength" => Ok(Variant::Int(line.begin_length)),
                    "BeginArrowheadWidth" => Ok(Variant::Int(line.begin_width)),
                    "EndArrowheadStyle" => Ok(Variant::Int(line.end_style)),
                    "EndArrowheadLength" => Ok(Variant::Int(line.end_length)),
                    "EndArrowheadWidth" => Ok(Variant::Int(line.end_width)),
                    "Parent" => Ok(self.object(Target::Shape(*id))),
                    _ => Err(self.missing(name)),
                }
            }
            Target::ConnectorFormat(id) => {
                let connector = state
                    .shape(*id)?
                    .connector
                    .as_ref()
                    .ok_or_else(|| Error::StaleHandle(format!("connector {id}")))?;
                match name {
                    "BeginConnected" => Ok(Variant::Int(tri::from_bool(connector.begin.is_some()))),
                    "EndConnected" => Ok(Variant::Int(tri::from_bool(connector.end.is_some()))),
                    "BeginConnectedShape" => connector
                        .begin
                        .map(|(shape, _)| self.object(Target::Shape(shape)))
                        .ok_or_else(|| reject("BeginConnectedShape", "begin is not connected")),
                    "EndConnectedShape" => connector
                        .end
                        .map(|(shape, _)| self.object(Target::Shape(shape)))
                        .ok_or_else(|| reject("EndConnectedShape", "end is not connected")),
                    "BeginConnectionSite" => connector
                        .begin
                        .map(|(_, site)| Variant::Int(site))
                        .ok_or_else(|| reject("BeginConnectionSite", "begin is not connected")),
                    "EndConnectionSite" => connector
                        .end
                        .map(|(_, site)| Variant::Int(site))
                        .ok_or_else(|| reject("EndConnectionSite", "end is not connected")),
                    "Parent" => Ok(self.object(Target::Shape(*id))),
                    _ => Err(self.missing(name)),
                }
            }
            Target::FillFore(id) | Target::FillBack(id) | Target::LineFore(id) | Target::LineBack(id) => {
                let node = state.shape(*id)?;
                let rgb = match &self.target {
                    Target::FillFore(_) => node.fill.fore_rgb,
                    Target::FillBack(_) => node.fill.back_rgb,
                    Target::LineFore(_) => node.line.fore_rgb,
                    _ => node.line.back_rgb,
                };
                match name {
                    "RGB" => Ok(Variant::Int(rgb)),
                    "Parent" => Ok(match &self.target {
                        Target::FillFore(_) | Target::FillBack(_) => self.object(Target::Fill(*id)),
                        _ => self.object(Target::Line(*id)),
                    }),
                    _ => Err(self.missing(name)),
                }
            }
            Target::TextFrame { target, v2 } => {
                let store = text_store(&state, target)?;
                match name {
                    "TextRange" => Ok(self.object(Target::TextRange {
                        target: target.clone(),
                        start: 0,
                        length: store.len(),
                        gran: Gran::Chars,
                        v2: *v2,
                    })),
                    "HasText" => Ok(Variant::Int(tri::from_bool(!store.units.is_empty()))),
                    "AutoSize" => Ok(Variant::Int(store.auto_size)),
                    "WordWrap" => Ok(Variant::Int(store.word_wrap)),
                    "Orientation" => Ok(Variant::Int(store.orientation)),
                    "VerticalAnchor" => Ok(Variant::Int(store.vertical_anchor)),
                    "MarginLeft" => Ok(Variant::Float(store.margin_left)),
                    "MarginRight" => Ok(Variant::Float(store.margin_right)),
                    "MarginTop" => Ok(Variant::Float(store.margin_top)),
                    "MarginBottom" => Ok(Variant::Float(store.margin_bottom)),
                    "Parent" => match target {
                        TextTarget::Shape(id) => Ok(self.object(Target::Shape(*id))),
                        TextTarget::Notes(slide) => Ok(self.object(Target::NotesShape(*slide))),
                        TextTarget::Cell { table, row, col } => Ok(self.object(Target::CellShape {
                            table: *table,
                            row: *row,
                            col: *col,
                        })),
                    },
                    _ => Err(self.missing(name)),
                }
            }
            Target::TextRange { target, start, length, gran, v2 } => {
                let store = text_store(&state, target)?;
                let (s, e) = clamp_span(store, *start, *length);
                match name {
                    "Text" => Ok(Variant::Str(String::from_utf16_lossy(&store.units[s..e]))),
                    "Start" => Ok(Variant::Int(*start + 1)),
                    "Length" => Ok(Variant::Int((e - s) as i64)),
                    "Count" => Ok(Variant::Int(range_count(store, s, e, *gran))),
                    "Font" => Ok(self.object(Target::Font {
                        target: target.clone(),
                        start: s as i64,
                        length: (e - s) as i64,
                    })),
                    "ParagraphFormat" => Ok(self.object(Target::ParagraphFormat {
                        target: target.clone(),
                        para: store.paragraph_at(s),
                        v2: *v2,
                    })),
                    "IndentLevel" => {
                        let para = store.paragraph_at(s);
                        let indent = store
                            .paras
                            .get(para)
                            .map(|p| p.indent_level)
                            .unwrap_or(1);
                        Ok(Variant::Int(indent))
                    }
                    "Parent" => Ok(self.object(Target::TextFrame { target: target.clone(), v2: *v2 })),
                    _ => Err(self.missing(name)),
                }
            }
            Target::Font { target, start, length } => {
                let store = text_store(&state, target)?;
                let (s, e) = clamp_span(store, *start, *length);
                let font = if s < e { &store.fonts[s] } else { &store.default_font };
                match name {
                    "Size" => Ok(Variant::Float(font.size)),
                    "Name" => Ok(Variant::Str(font.name.clone())),
                    "Bold" => Ok(Variant::Int(uniform(store, s, e, |f| f.bold, font.bold))),
                    "Italic" => Ok(Variant::Int(uniform(store, s, e, |f| f.italic, font.italic))),
                    "Shadow" => Ok(Variant::Int(uniform(store, s, e, |f| f.shadow, font.shadow))),
                    "Superscript" => {
                        Ok(Variant::Int(uniform(store, s, e, |f| f.superscript, font.superscript)))
                    }
                    "Subscript" => {
                        Ok(Variant::Int(uniform(store, s, e, |f| f.subscript, font.subscript)))
                    }
                    "Underline" => {
                        Ok(Variant::Int(uniform(store, s, e, |f| f.underline, font.underline)))
                    }
                    "Color" => Ok(self.object(Target::FontColor {
                        target: target.clone(),
                        start: *start,
                        length: *length,
                    })),
                    _ => Err(self.missing(name)),
                }
            }
            Target::FontColor { target, start, length } => {
                let store = text_store(&state, target)?;
                let (s, e) = clamp_span(store, *start, *length);
                let rgb = if s < e { store.fonts[s].rgb } else { store.default_font.rgb };
                match name {
                    "RGB" => Ok(Variant::Int(rgb)),
                    _ => Err(self.missing(name)),
                }
            }
            Target::ParagraphFormat { target, para, .. } => {
                let store = text_store(&state, target)?;
                let p = store
                    .paras
                    .get(*para)
                    .ok_or_else(|| Error::StaleHandle(format!("paragraph {para}")))?;
                match name {
                    "Alignment" => Ok(Variant::Int(p.alignment)),
                    "HangingPunctuation" => Ok(Variant::Int(p.hanging_punctuation)),
                    "SpaceBefore" => Ok(Variant::Float(p.space_before)),
                    "SpaceAfter" => Ok(Variant::Float(p.space_after)),
                    "SpaceWithin" => Ok(Variant::Float(p.space_within)),
                    "LineRuleBefore" => Ok(Variant::Int(p.line_rule_before)),
                    "LineRuleAfter" => Ok(Variant::Int(p.line_rule_after)),
                    "LineRuleWithin" => Ok(Variant::Int(p.line_rule_within)),
                    "FirstLineIndent" => Ok(Variant::Float(p.first_line_indent)),
                    "LeftIndent" => Ok(Variant::Float(p.left_indent)),
                    "RightIndent" => Ok(Variant::Float(p.right_indent)),
                    "Bullet" => Ok(self.object(Target::Bullet { target: target.clone(), para: *para })),
                    _ => Err(self.missing(name)),
                }
            }
            Target::Bullet { target, para } => {
                let store = text_store(&state, target)?;
                let b = &store
                    .paras
                    .get(*para)
                    .ok_or_else(|| Error::StaleHandle(format!("paragraph {para}")))?
                    .bullet;
                match name {
                    "Visible" => Ok(Variant::Int(b.visible)),
                    "Type" => Ok(Variant::Int(b.kind)),
                    "Character" => Ok(Variant::Int(b.character)),
                    "RelativeSize" => Ok(Variant::Float(b.relative_size)),
                    "UseTextFont" => Ok(Variant::Int(b.use_text_font)),
                    "UseTextColor" => Ok(Variant::Int(b.use_text_color)),
                    "Font" => Ok(self.object(Target::BulletFont { target: target.clone(), para: *para })),
                    _ => Err(self.missing(name)),
                }
            }
            Target::BulletFont { target, para } => {
                let store = text_store(&state, target)?;
                let b = &store
                    .paras
                    .get(*para)
                    .ok_or_else(|| Error::StaleHandle(format!("paragraph {para}")))?
                    .bullet;
                match name {
                    "Name" => Ok(Variant::Str(b.font_name.clone())),
                    "Color" => {
                        Ok(self.object(Target::BulletFontColor { target: target.clone(), para: *para }))
                    }
                    _ => Err(self.missing(name)),
                }
            }
            Target::BulletFontColor { target, para } => {
                let store = text_store(&state, target)?;
                let b = &store
                    .paras
                    .get(*para)
                    .ok_or_else(|| Error::StaleHandle(format!("paragraph {para}")))?
                    .bullet;
                match name {
                    "RGB" => Ok(Variant::Int(b.font_rgb)),
                    _ => Err(self.missing(name)),
                }
            }
            Target::Table(id) => {
                let node = state.shape(*id)?;
                if node.table.is_none() {
                    return Err(Error::StaleHandle(format!("table {id}")));
                }
                match name {
                    "Rows" => Ok(self.object(Target::Rows(*id))),
                    "Columns" => Ok(self.object(Target::Columns(*id))),
                    "Parent" => Ok(self.object(Target::Shape(*id))),
                    _ => Err(self.missing(name)),
                }
            }
            Target::Rows(id) => match name {
                "Count" => Ok(Variant::Int(table_ref(&state, *id)?.n_rows() as i64)),
                "Parent" => Ok(self.object(Target::Table(*id))),
                _ => Err(self.missing(name)),
            },
            Target::Columns(id) => match name {
                "Count" => Ok(Variant::Int(table_ref(&state, *id)?.n_cols() as i64)),
                "Parent" => Ok(self.object(Target::Table(*id))),
                _ => Err(self.missing(name)),
            },
            Target::Row { table, index } => {
                let t = table_ref(&state, *table)?;
                let height = *t
                    .row_heights
                    .get(*index)
                    .ok_or_else(|| Error::StaleHandle(format!("row {index}")))?;
                match name {
                    "Height" => Ok(Variant::Float(height)),
                    "Parent" => Ok(self.object(Target::Rows(*table))),
                    _ => Err(self.missing(name)),
                }
            }
            Target::Column { table, index } => {
                let t = table_ref(&state, *table)?;
                let width = *t
                    .col_widths
                    .get(*index)
                    .ok_or_else(|| Error::StaleHandle(format!("column {index}")))?;
                match name {
                    "Width" => Ok(Variant::Float(width)),
                    "Parent" => Ok(self.object(Target::Columns(*table))),
                    _ => Err(self.missing(name)),
                }
            }
            Target::Cell { table, row, col } => match name {
                "Shape" => Ok(self.object(Target::CellShape { table: *table, row: *row, col: *col })),
                "RowIndex" => Ok(Variant::Int(*row as i64 + 1)),
                "ColumnIndex" => Ok(Variant::Int(*col as i64 + 1)),
                "Parent" => Ok(self.object(Target::Table(*table))),
                _ => Err(self.missing(name)),
            },
            Target::CellShape { table, row, col } => {
                let node = state.shape(*table)?;
                let t = node
                    .table
                    .as_ref()
                    .ok_or_else(|| Error::StaleHandle(format!("table {table}")))?;
                if *row >= t.n_rows() || *col >= t.n_cols() {
                    return Err(Error::StaleHandle(format!("cell ({row}, {col})")));
                }
                let (left, top, width, height) = t.cell_box(*row, *col);
                match name {
                    "Left" => Ok(Variant::Float(node.left + left)),
                    "Top" => Ok(Variant::Float(node.top + top)),
                    "Width" => Ok(Variant::Float(width)),
                    "Height" => Ok(Variant::Float(height)),
                    "HasTextFrame" => Ok(Variant::Int(tri::TRUE)),
                    "Fill" => Ok(self.object(Target::CellFill { table: *table, row: *row, col: *col })),
                    "TextFrame" => Ok(self.object(Target::TextFrame {
                        target: TextTarget::Cell { table: *table, row: *row, col: *col },
                        v2: false,
                    })),
                    "TextFrame2" => Ok(self.object(Target::TextFrame {
                        target: TextTarget::Cell { table: *table, row: *row, col: *col },
                        v2: true,
                    })),
                    "Parent" => Ok(self.object(Target::Cell { table: *table, row: *row, col: *col })),
                    _ => Err(self.missing(name)),
                }
            }
            Target::CellFill { table, row, col } => {
                let fill = cell_fill(&state, *table, *row, *col)?;
                match name {
                    "Visible" => Ok(Variant::Int(fill.visible)),
                    "Type" => Ok(Variant::Int(fill.kind)),
                    "ForeColor" => {
                        Ok(self.object(Target::CellFillFore { table: *table, row: *row, col: *col }))
                    }
                    "BackColor" => {
                        Ok(self.object(Target::CellFillBack { table: *table, row: *row, col: *col }))
                    }
                    "Transparency" => Ok(Variant::Float(fill.transparency)),
                    "Pattern" => Ok(Variant::Int(fill.pattern)),
                    "Parent" => {
                        Ok(self.object(Target::CellShape { table: *table, row: *row, col: *col }))
                    }
                    _ => Err(self.missing(name)),
                }
            }
            Target::CellFillFore { table, row, col } | Target::CellFillBack { table, row, col } => {
                let fill = cell_fill(&state, *table, *row, *col)?;
                match name {
                    "RGB" => Ok(Variant::Int(match &self.target {
                        Target::CellFillFore { .. } => fill.fore_rgb,
                        _ => fill.back_rgb,
                    })),
                    _ => Err(self.missing(name)),
                }
            }
        }
    }

    fn set_property(&self, name: &str, value: Variant) -> Result<()> {
        let mut state = self.world.state.write();
        match &self.target {
            Target::Window => match name {
                "ViewType" => {
                    state.view_type = value.as_i64()?;
                    Ok(())
                }
                _ => Err(self.missing(name)),
            },
            Target::PageSetup(id) => {
                let pres = state.pres_mut(*id)?;
                match name {
                    "SlideWidth" => {
                        pres.slide_width = value.as_f64()?;
                        Ok(())
                    }
                    "SlideHeight" => {
                        pres.slide_height = value.as_f64()?;
                        Ok(())
                    }
                    _ => Err(self.missing(name)),
                }
            }
            Target::Slide(id) => match name {
                "Name" => {
                    state.slide_mut(*id)?.name = value.as_str()?.to_string();
                    Ok(())
                }
                "CustomLayout" => {
                    // The layout handle reads from this same world; its
                    // names have to be taken before re-locking.
                    let layout = value.as_object()?.clone();
                    drop(state);
                    let design_name = layout.get_string("Design.Name")?;
                    let layout_name = layout.get_string("Name")?;
                    let mut state = self.world.state.write();
                    let pres_id = state.pres_of_slide(*id)?.id;
                    let (design_idx, layout_idx) = {
                        let pres = state.pres(pres_id)?;
                        find_layout(&pres.designs, &design_name, &layout_name)
                            .ok_or_else(|| reject("CustomLayout", "layout not in this presentation"))?
                    };
                    let placeholders = layout_placeholders(&mut state, &layout_name);
                    let slide = state.slide_mut(*id)?;
                    slide.design = design_idx;
                    slide.layout = layout_idx;
                    slide.shapes.extend(placeholders);
                    Ok(())
                }
                _ => Err(self.missing(name)),
            },
            Target::Shape(id) => match name {
                "Name" => {
                    state.shape_mut(*id)?.name = value.as_str()?.to_string();
                    Ok(())
                }
                "AutoShapeType" => {
                    let v = value.as_i64()?;
                    if v < 1 {
                        return Err(reject("AutoShapeType", "not a geometry preset"));
                    }
                    state.shape_mut(*id)?.autoshape_type = v;
                    Ok(())
                }
                "Rotation" => {
                    state.shape_mut(*id)?.rotation = value.as_f64()?;
                    Ok(())
                }
                "Left" | "Top" | "Width" | "Height" => {
                    let v = value.as_f64()?;
                    let node = state.shape_mut(*id)?;
                    match name {
                        "Left" => {
                            let delta = v - node.left;
                            node.left = v;
                            translate_children(node, delta, 0.0);
                        }
                        "Top" => {
                            let delta = v - node.top;
                            node.top = v;
                            translate_children(node, 0.0, delta);
                        }
                        "Width" => {
                            if v < 0.0 {
                                return Err(reject("Width", "negative extent"));
                            }
                            scale_children(node, v / node.width.max(f64::EPSILON), 1.0);
                            node.width = v;
                        }
                        _ => {
                            if v < 0.0 {
                                return Err(reject("Height", "negative extent"));
                            }
                            scale_children(node, 1.0, v / node.height.max(f64::EPSILON));
                            node.height = v;
                        }
                    }
                    Ok(())
                }
                _ => Err(self.missing(name)),
            },
            Target::Fill(id) => {
                let fill = &mut state.shape_mut(*id)?.fill;
                match name {
                    "Visible" => fill.visible = value.as_i64()?,
                    "Transparency" => {
                        let v = value.as_f64()?;
                        if !(0.0..=1.0).contains(&v) {
                            return Err(reject("Transparency", "out of range"));
                        }
                        fill.transparency = v;
                    }
                    "Pattern" | "Type" | "GradientColorType" | "GradientStyle" | "GradientVariant"
                    | "GradientDegree" => {
                        // Sub-mode state is switched through methods, not
                        // property writes.
                        return Err(reject(name, "read-only fill property"));
                    }
                    _ => return Err(self.missing(name)),
                }
                Ok(())
            }
            Target::GradientStop { shape, index } => {
                let fill = &mut state.shape_mut(*shape)?.fill;
                let stop = fill
                    .stops
                    .get_mut(*index)
                    .ok_or_else(|| Error::StaleHandle(format!("gradient stop {index}")))?;
                match name {
                    "Position" => {
                        let v = value.as_f64()?;
                        if !(0.0..=1.0).contains(&v) {
                            return Err(reject("Position", "out of range"));
                        }
                        stop.position = v;
                    }
                    "Transparency" => stop.transparency = value.as_f64()?,
                    "RGB" => stop.rgb = value.as_i64()?,
                    _ => return Err(self.missing(name)),
                }
                Ok(())
            }
            Target::Line(id) => {
                let line = &mut state.shape_mut(*id)?.line;
                match name {
                    "Visible" => line.visible = value.as_i64()?,
                    "Weight" => {
                        let v = value.as_f64()?;
                        if v <= 0.0 || v > 1584.0 {
                            return Err(reject("Weight", "out of range"));
                        }
                        line.weight = v;
                    }
                    "Style" => line.style = positive_enum("Style", value.as_i64()?)?,
                    "DashStyle" => line.dash = positive_enum("DashStyle", value.as_i64()?)?,
                    "Transparency" => line.transparency = value.as_f64()?,
                    "Pattern" => line.pattern = positive_enum("Pattern", value.as_i64()?)?,
                    "InsetPen" => line.inset_pen = value.as_i64()?,
                    "BeginArrowheadStyle" => {
                        line.begin_style = positive_enum("BeginArrowheadStyle", value.as_i64()?)?
                    }
                    "BeginArrowheadLength" => {
                        line.begin_length = positive_enum("BeginArrowheadLength", value.as_i64()?)?
                    }
                    "BeginArrowheadWidth" => {
                        line.begin_width = positive_enum("BeginArrowheadWidth", value.as_i64()?)?
                    }
                    "EndArrowheadStyle" => {
                        line.end_style = positive_enum("EndArrowheadStyle", value.as_i64()?)?
                    }
                    "EndArrowheadLength" => {
                        line.end_length = positive_enum("EndArrowheadLength", value.as_i64()?)?
                    }
                    "EndArrowheadWidth" => {
                        line.end_width = positive_enum("EndArrowheadWidth", value.as_i64()?)?
                    }
                    _ => return Err(self.missing(name)),
                }
                Ok(())
            }
            Target::FillFore(id) | Target::FillBack(id) | Target::LineFore(id) | Target::LineBack(id) => {
                if name != "RGB" {
                    return Err(self.missing(name));
                }
                let rgb = value.as_i64()?;
                let node = state.shape_mut(*id)?;
                match &self.target {
                    Target::FillFore(_) => node.fill.fore_rgb = rgb,
                    Target::FillBack(_) => node.fill.back_rgb = rgb,
                    Target::LineFore(_) => node.line.fore_rgb = rgb,
                    _ => node.line.back_rgb = rgb,
                }
                Ok(())
            }
            Target::TextFrame { target, .. } => {
                {
                    let store = text_store_mut(&mut state, target)?;
                    match name {
                        "AutoSize" => store.auto_size = value.as_i64()?,
                        "WordWrap" => store.word_wrap = value.as_i64()?,
                        "Orientation" => store.orientation = value.as_i64()?,
                        "VerticalAnchor" => store.vertical_anchor = value.as_i64()?,
                        "MarginLeft" => store.margin_left = value.as_f64()?,
                        "MarginRight" => store.margin_right = value.as_f64()?,
                        "MarginTop" => store.margin_top = value.as_f64()?,
                        "MarginBottom" => store.margin_bottom = value.as_f64()?,
                        _ => return Err(self.missing(name)),
                    }
                }
                sync_autosize(&mut state, target);
                Ok(())
            }
            Target::TextRange { target, start, length, .. } => match name {
                "Text" => {
                    let text = value.as_str()?.to_string();
                    {
                        let store = text_store_mut(&mut state, target)?;
                        let (s, e) = clamp_span(store, *start, *length);
                        if s == 0 && e == store.units.len() {
                            store.set_text(&text);
                        } else {
                            store.replace(s, e - s, &text);
                        }
                    }
                    sync_autosize(&mut state, target);
                    Ok(())
                }
                "IndentLevel" => {
                    let level = value.as_i64()?;
                    if !(1..=9).contains(&level) {
                        return Err(reject("IndentLevel", "out of range"));
                    }
                    let store = text_store_mut(&mut state, target)?;
                    let (s, e) = clamp_span(store, *start, *length);
                    let first = store.paragraph_at(s);
                    let last = store.paragraph_at(e.saturating_sub(1).max(s));
                    let last = last.min(store.paras.len() - 1);
                    for para in store.paras[first..=last].iter_mut() {
                        para.indent_level = level;
                    }
                    Ok(())
                }
                _ => Err(self.missing(name)),
            },
            Target::Font { target, start, length } => {
                let store = text_store_mut(&mut state, target)?;
                let (s, e) = clamp_span(store, *start, *length);
                let apply = |font: &mut super::FontState| -> Result<()> {
                    match name {
                        "Size" => {
                            let v = value.as_f64()?;
                            if v <= 0.0 {
                                return Err(reject("Size", "non-positive size"));
                            }
                            font.size = v;
                        }
                        "Name" => font.name = value.as_str()?.to_string(),
                        "Bold" => font.bold = tri_write("Bold", value.as_i64()?)?,
                        "Italic" => font.italic = tri_write("Italic", value.as_i64()?)?,
                        "Shadow" => font.shadow = tri_write("Shadow", value.as_i64()?)?,
                        "Superscript" => font.superscript = tri_write("Superscript", value.as_i64()?)?,
                        "Subscript" => font.subscript = tri_write("Subscript", value.as_i64()?)?,
                        "Underline" => font.underline = tri_write("Underline", value.as_i64()?)?,
                        _ => return Err(Error::MissingAttribute {
                            interface: "Font".to_string(),
                            path: name.to_string(),
                        }),
                    }
                    Ok(())
                };
                if s == e {
                    apply(&mut store.default_font)?;
                } else {
                    for i in s..e {
                        apply(&mut store.fonts[i])?;
                    }
                }
                Ok(())
            }
            Target::FontColor { target, start, length } => {
                if name != "RGB" {
                    return Err(self.missing(name));
                }
                let rgb = value.as_i64()?;
                let store = text_store_mut(&mut state, target)?;
                let (s, e) = clamp_span(store, *start, *length);
                if s == e {
                    store.default_font.rgb = rgb;
                } else {
                    for i in s..e {
                        store.fonts[i].rgb = rgb;
                    }
                }
                Ok(())
            }
            Target::ParagraphFormat { target, para, .. } => {
                let store = text_store_mut(&mut state, target)?;
                let p = store
                    .paras
                    .get_mut(*para)
                    .ok_or_else(|| Error::StaleHandle(format!("paragraph {para}")))?;
                match name {
                    "Alignment" => p.alignment = positive_enum("Alignment", value.as_i64()?)?,
                    "HangingPunctuation" => p.hanging_punctuation = value.as_i64()?,
                    "SpaceBefore" => p.space_before = value.as_f64()?,
                    "SpaceAfter" => p.space_after = value.as_f64()?,
                    "SpaceWithin" => p.space_within = value.as_f64()?,
                    "LineRuleBefore" => p.line_rule_before = value.as_i64()?,
                    "LineRuleAfter" => p.line_rule_after = value.as_i64()?,
                    "LineRuleWithin" => p.line_rule_within = value.as_i64()?,
                    "FirstLineIndent" => p.first_line_indent = value.as_f64()?,
                    "LeftIndent" => p.left_indent = value.as_f64()?,
                    "RightIndent" => p.right_indent = value.as_f64()?,
                    _ => return Err(self.missing(name)),
                }
                Ok(())
            }
            Target::Bullet { target, para } => {
                let store = text_store_mut(&mut state, target)?;
                let b = &mut store
                    .paras
                    .get_mut(*para)
                    .ok_or_else(|| Error::StaleHandle(format!("paragraph {para}")))?
                    .bullet;
                match name {
                    "Visible" => b.visible = value.as_i64()?,
                    // Writing Type silently re-shows the bullet, the way
                    // the host does.
                    "Type" => {
                        b.kind = positive_or_zero_enum("Type", value.as_i64()?)?;
                        if b.kind != 0 {
                            b.visible = tri::TRUE;
                        }
                    }
                    "Character" => {
                        b.character = value.as_i64()?;
                        b.kind = crate::automation::constants::bullet_type::UNNUMBERED;
                    }
                    "RelativeSize" => b.relative_size = value.as_f64()?,
                    "UseTextFont" => b.use_text_font = value.as_i64()?,
                    "UseTextColor" => b.use_text_color = value.as_i64()?,
                    _ => return Err(self.missing(name)),
                }
                Ok(())
            }
            Target::BulletFont { target, para } => {
                let store = text_store_mut(&mut state, target)?;
                let b = &mut store
                    .paras
                    .get_mut(*para)
                    .ok_or_else(|| Error::StaleHandle(format!("paragraph {para}")))?
                    .bullet;
                match name {
                    "Name" => b.font_name = value.as_str()?.to_string(),
                    _ => return Err(self.missing(name)),
                }
                Ok(())
            }
            Target::BulletFontColor { target, para } => {
                if name != "RGB" {
                    return Err(self.missing(name));
                }
                let store = text_store_mut(&mut state, target)?;
                store
                    .paras
                    .get_mut(*para)
                    .ok_or_else(|| Error::StaleHandle(format!("paragraph {para}")))?
                    .bullet
                    .font_rgb = value.as_i64()?;
                Ok(())
            }
            Target::Row { table, index } => match name {
                "Height" => {
                    let v = value.as_f64()?;
                    if v <= 0.0 {
                        return Err(reject("Height", "non-positive height"));
                    }
                    let t = table_mut(&mut state, *table)?;
                    *t.row_heights
                        .get_mut(*index)
                        .ok_or_else(|| Error::StaleHandle(format!("row {index}")))? = v;
                    Ok(())
                }
                _ => Err(self.missing(name)),
            },
            Target::Column { table, index } => match name {
                "Width" => {
                    let v = value.as_f64()?;
                    if v <= 0.0 {
                        return Err(reject("Width", "non-positive width"));
                    }
                    let t = table_mut(&mut state, *table)?;
                    *t.col_widths
                        .get_mut(*index)
                        .ok_or_else(|| Error::StaleHandle(format!("column {index}")))? = v;
                    Ok(())
                }
                _ => Err(self.missing(name)),
            },
            Target::CellFill { table, row, col } => {
                let fill = cell_fill_mut(&mut state, *table, *row, *col)?;
                match name {
                    "Visible" => fill.visible = value.as_i64()?,
                    "Transparency" => {
                        let v = value.as_f64()?;
                        if !(0.0..=1.0).contains(&v) {
                            return Err(reject("Transparency", "out of range"));
                        }
                        fill.transparency = v;
                    }
                    "Pattern" | "Type" => return Err(reject(name, "read-only fill property")),
                    _ => return Err(self.missing(name)),
                }
                Ok(())
            }
            Target::CellFillFore { table, row, col } | Target::CellFillBack { table, row, col } => {
                if name != "RGB" {
                    return Err(self.missing(name));
                }
                let rgb = value.as_i64()?;
                let fore = matches!(self.target, Target::CellFillFore { .. });
                let fill = cell_fill_mut(&mut state, *table, *row, *col)?;
                if fore {
                    fill.fore_rgb = rgb;
                } else {
                    fill.back_rgb = rgb;
                }
                Ok(())
            }
            _ => Err(self.missing(name)),
        }
    }

    fn invoke(&self, method: &str, args: &[Variant]) -> Result<Variant> {
        match (&self.target, method) {
            (Target::Presentations, "Item") => {
                let index = arg_i64(args, 0, "Item")? as usize;
                let state = self.world.state.read();
                let pres = state
                    .presentations
                    .get(index.wrapping_sub(1))
                    .ok_or_else(|| reject("Item", format!("presentation index {index}")))?;
                Ok(self.object(Target::Presentation(pres.id)))
            }
            (Target::Presentations, "Add") => {
                let mut state = self.world.state.write();
                let id = self.add_presentation(&mut state, None);
                Ok(self.object(Target::Presentation(id)))
            }
            (Target::Presentations, "Open") => {
                let path = arg_str(args, 0, "Open")?.to_string();
                let mut state = self.world.state.write();
                let id = self.add_presentation(&mut state, Some(path.into()));
                Ok(self.object(Target::Presentation(id)))
            }
            (Target::Presentation(id), "Save") => {
                self.world.state.write().pres_mut(*id)?.saved = true;
                Ok(Variant::Empty)
            }
            (Target::Presentation(id), "SaveAs") => {
                let path = arg_str(args, 0, "SaveAs")?.to_string();
                let mut state = self.world.state.write();
                let pres = state.pres_mut(*id)?;
                pres.path = Some(path.into());
                pres.saved = true;
                Ok(Variant::Empty)
            }
            (Target::Slides(pres_id), "Item") => {
                let index = arg_i64(args, 0, "Item")? as usize;
                let state = self.world.state.read();
                let slide = state
                    .pres(*pres_id)?
                    .slides
                    .get(index.wrapping_sub(1))
                    .ok_or_else(|| reject("Item", format!("slide index {index}")))?;
                Ok(self.object(Target::Slide(slide.id)))
            }
            (Target::Slides(pres_id), "FindBySlideID") => {
                let wanted = arg_i64(args, 0, "FindBySlideID")?;
                let state = self.world.state.read();
                let slide = state
                    .pres(*pres_id)?
                    .slides
                    .iter()
                    .find(|s| s.id == wanted)
                    .ok_or_else(|| reject("FindBySlideID", format!("slide id {wanted}")))?;
                Ok(self.object(Target::Slide(slide.id)))
            }
            (Target::Slides(pres_id), "Add") => {
                let mut state = self.world.state.write();
                let count = state.pres(*pres_id)?.slides.len();
                let index = match args.first() {
                    Some(Variant::Empty) | None => count + 1,
                    Some(v) => (v.as_i64()? as usize).clamp(1, count + 1),
                };
                let layout_value = match args.get(1) {
                    Some(Variant::Empty) | None => slide_layout::BLANK,
                    Some(v) => v.as_i64()?,
                };
                let slide_id = self.add_slide(&mut state, *pres_id, index, layout_value)?;
                Ok(self.object(Target::Slide(slide_id)))
            }
            (Target::SlideRange(ids), "Item") => {
                let index = arg_i64(args, 0, "Item")? as usize;
                let id = ids
                    .get(index.wrapping_sub(1))
                    .ok_or_else(|| reject("Item", format!("slide range index {index}")))?;
                Ok(self.object(Target::Slide(*id)))
            }
            (Target::Slide(id), "Delete") => {
                let mut state = self.world.state.write();
                for pres in &mut state.presentations {
                    pres.slides.retain(|s| s.id != *id);
                }
                if state.active_slide == Some(*id) {
                    state.active_slide = None;
                }
                Ok(Variant::Empty)
            }
            (Target::Slide(id), "MoveTo") => {
                let to = arg_i64(args, 0, "MoveTo")? as usize;
                let mut state = self.world.state.write();
                let pres_id = state.pres_of_slide(*id)?.id;
                let pres = state.pres_mut(pres_id)?;
                let from = pres
                    .slides
                    .iter()
                    .position(|s| s.id == *id)
                    .ok_or_else(|| Error::StaleHandle(format!("slide {id}")))?;
                if to < 1 || to > pres.slides.len() {
                    return Err(reject("MoveTo", format!("index {to}")));
                }
                let slide = pres.slides.remove(from);
                pres.slides.insert(to - 1, slide);
                Ok(Variant::Empty)
            }
            (Target::Slide(id), "Select") => {
                let mut state = self.world.state.write();
                state.slide(*id)?;
                state.active_slide = Some(*id);
                state.selection = Selection::Slides(vec![*id]);
                Ok(Variant::Empty)
            }
            (Target::Slide(id), "Export") => {
                let path = arg_str(args, 0, "Export")?;
                self.world.state.read().slide(*id)?;
                let mut bytes = PNG_STUB.to_vec();
                bytes.extend_from_slice(&id.to_le_bytes());
                bytes.resize(64, 0);
                std::fs::write(path, bytes)?;
                Ok(Variant::Empty)
            }
            (Target::NotesShapes(slide_id), "Item") => {
                let index = arg_i64(args, 0, "Item")?;
                if index != 1 {
                    return Err(reject("Item", format!("notes shape index {index}")));
                }
                Ok(self.object(Target::NotesShape(*slide_id)))
            }
            (Target::Shapes(slide_id), "Item") => {
                let index = arg_i64(args, 0, "Item")? as usize;
                let state = self.world.state.read();
                let shape = state
                    .slide(*slide_id)?
                    .shapes
                    .get(index.wrapping_sub(1))
                    .ok_or_else(|| reject("Item", format!("shape index {index}")))?;
                Ok(self.object(Target::Shape(shape.id)))
            }
            (Target::Shapes(slide_id), "Range") => {
                let state = self.world.state.read();
                let slide = state.slide(*slide_id)?;
                let indices: Vec<i64> = match arg(args, 0, "Range")? {
                    Variant::List(items) => {
                        items.iter().map(|v| v.as_i64()).collect::<Result<_>>()?
                    }
                    v => vec![v.as_i64()?],
                };
                let mut ids = Vec::with_capacity(indices.len());
                for index in indices {
                    let shape = slide
                        .shapes
                        .get((index as usize).wrapping_sub(1))
                        .ok_or_else(|| reject("Range", format!("shape index {index}")))?;
                    ids.push(shape.id);
                }
                Ok(self.object(Target::ShapeRange(ids)))
            }
            (Target::Shapes(slide_id), "AddShape") => {
                let kind = arg_i64(args, 0, "AddShape")?;
                let rect = quad(args, 1, "AddShape")?;
                let mut state = self.world.state.write();
                let id = state.alloc_id();
                let mut node = ShapeNode::new(id, format!("Rectangle {id}"), shape_type::AUTO_SHAPE);
                node.autoshape_type = if kind >= 1 { kind } else { auto_shape_type::RECTANGLE };
                (node.left, node.top, node.width, node.height) = rect;
                node.text = Some(TextStore::default());
                state.slide_mut(*slide_id)?.shapes.push(node);
                Ok(self.object(Target::Shape(id)))
            }
            (Target::Shapes(slide_id), "AddTextbox") => {
                let orientation = arg_i64(args, 0, "AddTextbox")?;
                let rect = quad(args, 1, "AddTextbox")?;
                let mut state = self.world.state.write();
                let id = state.alloc_id();
                let mut node = ShapeNode::new(id, format!("TextBox {id}"), shape_type::TEXT_BOX);
                (node.left, node.top, node.width, node.height) = rect;
                let mut store = TextStore::default();
                store.orientation = orientation;
                store.word_wrap = tri::FALSE;
                store.auto_size = auto_size::SHAPE_TO_FIT_TEXT;
                node.text = Some(store);
                node.fill.visible = tri::FALSE;
                node.line.visible = tri::FALSE;
                state.slide_mut(*slide_id)?.shapes.push(node);
                Ok(self.object(Target::Shape(id)))
            }
            (Target::Shapes(slide_id), "AddTable") => {
                let rows = arg_i64(args, 0, "AddTable")?.max(1) as usize;
                let cols = arg_i64(args, 1, "AddTable")?.max(1) as usize;
                let rect = quad(args, 2, "AddTable")?;
                let mut state = self.world.state.write();
                let id = state.alloc_id();
                let mut node = ShapeNode::new(id, format!("Table {id}"), shape_type::TABLE);
                (node.left, node.top, node.width, node.height) = rect;
                node.table = Some(TableState::new(rows, cols, node.width.max(1.0), node.height.max(1.0)));
                state.slide_mut(*slide_id)?.shapes.push(node);
                Ok(self.object(Target::Shape(id)))
            }
            (Target::Shapes(slide_id), "AddLine") => {
                let x1 = arg_f64(args, 0, "AddLine")?;
                let y1 = arg_f64(args, 1, "AddLine")?;
                let x2 = arg_f64(args, 2, "AddLine")?;
                let y2 = arg_f64(args, 3, "AddLine")?;
                let mut state = self.world.state.write();
                let id = state.alloc_id();
                let mut node = ShapeNode::new(id, format!("Straight Connector {id}"), shape_type::LINE);
                node.left = x1.min(x2);
                node.top = y1.min(y2);
                node.width = (x2 - x1).abs();
                node.height = (y2 - y1).abs();
                node.connector = Some(ConnectorState::default());
                node.fill.visible = tri::FALSE;
                state.slide_mut(*slide_id)?.shapes.push(node);
                Ok(self.object(Target::Shape(id)))
            }
            (Target::Shapes(slide_id), "AddPicture") => {
                let path = arg_str(args, 0, "AddPicture")?;
                let bytes = std::fs::read(path)
                    .map_err(|e| reject("AddPicture", format!("cannot read {path}: {e}")))?;
                let rect = quad(args, 3, "AddPicture")?;
                let mut state = self.world.state.write();
                let id = state.alloc_id();
                let mut node = ShapeNode::new(id, format!("Picture {id}"), shape_type::PICTURE);
                (node.left, node.top, node.width, node.height) = rect;
                node.picture = Some(bytes);
                node.line.visible = tri::FALSE;
                state.slide_mut(*slide_id)?.shapes.push(node);
                Ok(self.object(Target::Shape(id)))
            }
            (Target::ShapeRange(ids), "Item") => {
                let index = arg_i64(args, 0, "Item")? as usize;
                let id = ids
                    .get(index.wrapping_sub(1))
                    .ok_or_else(|| reject("Item", format!("shape range index {index}")))?;
                Ok(self.object(Target::Shape(*id)))
            }
            (Target::ShapeRange(ids), "Group") => {
                let mut state = self.world.state.write();
                let group_id = group_shapes(&mut state, ids)?;
                Ok(self.object(Target::Shape(group_id)))
            }
            (Target::GroupItems(id), "Item") => {
                let index = arg_i64(args, 0, "Item")? as usize;
                let state = self.world.state.read();
                let child = state
                    .shape(*id)?
                    .children
                    .get(index.wrapping_sub(1))
                    .ok_or_else(|| reject("Item", format!("group item index {index}")))?;
                Ok(self.object(Target::Shape(child.id)))
            }
            (Target::Shape(id), "Delete") => {
                let mut state = self.world.state.write();
                let siblings = state.siblings_mut(*id)?;
                siblings.retain(|s| s.id != *id);
                if let Selection::Shapes(ids) = &mut state.selection {
                    ids.retain(|other| other != id);
                }
                Ok(Variant::Empty)
            }
            (Target::Shape(id), "Select") => {
                let replace = match args.first() {
                    Some(v) => v.as_bool()?,
                    None => true,
                };
                let mut state = self.world.state.write();
                let slide_id = state.slide_of_shape(*id)?.id;
                state.active_slide = Some(slide_id);
                match (&mut state.selection, replace) {
                    (Selection::Shapes(ids), false) => {
                        if !ids.contains(id) {
                            ids.push(*id);
                        }
                    }
                    (selection, _) => *selection = Selection::Shapes(vec![*id]),
                }
                Ok(Variant::Empty)
            }
            (Target::Shape(id), "ZOrder") => {
                let cmd = arg_i64(args, 0, "ZOrder")?;
                let mut state = self.world.state.write();
                let siblings = state.siblings_mut(*id)?;
                let from = siblings
                    .iter()
                    .position(|s| s.id == *id)
                    .ok_or_else(|| Error::StaleHandle(format!("shape {id}")))?;
                let node = siblings.remove(from);
                let to = match cmd {
                    c if c == crate::automation::constants::zorder_cmd::BRING_TO_FRONT => siblings.len(),
                    c if c == crate::automation::constants::zorder_cmd::SEND_TO_BACK => 0,
                    c if c == crate::automation::constants::zorder_cmd::BRING_FORWARD => {
                        (from + 1).min(siblings.len())
                    }
                    c if c == crate::automation::constants::zorder_cmd::SEND_BACKWARD => {
                        from.saturating_sub(1)
                    }
                    other => return Err(reject("ZOrder", format!("unknown command {other}"))),
                };
                siblings.insert(to, node);
                Ok(Variant::Empty)
            }
            (Target::Shape(id), "Ungroup") => {
                let mut state = self.world.state.write();
                let siblings = state.siblings_mut(*id)?;
                let index = siblings
                    .iter()
                    .position(|s| s.id == *id)
                    .ok_or_else(|| Error::StaleHandle(format!("shape {id}")))?;
                if !siblings[index].is_group() {
                    return Err(reject("Ungroup", "shape is not a group"));
                }
                let group = siblings.remove(index);
                let child_ids: Vec<i64> = group.children.iter().map(|c| c.id).collect();
                for (offset, child) in group.children.into_iter().enumerate() {
                    siblings.insert(index + offset, child);
                }
                Ok(self.object(Target::ShapeRange(child_ids)))
            }
            (Target::Shape(id), "Export") => {
                let path = arg_str(args, 0, "Export")?;
                let state = self.world.state.read();
                let node = state.shape(*id)?;
                let bytes = match &node.picture {
                    Some(payload) => payload.clone(),
                    None => {
                        let mut stub = PNG_STUB.to_vec();
                        stub.extend_from_slice(&node.id.to_le_bytes());
                        stub.resize(64, 0);
                        stub
                    }
                };
                std::fs::write(path, bytes)?;
                Ok(Variant::Empty)
            }
            (Target::Fill(id), "Solid") => {
                let mut state = self.world.state.write();
                let fill = &mut state.shape_mut(*id)?.fill;
                fill.kind = fill_type::SOLID;
                fill.visible = tri::TRUE;
                fill.stops.clear();
                Ok(Variant::Empty)
            }
            (Target::Fill(id), "Patterned") => {
                let pattern = positive_enum("Patterned", arg_i64(args, 0, "Patterned")?)?;
                let mut state = self.world.state.write();
                let fill = &mut state.shape_mut(*id)?.fill;
                fill.kind = fill_type::PATTERNED;
                fill.visible = tri::TRUE;
                fill.pattern = pattern;
                fill.stops.clear();
                Ok(Variant::Empty)
            }
            (Target::Fill(id), "OneColorGradient") => {
                let style = positive_enum("OneColorGradient", arg_i64(args, 0, "OneColorGradient")?)?;
                let variant = arg_i64(args, 1, "OneColorGradient")?;
                let degree = arg_f64(args, 2, "OneColorGradient")?;
                if !(1..=4).contains(&variant) {
                    return Err(reject("OneColorGradient", format!("variant {variant}")));
                }
                if !(0.0..=1.0).contains(&degree) {
                    return Err(reject("OneColorGradient", format!("degree {degree}")));
                }
                let mut state = self.world.state.write();
                let fill = &mut state.shape_mut(*id)?.fill;
                fill.kind = fill_type::GRADIENT;
                fill.visible = tri::TRUE;
                fill.gradient_color_type = gradient_color_type::ONE_COLOR;
                fill.gradient_style = style;
                fill.gradient_variant = variant;
                fill.gradient_degree = degree;
                fill.stops = vec![
                    GradientStop { rgb: fill.fore_rgb, position: 0.0, transparency: 0.0 },
                    GradientStop { rgb: fill.fore_rgb, position: 1.0, transparency: 0.0 },
                ];
                Ok(Variant::Empty)
            }
            (Target::Fill(id), "TwoColorGradient") => {
                let style = positive_enum("TwoColorGradient", arg_i64(args, 0, "TwoColorGradient")?)?;
                let variant = arg_i64(args, 1, "TwoColorGradient")?;
                if !(1..=4).contains(&variant) {
                    return Err(reject("TwoColorGradient", format!("variant {variant}")));
                }
                let mut state = self.world.state.write();
                let fill = &mut state.shape_mut(*id)?.fill;
                fill.kind = fill_type::GRADIENT;
                fill.visible = tri::TRUE;
                fill.gradient_color_type = gradient_color_type::TWO_COLORS;
                fill.gradient_style = style;
                fill.gradient_variant = variant;
                fill.gradient_degree = 0.0;
                fill.stops = vec![
                    GradientStop { rgb: fill.fore_rgb, position: 0.0, transparency: 0.0 },
                    GradientStop { rgb: fill.back_rgb, position: 1.0, transparency: 0.0 },
                ];
                Ok(Variant::Empty)
            }
            (Target::GradientStops(id), "Item") => {
                let index = arg_i64(args, 0, "Item")? as usize;
                let state = self.world.state.read();
                let fill = &state.shape(*id)?.fill;
                if index == 0 || index > fill.stops.len() {
                    return Err(reject("Item", format!("gradient stop index {index}")));
                }
                Ok(self.object(Target::GradientStop { shape: *id, index: index - 1 }))
            }
            (Target::GradientStops(id), "Delete") => {
                let index = arg_i64(args, 0, "Delete")? as usize;
                let mut state = self.world.state.write();
                let fill = &mut state.shape_mut(*id)?.fill;
                if index == 0 || index > fill.stops.len() {
                    return Err(reject("Delete", format!("gradient stop index {index}")));
                }
                if fill.stops.len() <= 2 {
                    // The host keeps at least two stops alive.
                    return Err(reject("Delete", "a gradient needs two stops"));
                }
                fill.stops.remove(index - 1);
                Ok(Variant::Empty)
            }
            (Target::GradientStops(id), "Insert") => {
                let rgb = arg_i64(args, 0, "Insert")?;
                let position = arg_f64(args, 1, "Insert")?;
                if !(0.0..=1.0).contains(&position) {
                    return Err(reject("Insert", format!("position {position}")));
                }
                let mut state = self.world.state.write();
                let fill = &mut state.shape_mut(*id)?.fill;
                fill.stops.push(GradientStop { rgb, position, transparency: 0.0 });
                Ok(Variant::Int(fill.stops.len() as i64))
            }
            (Target::ConnectorFormat(id), "BeginConnect") => {
                let other = arg(args, 0, "BeginConnect")?.as_object()?.get_i64("Id")?;
                let site = arg_i64(args, 1, "BeginConnect")?;
                let mut state = self.world.state.write();
                state.shape(other)?;
                let connector = state
                    .shape_mut(*id)?
                    .connector
                    .as_mut()
                    .ok_or_else(|| Error::StaleHandle(format!("connector {id}")))?;
                connector.begin = Some((other, site));
                Ok(Variant::Empty)
            }
            (Target::ConnectorFormat(id), "EndConnect") => {
                let other = arg(args, 0, "EndConnect")?.as_object()?.get_i64("Id")?;
                let site = arg_i64(args, 1, "EndConnect")?;
                let mut state = self.world.state.write();
                state.shape(other)?;
                let connector = state
                    .shape_mut(*id)?
                    .connector
                    .as_mut()
                    .ok_or_else(|| Error::StaleHandle(format!("connector {id}")))?;
                connector.end = Some((other, site));
                Ok(Variant::Empty)
            }
            (Target::Selection, "Unselect") => {
                self.world.state.write().selection = Selection::None;
                Ok(Variant::Empty)
            }
            (Target::Table(id), "Cell") => {
                let row = arg_i64(args, 0, "Cell")? as usize;
                let col = arg_i64(args, 1, "Cell")? as usize;
                let state = self.world.state.read();
                let t = table_ref(&state, *id)?;
                if row == 0 || row > t.n_rows() || col == 0 || col > t.n_cols() {
                    return Err(reject("Cell", format!("cell ({row}, {col})")));
                }
                Ok(self.object(Target::Cell { table: *id, row: row - 1, col: col - 1 }))
            }
            (Target::Rows(id), "Item") => {
                let index = arg_i64(args, 0, "Item")? as usize;
                let state = self.world.state.read();
                let t = table_ref(&state, *id)?;
                if index == 0 || index > t.n_rows() {
                    return Err(reject("Item", format!("row index {index}")));
                }
                Ok(self.object(Target::Row { table: *id, index: index - 1 }))
            }
            (Target::Rows(id), "Add") => {
                let mut state = self.world.state.write();
                let t = table_mut(&mut state, *id)?;
                let before = match args.first() {
                    Some(Variant::Empty) | None => None,
                    Some(v) => {
                        let i = v.as_i64()?;
                        if i == -1 { None } else { Some(i as usize) }
                    }
                };
                let at = match before {
                    Some(i) if i >= 1 && i <= t.n_rows() => i - 1,
                    Some(i) => return Err(reject("Add", format!("row index {i}"))),
                    None => t.n_rows(),
                };
                let height = t.row_heights.last().copied().unwrap_or(20.0);
                let cols = t.n_cols();
                t.row_heights.insert(at, height);
                t.cells.insert(at, (0..cols).map(|_| super::CellData::default()).collect());
                for merge in &mut t.merges {
                    if merge.0 >= at {
                        merge.0 += 1;
                    }
                }
                Ok(self.object(Target::Row { table: *id, index: at }))
            }
            (Target::Row { table, index }, "Delete") => {
                let mut state = self.world.state.write();
                let t = table_mut(&mut state, *table)?;
                if *index >= t.n_rows() || t.n_rows() == 1 {
                    return Err(reject("Delete", format!("row index {index}")));
                }
                t.row_heights.remove(*index);
                t.cells.remove(*index);
                t.merges.retain(|&(r, _, nr, _)| !(r..r + nr).contains(index));
                for merge in &mut t.merges {
                    if merge.0 > *index {
                        merge.0 -= 1;
                    }
                }
                Ok(Variant::Empty)
            }
            (Target::Columns(id), "Item") => {
                let index = arg_i64(args, 0, "Item")? as usize;
                let state = self.world.state.read();
                let t = table_ref(&state, *id)?;
                if index == 0 || index > t.n_cols() {
                    return Err(reject("Item", format!("column index {index}")));
                }
                Ok(self.object(Target::Column { table: *id, index: index - 1 }))
            }
            (Target::Columns(id), "Add") => {
                let mut state = self.world.state.write();
                let t = table_mut(&mut state, *id)?;
                let before = match args.first() {
                    Some(Variant::Empty) | None => None,
                    Some(v) => {
                        let i = v.as_i64()?;
                        if i == -1 { None } else { Some(i as usize) }
                    }
                };
                let at = match before {
                    Some(i) if i >= 1 && i <= t.n_cols() => i - 1,
                    Some(i) => return Err(reject("Add", format!("column index {i}"))),
                    None => t.n_cols(),
                };
                let width = t.col_widths.last().copied().unwrap_or(72.0);
                t.col_widths.insert(at, width);
                for row in &mut t.cells {
                    row.insert(at, super::CellData::default());
                }
                for merge in &mut t.merges {
                    if merge.1 >= at {
                        merge.1 += 1;
                    }
                }
                Ok(self.object(Target::Column { table: *id, index: at }))
            }
            (Target::Column { table, index }, "Delete") => {
                let mut state = self.world.state.write();
                let t = table_mut(&mut state, *table)?;
                if *index >= t.n_cols() || t.n_cols() == 1 {
                    return Err(reject("Delete", format!("column index {index}")));
                }
                t.col_widths.remove(*index);
                for row in &mut t.cells {
                    row.remove(*index);
                }
                t.merges.retain(|&(_, c, _, nc)| !(c..c + nc).contains(index));
                for merge in &mut t.merges {
                    if merge.1 > *index {
                        merge.1 -= 1;
                    }
                }
                Ok(Variant::Empty)
            }
            (Target::Cell { table, row, col }, "Merge") => {
                let other = arg(args, 0, "Merge")?.as_object()?;
                let other_row = other.get_i64("RowIndex")? as usize - 1;
                let other_col = other.get_i64("ColumnIndex")? as usize - 1;
                let mut state = self.world.state.write();
                let t = table_mut(&mut state, *table)?;
                let r = (*row).min(other_row);
                let c = (*col).min(other_col);
                let nr = (*row).max(other_row) - r + 1;
                let nc = (*col).max(other_col) - c + 1;
                let overlaps = t.merges.iter().any(|&(mr, mc, mnr, mnc)| {
                    mr < r + nr && r < mr + mnr && mc < c + nc && c < mc + mnc
                });
                if overlaps {
                    return Err(reject("Merge", "region overlaps an existing merge"));
                }
                t.merges.push((r, c, nr, nc));
                Ok(Variant::Empty)
            }
            (Target::CellFill { table, row, col }, "Solid") => {
                let mut state = self.world.state.write();
                let fill = cell_fill_mut(&mut state, *table, *row, *col)?;
                fill.kind = fill_type::SOLID;
                fill.visible = tri::TRUE;
                Ok(Variant::Empty)
            }
            (Target::CellFill { table, row, col }, "Patterned") => {
                let pattern = positive_enum("Patterned", arg_i64(args, 0, "Patterned")?)?;
                let mut state = self.world.state.write();
                let fill = cell_fill_mut(&mut state, *table, *row, *col)?;
                fill.kind = fill_type::PATTERNED;
                fill.visible = tri::TRUE;
                fill.pattern = pattern;
                Ok(Variant::Empty)
            }
            (Target::TextRange { .. }, _) => self.invoke_text_range(method, args),
            (_, other) => Err(self.missing(other)),
        }
    }
}

impl MockObject {
    fn add_presentation(&self, state: &mut WorldState, path: Option<std::path::PathBuf>) -> i64 {
        let id = state.alloc_id();
        let opened = path.is_some();
        let pres = Pres {
            id,
            name: path
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| format!("Presentation{id}")),
            path,
            slide_width: 960.0,
            slide_height: 540.0,
            slides: Vec::new(),
            designs: vec![Design {
                name: "Office Theme".to_string(),
                layouts: vec![
                    "Title Slide".to_string(),
                    "Title and Content".to_string(),
                    "Blank".to_string(),
                ],
            }],
            saved: opened,
        };
        state.presentations.push(pres);
        state.active_pres = Some(id);
        state.active_slide = None;
        if opened {
            // An opened document comes with content; give it one slide.
            let _ = self.add_slide(state, id, 1, slide_layout::BLANK);
        }
        id
    }

    fn add_slide(&self, state: &mut WorldState, pres_id: i64, index: usize, layout_value: i64) -> Result<i64> {
        let slide_id = state.alloc_id();
        let notes_shape_id = state.alloc_id();
        let design = 0usize;
        let layout = {
            let pres = state.pres(pres_id)?;
            layout_index(&pres.designs, design, layout_value)
        };
        let layout_name = state.pres(pres_id)?.designs[design].layouts[layout].clone();
        let shapes = layout_placeholders(state, &layout_name);
        let slide = SlideData {
            id: slide_id,
            name: format!("Slide{slide_id}"),
            design,
            layout,
            shapes,
            notes: TextStore::default(),
            notes_shape_id,
        };
        let pres = state.pres_mut(pres_id)?;
        let at = (index - 1).min(pres.slides.len());
        pres.slides.insert(at, slide);
        state.active_slide = Some(slide_id);
        Ok(slide_id)
    }

    fn invoke_text_range(&self, method: &str, args: &[Variant]) -> Result<Variant> {
        let Target::TextRange { target, start, length, v2, .. } = &self.target else {
            return Err(self.missing(method));
        };
        let derive = |start: i64, length: i64, gran: Gran| -> Variant {
            self.object(Target::TextRange { target: target.clone(), start, length, gran, v2: *v2 })
        };
        match method {
            "Characters" => {
                let state = self.world.state.read();
                let store = text_store(&state, target)?;
                let (s, e) = clamp_span(store, *start, *length);
                let rel_start = match args.first() {
                    Some(Variant::Empty) | None => 1,
                    Some(v) => v.as_i64()?,
                };
                let abs = s as i64 + rel_start - 1;
                let count = match args.get(1) {
                    Some(Variant::Empty) | None => (e as i64 - abs).max(0),
                    Some(v) => v.as_i64()?,
                };
                Ok(derive(abs, count, Gran::Chars))
            }
            "Paragraphs" | "Runs" | "Lines" | "Sentences" | "Words" => {
                let gran = match method {
                    "Paragraphs" => Gran::Paragraphs,
                    "Runs" => Gran::Runs,
                    "Lines" => Gran::Lines,
                    "Sentences" => Gran::Sentences,
                    _ => Gran::Words,
                };
                let state = self.world.state.read();
                let store = text_store(&state, target)?;
                let (s, e) = clamp_span(store, *start, *length);
                match args.first() {
                    Some(Variant::Empty) | None => Ok(derive(s as i64, (e - s) as i64, gran)),
                    Some(v) => {
                        let index = v.as_i64()? as usize;
                        let count = match args.get(1) {
                            Some(Variant::Empty) | None => 1usize,
                            Some(v) => v.as_i64()?.max(1) as usize,
                        };
                        let spans = collection_spans(store, s, e, gran);
                        if index == 0 || index > spans.len() {
                            return Err(reject(method, format!("index {index} of {}", spans.len())));
                        }
                        let first = spans[index - 1];
                        let last = spans[(index - 1 + count - 1).min(spans.len() - 1)];
                        Ok(derive(first.0 as i64, (last.1 - first.0) as i64, Gran::Chars))
                    }
                }
            }
            "InsertAfter" | "InsertBefore" => {
                let text = arg_str(args, 0, method)?.to_string();
                let inserted: i64 = text.encode_utf16().count() as i64;
                let at;
                {
                    let mut state = self.world.state.write();
                    let store = text_store_mut(&mut state, target)?;
                    let (s, e) = clamp_span(store, *start, *length);
                    at = if method == "InsertAfter" { e } else { s };
                    store.replace(at, 0, &text);
                    sync_autosize(&mut state, target);
                }
                Ok(derive(at as i64, inserted, Gran::Chars))
            }
            "Delete" => {
                let mut state = self.world.state.write();
                let store = text_store_mut(&mut state, target)?;
                let (s, e) = clamp_span(store, *start, *length);
                store.replace(s, e - s, "");
                sync_autosize(&mut state, target);
                Ok(Variant::Empty)
            }
            "Find" => {
                let needle: Vec<u16> = arg_str(args, 0, "Find")?.encode_utf16().collect();
                let after = match args.get(1) {
                    Some(Variant::Empty) | None => 0,
                    Some(v) => v.as_i64()?,
                };
                let state = self.world.state.read();
                let store = text_store(&state, target)?;
                let (s, e) = clamp_span(store, *start, *length);
                let from = (s as i64 + after).max(s as i64) as usize;
                if needle.is_empty() || from >= e {
                    return Ok(Variant::Empty);
                }
                let hay = &store.units[from..e];
                match hay.windows(needle.len()).position(|w| w == needle) {
                    Some(offset) => Ok(derive((from + offset) as i64, needle.len() as i64, Gran::Chars)),
                    None => Ok(Variant::Empty),
                }
            }
            "Select" => match target {
                TextTarget::Shape(id) => {
                    let mut state = self.world.state.write();
                    let slide_id = state.slide_of_shape(*id)?.id;
                    state.active_slide = Some(slide_id);
                    state.selection = Selection::Text { shape: *id, start: *start, length: *length };
                    Ok(Variant::Empty)
                }
                _ => Err(reject("Select", "only shape text is selectable")),
            },
            other => Err(self.missing(other)),
        }
    }
}

fn uniform(store: &TextStore, s: usize, e: usize, pick: impl Fn(&super::FontState) -> i64, first: i64) -> i64 {
    if store.fonts[s..e].iter().map(&pick).all(|v| v == first) {
        first
    } else {
        tri::MIXED
    }
}

fn range_count(store: &TextStore, s: usize, e: usize, gran: Gran) -> i64 {
    if s == e {
        return 0;
    }
    match gran {
        Gran::Chars => (e - s) as i64,
        // A trailing break exposes the empty paragraph after it, so the
        // last paragraph is taken at `e`, not `e - 1`.
        Gran::Paragraphs => (store.paragraph_at(e) - store.paragraph_at(s)) as i64 + 1,
        Gran::Runs => store.runs_in(s, e).len() as i64,
        Gran::Lines => store.lines_in(s, e).len() as i64,
        Gran::Sentences => store.sentences_in(s, e).len() as i64,
        Gran::Words => store.words_in(s, e).len() as i64,
    }
}

fn collection_spans(store: &TextStore, s: usize, e: usize, gran: Gran) -> Vec<(usize, usize)> {
    match gran {
        Gran::Chars => (s..e).map(|i| (i, i + 1)).collect(),
        Gran::Paragraphs => {
            if s == e {
                return Vec::new();
            }
            let first = store.paragraph_at(s);
            let last = store.paragraph_at(e);
            (first..=last).filter_map(|i| store.paragraph_span(i)).collect()
        }
        Gran::Runs => store.runs_in(s, e),
        Gran::Lines => store.lines_in(s, e),
        Gran::Sentences => store.sentences_in(s, e),
        Gran::Words => store.words_in(s, e),
    }
}

fn positive_enum(path: &str, value: i64) -> Result<i64> {
    if value < 1 {
        return Err(reject(path, format!("value {value} is not writable")));
    }
    Ok(value)
}

fn positive_or_zero_enum(path: &str, value: i64) -> Result<i64> {
    if value < 0 {
        return Err(reject(path, format!("value {value} is not writable")));
    }
    Ok(value)
}

fn tri_write(path: &str, value: i64) -> Result<i64> {
    if !tri::is_tri_state(value) {
        return Err(reject(path, format!("value {value} is not a tri-state")));
    }
    Ok(value)
}

fn quad(args: &[Variant], from: usize, method: &str) -> Result<(f64, f64, f64, f64)> {
    Ok((
        arg_f64(args, from, method)?,
        arg_f64(args, from + 1, method)?,
        arg_f64(args, from + 2, method)?,
        arg_f64(args, from + 3, method)?,
    ))
}

fn cell_fill<'a>(state: &'a WorldState, table: i64, row: usize, col: usize) -> Result<&'a super::FillState> {
    let t = table_ref(state, table)?;
    let (r, c) = t.anchor_of(row, col);
    Ok(&t.cells[r][c].fill)
}

fn cell_fill_mut<'a>(
    state: &'a mut WorldState,
    table: i64,
    row: usize,
    col: usize,
) -> Result<&'a mut super::FillState> {
    let t = table_mut(state, table)?;
    let (r, c) = t.anchor_of(row, col);
    Ok(&mut t.cells[r][c].fill)
}

fn table_ref<'a>(state: &'a WorldState, shape_id: i64) -> Result<&'a TableState> {
    state
        .shape(shape_id)?
        .table
        .as_ref()
        .ok_or_else(|| Error::StaleHandle(format!("table {shape_id}")))
}

fn table_mut<'a>(state: &'a mut WorldState, shape_id: i64) -> Result<&'a mut TableState> {
    state
        .shape_mut(shape_id)?
        .table
        .as_mut()
        .ok_or_else(|| Error::StaleHandle(format!("table {shape_id}")))
}

fn zorder_position(shapes: &[ShapeNode], id: i64) -> Option<i64> {
    if let Some(index) = shapes.iter().position(|s| s.id == id) {
        return Some(index as i64 + 1);
    }
    for shape in shapes {
        if find_shape(&shape.children, id).is_some() {
            return zorder_position(&shape.children, id)
                .or_else(|| zorder_inner(&shape.children, id));
        }
    }
    None
}

fn zorder_inner(shapes: &[ShapeNode], id: i64) -> Option<i64> {
    for shape in shapes {
        if let Some(found) = zorder_position(&shape.children, id) {
            return Some(found);
        }
    }
    None
}

fn translate_children(node: &mut ShapeNode, dx: f64, dy: f64) {
    for child in &mut node.children {
        child.left += dx;
        child.top += dy;
        translate_children(child, dx, dy);
    }
}

fn scale_children(node: &mut ShapeNode, sx: f64, sy: f64) {
    if node.children.is_empty() || (sx == 1.0 && sy == 1.0) {
        return;
    }
    let (origin_x, origin_y) = (node.left, node.top);
    for child in &mut node.children {
        child.left = origin_x + (child.left - origin_x) * sx;
        child.top = origin_y + (child.top - origin_y) * sy;
        child.width *= sx;
        child.height *= sy;
        scale_children(child, 1.0, 1.0);
    }
}

fn group_shapes(state: &mut WorldState, ids: &[i64]) -> Result<i64> {
    if ids.len() < 2 {
        return Err(reject("Group", "need at least two shapes"));
    }
    let slide_id = state.slide_of_shape(ids[0])?.id;
    let group_id = state.alloc_id();
    let slide = state.slide_mut(slide_id)?;
    let mut children = Vec::with_capacity(ids.len());
    let mut insert_at = usize::MAX;
    // Walk current z-order so grouping preserves relative stacking.
    let mut index = 0;
    while index < slide.shapes.len() {
        if ids.contains(&slide.shapes[index].id) {
            insert_at = insert_at.min(index);
            children.push(slide.shapes.remove(index));
        } else {
            index += 1;
        }
    }
    if children.len() != ids.len() {
        return Err(reject("Group", "shapes are not all top-level siblings"));
    }
    let mut group = ShapeNode::new(group_id, format!("Group {group_id}"), shape_type::GROUP);
    group.left = children.iter().map(|c| c.left).fold(f64::INFINITY, f64::min);
    group.top = children.iter().map(|c| c.top).fold(f64::INFINITY, f64::min);
    group.width = children.iter().map(|c| c.left + c.width).fold(0.0, f64::max) - group.left;
    group.height = children.iter().map(|c| c.top + c.height).fold(0.0, f64::max) - group.top;
    group.children = children;
    slide.shapes.insert(insert_at.min(slide.shapes.len()), group);
    Ok(group_id)
}

fn find_layout(designs: &[Design], design_name: &str, layout_name: &str) -> Option<(usize, usize)> {
    designs.iter().enumerate().find_map(|(di, design)| {
        if design.name != design_name {
            return None;
        }
        design
            .layouts
            .iter()
            .position(|l| l == layout_name)
            .map(|li| (di, li))
    })
}
