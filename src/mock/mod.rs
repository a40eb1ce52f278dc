//! In-memory stand-in for the automation host.
//!
//! This backend implements [`crate::automation::AutomationObject`] over a
//! plain object tree so the full library surface can be exercised without
//! a running host process. It reproduces the host behaviors the library
//! depends on: UTF-16 character addressing, runs as maximal uniform-font
//! spans, merged table cells sharing one geometry box, gradient stop
//! lists, z-order commands, selection/view ambience, and file export.
//!
//! The mock is deliberately strict where the real host is strict: it
//! rejects writes of `*Mixed` enumeration values and out-of-range
//! gradient variants, so invalidity filtering sees realistic pushback.

// Submodule declarations
mod object;
mod text;

pub(crate) use object::Target;
pub(crate) use text::{FontState, TextStore};

use crate::automation::constants::{
    arrowhead_style, auto_shape_type, dash_style, fill_type, line_style, shape_type,
    slide_layout, text_orientation, tri, view_type,
};
use crate::automation::{Handle, Variant};
use crate::common::{Error, Result};
use object::MockObject;
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;

/// The in-memory host. Cloning shares the same world.
#[derive(Clone)]
pub struct MockHost {
    world: Arc<World>,
}

impl MockHost {
    /// Create an empty host: no presentations, normal view, no selection.
    pub fn new() -> Self {
        Self {
            world: Arc::new(World {
                state: RwLock::new(WorldState {
                    next_id: 1,
                    presentations: Vec::new(),
                    active_pres: None,
                    active_slide: None,
                    view_type: view_type::NORMAL,
                    selection: Selection::None,
                }),
            }),
        }
    }

    /// Handle onto the Application object.
    pub fn application(&self) -> Handle {
        Handle::new(Arc::new(MockObject::new(self.world.clone(), Target::Application)))
    }

    /// Add a presentation and return its handle.
    pub fn add_presentation(&self) -> Result<Handle> {
        self.application()
            .get_object("Presentations")?
            .call("Add", &[])?
            .into_object()
    }

    /// Append a blank slide to a presentation.
    pub fn add_slide(presentation: &Handle) -> Result<Handle> {
        presentation
            .get_object("Slides")?
            .call("Add", &[Variant::Empty, Variant::Int(slide_layout::BLANK)])?
            .into_object()
    }

    /// Add a rectangle auto-shape to a slide.
    pub fn add_rectangle(slide: &Handle, left: f64, top: f64, width: f64, height: f64) -> Result<Handle> {
        slide
            .get_object("Shapes")?
            .call(
                "AddShape",
                &[
                    Variant::Int(auto_shape_type::RECTANGLE),
                    Variant::Float(left),
                    Variant::Float(top),
                    Variant::Float(width),
                    Variant::Float(height),
                ],
            )?
            .into_object()
    }

    /// Add a text box to a slide.
    pub fn add_textbox(slide: &Handle, left: f64, top: f64, width: f64, height: f64) -> Result<Handle> {
        slide
            .get_object("Shapes")?
            .call(
                "AddTextbox",
                &[
                    Variant::Int(text_orientation::HORIZONTAL),
                    Variant::Float(left),
                    Variant::Float(top),
                    Variant::Float(width),
                    Variant::Float(height),
                ],
            )?
            .into_object()
    }

    /// Replace the current selection with the given shapes.
    pub fn select_shapes(shapes: &[&Handle]) -> Result<()> {
        for (i, shape) in shapes.iter().enumerate() {
            shape.call("Select", &[Variant::Bool(i == 0)])?;
        }
        Ok(())
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) struct World {
    pub state: RwLock<WorldState>,
}

pub(crate) struct WorldState {
    next_id: i64,
    pub presentations: Vec<Pres>,
    pub active_pres: Option<i64>,
    pub active_slide: Option<i64>,
    pub view_type: i64,
    pub selection: Selection,
}

#[derive(Clone)]
pub(crate) enum Selection {
    None,
    Slides(Vec<i64>),
    Shapes(Vec<i64>),
    Text { shape: i64, start: i64, length: i64 },
}

pub(crate) struct Pres {
    pub id: i64,
    pub name: String,
    pub path: Option<PathBuf>,
    pub slide_width: f64,
    pub slide_height: f64,
    pub slides: Vec<SlideData>,
    pub designs: Vec<Design>,
    pub saved: bool,
}

pub(crate) struct Design {
    pub name: String,
    pub layouts: Vec<String>,
}

pub(crate) struct SlideData {
    pub id: i64,
    pub name: String,
    pub design: usize,
    pub layout: usize,
    pub shapes: Vec<ShapeNode>,
    pub notes: TextStore,
    pub notes_shape_id: i64,
}

#[derive(Clone)]
pub(crate) struct ShapeNode {
    pub id: i64,
    pub name: String,
    pub shape_type: i64,
    pub autoshape_type: i64,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub fill: FillState,
    pub line: LineState,
    pub text: Option<TextStore>,
    pub table: Option<TableState>,
    pub picture: Option<Vec<u8>>,
    pub children: Vec<ShapeNode>,
    pub connector: Option<ConnectorState>,
    pub placeholder: Option<i64>,
}

impl ShapeNode {
    pub fn new(id: i64, name: String, kind: i64) -> Self {
        Self {
            id,
            name,
            shape_type: kind,
            autoshape_type: auto_shape_type::MIXED,
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
            fill: FillState::default(),
            line: LineState::default(),
            text: None,
            table: None,
            picture: None,
            children: Vec::new(),
            connector: None,
            placeholder: None,
        }
    }

    pub fn is_group(&self) -> bool {
        self.shape_type == shape_type::GROUP
    }
}

#[derive(Clone)]
pub(crate) struct FillState {
    pub visible: i64,
    pub kind: i64,
    pub fore_rgb: i64,
    pub back_rgb: i64,
    pub transparency: f64,
    pub pattern: i64,
    pub gradient_color_type: i64,
    pub gradient_style: i64,
    pub gradient_variant: i64,
    pub gradient_degree: f64,
    pub stops: Vec<GradientStop>,
}

impl Default for FillState {
    fn default() -> Self {
        Self {
            visible: tri::TRUE,
            kind: fill_type::SOLID,
            fore_rgb: 0xFFFFFF,
            back_rgb: 0xFFFFFF,
            transparency: 0.0,
            pattern: -2,
            gradient_color_type: -2,
            gradient_style: -2,
            gradient_variant: 0,
            gradient_degree: 0.0,
            stops: Vec::new(),
        }
    }
}

#[derive(Clone, PartialEq)]
pub(crate) struct GradientStop {
    pub rgb: i64,
    pub position: f64,
    pub transparency: f64,
}

#[derive(Clone)]
pub(crate) struct LineState {
    pub visible: i64,
    pub weight: f64,
    pub style: i64,
    pub dash: i64,
    pub fore_rgb: i64,
    pub back_rgb: i64,
    pub transparency: f64,
    pub pattern: i64,
    pub inset_pen: i64,
    pub begin_style: i64,
    pub begin_length: i64,
    pub begin_width: i64,
    pub end_style: i64,
    pub end_length: i64,
    pub end_width: i64,
}

impl Default for LineState {
    fn default() -> Self {
        Self {
            visible: tri::TRUE,
            weight: 0.75,
            style: line_style::SINGLE,
            dash: dash_style::SOLID,
            fore_rgb: 0x000000,
            back_rgb: 0xFFFFFF,
            transparency: 0.0,
            pattern: -2,
            inset_pen: tri::FALSE,
            begin_style: arrowhead_style::NONE,
            begin_length: 2,
            begin_width: 2,
            end_style: arrowhead_style::NONE,
            end_length: 2,
            end_width: 2,
        }
    }
}

#[derive(Clone, Default)]
pub(crate) struct ConnectorState {
    pub begin: Option<(i64, i64)>,
    pub end: Option<(i64, i64)>,
}

/// Content and formatting of one table cell.
#[derive(Clone, Default)]
pub(crate) struct CellData {
    pub text: TextStore,
    pub fill: FillState,
}

#[derive(Clone)]
pub(crate) struct TableState {
    pub row_heights: Vec<f64>,
    pub col_widths: Vec<f64>,
    pub cells: Vec<Vec<CellData>>,
    /// Merge regions as (row, col, n_rows, n_cols), 0-based.
    pub merges: Vec<(usize, usize, usize, usize)>,
}

impl TableState {
    pub fn new(rows: usize, cols: usize, width: f64, height: f64) -> Self {
        Self {
            row_heights: vec![height / rows as f64; rows],
            col_widths: vec![width / cols as f64; cols],
            cells: (0..rows)
                .map(|_| (0..cols).map(|_| CellData::default()).collect())
                .collect(),
            merges: Vec::new(),
        }
    }

    pub fn n_rows(&self) -> usize {
        self.row_heights.len()
    }

    pub fn n_cols(&self) -> usize {
        self.col_widths.len()
    }

    /// The merge region containing (row, col), if any.
    pub fn region_of(&self, row: usize, col: usize) -> Option<(usize, usize, usize, usize)> {
        self.merges
            .iter()
            .copied()
            .find(|&(r, c, nr, nc)| row >= r && row < r + nr && col >= c && col < c + nc)
    }

    /// Top-left cell of the merge region containing (row, col); the cell
    /// itself when unmerged. Merged content lives in the anchor.
    pub fn anchor_of(&self, row: usize, col: usize) -> (usize, usize) {
        match self.region_of(row, col) {
            Some((r, c, _, _)) => (r, c),
            None => (row, col),
        }
    }

    /// Geometry box of the cell (or of its merge region) relative to the
    /// table origin: (left, top, width, height).
    pub fn cell_box(&self, row: usize, col: usize) -> (f64, f64, f64, f64) {
        let (r, c, nr, nc) = self.region_of(row, col).unwrap_or((row, col, 1, 1));
        let left: f64 = self.col_widths[..c].iter().sum();
        let top: f64 = self.row_heights[..r].iter().sum();
        let width: f64 = self.col_widths[c..c + nc].iter().sum();
        let height: f64 = self.row_heights[r..r + nr].iter().sum();
        (left, top, width, height)
    }
}

impl WorldState {
    pub fn alloc_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn pres(&self, id: i64) -> Result<&Pres> {
        self.presentations
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::StaleHandle(format!("presentation {id}")))
    }

    pub fn pres_mut(&mut self, id: i64) -> Result<&mut Pres> {
        self.presentations
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::StaleHandle(format!("presentation {id}")))
    }

    pub fn slide(&self, id: i64) -> Result<&SlideData> {
        self.presentations
            .iter()
            .flat_map(|p| p.slides.iter())
            .find(|s| s.id == id)
            .ok_or_else(|| Error::StaleHandle(format!("slide {id}")))
    }

    pub fn slide_mut(&mut self, id: i64) -> Result<&mut SlideData> {
        self.presentations
            .iter_mut()
            .flat_map(|p| p.slides.iter_mut())
            .find(|s| s.id == id)
            .ok_or_else(|| Error::StaleHandle(format!("slide {id}")))
    }

    /// The presentation owning a slide.
    pub fn pres_of_slide(&self, slide_id: i64) -> Result<&Pres> {
        self.presentations
            .iter()
            .find(|p| p.slides.iter().any(|s| s.id == slide_id))
            .ok_or_else(|| Error::StaleHandle(format!("slide {slide_id}")))
    }

    /// The slide owning a shape (searching groups too).
    pub fn slide_of_shape(&self, shape_id: i64) -> Result<&SlideData> {
        self.presentations
            .iter()
            .flat_map(|p| p.slides.iter())
            .find(|s| find_shape(&s.shapes, shape_id).is_some())
            .ok_or_else(|| Error::StaleHandle(format!("shape {shape_id}")))
    }

    pub fn shape(&self, id: i64) -> Result<&ShapeNode> {
        self.presentations
            .iter()
            .flat_map(|p| p.slides.iter())
            .find_map(|s| find_shape(&s.shapes, id))
            .ok_or_else(|| Error::StaleHandle(format!("shape {id}")))
    }

    pub fn shape_mut(&mut self, id: i64) -> Result<&mut ShapeNode> {
        self.presentations
            .iter_mut()
            .flat_map(|p| p.slides.iter_mut())
            .find_map(|s| find_shape_mut(&mut s.shapes, id))
            .ok_or_else(|| Error::StaleHandle(format!("shape {id}")))
    }

    /// The sibling list directly containing a shape (top level of a slide
    /// or the child list of a group).
    pub fn siblings_mut(&mut self, id: i64) -> Result<&mut Vec<ShapeNode>> {
        for pres in &mut self.presentations {
            for slide in &mut pres.slides {
                if let Some(owner) = find_owner_mut(&mut slide.shapes, id) {
                    return Ok(owner);
                }
            }
        }
        Err(Error::StaleHandle(format!("shape {id}")))
    }
}

pub(crate) fn find_shape(shapes: &[ShapeNode], id: i64) -> Option<&ShapeNode> {
    for shape in shapes {
        if shape.id == id {
            return Some(shape);
        }
        if let Some(found) = find_shape(&shape.children, id) {
            return Some(found);
        }
    }
    None
}

pub(crate) fn find_shape_mut(shapes: &mut [ShapeNode], id: i64) -> Option<&mut ShapeNode> {
    for shape in shapes {
        if shape.id == id {
            return Some(shape);
        }
        if let Some(found) = find_shape_mut(&mut shape.children, id) {
            return Some(found);
        }
    }
    None
}

fn find_owner_mut(shapes: &mut Vec<ShapeNode>, id: i64) -> Option<&mut Vec<ShapeNode>> {
    if shapes.iter().any(|s| s.id == id) {
        return Some(shapes);
    }
    for shape in shapes {
        if let Some(owner) = find_owner_mut(&mut shape.children, id) {
            return Some(owner);
        }
    }
    None
}
