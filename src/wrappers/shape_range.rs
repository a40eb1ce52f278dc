//! Shape collections: the slide-level `Shapes` factory and the
//! free-standing `ShapeRange`.

use crate::automation::constants::{auto_shape_type, text_orientation};
use crate::automation::{Handle, Variant};
use crate::common::{Error, Rect, Result};
use crate::host::Host;
use crate::resolve::{ShapeSetSource, resolve_shape_set};
use crate::wrappers::{Shape, Slide, collection_count, collection_item};
use std::path::Path;

/// Default placement for shapes added without an explicit rectangle.
const DEFAULT_RECT: Rect = Rect { left: 96.0, top: 96.0, width: 192.0, height: 96.0 };

fn rect_args(rect: Option<Rect>) -> [Variant; 4] {
    let r = rect.unwrap_or(DEFAULT_RECT);
    [
        Variant::Float(r.left),
        Variant::Float(r.top),
        Variant::Float(r.width),
        Variant::Float(r.height),
    ]
}

/// The shape collection of one slide; also the factory for new shapes.
#[derive(Debug, Clone)]
pub struct Shapes {
    slide: Handle,
}

impl Shapes {
    pub(crate) fn new(slide: Handle) -> Self {
        Self { slide }
    }

    fn api(&self) -> Result<Handle> {
        self.slide.get_object("Shapes")
    }

    /// The owning slide.
    pub fn slide(&self) -> Slide {
        Slide::from_api(self.slide.clone())
    }

    /// Number of top-level shapes.
    pub fn len(&self) -> Result<usize> {
        Ok(collection_count(&self.api()?)? as usize)
    }

    /// Whether the slide has no shapes.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// The shape at `index` (0-based, back-to-front).
    pub fn get(&self, index: usize) -> Result<Shape> {
        Ok(Shape::from_api(collection_item(&self.api()?, index as i64 + 1)?))
    }

    /// All top-level shapes, back-to-front.
    pub fn to_vec(&self) -> Result<Vec<Shape>> {
        (0..self.len()?).map(|i| self.get(i)).collect()
    }

    /// Add an auto-shape with the given geometry preset.
    pub fn add_shape(&self, autoshape: i64, rect: Option<Rect>) -> Result<Shape> {
        let [l, t, w, h] = rect_args(rect);
        Ok(Shape::from_api(
            self.api()?
                .call("AddShape", &[Variant::Int(autoshape), l, t, w, h])?
                .into_object()?,
        ))
    }

    /// Add a plain rectangle.
    pub fn add_rectangle(&self, rect: Option<Rect>) -> Result<Shape> {
        self.add_shape(auto_shape_type::RECTANGLE, rect)
    }

    /// Add a text box.
    pub fn add_textbox(&self, rect: Option<Rect>) -> Result<Shape> {
        let [l, t, w, h] = rect_args(rect);
        Ok(Shape::from_api(
            self.api()?
                .call(
                    "AddTextbox",
                    &[Variant::Int(text_orientation::HORIZONTAL), l, t, w, h],
                )?
                .into_object()?,
        ))
    }

    /// Add a table shape.
    pub fn add_table(&self, rows: usize, cols: usize, rect: Option<Rect>) -> Result<Shape> {
        let [l, t, w, h] = rect_args(rect);
        Ok(Shape::from_api(
            self.api()?
                .call(
                    "AddTable",
                    &[Variant::Int(rows as i64), Variant::Int(cols as i64), l, t, w, h],
                )?
                .into_object()?,
        ))
    }

    /// Add a straight line between two points.
    pub fn add_line(&self, from: (f64, f64), to: (f64, f64)) -> Result<Shape> {
        Ok(Shape::from_api(
            self.api()?
                .call(
                    "AddLine",
                    &[
                        Variant::Float(from.0),
                        Variant::Float(from.1),
                        Variant::Float(to.0),
                        Variant::Float(to.1),
                    ],
                )?
                .into_object()?,
        ))
    }

    /// Add a picture from a file.
    pub fn add_picture(&self, path: impl AsRef<Path>, rect: Option<Rect>) -> Result<Shape> {
        let [l, t, w, h] = rect_args(rect);
        Ok(Shape::from_api(
            self.api()?
                .call(
                    "AddPicture",
                    &[
                        Variant::Str(path.as_ref().display().to_string()),
                        Variant::Int(0),
                        Variant::Int(-1),
                        l,
                        t,
                        w,
                        h,
                    ],
                )?
                .into_object()?,
        ))
    }

    /// All shapes as a range.
    pub fn all(&self) -> Result<ShapeRange> {
        Ok(ShapeRange::from_shapes(self.to_vec()?))
    }

    /// Bounding rectangle over every shape.
    pub fn circumscribed_rect(&self) -> Result<Rect> {
        ShapeRange::from_shapes(self.to_vec()?).rect()
    }

    /// Tighten every shape that carries text.
    pub fn tighten(&self) -> Result<()> {
        for shape in self.to_vec()? {
            if shape.has_text_frame().unwrap_or(false) {
                shape.tighten()?;
            }
        }
        Ok(())
    }
}

/// An ordered set of shapes, independent of any host collection.
///
/// The host's own range objects go stale when shapes move in the
/// z-order, so the range keeps wrappers and re-derives a live host range
/// from current indices on demand.
#[derive(Debug, Clone)]
pub struct ShapeRange {
    shapes: Vec<Shape>,
}

impl ShapeRange {
    pub fn from_shapes(shapes: Vec<Shape>) -> Self {
        Self { shapes }
    }

    /// Resolve from wrappers, handles, or the ambient selection.
    pub fn resolve(source: impl Into<ShapeSetSource>, host: Option<&Host>) -> Result<Self> {
        Ok(Self {
            shapes: resolve_shape_set(source.into(), host)?
                .into_iter()
                .map(Shape::from_api)
                .collect(),
        })
    }

    /// The ambient selection as a range.
    pub fn active() -> Result<Self> {
        Self::resolve(ShapeSetSource::Ambient, None)
    }

    /// Same as [`ShapeRange::active`] against an explicit host.
    pub fn active_on(host: &Host) -> Result<Self> {
        Self::resolve(ShapeSetSource::Ambient, Some(host))
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Shape> {
        self.shapes.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter()
    }

    pub fn to_vec(&self) -> Vec<Shape> {
        self.shapes.clone()
    }

    /// A sub-range (0-based, end-exclusive).
    pub fn slice(&self, range: std::ops::Range<usize>) -> ShapeRange {
        ShapeRange { shapes: self.shapes.get(range).unwrap_or_default().to_vec() }
    }

    /// Append a shape.
    pub fn append(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    /// Remove a shape (by host identity).
    pub fn remove(&mut self, shape: &Shape) {
        self.shapes.retain(|s| s != shape);
    }

    /// Every shape with groups flattened to their leaves.
    pub fn leafs(&self) -> Result<Vec<Shape>> {
        let mut leaves = Vec::new();
        for shape in &self.shapes {
            shape.collect_leaves(&mut leaves)?;
        }
        Ok(leaves)
    }

    /// Bounding rectangle over the range.
    pub fn rect(&self) -> Result<Rect> {
        let mut rects = self.shapes.iter().map(Shape::rect);
        let first = rects
            .next()
            .ok_or_else(|| Error::resolution("ShapeRange", &"empty range"))??;
        rects.try_fold(first, |acc, rect| Ok(acc.cover(&rect?)))
    }

    /// Re-derive a live host range from the shapes' current positions in
    /// their slide's collection.
    pub fn host_range(&self) -> Result<Handle> {
        let first = self
            .shapes
            .first()
            .ok_or_else(|| Error::resolution("ShapeRange", &"empty range"))?;
        let slide = first.slide()?;
        let collection = slide.api().get_object("Shapes")?;
        let count = collection_count(&collection)?;
        let mut index_of = std::collections::HashMap::new();
        for i in 1..=count {
            let id = collection_item(&collection, i)?.get_i64("Id")?;
            index_of.insert(id, i);
        }
        let indices = self
            .shapes
            .iter()
            .map(|shape| {
                let id = shape.id()?;
                index_of
                    .get(&id)
                    .map(|&i| Variant::Int(i))
                    .ok_or_else(|| Error::StaleHandle(format!("shape {id} left the slide")))
            })
            .collect::<Result<Vec<_>>>()?;
        collection
            .call("Range", &[Variant::List(indices)])?
            .into_object()
    }

    /// Group the shapes into one group shape.
    pub fn group(&self) -> Result<Shape> {
        Ok(Shape::from_api(self.host_range()?.call("Group", &[])?.into_object()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockHost;

    fn slide() -> Slide {
        let mock = MockHost::new();
        let pres = mock.add_presentation().unwrap();
        Slide::from_api(MockHost::add_slide(&pres).unwrap())
    }

    #[test]
    fn test_factory_and_circumscribed_rect() {
        let slide = slide();
        let shapes = slide.shapes();
        shapes.add_rectangle(Some(Rect::new(0.0, 0.0, 10.0, 10.0))).unwrap();
        shapes.add_rectangle(Some(Rect::new(20.0, 30.0, 10.0, 10.0))).unwrap();
        assert_eq!(shapes.len().unwrap(), 2);
        assert_eq!(
            shapes.circumscribed_rect().unwrap(),
            Rect::new(0.0, 0.0, 30.0, 40.0)
        );
    }

    #[test]
    fn test_group_and_ungroup_preserve_ids() {
        let slide = slide();
        let shapes = slide.shapes();
        let a = shapes.add_rectangle(Some(Rect::new(0.0, 0.0, 10.0, 10.0))).unwrap();
        let b = shapes.add_rectangle(Some(Rect::new(20.0, 0.0, 10.0, 10.0))).unwrap();
        let ids = [a.id().unwrap(), b.id().unwrap()];

        let group = ShapeRange::from_shapes(vec![a, b]).group().unwrap();
        assert!(group.is_group().unwrap());
        assert_eq!(shapes.len().unwrap(), 1);
        assert_eq!(group.rect().unwrap(), Rect::new(0.0, 0.0, 30.0, 10.0));

        let children = group.children().unwrap();
        let child_ids: Vec<i64> = children.iter().map(|s| s.id().unwrap()).collect();
        assert_eq!(child_ids, ids);

        let ungrouped = group.ungroup().unwrap();
        assert_eq!(ungrouped.len(), 2);
        assert_eq!(shapes.len().unwrap(), 2);
        assert_eq!(shapes.get(0).unwrap().id().unwrap(), ids[0]);
    }

    #[test]
    fn test_leafs_flatten_groups() {
        let slide = slide();
        let shapes = slide.shapes();
        let a = shapes.add_rectangle(Some(Rect::new(0.0, 0.0, 10.0, 10.0))).unwrap();
        let b = shapes.add_rectangle(Some(Rect::new(20.0, 0.0, 10.0, 10.0))).unwrap();
        let c = shapes.add_rectangle(Some(Rect::new(40.0, 0.0, 10.0, 10.0))).unwrap();
        ShapeRange::from_shapes(vec![a, b]).group().unwrap();

        let leaves = shapes.all().unwrap().leafs().unwrap();
        assert_eq!(leaves.len(), 3);
        assert!(leaves.contains(&c));
    }

    #[test]
    fn test_host_range_rederives_after_zorder_change() {
        let slide = slide();
        let shapes = slide.shapes();
        let a = shapes.add_rectangle(None).unwrap();
        let b = shapes.add_rectangle(None).unwrap();
        let range = ShapeRange::from_shapes(vec![a.clone(), b.clone()]);
        // Shuffle the z-order; the re-derived range must still address
        // the same shapes.
        a.bring_to_front().unwrap();
        let host_range = range.host_range().unwrap();
        assert_eq!(host_range.get_i64("Count").unwrap(), 2);
        let first = host_range
            .call("Item", &[Variant::Int(1)])
            .unwrap()
            .into_object()
            .unwrap();
        assert_eq!(first.get_i64("Id").unwrap(), a.id().unwrap());
    }
}
