//! Slide, Slides, and SlideRange wrappers.

use crate::automation::constants::slide_layout;
use crate::automation::{Handle, Variant, upstream};
use crate::common::{Error, Rect, Result};
use crate::host::Host;
use crate::registry::scratch::TempPath;
use crate::resolve::{SlideSource, resolve_slide};
use crate::wrappers::{Presentation, Shape, Shapes, TextFrame, collection_count, collection_item};

/// The Slides collection of one presentation.
#[derive(Debug, Clone)]
pub struct Slides {
    presentation: Handle,
}

impl Slides {
    pub(crate) fn new(presentation: Handle) -> Self {
        Self { presentation }
    }

    fn api(&self) -> Result<Handle> {
        self.presentation.get_object("Slides")
    }

    /// The owning presentation.
    pub fn presentation(&self) -> Presentation {
        Presentation::from_api(self.presentation.clone())
    }

    /// Number of slides.
    pub fn len(&self) -> Result<usize> {
        Ok(collection_count(&self.api()?)? as usize)
    }

    /// Whether the presentation has no slides.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// The slide at `index` (0-based).
    pub fn get(&self, index: usize) -> Result<Slide> {
        Ok(Slide { api: collection_item(&self.api()?, index as i64 + 1)? })
    }

    /// All slides, in order.
    pub fn to_vec(&self) -> Result<Vec<Slide>> {
        (0..self.len()?).map(|i| self.get(i)).collect()
    }

    /// A sub-range of slides (0-based, end-exclusive).
    pub fn range(&self, range: std::ops::Range<usize>) -> Result<SlideRange> {
        Ok(SlideRange { slides: range.map(|i| self.get(i)).collect::<Result<_>>()? })
    }

    /// Append (or insert at `index`, 0-based) a new slide with the given
    /// layout; [`Slides::add_blank`] is the common case.
    pub fn add(&self, index: Option<usize>, layout: i64) -> Result<Slide> {
        let api = self.api()?;
        let position = match index {
            Some(i) => Variant::Int(i as i64 + 1),
            None => Variant::Empty,
        };
        Ok(Slide { api: api.call("Add", &[position, Variant::Int(layout)])?.into_object()? })
    }

    /// Append a blank slide.
    pub fn add_blank(&self) -> Result<Slide> {
        self.add(None, slide_layout::BLANK)
    }

    /// Find a slide by its host id.
    pub fn find_by_id(&self, slide_id: i64) -> Result<Slide> {
        Ok(Slide {
            api: self
                .api()?
                .call("FindBySlideID", &[Variant::Int(slide_id)])?
                .into_object()?,
        })
    }

    /// Delete every slide.
    pub fn delete_all(&self) -> Result<()> {
        for slide in self.to_vec()?.into_iter().rev() {
            slide.delete()?;
        }
        Ok(())
    }

    /// Swap the positions of two slides (0-based).
    pub fn swap(&self, a: usize, b: usize) -> Result<()> {
        if a == b {
            return Ok(());
        }
        let (lo, hi) = (a.min(b), a.max(b));
        let slide_hi = self.get(hi)?;
        let slide_lo = self.get(lo)?;
        slide_hi.move_to(lo)?;
        slide_lo.move_to(hi)?;
        Ok(())
    }

    /// Reorder slides: `permutation[k]` is the current position (0-based)
    /// of the slide that should end up at position `k`.
    pub fn reorder(&self, permutation: &[usize]) -> Result<()> {
        let n = self.len()?;
        let mut check: Vec<usize> = permutation.to_vec();
        check.sort_unstable();
        if check != (0..n).collect::<Vec<_>>() {
            return Err(Error::invalid_value(
                "Slides.reorder",
                format!("not a permutation of 0..{n}"),
            ));
        }
        let ids: Vec<i64> = permutation
            .iter()
            .map(|&i| self.get(i)?.id())
            .collect::<Result<_>>()?;
        self.reorder_by_ids(&ids)
    }

    /// Reorder slides into the given id order. Ids must name each slide
    /// exactly once.
    pub fn reorder_by_ids(&self, ids: &[i64]) -> Result<()> {
        for (k, id) in ids.iter().enumerate() {
            self.find_by_id(*id)?.move_to(k)?;
        }
        Ok(())
    }
}

/// A contiguous or arbitrary selection of slides.
#[derive(Debug, Clone)]
pub struct SlideRange {
    slides: Vec<Slide>,
}

impl SlideRange {
    pub fn from_slides(slides: Vec<Slide>) -> Self {
        Self { slides }
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slide> {
        self.slides.iter()
    }
}

/// One live slide.
#[derive(Debug, Clone)]
pub struct Slide {
    api: Handle,
}

impl Slide {
    /// Resolve from any accepted input; `None` host means the process
    /// ambient host.
    pub fn resolve(source: impl Into<SlideSource>, host: Option<&Host>) -> Result<Self> {
        Ok(Self { api: resolve_slide(source.into(), host)? })
    }

    /// The ambient slide: selected slide, else the one in view, else the
    /// first slide, else a new blank one.
    pub fn active() -> Result<Self> {
        Self::resolve(SlideSource::Ambient, None)
    }

    /// Same as [`Slide::active`] against an explicit host.
    pub fn active_on(host: &Host) -> Result<Self> {
        Self::resolve(SlideSource::Ambient, Some(host))
    }

    pub(crate) fn from_api(api: Handle) -> Self {
        Self { api }
    }

    /// The raw handle.
    pub fn api(&self) -> &Handle {
        &self.api
    }

    /// The host-assigned slide id.
    pub fn id(&self) -> Result<i64> {
        self.api.get_i64("SlideID")
    }

    /// Position within the presentation (0-based).
    pub fn index(&self) -> Result<usize> {
        Ok(self.api.get_i64("SlideIndex")? as usize - 1)
    }

    /// The shape collection.
    pub fn shapes(&self) -> Shapes {
        Shapes::new(self.api.clone())
    }

    /// Every shape with groups flattened to their leaves.
    pub fn leaf_shapes(&self) -> Result<Vec<Shape>> {
        let mut leaves = Vec::new();
        for shape in self.shapes().to_vec()? {
            shape.collect_leaves(&mut leaves)?;
        }
        Ok(leaves)
    }

    /// The owning presentation.
    pub fn presentation(&self) -> Result<Presentation> {
        Presentation::from_handle(upstream(&self.api, "Presentation")?)
    }

    /// Page size in points.
    pub fn size(&self) -> Result<(f64, f64)> {
        self.presentation()?.slide_size()
    }

    /// The page rectangle, anchored at the origin.
    pub fn rect(&self) -> Result<Rect> {
        let (width, height) = self.size()?;
        Ok(Rect::new(0.0, 0.0, width, height))
    }

    /// The design and layout names this slide is bound to.
    pub fn layout_names(&self) -> Result<(String, String)> {
        Ok((
            self.api.get_string("CustomLayout.Design.Name")?,
            self.api.get_string("CustomLayout.Name")?,
        ))
    }

    /// Bind the slide to the named design/layout pair. `Ok(false)` when
    /// the presentation has no such layout.
    pub fn set_layout(&self, design_name: &str, layout_name: &str) -> Result<bool> {
        let presentation = upstream(&self.api, "Presentation")?;
        let designs = presentation.get_object("Designs")?;
        for d in 1..=collection_count(&designs)? {
            let design = collection_item(&designs, d)?;
            if design.get_string("Name")? != design_name {
                continue;
            }
            let layouts = design.get_object("CustomLayouts")?;
            for l in 1..=collection_count(&layouts)? {
                let layout = collection_item(&layouts, l)?;
                if layout.get_string("Name")? == layout_name {
                    self.api.set("CustomLayout", Variant::Object(layout))?;
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// The notes text frame of this slide.
    pub fn notes_text_frame(&self) -> Result<TextFrame> {
        let shapes = self.api.get_object("NotesPage.Shapes")?;
        for i in 1..=collection_count(&shapes)? {
            let shape = collection_item(&shapes, i)?;
            let is_body = shape
                .get_i64("PlaceholderFormat.Type")
                .map(|t| t == crate::automation::constants::placeholder_type::BODY)
                .unwrap_or(false);
            if is_body && shape.get_i64("HasTextFrame")? != 0 {
                return Ok(TextFrame::new(shape.get_object("TextFrame")?));
            }
        }
        Err(Error::resolution("NotesTextFrame", &"no notes body placeholder"))
    }

    /// Export the slide as PNG bytes. With a rectangle given (in slide
    /// points), the exported image is cropped to it, scaling from slide
    /// units to pixel units; cropping needs the `imgconv` feature.
    pub fn to_image(&self, rect: Option<Rect>) -> Result<Vec<u8>> {
        let temp = TempPath::with_suffix(".png")?;
        self.api.call(
            "Export",
            &[
                Variant::Str(temp.path().display().to_string()),
                Variant::Str("PNG".to_string()),
            ],
        )?;
        let bytes = std::fs::read(temp.path())?;
        match rect {
            None => Ok(bytes),
            #[cfg(feature = "imgconv")]
            Some(rect) => {
                let (slide_w, slide_h) = self.size()?;
                crop_png(&bytes, rect, slide_w, slide_h)
            }
            #[cfg(not(feature = "imgconv"))]
            Some(_) => Err(Error::Unsupported(
                "cropping a slide image needs the `imgconv` feature".to_string(),
            )),
        }
    }

    /// Select this slide in the host window.
    pub fn select(&self) -> Result<()> {
        self.api.call("Select", &[])?;
        Ok(())
    }

    /// Move the slide to position `index` (0-based).
    pub fn move_to(&self, index: usize) -> Result<()> {
        self.api.call("MoveTo", &[Variant::Int(index as i64 + 1)])?;
        Ok(())
    }

    /// Delete the slide.
    pub fn delete(&self) -> Result<()> {
        self.api.call("Delete", &[])?;
        Ok(())
    }
}

impl PartialEq for Slide {
    fn eq(&self, other: &Self) -> bool {
        match (self.id(), other.id()) {
            (Ok(a), Ok(b)) => a == b,
            _ => self.api.ptr_eq(&other.api),
        }
    }
}

#[cfg(feature = "imgconv")]
fn crop_png(bytes: &[u8], rect: Rect, slide_w: f64, slide_h: f64) -> Result<Vec<u8>> {
    use image::GenericImageView;
    let img = image::load_from_memory(bytes)
        .map_err(|e| Error::invalid_value("Slide.Export", e.to_string()))?;
    let (px_w, px_h) = img.dimensions();
    let sx = px_w as f64 / slide_w;
    let sy = px_h as f64 / slide_h;
    let x = (rect.left * sx).round().max(0.0) as u32;
    let y = (rect.top * sy).round().max(0.0) as u32;
    let w = ((rect.width * sx).round() as u32).min(px_w.saturating_sub(x)).max(1);
    let h = ((rect.height * sy).round() as u32).min(px_h.saturating_sub(y)).max(1);
    let cropped = img.crop_imm(x, y, w, h);
    let mut out = Vec::new();
    cropped
        .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
        .map_err(|e| Error::invalid_value("Slide.to_image", e.to_string()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockHost;

    fn presentation() -> (MockHost, Presentation) {
        let mock = MockHost::new();
        let host = Host::new(mock.application());
        let pres = Presentation::active_on(&host).unwrap();
        (mock, pres)
    }

    #[test]
    fn test_add_and_index() {
        let (_mock, pres) = presentation();
        let slides = pres.slides();
        let first = slides.add_blank().unwrap();
        let second = slides.add_blank().unwrap();
        assert_eq!(slides.len().unwrap(), 2);
        assert_eq!(first.index().unwrap(), 0);
        assert_eq!(second.index().unwrap(), 1);
        let inserted = slides.add(Some(0), slide_layout::BLANK).unwrap();
        assert_eq!(inserted.index().unwrap(), 0);
        assert_eq!(first.index().unwrap(), 1);
    }

    #[test]
    fn test_swap_and_reorder() {
        let (_mock, pres) = presentation();
        let slides = pres.slides();
        let ids: Vec<i64> = (0..3)
            .map(|_| slides.add_blank().unwrap().id().unwrap())
            .collect();

        slides.swap(0, 2).unwrap();
        assert_eq!(slides.get(0).unwrap().id().unwrap(), ids[2]);
        assert_eq!(slides.get(2).unwrap().id().unwrap(), ids[0]);

        slides.reorder_by_ids(&ids).unwrap();
        let current: Vec<i64> = (0..3)
            .map(|i| slides.get(i).unwrap().id().unwrap())
            .collect();
        assert_eq!(current, ids);
    }

    #[test]
    fn test_reorder_rejects_non_permutation() {
        let (_mock, pres) = presentation();
        let slides = pres.slides();
        slides.add_blank().unwrap();
        slides.add_blank().unwrap();
        assert!(slides.reorder(&[0, 0]).is_err());
        assert!(slides.reorder(&[1, 0]).is_ok());
    }

    #[test]
    fn test_layout_lookup() {
        let (_mock, pres) = presentation();
        let slide = pres.slides().add_blank().unwrap();
        assert_eq!(
            slide.layout_names().unwrap(),
            ("Office Theme".to_string(), "Blank".to_string())
        );
        assert!(slide.set_layout("Office Theme", "Title Slide").unwrap());
        assert_eq!(slide.layout_names().unwrap().1, "Title Slide");
        assert!(!slide.set_layout("No Such Design", "Blank").unwrap());
    }

    #[test]
    fn test_notes_text_frame() {
        let (_mock, pres) = presentation();
        let slide = pres.slides().add_blank().unwrap();
        let notes = slide.notes_text_frame().unwrap();
        notes.text_range().unwrap().set_text("speaker notes").unwrap();
        assert_eq!(notes.text_range().unwrap().text().unwrap(), "speaker notes");
    }

    #[test]
    fn test_delete_all() {
        let (_mock, pres) = presentation();
        let slides = pres.slides();
        slides.add_blank().unwrap();
        slides.add_blank().unwrap();
        slides.delete_all().unwrap();
        assert!(slides.is_empty().unwrap());
    }
}
