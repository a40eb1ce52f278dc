//! Identity-stable structural capture of slides and presentations.
//!
//! A state model records an entity and its substructure together with
//! the host ids it had at capture time. It can be re-applied onto the
//! same document (identity-preserving, by id intersection) or
//! materialized into a fresh document (create-from-scratch, with a
//! model-id → created-id mapping threading cross-shape references such
//! as connector endpoints).

// Submodule declarations
pub mod shape;

// Re-exports
pub use shape::{
    AutoShapeState, ConnectorValue, FallbackShapeState, GroupShapeState, LineShapeState,
    PictureState, PlaceholderState, ShapeBase, ShapeState, TableShapeState, TextBoxState,
};

use crate::api::{ApiModel, TextFrameApi};
use crate::common::Result;
use crate::registry::RegistryModel;
use crate::wrappers::{Presentation, Slide};
use serde::{Deserialize, Serialize};
use shape::find_shape_by_id;
use std::collections::{HashMap, HashSet};

/// Mutable scratch record for reconstruction: the target document and
/// the model-id → created-id mapping.
pub struct Context {
    pub presentation: Presentation,
    pub slide: Slide,
    pub shape_id_map: HashMap<i64, i64>,
}

impl Context {
    pub fn new(presentation: Presentation, slide: Slide) -> Self {
        Self { presentation, slide, shape_id_map: HashMap::new() }
    }

    /// Record that model shape `model_id` was materialized as `live_id`.
    pub fn register(&mut self, model_id: i64, live_id: i64) {
        self.shape_id_map.insert(model_id, live_id);
    }
}

/// Structural capture of one slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideState {
    /// Host slide id at capture time
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_name: Option<String>,
    /// Page size in points
    pub size: (f64, f64),
    /// Top-level shapes, ascending z-order
    pub shapes: Vec<ShapeState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<TextFrameApi>,
}

impl RegistryModel for SlideState {
    const CLASS: &'static str = "longan.state.SlideState";
}

impl SlideState {
    /// Capture a live slide.
    pub fn from_slide(slide: &Slide) -> Result<Self> {
        let (design_name, layout_name) = match slide.layout_names() {
            Ok((design, layout)) => (Some(design), Some(layout)),
            Err(_) => (None, None),
        };
        let shapes = slide
            .shapes()
            .to_vec()?
            .iter()
            .map(ShapeState::from_shape)
            .collect::<Result<Vec<_>>>()?;
        let notes = slide
            .notes_text_frame()
            .ok()
            .map(|frame| frame.to_model())
            .transpose()?;
        Ok(Self {
            id: slide.id()?,
            design_name,
            layout_name,
            size: slide.size()?,
            shapes,
            notes,
        })
    }

    /// Materialize a new slide at the end of `presentation`.
    pub fn create(&self, presentation: &Presentation) -> Result<Slide> {
        let slide = presentation.slides().add_blank()?;

        if let (Some(design), Some(layout)) = (&self.design_name, &self.layout_name) {
            match slide.set_layout(design, layout) {
                Ok(true) => {}
                Ok(false) => {
                    tracing::warn!(%design, %layout, "layout not found; keeping the blank layout")
                }
                Err(err) => tracing::warn!(%err, "could not assign the layout"),
            }
        }

        // The host populates the layout's placeholders; the model's own
        // shapes replace them.
        for placeholder in slide.shapes().to_vec()? {
            placeholder.delete()?;
        }

        let mut ctx = Context::new(presentation.clone(), slide.clone());
        let mut ordered: Vec<&ShapeState> = self.shapes.iter().collect();
        ordered.sort_by_key(|s| s.zorder());
        for state in ordered {
            state.create(&mut ctx)?;
        }

        if let Some(notes) = &self.notes {
            notes.apply_api(slide.notes_text_frame()?.api())?;
        }

        let live_size = slide.size()?;
        if (live_size.0 - self.size.0).abs() > f64::EPSILON
            || (live_size.1 - self.size.1).abs() > f64::EPSILON
        {
            tracing::warn!(
                captured = ?self.size,
                live = ?live_size,
                "captured page size differs; leaving the presentation page setup alone"
            );
        }
        Ok(slide)
    }

    /// Overwrite a live slide in place: shapes are matched by id, the
    /// intersection is applied, and stacking is restored by ascending
    /// captured z-order.
    pub fn apply(&self, slide: &Slide) -> Result<()> {
        for state in &self.shapes {
            match find_shape_by_id(slide, state.id()) {
                Some(live) => state.apply(&live)?,
                None => tracing::warn!(id = state.id(), "model shape is absent on the live slide"),
            }
        }
        for live in slide.shapes().to_vec()? {
            let live_id = live.id()?;
            if !self.shapes.iter().any(|s| s.id() == live_id) {
                tracing::warn!(id = live_id, "live shape is absent from the model");
            }
        }
        let mut ordered: Vec<&ShapeState> = self.shapes.iter().collect();
        ordered.sort_by_key(|s| s.zorder());
        for state in ordered {
            if let Some(live) = find_shape_by_id(slide, state.id()) {
                live.bring_to_front()?;
            }
        }
        if let Some(notes) = &self.notes {
            notes.apply_api(slide.notes_text_frame()?.api())?;
        }
        Ok(())
    }
}

/// Structural capture of a whole presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationState {
    /// Page size in points
    pub size: (f64, f64),
    /// Slides in document order
    pub slides: Vec<SlideState>,
}

impl RegistryModel for PresentationState {
    const CLASS: &'static str = "longan.state.PresentationState";
}

impl PresentationState {
    /// Capture a live presentation.
    pub fn from_presentation(presentation: &Presentation) -> Result<Self> {
        Ok(Self {
            size: presentation.slide_size()?,
            slides: presentation
                .slides()
                .to_vec()?
                .iter()
                .map(SlideState::from_slide)
                .collect::<Result<Vec<_>>>()?,
        })
    }

    /// Materialize into a fresh presentation on the given host (ambient
    /// when `None`).
    pub fn create(&self, host: Option<&crate::host::Host>) -> Result<Presentation> {
        let host = crate::resolve::host_or_ambient(host)?;
        let presentation = Presentation::from_handle(
            host.presentations()?.call("Add", &[])?.into_object()?,
        )?;
        for slide in &self.slides {
            slide.create(&presentation)?;
        }
        Ok(presentation)
    }

    /// Apply onto a live presentation: slides are matched by id and the
    /// intersection applied; when the id sets match exactly, the live
    /// order is rewritten to the model's order.
    pub fn apply(&self, presentation: &Presentation) -> Result<()> {
        let slides = presentation.slides();
        let live: Vec<Slide> = slides.to_vec()?;
        let live_ids: HashSet<i64> = live.iter().filter_map(|s| s.id().ok()).collect();
        let model_ids: HashSet<i64> = self.slides.iter().map(|s| s.id).collect();

        for state in &self.slides {
            if let Some(slide) = live.iter().find(|s| s.id().ok() == Some(state.id)) {
                state.apply(slide)?;
            } else {
                tracing::warn!(id = state.id, "model slide is absent in the live presentation");
            }
        }
        for id in live_ids.difference(&model_ids) {
            tracing::warn!(id, "live slide is absent from the model");
        }

        if live_ids == model_ids {
            let order: Vec<i64> = self.slides.iter().map(|s| s.id).collect();
            slides.reorder_by_ids(&order)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::constants::tri;
    use crate::common::{Color, Rect};
    use crate::host::Host;
    use crate::mock::MockHost;
    use crate::wrappers::{ShapeRange, Table};

    fn host() -> (MockHost, Host, Presentation) {
        let mock = MockHost::new();
        let host = Host::new(mock.application());
        let pres = Presentation::active_on(&host).unwrap();
        (mock, host, pres)
    }

    #[test]
    fn test_shape_state_round_trip_same_entity() {
        let (_mock, _host, pres) = host();
        let slide = pres.slides().add_blank().unwrap();
        let shape = slide
            .shapes()
            .add_rectangle(Some(Rect::new(10.0, 10.0, 100.0, 50.0)))
            .unwrap();
        shape.set_text("Hello\rWorld").unwrap();
        shape.set_fill(Color::new(1, 2, 3)).unwrap();

        let state = ShapeState::from_shape(&shape).unwrap();
        state.apply(&shape).unwrap();
        assert_eq!(ShapeState::from_shape(&shape).unwrap(), state);
    }

    #[test]
    fn test_slide_state_recreation_preserves_structure() {
        let (_mock, _host, pres) = host();
        let slide = pres.slides().add_blank().unwrap();
        let shapes = slide.shapes();
        let a = shapes.add_rectangle(Some(Rect::new(0.0, 0.0, 50.0, 30.0))).unwrap();
        a.set_text("alpha").unwrap();
        let b = shapes.add_textbox(Some(Rect::new(100.0, 0.0, 80.0, 30.0))).unwrap();
        b.set_text("beta\rgamma").unwrap();
        slide
            .notes_text_frame()
            .unwrap()
            .text_range()
            .unwrap()
            .set_text("note")
            .unwrap();

        let state = SlideState::from_slide(&slide).unwrap();
        let fresh = state.create(&pres).unwrap();

        assert_eq!(fresh.shapes().len().unwrap(), 2);
        let leaves = fresh.leaf_shapes().unwrap();
        assert_eq!(leaves[0].text().unwrap(), "alpha");
        assert_eq!(leaves[1].text().unwrap(), "beta\rgamma");
        assert_eq!(
            fresh.notes_text_frame().unwrap().text_range().unwrap().text().unwrap(),
            "note"
        );
        // Stacking: the rectangle stays behind the text box.
        assert!(leaves[0].zorder().unwrap() < leaves[1].zorder().unwrap());
    }

    #[test]
    fn test_group_apply_preserves_child_identity() {
        let (_mock, _host, pres) = host();
        let slide = pres.slides().add_blank().unwrap();
        let shapes = slide.shapes();
        let s1 = shapes.add_rectangle(Some(Rect::new(0.0, 0.0, 40.0, 20.0))).unwrap();
        s1.set_text("A").unwrap();
        let s2 = shapes.add_rectangle(Some(Rect::new(60.0, 0.0, 40.0, 20.0))).unwrap();
        s2.set_text("B").unwrap();
        let ids = [s1.id().unwrap(), s2.id().unwrap()];
        let group = ShapeRange::from_shapes(vec![s1.clone(), s2.clone()]).group().unwrap();

        let state = ShapeState::from_shape(&group).unwrap();
        s1.set_text("X").unwrap();
        state.apply(&group).unwrap();

        assert_eq!(s1.text().unwrap(), "A");
        assert_eq!(s2.text().unwrap(), "B");
        let child_ids: Vec<i64> = group
            .children()
            .unwrap()
            .iter()
            .map(|c| c.id().unwrap())
            .collect();
        assert_eq!(child_ids, ids);
    }

    #[test]
    fn test_table_state_recreates_merge_and_texts() {
        let (_mock, _host, pres) = host();
        let slide = pres.slides().add_blank().unwrap();
        let table = Table::make(&slide.shapes(), (3, 2)).unwrap();
        table.cell(0, 0).unwrap().merge(&table.cell(0, 1).unwrap()).unwrap();
        table.cell(0, 0).unwrap().set_text("header").unwrap();
        table.cell(2, 1).unwrap().set_text("tail").unwrap();
        let shape = table.shape().unwrap();

        let state = ShapeState::from_shape(&shape).unwrap();
        let target = pres.slides().add_blank().unwrap();
        let mut ctx = Context::new(pres.clone(), target.clone());
        let created = state.create(&mut ctx).unwrap();

        let fresh = created.table().unwrap();
        assert_eq!(fresh.n_rows().unwrap(), 3);
        assert_eq!(fresh.n_cols().unwrap(), 2);
        let merge = fresh.merge_regions().unwrap();
        assert_eq!(merge.regions.len(), 1);
        assert_eq!(
            (merge.regions[0].row, merge.regions[0].col, merge.regions[0].n_rows, merge.regions[0].n_cols),
            (0, 0, 1, 2)
        );
        assert_eq!(fresh.cell(0, 0).unwrap().text().unwrap(), "header");
        assert_eq!(fresh.cell(2, 1).unwrap().text().unwrap(), "tail");
    }

    #[test]
    fn test_connector_recreation_resolves_through_mapping() {
        let (_mock, _host, pres) = host();
        let slide = pres.slides().add_blank().unwrap();
        let shapes = slide.shapes();
        let a = shapes.add_rectangle(Some(Rect::new(0.0, 0.0, 40.0, 20.0))).unwrap();
        let b = shapes.add_rectangle(Some(Rect::new(100.0, 0.0, 40.0, 20.0))).unwrap();
        let line = shapes.add_line((40.0, 10.0), (100.0, 10.0)).unwrap();
        let format = line.api().get_object("ConnectorFormat").unwrap();
        format
            .call("BeginConnect", &[a.api().clone().into(), 3.into()])
            .unwrap();
        format
            .call("EndConnect", &[b.api().clone().into(), 1.into()])
            .unwrap();

        let state = SlideState::from_slide(&slide).unwrap();
        let fresh = state.create(&pres).unwrap();

        let live_line = fresh
            .leaf_shapes()
            .unwrap()
            .into_iter()
            .find(|s| s.shape_type().unwrap() == crate::automation::constants::shape_type::LINE)
            .unwrap();
        let live_format = live_line.api().get_object("ConnectorFormat").unwrap();
        assert_eq!(live_format.get_i64("BeginConnected").unwrap(), tri::TRUE);
        assert_eq!(live_format.get_i64("BeginConnectionSite").unwrap(), 3);
        // The endpoints landed on the recreated shapes, not the originals.
        let begin_id = live_format.get_i64("BeginConnectedShape.Id").unwrap();
        assert_ne!(begin_id, a.id().unwrap());
    }

    #[test]
    fn test_connector_creation_without_mapping_is_best_effort() {
        let (_mock, _host, pres) = host();
        let slide = pres.slides().add_blank().unwrap();
        let shapes = slide.shapes();
        let a = shapes.add_rectangle(Some(Rect::new(0.0, 0.0, 40.0, 20.0))).unwrap();
        let line = shapes.add_line((40.0, 10.0), (100.0, 10.0)).unwrap();
        line.api()
            .get_object("ConnectorFormat")
            .unwrap()
            .call("BeginConnect", &[a.api().clone().into(), 2.into()])
            .unwrap();
        let state = ShapeState::from_shape(&line).unwrap();

        // Create the line alone on a fresh slide: the mapping has no
        // entry for the rectangle, so the connection is skipped.
        let target = pres.slides().add_blank().unwrap();
        let mut ctx = Context::new(pres.clone(), target.clone());
        let created = state.create(&mut ctx).unwrap();
        assert_eq!(
            created
                .api()
                .get_i64("ConnectorFormat.BeginConnected")
                .unwrap(),
            tri::FALSE
        );
    }

    #[test]
    fn test_presentation_reorder_by_id() {
        let (_mock, _host, pres) = host();
        let slides = pres.slides();
        let ids: Vec<i64> = (0..3)
            .map(|_| slides.add_blank().unwrap().id().unwrap())
            .collect();

        let state = PresentationState::from_presentation(&pres).unwrap();

        // Scramble the live order, then apply the captured state.
        slides.reorder_by_ids(&[ids[2], ids[0], ids[1]]).unwrap();
        state.apply(&pres).unwrap();
        let current: Vec<i64> = (0..3)
            .map(|i| slides.get(i).unwrap().id().unwrap())
            .collect();
        assert_eq!(current, ids);
    }

    #[test]
    fn test_picture_state_round_trips_payload() {
        let (_mock, _host, pres) = host();
        let slide = pres.slides().add_blank().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let source_path = dir.path().join("dot.png");
        std::fs::write(&source_path, [0x89, b'P', b'N', b'G', 1, 2, 3]).unwrap();
        let picture = slide
            .shapes()
            .add_picture(&source_path, Some(Rect::new(5.0, 5.0, 20.0, 20.0)))
            .unwrap();

        let state = ShapeState::from_shape(&picture).unwrap();
        let target = pres.slides().add_blank().unwrap();
        let mut ctx = Context::new(pres.clone(), target.clone());
        let created = state.create(&mut ctx).unwrap();
        assert_eq!(created.to_image().unwrap(), picture.to_image().unwrap());
    }

    #[test]
    fn test_slide_state_layout_lookup_miss_is_non_fatal() {
        let (_mock, _host, pres) = host();
        let slide = pres.slides().add_blank().unwrap();
        let mut state = SlideState::from_slide(&slide).unwrap();
        state.design_name = Some("Missing Design".to_string());
        // Falls through with a warning and still builds the slide.
        let fresh = state.create(&pres).unwrap();
        assert_eq!(fresh.shapes().len().unwrap(), 0);
    }
}
