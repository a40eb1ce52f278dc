//! Identity-bearing shape capture: one closed sum over the host's shape
//! types, recursive through groups.

use crate::api::{ApiModel, FillFormatApi, LineFormatApi, TableApi, TextFrameApi};
use crate::automation::constants::shape_type;
use crate::automation::Variant;
use crate::common::{Rect, Result};
use crate::registry::scratch::TempPath;
use crate::state::Context;
use crate::style::TableStyle;
use crate::wrappers::{Shape, ShapeRange, Slide};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

/// Identity and placement shared by every shape state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeBase {
    /// Host-assigned shape id at capture time
    pub id: i64,
    pub name: String,
    /// Sibling z-order at capture time (1 = backmost)
    pub zorder: i64,
    pub rect: Rect,
    pub rotation: f64,
}

impl ShapeBase {
    fn from_shape(shape: &Shape) -> Result<Self> {
        Ok(Self {
            id: shape.id()?,
            name: shape.name()?,
            zorder: shape.zorder()?,
            rect: shape.rect()?,
            rotation: shape.rotation()?,
        })
    }

    /// Write everything but identity and z-order back.
    fn apply(&self, shape: &Shape) -> Result<()> {
        shape.set_name(&self.name)?;
        shape.set_rect(self.rect)?;
        shape.set_rotation(self.rotation)
    }
}

/// Connector endpoints by model shape id and connection site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectorValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin: Option<(i64, i64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<(i64, i64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoShapeState {
    pub base: ShapeBase,
    pub autoshape_type: i64,
    pub fill: FillFormatApi,
    pub line: LineFormatApi,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_frame: Option<TextFrameApi>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBoxState {
    pub base: ShapeBase,
    pub fill: FillFormatApi,
    pub line: LineFormatApi,
    pub text_frame: TextFrameApi,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PictureState {
    pub base: ShapeBase,
    pub line: LineFormatApi,
    /// Exported raster payload, base64
    pub png: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineShapeState {
    pub base: ShapeBase,
    pub line: LineFormatApi,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connector: Option<ConnectorValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableShapeState {
    pub base: ShapeBase,
    pub table: TableApi,
    pub style: TableStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderState {
    pub base: ShapeBase,
    pub placeholder_type: i64,
    /// The contained element's state (text, table, …)
    pub inner: Box<ShapeState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupShapeState {
    pub base: ShapeBase,
    /// Children in capture order (ascending z-order)
    pub children: Vec<ShapeState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackShapeState {
    pub base: ShapeBase,
    pub shape_type: i64,
}

/// Structural capture of one shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ShapeState {
    AutoShape(AutoShapeState),
    TextBox(TextBoxState),
    Picture(PictureState),
    Line(LineShapeState),
    Table(TableShapeState),
    Placeholder(PlaceholderState),
    Group(GroupShapeState),
    Fallback(FallbackShapeState),
}

impl ShapeState {
    /// The captured identity.
    pub fn id(&self) -> i64 {
        self.base().id
    }

    /// The captured z-order.
    pub fn zorder(&self) -> i64 {
        self.base().zorder
    }

    /// The shared base record.
    pub fn base(&self) -> &ShapeBase {
        match self {
            ShapeState::AutoShape(s) => &s.base,
            ShapeState::TextBox(s) => &s.base,
            ShapeState::Picture(s) => &s.base,
            ShapeState::Line(s) => &s.base,
            ShapeState::Table(s) => &s.base,
            ShapeState::Placeholder(s) => &s.base,
            ShapeState::Group(s) => &s.base,
            ShapeState::Fallback(s) => &s.base,
        }
    }

    /// Capture a live shape with its full substructure.
    pub fn from_shape(shape: &Shape) -> Result<Self> {
        let base = ShapeBase::from_shape(shape)?;
        let kind = shape.shape_type()?;
        match kind {
            k if k == shape_type::AUTO_SHAPE || k == shape_type::FREEFORM => {
                Ok(ShapeState::AutoShape(AutoShapeState {
                    base,
                    autoshape_type: shape.api().get_i64("AutoShapeType").unwrap_or(-2),
                    fill: shape.fill()?.to_model()?,
                    line: shape.line()?.to_model()?,
                    text_frame: if shape.has_text_frame()? {
                        Some(shape.text_frame()?.to_model()?)
                    } else {
                        None
                    },
                }))
            }
            k if k == shape_type::TEXT_BOX => Ok(ShapeState::TextBox(TextBoxState {
                base,
                fill: shape.fill()?.to_model()?,
                line: shape.line()?.to_model()?,
                text_frame: shape.text_frame()?.to_model()?,
            })),
            k if k == shape_type::PICTURE => Ok(ShapeState::Picture(PictureState {
                base,
                line: shape.line()?.to_model()?,
                png: BASE64.encode(shape.to_image()?),
            })),
            k if k == shape_type::LINE => Ok(ShapeState::Line(LineShapeState {
                base,
                line: shape.line()?.to_model()?,
                connector: capture_connector(shape)?,
            })),
            k if k == shape_type::TABLE => {
                let table = shape.table()?;
                Ok(ShapeState::Table(TableShapeState {
                    base,
                    table: table.to_model()?,
                    style: TableStyle::from_table(&table)?,
                }))
            }
            k if k == shape_type::PLACEHOLDER => {
                let placeholder_type =
                    shape.api().get_i64("PlaceholderFormat.Type").unwrap_or(-2);
                let inner = if shape.api().get_i64("HasTable").unwrap_or(0) != 0 {
                    let table = shape.table()?;
                    ShapeState::Table(TableShapeState {
                        base: base.clone(),
                        table: table.to_model()?,
                        style: TableStyle::from_table(&table)?,
                    })
                } else {
                    ShapeState::TextBox(TextBoxState {
                        base: base.clone(),
                        fill: shape.fill()?.to_model()?,
                        line: shape.line()?.to_model()?,
                        text_frame: shape.text_frame()?.to_model()?,
                    })
                };
                Ok(ShapeState::Placeholder(PlaceholderState {
                    base,
                    placeholder_type,
                    inner: Box::new(inner),
                }))
            }
            k if k == shape_type::GROUP => {
                let children = shape
                    .children()?
                    .iter()
                    .map(ShapeState::from_shape)
                    .collect::<Result<Vec<_>>>()?;
                Ok(ShapeState::Group(GroupShapeState { base, children }))
            }
            other => {
                tracing::warn!(shape_type = other, "no state model for this shape type; capturing a fallback");
                Ok(ShapeState::Fallback(FallbackShapeState { base, shape_type: other }))
            }
        }
    }

    /// Materialize a new shape on the context's slide and record the
    /// model-id → created-id mapping before building substructure.
    pub fn create(&self, ctx: &mut Context) -> Result<Shape> {
        let shapes = ctx.slide.shapes();
        match self {
            ShapeState::AutoShape(state) => {
                let shape = shapes.add_shape(state.autoshape_type.max(1), Some(state.base.rect))?;
                ctx.register(state.base.id, shape.id()?);
                state.base.apply(&shape)?;
                state.fill.apply_api(shape.fill()?.api())?;
                state.line.apply_api(shape.line()?.api())?;
                if let Some(frame) = &state.text_frame {
                    frame.apply_api(shape.text_frame()?.api())?;
                }
                Ok(shape)
            }
            ShapeState::TextBox(state) => {
                let shape = shapes.add_textbox(Some(state.base.rect))?;
                ctx.register(state.base.id, shape.id()?);
                state.base.apply(&shape)?;
                state.fill.apply_api(shape.fill()?.api())?;
                state.line.apply_api(shape.line()?.api())?;
                state.text_frame.apply_api(shape.text_frame()?.api())?;
                Ok(shape)
            }
            ShapeState::Picture(state) => {
                let payload = BASE64
                    .decode(&state.png)
                    .map_err(|e| crate::Error::invalid_value("PictureState.png", e.to_string()))?;
                let temp = TempPath::with_suffix(".png")?;
                std::fs::write(temp.path(), payload)?;
                let shape = shapes.add_picture(temp.path(), Some(state.base.rect))?;
                ctx.register(state.base.id, shape.id()?);
                state.base.apply(&shape)?;
                state.line.apply_api(shape.line()?.api())?;
                Ok(shape)
            }
            ShapeState::Line(state) => {
                let rect = state.base.rect;
                let shape = shapes.add_line(
                    (rect.left, rect.top),
                    (rect.right(), rect.bottom()),
                )?;
                ctx.register(state.base.id, shape.id()?);
                state.base.apply(&shape)?;
                state.line.apply_api(shape.line()?.api())?;
                if let Some(connector) = &state.connector {
                    connect_endpoints(&shape, connector, ctx)?;
                }
                Ok(shape)
            }
            ShapeState::Table(state) => {
                let shape = shapes.add_table(
                    state.table.n_rows().max(1),
                    state.table.n_cols().max(1),
                    Some(state.base.rect),
                )?;
                ctx.register(state.base.id, shape.id()?);
                state.base.apply(&shape)?;
                let table = shape.table()?;
                state.table.apply_api(table.api())?;
                state.style.apply(&table)?;
                Ok(shape)
            }
            ShapeState::Placeholder(state) => {
                // Placeholders cannot be created free-standing; the
                // contained element is materialized instead.
                let shape = state.inner.create(ctx)?;
                ctx.register(state.base.id, shape.id()?);
                Ok(shape)
            }
            ShapeState::Group(state) => {
                let children = state
                    .children
                    .iter()
                    .map(|child| child.create(ctx))
                    .collect::<Result<Vec<_>>>()?;
                let group = ShapeRange::from_shapes(children).group()?;
                ctx.register(state.base.id, group.id()?);
                state.base.apply(&group)?;
                Ok(group)
            }
            ShapeState::Fallback(state) => {
                tracing::warn!(
                    shape_type = state.shape_type,
                    "creating a placeholder rectangle for an unmodeled shape type"
                );
                let shape = shapes.add_rectangle(Some(state.base.rect))?;
                ctx.register(state.base.id, shape.id()?);
                state.base.apply(&shape)?;
                Ok(shape)
            }
        }
    }

    /// Overwrite an existing shape in place. Substructure id mismatches
    /// are logged, never fatal.
    pub fn apply(&self, shape: &Shape) -> Result<()> {
        match self {
            ShapeState::AutoShape(state) => {
                state.base.apply(shape)?;
                state.fill.apply_api(shape.fill()?.api())?;
                state.line.apply_api(shape.line()?.api())?;
                if let Some(frame) = &state.text_frame
                    && shape.has_text_frame()?
                {
                    frame.apply_api(shape.text_frame()?.api())?;
                }
                Ok(())
            }
            ShapeState::TextBox(state) => {
                state.base.apply(shape)?;
                state.fill.apply_api(shape.fill()?.api())?;
                state.line.apply_api(shape.line()?.api())?;
                state.text_frame.apply_api(shape.text_frame()?.api())
            }
            ShapeState::Picture(state) => {
                // The raster payload cannot be swapped in place; only
                // placement and the border follow the model.
                state.base.apply(shape)?;
                state.line.apply_api(shape.line()?.api())
            }
            ShapeState::Line(state) => {
                state.base.apply(shape)?;
                state.line.apply_api(shape.line()?.api())?;
                if let Some(connector) = &state.connector {
                    let slide = shape.slide()?;
                    reconnect_by_id(shape, connector, &slide);
                }
                Ok(())
            }
            ShapeState::Table(state) => {
                state.base.apply(shape)?;
                let table = shape.table()?;
                state.table.apply_api(table.api())?;
                state.style.apply(&table)
            }
            ShapeState::Placeholder(state) => state.inner.apply(shape),
            ShapeState::Group(state) => {
                state.base.apply(shape)?;
                let live_children = shape.children()?;
                for child_state in &state.children {
                    match live_children.iter().find(|c| {
                        c.id().map(|id| id == child_state.id()).unwrap_or(false)
                    }) {
                        Some(live) => child_state.apply(live)?,
                        None => tracing::warn!(
                            id = child_state.id(),
                            "group child from the model is absent in the live group"
                        ),
                    }
                }
                for live in live_children.iter() {
                    let live_id = live.id()?;
                    if !state.children.iter().any(|c| c.id() == live_id) {
                        tracing::warn!(id = live_id, "live group child is absent from the model");
                    }
                }
                // Restore stacking: ascending captured z-order, each
                // brought to the front in turn.
                let mut ordered: Vec<&ShapeState> = state.children.iter().collect();
                ordered.sort_by_key(|c| c.zorder());
                for child_state in ordered {
                    if let Some(live) = live_children.iter().find(|c| {
                        c.id().map(|id| id == child_state.id()).unwrap_or(false)
                    }) {
                        live.bring_to_front()?;
                    }
                }
                Ok(())
            }
            ShapeState::Fallback(state) => {
                tracing::warn!(shape_type = state.shape_type, "fallback state applies placement only");
                state.base.apply(shape)
            }
        }
    }
}

fn capture_connector(shape: &Shape) -> Result<Option<ConnectorValue>> {
    if shape.api().get_i64("Connector").unwrap_or(0) == 0 {
        return Ok(None);
    }
    let format = shape.api().get_object("ConnectorFormat")?;
    let endpoint = |prefix: &str| -> Option<(i64, i64)> {
        let connected = format.get_i64(&format!("{prefix}Connected")).ok()?;
        if connected == 0 {
            return None;
        }
        let id = format.get_i64(&format!("{prefix}ConnectedShape.Id")).ok()?;
        let site = format.get_i64(&format!("{prefix}ConnectionSite")).ok()?;
        Some((id, site))
    };
    Ok(Some(ConnectorValue { begin: endpoint("Begin"), end: endpoint("End") }))
}

/// Re-establish connector endpoints on a freshly created line, resolving
/// model shape ids through the context's id mapping. Unresolved ids are
/// skipped.
fn connect_endpoints(shape: &Shape, connector: &ConnectorValue, ctx: &Context) -> Result<()> {
    let format = match shape.api().get_object("ConnectorFormat") {
        Ok(format) => format,
        Err(err) => {
            tracing::warn!(%err, "created line exposes no connector format");
            return Ok(());
        }
    };
    for (endpoint, method) in [(connector.begin, "BeginConnect"), (connector.end, "EndConnect")] {
        let Some((model_id, site)) = endpoint else {
            continue;
        };
        let Some(&live_id) = ctx.shape_id_map.get(&model_id) else {
            tracing::warn!(model_id, "connector endpoint has no mapping; skipping");
            continue;
        };
        let Some(target) = find_shape_by_id(&ctx.slide, live_id) else {
            tracing::warn!(live_id, "connector endpoint left the slide; skipping");
            continue;
        };
        if let Err(err) = format.call(
            method,
            &[Variant::Object(target.api().clone()), Variant::Int(site)],
        ) {
            tracing::warn!(%err, method, "could not connect endpoint");
        }
    }
    Ok(())
}

/// Best-effort reconnect during in-place apply: model ids are live ids.
fn reconnect_by_id(shape: &Shape, connector: &ConnectorValue, slide: &Slide) {
    let Ok(format) = shape.api().get_object("ConnectorFormat") else {
        return;
    };
    for (endpoint, method) in [(connector.begin, "BeginConnect"), (connector.end, "EndConnect")] {
        let Some((id, site)) = endpoint else {
            continue;
        };
        match find_shape_by_id(slide, id) {
            Some(target) => {
                if let Err(err) = format.call(
                    method,
                    &[Variant::Object(target.api().clone()), Variant::Int(site)],
                ) {
                    tracing::warn!(%err, method, "could not reconnect endpoint");
                }
            }
            None => tracing::warn!(id, "connector endpoint not on this slide; skipping"),
        }
    }
}

/// Locate a shape on a slide by host id, searching group children too.
pub(crate) fn find_shape_by_id(slide: &Slide, id: i64) -> Option<Shape> {
    fn search(shapes: &[Shape], id: i64) -> Option<Shape> {
        for shape in shapes {
            if shape.id().ok() == Some(id) {
                return Some(shape.clone());
            }
            if shape.is_group().unwrap_or(false)
                && let Ok(children) = shape.children()
                && let Some(found) = search(&children.to_vec(), id)
            {
                return Some(found);
            }
        }
        None
    }
    search(&slide.shapes().to_vec().ok()?, id)
}
