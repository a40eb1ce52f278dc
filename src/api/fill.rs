//! Fill-format model: a closed sum over the host's fill types.

use crate::api::{ApiModel, bag_f64, bag_i64, push_f64, push_i64};
use crate::automation::constants::{fill_type, gradient_color_type, gradient_style};
use crate::automation::path::{Bag, remove_invalidity, write_bag};
use crate::automation::{Handle, Variant};
use crate::common::Result;
use serde::{Deserialize, Serialize};

/// Mirror of a `FillFormat` sub-object, discriminated by the host's fill
/// type.
///
/// Applying a variant first switches the host into the matching sub-mode
/// (`Solid()`, `Patterned(..)`, one of the gradient constructors) and
/// then writes the variant's keys. Fill types with no model here are
/// captured as [`FillFormatApi::Fallback`], which records only the tag
/// and warns when applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FillFormatApi {
    Solid(SolidFillApi),
    Patterned(PatternedFillApi),
    Gradient(GradientFillApi),
    Fallback(FallbackFillApi),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolidFillApi {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fore_color: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back_color: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transparency: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternedFillApi {
    pub pattern: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fore_color: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back_color: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GradientFillApi {
    pub color_type: i64,
    pub style: i64,
    pub variant: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fore_color: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back_color: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stops: Vec<GradientStopApi>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStopApi {
    pub color: i64,
    pub position: f64,
    pub transparency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackFillApi {
    pub fill_type: i64,
}

impl FillFormatApi {
    /// A plain solid fill of the given packed color.
    pub fn solid(rgb: i64) -> Self {
        FillFormatApi::Solid(SolidFillApi {
            fore_color: Some(rgb),
            visible: Some(crate::automation::constants::tri::TRUE),
            ..Default::default()
        })
    }
}

impl ApiModel for FillFormatApi {
    fn from_api(handle: &Handle) -> Result<Self> {
        let kind = handle.get_i64("Type")?;
        match kind {
            k if k == fill_type::SOLID => {
                let bag = capture(handle, &["ForeColor.RGB", "BackColor.RGB", "Transparency", "Visible"])?;
                Ok(FillFormatApi::Solid(SolidFillApi {
                    fore_color: bag_i64(&bag, "ForeColor.RGB"),
                    back_color: bag_i64(&bag, "BackColor.RGB"),
                    transparency: bag_f64(&bag, "Transparency"),
                    visible: bag_i64(&bag, "Visible"),
                }))
            }
            k if k == fill_type::PATTERNED => {
                let pattern = handle.get_i64("Pattern")?;
                let bag = capture(handle, &["ForeColor.RGB", "BackColor.RGB", "Visible"])?;
                Ok(FillFormatApi::Patterned(PatternedFillApi {
                    pattern,
                    fore_color: bag_i64(&bag, "ForeColor.RGB"),
                    back_color: bag_i64(&bag, "BackColor.RGB"),
                    visible: bag_i64(&bag, "Visible"),
                }))
            }
            k if k == fill_type::GRADIENT => {
                let stops_handle = handle.get_object("GradientStops")?;
                let count = stops_handle.get_i64("Count")?;
                let mut stops = Vec::with_capacity(count as usize);
                for i in 1..=count {
                    let stop = stops_handle.call("Item", &[Variant::Int(i)])?.into_object()?;
                    stops.push(GradientStopApi {
                        color: stop.get_i64("Color.RGB")?,
                        position: stop.get_f64("Position")?,
                        transparency: stop.get_f64("Transparency")?,
                    });
                }
                stops.sort_by(|a, b| a.position.total_cmp(&b.position));
                Ok(FillFormatApi::Gradient(GradientFillApi {
                    color_type: handle.get_i64("GradientColorType")?,
                    style: handle.get_i64("GradientStyle")?,
                    variant: handle.get_i64("GradientVariant")?,
                    degree: handle.get_f64("GradientDegree").ok(),
                    fore_color: handle.get_i64("ForeColor.RGB").ok(),
                    back_color: handle.get_i64("BackColor.RGB").ok(),
                    stops,
                    visible: handle.get_i64("Visible").ok(),
                }))
            }
            other => Ok(FillFormatApi::Fallback(FallbackFillApi { fill_type: other })),
        }
    }

    fn apply_api(&self, handle: &Handle) -> Result<()> {
        match self {
            FillFormatApi::Solid(solid) => {
                handle.call("Solid", &[])?;
                let mut bag = Bag::new();
                push_i64(&mut bag, "ForeColor.RGB", solid.fore_color);
                push_i64(&mut bag, "BackColor.RGB", solid.back_color);
                push_f64(&mut bag, "Transparency", solid.transparency);
                push_i64(&mut bag, "Visible", solid.visible);
                write_bag(handle, &bag)
            }
            FillFormatApi::Patterned(patterned) => {
                handle.call("Patterned", &[Variant::Int(patterned.pattern)])?;
                let mut bag = Bag::new();
                push_i64(&mut bag, "ForeColor.RGB", patterned.fore_color);
                push_i64(&mut bag, "BackColor.RGB", patterned.back_color);
                push_i64(&mut bag, "Visible", patterned.visible);
                write_bag(handle, &bag)
            }
            FillFormatApi::Gradient(gradient) => apply_gradient(handle, gradient),
            FillFormatApi::Fallback(fallback) => {
                tracing::warn!(fill_type = fallback.fill_type, "no model for this fill type; leaving the fill unchanged");
                Ok(())
            }
        }
    }
}

fn capture(handle: &Handle, keys: &[&str]) -> Result<Bag> {
    let bag = crate::automation::path::read_bag(handle, keys)?;
    remove_invalidity(handle, bag)
}

fn apply_gradient(handle: &Handle, gradient: &GradientFillApi) -> Result<()> {
    // The gradient constructors consume the current fore/back colors.
    let mut bag = Bag::new();
    push_i64(&mut bag, "ForeColor.RGB", gradient.fore_color);
    push_i64(&mut bag, "BackColor.RGB", gradient.back_color);
    write_bag(handle, &bag)?;

    // The host rejects the mixed style and the zero variant.
    let style = if gradient.style == gradient_style::MIXED {
        gradient_style::HORIZONTAL
    } else {
        gradient.style
    };
    let variant = gradient.variant.max(1);
    if gradient.color_type == gradient_color_type::ONE_COLOR {
        handle.call(
            "OneColorGradient",
            &[
                Variant::Int(style),
                Variant::Int(variant),
                Variant::Float(gradient.degree.unwrap_or(0.5)),
            ],
        )?;
    } else {
        handle.call("TwoColorGradient", &[Variant::Int(style), Variant::Int(variant)])?;
    }

    if !gradient.stops.is_empty() {
        rebuild_stops(handle, &gradient.stops)?;
    }
    if let Some(visible) = gradient.visible {
        handle.set("Visible", Variant::Int(visible))?;
    }
    Ok(())
}

/// Replace the constructor-made stops with the model's, sorted by
/// position. The host keeps a two-stop floor, so the stale leaders are
/// deleted only after the new stops are in.
fn rebuild_stops(handle: &Handle, stops: &[GradientStopApi]) -> Result<()> {
    let stops_handle = handle.get_object("GradientStops")?;
    let existing = stops_handle.get_i64("Count")?;
    for i in (3..=existing).rev() {
        stops_handle.call("Delete", &[Variant::Int(i)])?;
    }
    let stale = existing.min(2);

    let mut sorted: Vec<&GradientStopApi> = stops.iter().collect();
    sorted.sort_by(|a, b| a.position.total_cmp(&b.position));
    for stop in &sorted {
        stops_handle.call("Insert", &[Variant::Int(stop.color), Variant::Float(stop.position)])?;
    }
    for i in (1..=stale).rev() {
        if let Err(err) = stops_handle.call("Delete", &[Variant::Int(i)]) {
            tracing::warn!(index = i, %err, "could not delete a stale gradient stop");
        }
    }

    let count = stops_handle.get_i64("Count")?;
    let offset = count - sorted.len() as i64;
    for (k, stop) in sorted.iter().enumerate() {
        let item = stops_handle
            .call("Item", &[Variant::Int(offset + k as i64 + 1)])?
            .into_object()?;
        item.set("Color.RGB", Variant::Int(stop.color))?;
        item.set("Transparency", Variant::Float(stop.transparency))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::constants::tri;
    use crate::mock::MockHost;

    fn fill_handle() -> Handle {
        let host = MockHost::new();
        let pres = host.add_presentation().unwrap();
        let slide = MockHost::add_slide(&pres).unwrap();
        let shape = MockHost::add_rectangle(&slide, 0.0, 0.0, 100.0, 40.0).unwrap();
        shape.get_object("Fill").unwrap()
    }

    #[test]
    fn test_solid_round_trip() {
        let fill = fill_handle();
        fill.set("ForeColor.RGB", 0x00AA00).unwrap();
        let model = FillFormatApi::from_api(&fill).unwrap();
        assert!(matches!(model, FillFormatApi::Solid(_)));

        let other = fill_handle();
        model.apply_api(&other).unwrap();
        assert_eq!(FillFormatApi::from_api(&other).unwrap(), model);
    }

    #[test]
    fn test_gradient_copy_between_shapes() {
        let fill = fill_handle();
        fill.set("ForeColor.RGB", 0xFF0000).unwrap();
        fill.call(
            "OneColorGradient",
            &[Variant::Int(gradient_style::HORIZONTAL), Variant::Int(2), Variant::Float(0.3)],
        )
        .unwrap();
        let model = FillFormatApi::from_api(&fill).unwrap();
        let FillFormatApi::Gradient(ref g) = model else {
            panic!("expected a gradient capture");
        };
        assert_eq!(g.color_type, gradient_color_type::ONE_COLOR);
        assert_eq!(g.stops.len(), 2);

        let other = fill_handle();
        model.apply_api(&other).unwrap();
        assert_eq!(FillFormatApi::from_api(&other).unwrap(), model);
    }

    #[test]
    fn test_gradient_apply_repairs_invalid_variant() {
        let target = fill_handle();
        let model = FillFormatApi::Gradient(GradientFillApi {
            color_type: gradient_color_type::TWO_COLORS,
            style: gradient_style::MIXED,
            variant: 0,
            degree: None,
            fore_color: Some(0x123456),
            back_color: Some(0x654321),
            stops: vec![
                GradientStopApi { color: 0x123456, position: 0.0, transparency: 0.0 },
                GradientStopApi { color: 0x654321, position: 1.0, transparency: 0.5 },
            ],
            visible: Some(tri::TRUE),
        });
        model.apply_api(&target).unwrap();
        let captured = FillFormatApi::from_api(&target).unwrap();
        let FillFormatApi::Gradient(g) = captured else {
            panic!("expected a gradient");
        };
        assert_eq!(g.style, gradient_style::HORIZONTAL);
        assert_eq!(g.variant, 1);
        assert_eq!(g.stops.len(), 2);
        assert_eq!(g.stops[1].transparency, 0.5);
    }

    #[test]
    fn test_unknown_type_falls_back() {
        // Textured and picture fills have no model.
        let model = FillFormatApi::Fallback(FallbackFillApi { fill_type: fill_type::TEXTURED });
        let fill = fill_handle();
        // Applying a fallback is a no-op, never an error.
        model.apply_api(&fill).unwrap();
        assert!(matches!(FillFormatApi::from_api(&fill).unwrap(), FillFormatApi::Solid(_)));
    }
}
