//! Declarative mirrors of the host's formatting sub-objects.
//!
//! An API model is a plain serde record shadowing one slice of automation
//! properties. `from_api` bulk-reads the declared keys (widening with
//! conditional keys where a probe says they exist) and sheds entries the
//! host itself refuses to accept back; `apply_api` writes the populated
//! fields in declared order; order matters, some host properties
//! silently mutate their siblings.
//!
//! Unset (`None`) fields are not written and are excluded from the serde
//! form, so equality between two models ignores everything neither side
//! set.

// Submodule declarations
pub mod fill;
pub mod font;
pub mod line;
pub mod paragraph;
pub mod table;
pub mod textrange;

// Re-exports
pub use fill::{FillFormatApi, GradientFillApi, GradientStopApi, PatternedFillApi, SolidFillApi};
pub use font::FontApi;
pub use line::LineFormatApi;
pub use paragraph::{BulletFormatApi, ParagraphFormatApi};
pub use table::{CellMergeApi, MergeRegion, TableApi, TableCellApi, TableColumnApi, TableRowApi};
pub(crate) use table::detect_merge_regions;
pub use textrange::{ParagraphApi, RunApi, TextFrameApi, TextRangeApi};

use crate::automation::path::{Bag, bag_get};
use crate::automation::{Handle, Variant};
use crate::common::Result;

/// A model that can be captured from and re-applied to a handle.
pub trait ApiModel: Sized {
    /// Capture the model from a live sub-object.
    fn from_api(handle: &Handle) -> Result<Self>;

    /// Write the populated fields back, in declared key order.
    fn apply_api(&self, handle: &Handle) -> Result<()>;
}

pub(crate) fn bag_i64(bag: &Bag, key: &str) -> Option<i64> {
    bag_get(bag, key).and_then(|v| v.as_i64().ok())
}

pub(crate) fn bag_f64(bag: &Bag, key: &str) -> Option<f64> {
    bag_get(bag, key).and_then(|v| v.as_f64().ok())
}

pub(crate) fn bag_string(bag: &Bag, key: &str) -> Option<String> {
    bag_get(bag, key).and_then(|v| v.as_str().ok().map(str::to_string))
}

pub(crate) fn push_i64(bag: &mut Bag, key: &str, value: Option<i64>) {
    if let Some(v) = value {
        bag.push((key.to_string(), Variant::Int(v)));
    }
}

pub(crate) fn push_f64(bag: &mut Bag, key: &str, value: Option<f64>) {
    if let Some(v) = value {
        bag.push((key.to_string(), Variant::Float(v)));
    }
}

pub(crate) fn push_str(bag: &mut Bag, key: &str, value: Option<&str>) {
    if let Some(v) = value {
        bag.push((key.to_string(), Variant::Str(v.to_string())));
    }
}
