//! Domain wrappers over live host objects.
//!
//! A wrapper is a thin typed view holding one [`crate::automation::Handle`]:
//! identity follows the host object (equality by host id where one
//! exists), sub-wrappers are reached by navigating the handle (never by
//! re-resolving through ambient state), and every accessor is a live
//! round-trip to the host.

// Submodule declarations
pub mod formats;
pub mod presentation;
pub mod shape;
pub mod shape_range;
pub mod slide;
pub mod table;
pub mod text;

// Re-exports
pub use formats::{FillFormat, Font, LineFormat, ParagraphFormat};
pub use presentation::Presentation;
pub use shape::Shape;
pub use shape_range::{ShapeRange, Shapes};
pub use slide::{Slide, SlideRange, Slides};
pub use table::{Cell, CellRange, Column, Columns, Row, Rows, Table, TableSource};
pub use text::{TextFrame, TextRange};

use crate::automation::{Handle, Variant};
use crate::common::Result;

/// `Count` of a host collection.
pub(crate) fn collection_count(handle: &Handle) -> Result<i64> {
    handle.get_i64("Count")
}

/// `Item(i)` of a host collection (1-based, as the host counts).
pub(crate) fn collection_item(handle: &Handle, index: i64) -> Result<Handle> {
    handle.call("Item", &[Variant::Int(index)])?.into_object()
}
