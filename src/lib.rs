//! Longan - a high-level object wrapper for driving a live Microsoft
//! PowerPoint automation host.
//!
//! This library manipulates slides, shapes, tables, and text through an
//! idiomatic object API while transparently reading and writing
//! properties on the live host objects behind them. It is built from
//! three tightly coupled subsystems:
//!
//! - **Resolution & wrapping**: heterogeneous inputs (a wrapper, a raw
//!   handle, a file path, or nothing at all, meaning "whatever is
//!   selected or active") resolve to the right automation handle for
//!   each domain concept.
//! - **Model / host bridging**: declarative, serializable models mirror
//!   the host's formatting sub-objects and move property bags in and out
//!   with sub-type dispatch, order-sensitive writes, and filtering of
//!   values the host itself refuses to accept back.
//! - **State capture / reconstruction**: identity-stable snapshots of
//!   shapes, tables, text trees, slides, and presentations that re-apply
//!   onto an existing document or materialize into a fresh one.
//!
//! Every operation goes through the [`automation::AutomationObject`]
//! seam; the [`mock`] module provides a complete in-memory host so the
//! whole surface is testable without PowerPoint.
//!
//! # Example - styling the selected shape
//!
//! ```rust,no_run
//! use longan::{Color, Shape};
//!
//! # fn main() -> Result<(), longan::Error> {
//! let shape = Shape::active()?;
//! shape.set_text("Hello\rWorld")?;
//! shape.set_fill(Color::from_hex("#3366CC")?)?;
//! shape.set_line((2, Color::new(0, 0, 0)))?;
//! shape.tighten()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - capturing and recreating a slide
//!
//! ```rust,no_run
//! use longan::state::SlideState;
//! use longan::{Presentation, Slide};
//!
//! # fn main() -> Result<(), longan::Error> {
//! let slide = Slide::active()?;
//! let state = SlideState::from_slide(&slide)?;
//!
//! // ... move to another document ...
//!
//! let target = Presentation::active()?;
//! state.create(&target)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - driving the in-memory host
//!
//! ```rust
//! use longan::host::Host;
//! use longan::mock::MockHost;
//! use longan::{Presentation, Rect};
//!
//! # fn main() -> Result<(), longan::Error> {
//! let mock = MockHost::new();
//! let host = Host::new(mock.application());
//! let pres = Presentation::active_on(&host)?;
//! let slide = pres.slides().add_blank()?;
//! let shape = slide.shapes().add_rectangle(Some(Rect::new(10.0, 10.0, 80.0, 40.0)))?;
//! shape.set_text("works without PowerPoint")?;
//! # Ok(())
//! # }
//! ```

/// Late-bound automation seam: handles, variants, dotted-path property
/// primitives, and mirrors of the host's enumeration constants.
pub mod automation;

/// Common value objects and the unified error type.
pub mod common;

/// Polymorphic applicators for line and fill arguments.
pub mod apply;

/// Declarative models of the host's formatting sub-objects.
pub mod api;

/// CF_HTML clipboard payload codec.
pub mod clipboard;

/// The automation host and its process-wide ambient slot.
pub mod host;

/// In-memory automation host used by the test suite.
pub mod mock;

/// Disk-backed registry for named styles and state, plus scratch files.
pub mod registry;

/// Input resolution for every domain concept.
pub mod resolve;

/// Identity-stable structural capture of slides and presentations.
pub mod state;

/// Appearance-only style capture, registerable by name.
pub mod style;

/// Domain wrappers: Presentation, Slide, Shape, Table, TextRange, ...
pub mod wrappers;

// Re-export commonly used types for convenience
pub use common::{Axis, Color, Error, Interval, Rect, Result};

pub use automation::{Handle, Variant};
pub use host::Host;
pub use wrappers::{
    Cell, FillFormat, Font, LineFormat, ParagraphFormat, Presentation, Shape, ShapeRange, Shapes,
    Slide, SlideRange, Slides, Table, TextFrame, TextRange,
};
