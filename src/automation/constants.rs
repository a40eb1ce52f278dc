//! Mirrors of the host's enumeration constants.
//!
//! The automation surface traffics in plain integers; the subset the
//! library dispatches on is named here. Values match the host's published
//! enumerations.

/// Tri-state constants (`MsoTriState`).
pub mod tri {
    /// msoTrue
    pub const TRUE: i64 = -1;
    /// msoFalse
    pub const FALSE: i64 = 0;
    /// msoCTrue
    pub const CTRUE: i64 = 1;
    /// msoTriStateMixed
    pub const MIXED: i64 = -2;

    /// Whether a host value is one of the three defined states.
    #[inline]
    pub fn is_tri_state(value: i64) -> bool {
        matches!(value, TRUE | FALSE | CTRUE)
    }

    /// Encode a boolean in host convention.
    #[inline]
    pub fn from_bool(value: bool) -> i64 {
        if value { TRUE } else { FALSE }
    }
}

/// Fill types (`MsoFillType`).
pub mod fill_type {
    pub const MIXED: i64 = -2;
    pub const SOLID: i64 = 1;
    pub const PATTERNED: i64 = 2;
    pub const GRADIENT: i64 = 3;
    pub const TEXTURED: i64 = 4;
    pub const BACKGROUND: i64 = 5;
    pub const PICTURE: i64 = 6;
}

/// Gradient color types (`MsoGradientColorType`).
pub mod gradient_color_type {
    pub const MIXED: i64 = -2;
    pub const ONE_COLOR: i64 = 1;
    pub const TWO_COLORS: i64 = 2;
    pub const PRESET: i64 = 3;
    pub const MULTI_COLOR: i64 = 4;
}

/// Gradient styles (`MsoGradientStyle`).
pub mod gradient_style {
    pub const MIXED: i64 = -2;
    pub const HORIZONTAL: i64 = 1;
    pub const VERTICAL: i64 = 2;
    pub const DIAGONAL_UP: i64 = 3;
    pub const DIAGONAL_DOWN: i64 = 4;
    pub const FROM_CORNER: i64 = 5;
    pub const FROM_TITLE: i64 = 6;
    pub const FROM_CENTER: i64 = 7;
}

/// Shape types (`MsoShapeType`), the subset the library dispatches on.
pub mod shape_type {
    pub const MIXED: i64 = -2;
    pub const AUTO_SHAPE: i64 = 1;
    pub const CALLOUT: i64 = 2;
    pub const CHART: i64 = 3;
    pub const FREEFORM: i64 = 5;
    pub const GROUP: i64 = 6;
    pub const LINE: i64 = 9;
    pub const PICTURE: i64 = 13;
    pub const PLACEHOLDER: i64 = 14;
    pub const MEDIA: i64 = 16;
    pub const TEXT_BOX: i64 = 17;
    pub const TABLE: i64 = 19;
}

/// Auto-shape geometry presets (`MsoAutoShapeType`), common subset.
pub mod auto_shape_type {
    pub const MIXED: i64 = -2;
    pub const RECTANGLE: i64 = 1;
    pub const ROUNDED_RECTANGLE: i64 = 5;
    pub const OVAL: i64 = 9;
    pub const ISOSCELES_TRIANGLE: i64 = 7;
}

/// Z-order commands (`MsoZOrderCmd`).
pub mod zorder_cmd {
    pub const BRING_TO_FRONT: i64 = 0;
    pub const SEND_TO_BACK: i64 = 1;
    pub const BRING_FORWARD: i64 = 2;
    pub const SEND_BACKWARD: i64 = 3;
}

/// Window view types (`PpViewType`).
pub mod view_type {
    pub const NORMAL: i64 = 9;
    pub const SLIDE_SORTER: i64 = 7;
    pub const NOTES_PAGE: i64 = 8;
    pub const OUTLINE: i64 = 6;
}

/// Selection kinds (`PpSelectionType`).
pub mod selection_type {
    pub const NONE: i64 = 0;
    pub const SLIDES: i64 = 1;
    pub const SHAPES: i64 = 2;
    pub const TEXT: i64 = 3;
}

/// Placeholder kinds (`PpPlaceholderType`), common subset.
pub mod placeholder_type {
    pub const MIXED: i64 = -2;
    pub const CENTER_TITLE: i64 = 1;
    pub const BODY: i64 = 2;
    pub const SUBTITLE: i64 = 4;
    pub const OBJECT: i64 = 7;
    pub const TITLE: i64 = 13;
}

/// Slide layouts (`PpSlideLayout`), common subset.
pub mod slide_layout {
    pub const TITLE: i64 = 1;
    pub const TEXT: i64 = 2;
    pub const BLANK: i64 = 12;
}

/// Text auto-size modes (`PpAutoSize`).
pub mod auto_size {
    pub const MIXED: i64 = -2;
    pub const NONE: i64 = 0;
    pub const SHAPE_TO_FIT_TEXT: i64 = 1;
}

/// Paragraph alignments (`PpParagraphAlignment`).
pub mod alignment {
    pub const MIXED: i64 = -2;
    pub const LEFT: i64 = 1;
    pub const CENTER: i64 = 2;
    pub const RIGHT: i64 = 3;
    pub const JUSTIFY: i64 = 4;
}

/// Bullet kinds (`PpBulletType`).
pub mod bullet_type {
    pub const MIXED: i64 = -2;
    pub const NONE: i64 = 0;
    pub const UNNUMBERED: i64 = 1;
    pub const NUMBERED: i64 = 2;
    pub const PICTURE: i64 = 3;
}

/// Line styles (`MsoLineStyle`).
pub mod line_style {
    pub const MIXED: i64 = -2;
    pub const SINGLE: i64 = 1;
    pub const THIN_THIN: i64 = 2;
    pub const THIN_THICK: i64 = 3;
    pub const THICK_THIN: i64 = 4;
    pub const THICK_BETWEEN_THIN: i64 = 5;
}

/// Line dash styles (`MsoLineDashStyle`).
pub mod dash_style {
    pub const MIXED: i64 = -2;
    pub const SOLID: i64 = 1;
    pub const SQUARE_DOT: i64 = 2;
    pub const ROUND_DOT: i64 = 3;
    pub const DASH: i64 = 4;
    pub const DASH_DOT: i64 = 5;
    pub const LONG_DASH: i64 = 7;
}

/// Arrowhead styles (`MsoArrowheadStyle`).
pub mod arrowhead_style {
    pub const MIXED: i64 = -2;
    pub const NONE: i64 = 1;
    pub const TRIANGLE: i64 = 2;
    pub const OPEN: i64 = 3;
    pub const STEALTH: i64 = 4;
    pub const DIAMOND: i64 = 5;
    pub const OVAL: i64 = 6;
}

/// Connector geometries (`MsoConnectorType`).
pub mod connector_type {
    pub const MIXED: i64 = -2;
    pub const STRAIGHT: i64 = 1;
    pub const ELBOW: i64 = 2;
    pub const CURVE: i64 = 3;
}

/// Text orientations (`MsoTextOrientation`).
pub mod text_orientation {
    pub const MIXED: i64 = -2;
    pub const HORIZONTAL: i64 = 1;
    pub const VERTICAL: i64 = 5;
}

/// Shape raster export formats (`PpShapeFormat`).
pub mod shape_format {
    pub const GIF: i64 = 0;
    pub const JPG: i64 = 1;
    pub const PNG: i64 = 2;
    pub const BMP: i64 = 3;
}
