//! Formatting sub-object wrappers: fill, line, font, paragraph format.
//!
//! These are borrowed views: writes go straight to the host object they
//! navigate to. Capture and re-apply go through the corresponding API
//! models.

use crate::api::{ApiModel, FillFormatApi, FontApi, LineFormatApi, ParagraphFormatApi};
use crate::automation::Handle;
use crate::common::Result;

/// View over a `FillFormat` sub-object.
#[derive(Debug, Clone)]
pub struct FillFormat {
    api: Handle,
}

impl FillFormat {
    pub fn new(api: Handle) -> Self {
        Self { api }
    }

    /// The raw handle.
    pub fn api(&self) -> &Handle {
        &self.api
    }

    /// Capture the current fill as a model.
    pub fn to_model(&self) -> Result<FillFormatApi> {
        FillFormatApi::from_api(&self.api)
    }

    /// Apply a model to this fill.
    pub fn apply_model(&self, model: &FillFormatApi) -> Result<()> {
        model.apply_api(&self.api)
    }
}

/// View over a `LineFormat` sub-object.
#[derive(Debug, Clone)]
pub struct LineFormat {
    api: Handle,
}

impl LineFormat {
    pub fn new(api: Handle) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &Handle {
        &self.api
    }

    pub fn to_model(&self) -> Result<LineFormatApi> {
        LineFormatApi::from_api(&self.api)
    }

    pub fn apply_model(&self, model: &LineFormatApi) -> Result<()> {
        model.apply_api(&self.api)
    }

    /// Line weight in points.
    pub fn weight(&self) -> Result<f64> {
        self.api.get_f64("Weight")
    }

    /// Whether the line is drawn.
    pub fn visible(&self) -> Result<bool> {
        Ok(self.api.get_i64("Visible")? != 0)
    }
}

/// View over a `Font` sub-object.
#[derive(Debug, Clone)]
pub struct Font {
    api: Handle,
}

impl Font {
    pub fn new(api: Handle) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &Handle {
        &self.api
    }

    pub fn to_model(&self) -> Result<FontApi> {
        FontApi::from_api(&self.api)
    }

    pub fn apply_model(&self, model: &FontApi) -> Result<()> {
        model.apply_api(&self.api)
    }

    pub fn size(&self) -> Result<f64> {
        self.api.get_f64("Size")
    }

    pub fn name(&self) -> Result<String> {
        self.api.get_string("Name")
    }
}

/// View over a `ParagraphFormat` sub-object (classic interface).
#[derive(Debug, Clone)]
pub struct ParagraphFormat {
    api: Handle,
    secondary: Option<Handle>,
}

impl ParagraphFormat {
    pub fn new(api: Handle) -> Self {
        Self { api, secondary: None }
    }

    /// Pair the classic interface with its v2 counterpart.
    pub fn with_secondary(api: Handle, secondary: Option<Handle>) -> Self {
        Self { api, secondary }
    }

    pub fn api(&self) -> &Handle {
        &self.api
    }

    pub fn to_model(&self) -> Result<ParagraphFormatApi> {
        ParagraphFormatApi::from_api_pair(&self.api, self.secondary.as_ref())
    }

    pub fn apply_model(&self, model: &ParagraphFormatApi) -> Result<()> {
        model.apply_api_pair(&self.api, self.secondary.as_ref())
    }
}
