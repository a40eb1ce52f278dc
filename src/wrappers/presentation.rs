//! Presentation wrapper.

use crate::automation::{Handle, Variant};
use crate::common::Result;
use crate::host::Host;
use crate::resolve::{PresentationSource, resolve_presentation};
use crate::wrappers::Slides;
use std::path::Path;

/// A live presentation document.
///
/// The host assigns no numeric id to presentations; identity follows the
/// full document name.
///
/// # Examples
///
/// ```rust,no_run
/// use longan::Presentation;
///
/// // The active presentation (created when the host has none open).
/// let pres = Presentation::active()?;
/// println!("{} slides", pres.slides().len()?);
/// # Ok::<(), longan::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Presentation {
    api: Handle,
}

impl Presentation {
    /// Resolve from any accepted input against an explicit host; `None`
    /// uses the process ambient host.
    pub fn resolve(source: impl Into<PresentationSource>, host: Option<&Host>) -> Result<Self> {
        Ok(Self { api: resolve_presentation(source.into(), host)? })
    }

    /// The ambient presentation: active document, else the first open
    /// one, else a freshly added one.
    pub fn active() -> Result<Self> {
        Self::resolve(PresentationSource::Ambient, None)
    }

    /// Same as [`Presentation::active`] against an explicit host.
    pub fn active_on(host: &Host) -> Result<Self> {
        Self::resolve(PresentationSource::Ambient, Some(host))
    }

    /// Open a document from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::resolve(path.as_ref(), None)
    }

    /// Wrap an existing Presentation handle.
    pub fn from_handle(handle: Handle) -> Result<Self> {
        Self::resolve(handle, None)
    }

    /// Wrap a handle already known to be a Presentation.
    pub(crate) fn from_api(api: Handle) -> Self {
        Self { api }
    }

    /// The raw handle.
    pub fn api(&self) -> &Handle {
        &self.api
    }

    /// The Slides collection.
    pub fn slides(&self) -> Slides {
        Slides::new(self.api.clone())
    }

    /// Slide page size in points: `(width, height)`.
    pub fn slide_size(&self) -> Result<(f64, f64)> {
        Ok((
            self.api.get_f64("PageSetup.SlideWidth")?,
            self.api.get_f64("PageSetup.SlideHeight")?,
        ))
    }

    /// The document name.
    pub fn name(&self) -> Result<String> {
        self.api.get_string("Name")
    }

    /// The full document name (path where saved).
    pub fn full_name(&self) -> Result<String> {
        self.api.get_string("FullName")
    }

    /// Save in place.
    pub fn save(&self) -> Result<()> {
        self.api.call("Save", &[])?;
        Ok(())
    }

    /// Save under a new path.
    pub fn save_as(&self, path: impl AsRef<Path>) -> Result<()> {
        self.api
            .call("SaveAs", &[Variant::Str(path.as_ref().display().to_string())])?;
        Ok(())
    }
}

impl PartialEq for Presentation {
    fn eq(&self, other: &Self) -> bool {
        match (self.full_name(), other.full_name()) {
            (Ok(a), Ok(b)) => a == b,
            _ => self.api.ptr_eq(&other.api),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockHost;

    #[test]
    fn test_active_creates_and_reuses() {
        let mock = MockHost::new();
        let host = Host::new(mock.application());
        let a = Presentation::active_on(&host).unwrap();
        let b = Presentation::active_on(&host).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.slides().len().unwrap(), 0);
    }

    #[test]
    fn test_open_by_path() {
        let mock = MockHost::new();
        let host = Host::new(mock.application());
        let pres = Presentation::resolve("deck.pptx", Some(&host)).unwrap();
        assert_eq!(pres.name().unwrap(), "deck.pptx");
        assert_eq!(pres.slides().len().unwrap(), 1);
    }

    #[test]
    fn test_slide_size() {
        let mock = MockHost::new();
        let host = Host::new(mock.application());
        let pres = Presentation::active_on(&host).unwrap();
        assert_eq!(pres.slide_size().unwrap(), (960.0, 540.0));
    }
}
