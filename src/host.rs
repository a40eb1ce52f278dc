//! The automation host and its ambient discovery.
//!
//! A [`Host`] wraps the Application object of a live automation backend.
//! Resolvers that receive no explicit host fall back to the process-wide
//! ambient host, installed once with [`Host::install`] (a COM bridge on
//! Windows start-up, the [`crate::mock::MockHost`] in tests). Keeping the
//! ambient state explicit here is what lets every other layer stay free
//! of globals.

use crate::automation::constants::{selection_type, view_type};
use crate::automation::{Handle, Variant};
use crate::common::{Error, Result};
use parking_lot::RwLock;

static AMBIENT: RwLock<Option<Host>> = RwLock::new(None);

/// A connected automation host.
#[derive(Clone)]
pub struct Host {
    app: Handle,
}

impl Host {
    /// Wrap an Application handle.
    pub fn new(application: Handle) -> Self {
        Self { app: application }
    }

    /// Install `host` as the process-wide ambient host.
    pub fn install(host: Host) {
        *AMBIENT.write() = Some(host);
    }

    /// Drop the ambient host.
    pub fn clear_ambient() {
        *AMBIENT.write() = None;
    }

    /// The process-wide ambient host.
    ///
    /// Fails with [`Error::HostUnavailable`] when no backend has been
    /// installed.
    pub fn ambient() -> Result<Host> {
        AMBIENT
            .read()
            .clone()
            .ok_or_else(|| Error::HostUnavailable("no automation backend installed".to_string()))
    }

    /// The Application object.
    pub fn application(&self) -> &Handle {
        &self.app
    }

    /// The Presentations collection.
    pub fn presentations(&self) -> Result<Handle> {
        self.app.get_object("Presentations")
    }

    /// The active presentation, if one is open.
    pub fn active_presentation(&self) -> Option<Handle> {
        self.app.get_object("ActivePresentation").ok()
    }

    /// The active window's selection object, if a window is open.
    pub fn selection(&self) -> Option<Handle> {
        self.app.get_object("ActiveWindow.Selection").ok()
    }

    /// The current selection kind; `selection_type::NONE` without a
    /// window.
    pub fn selection_type(&self) -> i64 {
        self.selection()
            .and_then(|s| s.get_i64("Type").ok())
            .unwrap_or(selection_type::NONE)
    }

    /// The selected shape range, when shapes (or text inside a shape) are
    /// selected.
    pub fn selected_shape_range(&self) -> Option<Handle> {
        self.selection()?.get_object("ShapeRange").ok()
    }

    /// The selected slide range.
    pub fn selected_slide_range(&self) -> Option<Handle> {
        self.selection()?.get_object("SlideRange").ok()
    }

    /// The selected text range.
    pub fn selected_text_range(&self) -> Option<Handle> {
        self.selection()?.get_object("TextRange").ok()
    }

    /// The slide shown in the active window's view.
    pub fn view_slide(&self) -> Option<Handle> {
        self.ensure_normal_view();
        self.app.get_object("ActiveWindow.View.Slide").ok()
    }

    /// Switch the active window back to the normal editing view when it
    /// is showing something else. Failures are ignored: a host without a
    /// window simply has no view to switch.
    pub fn ensure_normal_view(&self) {
        let Ok(window) = self.app.get_object("ActiveWindow") else {
            return;
        };
        match window.get_i64("ViewType") {
            Ok(v) if v != view_type::NORMAL => {
                if let Err(err) = window.set("ViewType", Variant::Int(view_type::NORMAL)) {
                    tracing::debug!(%err, "could not switch to the normal view");
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockHost;

    #[test]
    fn test_ambient_install_and_clear() {
        // The ambient slot is process-wide; this is the only test that
        // touches it.
        let mock = MockHost::new();
        Host::install(Host::new(mock.application()));
        assert!(Host::ambient().is_ok());
        Host::clear_ambient();
        assert!(matches!(Host::ambient(), Err(Error::HostUnavailable(_))));
    }

    #[test]
    fn test_selection_accessors() {
        let mock = MockHost::new();
        let host = Host::new(mock.application());
        assert_eq!(host.selection_type(), selection_type::NONE);

        let pres = mock.add_presentation().unwrap();
        let slide = MockHost::add_slide(&pres).unwrap();
        let shape = MockHost::add_rectangle(&slide, 0.0, 0.0, 10.0, 10.0).unwrap();
        MockHost::select_shapes(&[&shape]).unwrap();

        assert_eq!(host.selection_type(), selection_type::SHAPES);
        let range = host.selected_shape_range().unwrap();
        assert_eq!(range.get_i64("Count").unwrap(), 1);
    }

    #[test]
    fn test_ensure_normal_view_switches_back() {
        let mock = MockHost::new();
        let host = Host::new(mock.application());
        mock.add_presentation().unwrap();
        let window = host.application().get_object("ActiveWindow").unwrap();
        window.set("ViewType", Variant::Int(view_type::SLIDE_SORTER)).unwrap();
        host.ensure_normal_view();
        assert_eq!(window.get_i64("ViewType").unwrap(), view_type::NORMAL);
    }
}
