//! The automation seam: opaque handles onto live host objects.
//!
//! Every operation the library performs goes through [`AutomationObject`],
//! an object-safe trait modelling one late-bound object in the host
//! process. Backends implement it (a COM bridge on Windows, the in-memory
//! [`crate::mock`] host in tests); the rest of the crate only ever sees
//! [`Handle`].
//!
//! Handles are non-owning: the host owns the underlying object and may
//! invalidate it at any time, in which case operations fail with
//! [`crate::Error::StaleHandle`].

// Submodule declarations
pub mod constants;
pub mod path;
pub mod variant;

// Re-exports
pub use path::{Bag, ScopedSave, is_interface, read_bag, remove_invalidity, upstream, write_bag};
pub use variant::Variant;

use crate::common::Result;
use std::fmt;
use std::sync::Arc;

/// One late-bound object in the automation host.
///
/// Property names are single identifiers (`"Width"`, `"RGB"`); dotted
/// paths are resolved by [`Handle`] by walking nested objects. Errors use
/// the crate taxonomy: [`crate::Error::MissingAttribute`] for unknown
/// names, [`crate::Error::InvalidValue`] for host rejections, and
/// [`crate::Error::StaleHandle`] when the host object is gone.
pub trait AutomationObject: Send + Sync {
    /// The host interface name of this object (e.g. `"Shape"`).
    fn interface_name(&self) -> String;

    /// Read one property.
    fn get_property(&self, name: &str) -> Result<Variant>;

    /// Write one property.
    fn set_property(&self, name: &str, value: Variant) -> Result<()>;

    /// Invoke a method.
    fn invoke(&self, name: &str, args: &[Variant]) -> Result<Variant>;
}

/// Cheap clonable reference to a live automation object.
#[derive(Clone)]
pub struct Handle {
    object: Arc<dyn AutomationObject>,
}

impl Handle {
    /// Wrap a backend object.
    pub fn new(object: Arc<dyn AutomationObject>) -> Self {
        Self { object }
    }

    /// Wrap a freshly constructed backend object.
    pub fn from_object<T: AutomationObject + 'static>(object: T) -> Self {
        Self { object: Arc::new(object) }
    }

    /// The host interface name.
    pub fn interface(&self) -> String {
        self.object.interface_name()
    }

    /// Read a property by dotted path (`"ForeColor.RGB"`).
    pub fn get(&self, path: &str) -> Result<Variant> {
        path::get(self, path)
    }

    /// Write a property by dotted path.
    pub fn set(&self, path: &str, value: impl Into<Variant>) -> Result<()> {
        path::set(self, path, value.into())
    }

    /// Whether a dotted path is readable. Total; never fails.
    pub fn has(&self, path: &str) -> bool {
        path::has(self, path)
    }

    /// Invoke a method on this object.
    pub fn call(&self, name: &str, args: &[Variant]) -> Result<Variant> {
        self.object.invoke(name, args)
    }

    /// Read a nested object by dotted path.
    pub fn get_object(&self, path: &str) -> Result<Handle> {
        self.get(path)?.into_object()
    }

    /// Read an integer by dotted path.
    pub fn get_i64(&self, path: &str) -> Result<i64> {
        self.get(path)?.as_i64()
    }

    /// Read a float by dotted path.
    pub fn get_f64(&self, path: &str) -> Result<f64> {
        self.get(path)?.as_f64()
    }

    /// Read a string by dotted path.
    pub fn get_string(&self, path: &str) -> Result<String> {
        Ok(self.get(path)?.as_str()?.to_string())
    }

    /// The host-assigned numeric id, where the interface exposes one.
    pub fn id(&self) -> Option<i64> {
        self.get("Id").ok().and_then(|v| v.as_i64().ok())
    }

    /// The parent object.
    pub fn parent(&self) -> Result<Handle> {
        self.get_object("Parent")
    }

    /// Reference identity: whether both handles wrap the same backend
    /// object. Host-level identity goes through [`Handle::id`] instead.
    #[inline]
    pub fn ptr_eq(&self, other: &Handle) -> bool {
        Arc::ptr_eq(&self.object, &other.object)
    }

    /// Direct (non-dotted) property access on this object.
    pub(crate) fn get_raw(&self, name: &str) -> Result<Variant> {
        self.object.get_property(name)
    }

    /// Direct (non-dotted) property write on this object.
    pub(crate) fn set_raw(&self, name: &str, value: Variant) -> Result<()> {
        self.object.set_property(name, value)
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle<{}>", self.interface())
    }
}

impl PartialEq for Handle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}
