//! Dotted-path property primitives.
//!
//! The host addresses nested state through chains of objects
//! (`Shape.Fill.ForeColor.RGB`). These helpers walk such chains, bulk
//! read/write ordered property bags, filter write-invalid entries, and
//! provide scoped save-and-restore of property bundles.

use crate::automation::{Handle, Variant};
use crate::common::{Error, Result};
use smallvec::SmallVec;

/// An ordered property bag. Order is significant on write.
pub type Bag = Vec<(String, Variant)>;

/// Look up a key in a bag.
pub fn bag_get<'a>(bag: &'a Bag, key: &str) -> Option<&'a Variant> {
    bag.iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

fn split<'a>(path: &'a str) -> SmallVec<[&'a str; 4]> {
    path.split('.').collect()
}

/// Walk every segment except the last, returning the owning object and
/// the final segment name.
fn walk<'a>(handle: &Handle, path: &'a str) -> Result<(Handle, &'a str)> {
    let segments = split(path);
    let (last, init) = segments.split_last().ok_or_else(|| {
        Error::invalid_value(path.to_string(), "empty property path")
    })?;
    let mut current = handle.clone();
    for segment in init {
        current = current.get_raw(segment)?.into_object()?;
    }
    Ok((current, *last))
}

/// Read the value at a dotted path.
///
/// Fails with [`Error::MissingAttribute`] when any segment is absent and
/// with [`Error::InvalidValue`] when the host rejects the read.
pub fn get(handle: &Handle, path: &str) -> Result<Variant> {
    let (owner, name) = walk(handle, path)?;
    owner.get_raw(name)
}

/// Write the value at a dotted path.
///
/// Fails with [`Error::InvalidValue`] on host rejection; this is how
/// write-invalidity is detected during model construction.
pub fn set(handle: &Handle, path: &str, value: Variant) -> Result<()> {
    let (owner, name) = walk(handle, path)?;
    owner.set_raw(name, value)
}

/// Whether a dotted path is readable. Total; never fails.
pub fn has(handle: &Handle, path: &str) -> bool {
    get(handle, path).is_ok()
}

/// Bulk-read `keys` into an ordered bag. Unreadable keys propagate their
/// error.
pub fn read_bag(handle: &Handle, keys: &[&str]) -> Result<Bag> {
    keys.iter()
        .map(|key| Ok((key.to_string(), get(handle, key)?)))
        .collect()
}

/// Write a bag in its declared order.
pub fn write_bag(handle: &Handle, bag: &Bag) -> Result<()> {
    for (key, value) in bag {
        set(handle, key, value.clone())?;
    }
    Ok(())
}

/// Trial-write every entry of `bag` on `handle`, dropping the ones the
/// host rejects.
///
/// Hosts report properties whose current value they themselves refuse to
/// accept back; snapshots built for later re-apply have to shed those.
/// Only write rejections are dropped; any other failure propagates.
pub fn remove_invalidity(handle: &Handle, bag: Bag) -> Result<Bag> {
    let mut kept = Bag::with_capacity(bag.len());
    for (key, value) in bag {
        match set(handle, &key, value.clone()) {
            Ok(()) => kept.push((key, value)),
            Err(err) if err.is_rejection() => {
                tracing::debug!(key = %key, %err, "dropping write-invalid property");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(kept)
}

/// Normalize a type name the way host interfaces are spelled:
/// underscores stripped, comparison case-insensitive (`"text_frame"`
/// matches `"TextFrame"`).
fn normalize_type_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Structural check: whether `handle` exposes the interface `type_name`.
pub fn is_interface(handle: &Handle, type_name: &str) -> bool {
    normalize_type_name(&handle.interface()) == normalize_type_name(type_name)
}

/// Walk the `.Parent` chain until a handle of `type_name` is found.
pub fn upstream(handle: &Handle, type_name: &str) -> Result<Handle> {
    let mut current = handle.clone();
    // The host's parent chains are shallow; the bound only guards against
    // a backend with a cyclic Parent.
    for _ in 0..64 {
        if is_interface(&current, type_name) {
            return Ok(current);
        }
        current = match current.parent() {
            Ok(parent) => parent,
            Err(_) => break,
        };
    }
    Err(Error::invalid_value(
        "Parent",
        format!("no ancestor of {} exposes {type_name}", handle.interface()),
    ))
}

/// Scoped save-and-restore of a property bundle.
///
/// Captures the current values of `paths` on construction and restores
/// every path when dropped, on all exit paths. A restoration failure is
/// logged but never masks a pending error or panic.
///
/// # Examples
///
/// ```rust,ignore
/// {
///     let _saved = ScopedSave::new(&shape, &["TextFrame.AutoSize", "TextFrame.WordWrap"])?;
///     // mutate freely; both properties are restored at scope exit
/// }
/// ```
pub struct ScopedSave {
    handle: Handle,
    saved: Bag,
}

impl ScopedSave {
    /// Capture the current values of `paths` on `handle`.
    pub fn new(handle: &Handle, paths: &[&str]) -> Result<Self> {
        Ok(Self {
            handle: handle.clone(),
            saved: read_bag(handle, paths)?,
        })
    }

    /// The captured values, in capture order.
    pub fn saved(&self) -> &Bag {
        &self.saved
    }
}

impl Drop for ScopedSave {
    fn drop(&mut self) {
        for (path, value) in &self.saved {
            if let Err(err) = set(&self.handle, path, value.clone()) {
                tracing::warn!(path = %path, %err, "failed to restore saved property");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockHost;

    fn shape() -> Handle {
        let host = MockHost::new();
        let pres = host.add_presentation().unwrap();
        let slide = MockHost::add_slide(&pres).unwrap();
        MockHost::add_rectangle(&slide, 10.0, 20.0, 100.0, 50.0).unwrap()
    }

    #[test]
    fn test_dotted_get_set() {
        let shape = shape();
        shape.set("Fill.ForeColor.RGB", 0x00FF00).unwrap();
        assert_eq!(get(&shape, "Fill.ForeColor.RGB").unwrap().as_i64().unwrap(), 0x00FF00);
    }

    #[test]
    fn test_missing_attribute() {
        let shape = shape();
        let err = get(&shape, "Fill.NoSuchThing").unwrap_err();
        assert!(matches!(err, Error::MissingAttribute { .. }));
        assert!(!has(&shape, "Fill.NoSuchThing"));
        assert!(has(&shape, "Fill.Visible"));
    }

    #[test]
    fn test_is_interface_normalization() {
        let shape = shape();
        assert!(is_interface(&shape, "Shape"));
        assert!(is_interface(&shape, "shape"));
        let frame = shape.get_object("TextFrame").unwrap();
        assert!(is_interface(&frame, "text_frame"));
    }

    #[test]
    fn test_upstream_walks_to_slide() {
        let shape = shape();
        let slide = upstream(&shape, "Slide").unwrap();
        assert!(is_interface(&slide, "Slide"));
        assert!(upstream(&shape, "Presentation").is_ok());
        assert!(upstream(&shape, "Widget").is_err());
    }

    #[test]
    fn test_scoped_save_restores_on_exit() {
        let shape = shape();
        shape.set("Width", 100.0).unwrap();
        {
            let _saved = ScopedSave::new(&shape, &["Width", "Fill.ForeColor.RGB"]).unwrap();
            shape.set("Width", 1.0).unwrap();
            shape.set("Fill.ForeColor.RGB", 5).unwrap();
        }
        assert_eq!(shape.get_f64("Width").unwrap(), 100.0);
    }

    #[test]
    fn test_scoped_save_restores_during_unwind() {
        let shape = shape();
        shape.set("Width", 77.0).unwrap();
        let shape2 = shape.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _saved = ScopedSave::new(&shape2, &["Width"]).unwrap();
            shape2.set("Width", 1.0).unwrap();
            panic!("boom");
        }));
        assert!(result.is_err());
        assert_eq!(shape.get_f64("Width").unwrap(), 77.0);
    }

    #[test]
    fn test_write_bag_order_preserved() {
        let shape = shape();
        let bag: Bag = vec![
            ("Width".into(), Variant::Float(30.0)),
            ("Height".into(), Variant::Float(40.0)),
        ];
        write_bag(&shape, &bag).unwrap();
        assert_eq!(shape.get_f64("Width").unwrap(), 30.0);
        assert_eq!(shape.get_f64("Height").unwrap(), 40.0);
    }
}
