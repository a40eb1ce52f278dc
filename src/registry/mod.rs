//! Disk-backed registry for named styles and captured state.
//!
//! One file per `(category, key, file_type)` under the registry root
//! (`~/.longan/registry` by default; injectable for tests). Plain JSON
//! values live in `.json` files; typed models carry their class tag in a
//! `.basemodel` file (`{"__class__": …, "__data__": …}`) so a fetch can
//! reconstruct the exact model kind. Fetches go through a bounded LRU
//! cache that `put`/`remove` invalidate.

// Submodule declarations
pub mod scratch;

use crate::common::{Error, Result};
use lru::LruCache;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const CACHE_CAPACITY: usize = 64;
const CLASS_FIELD: &str = "__class__";
const DATA_FIELD: &str = "__data__";

static DEFAULT_ROOT: Lazy<PathBuf> = Lazy::new(|| {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir);
    home.join(".longan").join("registry")
});

/// The default on-disk registry root.
pub fn default_root() -> &'static Path {
    &DEFAULT_ROOT
}

/// A model the registry can store with its class tag.
pub trait RegistryModel: Serialize + DeserializeOwned {
    /// Fully qualified class tag written next to the data.
    const CLASS: &'static str;
}

/// A hierarchical registry category: filename-safe path segments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Category(Vec<String>);

impl Category {
    /// Build a category from segments; each must be non-empty and
    /// filename-safe.
    pub fn new<S: AsRef<str>>(segments: &[S]) -> Result<Self> {
        if segments.is_empty() {
            return Err(Error::Registry("category needs at least one segment".to_string()));
        }
        let mut out = Vec::with_capacity(segments.len());
        for segment in segments {
            let segment = segment.as_ref();
            if !is_filename_safe(segment) {
                return Err(Error::Registry(format!("category segment '{segment}' is not filename-safe")));
            }
            out.push(segment.to_string());
        }
        Ok(Self(out))
    }

    /// The segments.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    fn dir(&self, root: &Path) -> PathBuf {
        self.0.iter().fold(root.to_path_buf(), |acc, s| acc.join(s))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

impl TryFrom<&str> for Category {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Category::new(&value.split('/').collect::<Vec<_>>())
    }
}

fn is_filename_safe(segment: &str) -> bool {
    !segment.is_empty()
        && !segment.starts_with("__$")
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ' '))
        && segment != "."
        && segment != ".."
}

/// A value fetched from the registry.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    /// A plain JSON value
    Json(serde_json::Value),
    /// A class-tagged model
    Model {
        class: String,
        data: serde_json::Value,
    },
}

/// The registry store.
pub struct Registry {
    root: PathBuf,
    cache: Mutex<LruCache<(Category, String), Arc<StoredValue>>>,
}

impl Registry {
    /// Open (creating the root directory if needed) a registry at an
    /// explicit root.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            )),
        })
    }

    /// Open the user-default registry.
    pub fn open_default() -> Result<Self> {
        Self::open(default_root())
    }

    /// The registry root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file(&self, category: &Category, key: &str, ext: &str) -> PathBuf {
        category.dir(&self.root).join(format!("{key}.{ext}"))
    }

    fn check_key(key: &str) -> Result<()> {
        if is_filename_safe(key) {
            Ok(())
        } else {
            Err(Error::Registry(format!("key '{key}' is not filename-safe")))
        }
    }

    fn invalidate(&self, category: &Category, key: &str) {
        self.cache.lock().pop(&(category.clone(), key.to_string()));
    }

    /// Store a plain JSON value. Overwrites any existing entry.
    pub fn put_json(&self, category: &Category, key: &str, value: &serde_json::Value) -> Result<()> {
        Self::check_key(key)?;
        std::fs::create_dir_all(category.dir(&self.root))?;
        std::fs::write(self.file(category, key, "json"), serde_json::to_vec_pretty(value)?)?;
        let _ = std::fs::remove_file(self.file(category, key, "basemodel"));
        self.invalidate(category, key);
        Ok(())
    }

    /// Store a class-tagged model. Overwrites any existing entry.
    pub fn put_model<T: RegistryModel>(&self, category: &Category, key: &str, value: &T) -> Result<()> {
        Self::check_key(key)?;
        std::fs::create_dir_all(category.dir(&self.root))?;
        let envelope = serde_json::json!({
            CLASS_FIELD: T::CLASS,
            DATA_FIELD: serde_json::to_value(value)?,
        });
        std::fs::write(
            self.file(category, key, "basemodel"),
            serde_json::to_vec_pretty(&envelope)?,
        )?;
        let _ = std::fs::remove_file(self.file(category, key, "json"));
        self.invalidate(category, key);
        Ok(())
    }

    /// Fetch an entry; `None` on miss. Results are LRU-cached.
    pub fn fetch(&self, category: &Category, key: &str) -> Result<Option<Arc<StoredValue>>> {
        Self::check_key(key)?;
        let cache_key = (category.clone(), key.to_string());
        if let Some(hit) = self.cache.lock().get(&cache_key) {
            return Ok(Some(hit.clone()));
        }
        let value = if let Ok(bytes) = std::fs::read(self.file(category, key, "json")) {
            StoredValue::Json(serde_json::from_slice(&bytes)?)
        } else if let Ok(bytes) = std::fs::read(self.file(category, key, "basemodel")) {
            let envelope: serde_json::Value = serde_json::from_slice(&bytes)?;
            let class = envelope
                .get(CLASS_FIELD)
                .and_then(|v| v.as_str())
                .ok_or_else(|| Error::Registry(format!("entry {category}/{key} has no class tag")))?
                .to_string();
            let data = envelope
                .get(DATA_FIELD)
                .cloned()
                .ok_or_else(|| Error::Registry(format!("entry {category}/{key} has no data")))?;
            StoredValue::Model { class, data }
        } else {
            return Ok(None);
        };
        let value = Arc::new(value);
        self.cache.lock().put(cache_key, value.clone());
        Ok(Some(value))
    }

    /// Fetch and reconstruct a typed model; `None` on miss, an error on
    /// a class-tag mismatch.
    pub fn fetch_model<T: RegistryModel>(&self, category: &Category, key: &str) -> Result<Option<T>> {
        match self.fetch(category, key)? {
            None => Ok(None),
            Some(stored) => match stored.as_ref() {
                StoredValue::Model { class, data } if class == T::CLASS => {
                    Ok(Some(serde_json::from_value(data.clone())?))
                }
                StoredValue::Model { class, .. } => Err(Error::Registry(format!(
                    "entry {category}/{key} holds {class}, not {}",
                    T::CLASS
                ))),
                StoredValue::Json(_) => Err(Error::Registry(format!(
                    "entry {category}/{key} is plain JSON, not {}",
                    T::CLASS
                ))),
            },
        }
    }

    /// Remove an entry; a miss is not an error.
    pub fn remove(&self, category: &Category, key: &str) -> Result<()> {
        Self::check_key(key)?;
        for ext in ["json", "basemodel"] {
            let _ = std::fs::remove_file(self.file(category, key, ext));
        }
        self.invalidate(category, key);
        Ok(())
    }

    /// Every category present on disk (nested categories enumerate as
    /// their full segment paths).
    pub fn categories(&self) -> Result<Vec<Category>> {
        let mut out = Vec::new();
        let mut stack = vec![(self.root.clone(), Vec::<String>::new())];
        while let Some((dir, segments)) = stack.pop() {
            let entries = match std::fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(_) => continue,
            };
            let mut has_files = false;
            for entry in entries.flatten() {
                let name = entry.file_name().to_string_lossy().into_owned();
                let path = entry.path();
                if path.is_dir() {
                    if name.starts_with("__$") {
                        continue;
                    }
                    let mut child = segments.clone();
                    child.push(name);
                    stack.push((path, child));
                } else {
                    has_files = true;
                }
            }
            if has_files && !segments.is_empty() {
                out.push(Category(segments));
            }
        }
        out.sort();
        Ok(out)
    }

    /// Every key in a category.
    pub fn keys(&self, category: &Category) -> Result<Vec<String>> {
        let dir = category.dir(&self.root);
        let mut out = Vec::new();
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => return Ok(out),
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if ext != "json" && ext != "basemodel" {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                out.push(stem.to_string());
            }
        }
        out.sort();
        out.dedup();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        value: i32,
    }

    impl RegistryModel for Sample {
        const CLASS: &'static str = "longan.tests.Sample";
    }

    fn registry() -> (tempfile::TempDir, Registry) {
        let dir = tempfile::tempdir().unwrap();
        let registry = Registry::open(dir.path().join("registry")).unwrap();
        (dir, registry)
    }

    #[test]
    fn test_put_fetch_overwrite_remove() {
        let (_dir, registry) = registry();
        let category = Category::try_from("shape/styles").unwrap();
        let v1 = serde_json::json!({"a": 1});
        let v2 = serde_json::json!({"a": 2});

        registry.put_json(&category, "default", &v1).unwrap();
        assert_eq!(
            *registry.fetch(&category, "default").unwrap().unwrap(),
            StoredValue::Json(v1)
        );

        registry.put_json(&category, "default", &v2).unwrap();
        assert_eq!(
            *registry.fetch(&category, "default").unwrap().unwrap(),
            StoredValue::Json(v2)
        );

        registry.remove(&category, "default").unwrap();
        assert!(registry.fetch(&category, "default").unwrap().is_none());
    }

    #[test]
    fn test_model_round_trip_with_class_tag() {
        let (_dir, registry) = registry();
        let category = Category::try_from("misc").unwrap();
        registry.put_model(&category, "sample", &Sample { value: 7 }).unwrap();

        // The on-disk envelope carries the class tag.
        let raw = std::fs::read_to_string(
            registry.root().join("misc").join("sample.basemodel"),
        )
        .unwrap();
        assert!(raw.contains("longan.tests.Sample"));

        let back: Sample = registry.fetch_model(&category, "sample").unwrap().unwrap();
        assert_eq!(back, Sample { value: 7 });
    }

    #[test]
    fn test_fetch_model_rejects_wrong_class() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Other {
            value: i32,
        }
        impl RegistryModel for Other {
            const CLASS: &'static str = "longan.tests.Other";
        }

        let (_dir, registry) = registry();
        let category = Category::try_from("misc").unwrap();
        registry.put_model(&category, "sample", &Sample { value: 7 }).unwrap();
        assert!(registry.fetch_model::<Other>(&category, "sample").is_err());
    }

    #[test]
    fn test_enumeration() {
        let (_dir, registry) = registry();
        let a = Category::try_from("styles/shape").unwrap();
        let b = Category::try_from("states").unwrap();
        registry.put_json(&a, "k1", &serde_json::json!(1)).unwrap();
        registry.put_json(&a, "k2", &serde_json::json!(2)).unwrap();
        registry.put_json(&b, "k3", &serde_json::json!(3)).unwrap();

        let categories = registry.categories().unwrap();
        assert!(categories.contains(&a));
        assert!(categories.contains(&b));
        assert_eq!(registry.keys(&a).unwrap(), vec!["k1".to_string(), "k2".to_string()]);
    }

    #[test]
    fn test_unsafe_names_rejected() {
        let (_dir, registry) = registry();
        assert!(Category::try_from("bad/../escape").is_err());
        let ok = Category::try_from("fine").unwrap();
        assert!(registry.put_json(&ok, "no/slash", &serde_json::json!(1)).is_err());
    }
}
