//! Key/value persistence shaped like a browser's `localStorage`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use craft_core::Element;

use crate::{ClientError, Result};

/// Key holding the JSON array of known elements.
pub const ELEMENTS_KEY: &str = "elements";

pub trait LocalStorage: Send {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&mut self, key: &str, value: String) -> Result<()>;
}

/// Saved elements, or `None` when nothing was stored yet.
pub fn load_elements(storage: &dyn LocalStorage) -> Result<Option<Vec<Element>>> {
    match storage.get_item(ELEMENTS_KEY)? {
        Some(raw) => Ok(Some(Element::list_from_json(&raw)?)),
        None => Ok(None),
    }
}

/// Overwrite the saved element list.
pub fn save_elements(storage: &mut dyn LocalStorage, elements: &[Element]) -> Result<()> {
    storage.set_item(ELEMENTS_KEY, Element::list_to_json(elements)?)
}

/// All items in one JSON object on disk. Every write replaces the file
/// through a temporary sibling and a rename.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: BTreeMap<String, String>,
}

impl FileStorage {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let items = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|source| ClientError::Storage {
                path: path.clone(),
                source,
            })?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), items = items.len(), "opened local storage");
        Ok(Self { path, items })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        let io_err = |source: std::io::Error| ClientError::Storage {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let json = serde_json::to_string_pretty(&self.items)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<()> {
        self.items.insert(key.to_string(), value);
        self.flush()
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    items: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<()> {
        self.items.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use craft_core::initial_elements;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::open(dir.path().join("local_storage.json")).unwrap();
        assert_eq!(storage.get_item(ELEMENTS_KEY).unwrap(), None);
        assert_eq!(load_elements(&storage).unwrap(), None);
    }

    #[test]
    fn test_roundtrip_through_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("local_storage.json");

        let mut storage = FileStorage::open(&path).unwrap();
        save_elements(&mut storage, &initial_elements()).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(load_elements(&reopened).unwrap(), Some(initial_elements()));
    }

    #[test]
    fn test_save_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("local_storage.json");

        let mut storage = FileStorage::open(&path).unwrap();
        let mut more = initial_elements();
        more.push(Element::new("Steam", "💨"));
        save_elements(&mut storage, &more).unwrap();
        save_elements(&mut storage, &initial_elements()).unwrap();

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(load_elements(&reopened).unwrap(), Some(initial_elements()));
    }

    #[test]
    fn test_other_keys_survive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("local_storage.json");

        let mut storage = FileStorage::open(&path).unwrap();
        storage.set_item("theme", "dark".to_string()).unwrap();
        save_elements(&mut storage, &initial_elements()).unwrap();

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get_item("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("local_storage.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            FileStorage::open(&path),
            Err(ClientError::Corrupt(_))
        ));
    }

    #[test]
    fn test_bad_elements_value() {
        let mut storage = MemoryStorage::new();
        storage
            .set_item(ELEMENTS_KEY, "{\"name\":1}".to_string())
            .unwrap();
        assert!(matches!(
            load_elements(&storage),
            Err(ClientError::Elements(_))
        ));
    }
}
