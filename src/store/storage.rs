//! Durable backing for the saved-scenario collection: one key, one JSON
//! document.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::StoreError;

/// Name of the single durable key holding the saved scenarios.
pub const SCENARIOS_KEY: &str = "saved_budget_scenarios";

pub trait ScenarioStorage {
    /// Returns the stored document, or `None` when nothing was ever written.
    fn read(&self) -> Result<Option<String>, StoreError>;

    /// Replaces the stored document in full.
    fn write(&mut self, contents: &str) -> Result<(), StoreError>;
}

impl<T: ScenarioStorage + ?Sized> ScenarioStorage for Box<T> {
    fn read(&self) -> Result<Option<String>, StoreError> {
        (**self).read()
    }

    fn write(&mut self, contents: &str) -> Result<(), StoreError> {
        (**self).write(contents)
    }
}

/// Stores the collection as a JSON file, replaced atomically on every write.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/saved_budget_scenarios.json`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(format!("{SCENARIOS_KEY}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScenarioStorage for FileStorage {
    fn read(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::io(&self.path, err)),
        }
    }

    fn write(&mut self, contents: &str) -> Result<(), StoreError> {
        debug!(path = %self.path.display(), bytes = contents.len(), "writing saved scenarios");
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| StoreError::io(parent, err))?;
        }
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, contents).map_err(|err| StoreError::io(&tmp_path, err))?;
        fs::rename(&tmp_path, &self.path).map_err(|err| StoreError::io(&self.path, err))
    }
}

/// Keeps the document in memory. Useful for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    contents: Option<String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Some(contents.into()),
        }
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl ScenarioStorage for MemoryStorage {
    fn read(&self) -> Result<Option<String>, StoreError> {
        Ok(self.contents.clone())
    }

    fn write(&mut self, contents: &str) -> Result<(), StoreError> {
        self.contents = Some(contents.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_none() {
        let temp = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::in_dir(temp.path());
        assert!(storage.read().expect("read").is_none());
    }

    #[test]
    fn file_write_then_read_returns_document() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut storage = FileStorage::new(temp.path().join("nested").join("scenarios.json"));

        storage.write("[]").expect("write");
        assert_eq!(storage.read().expect("read").as_deref(), Some("[]"));
        assert!(!storage.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn unreadable_path_is_an_io_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::new(temp.path());
        let err = storage.read().expect_err("directory is not a file");
        assert!(matches!(err, StoreError::Io { .. }));
    }
}
