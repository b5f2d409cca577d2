//! Content providers: directory-backed and in-memory module stores.

use async_trait::async_trait;
use eco_core::{ContentProvider, ModuleError};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Module text read from files in a single directory.
///
/// Filenames are resolved strictly inside the directory; names with path
/// separators or parent references are rejected.
pub struct DirectoryProvider {
    name: String,
    dir: PathBuf,
}

impl DirectoryProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            name: dir.display().to_string(),
            dir,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn resolve(&self, file: &str) -> Result<PathBuf, ModuleError> {
        let mut components = Path::new(file).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.dir.join(file)),
            _ => Err(ModuleError::InvalidName(file.to_string())),
        }
    }
}

#[async_trait]
impl ContentProvider for DirectoryProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn lookup(&self, file: &str) -> Result<Option<String>, ModuleError> {
        let path = self.resolve(file)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ModuleError::Unreadable {
                root: self.name.clone(),
                file: file.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

/// Module text held in memory. Useful for tests and embedded defaults.
pub struct StaticProvider {
    name: String,
    modules: HashMap<String, String>,
}

impl StaticProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modules: HashMap::new(),
        }
    }

    pub fn with_module(mut self, file: impl Into<String>, text: impl Into<String>) -> Self {
        self.modules.insert(file.into(), text.into());
        self
    }
}

#[async_trait]
impl ContentProvider for StaticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn lookup(&self, file: &str) -> Result<Option<String>, ModuleError> {
        Ok(self.modules.get(file).cloned())
    }
}
