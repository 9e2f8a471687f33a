//! Template sources.
//!
//! A [`Loader`] resolves the names used by `import`, `include` and `extends`
//! to template text. Names are `/`-separated paths relative to the loader root.

use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::{Error, Result};

pub trait Loader: Send + Sync {
    /// Template text for `name`. Unknown names are [`Error::TemplateNotFound`].
    fn load(&self, name: &str) -> Result<String>;
}

/// In-memory templates keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    templates: HashMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(name, source);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.templates.insert(name.into(), source.into());
    }
}

impl Loader for MemoryLoader {
    fn load(&self, name: &str) -> Result<String> {
        self.templates
            .get(name)
            .cloned()
            .ok_or_else(|| Error::TemplateNotFound(name.to_string()))
    }
}

/// Templates read from a directory.
#[derive(Debug, Clone)]
pub struct FileSystemLoader {
    root: PathBuf,
}

impl FileSystemLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of `name` under the root. Names escaping the root resolve to nothing.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name);
        let confined = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        confined.then(|| self.root.join(relative))
    }
}

impl Loader for FileSystemLoader {
    fn load(&self, name: &str) -> Result<String> {
        let Some(path) = self.resolve(name) else {
            return Err(Error::TemplateNotFound(name.to_string()));
        };
        match std::fs::read_to_string(&path) {
            Ok(source) => {
                tracing::debug!(template = name, path = %path.display(), "loaded template");
                Ok(source)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(Error::TemplateNotFound(name.to_string()))
            }
            Err(source) => Err(Error::Io { path, source }),
        }
    }
}
