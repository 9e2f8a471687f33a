//! Template workspace on disk.
//!
//! ```text
//! <root>/
//!   templates/<template>/<component>
//!   layouts/<layout>
//!   partials/<partial>
//! ```
//!
//! Components reference layouts and partials by workspace-relative names
//! (`layouts/base.html`, `partials/footer.html`).

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use temply_core::{SampleConfig, SchemaConfig, Variable, generate_object_with, merge, to_json_schema};

use crate::config::InferConfig;
use crate::engine::Engine;
use crate::infer::Inference;
use crate::loader::FileSystemLoader;
use crate::parser::Stmt;
use crate::{Error, Result};

pub const TEMPLATES_DIR: &str = "templates";
pub const LAYOUTS_DIR: &str = "layouts";
pub const PARTIALS_DIR: &str = "partials";

pub struct Workspace {
    root: PathBuf,
    engine: Engine,
}

impl Workspace {
    /// Opens a workspace, checking that its three directories exist.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        for dir in [TEMPLATES_DIR, LAYOUTS_DIR, PARTIALS_DIR] {
            let path = root.join(dir);
            if !path.is_dir() {
                return Err(Error::MissingDirectory(path));
            }
        }
        tracing::debug!(root = %root.display(), "opened workspace");
        Ok(Self {
            engine: Engine::new(FileSystemLoader::new(&root)),
            root,
        })
    }

    pub fn with_config(mut self, config: InferConfig) -> Self {
        self.engine = self.engine.with_config(config);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Template directories, sorted.
    pub fn template_names(&self) -> Result<Vec<String>> {
        list_entries(&self.root.join(TEMPLATES_DIR), |path| path.is_dir())
    }

    /// Component files of a template, sorted. Schema files (`.json`) are not
    /// components.
    pub fn component_names(&self, template: &str) -> Result<Vec<String>> {
        validate_name(template)?;
        let dir = self.root.join(TEMPLATES_DIR).join(template);
        if !dir.is_dir() {
            return Err(Error::TemplateNotFound(format!("{TEMPLATES_DIR}/{template}")));
        }
        list_entries(&dir, |path| {
            path.is_file() && path.extension().is_none_or(|ext| ext != "json")
        })
    }

    pub fn layout_names(&self) -> Result<Vec<String>> {
        list_entries(&self.root.join(LAYOUTS_DIR), |path| path.is_file())
    }

    pub fn partial_names(&self) -> Result<Vec<String>> {
        list_entries(&self.root.join(PARTIALS_DIR), |path| path.is_file())
    }

    /// Loader name of a component.
    pub fn component_path(&self, template: &str, component: &str) -> Result<String> {
        validate_name(template)?;
        validate_name(component)?;
        Ok(format!("{TEMPLATES_DIR}/{template}/{component}"))
    }

    pub fn infer_component(&self, template: &str, component: &str) -> Result<Inference> {
        let path = self.component_path(template, component)?;
        let _span = tracing::info_span!("component", template, component).entered();
        self.engine.infer(&path)
    }

    /// What every component of `template` requires, merged.
    ///
    /// Errors raised inside a component are wrapped in [`Error::InTemplate`]
    /// naming it.
    pub fn template_requirements(&self, template: &str) -> Result<Variable> {
        let mut requirements = Variable::dictionary();
        for component in self.component_names(template)? {
            let inference = self
                .infer_component(template, &component)
                .map_err(|err| err.in_template(&format!("{TEMPLATES_DIR}/{template}/{component}")))?;
            requirements = merge(&requirements, &inference.requirements)?;
        }
        Ok(requirements)
    }

    pub fn template_schema(&self, template: &str, config: &SchemaConfig) -> Result<Value> {
        let requirements = self.template_requirements(template)?;
        Ok(to_json_schema(&requirements, config))
    }

    /// An example payload satisfying the template's schema.
    pub fn template_sample(
        &self,
        template: &str,
        schema: &SchemaConfig,
        sample: &SampleConfig,
    ) -> Result<Value> {
        let schema = self.template_schema(template, schema)?;
        Ok(generate_object_with(&schema, sample)?)
    }

    /// Partials each partial imports, by partial name.
    pub fn partial_dependencies(&self) -> Result<BTreeMap<String, BTreeSet<String>>> {
        let mut dependencies = BTreeMap::new();
        for partial in self.partial_names()? {
            let template = self.engine.template(&format!("{PARTIALS_DIR}/{partial}"))?;
            let imports = template
                .body
                .iter()
                .filter_map(|stmt| match stmt {
                    Stmt::Import { template, .. } | Stmt::FromImport { template, .. } => {
                        template.as_str()
                    }
                    _ => None,
                })
                .filter_map(|path| path.strip_prefix(PARTIALS_DIR)?.strip_prefix('/'))
                .map(str::to_string)
                .collect();
            dependencies.insert(partial, imports);
        }
        Ok(dependencies)
    }
}

/// The import statement components use for a partial.
pub fn partial_import_line(partial: &str) -> String {
    let path = format!("{PARTIALS_DIR}/{partial}");
    let alias = path.replace(['/', '-'], "_");
    format!("{{%- from '{path}' import render as {alias} with context -%}}")
}

/// Template and component names are single path segments.
pub fn validate_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name.contains(['/', '\\']) {
        "name contains a path separator"
    } else if name.starts_with('.') {
        "name starts with a dot"
    } else {
        return Ok(());
    };
    Err(Error::InvalidName {
        name: name.to_string(),
        reason,
    })
}

fn list_entries(dir: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<String>> {
    let io_error = |source| Error::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') || !keep(&entry.path()) {
            continue;
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}
