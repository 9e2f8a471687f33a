//! What a command runs against: a workspace root or one template file.

use std::path::{Path, PathBuf};

use serde_json::Value;
use temply_compiler::workspace::{LAYOUTS_DIR, PARTIALS_DIR, TEMPLATES_DIR};
use temply_compiler::{Engine, Error, FileSystemLoader, InferConfig, Workspace};
use temply_core::{SampleConfig, SchemaConfig, Variable, generate_object_with, to_json_schema};

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Template(#[from] Error),

    #[error("{} is a workspace; name one of its templates", .0.display())]
    MissingTemplate(PathBuf),

    #[error("template `{0}` given, but the path is a single template file")]
    UnexpectedTemplate(String),

    #[error("no such file or directory: {}", .0.display())]
    NotFound(PathBuf),
}

pub type Result<T> = std::result::Result<T, CommandError>;

pub enum Target {
    Workspace(Workspace),
    /// A template file, loaded by `name` relative to the loader root. Files
    /// inside a workspace use the workspace root so their references resolve.
    File { engine: Engine, name: String },
}

impl Target {
    pub fn open(path: &Path, config: InferConfig) -> Result<Self> {
        if path.is_dir() {
            return Ok(Target::Workspace(Workspace::open(path)?.with_config(config)));
        }
        if !path.is_file() {
            return Err(CommandError::NotFound(path.to_path_buf()));
        }

        let (root, name) = match enclosing_workspace(path) {
            Some(found) => found,
            None => {
                let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .ok_or_else(|| CommandError::NotFound(path.to_path_buf()))?;
                (parent.unwrap_or(Path::new(".")).to_path_buf(), name)
            }
        };
        tracing::debug!(root = %root.display(), template = %name, "opened template file");
        let engine = Engine::new(FileSystemLoader::new(root)).with_config(config);
        Ok(Target::File { engine, name })
    }

    pub fn engine(&self) -> &Engine {
        match self {
            Target::Workspace(workspace) => workspace.engine(),
            Target::File { engine, .. } => engine,
        }
    }

    pub fn requirements(&self, template: Option<&str>) -> Result<Variable> {
        match (self, template) {
            (Target::Workspace(workspace), Some(template)) => {
                Ok(workspace.template_requirements(template)?)
            }
            (Target::Workspace(workspace), None) => {
                Err(CommandError::MissingTemplate(workspace.root().to_path_buf()))
            }
            (Target::File { engine, name }, None) => Ok(engine.infer(name)?.requirements),
            (Target::File { .. }, Some(template)) => {
                Err(CommandError::UnexpectedTemplate(template.to_string()))
            }
        }
    }

    pub fn schema(&self, template: Option<&str>, config: &SchemaConfig) -> Result<Value> {
        if let (Target::Workspace(workspace), Some(template)) = (self, template) {
            return Ok(workspace.template_schema(template, config)?);
        }
        let requirements = self.requirements(template)?;
        Ok(to_json_schema(&requirements, config))
    }

    pub fn sample(
        &self,
        template: Option<&str>,
        schema: &SchemaConfig,
        sample: &SampleConfig,
    ) -> Result<Value> {
        if let (Target::Workspace(workspace), Some(template)) = (self, template) {
            return Ok(workspace.template_sample(template, schema, sample)?);
        }
        let schema = self.schema(template, schema)?;
        Ok(generate_object_with(&schema, sample).map_err(Error::from)?)
    }

    /// Renders `err` to stderr, against the source of the template it was
    /// raised in when that is known. `subject` names the template the
    /// command was processing, if the error does not.
    pub fn report(&self, subject: Option<&str>, err: &CommandError, color: bool) {
        eprintln!("{}", self.render_error(subject, err, color));
    }

    pub fn render_error(&self, subject: Option<&str>, err: &CommandError, color: bool) -> String {
        let CommandError::Template(err) = err else {
            return format!("error: {err}");
        };
        let subject = subject.or(match self {
            Target::File { name, .. } => Some(name.as_str()),
            Target::Workspace(_) => None,
        });
        let (template, _) = err.innermost();
        let Some(name) = template.or(subject) else {
            return err.printer().colored(color).render();
        };
        match self.engine().source(name) {
            Ok(source) => err
                .printer()
                .colored(color)
                .source(&source)
                .path(name)
                .render(),
            Err(_) => err.printer().colored(color).render(),
        }
    }
}

/// Workspace root above `path` and the loader name of `path` under it.
fn enclosing_workspace(path: &Path) -> Option<(PathBuf, String)> {
    for ancestor in path.ancestors().skip(1) {
        let root = if ancestor.as_os_str().is_empty() {
            Path::new(".")
        } else {
            ancestor
        };
        let is_workspace = [TEMPLATES_DIR, LAYOUTS_DIR, PARTIALS_DIR]
            .iter()
            .all(|dir| root.join(dir).is_dir());
        if !is_workspace {
            continue;
        }
        let relative = path.strip_prefix(ancestor).ok()?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        return Some((root.to_path_buf(), name));
    }
    None
}
