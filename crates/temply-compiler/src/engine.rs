//! Entry point: loads, parses and infers templates.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::config::InferConfig;
use crate::infer::{Context, Inference, MacroTable};
use crate::loader::Loader;
use crate::parser::{Template, parse_with_limit};
use crate::{Error, Result};

/// Infers requirement trees for templates served by a [`Loader`].
///
/// Parsed templates are cached by name; the cache is the only state shared
/// between invocations, so one engine can serve concurrent callers.
pub struct Engine {
    loader: Box<dyn Loader>,
    config: InferConfig,
    cache: RwLock<HashMap<String, Arc<Template>>>,
}

impl Engine {
    pub fn new(loader: impl Loader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            config: InferConfig::default(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_config(mut self, config: InferConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &InferConfig {
        &self.config
    }

    /// Raw text of a template.
    pub fn source(&self, name: &str) -> Result<String> {
        self.loader.load(name)
    }

    /// Parsed template, from the cache when possible.
    pub fn template(&self, name: &str) -> Result<Arc<Template>> {
        {
            let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(template) = cache.get(name) {
                tracing::trace!(template = name, "template cache hit");
                return Ok(Arc::clone(template));
            }
        }

        let source = self.loader.load(name)?;
        let template = Arc::new(parse_with_limit(&source, self.config.recursion_limit)?);
        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        let entry = cache
            .entry(name.to_string())
            .or_insert_with(|| Arc::clone(&template));
        Ok(Arc::clone(entry))
    }

    /// Infer the requirements of a named template.
    pub fn infer(&self, name: &str) -> Result<Inference> {
        let template = self.template(name)?;
        let _span = tracing::debug_span!("infer", template = name).entered();
        self.infer_template(&template, vec![name.to_string()])
    }

    /// Infer the requirements of template text that has no name.
    pub fn infer_source(&self, source: &str) -> Result<Inference> {
        let template = parse_with_limit(source, self.config.recursion_limit)?;
        self.infer_template(&template, Vec::new())
    }

    /// Infer a parsed template. `chain` lists the templates being inferred
    /// that led here, the template itself last.
    pub(crate) fn infer_template(&self, template: &Template, chain: Vec<String>) -> Result<Inference> {
        let ctx = Context::root(self, chain);
        let (requirements, scope) = ctx.visit_fresh(&MacroTable::new(), &template.body)?;
        tracing::debug!(
            requirements = requirements.as_dictionary().map_or(0, |d| d.len()),
            macros = scope.macros.len(),
            "inferred template"
        );
        Ok(Inference {
            requirements,
            macros: scope.macros,
        })
    }

    /// Infer a template referenced from the one at the end of `chain`.
    pub(crate) fn infer_reference(&self, name: &str, chain: &[String]) -> Result<Inference> {
        if chain.iter().any(|c| c == name) {
            let mut chain = chain.to_vec();
            chain.push(name.to_string());
            return Err(Error::CyclicReference {
                path: name.to_string(),
                chain,
            });
        }

        let template = self.template(name).map_err(|err| match err {
            Error::TemplateNotFound(_) | Error::Io { .. } => err,
            other => other.in_template(name),
        })?;
        let mut chain = chain.to_vec();
        chain.push(name.to_string());
        self.infer_template(&template, chain)
            .map_err(|err| err.in_template(name))
    }
}
