//! Variable → JSON-Schema conversion.

use indexmap::IndexMap;
use serde_json::{Map, Value, json};

use super::config::{PropertyOrder, SchemaConfig, SchemaMode};
use super::naming::{Claim, DefinitionNames, definition_name};
use crate::utils::to_title_case;
use crate::variable::{Shape, Variable};

pub(super) struct SchemaEmitter<'c> {
    config: &'c SchemaConfig,
    mode: SchemaMode,
    mode_tag: Option<&'static str>,
    /// Emit nested dictionaries in place instead of under `$defs`.
    inline: bool,
    names: DefinitionNames,
    defs: Map<String, Value>,
}

impl<'c> SchemaEmitter<'c> {
    pub(super) fn new(config: &'c SchemaConfig, mode: SchemaMode, tag_modes: bool) -> Self {
        Self {
            config,
            mode,
            mode_tag: tag_modes.then(|| mode.title()),
            inline: false,
            names: DefinitionNames::default(),
            defs: Map::new(),
        }
    }

    pub(super) fn inline(config: &'c SchemaConfig) -> Self {
        Self {
            inline: true,
            ..Self::new(config, SchemaMode::Input, false)
        }
    }

    pub(super) fn emit_root(mut self, root: &Variable) -> Value {
        let title = self.config.title.clone();
        let mut schema = match &root.shape {
            Shape::Dictionary(entries) => self.object(entries, &[], Some(&title)),
            _ => {
                let mut schema = self.shape(root, &[]);
                if let Value::Object(map) = &mut schema {
                    map.insert("title".to_string(), Value::String(title));
                }
                schema
            }
        };

        if !self.defs.is_empty()
            && let Value::Object(map) = &mut schema
        {
            map.insert("$defs".to_string(), Value::Object(std::mem::take(&mut self.defs)));
        }
        schema
    }

    pub(super) fn emit_shape(mut self, var: &Variable) -> Value {
        self.shape(var, &[])
    }

    fn shape(&mut self, var: &Variable, path: &[String]) -> Value {
        match &var.shape {
            Shape::Unknown => json!({}),
            Shape::Scalar(kind) => json!({ "type": kind.json_type() }),
            Shape::Dictionary(entries) => {
                if self.inline {
                    self.object(entries, path, None)
                } else {
                    self.definition(var, entries, path)
                }
            }
            Shape::List(item) => json!({
                "type": "array",
                "items": self.shape(item, path),
            }),
            Shape::Tuple(items) => {
                let prefix: Vec<Value> = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.shape(item, &extend(path, &format!("items.{i}"))))
                    .collect();
                json!({
                    "type": "array",
                    "prefixItems": prefix,
                    "minItems": items.len(),
                    "maxItems": items.len(),
                })
            }
            Shape::AdditionalProperties(item) => json!({
                "type": "object",
                "additionalProperties": self.shape(item, &extend(path, "additionalProperties")),
            }),
            Shape::AnyOf(members) => {
                let members: Vec<Value> = members
                    .iter()
                    .enumerate()
                    .map(|(i, member)| self.shape(member, &extend(path, &format!("anyOf.{i}"))))
                    .collect();
                json!({ "anyOf": members })
            }
        }
    }

    fn definition(
        &mut self,
        var: &Variable,
        entries: &IndexMap<String, Variable>,
        path: &[String],
    ) -> Value {
        let key = super::canonical_key(var);
        let base = definition_name(path, &self.config.title, self.mode_tag);
        let name = match self.names.claim(&base, &key) {
            Claim::Existing(name) => name,
            Claim::Fresh(name) => {
                let schema = self.object(entries, path, Some(&name));
                self.defs.insert(name.clone(), schema);
                name
            }
        };
        json!({ "$ref": super::definition_ref(&name) })
    }

    fn object(
        &mut self,
        entries: &IndexMap<String, Variable>,
        path: &[String],
        title: Option<&str>,
    ) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for (name, var) in self.ordered(entries) {
            let mut property = self.shape(var, &extend(path, name));
            if let Value::Object(map) = &mut property
                && !map.contains_key("$ref")
            {
                map.insert("title".to_string(), Value::String(to_title_case(name)));
            }
            properties.insert(name.clone(), property);

            if self.mode == SchemaMode::Output || var.is_required() {
                required.push(Value::String(name.clone()));
            }
        }

        let mut schema = Map::new();
        schema.insert("type".to_string(), json!("object"));
        if let Some(title) = title {
            schema.insert("title".to_string(), json!(title));
        }
        schema.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".to_string(), Value::Array(required));
        }
        Value::Object(schema)
    }

    fn ordered<'e>(&self, entries: &'e IndexMap<String, Variable>) -> Vec<(&'e String, &'e Variable)> {
        let mut ordered: Vec<_> = entries.iter().collect();
        match self.config.property_order {
            PropertyOrder::Alphabetical => ordered.sort_by(|a, b| a.0.cmp(b.0)),
            PropertyOrder::FirstSeen => ordered.sort_by(|a, b| {
                let first = |v: &Variable| (v.meta.order_nr.unwrap_or(u32::MAX), v.meta.linenos.first().copied());
                first(a.1).cmp(&first(b.1)).then_with(|| a.0.cmp(b.0))
            }),
        }
        ordered
    }
}

fn extend(path: &[String], segment: &str) -> Vec<String> {
    let mut path = path.to_vec();
    path.push(segment.to_string());
    path
}
