//! Dispatch logic: extract params from ArgMatches and convert to command args.
//!
//! `*Params` structs hold what clap parsed; their `Into<*Args>` impls map
//! the flags onto the library's config builders.

use std::path::PathBuf;

use clap::ArgMatches;
use temply_compiler::InferConfig;
use temply_core::{PropertyOrder, SampleConfig, SchemaConfig, SchemaMode};

use super::ColorChoice;
use crate::commands::check::CheckArgs;
use crate::commands::deps::DepsArgs;
use crate::commands::list::ListArgs;
use crate::commands::sample::SampleArgs;
use crate::commands::schema::SchemaArgs;

pub struct SchemaParams {
    pub path: PathBuf,
    pub template: Option<String>,
    pub mode: SchemaMode,
    pub tag_modes: bool,
    pub title: Option<String>,
    pub order: PropertyOrder,
    pub string_filters: Vec<String>,
    pub compact: bool,
    pub color: ColorChoice,
}

impl SchemaParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            path: parse_path(m),
            template: m.get_one::<String>("template").cloned(),
            mode: parse_mode(m),
            tag_modes: m.get_flag("tag_modes"),
            title: m.get_one::<String>("title").cloned(),
            order: parse_order(m),
            string_filters: parse_string_filters(m),
            compact: m.get_flag("compact"),
            color: parse_color(m),
        }
    }

    fn schema_config(&self) -> SchemaConfig {
        let config = SchemaConfig::new()
            .mode(self.mode)
            .tag_modes(self.tag_modes)
            .property_order(self.order);
        match &self.title {
            Some(title) => config.title(title.as_str()),
            None => config,
        }
    }
}

impl From<SchemaParams> for SchemaArgs {
    fn from(p: SchemaParams) -> Self {
        Self {
            schema: p.schema_config(),
            infer: InferConfig::new().string_filters(p.string_filters),
            path: p.path,
            template: p.template,
            compact: p.compact,
            color: p.color.should_colorize(),
        }
    }
}

pub struct SampleParams {
    pub schema: SchemaParams,
    pub seed: u64,
    pub array_len: usize,
}

impl SampleParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            schema: SchemaParams::from_matches(m),
            seed: m.get_one::<u64>("seed").copied().unwrap_or_default(),
            array_len: m.get_one::<usize>("array_len").copied().unwrap_or(2),
        }
    }
}

impl From<SampleParams> for SampleArgs {
    fn from(p: SampleParams) -> Self {
        Self {
            sample: SampleConfig::new().seed(p.seed).array_len(p.array_len),
            schema: p.schema.into(),
        }
    }
}

pub struct CheckParams {
    pub path: PathBuf,
    pub template: Option<String>,
    pub string_filters: Vec<String>,
    pub tree: bool,
    pub color: ColorChoice,
}

impl CheckParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            path: parse_path(m),
            template: m.get_one::<String>("template").cloned(),
            string_filters: parse_string_filters(m),
            tree: m.get_flag("tree"),
            color: parse_color(m),
        }
    }
}

impl From<CheckParams> for CheckArgs {
    fn from(p: CheckParams) -> Self {
        Self {
            path: p.path,
            template: p.template,
            infer: InferConfig::new().string_filters(p.string_filters),
            tree: p.tree,
            color: p.color.should_colorize(),
        }
    }
}

pub struct ListParams {
    pub root: PathBuf,
}

impl ListParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            root: parse_path(m),
        }
    }
}

impl From<ListParams> for ListArgs {
    fn from(p: ListParams) -> Self {
        Self { root: p.root }
    }
}

pub struct DepsParams {
    pub root: PathBuf,
    pub imports: bool,
}

impl DepsParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            root: parse_path(m),
            imports: m.get_flag("imports"),
        }
    }
}

impl From<DepsParams> for DepsArgs {
    fn from(p: DepsParams) -> Self {
        Self {
            root: p.root,
            imports: p.imports,
        }
    }
}

fn parse_path(m: &ArgMatches) -> PathBuf {
    m.get_one::<PathBuf>("path")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."))
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

fn parse_mode(m: &ArgMatches) -> SchemaMode {
    match m.get_one::<String>("mode").map(|s| s.as_str()) {
        Some("output") => SchemaMode::Output,
        _ => SchemaMode::Input,
    }
}

fn parse_order(m: &ArgMatches) -> PropertyOrder {
    match m.get_one::<String>("order").map(|s| s.as_str()) {
        Some("first-seen") => PropertyOrder::FirstSeen,
        _ => PropertyOrder::Alphabetical,
    }
}

fn parse_string_filters(m: &ArgMatches) -> Vec<String> {
    m.get_many::<String>("string_filter")
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}
