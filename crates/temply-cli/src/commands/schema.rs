use std::path::PathBuf;

use temply_compiler::InferConfig;
use temply_core::SchemaConfig;

use super::{open_target, print_json};

pub struct SchemaArgs {
    pub path: PathBuf,
    pub template: Option<String>,
    pub infer: InferConfig,
    pub schema: SchemaConfig,
    pub compact: bool,
    pub color: bool,
}

pub fn run(args: SchemaArgs) {
    let target = open_target(&args.path, args.infer.clone());

    match target.schema(args.template.as_deref(), &args.schema) {
        Ok(schema) => print_json(&schema, args.compact),
        Err(err) => {
            target.report(None, &err, args.color);
            std::process::exit(1);
        }
    }
}
