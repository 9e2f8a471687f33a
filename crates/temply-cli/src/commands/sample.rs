use temply_core::SampleConfig;

use super::schema::SchemaArgs;
use super::{open_target, print_json};

pub struct SampleArgs {
    pub schema: SchemaArgs,
    pub sample: SampleConfig,
}

pub fn run(args: SampleArgs) {
    let SampleArgs { schema: args, sample } = args;
    let target = open_target(&args.path, args.infer.clone());

    match target.sample(args.template.as_deref(), &args.schema, &sample) {
        Ok(payload) => print_json(&payload, args.compact),
        Err(err) => {
            target.report(None, &err, args.color);
            std::process::exit(1);
        }
    }
}
