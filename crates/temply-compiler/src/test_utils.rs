//! Test helpers: infer inline templates and render what they require.

use temply_core::{Colors, Variable, dump};

use crate::{Engine, Error, Inference, MemoryLoader};

/// Engine serving the given `(name, source)` templates.
pub fn engine(templates: &[(&str, &str)]) -> Engine {
    let mut loader = MemoryLoader::new();
    for (name, source) in templates {
        loader.insert(*name, *source);
    }
    Engine::new(loader)
}

/// Inference for `source`; panics on errors.
pub fn infer(source: &str) -> Inference {
    Engine::new(MemoryLoader::new())
        .infer_source(source)
        .unwrap_or_else(|err| panic!("inference failed: {err}"))
}

pub fn requirements(source: &str) -> Variable {
    infer(source).requirements
}

/// Requirements of `source` as a dump tree.
pub fn infer_tree(source: &str) -> String {
    dump(&requirements(source), Colors::OFF)
}

/// Requirements of a named template served by `engine` as a dump tree.
pub fn infer_named(engine: &Engine, name: &str) -> String {
    let inference = engine
        .infer(name)
        .unwrap_or_else(|err| panic!("inference of {name} failed: {err}"));
    dump(&inference.requirements, Colors::OFF)
}

/// The error inference of `source` fails with; panics if it succeeds.
pub fn infer_error(source: &str) -> Error {
    match Engine::new(MemoryLoader::new()).infer_source(source) {
        Ok(inference) => panic!(
            "expected an error, inferred:\n{}",
            dump(&inference.requirements, Colors::OFF)
        ),
        Err(err) => err,
    }
}
