use std::path::PathBuf;

use temply_compiler::InferConfig;
use temply_compiler::workspace::{LAYOUTS_DIR, PARTIALS_DIR};
use temply_core::{Colors, Variable, dump};

use super::open_target;
use super::target::{CommandError, Result, Target};

pub struct CheckArgs {
    pub path: PathBuf,
    pub template: Option<String>,
    pub infer: InferConfig,
    pub tree: bool,
    pub color: bool,
}

/// Result of checking one template, layout or partial.
pub struct Outcome {
    pub name: String,
    /// Requirements of inferred templates; layouts and partials are only parsed.
    pub result: Result<Option<Variable>>,
}

pub fn run(args: CheckArgs) {
    let target = open_target(&args.path, args.infer.clone());
    let outcomes = check(&target, args.template.as_deref()).unwrap_or_else(|err| {
        target.report(None, &err, args.color);
        std::process::exit(1);
    });

    let colors = Colors::new(args.color);
    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(Some(requirements)) if args.tree => {
                println!("{}", render_tree(&outcome.name, requirements, colors));
            }
            Ok(_) => {}
            Err(err) => {
                failed += 1;
                target.report(Some(&outcome.name), err, args.color);
            }
        }
    }

    if failed > 0 {
        eprintln!("error: {failed} of {} failed", outcomes.len());
        std::process::exit(1);
    }
    // Silent on success (like cargo check)
}

/// Checks the given template, every template of a workspace, or the file.
/// Checking a whole workspace also parses its layouts and partials.
pub fn check(target: &Target, template: Option<&str>) -> Result<Vec<Outcome>> {
    let workspace = match (target, template) {
        (Target::Workspace(workspace), None) => workspace,
        (Target::File { name, .. }, None) => {
            return Ok(vec![Outcome {
                name: name.clone(),
                result: target.requirements(None).map(Some),
            }]);
        }
        (_, Some(template)) => {
            return Ok(vec![Outcome {
                name: template.to_string(),
                result: target.requirements(Some(template)).map(Some),
            }]);
        }
    };

    let mut outcomes = Vec::new();
    for template in workspace.template_names()? {
        let result = target.requirements(Some(&template)).map(Some);
        outcomes.push(Outcome {
            name: template,
            result,
        });
    }

    let parsed = [
        (LAYOUTS_DIR, workspace.layout_names()?),
        (PARTIALS_DIR, workspace.partial_names()?),
    ];
    for (dir, names) in parsed {
        for name in names {
            let name = format!("{dir}/{name}");
            let result = workspace
                .engine()
                .template(&name)
                .map(|_| None)
                .map_err(CommandError::from);
            outcomes.push(Outcome { name, result });
        }
    }
    tracing::info!(checked = outcomes.len(), "checked workspace");
    Ok(outcomes)
}

pub fn render_tree(name: &str, requirements: &Variable, colors: Colors) -> String {
    let tree = dump(requirements, colors);
    let mut out = format!("{name}:");
    for line in tree.lines() {
        out.push_str("\n  ");
        out.push_str(line);
    }
    out
}
