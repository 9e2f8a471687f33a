use std::fmt::Write;
use std::path::PathBuf;

use temply_compiler::workspace::partial_import_line;
use temply_compiler::{Result, Workspace};

use super::open_workspace;

pub struct DepsArgs {
    pub root: PathBuf,
    pub imports: bool,
}

pub fn run(args: DepsArgs) {
    let workspace = open_workspace(&args.root);
    let rendered = if args.imports {
        workspace.partial_names().map(|names| render_imports(&names))
    } else {
        render(&workspace)
    };
    match rendered {
        Ok(text) => print!("{text}"),
        Err(err) => {
            eprintln!("{}", err.printer().render());
            std::process::exit(1);
        }
    }
}

/// Each partial followed by the partials it imports, indented.
pub fn render(workspace: &Workspace) -> Result<String> {
    let mut out = String::new();
    for (partial, imports) in workspace.partial_dependencies()? {
        writeln!(out, "{partial}").expect("String write never fails");
        for import in imports {
            writeln!(out, "  {import}").expect("String write never fails");
        }
    }
    Ok(out)
}

pub fn render_imports(partials: &[String]) -> String {
    partials
        .iter()
        .map(|partial| partial_import_line(partial) + "\n")
        .collect()
}
