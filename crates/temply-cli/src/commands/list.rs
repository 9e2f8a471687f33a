use std::fmt::Write;
use std::path::PathBuf;

use temply_compiler::workspace::{LAYOUTS_DIR, PARTIALS_DIR, TEMPLATES_DIR};
use temply_compiler::{Metadata, Result, Workspace};

use super::open_workspace;

pub struct ListArgs {
    pub root: PathBuf,
}

pub fn run(args: ListArgs) {
    let workspace = open_workspace(&args.root);
    match render(&workspace) {
        Ok(listing) => print!("{listing}"),
        Err(err) => {
            eprintln!("{}", err.printer().render());
            std::process::exit(1);
        }
    }
}

/// Templates with their components, then layouts and partials. Components
/// with a metadata description show it after their name.
pub fn render(workspace: &Workspace) -> Result<String> {
    let mut out = String::new();

    writeln!(out, "{TEMPLATES_DIR}").expect("String write never fails");
    for template in workspace.template_names()? {
        writeln!(out, "  {template}").expect("String write never fails");
        for component in workspace.component_names(&template)? {
            let path = workspace.component_path(&template, &component)?;
            let meta = Metadata::parse(&workspace.engine().source(&path)?);
            let line = match meta.description {
                Some(description) => format!("{component}  {description}"),
                None => component,
            };
            writeln!(out, "    {line}").expect("String write never fails");
        }
    }

    for (dir, names) in [
        (LAYOUTS_DIR, workspace.layout_names()?),
        (PARTIALS_DIR, workspace.partial_names()?),
    ] {
        writeln!(out, "{dir}").expect("String write never fails");
        for name in names {
            writeln!(out, "  {name}").expect("String write never fails");
        }
    }
    Ok(out)
}
