//! Command builders for the CLI.

use clap::Command;

use super::args::*;

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("temply")
        .about("Infer JSON schemas from notification templates")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(verbose_arg())
        .subcommand(schema_command())
        .subcommand(sample_command())
        .subcommand(check_command())
        .subcommand(list_command())
        .subcommand(deps_command())
}

/// Add the flags shared by commands that emit schemas.
fn with_schema_args(cmd: Command) -> Command {
    cmd.arg(mode_arg())
        .arg(tag_modes_arg())
        .arg(title_arg())
        .arg(order_arg())
        .arg(string_filter_arg())
        .arg(compact_arg())
        .arg(color_arg())
}

/// Emit the JSON schema of a template.
pub fn schema_command() -> Command {
    let cmd = Command::new("schema")
        .about("Emit the JSON schema a template's payload must satisfy")
        .override_usage(
            "\
  temply schema <ROOT> <TEMPLATE>
  temply schema <FILE>",
        )
        .after_help(
            r#"EXAMPLES:
  temply schema . order                  # all components of templates/order
  temply schema welcome.html             # a single template file
  temply schema . order --mode output    # every key required
  temply schema . order --string-filter slugify,money"#,
        )
        .arg(path_arg())
        .arg(template_arg());

    with_schema_args(cmd)
}

/// Generate an example payload for a template.
pub fn sample_command() -> Command {
    let cmd = Command::new("sample")
        .about("Generate an example payload for a template")
        .override_usage(
            "\
  temply sample <ROOT> <TEMPLATE>
  temply sample <FILE>",
        )
        .after_help(
            r#"EXAMPLES:
  temply sample . order                  # deterministic sample
  temply sample . order --seed 7         # different values
  temply sample welcome.html --array-len 3"#,
        )
        .arg(path_arg())
        .arg(template_arg())
        .arg(seed_arg())
        .arg(array_len_arg());

    with_schema_args(cmd)
}

/// Infer every template and report errors.
pub fn check_command() -> Command {
    Command::new("check")
        .about("Infer every template and report errors")
        .override_usage(
            "\
  temply check <ROOT> [TEMPLATE]
  temply check <FILE>",
        )
        .after_help(
            r#"EXAMPLES:
  temply check .                         # whole workspace
  temply check . order --tree            # one template, print requirements
  temply check welcome.html"#,
        )
        .arg(path_arg())
        .arg(template_arg())
        .arg(string_filter_arg())
        .arg(tree_arg())
        .arg(color_arg())
}

/// List templates, layouts and partials.
pub fn list_command() -> Command {
    Command::new("list")
        .about("List templates, layouts and partials of a workspace")
        .arg(root_arg())
}

/// Show which partials import which.
pub fn deps_command() -> Command {
    Command::new("deps")
        .about("Show the partials each partial imports")
        .after_help(
            r#"EXAMPLES:
  temply deps                            # dependency tree of partials/
  temply deps --imports                  # import statements to paste into components"#,
        )
        .arg(root_arg())
        .arg(imports_arg())
}
