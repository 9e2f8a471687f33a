mod cli;
mod commands;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use cli::{CheckParams, DepsParams, ListParams, SampleParams, SchemaParams, build_cli};

const LOG_ENV: &str = "TEMPLY_LOG";

fn main() {
    let matches = build_cli().get_matches();
    // `-v` is global, so subcommand matches see it wherever it was given.
    init_tracing(matches.subcommand().map_or(0, |(_, m)| m.get_count("verbose")));

    match matches.subcommand() {
        Some(("schema", m)) => {
            let params = SchemaParams::from_matches(m);
            commands::schema::run(params.into());
        }
        Some(("sample", m)) => {
            let params = SampleParams::from_matches(m);
            commands::sample::run(params.into());
        }
        Some(("check", m)) => {
            let params = CheckParams::from_matches(m);
            commands::check::run(params.into());
        }
        Some(("list", m)) => {
            let params = ListParams::from_matches(m);
            commands::list::run(params.into());
        }
        Some(("deps", m)) => {
            let params = DepsParams::from_matches(m);
            commands::deps::run(params.into());
        }
        _ => unreachable!("clap should have caught this"),
    }
}

/// `-v` flags win over `TEMPLY_LOG`; without either only warnings show.
fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .init();
}
