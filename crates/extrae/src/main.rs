//! extrae-probe - inspect and smoke-test a tracer installation

mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;

fn main() {
    let cli = Cli::parse();

    extrae::metrics::init();

    let default_level = if cli.verbose {
        "extrae=debug"
    } else if cli.silent {
        "extrae=error"
    } else {
        "extrae=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(default_level.parse().unwrap()),
        )
        .with_target(false)
        .init();

    let exit_code = commands::run_command(&cli);
    std::process::exit(exit_code);
}
