//! Command implementations.

use extrae::{Counters, Options, Tracer, TracerConfig};
use tracing::{error, info};

use crate::cli::{Cli, Commands, EXIT_FAILURE, EXIT_SUCCESS};

/// Dispatch CLI command to the appropriate handler.
pub fn run_command(cli: &Cli) -> i32 {
    match &cli.command {
        Commands::Options { names } => cmd_options(names),
        Commands::Version => with_tracer(cli, false, |tracer| {
            println!("{}", tracer.version());
            EXIT_SUCCESS
        }),
        Commands::Status => with_tracer(cli, false, |tracer| {
            let (initialized, mechanism) = tracer.is_initialized();
            println!("initialized: {initialized}");
            println!("mechanism:   {mechanism}");
            EXIT_SUCCESS
        }),
        Commands::Smoke {
            event_type,
            options,
            counters,
            strict,
        } => {
            let counters = if *counters {
                Counters::Sample
            } else {
                Counters::Skip
            };
            with_tracer(cli, *strict, |tracer| {
                cmd_smoke(tracer, *event_type, options.as_deref(), counters)
            })
        }
    }
}

fn load_config(cli: &Cli, strict: bool) -> Option<TracerConfig> {
    match cli.library.to_config(strict) {
        Ok(config) => Some(config),
        Err(e) => {
            error!(error = %e, "invalid tracer configuration");
            None
        }
    }
}

fn with_tracer(cli: &Cli, strict: bool, f: impl FnOnce(&Tracer) -> i32) -> i32 {
    let Some(config) = load_config(cli, strict) else {
        return EXIT_FAILURE;
    };
    // SAFETY: called from main before any other thread is spawned.
    unsafe { config.export_environment() };

    match Tracer::open(&config) {
        Ok(tracer) => f(&tracer),
        Err(e) => {
            error!(error = %e, path = %config.library_path().display(), "failed to load tracer");
            EXIT_FAILURE
        }
    }
}

fn cmd_options(names: &str) -> i32 {
    match Options::parse_list(names) {
        Ok(options) => {
            println!("{options} = {:#x}", options.bits());
            EXIT_SUCCESS
        }
        Err(e) => {
            error!(error = %e, "invalid options");
            EXIT_FAILURE
        }
    }
}

fn cmd_smoke(tracer: &Tracer, event_type: u32, options: Option<&str>, counters: Counters) -> i32 {
    match run_smoke(tracer, event_type, options, counters) {
        Ok(()) => {
            info!(event_type, version = %tracer.version(), "smoke run completed");
            EXIT_SUCCESS
        }
        Err(e) => {
            error!(error = %e, validation = e.is_validation(), "smoke run failed");
            EXIT_FAILURE
        }
    }
}

fn run_smoke(
    tracer: &Tracer,
    event_type: u32,
    options: Option<&str>,
    counters: Counters,
) -> extrae::Result<()> {
    tracer.init()?;
    if let Some(names) = options {
        tracer.set_options(Options::parse_list(names)?)?;
    }
    tracer.emit_event(event_type, 1, counters)?;
    tracer.emit_event(event_type, 0, counters)?;
    tracer.flush()?;
    let (initialized, mechanism) = tracer.is_initialized();
    info!(initialized, %mechanism, "tracer state before finish");
    tracer.finish()
}
