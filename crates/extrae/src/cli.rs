//! CLI definitions and argument types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use extrae::{Flavor, Strictness, TracerConfig};

/// Exit code for success.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for failure.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Parser)]
#[command(name = "extrae-probe")]
#[command(about = "Inspect and smoke-test an Extrae tracer installation")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (sets RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output (only show errors)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub silent: bool,

    #[command(flatten)]
    pub library: LibraryArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the tracer version
    Version,
    /// Report whether the tracer is initialized and by what
    Status,
    /// Run init, one enter/leave event pair, flush and finish
    Smoke {
        /// Event type to emit
        #[arg(long, default_value = "1000")]
        event_type: u32,

        /// Options to set after init, e.g. "caller,hwc"
        #[arg(long)]
        options: Option<String>,

        /// Sample hardware counters with each event
        #[arg(long)]
        counters: bool,

        /// Fail on repeated finish instead of ignoring it
        #[arg(long)]
        strict: bool,
    },
    /// Validate option names and print the combined mask
    Options {
        /// Option names separated by ',' or '|'
        #[arg(value_name = "NAMES")]
        names: String,
    },
}

/// Where to find the tracer library.
#[derive(Args)]
pub struct LibraryArgs {
    /// Path to the tracer shared library
    #[arg(long, global = true, value_name = "PATH")]
    pub lib: Option<PathBuf>,

    /// Installation prefix (defaults to $EXTRAE_HOME)
    #[arg(long, global = true, value_name = "DIR", conflicts_with = "lib")]
    pub home: Option<PathBuf>,

    /// Tracer flavor to load from the installation prefix
    #[arg(long, global = true, value_enum, default_value = "seq")]
    pub flavor: FlavorArg,

    /// XML configuration exported as EXTRAE_CONFIG_FILE
    #[arg(long, global = true, value_name = "FILE")]
    pub config_file: Option<PathBuf>,
}

impl LibraryArgs {
    /// Build a tracer configuration, falling back to the environment.
    pub fn to_config(&self, strict: bool) -> Result<TracerConfig, extrae::ConfigError> {
        let mut config = match (&self.lib, &self.home) {
            (Some(path), _) => TracerConfig::with_library(path),
            (None, Some(home)) => TracerConfig::with_home(home, self.flavor.into()),
            (None, None) => TracerConfig::from_env(self.flavor.into())?,
        };
        if let Some(path) = &self.config_file {
            config = config.config_file(path);
        }
        if strict {
            config = config.strictness(Strictness::Strict);
        }
        Ok(config)
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FlavorArg {
    Seq,
    Mpi,
    Omp,
    Pthread,
    OmpMpi,
    PthreadMpi,
}

impl From<FlavorArg> for Flavor {
    fn from(arg: FlavorArg) -> Self {
        match arg {
            FlavorArg::Seq => Self::Seq,
            FlavorArg::Mpi => Self::Mpi,
            FlavorArg::Omp => Self::Omp,
            FlavorArg::Pthread => Self::Pthread,
            FlavorArg::OmpMpi => Self::OmpMpi,
            FlavorArg::PthreadMpi => Self::PthreadMpi,
        }
    }
}
