//! Where the tracer library lives and how strictly the lifecycle is checked.

use std::env;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::ConfigError;

/// Installation prefix of the tracer.
pub const HOME_VAR: &str = "EXTRAE_HOME";
/// XML configuration read by the tracer at init.
pub const CONFIG_FILE_VAR: &str = "EXTRAE_CONFIG_FILE";

/// Tracer build to load. Each flavor is a separate shared library that
/// intercepts a different parallel runtime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Flavor {
    /// Sequential programs.
    #[default]
    Seq,
    Mpi,
    Omp,
    Pthread,
    OmpMpi,
    PthreadMpi,
}

impl Flavor {
    pub const ALL: [Self; 6] = [
        Self::Seq,
        Self::Mpi,
        Self::Omp,
        Self::Pthread,
        Self::OmpMpi,
        Self::PthreadMpi,
    ];

    #[must_use]
    pub const fn library_name(self) -> &'static str {
        match self {
            Self::Seq => "libseqtrace.so",
            Self::Mpi => "libmpitrace.so",
            Self::Omp => "libomptrace.so",
            Self::Pthread => "libpttrace.so",
            Self::OmpMpi => "libompitrace.so",
            Self::PthreadMpi => "libptmpitrace.so",
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Seq => "seq",
            Self::Mpi => "mpi",
            Self::Omp => "omp",
            Self::Pthread => "pthread",
            Self::OmpMpi => "omp-mpi",
            Self::PthreadMpi => "pthread-mpi",
        }
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Flavor {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|f| f.name() == normalized)
            .ok_or_else(|| ConfigError::UnknownFlavor(s.to_string()))
    }
}

/// How the library path is determined.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LibrarySource {
    /// Exact path to a tracer shared library.
    Path(PathBuf),
    /// `<home>/lib/<flavor library>`.
    Home { home: PathBuf, flavor: Flavor },
}

/// Behavior of `finish` once the tracer is already finalized.
///
/// `init` after `finish` fails regardless.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Strictness {
    /// Repeated `finish` is a logged no-op.
    #[default]
    Lenient,
    /// Repeated `finish` fails with `AlreadyFinalized`.
    Strict,
}

/// Tracer configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TracerConfig {
    pub library: LibrarySource,
    /// XML configuration exported through `EXTRAE_CONFIG_FILE`.
    pub config_file: Option<PathBuf>,
    pub strictness: Strictness,
}

impl TracerConfig {
    /// Load the library at `path`.
    #[must_use]
    pub fn with_library(path: impl Into<PathBuf>) -> Self {
        Self {
            library: LibrarySource::Path(path.into()),
            config_file: None,
            strictness: Strictness::default(),
        }
    }

    /// Load `flavor` from an installation prefix.
    #[must_use]
    pub fn with_home(home: impl Into<PathBuf>, flavor: Flavor) -> Self {
        Self {
            library: LibrarySource::Home {
                home: home.into(),
                flavor,
            },
            config_file: None,
            strictness: Strictness::default(),
        }
    }

    /// Build from `EXTRAE_HOME` and `EXTRAE_CONFIG_FILE`.
    ///
    /// # Errors
    ///
    /// `ConfigError::MissingHome` if `EXTRAE_HOME` is unset or empty.
    pub fn from_env(flavor: Flavor) -> Result<Self, ConfigError> {
        Self::from_vars(env::var_os(HOME_VAR), env::var_os(CONFIG_FILE_VAR), flavor)
    }

    fn from_vars(
        home: Option<OsString>,
        config_file: Option<OsString>,
        flavor: Flavor,
    ) -> Result<Self, ConfigError> {
        let home = home
            .filter(|h| !h.is_empty())
            .ok_or(ConfigError::MissingHome)?;
        let mut config = Self::with_home(home, flavor);
        config.config_file = config_file.filter(|c| !c.is_empty()).map(PathBuf::from);
        Ok(config)
    }

    #[must_use]
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    #[must_use]
    pub fn strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    /// Resolved path of the shared library.
    #[must_use]
    pub fn library_path(&self) -> PathBuf {
        match &self.library {
            LibrarySource::Path(path) => path.clone(),
            LibrarySource::Home { home, flavor } => library_in_home(home, *flavor),
        }
    }

    /// Export `EXTRAE_CONFIG_FILE` for the tracer to pick up at init.
    ///
    /// # Safety
    ///
    /// Mutates the process environment. Must be called before any other
    /// thread that may read the environment is started.
    pub unsafe fn export_environment(&self) {
        if let Some(path) = &self.config_file {
            // SAFETY: forwarded to the caller.
            unsafe { env::set_var(CONFIG_FILE_VAR, path) };
        }
    }
}

fn library_in_home(home: &Path, flavor: Flavor) -> PathBuf {
    home.join("lib").join(flavor.library_name())
}
