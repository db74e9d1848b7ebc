//! Loaded tracer library.

use std::ffi::c_uint;
use std::fmt;
use std::path::{Path, PathBuf};

use libloading::os::unix::{Library, RTLD_GLOBAL, RTLD_NOW};
use tracing::debug;

use crate::{ExtraeApi, LoadError};

/// A loaded tracer library together with its resolved entry points.
///
/// Dropping the runtime unloads the library handle; the tracer itself is
/// process-global and may stay mapped if something else holds it.
pub struct Runtime {
    _lib: Library,
    api: ExtraeApi,
    path: PathBuf,
}

impl Runtime {
    /// Load the tracer library at `path`.
    ///
    /// The library is opened with `RTLD_GLOBAL` so the wrappers it installs
    /// for MPI and OpenMP can be resolved by the rest of the process. A bare
    /// file name such as `libseqtrace.so` goes through the dynamic loader's
    /// search path (`LD_LIBRARY_PATH`, ld cache).
    ///
    /// # Errors
    ///
    /// `LibraryNotFound` if a path with a directory part does not exist,
    /// `Load` if the loader refuses the file, `SymbolNotFound` if a required
    /// entry point is missing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        if has_directory(path) && !path.exists() {
            return Err(LoadError::LibraryNotFound(path.display().to_string()));
        }

        debug!(path = %path.display(), "loading tracer library");
        // SAFETY: loading runs the tracer's constructors. The tracer does not
        // start recording until `Extrae_init` (or an interposed MPI_Init).
        let lib = unsafe { Library::open(Some(path), RTLD_NOW | RTLD_GLOBAL)? };
        // SAFETY: the library was requested as an Extrae tracing library.
        let api = unsafe { ExtraeApi::load(&lib)? };

        Ok(Self {
            _lib: lib,
            api,
            path: path.to_path_buf(),
        })
    }

    /// Resolved entry points.
    #[must_use]
    pub const fn api(&self) -> &ExtraeApi {
        &self.api
    }

    /// Path the library was loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Query `(major, minor, revision)`, all zero on an unversioned build.
    #[must_use]
    pub fn version(&self) -> (u32, u32, u32) {
        let Some(get_version) = self.api.get_version else {
            return (0, 0, 0);
        };
        let (mut major, mut minor, mut revision): (c_uint, c_uint, c_uint) = (0, 0, 0);
        // SAFETY: the three out-pointers are valid for writes for the call.
        unsafe { get_version(&raw mut major, &raw mut minor, &raw mut revision) };
        (major, minor, revision)
    }
}

/// Whether `path` names a file directly instead of asking the loader to search.
fn has_directory(path: &Path) -> bool {
    path.parent().is_some_and(|parent| !parent.as_os_str().is_empty())
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime").field("path", &self.path).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_library() {
        let err = Runtime::open("/nonexistent/libseqtrace.so").unwrap_err();
        assert!(matches!(err, LoadError::LibraryNotFound(_)));
        assert!(err.to_string().contains("libseqtrace.so"));
    }

    #[test]
    fn test_bare_name_goes_to_loader() {
        assert!(!has_directory(Path::new("libseqtrace.so")));
        assert!(has_directory(Path::new("./libseqtrace.so")));
        assert!(has_directory(Path::new("/opt/extrae/lib/libseqtrace.so")));

        // Not found by the loader rather than by the existence check.
        let err = Runtime::open("libextrae-sys-no-such-tracer.so").unwrap_err();
        assert!(matches!(err, LoadError::Load(_)));
    }

    #[test]
    fn test_non_library_file_fails_to_load() {
        let dir = std::env::temp_dir().join(format!("extrae-sys-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("libbogus.so");
        std::fs::write(&path, b"not an elf").unwrap();

        let err = Runtime::open(&path).unwrap_err();
        assert!(matches!(err, LoadError::Load(_)));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
