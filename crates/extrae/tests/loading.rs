//! Library resolution and load failures. These never need a real tracer.

use std::fs;

use extrae::sys::LoadError;
use extrae::{Error, Flavor, Tracer, TracerConfig};
use tempfile::TempDir;

#[test]
fn test_missing_library_in_home() {
    let home = TempDir::new().unwrap();
    let config = TracerConfig::with_home(home.path(), Flavor::Omp);
    assert_eq!(
        config.library_path(),
        home.path().join("lib").join("libomptrace.so")
    );

    let err = Tracer::open(&config).unwrap_err();
    assert!(matches!(err, Error::Load(LoadError::LibraryNotFound(_))));
    assert!(!err.is_validation());
}

#[test]
fn test_file_that_is_not_a_library() {
    let home = TempDir::new().unwrap();
    fs::create_dir_all(home.path().join("lib")).unwrap();
    fs::write(home.path().join("lib").join("libseqtrace.so"), b"\x7fELF garbage").unwrap();

    let config = TracerConfig::with_home(home.path(), Flavor::Seq);
    let err = Tracer::open(&config).unwrap_err();
    assert!(matches!(err, Error::Load(LoadError::Load(_))));
}

#[test]
fn test_library_without_tracer_symbols() {
    // Any shared object that is not the tracer must be refused at load time.
    let Some(libc) = ["/lib/x86_64-linux-gnu/libc.so.6", "/usr/lib64/libc.so.6", "/lib64/libc.so.6"]
        .into_iter()
        .find(|p| std::path::Path::new(p).exists())
    else {
        eprintln!("Skipping test: no libc found at a known path");
        return;
    };

    let err = Tracer::open(&TracerConfig::with_library(libc)).unwrap_err();
    assert!(
        matches!(&err, Error::Load(LoadError::SymbolNotFound(name, _)) if name == "Extrae_init"),
        "unexpected error: {err}"
    );
}
