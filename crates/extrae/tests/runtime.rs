//! Runtime backend against a stand-in tracer compiled from C.
//!
//! The stand-in logs every call it receives, so these tests see exactly what
//! crossed the C boundary: counts, array contents, pointers and strings.

use std::ffi::{CStr, c_char};
use std::path::{Path, PathBuf};
use std::process::Command;

use extrae::{
    Counters, Error, EventBatch, InitMechanism, Options, Tracer, TracerConfig, Version,
};
use libloading::{Library, Symbol};
use tempfile::TempDir;

const FAKE_TRACER_SRC: &str = include_str!("support/fake_tracer.c");

/// Compile the stand-in tracer into a fresh directory.
///
/// Every test gets its own copy so the loaded images, and their logs, are
/// independent.
fn build_fake_tracer() -> Option<(TempDir, PathBuf)> {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("fake_tracer.c");
    let lib = dir.path().join("libfaketrace.so");
    std::fs::write(&src, FAKE_TRACER_SRC).unwrap();

    let status = Command::new("cc")
        .args(["-shared", "-fPIC", "-O0", "-o"])
        .arg(&lib)
        .arg(&src)
        .status();
    match status {
        Ok(s) if s.success() => Some((dir, lib)),
        Ok(s) => {
            eprintln!("Skipping test: cc failed with {s}");
            None
        }
        Err(e) => {
            eprintln!("Skipping test: cc not available ({e})");
            None
        }
    }
}

/// Reads the call log kept by a loaded stand-in tracer.
struct CallLog {
    lib: Library,
}

impl CallLog {
    fn open(path: &Path) -> Self {
        // SAFETY: the stand-in tracer has no constructors.
        let lib = unsafe { Library::new(path) }.unwrap();
        Self { lib }
    }

    fn lines(&self) -> Vec<String> {
        // SAFETY: `fake_trace_log` returns a pointer to a NUL-terminated
        // static buffer.
        let text = unsafe {
            let log: Symbol<unsafe extern "C" fn() -> *const c_char> =
                self.lib.get(b"fake_trace_log\0").unwrap();
            CStr::from_ptr(log()).to_string_lossy().into_owned()
        };
        text.lines().map(str::to_string).collect()
    }
}

fn open(lib: &Path) -> (Tracer, CallLog) {
    let tracer = Tracer::open(&TracerConfig::with_library(lib)).unwrap();
    (tracer, CallLog::open(lib))
}

#[test]
fn test_lifecycle_and_version() {
    let Some((_dir, lib)) = build_fake_tracer() else {
        return;
    };
    let (t, log) = open(&lib);

    assert_eq!(t.version(), Version::new(3, 8, 1));
    assert_eq!(t.is_initialized(), (false, InitMechanism::NotInitialized));
    t.init().unwrap();
    assert_eq!(t.is_initialized(), (true, InitMechanism::ExtraeInit));
    t.emit_event(1000, 1, Counters::Skip).unwrap();
    t.emit_event(1000, 0, Counters::Skip).unwrap();
    t.flush().unwrap();
    t.finish().unwrap();
    assert!(!t.is_initialized().0);

    assert_eq!(
        log.lines(),
        ["init", "event 1000:1", "event 1000:0", "flush", "fini"]
    );
}

#[test]
fn test_events_cross_as_aligned_arrays() {
    let Some((_dir, lib)) = build_fake_tracer() else {
        return;
    };
    let (t, log) = open(&lib);
    t.init().unwrap();

    let batch: EventBatch = [(1u32, 10u64), (2, 20), (3, 30)].into_iter().collect();
    t.emit_event_batch(&batch, Counters::Skip).unwrap();
    t.emit_event_batch(&batch, Counters::Sample).unwrap();
    t.emit_event(u32::MAX, u64::MAX, Counters::Sample).unwrap();
    assert!(matches!(
        t.emit_event_batch(&EventBatch::new(), Counters::Skip),
        Err(Error::EmptyBatch)
    ));

    assert_eq!(
        log.lines(),
        [
            "init",
            "nevent 3 1:10 2:20 3:30",
            "neventc 3 1:10 2:20 3:30",
            "eventc 4294967295:18446744073709551615",
        ]
    );
}

#[test]
fn test_descriptors_cross_by_pointer() {
    let Some((_dir, lib)) = build_fake_tracer() else {
        return;
    };
    let (t, log) = open(&lib);

    t.define_event(1000, "loop", &[(0, "end"), (1, "body")])
        .unwrap();
    t.define_event(2000, "phase", &[]).unwrap();
    assert!(t.define_event(3000, "", &[]).is_err());

    assert_eq!(
        log.lines(),
        ["define 1000 'loop' 2 0='end' 1='body'", "define 2000 'phase' 0 null"]
    );
}

#[test]
fn test_configuration_and_markers() {
    let Some((_dir, lib)) = build_fake_tracer() else {
        return;
    };
    let (t, log) = open(&lib);

    t.set_options(Options::HWC | Options::MPI).unwrap();
    t.set_tracing_tasks(2..=7).unwrap();
    t.network_routes(5).unwrap();
    assert!(matches!(
        t.network_routes(3_000_000_000),
        Err(Error::InvalidTask(3_000_000_000))
    ));
    t.init().unwrap();
    t.user_function(true).unwrap();
    t.counters().unwrap();
    t.next_hwc_set().unwrap();
    t.previous_hwc_set().unwrap();
    t.network_counters().unwrap();
    t.user_function(false).unwrap();
    t.instrumentation(false).unwrap();
    t.instrumentation(true).unwrap();
    t.finish().unwrap();

    assert_eq!(
        log.lines(),
        [
            "options 10",
            "tasks 2-7",
            "routes 5",
            "init",
            "user_function 1",
            "counters",
            "next_hwc_set",
            "previous_hwc_set",
            "network_counters",
            "user_function 0",
            "shutdown",
            "restart",
            "fini",
        ]
    );
}
