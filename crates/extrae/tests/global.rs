//! Process-wide handle. Kept in its own test binary since a tracer can only
//! be installed once per process.

use std::sync::Arc;

use extrae::{Counters, Error, Recording, Tracer};

#[test]
fn test_install_once() {
    assert!(extrae::global().is_none());

    let recording = Arc::new(Recording::new());
    let installed = extrae::install(Tracer::with_backend(Arc::clone(&recording))).unwrap();
    installed.init().unwrap();

    let tracer = extrae::global().unwrap();
    tracer.emit_event(7, 1, Counters::Skip).unwrap();
    tracer.emit_event(7, 0, Counters::Skip).unwrap();
    assert_eq!(recording.events(), vec![(7, 1), (7, 0)]);

    let second = extrae::install(Tracer::with_backend(Recording::new()));
    assert!(matches!(second, Err(Error::AlreadyInstalled)));

    tracer.finish().unwrap();
    assert!(extrae::global().unwrap().init().is_err());
}
