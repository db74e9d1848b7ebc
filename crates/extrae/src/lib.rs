//! Checked interface to the Extrae tracing runtime.
//!
//! The tracer records timestamped events, hardware counter samples and
//! routine markers into a trace for offline analysis. This crate does not
//! trace anything itself: it validates calls, lays batches out the way the
//! tracer expects, and keeps track of the init/finish lifecycle so that a
//! misplaced call fails here instead of inside the tracer.
//!
//! # Example
//!
//! ```ignore
//! use extrae::{Counters, Options, Tracer, TracerConfig, Flavor};
//!
//! let tracer = Tracer::open(&TracerConfig::from_env(Flavor::Seq)?)?;
//! tracer.init()?;
//! tracer.set_options(Options::HWC | Options::CALLER)?;
//! tracer.define_event(1000, "solver loop", &[(0, "end"), (1, "iteration")])?;
//!
//! for _ in 0..10 {
//!     tracer.emit_event(1000, 1, Counters::Sample)?;
//!     // ...
//!     tracer.emit_event(1000, 0, Counters::Skip)?;
//! }
//!
//! tracer.finish()?;
//! ```
//!
//! # Testing without the tracer
//!
//! `Tracer` is generic over a `Backend`. `Recording` stores every call in
//! memory and can stand in for the real runtime in tests.

mod backend;
mod config;
mod descriptor;
mod error;
mod event;
mod global;
pub mod metrics;
mod options;
mod range;
mod recording;
mod scope;
mod state;
mod tracer;
mod version;

pub use backend::Backend;
pub use config::{CONFIG_FILE_VAR, Flavor, HOME_VAR, LibrarySource, Strictness, TracerConfig};
pub use descriptor::{EventTypeDescriptor, MarshalledDescriptor};
pub use error::{ConfigError, Error, Result};
pub use event::{Counters, EventBatch, EventRecord, EventType, EventValue, MarshalledBatch};
pub use global::{SharedTracer, global, install};
pub use options::Options;
pub use range::TaskRange;
pub use recording::{Call, Recording};
pub use scope::{EventScope, RoutineScope};
pub use state::{InitMechanism, InitializationState};
pub use tracer::Tracer;
pub use version::Version;

// Raw layer, for callers that need an entry point this crate does not wrap.
pub use extrae_sys as sys;
