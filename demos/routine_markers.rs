//! Routine and event markers around a small workload.
//!
//! Traces through the real tracer when `EXTRAE_HOME` is set, otherwise
//! prints the calls a recording backend received.
//!
//! ```sh
//! EXTRAE_HOME=/opt/extrae cargo run --example routine_markers
//! ```

use extrae::{Backend, Counters, EventBatch, Flavor, Options, Recording, Tracer, TracerConfig};

const PHASE: u32 = 1000;
const ITERATION: u32 = 1001;

fn workload<B: Backend>(tracer: &Tracer<B>) -> extrae::Result<u64> {
    tracer.init()?;
    tracer.set_options(Options::CALLER | Options::HWC)?;
    tracer.define_event(PHASE, "phase", &[(0, "end"), (1, "setup"), (2, "compute")])?;
    tracer.define_event(ITERATION, "iteration", &[])?;

    let mut sum = 0u64;
    {
        let _setup = tracer.event_scope(PHASE, 1)?;
        sum += (1..=1000u64).sum::<u64>();
    }
    {
        let _compute = tracer.event_scope(PHASE, 2)?;
        for i in 1..=4u64 {
            let _routine = tracer.routine_scope()?;
            tracer.emit_event(ITERATION, i, Counters::Sample)?;
            sum = sum.wrapping_mul(31).wrapping_add(i);
            tracer.emit_event(ITERATION, 0, Counters::Skip)?;
        }
    }

    let summary: EventBatch = [(PHASE, 0u64), (ITERATION, 0u64)].into_iter().collect();
    tracer.emit_event_batch(&summary, Counters::Skip)?;
    tracer.flush()?;
    tracer.finish()?;
    Ok(sum)
}

fn main() -> extrae::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("extrae=debug")
        .init();

    match TracerConfig::from_env(Flavor::Seq) {
        Ok(config) => {
            let tracer = Tracer::open(&config)?;
            println!("tracing with extrae {}", tracer.version());
            let sum = workload(&tracer)?;
            println!("done: {sum}");
        }
        Err(_) => {
            let tracer = Tracer::with_backend(Recording::new());
            let sum = workload(&tracer)?;
            for call in tracer.backend().calls() {
                println!("{call:?}");
            }
            println!("done: {sum}");
        }
    }
    Ok(())
}
