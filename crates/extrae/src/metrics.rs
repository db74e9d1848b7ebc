//! Emission and rejection counters using metrics-rs.
//!
//! Nothing is recorded unless the application installs a recorder.

use metrics::{Unit, counter, describe_counter};

/// Register metric descriptions. Call once at startup.
pub fn init() {
    describe_counter!(
        "extrae_events_emitted_total",
        Unit::Count,
        "Events forwarded to the tracer, batched events counted individually"
    );
    describe_counter!(
        "extrae_batches_emitted_total",
        Unit::Count,
        "Multi-event calls forwarded to the tracer"
    );
    describe_counter!(
        "extrae_rejected_calls_total",
        Unit::Count,
        "Calls rejected before reaching the tracer, by reason"
    );
}

pub(crate) fn record_events(count: usize) {
    counter!("extrae_events_emitted_total").increment(count as u64);
}

pub(crate) fn record_batch() {
    counter!("extrae_batches_emitted_total").increment(1);
}

pub(crate) fn record_rejection(reason: &'static str) {
    counter!("extrae_rejected_calls_total", "reason" => reason).increment(1);
}
