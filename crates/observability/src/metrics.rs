//! Hub and dispatcher metrics
//!
//! Counter/gauge names are stable; dashboards key on them.

use contracts::ServiceStatus;
use metrics::{counter, gauge, histogram};

/// Record one request accepted into a service buffer.
pub fn record_request_submitted(service: &str) {
    counter!(
        "coalescer_requests_submitted_total",
        "service" => service.to_string()
    )
    .increment(1);
}

/// Record one non-empty batch handed to a dispatcher.
pub fn record_batch_dispatched(service: &str, size: usize) {
    counter!(
        "coalescer_batches_dispatched_total",
        "service" => service.to_string()
    )
    .increment(1);

    counter!(
        "coalescer_requests_dispatched_total",
        "service" => service.to_string()
    )
    .increment(size as u64);

    histogram!(
        "coalescer_batch_size",
        "service" => service.to_string()
    )
    .record(size as f64);
}

/// Record a settled batch and its outcome, as reported by a dispatcher.
pub fn record_batch_settled(service: &str, outcome: &'static str, size: usize) {
    counter!(
        "coalescer_batches_settled_total",
        "service" => service.to_string(),
        "outcome" => outcome
    )
    .increment(1);

    counter!(
        "coalescer_requests_settled_total",
        "service" => service.to_string(),
        "outcome" => outcome
    )
    .increment(size as u64);
}

/// Record requests rejected because their service was unregistered.
pub fn record_requests_abandoned(service: &str, count: usize) {
    counter!(
        "coalescer_requests_abandoned_total",
        "service" => service.to_string()
    )
    .increment(count as u64);
}

/// Record the delivery health a dispatcher observed (1 online, 0 offline).
pub fn record_service_status(service: &str, status: ServiceStatus) {
    let value = match status {
        ServiceStatus::Online => 1.0,
        ServiceStatus::Offline => 0.0,
    };
    gauge!(
        "coalescer_service_status",
        "service" => service.to_string()
    )
    .set(value);
}
