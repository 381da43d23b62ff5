//! Tour of the three built-in service types.
//!
//! Registers one service of each type, coalesces a few requests per
//! service, flushes everything at once, and prints the settlements.
//!
//! Run with: cargo run --bin builtin_tour

use std::time::Duration;

use coalescer::ServiceHub;
use contracts::{ServiceConfig, ServiceReply};
use dispatcher::{register_builtins, serve_batches};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init_with_config(observability::ObservabilityConfig {
        log_format: observability::LogFormat::Pretty,
        metrics_port: None,
        default_log_level: "info".to_string(),
    })?;

    tracing::info!("Starting built-in dispatcher tour");

    let hub: ServiceHub<String, String> = ServiceHub::new();
    register_builtins(&hub)?;

    // ==== call: synchronous local batch function ====
    hub.register(
        "upper",
        ServiceConfig::call(|bodies: Vec<String>| {
            Ok(bodies
                .into_iter()
                .map(|b| Some(ServiceReply::Success(b.to_uppercase())))
                .collect())
        }),
        false,
    )?;

    // ==== channel: message passing to a serving task ====
    let endpoint = serve_batches(32, |bodies: Vec<String>| {
        bodies
            .into_iter()
            .map(|b| Some(ServiceReply::Success(b.chars().rev().collect())))
            .collect()
    });
    hub.register("reverse", ServiceConfig::channel(endpoint), false)?;

    // ==== deferred: asynchronous batch function ====
    hub.register(
        "shout",
        ServiceConfig::deferred(|bodies: Vec<String>| async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(bodies
                .into_iter()
                .map(|b| Some(ServiceReply::Success(format!("{b}!"))))
                .collect())
        }),
        false,
    )?;

    // Independent callers queue up requests; nothing is delivered yet.
    let upper_one = hub.submit("upper", "hello".into())?;
    let upper_two = hub.submit("upper", "world".into())?;
    let reversed = hub.submit("reverse", "stressed".into())?;
    let shouted = hub.submit("shout", "coalesce".into())?;

    tracing::info!(
        upper = hub.pending_count("upper"),
        reverse = hub.pending_count("reverse"),
        shout = hub.pending_count("shout"),
        "Buffered requests before flush"
    );

    // One flush delivers each service's buffer as a single batch.
    hub.flush_all();

    for (service, reply) in [
        ("upper", upper_one),
        ("upper", upper_two),
        ("reverse", reversed),
        ("shout", shouted),
    ] {
        let result = reply.await?;
        tracing::info!(service, %result, "request settled");
    }

    for service in ["upper", "reverse", "shout"] {
        tracing::info!(service, status = ?hub.status(service), "final status");
    }
    tracing::info!(metrics = ?hub.metrics(), "hub counters");

    Ok(())
}
