//! Registering a custom service type.
//!
//! Implements an "index" dispatcher that answers each request with whether
//! the submitted key is present in an in-process set, carried through the
//! config's Custom target handle.
//!
//! Run with: cargo run --bin custom_type

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use coalescer::ServiceHub;
use contracts::{
    reject_all, resolve_all, split_batch, CoreError, DispatchContext, Dispatcher, PendingRequest,
    ServiceConfig, ServiceStatus, Target,
};

/// Target handle for services of the "index" type.
struct IndexHandle {
    entries: Mutex<HashSet<Bytes>>,
}

struct IndexDispatcher;

impl Dispatcher<Bytes, bool> for IndexDispatcher {
    fn dispatch(&self, batch: Vec<PendingRequest<Bytes, bool>>, cx: DispatchContext<Bytes, bool>) {
        let (bodies, handles) = split_batch(batch);

        let index = match cx.config().target() {
            Target::Custom(any) => match Arc::clone(any).downcast::<IndexHandle>() {
                Ok(index) => index,
                Err(_) => {
                    reject_all(
                        handles,
                        CoreError::illegal_argument("index target has the wrong handle type"),
                    );
                    return;
                }
            },
            _ => {
                reject_all(
                    handles,
                    CoreError::illegal_argument("index services need a Custom target"),
                );
                return;
            }
        };

        let entries = index
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let results: Vec<bool> = bodies.iter().map(|key| entries.contains(key)).collect();
        drop(entries);

        resolve_all(handles, results);
        cx.set_status(ServiceStatus::Online);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let hub: ServiceHub<Bytes, bool> = ServiceHub::new();
    hub.register_type("index", IndexDispatcher)?;

    let handle = IndexHandle {
        entries: Mutex::new(
            [Bytes::from_static(b"alpha"), Bytes::from_static(b"gamma")]
                .into_iter()
                .collect(),
        ),
    };
    hub.register(
        "membership",
        ServiceConfig::custom("index", Arc::new(handle)),
        false,
    )?;

    let lookups: [&'static [u8]; 3] = [b"alpha", b"beta", b"gamma"];
    let replies: Vec<_> = lookups
        .iter()
        .map(|key| hub.submit("membership", Bytes::from_static(key)))
        .collect::<Result<_, _>>()?;

    hub.flush("membership")?;

    for (key, reply) in lookups.iter().zip(replies) {
        let present = reply.await?;
        tracing::info!(key = %String::from_utf8_lossy(key), present, "lookup settled");
    }
    tracing::info!(status = ?hub.status("membership"), "index status");

    Ok(())
}
