//! ChannelDispatcher - message passing to a serving task

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use contracts::{
    reject_all, resolve_all_successful, split_batch, BatchEnvelope, BatchResponses, CoreError,
    DispatchContext, Dispatcher, PendingRequest, ServiceStatus, Target,
};
use observability::record_batch_settled;

/// Dispatcher for services backed by a [`Target::Channel`] endpoint.
///
/// Packs the batch into one [`BatchEnvelope`], sends it to the endpoint,
/// and settles the batch when the reply arrives. A closed endpoint or a
/// dropped reply slot is a transport failure: the whole batch is rejected
/// and the service goes offline. Requires a tokio runtime; the wait for
/// the reply happens on a spawned task.
pub struct ChannelDispatcher;

impl<Req, Rsp> Dispatcher<Req, Rsp> for ChannelDispatcher
where
    Req: Send + 'static,
    Rsp: Send + 'static,
{
    fn dispatch(&self, batch: Vec<PendingRequest<Req, Rsp>>, cx: DispatchContext<Req, Rsp>) {
        let size = batch.len();
        let (bodies, handles) = split_batch(batch);

        let endpoint = match cx.config().target() {
            Target::Channel(endpoint) => endpoint.clone(),
            other => {
                warn!(service = %cx.service(), target = ?other, "channel dispatcher needs a Channel target");
                reject_all(
                    handles,
                    CoreError::illegal_argument(format!(
                        "service '{}' uses the channel dispatcher but its target is {:?}",
                        cx.service(),
                        other
                    )),
                );
                return;
            }
        };

        let (reply_tx, reply_rx) = oneshot::channel();
        let envelope = BatchEnvelope {
            bodies,
            reply: reply_tx,
        };

        tokio::spawn(async move {
            if endpoint.send(envelope).await.is_err() {
                debug!(service = %cx.service(), "channel endpoint closed");
                reject_all(
                    handles,
                    CoreError::other(format!(
                        "channel endpoint for service '{}' is closed",
                        cx.service()
                    )),
                );
                cx.set_status(ServiceStatus::Offline);
                record_batch_settled(cx.service(), "transport_error", size);
                return;
            }

            match reply_rx.await {
                Ok(responses) => {
                    if responses.len() == size {
                        resolve_all_successful(handles, responses);
                        record_batch_settled(cx.service(), "ok", size);
                    } else {
                        reject_all(
                            handles,
                            CoreError::IllegalResponseSize {
                                expected: size,
                                actual: responses.len(),
                            },
                        );
                        record_batch_settled(cx.service(), "size_mismatch", size);
                    }
                    // A reply arrived, so the transport itself is healthy
                    cx.set_status(ServiceStatus::Online);
                }
                Err(_) => {
                    debug!(service = %cx.service(), "channel endpoint dropped the reply");
                    reject_all(
                        handles,
                        CoreError::other(format!(
                            "channel endpoint for service '{}' dropped the reply",
                            cx.service()
                        )),
                    );
                    cx.set_status(ServiceStatus::Offline);
                    record_batch_settled(cx.service(), "transport_error", size);
                }
            }
        });
    }
}

/// Spawn a reference endpoint task that answers every envelope with
/// `handler`, and hand back the sender to configure a channel service with.
pub fn serve_batches<Req, Rsp, F>(
    capacity: usize,
    mut handler: F,
) -> mpsc::Sender<BatchEnvelope<Req, Rsp>>
where
    Req: Send + 'static,
    Rsp: Send + 'static,
    F: FnMut(Vec<Req>) -> BatchResponses<Rsp> + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<BatchEnvelope<Req, Rsp>>(capacity);
    tokio::spawn(async move {
        while let Some(envelope) = rx.recv().await {
            let responses = handler(envelope.bodies);
            // Receiver may have given up; that is its business.
            let _ = envelope.reply.send(responses);
        }
    });
    tx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{batch_of, RecordingStatus};
    use contracts::{ServiceConfig, ServiceReply, StatusSink};

    fn cx_with(
        config: ServiceConfig<u32, u32>,
    ) -> (DispatchContext<u32, u32>, Arc<RecordingStatus>) {
        let status = Arc::new(RecordingStatus::default());
        let cx = DispatchContext::new(
            "worker".into(),
            Arc::new(config),
            Arc::clone(&status) as Arc<dyn StatusSink>,
        );
        (cx, status)
    }

    #[tokio::test]
    async fn test_round_trip_through_endpoint() {
        let endpoint = serve_batches(8, |bodies: Vec<u32>| {
            bodies
                .into_iter()
                .map(|b| Some(ServiceReply::Success(b + 100)))
                .collect()
        });
        let (cx, status) = cx_with(ServiceConfig::channel(endpoint));

        let (batch, replies) = batch_of(&[1, 2]);
        ChannelDispatcher.dispatch(batch, cx);

        let mut results = Vec::new();
        for reply in replies {
            results.push(reply.await.unwrap());
        }
        assert_eq!(results, vec![101, 102]);
        assert_eq!(status.last(), Some(ServiceStatus::Online));
    }

    #[tokio::test]
    async fn test_closed_endpoint_is_transport_error() {
        let (endpoint, rx) = mpsc::channel::<BatchEnvelope<u32, u32>>(1);
        drop(rx);
        let (cx, status) = cx_with(ServiceConfig::channel(endpoint));

        let (batch, replies) = batch_of(&[7]);
        ChannelDispatcher.dispatch(batch, cx);

        for reply in replies {
            let err = reply.await.unwrap_err();
            assert!(err.to_string().contains("closed"));
        }
        assert_eq!(status.last(), Some(ServiceStatus::Offline));
    }

    #[tokio::test]
    async fn test_dropped_reply_is_transport_error() {
        // Endpoint that consumes envelopes without ever answering.
        let (endpoint, mut rx) = mpsc::channel::<BatchEnvelope<u32, u32>>(1);
        tokio::spawn(async move {
            while let Some(envelope) = rx.recv().await {
                drop(envelope.reply);
            }
        });
        let (cx, status) = cx_with(ServiceConfig::channel(endpoint));

        let (batch, replies) = batch_of(&[7]);
        ChannelDispatcher.dispatch(batch, cx);

        for reply in replies {
            let err = reply.await.unwrap_err();
            assert!(err.to_string().contains("dropped the reply"));
        }
        assert_eq!(status.last(), Some(ServiceStatus::Offline));
    }

    #[tokio::test]
    async fn test_short_reply_rejects_batch_but_stays_online() {
        let endpoint = serve_batches(8, |_bodies: Vec<u32>| Vec::new());
        let (cx, status) = cx_with(ServiceConfig::channel(endpoint));

        let (batch, replies) = batch_of(&[1, 2]);
        ChannelDispatcher.dispatch(batch, cx);

        for reply in replies {
            assert_eq!(reply.await.unwrap_err().code(), Some(2003));
        }
        assert_eq!(status.last(), Some(ServiceStatus::Online));
    }
}
