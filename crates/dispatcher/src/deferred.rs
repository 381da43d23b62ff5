//! DeferredDispatcher - asynchronous delivery to a local batch function

use std::sync::Arc;

use tracing::{debug, warn};

use contracts::{
    reject_all, resolve_all_successful, split_batch, CoreError, DispatchContext, Dispatcher,
    PendingRequest, ServiceStatus, Target,
};
use observability::record_batch_settled;

/// Dispatcher for services backed by a [`Target::Deferred`] function.
///
/// The function is invoked synchronously during `dispatch` and hands back a
/// deferred result; settlement happens on a spawned task once that result
/// completes. Requires a tokio runtime.
pub struct DeferredDispatcher;

impl<Req, Rsp> Dispatcher<Req, Rsp> for DeferredDispatcher
where
    Req: Send + 'static,
    Rsp: Send + 'static,
{
    fn dispatch(&self, batch: Vec<PendingRequest<Req, Rsp>>, cx: DispatchContext<Req, Rsp>) {
        let size = batch.len();
        let (bodies, handles) = split_batch(batch);

        let func = match cx.config().target() {
            Target::Deferred(func) => Arc::clone(func),
            other => {
                warn!(service = %cx.service(), target = ?other, "deferred dispatcher needs a Deferred target");
                reject_all(
                    handles,
                    CoreError::illegal_argument(format!(
                        "service '{}' uses the deferred dispatcher but its target is {:?}",
                        cx.service(),
                        other
                    )),
                );
                return;
            }
        };

        let pending = func(bodies);

        tokio::spawn(async move {
            match pending.await {
                Ok(responses) => {
                    if responses.len() != size {
                        // A malformed payload is not a transport verdict;
                        // status stays as it was.
                        reject_all(
                            handles,
                            CoreError::IllegalResponseSize {
                                expected: size,
                                actual: responses.len(),
                            },
                        );
                        record_batch_settled(cx.service(), "size_mismatch", size);
                        return;
                    }
                    resolve_all_successful(handles, responses);
                    cx.set_status(ServiceStatus::Online);
                    record_batch_settled(cx.service(), "ok", size);
                }
                Err(error) => {
                    debug!(service = %cx.service(), %error, "deferred batch call failed");
                    reject_all(handles, error);
                    cx.set_status(ServiceStatus::Offline);
                    record_batch_settled(cx.service(), "error", size);
                }
            }
        });
    }
}
