//! CallDispatcher - synchronous delivery to a local batch function

use std::sync::Arc;

use tracing::{debug, warn};

use contracts::{
    reject_all, resolve_all_successful, split_batch, CoreError, DispatchContext, Dispatcher,
    PendingRequest, ServiceStatus, Target,
};
use observability::record_batch_settled;

/// Dispatcher for services backed by a [`Target::Call`] function.
///
/// The batch is delivered synchronously during `dispatch`; every request is
/// settled before `dispatch` returns.
pub struct CallDispatcher;

impl<Req, Rsp> Dispatcher<Req, Rsp> for CallDispatcher
where
    Req: Send + 'static,
    Rsp: Send + 'static,
{
    fn dispatch(&self, batch: Vec<PendingRequest<Req, Rsp>>, cx: DispatchContext<Req, Rsp>) {
        let size = batch.len();
        let (bodies, handles) = split_batch(batch);

        let func = match cx.config().target() {
            Target::Call(func) => Arc::clone(func),
            other => {
                warn!(service = %cx.service(), target = ?other, "call dispatcher needs a Call target");
                reject_all(
                    handles,
                    CoreError::illegal_argument(format!(
                        "service '{}' uses the call dispatcher but its target is {:?}",
                        cx.service(),
                        other
                    )),
                );
                return;
            }
        };

        let outcome = func(bodies).and_then(|responses| {
            if responses.len() == size {
                Ok(responses)
            } else {
                Err(CoreError::IllegalResponseSize {
                    expected: size,
                    actual: responses.len(),
                })
            }
        });

        match outcome {
            Ok(responses) => {
                resolve_all_successful(handles, responses);
                cx.set_status(ServiceStatus::Online);
                record_batch_settled(cx.service(), "ok", size);
            }
            Err(error) => {
                debug!(service = %cx.service(), %error, "batch call failed");
                reject_all(handles, error);
                cx.set_status(ServiceStatus::Offline);
                record_batch_settled(cx.service(), "error", size);
            }
        }
    }
}
