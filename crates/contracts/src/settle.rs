//! Shared settlement helpers
//!
//! Used by the built-in dispatchers and public for custom ones. All helpers
//! consume the settlement handles; handles left over by a length mismatch
//! are rejected by the drop backstop rather than lost.

use crate::{BatchResponses, CoreError, PendingRequest, ServiceReply, SettleHandle};

/// Peel the bodies off a drained batch, keeping the settlement halves
/// positionally aligned. This is the "pack" step every dispatcher starts
/// with.
pub fn split_batch<T, R>(batch: Vec<PendingRequest<T, R>>) -> (Vec<T>, Vec<SettleHandle<R>>) {
    let mut bodies = Vec::with_capacity(batch.len());
    let mut handles = Vec::with_capacity(batch.len());
    for request in batch {
        let (body, settle) = request.into_parts();
        bodies.push(body);
        handles.push(settle);
    }
    (bodies, handles)
}

/// Resolve request *i* with response *i*, positionally, no inspection.
///
/// Equal lengths are the caller's contract.
pub fn resolve_all<R>(handles: Vec<SettleHandle<R>>, responses: Vec<R>) {
    for (handle, response) in handles.into_iter().zip(responses) {
        handle.resolve(response);
    }
}

/// Reject every request in the batch with the same error.
///
/// Accepts anything convertible into [`CoreError`], mirroring the rule that
/// non-error values get wrapped before rejection.
pub fn reject_all<R, E>(handles: impl IntoIterator<Item = SettleHandle<R>>, error: E)
where
    E: Into<CoreError>,
{
    let error = error.into();
    for handle in handles {
        handle.reject(error.clone());
    }
}

/// Settle each request from its positional response slot:
/// - `Some(Success)` resolves with the payload
/// - `Some(Failure)` rejects with the remote error, wrapped
/// - `None` rejects as an erroneous response
///
/// Equal lengths are the caller's contract; no internal check.
pub fn resolve_all_successful<R>(handles: Vec<SettleHandle<R>>, responses: BatchResponses<R>) {
    for (index, (handle, response)) in handles.into_iter().zip(responses).enumerate() {
        match response {
            Some(ServiceReply::Success(value)) => handle.resolve(value),
            Some(ServiceReply::Failure(message)) => handle.reject(message),
            None => handle.reject(CoreError::erroneous_response(format!(
                "no response at index {index}"
            ))),
        }
    }
}
