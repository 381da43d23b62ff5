//! PendingRequest - a buffered request and its one-shot settlement handle
//!
//! Settlement is exactly-once by construction: [`SettleHandle::resolve`] and
//! [`SettleHandle::reject`] consume the handle, and a handle dropped without
//! either is rejected on drop so no caller waits forever.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::CoreError;

/// Outcome of one logical request as reported by the remote end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceReply<R> {
    /// Request handled; carries the response payload.
    Success(R),
    /// Remote end reported a failure for this request.
    Failure(String),
}

/// One transport answer for a whole batch, positionally aligned with the
/// drained requests. `None` marks a null/absent response slot.
pub type BatchResponses<R> = Vec<Option<ServiceReply<R>>>;

/// One-shot settlement half of a pending request.
///
/// Owned by the dispatcher once the request is drained into a batch.
pub struct SettleHandle<R> {
    tx: Option<oneshot::Sender<Result<R, CoreError>>>,
}

impl<R> SettleHandle<R> {
    /// Resolve the caller's reply with a response payload.
    pub fn resolve(mut self, value: R) {
        if let Some(tx) = self.tx.take() {
            // Caller may have dropped its reply; nothing left to do then.
            let _ = tx.send(Ok(value));
        }
    }

    /// Reject the caller's reply. Non-error values are wrapped.
    pub fn reject(mut self, error: impl Into<CoreError>) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Err(error.into()));
        }
    }
}

impl<R> Drop for SettleHandle<R> {
    fn drop(&mut self) {
        // Backstop for misbehaving dispatchers: an unsettled handle still
        // settles, as a rejection.
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Err(CoreError::other(
                "request was dropped without being settled",
            )));
        }
    }
}

impl<R> std::fmt::Debug for SettleHandle<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettleHandle")
            .field("settled", &self.tx.is_none())
            .finish()
    }
}

/// Caller-facing reply future returned from `submit`.
///
/// Resolves once the request's dispatcher settles it.
#[derive(Debug)]
pub struct PendingReply<R> {
    rx: oneshot::Receiver<Result<R, CoreError>>,
}

impl<R> Future for PendingReply<R> {
    type Output = Result<R, CoreError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(settled)) => Poll::Ready(settled),
            // Unreachable with well-formed handles (drop settles), kept as
            // a hard fallback for mem::forget-style misuse.
            Poll::Ready(Err(_)) => Poll::Ready(Err(CoreError::other(
                "settlement handle vanished before settling",
            ))),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// A caller's request while it sits in a buffer or a drained batch.
#[derive(Debug)]
pub struct PendingRequest<T, R> {
    body: T,
    settle: SettleHandle<R>,
}

impl<T, R> PendingRequest<T, R> {
    /// Wrap a request body, returning the buffered half and the caller half.
    pub fn new(body: T) -> (Self, PendingReply<R>) {
        let (tx, rx) = oneshot::channel();
        let request = Self {
            body,
            settle: SettleHandle { tx: Some(tx) },
        };
        (request, PendingReply { rx })
    }

    /// The caller-supplied request body.
    pub fn body(&self) -> &T {
        &self.body
    }

    /// Split into the body and the settlement half.
    pub fn into_parts(self) -> (T, SettleHandle<R>) {
        (self.body, self.settle)
    }

    /// Drop the body and keep only the settlement half.
    pub fn into_settle(self) -> SettleHandle<R> {
        self.settle
    }

    /// Resolve this request directly.
    pub fn resolve(self, value: R) {
        self.settle.resolve(value);
    }

    /// Reject this request directly.
    pub fn reject(self, error: impl Into<CoreError>) {
        self.settle.reject(error);
    }
}
