//! Dispatcher trait - the pluggable delivery interface
//!
//! A dispatcher owns the pack/send/unpack/settle protocol for one category
//! of transport. The core invokes it once per non-empty flush, outside any
//! internal lock, and never waits for it: delivery failures must travel
//! through the requests' own settlement handles.

use std::sync::Arc;

use crate::{PendingRequest, ServiceConfig, ServiceName, ServiceStatus};

/// Delivery capability keyed by [`crate::ServiceTypeName`] in the type
/// registry.
///
/// Implementations must eventually settle every request in `batch`, either
/// by resolving/rejecting each one or by letting the drop backstop reject
/// what they abandon.
pub trait Dispatcher<Req, Rsp>: Send + Sync {
    /// Deliver one drained batch for the service described by `cx`.
    fn dispatch(&self, batch: Vec<PendingRequest<Req, Rsp>>, cx: DispatchContext<Req, Rsp>);
}

/// Write access to the status board, handed to dispatchers.
///
/// Updates for names that are no longer registered are dropped silently.
pub trait StatusSink: Send + Sync {
    /// Record the delivery health observed for `service`.
    fn set_status(&self, service: &ServiceName, status: ServiceStatus);
}

/// Everything a dispatcher gets besides the batch itself: the service name,
/// its configuration, and a handle for status updates.
pub struct DispatchContext<Req, Rsp> {
    service: ServiceName,
    config: Arc<ServiceConfig<Req, Rsp>>,
    status: Arc<dyn StatusSink>,
}

impl<Req, Rsp> DispatchContext<Req, Rsp> {
    /// Assemble a context. Called by the flush engine; public so custom
    /// harnesses can drive dispatchers directly in tests.
    pub fn new(
        service: ServiceName,
        config: Arc<ServiceConfig<Req, Rsp>>,
        status: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            service,
            config,
            status,
        }
    }

    /// Name of the service being flushed.
    pub fn service(&self) -> &ServiceName {
        &self.service
    }

    /// Configuration of the service being flushed.
    pub fn config(&self) -> &ServiceConfig<Req, Rsp> {
        &self.config
    }

    /// Record delivery health for the service being flushed.
    pub fn set_status(&self, status: ServiceStatus) {
        self.status.set_status(&self.service, status);
    }
}

// Manual impl: derive would demand Req/Rsp: Clone for Arc-only fields.
impl<Req, Rsp> Clone for DispatchContext<Req, Rsp> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            config: Arc::clone(&self.config),
            status: Arc::clone(&self.status),
        }
    }
}

impl<Req, Rsp> std::fmt::Debug for DispatchContext<Req, Rsp> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchContext")
            .field("service", &self.service)
            .field("config", &self.config)
            .finish()
    }
}
