//! ServiceHub - registries, buffers, and the flush engine in one instance
//!
//! One hub is one independent coalescing domain: its own dispatcher types,
//! service registrations, buffers, and status board. Nothing is static, so
//! tests and embedders can run as many hubs side by side as they like.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, instrument, warn};

use contracts::{
    reject_all, CoreError, DispatchContext, Dispatcher, PendingReply, PendingRequest,
    ServiceConfig, ServiceName, ServiceStatus, ServiceTypeName, StatusSink,
};

use crate::buffer::BufferPool;
use crate::metrics::{HubMetrics, MetricsSnapshot};

/// Everything a hub owns, behind one lock.
///
/// A single lock keeps the cross-map operations (register, unregister,
/// flush) atomic; every critical section is short and non-blocking, and the
/// dispatcher is always invoked after the lock is released.
struct HubState<Req, Rsp> {
    types: HashMap<ServiceTypeName, Arc<dyn Dispatcher<Req, Rsp>>>,
    services: HashMap<ServiceName, Arc<ServiceConfig<Req, Rsp>>>,
    buffers: BufferPool<Req, Rsp>,
    statuses: HashMap<ServiceName, ServiceStatus>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Writes a status record, silently dropping updates for raced-out names.
/// Returns whether the record was written.
fn write_status<Req, Rsp>(
    state: &Mutex<HubState<Req, Rsp>>,
    service: &str,
    status: ServiceStatus,
) -> bool {
    let mut state = lock(state);
    let Some((name, _)) = state.services.get_key_value(service) else {
        debug!(service, "status update for unregistered service dropped");
        return false;
    };
    let name = name.clone();
    state.statuses.insert(name, status);
    drop(state);

    observability::record_service_status(service, status);
    true
}

/// Status board write access handed to dispatchers.
struct StatusWriter<Req, Rsp> {
    state: Arc<Mutex<HubState<Req, Rsp>>>,
}

impl<Req, Rsp> StatusSink for StatusWriter<Req, Rsp>
where
    Req: Send + 'static,
    Rsp: Send + 'static,
{
    fn set_status(&self, service: &ServiceName, status: ServiceStatus) {
        write_status(&self.state, service.as_str(), status);
    }
}

/// Request-coalescing hub: submit requests to named services, flush them as
/// batches through pluggable dispatchers.
///
/// Cloning is cheap and shares the instance.
///
/// # Examples
/// ```ignore
/// let hub: ServiceHub<Query, Answer> = ServiceHub::new();
/// dispatcher::register_builtins(&hub)?;
/// hub.register("geocoder", ServiceConfig::call(geocode_batch), false)?;
///
/// let reply = hub.submit("geocoder", query)?;
/// hub.flush("geocoder")?;
/// let answer = reply.await?;
/// ```
pub struct ServiceHub<Req, Rsp> {
    state: Arc<Mutex<HubState<Req, Rsp>>>,
    status_writer: Arc<dyn StatusSink>,
    metrics: Arc<HubMetrics>,
}

impl<Req, Rsp> Clone for ServiceHub<Req, Rsp> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            status_writer: Arc::clone(&self.status_writer),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<Req, Rsp> Default for ServiceHub<Req, Rsp>
where
    Req: Send + 'static,
    Rsp: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<Req, Rsp> ServiceHub<Req, Rsp>
where
    Req: Send + 'static,
    Rsp: Send + 'static,
{
    /// Create an empty hub with no types, services, or buffers.
    pub fn new() -> Self {
        let state = Arc::new(Mutex::new(HubState {
            types: HashMap::new(),
            services: HashMap::new(),
            buffers: BufferPool::new(),
            statuses: HashMap::new(),
        }));
        let status_writer = Arc::new(StatusWriter {
            state: Arc::clone(&state),
        });
        Self {
            state,
            status_writer,
            metrics: Arc::new(HubMetrics::new()),
        }
    }

    fn state(&self) -> MutexGuard<'_, HubState<Req, Rsp>> {
        lock(&self.state)
    }

    /// Register a dispatcher under a type name, overwriting silently.
    ///
    /// # Errors
    /// `IllegalArgument` if the type name is empty.
    pub fn register_type(
        &self,
        name: impl Into<ServiceTypeName>,
        dispatcher: impl Dispatcher<Req, Rsp> + 'static,
    ) -> Result<(), CoreError> {
        let name = name.into();
        if name.is_empty() {
            return Err(CoreError::illegal_argument(
                "service type name must be a non-empty identifier",
            ));
        }

        let replaced = self
            .state()
            .types
            .insert(name.clone(), Arc::new(dispatcher))
            .is_some();
        debug!(service_type = %name, replaced, "service type registered");
        Ok(())
    }

    /// Register a service under a name, binding it to its configuration.
    ///
    /// # Errors
    /// - `IllegalArgument` if the name is empty or the config names an
    ///   unknown service type
    /// - `ServiceAlreadyRegistered` if the name exists and `overwrite` is
    ///   false
    pub fn register(
        &self,
        service: impl Into<ServiceName>,
        config: ServiceConfig<Req, Rsp>,
        overwrite: bool,
    ) -> Result<(), CoreError> {
        let service = service.into();
        if service.is_empty() {
            return Err(CoreError::illegal_argument(
                "service name must be a non-empty identifier",
            ));
        }

        let mut state = self.state();
        if !state.types.contains_key(config.service_type().as_str()) {
            return Err(CoreError::illegal_argument(format!(
                "config names unknown service type '{}'; register the type first",
                config.service_type()
            )));
        }
        if !overwrite && state.services.contains_key(service.as_str()) {
            return Err(CoreError::already_registered(service));
        }

        state.services.insert(service.clone(), Arc::new(config));
        drop(state);
        debug!(service = %service, "service registered");
        Ok(())
    }

    /// Remove a service, its status record, and its buffer. Requests still
    /// buffered at this point are rejected with `ServiceUnregistered`
    /// rather than left pending forever.
    ///
    /// # Errors
    /// `ServiceUnregistered` if no such service exists.
    #[instrument(name = "hub_unregister", skip(self))]
    pub fn unregister(&self, service: &str) -> Result<(), CoreError> {
        let abandoned = {
            let mut state = self.state();
            if state.services.remove(service).is_none() {
                return Err(CoreError::unregistered(service));
            }
            state.statuses.remove(service);
            state.buffers.remove(service)
        };

        if !abandoned.is_empty() {
            warn!(
                service,
                pending = abandoned.len(),
                "rejecting requests buffered at unregistration"
            );
            self.metrics.record_abandoned(abandoned.len());
            observability::record_requests_abandoned(service, abandoned.len());
            reject_all(
                abandoned.into_iter().map(PendingRequest::into_settle),
                CoreError::unregistered(service),
            );
        }
        Ok(())
    }

    /// Whether a service with this name is currently registered.
    pub fn is_registered(&self, service: &str) -> bool {
        self.state().services.contains_key(service)
    }

    /// Queue a request for the named service and hand back the reply
    /// future. Never blocks and never triggers a flush.
    ///
    /// # Errors
    /// `ServiceUnregistered` if the name is not registered.
    pub fn submit(&self, service: &str, body: Req) -> Result<PendingReply<Rsp>, CoreError> {
        let mut state = self.state();
        let Some((name, _)) = state.services.get_key_value(service) else {
            return Err(CoreError::unregistered(service));
        };
        let name = name.clone();

        let (request, reply) = PendingRequest::new(body);
        state.buffers.push(name, request);
        drop(state);

        self.metrics.inc_submitted_count();
        observability::record_request_submitted(service);
        Ok(reply)
    }

    /// Number of requests currently buffered for the named service.
    pub fn pending_count(&self, service: &str) -> usize {
        self.state().buffers.depth(service)
    }

    /// Drain the service's buffer and hand the batch to its dispatcher.
    ///
    /// The buffer is swapped for a fresh one before the dispatcher runs, so
    /// submissions made during dispatch join the next batch. An empty
    /// buffer returns immediately with no dispatcher invocation and no
    /// status change. Fire-and-forget: dispatcher failures surface only
    /// through the individual request settlements.
    ///
    /// # Errors
    /// `ServiceUnregistered` if the name is not registered.
    #[instrument(name = "hub_flush", skip(self))]
    pub fn flush(&self, service: &str) -> Result<(), CoreError> {
        let mut state = self.state();
        let Some((name, config)) = state.services.get_key_value(service) else {
            return Err(CoreError::unregistered(service));
        };
        let name = name.clone();
        let config = Arc::clone(config);

        let batch = state.buffers.take(service);
        if batch.is_empty() {
            return Ok(());
        }

        let dispatcher = match state.types.get(config.service_type().as_str()) {
            Some(dispatcher) => Arc::clone(dispatcher),
            None => {
                // register() validates the type, so this only happens if the
                // type registry was mutated out from under the service.
                drop(state);
                warn!(service, service_type = %config.service_type(), "dispatcher type vanished");
                reject_all(
                    batch.into_iter().map(PendingRequest::into_settle),
                    CoreError::illegal_argument(format!(
                        "service type '{}' is no longer registered",
                        config.service_type()
                    )),
                );
                return Ok(());
            }
        };
        drop(state);

        let size = batch.len();
        self.metrics.record_batch(size);
        observability::record_batch_dispatched(service, size);
        debug!(service, size, "dispatching batch");

        let cx = DispatchContext::new(name, config, Arc::clone(&self.status_writer));
        dispatcher.dispatch(batch, cx);
        Ok(())
    }

    /// Flush every currently registered service, in registry-iteration
    /// order. Services unregistered between the snapshot and their flush
    /// are skipped; no cross-service ordering is guaranteed.
    pub fn flush_all(&self) {
        let names: Vec<ServiceName> = self.state().services.keys().cloned().collect();
        for name in names {
            if let Err(error) = self.flush(&name) {
                debug!(service = %name, %error, "flush_all skipped raced-out service");
            }
        }
    }

    /// Record delivery health for a service. Dropped silently if the name
    /// is not currently registered.
    pub fn set_status(&self, service: &str, status: ServiceStatus) {
        write_status(&self.state, service, status);
    }

    /// Last status a dispatcher recorded for the service, if any.
    pub fn status(&self, service: &str) -> Option<ServiceStatus> {
        self.state().statuses.get(service).copied()
    }

    /// Point-in-time copy of the hub counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
