//! ServiceConfig - per-service delivery configuration
//!
//! A config names the dispatcher type that will handle the service's
//! batches and carries the type-specific delivery target (a closure, a
//! channel endpoint, or an opaque handle for custom dispatcher types).

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::{BatchResponses, CoreError, ServiceTypeName};

/// Names of the built-in dispatcher types.
pub mod builtin {
    /// Synchronous batch call into a local function.
    pub const CALL: &str = "call";
    /// Message passing over an mpsc channel to a serving task.
    pub const CHANNEL: &str = "channel";
    /// Asynchronous batch call returning a deferred result.
    pub const DEFERRED: &str = "deferred";
}

/// Synchronous batch function target.
pub type CallFn<Req, Rsp> =
    Arc<dyn Fn(Vec<Req>) -> Result<BatchResponses<Rsp>, CoreError> + Send + Sync>;

/// Deferred result of an asynchronous batch call.
pub type BatchFuture<Rsp> =
    Pin<Box<dyn Future<Output = Result<BatchResponses<Rsp>, CoreError>> + Send>>;

/// Asynchronous batch function target.
pub type DeferredFn<Req, Rsp> = Arc<dyn Fn(Vec<Req>) -> BatchFuture<Rsp> + Send + Sync>;

/// One physical message to a channel-served endpoint: the packed request
/// bodies and a reply slot. Dropping `reply` without answering signals a
/// transport failure to the dispatcher.
pub struct BatchEnvelope<Req, Rsp> {
    /// Packed request bodies, in submission order.
    pub bodies: Vec<Req>,
    /// One-shot reply slot for the positional responses.
    pub reply: oneshot::Sender<BatchResponses<Rsp>>,
}

impl<Req, Rsp> fmt::Debug for BatchEnvelope<Req, Rsp> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchEnvelope")
            .field("bodies", &self.bodies.len())
            .finish()
    }
}

/// Type-specific delivery state of a service.
pub enum Target<Req, Rsp> {
    /// Target of the built-in `call` type.
    Call(CallFn<Req, Rsp>),
    /// Target of the built-in `deferred` type.
    Deferred(DeferredFn<Req, Rsp>),
    /// Target of the built-in `channel` type.
    Channel(mpsc::Sender<BatchEnvelope<Req, Rsp>>),
    /// Opaque handle for user-defined dispatcher types.
    Custom(Arc<dyn Any + Send + Sync>),
}

impl<Req, Rsp> Clone for Target<Req, Rsp> {
    fn clone(&self) -> Self {
        match self {
            Self::Call(f) => Self::Call(Arc::clone(f)),
            Self::Deferred(f) => Self::Deferred(Arc::clone(f)),
            Self::Channel(tx) => Self::Channel(tx.clone()),
            Self::Custom(any) => Self::Custom(Arc::clone(any)),
        }
    }
}

impl<Req, Rsp> fmt::Debug for Target<Req, Rsp> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant = match self {
            Self::Call(_) => "Call",
            Self::Deferred(_) => "Deferred",
            Self::Channel(_) => "Channel",
            Self::Custom(_) => "Custom",
        };
        f.write_str(variant)
    }
}

/// Per-service configuration: the dispatcher type plus its delivery target.
///
/// Immutable once registered; replacing it requires re-registration with
/// the overwrite flag.
pub struct ServiceConfig<Req, Rsp> {
    service_type: ServiceTypeName,
    target: Target<Req, Rsp>,
    /// Free-form transport extras, dispatcher-interpreted.
    params: HashMap<String, String>,
}

impl<Req, Rsp> ServiceConfig<Req, Rsp> {
    /// Create a config for an explicitly named dispatcher type.
    pub fn new(service_type: impl Into<ServiceTypeName>, target: Target<Req, Rsp>) -> Self {
        Self {
            service_type: service_type.into(),
            target,
            params: HashMap::new(),
        }
    }

    /// Config for the built-in synchronous `call` type.
    pub fn call<F>(func: F) -> Self
    where
        F: Fn(Vec<Req>) -> Result<BatchResponses<Rsp>, CoreError> + Send + Sync + 'static,
    {
        Self::new(builtin::CALL, Target::Call(Arc::new(func)))
    }

    /// Config for the built-in asynchronous `deferred` type.
    pub fn deferred<F, Fut>(func: F) -> Self
    where
        F: Fn(Vec<Req>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<BatchResponses<Rsp>, CoreError>> + Send + 'static,
    {
        let boxed: DeferredFn<Req, Rsp> = Arc::new(move |bodies| Box::pin(func(bodies)));
        Self::new(builtin::DEFERRED, Target::Deferred(boxed))
    }

    /// Config for the built-in `channel` type.
    pub fn channel(endpoint: mpsc::Sender<BatchEnvelope<Req, Rsp>>) -> Self {
        Self::new(builtin::CHANNEL, Target::Channel(endpoint))
    }

    /// Config for a custom dispatcher type with an opaque target handle.
    pub fn custom(
        service_type: impl Into<ServiceTypeName>,
        handle: Arc<dyn Any + Send + Sync>,
    ) -> Self {
        Self::new(service_type, Target::Custom(handle))
    }

    /// Attach a free-form transport parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// The dispatcher type this config is bound to.
    pub fn service_type(&self) -> &ServiceTypeName {
        &self.service_type
    }

    /// The type-specific delivery target.
    pub fn target(&self) -> &Target<Req, Rsp> {
        &self.target
    }

    /// Look up a transport parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

impl<Req, Rsp> fmt::Debug for ServiceConfig<Req, Rsp> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("service_type", &self.service_type)
            .field("target", &self.target)
            .field("params", &self.params)
            .finish()
    }
}
