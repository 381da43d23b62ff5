//! # Dispatcher
//!
//! The built-in dispatchers.
//!
//! Each one implements the same protocol for a different transport: pack
//! the drained batch into one physical operation, deliver it, unpack the
//! positional responses, settle every request, and report delivery health.
//!
//! - [`CallDispatcher`] - synchronous call into a local batch function
//! - [`ChannelDispatcher`] - message passing to a task over an mpsc channel
//! - [`DeferredDispatcher`] - asynchronous call returning a deferred result

pub mod call;
pub mod channel;
pub mod deferred;

pub use call::CallDispatcher;
pub use channel::{serve_batches, ChannelDispatcher};
pub use deferred::DeferredDispatcher;

pub use contracts::{builtin, BatchEnvelope, DispatchContext, Dispatcher};

use coalescer::ServiceHub;
use contracts::CoreError;

/// Register the three built-in dispatcher types on a hub under their
/// canonical names ([`builtin`]).
pub fn register_builtins<Req, Rsp>(hub: &ServiceHub<Req, Rsp>) -> Result<(), CoreError>
where
    Req: Send + 'static,
    Rsp: Send + 'static,
{
    hub.register_type(builtin::CALL, CallDispatcher)?;
    hub.register_type(builtin::CHANNEL, ChannelDispatcher)?;
    hub.register_type(builtin::DEFERRED, DeferredDispatcher)?;
    Ok(())
}
