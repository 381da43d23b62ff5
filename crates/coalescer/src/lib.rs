//! # Coalescer
//!
//! Request-coalescing core.
//!
//! Responsibilities:
//! - Accept logical requests for named services and buffer them FIFO
//! - On flush, swap the buffer out atomically and hand the batch to the
//!   service's dispatcher
//! - Track last observed delivery health per service
//!
//! ## Usage
//!
//! ```ignore
//! use coalescer::ServiceHub;
//! use contracts::ServiceConfig;
//!
//! let hub: ServiceHub<Query, Answer> = ServiceHub::new();
//! dispatcher::register_builtins(&hub)?;
//! hub.register("geocoder", ServiceConfig::call(geocode_batch), false)?;
//!
//! let reply = hub.submit("geocoder", query)?;
//! hub.flush("geocoder")?;
//! let answer = reply.await?;
//! ```

mod buffer;
mod hub;
mod metrics;

pub use hub::ServiceHub;
pub use metrics::{HubMetrics, MetricsSnapshot};

// Re-export contracts types callers need at every call site
pub use contracts::{
    CoreError, PendingReply, ServiceConfig, ServiceName, ServiceStatus, ServiceTypeName,
};
