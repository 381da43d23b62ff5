//! # Contracts
//!
//! Frozen interface contracts, defining the types and traits shared between
//! the coalescer core, the built-in dispatchers, and user code.
//! All business crates can only depend on this crate, reverse dependencies
//! are prohibited.
//!
//! ## Request Model
//! - Callers submit opaque request bodies and receive a [`PendingReply`]
//! - A [`Dispatcher`] delivers a drained batch and settles every request
//!   through its [`SettleHandle`] exactly once

mod config;
mod dispatcher;
mod error;
mod name;
mod request;
mod settle;
mod status;

pub use config::*;
pub use dispatcher::{DispatchContext, Dispatcher, StatusSink};
pub use error::CoreError;
pub use name::{ServiceName, ServiceTypeName};
pub use request::*;
pub use settle::{reject_all, resolve_all, resolve_all_successful, split_batch};
pub use status::ServiceStatus;
