//! Per-service FIFO buffer pool.
//!
//! Buffers are created lazily on first submission and swapped out whole at
//! flush time. The swap-before-dispatch order is the one concurrency
//! guarantee the core makes: a request submitted while a batch is in flight
//! lands in the fresh buffer and joins the next flush.

use std::collections::HashMap;
use std::mem;

use contracts::{PendingRequest, ServiceName};

/// FIFO queues of pending requests, keyed by service name.
///
/// All access happens under the hub state lock, so the pool itself is a
/// plain map.
#[derive(Debug, Default)]
pub(crate) struct BufferPool<Req, Rsp> {
    buffers: HashMap<ServiceName, Vec<PendingRequest<Req, Rsp>>>,
}

impl<Req, Rsp> BufferPool<Req, Rsp> {
    pub(crate) fn new() -> Self {
        Self {
            buffers: HashMap::new(),
        }
    }

    /// Append to the named buffer, creating it on first use.
    pub(crate) fn push(&mut self, service: ServiceName, request: PendingRequest<Req, Rsp>) {
        self.buffers.entry(service).or_default().push(request);
    }

    /// Atomic take: swap the named buffer for a fresh empty one and return
    /// the previous contents in FIFO order. Missing or empty buffers yield
    /// an empty batch with no side effects.
    pub(crate) fn take(&mut self, service: &str) -> Vec<PendingRequest<Req, Rsp>> {
        self.buffers.get_mut(service).map(mem::take).unwrap_or_default()
    }

    /// Drop the named buffer entirely, returning whatever was still queued.
    pub(crate) fn remove(&mut self, service: &str) -> Vec<PendingRequest<Req, Rsp>> {
        self.buffers.remove(service).unwrap_or_default()
    }

    /// Number of requests currently queued for the named service.
    pub(crate) fn depth(&self, service: &str) -> usize {
        self.buffers.get(service).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queued(pool: &mut BufferPool<u32, u32>, service: &str, body: u32) {
        let (request, _reply) = PendingRequest::new(body);
        pool.push(service.into(), request);
    }

    #[test]
    fn test_fifo_order() {
        let mut pool = BufferPool::new();
        queued(&mut pool, "geo", 1);
        queued(&mut pool, "geo", 2);
        queued(&mut pool, "geo", 3);

        let batch = pool.take("geo");
        let bodies: Vec<u32> = batch.iter().map(|r| *r.body()).collect();
        assert_eq!(bodies, vec![1, 2, 3]);
    }

    #[test]
    fn test_take_swaps_in_fresh_buffer() {
        let mut pool = BufferPool::new();
        queued(&mut pool, "geo", 1);

        assert_eq!(pool.take("geo").len(), 1);
        assert_eq!(pool.depth("geo"), 0);

        // New submissions land in the fresh buffer
        queued(&mut pool, "geo", 2);
        assert_eq!(pool.depth("geo"), 1);
    }

    #[test]
    fn test_missing_buffer_is_empty_batch() {
        let mut pool: BufferPool<u32, u32> = BufferPool::new();
        assert!(pool.take("never-seen").is_empty());
        assert_eq!(pool.depth("never-seen"), 0);
    }

    #[test]
    fn test_buffers_are_isolated() {
        let mut pool = BufferPool::new();
        queued(&mut pool, "geo", 1);
        queued(&mut pool, "weather", 2);

        assert_eq!(pool.take("geo").len(), 1);
        assert_eq!(pool.depth("weather"), 1);
    }

    #[test]
    fn test_remove_clears_entry() {
        let mut pool = BufferPool::new();
        queued(&mut pool, "geo", 1);
        assert_eq!(pool.remove("geo").len(), 1);
        assert!(pool.remove("geo").is_empty());
    }
}
