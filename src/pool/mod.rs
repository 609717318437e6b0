//! Buffer pools
//!
//! One [`BufferPool`] exists per channel and direction. It holds a free list
//! and an in-order ready queue of fixed-capacity [`Buffer`]s, all allocated
//! up front. The pool does no locking of its own: the engine is the only
//! party that touches it, and sharing the engine between interrupt and task
//! context goes through `sync::SharedZap` when the `critical-section` feature is
//! enabled.
//!
//! # Ownership
//!
//! Buffers move by value. A buffer taken with [`BufferPool::try_acquire_free`]
//! comes back either through [`BufferPool::enqueue_ready`] or
//! [`BufferPool::release`]; both take it by value, so it cannot end up in two
//! places.

mod buffer;

use alloc::collections::VecDeque;

pub use buffer::{Buffer, BufferFlags};

use crate::driver::error::{PoolError, PoolResult};

/// Free list plus FIFO ready queue
#[derive(Debug)]
pub struct BufferPool {
    free: VecDeque<Buffer>,
    ready: VecDeque<Buffer>,
    capacity: usize,
    buffer_size: usize,
    first_id: u16,
    span: usize,
}

impl BufferPool {
    /// A pool with no buffers
    pub const fn empty() -> Self {
        Self {
            free: VecDeque::new(),
            ready: VecDeque::new(),
            capacity: 0,
            buffer_size: 0,
            first_id: 0,
            span: 0,
        }
    }

    /// Allocate `count` buffers of `size` bytes, ids starting at `first_id`
    pub fn with_buffers(count: usize, size: usize, first_id: u16) -> Self {
        let free = (0..count).map(|i| Buffer::new(first_id.wrapping_add(i as u16), size)).collect();
        Self {
            free,
            ready: VecDeque::with_capacity(count),
            capacity: count,
            buffer_size: size,
            first_id,
            span: count,
        }
    }

    /// Whether `buffer` was allocated by this pool
    ///
    /// Judged by id range and storage size, so a buffer from a pool of
    /// another engine with overlapping ids is not caught.
    pub fn owns(&self, buffer: &Buffer) -> bool {
        let offset = buffer.id().wrapping_sub(self.first_id) as usize;
        offset < self.span && buffer.capacity() == self.buffer_size
    }

    /// Take a free buffer, if any
    pub fn try_acquire_free(&mut self) -> Option<Buffer> {
        self.free.pop_front()
    }

    /// Append `buffer` to the ready queue with its metadata
    ///
    /// Fails with [`PoolError::CapacityExceeded`] when
    /// `payload_len + oob_len` does not fit the buffer; the buffer is then
    /// recycled into the free list.
    pub fn enqueue_ready(
        &mut self,
        mut buffer: Buffer,
        payload_len: u32,
        oob_len: u32,
        flags: BufferFlags,
    ) -> PoolResult<()> {
        let fits = payload_len
            .checked_add(oob_len)
            .is_some_and(|total| total as usize <= buffer.capacity());
        if !fits {
            self.release(buffer);
            return Err(PoolError::CapacityExceeded);
        }
        buffer.set_meta(payload_len, oob_len, flags);
        self.ready.push_back(buffer);
        Ok(())
    }

    /// Pop the oldest ready buffer
    pub fn dequeue_ready_try(&mut self) -> Option<Buffer> {
        self.ready.pop_front()
    }

    /// `(payload_len, oob_len)` of the oldest ready buffer
    pub fn peek_ready(&self) -> Option<(u32, u32)> {
        self.ready.front().map(|buf| (buf.payload_len(), buf.oob_len()))
    }

    /// Return a buffer to the free list
    pub fn release(&mut self, mut buffer: Buffer) {
        buffer.clear_meta();
        self.free.push_back(buffer);
    }

    /// Forget one buffer permanently (see [`Buffer::leak`])
    pub(crate) fn forfeit(&mut self, buffer: Buffer) {
        buffer.leak();
        self.capacity = self.capacity.saturating_sub(1);
    }

    /// Buffers on the free list
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Buffers on the ready queue
    pub fn ready_count(&self) -> usize {
        self.ready.len()
    }

    /// Buffers owned by this pool in total
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Storage size of each buffer
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::collections::HashSet;
    use std::vec::Vec;

    use super::*;

    fn ids(pool: &BufferPool) -> (Vec<u16>, Vec<u16>) {
        (pool.free.iter().map(Buffer::id).collect(), pool.ready.iter().map(Buffer::id).collect())
    }

    #[test]
    fn owns_only_its_own_id_range() {
        let mut pool = BufferPool::with_buffers(3, 64, 10);
        let mut other = BufferPool::with_buffers(3, 64, 13);
        let mine = pool.try_acquire_free().unwrap();
        let theirs = other.try_acquire_free().unwrap();

        assert!(pool.owns(&mine));
        assert!(!pool.owns(&theirs));
        assert!(other.owns(&theirs));
        assert!(!pool.owns(&Buffer::new(11, 32)));
        assert!(!BufferPool::empty().owns(&mine));
    }

    #[test]
    fn owns_survives_forfeit() {
        let mut pool = BufferPool::with_buffers(2, 16, 0);
        let first = pool.try_acquire_free().unwrap();
        let second = pool.try_acquire_free().unwrap();
        pool.forfeit(first);
        assert_eq!(pool.capacity(), 1);
        assert!(pool.owns(&second));
    }

    #[test]
    fn with_buffers_allocates_everything_free() {
        let pool = BufferPool::with_buffers(4, 256, 10);
        assert_eq!(pool.free_count(), 4);
        assert_eq!(pool.ready_count(), 0);
        assert_eq!(pool.capacity(), 4);
        assert_eq!(pool.buffer_size(), 256);
        assert_eq!(ids(&pool).0, [10, 11, 12, 13]);
    }

    #[test]
    fn empty_pool_has_nothing() {
        let mut pool = BufferPool::empty();
        assert!(pool.try_acquire_free().is_none());
        assert!(pool.dequeue_ready_try().is_none());
        assert!(pool.peek_ready().is_none());
    }

    #[test]
    fn ready_queue_is_fifo() {
        let mut pool = BufferPool::with_buffers(3, 64, 0);
        let a = pool.try_acquire_free().unwrap();
        let b = pool.try_acquire_free().unwrap();
        let c = pool.try_acquire_free().unwrap();
        let order = [a.id(), b.id(), c.id()];
        pool.enqueue_ready(a, 4, 0, BufferFlags::EMPTY).unwrap();
        pool.enqueue_ready(b, 8, 0, BufferFlags::EMPTY).unwrap();
        pool.enqueue_ready(c, 12, 0, BufferFlags::EMPTY).unwrap();

        assert_eq!(pool.peek_ready(), Some((4, 0)));
        let out: Vec<u16> =
            core::iter::from_fn(|| pool.dequeue_ready_try()).map(|buf| buf.id()).collect();
        assert_eq!(out, order);
    }

    #[test]
    fn enqueue_records_metadata() {
        let mut pool = BufferPool::with_buffers(1, 64, 0);
        let buf = pool.try_acquire_free().unwrap();
        pool.enqueue_ready(buf, 40, 8, BufferFlags::OVERFLOW_DATA).unwrap();
        let buf = pool.dequeue_ready_try().unwrap();
        assert_eq!(buf.payload_len(), 40);
        assert_eq!(buf.oob_len(), 8);
        assert!(buf.flags().contains(BufferFlags::OVERFLOW_DATA));
    }

    #[test]
    fn capacity_violation_recycles_buffer() {
        let mut pool = BufferPool::with_buffers(1, 64, 0);
        let buf = pool.try_acquire_free().unwrap();
        assert_eq!(pool.enqueue_ready(buf, 60, 8, BufferFlags::EMPTY), Err(PoolError::CapacityExceeded));
        assert_eq!(pool.free_count(), 1);
        assert_eq!(pool.ready_count(), 0);
    }

    #[test]
    fn capacity_check_does_not_overflow() {
        let mut pool = BufferPool::with_buffers(1, 64, 0);
        let buf = pool.try_acquire_free().unwrap();
        assert_eq!(
            pool.enqueue_ready(buf, u32::MAX, 4, BufferFlags::EMPTY),
            Err(PoolError::CapacityExceeded)
        );
        assert_eq!(pool.free_count(), 1);
    }

    #[test]
    fn release_clears_metadata() {
        let mut pool = BufferPool::with_buffers(1, 64, 0);
        let buf = pool.try_acquire_free().unwrap();
        pool.enqueue_ready(buf, 16, 4, BufferFlags::OVERFLOW_OOB).unwrap();
        let buf = pool.dequeue_ready_try().unwrap();
        pool.release(buf);
        let buf = pool.try_acquire_free().unwrap();
        assert!(buf.is_empty());
        assert!(buf.flags().is_empty());
    }

    #[test]
    fn forfeit_shrinks_capacity() {
        let mut pool = BufferPool::with_buffers(2, 64, 0);
        let buf = pool.try_acquire_free().unwrap();
        pool.forfeit(buf);
        assert_eq!(pool.capacity(), 1);
        assert_eq!(pool.free_count(), 1);
    }

    /// No buffer id is ever in two places, and none disappears, across a
    /// deterministic pseudo-random sequence of pool operations.
    #[test]
    fn no_double_ownership_under_random_operations() {
        const COUNT: usize = 6;
        let mut pool = BufferPool::with_buffers(COUNT, 32, 100);
        let mut held: Vec<Buffer> = Vec::new();
        let mut seed: u32 = 0x1234_5678;

        for _ in 0..2000 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            match seed % 4 {
                0 => {
                    if let Some(buf) = pool.try_acquire_free() {
                        held.push(buf);
                    }
                }
                1 => {
                    if let Some(buf) = held.pop() {
                        pool.enqueue_ready(buf, seed % 32 & !3, 0, BufferFlags::EMPTY).unwrap();
                    }
                }
                2 => {
                    if let Some(buf) = pool.dequeue_ready_try() {
                        held.push(buf);
                    }
                }
                _ => {
                    if let Some(buf) = held.pop() {
                        pool.release(buf);
                    }
                }
            }

            let (free, ready) = ids(&pool);
            let mut seen = HashSet::new();
            for id in free.iter().chain(ready.iter()).copied().chain(held.iter().map(Buffer::id)) {
                assert!(seen.insert(id), "buffer {id} owned twice");
            }
            assert_eq!(seen.len(), COUNT);
        }
    }
}
