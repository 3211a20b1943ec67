use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::SyncResult;

/// A 64-bit atomic integer with the same fallible contract as the rest of
/// this crate, so callers can treat every primitive uniformly even though
/// atomic operations can't actually fail on any platform this crate
/// targets.
#[derive(Debug, Default)]
pub struct Atomic64 {
    inner: AtomicU64,
}

impl Atomic64 {
    #[must_use]
    pub fn new(value: u64) -> Self {
        Self { inner: AtomicU64::new(value) }
    }

    pub fn load(&self, order: Ordering) -> SyncResult<u64> {
        Ok(self.inner.load(order))
    }

    pub fn store(&self, value: u64, order: Ordering) -> SyncResult<()> {
        self.inner.store(value, order);
        Ok(())
    }

    pub fn exchange(&self, value: u64, order: Ordering) -> SyncResult<u64> {
        Ok(self.inner.swap(value, order))
    }

    pub fn compare_and_swap(
        &self,
        current: u64,
        new:     u64,
        success: Ordering,
        failure: Ordering,
    ) -> SyncResult<Result<u64, u64>> {
        Ok(self.inner.compare_exchange(current, new, success, failure))
    }

    pub fn fetch_add(&self, value: u64, order: Ordering) -> SyncResult<u64> {
        Ok(self.inner.fetch_add(value, order))
    }

    pub fn fetch_sub(&self, value: u64, order: Ordering) -> SyncResult<u64> {
        Ok(self.inner.fetch_sub(value, order))
    }

    pub fn fetch_and(&self, value: u64, order: Ordering) -> SyncResult<u64> {
        Ok(self.inner.fetch_and(value, order))
    }

    pub fn fetch_or(&self, value: u64, order: Ordering) -> SyncResult<u64> {
        Ok(self.inner.fetch_or(value, order))
    }

    pub fn fetch_xor(&self, value: u64, order: Ordering) -> SyncResult<u64> {
        Ok(self.inner.fetch_xor(value, order))
    }
}
