// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `BufferTx`/`BufferTxPool`: a freelist of TX sample buffers tagged
//! with a send deadline, so PHY workers can fill a buffer well ahead
//! of its transmit time and hand it to the HW driver thread once
//! ready, without allocating on every packet.

use crate::phy::Cplx;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// One TX buffer slot.
pub struct BufferTx {
    id: usize,
    in_use: Mutex<bool>,
    samples: Mutex<Vec<Cplx>>,
    /// Strictly increasing id assigned at fill time, used by the
    /// driver thread to detect buffers handed off out of order.
    tx_order_id: AtomicU64,
    /// Absolute sample time this buffer should be transmitted at.
    tx_time_64: AtomicU64,
}

impl BufferTx {
    fn new(id: usize) -> Self {
        Self {
            id,
            in_use: Mutex::new(false),
            samples: Mutex::new(Vec::new()),
            tx_order_id: AtomicU64::new(0),
            tx_time_64: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    #[must_use]
    pub fn tx_order_id(&self) -> u64 {
        self.tx_order_id.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn tx_time_64(&self) -> u64 {
        self.tx_time_64.load(Ordering::Acquire)
    }

    pub fn fill(&self, samples: Vec<Cplx>, tx_time_64: u64, order_id: u64) {
        *self.samples.lock() = samples;
        self.tx_time_64.store(tx_time_64, Ordering::Release);
        self.tx_order_id.store(order_id, Ordering::Release);
    }

    #[must_use]
    pub fn samples(&self) -> Vec<Cplx> {
        self.samples.lock().clone()
    }

    fn release(&self) {
        self.samples.lock().clear();
        *self.in_use.lock() = false;
    }
}

/// Fixed-size freelist of [`BufferTx`] slots.
pub struct BufferTxPool {
    slots: Vec<BufferTx>,
    next_order_id: AtomicU64,
    /// Earliest sample time any currently-filled buffer is due at;
    /// used by the driver thread to decide how long it can safely
    /// sleep before the next transmit deadline.
    tx_earliest_64: AtomicU64,
}

impl BufferTxPool {
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            slots: (0..size).map(BufferTx::new).collect(),
            next_order_id: AtomicU64::new(0),
            tx_earliest_64: AtomicU64::new(u64::MAX),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Acquire a free slot and fill it, returning its id. `None` if
    /// the pool is exhausted.
    pub fn acquire_and_fill(&self, samples: Vec<Cplx>, tx_time_64: u64) -> Option<usize> {
        for slot in &self.slots {
            let mut in_use = slot.in_use.lock();
            if *in_use {
                continue;
            }
            *in_use = true;
            drop(in_use);
            let order_id = self.next_order_id.fetch_add(1, Ordering::AcqRel);
            slot.fill(samples, tx_time_64, order_id);
            self.update_earliest();
            return Some(slot.id());
        }
        None
    }

    fn update_earliest(&self) {
        let earliest = self
            .slots
            .iter()
            .filter(|s| *s.in_use.lock())
            .map(BufferTx::tx_time_64)
            .min()
            .unwrap_or(u64::MAX);
        self.tx_earliest_64.store(earliest, Ordering::Release);
    }

    #[must_use]
    pub fn tx_earliest_64(&self) -> u64 {
        self.tx_earliest_64.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn get(&self, id: usize) -> &BufferTx {
        &self.slots[id]
    }

    pub fn release(&self, id: usize) {
        self.slots[id].release();
        self.update_earliest();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_fill_release_cycle() {
        let pool = BufferTxPool::new(2);
        let id0 = pool.acquire_and_fill(vec![Cplx::ZERO; 4], 100).unwrap();
        assert_eq!(pool.tx_earliest_64(), 100);
        let id1 = pool.acquire_and_fill(vec![Cplx::ZERO; 4], 50).unwrap();
        assert_eq!(pool.tx_earliest_64(), 50);
        assert!(pool.acquire_and_fill(vec![], 1).is_none());
        pool.release(id1);
        assert_eq!(pool.tx_earliest_64(), 100);
        pool.release(id0);
        assert_eq!(pool.tx_earliest_64(), u64::MAX);
    }

    #[test]
    fn test_tx_order_id_monotonic() {
        let pool = BufferTxPool::new(3);
        let id0 = pool.acquire_and_fill(vec![], 10).unwrap();
        let id1 = pool.acquire_and_fill(vec![], 20).unwrap();
        assert!(pool.get(id0).tx_order_id() < pool.get(id1).tx_order_id());
    }
}
