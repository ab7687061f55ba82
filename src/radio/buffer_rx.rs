// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `BufferRx`: a lock-free(ish) ring of received IQ samples shared
//! between the HW driver thread (writer) and PHY worker threads
//! (readers), indexed by absolute sample count rather than a wrapping
//! cursor so callers never need to reason about ring wraparound.

use crate::phy::Cplx;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// How long `wait_until_nto` blocks before giving up.
const WAIT_TIMEOUT: Duration = Duration::from_millis(100);

/// Ring of per-antenna IQ sample streams.
pub struct BufferRx {
    slots: RwLock<Vec<Vec<Cplx>>>,
    n_ant: usize,
    /// Absolute sample count written so far (monotonic).
    rx_time_passed_64: AtomicU64,
    /// Length in samples of a pre-stream warm-up period during which
    /// reads are expected to return silence rather than being treated
    /// as a buffer underrun.
    prestream_samples: u64,
}

impl BufferRx {
    #[must_use]
    pub fn new(n_ant: usize, capacity_samples: usize, prestream_samples: u64) -> Self {
        Self {
            slots: RwLock::new(vec![vec![Cplx::ZERO; capacity_samples]; n_ant]),
            n_ant,
            rx_time_passed_64: AtomicU64::new(0),
            prestream_samples,
        }
    }

    #[must_use]
    pub fn n_ant(&self) -> usize {
        self.n_ant
    }

    #[must_use]
    pub fn rx_time_passed_64(&self) -> u64 {
        self.rx_time_passed_64.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_prestream(&self) -> bool {
        self.rx_time_passed_64() < self.prestream_samples
    }

    /// Write one block of samples per antenna, advancing the clock.
    pub fn write_ant_streams(&self, blocks: &[Vec<Cplx>]) {
        debug_assert_eq!(blocks.len(), self.n_ant);
        let capacity = self.slots.read()[0].len();
        let base = self.rx_time_passed_64() as usize;
        let mut slots = self.slots.write();
        for (ant, block) in blocks.iter().enumerate() {
            for (i, &s) in block.iter().enumerate() {
                slots[ant][(base + i) % capacity] = s;
            }
        }
        let n = blocks.first().map_or(0, Vec::len);
        drop(slots);
        self.rx_time_passed_64.fetch_add(n as u64, Ordering::AcqRel);
    }

    /// Fetch `n` samples per antenna starting at absolute sample time
    /// `at`, without blocking for data that hasn't arrived yet.
    #[must_use]
    pub fn get_ant_streams(&self, at: u64, n: usize) -> Vec<Vec<Cplx>> {
        let slots = self.slots.read();
        let capacity = slots[0].len();
        slots
            .iter()
            .map(|stream| (0..n).map(|i| stream[((at as usize) + i) % capacity]).collect())
            .collect()
    }

    /// Fetch the next `n` samples per antenna relative to the current
    /// write clock (i.e. the most recently completed `n` samples).
    #[must_use]
    pub fn get_ant_streams_next(&self, n: usize) -> Vec<Vec<Cplx>> {
        let at = self.rx_time_passed_64().saturating_sub(n as u64);
        self.get_ant_streams(at, n)
    }

    /// Block (bounded by [`WAIT_TIMEOUT`]) until the write clock has
    /// passed absolute sample time `nto`. Returns `false` on timeout.
    #[must_use]
    pub fn wait_until_nto(&self, nto: u64) -> bool {
        let deadline = Instant::now() + WAIT_TIMEOUT;
        while self.rx_time_passed_64() < nto {
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::yield_now();
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_back() {
        let buf = BufferRx::new(1, 1024, 0);
        let block = vec![Cplx::new(1.0, 2.0); 50];
        buf.write_ant_streams(&[block.clone()]);
        assert_eq!(buf.rx_time_passed_64(), 50);
        let out = buf.get_ant_streams(0, 50);
        assert_eq!(out[0], block);
    }

    #[test]
    fn test_prestream_flag() {
        let buf = BufferRx::new(1, 1024, 100);
        assert!(buf.is_prestream());
        buf.write_ant_streams(&[vec![Cplx::ZERO; 100]]);
        assert!(!buf.is_prestream());
    }

    #[test]
    fn test_wait_until_nto_succeeds_after_write() {
        let buf = BufferRx::new(1, 1024, 0);
        buf.write_ant_streams(&[vec![Cplx::ZERO; 10]]);
        assert!(buf.wait_until_nto(10));
    }

    #[test]
    fn test_wait_until_nto_times_out() {
        let buf = BufferRx::new(1, 1024, 0);
        assert!(!buf.wait_until_nto(1_000_000));
    }

    #[test]
    fn test_get_ant_streams_next() {
        let buf = BufferRx::new(2, 1024, 0);
        buf.write_ant_streams(&[vec![Cplx::new(1.0, 0.0); 20], vec![Cplx::new(2.0, 0.0); 20]]);
        let out = buf.get_ant_streams_next(20);
        assert_eq!(out[0][0], Cplx::new(1.0, 0.0));
        assert_eq!(out[1][0], Cplx::new(2.0, 0.0));
    }
}
