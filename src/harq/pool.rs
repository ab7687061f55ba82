// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `HarqProcessPool`: a fixed-size pool of [`HarqProcessTx`]/[`HarqProcessRx`]
//! acquired by non-blocking linear scan.
//!
//! Sized once at startup (worker count is bounded, never grows at
//! runtime) and shared behind an `Arc` -- the pool itself holds no
//! lock beyond what each process already has, so a full-pool scan
//! under contention is still wait-free for any thread not racing the
//! exact same slot.

use crate::error::{Error, Result};
use crate::harq::process::{HarqProcessRx, HarqProcessTx};

pub struct HarqProcessPool {
    tx: Vec<HarqProcessTx>,
    rx: Vec<HarqProcessRx>,
}

impl HarqProcessPool {
    /// Build a pool with `n_tx` TX processes and `n_rx` RX processes.
    #[must_use]
    pub fn new(n_tx: usize, n_rx: usize) -> Self {
        Self {
            tx: (0..n_tx).map(HarqProcessTx::new).collect(),
            rx: (0..n_rx).map(HarqProcessRx::new).collect(),
        }
    }

    #[must_use]
    pub fn n_tx(&self) -> usize {
        self.tx.len()
    }

    #[must_use]
    pub fn n_rx(&self) -> usize {
        self.rx.len()
    }

    /// Scan for a free TX process and acquire it for `(network_id, a_bits)`.
    pub fn get_process_tx(&self, network_id: u32, a_bits: Vec<u8>) -> Result<&HarqProcessTx> {
        for p in &self.tx {
            if p.try_acquire(network_id, a_bits.clone()) {
                crate::debug!("HarqProcessPool: acquired tx process {}", p.id());
                return Ok(p);
            }
        }
        Err(Error::HarqProcessExhausted)
    }

    /// Scan for a free RX process and acquire it for `network_id`.
    pub fn get_process_rx(&self, network_id: u32) -> Result<&HarqProcessRx> {
        for p in &self.rx {
            if p.try_acquire(network_id) {
                crate::debug!("HarqProcessPool: acquired rx process {}", p.id());
                return Ok(p);
            }
        }
        Err(Error::HarqProcessExhausted)
    }

    /// Find the TX process already running `network_id`, if any --
    /// used to hand a retransmission back to the same process rather
    /// than acquiring a fresh one.
    #[must_use]
    pub fn get_process_tx_running(&self, network_id: u32) -> Option<&HarqProcessTx> {
        self.tx
            .iter()
            .find(|p| p.is_acquired() && p.network_id() == network_id)
    }

    #[must_use]
    pub fn get_process_rx_running(&self, network_id: u32) -> Option<&HarqProcessRx> {
        self.rx
            .iter()
            .find(|p| p.is_acquired() && p.network_id() == network_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_exhausts_then_frees() {
        let pool = HarqProcessPool::new(2, 2);
        let p0 = pool.get_process_tx(1, vec![]).unwrap();
        let p1 = pool.get_process_tx(2, vec![]).unwrap();
        assert_ne!(p0.id(), p1.id());
        assert!(pool.get_process_tx(3, vec![]).is_err());
        p0.finalize(crate::harq::process::FinalizeTx::Release);
        assert!(pool.get_process_tx(4, vec![]).is_ok());
    }

    #[test]
    fn test_pool_finds_running_process_by_network_id() {
        let pool = HarqProcessPool::new(2, 2);
        pool.get_process_tx(42, vec![1]).unwrap();
        let found = pool.get_process_tx_running(42);
        assert!(found.is_some());
        assert!(pool.get_process_tx_running(999).is_none());
    }

    #[test]
    fn test_rx_pool_acquire_and_lookup() {
        let pool = HarqProcessPool::new(1, 1);
        pool.get_process_rx(7).unwrap();
        assert!(pool.get_process_rx_running(7).is_some());
        assert!(pool.get_process_rx(8).is_err());
    }
}
