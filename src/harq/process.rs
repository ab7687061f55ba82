// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `HarqProcessTx`/`HarqProcessRx`: one slot of a [`super::pool::HarqProcessPool`].
//!
//! Each process uses a two-level lock: an outer `Mutex<bool>` ("is
//! this slot currently assigned to a transport block") gates
//! acquisition/release, and an inner `Mutex` around the mutable state
//! (rv, softbuffer, finalize policy) gates the actual read/modify/write
//! a PHY worker performs while holding the slot. Splitting them lets
//! [`super::pool::HarqProcessPool::get_process_tx_running`] check "is
//! this slot busy" without fighting a worker that is mid-update on the
//! inner state.

use crate::config::{next_rv, MAX_RV_UNWRAPPED};
use crate::harq::buffers::{HarqBufferRx, HarqBufferTx};
use parking_lot::Mutex;

/// What happens to a TX process once its current transmission
/// attempt completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeTx {
    /// Stay acquired; advance rv and wait for the next PDU of the same TB.
    Retransmit,
    /// HARQ feedback (ACK) or retransmission budget exhausted: release
    /// the slot back to the pool.
    Release,
}

/// What happens to an RX process once a decode attempt completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeRx {
    /// CRC failed: keep the slot, combine the next rv's soft bits.
    AwaitRetransmission,
    /// CRC passed, or retransmission budget exhausted: release.
    Release,
}

struct TxState {
    network_id: u32,
    rv: u8,
    rv_unwrapped: u32,
    buf: HarqBufferTx,
}

/// One TX HARQ process.
pub struct HarqProcessTx {
    id: usize,
    acquired: Mutex<bool>,
    state: Mutex<TxState>,
}

impl HarqProcessTx {
    #[must_use]
    pub fn new(id: usize) -> Self {
        Self {
            id,
            acquired: Mutex::new(false),
            state: Mutex::new(TxState {
                network_id: 0,
                rv: 0,
                rv_unwrapped: 0,
                buf: HarqBufferTx::new(),
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    #[must_use]
    pub fn is_acquired(&self) -> bool {
        *self.acquired.lock()
    }

    /// Non-blocking acquire: `false` if already in use.
    pub fn try_acquire(&self, network_id: u32, a_bits: Vec<u8>) -> bool {
        let mut acquired = self.acquired.lock();
        if *acquired {
            return false;
        }
        *acquired = true;
        let mut st = self.state.lock();
        st.network_id = network_id;
        st.rv = 0;
        st.rv_unwrapped = 0;
        st.buf.set(a_bits);
        true
    }

    #[must_use]
    pub fn rv(&self) -> u8 {
        self.state.lock().rv
    }

    #[must_use]
    pub fn a_bits(&self) -> Vec<u8> {
        self.state.lock().buf.a_bits.clone()
    }

    #[must_use]
    pub fn network_id(&self) -> u32 {
        self.state.lock().network_id
    }

    /// Advance to the next rv in the HARQ cycle. Panics in debug
    /// builds if `rv_unwrapped` would exceed `MAX_RV_UNWRAPPED` -- the
    /// caller is expected to have released the process on ACK or a
    /// giving-up policy well before this point.
    pub fn advance_rv(&self) {
        let mut st = self.state.lock();
        st.rv = next_rv(st.rv);
        st.rv_unwrapped += 1;
        debug_assert!(
            st.rv_unwrapped <= MAX_RV_UNWRAPPED,
            "HARQ TX process {} exceeded MAX_RV_UNWRAPPED",
            self.id
        );
    }

    /// Apply `policy`, releasing the slot on [`FinalizeTx::Release`].
    pub fn finalize(&self, policy: FinalizeTx) {
        if policy == FinalizeTx::Release {
            let mut st = self.state.lock();
            st.buf.clear();
            drop(st);
            *self.acquired.lock() = false;
        }
    }
}

struct RxState {
    network_id: u32,
    rv: u8,
    buf: HarqBufferRx,
}

/// One RX HARQ process.
pub struct HarqProcessRx {
    id: usize,
    acquired: Mutex<bool>,
    state: Mutex<RxState>,
}

impl HarqProcessRx {
    #[must_use]
    pub fn new(id: usize) -> Self {
        Self {
            id,
            acquired: Mutex::new(false),
            state: Mutex::new(RxState {
                network_id: 0,
                rv: 0,
                buf: HarqBufferRx::new(),
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    #[must_use]
    pub fn is_acquired(&self) -> bool {
        *self.acquired.lock()
    }

    pub fn try_acquire(&self, network_id: u32) -> bool {
        let mut acquired = self.acquired.lock();
        if *acquired {
            return false;
        }
        *acquired = true;
        let mut st = self.state.lock();
        st.network_id = network_id;
        st.rv = 0;
        st.buf.clear();
        true
    }

    #[must_use]
    pub fn network_id(&self) -> u32 {
        self.state.lock().network_id
    }

    /// Combine newly-received soft LLRs into this process's buffer.
    pub fn combine(&self, llr: &[crate::phy::turbo::Llr]) {
        self.state.lock().buf.combine(llr);
    }

    #[must_use]
    pub fn combined_llr(&self) -> Vec<crate::phy::turbo::Llr> {
        self.state.lock().buf.combined_llr()
    }

    pub fn advance_rv(&self) {
        let mut st = self.state.lock();
        st.rv = next_rv(st.rv);
    }

    pub fn finalize(&self, policy: FinalizeRx) {
        if policy == FinalizeRx::Release {
            let mut st = self.state.lock();
            st.buf.clear();
            drop(st);
            *self.acquired.lock() = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tx_process_acquire_release_cycle() {
        let p = HarqProcessTx::new(0);
        assert!(!p.is_acquired());
        assert!(p.try_acquire(1, vec![1, 0, 1]));
        assert!(p.is_acquired());
        assert!(!p.try_acquire(2, vec![])); // already in use
        p.finalize(FinalizeTx::Release);
        assert!(!p.is_acquired());
    }

    #[test]
    fn test_tx_process_rv_progression() {
        let p = HarqProcessTx::new(0);
        p.try_acquire(1, vec![]);
        assert_eq!(p.rv(), 0);
        p.advance_rv();
        assert_eq!(p.rv(), 2);
        p.advance_rv();
        assert_eq!(p.rv(), 3);
        p.advance_rv();
        assert_eq!(p.rv(), 1);
        p.advance_rv();
        assert_eq!(p.rv(), 0);
    }

    #[test]
    fn test_rx_process_combines_across_acquire() {
        let p = HarqProcessRx::new(0);
        assert!(p.try_acquire(5));
        p.combine(&[10, -10]);
        p.combine(&[10, -10]);
        assert_eq!(p.combined_llr(), vec![20, -20]);
        p.finalize(FinalizeRx::Release);
        assert!(!p.is_acquired());
    }

    #[test]
    fn test_rx_process_retains_on_retransmission() {
        let p = HarqProcessRx::new(0);
        p.try_acquire(5);
        p.combine(&[1, 1]);
        p.finalize(FinalizeRx::AwaitRetransmission);
        assert!(p.is_acquired());
        assert_eq!(p.combined_llr(), vec![1, 1]);
    }
}
