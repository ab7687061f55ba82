// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! LTE-style pseudo-random scrambling sequences (3GPP TS 36.211 §7.2),
//! keyed for DECT NR+ by network id.
//!
//! `ScramblingPdc` is append-only after PHY startup (spec: "inserted
//! before first use; lifetime = object lifetime"), so a `DashMap` gives
//! every worker thread lock-free reads on the common case (sequence
//! already present) and only contends on first insert for a given
//! network id.

use crate::config::PCC_SCRAMBLING_G_INIT;
use dashmap::DashMap;
use std::sync::OnceLock;

const GOLD_NC: usize = 1600;

/// Generate `length` bits of the LTE Gold sequence seeded by `c_init`.
#[must_use]
pub fn generate_lte_pr_sequence(c_init: u32, length: usize) -> Vec<u8> {
    let total = GOLD_NC + length;
    let mut x1 = vec![0u8; total];
    let mut x2 = vec![0u8; total];
    x1[0] = 1;
    for i in 0..31 {
        x2[i] = ((c_init >> i) & 1) as u8;
    }
    for n in 0..total - 31 {
        x1[n + 31] = x1[n + 3] ^ x1[n];
        x2[n + 31] = x2[n + 3] ^ x2[n + 2] ^ x2[n + 1] ^ x2[n];
    }
    (0..length).map(|n| x1[n + GOLD_NC] ^ x2[n + GOLD_NC]).collect()
}

/// XOR `seq[bit_offset..bit_offset+data.len()]` into `data` in place.
pub fn scramble_into(data: &mut [u8], seq: &[u8], bit_offset: usize) {
    for (i, d) in data.iter_mut().enumerate() {
        *d ^= seq[bit_offset + i];
    }
}

fn pcc_sequence_cell() -> &'static Vec<u8> {
    static SEQ: OnceLock<Vec<u8>> = OnceLock::new();
    SEQ.get_or_init(|| generate_lte_pr_sequence(PCC_SCRAMBLING_G_INIT, crate::config::PCC_N_BITS_SCRAMBLED))
}

/// The single fixed PCC scrambling sequence (`g_init = 0x44454354`).
#[must_use]
pub fn pcc_scrambling_sequence() -> &'static [u8] {
    pcc_sequence_cell().as_slice()
}

/// Seed derivation for PDC scrambling: type 1 takes the 8 LSBs of
/// `network_id`, type 2 the 24 MSBs.
fn seed_for(network_id: u32, plcf_type: u8) -> u32 {
    match plcf_type {
        1 => network_id & 0xFF,
        2 => network_id >> 8,
        _ => unreachable!("PLCF type must be 1 or 2"),
    }
}

/// Per-network-id PDC scrambling sequences, one per PLCF type,
/// precomputed to `g_max` bits on first use.
pub struct ScramblingPdc {
    g_max: usize,
    table: DashMap<(u32, u8), Vec<u8>>,
}

impl ScramblingPdc {
    #[must_use]
    pub fn new(g_max: usize) -> Self {
        Self {
            g_max,
            table: DashMap::new(),
        }
    }

    /// Return the sequence for `(network_id, plcf_type)`, generating
    /// and caching it on first call for that key.
    pub fn get(&self, network_id: u32, plcf_type: u8) -> dashmap::mapref::one::Ref<'_, (u32, u8), Vec<u8>> {
        self.table
            .entry((network_id, plcf_type))
            .or_insert_with(|| generate_lte_pr_sequence(seed_for(network_id, plcf_type), self.g_max));
        self.table.get(&(network_id, plcf_type)).expect("just inserted")
    }

    #[must_use]
    pub fn g_max(&self) -> usize {
        self.g_max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_length() {
        let seq = generate_lte_pr_sequence(42, 500);
        assert_eq!(seq.len(), 500);
        assert!(seq.iter().all(|&b| b == 0 || b == 1));
    }

    #[test]
    fn test_sequence_deterministic() {
        let a = generate_lte_pr_sequence(0x1234, 128);
        let b = generate_lte_pr_sequence(0x1234, 128);
        assert_eq!(a, b);
    }

    #[test]
    fn test_sequence_seed_sensitive() {
        let a = generate_lte_pr_sequence(1, 64);
        let b = generate_lte_pr_sequence(2, 64);
        assert_ne!(a, b);
    }

    #[test]
    fn test_scramble_descramble_round_trip() {
        let seq = generate_lte_pr_sequence(7, 64);
        let mut data = vec![1u8, 0, 1, 1, 0, 0, 1, 0];
        let original = data.clone();
        scramble_into(&mut data, &seq, 16);
        assert_ne!(data, original);
        scramble_into(&mut data, &seq, 16);
        assert_eq!(data, original);
    }

    #[test]
    fn test_scrambling_pdc_per_network_id_caching() {
        let spdc = ScramblingPdc::new(200);
        let s1 = spdc.get(10, 1).clone();
        let s2 = spdc.get(10, 1).clone();
        assert_eq!(s1, s2);
        let s3 = spdc.get(11, 1).clone();
        assert_ne!(s1, s3);
    }

    #[test]
    fn test_scrambling_pdc_type_differs() {
        let spdc = ScramblingPdc::new(200);
        let t1 = spdc.get(0x00AB_CDEF, 1).clone();
        let t2 = spdc.get(0x00AB_CDEF, 2).clone();
        assert_ne!(t1, t2);
    }

    #[test]
    fn test_pcc_scrambling_sequence_length() {
        assert_eq!(pcc_scrambling_sequence().len(), crate::config::PCC_N_BITS_SCRAMBLED);
    }
}
