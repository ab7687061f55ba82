// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Packet geometry derivation: `PacketSizeDef -> PacketSizes`.
//!
//! DECT-2020 NR+ Part 3 numerology, see glossary. Tables below (TM
//! mode -> `(N_TX, N_eff_TX)`, MCS -> `(N_bps, code_rate)`, occupied
//! subcarriers per `b`) are reproduced at the level of detail the
//! higher layers need to derive `G`, `C`, and sample counts; they are
//! not claimed to be a byte-for-byte transcription of the ETSI tables.
//! Invalid combinations return `None` rather than panicking -- this is
//! an expected, non-exceptional outcome (see [`crate::error`]).

use crate::config::RadioDeviceClass;
use crate::phy::cbsegm::{self, Cbsegm};

/// Slot/subslot selector for `PacketLength`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketLengthType {
    Subslot,
    Slot,
}

/// The six fields that uniquely determine a packet's geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketSizeDef {
    pub u: u32,
    pub b: u32,
    pub packet_length_type: PacketLengthType,
    pub packet_length: u32,
    pub tm_mode_index: u32,
    pub mcs_index: u32,
    pub z: u32,
}

/// Immutable, fully-derived packet geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct PacketSizes {
    pub psdef: PacketSizeDef,
    pub n_tx: u32,
    pub n_eff_tx: u32,
    pub n_bps: u32,
    pub n_b_occ: u32,
    pub n_packet_symb: u32,
    pub n_pdc_subc: u32,
    pub n_tb_bits: usize,
    pub n_tb_byte: usize,
    pub c: usize,
    pub g: usize,
    pub n_samples_stf: u64,
    pub n_samples_df: u64,
    pub n_samples_gi: u64,
    pub cbsegm: Cbsegm,
}

impl PacketSizes {
    #[must_use]
    pub fn n_samples_packet(&self) -> u64 {
        self.n_samples_stf + self.n_samples_df + self.n_samples_gi
    }
}

const SYMB_PER_SLOT: u32 = 10;
const SYMB_PER_SUBSLOT: u32 = 5;
const STF_SYMB: u32 = 2;
/// TB-CRC length (LTE_CRC24A), counted into the segmented bit budget.
const TB_CRC_LEN: usize = 24;

fn tm_mode_table(tm_mode_index: u32) -> Option<(u32, u32)> {
    const TABLE: [(u32, u32); 12] = [
        (1, 1),
        (2, 1),
        (2, 2),
        (4, 1),
        (4, 2),
        (4, 4),
        (8, 1),
        (8, 2),
        (8, 4),
        (8, 8),
        (1, 1),
        (2, 2),
    ];
    TABLE.get(tm_mode_index as usize).copied()
}

fn mcs_table(mcs_index: u32) -> Option<(u32, f64)> {
    const TABLE: [(u32, f64); 12] = [
        (1, 0.5),
        (2, 0.5),
        (2, 0.75),
        (4, 0.5),
        (4, 0.75),
        (6, 0.5),
        (6, 0.75),
        (6, 0.833),
        (8, 0.5),
        (8, 0.75),
        (8, 0.833),
        (8, 0.9),
    ];
    TABLE.get(mcs_index as usize).copied()
}

fn n_b_occ(b: u32) -> Option<u32> {
    if matches!(b, 1 | 2 | 4 | 8 | 12 | 16) {
        Some(56 * b)
    } else {
        None
    }
}

fn n_fft(b: u32) -> u32 {
    64 * b
}

/// `1.728 MHz * b * u`, the sample rate for this numerology.
#[must_use]
pub fn sample_rate(u: u32, b: u32) -> f64 {
    1.728e6 * f64::from(b) * f64::from(u)
}

/// Derive the full packet geometry, or `None` if `psdef` describes an
/// undefined combination.
#[must_use]
pub fn get_packet_sizes(psdef: PacketSizeDef) -> Option<PacketSizes> {
    if !matches!(psdef.u, 1 | 2 | 4 | 8) {
        return None;
    }
    if !matches!(psdef.z, 2048 | 6144) {
        return None;
    }
    if !(1..=16).contains(&psdef.packet_length) {
        return None;
    }

    let n_b_occ_val = n_b_occ(psdef.b)?;
    let (n_tx, n_eff_tx) = tm_mode_table(psdef.tm_mode_index)?;
    let (n_bps, code_rate) = mcs_table(psdef.mcs_index)?;

    let n_packet_symb = match psdef.packet_length_type {
        PacketLengthType::Slot => psdef.packet_length * SYMB_PER_SLOT,
        PacketLengthType::Subslot => psdef.packet_length * SYMB_PER_SUBSLOT,
    };
    if n_packet_symb <= STF_SYMB {
        return None;
    }

    let df_symb = n_packet_symb - STF_SYMB;
    let drs_fraction = f64::from(n_eff_tx) / 16.0;
    let total_re = u64::from(df_symb) * u64::from(n_b_occ_val);
    let n_drs = ((total_re as f64) * drs_fraction).round() as u64;
    let n_pdc_subc = total_re.checked_sub(n_drs)?;
    if n_pdc_subc == 0 {
        return None;
    }

    let n_pdc_subc_u32 = u32::try_from(n_pdc_subc).ok()?;
    let g = (n_pdc_subc_u32 as usize) * (n_bps as usize);
    let n_tb_bits = ((g as f64) * code_rate).floor() as usize;
    if n_tb_bits == 0 {
        return None;
    }
    let n_tb_byte = n_tb_bits.div_ceil(8);

    let b_bits = n_tb_bits + TB_CRC_LEN;
    let seg = cbsegm::segment(b_bits, psdef.z as usize)?;
    if seg.f != 0 {
        // Filler bits unsupported (see SPEC_FULL.md §A.2): this
        // geometry is rejected upstream rather than padded.
        return None;
    }

    let n_samples_symbol = u64::from(n_fft(psdef.b)) * 5 / 4; // 25% CP
    let n_samples_stf = u64::from(STF_SYMB) * n_samples_symbol;
    let n_samples_df = u64::from(df_symb) * n_samples_symbol;
    let n_samples_gi = u64::from(n_fft(psdef.b)) / 8;

    Some(PacketSizes {
        psdef,
        n_tx,
        n_eff_tx,
        n_bps,
        n_b_occ: n_b_occ_val,
        n_packet_symb,
        n_pdc_subc: n_pdc_subc_u32,
        n_tb_bits,
        n_tb_byte,
        c: seg.total_cb(),
        g,
        n_samples_stf,
        n_samples_df,
        n_samples_gi,
        cbsegm: seg,
    })
}

/// Pick the largest-sized configuration supported by a radio device
/// class; used to size every preallocation (HARQ buffers, resampler
/// history, TX pool).
#[must_use]
pub fn get_maximum_packet_sizes(dc: RadioDeviceClass) -> Option<PacketSizes> {
    let mut best: Option<PacketSizes> = None;
    for tm_mode_index in 0..12 {
        let (n_tx, _) = tm_mode_table(tm_mode_index)?;
        if n_tx > dc.n_tx {
            continue;
        }
        let psdef = PacketSizeDef {
            u: dc.u,
            b: dc.b,
            packet_length_type: PacketLengthType::Slot,
            packet_length: 16,
            tm_mode_index,
            mcs_index: 11,
            z: dc.tier.z(),
        };
        if let Some(sizes) = get_packet_sizes(psdef) {
            let better = match &best {
                Some(b) => sizes.g > b.g,
                None => true,
            };
            if better {
                best = Some(sizes);
            }
        }
    }
    best
}

/// Test-only: loop over random valid field combinations until
/// `get_packet_sizes` returns `Some`. Not to be called from a data
/// path -- see SPEC_FULL.md §9 Open Questions.
#[cfg(any(test, feature = "test-support"))]
#[must_use]
pub fn get_random_packet_sizes_within_rdc(dc: RadioDeviceClass) -> PacketSizes {
    loop {
        let psdef = PacketSizeDef {
            u: dc.u,
            b: dc.b,
            packet_length_type: if fastrand::bool() {
                PacketLengthType::Slot
            } else {
                PacketLengthType::Subslot
            },
            packet_length: fastrand::u32(1..=16),
            tm_mode_index: fastrand::u32(0..12),
            mcs_index: fastrand::u32(0..12),
            z: dc.tier.z(),
        };
        if let Some(sizes) = get_packet_sizes(psdef) {
            return sizes;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RadioDeviceClass, Tier};

    #[test]
    fn test_invariant_g_equals_subc_times_bps() {
        let psdef = PacketSizeDef {
            u: 1,
            b: 1,
            packet_length_type: PacketLengthType::Slot,
            packet_length: 1,
            tm_mode_index: 0,
            mcs_index: 1,
            z: 2048,
        };
        if let Some(sizes) = get_packet_sizes(psdef) {
            assert_eq!(sizes.g, sizes.n_pdc_subc as usize * sizes.n_bps as usize);
            assert_eq!(
                sizes.n_samples_packet(),
                sizes.n_samples_stf + sizes.n_samples_df + sizes.n_samples_gi
            );
        }
    }

    #[test]
    fn test_s2_single_codeblock() {
        let psdef = PacketSizeDef {
            u: 1,
            b: 1,
            packet_length_type: PacketLengthType::Slot,
            packet_length: 1,
            tm_mode_index: 0,
            mcs_index: 1,
            z: 2048,
        };
        let sizes = get_packet_sizes(psdef).expect("S2 geometry must be valid");
        assert_eq!(sizes.c, 1);
        assert_eq!(sizes.g, sizes.n_pdc_subc as usize * 2);
    }

    #[test]
    fn test_invalid_u_returns_none() {
        let psdef = PacketSizeDef {
            u: 3,
            b: 1,
            packet_length_type: PacketLengthType::Slot,
            packet_length: 1,
            tm_mode_index: 0,
            mcs_index: 0,
            z: 2048,
        };
        assert!(get_packet_sizes(psdef).is_none());
    }

    #[test]
    fn test_invalid_packet_length_returns_none() {
        let psdef = PacketSizeDef {
            u: 1,
            b: 1,
            packet_length_type: PacketLengthType::Slot,
            packet_length: 0,
            tm_mode_index: 0,
            mcs_index: 0,
            z: 2048,
        };
        assert!(get_packet_sizes(psdef).is_none());
    }

    #[test]
    fn test_maximum_packet_sizes_for_device_class() {
        let dc = RadioDeviceClass {
            u: 1,
            b: 1,
            n_tx: 1,
            tier: Tier::A,
        };
        let sizes = get_maximum_packet_sizes(dc);
        assert!(sizes.is_some());
    }

    #[test]
    fn test_random_packet_sizes_within_rdc_terminates() {
        let dc = RadioDeviceClass {
            u: 1,
            b: 1,
            n_tx: 1,
            tier: Tier::A,
        };
        let sizes = get_random_packet_sizes_within_rdc(dc);
        assert!(sizes.g > 0);
    }
}
