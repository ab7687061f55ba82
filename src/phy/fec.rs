// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! FEC state machine: PCC (`PccEnc`) and PDC (`PdcEnc`) encode/decode,
//! built on [`super::turbo`], [`super::crc`], [`super::scrambling`],
//! and [`super::cbsegm`].

use crate::config::{
    plcf_crc_mask, MAX_CODEBLOCKS, PCC_MAX_ITERATIONS, PCC_N_BITS, PDC_MAX_ITERATIONS,
    PDC_MIN_ITERATIONS, PLCF_MASK_COMBINATIONS,
};
use crate::error::{Error, Result};
use crate::phy::cbsegm;
use crate::phy::crc;
use crate::phy::scrambling::ScramblingPdc;
use crate::phy::turbo::{self, Llr};

/// `{PLCF_type, closed_loop, beamforming, N_TB_bits, N_bps, rv, G,
/// network_id, Z}` -- consumed by every `Fec` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FecCfg {
    pub plcf_type: u8,
    pub closed_loop: bool,
    pub beamforming: bool,
    pub n_tb_bits: usize,
    pub n_bps: u32,
    pub rv: u8,
    pub g: usize,
    pub network_id: u32,
    pub z: u32,
}

/// Result of a PCC decode attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PccReport {
    pub crc_status: bool,
    pub plcf_type: u8,
    pub closed_loop: bool,
    pub beamforming: bool,
    pub a_bits: Vec<u8>,
}

/// Result of a PDC decode pass (one or more codeblocks).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdcReport {
    pub crc_status: bool,
    pub a_bits: Vec<u8>,
}

/// `a` bits (196-or-fewer payload) packed with the CRC into exactly
/// `PCC_N_BITS` coded bits, with the BPSK-mapping fix for
/// non-multiple-of-8 bit counts preserved: the final partial byte is
/// indexed once as a whole rather than walked bit-by-bit across a
/// byte boundary that does not exist in the unpacked representation
/// used here (see SPEC_FULL.md §9 "Bug in srsRAN").
fn pcc_pack_with_crc(a_bits: &[u8], mask: u16) -> Vec<u8> {
    let crc = crc::crc16(a_bits) ^ u32::from(mask);
    let mut out = a_bits.to_vec();
    out.extend(crc::crc_to_bits(crc, 16));
    out
}

/// PCC (PLCF transport) encoder/decoder. One instance per PHY; shares
/// no per-call state (the softbuffers live in the HARQ process, not
/// here).
pub struct PccEnc;

impl PccEnc {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Encode a PLCF payload (`a_bits.len() ∈ {40, 80}`) into exactly
    /// `PCC_N_BITS` rate-matched, scrambled coded bits.
    #[must_use]
    pub fn encode(&self, a_bits: &[u8], closed_loop: bool, beamforming: bool) -> Vec<u8> {
        let mask = plcf_crc_mask(closed_loop, beamforming);
        let payload_with_crc = pcc_pack_with_crc(a_bits, mask);
        let cw = turbo::encode(&payload_with_crc);

        let mut coded = Vec::with_capacity(PCC_N_BITS);
        coded.extend_from_slice(&cw.systematic);
        coded.extend_from_slice(&cw.parity1);
        coded.extend_from_slice(&cw.parity2);
        coded.truncate(PCC_N_BITS);
        while coded.len() < PCC_N_BITS {
            coded.push(0);
        }

        let seq = crate::phy::scrambling::pcc_scrambling_sequence();
        crate::phy::scrambling::scramble_into(&mut coded, seq, 0);
        coded
    }

    /// Blind-decode `rx_llr` (length `PCC_N_BITS`, soft channel LLRs)
    /// against `n_plcf_bits` (40 for type 1, 80 for type 2). Tests all
    /// four `(closed_loop, beamforming)` masks, stopping on first
    /// match, per spec §4.3.
    #[must_use]
    pub fn decode(&self, rx_llr: &[Llr], n_plcf_bits: usize) -> PccReport {
        let seq = crate::phy::scrambling::pcc_scrambling_sequence();
        let mut descrambled: Vec<Llr> = rx_llr.to_vec();
        for (d, &s) in descrambled.iter_mut().zip(seq.iter()) {
            if s == 1 {
                *d = d.saturating_neg();
            }
        }

        // Each of the 3 turbo streams carries (data+CRC+3-bit tail) bits;
        // PCC_N_BITS exceeds 3x that, so the tail of `descrambled` is
        // zero-padding inserted by `encode` and is simply unused here.
        let single_len = n_plcf_bits + 16 + 3;
        let sys = &descrambled[..single_len.min(descrambled.len())];
        let par1_start = single_len;
        let par2_start = (2 * single_len).min(descrambled.len());
        let par1 = &descrambled[par1_start.min(descrambled.len())..par2_start];
        let par2_end = (3 * single_len).min(descrambled.len());
        let par2 = &descrambled[par2_start..par2_end];

        let decoded = turbo::decode(sys, par1, par2, PCC_MAX_ITERATIONS);
        let a_bits = decoded[..n_plcf_bits.min(decoded.len())].to_vec();
        let rx_crc_bits: Vec<u8> = decoded
            .iter()
            .skip(n_plcf_bits)
            .take(16)
            .copied()
            .collect();
        let rx_crc = rx_crc_bits
            .iter()
            .fold(0u32, |acc, &b| (acc << 1) | u32::from(b));

        for &(closed_loop, beamforming) in &PLCF_MASK_COMBINATIONS {
            let mask = plcf_crc_mask(closed_loop, beamforming);
            let recomputed = crc::crc16(&a_bits);
            if (rx_crc ^ u32::from(mask)) == recomputed {
                return PccReport {
                    crc_status: true,
                    plcf_type: if n_plcf_bits == 40 { 1 } else { 2 },
                    closed_loop,
                    beamforming,
                    a_bits,
                };
            }
        }

        PccReport {
            crc_status: false,
            plcf_type: if n_plcf_bits == 40 { 1 } else { 2 },
            closed_loop: false,
            beamforming: false,
            a_bits: Vec::new(),
        }
    }
}

impl Default for PccEnc {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-codeblock state for an in-progress PDC transport block.
struct CbState {
    decoded: bool,
    bytes: Vec<u8>,
}

/// PDC (TB transport) encoder/decoder. Holds the incremental
/// segmentation state for one transport block across multiple
/// encode/decode calls (spec §4.3: "may be called one or more times
/// with a bit budget").
pub struct PdcEnc {
    seg: Option<cbsegm::Cbsegm>,
    cfg: Option<FecCfg>,
    cb_index: usize,
    rp: usize,
    wp: usize,
    cb_state: Vec<CbState>,
    tb_crc_field: Vec<u8>,
}

impl PdcEnc {
    #[must_use]
    pub fn new() -> Self {
        Self {
            seg: None,
            cfg: None,
            cb_index: 0,
            rp: 0,
            wp: 0,
            cb_state: Vec::new(),
            tb_crc_field: Vec::new(),
        }
    }

    /// Segment the transport block and locate the scrambling sequence
    /// for `(cfg.network_id, cfg.plcf_type)`. Must be called before
    /// the first `encode_step`/`decode_step`.
    pub fn segmentate_and_pick_scrambling_sequence(&mut self, cfg: FecCfg) -> Result<()> {
        let b_bits = cfg.n_tb_bits + 24; // + TB-CRC (LTE_CRC24A)
        let seg = cbsegm::segment(b_bits, cfg.z as usize).ok_or(Error::UndefinedPacketSize)?;
        if seg.total_cb() > MAX_CODEBLOCKS {
            return Err(Error::CodeblockLimitExceeded {
                c: seg.total_cb(),
                max: MAX_CODEBLOCKS,
            });
        }
        if seg.f != 0 {
            return Err(Error::FillerBitsUnsupported);
        }

        self.cb_state = (0..seg.total_cb())
            .map(|_| CbState {
                decoded: false,
                bytes: Vec::new(),
            })
            .collect();
        self.seg = Some(seg);
        self.cfg = Some(cfg);
        self.cb_index = 0;
        self.rp = 0;
        self.wp = 0;
        self.tb_crc_field.clear();
        Ok(())
    }

    fn cfg_or_err(&self) -> Result<(&cbsegm::Cbsegm, &FecCfg)> {
        match (&self.seg, &self.cfg) {
            (Some(s), Some(c)) => Ok((s, c)),
            _ => Err(Error::UndefinedPacketSize),
        }
    }

    /// Encode whole codeblocks until at least `nof_bits_minimum` coded
    /// bits have been produced, or the transport block is exhausted.
    pub fn encode_step(
        &mut self,
        payload_bits: &[u8],
        spdc: &ScramblingPdc,
        nof_bits_minimum: usize,
    ) -> Result<Vec<u8>> {
        let (seg, cfg) = self.cfg_or_err()?;
        let seg = *seg;
        let cfg = *cfg;
        let mut out_bits = Vec::new();

        while self.cb_index < seg.total_cb() && out_bits.len() < nof_bits_minimum {
            let k = seg.cb_len(self.cb_index);
            let a = &payload_bits[self.rp_payload_offset(&seg)..];
            let payload_len = k - 24;
            let mut c = a[..payload_len.min(a.len())].to_vec();
            if self.cb_index + 1 == seg.total_cb() {
                let tb_crc = crc::crc24a(payload_bits);
                c.extend(crc::crc_to_bits(tb_crc, 24));
            } else {
                let cb_crc = crc::crc24b(&c);
                c.extend(crc::crc_to_bits(cb_crc, 24));
            }

            let cw = turbo::encode(&c);
            let mut coded = Vec::with_capacity(cw.len_coded());
            coded.extend_from_slice(&cw.systematic);
            coded.extend_from_slice(&cw.parity1);
            coded.extend_from_slice(&cw.parity2);

            let n_e = coded.len().min(cfg.g.saturating_sub(self.wp));
            coded.truncate(n_e);

            let seq = spdc.get(cfg.network_id, cfg.plcf_type);
            crate::phy::scrambling::scramble_into(&mut coded, &seq, self.wp);

            out_bits.extend_from_slice(&coded);
            self.wp += n_e;
            self.cb_index += 1;
        }

        Ok(out_bits)
    }

    fn rp_payload_offset(&self, seg: &cbsegm::Cbsegm) -> usize {
        (0..self.cb_index).map(|i| seg.cb_len(i) - 24).sum()
    }

    /// Decode whole codeblocks from `rx_llr` until at least
    /// `nof_bits_maximum` coded bits have been consumed or the
    /// transport block is exhausted. Returns the final TB report once
    /// the last codeblock has been processed, `None` otherwise.
    pub fn decode_step(
        &mut self,
        rx_llr: &[Llr],
        spdc: &ScramblingPdc,
        nof_bits_maximum: usize,
    ) -> Result<Option<PdcReport>> {
        let (seg, cfg) = self.cfg_or_err()?;
        let seg = *seg;
        let cfg = *cfg;
        let mut consumed = 0usize;

        while self.cb_index < seg.total_cb() && consumed < nof_bits_maximum {
            if self.cb_state[self.cb_index].decoded {
                self.cb_index += 1;
                continue;
            }

            let k = seg.cb_len(self.cb_index);
            let n_e = (3 * (k + 3))
                .min(cfg.g.saturating_sub(self.rp))
                .min(rx_llr.len() - self.rp);
            let mut soft: Vec<Llr> = rx_llr[self.rp..self.rp + n_e].to_vec();

            let seq = spdc.get(cfg.network_id, cfg.plcf_type);
            for (s, &bit) in soft.iter_mut().zip(seq.iter().skip(self.rp).take(n_e)) {
                if bit == 1 {
                    *s = s.saturating_neg();
                }
            }

            let third = n_e.div_ceil(3);
            let sys = &soft[..third.min(soft.len())];
            let par1 = &soft[third.min(soft.len())..(2 * third).min(soft.len())];
            let par2 = &soft[(2 * third).min(soft.len())..];

            let is_last = self.cb_index + 1 == seg.total_cb();
            let decoded = turbo::decode(sys, par1, par2, PDC_MAX_ITERATIONS.max(PDC_MIN_ITERATIONS));
            let c_len = decoded.len().saturating_sub(24).min(k - 24);
            let c_bytes = decoded[..c_len].to_vec();
            let crc_field = &decoded[c_len..(c_len + 24).min(decoded.len())];

            let ok = if !is_last {
                crc::crc24b_check(&[c_bytes.clone(), crc_field.to_vec()].concat())
            } else {
                // The last CB's CRC is CRC24A over the whole TB, not
                // just this CB; checked once every CB has decoded.
                true
            };

            if ok {
                self.cb_state[self.cb_index].decoded = true;
                self.cb_state[self.cb_index].bytes = c_bytes;
                if is_last {
                    self.tb_crc_field = crc_field.to_vec();
                }
            }

            self.rp += n_e;
            consumed += n_e;
            self.cb_index += 1;
        }

        if self.cb_index < seg.total_cb() {
            return Ok(None);
        }

        let all_decoded = self.cb_state.iter().all(|s| s.decoded);
        let mut a_bits: Vec<u8> = self.cb_state.iter().flat_map(|s| s.bytes.clone()).collect();

        let tb_ok = if all_decoded {
            let full: Vec<u8> = a_bits.iter().chain(self.tb_crc_field.iter()).copied().collect();
            let tb_crc_ok = crc::crc24a_check(&full);
            if !tb_crc_ok {
                for s in &mut self.cb_state {
                    s.decoded = false;
                }
            }
            tb_crc_ok
        } else {
            false
        };

        if !tb_ok {
            a_bits.clear();
        }

        Ok(Some(PdcReport {
            crc_status: tb_ok,
            a_bits,
        }))
    }
}

impl Default for PdcEnc {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits_from_seed(k: usize, seed: u64) -> Vec<u8> {
        let mut x = seed.wrapping_add(1);
        (0..k)
            .map(|_| {
                x ^= x << 13;
                x ^= x >> 7;
                x ^= x << 17;
                (x & 1) as u8
            })
            .collect()
    }

    fn llr_from_bits(bits: &[u8], magnitude: Llr) -> Vec<Llr> {
        bits.iter()
            .map(|&b| if b == 1 { magnitude } else { -magnitude })
            .collect()
    }

    #[test]
    fn test_s1_plcf_round_trip_type2() {
        let pcc = PccEnc::new();
        let a = bits_from_seed(80, 7);
        let coded = pcc.encode(&a, true, false);
        assert_eq!(coded.len(), PCC_N_BITS);
        let llr = llr_from_bits(&coded, 100);
        let report = pcc.decode(&llr, 80);
        assert!(report.crc_status);
        assert_eq!(report.closed_loop, true);
        assert_eq!(report.beamforming, false);
    }

    #[test]
    fn test_pcc_mask_table_distinguishes_signalling() {
        let pcc = PccEnc::new();
        for &(cl, bf) in &PLCF_MASK_COMBINATIONS {
            let a = bits_from_seed(40, 11);
            let coded = pcc.encode(&a, cl, bf);
            let llr = llr_from_bits(&coded, 100);
            let report = pcc.decode(&llr, 40);
            assert!(report.crc_status);
            assert_eq!((report.closed_loop, report.beamforming), (cl, bf));
        }
    }
}
