// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `PlcfDecoder`: blind PLCF-type detection sitting between
//! [`crate::phy::fec::PccEnc`] and the MAC -- decides whether a
//! received PCC carries a type-1 (40-bit) or type-2 (80-bit) PLCF by
//! trying both and letting the CRC-mask check disambiguate, rather
//! than requiring the MAC to already know which type is incoming.

use crate::config::{PLCF_TYPE1_BITS, PLCF_TYPE2_BITS};
use crate::phy::fec::{PccEnc, PccReport};
use crate::phy::turbo::Llr;

/// Outcome of a blind PLCF decode attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlcfDecoded {
    pub report: PccReport,
}

/// Stateless blind decoder: holds nothing beyond the
/// [`PccEnc`] it delegates to, since PCC decode has no
/// cross-call state (rv is always 0).
pub struct PlcfDecoder {
    pcc: PccEnc,
}

impl PlcfDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self { pcc: PccEnc::new() }
    }

    /// Try PLCF type 1 first (shorter, cheaper to decode), then type
    /// 2. Returns `None` if neither type's CRC validates under any of
    /// the four `(closed_loop, beamforming)` masks.
    #[must_use]
    pub fn decode(&self, rx_llr: &[Llr]) -> Option<PlcfDecoded> {
        let type1 = self.pcc.decode(rx_llr, PLCF_TYPE1_BITS);
        if type1.crc_status {
            return Some(PlcfDecoded { report: type1 });
        }
        let type2 = self.pcc.decode(rx_llr, PLCF_TYPE2_BITS);
        if type2.crc_status {
            return Some(PlcfDecoded { report: type2 });
        }
        None
    }
}

impl Default for PlcfDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PCC_N_BITS;

    fn llr_from_bits(bits: &[u8], magnitude: Llr) -> Vec<Llr> {
        bits.iter()
            .map(|&b| if b == 1 { magnitude } else { -magnitude })
            .collect()
    }

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

    #[test]
    fn test_blind_decode_identifies_type1() {
        let enc = PccEnc::new();
        let a = bits_from_seed(PLCF_TYPE1_BITS, 1);
        let coded = enc.encode(&a, false, false);
        assert_eq!(coded.len(), PCC_N_BITS);
        let llr = llr_from_bits(&coded, 100);

        let decoder = PlcfDecoder::new();
        let decoded = decoder.decode(&llr).expect("must decode");
        assert_eq!(decoded.report.plcf_type, 1);
        assert_eq!(decoded.report.a_bits, a);
    }

    #[test]
    fn test_blind_decode_identifies_type2() {
        let enc = PccEnc::new();
        let a = bits_from_seed(PLCF_TYPE2_BITS, 2);
        let coded = enc.encode(&a, true, true);
        let llr = llr_from_bits(&coded, 100);

        let decoder = PlcfDecoder::new();
        let decoded = decoder.decode(&llr).expect("must decode");
        assert_eq!(decoded.report.plcf_type, 2);
        assert!(decoded.report.closed_loop);
        assert!(decoded.report.beamforming);
    }

    #[test]
    fn test_blind_decode_rejects_noise() {
        let llr: Vec<Llr> = (0..PCC_N_BITS).map(|i| if i % 2 == 0 { 5 } else { -5 }).collect();
        let decoder = PlcfDecoder::new();
        assert!(decoder.decode(&llr).is_none());
    }
}
