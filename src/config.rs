// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! DECT NR+ constant tables and the typed configuration boundary.
//!
//! Two levels, same split the rest of this codebase's ambient stack
//! uses elsewhere:
//!
//! - **Level 1 (Static)**: compile-time constants fixed by the ETSI
//!   DECT-2020 NR spec (RV cycle, PLCF CRC masks, scrambling seeds, the
//!   resampler whitelist).
//! - **Level 2 (Dynamic)**: [`RadioConfig`], [`PhyConfig`],
//!   [`UpperConfig`] -- the typed shapes of `radio.json`, `phy.json`,
//!   `upper.json` (see `SPEC_FULL.md` section A.3). Parsing these from
//!   a directory given on argv is the job of an external CLI binary,
//!   not this crate; only the `Deserialize` boundary and a couple of
//!   `from_*` convenience constructors live here.
//!
//! No `static` holds runtime-dependent state: everything Level 2 is
//! constructed once at startup and passed down by the caller (typically
//! behind an `Arc`), never read from a process-global.

use crate::error::{Error, Result};

// =======================================================================
// Level 1: RV cycle, PLCF masks, scrambling seeds
// =======================================================================

/// HARQ redundancy-version progression: `0 -> 2 -> 3 -> 1 -> 0 -> ...`
pub const RV_CYCLE: [u8; 4] = [0, 2, 3, 1];

/// Given the current rv, return the next rv in the HARQ cycle.
#[must_use]
pub fn next_rv(rv: u8) -> u8 {
    let pos = RV_CYCLE.iter().position(|&v| v == rv).unwrap_or(0);
    RV_CYCLE[(pos + 1) % RV_CYCLE.len()]
}

/// Maximum number of unwrapped retransmissions of a single TX HARQ
/// process before the implementation asserts.
pub const MAX_RV_UNWRAPPED: u32 = 64;

/// PCC is always rv=0.
pub const PCC_RV: u8 = 0;

/// PCC coded length in bits (98 QPSK cells).
pub const PCC_N_BITS: usize = 196;

/// PCC is scrambled over `ceil(196/8)*8` bits.
pub const PCC_N_BITS_SCRAMBLED: usize = 200;

/// PCC scrambling sequence seed.
pub const PCC_SCRAMBLING_G_INIT: u32 = 0x4445_4354;

/// 16-bit CRC mask applied to the PLCF CRC, selected by
/// `(closed_loop, beamforming)`.
#[must_use]
pub fn plcf_crc_mask(closed_loop: bool, beamforming: bool) -> u16 {
    match (closed_loop, beamforming) {
        (false, false) => 0x0000,
        (true, false) => 0x5555,
        (false, true) => 0xAAAA,
        (true, true) => 0xFFFF,
    }
}

/// All four `(closed_loop, beamforming)` combinations, in the order the
/// blind PCC decoder tests their masks.
pub const PLCF_MASK_COMBINATIONS: [(bool, bool); 4] =
    [(false, false), (true, false), (false, true), (true, true)];

/// PLCF type 1 payload length (bits), pre-CRC.
pub const PLCF_TYPE1_BITS: usize = 40;
/// PLCF type 2 payload length (bits), pre-CRC.
pub const PLCF_TYPE2_BITS: usize = 80;

/// Maximum codeblocks a single packet may segment into. Exceeding this
/// is a hard error.
pub const MAX_CODEBLOCKS: usize = 16;

/// PCC blind-decode iteration cap.
pub const PCC_MAX_ITERATIONS: u32 = 5;
/// PDC turbo-decode iteration cap.
pub const PDC_MAX_ITERATIONS: u32 = 10;
/// PDC turbo-decode early-stop floor.
pub const PDC_MIN_ITERATIONS: u32 = 2;

/// Resampler (L, M) whitelist: `(L, M, filter_length)`. Anything not on
/// this list falls back to the generic polyphase kernel.
pub const RESAMPLER_WHITELIST: &[(u32, u32, usize)] =
    &[(10, 9, 223), (9, 10, 223), (10, 9, 45), (9, 10, 45)];

// =======================================================================
// Radio device class
// =======================================================================

/// Max-codeblock-size tier selected by a device class string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// `Z = 2048`
    A,
    /// `Z = 6144`
    B,
}

impl Tier {
    #[must_use]
    pub fn z(self) -> u32 {
        match self {
            Self::A => 2048,
            Self::B => 6144,
        }
    }
}

/// A parsed `"u.b.N_TX.tier"` radio device class string, e.g. `"1.1.1.A"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadioDeviceClass {
    pub u: u32,
    pub b: u32,
    pub n_tx: u32,
    pub tier: Tier,
}

impl RadioDeviceClass {
    /// Parse a device class string. Unknown strings are rejected with
    /// `Error::UnknownDeviceClass` rather than aborting the process --
    /// the thin CLI boundary owns process-abort decisions, not this
    /// library.
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('.').collect();
        let [u_s, b_s, ntx_s, tier_s] = parts[..] else {
            return Err(Error::UnknownDeviceClass(s.to_string()));
        };
        let u: u32 = u_s.parse().map_err(|_| Error::UnknownDeviceClass(s.to_string()))?;
        let b: u32 = b_s.parse().map_err(|_| Error::UnknownDeviceClass(s.to_string()))?;
        let n_tx: u32 = ntx_s.parse().map_err(|_| Error::UnknownDeviceClass(s.to_string()))?;
        if !matches!(u, 1 | 2 | 4 | 8) || !matches!(b, 1 | 2 | 4 | 8 | 12 | 16) {
            return Err(Error::UnknownDeviceClass(s.to_string()));
        }
        let tier = match tier_s {
            "A" => Tier::A,
            "B" => Tier::B,
            _ => return Err(Error::UnknownDeviceClass(s.to_string())),
        };
        Ok(Self { u, b, n_tx, tier })
    }
}

// =======================================================================
// Level 2: radio.json / phy.json / upper.json
// =======================================================================

/// Per-thread scheduling hint: pinned CPU core plus a relative
/// real-time priority offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "config-json", derive(serde::Deserialize, serde::Serialize))]
pub struct ThreadConfig {
    pub prio_offset: i32,
    pub cpu_core: i32,
}

/// Noise model selector for the simulation-only keys of `radio.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "config-json", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "config-json", serde(rename_all = "lowercase"))]
pub enum SimNoiseType {
    Relative,
    Thermal,
}

/// Which hardware backend a `radio.json` entry names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "config-json", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "config-json", serde(rename_all = "lowercase"))]
pub enum HwName {
    Usrp,
    Simulator,
}

/// One `radio.json` hardware entry.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config-json", derive(serde::Deserialize, serde::Serialize))]
pub struct RadioConfig {
    pub hw_name: HwName,
    pub rx_buffer_slots: usize,
    pub tx_buffer_pool_size: usize,
    pub turnaround_samples: i64,
    pub time_advance_samples: i64,
    pub rx_prestream_ms: u32,
    pub notification_period_us: u32,
    pub tx_thread: ThreadConfig,
    pub rx_thread: ThreadConfig,
    #[cfg_attr(feature = "config-json", serde(default))]
    pub usrp_args: Option<String>,
    #[cfg_attr(feature = "config-json", serde(default))]
    pub sim_samp_rate_lte: Option<f64>,
    #[cfg_attr(feature = "config-json", serde(default))]
    pub sim_spp_us: Option<u32>,
    #[cfg_attr(feature = "config-json", serde(default))]
    pub sim_samp_rate_speed: Option<i32>,
    #[cfg_attr(feature = "config-json", serde(default))]
    pub sim_channel_name_inter: Option<String>,
    #[cfg_attr(feature = "config-json", serde(default))]
    pub sim_channel_name_intra: Option<String>,
    #[cfg_attr(feature = "config-json", serde(default))]
    pub sim_noise_type: Option<SimNoiseType>,
}

/// One `phy.json` worker-pool entry.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config-json", derive(serde::Deserialize, serde::Serialize))]
pub struct PhyConfig {
    pub radio_device_class: String,
    pub nof_worker: u32,
    pub enforce_resampling: bool,
    pub oversampling_floor: f64,
}

/// One `upper.json` tpoint entry.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config-json", derive(serde::Deserialize, serde::Serialize))]
pub struct UpperConfig {
    pub firmware_name: String,
    pub firmware_id: u32,
    pub network_ids: Vec<u32>,
    #[cfg_attr(feature = "config-json", serde(default))]
    pub app_threads: Vec<ThreadConfig>,
}

#[cfg(feature = "config-json")]
impl RadioConfig {
    /// Parse a single `radio.json` entry from a JSON string. Scanning a
    /// directory for `radio.json`/`phy.json`/`upper.json` and wiring
    /// them to a CLI argument is out of scope for this crate.
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[cfg(feature = "config-json")]
impl PhyConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| Error::ConfigParse(e.to_string()))
    }
}

#[cfg(feature = "config-json")]
impl UpperConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| Error::ConfigParse(e.to_string()))
    }
}

/// Owned collection of the simulation-only keys from `radio.json`,
/// constructed once at startup: no process-global statics, construct
/// once and pass down.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub samp_rate_lte: f64,
    pub spp_us: u32,
    pub samp_rate_speed: i32,
    pub channel_name_inter: String,
    pub channel_name_intra: String,
    pub noise_type: SimNoiseType,
}

impl SimConfig {
    /// Build from a `RadioConfig`. `sim_spp_us` outside `[50, 500]` is
    /// a configuration bug, caught with a debug assertion rather than
    /// a runtime error.
    #[must_use]
    pub fn from_radio_config(cfg: &RadioConfig) -> Option<Self> {
        let spp_us = cfg.sim_spp_us?;
        debug_assert!((50..=500).contains(&spp_us), "sim_spp_us out of range");
        Some(Self {
            samp_rate_lte: cfg.sim_samp_rate_lte?,
            spp_us,
            samp_rate_speed: cfg.sim_samp_rate_speed?,
            channel_name_inter: cfg.sim_channel_name_inter.clone()?,
            channel_name_intra: cfg.sim_channel_name_intra.clone()?,
            noise_type: cfg.sim_noise_type?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rv_cycle() {
        assert_eq!(next_rv(0), 2);
        assert_eq!(next_rv(2), 3);
        assert_eq!(next_rv(3), 1);
        assert_eq!(next_rv(1), 0);
    }

    #[test]
    fn test_plcf_crc_mask_table() {
        assert_eq!(plcf_crc_mask(false, false), 0x0000);
        assert_eq!(plcf_crc_mask(true, false), 0x5555);
        assert_eq!(plcf_crc_mask(false, true), 0xAAAA);
        assert_eq!(plcf_crc_mask(true, true), 0xFFFF);
    }

    #[test]
    fn test_device_class_parse_valid() {
        let dc = RadioDeviceClass::parse("1.1.1.A").unwrap();
        assert_eq!(dc.u, 1);
        assert_eq!(dc.b, 1);
        assert_eq!(dc.n_tx, 1);
        assert_eq!(dc.tier, Tier::A);
        assert_eq!(dc.tier.z(), 2048);
    }

    #[test]
    fn test_device_class_parse_tier_b() {
        let dc = RadioDeviceClass::parse("2.12.4.B").unwrap();
        assert_eq!(dc.tier.z(), 6144);
    }

    #[test]
    fn test_device_class_parse_rejects_unknown() {
        assert!(RadioDeviceClass::parse("3.1.1.A").is_err());
        assert!(RadioDeviceClass::parse("1.1.1.C").is_err());
        assert!(RadioDeviceClass::parse("garbage").is_err());
    }

    #[cfg(feature = "config-json")]
    #[test]
    fn test_radio_config_from_json() {
        let json = r#"{
            "hw_name": "simulator",
            "rx_buffer_slots": 64,
            "tx_buffer_pool_size": 8,
            "turnaround_samples": 1000,
            "time_advance_samples": 200,
            "rx_prestream_ms": 50,
            "notification_period_us": 100,
            "tx_thread": {"prio_offset": 10, "cpu_core": 2},
            "rx_thread": {"prio_offset": 10, "cpu_core": 3}
        }"#;
        let cfg = RadioConfig::from_json_str(json).unwrap();
        assert_eq!(cfg.hw_name, HwName::Simulator);
        assert_eq!(cfg.rx_buffer_slots, 64);
    }

    #[cfg(feature = "config-json")]
    #[test]
    fn test_radio_config_from_file() {
        use std::io::Write;
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(
            f,
            r#"{{
                "hw_name": "usrp",
                "rx_buffer_slots": 32,
                "tx_buffer_pool_size": 4,
                "turnaround_samples": 500,
                "time_advance_samples": 100,
                "rx_prestream_ms": 20,
                "notification_period_us": 50,
                "tx_thread": {{"prio_offset": 5, "cpu_core": 0}},
                "rx_thread": {{"prio_offset": 5, "cpu_core": 1}},
                "usrp_args": "addr=192.168.10.2"
            }}"#
        )
        .unwrap();
        let cfg = RadioConfig::from_file(f.path()).unwrap();
        assert_eq!(cfg.hw_name, HwName::Usrp);
        assert_eq!(cfg.usrp_args.as_deref(), Some("addr=192.168.10.2"));
    }
}
