// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # dectnrp - DECT-2020 NR+ lower-PHY/MAC stack
//!
//! A software-defined-radio implementation of the ETSI DECT-2020 NR
//! (DECT NR+) lower protocol stack: the radio/driver layer, a full OFDM
//! PHY with turbo-coded FEC, and a lean MAC with beacon-based allocation
//! and HARQ.
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |                              mac                                    |
//! |   Tpoint (PHY callbacks) | PlcfDecoder | TxDescriptor/SyncReport    |
//! +---------------------------------------------------------------------+
//! |                         harq + phy                                  |
//! |   HarqProcessPool | Fec (PccEnc/PdcEnc) | ScramblingPdc | Resampler |
//! |   PacketSizes                                                       |
//! +---------------------------------------------------------------------+
//! |                             radio                                    |
//! |   HwDevice | BufferRx | BufferTxPool | VirtualSpace | Agc           |
//! +---------------------------------------------------------------------+
//! ```
//!
//! Data flow on RX: driver writes IQ into [`radio::buffer_rx::BufferRx`] ->
//! a PHY worker wakes on a sample-time deadline -> PCC is decoded via
//! [`phy::fec::Fec`] -> [`mac::tpoint::Tpoint`] picks a
//! [`harq::process::HarqProcessRx`] and PDC parameters -> PDC is decoded ->
//! the MAC PDU is delivered back to the tpoint.
//!
//! On TX: the tpoint emits a [`mac::descriptors::TxDescriptor`] bound to a
//! locked [`harq::process::HarqProcessTx`], the PHY encodes it (optionally
//! through [`phy::resampler::Resampler`]) into a TX buffer tagged with a
//! send deadline, and the driver emits it at that sample count.
//!
//! ## Out of scope
//!
//! Log setup wiring, JSON configuration *loading* (argv/directory
//! scanning), the CLI entry point, UDP/streaming application glue, and
//! higher-MAC IE message definitions are external collaborators,
//! specified only through their interface to this crate (see
//! [`config`]). They are not implemented here.

/// Quality-of-build ambient stack: compile-time-gated structured logging.
pub mod logging;

/// Radio-device-class strings, static DECT constant tables, and the
/// typed `radio.json`/`phy.json`/`upper.json` configuration boundary.
pub mod config;

/// Crate-wide error type for conditions that cross a public boundary.
pub mod error;

/// L0 -- radio substrate: hardware device abstraction, streaming IQ
/// buffers, the virtual-space simulator, and gain control.
pub mod radio;

/// L1 -- PHY codec and scheduler: packet-size derivation, FEC (turbo
/// code, scrambling, CRCs), and the polyphase resampler.
pub mod phy;

/// L1 -- HARQ process pool: the concurrency primitive gating every
/// transmission and reception.
pub mod harq;

/// L2 -- lower-MAC / PHY interface: the `Tpoint` callback surface,
/// blind PLCF decoding, and TX/RX descriptor types.
pub mod mac;

pub use error::{Error, Result};

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
