// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Crate-wide error type.
//!
//! Most decode/derive paths in this crate are *not* exceptional: an
//! invalid packet geometry, a PCC CRC miss, or a PDC CRC miss are all
//! expected outcomes reported through plain struct fields (see
//! `phy::packet_sizes::get_packet_sizes` returning `None`, or
//! `PdcReport::crc_status`). [`Error`] exists for the smaller set of
//! conditions that genuinely cross a public boundary as a failure: a
//! resource couldn't be acquired, a config file didn't parse, or a
//! caller violated a documented precondition that debug assertions
//! alone cannot catch in release builds.

use std::fmt;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Recoverable, non-programmer-error failure modes.
#[derive(Debug)]
pub enum Error {
    /// `get_packet_sizes` was asked to derive an undefined geometry.
    /// Kept as an `Error` variant (in addition to the `Option` return
    /// used on the hot path) for callers that want a `?`-friendly form.
    UndefinedPacketSize,
    /// The HARQ process pool has no free process of the requested kind.
    HarqProcessExhausted,
    /// A transport block segmented into more codeblocks than
    /// `MAX_CODEBLOCKS` supports.
    CodeblockLimitExceeded { c: usize, max: usize },
    /// Codeblock segmentation produced filler bits (`F != 0`), which
    /// this implementation does not support.
    FillerBitsUnsupported,
    /// Radio device class string did not match `"u.b.N_TX.tier"`.
    UnknownDeviceClass(String),
    /// JSON config parsing failure (`config-json` feature).
    ConfigParse(String),
    /// I/O failure while reading a config file or log output.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndefinedPacketSize => write!(f, "packet size definition is undefined"),
            Self::HarqProcessExhausted => write!(f, "HARQ process pool exhausted"),
            Self::CodeblockLimitExceeded { c, max } => {
                write!(f, "codeblock count {c} exceeds MAX_CODEBLOCKS {max}")
            }
            Self::FillerBitsUnsupported => write!(f, "codeblock segmentation requires filler bits (F != 0)"),
            Self::UnknownDeviceClass(s) => write!(f, "unknown radio device class string: {s:?}"),
            Self::ConfigParse(s) => write!(f, "config parse error: {s}"),
            Self::Io(e) => write!(f, "i/o error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
