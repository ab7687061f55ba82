// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! PHY codec and scheduler: packet geometry, the turbo-coded FEC
//! pipeline, scrambling, codeblock segmentation, and the resampler.

pub mod cbsegm;
pub mod cplx;
pub mod crc;
pub mod fec;
pub mod packet_sizes;
pub mod resampler;
pub mod scrambling;
pub mod turbo;

pub use cplx::Cplx;
pub use fec::{FecCfg, PccEnc, PccReport, PdcEnc, PdcReport};
pub use packet_sizes::{PacketSizeDef, PacketSizes};
pub use resampler::Resampler;
pub use scrambling::ScramblingPdc;
