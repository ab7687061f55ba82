// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! HARQ process pool: the concurrency primitive gating every PCC/PDC
//! transmission and reception.

pub mod buffers;
pub mod pool;
pub mod process;

pub use pool::HarqProcessPool;
pub use process::{FinalizeRx, FinalizeTx, HarqProcessRx, HarqProcessTx};
