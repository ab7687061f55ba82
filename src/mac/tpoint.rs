// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `Tpoint`: the callback surface the PHY drives into the lower MAC.
//!
//! A PHY worker calls exactly one of these per scheduling decision: a
//! PCC just decoded (`work_pcc`), a PDC decode that may still be
//! in-flight across multiple calls (`work_pdc_async`), an ordinary
//! slot with nothing of interest (`work_regular`), an unexpected event
//! worth a report but not a full PDU (`work_irregular`), or a channel
//! scan measurement (`work_chscan_async`).

use crate::mac::descriptors::{SyncReport, TxDescriptor};
use crate::phy::fec::PdcReport;

/// What [`Tpoint::work_regular`]/[`Tpoint::work_irregular`] hands back
/// up from the MAC to the PHY scheduler: either nothing to send, or a
/// descriptor ready for encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaclowPhy {
    Idle,
    Transmit(TxDescriptor),
}

/// What the PHY reports to the MAC once higher-layer state needs
/// updating (sync acquired, PDU delivered, etc).
#[derive(Debug, Clone, PartialEq)]
pub enum MachighPhy {
    SyncAcquired(SyncReport),
    PduDelivered(Vec<u8>),
    PduCrcFailed,
}

/// An out-of-band event worth surfacing without a full MAC PDU --
/// e.g. a spurious PCC CRC pass, an RSSI excursion outside the
/// expected range, or a channel-scan sample arriving.
#[derive(Debug, Clone, PartialEq)]
pub enum IrregularReport {
    RssiExcursion { db: f32 },
    SpuriousDecode,
    ChannelScanSample { freq_hz: f64, power_db: f32 },
}

/// Lower-MAC/PHY interface. Implemented once per firmware instance
/// (see `config::UpperConfig::firmware_name`); the PHY worker thread
/// calls into it, never the other way around.
pub trait Tpoint: Send + Sync {
    /// A PCC was just blind-decoded for this tpoint's network id.
    fn work_pcc(&self, report: &crate::phy::fec::PccReport) -> MachighPhy;

    /// A PDC decode step completed (possibly not the last one for
    /// this transport block -- see `PdcEnc::decode_step`).
    fn work_pdc_async(&self, report: &PdcReport) -> MachighPhy;

    /// Nothing decoded this slot; give the MAC a chance to queue a
    /// transmission.
    fn work_regular(&self, now_64: u64) -> MaclowPhy;

    /// Something noteworthy happened outside the normal PCC/PDC flow.
    fn work_irregular(&self, report: IrregularReport);

    /// A channel-scan measurement is available (async: the scan itself
    /// may span multiple PHY slots).
    fn work_chscan_async(&self, freq_hz: f64, power_db: f32) {
        self.work_irregular(IrregularReport::ChannelScanSample { freq_hz, power_db });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phy::fec::PccReport;
    use parking_lot::Mutex;

    struct RecordingTpoint {
        events: Mutex<Vec<String>>,
    }

    impl Tpoint for RecordingTpoint {
        fn work_pcc(&self, _report: &PccReport) -> MachighPhy {
            self.events.lock().push("pcc".to_string());
            MachighPhy::PduCrcFailed
        }

        fn work_pdc_async(&self, _report: &PdcReport) -> MachighPhy {
            self.events.lock().push("pdc".to_string());
            MachighPhy::PduCrcFailed
        }

        fn work_regular(&self, _now_64: u64) -> MaclowPhy {
            self.events.lock().push("regular".to_string());
            MaclowPhy::Idle
        }

        fn work_irregular(&self, _report: IrregularReport) {
            self.events.lock().push("irregular".to_string());
        }
    }

    #[test]
    fn test_chscan_default_routes_through_irregular() {
        let tp = RecordingTpoint { events: Mutex::new(Vec::new()) };
        tp.work_chscan_async(900e6, -70.0);
        assert_eq!(tp.events.lock().as_slice(), ["irregular"]);
    }

    #[test]
    fn test_work_regular_returns_idle_by_default() {
        let tp = RecordingTpoint { events: Mutex::new(Vec::new()) };
        assert_eq!(tp.work_regular(0), MaclowPhy::Idle);
    }
}
