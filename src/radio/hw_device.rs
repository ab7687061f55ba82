// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `HwDevice`: the hardware-backend seam between the PHY and whatever
//! actually moves IQ samples -- a USRP over UHD, or (for development
//! and CI) the in-process [`super::virtual_space::VirtualSpace`]
//! simulator.
//!
//! Binding the real UHD C++ API is out of scope for this crate (see
//! `SPEC_FULL.md`'s Non-goals); [`UsrpHwDevice`] exists only as the
//! typed shape a real binding would fill in, matching
//! [`crate::config::HwName::Usrp`] in the config boundary.

use crate::phy::Cplx;

/// Per-thread scheduling + naming info a backend exposes for the
/// radio's TX/RX worker threads (see `SPEC_FULL.md` §5: "the HW
/// abstraction owns its own threads, the PHY only waits on them").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadInventory {
    pub tx_thread_name: String,
    pub rx_thread_name: String,
}

/// Transmit/receive one sample-time-stamped chunk of samples.
pub trait HwDevice: Send + Sync {
    /// Sample rate this device is currently streaming at, Hz.
    fn sample_rate(&self) -> f64;

    /// Absolute sample count the device has transmitted through to
    /// date (monotonically increasing).
    fn tx_time_passed_64(&self) -> u64;

    /// Absolute sample count the device has received through to date.
    fn rx_time_passed_64(&self) -> u64;

    /// Enqueue `samples` for transmission at absolute sample time `at`.
    fn transmit_at(&self, samples: &[Cplx], at: u64);

    /// Fetch up to `n` freshly-received samples starting at absolute
    /// sample time `at`; returns fewer than `n` if the backend hasn't
    /// produced that many yet.
    fn receive_at(&self, at: u64, n: usize) -> Vec<Cplx>;

    fn thread_inventory(&self) -> ThreadInventory;
}

/// `HwDevice` backed by [`super::virtual_space::VirtualSpace`] -- the
/// only backend this crate actually drives end to end.
pub struct VirtualHwDevice {
    space: std::sync::Arc<super::virtual_space::VirtualSpace>,
    sample_rate: f64,
}

impl VirtualHwDevice {
    #[must_use]
    pub fn new(space: std::sync::Arc<super::virtual_space::VirtualSpace>, sample_rate: f64) -> Self {
        Self { space, sample_rate }
    }
}

impl HwDevice for VirtualHwDevice {
    fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    fn tx_time_passed_64(&self) -> u64 {
        self.space.tx_time_passed_64()
    }

    fn rx_time_passed_64(&self) -> u64 {
        self.space.rx_time_passed_64()
    }

    fn transmit_at(&self, samples: &[Cplx], at: u64) {
        self.space.write_tx(samples, at);
    }

    fn receive_at(&self, at: u64, n: usize) -> Vec<Cplx> {
        self.space.read_rx(at, n)
    }

    fn thread_inventory(&self) -> ThreadInventory {
        ThreadInventory {
            tx_thread_name: "virtual_tx".to_string(),
            rx_thread_name: "virtual_rx".to_string(),
        }
    }
}

/// Placeholder shape for a real UHD-backed device. Every method is
/// unimplemented: wiring the UHD C++ API through FFI is explicitly out
/// of scope here, but the typed seam (matching `HwName::Usrp`) is kept
/// so the rest of the crate compiles against the same trait
/// regardless of backend.
pub struct UsrpHwDevice {
    args: String,
    sample_rate: f64,
}

impl UsrpHwDevice {
    #[must_use]
    pub fn new(args: String, sample_rate: f64) -> Self {
        Self { args, sample_rate }
    }

    #[must_use]
    pub fn args(&self) -> &str {
        &self.args
    }
}

impl HwDevice for UsrpHwDevice {
    fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    fn tx_time_passed_64(&self) -> u64 {
        unimplemented!("USRP backend is not bound in this crate")
    }

    fn rx_time_passed_64(&self) -> u64 {
        unimplemented!("USRP backend is not bound in this crate")
    }

    fn transmit_at(&self, _samples: &[Cplx], _at: u64) {
        unimplemented!("USRP backend is not bound in this crate")
    }

    fn receive_at(&self, _at: u64, _n: usize) -> Vec<Cplx> {
        unimplemented!("USRP backend is not bound in this crate")
    }

    fn thread_inventory(&self) -> ThreadInventory {
        ThreadInventory {
            tx_thread_name: "usrp_tx".to_string(),
            rx_thread_name: "usrp_rx".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimNoiseType;
    use crate::radio::virtual_space::VirtualSpace;
    use std::sync::Arc;

    #[test]
    fn test_virtual_hw_device_reports_sample_rate() {
        let space = Arc::new(VirtualSpace::new(1_920_000.0, SimNoiseType::Thermal));
        let dev = VirtualHwDevice::new(space, 1_920_000.0);
        assert!((dev.sample_rate() - 1_920_000.0).abs() < 1.0);
    }

    #[test]
    fn test_usrp_device_args_stored() {
        let dev = UsrpHwDevice::new("addr=192.168.10.2".to_string(), 1_920_000.0);
        assert_eq!(dev.args(), "addr=192.168.10.2");
    }
}
