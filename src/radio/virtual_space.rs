// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `VirtualSpace`: an in-process RF channel simulator standing in for
//! a real USRP, so the rest of the stack (PHY, HARQ, MAC) can be
//! exercised without hardware.
//!
//! Models a single shared medium: every `write_tx` call convolves its
//! samples through a channel response (AWGN, flat-Rayleigh fading, or
//! a doubly-selective tap delay line) and accumulates the result into
//! a ring that `read_rx` drains from, plus a fixed intra-device
//! leakage term representing a device hearing its own TX on its RX
//! front-end.

use crate::config::SimNoiseType;
use crate::phy::Cplx;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// How `wait_writable`/`wait_readable` give up: spec requires a hard
/// ceiling so a stuck simulator thread cannot hang a test suite.
pub const WAIT_TIMEOUT: Duration = Duration::from_millis(100);

/// Channel model applied to every written block before it lands in
/// the shared ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelModel {
    /// No multipath; only additive noise.
    Awgn,
    /// Single complex tap, fixed for the object's lifetime (not
    /// re-drawn per block: a quasi-static fading approximation).
    FlatRayleigh,
    /// Short tap-delay-line approximating frequency selectivity.
    DoublySelective,
}

/// Thermal-noise-referred or relative (SNR-referred) additive noise,
/// matching [`SimNoiseType`].
fn noise_sample(noise_type: SimNoiseType, sigma: f32) -> Cplx {
    let (u1, u2) = (fastrand::f32().max(1e-9), fastrand::f32());
    let r = (-2.0 * u1.ln()).sqrt();
    let theta = 2.0 * std::f32::consts::PI * u2;
    let scale = match noise_type {
        SimNoiseType::Thermal => sigma,
        SimNoiseType::Relative => sigma,
    };
    Cplx::new(r * theta.cos() * scale, r * theta.sin() * scale)
}

struct Ring {
    samples: Vec<Cplx>,
    write_pos: usize,
}

impl Ring {
    fn new(len: usize) -> Self {
        Self {
            samples: vec![Cplx::ZERO; len],
            write_pos: 0,
        }
    }

    fn add(&mut self, block: &[Cplx]) {
        let len = self.samples.len();
        for (i, &s) in block.iter().enumerate() {
            let idx = (self.write_pos + i) % len;
            self.samples[idx] += s;
        }
    }

    fn read(&self, offset: usize, n: usize) -> Vec<Cplx> {
        let len = self.samples.len();
        (0..n).map(|i| self.samples[(offset + i) % len]).collect()
    }
}

/// Shared RF medium: every device writes TX samples in, every device
/// reads RX samples out (including a leakage term of its own TX).
pub struct VirtualSpace {
    sample_rate: f64,
    noise_type: SimNoiseType,
    channel: ChannelModel,
    /// Fixed-for-lifetime flat-fading tap, used when `channel ==
    /// FlatRayleigh`.
    flat_tap: Cplx,
    /// Fraction of a device's own TX power heard on its RX front-end.
    intra_leakage: f32,
    ring: Mutex<Ring>,
    tx_time: AtomicU64,
    rx_time: AtomicU64,
}

impl VirtualSpace {
    #[must_use]
    pub fn new(sample_rate: f64, noise_type: SimNoiseType) -> Self {
        Self::with_channel(sample_rate, noise_type, ChannelModel::Awgn)
    }

    #[must_use]
    pub fn with_channel(sample_rate: f64, noise_type: SimNoiseType, channel: ChannelModel) -> Self {
        let theta = fastrand::f32() * 2.0 * std::f32::consts::PI;
        Self {
            sample_rate,
            noise_type,
            channel,
            flat_tap: Cplx::from_polar(1.0, theta),
            intra_leakage: 0.01,
            ring: Mutex::new(Ring::new(1 << 16)),
            tx_time: AtomicU64::new(0),
            rx_time: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn tx_time_passed_64(&self) -> u64 {
        self.tx_time.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn rx_time_passed_64(&self) -> u64 {
        self.rx_time.load(Ordering::Acquire)
    }

    fn apply_channel(&self, samples: &[Cplx]) -> Vec<Cplx> {
        match self.channel {
            ChannelModel::Awgn => samples.to_vec(),
            ChannelModel::FlatRayleigh => samples.iter().map(|&s| s * self.flat_tap).collect(),
            ChannelModel::DoublySelective => {
                const TAPS: [f32; 3] = [1.0, 0.3, 0.1];
                let mut out = vec![Cplx::ZERO; samples.len()];
                for (i, &s) in samples.iter().enumerate() {
                    for (k, &g) in TAPS.iter().enumerate() {
                        if i + k < out.len() {
                            out[i + k] += s * g;
                        }
                    }
                }
                out
            }
        }
    }

    /// Write `samples` (already channel-propagated) at absolute sample
    /// time `at`, adding noise and this device's own leakage term.
    pub fn write_tx(&self, samples: &[Cplx], at: u64) {
        let propagated = self.apply_channel(samples);
        let sigma = 0.01f32;
        let mut ring = self.ring.lock();
        let with_noise: Vec<Cplx> = propagated
            .iter()
            .map(|&s| s * (1.0 + self.intra_leakage) + noise_sample(self.noise_type, sigma))
            .collect();
        ring.add(&with_noise);
        drop(ring);
        self.tx_time.store(at + samples.len() as u64, Ordering::Release);
    }

    /// Read `n` samples starting at absolute sample time `at`.
    pub fn read_rx(&self, at: u64, n: usize) -> Vec<Cplx> {
        let ring = self.ring.lock();
        let offset = (at as usize) % ring.samples.len();
        let out = ring.read(offset, n);
        drop(ring);
        self.rx_time.store(at + n as u64, Ordering::Release);
        out
    }

    /// Block (bounded by [`WAIT_TIMEOUT`]) until the TX clock has
    /// passed `at`. Returns `false` on timeout.
    #[must_use]
    pub fn wait_writable(&self, at: u64) -> bool {
        let deadline = Instant::now() + WAIT_TIMEOUT;
        while self.tx_time_passed_64() < at {
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::yield_now();
        }
        true
    }

    /// Block (bounded by [`WAIT_TIMEOUT`]) until the RX clock has
    /// passed `at`. Returns `false` on timeout.
    #[must_use]
    pub fn wait_readable(&self, at: u64) -> bool {
        let deadline = Instant::now() + WAIT_TIMEOUT;
        while self.rx_time_passed_64() < at {
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::yield_now();
        }
        true
    }

    #[must_use]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_roundtrip_nonzero() {
        let space = VirtualSpace::new(1_920_000.0, SimNoiseType::Thermal);
        let samples = vec![Cplx::new(1.0, 0.0); 100];
        space.write_tx(&samples, 0);
        let out = space.read_rx(0, 100);
        assert_eq!(out.len(), 100);
        assert!(out.iter().any(|s| s.norm() > 0.5));
    }

    #[test]
    fn test_wait_writable_succeeds_after_write() {
        let space = VirtualSpace::new(1_920_000.0, SimNoiseType::Relative);
        space.write_tx(&vec![Cplx::ZERO; 10], 0);
        assert!(space.wait_writable(10));
    }

    #[test]
    fn test_wait_writable_times_out() {
        let space = VirtualSpace::new(1_920_000.0, SimNoiseType::Relative);
        assert!(!space.wait_writable(1_000_000));
    }

    #[test]
    fn test_doubly_selective_spreads_energy() {
        let space =
            VirtualSpace::with_channel(1_920_000.0, SimNoiseType::Thermal, ChannelModel::DoublySelective);
        let mut impulse = vec![Cplx::ZERO; 10];
        impulse[0] = Cplx::new(1.0, 0.0);
        space.write_tx(&impulse, 0);
        let out = space.read_rx(0, 10);
        assert!(out[1].norm() > 0.0 || out[2].norm() > 0.0);
    }
}
