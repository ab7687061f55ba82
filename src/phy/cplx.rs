// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Minimal complex-float sample type.
//!
//! Hand-rolled rather than pulled from `num-complex`: the only
//! operations this crate needs are add/mul/magnitude on `f32` pairs,
//! and every other numeric primitive in this codebase (CRCs, the turbo
//! code, the resampler) is also a from-scratch implementation rather
//! than a pulled-in DSP crate. Keeping `Cplx` a plain `#[repr(C)]`
//! struct of two `f32`s means `BufferRx`'s ring storage is a flat
//! `Vec<Cplx>` with no indirection.

use std::ops::{Add, AddAssign, Mul, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct Cplx {
    pub re: f32,
    pub im: f32,
}

impl Cplx {
    pub const ZERO: Self = Self { re: 0.0, im: 0.0 };

    #[must_use]
    pub const fn new(re: f32, im: f32) -> Self {
        Self { re, im }
    }

    #[must_use]
    pub fn norm_sqr(self) -> f32 {
        self.re * self.re + self.im * self.im
    }

    #[must_use]
    pub fn norm(self) -> f32 {
        self.norm_sqr().sqrt()
    }

    #[must_use]
    pub fn conj(self) -> Self {
        Self::new(self.re, -self.im)
    }

    /// `e^{j*theta}`
    #[must_use]
    pub fn from_polar(mag: f32, theta: f32) -> Self {
        Self::new(mag * theta.cos(), mag * theta.sin())
    }
}

impl Add for Cplx {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl AddAssign for Cplx {
    fn add_assign(&mut self, rhs: Self) {
        self.re += rhs.re;
        self.im += rhs.im;
    }
}

impl Sub for Cplx {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl Mul for Cplx {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

impl Mul<f32> for Cplx {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.re * rhs, self.im * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_conj_is_norm_sqr() {
        let c = Cplx::new(3.0, 4.0);
        let p = c * c.conj();
        assert!((p.re - 25.0).abs() < 1e-6);
        assert!(p.im.abs() < 1e-6);
        assert!((c.norm_sqr() - 25.0).abs() < 1e-6);
    }

    #[test]
    fn test_from_polar_unit_circle() {
        let c = Cplx::from_polar(1.0, std::f32::consts::FRAC_PI_2);
        assert!((c.re).abs() < 1e-5);
        assert!((c.im - 1.0).abs() < 1e-5);
    }
}
