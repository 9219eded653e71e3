/*
 * Copyright (C) 2026 BLS12-381 CUDA Backend Contributors
 *
 * SPDX-License-Identifier: GPL-3.0-or-later
 *
 * This file is part of BLS12-381 CUDA Backend.
 *
 * BLS12-381 CUDA Backend is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * BLS12-381 CUDA Backend is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with BLS12-381 CUDA Backend.  If not, see <https://www.gnu.org/licenses/>.
 */


//! Deterministic input synthesis.
//!
//! Two generators:
//! - [`fill_random`]: `RANDOM_WINDOW` independent random elements, then the
//!   window repeated (`buf[i] = buf[i - RANDOM_WINDOW]`). Cheap for 2^20+
//!   inputs while still feeding the butterflies non-constant data.
//! - [`incremental_values`]: the arithmetic progression `0, s, 2s, ...` with
//!   step `s = ONE * omega(4)`. Element order is checkable directly, which
//!   makes ordering bugs easy to spot.

use ff::Field;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::field::RootsOfUnity;

/// Number of independent random draws before the input starts repeating.
pub const RANDOM_WINDOW: usize = 1000;

/// Log size of the root of unity used as the progression step.
pub const INCREMENT_LOG_SIZE: u32 = 4;

/// Which generator fills the run input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputKind {
    /// Random window repeated over the buffer
    #[default]
    Random,
    /// Arithmetic progression with step omega(4)
    Incremental,
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputKind::Random => write!(f, "random"),
            InputKind::Incremental => write!(f, "incremental"),
        }
    }
}

/// Fill `dst` with random elements, repeating the first `RANDOM_WINDOW`.
pub fn fill_random<F: Field, R: RngCore>(dst: &mut [F], rng: &mut R) {
    for i in 0..dst.len() {
        dst[i] = if i < RANDOM_WINDOW {
            F::random(&mut *rng)
        } else {
            dst[i - RANDOM_WINDOW]
        };
    }
}

/// Fill `dst` with `0, s, 2s, ...` where `s = ONE * omega(4)`.
pub fn incremental_values<F: RootsOfUnity>(dst: &mut [F]) {
    let step = F::ONE * F::omega(INCREMENT_LOG_SIZE);
    let mut acc = F::ZERO;
    for slot in dst.iter_mut() {
        *slot = acc;
        acc += step;
    }
}

/// Generate `n` input elements of the requested kind.
///
/// The random generator is seeded from `seed`, so identical arguments
/// always produce identical buffers.
pub fn generate<F: RootsOfUnity>(kind: InputKind, n: usize, seed: u64) -> Vec<F> {
    let mut data = vec![F::ZERO; n];
    match kind {
        InputKind::Random => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            fill_random(&mut data, &mut rng);
        }
        InputKind::Incremental => incremental_values(&mut data),
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Scalar;

    #[test]
    fn test_random_window_repeats() {
        for k in [1usize, 5, 10, 12] {
            let n = 1 << k;
            let data: Vec<Scalar> = generate(InputKind::Random, n, 7);
            assert_eq!(data.len(), n);
            for i in RANDOM_WINDOW..n {
                assert_eq!(data[i], data[i - RANDOM_WINDOW], "k={} i={}", k, i);
            }
        }
    }

    #[test]
    fn test_random_window_is_not_constant() {
        let data: Vec<Scalar> = generate(InputKind::Random, 1 << 11, 7);
        assert!(data[..RANDOM_WINDOW].iter().any(|x| *x != data[0]));
        // The window itself is independent draws, not a shifted copy
        assert_ne!(data[0], data[1]);
    }

    #[test]
    fn test_random_is_deterministic_per_seed() {
        let a: Vec<Scalar> = generate(InputKind::Random, 2048, 42);
        let b: Vec<Scalar> = generate(InputKind::Random, 2048, 42);
        let c: Vec<Scalar> = generate(InputKind::Random, 2048, 43);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_incremental_values_progression() {
        let data: Vec<Scalar> = generate(InputKind::Incremental, 1 << 10, 0);
        let step = Scalar::omega(INCREMENT_LOG_SIZE);
        assert_eq!(data[0], Scalar::ZERO);
        for i in 1..data.len() {
            assert_eq!(data[i], data[i - 1] + step, "i={}", i);
        }
    }

    #[test]
    fn test_incremental_matches_scalar_multiples() {
        let data: Vec<Scalar> = generate(InputKind::Incremental, 64, 0);
        let step = Scalar::omega(INCREMENT_LOG_SIZE);
        for (i, value) in data.iter().enumerate() {
            assert_eq!(*value, step * Scalar::from(i as u64));
        }
    }
}
