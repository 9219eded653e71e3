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


//! Number Theoretic Transform collaborators.
//!
//! The harness treats the transform as an external kernel: it only builds an
//! [`NttConfig`] and asks the device to launch it. This module holds the
//! vocabulary shared by the harness and the device (direction, ordering,
//! launch and domain configs) plus the two host kernels the host device
//! dispatches to:
//!
//! - [`radix2`]: classic Cooley-Tukey butterflies (the legacy backend)
//! - [`mixed_radix`]: Stockham auto-sort with radix-4 passes (the new backend)
//!
//! Both compute the exact transform `X[k] = sum_j x[j] * w^(jk)` over the
//! field, so for the same domain, direction and ordering their outputs must
//! be bit-identical. The inverse uses `w^-1` and scales by `n^-1`.
//!
//! # Ordering
//!
//! Mirrors ICICLE's `Ordering`: each side of the transform is either natural
//! (N) or bit-reversed (R).
//!
//! | Ordering | Input        | Output       |
//! |----------|--------------|--------------|
//! | `NN`     | natural      | natural      |
//! | `NR`     | natural      | bit-reversed |
//! | `RN`     | bit-reversed | natural      |
//! | `RR`     | bit-reversed | bit-reversed |

pub mod domain;
pub mod mixed_radix;
pub mod radix2;

pub use domain::NttDomain;

use ff::Field;

use crate::device::StreamHandle;
use crate::error::DeviceError;

/// Transform direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NttDir {
    /// Coefficients -> evaluations
    Forward,
    /// Evaluations -> coefficients (scaled by n^-1)
    Inverse,
}

impl NttDir {
    /// Inverse when `inverse` is set, forward otherwise
    pub fn from_inverse_flag(inverse: bool) -> Self {
        if inverse {
            NttDir::Inverse
        } else {
            NttDir::Forward
        }
    }
}

/// Input/output element orderings (matches ICICLE's Ordering enum)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NttOrdering {
    /// Natural-Natural (default)
    #[default]
    NN,
    /// Natural-Reversed
    NR,
    /// Reversed-Natural
    RN,
    /// Reversed-Reversed
    RR,
}

impl NttOrdering {
    /// Parse a short name ("nn", "nr", "rn", "rr") or its index
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "nn" | "knn" | "natural" | "0" => Some(NttOrdering::NN),
            "nr" | "knr" | "1" => Some(NttOrdering::NR),
            "rn" | "krn" | "2" => Some(NttOrdering::RN),
            "rr" | "krr" | "3" => Some(NttOrdering::RR),
            _ => None,
        }
    }

    /// Label printed in the run summary
    pub fn label(&self) -> &'static str {
        match self {
            NttOrdering::NN => "kNN",
            NttOrdering::NR => "kNR",
            NttOrdering::RN => "kRN",
            NttOrdering::RR => "kRR",
        }
    }

    /// Whether the input is expected in bit-reversed order
    pub fn input_reversed(&self) -> bool {
        matches!(self, NttOrdering::RN | NttOrdering::RR)
    }

    /// Whether the output is produced in bit-reversed order
    pub fn output_reversed(&self) -> bool {
        matches!(self, NttOrdering::NR | NttOrdering::RR)
    }
}

impl std::fmt::Display for NttOrdering {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-launch transform configuration.
///
/// `is_force_radix2` is the only field that differs between the legacy and
/// the new backend within one comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NttConfig {
    /// Stream the launch is enqueued on
    pub stream_handle: StreamHandle,
    pub ordering: NttOrdering,
    pub are_inputs_on_device: bool,
    pub are_outputs_on_device: bool,
    /// Return right after enqueueing instead of draining the stream
    pub is_async: bool,
    /// Select the radix-2 kernel instead of the mixed-radix one
    pub is_force_radix2: bool,
}

/// Domain initialization options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NttInitDomainConfig {
    /// Precompute a dedicated inverse twiddle table (extra memory, no index
    /// mirroring on inverse transforms)
    pub fast_twiddles: bool,
}

/// Kernel family selected by a launch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NttAlgorithm {
    Radix2,
    MixedRadix,
}

impl NttAlgorithm {
    pub fn from_config(cfg: &NttConfig) -> Self {
        if cfg.is_force_radix2 {
            NttAlgorithm::Radix2
        } else {
            NttAlgorithm::MixedRadix
        }
    }
}

/// Permute `data` into bit-reversed index order (an involution).
pub fn bit_reverse<T>(data: &mut [T]) {
    let n = data.len();
    if n <= 2 {
        return;
    }
    let shift = usize::BITS - n.trailing_zeros();
    for i in 0..n {
        let j = i.reverse_bits() >> shift;
        if i < j {
            data.swap(i, j);
        }
    }
}

/// Transform `data` in place with the kernel selected by `cfg`.
///
/// `data.len()` must be a power of two no larger than the domain.
pub fn ntt_inplace<F: Field>(
    domain: &NttDomain<F>,
    data: &mut [F],
    dir: NttDir,
    cfg: &NttConfig,
) -> Result<(), DeviceError> {
    let n = data.len();
    if !n.is_power_of_two() {
        return Err(DeviceError::InvalidArgument(format!(
            "NTT size must be power of 2, got {}",
            n
        )));
    }
    if n > domain.size() {
        return Err(DeviceError::InvalidArgument(format!(
            "NTT size 2^{} exceeds domain 2^{}",
            n.trailing_zeros(),
            domain.log_size()
        )));
    }

    match NttAlgorithm::from_config(cfg) {
        NttAlgorithm::Radix2 => radix2::transform(domain, data, dir, cfg.ordering),
        NttAlgorithm::MixedRadix => mixed_radix::transform(domain, data, dir, cfg.ordering),
    }

    if dir == NttDir::Inverse {
        let n_inv = domain.inv_size(n.trailing_zeros());
        for x in data.iter_mut() {
            *x *= n_inv;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::RootsOfUnity;
    use crate::Scalar;

    fn naive_dft(input: &[Scalar], dir: NttDir) -> Vec<Scalar> {
        let n = input.len();
        let mut omega = Scalar::omega(n.trailing_zeros());
        if dir == NttDir::Inverse {
            omega = omega.invert().unwrap();
        }
        let mut out = vec![Scalar::ZERO; n];
        let mut w_k = Scalar::ONE;
        for slot in out.iter_mut() {
            let mut w = Scalar::ONE;
            for x in input {
                *slot += *x * w;
                w *= w_k;
            }
            w_k *= omega;
        }
        if dir == NttDir::Inverse {
            let n_inv = Scalar::from(n as u64).invert().unwrap();
            out.iter_mut().for_each(|x| *x *= n_inv);
        }
        out
    }

    fn sample(n: usize) -> Vec<Scalar> {
        (0..n).map(|i| Scalar::from((i * i + 3) as u64)).collect()
    }

    fn domain(log_size: u32) -> NttDomain<Scalar> {
        NttDomain::new(Scalar::omega(log_size), &NttInitDomainConfig::default()).unwrap()
    }

    const ORDERINGS: [NttOrdering; 4] =
        [NttOrdering::NN, NttOrdering::NR, NttOrdering::RN, NttOrdering::RR];

    #[test]
    fn test_bit_reverse_small() {
        let mut data: Vec<usize> = (0..8).collect();
        bit_reverse(&mut data);
        assert_eq!(data, vec![0, 4, 2, 6, 1, 5, 3, 7]);
        bit_reverse(&mut data);
        assert_eq!(data, (0..8).collect::<Vec<_>>());

        let mut single = vec![9];
        bit_reverse(&mut single);
        assert_eq!(single, vec![9]);
    }

    #[test]
    fn test_kernels_match_naive_dft() {
        let domain = domain(8);
        for log_n in 1..=7u32 {
            let n = 1usize << log_n;
            let input = sample(n);
            for dir in [NttDir::Forward, NttDir::Inverse] {
                let expected = naive_dft(&input, dir);
                for ordering in ORDERINGS {
                    for force in [false, true] {
                        let cfg = NttConfig { ordering, is_force_radix2: force, ..Default::default() };
                        let mut data = input.clone();
                        if ordering.input_reversed() {
                            bit_reverse(&mut data);
                        }
                        ntt_inplace(&domain, &mut data, dir, &cfg).unwrap();
                        if ordering.output_reversed() {
                            bit_reverse(&mut data);
                        }
                        assert_eq!(
                            data, expected,
                            "log_n={} dir={:?} ordering={} radix2={}",
                            log_n, dir, ordering, force
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_forward_inverse_roundtrip() {
        let domain = domain(10);
        let original = sample(1 << 10);
        for force in [false, true] {
            let mut data = original.clone();
            let fwd = NttConfig { ordering: NttOrdering::NR, is_force_radix2: force, ..Default::default() };
            let inv = NttConfig { ordering: NttOrdering::RN, is_force_radix2: force, ..Default::default() };
            ntt_inplace(&domain, &mut data, NttDir::Forward, &fwd).unwrap();
            assert_ne!(data, original);
            ntt_inplace(&domain, &mut data, NttDir::Inverse, &inv).unwrap();
            assert_eq!(data, original, "radix2={}", force);
        }
    }

    #[test]
    fn test_constant_polynomial_evaluates_to_constant() {
        let domain = domain(4);
        let mut coeffs = vec![Scalar::ZERO; 16];
        coeffs[0] = Scalar::ONE;
        ntt_inplace(&domain, &mut coeffs, NttDir::Forward, &NttConfig::default()).unwrap();
        assert!(coeffs.iter().all(|x| *x == Scalar::ONE));
    }

    #[test]
    fn test_rejects_sizes_outside_domain() {
        let domain = domain(4);
        let mut too_big = vec![Scalar::ONE; 32];
        let err = ntt_inplace(&domain, &mut too_big, NttDir::Forward, &NttConfig::default());
        assert!(matches!(err, Err(DeviceError::InvalidArgument(_))));

        let mut odd = vec![Scalar::ONE; 12];
        let err = ntt_inplace(&domain, &mut odd, NttDir::Forward, &NttConfig::default());
        assert!(matches!(err, Err(DeviceError::InvalidArgument(_))));
    }

    #[test]
    fn test_ordering_names() {
        assert_eq!(NttOrdering::from_name("NR"), Some(NttOrdering::NR));
        assert_eq!(NttOrdering::from_name("3"), Some(NttOrdering::RR));
        assert_eq!(NttOrdering::from_name("nm"), None);
        assert_eq!(NttOrdering::RN.to_string(), "kRN");
        assert!(NttOrdering::RR.input_reversed() && NttOrdering::RR.output_reversed());
        assert!(!NttOrdering::NN.input_reversed() && !NttOrdering::NN.output_reversed());
    }
}
