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


//! NTT domain: precomputed twiddle factors for one root of unity.
//!
//! A domain built from a primitive 2^K-th root `w` serves every transform of
//! size `n = 2^k <= 2^K`: the size-`n` root is `w^(2^K / n)`, so kernels index
//! the shared table with a stride instead of building per-size tables.

use ff::Field;

use super::{NttDir, NttInitDomainConfig};
use crate::error::DeviceError;

/// Largest root order accepted by [`NttDomain::new`].
pub const MAX_DOMAIN_LOG_SIZE: u32 = 32;

/// Twiddle table for a power-of-two root of unity.
#[derive(Clone)]
pub struct NttDomain<F> {
    log_size: u32,
    /// `w^i` for `i` in `0..size`
    twiddles: Vec<F>,
    /// `w^-i` for `i` in `0..size`, only in fast-twiddles mode
    inv_twiddles: Option<Vec<F>>,
    /// `(2^k)^-1` for `k` in `0..=log_size`
    inv_sizes: Vec<F>,
}

impl<F> std::fmt::Debug for NttDomain<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NttDomain")
            .field("log_size", &self.log_size)
            .field("fast_twiddles", &self.inv_twiddles.is_some())
            .finish()
    }
}

impl<F: Field> NttDomain<F> {
    /// Build the domain for `root`.
    ///
    /// The domain size is the multiplicative order of `root`, which must be a
    /// power of two no larger than 2^[`MAX_DOMAIN_LOG_SIZE`].
    pub fn new(root: F, cfg: &NttInitDomainConfig) -> Result<Self, DeviceError> {
        let log_size = root_log_order(root).ok_or_else(|| {
            DeviceError::InvalidArgument(
                "domain root is not a power-of-two root of unity".to_string(),
            )
        })?;
        let size = 1usize << log_size;

        let mut twiddles = Vec::with_capacity(size);
        let mut acc = F::ONE;
        for _ in 0..size {
            twiddles.push(acc);
            acc *= root;
        }

        let inv_twiddles = cfg.fast_twiddles.then(|| {
            (0..size)
                .map(|i| twiddles[(size - i) & (size - 1)])
                .collect::<Vec<_>>()
        });

        let inv_two: Option<F> = F::ONE.double().invert().into();
        let inv_two = inv_two.ok_or_else(|| {
            DeviceError::InvalidArgument("field characteristic is 2".to_string())
        })?;
        let mut inv_sizes = Vec::with_capacity(log_size as usize + 1);
        let mut acc = F::ONE;
        for _ in 0..=log_size {
            inv_sizes.push(acc);
            acc *= inv_two;
        }

        Ok(Self { log_size, twiddles, inv_twiddles, inv_sizes })
    }

    /// log2 of the largest supported transform size
    pub fn log_size(&self) -> u32 {
        self.log_size
    }

    /// Largest supported transform size
    pub fn size(&self) -> usize {
        self.twiddles.len()
    }

    /// Whether a dedicated inverse table was precomputed
    pub fn has_fast_twiddles(&self) -> bool {
        self.inv_twiddles.is_some()
    }

    /// Number of field elements held by the tables
    pub fn element_count(&self) -> usize {
        self.twiddles.len()
            + self.inv_twiddles.as_ref().map_or(0, Vec::len)
            + self.inv_sizes.len()
    }

    /// `w^exponent` (forward) or `w^-exponent` (inverse), exponent taken
    /// modulo the domain size.
    #[inline]
    pub fn twiddle(&self, exponent: usize, dir: NttDir) -> F {
        let mask = self.size() - 1;
        let idx = exponent & mask;
        match dir {
            NttDir::Forward => self.twiddles[idx],
            NttDir::Inverse => match &self.inv_twiddles {
                Some(inv) => inv[idx],
                None => self.twiddles[(self.size() - idx) & mask],
            },
        }
    }

    /// `(2^log_n)^-1`; `log_n` must not exceed the domain log size
    #[inline]
    pub fn inv_size(&self, log_n: u32) -> F {
        self.inv_sizes[log_n as usize]
    }
}

/// Smallest `k` with `root^(2^k) == 1`, if it is at most `MAX_DOMAIN_LOG_SIZE`.
fn root_log_order<F: Field>(root: F) -> Option<u32> {
    let mut acc = root;
    let mut log_order = 0;
    while acc != F::ONE {
        if log_order == MAX_DOMAIN_LOG_SIZE {
            return None;
        }
        acc = acc.square();
        log_order += 1;
    }
    Some(log_order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::RootsOfUnity;
    use crate::Scalar;

    #[test]
    fn test_domain_size_follows_root_order() {
        for k in [0u32, 1, 3, 10] {
            let domain = NttDomain::new(Scalar::omega(k), &NttInitDomainConfig::default()).unwrap();
            assert_eq!(domain.log_size(), k);
            assert_eq!(domain.size(), 1 << k);
        }
    }

    #[test]
    fn test_rejects_non_root() {
        let err = NttDomain::new(Scalar::from(3u64), &NttInitDomainConfig::default());
        assert!(matches!(err, Err(DeviceError::InvalidArgument(_))));
    }

    #[test]
    fn test_fast_twiddles_match_mirrored_lookup() {
        let root = Scalar::omega(6);
        let slow = NttDomain::new(root, &NttInitDomainConfig { fast_twiddles: false }).unwrap();
        let fast = NttDomain::new(root, &NttInitDomainConfig { fast_twiddles: true }).unwrap();
        assert!(fast.has_fast_twiddles() && !slow.has_fast_twiddles());
        assert!(fast.element_count() > slow.element_count());
        for e in 0..130 {
            assert_eq!(slow.twiddle(e, NttDir::Inverse), fast.twiddle(e, NttDir::Inverse));
            assert_eq!(
                slow.twiddle(e, NttDir::Forward) * slow.twiddle(e, NttDir::Inverse),
                Scalar::ONE
            );
        }
    }

    #[test]
    fn test_inv_sizes() {
        let domain = NttDomain::new(Scalar::omega(5), &NttInitDomainConfig::default()).unwrap();
        for k in 0..=5u32 {
            assert_eq!(domain.inv_size(k) * Scalar::from(1u64 << k), Scalar::ONE);
        }
    }
}
