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


//! Roots of unity over the scalar field.
//!
//! The harness only needs one thing from the field beyond `ff::Field`:
//! a primitive 2^k-th root of unity for every `k` up to the two-adicity `S`.
//! It is derived from `PrimeField::ROOT_OF_UNITY` (a primitive 2^S-th root)
//! by squaring `S - k` times, the same way the CPU fallback computes omega.

use ff::PrimeField;

/// Primitive power-of-two roots of unity.
pub trait RootsOfUnity: PrimeField {
    /// Primitive 2^`log_size`-th root of unity, or `None` above the
    /// field's two-adicity.
    fn try_omega(log_size: u32) -> Option<Self> {
        if log_size > Self::S {
            return None;
        }
        let mut root = Self::ROOT_OF_UNITY;
        for _ in log_size..Self::S {
            root = root.square();
        }
        Some(root)
    }

    /// Primitive 2^`log_size`-th root of unity.
    ///
    /// # Panics
    /// If `log_size` exceeds the field's two-adicity `S`.
    fn omega(log_size: u32) -> Self {
        match Self::try_omega(log_size) {
            Some(root) => root,
            None => panic!("no 2^{}-th root of unity (two-adicity is {})", log_size, Self::S),
        }
    }
}

impl<F: PrimeField> RootsOfUnity for F {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Scalar;
    use ff::Field;

    #[test]
    fn test_omega_is_primitive() {
        for k in [1u32, 2, 4, 10, 19] {
            let root = Scalar::omega(k);
            let mut acc = root;
            // root^(2^(k-1)) must be -1, root^(2^k) must be 1
            for _ in 0..k - 1 {
                acc = acc.square();
            }
            assert_eq!(acc, -Scalar::ONE, "omega({}) is not primitive", k);
            assert_eq!(acc.square(), Scalar::ONE);
        }
    }

    #[test]
    fn test_omega_zero_is_one() {
        assert_eq!(Scalar::omega(0), Scalar::ONE);
    }

    #[test]
    fn test_try_omega_above_two_adicity() {
        assert!(Scalar::try_omega(Scalar::S).is_some());
        assert!(Scalar::try_omega(Scalar::S + 1).is_none());
    }
}
