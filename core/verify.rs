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


//! Differential verifier: ordered element-wise equality with early exit.

/// Outcome of a comparison scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// Index of the first differing pair, if any
    pub first_mismatch: Option<usize>,
    /// Pairs examined, including the mismatching one
    pub scanned: usize,
}

impl Verdict {
    pub fn passed(&self) -> bool {
        self.first_mismatch.is_none()
    }
}

/// Compare the first `len` pairs of `a` and `b`, stopping at the first
/// difference.
///
/// A buffer shorter than `len` mismatches at its end.
pub fn scan<T: PartialEq>(a: &[T], b: &[T], len: usize) -> Verdict {
    let mut scanned = 0;
    for (x, y) in a.iter().zip(b).take(len) {
        scanned += 1;
        if x != y {
            return Verdict { first_mismatch: Some(scanned - 1), scanned };
        }
    }
    let first_mismatch = (scanned < len).then_some(scanned);
    Verdict { first_mismatch, scanned }
}

/// `true` iff the first `len` pairs are all equal.
pub fn compare<T: PartialEq>(a: &[T], b: &[T], len: usize) -> bool {
    scan(a, b, len).passed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Scalar;

    fn ramp(n: u64) -> Vec<Scalar> {
        (0..n).map(Scalar::from).collect()
    }

    #[test]
    fn test_equal_buffers() {
        let a = ramp(64);
        let verdict = scan(&a, &a.clone(), 64);
        assert!(verdict.passed());
        assert_eq!(verdict.scanned, 64);
        assert!(compare(&a, &a, 64));
    }

    #[test]
    fn test_scan_stops_at_mismatch() {
        let a = ramp(64);
        for i in [0usize, 17, 63] {
            let mut b = a.clone();
            b[i] += Scalar::from(1u64);
            let verdict = scan(&a, &b, 64);
            assert_eq!(verdict.first_mismatch, Some(i));
            assert_eq!(verdict.scanned, i + 1);
            assert!(!compare(&a, &b, 64));
        }
    }

    #[test]
    fn test_len_limits_the_scan() {
        let a = ramp(16);
        let mut b = a.clone();
        b[10] = Scalar::from(99u64);
        assert!(compare(&a, &b, 10));
        assert!(!compare(&a, &b, 11));
        assert!(compare(&a, &b, 0));
    }

    #[test]
    fn test_short_buffer_fails() {
        let a = ramp(8);
        let verdict = scan(&a, &a[..5], 8);
        assert_eq!(verdict.first_mismatch, Some(5));
        assert_eq!(verdict.scanned, 5);
    }
}
