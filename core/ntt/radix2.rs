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


//! Radix-2 Cooley-Tukey kernel (legacy backend).
//!
//! Two butterfly schedules, picked by the requested ordering so that at most
//! one bit-reversal permutation is needed:
//! - DIT (Cooley-Tukey): bit-reversed input -> natural output
//! - DIF (Gentleman-Sande): natural input -> bit-reversed output

use ff::Field;

use super::{bit_reverse, NttDir, NttDomain, NttOrdering};

/// Unscaled transform of `data` (`len` a power of two within the domain).
pub fn transform<F: Field>(domain: &NttDomain<F>, data: &mut [F], dir: NttDir, ordering: NttOrdering) {
    if data.len() < 2 {
        return;
    }
    match (ordering.input_reversed(), ordering.output_reversed()) {
        (false, true) => dif(domain, data, dir),
        (true, false) => dit(domain, data, dir),
        (false, false) => {
            bit_reverse(data);
            dit(domain, data, dir);
        }
        (true, true) => {
            bit_reverse(data);
            dif(domain, data, dir);
        }
    }
}

fn dit<F: Field>(domain: &NttDomain<F>, data: &mut [F], dir: NttDir) {
    let n = data.len();
    let stride = domain.size() / n;
    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let step = (n / len) * stride;
        for chunk in data.chunks_exact_mut(len) {
            let (lo, hi) = chunk.split_at_mut(half);
            for (j, (a, b)) in lo.iter_mut().zip(hi.iter_mut()).enumerate() {
                let t = *b * domain.twiddle(j * step, dir);
                *b = *a - t;
                *a += t;
            }
        }
        len <<= 1;
    }
}

fn dif<F: Field>(domain: &NttDomain<F>, data: &mut [F], dir: NttDir) {
    let n = data.len();
    let stride = domain.size() / n;
    let mut len = n;
    while len >= 2 {
        let half = len / 2;
        let step = (n / len) * stride;
        for chunk in data.chunks_exact_mut(len) {
            let (lo, hi) = chunk.split_at_mut(half);
            for (j, (a, b)) in lo.iter_mut().zip(hi.iter_mut()).enumerate() {
                let u = *a;
                let v = *b;
                *a = u + v;
                *b = (u - v) * domain.twiddle(j * step, dir);
            }
        }
        len >>= 1;
    }
}
