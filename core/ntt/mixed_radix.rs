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


//! Mixed-radix Stockham kernel (new backend).
//!
//! Auto-sorting Stockham passes: every pass reads one buffer and writes the
//! other, so the data stays in natural order throughout and no bit-reversal
//! is needed for `NN`. The size is factored into radix-4 passes with a single
//! radix-2 pass in front when `log2(n)` is odd.
//!
//! Pass invariant: before a pass with `ns` already-combined points, block `b`
//! (`n / ns` blocks of `ns` elements) holds the length-`ns` transform of the
//! subsequence `x[b], x[b + n/ns], ...`. A radix-`r` pass merges `r` such
//! blocks into one block of `ns * r`.

use ff::Field;

use super::{bit_reverse, NttDir, NttDomain, NttOrdering};

/// Unscaled transform of `data` (`len` a power of two within the domain).
pub fn transform<F: Field>(domain: &NttDomain<F>, data: &mut [F], dir: NttDir, ordering: NttOrdering) {
    if data.len() < 2 {
        return;
    }
    if ordering.input_reversed() {
        bit_reverse(data);
    }
    stockham(domain, data, dir);
    if ordering.output_reversed() {
        bit_reverse(data);
    }
}

/// Radices applied, in order, for a transform of size 2^`log_n`.
pub fn radices(log_n: u32) -> Vec<usize> {
    let mut plan = Vec::with_capacity(log_n as usize / 2 + 1);
    if log_n % 2 == 1 {
        plan.push(2);
    }
    plan.extend(std::iter::repeat(4).take(log_n as usize / 2));
    plan
}

fn stockham<F: Field>(domain: &NttDomain<F>, data: &mut [F], dir: NttDir) {
    let n = data.len();
    let stride = domain.size() / n;
    let mut scratch = vec![F::ZERO; n];
    let mut in_data = true;
    let mut ns = 1;

    for radix in radices(n.trailing_zeros()) {
        let (src, dst): (&[F], &mut [F]) = if in_data {
            (&data[..], &mut scratch[..])
        } else {
            (&scratch[..], &mut data[..])
        };
        match radix {
            2 => pass2(domain, src, dst, ns, stride, dir),
            _ => pass4(domain, src, dst, ns, stride, dir),
        }
        in_data = !in_data;
        ns *= radix;
    }

    if !in_data {
        data.copy_from_slice(&scratch);
    }
}

fn pass2<F: Field>(domain: &NttDomain<F>, src: &[F], dst: &mut [F], ns: usize, stride: usize, dir: NttDir) {
    let n = src.len();
    let span = n / 2;
    let tw_step = (n / (ns * 2)) * stride;
    for j in 0..span {
        let k = j % ns;
        let base = (j / ns) * ns * 2 + k;
        let v0 = src[j];
        let v1 = src[j + span] * domain.twiddle(k * tw_step, dir);
        dst[base] = v0 + v1;
        dst[base + ns] = v0 - v1;
    }
}

fn pass4<F: Field>(domain: &NttDomain<F>, src: &[F], dst: &mut [F], ns: usize, stride: usize, dir: NttDir) {
    let n = src.len();
    let span = n / 4;
    let tw_step = (n / (ns * 4)) * stride;
    // Primitive 4th root in the transform direction
    let quarter = domain.twiddle(domain.size() / 4, dir);
    for j in 0..span {
        let k = j % ns;
        let base = (j / ns) * ns * 4 + k;
        let e = k * tw_step;
        let v0 = src[j];
        let v1 = src[j + span] * domain.twiddle(e, dir);
        let v2 = src[j + 2 * span] * domain.twiddle(2 * e, dir);
        let v3 = src[j + 3 * span] * domain.twiddle(3 * e, dir);

        let a = v0 + v2;
        let b = v0 - v2;
        let c = v1 + v3;
        let d = (v1 - v3) * quarter;
        dst[base] = a + c;
        dst[base + ns] = b + d;
        dst[base + 2 * ns] = a - c;
        dst[base + 3 * ns] = b - d;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radix_plan_covers_size() {
        for log_n in 1..=20u32 {
            let plan = radices(log_n);
            assert_eq!(plan.iter().product::<usize>(), 1 << log_n);
            assert_eq!(plan.iter().filter(|r| **r == 2).count(), (log_n % 2) as usize);
        }
    }
}
