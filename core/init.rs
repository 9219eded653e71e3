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


//! Domain initialization, timed once per run before any transform.

use std::time::{Duration, Instant};

use tracing::info;

use crate::device::ComputeDevice;
use crate::error::DeviceError;
use crate::field::RootsOfUnity;
use crate::ntt::NttInitDomainConfig;

/// Initialize the device NTT domain for transforms up to `2^log_size`.
///
/// Returns the wall-clock duration of the setup call. A `log_size` above the
/// field's two-adicity has no root of unity and is rejected as an invalid
/// argument.
pub fn init_domain<D>(device: &D, log_size: u32, cfg: &NttInitDomainConfig) -> Result<Duration, DeviceError>
where
    D: ComputeDevice,
    D::Field: RootsOfUnity,
{
    let root = D::Field::try_omega(log_size).ok_or_else(|| {
        DeviceError::InvalidArgument(format!("no 2^{}-th root of unity in the scalar field", log_size))
    })?;

    let start = Instant::now();
    device.init_domain(root, cfg)?;
    let elapsed = start.elapsed();

    info!(
        "NTT domain 2^{} initialized on {} in {:?} (fast twiddles: {})",
        log_size,
        device.name(),
        elapsed,
        cfg.fast_twiddles
    );
    Ok(elapsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceOp, HostDevice};
    use crate::Scalar;

    #[test]
    fn test_init_domain_once() {
        let device = HostDevice::<Scalar>::new();
        init_domain(&device, 8, &NttInitDomainConfig { fast_twiddles: true }).unwrap();
        assert_eq!(device.stats().domain_inits, 1);
    }

    #[test]
    fn test_log_size_above_two_adicity() {
        let device = HostDevice::<Scalar>::new();
        let err = init_domain(&device, 33, &NttInitDomainConfig::default()).unwrap_err();
        assert_eq!(err.code(), 1);
        assert_eq!(device.stats().domain_inits, 0);
    }

    #[test]
    fn test_device_failure_propagates() {
        let device = HostDevice::<Scalar>::new();
        device.inject_fault(DeviceOp::InitDomain, DeviceError::LaunchFailure("setup".into()));
        let err = init_domain(&device, 4, &NttInitDomainConfig::default()).unwrap_err();
        assert_eq!(err, DeviceError::LaunchFailure("setup".into()));
    }
}
