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


//! Dual-backend timed executor.
//!
//! One [`benchmark`] call times the new (mixed-radix) backend and then the
//! legacy (radix-2) backend on the same stream, each between its own pair of
//! timer events. Launches are asynchronous; the stream is synchronized after
//! each backend's stop record, so the two backends never overlap and each
//! measurement covers only its own launches.

use std::time::Duration;

use tracing::info;

use crate::device::{ComputeDevice, ManagedEvent, ManagedStream, StreamHandle};
use crate::error::DeviceError;
use crate::memory::DeviceBuffers;
use crate::ntt::{NttConfig, NttDir, NttOrdering};

/// The two transform implementations under comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Mixed-radix kernel
    New,
    /// Radix-2 kernel
    Legacy,
}

impl Backend {
    /// Timing order within one benchmark call
    pub const ALL: [Backend; 2] = [Backend::New, Backend::Legacy];

    pub fn force_radix2(&self) -> bool {
        matches!(self, Backend::Legacy)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Backend::New => "New",
            Backend::Legacy => "Old",
        }
    }
}

/// Logical transform shared by both backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformSpec {
    pub log_size: u32,
    pub direction: NttDir,
    pub ordering: NttOrdering,
}

impl TransformSpec {
    pub fn size(&self) -> usize {
        1usize << self.log_size
    }

    /// Launch config for `backend`; only `is_force_radix2` depends on it.
    pub fn ntt_config(&self, stream: StreamHandle, backend: Backend) -> NttConfig {
        NttConfig {
            stream_handle: stream,
            ordering: self.ordering,
            are_inputs_on_device: true,
            are_outputs_on_device: true,
            is_async: true,
            is_force_radix2: backend.force_radix2(),
        }
    }
}

/// Start/stop event pairs of both backends.
pub struct BenchTimers<'d, D: ComputeDevice> {
    new_start: ManagedEvent<'d, D>,
    new_stop: ManagedEvent<'d, D>,
    legacy_start: ManagedEvent<'d, D>,
    legacy_stop: ManagedEvent<'d, D>,
}

impl<'d, D: ComputeDevice> BenchTimers<'d, D> {
    pub fn create(device: &'d D) -> Result<Self, DeviceError> {
        Ok(Self {
            new_start: ManagedEvent::create(device)?,
            new_stop: ManagedEvent::create(device)?,
            legacy_start: ManagedEvent::create(device)?,
            legacy_stop: ManagedEvent::create(device)?,
        })
    }

    fn pair(&self, backend: Backend) -> (&ManagedEvent<'d, D>, &ManagedEvent<'d, D>) {
        match backend {
            Backend::New => (&self.new_start, &self.new_stop),
            Backend::Legacy => (&self.legacy_start, &self.legacy_stop),
        }
    }

    pub fn destroy(self) -> Result<(), DeviceError> {
        let Self { new_start, new_stop, legacy_start, legacy_stop } = self;
        let results = [new_start.destroy(), new_stop.destroy(), legacy_start.destroy(), legacy_stop.destroy()];
        results.into_iter().collect()
    }
}

/// Mean latency of one launch per backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchReport {
    pub new_mean: Duration,
    pub legacy_mean: Duration,
}

impl BenchReport {
    pub fn mean(&self, backend: Backend) -> Duration {
        match backend {
            Backend::New => self.new_mean,
            Backend::Legacy => self.legacy_mean,
        }
    }
}

/// Everything one benchmark call operates on.
pub struct BenchContext<'a, 'd, D: ComputeDevice> {
    pub device: &'d D,
    pub stream: &'a ManagedStream<'d, D>,
    pub timers: &'a BenchTimers<'d, D>,
    pub buffers: &'a DeviceBuffers<'d, D>,
}

/// Time `iterations` back-to-back launches of each backend.
///
/// In place, the new backend transforms its own output again on every
/// iteration. With `collect_report` unset the call is a warmup: the means
/// are still returned but not logged. Any device failure aborts at once.
pub fn benchmark<D: ComputeDevice>(
    ctx: &BenchContext<'_, '_, D>,
    spec: &TransformSpec,
    iterations: usize,
    collect_report: bool,
) -> Result<BenchReport, DeviceError> {
    let divisor = u32::try_from(iterations.max(1)).unwrap_or(u32::MAX);
    let mut means = [Duration::ZERO; 2];

    for (slot, backend) in means.iter_mut().zip(Backend::ALL) {
        let cfg = spec.ntt_config(ctx.stream.handle(), backend);
        let (input, output) = ctx.buffers.io(backend);
        let (start, stop) = ctx.timers.pair(backend);

        start.record(ctx.stream)?;
        for _ in 0..iterations {
            ctx.device.ntt(input, spec.size(), spec.direction, &cfg, output)?;
        }
        stop.record(ctx.stream)?;
        ctx.stream.synchronize()?;

        *slot = stop.elapsed_since(start)? / divisor;
    }

    let report = BenchReport { new_mean: means[0], legacy_mean: means[1] };
    if collect_report {
        info!(
            "2^{} {:?} {} x{}: new {:?}, legacy {:?}",
            spec.log_size, spec.direction, spec.ordering, iterations, report.new_mean, report.legacy_mean
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::HostDevice;
    use crate::field::RootsOfUnity;
    use crate::ntt::NttInitDomainConfig;
    use crate::Scalar;

    fn spec() -> TransformSpec {
        TransformSpec { log_size: 6, direction: NttDir::Forward, ordering: NttOrdering::NN }
    }

    #[test]
    fn test_backends_differ_only_in_radix2_switch() {
        let s = spec();
        let new = s.ntt_config(StreamHandle::DEFAULT, Backend::New);
        let legacy = s.ntt_config(StreamHandle::DEFAULT, Backend::Legacy);
        assert!(!new.is_force_radix2);
        assert!(legacy.is_force_radix2);
        assert_eq!(NttConfig { is_force_radix2: false, ..legacy }, new);
    }

    #[test]
    fn test_benchmark_launch_counts() {
        let device = HostDevice::<Scalar>::new();
        device.init_domain(Scalar::omega(6), &NttInitDomainConfig::default()).unwrap();
        let stream = ManagedStream::create(&device).unwrap();
        let timers = BenchTimers::create(&device).unwrap();
        let buffers = DeviceBuffers::allocate(&device, 64, false).unwrap();
        let ctx = BenchContext { device: &device, stream: &stream, timers: &timers, buffers: &buffers };

        benchmark(&ctx, &spec(), 3, true).unwrap();
        let stats = device.stats();
        assert_eq!(stats.ntt_launches, 6);
        assert_eq!(stats.mixed_radix_launches, 3);
        assert_eq!(stats.radix2_launches, 3);
    }

    #[test]
    fn test_inplace_layout_comes_from_buffers() {
        use crate::ntt::{ntt_inplace, NttDomain};

        let device = HostDevice::<Scalar>::new();
        let root = Scalar::omega(6);
        device.init_domain(root, &NttInitDomainConfig::default()).unwrap();
        let stream = ManagedStream::create(&device).unwrap();
        let timers = BenchTimers::create(&device).unwrap();
        let mut buffers = DeviceBuffers::allocate(&device, 64, true).unwrap();
        let input: Vec<Scalar> = (0..64u64).map(|i| Scalar::from(i * i + 5)).collect();
        buffers.upload(&input, &stream).unwrap();
        buffers.stage_inplace(&stream).unwrap();
        let ctx = BenchContext { device: &device, stream: &stream, timers: &timers, buffers: &buffers };

        benchmark(&ctx, &spec(), 2, false).unwrap();
        let (new, legacy) = buffers.download(&stream).unwrap();

        let domain = NttDomain::new(root, &NttInitDomainConfig::default()).unwrap();
        let cfg = NttConfig::default();
        let mut once = input.clone();
        ntt_inplace(&domain, &mut once, NttDir::Forward, &cfg).unwrap();
        let mut twice = once.clone();
        ntt_inplace(&domain, &mut twice, NttDir::Forward, &cfg).unwrap();

        // The aliased new buffer is transformed on every iteration
        assert_eq!(new, twice);
        assert_eq!(legacy, once);
    }

    #[test]
    fn test_launch_failure_aborts_before_legacy() {
        use crate::device::DeviceOp;

        let device = HostDevice::<Scalar>::new();
        device.init_domain(Scalar::omega(6), &NttInitDomainConfig::default()).unwrap();
        let stream = ManagedStream::create(&device).unwrap();
        let timers = BenchTimers::create(&device).unwrap();
        let buffers = DeviceBuffers::allocate(&device, 64, true).unwrap();
        let ctx = BenchContext { device: &device, stream: &stream, timers: &timers, buffers: &buffers };

        device.inject_fault(DeviceOp::Ntt, DeviceError::LaunchFailure("kernel".into()));
        let err = benchmark(&ctx, &spec(), 2, false).unwrap_err();
        assert_eq!(err.code(), 719);
        stream.synchronize().unwrap();
        assert_eq!(device.stats().radix2_launches, 0);
    }
}
