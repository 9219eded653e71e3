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


//! Run orchestration.
//!
//! A run goes through fixed stages, each a method on [`Harness`]:
//!
//! 1. [`Harness::setup`]: domain init (timed), input generation, stream and
//!    timer creation, buffer allocation and upload
//! 2. [`Harness::warmup`]: one unreported iteration of both backends
//! 3. [`Harness::measure`]: the timed iterations
//! 4. [`Harness::verification_pass`]: one more unreported iteration from
//!    clean input, so in place results are a single transform of the input
//! 5. [`Harness::collect_outputs`]: download both outputs
//! 6. [`Harness::finish`]: release everything, reporting failures
//!
//! [`run`] composes them. Any device failure short-circuits with `?`; the
//! resources owned by the harness are then released on drop.

use std::time::Duration;

use tracing::{debug, warn};

use crate::bench::{benchmark, BenchContext, BenchReport, BenchTimers, TransformSpec};
use crate::config::RunConfig;
use crate::datagen;
use crate::device::{ComputeDevice, ManagedStream};
use crate::error::{DeviceError, HarnessError};
use crate::field::RootsOfUnity;
use crate::init::init_domain;
use crate::memory::DeviceBuffers;
use crate::ntt::NttInitDomainConfig;
use crate::verify::{scan, Verdict};

/// Host copies of both backend outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outputs<F> {
    pub new: Vec<F>,
    pub legacy: Vec<F>,
}

impl<F: PartialEq> Outputs<F> {
    /// Compare the new output against the legacy one.
    pub fn verify(&self) -> Verdict {
        scan(&self.new, &self.legacy, self.new.len())
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub domain_init: Duration,
    pub bench: BenchReport,
    pub verdict: Verdict,
}

/// Staged differential run on one device.
pub struct Harness<'d, D: ComputeDevice> {
    // Dropped in declaration order: buffers, then timers, then the stream
    buffers: DeviceBuffers<'d, D>,
    timers: BenchTimers<'d, D>,
    stream: ManagedStream<'d, D>,
    device: &'d D,
    spec: TransformSpec,
    iterations: usize,
    domain_init: Duration,
}

impl<'d, D> Harness<'d, D>
where
    D: ComputeDevice,
    D::Field: RootsOfUnity,
{
    /// Initialize the domain and stage the input on the device.
    pub fn setup(device: &'d D, config: &RunConfig) -> Result<Self, DeviceError> {
        let domain_init = init_domain(
            device,
            config.log_size,
            &NttInitDomainConfig { fast_twiddles: config.fast_twiddles },
        )?;

        let input: Vec<D::Field> = datagen::generate(config.input_kind, config.size(), config.seed);
        debug!("Generated {} {} input elements", input.len(), config.input_kind);

        let stream = ManagedStream::create(device)?;
        let timers = BenchTimers::create(device)?;
        let mut buffers = DeviceBuffers::allocate(device, config.size(), config.inplace)?;
        buffers.upload(&input, &stream)?;

        Ok(Self {
            buffers,
            timers,
            stream,
            device,
            spec: TransformSpec {
                log_size: config.log_size,
                direction: config.direction(),
                ordering: config.ordering,
            },
            iterations: config.iterations,
            domain_init,
        })
    }

    /// Wall-clock duration of the domain setup
    pub fn domain_init(&self) -> Duration {
        self.domain_init
    }

    fn run_batch(&mut self, iterations: usize, collect_report: bool) -> Result<BenchReport, DeviceError> {
        self.buffers.stage_inplace(&self.stream)?;
        let ctx = BenchContext {
            device: self.device,
            stream: &self.stream,
            timers: &self.timers,
            buffers: &self.buffers,
        };
        benchmark(&ctx, &self.spec, iterations, collect_report)
    }

    /// One iteration per backend; timing discarded.
    pub fn warmup(&mut self) -> Result<(), DeviceError> {
        self.run_batch(1, false).map(|_| ())
    }

    /// The reported measurement.
    pub fn measure(&mut self) -> Result<BenchReport, DeviceError> {
        self.run_batch(self.iterations, true)
    }

    /// Recompute both outputs from the original input.
    pub fn verification_pass(&mut self) -> Result<(), DeviceError> {
        self.run_batch(1, false).map(|_| ())
    }

    pub fn collect_outputs(&self) -> Result<Outputs<D::Field>, DeviceError> {
        let (new, legacy) = self.buffers.download(&self.stream)?;
        Ok(Outputs { new, legacy })
    }

    /// Release buffers, events and the stream.
    pub fn finish(self) -> Result<(), DeviceError> {
        let Self { buffers, timers, stream, .. } = self;
        let results = [buffers.release(), timers.destroy(), stream.destroy()];
        results.into_iter().collect()
    }
}

/// Run the whole differential comparison described by `config`.
///
/// The verified outputs come from the verification pass, not from the timed
/// iterations: in place, the timed loop keeps transforming its own output.
pub fn run<D>(device: &D, config: &RunConfig) -> Result<RunReport, HarnessError>
where
    D: ComputeDevice,
    D::Field: RootsOfUnity,
{
    let mut harness = Harness::setup(device, config)?;
    harness.warmup()?;
    let bench = harness.measure()?;
    harness.verification_pass()?;
    let outputs = harness.collect_outputs()?;
    let domain_init = harness.domain_init();
    harness.finish()?;

    let verdict = outputs.verify();
    if let Some(index) = verdict.first_mismatch {
        warn!("Backends disagree at index {} of {}", index, outputs.new.len());
    }
    Ok(RunReport { domain_init, bench, verdict })
}
