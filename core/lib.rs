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


//! Differential harness for NTT backends over the BLS12-381 scalar field
//!
//! Compares the legacy radix-2 NTT against the mixed-radix NTT on the same
//! device: identical input, size, direction and ordering, `is_force_radix2`
//! being the only difference. Each run reports the mean latency of both
//! backends and whether their outputs are bit-identical.
//!
//! # Architecture
//!
//! ```text
//! RunConfig -> init_domain -> datagen -> DeviceBuffers (upload)
//!           -> benchmark (warmup, timed, verification pass)
//!           -> download -> verify -> RunReport
//! ```
//!
//! The harness is generic over [`device::ComputeDevice`], the device runtime
//! interface (memory, streams, timer events, domain setup, NTT launch).
//! [`device::HostDevice`] implements it in host memory with deferred stream
//! execution, so the full flow runs without a GPU.
//!
//! # Usage
//!
//! ```rust,ignore
//! use bls12_381_ntt_diff::{run, HostDevice, RunConfig, Scalar};
//!
//! let device = HostDevice::<Scalar>::new();
//! let config = RunConfig { log_size: 12, ..RunConfig::default() };
//! let report = run(&device, &config)?;
//! assert!(report.verdict.passed());
//! ```
//!
//! # Environment Variables
//!
//! See [`config`]: `NTT_DIFF_ORDERING`, `NTT_DIFF_ITERATIONS`, `NTT_DIFF_SEED`,
//! `NTT_DIFF_INPUT`, `NTT_DIFF_FAST_TWIDDLES`, `NTT_DIFF_DEVICE_MEMORY_MB`.

pub mod bench;
pub mod config;
pub mod datagen;
pub mod device;
pub mod error;
pub mod field;
pub mod harness;
pub mod init;
pub mod memory;
pub mod ntt;
pub mod verify;

/// BLS12-381 scalar field
pub type Scalar = blstrs::Scalar;

pub use bench::{Backend, BenchReport, TransformSpec};
pub use config::RunConfig;
pub use device::{ComputeDevice, DeviceOp, DeviceStats, HostDevice};
pub use error::{DeviceError, HarnessError, SUCCESS_CODE};
pub use field::RootsOfUnity;
pub use harness::{run, Harness, Outputs, RunReport};
pub use ntt::{NttConfig, NttDir, NttOrdering};
pub use verify::{compare, Verdict};
