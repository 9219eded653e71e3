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

//! Error types for the differential harness.
//!
//! Device-runtime failures carry a stable integer status code (CUDA-style) so
//! the binary can print it raw and use it as the process exit status.

/// Status code reported when every device-runtime call succeeded.
pub const SUCCESS_CODE: i32 = 0;

/// Device-runtime failures.
///
/// Any of these aborts the run: a failed call leaves the command stream in an
/// unknown state, so no later timing or output can be trusted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    /// An argument was rejected by the runtime (size, flags, root of unity)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Allocation exceeded the device memory budget
    #[error("device memory allocation failed: requested {requested} bytes, {available} available")]
    MemoryAllocation {
        /// Bytes requested by the failing allocation
        requested: usize,
        /// Bytes still available on the device
        available: usize,
    },
    /// NTT launched before `init_domain`
    #[error("NTT domain not initialized")]
    DomainNotInitialized,
    /// Unknown or already released buffer, stream or event handle
    #[error("invalid resource handle: {0}")]
    InvalidHandle(String),
    /// Queried a result the stream has not produced yet
    #[error("operation not ready: {0}")]
    NotReady(String),
    /// Kernel or command failed while the stream executed it
    #[error("launch failure: {0}")]
    LaunchFailure(String),
}

impl DeviceError {
    /// Raw status code for this error.
    pub fn code(&self) -> i32 {
        match self {
            DeviceError::InvalidArgument(_) => 1,
            DeviceError::MemoryAllocation { .. } => 2,
            DeviceError::DomainNotInitialized => 3,
            DeviceError::InvalidHandle(_) => 400,
            DeviceError::NotReady(_) => 600,
            DeviceError::LaunchFailure(_) => 719,
        }
    }
}

/// Errors surfaced by a harness run.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error(transparent)]
    Device(#[from] DeviceError),
    /// Command line rejected (or `--help`/`--version` requested)
    #[error(transparent)]
    Cli(#[from] clap::Error),
}

impl HarnessError {
    /// Status code used as the process exit status.
    pub fn code(&self) -> i32 {
        match self {
            HarnessError::Device(e) => e.code(),
            HarnessError::Cli(e) if !e.use_stderr() => SUCCESS_CODE,
            HarnessError::Cli(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_error_codes_are_distinct() {
        let errors = [
            DeviceError::InvalidArgument("x".into()),
            DeviceError::MemoryAllocation { requested: 1, available: 0 },
            DeviceError::DomainNotInitialized,
            DeviceError::InvalidHandle("x".into()),
            DeviceError::NotReady("x".into()),
            DeviceError::LaunchFailure("x".into()),
        ];
        let mut codes: Vec<i32> = errors.iter().map(DeviceError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert!(!codes.contains(&SUCCESS_CODE));
    }

    #[test]
    fn test_harness_error_forwards_device_code() {
        let err: HarnessError = DeviceError::NotReady("event".into()).into();
        assert_eq!(err.code(), 600);
        assert_eq!(err.to_string(), "operation not ready: event");
    }
}
