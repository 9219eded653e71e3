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


//! Device buffers of one run.
//!
//! Three buffers of `size` elements are allocated up front:
//! - `scalars`: the uploaded input, never written by a transform
//! - `new_output`: output of the new backend; in place mode this is also its
//!   input, restaged from `scalars` before every launch batch
//! - `legacy_output`: output of the legacy backend, always out of place

use ff::Field;
use tracing::debug;

use crate::bench::Backend;
use crate::device::{BufferHandle, ComputeDevice, DeviceVec, ManagedStream};
use crate::error::DeviceError;

pub struct DeviceBuffers<'d, D: ComputeDevice> {
    scalars: DeviceVec<'d, D>,
    new_output: DeviceVec<'d, D>,
    legacy_output: DeviceVec<'d, D>,
    inplace: bool,
}

impl<'d, D: ComputeDevice> std::fmt::Debug for DeviceBuffers<'d, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceBuffers")
            .field("scalars", &self.scalars)
            .field("new_output", &self.new_output)
            .field("legacy_output", &self.legacy_output)
            .field("inplace", &self.inplace)
            .finish()
    }
}

impl<'d, D: ComputeDevice> DeviceBuffers<'d, D> {
    /// Allocate the three run buffers. Already allocated buffers are freed
    /// again if a later allocation fails.
    pub fn allocate(device: &'d D, size: usize, inplace: bool) -> Result<Self, DeviceError> {
        let scalars = DeviceVec::malloc(device, size)?;
        let new_output = DeviceVec::malloc(device, size)?;
        let legacy_output = DeviceVec::malloc(device, size)?;
        debug!("Allocated 3 device buffers of {} elements (inplace={})", size, inplace);
        Ok(Self { scalars, new_output, legacy_output, inplace })
    }

    pub fn len(&self) -> usize {
        self.scalars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scalars.is_empty()
    }

    /// Enqueue the upload of the run input.
    pub fn upload(&mut self, input: &[D::Field], stream: &ManagedStream<'d, D>) -> Result<(), DeviceError> {
        self.scalars.copy_from_host(input, stream)
    }

    /// In place mode: enqueue a copy of the clean input into the new output
    /// buffer, so the next launch starts from the original data. No-op out of
    /// place.
    pub fn stage_inplace(&mut self, stream: &ManagedStream<'d, D>) -> Result<(), DeviceError> {
        if self.inplace {
            self.new_output.copy_from_device(&self.scalars, stream)?;
        }
        Ok(())
    }

    /// Input and output buffer of a backend launch.
    ///
    /// Both are the same handle for the new backend in place.
    pub fn io(&self, backend: Backend) -> (BufferHandle, BufferHandle) {
        match backend {
            Backend::New if self.inplace => (self.new_output.handle(), self.new_output.handle()),
            Backend::New => (self.scalars.handle(), self.new_output.handle()),
            Backend::Legacy => (self.scalars.handle(), self.legacy_output.handle()),
        }
    }

    /// Drain `stream` and read both backend outputs back.
    pub fn download(&self, stream: &ManagedStream<'d, D>) -> Result<(Vec<D::Field>, Vec<D::Field>), DeviceError> {
        let mut new = vec![D::Field::ZERO; self.len()];
        let mut legacy = vec![D::Field::ZERO; self.len()];
        self.new_output.copy_to_host(&mut new, stream)?;
        self.legacy_output.copy_to_host(&mut legacy, stream)?;
        Ok((new, legacy))
    }

    /// Free all three buffers, reporting the first failure.
    pub fn release(self) -> Result<(), DeviceError> {
        let Self { scalars, new_output, legacy_output, .. } = self;
        let results = [scalars.release(), new_output.release(), legacy_output.release()];
        results.into_iter().collect()
    }
}
