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


//! Device runtime interface.
//!
//! [`ComputeDevice`] is the boundary to the device-compute runtime: memory,
//! streams, timer events, NTT domain setup and NTT launches. The harness is
//! generic over it; [`HostDevice`] is the in-tree implementation backed by
//! host memory.
//!
//! # Stream semantics
//!
//! Copies, launches and event records are *enqueued* on a stream and only
//! guaranteed complete after [`ComputeDevice::synchronize`]. Operations on
//! one stream execute in issue order. `copy_to_host` and `free` block like
//! their CUDA counterparts. An event's timestamp, and therefore
//! [`ComputeDevice::elapsed_time`], is only available once the stream has
//! drained past the record.
//!
//! # Resource wrappers
//!
//! [`DeviceVec`], [`ManagedStream`] and [`ManagedEvent`] own one runtime
//! handle each and release it on drop, so every exit path (including an
//! early `?` return) gives the memory and handles back. Use their
//! `release`/`destroy` methods on the normal path to observe failures.

pub mod host;

pub use host::{DeviceOp, DeviceStats, HostDevice};

use std::time::Duration;

use ff::Field;
use tracing::warn;

use crate::error::DeviceError;
use crate::ntt::{NttConfig, NttDir, NttInitDomainConfig};

/// Opaque device buffer handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub(crate) u64);

/// Opaque command stream handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamHandle(pub(crate) u64);

impl StreamHandle {
    /// The implicit stream every device provides; it cannot be destroyed
    pub const DEFAULT: StreamHandle = StreamHandle(0);
}

impl Default for StreamHandle {
    fn default() -> Self {
        StreamHandle::DEFAULT
    }
}

/// Opaque timer event handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventHandle(pub(crate) u64);

/// Device-compute runtime consumed by the harness.
pub trait ComputeDevice {
    /// Element type held in device buffers
    type Field: Field;

    /// Human-readable device name
    fn name(&self) -> &str;

    /// Allocate a buffer of `len` elements
    fn malloc(&self, len: usize) -> Result<BufferHandle, DeviceError>;

    /// Free a buffer, waiting for pending work first
    fn free(&self, buffer: BufferHandle) -> Result<(), DeviceError>;

    /// Enqueue a host -> device copy of `src` into the front of `dst`
    fn copy_to_device(
        &self,
        dst: BufferHandle,
        src: &[Self::Field],
        stream: StreamHandle,
    ) -> Result<(), DeviceError>;

    /// Drain `stream`, then copy the first `dst.len()` elements of `src`
    fn copy_to_host(
        &self,
        dst: &mut [Self::Field],
        src: BufferHandle,
        stream: StreamHandle,
    ) -> Result<(), DeviceError>;

    /// Enqueue a device -> device copy of `len` elements
    fn copy_device_to_device(
        &self,
        dst: BufferHandle,
        src: BufferHandle,
        len: usize,
        stream: StreamHandle,
    ) -> Result<(), DeviceError>;

    fn create_stream(&self) -> Result<StreamHandle, DeviceError>;

    fn destroy_stream(&self, stream: StreamHandle) -> Result<(), DeviceError>;

    /// Block until every command enqueued on `stream` has executed
    fn synchronize(&self, stream: StreamHandle) -> Result<(), DeviceError>;

    fn create_event(&self) -> Result<EventHandle, DeviceError>;

    fn destroy_event(&self, event: EventHandle) -> Result<(), DeviceError>;

    /// Enqueue a timestamp record of `event` on `stream`
    fn record_event(&self, event: EventHandle, stream: StreamHandle) -> Result<(), DeviceError>;

    /// Time between two executed records; `NotReady` if either is pending
    fn elapsed_time(&self, start: EventHandle, stop: EventHandle) -> Result<Duration, DeviceError>;

    /// Set up the NTT domain for `root` (blocking)
    fn init_domain(&self, root: Self::Field, cfg: &NttInitDomainConfig) -> Result<(), DeviceError>;

    /// Launch an NTT of `size` elements from `input` into `output`.
    ///
    /// `input == output` is an in-place launch and is supported. Drains
    /// `cfg.stream_handle` before returning unless `cfg.is_async` is set.
    fn ntt(
        &self,
        input: BufferHandle,
        size: usize,
        dir: NttDir,
        cfg: &NttConfig,
        output: BufferHandle,
    ) -> Result<(), DeviceError>;
}

// =============================================================================
// Managed resources
// =============================================================================

/// Owned command stream, destroyed on drop.
pub struct ManagedStream<'d, D: ComputeDevice> {
    device: &'d D,
    handle: StreamHandle,
}

impl<'d, D: ComputeDevice> ManagedStream<'d, D> {
    /// Create a new stream on `device`
    pub fn create(device: &'d D) -> Result<Self, DeviceError> {
        let handle = device.create_stream()?;
        Ok(Self { device, handle })
    }

    pub fn handle(&self) -> StreamHandle {
        self.handle
    }

    /// Wait for all work enqueued on this stream
    pub fn synchronize(&self) -> Result<(), DeviceError> {
        self.device.synchronize(self.handle)
    }

    /// Destroy the stream, reporting failures.
    ///
    /// On failure the handle is still owned and drop tries once more.
    pub fn destroy(self) -> Result<(), DeviceError> {
        self.device.destroy_stream(self.handle)?;
        std::mem::forget(self);
        Ok(())
    }
}

impl<D: ComputeDevice> std::fmt::Debug for ManagedStream<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedStream").field("handle", &self.handle).finish()
    }
}

impl<D: ComputeDevice> Drop for ManagedStream<'_, D> {
    fn drop(&mut self) {
        if let Err(e) = self.device.destroy_stream(self.handle) {
            warn!("Failed to destroy stream {:?}: {}", self.handle, e);
        }
    }
}

/// Owned timer event, destroyed on drop.
pub struct ManagedEvent<'d, D: ComputeDevice> {
    device: &'d D,
    handle: EventHandle,
}

impl<'d, D: ComputeDevice> ManagedEvent<'d, D> {
    pub fn create(device: &'d D) -> Result<Self, DeviceError> {
        let handle = device.create_event()?;
        Ok(Self { device, handle })
    }

    /// Enqueue a record of this event on `stream`
    pub fn record(&self, stream: &ManagedStream<'d, D>) -> Result<(), DeviceError> {
        self.device.record_event(self.handle, stream.handle())
    }

    /// Time from `start` to this event; both records must have executed
    pub fn elapsed_since(&self, start: &ManagedEvent<'d, D>) -> Result<Duration, DeviceError> {
        self.device.elapsed_time(start.handle, self.handle)
    }

    pub fn destroy(self) -> Result<(), DeviceError> {
        self.device.destroy_event(self.handle)?;
        std::mem::forget(self);
        Ok(())
    }
}

impl<D: ComputeDevice> Drop for ManagedEvent<'_, D> {
    fn drop(&mut self) {
        if let Err(e) = self.device.destroy_event(self.handle) {
            warn!("Failed to destroy event {:?}: {}", self.handle, e);
        }
    }
}

/// Owned device buffer of field elements, freed on drop.
pub struct DeviceVec<'d, D: ComputeDevice> {
    device: &'d D,
    handle: BufferHandle,
    len: usize,
}

impl<'d, D: ComputeDevice> DeviceVec<'d, D> {
    /// Allocate `len` elements on `device`
    pub fn malloc(device: &'d D, len: usize) -> Result<Self, DeviceError> {
        let handle = device.malloc(len)?;
        Ok(Self { device, handle, len })
    }

    pub fn handle(&self) -> BufferHandle {
        self.handle
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Enqueue an upload of `src` on `stream`
    pub fn copy_from_host(
        &mut self,
        src: &[D::Field],
        stream: &ManagedStream<'d, D>,
    ) -> Result<(), DeviceError> {
        self.device.copy_to_device(self.handle, src, stream.handle())
    }

    /// Enqueue a copy of all of `src` into this buffer on `stream`
    pub fn copy_from_device(
        &mut self,
        src: &DeviceVec<'d, D>,
        stream: &ManagedStream<'d, D>,
    ) -> Result<(), DeviceError> {
        self.device
            .copy_device_to_device(self.handle, src.handle, src.len, stream.handle())
    }

    /// Drain `stream` and read `dst.len()` elements back
    pub fn copy_to_host(
        &self,
        dst: &mut [D::Field],
        stream: &ManagedStream<'d, D>,
    ) -> Result<(), DeviceError> {
        self.device.copy_to_host(dst, self.handle, stream.handle())
    }

    /// Free the buffer, reporting failures.
    ///
    /// A failed free leaves the buffer owned by `self`, so the drop that
    /// follows retries it; a runtime that keeps failing leaks it.
    pub fn release(self) -> Result<(), DeviceError> {
        self.device.free(self.handle)?;
        std::mem::forget(self);
        Ok(())
    }
}

impl<D: ComputeDevice> std::fmt::Debug for DeviceVec<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceVec")
            .field("handle", &self.handle)
            .field("len", &self.len)
            .finish()
    }
}

impl<D: ComputeDevice> Drop for DeviceVec<'_, D> {
    fn drop(&mut self) {
        if let Err(e) = self.device.free(self.handle) {
            warn!("Failed to free device buffer {:?}: {}", self.handle, e);
        }
    }
}
