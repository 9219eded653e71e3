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


//! Host-memory implementation of [`ComputeDevice`].
//!
//! Buffers live in host vectors behind opaque handles. Each stream is a FIFO
//! of commands that runs when the stream is synchronized (or when a blocking
//! call such as `copy_to_host` drains it), so work really is deferred the way
//! it is on a GPU: an event record stamps the wall clock when the command
//! *executes*, not when it is issued, and the time between two records
//! covers exactly the commands enqueued between them.
//!
//! Besides the runtime interface it offers the knobs the harness tests need:
//! a memory budget, fault injection per operation, a one-time cold-start
//! latency on the first NTT launch, and launch/allocation counters.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use ff::Field;
use tracing::debug;

use super::{BufferHandle, ComputeDevice, EventHandle, StreamHandle};
use crate::error::DeviceError;
use crate::ntt::{ntt_inplace, NttAlgorithm, NttConfig, NttDir, NttDomain, NttInitDomainConfig};

/// Runtime entry points, used to target fault injection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceOp {
    Malloc,
    Free,
    CopyToDevice,
    CopyToHost,
    CopyDeviceToDevice,
    CreateStream,
    DestroyStream,
    Synchronize,
    CreateEvent,
    DestroyEvent,
    RecordEvent,
    ElapsedTime,
    InitDomain,
    Ntt,
}

/// Counters kept by the host device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceStats {
    /// NTT launches executed
    pub ntt_launches: usize,
    /// Of which ran the radix-2 kernel
    pub radix2_launches: usize,
    /// Of which ran the mixed-radix kernel
    pub mixed_radix_launches: usize,
    /// Buffers currently allocated
    pub live_buffers: usize,
    /// Bytes currently allocated
    pub bytes_in_use: usize,
    /// High-water mark of `bytes_in_use`
    pub peak_bytes: usize,
    /// Streams currently alive, excluding the default stream
    pub live_streams: usize,
    /// Events currently alive
    pub live_events: usize,
    /// Domain initializations performed
    pub domain_inits: usize,
}

enum Command<F> {
    Upload { dst: u64, data: Vec<F> },
    Copy { dst: u64, src: u64, len: usize },
    Ntt { input: u64, output: u64, size: usize, dir: NttDir, cfg: NttConfig },
    Record { event: u64 },
}

#[derive(Debug, Clone, Copy)]
enum EventState {
    Created,
    Pending,
    Recorded(Instant),
}

struct HostState<F> {
    next_id: u64,
    buffers: HashMap<u64, Vec<F>>,
    streams: HashMap<u64, VecDeque<Command<F>>>,
    events: HashMap<u64, EventState>,
    domain: Option<NttDomain<F>>,
    faults: Vec<(DeviceOp, DeviceError)>,
    stats: DeviceStats,
    launched: bool,
}

/// Device backed by host memory.
pub struct HostDevice<F> {
    state: RefCell<HostState<F>>,
    memory_limit: Option<usize>,
    cold_start: Option<Duration>,
}

impl<F> std::fmt::Debug for HostDevice<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostDevice")
            .field("memory_limit", &self.memory_limit)
            .field("cold_start", &self.cold_start)
            .finish()
    }
}

impl<F: Field> Default for HostDevice<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Field> HostDevice<F> {
    /// Device with unlimited memory and no cold-start latency
    pub fn new() -> Self {
        let mut streams = HashMap::new();
        streams.insert(StreamHandle::DEFAULT.0, VecDeque::new());
        Self {
            state: RefCell::new(HostState {
                next_id: 1,
                buffers: HashMap::new(),
                streams,
                events: HashMap::new(),
                domain: None,
                faults: Vec::new(),
                stats: DeviceStats::default(),
                launched: false,
            }),
            memory_limit: None,
            cold_start: None,
        }
    }

    /// Fail allocations that would exceed `bytes` in use
    pub fn with_memory_limit(mut self, bytes: usize) -> Self {
        self.memory_limit = Some(bytes);
        self
    }

    /// Charge `latency` once, on the first NTT launch that executes
    pub fn with_cold_start(mut self, latency: Duration) -> Self {
        self.cold_start = Some(latency);
        self
    }

    /// Make the next call of `op` fail with `error`
    pub fn inject_fault(&self, op: DeviceOp, error: DeviceError) {
        self.state.borrow_mut().faults.push((op, error));
    }

    pub fn stats(&self) -> DeviceStats {
        self.state.borrow().stats
    }

    fn element_bytes(len: usize) -> usize {
        len.saturating_mul(std::mem::size_of::<F>())
    }

    fn take_fault(&self, op: DeviceOp) -> Result<(), DeviceError> {
        let mut state = self.state.borrow_mut();
        match state.faults.iter().position(|(o, _)| *o == op) {
            Some(pos) => Err(state.faults.remove(pos).1),
            None => Ok(()),
        }
    }

    fn enqueue(&self, stream: StreamHandle, command: Command<F>) -> Result<(), DeviceError> {
        let mut state = self.state.borrow_mut();
        let queue = state
            .streams
            .get_mut(&stream.0)
            .ok_or_else(|| DeviceError::InvalidHandle(format!("stream {:?}", stream)))?;
        queue.push_back(command);
        Ok(())
    }

    /// Run every queued command of `stream` in issue order.
    ///
    /// The first failing command poisons the rest of the queue, which is
    /// dropped.
    fn drain(&self, stream: StreamHandle) -> Result<(), DeviceError> {
        let mut state = self.state.borrow_mut();
        let commands = state
            .streams
            .get_mut(&stream.0)
            .map(std::mem::take)
            .ok_or_else(|| DeviceError::InvalidHandle(format!("stream {:?}", stream)))?;
        for command in commands {
            self.execute(&mut state, command)?;
        }
        Ok(())
    }

    fn drain_all(&self) -> Result<(), DeviceError> {
        let ids: Vec<u64> = self.state.borrow().streams.keys().copied().collect();
        for id in ids {
            self.drain(StreamHandle(id))?;
        }
        Ok(())
    }

    fn execute(&self, state: &mut HostState<F>, command: Command<F>) -> Result<(), DeviceError> {
        match command {
            Command::Upload { dst, data } => {
                #[cfg(feature = "trace-ntt")]
                debug!("upload {} elements -> buffer {}", data.len(), dst);
                let buffer = buffer_mut(&mut state.buffers, dst)?;
                buffer[..data.len()].copy_from_slice(&data);
            }
            Command::Copy { dst, src, len } => {
                #[cfg(feature = "trace-ntt")]
                debug!("copy {} elements buffer {} -> buffer {}", len, src, dst);
                if dst != src {
                    let source = buffer_ref(&state.buffers, src)?[..len].to_vec();
                    buffer_mut(&mut state.buffers, dst)?[..len].copy_from_slice(&source);
                }
            }
            Command::Ntt { input, output, size, dir, cfg } => {
                if !state.launched {
                    state.launched = true;
                    if let Some(latency) = self.cold_start {
                        debug!("First NTT launch, charging cold start of {:?}", latency);
                        std::thread::sleep(latency);
                    }
                }

                #[cfg(feature = "trace-ntt")]
                let start = Instant::now();

                let HostState { buffers, domain, stats, .. } = state;
                let domain = domain.as_ref().ok_or(DeviceError::DomainNotInitialized)?;
                let mut data = buffers
                    .remove(&output)
                    .ok_or_else(|| DeviceError::LaunchFailure(format!("output buffer {} released", output)))?;
                if input != output {
                    match buffers.get(&input) {
                        Some(src) => data[..size].copy_from_slice(&src[..size]),
                        None => {
                            buffers.insert(output, data);
                            return Err(DeviceError::LaunchFailure(format!(
                                "input buffer {} released",
                                input
                            )));
                        }
                    }
                }
                let result = ntt_inplace(domain, &mut data[..size], dir, &cfg);
                buffers.insert(output, data);
                result?;

                stats.ntt_launches += 1;
                match NttAlgorithm::from_config(&cfg) {
                    NttAlgorithm::Radix2 => stats.radix2_launches += 1,
                    NttAlgorithm::MixedRadix => stats.mixed_radix_launches += 1,
                }

                #[cfg(feature = "trace-ntt")]
                debug!(
                    "NTT {:?} {:?} {} of {} elements in {:?}",
                    NttAlgorithm::from_config(&cfg),
                    dir,
                    cfg.ordering,
                    size,
                    start.elapsed()
                );
            }
            Command::Record { event } => {
                let slot = state
                    .events
                    .get_mut(&event)
                    .ok_or_else(|| DeviceError::LaunchFailure(format!("event {} destroyed", event)))?;
                *slot = EventState::Recorded(Instant::now());
            }
        }
        Ok(())
    }

    fn check_buffer(&self, buffer: BufferHandle, needed: usize) -> Result<(), DeviceError> {
        let state = self.state.borrow();
        let len = state
            .buffers
            .get(&buffer.0)
            .map(Vec::len)
            .ok_or_else(|| DeviceError::InvalidHandle(format!("buffer {:?}", buffer)))?;
        if needed > len {
            return Err(DeviceError::InvalidArgument(format!(
                "{} elements requested from buffer {:?} of {}",
                needed, buffer, len
            )));
        }
        Ok(())
    }
}

fn buffer_ref<F>(buffers: &HashMap<u64, Vec<F>>, id: u64) -> Result<&Vec<F>, DeviceError> {
    buffers
        .get(&id)
        .ok_or_else(|| DeviceError::LaunchFailure(format!("buffer {} released", id)))
}

fn buffer_mut<F>(buffers: &mut HashMap<u64, Vec<F>>, id: u64) -> Result<&mut Vec<F>, DeviceError> {
    buffers
        .get_mut(&id)
        .ok_or_else(|| DeviceError::LaunchFailure(format!("buffer {} released", id)))
}

impl<F: Field> ComputeDevice for HostDevice<F> {
    type Field = F;

    fn name(&self) -> &str {
        "host"
    }

    fn malloc(&self, len: usize) -> Result<BufferHandle, DeviceError> {
        self.take_fault(DeviceOp::Malloc)?;
        let bytes = Self::element_bytes(len);
        let mut state = self.state.borrow_mut();
        if let Some(limit) = self.memory_limit {
            let available = limit.saturating_sub(state.stats.bytes_in_use);
            if bytes > available {
                return Err(DeviceError::MemoryAllocation { requested: bytes, available });
            }
        }
        let id = state.next_id;
        state.next_id += 1;
        state.buffers.insert(id, vec![F::ZERO; len]);
        state.stats.live_buffers += 1;
        state.stats.bytes_in_use += bytes;
        state.stats.peak_bytes = state.stats.peak_bytes.max(state.stats.bytes_in_use);
        Ok(BufferHandle(id))
    }

    fn free(&self, buffer: BufferHandle) -> Result<(), DeviceError> {
        self.take_fault(DeviceOp::Free)?;
        self.drain_all()?;
        let mut state = self.state.borrow_mut();
        let data = state
            .buffers
            .remove(&buffer.0)
            .ok_or_else(|| DeviceError::InvalidHandle(format!("buffer {:?}", buffer)))?;
        state.stats.live_buffers -= 1;
        state.stats.bytes_in_use -= Self::element_bytes(data.len());
        Ok(())
    }

    fn copy_to_device(&self, dst: BufferHandle, src: &[F], stream: StreamHandle) -> Result<(), DeviceError> {
        self.take_fault(DeviceOp::CopyToDevice)?;
        self.check_buffer(dst, src.len())?;
        self.enqueue(stream, Command::Upload { dst: dst.0, data: src.to_vec() })
    }

    fn copy_to_host(&self, dst: &mut [F], src: BufferHandle, stream: StreamHandle) -> Result<(), DeviceError> {
        self.take_fault(DeviceOp::CopyToHost)?;
        self.check_buffer(src, dst.len())?;
        self.drain(stream)?;
        let state = self.state.borrow();
        let data = state
            .buffers
            .get(&src.0)
            .ok_or_else(|| DeviceError::InvalidHandle(format!("buffer {:?}", src)))?;
        dst.copy_from_slice(&data[..dst.len()]);
        Ok(())
    }

    fn copy_device_to_device(
        &self,
        dst: BufferHandle,
        src: BufferHandle,
        len: usize,
        stream: StreamHandle,
    ) -> Result<(), DeviceError> {
        self.take_fault(DeviceOp::CopyDeviceToDevice)?;
        self.check_buffer(src, len)?;
        self.check_buffer(dst, len)?;
        self.enqueue(stream, Command::Copy { dst: dst.0, src: src.0, len })
    }

    fn create_stream(&self) -> Result<StreamHandle, DeviceError> {
        self.take_fault(DeviceOp::CreateStream)?;
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state.streams.insert(id, VecDeque::new());
        state.stats.live_streams += 1;
        Ok(StreamHandle(id))
    }

    fn destroy_stream(&self, stream: StreamHandle) -> Result<(), DeviceError> {
        self.take_fault(DeviceOp::DestroyStream)?;
        if stream == StreamHandle::DEFAULT {
            return Err(DeviceError::InvalidHandle("the default stream cannot be destroyed".to_string()));
        }
        self.drain(stream)?;
        let mut state = self.state.borrow_mut();
        state.streams.remove(&stream.0);
        state.stats.live_streams -= 1;
        Ok(())
    }

    fn synchronize(&self, stream: StreamHandle) -> Result<(), DeviceError> {
        self.take_fault(DeviceOp::Synchronize)?;
        self.drain(stream)
    }

    fn create_event(&self) -> Result<EventHandle, DeviceError> {
        self.take_fault(DeviceOp::CreateEvent)?;
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state.events.insert(id, EventState::Created);
        state.stats.live_events += 1;
        Ok(EventHandle(id))
    }

    fn destroy_event(&self, event: EventHandle) -> Result<(), DeviceError> {
        self.take_fault(DeviceOp::DestroyEvent)?;
        let mut state = self.state.borrow_mut();
        state
            .events
            .remove(&event.0)
            .ok_or_else(|| DeviceError::InvalidHandle(format!("event {:?}", event)))?;
        state.stats.live_events -= 1;
        Ok(())
    }

    fn record_event(&self, event: EventHandle, stream: StreamHandle) -> Result<(), DeviceError> {
        self.take_fault(DeviceOp::RecordEvent)?;
        {
            let mut state = self.state.borrow_mut();
            let slot = state
                .events
                .get_mut(&event.0)
                .ok_or_else(|| DeviceError::InvalidHandle(format!("event {:?}", event)))?;
            *slot = EventState::Pending;
        }
        self.enqueue(stream, Command::Record { event: event.0 })
    }

    fn elapsed_time(&self, start: EventHandle, stop: EventHandle) -> Result<Duration, DeviceError> {
        self.take_fault(DeviceOp::ElapsedTime)?;
        let state = self.state.borrow();
        let stamp = |event: EventHandle| match state.events.get(&event.0) {
            Some(EventState::Recorded(at)) => Ok(*at),
            Some(_) => Err(DeviceError::NotReady(format!("event {:?} has not executed", event))),
            None => Err(DeviceError::InvalidHandle(format!("event {:?}", event))),
        };
        let (begin, end) = (stamp(start)?, stamp(stop)?);
        Ok(end.saturating_duration_since(begin))
    }

    fn init_domain(&self, root: F, cfg: &NttInitDomainConfig) -> Result<(), DeviceError> {
        self.take_fault(DeviceOp::InitDomain)?;
        let domain = NttDomain::new(root, cfg)?;
        debug!(
            "Host NTT domain initialized: 2^{} (fast twiddles: {})",
            domain.log_size(),
            domain.has_fast_twiddles()
        );
        let mut state = self.state.borrow_mut();
        state.domain = Some(domain);
        state.stats.domain_inits += 1;
        Ok(())
    }

    fn ntt(
        &self,
        input: BufferHandle,
        size: usize,
        dir: NttDir,
        cfg: &NttConfig,
        output: BufferHandle,
    ) -> Result<(), DeviceError> {
        self.take_fault(DeviceOp::Ntt)?;
        if !cfg.are_inputs_on_device || !cfg.are_outputs_on_device {
            return Err(DeviceError::InvalidArgument(
                "host device launches need device-resident inputs and outputs".to_string(),
            ));
        }
        if !size.is_power_of_two() {
            return Err(DeviceError::InvalidArgument(format!(
                "NTT size must be power of 2, got {}",
                size
            )));
        }
        {
            let state = self.state.borrow();
            let domain = state.domain.as_ref().ok_or(DeviceError::DomainNotInitialized)?;
            if size > domain.size() {
                return Err(DeviceError::InvalidArgument(format!(
                    "NTT size 2^{} exceeds domain 2^{}",
                    size.trailing_zeros(),
                    domain.log_size()
                )));
            }
        }
        self.check_buffer(input, size)?;
        self.check_buffer(output, size)?;

        self.enqueue(
            cfg.stream_handle,
            Command::Ntt { input: input.0, output: output.0, size, dir, cfg: *cfg },
        )?;
        if !cfg.is_async {
            self.drain(cfg.stream_handle)?;
        }
        Ok(())
    }
}
