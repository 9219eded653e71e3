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


//! Harness configuration
//!
//! Two layers:
//! - environment tuning read once and cached (same pattern as the backend's
//!   device selection knobs)
//! - [`RunConfig`], the resolved settings of one run, built from the positional
//!   command line arguments on top of the environment
//!
//! # Environment Variables
//!
//! - `NTT_DIFF_ORDERING`: Transform ordering ("nn", "nr", "rn", "rr"; default "nn")
//! - `NTT_DIFF_ITERATIONS`: Timed iterations per backend (default: 10, minimum 1)
//! - `NTT_DIFF_SEED`: Seed of the random input generator
//! - `NTT_DIFF_INPUT`: Input generator ("random" or "incremental"; default "random")
//! - `NTT_DIFF_FAST_TWIDDLES`: Fast-twiddles domain mode (default: true)
//! - `NTT_DIFF_DEVICE_MEMORY_MB`: Host device memory limit in MiB (default: unlimited)

use std::sync::OnceLock;

use clap::Parser;
use tracing::{debug, info, warn};

use crate::datagen::InputKind;
use crate::ntt::{NttDir, NttOrdering};

/// Log2 size used when no size argument is given
pub const DEFAULT_LOG_SIZE: u32 = 19;

/// Timed iterations per backend when `NTT_DIFF_ITERATIONS` is unset
pub const DEFAULT_ITERATIONS: usize = 10;

/// Input seed when `NTT_DIFF_SEED` is unset
pub const DEFAULT_SEED: u64 = 0x6e74_745f_6469_6666;

fn parse_bool(var: &str, s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        other => {
            warn!("Unknown {} value '{}', using default", var, other);
            None
        }
    }
}

// ============================================================================
// Environment tuning
// ============================================================================

/// Ordering used by both backends.
///
/// Reads from `NTT_DIFF_ORDERING`. Unknown values fall back to NN.
pub fn ntt_ordering() -> NttOrdering {
    static ORDERING: OnceLock<NttOrdering> = OnceLock::new();
    *ORDERING.get_or_init(|| {
        std::env::var("NTT_DIFF_ORDERING")
            .ok()
            .and_then(|s| {
                let ordering = NttOrdering::from_name(&s);
                if ordering.is_none() {
                    warn!("Unknown NTT_DIFF_ORDERING value '{}', using NN", s);
                }
                ordering
            })
            .map(|ord| {
                if ord != NttOrdering::NN {
                    info!("NTT ordering from NTT_DIFF_ORDERING: {}", ord);
                }
                ord
            })
            .unwrap_or_default()
    })
}

/// Number of timed iterations per backend.
///
/// Parsed from `NTT_DIFF_ITERATIONS`, clamped to at least 1.
pub fn bench_iterations() -> usize {
    static ITERATIONS: OnceLock<usize> = OnceLock::new();
    *ITERATIONS.get_or_init(|| {
        std::env::var("NTT_DIFF_ITERATIONS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .map(|v| {
                let iterations = v.max(1);
                info!("Timed iterations from NTT_DIFF_ITERATIONS: {}", iterations);
                iterations
            })
            .unwrap_or(DEFAULT_ITERATIONS)
    })
}

/// Seed for the random input generator (`NTT_DIFF_SEED`).
pub fn input_seed() -> u64 {
    static SEED: OnceLock<u64> = OnceLock::new();
    *SEED.get_or_init(|| {
        std::env::var("NTT_DIFF_SEED")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(|seed| {
                debug!("Input seed={} (from NTT_DIFF_SEED)", seed);
                seed
            })
            .unwrap_or(DEFAULT_SEED)
    })
}

/// Generator filling the run input (`NTT_DIFF_INPUT`).
pub fn input_kind() -> InputKind {
    static KIND: OnceLock<InputKind> = OnceLock::new();
    *KIND.get_or_init(|| {
        std::env::var("NTT_DIFF_INPUT")
            .ok()
            .and_then(|s| match s.to_lowercase().as_str() {
                "random" => Some(InputKind::Random),
                "incremental" | "progression" => Some(InputKind::Incremental),
                other => {
                    warn!("Unknown NTT_DIFF_INPUT value '{}', using random", other);
                    None
                }
            })
            .map(|kind| {
                if kind != InputKind::Random {
                    info!("Input generator from NTT_DIFF_INPUT: {}", kind);
                }
                kind
            })
            .unwrap_or_default()
    })
}

/// Enable fast twiddles mode for NTT domain initialization.
///
/// Spends memory on a dedicated inverse twiddle table.
/// Parsed from `NTT_DIFF_FAST_TWIDDLES`. Default: true
pub fn ntt_fast_twiddles() -> bool {
    static FAST_TWIDDLES: OnceLock<bool> = OnceLock::new();
    *FAST_TWIDDLES.get_or_init(|| {
        std::env::var("NTT_DIFF_FAST_TWIDDLES")
            .ok()
            .and_then(|s| parse_bool("NTT_DIFF_FAST_TWIDDLES", &s))
            .map(|enabled| {
                info!("NTT fast twiddles mode: {}", if enabled { "ENABLED" } else { "DISABLED" });
                enabled
            })
            .unwrap_or(true)
    })
}

/// Memory limit of the host device in bytes, if any.
///
/// Parsed from `NTT_DIFF_DEVICE_MEMORY_MB` (MiB).
pub fn device_memory_limit() -> Option<usize> {
    static LIMIT: OnceLock<Option<usize>> = OnceLock::new();
    *LIMIT.get_or_init(|| {
        std::env::var("NTT_DIFF_DEVICE_MEMORY_MB")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .map(|mb| {
                info!("NTT_DIFF_DEVICE_MEMORY_MB={} -> device memory limit", mb);
                mb.saturating_mul(1 << 20)
            })
    })
}

/// Log the environment tuning.
pub fn log_config() {
    debug!("Harness configuration:");
    debug!("  Ordering: {}", ntt_ordering());
    debug!("  Iterations: {}", bench_iterations());
    debug!("  Input: {} (seed {})", input_kind(), input_seed());
    debug!("  Fast twiddles: {}", ntt_fast_twiddles());
    match device_memory_limit() {
        Some(bytes) => debug!("  Device memory limit: {} bytes", bytes),
        None => debug!("  Device memory limit: none"),
    }
}

// ============================================================================
// Run configuration
// ============================================================================

/// Differential radix-2 vs mixed-radix NTT run.
///
/// Flags are integers, non-zero meaning true.
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(name = "ntt-diff", version, about)]
pub struct Args {
    /// log2 of the transform size [default: 19]
    pub log2_size: Option<u32>,
    /// Run the new backend in place [default: 1]
    #[arg(allow_negative_numbers = true)]
    pub inplace: Option<i64>,
    /// Inverse instead of forward transform [default: 1]
    #[arg(allow_negative_numbers = true)]
    pub inverse: Option<i64>,
}

/// Resolved settings of one differential run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    /// Transform size is `1 << log_size`
    pub log_size: u32,
    /// Run the new backend in place on its output buffer
    pub inplace: bool,
    /// Inverse instead of forward transform
    pub inverse: bool,
    pub ordering: NttOrdering,
    /// Timed iterations per backend
    pub iterations: usize,
    pub seed: u64,
    pub input_kind: InputKind,
    pub fast_twiddles: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            log_size: DEFAULT_LOG_SIZE,
            inplace: true,
            inverse: true,
            ordering: NttOrdering::NN,
            iterations: DEFAULT_ITERATIONS,
            seed: DEFAULT_SEED,
            input_kind: InputKind::Random,
            fast_twiddles: true,
        }
    }
}

impl RunConfig {
    /// Environment tuning with the positional defaults.
    pub fn from_env() -> Self {
        Self {
            ordering: ntt_ordering(),
            iterations: bench_iterations(),
            seed: input_seed(),
            input_kind: input_kind(),
            fast_twiddles: ntt_fast_twiddles(),
            ..Self::default()
        }
    }

    /// Command line on top of the environment tuning.
    pub fn from_args(args: &Args) -> Self {
        Self::from_env().with_args(args)
    }

    /// Override the positional settings given on the command line.
    ///
    /// The flags are integers, non-zero meaning true.
    pub fn with_args(mut self, args: &Args) -> Self {
        if let Some(log_size) = args.log2_size {
            self.log_size = log_size;
        }
        if let Some(inplace) = args.inplace {
            self.inplace = inplace != 0;
        }
        if let Some(inverse) = args.inverse {
            self.inverse = inverse != 0;
        }
        self
    }

    /// Number of elements transformed
    pub fn size(&self) -> usize {
        1usize << self.log_size
    }

    pub fn direction(&self) -> NttDir {
        NttDir::from_inverse_flag(self.inverse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HarnessError;

    #[test]
    fn test_run_config_defaults() {
        let cfg = RunConfig::default();
        assert_eq!(cfg.log_size, 19);
        assert!(cfg.inplace);
        assert!(cfg.inverse);
        assert_eq!(cfg.size(), 1 << 19);
        assert_eq!(cfg.direction(), NttDir::Inverse);
    }

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("ntt-diff").chain(args.iter().copied()))
    }

    #[test]
    fn test_positional_args() {
        let cfg = RunConfig::default().with_args(&parse(&["10", "0", "1"]).unwrap());
        assert_eq!(cfg.log_size, 10);
        assert!(!cfg.inplace);
        assert!(cfg.inverse);

        // Missing trailing arguments keep their defaults
        let cfg = RunConfig::default().with_args(&parse(&["12"]).unwrap());
        assert_eq!(cfg.log_size, 12);
        assert!(cfg.inplace);

        let args = parse(&[]).unwrap();
        assert_eq!(args, Args::default());
        assert_eq!(RunConfig::default().with_args(&args), RunConfig::default());
    }

    #[test]
    fn test_flags_are_truthy_integers() {
        let cfg = RunConfig::default().with_args(&parse(&["8", "2", "-1"]).unwrap());
        assert!(cfg.inplace);
        assert!(cfg.inverse);
        let cfg = RunConfig::default().with_args(&parse(&["8", "0", "0"]).unwrap());
        assert_eq!(cfg.direction(), NttDir::Forward);
    }

    #[test]
    fn test_invalid_args() {
        let err = HarnessError::from(parse(&["big"]).unwrap_err());
        assert_eq!(err.code(), 1);

        let err = HarnessError::from(parse(&["8", "yes"]).unwrap_err());
        assert_eq!(err.code(), 1);

        let err = HarnessError::from(parse(&["8", "1", "1", "extra"]).unwrap_err());
        assert_eq!(err.code(), 1);
    }

    #[test]
    fn test_help_is_not_a_failure() {
        let err = HarnessError::from(parse(&["--help"]).unwrap_err());
        assert_eq!(err.code(), crate::error::SUCCESS_CODE);
    }

    #[test]
    fn test_env_tuning_defaults() {
        if std::env::var("NTT_DIFF_ITERATIONS").is_err() {
            assert_eq!(bench_iterations(), DEFAULT_ITERATIONS);
        }
        assert!(bench_iterations() >= 1);
        if std::env::var("NTT_DIFF_DEVICE_MEMORY_MB").is_err() {
            assert_eq!(device_memory_limit(), None);
        }
    }
}
