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


//! `ntt-diff [log2_size] [inplace] [inverse]`
//!
//! Runs the differential comparison on the host device and prints the
//! summary. The exit status is the device status code, `0` on success,
//! independent of the verdict.

use bls12_381_ntt_diff::config::{self, Args, RunConfig};
use bls12_381_ntt_diff::{run, Backend, HarnessError, HostDevice, Scalar, SUCCESS_CODE};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let code = match execute() {
        Ok(()) => SUCCESS_CODE,
        Err(e) => {
            let code = e.code();
            match e {
                // Usage, --help and --version go through clap's own output
                HarnessError::Cli(cli) => {
                    let _ = cli.print();
                }
                other => {
                    error!("{}", other);
                    println!("{}", code);
                }
            }
            code
        }
    };
    std::process::exit(code);
}

fn execute() -> Result<(), HarnessError> {
    let args = Args::try_parse()?;
    let cfg = RunConfig::from_args(&args);
    config::log_config();

    println!(
        "Running NTT with log_size={} ordering={} inplace={} inverse={}",
        cfg.log_size,
        cfg.ordering,
        u8::from(cfg.inplace),
        u8::from(cfg.inverse)
    );

    let mut device = HostDevice::<Scalar>::new();
    if let Some(bytes) = config::device_memory_limit() {
        device = device.with_memory_limit(bytes);
    }

    let report = run(&device, &cfg)?;

    println!("NTT domain init: {:.3} ms", millis(report.domain_init));
    for backend in Backend::ALL {
        println!("{} Runtime: {:.3} ms", backend.label(), millis(report.bench.mean(backend)));
    }
    println!("{}", if report.verdict.passed() { "SUCCESS!" } else { "FAIL!" });
    Ok(())
}

fn millis(d: std::time::Duration) -> f64 {
    d.as_secs_f64() * 1e3
}
