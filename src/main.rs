// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! CLI tool to measure a work distribution strategy and print the result as
//! one CSV line.

use clap::{Parser, ValueEnum};
use min_array_bench::{
    CpuPinningPolicy, Dataset, Error, Method, Report, TrialRunner, DEFAULT_ARRAY_SIZE,
    DEFAULT_BLOCK_SIZE, DEFAULT_NUM_TRIALS,
};
use std::error::Error as _;
use std::num::NonZeroUsize;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            let mut message = format!("Error: {e}");
            let mut source = e.source();
            while let Some(cause) = source {
                message.push_str(&format!(": {cause}"));
                source = cause.source();
            }
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

/// Allocates the dataset and runs all the trials.
fn run(cli: &Cli) -> Result<Report, Error> {
    let runner = TrialRunner {
        num_threads: cli.num_threads,
        method: cli.method.into(),
        cpu_pinning: CpuPinningPolicy::from_migration_allowed(cli.migration == 1),
        block_size: cli.block_size,
        num_trials: cli.trials,
    };

    let mut dataset = Dataset::new(cli.input_size)?;
    let measurement = runner.run(&mut dataset)?;

    Ok(Report {
        method: runner.method,
        num_threads: runner.num_threads,
        migration_allowed: runner.cpu_pinning.migration_allowed(),
        measurement,
    })
}

/// CLI tool to measure a work distribution strategy for the element-wise
/// minimum of two arrays.
#[derive(Parser, Debug, PartialEq, Eq)]
#[command(version)]
struct Cli {
    /// Policy to split work among threads.
    #[arg(value_enum)]
    method: MethodCli,

    /// Number of worker threads.
    num_threads: NonZeroUsize,

    /// Whether worker threads may migrate across CPUs (1), or are pinned to
    /// the CPU with the same index (0).
    #[arg(value_parser = clap::value_parser!(u8).range(0..=1))]
    migration: u8,

    /// Number of items in each array.
    #[arg(long, default_value_t = DEFAULT_ARRAY_SIZE)]
    input_size: usize,

    /// Number of items per block, for the block and farming methods.
    #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE)]
    block_size: NonZeroUsize,

    /// Number of trials to average.
    #[arg(long, default_value_t = DEFAULT_NUM_TRIALS)]
    trials: NonZeroUsize,
}

/// Policy to split work among threads.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum MethodCli {
    /// Each worker thread processes every n-th item.
    Cyclic,
    /// Each worker thread processes every n-th block of items.
    Block,
    /// Worker threads claim blocks from a shared counter.
    Farming,
}

impl From<MethodCli> for Method {
    fn from(method: MethodCli) -> Self {
        match method {
            MethodCli::Cyclic => Method::Cyclic,
            MethodCli::Block => Method::Block,
            MethodCli::Farming => Method::Farming,
        }
    }
}
