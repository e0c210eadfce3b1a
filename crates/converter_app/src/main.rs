mod app;
mod args;
mod commands;
mod config;
mod effects;
mod render;

use std::io::{self, BufReader};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use converter_logging::{conv_info, LogDestination};
use log::LevelFilter;

use crate::app::{BatchOutcome, Prefill};
use crate::args::{Args, Mode};

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let mut config = config::load(args.config.as_deref()).context("failed to load configuration")?;
    config.apply_args(&args);

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let destination = if args.log_stderr {
        LogDestination::Terminal
    } else {
        LogDestination::File(config.log_file.clone())
    };
    converter_logging::initialize(destination, level);
    conv_info!(
        "Starting converter config={:?} endpoint={} output_dir={:?} resize_policy={:?}",
        args.config,
        config.endpoint,
        config.output_dir,
        config.resize_policy()
    );

    let mode = args.mode();
    let prefill = Prefill {
        links: args.links,
        format: args.format,
    };

    match mode {
        Mode::Batch => match app::run_batch(&config, prefill, io::stdout().lock())? {
            BatchOutcome::Saved(_) => Ok(ExitCode::SUCCESS),
            BatchOutcome::Failed(_) => Ok(ExitCode::FAILURE),
        },
        Mode::Interactive => {
            let input = BufReader::new(io::stdin());
            app::run_interactive(&config, prefill, input, io::stdout().lock())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
