// src/main.rs

#![allow(dead_code)]

mod solver;
mod utils;

#[cfg(test)]
mod tests;

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};

use solver::lbm::Lbm;
use solver::output;
use utils::{rusage, terminal_utils};

/// Number of worker ranks the rows are partitioned across; the analogue
/// of the process count in a message-passing launch.
const RANKS_VAR: &str = "FLUMESIM_RANKS";

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <paramfile> <obstaclefile>", args[0]);
        return ExitCode::FAILURE;
    }

    match run(Path::new(&args[1]), Path::new(&args[2])) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            terminal_utils::print_error(&format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}

fn run(paramfile: &Path, obstaclefile: &Path) -> Result<()> {
    terminal_utils::print_welcome_message();

    let ranks = rank_count()?;
    let mut lbm = Lbm::from_files(paramfile, obstaclefile, ranks)?;
    lbm.set_progress(true);

    let out = lbm.run()?;

    let av_final = *out
        .av_vels
        .last()
        .context("no averaged velocities were recorded")?;
    let elapsed = out.elapsed.as_secs_f64();
    let (user_time, system_time) = rusage::cpu_times();
    let steps = lbm.params.max_iters;
    let mlups =
        (lbm.params.nx * lbm.params.ny * steps) as f64 / elapsed / 1_000_000.0;

    terminal_utils::print_metrics(
        lbm.reynolds(av_final),
        elapsed,
        user_time,
        system_time,
        steps as u64,
        mlups,
    );

    output::write_final_state(
        &PathBuf::from(output::FINAL_STATE_FILE),
        &lbm.params,
        &out.cells,
        &lbm.obstacles,
    )?;
    output::write_av_vels(&PathBuf::from(output::AV_VELS_FILE), &out.av_vels)?;

    terminal_utils::print_success("Simulation finished successfully!");
    Ok(())
}

fn rank_count() -> Result<usize> {
    match env::var(RANKS_VAR) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("{} must be a positive integer, got {:?}", RANKS_VAR, value)),
        Err(_) => Ok(1),
    }
}
