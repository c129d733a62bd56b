// src/solver/output.rs

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::solver::lattice::Speed;
use crate::solver::lbm::Lbm;
use crate::solver::params::Params;

pub const FINAL_STATE_FILE: &str = "final_state.dat";
pub const AV_VELS_FILE: &str = "av_vels.dat";

/// Write the gathered field, one line per cell in row-major order:
/// `<i> <j> <u_x> <u_y> <|u|> <pressure> <obstacle_flag>`. Obstacle cells
/// report zero velocity and the reference pressure.
pub fn write_final_state(
    path: &Path,
    params: &Params,
    cells: &[Speed],
    obstacles: &[bool],
) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("could not open output file {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for jj in 0..params.ny {
        for ii in 0..params.nx {
            let n = ii + jj * params.nx;
            let (u_x, u_y, u, pressure) = if obstacles[n] {
                // an occupied cell
                (0.0, 0.0, 0.0, Lbm::pressure(params.density))
            } else {
                let (rho, vel) = cells[n].macroscopic();
                (vel.x, vel.y, vel.magnitude(), Lbm::pressure(rho))
            };

            writeln!(
                writer,
                "{} {} {:.12E} {:.12E} {:.12E} {:.12E} {}",
                ii, jj, u_x, u_y, u, pressure, obstacles[n] as i32
            )?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Write the per-step averaged velocities, one `<step>:\t<avg>` line each.
pub fn write_av_vels(path: &Path, av_vels: &[f32]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("could not open output file {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for (tt, av) in av_vels.iter().enumerate() {
        writeln!(writer, "{}:\t{:.12E}", tt, av)?;
    }

    writer.flush()?;
    Ok(())
}
