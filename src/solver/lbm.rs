// src/solver/lbm.rs

use std::path::Path;

use crate::solver::init;
use crate::solver::lattice::{Speed, D2Q9};
use crate::solver::params::{Params, SetupError};

/// The `Lbm` struct represents one configured lattice Boltzmann run: the
/// validated parameters, the global obstacle mask, and the number of ranks
/// the rows are partitioned across.
///
/// Construction performs all validation; the timestep loop trusts it.
pub struct Lbm {
    pub params: Params,
    pub obstacles: Vec<bool>,
    pub ranks: usize,
    pub(crate) show_progress: bool,
}

/// What a finished run hands back: the per-step averaged velocities and
/// the gathered `ny x nx` field in row-major order.
pub struct SimOutput {
    pub av_vels: Vec<f32>,
    pub cells: Vec<Speed>,
    pub elapsed: std::time::Duration,
}

impl Lbm {
    /// Load and validate both input files.
    pub fn from_files(
        paramfile: &Path,
        obstaclefile: &Path,
        ranks: usize,
    ) -> Result<Self, SetupError> {
        let params = Params::from_file(paramfile)?;
        params.validate(ranks)?;
        let obstacles = init::load_obstacles(obstaclefile, &params)?;
        Self::from_parts(params, obstacles, ranks)
    }

    /// Assemble a run from already-loaded pieces.
    pub fn from_parts(
        params: Params,
        obstacles: Vec<bool>,
        ranks: usize,
    ) -> Result<Self, SetupError> {
        params.validate(ranks)?;
        if obstacles.len() != params.ny * params.nx {
            return Err(SetupError::ObstacleMaskSize {
                got: obstacles.len(),
                expected: params.ny * params.nx,
            });
        }
        Ok(Lbm {
            params,
            obstacles,
            ranks,
            show_progress: false,
        })
    }

    pub fn set_progress(&mut self, state: bool) {
        self.show_progress = state;
    }

    /// Reynolds number for the final averaged velocity.
    pub fn reynolds(&self, av_velocity: f32) -> f32 {
        av_velocity * self.params.reynolds_dim as f32 / self.params.viscosity()
    }

    /// Fluid pressure implied by a cell density.
    pub fn pressure(density: f32) -> f32 {
        density * D2Q9::CS2
    }
}
