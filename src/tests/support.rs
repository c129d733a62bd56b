// src/tests/support.rs

use crate::solver::lattice::Speed;
use crate::solver::params::Params;

pub fn params(nx: usize, ny: usize, max_iters: usize, accel: f32, omega: f32) -> Params {
    Params {
        nx,
        ny,
        max_iters,
        reynolds_dim: nx,
        density: 0.1,
        accel,
        omega,
    }
}

pub fn open_channel(params: &Params) -> Vec<bool> {
    vec![false; params.ny * params.nx]
}

/// Obstacle mask with a solid square spanning `x0..x0+side`, `y0..y0+side`.
pub fn square_block(params: &Params, x0: usize, y0: usize, side: usize) -> Vec<bool> {
    let mut mask = open_channel(params);
    for y in y0..y0 + side {
        for x in x0..x0 + side {
            mask[x + y * params.nx] = true;
        }
    }
    mask
}

pub fn total_mass(cells: &[Speed]) -> f32 {
    cells.iter().map(|cell| cell.density()).sum()
}

pub fn assert_close(actual: f32, expected: f32, tol: f32, what: &str) {
    assert!(
        (actual - expected).abs() <= tol,
        "{}: {} differs from {} by more than {}",
        what,
        actual,
        expected,
        tol
    );
}
