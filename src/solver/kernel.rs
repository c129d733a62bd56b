// src/solver/kernel.rs
//
// The four substeps of one timestep, each operating on a single rank's
// slab. Propagate reads `cells` and writes `scratch`; rebound and collide
// read `scratch` and write `cells`, so `cells` always holds the canonical
// post-step state.

use crate::solver::init::Slab;
use crate::solver::lattice::{self, D2Q9};
use crate::solver::params::Params;

/// Drive the inflow by shifting density from the west-bound populations to
/// the east-bound ones along the driven row (one inside the top boundary,
/// global `ny - 2`). Ranks that do not own that row do nothing.
pub fn accelerate(params: &Params, slab: &mut Slab) {
    if params.ny < 2 {
        return;
    }
    let driven = params.ny - 2;
    if !slab.owns_row(driven) {
        return;
    }
    let jj = driven - slab.row0 + 1;

    // compute weighting factors
    let w1 = params.density * params.accel / 9.0;
    let w2 = params.density * params.accel / 36.0;

    for ii in 0..slab.nx {
        let n = slab.idx(ii, jj);
        let speeds = &slab.cells[n].speeds;

        // only if the cell is not occupied and we don't send a
        // negative density
        if !slab.obstacle(ii, jj)
            && speeds[3] - w1 > 0.0
            && speeds[6] - w2 > 0.0
            && speeds[7] - w2 > 0.0
        {
            let speeds = &mut slab.cells[n].speeds;
            // increase 'east-side' densities
            speeds[1] += w1;
            speeds[5] += w2;
            speeds[8] += w2;
            // decrease 'west-side' densities
            speeds[3] -= w1;
            speeds[6] -= w2;
            speeds[7] -= w2;
        }
    }
}

/// Stream each population into the scratch grid from its upstream
/// neighbor. Horizontal wrap is modular; vertical wrap goes through the
/// ghost rows, which the halo exchange must have refreshed first.
pub fn propagate(slab: &mut Slab) {
    let nx = slab.nx;
    let cells = &slab.cells;
    let scratch = &mut slab.scratch;

    for jj in 1..=slab.local_ny {
        for ii in 0..nx {
            let y_n = jj + 1;
            let y_s = jj - 1;
            let x_e = (ii + 1) % nx;
            let x_w = (ii + nx - 1) % nx;

            let f = &mut scratch[ii + jj * nx].speeds;
            f[0] = cells[ii + jj * nx].speeds[0]; // central cell, no movement
            f[1] = cells[x_w + jj * nx].speeds[1]; // east
            f[2] = cells[ii + y_s * nx].speeds[2]; // north
            f[3] = cells[x_e + jj * nx].speeds[3]; // west
            f[4] = cells[ii + y_n * nx].speeds[4]; // south
            f[5] = cells[x_w + y_s * nx].speeds[5]; // north-east
            f[6] = cells[x_e + y_s * nx].speeds[6]; // north-west
            f[7] = cells[x_e + y_n * nx].speeds[7]; // south-west
            f[8] = cells[x_w + y_n * nx].speeds[8]; // south-east
        }
    }
}

/// Bounce-back at obstacle cells: mirror the streamed populations into the
/// opposite directions, writing into the main grid. The rest population is
/// left alone and fluid cells are untouched.
pub fn rebound(slab: &mut Slab) {
    let nx = slab.nx;

    for jj in 1..=slab.local_ny {
        for ii in 0..nx {
            if !slab.obstacles[ii + (jj - 1) * nx] {
                continue;
            }
            let n = ii + jj * nx;
            for k in 1..D2Q9::Q {
                slab.cells[n].speeds[k] = slab.scratch[n].speeds[D2Q9::OPPOSITE[k]];
            }
        }
    }
}

/// BGK relaxation: move every fluid cell a fraction `omega` of the way
/// from its streamed populations toward the local equilibrium.
pub fn collide(params: &Params, slab: &mut Slab) {
    let nx = slab.nx;
    let omega = params.omega;

    for jj in 1..=slab.local_ny {
        for ii in 0..nx {
            // don't consider occupied cells
            if slab.obstacles[ii + (jj - 1) * nx] {
                continue;
            }
            let n = ii + jj * nx;

            let (rho, u) = slab.scratch[n].macroscopic();
            let d_equ = lattice::equilibrium(rho, u);

            // relaxation step
            for k in 0..D2Q9::Q {
                let f = slab.scratch[n].speeds[k];
                slab.cells[n].speeds[k] = f + omega * (d_equ[k] - f);
            }
        }
    }
}

/// Accumulated velocity magnitude and fluid-cell count over this rank's
/// interior. The global per-step average is the reduced sum over ranks
/// divided by the reduced count.
pub fn local_velocity_sum(slab: &Slab) -> (f32, usize) {
    let nx = slab.nx;
    let mut tot_u = 0.0f32;
    let mut tot_cells = 0usize;

    for jj in 1..=slab.local_ny {
        for ii in 0..nx {
            // ignore occupied cells
            if slab.obstacles[ii + (jj - 1) * nx] {
                continue;
            }
            let (_, u) = slab.cells[ii + jj * nx].macroscopic();
            tot_u += u.magnitude();
            tot_cells += 1;
        }
    }

    (tot_u, tot_cells)
}

/// Sum of all populations over this rank's interior rows. The total over
/// all ranks should remain constant from one timestep to the next.
pub fn total_density(slab: &Slab) -> f32 {
    slab.interior().iter().map(|cell| cell.density()).sum()
}
