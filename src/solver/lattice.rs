// src/solver/lattice.rs

use crate::utils::velocity::Velocity;

/// D2Q9 lattice constants.
///
/// The nine discrete velocities are numbered:
///
/// ```text
/// 6 2 5
///  \|/
/// 3-0-1
///  /|\
/// 7 4 8
/// ```
///
/// with `x` increasing eastward and `y` increasing northward.
pub struct D2Q9;

impl D2Q9 {
    /// Number of discrete velocities per cell
    pub const Q: usize = 9;

    /// Discrete velocity vectors (rest, 4 axial, 4 diagonal)
    pub const VELOCITIES: [[i32; 2]; 9] = [
        [0, 0],
        [1, 0], [0, 1], [-1, 0], [0, -1],
        [1, 1], [-1, 1], [-1, -1], [1, -1],
    ];

    /// Weights for each direction
    pub const WEIGHTS: [f32; 9] = [
        4.0 / 9.0,
        1.0 / 9.0, 1.0 / 9.0, 1.0 / 9.0, 1.0 / 9.0,
        1.0 / 36.0, 1.0 / 36.0, 1.0 / 36.0, 1.0 / 36.0,
    ];

    /// Opposite directions for bounce-back boundary conditions
    pub const OPPOSITE: [usize; 9] = [0, 3, 4, 1, 2, 7, 8, 5, 6];

    /// Speed of sound squared
    pub const CS2: f32 = 1.0 / 3.0;
}

/// One lattice cell: the nine directional populations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Speed {
    pub speeds: [f32; D2Q9::Q],
}

impl Speed {
    pub fn zeroed() -> Self {
        Speed { speeds: [0.0; D2Q9::Q] }
    }

    /// Rest equilibrium at the given density: no bulk motion, populations
    /// proportional to the lattice weights.
    pub fn equilibrium_at_rest(density: f32) -> Self {
        let mut speeds = [0.0; D2Q9::Q];
        for (f, w) in speeds.iter_mut().zip(D2Q9::WEIGHTS) {
            *f = density * w;
        }
        Speed { speeds }
    }

    /// Total density held by this cell.
    pub fn density(&self) -> f32 {
        self.speeds.iter().sum()
    }

    /// Macroscopic density and bulk velocity of this cell.
    ///
    /// The velocity is the momentum sum over the direction vectors divided
    /// by the density; valid only while the density stays positive.
    pub fn macroscopic(&self) -> (f32, Velocity) {
        let rho = self.density();
        debug_assert!(rho > 0.0, "non-positive density in fluid cell");

        let mut ux = 0.0;
        let mut uy = 0.0;
        for (f, c) in self.speeds.iter().zip(D2Q9::VELOCITIES) {
            ux += c[0] as f32 * f;
            uy += c[1] as f32 * f;
        }

        (rho, Velocity::new(ux / rho, uy / rho))
    }
}

/// Equilibrium populations for the given density and bulk velocity.
pub fn equilibrium(density: f32, u: Velocity) -> [f32; D2Q9::Q] {
    let cs2 = D2Q9::CS2;
    let u_sq = u.x * u.x + u.y * u.y;

    let mut d_equ = [0.0; D2Q9::Q];
    for ((f, c), w) in d_equ.iter_mut().zip(D2Q9::VELOCITIES).zip(D2Q9::WEIGHTS) {
        let cu = c[0] as f32 * u.x + c[1] as f32 * u.y;
        *f = w * density
            * (1.0 + cu / cs2 + (cu * cu) / (2.0 * cs2 * cs2) - u_sq / (2.0 * cs2));
    }
    d_equ
}
