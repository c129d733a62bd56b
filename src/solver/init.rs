// src/solver/init.rs

use std::fs;
use std::path::Path;

use crate::solver::lattice::Speed;
use crate::solver::params::{Params, SetupError};

/// Load the obstacle map: zero or more `x y flag` triples, `flag == 1`,
/// everything not listed defaulting to open fluid.
pub fn load_obstacles(path: &Path, params: &Params) -> Result<Vec<bool>, SetupError> {
    let text = fs::read_to_string(path).map_err(|source| SetupError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_obstacles(&text, params)
}

pub fn parse_obstacles(text: &str, params: &Params) -> Result<Vec<bool>, SetupError> {
    let mut mask = vec![false; params.ny * params.nx];

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 3 {
            return Err(SetupError::ObstacleLine(line.to_string()));
        }

        let x: usize = fields[0]
            .parse()
            .map_err(|_| SetupError::ObstacleLine(line.to_string()))?;
        let y: usize = fields[1]
            .parse()
            .map_err(|_| SetupError::ObstacleLine(line.to_string()))?;
        let flag: i64 = fields[2]
            .parse()
            .map_err(|_| SetupError::ObstacleLine(line.to_string()))?;

        if x >= params.nx {
            return Err(SetupError::ObstacleX(x));
        }
        if y >= params.ny {
            return Err(SetupError::ObstacleY(y));
        }
        if flag != 1 {
            return Err(SetupError::ObstacleFlag(flag));
        }

        mask[x + y * params.nx] = true;
    }

    Ok(mask)
}

/// One rank's share of the grid: `local_ny` interior rows plus a ghost row
/// on each side, a scratch grid of the same shape for post-propagate
/// populations, and the matching slice of the obstacle mask.
///
/// Row 0 is the south ghost, rows `1..=local_ny` are interior, row
/// `local_ny + 1` is the north ghost. The ghosts are rewritten by the halo
/// exchange before any kernel reads them.
pub struct Slab {
    pub nx: usize,
    pub local_ny: usize,
    /// global index of the first interior row
    pub row0: usize,
    pub cells: Vec<Speed>,
    pub scratch: Vec<Speed>,
    pub obstacles: Vec<bool>,
}

impl Slab {
    pub fn new(params: &Params, rank: usize, ranks: usize, global_obstacles: &[bool]) -> Self {
        let nx = params.nx;
        let local_ny = params.local_ny(ranks);
        let row0 = rank * local_ny;

        let mut cells = vec![Speed::zeroed(); (local_ny + 2) * nx];
        let scratch = vec![Speed::zeroed(); (local_ny + 2) * nx];

        let rest = Speed::equilibrium_at_rest(params.density);
        for cell in &mut cells[nx..(local_ny + 1) * nx] {
            *cell = rest;
        }

        let obstacles = global_obstacles[row0 * nx..(row0 + local_ny) * nx].to_vec();

        Slab {
            nx,
            local_ny,
            row0,
            cells,
            scratch,
            obstacles,
        }
    }

    /// Flat index into `cells`/`scratch`; `j` counts ghost rows, so the
    /// interior spans `j in 1..=local_ny`.
    #[inline]
    pub fn idx(&self, i: usize, j: usize) -> usize {
        i + j * self.nx
    }

    /// Obstacle flag for interior row `j in 1..=local_ny`.
    #[inline]
    pub fn obstacle(&self, i: usize, j: usize) -> bool {
        self.obstacles[i + (j - 1) * self.nx]
    }

    /// The interior rows, ghosts excluded.
    pub fn interior(&self) -> &[Speed] {
        &self.cells[self.nx..(self.local_ny + 1) * self.nx]
    }

    /// Whether this rank owns the given global row.
    pub fn owns_row(&self, global_j: usize) -> bool {
        (self.row0..self.row0 + self.local_ny).contains(&global_j)
    }
}
