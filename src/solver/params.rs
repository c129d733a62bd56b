// src/solver/params.rs

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Fatal setup problems: anything the initializer rejects before the
/// timestep loop is allowed to start.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("could not open input file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not read param file: {0}")]
    MissingParam(&'static str),

    #[error("could not parse param file: {field} from {value:?}")]
    BadParam { field: &'static str, value: String },

    #[error("{0} must be greater than 0")]
    NonPositive(&'static str),

    #[error("accel must not be negative")]
    NegativeAccel,

    #[error("omega must lie in (0, 2), got {0}")]
    OmegaRange(f32),

    #[error("ny = {ny} is not divisible by the number of ranks ({ranks})")]
    RankSplit { ny: usize, ranks: usize },

    #[error("expected 3 values per line in obstacle file, got {0:?}")]
    ObstacleLine(String),

    #[error("obstacle x-coord out of range: {0}")]
    ObstacleX(usize),

    #[error("obstacle y-coord out of range: {0}")]
    ObstacleY(usize),

    #[error("obstacle blocked value should be 1, got {0}")]
    ObstacleFlag(i64),

    #[error("obstacle mask has {got} cells, expected {expected}")]
    ObstacleMaskSize { got: usize, expected: usize },
}

/// Simulation parameters, immutable once loaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Params {
    /// no. of cells in x-direction
    pub nx: usize,
    /// no. of cells in y-direction
    pub ny: usize,
    /// no. of iterations
    pub max_iters: usize,
    /// dimension for Reynolds number
    pub reynolds_dim: usize,
    /// density per link
    pub density: f32,
    /// density redistribution
    pub accel: f32,
    /// relaxation parameter
    pub omega: f32,
}

impl Params {
    /// Read the seven whitespace-separated records, one per line, in order:
    /// `nx ny max_iters reynolds_dim density accel omega`.
    pub fn from_file(path: &Path) -> Result<Self, SetupError> {
        let text = fs::read_to_string(path).map_err(|source| SetupError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, SetupError> {
        let mut records = text.split_whitespace();

        fn next<T: std::str::FromStr>(
            records: &mut std::str::SplitWhitespace,
            field: &'static str,
        ) -> Result<T, SetupError> {
            let value = records.next().ok_or(SetupError::MissingParam(field))?;
            value.parse().map_err(|_| SetupError::BadParam {
                field,
                value: value.to_string(),
            })
        }

        Ok(Params {
            nx: next(&mut records, "nx")?,
            ny: next(&mut records, "ny")?,
            max_iters: next(&mut records, "max_iters")?,
            reynolds_dim: next(&mut records, "reynolds_dim")?,
            density: next(&mut records, "density")?,
            accel: next(&mut records, "accel")?,
            omega: next(&mut records, "omega")?,
        })
    }

    /// Reject anything the kernels are not prepared to handle. The hot loop
    /// does no checking of its own and relies on these invariants.
    pub fn validate(&self, ranks: usize) -> Result<(), SetupError> {
        if self.nx == 0 {
            return Err(SetupError::NonPositive("nx"));
        }
        if self.ny == 0 {
            return Err(SetupError::NonPositive("ny"));
        }
        if self.max_iters == 0 {
            return Err(SetupError::NonPositive("max_iters"));
        }
        if self.reynolds_dim == 0 {
            return Err(SetupError::NonPositive("reynolds_dim"));
        }
        if self.density <= 0.0 {
            return Err(SetupError::NonPositive("density"));
        }
        if self.accel < 0.0 {
            return Err(SetupError::NegativeAccel);
        }
        if self.omega <= 0.0 || self.omega >= 2.0 {
            return Err(SetupError::OmegaRange(self.omega));
        }
        if ranks == 0 {
            return Err(SetupError::NonPositive("ranks"));
        }
        if self.ny % ranks != 0 {
            return Err(SetupError::RankSplit {
                ny: self.ny,
                ranks,
            });
        }
        Ok(())
    }

    /// Kinematic viscosity implied by the relaxation parameter.
    pub fn viscosity(&self) -> f32 {
        (2.0 / self.omega - 1.0) / 6.0
    }

    /// Rows owned by each rank. Only valid after `validate`.
    pub fn local_ny(&self, ranks: usize) -> usize {
        self.ny / ranks
    }
}
