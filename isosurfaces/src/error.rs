//! Module containing the universal error type
use thiserror::Error;

/// Universal error type for isoline and isosurface extraction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Bounds must be finite, with `pmin <= pmax` on every axis
    #[error("bad bounds on axis {axis}: [{min}, {max}]")]
    BadBounds {
        /// Index of the offending axis
        axis: usize,
        /// Lower bound on that axis
        min: f64,
        /// Upper bound on that axis
        max: f64,
    },

    /// Tolerance must be finite and strictly positive on every axis
    #[error("bad tolerance on axis {axis}: {tol}")]
    BadTolerance {
        /// Index of the offending axis
        axis: usize,
        /// Tolerance on that axis
        tol: f64,
    },

    /// The cell budget must allow at least one cell
    #[error("cell budget must be at least 1")]
    EmptyBudget,
}
