//! Extraction settings
use nalgebra::SVector;

use crate::Error;

/// Thread pool used to parallelize tree construction
pub enum ThreadPool {
    /// User-provided pool
    Custom(rayon::ThreadPool),
    /// Global Rayon pool
    Global,
}

impl ThreadPool {
    /// Runs a function across the thread pool
    pub fn run<F: FnOnce() -> V + Send, V: Send>(&self, f: F) -> V {
        match self {
            ThreadPool::Custom(p) => p.install(f),
            ThreadPool::Global => f(),
        }
    }

    /// Returns the number of threads in the pool
    pub fn thread_count(&self) -> usize {
        match self {
            ThreadPool::Custom(p) => p.current_num_threads(),
            ThreadPool::Global => rayon::current_num_threads(),
        }
    }
}

/// Settings for tree construction and extraction
#[derive(Copy, Clone)]
pub struct Settings<'a, const D: usize> {
    /// Cells are always subdivided until they reach this depth
    pub min_depth: usize,

    /// Budget for the number of leaf cells
    ///
    /// The budget is raised to `2^(D * min_depth)` if needed, since
    /// `min_depth` takes precedence.
    pub max_cells: usize,

    /// Per-axis size below which cells are not subdivided, which is also the
    /// precision of root isolation
    ///
    /// If `None`, `(pmax - pmin) / 1000` is used.
    pub tol: Option<SVector<f64, D>>,

    /// Thread pool for sampling new cells
    ///
    /// If `None`, the tree is built on the calling thread.  The tree is the
    /// same either way.
    pub threads: Option<&'a ThreadPool>,
}

impl<const D: usize> Default for Settings<'_, D> {
    fn default() -> Self {
        Self {
            min_depth: 5,
            max_cells: 10_000,
            tol: None,
            threads: None,
        }
    }
}

impl<const D: usize> Settings<'_, D> {
    /// Number of children produced by each split
    pub const BRANCHING: usize = 1 << D;

    /// Returns the tolerance for the given region, checking that it's valid
    pub fn tolerance(
        &self,
        pmin: &SVector<f64, D>,
        pmax: &SVector<f64, D>,
    ) -> Result<SVector<f64, D>, Error> {
        let tol = self.tol.unwrap_or_else(|| (pmax - pmin) / 1000.0);
        for (axis, &t) in tol.iter().enumerate() {
            if !(t.is_finite() && t > 0.0) {
                return Err(Error::BadTolerance { axis, tol: t });
            }
        }
        Ok(tol)
    }

    /// Returns the effective leaf budget, checking that it's valid
    pub fn cell_budget(&self) -> Result<usize, Error> {
        if self.max_cells == 0 {
            return Err(Error::EmptyBudget);
        }
        let min_cells = u32::try_from(self.min_depth)
            .map_or(usize::MAX, |d| Self::BRANCHING.saturating_pow(d));
        Ok(self.max_cells.max(min_cells))
    }
}

/// Checks that `pmin <= pmax` on every axis, with finite values
pub(crate) fn check_bounds<const D: usize>(
    pmin: &SVector<f64, D>,
    pmax: &SVector<f64, D>,
) -> Result<(), Error> {
    for (axis, (&min, &max)) in pmin.iter().zip(pmax.iter()).enumerate() {
        if !(min.is_finite() && max.is_finite() && min <= max) {
            return Err(Error::BadBounds { axis, min, max });
        }
    }
    Ok(())
}
