//! Adaptive `2^D`-ary trees (quadtrees in 2D, octrees in 3D)
use std::collections::VecDeque;

use log::debug;
use nalgebra::SVector;
use rayon::prelude::*;

use crate::{
    Error,
    cell::{Cell, CellIndex},
    point::Field,
    settings::{Settings, ThreadPool, check_bounds},
    types::Corner,
};

/// Adaptive tree over an axis-aligned box
///
/// Cells are stored in a flat arena and addressed by [`CellIndex`]; the root
/// is always [`CellIndex::ROOT`], and the `2^D` children of a cell are stored
/// contiguously in [`Corner`] order.
#[derive(Clone, Debug)]
pub struct Tree<const D: usize> {
    pub(crate) cells: Vec<Cell<D>>,
    pub(crate) tol: SVector<f64, D>,
}

impl<const D: usize> Tree<D> {
    /// Builds a tree over the region `[pmin, pmax]`
    ///
    /// Cells are visited in breadth-first order.  Each one is subdivided if
    /// it's shallower than [`Settings::min_depth`], or if its corners show
    /// that it straddles the zero level or the edge of the field's domain.
    /// Subdivision stops when every cell has been visited, or when the next
    /// split would push the leaf count past the budget (see
    /// [`Settings::cell_budget`]).
    ///
    /// The resulting tree is independent of [`Settings::threads`].
    pub fn build<F: Field<D> + ?Sized>(
        field: &F,
        pmin: SVector<f64, D>,
        pmax: SVector<f64, D>,
        settings: &Settings<D>,
    ) -> Result<Self, Error> {
        const { assert!(D >= 1 && D <= 3, "unsupported dimension") };

        check_bounds(&pmin, &pmax)?;
        let tol = settings.tolerance(&pmin, &pmax)?;
        let max_cells = settings.cell_budget()?;
        let branching = Settings::<D>::BRANCHING;

        let mut tree = Tree {
            cells: vec![Cell::new(pmin, pmax, 0, None, field)],
            tol,
        };
        let mut queue = VecDeque::from([CellIndex::ROOT]);
        let mut leaf_count = 1;

        while let Some(&next) = queue.front() {
            if leaf_count + branching - 1 > max_cells {
                break;
            }

            // Decide which cells of the current generation will be split.
            // This is done in queue order, so the budget is spent exactly as
            // if cells were split one at a time.
            let depth = tree[next].depth;
            let mut batch = vec![];
            while let Some(&c) = queue.front() {
                if tree[c].depth != depth
                    || leaf_count + branching - 1 > max_cells
                {
                    break;
                }
                queue.pop_front();
                let cell = &tree[c];
                if cell.depth < settings.min_depth || cell.should_descend(&tol)
                {
                    batch.push(c);
                    // Add the children and remove the parent
                    leaf_count += branching - 1;
                }
            }

            let children =
                tree.sample_children(&batch, field, settings.threads);
            for (parent, kids) in batch.into_iter().zip(children) {
                let first = CellIndex(tree.cells.len());
                tree.cells[parent.0].children = Some(first);
                tree.cells.extend(kids);
                queue.extend((0..branching).map(|i| CellIndex(first.0 + i)));
            }
        }
        debug!(
            "built {D}D tree with {} cells ({leaf_count} leaves, budget {}) \
             on {} thread(s)",
            tree.cells.len(),
            max_cells,
            settings.threads.map_or(1, ThreadPool::thread_count)
        );
        Ok(tree)
    }

    /// Samples the children of every cell in `batch`, preserving order
    fn sample_children<F: Field<D> + ?Sized>(
        &self,
        batch: &[CellIndex],
        field: &F,
        threads: Option<&ThreadPool>,
    ) -> Vec<Vec<Cell<D>>> {
        let split = |&c: &CellIndex| -> Vec<Cell<D>> {
            let cell = &self[c];
            Corner::<D>::iter()
                .map(|i| {
                    let (lo, hi) = cell.child_bounds(i);
                    Cell::new(lo, hi, cell.depth + 1, Some((c, i)), field)
                })
                .collect()
        };
        match threads {
            Some(pool) => pool.run(|| batch.par_iter().map(split).collect()),
            None => batch.iter().map(split).collect(),
        }
    }

    /// Returns the root cell
    pub fn root(&self) -> &Cell<D> {
        &self.cells[0]
    }

    /// Returns the total number of cells (branches and leaves)
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Checks whether the tree is empty, which is never the case
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the per-axis tolerance used to build this tree
    pub fn tol(&self) -> &SVector<f64, D> {
        &self.tol
    }

    /// Looks up the given child of a cell
    ///
    /// Returns `None` if the cell is a leaf
    pub fn child(&self, cell: CellIndex, i: Corner<D>) -> Option<CellIndex> {
        self[cell].children.map(|c| CellIndex(c.0 + i.index()))
    }

    /// Iterates over the children of a cell, in [`Corner`] order
    ///
    /// The iterator is empty if the cell is a leaf
    pub fn children(
        &self,
        cell: CellIndex,
    ) -> impl Iterator<Item = CellIndex> + '_ {
        Corner::<D>::iter().filter_map(move |i| self.child(cell, i))
    }

    /// Iterates over every leaf, in depth-first order
    pub fn leaves(&self) -> impl Iterator<Item = CellIndex> + '_ {
        let mut todo = vec![CellIndex::ROOT];
        std::iter::from_fn(move || {
            while let Some(c) = todo.pop() {
                match self[c].children {
                    None => return Some(c),
                    Some(first) => todo.extend(
                        (0..Corner::<D>::COUNT)
                            .rev()
                            .map(|i| CellIndex(first.0 + i)),
                    ),
                }
            }
            None
        })
    }

    /// Returns the number of leaf cells
    pub fn leaf_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_leaf()).count()
    }
}

impl<const D: usize> std::ops::Index<CellIndex> for Tree<D> {
    type Output = Cell<D>;
    fn index(&self, i: CellIndex) -> &Cell<D> {
        &self.cells[i.0]
    }
}
