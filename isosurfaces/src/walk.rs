//! Neighbor lookup within a [`Tree`]
//!
//! Neighbors are found by walking up the tree until the step in the requested
//! direction stays within a common ancestor, then walking back down the mirror
//! image of that path.  If the mirrored path runs into a leaf before reaching
//! the starting depth, that (larger) leaf is the neighbor.
use crate::{
    cell::CellIndex,
    tree::Tree,
    types::{Axis, Corner},
};

impl<const D: usize> Tree<D> {
    /// Finds the cell adjacent to `cell` across one of its faces
    ///
    /// `dir` selects the upper (`true`) or lower side along `axis`.  The
    /// result is at the same depth as `cell` or shallower; it's `None` if
    /// the face lies on the boundary of the root cell.
    pub fn walk_in_direction(
        &self,
        cell: CellIndex,
        axis: Axis<D>,
        dir: bool,
    ) -> Option<CellIndex> {
        let (parent, i) = self[cell].parent?;
        let sibling = i.flip(axis);
        if (i & axis) == dir {
            // We're on the far side of our parent, so step out of it
            let n = self.walk_in_direction(parent, axis, dir)?;
            Some(self.child(n, sibling).unwrap_or(n))
        } else {
            self.child(parent, sibling)
        }
    }

    /// Returns every leaf within `cell` that touches its face on the given
    /// side, in depth-first order
    pub fn leaves_in_direction(
        &self,
        cell: CellIndex,
        axis: Axis<D>,
        dir: bool,
    ) -> Vec<CellIndex> {
        let mut out = vec![];
        self.collect_leaves(cell, axis, dir, &mut out);
        out
    }

    fn collect_leaves(
        &self,
        cell: CellIndex,
        axis: Axis<D>,
        dir: bool,
        out: &mut Vec<CellIndex>,
    ) {
        if self[cell].is_leaf() {
            out.push(cell);
            return;
        }
        for i in Corner::<D>::iter().filter(|i| (*i & axis) == dir) {
            if let Some(c) = self.child(cell, i) {
                self.collect_leaves(c, axis, dir, out);
            }
        }
    }

    /// Returns the leaves adjacent to `cell` on the given side
    ///
    /// If the neighboring region is coarser than `cell`, this is a single
    /// larger leaf; if it's finer, it's every leaf touching the shared face.
    /// Returns `None` if the face lies on the boundary of the root cell.
    pub fn neighbors(
        &self,
        cell: CellIndex,
        axis: Axis<D>,
        dir: bool,
    ) -> Option<Vec<CellIndex>> {
        let n = self.walk_in_direction(cell, axis, dir)?;
        Some(self.leaves_in_direction(n, axis, !dir))
    }
}
