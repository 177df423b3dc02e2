//! Tree cells and lower-dimensional views of them
use arrayvec::ArrayVec;
use nalgebra::SVector;

use crate::{
    point::{Field, SampledPoint},
    types::{Axis, Corner},
};

/// Maximum number of corners in a cell (a cube has 8)
pub const MAX_CORNERS: usize = 8;

/// Corner samples of a cell, ordered by [`Corner`] bit pattern
pub type Vertices<const D: usize> = ArrayVec<SampledPoint<D>, MAX_CORNERS>;

/// Index of a cell within a [`Tree`](crate::Tree)
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct CellIndex(pub(crate) usize);

impl CellIndex {
    /// Index of the root cell, which is always the first cell in the tree
    pub const ROOT: CellIndex = CellIndex(0);

    /// Returns the raw index into the tree's cell array
    pub fn index(self) -> usize {
        self.0
    }
}

/// A single cell in a `2^D`-ary tree
///
/// Cells are created with all of their corners sampled, gain children at
/// most once, and are never removed.
#[derive(Clone, Debug)]
pub struct Cell<const D: usize> {
    /// Corner samples, ordered by [`Corner`] bit pattern
    pub(crate) vertices: Vertices<D>,

    /// Depth within the tree (the root is at depth 0)
    pub(crate) depth: usize,

    /// Parent cell and our position within it, or `None` for the root
    pub(crate) parent: Option<(CellIndex, Corner<D>)>,

    /// Index of the first child; all `2^D` children are stored contiguously
    pub(crate) children: Option<CellIndex>,
}

impl<const D: usize> Cell<D> {
    /// Builds a new leaf cell spanning `[pmin, pmax]`, sampling its corners
    pub(crate) fn new<F: Field<D> + ?Sized>(
        pmin: SVector<f64, D>,
        pmax: SVector<f64, D>,
        depth: usize,
        parent: Option<(CellIndex, Corner<D>)>,
        field: &F,
    ) -> Self {
        Self {
            vertices: corners(pmin, pmax, field),
            depth,
            parent,
            children: None,
        }
    }

    /// Returns the bounds of the child at the given corner
    pub(crate) fn child_bounds(
        &self,
        i: Corner<D>,
    ) -> (SVector<f64, D>, SVector<f64, D>) {
        let v = self.vertices[i.index()].pos;
        let lo = (self.pmin() + v) / 2.0;
        let hi = (self.pmax() + v) / 2.0;
        (lo, hi)
    }

    /// Corner samples, ordered by [`Corner`] bit pattern
    pub fn vertices(&self) -> &[SampledPoint<D>] {
        &self.vertices
    }

    /// Returns the sample at the given corner
    pub fn corner(&self, i: Corner<D>) -> &SampledPoint<D> {
        &self.vertices[i.index()]
    }

    /// Depth within the tree (the root is at depth 0)
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Checks whether this cell has no children
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Returns the parent cell, or `None` for the root
    pub fn parent(&self) -> Option<CellIndex> {
        self.parent.map(|(p, _)| p)
    }

    /// Lower corner of the cell's bounding box
    pub fn pmin(&self) -> SVector<f64, D> {
        self.vertices[0].pos
    }

    /// Upper corner of the cell's bounding box
    pub fn pmax(&self) -> SVector<f64, D> {
        self.vertices[Corner::<D>::COUNT - 1].pos
    }

    /// Returns a read-only view of the whole cell
    pub fn view(&self) -> CellView<D> {
        CellView {
            dim: D,
            vertices: self.vertices.clone(),
        }
    }

    /// Checks whether the cell should be subdivided to resolve the field
    ///
    /// This only looks at corner samples, so a cell whose corners all share a
    /// sign is never subdivided, even if the zero level dips into it between
    /// corners.
    pub(crate) fn should_descend(&self, tol: &SVector<f64, D>) -> bool {
        let extent = self.pmax() - self.pmin();
        if extent.iter().zip(tol.iter()).all(|(e, t)| e < t) {
            // too small to matter
            false
        } else if self.vertices.iter().all(|v| v.is_undefined()) {
            // entirely outside of the field's domain
            false
        } else if self.vertices.iter().any(|v| v.is_undefined()) {
            // straddling the edge of the domain
            true
        } else {
            let first = signum(self.vertices[0].value);
            self.vertices[1..].iter().any(|v| signum(v.value) != first)
        }
    }
}

/// Sign of a defined value, with zero distinct from both sides
fn signum(v: f64) -> std::cmp::Ordering {
    v.partial_cmp(&0.0).unwrap_or(std::cmp::Ordering::Equal)
}

/// Samples every corner of the box `[pmin, pmax]`
///
/// Coordinates are selected (rather than computed as `pmin + offset`), so
/// cells that share a corner always evaluate the field at identical
/// positions.
pub(crate) fn corners<const D: usize, F: Field<D> + ?Sized>(
    pmin: SVector<f64, D>,
    pmax: SVector<f64, D>,
    field: &F,
) -> Vertices<D> {
    Corner::<D>::iter()
        .map(|c| {
            let mut pos = pmin;
            for a in Axis::<D>::iter() {
                if c & a {
                    pos[a.index()] = pmax[a.index()];
                }
            }
            SampledPoint::new(pos, field)
        })
        .collect()
}

////////////////////////////////////////////////////////////////////////////////

/// Read-only view of a cell or one of its boundary elements
///
/// A view of dimension `n` has `2^n` vertices, ordered by the same bit
/// pattern as a full cell (relative to the view's own axes).  A cell is a
/// `D`-dimensional view, its faces are `D - 1`-dimensional views, and so on
/// down to individual vertices.
#[derive(Clone, Debug)]
pub struct CellView<const D: usize> {
    dim: usize,
    vertices: Vertices<D>,
}

impl<const D: usize> CellView<D> {
    /// Dimension of this view (`D` for a cell, `D - 1` for a face, ...)
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Vertices of the view, ordered by bit pattern
    pub fn vertices(&self) -> &[SampledPoint<D>] {
        &self.vertices
    }

    /// Returns the `dim - 1` dimensional side of this view along the given
    /// (view-local) axis; `dir` selects the upper (`true`) or lower side
    ///
    /// # Panics
    /// If this view is a single vertex or the axis is out of range
    pub fn subcell(&self, axis: usize, dir: bool) -> CellView<D> {
        assert!(axis < self.dim, "invalid axis {axis} for {}-cell", self.dim);
        let m = 1 << axis;
        CellView {
            dim: self.dim - 1,
            vertices: self
                .vertices
                .iter()
                .enumerate()
                .filter(|(i, _)| (i & m != 0) == dir)
                .map(|(_, v)| *v)
                .collect(),
        }
    }

    /// Evaluates the field at the center of this view
    pub fn dual<F: Field<D> + ?Sized>(&self, field: &F) -> SampledPoint<D> {
        if self.dim == 0 {
            self.vertices[0]
        } else {
            SampledPoint::midpoint(
                &self.vertices[0],
                &self.vertices[self.vertices.len() - 1],
                field,
            )
        }
    }
}
