//! Simplicial decomposition of the leaves of a [`Tree`]
//!
//! Each leaf is split into simplices that fan out from its center, through
//! the centers of each face, edge, and so on, down to its corners.  Faces that
//! are shared with a finer neighbor are split along the neighbor's faces, so
//! the simplices of adjacent leaves meet edge-to-edge even when the leaves are
//! at different depths.
use std::collections::VecDeque;

use arrayvec::ArrayVec;

use crate::{
    cell::{CellIndex, CellView},
    point::{Field, SampledPoint},
    tree::Tree,
    types::{Axis, Corner},
};

/// Maximum number of vertices in a simplex (a tetrahedron has 4)
pub const MAX_SIMPLEX_VERTICES: usize = 4;

/// A `D`-dimensional simplex with sampled vertices
///
/// There are `D + 1` vertices.  The first is the center of a leaf cell, then
/// the center of a face of that cell, and so on; the last is a cell corner.
#[derive(Clone, Debug, PartialEq)]
pub struct Simplex<const D: usize> {
    vertices: ArrayVec<SampledPoint<D>, MAX_SIMPLEX_VERTICES>,
}

impl<const D: usize> Simplex<D> {
    /// Builds a simplex from its vertices
    ///
    /// # Panics
    /// If there are not exactly `D + 1` vertices
    pub fn new(vertices: &[SampledPoint<D>]) -> Self {
        assert_eq!(vertices.len(), D + 1, "wrong vertex count for {D}-simplex");
        Self {
            vertices: vertices.iter().copied().collect(),
        }
    }

    /// Returns the simplex's vertices
    pub fn vertices(&self) -> &[SampledPoint<D>] {
        &self.vertices
    }

    /// Checks whether the field is undefined at any vertex
    pub fn is_undefined(&self) -> bool {
        self.vertices.iter().any(|v| v.is_undefined())
    }
}

/// Builds the partial simplices connecting the center of `view` down through
/// each of its sub-elements to its corners
fn flags<const D: usize, F: Field<D> + ?Sized>(
    view: &CellView<D>,
    field: &F,
) -> Vec<ArrayVec<SampledPoint<D>, MAX_SIMPLEX_VERTICES>> {
    let dim = view.dim();
    if dim == 0 {
        return vec![view.vertices().iter().copied().collect()];
    }
    let center = view.dual(field);
    let mut out = vec![];
    for i in 0..2 * dim {
        for flag in flags(&view.subcell(i % dim, i / dim == 1), field) {
            let mut s = ArrayVec::new();
            s.push(center);
            s.extend(flag);
            out.push(s);
        }
    }
    out
}

/// Builds the simplices filling the pyramid between the center of a cell and
/// one face (which may be smaller than the cell's own face)
fn simplices_between_face<const D: usize, F: Field<D> + ?Sized>(
    volume: &CellView<D>,
    face: &CellView<D>,
    field: &F,
    out: &mut VecDeque<Simplex<D>>,
) {
    let center = volume.dual(field);
    for flag in flags(face, field) {
        let mut vertices = ArrayVec::new();
        vertices.push(center);
        vertices.extend(flag);
        out.push_back(Simplex { vertices });
    }
}

/// Lazy iterator over the simplices of a tree
///
/// Simplices are produced leaf by leaf, in depth-first order.  Interior faces
/// are visited from both sides, so most simplices appear more than once.
pub struct SimplexIter<'a, const D: usize, F: ?Sized> {
    tree: &'a Tree<D>,
    field: &'a F,
    todo: Vec<CellIndex>,
    queue: VecDeque<Simplex<D>>,
}

impl<'a, const D: usize, F: Field<D> + ?Sized> SimplexIter<'a, D, F> {
    fn new(tree: &'a Tree<D>, field: &'a F) -> Self {
        Self {
            tree,
            field,
            todo: vec![CellIndex::ROOT],
            queue: VecDeque::new(),
        }
    }

    /// Pushes every simplex touching a particular leaf into the queue
    fn visit(&mut self, leaf: CellIndex) {
        let tree = self.tree;
        for axis in Axis::<D>::iter() {
            for dir in [false, true] {
                let Some(ns) = tree.neighbors(leaf, axis, dir) else {
                    // This face is on the boundary of the root cell
                    let view = tree[leaf].view();
                    let face = view.subcell(axis.index(), dir);
                    simplices_between_face(
                        &view,
                        &face,
                        self.field,
                        &mut self.queue,
                    );
                    continue;
                };
                for n in ns {
                    // Make `a` the larger cell and `b` the smaller one, so
                    // the shared face is the whole of one of b's faces
                    let deeper = tree[leaf].depth() > tree[n].depth();
                    let (a, b, dir) =
                        if deeper { (n, leaf, !dir) } else { (leaf, n, dir) };
                    let face = tree[b].view().subcell(axis.index(), !dir);
                    for v in [a, b] {
                        simplices_between_face(
                            &tree[v].view(),
                            &face,
                            self.field,
                            &mut self.queue,
                        );
                    }
                }
            }
        }
    }
}

impl<const D: usize, F: Field<D> + ?Sized> Iterator for SimplexIter<'_, D, F> {
    type Item = Simplex<D>;

    fn next(&mut self) -> Option<Simplex<D>> {
        loop {
            if let Some(s) = self.queue.pop_front() {
                return Some(s);
            }
            let c = self.todo.pop()?;
            match self.tree[c].children {
                None => self.visit(c),
                Some(first) => self.todo.extend(
                    (0..Corner::<D>::COUNT)
                        .rev()
                        .map(|i| CellIndex(first.index() + i)),
                ),
            }
        }
    }
}

impl<const D: usize> Tree<D> {
    /// Returns a lazy iterator over simplices that cover every leaf
    ///
    /// Cell, face, and edge centers are sampled from `field` as simplices are
    /// generated; this should be the same field used to build the tree.
    pub fn simplices<'a, F: Field<D> + ?Sized>(
        &'a self,
        field: &'a F,
    ) -> SimplexIter<'a, D, F> {
        SimplexIter::new(self, field)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Settings;
    use approx::assert_relative_eq;
    use nalgebra::{Vector2, Vector3};
    use std::collections::HashSet;

    fn uniform<const D: usize>(
        f: &impl Field<D>,
        pmin: nalgebra::SVector<f64, D>,
        pmax: nalgebra::SVector<f64, D>,
    ) -> Tree<D> {
        let settings = Settings {
            min_depth: 1,
            max_cells: 1,
            ..Settings::default()
        };
        Tree::build(f, pmin, pmax, &settings).unwrap()
    }

    fn key<const D: usize>(s: &Simplex<D>) -> Vec<u64> {
        s.vertices()
            .iter()
            .flat_map(|v| v.pos.iter().map(|x| x.to_bits()))
            .collect()
    }

    #[test]
    fn test_single_cell() {
        let f = |p: &Vector3<f64>| p.x;
        let settings = Settings {
            min_depth: 0,
            max_cells: 1,
            ..Settings::default()
        };
        let lo = Vector3::new(-1.0, -1.0, -1.0);
        let tree = Tree::build(&f, lo, -lo, &settings).unwrap();
        assert_eq!(tree.len(), 1);
        let simplices: Vec<_> = tree.simplices(&f).collect();

        // 6 faces, each split into 8 tetrahedra
        assert_eq!(simplices.len(), 48);
        for s in &simplices {
            assert_eq!(s.vertices().len(), 4);
            assert_eq!(s.vertices()[0].pos, Vector3::zeros());
            let corner = s.vertices()[3].pos;
            assert!(corner.iter().all(|c| c.abs() == 1.0));
        }
        let unique: HashSet<_> = simplices.iter().map(key).collect();
        assert_eq!(unique.len(), 48);
    }

    #[test]
    fn test_uniform_counts() {
        let f = |p: &Vector2<f64>| p.x;
        let tree =
            uniform(&f, Vector2::new(0.0, 0.0), Vector2::new(2.0, 2.0));
        assert_eq!(tree.leaf_count(), 4);

        // Each leaf has two boundary faces (2 triangles each) and two
        // interior faces (2 triangles for each side)
        let simplices: Vec<_> = tree.simplices(&f).collect();
        assert_eq!(simplices.len(), 4 * (2 * 2 + 2 * 4));
        assert!(simplices.iter().all(|s| s.vertices().len() == 3));

        let f = |p: &Vector3<f64>| p.x;
        let lo = Vector3::new(-1.0, -1.0, -1.0);
        let tree = uniform(&f, lo, -lo);
        assert_eq!(tree.leaf_count(), 8);
        let simplices: Vec<_> = tree.simplices(&f).collect();
        assert_eq!(simplices.len(), 8 * (3 * 8 + 3 * 16));
    }

    #[test]
    fn test_covering() {
        // Adaptive quadtree around a diagonal line
        let f = |p: &Vector2<f64>| p.x + 0.5 * p.y - 0.2;
        let settings = Settings {
            min_depth: 2,
            max_cells: 100,
            ..Settings::default()
        };
        let tree = Tree::build(
            &f,
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 1.0),
            &settings,
        )
        .unwrap();
        let depths: HashSet<_> =
            tree.leaves().map(|c| tree[c].depth()).collect();
        assert!(depths.len() > 1);

        // Deduplicated triangles tile the root cell exactly
        let mut seen = HashSet::new();
        let mut area = 0.0;
        for s in tree.simplices(&f) {
            if !seen.insert(key(&s)) {
                continue;
            }
            let [a, b, c] = [0, 1, 2].map(|i| s.vertices()[i].pos);
            let (u, v) = (b - a, c - a);
            let signed = u.x * v.y - u.y * v.x;
            assert!(signed != 0.0);
            area += signed.abs() / 2.0;
        }
        assert_relative_eq!(area, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_samples() {
        let f = |p: &Vector2<f64>| p.x * p.x - p.y;
        let lo = Vector2::new(-1.0, -1.0);
        let tree = uniform(&f, lo, -lo);
        for s in tree.simplices(&f) {
            assert!(!s.is_undefined());
            for v in s.vertices() {
                assert_eq!(v.value, f(&v.pos));
            }
        }
    }
}
