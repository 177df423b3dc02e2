//! Marching simplices
//!
//! Each simplex is classified by the signs of its vertices, then a lookup
//! table gives the edges which cross the zero level.  The crossing on each
//! edge is found by bisection (see [`isolate_root`]), and the crossings are
//! assembled into points (1D), segments (2D), or triangles (3D).
use arrayvec::ArrayVec;
use nalgebra::SVector;
use static_assertions::const_assert;

use crate::{
    point::{Field, SampledPoint},
    root::isolate_root,
    simplex::{MAX_SIMPLEX_VERTICES, Simplex},
};

/// Edges of a simplex which cross the zero level, as pairs of vertex indices
type EdgeList = &'static [(u8, u8)];

/// Crossings for a line segment, indexed by sign pattern
const LINE_TABLE: [Option<EdgeList>; 4] = [
    Some(&[]),       // 00
    Some(&[(0, 1)]), // 01
    None,
    None,
];

/// Crossings for a triangle, indexed by sign pattern
const TRI_TABLE: [Option<EdgeList>; 8] = [
    Some(&[]),               // 000
    Some(&[(0, 2), (1, 2)]), // 001
    Some(&[(0, 1), (2, 1)]), // 010
    None,
    Some(&[(1, 0), (2, 0)]), // 100
    None,
    None,
    None,
];

/// Crossings for a tetrahedron, indexed by sign pattern
///
/// Four crossings form a quad, listed in order around its perimeter.
const TET_TABLE: [Option<EdgeList>; 16] = [
    Some(&[]),                               // 0000
    Some(&[(0, 3), (1, 3), (2, 3)]),         // 0001
    Some(&[(0, 2), (1, 2), (3, 2)]),         // 0010
    Some(&[(0, 2), (2, 1), (1, 3), (3, 0)]), // 0011
    Some(&[(0, 1), (2, 1), (3, 1)]),         // 0100
    Some(&[(0, 1), (1, 2), (2, 3), (3, 0)]), // 0101
    Some(&[(0, 1), (1, 3), (3, 2), (2, 0)]), // 0110
    None,
    Some(&[(1, 0), (2, 0), (3, 0)]), // 1000
    None,
    None,
    None,
    None,
    None,
    None,
    None,
];

/// Checks that every pattern is in the table, either directly or through
/// its complement
const fn covers(table: &[Option<EdgeList>]) -> bool {
    let n = table.len();
    let mut i = 0;
    while i < n {
        if table[i].is_none() && table[n - 1 - i].is_none() {
            return false;
        }
        i += 1;
    }
    true
}

const_assert!(covers(&LINE_TABLE));
const_assert!(covers(&TRI_TABLE));
const_assert!(covers(&TET_TABLE));

/// A piece of the output with `D` vertices (a segment in 2D, a triangle in 3D)
pub type Facet<const D: usize> = ArrayVec<SVector<f64, D>, 3>;

/// Returns the sign pattern of a set of vertices
///
/// Vertex 0 is the most significant bit; bits are set for positive values.
pub fn sign_pattern<const D: usize>(vertices: &[SampledPoint<D>]) -> usize {
    vertices
        .iter()
        .fold(0, |id, v| (id << 1) | usize::from(v.is_positive()))
}

/// Looks up the crossing edges for a simplex with the given sign pattern
fn edges<const D: usize>(id: usize) -> EdgeList {
    let table: &[Option<EdgeList>] = match D {
        1 => &LINE_TABLE,
        2 => &TRI_TABLE,
        3 => &TET_TABLE,
        _ => unreachable!("unsupported dimension {D}"),
    };
    let mask = table.len() - 1;
    table[id].or(table[mask ^ id]).unwrap_or(&[])
}

/// Finds every point where the zero level crosses an edge of the simplex
///
/// Points are returned in table order, which is the order around the
/// perimeter of the resulting facet.  A simplex with an undefined vertex has
/// no crossings.
///
/// # Panics
/// If root isolation lands on a discontinuity instead of a zero, which
/// means that `tol` is too coarse to separate the crossing from it.
pub fn crossings<const D: usize, F: Field<D> + ?Sized>(
    simplex: &Simplex<D>,
    field: &F,
    tol: &SVector<f64, D>,
) -> ArrayVec<SampledPoint<D>, MAX_SIMPLEX_VERTICES> {
    if simplex.is_undefined() {
        return ArrayVec::new();
    }
    let vs = simplex.vertices();
    edges::<D>(sign_pattern(vs))
        .iter()
        .map(|&(i, j)| {
            let (a, b) = (vs[i as usize], vs[j as usize]);
            let (pt, is_zero) = isolate_root(a, b, field, tol);
            assert!(is_zero, "no zero between {a} and {b} (found {pt})");
            pt
        })
        .collect()
}

/// Marches a single simplex, returning up to two facets
///
/// # Panics
/// Under the same conditions as [`crossings`]
pub fn march<const D: usize, F: Field<D> + ?Sized>(
    simplex: &Simplex<D>,
    field: &F,
    tol: &SVector<f64, D>,
) -> ArrayVec<Facet<D>, 2> {
    let pts = crossings(simplex, field, tol);
    let mut out = ArrayVec::new();
    if pts.len() == D {
        out.push(pts.iter().map(|p| p.pos).collect());
    } else if pts.len() == 4 {
        // Split the quad along its 1-3 diagonal
        for tri in [[0, 1, 3], [1, 2, 3]] {
            out.push(tri.iter().map(|&i| pts[i].pos).collect());
        }
    }
    out
}
