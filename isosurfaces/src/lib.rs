//! Adaptive extraction of isolines and isosurfaces from black-box scalar
//! fields.
//!
//! A **field** is any function `f(p) -> f64` over 2D or 3D space; this crate
//! finds the curve (in 2D) or surface (in 3D) where `f(p) = 0`.  The field is
//! treated as a black box: it's only ever sampled at points, so it may be
//! arbitrarily complicated, and it may return `NaN` wherever it's undefined.
//!
//! Extraction runs in three stages:
//!
//! - Build an adaptive [`Tree`] over the region of interest, subdividing
//!   cells whose corners show a sign change or the edge of the field's domain.
//!   See [`Tree::build`].
//! - Split the tree's leaves into simplices (triangles or tetrahedra) which
//!   meet edge-to-edge across depth boundaries.  See [`Tree::simplices`].
//! - March each simplex, using bisection to place each vertex of the output
//!   onto the zero level.  See [`march::march`].
//!
//! In 2D, the resulting segments are then stitched into polylines:
//! ```
//! use isosurfaces::{Settings, extract_isoline};
//! use nalgebra::Vector2;
//!
//! let circle = |p: &Vector2<f64>| p.norm_squared() - 1.0;
//! let lines = extract_isoline(
//!     &circle,
//!     Vector2::new(-2.0, -2.0),
//!     Vector2::new(2.0, 2.0),
//!     &Settings::default(),
//! )?;
//! assert_eq!(lines.len(), 1);
//!
//! let line = &lines[0];
//! assert_eq!(line.first(), line.last()); // closed loop
//! for p in line {
//!     assert!((p.norm() - 1.0).abs() < 0.01);
//! }
//! # Ok::<(), isosurfaces::Error>(())
//! ```
//!
//! In 3D, the output is a triangle soup:
//! ```
//! use isosurfaces::{Settings, extract_isosurface};
//! use nalgebra::Vector3;
//!
//! let sphere = |p: &Vector3<f64>| p.norm_squared() - 1.0;
//! let settings = Settings {
//!     min_depth: 3,
//!     max_cells: 2000,
//!     ..Settings::default()
//! };
//! let tris = extract_isosurface(
//!     &sphere,
//!     Vector3::new(-2.0, -2.0, -2.0),
//!     Vector3::new(2.0, 2.0, 2.0),
//!     &settings,
//! )?;
//! assert!(!tris.is_empty());
//! # Ok::<(), isosurfaces::Error>(())
//! ```
//!
//! The tree only looks at cell corners when deciding whether to subdivide, so
//! features smaller than the coarsest cells (set by
//! [`Settings::min_depth`]) can be missed entirely.
#![warn(missing_docs)]

pub mod cell;
pub mod contour;
pub mod march;
pub mod root;
pub mod simplex;
pub mod tree;
pub mod types;

mod error;
mod point;
mod settings;
mod walk;

pub use contour::Polyline;
pub use error::Error;
pub use point::{Field, SampledPoint};
pub use settings::{Settings, ThreadPool};
pub use tree::Tree;

use log::debug;
use nalgebra::{SVector, Vector2, Vector3};

/// A single triangle of an isosurface
pub type Triangle = [Vector3<f64>; 3];

/// Marches every simplex in the tree, in the order they're generated
fn march_tree<const D: usize, F: Field<D> + ?Sized>(
    tree: &Tree<D>,
    field: &F,
) -> Vec<march::Facet<D>> {
    let mut simplex_count = 0;
    let out: Vec<_> = tree
        .simplices(field)
        .inspect(|_| simplex_count += 1)
        .flat_map(|s| march::march(&s, field, tree.tol()))
        .collect();
    debug!("marched {simplex_count} simplices into {} facets", out.len());
    out
}

/// Finds segments along the zero level of a 2D field, without stitching
///
/// Each segment appears once per simplex that produced it, so most segments
/// are duplicated.
///
/// # Panics
/// If root isolation converges onto a discontinuity rather than a zero (see
/// [`march::crossings`])
pub fn extract_segments<F: Field<2> + ?Sized>(
    field: &F,
    pmin: Vector2<f64>,
    pmax: Vector2<f64>,
    settings: &Settings<2>,
) -> Result<Vec<[Vector2<f64>; 2]>, Error> {
    let tree = Tree::build(field, pmin, pmax, settings)?;
    Ok(march_tree(&tree, field)
        .into_iter()
        .map(|f| [f[0], f[1]])
        .collect())
}

/// Finds polylines along the zero level of a 2D field
///
/// # Panics
/// Under the same conditions as [`extract_segments`]
pub fn extract_isoline<F: Field<2> + ?Sized>(
    field: &F,
    pmin: Vector2<f64>,
    pmax: Vector2<f64>,
    settings: &Settings<2>,
) -> Result<Vec<Polyline>, Error> {
    let segments = extract_segments(field, pmin, pmax, settings)?;
    Ok(contour::stitch(&segments))
}

/// Finds triangles along the zero level of a 3D field
///
/// The output is an unindexed triangle soup, which includes duplicates
/// wherever neighboring leaves both produce the same triangle.
///
/// # Panics
/// If root isolation converges onto a discontinuity rather than a zero (see
/// [`march::crossings`])
pub fn extract_isosurface<F: Field<3> + ?Sized>(
    field: &F,
    pmin: Vector3<f64>,
    pmax: Vector3<f64>,
    settings: &Settings<3>,
) -> Result<Vec<Triangle>, Error> {
    let tree = Tree::build(field, pmin, pmax, settings)?;
    Ok(march_tree(&tree, field)
        .into_iter()
        .map(|f| [f[0], f[1], f[2]])
        .collect())
}

/// Returns the bounding boxes of every leaf in a tree, in depth-first order
///
/// This is mostly useful for debugging and visualization.
pub fn leaf_bounds<const D: usize>(
    tree: &Tree<D>,
) -> Vec<(SVector<f64, D>, SVector<f64, D>)> {
    tree.leaves()
        .map(|c| (tree[c].pmin(), tree[c].pmax()))
        .collect()
}
