//! Strongly-typed indexes of various flavors
//!
//! Corners of a `D`-dimensional cell are numbered by bit pattern: bit `a` of a
//! corner index is set when that corner sits at the upper end of axis `a`.  In
//! 2D this gives
//!
//! ```text
//!      2----------3        Y
//!      |          |        ^
//!      |          |        |
//!      |          |        ---> X
//!      0----------1
//! ```
//!
//! and in 3D
//!
//! ```text
//!         6 -------- 7
//!        /          /       Z
//!       / |        / |      ^  _ Y
//!      4----------5  |      | /
//!      |  |       |  |      |/
//!      |  2-------|--3      ---> X
//!      | /        | /
//!      |/         |/
//!      0----------1
//! ```
//!
//! Children of a cell are numbered equivalently, based on the corner that
//! they share with their parent.

/// A single axis, represented as a `u8` with one bit (between 0 and `D`) set
///
/// These invariants are enforced at construction
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Axis<const D: usize>(u8);

impl<const D: usize> Axis<D> {
    /// Builds a new axis from its index (0 for X, 1 for Y, 2 for Z)
    ///
    /// ```
    /// # use isosurfaces::types::Axis;
    /// const X: Axis<3> = Axis::new(0);
    /// const Z: Axis<3> = Axis::new(2);
    /// ```
    ///
    /// # Panics
    /// If the index is not a valid axis in `D` dimensions
    ///
    /// ```compile_fail
    /// # use isosurfaces::types::Axis;
    /// const Z: Axis<2> = Axis::new(2);
    /// ```
    pub const fn new(i: usize) -> Self {
        assert!(i < D);
        Self(1 << i)
    }

    /// Converts from a bitmask to an index
    pub fn index(self) -> usize {
        self.0.trailing_zeros() as usize
    }

    /// Iterates over all `D` axes
    pub fn iter() -> impl Iterator<Item = Self> {
        (0..D).map(|i| Axis(1 << i))
    }
}

/// Strongly-typed cell corner, in the `[0, 2**D)` range
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Corner<const D: usize>(u8);

impl<const D: usize> Corner<D> {
    /// Number of corners in a `D`-dimensional cell
    pub const COUNT: usize = 1 << D;

    /// Builds a new corner
    ///
    /// # Panics
    /// If `i >= 2**D`, which is not a valid corner index
    pub const fn new(i: u8) -> Self {
        assert!((i as usize) < (1 << D));
        Self(i)
    }

    /// Returns the value of this corner as an index
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterates over all `2**D` corners
    pub fn iter() -> impl Iterator<Item = Self> {
        (0..(1u8 << D)).map(Corner)
    }

    /// Returns the corner on the opposite side of the given axis
    pub fn flip(self, axis: Axis<D>) -> Self {
        Corner(self.0 ^ axis.0)
    }
}

impl<const D: usize> std::ops::BitAnd<Axis<D>> for Corner<D> {
    type Output = bool;
    fn bitand(self, rhs: Axis<D>) -> bool {
        (self.0 & rhs.0) != 0
    }
}

impl<const D: usize> std::ops::BitAnd<Corner<D>> for Axis<D> {
    type Output = bool;
    fn bitand(self, rhs: Corner<D>) -> bool {
        (self.0 & rhs.0) != 0
    }
}

impl<const D: usize> std::ops::BitOr<Axis<D>> for Corner<D> {
    type Output = Self;
    fn bitor(self, rhs: Axis<D>) -> Self {
        Corner(self.0 | rhs.0)
    }
}

impl<const D: usize> From<Axis<D>> for Corner<D> {
    fn from(a: Axis<D>) -> Self {
        Corner(a.0)
    }
}
