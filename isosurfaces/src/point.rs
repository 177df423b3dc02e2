//! Positions paired with field values
use nalgebra::SVector;

/// A scalar field over `D`-dimensional space
///
/// The field is treated as a black box: it may be evaluated anywhere, and
/// returns `NaN` wherever it is undefined.  Evaluation must be deterministic,
/// since shared cell corners are sampled independently by each cell.
///
/// This is implemented for every `Fn(&SVector<f64, D>) -> f64` closure, so
/// most users won't need to implement it by hand:
///
/// ```
/// use isosurfaces::Field;
/// use nalgebra::Vector2;
///
/// let circle = |p: &Vector2<f64>| p.norm_squared() - 1.0;
/// assert_eq!(circle.eval(&Vector2::new(1.0, 0.0)), 0.0);
/// ```
pub trait Field<const D: usize>: Sync {
    /// Evaluates the field at the given position
    fn eval(&self, p: &SVector<f64, D>) -> f64;
}

impl<const D: usize, F> Field<D> for F
where
    F: Fn(&SVector<f64, D>) -> f64 + Sync,
{
    fn eval(&self, p: &SVector<f64, D>) -> f64 {
        self(p)
    }
}

/// A position associated with the corresponding field value
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SampledPoint<const D: usize> {
    /// Position in space
    pub pos: SVector<f64, D>,
    /// Field value at `pos`, or `NaN` if the field is undefined there
    pub value: f64,
}

impl<const D: usize> SampledPoint<D> {
    /// Evaluates the field at the given position
    pub fn new<F: Field<D> + ?Sized>(pos: SVector<f64, D>, field: &F) -> Self {
        let value = field.eval(&pos);
        Self { pos, value }
    }

    /// Evaluates the field at the midpoint of `a` and `b`
    pub fn midpoint<F: Field<D> + ?Sized>(
        a: &Self,
        b: &Self,
        field: &F,
    ) -> Self {
        Self::new((a.pos + b.pos) / 2.0, field)
    }

    /// Evaluates the field at the linear estimate of the zero between `a` and
    /// `b`, based on their values
    pub fn interpolate_zero<F: Field<D> + ?Sized>(
        a: &Self,
        b: &Self,
        field: &F,
    ) -> Self {
        let denom = a.value - b.value;
        let ka = -b.value / denom;
        let kb = a.value / denom;
        Self::new(a.pos * ka + b.pos * kb, field)
    }

    /// Checks whether the field is undefined at this point
    pub fn is_undefined(&self) -> bool {
        self.value.is_nan()
    }

    /// Checks whether this point is on the positive side of the field
    ///
    /// Zero (and `NaN`) are grouped with the negative side.
    pub fn is_positive(&self) -> bool {
        self.value > 0.0
    }
}

impl<const D: usize> std::fmt::Display for SampledPoint<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, v) in self.pos.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, "; {})", self.value)
    }
}
