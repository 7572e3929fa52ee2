//! Points in k-dimensional Euclidean space with exact decimal coordinates.

#![warn(missing_docs)]

use std::fmt;

use rust_decimal::{Decimal, MathematicalOps};

use crate::error::{PointIndexError, Result};

/// A point in k-dimensional Euclidean space.
///
/// Coordinates are [`Decimal`]s, so distance calculations and coordinate
/// comparisons are exact and tie-breaking near hyperplane or quadrant
/// boundaries is deterministic. The dimensionality is fixed at construction;
/// binary operations on points of different dimensionalities are rejected
/// rather than silently truncated.
///
/// Points are immutable once constructed. Trees clone points on insert and
/// clone them back out of query results, so no caller ever aliases a stored
/// coordinate buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Point {
    coords: Vec<Decimal>,
}

impl Point {
    /// Create a point from its coordinates.
    ///
    /// Returns an error if `coords` is empty: every point needs a positive
    /// dimensionality.
    pub fn new(coords: Vec<Decimal>) -> Result<Self> {
        if coords.is_empty() {
            return Err(PointIndexError::InvalidConfig(
                "points need a positive dimensionality".to_string(),
            ));
        }
        Ok(Self { coords })
    }

    /// Create the origin of a k-dimensional space.
    pub fn origin(dims: usize) -> Result<Self> {
        Self::new(vec![Decimal::ZERO; dims])
    }

    /// Create a 2-D point. Convenient for quadtree work, which is always 2-D.
    pub fn xy(x: impl Into<Decimal>, y: impl Into<Decimal>) -> Self {
        Self {
            coords: vec![x.into(), y.into()],
        }
    }

    /// The dimensionality of this point.
    pub fn dims(&self) -> usize {
        self.coords.len()
    }

    /// The coordinate value on the given axis.
    ///
    /// # Panics
    ///
    /// Panics if `dim >= self.dims()`.
    pub fn coord(&self, dim: usize) -> Decimal {
        self.coords[dim]
    }

    /// All coordinates of this point, in axis order.
    pub fn coords(&self) -> &[Decimal] {
        &self.coords
    }

    /// The squared Euclidean distance between this point and `other`.
    ///
    /// This is exact. Returns an error when the two points disagree on
    /// dimensionality.
    pub fn distance_squared(&self, other: &Point) -> Result<Decimal> {
        self.check_dims(other)?;
        Ok(sq_dist(self, other))
    }

    /// The Euclidean distance between this point and `other`.
    ///
    /// Root extraction rounds to [`Decimal`] precision, so prefer
    /// [`distance_squared`][Self::distance_squared] when comparing distances.
    pub fn distance(&self, other: &Point) -> Result<Decimal> {
        Ok(self
            .distance_squared(other)?
            .sqrt()
            .unwrap_or(Decimal::MAX))
    }

    pub(crate) fn check_dims(&self, other: &Point) -> Result<()> {
        if self.dims() != other.dims() {
            return Err(PointIndexError::DimensionMismatch {
                expected: self.dims(),
                actual: other.dims(),
            });
        }
        Ok(())
    }
}

/// The 2-D origin.
impl Default for Point {
    fn default() -> Self {
        Self {
            coords: vec![Decimal::ZERO; 2],
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, coord) in self.coords.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", coord)?;
        }
        write!(f, ")")
    }
}

/// Squared Euclidean distance between two points of equal dimensionality.
#[inline]
pub(crate) fn sq_dist(a: &Point, b: &Point) -> Decimal {
    debug_assert_eq!(a.dims(), b.dims());
    a.coords
        .iter()
        .zip(&b.coords)
        .fold(Decimal::ZERO, |sum, (x, y)| sum + (*x - *y) * (*x - *y))
}
