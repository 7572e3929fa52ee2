//! Support types for nearest-neighbor queries.

#![warn(missing_docs)]

use rust_decimal::Decimal;

use crate::point::Point;

mod queue;

pub use queue::{BoundedPriorityQueue, IntoIter, Iter};

/// The best candidate found so far by a nearest-neighbor descent.
#[derive(Debug, Clone)]
pub(crate) struct Nearest {
    pub(crate) point: Point,
    pub(crate) dist_sq: Decimal,
}
