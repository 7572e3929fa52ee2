#![doc = include_str!("../README.md")]

mod error;
pub mod kdtree;
pub mod knn;
pub mod point;
pub mod quadtree;
mod r#trait;

pub use error::{PointIndexError, Result};
pub use kdtree::KdTree;
pub use point::Point;
pub use quadtree::PrQuadTree;
pub use r#trait::{SpatialDictionary, SpatialQuerySolver};
pub use rust_decimal::Decimal;

#[cfg(test)]
pub(crate) mod test;
