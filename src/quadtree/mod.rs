//! A point-region quadtree ("PR-quadtree") over 2-D exact points.

#![warn(missing_docs)]

mod index;
mod node;
mod traversal;

pub use index::PrQuadTree;
pub use node::Quadrant;
pub use traversal::{BlackRef, GrayRef, NodeRef};
