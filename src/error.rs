use std::fmt::Debug;
use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug)]
pub enum PointIndexError {
    /// A constructor or query received a non-positive size parameter.
    #[error("Invalid configuration: {0}.")]
    InvalidConfig(String),

    /// Two points, or a tree and a point, disagree on dimensionality.
    #[error("Dimension mismatch: expected {expected} coordinates, got {actual}.")]
    DimensionMismatch {
        /// The dimensionality the operation expected.
        expected: usize,
        /// The dimensionality it was given.
        actual: usize,
    },

    /// The tree holds no points.
    #[error("The tree is empty.")]
    EmptyTree,
}

pub type Result<T> = std::result::Result<T, PointIndexError>;
