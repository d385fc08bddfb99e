//! Error types for collision geometry and contact reporting.

use std::fmt;

use thiserror::Error;

/// Topology element addressed by an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyElement {
    Face,
    Vertex,
    HalfEdge,
}

impl fmt::Display for TopologyElement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TopologyElement::Face => write!(f, "face"),
            TopologyElement::Vertex => write!(f, "vertex"),
            TopologyElement::HalfEdge => write!(f, "half-edge"),
        }
    }
}

/// Collision core errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CollisionError {
    /// The matrix has no inverse.
    #[error("Matrix is singular (determinant {determinant})")]
    SingularMatrix { determinant: f32 },

    /// The local bounds have a non-positive extent along some axis.
    #[error("Shape bounds are degenerate (half extent {extent:?})")]
    DegenerateBounds { extent: [f32; 3] },

    /// A topology accessor was given an index at or beyond the element count.
    #[error("{kind} index {index} is out of range (count {count})")]
    IndexOutOfRange {
        kind: TopologyElement,
        index: usize,
        count: usize,
    },

    /// Mesh input does not describe a closed convex polyhedron.
    #[error("Invalid polyhedron mesh: {0}")]
    InvalidMesh(String),

    /// The manifold already holds its maximum number of contacts.
    #[error("Contact manifold is full (capacity {capacity})")]
    ManifoldFull { capacity: usize },

    /// Manifolds without contacts are never stored in a manifold set.
    #[error("Contact manifold has no contact points")]
    EmptyManifold,

    /// The memory pool could not serve the request.
    #[error("Failed to allocate {size} bytes aligned to {align}")]
    AllocationFailed { size: usize, align: usize },
}

/// Result type for collision core operations.
pub type Result<T> = std::result::Result<T, CollisionError>;
