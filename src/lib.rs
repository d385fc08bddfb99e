//! Convex collision geometry and contact aggregation.
//!
//! Convex shapes answer the geometric queries a narrow phase needs (support points,
//! containment, ray casts, bounds and inertia). Contact manifolds found for an overlapping
//! pair are handed to client callbacks through a transient, pool allocated list.

pub mod config;
pub mod error;
pub mod physics;
pub mod utilities;

pub use config::CollisionConfig;
pub use error::{CollisionError, Result};
