pub mod collision_callback;
pub mod contact_manifold;
pub mod contact_manifold_set;
pub mod overlapping_pair;
pub mod polyhedron_queries;
pub mod support_finder;
