pub mod collidable;
pub mod collision_shape;
pub mod half_edge_structure;
pub mod polyhedron_mesh;
pub mod ray;
pub mod shape;

// Convex shape primitives
pub mod box_shape;
pub mod capsule;
pub mod convex_mesh;
pub mod sphere;
