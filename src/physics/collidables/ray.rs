use glam::Vec3;

/// Data for a single ray cast in a shape's local space.
///
/// Hits are reported as parametric distances along `direction`, so a non-unit direction
/// scales `t` accordingly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    /// Largest parametric distance that still counts as a hit.
    pub maximum_t: f32,
}

impl Ray {
    /// Creates a ray with no upper bound on its hit distance.
    #[inline(always)]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            maximum_t: f32::MAX,
        }
    }

    /// Creates a ray that only reports hits up to `maximum_t`.
    #[inline(always)]
    pub fn with_maximum_t(origin: Vec3, direction: Vec3, maximum_t: f32) -> Self {
        Self {
            origin,
            direction,
            maximum_t,
        }
    }

    /// Creates a ray covering the segment from `start` to `end`; hits have `t` in [0, 1].
    #[inline(always)]
    pub fn from_segment(start: Vec3, end: Vec3) -> Self {
        Self::with_maximum_t(start, end - start, 1.0)
    }

    #[inline(always)]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::Z)
    }
}

/// Result of a successful ray test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Parametric distance of the impact along the ray direction.
    pub t: f32,
    /// Surface normal at the impact. Not necessarily normalized for rays starting inside a shape.
    pub normal: Vec3,
}
