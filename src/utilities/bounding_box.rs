use glam::Vec3;
use std::fmt;

/// Provides simple axis-aligned bounding box functionality.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    /// Location with the lowest X, Y, and Z coordinates in the axis-aligned bounding box.
    pub min: Vec3,
    /// Location with the highest X, Y, and Z coordinates in the axis-aligned bounding box.
    pub max: Vec3,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            min: Vec3::ZERO,
            max: Vec3::ZERO,
        }
    }
}

impl BoundingBox {
    /// Constructs a bounding box from the specified minimum and maximum.
    #[inline]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Creates the smallest possible bounding box that contains a list of points.
    /// Returns `None` for an empty list.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut min = *first;
        let mut max = min;
        for point in rest {
            min = min.min(*point);
            max = max.max(*point);
        }
        Some(Self { min, max })
    }

    /// Creates the smallest box containing every point after scaling it componentwise.
    pub fn from_scaled_points(points: &[Vec3], scaling: Vec3) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut min = *first * scaling;
        let mut max = min;
        for point in rest {
            let scaled = *point * scaling;
            min = min.min(scaled);
            max = max.max(scaled);
        }
        Some(Self { min, max })
    }

    /// Gets the full size of the box along each axis.
    #[inline]
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Gets half the size of the box along each axis.
    #[inline]
    pub fn half_extent(&self) -> Vec3 {
        0.5 * (self.max - self.min)
    }

    /// Gets the center of the box.
    #[inline]
    pub fn center(&self) -> Vec3 {
        0.5 * (self.min + self.max)
    }

    /// Returns the box grown by `margin` on every side.
    #[inline]
    pub fn expanded(&self, margin: f32) -> Self {
        let margin = Vec3::splat(margin);
        Self {
            min: self.min - margin,
            max: self.max + margin,
        }
    }

    /// Determines if a bounding box intersects another bounding box.
    #[inline]
    pub fn intersects(a: &Self, b: &Self) -> bool {
        Self::intersects_bounds(a.min, a.max, b.min, b.max)
    }

    /// Determines if a bounding box intersects another bounding box.
    #[inline]
    pub fn intersects_bounds(min_a: Vec3, max_a: Vec3, min_b: Vec3, max_b: Vec3) -> bool {
        let no_intersection_on_axes = max_a.cmplt(min_b) | max_b.cmplt(min_a);
        !no_intersection_on_axes.any()
    }

    /// Computes the volume of the bounding box.
    #[inline]
    pub fn compute_volume(&self) -> f32 {
        let diagonal = self.max - self.min;
        diagonal.x * diagonal.y * diagonal.z
    }

    /// Computes a bounding box which contains two other bounding boxes.
    #[inline]
    pub fn create_merged(a: &Self, b: &Self) -> Self {
        Self {
            min: a.min.min(b.min),
            max: a.max.max(b.max),
        }
    }

    /// Determines whether the point lies within the box, boundary included.
    #[inline]
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_points_spans_all_points() {
        let points = [
            Vec3::new(1.0, -2.0, 0.5),
            Vec3::new(-1.0, 3.0, 0.0),
            Vec3::new(0.0, 0.0, -4.0),
        ];
        let bounds = BoundingBox::from_points(&points).unwrap();
        assert_eq!(bounds.min, Vec3::new(-1.0, -2.0, -4.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 3.0, 0.5));
        assert!(BoundingBox::from_points(&[]).is_none());
    }

    #[test]
    fn scaled_points_flip_with_negative_scale() {
        let points = [Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO];
        let bounds = BoundingBox::from_scaled_points(&points, Vec3::new(-1.0, 2.0, 1.0)).unwrap();
        assert_eq!(bounds.min, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(0.0, 4.0, 3.0));
    }

    #[test]
    fn intersection_and_point_containment() {
        let outer = BoundingBox::new(Vec3::splat(-2.0), Vec3::splat(2.0));
        let touching = BoundingBox::new(Vec3::splat(2.0), Vec3::splat(3.0));
        let far = BoundingBox::new(Vec3::splat(5.0), Vec3::splat(6.0));
        assert!(BoundingBox::intersects(&outer, &touching));
        assert!(!BoundingBox::intersects(&outer, &far));
        assert!(outer.contains_point(Vec3::new(2.0, 0.0, -2.0)));
        assert!(!outer.contains_point(Vec3::new(2.1, 0.0, 0.0)));
    }

    #[test]
    fn expanded_and_merged() {
        let a = BoundingBox::new(Vec3::ZERO, Vec3::ONE).expanded(0.5);
        assert_eq!(a.min, Vec3::splat(-0.5));
        assert_eq!(a.extent(), Vec3::splat(2.0));
        let b = BoundingBox::new(Vec3::splat(3.0), Vec3::splat(4.0));
        let merged = BoundingBox::create_merged(&a, &b);
        assert_eq!(merged.min, Vec3::splat(-0.5));
        assert_eq!(merged.max, Vec3::splat(4.0));
        assert_eq!(b.compute_volume(), 1.0);
    }
}
