//! Axis-aligned bounding boxes.

use glam::Vec3;

/// World-space axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    #[must_use]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Geometric center, used as an object's representative world location
    /// when it owns mesh geometry.
    #[inline]
    #[must_use]
    pub fn origin(&self) -> Vec3 {
        self.min + self.size() * 0.5
    }

    /// Smallest box enclosing both inputs.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Strict interior containment, per axis.
    #[must_use]
    pub fn contains(&self, p: Vec3) -> bool {
        p.x > self.min.x
            && p.x < self.max.x
            && p.y > self.min.y
            && p.y < self.max.y
            && p.z > self.min.z
            && p.z < self.max.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_is_center() {
        let b = BoundingBox::new(Vec3::new(-2.0, 0.0, 4.0), Vec3::new(2.0, 2.0, 8.0));
        assert_eq!(b.origin(), Vec3::new(0.0, 1.0, 6.0));
    }

    #[test]
    fn contains_checks_each_axis_against_its_own_bounds() {
        // A flat wide box: y extent is much smaller than x extent. A point
        // inside in x/z but above the box in y must be rejected.
        let b = BoundingBox::new(Vec3::new(-10.0, 0.0, -10.0), Vec3::new(10.0, 1.0, 10.0));
        assert!(b.contains(Vec3::new(5.0, 0.5, 5.0)));
        assert!(!b.contains(Vec3::new(5.0, 5.0, 5.0)), "y out of bounds");
        assert!(!b.contains(Vec3::new(5.0, 0.5, -20.0)), "z out of bounds");
        assert!(!b.contains(Vec3::new(-20.0, 0.5, 5.0)), "x out of bounds");
    }

    #[test]
    fn union_encloses_both() {
        let a = BoundingBox::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let b = BoundingBox::new(Vec3::ZERO, Vec3::splat(3.0));
        let u = a.union(&b);
        assert_eq!(u.min, Vec3::splat(-1.0));
        assert_eq!(u.max, Vec3::splat(3.0));
    }
}
