use crate::util::linalg::Vec2;
use std::fmt;

/// A closed interval `[min, max]` of projected scalar values.
///
/// Both predicates are inclusive, so ranges that merely touch intersect:
///
/// ```
/// use ggshape::util::range::Range;
///
/// let a = Range::new(0.0, 1.0);
/// assert!(a.intersects(&Range::new(1.0, 2.0)));
/// assert!(a.contains(1.0));
/// assert!(!a.contains(1.5));
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Range {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// The smallest range covering every value, or `None` if there are no values.
    pub fn of_values<I: IntoIterator<Item = f32>>(values: I) -> Option<Self> {
        let mut iter = values.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::new(first, first), |range, value| {
            Self::new(range.min.min(value), range.max.max(value))
        }))
    }

    /// Projects every vertex onto `axis` and takes the extent of the dot products.
    pub fn of_projection<I: IntoIterator<Item = Vec2>>(vertices: I, axis: Vec2) -> Option<Self> {
        Self::of_values(vertices.into_iter().map(|vertex| axis.dot(vertex)))
    }

    pub fn around(centre: f32, half_width: f32) -> Self {
        Self::new(centre - half_width, centre + half_width)
    }

    pub fn intersects(&self, other: &Range) -> bool {
        self.min <= other.max && other.min <= self.max
    }

    pub fn contains(&self, value: f32) -> bool {
        self.min <= value && value <= self.max
    }

    pub fn len(&self) -> f32 {
        self.max - self.min
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn of_values_takes_extremes() {
        let range = Range::of_values([3.0, -1.0, 2.0, 7.5]).unwrap();
        assert_eq!(range, Range::new(-1.0, 7.5));
        assert_eq!(range.len(), 8.5);
        assert!(Range::of_values(std::iter::empty()).is_none());
    }

    #[test]
    fn projection_uses_dot_product() {
        let vertices = [
            Vec2 { x: 1.0, y: 1.0 },
            Vec2 { x: -2.0, y: 0.5 },
            Vec2 { x: 0.0, y: -3.0 },
        ];
        let on_x = Range::of_projection(vertices, Vec2 { x: 1.0, y: 0.0 }).unwrap();
        assert_eq!(on_x, Range::new(-2.0, 1.0));
        let on_y = Range::of_projection(vertices, Vec2 { x: 0.0, y: 1.0 }).unwrap();
        assert_eq!(on_y, Range::new(-3.0, 1.0));
    }

    #[test]
    fn intersection_is_closed() {
        let a = Range::new(0.0, 1.0);
        assert!(a.intersects(&Range::new(0.5, 3.0)));
        assert!(a.intersects(&Range::new(-2.0, 0.0)));
        assert!(a.intersects(&Range::new(0.25, 0.75)));
        assert!(Range::new(0.25, 0.75).intersects(&a));
        assert!(!a.intersects(&Range::new(1.0001, 2.0)));
        assert!(!Range::new(1.0001, 2.0).intersects(&a));
    }

    #[test]
    fn containment_is_closed() {
        let a = Range::around(0.0, 2.0);
        assert!(a.contains(-2.0));
        assert!(a.contains(2.0));
        assert!(a.contains(0.0));
        assert!(!a.contains(2.0001));
    }
}
