//! Rectangle and interval geometry with set algebra.
//!
//! Shapes and table cells report their placement as points on the slide
//! plane; capture, merge detection, and layout probing all reduce to
//! interval/rectangle algebra over those values.

use crate::common::{Error, Result};
use serde::{Deserialize, Serialize};

/// Axis selector for projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal (left/width)
    X,
    /// Vertical (top/height)
    Y,
}

/// A closed 1-D interval `[start, end]`.
///
/// `end >= start` is an invariant; constructors normalize the endpoint
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    /// Lower endpoint
    pub start: f64,
    /// Upper endpoint
    pub end: f64,
}

impl Interval {
    /// Create an interval, normalizing endpoint order.
    #[inline]
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Interval length.
    #[inline]
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// Bounding union of two intervals.
    #[inline]
    pub fn cover(&self, other: &Interval) -> Interval {
        Interval {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Intersection of two intervals.
    ///
    /// Endpoint-touching intervals intersect at a single point. Disjoint
    /// intervals fail with [`Error::EmptySet`].
    pub fn intersection(&self, other: &Interval) -> Result<Interval> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start > end {
            return Err(Error::EmptySet);
        }
        Ok(Interval { start, end })
    }

    /// Intersection length over union length; 0.0 when disjoint.
    pub fn intersection_over_union(&self, other: &Interval) -> f64 {
        let inter = match self.intersection(other) {
            Ok(i) => i.length(),
            Err(_) => return 0.0,
        };
        let union = self.length() + other.length() - inter;
        if union <= 0.0 {
            // Two coincident points still fully overlap.
            return 1.0;
        }
        inter / union
    }
}

/// An axis-aligned rectangle `{left, top, width, height}`.
///
/// Width and height are non-negative; constructors normalize from corner
/// points. An empty intersection is a distinguishable error, not a
/// zero-sized rectangle.
///
/// # Examples
///
/// ```rust
/// use longan::Rect;
///
/// let a = Rect::new(0.0, 0.0, 10.0, 10.0);
/// let b = Rect::new(5.0, 5.0, 10.0, 10.0);
/// let c = a.cover(&b);
/// assert_eq!((c.width, c.height), (15.0, 15.0));
/// assert!(a.intersection_over_union(&b, None) > 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub left: f64,
    /// Top edge
    pub top: f64,
    /// Width (non-negative)
    pub width: f64,
    /// Height (non-negative)
    pub height: f64,
}

impl Rect {
    /// Create a rectangle; negative extents are folded back into the
    /// origin so the non-negativity invariant holds.
    #[inline]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        let (left, width) = if width < 0.0 { (left + width, -width) } else { (left, width) };
        let (top, height) = if height < 0.0 { (top + height, -height) } else { (top, height) };
        Self { left, top, width, height }
    }

    /// Create a rectangle from two corner points.
    #[inline]
    pub fn from_points(p1: (f64, f64), p2: (f64, f64)) -> Self {
        Self::new(p1.0.min(p2.0), p1.1.min(p2.1), (p1.0 - p2.0).abs(), (p1.1 - p2.1).abs())
    }

    /// Right edge.
    #[inline]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge.
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> (f64, f64) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// Area.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Project onto one axis.
    #[inline]
    pub fn project(&self, axis: Axis) -> Interval {
        match axis {
            Axis::X => Interval::new(self.left, self.right()),
            Axis::Y => Interval::new(self.top, self.bottom()),
        }
    }

    /// Bounding union of two rectangles.
    pub fn cover(&self, other: &Rect) -> Rect {
        let left = self.left.min(other.left);
        let top = self.top.min(other.top);
        // Extents are measured from the common origin so that covering a
        // rectangle with itself reproduces it bit-for-bit.
        let width = (self.left - left + self.width).max(other.left - left + other.width);
        let height = (self.top - top + self.height).max(other.top - top + other.height);
        Rect::new(left, top, width, height)
    }

    /// Intersection of two rectangles.
    ///
    /// Edge-touching rectangles intersect in a degenerate (zero-extent)
    /// rectangle; fully disjoint ones fail with [`Error::EmptySet`].
    pub fn intersection(&self, other: &Rect) -> Result<Rect> {
        let x = self.project(Axis::X).intersection(&other.project(Axis::X))?;
        let y = self.project(Axis::Y).intersection(&other.project(Axis::Y))?;
        Ok(Rect::new(x.start, y.start, x.length(), y.length()))
    }

    /// Intersection over union.
    ///
    /// With an axis given, both rectangles are first projected onto that
    /// axis and the 1-D ratio is returned.
    pub fn intersection_over_union(&self, other: &Rect, axis: Option<Axis>) -> f64 {
        if let Some(axis) = axis {
            return self.project(axis).intersection_over_union(&other.project(axis));
        }
        let inter = match self.intersection(other) {
            Ok(r) => r.area(),
            Err(_) => return 0.0,
        };
        let union = self.area() + other.area() - inter;
        if union <= 0.0 {
            return 1.0;
        }
        inter / union
    }

    /// Intersection area over bounding-cover area; 0.0 when disjoint.
    pub fn intersection_over_cover(&self, other: &Rect) -> f64 {
        let inter = match self.intersection(other) {
            Ok(r) => r.area(),
            Err(_) => return 0.0,
        };
        let cover = self.cover(other).area();
        if cover <= 0.0 {
            return 1.0;
        }
        inter / cover
    }

    /// Whether two rectangles coincide within `tolerance` on every edge.
    pub fn approx_eq(&self, other: &Rect, tolerance: f64) -> bool {
        (self.left - other.left).abs() <= tolerance
            && (self.top - other.top).abs() <= tolerance
            && (self.width - other.width).abs() <= tolerance
            && (self.height - other.height).abs() <= tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_interval_cover_and_intersection() {
        let a = Interval::new(0.0, 5.0);
        let b = Interval::new(3.0, 10.0);
        assert_eq!(a.cover(&b), Interval::new(0.0, 10.0));
        assert_eq!(a.intersection(&b).unwrap(), Interval::new(3.0, 5.0));
    }

    #[test]
    fn test_interval_touching_endpoints_intersect_at_point() {
        let a = Interval::new(0.0, 5.0);
        let b = Interval::new(5.0, 9.0);
        let i = a.intersection(&b).unwrap();
        assert_eq!(i.length(), 0.0);
    }

    #[test]
    fn test_interval_disjoint_is_empty_set() {
        let a = Interval::new(0.0, 1.0);
        let b = Interval::new(2.0, 3.0);
        assert!(matches!(a.intersection(&b), Err(Error::EmptySet)));
    }

    #[test]
    fn test_rect_negative_extent_normalized() {
        let r = Rect::new(10.0, 10.0, -4.0, -2.0);
        assert_eq!(r, Rect::new(6.0, 8.0, 4.0, 2.0));
    }

    #[test]
    fn test_rect_disjoint_iou_zero() {
        let a = Rect::new(0.0, 0.0, 1.0, 1.0);
        let b = Rect::new(5.0, 5.0, 1.0, 1.0);
        assert_eq!(a.intersection_over_union(&b, None), 0.0);
        assert!(matches!(a.intersection(&b), Err(Error::EmptySet)));
    }

    #[test]
    fn test_rect_identical_iou_one() {
        let a = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(a.intersection_over_union(&a, None), 1.0);
    }

    #[test]
    fn test_axis_projection_iou() {
        // Overlap on x, disjoint on y.
        let a = Rect::new(0.0, 0.0, 10.0, 1.0);
        let b = Rect::new(0.0, 5.0, 10.0, 1.0);
        assert_eq!(a.intersection_over_union(&b, Some(Axis::X)), 1.0);
        assert_eq!(a.intersection_over_union(&b, Some(Axis::Y)), 0.0);
    }

    #[test]
    fn test_intersection_over_cover() {
        let a = Rect::new(0.0, 0.0, 2.0, 2.0);
        let b = Rect::new(1.0, 0.0, 2.0, 2.0);
        // Intersection 1x2 = 2, cover 3x2 = 6.
        assert!((a.intersection_over_cover(&b) - 2.0 / 6.0).abs() < 1e-12);
    }

    fn arb_rect() -> impl Strategy<Value = Rect> {
        (
            -100.0f64..100.0,
            -100.0f64..100.0,
            0.0f64..50.0,
            0.0f64..50.0,
        )
            .prop_map(|(l, t, w, h)| Rect::new(l, t, w, h))
    }

    proptest! {
        #[test]
        fn cover_is_idempotent_and_commutative(a in arb_rect(), b in arb_rect()) {
            prop_assert_eq!(a.cover(&a), a);
            prop_assert_eq!(a.cover(&b), b.cover(&a));
        }

        #[test]
        fn intersection_is_commutative(a in arb_rect(), b in arb_rect()) {
            match (a.intersection(&b), b.intersection(&a)) {
                (Ok(x), Ok(y)) => prop_assert_eq!(x, y),
                (Err(_), Err(_)) => {}
                _ => prop_assert!(false, "asymmetric intersection"),
            }
        }

        #[test]
        fn iou_is_bounded(a in arb_rect(), b in arb_rect()) {
            let v = a.intersection_over_union(&b, None);
            prop_assert!((0.0..=1.0 + 1e-9).contains(&v));
        }
    }
}
