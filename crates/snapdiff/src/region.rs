use serde::Serialize;

/// Edge coordinates `[left, top, right, bottom]` as supplied by callers.
/// Any coordinate may be missing.
pub type EdgeCoordinates = [Option<i64>; 4];

/// Axis-aligned pixel rectangle.
///
/// Edges are inclusive pixel indices: a region built from edges
/// `(11, 3, 48, 20)` covers columns `11..=48` and rows `3..=20`, while its
/// `width`/`height` are the edge distances (`37` x `17`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Region {
    x: i64,
    y: i64,
    width: i64,
    height: i64,
}

impl Region {
    /// Build from the top-left corner and a size. Negative sizes, or a far
    /// edge that does not fit in `i64`, yield `None`.
    pub fn from_corner(x: i64, y: i64, width: i64, height: i64) -> Option<Self> {
        if width < 0 || height < 0 {
            return None;
        }
        x.checked_add(width)?;
        y.checked_add(height)?;
        Some(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Build from edges. `right < left`, `bottom < top`, or a span that
    /// does not fit in `i64` yields `None`.
    pub fn from_edges(left: i64, top: i64, right: i64, bottom: i64) -> Option<Self> {
        if right < left || bottom < top {
            return None;
        }
        Some(Self {
            x: left,
            y: top,
            width: right.checked_sub(left)?,
            height: bottom.checked_sub(top)?,
        })
    }

    /// Build from a caller-supplied coordinate list. Fewer than four
    /// coordinates, or any missing one, yields `None`.
    pub fn from_edge_coordinates(coords: &[Option<i64>]) -> Option<Self> {
        match *coords {
            [Some(left), Some(top), Some(right), Some(bottom)] => {
                Self::from_edges(left, top, right, bottom)
            }
            _ => None,
        }
    }

    pub fn x(&self) -> i64 {
        self.x
    }

    pub fn y(&self) -> i64 {
        self.y
    }

    pub fn width(&self) -> i64 {
        self.width
    }

    pub fn height(&self) -> i64 {
        self.height
    }

    pub fn left(&self) -> i64 {
        self.x
    }

    pub fn top(&self) -> i64 {
        self.y
    }

    pub fn right(&self) -> i64 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i64 {
        self.y.saturating_add(self.height)
    }

    pub fn to_edges(&self) -> [i64; 4] {
        [self.left(), self.top(), self.right(), self.bottom()]
    }

    /// Area used by tolerance checks.
    ///
    /// IMPORTANT: a zero-area region (a single pixel, or a one pixel wide
    /// line) reports `1`, not `0`. Area based tolerances rely on this so a
    /// thin difference is never mistaken for no difference. Do not "fix".
    pub fn size(&self) -> u64 {
        let area = (self.width as u64).saturating_mul(self.height as u64);
        if area == 0 { 1 } else { area }
    }

    /// Overlap test. Touching edges count as overlap.
    pub fn intersects(&self, other: &Region) -> bool {
        self.left() <= other.right()
            && self.right() >= other.left()
            && self.top() <= other.bottom()
            && self.bottom() >= other.top()
    }

    pub fn intersect(&self, other: &Region) -> Option<Region> {
        if !self.intersects(other) {
            return None;
        }
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Self::from_edges(left, top, right, bottom)
    }

    /// Translate by `(dx, dy)`. Edges saturate at the `i64` bounds.
    pub fn move_by(&self, dx: i64, dy: i64) -> Region {
        Region {
            x: self.x.saturating_add(dx).min(i64::MAX - self.width),
            y: self.y.saturating_add(dy).min(i64::MAX - self.height),
            ..*self
        }
    }

    /// Intersect with `other`, expressed in this region's local frame.
    ///
    /// Used to rebase a skip area onto a crop window.
    pub fn relative_intersect(&self, other: &Region) -> Option<Region> {
        let overlap = self.intersect(other)?;
        Some(Region {
            x: overlap.x - self.x,
            y: overlap.y - self.y,
            ..overlap
        })
    }

    /// Inclusive on all four edges.
    pub fn contains_point(&self, x: i64, y: i64) -> bool {
        self.left() <= x && x <= self.right() && self.top() <= y && y <= self.bottom()
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.left(),
            self.top(),
            self.right(),
            self.bottom()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_produce_distance_sizes() {
        let r = Region::from_edges(11, 3, 48, 20).unwrap();
        assert_eq!((r.x(), r.y(), r.width(), r.height()), (11, 3, 37, 17));
        assert_eq!(r.to_edges(), [11, 3, 48, 20]);
        assert_eq!(r.size(), 629);
    }

    #[test]
    fn inverted_edges_are_rejected() {
        assert!(Region::from_edges(10, 0, 9, 5).is_none());
        assert!(Region::from_edges(0, 10, 5, 9).is_none());
    }

    #[test]
    fn missing_coordinates_are_rejected() {
        assert!(Region::from_edge_coordinates(&[Some(0), None, Some(3), Some(3)]).is_none());
        assert!(Region::from_edge_coordinates(&[Some(0), Some(0), Some(3)]).is_none());
        assert!(Region::from_edge_coordinates(&[]).is_none());
        assert_eq!(
            Region::from_edge_coordinates(&[Some(1), Some(2), Some(4), Some(6)]),
            Region::from_corner(1, 2, 3, 4)
        );
    }

    #[test]
    fn negative_corner_size_is_rejected() {
        assert!(Region::from_corner(0, 0, -1, 5).is_none());
        assert!(Region::from_corner(0, 0, 5, -1).is_none());
    }

    #[test]
    fn unrepresentable_spans_are_rejected() {
        assert!(Region::from_edges(i64::MIN, 0, i64::MAX, 1).is_none());
        assert!(Region::from_edges(0, i64::MIN, 1, i64::MAX).is_none());
        assert!(Region::from_corner(i64::MAX, 0, 1, 1).is_none());
        assert!(Region::from_corner(0, i64::MAX - 1, 1, 2).is_none());

        let far = Region::from_edges(i64::MAX - 1, i64::MAX - 1, i64::MAX, i64::MAX).unwrap();
        assert_eq!(far.to_edges(), [i64::MAX - 1, i64::MAX - 1, i64::MAX, i64::MAX]);
    }

    #[test]
    fn huge_regions_saturate_size() {
        let r = Region::from_edges(0, 0, i64::MAX, i64::MAX).unwrap();
        assert_eq!(r.size(), u64::MAX);
    }

    #[test]
    fn move_by_saturates_at_bounds() {
        let r = Region::from_edges(i64::MAX - 4, 0, i64::MAX, 2).unwrap().move_by(10, 0);
        assert_eq!(r.to_edges(), [i64::MAX - 4, 0, i64::MAX, 2]);
    }

    #[test]
    fn relative_intersect_with_extreme_crop() {
        let crop = Region::from_edges(i64::MIN, i64::MIN, -1, -1).unwrap();
        let skip = Region::from_edges(-10, -10, 5, 5).unwrap();
        let rebased = crop.relative_intersect(&skip).unwrap();
        assert_eq!(rebased.to_edges(), [i64::MAX - 9, i64::MAX - 9, i64::MAX, i64::MAX]);
    }

    // -- size quirk --

    #[test]
    fn zero_area_reports_size_one() {
        let point = Region::from_edges(4, 4, 4, 4).unwrap();
        assert_eq!(point.size(), 1);
        let line = Region::from_edges(4, 0, 4, 30).unwrap();
        assert_eq!(line.size(), 1);
    }

    // -- intersection --

    #[test]
    fn intersect_overlapping() {
        let a = Region::from_edges(0, 0, 10, 10).unwrap();
        let b = Region::from_edges(5, 5, 20, 20).unwrap();
        assert_eq!(a.intersect(&b), Region::from_edges(5, 5, 10, 10));
    }

    #[test]
    fn intersect_disjoint_is_none() {
        let a = Region::from_edges(0, 0, 10, 10).unwrap();
        let b = Region::from_edges(11, 0, 20, 10).unwrap();
        assert!(a.intersect(&b).is_none());
    }

    #[test]
    fn intersect_touching_edges() {
        let a = Region::from_edges(0, 0, 10, 10).unwrap();
        let b = Region::from_edges(10, 2, 20, 4).unwrap();
        assert_eq!(a.intersect(&b), Region::from_edges(10, 2, 10, 4));
    }

    #[test]
    fn relative_intersect_rebases_onto_self() {
        let crop = Region::from_corner(100, 50, 200, 100).unwrap();
        let skip = Region::from_edges(90, 60, 120, 70).unwrap();
        assert_eq!(crop.relative_intersect(&skip), Region::from_edges(0, 10, 20, 20));
        let outside = Region::from_edges(0, 0, 10, 10).unwrap();
        assert!(crop.relative_intersect(&outside).is_none());
    }

    #[test]
    fn move_by_keeps_size() {
        let r = Region::from_corner(1, 1, 3, 4).unwrap().move_by(-1, 2);
        assert_eq!(r, Region::from_corner(0, 3, 3, 4).unwrap());
    }

    #[test]
    fn contains_point_is_inclusive() {
        let r = Region::from_edges(2, 2, 5, 5).unwrap();
        assert!(r.contains_point(2, 2));
        assert!(r.contains_point(5, 5));
        assert!(r.contains_point(2, 5));
        assert!(!r.contains_point(6, 5));
        assert!(!r.contains_point(1, 3));
    }
}
