//! Cell-space geometry used for hit-testing.
//!
//! The engine lays out the desktop in terminal cells and hit-tests clicks against
//! these regions; the TUI converts them to ratatui rects at draw time.

/// A cell position, column first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: u16,
    pub y: u16,
}

impl Point {
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle of cells. `x + width` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Region {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Region {
    #[must_use]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn right(self) -> u16 {
        self.x.saturating_add(self.width)
    }

    #[must_use]
    pub fn bottom(self) -> u16 {
        self.y.saturating_add(self.height)
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[must_use]
    pub fn contains(self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    #[must_use]
    pub fn intersects(self, other: Region) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Shift and shrink `self` so it fits inside `bounds`.
    ///
    /// Size is preserved where possible; the origin moves first.
    #[must_use]
    pub fn clamp_within(self, bounds: Region) -> Region {
        let width = self.width.min(bounds.width);
        let height = self.height.min(bounds.height);
        let max_x = bounds.right().saturating_sub(width);
        let max_y = bounds.bottom().saturating_sub(height);
        Region {
            x: self.x.clamp(bounds.x, max_x.max(bounds.x)),
            y: self.y.clamp(bounds.y, max_y.max(bounds.y)),
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_exclusive_on_far_edges() {
        let r = Region::new(2, 3, 4, 2);
        assert!(r.contains(Point::new(2, 3)));
        assert!(r.contains(Point::new(5, 4)));
        assert!(!r.contains(Point::new(6, 4)));
        assert!(!r.contains(Point::new(5, 5)));
        assert!(!r.contains(Point::new(1, 3)));
    }

    #[test]
    fn empty_region_contains_nothing() {
        let r = Region::new(0, 0, 0, 5);
        assert!(!r.contains(Point::new(0, 0)));
        assert!(!r.intersects(Region::new(0, 0, 10, 10)));
    }

    #[test]
    fn adjacent_regions_do_not_intersect() {
        let a = Region::new(0, 0, 4, 4);
        let b = Region::new(4, 0, 4, 4);
        let c = Region::new(0, 4, 4, 4);
        assert!(!a.intersects(b));
        assert!(!a.intersects(c));
        assert!(a.intersects(Region::new(3, 3, 2, 2)));
    }

    #[test]
    fn clamp_moves_origin_before_shrinking() {
        let bounds = Region::new(0, 0, 80, 23);
        let moved = Region::new(70, 20, 20, 10).clamp_within(bounds);
        assert_eq!(moved, Region::new(60, 13, 20, 10));

        let shrunk = Region::new(5, 5, 100, 40).clamp_within(bounds);
        assert_eq!(shrunk, Region::new(0, 0, 80, 23));
    }
}
