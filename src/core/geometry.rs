//! Minimal geometry types for the core.
//!
//! The core never touches `smithay`: it is driven
//! purely by typed calls from the adapter layer, so it needs its own
//! `Point`/`Size`/`Rect`. The shape mirrors `smithay::utils::{Point, Size,
//! Rectangle}` (logical-space i32 coordinates) so the adapter layer's
//! conversions at the boundary are mechanical.

use std::ops::{Add, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Size {
    pub w: i32,
    pub h: i32,
}

impl Size {
    pub const fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }

    pub fn is_empty(self) -> bool {
        self.w <= 0 || self.h <= 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rect {
    pub loc: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(loc: Point, size: Size) -> Self {
        Self { loc, size }
    }

    pub fn from_extents(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            loc: Point::new(x0, y0),
            size: Size::new((x1 - x0).max(0), (y1 - y0).max(0)),
        }
    }

    pub fn left(self) -> i32 {
        self.loc.x
    }
    pub fn top(self) -> i32 {
        self.loc.y
    }
    pub fn right(self) -> i32 {
        self.loc.x + self.size.w
    }
    pub fn bottom(self) -> i32 {
        self.loc.y + self.size.h
    }

    pub fn center(self) -> Point {
        Point::new(self.loc.x + self.size.w / 2, self.loc.y + self.size.h / 2)
    }

    pub fn contains(self, p: Point) -> bool {
        p.x >= self.left() && p.x < self.right() && p.y >= self.top() && p.y < self.bottom()
    }

    /// True iff `self` is fully inside `other` (used to check that a
    /// client's content geometry stays within its frame geometry).
    pub fn is_contained_in(self, other: Rect) -> bool {
        self.left() >= other.left()
            && self.top() >= other.top()
            && self.right() <= other.right()
            && self.bottom() <= other.bottom()
    }

    pub fn intersection(self, other: Rect) -> Option<Rect> {
        let x0 = self.left().max(other.left());
        let y0 = self.top().max(other.top());
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            None
        } else {
            Some(Rect::from_extents(x0, y0, x1, y1))
        }
    }

    pub fn translated(self, by: Point) -> Rect {
        Rect::new(self.loc + by, self.size)
    }

    /// Shrinks the rect by `amount` on every edge (used to carve out struts
    /// from a work area, or apply decoration margins).
    pub fn shrunk(self, amount: Edges) -> Rect {
        Rect::from_extents(
            self.left() + amount.left,
            self.top() + amount.top,
            self.right() - amount.right,
            self.bottom() - amount.bottom,
        )
    }
}

/// Per-edge inset/outset, used for decoration margins and struts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Edges {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Edges {
    pub const fn uniform(v: i32) -> Self {
        Self {
            left: v,
            top: v,
            right: v,
            bottom: v,
        }
    }

    pub const ZERO: Edges = Edges::uniform(0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_and_shrink() {
        let outer = Rect::new(Point::new(0, 0), Size::new(100, 80));
        let inner = outer.shrunk(Edges::uniform(4));
        assert!(inner.is_contained_in(outer));
        assert_eq!(inner, Rect::from_extents(4, 4, 96, 76));
    }

    #[test]
    fn intersection_disjoint_is_none() {
        let a = Rect::new(Point::new(0, 0), Size::new(10, 10));
        let b = Rect::new(Point::new(20, 20), Size::new(10, 10));
        assert_eq!(a.intersection(b), None);
    }
}
