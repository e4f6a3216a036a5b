//! Static obstacle shapes and their containment tests.

use serde::{Deserialize, Serialize};

use crate::Position;

/// Area below which a shape is treated as degenerate and ignored.
const DEGENERATE_AREA: f32 = 1e-6;

/// Axis-aligned rectangle; corners are normalized on construction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct Rect {
    min: Position,
    max: Position,
}

impl Rect {
    /// Build a rectangle from two opposite corners given in any order.
    #[must_use]
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            min: Position::new(x1.min(x2), y1.min(y2)),
            max: Position::new(x1.max(x2), y1.max(y2)),
        }
    }

    #[must_use]
    pub const fn min(&self) -> Position {
        self.min
    }

    #[must_use]
    pub const fn max(&self) -> Position {
        self.max
    }

    #[must_use]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[must_use]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !(self.width() * self.height() > DEGENERATE_AREA)
    }

    /// Strict interior test; points on an edge are outside.
    #[must_use]
    pub fn contains(&self, p: Position) -> bool {
        self.min.x < p.x && p.x < self.max.x && self.min.y < p.y && p.y < self.max.y
    }

    /// Whether this rectangle, grown by `margin` on every side, strictly contains `p`.
    #[must_use]
    pub fn contains_with_margin(&self, p: Position, margin: f32) -> bool {
        self.min.x - margin < p.x
            && p.x < self.max.x + margin
            && self.min.y - margin < p.y
            && p.y < self.max.y + margin
    }

    /// Open-interval overlap test used when placing random obstacles.
    #[must_use]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

impl From<[f32; 4]> for Rect {
    fn from([x1, y1, x2, y2]: [f32; 4]) -> Self {
        Self::new(x1, y1, x2, y2)
    }
}

impl From<Rect> for [f32; 4] {
    fn from(rect: Rect) -> Self {
        [rect.min.x, rect.min.y, rect.max.x, rect.max.y]
    }
}

/// Disc obstacle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Circle {
    pub center: Position,
    pub radius: f32,
}

impl Circle {
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !(self.radius.is_finite() && self.radius > 0.0)
    }

    #[must_use]
    pub fn contains(&self, p: Position) -> bool {
        !self.is_degenerate() && self.center.distance_to(p) < self.radius
    }
}

/// Convex polygon given by its vertices in either winding order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConvexPolygon {
    pub vertices: Vec<Position>,
}

impl ConvexPolygon {
    #[must_use]
    pub fn new(vertices: Vec<Position>) -> Self {
        Self { vertices }
    }

    /// Shoelace area (absolute value).
    #[must_use]
    pub fn area(&self) -> f32 {
        let n = self.vertices.len();
        if n < 3 {
            return 0.0;
        }
        let mut twice = 0.0_f32;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            twice += a.x * b.y - b.x * a.y;
        }
        (twice * 0.5).abs()
    }

    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !(self.area() > DEGENERATE_AREA)
    }

    /// Sign-of-cross-product test; `inclusive` also accepts points on an edge.
    fn sign_consistent(&self, p: Position, inclusive: bool) -> bool {
        if self.is_degenerate() {
            return false;
        }
        let n = self.vertices.len();
        let mut any_negative = false;
        let mut any_positive = false;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
            if cross < 0.0 {
                any_negative = true;
            } else if cross > 0.0 {
                any_positive = true;
            } else if !inclusive {
                return false;
            }
        }
        !(any_negative && any_positive)
    }

    /// Strict interior test.
    #[must_use]
    pub fn contains(&self, p: Position) -> bool {
        self.sign_consistent(p, false)
    }

    /// Interior-or-boundary test used by the sampled ray cast.
    #[must_use]
    pub fn touches(&self, p: Position) -> bool {
        self.sign_consistent(p, true)
    }
}

/// Static obstacle placed in a scenario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Obstacle {
    Rectangle(Rect),
    Circle(Circle),
    Polygon(ConvexPolygon),
}

impl Obstacle {
    /// Convenience constructor mirroring the `(x1, y1, x2, y2)` map notation.
    #[must_use]
    pub fn rect(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self::Rectangle(Rect::new(x1, y1, x2, y2))
    }

    #[must_use]
    pub fn circle(cx: f32, cy: f32, radius: f32) -> Self {
        Self::Circle(Circle {
            center: Position::new(cx, cy),
            radius,
        })
    }

    #[must_use]
    pub fn polygon(vertices: &[(f32, f32)]) -> Self {
        Self::Polygon(ConvexPolygon::new(
            vertices.iter().map(|&(x, y)| Position::new(x, y)).collect(),
        ))
    }

    /// Whether the shape encloses no area and therefore never blocks anything.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        match self {
            Self::Rectangle(rect) => rect.is_degenerate(),
            Self::Circle(circle) => circle.is_degenerate(),
            Self::Polygon(polygon) => polygon.is_degenerate(),
        }
    }

    /// Whether `p` lies strictly inside the obstacle.
    #[must_use]
    pub fn contains(&self, p: Position) -> bool {
        match self {
            Self::Rectangle(rect) => !rect.is_degenerate() && rect.contains(p),
            Self::Circle(circle) => circle.contains(p),
            Self::Polygon(polygon) => polygon.contains(p),
        }
    }
}
