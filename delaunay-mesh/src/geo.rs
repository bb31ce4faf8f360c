use std::ops::{Add, Div, Mul, Sub};

/// Largest absolute coordinate accepted by the exact predicates.
///
/// With coordinates in this range every intermediate value of `in_circle` fits
/// in an `i128`.
pub const MAX_COORD: i32 = 1 << 28;

/// An integer point, the unit the triangulation works on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bbox {
    min: Vec2,
    max: Vec2,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f64,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }

    pub fn in_range(&self) -> bool {
        self.x.abs() <= MAX_COORD && self.y.abs() <= MAX_COORD
    }
}

impl From<Point> for Vec2 {
    fn from(p: Point) -> Self {
        Vec2::new(p.x.into(), p.y.into())
    }
}

/// Twice the signed area of the triangle `abc`: positive when `abc` turns
/// counterclockwise, zero when the points are collinear.
pub fn orient(a: Point, b: Point, c: Point) -> i128 {
    let (ax, ay) = (i128::from(a.x), i128::from(a.y));
    let (bx, by) = (i128::from(b.x), i128::from(b.y));
    let (cx, cy) = (i128::from(c.x), i128::from(c.y));

    (bx - ax) * (cy - ay) - (by - ay) * (cx - ax)
}

/// Exact in-circle test. For a counterclockwise `abc` the result is positive
/// iff `d` lies strictly inside the circumcircle, zero iff it lies on it.
pub fn in_circle(a: Point, b: Point, c: Point, d: Point) -> i128 {
    let delta = |p: Point| (i128::from(p.x) - i128::from(d.x), i128::from(p.y) - i128::from(d.y));

    let (adx, ady) = delta(a);
    let (bdx, bdy) = delta(b);
    let (cdx, cdy) = delta(c);

    let alift = adx * adx + ady * ady;
    let blift = bdx * bdx + bdy * bdy;
    let clift = cdx * cdx + cdy * cdy;

    alift * (bdx * cdy - cdx * bdy) + blift * (cdx * ady - adx * cdy) + clift * (adx * bdy - bdx * ady)
}

/// Whether `p`, known to be collinear with `a` and `b`, lies strictly between
/// them.
pub fn strictly_between(a: Point, b: Point, p: Point) -> bool {
    let dot = (i128::from(p.x) - i128::from(a.x)) * (i128::from(b.x) - i128::from(a.x))
        + (i128::from(p.y) - i128::from(a.y)) * (i128::from(b.y) - i128::from(a.y));
    let len2 = (i128::from(b.x) - i128::from(a.x)).pow(2) + (i128::from(b.y) - i128::from(a.y)).pow(2);

    dot > 0 && dot < len2
}

impl Vec2 {
    pub fn zero() -> Self {
        Vec2::new(0.0, 0.0)
    }

    pub fn new(x: f64, y: f64) -> Self {
        Vec2 { x, y }
    }

    pub fn dist(&self, p: Vec2) -> f64 {
        self.dist2(p).sqrt()
    }

    pub fn dist2(&self, p: Vec2) -> f64 {
        (*self - p).norm2()
    }

    pub fn norm2(&self) -> f64 {
        self.x.powi(2) + self.y.powi(2)
    }
}

impl Bbox {
    pub fn new(p: Vec2) -> Self {
        Bbox { min: p, max: p }
    }

    pub fn min(&self) -> Vec2 {
        self.min
    }

    pub fn max(&self) -> Vec2 {
        self.max
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    pub fn split(&self, p: Vec2) -> [Bbox; 4] {
        debug_assert!(self.contains(p));

        [
            Bbox {
                min: self.min,
                max: p,
            },
            Bbox {
                min: Vec2::new(p.x, self.min.y),
                max: Vec2::new(self.max.x, p.y),
            },
            Bbox {
                min: Vec2::new(self.min.x, p.y),
                max: Vec2::new(p.x, self.max.y),
            },
            Bbox {
                min: p,
                max: self.max,
            },
        ]
    }

    pub fn expand(&mut self, p: Vec2) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);

        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    pub fn contains(&self, p: Vec2) -> bool {
        self.min.x <= p.x && self.min.y <= p.y && self.max.x >= p.x && self.max.y >= p.y
    }

    pub fn intersects(&self, other: &Bbox) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

impl Circle {
    pub fn new(center: Vec2, radius: f64) -> Self {
        Circle { center, radius }
    }

    /// The circle through `a`, `b` and `c`, `None` when they are collinear.
    pub fn circumcircle(a: Vec2, b: Vec2, c: Vec2) -> Option<Self> {
        let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
        if d == 0.0 {
            return None;
        }

        let (a2, b2, c2) = (a.norm2(), b.norm2(), c.norm2());
        let center = Vec2::new(
            (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d,
            (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d,
        );

        Some(Circle::new(center, center.dist(a)))
    }

    pub fn contains(&self, p: Vec2) -> bool {
        self.center.dist(p) <= self.radius
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(mut self, rhs: Vec2) -> Self::Output {
        self.x += rhs.x;
        self.y += rhs.y;
        self
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(mut self, rhs: Vec2) -> Self::Output {
        self.x -= rhs.x;
        self.y -= rhs.y;
        self
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(mut self, rhs: f64) -> Self::Output {
        self.x *= rhs;
        self.y *= rhs;
        self
    }
}

impl Div<f64> for Vec2 {
    type Output = Vec2;

    fn div(mut self, rhs: f64) -> Self::Output {
        self.x /= rhs;
        self.y /= rhs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orient_sign() {
        let a = Point::new(0, 0);
        let b = Point::new(10, 0);

        assert!(orient(a, b, Point::new(0, 10)) > 0);
        assert!(orient(a, b, Point::new(0, -10)) < 0);
        assert_eq!(orient(a, b, Point::new(5, 0)), 0);
    }

    #[test]
    fn test_in_circle() {
        let (a, b, c) = (Point::new(0, 0), Point::new(10, 0), Point::new(0, 10));

        assert!(in_circle(a, b, c, Point::new(5, 5)) > 0);
        assert!(in_circle(a, b, c, Point::new(4, 4)) > 0);
        assert!(in_circle(a, b, c, Point::new(10, 10)) == 0);
        assert!(in_circle(a, b, c, Point::new(11, 11)) < 0);
    }

    #[test]
    fn test_in_circle_extreme_coords() {
        let m = MAX_COORD;
        let (a, b, c) = (Point::new(-m, -m), Point::new(m, -m), Point::new(m, m));

        assert!(in_circle(a, b, c, Point::new(0, 0)) > 0);
        assert!(in_circle(a, b, c, Point::new(-m, m)) == 0);
    }

    #[test]
    fn test_strictly_between() {
        let (a, b) = (Point::new(0, 0), Point::new(10, 0));

        assert!(strictly_between(a, b, Point::new(5, 0)));
        assert!(!strictly_between(a, b, Point::new(0, 0)));
        assert!(!strictly_between(a, b, Point::new(10, 0)));
        assert!(!strictly_between(a, b, Point::new(12, 0)));
    }

    #[test]
    fn test_circumcircle() {
        let c = Circle::circumcircle(Vec2::zero(), Vec2::new(2.0, 0.0), Vec2::new(0.0, 2.0)).unwrap();

        assert!((c.center.x - 1.0).abs() < 1e-9);
        assert!((c.center.y - 1.0).abs() < 1e-9);
        assert!((c.radius - 2f64.sqrt()).abs() < 1e-9);

        assert!(Circle::circumcircle(Vec2::zero(), Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0)).is_none());
    }
}
