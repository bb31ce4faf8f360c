use std::hash::{Hash, Hasher};

use delaunay_mesh::geo;

pub use delaunay_mesh::geo::Point;

/// Three points; equality ignores the vertex order.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub vertices: [Point; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// A flat colored triangle of the output mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshTriangle {
    pub triangle: Triangle,
    pub color: Color,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mesh {
    pub triangles: Vec<MeshTriangle>,
}

impl Triangle {
    pub fn new(a: Point, b: Point, c: Point) -> Self {
        Triangle {
            vertices: [a, b, c],
        }
    }

    /// `|x1(y2-y3) + x2(y3-y1) + x3(y1-y2)|`, twice the area.
    pub fn doubled_area(&self) -> u128 {
        let [a, b, c] = self.vertices;
        geo::orient(a, b, c).unsigned_abs()
    }

    pub fn area(&self) -> f64 {
        0.5 * self.doubled_area() as f64
    }

    fn sorted(&self) -> [Point; 3] {
        let mut vs = self.vertices;
        vs.sort();
        vs
    }
}

impl PartialEq for Triangle {
    fn eq(&self, other: &Self) -> bool {
        self.sorted() == other.sorted()
    }
}

impl Eq for Triangle {}

impl Hash for Triangle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sorted().hash(state);
    }
}

impl From<[Point; 3]> for Triangle {
    fn from(vertices: [Point; 3]) -> Self {
        Triangle { vertices }
    }
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl MeshTriangle {
    /// Vertices lifted to 3D on the `z = 0` plane.
    pub fn points(&self) -> [[i32; 3]; 3] {
        let [a, b, c] = self.triangle.vertices;
        [[a.x, a.y, 0], [b.x, b.y, 0], [c.x, c.y, 0]]
    }
}

impl Mesh {
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MeshTriangle> {
        self.triangles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    #[test]
    fn test_triangle_equality_ignores_order() {
        let (a, b, c) = (Point::new(0, 0), Point::new(4, 0), Point::new(0, 3));

        assert_eq!(Triangle::new(a, b, c), Triangle::new(c, a, b));
        assert_eq!(Triangle::new(a, b, c), Triangle::new(b, a, c));
        assert_ne!(Triangle::new(a, b, c), Triangle::new(a, b, Point::new(0, 4)));

        let set = vec![Triangle::new(a, b, c), Triangle::new(c, b, a)]
            .into_iter()
            .collect::<HashSet<_>>();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_area_is_orientation_independent() {
        let t = Triangle::new(Point::new(0, 0), Point::new(4, 0), Point::new(0, 3));

        assert_eq!(t.doubled_area(), 12);
        assert!((t.area() - 6.0).abs() < f64::EPSILON);
        assert_eq!(Triangle::new(Point::new(0, 0), Point::new(0, 3), Point::new(4, 0)).area(), 6.0);
    }

    #[test]
    fn test_points_are_flat() {
        let mt = MeshTriangle {
            triangle: Triangle::new(Point::new(1, 2), Point::new(3, 4), Point::new(5, 7)),
            color: Color::new(1, 2, 3),
        };

        assert_eq!(mt.points(), [[1, 2, 0], [3, 4, 0], [5, 7, 0]]);
    }
}
