use tracing::trace;

use crate::mesh::{Point, Triangle};

/// Drops triangles sticking out of the image or too small to be worth a color.
#[derive(Debug, Clone, Copy)]
pub struct Validator {
    pub width: u32,
    pub height: u32,
    pub margin_x: u32,
    pub margin_y: u32,
    pub min_area: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    OutOfBounds,
    TooSmall,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rejections {
    pub out_of_bounds: usize,
    pub too_small: usize,
}

impl Validator {
    /// A vertex is in bounds when `-margin <= coord < dimension + margin` on
    /// both axes.
    pub fn in_bounds(&self, p: Point) -> bool {
        let within = |v: i32, dim: u32, margin: u32| {
            let (v, dim, margin) = (i64::from(v), i64::from(dim), i64::from(margin));
            -margin <= v && v < dim + margin
        };

        within(p.x, self.width, self.margin_x) && within(p.y, self.height, self.margin_y)
    }

    pub fn check(&self, t: &Triangle) -> Verdict {
        if !t.vertices.iter().all(|&p| self.in_bounds(p)) {
            return Verdict::OutOfBounds;
        }

        // strictly greater, a triangle exactly at the threshold goes away
        if t.area() <= self.min_area {
            return Verdict::TooSmall;
        }

        Verdict::Valid
    }

    /// Valid triangles in input order, plus how many were rejected and why.
    pub fn validate(&self, triangles: impl IntoIterator<Item = Triangle>) -> (Vec<Triangle>, Rejections) {
        let mut valid = vec![];
        let mut rejections = Rejections::default();

        for t in triangles {
            match self.check(&t) {
                Verdict::Valid => valid.push(t),
                Verdict::OutOfBounds => {
                    trace!(triangle = ?t.vertices, "out of bounds triangle");
                    rejections.out_of_bounds += 1;
                }
                Verdict::TooSmall => {
                    trace!(triangle = ?t.vertices, area = t.area(), "triangle too small");
                    rejections.too_small += 1;
                }
            }
        }

        (valid, rejections)
    }
}
