//!
//! Greedy thinning of the candidate points.
//!
//! Candidates are deduplicated and sorted by `(y, x)`, then accepted one by
//! one if they're at least `min_distance` away from every point accepted so
//! far. The order matters: the first point of a cluster in `(y, x)` order is
//! the one that survives.
//!

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use delaunay_mesh::bvh::Bvh;
use delaunay_mesh::geo::{Bbox, Vec2};

use crate::mesh::Point;

/// Neighbor lookup used by the greedy scan. Implementations only differ in
/// speed, never in the points they accept.
pub trait SpacingIndex {
    /// Whether an already accepted point is closer than the minimum distance
    /// to `p`.
    fn has_neighbor(&self, p: Point) -> bool;

    fn insert(&mut self, p: Point);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterStrategy {
    Scan,
    Grid,
    Quadtree,
}

pub fn too_close(p: Point, q: Point, min_distance: f64) -> bool {
    Vec2::from(p).dist(q.into()) < min_distance
}

/// Deduplicate, sort and thin `candidates`.
pub fn filter_points(
    candidates: impl IntoIterator<Item = Point>,
    min_distance: f64,
    strategy: FilterStrategy,
) -> Vec<Point> {
    let mut points = candidates.into_iter().collect::<Vec<_>>();
    points.sort_unstable_by_key(|p| (p.y, p.x));
    points.dedup();

    let kept = match strategy {
        FilterStrategy::Scan => thin(&points, ExhaustiveScan::new(min_distance)),
        FilterStrategy::Grid => thin(&points, UniformGrid::new(min_distance)),
        FilterStrategy::Quadtree => thin(&points, Quadtree::new(min_distance)),
    };

    debug!(
        unique = points.len(),
        kept = kept.len(),
        ?strategy,
        "filtered candidate points"
    );

    kept
}

/// Greedy scan over points already in `(y, x)` order.
pub fn thin(sorted: &[Point], mut index: impl SpacingIndex) -> Vec<Point> {
    let mut kept = vec![];

    for &p in sorted {
        if !index.has_neighbor(p) {
            index.insert(p);
            kept.push(p);
        }
    }

    kept
}

#[derive(Debug)]
pub struct ExhaustiveScan {
    min_distance: f64,
    accepted: Vec<Point>,
}

impl ExhaustiveScan {
    pub fn new(min_distance: f64) -> Self {
        ExhaustiveScan {
            min_distance,
            accepted: vec![],
        }
    }
}

impl SpacingIndex for ExhaustiveScan {
    fn has_neighbor(&self, p: Point) -> bool {
        self.accepted
            .iter()
            .any(|&q| too_close(p, q, self.min_distance))
    }

    fn insert(&mut self, p: Point) {
        self.accepted.push(p);
    }
}

/// Buckets of side `min_distance`: a point closer than that can only be in one
/// of the 9 buckets around the query. Distinct integer points are at least 1
/// apart, so the side never goes below 1.
#[derive(Debug)]
pub struct UniformGrid {
    min_distance: f64,
    buckets: HashMap<(i64, i64), Vec<Point>>,
}

impl UniformGrid {
    pub fn new(min_distance: f64) -> Self {
        UniformGrid {
            min_distance,
            buckets: HashMap::new(),
        }
    }

    fn bucket(&self, p: Point) -> (i64, i64) {
        let side = self.min_distance.max(1.0);

        (
            (f64::from(p.x) / side).floor() as i64,
            (f64::from(p.y) / side).floor() as i64,
        )
    }
}

impl SpacingIndex for UniformGrid {
    fn has_neighbor(&self, p: Point) -> bool {
        if self.min_distance <= 0.0 {
            return false;
        }

        let (bx, by) = self.bucket(p);
        (by - 1..=by + 1)
            .flat_map(|y| (bx - 1..=bx + 1).map(move |x| (x, y)))
            .filter_map(|b| self.buckets.get(&b))
            .flatten()
            .any(|&q| too_close(p, q, self.min_distance))
    }

    fn insert(&mut self, p: Point) {
        if self.min_distance <= 0.0 {
            return;
        }

        let b = self.bucket(p);
        self.buckets.entry(b).or_default().push(p);
    }
}

#[derive(Debug)]
pub struct Quadtree {
    min_distance: f64,
    tree: Bvh<Point>,
}

impl Quadtree {
    pub fn new(min_distance: f64) -> Self {
        Quadtree {
            min_distance,
            tree: Bvh::new(Bbox::new(Vec2::zero())),
        }
    }
}

impl SpacingIndex for Quadtree {
    fn has_neighbor(&self, p: Point) -> bool {
        self.tree
            .within(p.into(), self.min_distance)
            .any(|&q| too_close(p, q, self.min_distance))
    }

    fn insert(&mut self, p: Point) {
        self.tree.insert(p, p.into());
    }
}

impl FromStr for FilterStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scan" => Ok(FilterStrategy::Scan),
            "grid" => Ok(FilterStrategy::Grid),
            "quadtree" => Ok(FilterStrategy::Quadtree),
            _ => Err(format!(
                "unknown filter `{}`, expected one of scan, grid, quadtree",
                s
            )),
        }
    }
}

impl fmt::Display for FilterStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FilterStrategy::Scan => "scan",
            FilterStrategy::Grid => "grid",
            FilterStrategy::Quadtree => "quadtree",
        };
        f.write_str(s)
    }
}
