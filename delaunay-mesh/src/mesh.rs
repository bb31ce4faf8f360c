use std::collections::{HashMap, HashSet};
use std::io;
use std::io::Write;

use tracing::debug;

use crate::arena::{Arena, ArenaId};
use crate::geo::{self, Bbox, Circle, Point, Vec2};

pub type VertexId = ArenaId<Vertex>;
pub type TriangleId = ArenaId<Triangle>;

/// Incremental Delaunay triangulation (Bowyer-Watson) over integer points.
///
/// The convex hull is closed by a single synthetic `Vertex::Frame`: every hull
/// edge has a "frame triangle" on its outer side made of the edge and the
/// frame vertex. Frame triangles take part in insertion like any other
/// triangle, their circumcircle being the open half-plane beyond the hull
/// edge, but they're never reported by `triangles`.
///
/// All predicates are evaluated exactly, so the structure never degrades
/// because of rounding.
#[derive(Debug)]
pub struct DelaunayMesh {
    pub triangles: Arena<Triangle>,
    pub vertices: Arena<Vertex>,
    bbox: Bbox,
    frame: VertexId,

    // points seen before the first non collinear triple showed up
    pending: Vec<Point>,
    last: Option<TriangleId>,

    skipped: usize,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Vertex {
    Real(Point),
    Frame,
}

#[derive(Debug, Clone)]
pub struct Triangle {
    /// Counterclockwise for real triangles.
    pub vertices: [VertexId; 3],

    /// `neighbors[i]` is the triangle across the edge opposite to
    /// `vertices[i]`.
    pub neighbors: [Option<TriangleId>; 3],
}

/// Outcome of a single `DelaunayMesh::insert`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Insertion {
    Inserted,

    /// Kept aside until a point that isn't collinear with the previous ones
    /// shows up.
    Deferred,

    /// Same coordinates as a vertex already in the mesh.
    Coincident,

    /// Outside the bounding box given at construction.
    OutsideFrame,

    /// Inserting the point would have created a zero area triangle.
    Degenerate,
}

impl DelaunayMesh {
    pub fn new(bbox: Bbox) -> Self {
        let mut vertices = Arena::new();
        let frame = vertices.push(Vertex::Frame);

        DelaunayMesh {
            triangles: Arena::new(),
            vertices,
            bbox,
            frame,
            pending: vec![],
            last: None,
            skipped: 0,
        }
    }

    /// Triangulate `points` inserting them in the given order.
    pub fn with_points(bbox: Bbox, points: impl IntoIterator<Item = Point>) -> Self {
        let mut mesh = DelaunayMesh::new(bbox);
        for p in points {
            mesh.insert(p);
        }
        mesh
    }

    pub fn bbox(&self) -> Bbox {
        self.bbox
    }

    /// Insert `p`. Deferred collinear points inserted as a side effect of
    /// this call are accounted in `skipped` if they don't make it.
    pub fn insert(&mut self, p: Point) -> Insertion {
        let outcome = self.try_insert(p);
        if outcome != Insertion::Inserted && outcome != Insertion::Deferred {
            debug!(x = p.x, y = p.y, ?outcome, "point skipped");
            self.skipped += 1;
        }
        outcome
    }

    /// How many points given to `insert` were left out of the mesh.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn try_insert(&mut self, p: Point) -> Insertion {
        if !p.in_range() || !self.bbox.contains(p.into()) {
            return Insertion::OutsideFrame;
        }

        let start = match self.last {
            Some(t) => t,
            None => return self.insert_pending(p),
        };

        let seed = match self.locate(start, p) {
            Ok(t) => t,
            Err(outcome) => return outcome,
        };

        let (cavity, boundary) = self.cavity(seed, p);

        // the cavity must be star shaped from p, reject before touching anything
        // if one of the new triangles would be flat
        for &(e0, e1, _) in &boundary {
            if let (Vertex::Real(a), Vertex::Real(b)) = (self.vertices[e0], self.vertices[e1]) {
                if geo::orient(a, b, p) <= 0 {
                    return Insertion::Degenerate;
                }
            }
        }

        for t in cavity {
            self.triangles.remove(t);
        }

        let pv = self.vertices.push(Vertex::Real(p));

        let mut created = Vec::with_capacity(boundary.len());
        for (e0, e1, outside) in boundary {
            let t = self.triangles.push(Triangle {
                vertices: [e0, e1, pv],
                neighbors: [None; 3],
            });

            if let Some(n) = outside {
                self.link(t, n);
            }
            created.push(t);
        }

        // consecutive triangles of the fan share the edge from their common
        // boundary vertex to p
        let by_start = created
            .iter()
            .map(|&t| (self.triangles[t].vertices[0], t))
            .collect::<HashMap<_, _>>();
        for &t in &created {
            let e1 = self.triangles[t].vertices[1];
            if let Some(&n) = by_start.get(&e1) {
                self.link(t, n);
            }
        }

        self.last = created.last().copied();
        Insertion::Inserted
    }

    fn insert_pending(&mut self, p: Point) -> Insertion {
        if self.pending.contains(&p) {
            return Insertion::Coincident;
        }

        if self.pending.len() < 2 || geo::orient(self.pending[0], self.pending[1], p) == 0 {
            self.pending.push(p);
            return Insertion::Deferred;
        }

        let collinear = std::mem::take(&mut self.pending);
        self.bootstrap(collinear[0], collinear[1], p);

        // skips among them are counted by `insert`
        for &q in &collinear[2..] {
            self.insert(q);
        }

        Insertion::Inserted
    }

    fn bootstrap(&mut self, a: Point, b: Point, c: Point) {
        let (a, b) = if geo::orient(a, b, c) > 0 { (a, b) } else { (b, a) };

        let a = self.vertices.push(Vertex::Real(a));
        let b = self.vertices.push(Vertex::Real(b));
        let c = self.vertices.push(Vertex::Real(c));
        let f = self.frame;

        let tris = [[a, b, c], [c, b, f], [a, c, f], [b, a, f]];
        let ids = tris
            .iter()
            .map(|&vertices| {
                self.triangles.push(Triangle {
                    vertices,
                    neighbors: [None; 3],
                })
            })
            .collect::<Vec<_>>();

        for i in 0..ids.len() {
            for j in i + 1..ids.len() {
                self.link(ids[i], ids[j]);
            }
        }

        self.last = Some(ids[0]);
    }

    /// Walk from `start` towards `p` and return a triangle in conflict with
    /// it. Fails with `Coincident` if `p` is already a vertex.
    fn locate(&self, start: TriangleId, p: Point) -> Result<TriangleId, Insertion> {
        let mut t = start;
        if let Some(fi) = self.frame_index(t) {
            t = self.triangles[t].neighbors[fi].ok_or(Insertion::Degenerate)?;
        }

        for step in 0..=self.triangles.len() {
            let tri = &self.triangles[t];
            let pts = match self.real_points(tri) {
                // walked out of the hull
                None => return Ok(t),
                Some(pts) => pts,
            };

            if pts.contains(&p) {
                return Err(Insertion::Coincident);
            }

            let next = (0..3).map(|k| (k + step) % 3).find(|&i| {
                let a = pts[(i + 1) % 3];
                let b = pts[(i + 2) % 3];
                geo::orient(a, b, p) < 0
            });

            match next {
                None => return Ok(t),
                Some(i) => t = tri.neighbors[i].ok_or(Insertion::Degenerate)?,
            }
        }

        self.locate_exhaustive(p)
    }

    fn locate_exhaustive(&self, p: Point) -> Result<TriangleId, Insertion> {
        for (t, tri) in self.triangles.iter() {
            if let Some(pts) = self.real_points(tri) {
                if pts.contains(&p) {
                    return Err(Insertion::Coincident);
                }
            }

            if self.conflicts(t, p) {
                return Ok(t);
            }
        }

        Err(Insertion::Degenerate)
    }

    /// Whether `p` lies strictly inside the circumcircle of `t`. For a frame
    /// triangle that's the open half-plane beyond its hull edge plus the
    /// interior of the edge itself.
    fn conflicts(&self, t: TriangleId, p: Point) -> bool {
        let vs = self.triangles[t].vertices;

        match self.frame_index(t) {
            None => {
                let [a, b, c] = [self.point(vs[0]), self.point(vs[1]), self.point(vs[2])];
                geo::in_circle(a, b, c, p) > 0
            }
            Some(fi) => {
                let a = self.point(vs[(fi + 1) % 3]);
                let b = self.point(vs[(fi + 2) % 3]);

                let o = geo::orient(a, b, p);
                o > 0 || (o == 0 && geo::strictly_between(a, b, p))
            }
        }
    }

    /// Collect the triangles in conflict with `p` reachable from `seed` and the
    /// directed edges bounding them, each with the triangle on its outer side.
    #[allow(clippy::type_complexity)]
    fn cavity(
        &self,
        seed: TriangleId,
        p: Point,
    ) -> (
        Vec<TriangleId>,
        Vec<(VertexId, VertexId, Option<TriangleId>)>,
    ) {
        let mut cavity = vec![seed];
        let mut in_cavity = HashSet::new();
        in_cavity.insert(seed);

        let mut boundary = vec![];
        let mut stack = vec![seed];

        while let Some(t) = stack.pop() {
            let tri = &self.triangles[t];

            for i in 0..3 {
                let e0 = tri.vertices[(i + 1) % 3];
                let e1 = tri.vertices[(i + 2) % 3];

                match tri.neighbors[i] {
                    Some(n) if in_cavity.contains(&n) => {}
                    Some(n) if self.conflicts(n, p) => {
                        in_cavity.insert(n);
                        cavity.push(n);
                        stack.push(n);
                    }
                    outside => boundary.push((e0, e1, outside)),
                }
            }
        }

        (cavity, boundary)
    }

    fn link(&mut self, t1: TriangleId, t2: TriangleId) {
        let v1 = self.triangles[t1].vertices;
        let v2 = self.triangles[t2].vertices;

        if let Some(i) = (0..3).find(|&i| !v2.contains(&v1[i])) {
            self.triangles[t1].neighbors[i] = Some(t2);
        }
        if let Some(j) = (0..3).find(|&j| !v1.contains(&v2[j])) {
            self.triangles[t2].neighbors[j] = Some(t1);
        }
    }

    fn frame_index(&self, t: TriangleId) -> Option<usize> {
        self.triangles[t].vertices.iter().position(|&v| v == self.frame)
    }

    fn point(&self, v: VertexId) -> Point {
        match self.vertices[v] {
            Vertex::Real(p) => p,
            Vertex::Frame => unreachable!("frame vertex has no position"),
        }
    }

    fn real_points(&self, tri: &Triangle) -> Option<[Point; 3]> {
        let mut pts = [Point::new(0, 0); 3];
        for (p, &v) in pts.iter_mut().zip(tri.vertices.iter()) {
            match self.vertices[v] {
                Vertex::Real(q) => *p = q,
                Vertex::Frame => return None,
            }
        }
        Some(pts)
    }

    /// The real triangles, counterclockwise, in creation order.
    pub fn triangles(&self) -> impl Iterator<Item = [Point; 3]> + '_ {
        self.triangles
            .iter()
            .filter_map(move |(_, tri)| self.real_points(tri))
    }

    pub fn triangle_ids(&self) -> impl Iterator<Item = TriangleId> + '_ {
        self.triangles
            .iter()
            .filter(move |(t, _)| self.frame_index(*t).is_none())
            .map(|(t, _)| t)
    }

    pub fn triangle_vertices(&self, t: TriangleId) -> Option<[Point; 3]> {
        self.real_points(self.triangles.get(t)?)
    }

    pub fn circumcircle(&self, t: TriangleId) -> Option<Circle> {
        let [a, b, c] = self.triangle_vertices(t)?;
        Circle::circumcircle(a.into(), b.into(), c.into())
    }

    /// Every point of the triangulation, including the ones still waiting for
    /// a non collinear companion.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.vertices
            .iter()
            .filter_map(|(_, v)| match v {
                Vertex::Real(p) => Some(*p),
                Vertex::Frame => None,
            })
            .chain(self.pending.iter().copied())
    }

    /// Convex hull vertices in counterclockwise order, empty until the first
    /// triangle exists.
    pub fn convex_hull(&self) -> Vec<Point> {
        let mut next = HashMap::new();
        for (t, tri) in self.triangles.iter() {
            if let Some(fi) = self.frame_index(t) {
                // frame triangles walk their hull edge backwards
                let a = tri.vertices[(fi + 1) % 3];
                let b = tri.vertices[(fi + 2) % 3];
                next.insert(b, a);
            }
        }

        let first = match next.keys().next() {
            None => return vec![],
            Some(&v) => v,
        };

        let mut hull = vec![self.point(first)];
        let mut cur = next[&first];
        while cur != first && hull.len() <= next.len() {
            hull.push(self.point(cur));
            cur = next[&cur];
        }
        hull
    }
}

pub fn dump_svg(out: &mut impl Write, mesh: &DelaunayMesh) -> io::Result<()> {
    let bbox = mesh.bbox();
    let (min, max) = (bbox.min(), bbox.max());
    let stroke = ((max - min) * 0.002).x.max(0.1);

    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}">"#,
        min.x,
        min.y,
        max.x - min.x,
        max.y - min.y
    )?;
    writeln!(
        out,
        r#"<rect x="{}" y="{}" width="{}" height="{}" fill="white" />"#,
        min.x,
        min.y,
        max.x - min.x,
        max.y - min.y
    )?;

    for [a, b, c] in mesh.triangles() {
        writeln!(
            out,
            r#"<polygon points="{},{} {},{} {},{}" fill="none" stroke="black" stroke-width="{}" />"#,
            a.x, a.y, b.x, b.y, c.x, c.y, stroke
        )?;
    }

    for p in mesh.points() {
        let p = Vec2::from(p);
        writeln!(
            out,
            r#"<circle cx="{}" cy="{}" r="{}" fill="red" />"#,
            p.x,
            p.y,
            stroke * 2.0
        )?;
    }

    writeln!(out, "</svg>")
}
