use crate::geo::{Bbox, Vec2};

const LEAF_CAPACITY: usize = 64;

/// Quadtree of elements keyed by a reference point.
#[derive(Debug)]
pub struct Bvh<Elem> {
    pub root: BvhNode<Elem>,
    len: usize,
}

#[derive(Debug)]
pub enum BvhNode<Elem> {
    Leaf {
        elems: Vec<(Elem, Vec2)>,
        bbox: Bbox,
    },
    Branch {
        bbox: Bbox,
        pivot: Vec2,
        children: Box<[BvhNode<Elem>; 4]>,
    },
}

impl<Elem> Bvh<Elem> {
    pub fn new(bbox: Bbox) -> Self {
        Bvh {
            root: BvhNode::leaf(bbox),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert(&mut self, e: Elem, refpoint: Vec2) {
        self.root.insert(e, refpoint);
        self.len += 1;
    }

    /// Elements whose reference point lies within `radius` of `center`.
    pub fn within(&self, center: Vec2, radius: f64) -> impl Iterator<Item = &Elem> {
        self.root
            .within(center, radius)
            .filter(move |(_, p)| p.dist(center) <= radius)
            .map(|(e, _)| e)
    }
}

impl<Elem> BvhNode<Elem> {
    fn leaf(bbox: Bbox) -> Self {
        BvhNode::Leaf {
            elems: Vec::with_capacity(LEAF_CAPACITY),
            bbox,
        }
    }

    pub fn bbox(&self) -> &Bbox {
        match self {
            BvhNode::Branch { bbox, .. } | BvhNode::Leaf { bbox, .. } => bbox,
        }
    }

    pub fn insert(&mut self, e: Elem, refpoint: Vec2) {
        match self {
            BvhNode::Leaf { elems, bbox } => {
                elems.push((e, refpoint));
                bbox.expand(refpoint);

                // a leaf full of copies of the same point can't be split
                if elems.len() > LEAF_CAPACITY && elems.iter().any(|(_, p)| *p != refpoint) {
                    let pivot = bbox.center();
                    let quads = bbox.split(pivot);

                    let mut children = Box::new([
                        BvhNode::leaf(quads[0]),
                        BvhNode::leaf(quads[1]),
                        BvhNode::leaf(quads[2]),
                        BvhNode::leaf(quads[3]),
                    ]);

                    for (e, refpoint) in elems.drain(0..) {
                        children[quadrant(pivot, refpoint)].insert(e, refpoint);
                    }

                    *self = BvhNode::Branch {
                        children,
                        pivot,
                        bbox: *bbox,
                    };
                }
            }
            BvhNode::Branch {
                children,
                pivot,
                bbox,
            } => {
                bbox.expand(refpoint);
                children[quadrant(*pivot, refpoint)].insert(e, refpoint);
            }
        }
    }

    /// Candidate elements near `center`: every element within `radius` is
    /// returned, together with some farther ones.
    pub fn within(&self, center: Vec2, radius: f64) -> impl Iterator<Item = (&Elem, Vec2)> {
        let mut query = Bbox::new(center - Vec2::new(radius, radius));
        query.expand(center + Vec2::new(radius, radius));

        let mut nodes = vec![self];
        let mut cur_elems = [].iter();

        std::iter::from_fn(move || loop {
            if let Some((e, p)) = cur_elems.next() {
                return Some((e, *p));
            }

            let n = nodes.pop()?;
            if !n.bbox().intersects(&query) {
                continue;
            }

            match n {
                BvhNode::Leaf { elems, .. } => cur_elems = elems.iter(),
                BvhNode::Branch { children, .. } => nodes.extend(children.iter()),
            }
        })
    }
}

fn quadrant(pivot: Vec2, p: Vec2) -> usize {
    match (p.x < pivot.x, p.y < pivot.y) {
        (true, true) => 0,
        (false, true) => 1,
        (true, false) => 2,
        (false, false) => 3,
    }
}
