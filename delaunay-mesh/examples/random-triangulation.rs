use std::env;
use std::fs::File;
use std::io;
use std::io::BufWriter;

use rand::prelude::*;
use rand_pcg::Pcg64;

use delaunay_mesh::geo::{Bbox, Point, Vec2};
use delaunay_mesh::DelaunayMesh;

pub fn main() -> io::Result<()> {
    let mut args = env::args().skip(1);

    let npoints = args.next().and_then(|n| n.parse().ok()).unwrap_or(50);
    let seed = args.next().and_then(|n| n.parse().ok()).unwrap_or(0);

    let mut rng = Pcg64::seed_from_u64(seed);

    let mut bbox = Bbox::new(Vec2::zero());
    bbox.expand(Vec2::new(800.0, 800.0));

    let mut mesh = DelaunayMesh::new(bbox);

    for i in 0..npoints {
        // don't spam too much
        if npoints <= 100 {
            let mut out = BufWriter::new(File::create(format!("triangulation-{}.svg", i))?);
            delaunay_mesh::mesh::dump_svg(&mut out, &mesh)?;
        }

        let x = rng.gen_range(0, 801);
        let y = rng.gen_range(0, 801);

        mesh.insert(Point::new(x, y));
    }

    // don't create huge files
    if npoints <= 1_000 {
        let mut out = BufWriter::new(File::create("triangulation.svg")?);
        delaunay_mesh::mesh::dump_svg(&mut out, &mesh)?;
    }

    Ok(())
}
