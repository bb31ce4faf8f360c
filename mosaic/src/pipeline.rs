use std::path::Path;

use image::RgbImage;
use tracing::{debug, info, warn};

use delaunay_mesh::geo::{Bbox, Vec2};
use delaunay_mesh::DelaunayMesh;

use crate::candidates::{anchor_points, CandidateSource, GradientPeaks, RandomBands};
use crate::color::sample_colors;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::filter::filter_points;
use crate::mesh::{Mesh, MeshTriangle, Point, Triangle};
use crate::validate::Validator;

/// What happened to the points and triangles of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub candidates: usize,
    pub filtered: usize,
    pub skipped_insertions: usize,
    pub raw_triangles: usize,
    pub out_of_bounds: usize,
    pub too_small: usize,
    pub empty_masks: usize,
    pub emitted: usize,
}

pub fn load_image(path: &Path) -> Result<RgbImage> {
    let img = image::open(path).map_err(|source| Error::Load {
        path: path.to_owned(),
        source,
    })?;

    let img = img.to_rgb8();
    info!(width = img.width(), height = img.height(), "loaded {}", path.display());

    Ok(img)
}

/// The built-in proposers as configured. The random seed is drawn and logged
/// when the config doesn't pin one, so that any run can be reproduced.
pub fn builtin_sources(config: &Config) -> Vec<Box<dyn CandidateSource>> {
    let density = &config.density;

    let seed = density.seed.unwrap_or_else(|| {
        let seed = rand::random();
        info!(seed, "no seed configured, picked one");
        seed
    });

    let mut sources: Vec<Box<dyn CandidateSource>> = vec![Box::new(RandomBands {
        seed,
        top: density.top_points,
        middle: density.middle_points,
        bottom: density.bottom_points,
    })];

    if density.gradient_cell > 0 {
        sources.push(Box::new(GradientPeaks {
            cell: density.gradient_cell,
            threshold: density.gradient_threshold,
        }));
    }

    sources
}

/// Anchor points of the frame followed by everything `sources` propose.
pub fn collect_candidates(image: &RgbImage, sources: &[Box<dyn CandidateSource>]) -> Result<Vec<Point>> {
    let mut points = anchor_points(image.width(), image.height());

    for source in sources {
        points.extend(source.propose(image)?);
    }

    debug!(candidates = points.len(), "collected candidate points");
    Ok(points)
}

/// Delaunay triangles of `points` inside the `width x height` pixel grid and
/// the number of points that couldn't be inserted.
pub fn triangulate(points: &[Point], width: u32, height: u32) -> (Vec<Triangle>, usize) {
    let mut bbox = Bbox::new(Vec2::zero());
    bbox.expand(Vec2::new(f64::from(width) - 1.0, f64::from(height) - 1.0));

    let mesh = DelaunayMesh::with_points(bbox, points.iter().copied());

    let triangles = mesh.triangles().map(Triangle::from).collect();
    (triangles, mesh.skipped())
}

/// Run every stage from the candidate points to the colored mesh.
pub fn build_mesh(image: &RgbImage, candidates: Vec<Point>, config: &Config) -> Result<(Mesh, Stats)> {
    config.validate()?;

    let (width, height) = image.dimensions();
    let mut stats = Stats {
        candidates: candidates.len(),
        ..Stats::default()
    };

    let points = filter_points(candidates, config.min_point_distance, config.filter);
    stats.filtered = points.len();
    info!(points = points.len(), "filtered candidate points");

    if points.len() < 3 {
        return Err(Error::InsufficientPoints { count: points.len() });
    }

    let (raw, skipped) = triangulate(&points, width, height);
    stats.skipped_insertions = skipped;
    stats.raw_triangles = raw.len();
    if skipped > 0 {
        debug!(skipped, "points skipped by the triangulation");
    }

    if raw.is_empty() {
        return Err(Error::InsufficientPoints { count: points.len() });
    }

    let validator = Validator {
        width,
        height,
        margin_x: config.margin_x,
        margin_y: config.margin_y,
        min_area: config.min_area_threshold,
    };
    let (valid, rejections) = validator.validate(raw);
    stats.out_of_bounds = rejections.out_of_bounds;
    stats.too_small = rejections.too_small;
    debug!(
        valid = valid.len(),
        out_of_bounds = rejections.out_of_bounds,
        too_small = rejections.too_small,
        "validated triangles"
    );

    let colors = sample_colors(image, &valid, config.parallel);

    let mut mesh = Mesh::default();
    for (triangle, color) in valid.into_iter().zip(colors) {
        match color {
            Some(color) => mesh.triangles.push(MeshTriangle { triangle, color }),
            None => stats.empty_masks += 1,
        }
    }
    stats.emitted = mesh.len();

    if mesh.is_empty() {
        warn!("every triangle was discarded, the mesh is empty");
    }

    info!(
        triangles = stats.emitted,
        raw = stats.raw_triangles,
        out_of_bounds = stats.out_of_bounds,
        too_small = stats.too_small,
        empty_masks = stats.empty_masks,
        "mesh built"
    );

    Ok((mesh, stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    use image::Rgb;

    #[test]
    fn test_triangulate_drops_outside_points() {
        let points = vec![
            Point::new(0, 0),
            Point::new(9, 0),
            Point::new(0, 9),
            Point::new(10, 10),
            Point::new(9, 9),
        ];

        let (tris, skipped) = triangulate(&points, 10, 10);

        assert_eq!(skipped, 1);
        assert_eq!(tris.len(), 2);
    }

    #[test]
    fn test_triangulate_counts_skips_in_the_collinear_prefix() {
        let points = vec![
            Point::new(0, 0),
            Point::new(3, 0),
            Point::new(3, 0),
            Point::new(6, 0),
            Point::new(4, 5),
            Point::new(6, 0),
        ];

        let (tris, skipped) = triangulate(&points, 10, 10);

        assert_eq!(skipped, 2);
        assert_eq!(tris.len(), 2);
    }

    #[test]
    fn test_collect_candidates_starts_with_anchors() {
        let image = RgbImage::from_pixel(30, 30, Rgb([0, 0, 0]));
        let config = Config {
            density: crate::config::Density {
                seed: Some(1),
                top_points: 5,
                middle_points: 5,
                bottom_points: 5,
                gradient_cell: 0,
                ..Default::default()
            },
            ..Config::default()
        };

        let sources = builtin_sources(&config);
        assert_eq!(sources.len(), 1);

        let points = collect_candidates(&image, &sources).unwrap();
        assert_eq!(points.len(), 16 + 15);
        assert_eq!(points[..16], anchor_points(30, 30)[..]);
    }

    #[test]
    fn test_invalid_config_is_rejected_before_running() {
        let image = RgbImage::new(10, 10);
        let config = Config {
            min_point_distance: -2.0,
            ..Config::default()
        };

        let res = build_mesh(&image, anchor_points(10, 10), &config);
        assert!(matches!(res, Err(Error::InvalidConfig(_))));
    }
}
