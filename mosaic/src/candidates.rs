//!
//! Candidate point proposers.
//!
//! The mesh quality mostly depends on where the candidates are, these are
//! simple built-in proposers plus a loader for points computed by an external
//! feature extractor.
//!

use std::fs;
use std::path::{Path, PathBuf};

use image::RgbImage;
use rand::prelude::*;
use rand_pcg::Pcg64;

use crate::error::{Error, Result};
use crate::mesh::Point;

pub trait CandidateSource {
    fn propose(&self, image: &RgbImage) -> Result<Vec<Point>>;
}

/// Corners, edge midpoints and quarter points of the frame. They pin the mesh
/// to the image borders.
pub fn anchor_points(width: u32, height: u32) -> Vec<Point> {
    let (w, h) = (width as i32, height as i32);
    if w == 0 || h == 0 {
        return vec![];
    }

    let (r, b) = (w - 1, h - 1);

    [
        (0, 0),
        (r, 0),
        (0, b),
        (r, b),
        (w / 2, 0),
        (0, h / 2),
        (r, h / 2),
        (w / 2, b),
        (w / 4, 0),
        (w * 3 / 4, 0),
        (0, h / 4),
        (0, h * 3 / 4),
        (r, h / 4),
        (r, h * 3 / 4),
        (w / 4, b),
        (w * 3 / 4, b),
    ]
    .iter()
    .map(|&(x, y)| Point::new(x, y))
    .collect()
}

/// Uniform random points in the top, middle and bottom thirds of the image,
/// each third with its own density.
#[derive(Debug, Clone)]
pub struct RandomBands {
    pub seed: u64,
    pub top: usize,
    pub middle: usize,
    pub bottom: usize,
}

impl CandidateSource for RandomBands {
    fn propose(&self, image: &RgbImage) -> Result<Vec<Point>> {
        let (w, h) = (image.width() as i32, image.height() as i32);
        let mut rng = Pcg64::seed_from_u64(self.seed);

        let bands = [
            (0, h / 3, self.top),
            (h / 3, h * 2 / 3, self.middle),
            (h * 2 / 3, h, self.bottom),
        ];

        let mut points = vec![];
        for &(y0, y1, n) in &bands {
            if w == 0 || y0 >= y1 {
                continue;
            }

            for _ in 0..n {
                points.push(Point::new(rng.gen_range(0, w), rng.gen_range(y0, y1)));
            }
        }

        Ok(points)
    }
}

/// Strongest Sobel response of every `cell x cell` block, if it reaches
/// `threshold`. A cheap stand-in for a proper edge and corner detector.
#[derive(Debug, Clone)]
pub struct GradientPeaks {
    pub cell: u32,
    pub threshold: f64,
}

impl GradientPeaks {
    fn magnitude(gray: &image::GrayImage, x: u32, y: u32) -> f64 {
        let p = |dx: i32, dy: i32| {
            let px = (x as i32 + dx) as u32;
            let py = (y as i32 + dy) as u32;
            f64::from(gray.get_pixel(px, py).0[0])
        };

        let gx = (p(1, -1) + 2.0 * p(1, 0) + p(1, 1)) - (p(-1, -1) + 2.0 * p(-1, 0) + p(-1, 1));
        let gy = (p(-1, 1) + 2.0 * p(0, 1) + p(1, 1)) - (p(-1, -1) + 2.0 * p(0, -1) + p(1, -1));

        (gx * gx + gy * gy).sqrt()
    }
}

impl CandidateSource for GradientPeaks {
    fn propose(&self, image: &RgbImage) -> Result<Vec<Point>> {
        let gray = image::imageops::grayscale(image);
        let (w, h) = gray.dimensions();
        if w < 3 || h < 3 || self.cell == 0 {
            return Ok(vec![]);
        }

        let mut points = vec![];
        for cy in (1..h - 1).step_by(self.cell as usize) {
            for cx in (1..w - 1).step_by(self.cell as usize) {
                let ys = cy..cy.saturating_add(self.cell).min(h - 1);
                let xs = cx..cx.saturating_add(self.cell).min(w - 1);

                let best = ys
                    .flat_map(|y| xs.clone().map(move |x| (x, y)))
                    .map(|(x, y)| (x, y, Self::magnitude(&gray, x, y)))
                    .fold(None, |best: Option<(u32, u32, f64)>, cur| match best {
                        Some(b) if b.2 >= cur.2 => Some(b),
                        _ => Some(cur),
                    });

                if let Some((x, y, m)) = best {
                    if m >= self.threshold {
                        points.push(Point::new(x as i32, y as i32));
                    }
                }
            }
        }

        Ok(points)
    }
}

/// Points computed elsewhere, either a JSON array of `[x, y]` pairs or a text
/// file with one `x,y` pair per line.
#[derive(Debug, Clone)]
pub struct PointFile {
    pub path: PathBuf,
}

impl CandidateSource for PointFile {
    fn propose(&self, _image: &RgbImage) -> Result<Vec<Point>> {
        let text = fs::read_to_string(&self.path)?;
        parse_points(&text, &self.path)
    }
}

pub fn parse_points(text: &str, path: &Path) -> Result<Vec<Point>> {
    if text.trim_start().starts_with('[') {
        let pairs: Vec<(i32, i32)> = serde_json::from_str(text).map_err(|e| Error::Candidates {
            path: path.to_owned(),
            line: e.line(),
            reason: e.to_string(),
        })?;

        return Ok(pairs.into_iter().map(|(x, y)| Point::new(x, y)).collect());
    }

    let mut points = vec![];
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let bad = |reason: String| Error::Candidates {
            path: path.to_owned(),
            line: i + 1,
            reason,
        };

        let mut coords = line.split(',').map(|c| c.trim().parse::<i32>());
        match (coords.next(), coords.next(), coords.next()) {
            (Some(Ok(x)), Some(Ok(y)), None) => points.push(Point::new(x, y)),
            (Some(Err(e)), _, _) | (_, Some(Err(e)), _) => return Err(bad(e.to_string())),
            _ => return Err(bad(format!("expected `x,y`, got `{}`", line))),
        }
    }

    Ok(points)
}
