use image::RgbImage;
use rayon::prelude::*;

use delaunay_mesh::geo;

use crate::mesh::{Color, Point, Triangle};

/// Pixels covered by `t`, row by row.
///
/// A pixel is covered when its center, the integer point `(x, y)`, lies in
/// the closed triangle. Pixels outside `width x height` are never returned and
/// a zero area triangle covers nothing.
pub fn covered_pixels(t: &Triangle, width: u32, height: u32) -> impl Iterator<Item = (u32, u32)> {
    let [a, b, c] = t.vertices;
    let sign = geo::orient(a, b, c).signum();

    let min_x = a.x.min(b.x).min(c.x).max(0);
    let min_y = a.y.min(b.y).min(c.y).max(0);
    let max_x = i64::from(a.x.max(b.x).max(c.x)).min(i64::from(width) - 1);
    let max_y = i64::from(a.y.max(b.y).max(c.y)).min(i64::from(height) - 1);

    // empty when the triangle is flat or fully outside the raster
    let (max_x, max_y) = if sign == 0 { (-1, -1) } else { (max_x, max_y) };

    (i64::from(min_y)..=max_y)
        .flat_map(move |y| (i64::from(min_x)..=max_x).map(move |x| (x, y)))
        .filter(move |&(x, y)| {
            let p = Point::new(x as i32, y as i32);

            geo::orient(a, b, p) * sign >= 0
                && geo::orient(b, c, p) * sign >= 0
                && geo::orient(c, a, p) * sign >= 0
        })
        .map(|(x, y)| (x as u32, y as u32))
}

/// Per channel mean of the pixels covered by `t`, truncated. `None` when `t`
/// covers no pixel at all.
pub fn mean_color(image: &RgbImage, t: &Triangle) -> Option<Color> {
    let mut sum = [0_u64; 3];
    let mut count = 0_u64;

    for (x, y) in covered_pixels(t, image.width(), image.height()) {
        let px = image.get_pixel(x, y);
        for (s, &v) in sum.iter_mut().zip(px.0.iter()) {
            *s += u64::from(v);
        }
        count += 1;
    }

    if count == 0 {
        return None;
    }

    Some(Color::new(
        (sum[0] / count) as u8,
        (sum[1] / count) as u8,
        (sum[2] / count) as u8,
    ))
}

/// `mean_color` of every triangle, in input order. Triangles are independent
/// so they can be sampled in parallel over the shared image.
pub fn sample_colors(image: &RgbImage, triangles: &[Triangle], parallel: bool) -> Vec<Option<Color>> {
    if parallel {
        triangles.par_iter().map(|t| mean_color(image, t)).collect()
    } else {
        triangles.iter().map(|t| mean_color(image, t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use image::Rgb;

    fn tri(pts: [(i32, i32); 3]) -> Triangle {
        Triangle::new(
            Point::new(pts[0].0, pts[0].1),
            Point::new(pts[1].0, pts[1].1),
            Point::new(pts[2].0, pts[2].1),
        )
    }

    #[test]
    fn test_closed_triangle_coverage() {
        // right triangle with legs of 2: 3 + 2 + 1 pixel centers
        let t = tri([(0, 0), (2, 0), (0, 2)]);
        let px = covered_pixels(&t, 10, 10).collect::<Vec<_>>();

        assert_eq!(px, vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (0, 2)]);

        // orientation doesn't matter
        let flipped = tri([(0, 0), (0, 2), (2, 0)]);
        assert_eq!(covered_pixels(&flipped, 10, 10).count(), 6);
    }

    #[test]
    fn test_coverage_is_clipped_to_the_raster() {
        let t = tri([(-5, -5), (20, -5), (-5, 20)]);
        let px = covered_pixels(&t, 4, 3).collect::<Vec<_>>();

        assert_eq!(px.len(), 12);
        assert!(px.iter().all(|&(x, y)| x < 4 && y < 3));

        let outside = tri([(-30, -30), (-10, -30), (-30, -10)]);
        assert_eq!(covered_pixels(&outside, 4, 3).count(), 0);

        let flat = tri([(0, 0), (1, 1), (2, 2)]);
        assert_eq!(covered_pixels(&flat, 4, 3).count(), 0);
    }

    #[test]
    fn test_adjacent_triangles_cover_everything() {
        let a = tri([(0, 0), (9, 0), (0, 9)]);
        let b = tri([(9, 0), (9, 9), (0, 9)]);

        let mut px = covered_pixels(&a, 10, 10)
            .chain(covered_pixels(&b, 10, 10))
            .collect::<Vec<_>>();
        px.sort();
        px.dedup();

        assert_eq!(px.len(), 100);
    }

    #[test]
    fn test_mean_color_truncates() {
        let mut image = RgbImage::from_pixel(3, 1, Rgb([10, 20, 30]));
        image.put_pixel(1, 0, Rgb([11, 21, 32]));
        image.put_pixel(2, 0, Rgb([11, 21, 32]));

        // the flat row is covered by a thin triangle reaching below the raster
        let t = tri([(0, 0), (2, 0), (0, 5)]);
        let c = mean_color(&image, &t).unwrap();

        assert_eq!(c, Color::new(10, 20, 31));
    }

    #[test]
    fn test_empty_mask() {
        let image = RgbImage::from_pixel(5, 5, Rgb([1, 2, 3]));
        let t = tri([(-9, -9), (-2, -9), (-9, -2)]);

        assert_eq!(mean_color(&image, &t), None);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut image = RgbImage::new(40, 40);
        for (x, y, px) in image.enumerate_pixels_mut() {
            *px = Rgb([(x * 6) as u8, (y * 6) as u8, ((x + y) * 3) as u8]);
        }

        let triangles = (0..30)
            .map(|i| tri([(i, 0), (i + 10, 5 + i / 2), (i / 2, 39)]))
            .collect::<Vec<_>>();

        assert_eq!(
            sample_colors(&image, &triangles, true),
            sample_colors(&image, &triangles, false)
        );
    }
}
