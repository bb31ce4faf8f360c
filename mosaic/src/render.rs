use image::{Rgb, RgbImage};

use crate::color::covered_pixels;
use crate::mesh::Mesh;

/// Paint every triangle of `mesh` with its color, in mesh order. Pixels on a
/// shared edge end up with the color of the later triangle.
pub fn render(mesh: &Mesh, width: u32, height: u32) -> RgbImage {
    let mut img = RgbImage::new(width, height);

    for mt in mesh.iter() {
        let color = Rgb(mt.color.channels());
        for (x, y) in covered_pixels(&mt.triangle, width, height) {
            img.put_pixel(x, y, color);
        }
    }

    img
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::mesh::{Color, MeshTriangle, Point, Triangle};

    #[test]
    fn test_render_paints_the_sampled_pixels() {
        let mesh = Mesh {
            triangles: vec![
                MeshTriangle {
                    triangle: Triangle::new(Point::new(0, 0), Point::new(7, 0), Point::new(0, 7)),
                    color: Color::new(255, 0, 0),
                },
                MeshTriangle {
                    triangle: Triangle::new(Point::new(7, 0), Point::new(7, 7), Point::new(0, 7)),
                    color: Color::new(0, 0, 255),
                },
            ],
        };

        let img = render(&mesh, 8, 8);

        assert_eq!(img.get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(img.get_pixel(7, 7), &Rgb([0, 0, 255]));
        // the diagonal belongs to both, the last one wins
        assert_eq!(img.get_pixel(3, 4), &Rgb([0, 0, 255]));
        assert!(img.pixels().all(|px| px.0 != [0, 0, 0]));
    }
}
